pub mod policy;
pub mod reports;
pub mod simulation;
pub mod tester;

pub use simulation::{SimulationPlan, SimulationSummary, WeatherProfile};
pub use tester::*;
