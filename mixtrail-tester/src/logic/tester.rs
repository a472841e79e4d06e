use colored::Colorize;
use mixtrail_game::{AdventureConfig, RecipeCatalog};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::logic::simulation::{SimulationPlan, SimulationSummary, run_plan};
use crate::scenarios::TestScenario;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

pub struct LogicTester {
    config: AdventureConfig,
    catalog: RecipeCatalog,
    verbose: bool,
}

impl LogicTester {
    pub fn new(config: AdventureConfig, verbose: bool) -> Self {
        Self {
            config,
            catalog: RecipeCatalog::default_catalog(),
            verbose,
        }
    }

    pub async fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} ({} -> {}, seed: {})",
                    scenario.name.bright_white(),
                    scenario.plan.from,
                    scenario.plan.to,
                    seed
                );
            }

            let result = self.run_single_scenario(scenario, seed, iterations).await;
            results.push(result);
        }

        results
    }

    async fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let (successes, failures, performance_data) = self
            .run_simulation_iterations(&scenario.plan, seed, iterations)
            .await;

        let avg_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration: avg_duration,
            performance_data,
        }
    }

    async fn run_simulation_iterations(
        &self,
        plan: &SimulationPlan,
        seed: u64,
        iterations: usize,
    ) -> (usize, Vec<String>, Vec<Duration>) {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let summary = run_plan(plan, iteration_seed, &self.config, &self.catalog).await;

            if let Some(err) = evaluate_expectations(plan, &summary) {
                let context = summarize_stops(&summary);
                failures.push(format!(
                    "Iteration {} (seed {}, status {}, stops {}/{}, cards {}): {} | {}",
                    i + 1,
                    summary.seed,
                    summary.status,
                    summary.stops.len(),
                    summary.stops_planned,
                    summary.cards_drawn,
                    err,
                    context
                ));

                if self.verbose {
                    println!(
                        "  ❌ Iteration {}/{} failed: {}",
                        i + 1,
                        iterations,
                        err.red()
                    );
                    println!("     ↳ Seed {} | {}", summary.seed, context);
                }
            } else {
                successes += 1;
                let duration = start_time.elapsed();
                performance_data.push(duration);

                if self.verbose {
                    println!(
                        "  ✅ Iteration {}/{} passed ({duration:?}) stops:{} cards:{} reshuffles:{}",
                        i + 1,
                        iterations,
                        summary.stops.len(),
                        summary.cards_drawn,
                        summary.reshuffles
                    );
                }
            }
        }

        (successes, failures, performance_data)
    }
}

fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> Option<String> {
    if let Some(failure) = &summary.failure {
        return Some(failure.clone());
    }
    for expectation in &plan.expectations {
        if let Err(err) = expectation(summary) {
            return Some(format!("{err:#}"));
        }
    }
    None
}

fn summarize_stops(summary: &SimulationSummary) -> String {
    if summary.stops.is_empty() {
        return summary
            .start_error
            .as_deref()
            .map_or_else(|| "no stops served".to_string(), |err| format!("start failed: {err}"));
    }

    summary
        .stops
        .iter()
        .rev()
        .take(3)
        .map(|stop| {
            format!(
                "stop {} ({}): {} [{:?} {}] asked {} -> {} ({} hits, {} draws)",
                stop.index + 1,
                stop.stop_name,
                stop.npc_name,
                stop.mood,
                stop.mood_score,
                stop.requirements.join("/"),
                stop.drink,
                stop.requirement_hits,
                stop.draws
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
