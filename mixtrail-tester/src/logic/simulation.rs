use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use mixtrail_game::{
    AdventureConfig, AdventureSession, AdventureStatus, AdventureSummary, Gazetteer, ManualClock,
    MoodCategory, OfflineDealer, OfflineServices, RecipeCatalog, RootState, ScriptedWeather,
    StraightLineRouter, WeatherData, WeatherScript,
};
use serde::Serialize;

use super::policy::choose_recipe;

/// 2024-06-01T09:00:00Z, the nominal departure time of every simulated trip.
const DEPARTURE_MILLIS: i64 = 1_717_232_400_000;
/// Simulated minutes between player actions.
const ACTION_STEP_MILLIS: i64 = 60_000;

pub type SimulationExpectation = fn(&SimulationSummary) -> Result<()>;

/// Weather conditions a plan drives through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WeatherProfile {
    /// Random plausible conditions per stop.
    Seeded,
    /// Sunny, mild, still.
    Pleasant,
    /// Hot, wet, windy, dry air.
    Miserable,
    /// Every weather lookup fails.
    Offline,
}

impl WeatherProfile {
    fn script(self, seed: u64) -> WeatherScript {
        match self {
            Self::Seeded => WeatherScript::Seeded(seed),
            Self::Pleasant => {
                WeatherScript::Fixed(WeatherData::from_observation(21.0, 0, 5.0, 50.0, 0.0, 10.0))
            }
            Self::Miserable => {
                WeatherScript::Fixed(WeatherData::from_observation(30.0, 65, 35.0, 20.0, 10.0, 90.0))
            }
            Self::Offline => WeatherScript::Offline,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub from: &'static str,
    pub to: &'static str,
    pub stops: usize,
    pub weather: WeatherProfile,
    pub router_down: bool,
    pub dealer_down: bool,
    /// Cards drawn right after departure.
    pub opening_draws: usize,
    /// Extra draws allowed at a stop while looking for a craftable drink.
    pub max_draws_per_stop: usize,
    /// Play the same seed twice and compare the final state.
    pub check_replay: bool,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(from: &'static str, to: &'static str, stops: usize) -> Self {
        Self {
            from,
            to,
            stops,
            weather: WeatherProfile::Seeded,
            router_down: false,
            dealer_down: false,
            opening_draws: 0,
            max_draws_per_stop: 104,
            check_replay: false,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_weather(mut self, weather: WeatherProfile) -> Self {
        self.weather = weather;
        self
    }

    #[must_use]
    pub const fn with_router_down(mut self) -> Self {
        self.router_down = true;
        self
    }

    #[must_use]
    pub const fn with_dealer_down(mut self) -> Self {
        self.dealer_down = true;
        self
    }

    #[must_use]
    pub const fn with_opening_draws(mut self, draws: usize) -> Self {
        self.opening_draws = draws;
        self
    }

    #[must_use]
    pub const fn with_replay_check(mut self) -> Self {
        self.check_replay = true;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: SimulationExpectation) -> Self {
        self.expectations.push(expectation);
        self
    }

    fn services(&self, seed: u64) -> OfflineServices {
        OfflineServices {
            weather: ScriptedWeather::new(self.weather.script(seed)),
            geocoder: Gazetteer::default(),
            router: if self.router_down {
                StraightLineRouter::unreachable()
            } else {
                StraightLineRouter::default()
            },
            dealer: if self.dealer_down {
                OfflineDealer::refusing(seed)
            } else {
                OfflineDealer::new(seed)
            },
        }
    }
}

/// What happened at one stop.
#[derive(Debug, Clone, Serialize)]
pub struct StopRecord {
    pub index: usize,
    pub stop_name: String,
    pub npc_name: String,
    pub mood: MoodCategory,
    pub mood_score: i32,
    pub requirements: Vec<String>,
    pub weather_degraded: bool,
    pub draws: usize,
    pub drink: String,
    pub requirement_hits: usize,
}

#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub stops_planned: usize,
    pub status: AdventureStatus,
    pub complete: bool,
    pub start_error: Option<String>,
    pub failure: Option<String>,
    pub stops: Vec<StopRecord>,
    pub cards_drawn: usize,
    pub reshuffles: u32,
    pub replay_matches: Option<bool>,
    pub recap: AdventureSummary,
    pub final_state: RootState,
}

struct Run {
    session: AdventureSession<OfflineServices, ManualClock>,
    stops: Vec<StopRecord>,
    start_error: Option<String>,
}

/// Play one adventure. `base` supplies everything but the stop count.
pub async fn run_plan(
    plan: &SimulationPlan,
    seed: u64,
    base: &AdventureConfig,
    catalog: &RecipeCatalog,
) -> SimulationSummary {
    let (run, failure) = play(plan, seed, base, catalog).await;
    let replay_matches = if plan.check_replay {
        let (replay, _) = play(plan, seed, base, catalog).await;
        Some(replay.session.state() == run.session.state())
    } else {
        None
    };

    let state = run.session.state();
    SimulationSummary {
        seed,
        stops_planned: plan.stops,
        status: state.adventure.status,
        complete: run.session.is_complete(),
        start_error: run.start_error,
        failure,
        cards_drawn: state.adventure.drawn_cards.len(),
        reshuffles: run.session.services().dealer.stats().reshuffles,
        replay_matches,
        recap: run.session.summary(),
        final_state: state.clone(),
        stops: run.stops,
    }
}

async fn play(
    plan: &SimulationPlan,
    seed: u64,
    base: &AdventureConfig,
    catalog: &RecipeCatalog,
) -> (Run, Option<String>) {
    let config = AdventureConfig {
        stop_count: plan.stops,
        ..base.clone()
    };
    let mut run = Run {
        session: AdventureSession::new(
            plan.services(seed),
            ManualClock::new(DEPARTURE_MILLIS, ACTION_STEP_MILLIS),
            config,
            seed,
        ),
        stops: Vec::new(),
        start_error: None,
    };
    let failure = drive(&mut run, plan, catalog)
        .await
        .err()
        .map(|err| format!("{err:#}"));
    (run, failure)
}

async fn drive(run: &mut Run, plan: &SimulationPlan, catalog: &RecipeCatalog) -> Result<()> {
    let session = &mut run.session;
    let from = session
        .search_locations(plan.from)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no location matches '{}'", plan.from))?;
    let to = session
        .search_locations(plan.to)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no location matches '{}'", plan.to))?;
    session.set_start_location(from);
    session.set_end_location(to);

    if let Err(err) = session.start_adventure(None).await {
        debug!("Start failed: {err}");
        run.start_error = Some(err.to_string());
        return Ok(());
    }

    for _ in 0..plan.opening_draws {
        session.draw_card().await.context("opening draw")?;
    }

    while session.state().adventure.status == AdventureStatus::Active {
        let arrival = session
            .arrive_at_current_stop()
            .await
            .context("arriving at stop")?;
        session.serve_current_npc()?;

        let mut draws = 0;
        let choice = loop {
            let state = session.state();
            let choice = choose_recipe(
                catalog,
                &state.game.inventory,
                state.npc.current.as_ref(),
                &mut *session.rng().policy(),
            )
            .map(|choice| (choice.recipe.clone(), choice.requirement_hits));
            if let Some(choice) = choice {
                break choice;
            }
            if draws >= plan.max_draws_per_stop {
                bail!(
                    "stalled at stop {} after {draws} draws with {}",
                    arrival.stop_index + 1,
                    session.state().game.inventory
                );
            }
            session.draw_card().await.context("drawing for ingredients")?;
            draws += 1;
        };

        let (recipe, requirement_hits) = choice;
        session
            .craft(&recipe)
            .with_context(|| format!("crafting {}", recipe.name))?;
        run.stops.push(StopRecord {
            index: arrival.stop_index,
            stop_name: arrival.stop_name,
            npc_name: arrival.npc.name,
            mood: arrival.npc.mood_category,
            mood_score: arrival.npc.mood_score,
            requirements: arrival.npc.current_requirements,
            weather_degraded: arrival.weather_source.is_degraded(),
            draws,
            drink: recipe.name,
            requirement_hits,
        });
        session.advance_to_next_stop();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(plan: &SimulationPlan, seed: u64) -> SimulationSummary {
        run_plan(
            plan,
            seed,
            &AdventureConfig::default_config(),
            &RecipeCatalog::default_catalog(),
        )
        .await
    }

    #[tokio::test]
    async fn plays_a_trip_to_completion() {
        let summary = run(&SimulationPlan::new("Paris", "Lyon", 3), 1337).await;
        assert!(summary.failure.is_none(), "{:?}", summary.failure);
        assert!(summary.complete);
        assert_eq!(summary.status, AdventureStatus::Completed);
        assert_eq!(summary.stops.len(), 3);
        assert_eq!(summary.recap.served.len(), 3);
    }

    #[tokio::test]
    async fn router_outage_stops_at_the_start() {
        let summary = run(&SimulationPlan::new("Paris", "Lyon", 3).with_router_down(), 7).await;
        assert_eq!(summary.status, AdventureStatus::Idle);
        assert!(summary.start_error.as_deref().unwrap().contains("NoRoute"));
        assert!(summary.stops.is_empty());
    }

    #[tokio::test]
    async fn replays_match() {
        let plan = SimulationPlan::new("Dijon", "Avignon", 2).with_replay_check();
        assert_eq!(run(&plan, 99).await.replay_matches, Some(true));
    }
}
