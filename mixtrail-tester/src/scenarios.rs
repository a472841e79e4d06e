use anyhow::{Result, ensure};
use mixtrail_game::{AdventureStatus, MoodCategory};

use crate::logic::{SimulationPlan, SimulationSummary, WeatherProfile};

/// A named simulation plan.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    fn new(key: &'static str, name: &str, plan: SimulationPlan) -> Self {
        Self {
            key,
            name: name.to_string(),
            plan,
        }
    }
}

pub fn catalog_scenarios() -> Vec<TestScenario> {
    vec![
        TestScenario::new(
            "smoke",
            "Smoke Test",
            SimulationPlan::new("Paris", "Lyon", 3).with_expectation(completed_every_stop),
        ),
        TestScenario::new(
            "full-trip",
            "Full Trip - Paris to Marseille",
            SimulationPlan::new("Paris", "Marseille", 5)
                .with_opening_draws(5)
                .with_expectation(completed_every_stop)
                .with_expectation(stops_in_order)
                .with_expectation(recap_matches_stops),
        ),
        TestScenario::new(
            "deck-exhaustion",
            "Deck Exhaustion and Reshuffle",
            SimulationPlan::new("Dijon", "Lyon", 2)
                .with_opening_draws(60)
                .with_expectation(completed_every_stop)
                .with_expectation(deck_was_reshuffled),
        ),
        TestScenario::new(
            "route-failure",
            "Routing Outage",
            SimulationPlan::new("Paris", "Lyon", 3)
                .with_router_down()
                .with_expectation(planning_rolled_back),
        ),
        TestScenario::new(
            "deck-failure",
            "Dealer Outage",
            SimulationPlan::new("Paris", "Lyon", 3)
                .with_dealer_down()
                .with_expectation(planning_rolled_back),
        ),
        TestScenario::new(
            "weather-extremes",
            "Miserable Weather Moods",
            SimulationPlan::new("Lyon", "Avignon", 3)
                .with_weather(WeatherProfile::Miserable)
                .with_expectation(completed_every_stop)
                .with_expectation(every_npc_is_sad),
        ),
        TestScenario::new(
            "weather-pleasant",
            "Pleasant Weather Moods",
            SimulationPlan::new("Lyon", "Avignon", 3)
                .with_weather(WeatherProfile::Pleasant)
                .with_expectation(completed_every_stop)
                .with_expectation(every_npc_is_happy),
        ),
        TestScenario::new(
            "weather-offline",
            "Weather Service Outage",
            SimulationPlan::new("Lyon", "Nice", 3)
                .with_weather(WeatherProfile::Offline)
                .with_expectation(completed_every_stop)
                .with_expectation(weather_degraded_everywhere),
        ),
        TestScenario::new(
            "deterministic-replay",
            "Deterministic Replay Verification",
            SimulationPlan::new("Paris", "Nice", 4)
                .with_opening_draws(3)
                .with_replay_check()
                .with_expectation(completed_every_stop)
                .with_expectation(replay_matched),
        ),
    ]
}

pub fn list_scenarios() -> Vec<(&'static str, String)> {
    catalog_scenarios()
        .into_iter()
        .map(|scenario| (scenario.key, scenario.name))
        .collect()
}

pub fn get_scenario(key: &str) -> Option<TestScenario> {
    let key = key.trim().to_lowercase();
    catalog_scenarios()
        .into_iter()
        .find(|scenario| scenario.key == key)
}

pub fn all_scenario_keys() -> Vec<String> {
    catalog_scenarios()
        .into_iter()
        .map(|scenario| scenario.key.to_string())
        .collect()
}

fn completed_every_stop(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.status == AdventureStatus::Completed,
        "adventure ended {} instead of completed",
        summary.status
    );
    ensure!(summary.complete, "completion check disagrees with status");
    ensure!(
        summary.stops.len() == summary.stops_planned,
        "served {} of {} stops",
        summary.stops.len(),
        summary.stops_planned
    );
    Ok(())
}

fn stops_in_order(summary: &SimulationSummary) -> Result<()> {
    for (expected, stop) in summary.stops.iter().enumerate() {
        ensure!(
            stop.index == expected,
            "stop {} visited in position {}",
            stop.index,
            expected
        );
        ensure!(
            (-10..=10).contains(&stop.mood_score),
            "mood score {} out of range at {}",
            stop.mood_score,
            stop.stop_name
        );
    }
    Ok(())
}

fn recap_matches_stops(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.recap.served.len() == summary.stops.len(),
        "recap lists {} drinks for {} stops",
        summary.recap.served.len(),
        summary.stops.len()
    );
    for (served, stop) in summary.recap.served.iter().zip(&summary.stops) {
        ensure!(
            served.drink == stop.drink && served.npc_name == stop.npc_name,
            "recap says {} had {}, simulation served {} to {}",
            served.npc_name,
            served.drink,
            stop.drink,
            stop.npc_name
        );
    }
    ensure!(
        summary.recap.cards_drawn == summary.cards_drawn,
        "recap counts {} cards, state holds {}",
        summary.recap.cards_drawn,
        summary.cards_drawn
    );
    Ok(())
}

fn deck_was_reshuffled(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.cards_drawn >= 60,
        "only {} cards drawn",
        summary.cards_drawn
    );
    ensure!(summary.reshuffles >= 1, "deck was never reshuffled");
    Ok(())
}

fn planning_rolled_back(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.start_error.is_some(),
        "adventure started despite the outage"
    );
    let adventure = &summary.final_state.adventure;
    ensure!(
        adventure.status == AdventureStatus::Idle,
        "status {} after failed planning",
        adventure.status
    );
    ensure!(adventure.route_data.is_none(), "route kept after failure");
    ensure!(adventure.deck_id.is_none(), "deck kept after failure");
    ensure!(adventure.error.is_some(), "failure not recorded in state");
    ensure!(
        adventure.has_both_locations(),
        "locations lost after failure"
    );
    Ok(())
}

fn every_npc_is(summary: &SimulationSummary, mood: MoodCategory) -> Result<()> {
    for stop in &summary.stops {
        ensure!(
            stop.mood == mood,
            "{} at {} is {:?}, expected {:?}",
            stop.npc_name,
            stop.stop_name,
            stop.mood,
            mood
        );
    }
    Ok(())
}

fn every_npc_is_sad(summary: &SimulationSummary) -> Result<()> {
    every_npc_is(summary, MoodCategory::Sad)
}

fn every_npc_is_happy(summary: &SimulationSummary) -> Result<()> {
    every_npc_is(summary, MoodCategory::Happy)
}

fn weather_degraded_everywhere(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.stops.iter().all(|stop| stop.weather_degraded),
        "some stops saw live weather during an outage"
    );
    every_npc_is_happy(summary)
}

fn replay_matched(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.replay_matches == Some(true),
        "replay with seed {} diverged",
        summary.seed
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique_and_resolvable() {
        let keys = all_scenario_keys();
        let mut sorted = keys.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), keys.len());
        for key in &keys {
            assert!(get_scenario(key).is_some(), "{key}");
        }
        assert!(get_scenario(" SMOKE ").is_some());
        assert!(get_scenario("nope").is_none());
    }

    #[test]
    fn every_scenario_checks_something() {
        for scenario in catalog_scenarios() {
            assert!(!scenario.plan.expectations.is_empty(), "{}", scenario.key);
        }
    }
}
