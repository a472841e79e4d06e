//! End-of-trip recap.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::adventure::{AdventureStatus, is_complete};
use crate::inventory::same_ingredient;
use crate::numbers::{format_duration, format_km};
use crate::store::RootState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServedDrink {
    pub stop_index: usize,
    pub stop_name: String,
    pub npc_name: String,
    pub drink: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdventureSummary {
    pub status: AdventureStatus,
    pub complete: bool,
    pub start: String,
    pub end: String,
    pub stops_total: usize,
    pub served: Vec<ServedDrink>,
    pub cards_drawn: usize,
    pub distinct_ingredients_used: usize,
    pub distance: String,
    pub duration: String,
}

#[must_use]
pub fn summarize(state: &RootState) -> AdventureSummary {
    let adventure = &state.adventure;
    let route = adventure.route_data.as_ref();

    let served = adventure
        .completed_npcs
        .iter()
        .map(|record| ServedDrink {
            stop_index: record.stop_index,
            stop_name: route
                .and_then(|r| r.stop_points.get(record.stop_index))
                .map_or_else(|| format!("Stop {}", record.stop_index + 1), |c| c.display_name()),
            npc_name: record.npc_name.clone(),
            drink: record.drink_crafted.clone(),
        })
        .collect();

    let mut used: Vec<&str> = Vec::new();
    for name in adventure
        .completed_npcs
        .iter()
        .flat_map(|record| record.ingredients_used.iter())
    {
        if !used.iter().any(|seen| same_ingredient(seen, name)) {
            used.push(name);
        }
    }

    AdventureSummary {
        status: adventure.status,
        complete: is_complete(adventure),
        start: adventure
            .start_location
            .as_ref()
            .map(|c| c.display_name())
            .unwrap_or_default(),
        end: adventure
            .end_location
            .as_ref()
            .map(|c| c.display_name())
            .unwrap_or_default(),
        stops_total: adventure.stop_count(),
        served,
        cards_drawn: adventure.drawn_cards.len(),
        distinct_ingredients_used: used.len(),
        distance: format_km(route.map_or(0.0, |r| r.total_distance_meters)),
        duration: format_duration(route.map_or(0.0, |r| r.total_duration_seconds)),
    }
}

impl fmt::Display for AdventureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} -> {} ({}, {}) [{}]",
            self.start, self.end, self.distance, self.duration, self.status
        )?;
        writeln!(
            f,
            "Served {}/{} travelers, {} cards drawn, {} distinct ingredients poured",
            self.served.len(),
            self.stops_total,
            self.cards_drawn,
            self.distinct_ingredients_used
        )?;
        for drink in &self.served {
            writeln!(
                f,
                "  #{} {}: {} had a {}",
                drink.stop_index + 1,
                drink.stop_name,
                drink.npc_name,
                drink.drink
            )?;
        }
        Ok(())
    }
}
