//! Adventure progression: `idle -> planning -> active -> completed`.
//!
//! The reducer is the only way this state changes. Every transition keeps
//! `current_stop_index <= stop count` and `completed_npcs.len() <= stop count`.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cards::DrawnCard;
use crate::route::{Coordinate, RouteData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdventureStatus {
    #[default]
    Idle,
    Planning,
    Active,
    Completed,
}

impl AdventureStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Planning => "planning",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for AdventureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdventureStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idle" => Ok(Self::Idle),
            "planning" => Ok(Self::Planning),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(()),
        }
    }
}

/// A drink served to an NPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedNpcRecord {
    pub npc_id: String,
    pub npc_name: String,
    pub stop_index: usize,
    pub drink_crafted: String,
    pub ingredients_used: Vec<String>,
    pub crafted_at: i64,
}

/// Payload for recording a served NPC; the stop index is filled in by the
/// reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpcCompletion {
    pub npc_id: String,
    pub npc_name: String,
    pub drink_crafted: String,
    pub ingredients_used: Vec<String>,
    pub crafted_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AdventureState {
    pub start_location: Option<Coordinate>,
    pub end_location: Option<Coordinate>,
    pub route_data: Option<RouteData>,
    pub deck_id: Option<String>,
    pub current_stop_index: usize,
    pub drawn_cards: Vec<DrawnCard>,
    pub completed_npcs: Vec<CompletedNpcRecord>,
    pub status: AdventureStatus,
    pub loading: bool,
    pub error: Option<String>,
}

impl AdventureState {
    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.route_data.as_ref().map_or(0, RouteData::stop_count)
    }

    /// Stop the player is currently at, if any remain.
    #[must_use]
    pub fn current_stop(&self) -> Option<&Coordinate> {
        self.route_data
            .as_ref()
            .and_then(|route| route.stop_points.get(self.current_stop_index))
    }

    #[must_use]
    pub const fn has_both_locations(&self) -> bool {
        self.start_location.is_some() && self.end_location.is_some()
    }

    /// Whether the NPC at the current stop has been served.
    #[must_use]
    pub fn current_stop_served(&self) -> bool {
        self.completed_npcs
            .iter()
            .any(|record| record.stop_index == self.current_stop_index)
    }
}

/// Every stop's NPC has been served.
#[must_use]
pub fn is_complete(state: &AdventureState) -> bool {
    state
        .route_data
        .as_ref()
        .is_some_and(|route| state.completed_npcs.len() == route.stop_count())
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdventureAction {
    SetStartLocation(Coordinate),
    SetEndLocation(Coordinate),
    /// Start requested; ignored unless idle with both locations set.
    BeginPlanning,
    SetDeckId(String),
    /// A route was planned; the adventure becomes active.
    SetRouteData(RouteData),
    PlanningFailed(String),
    AddDrawnCard(DrawnCard),
    CompleteNpc(NpcCompletion),
    AdvanceToNextStop,
    /// Host override; completion still follows the completed records.
    SetStatus(AdventureStatus),
    ClearError,
    Reset,
}

#[must_use]
pub fn reduce(mut state: AdventureState, action: AdventureAction) -> AdventureState {
    match action {
        AdventureAction::SetStartLocation(location) => {
            state.start_location = Some(location);
            state.error = None;
        }
        AdventureAction::SetEndLocation(location) => {
            state.end_location = Some(location);
            state.error = None;
        }
        AdventureAction::BeginPlanning => {
            if state.status != AdventureStatus::Idle || !state.has_both_locations() {
                warn!(
                    "Ignoring start request: status {}, locations set: {}",
                    state.status,
                    state.has_both_locations()
                );
                return state;
            }
            state.status = AdventureStatus::Planning;
            state.loading = true;
            state.error = None;
        }
        AdventureAction::SetDeckId(deck_id) => {
            if state.deck_id.as_deref() != Some(deck_id.as_str()) {
                state.drawn_cards.clear();
            }
            state.deck_id = Some(deck_id);
        }
        AdventureAction::SetRouteData(route) => {
            state.route_data = Some(route);
            state.current_stop_index = 0;
            state.completed_npcs.clear();
            state.loading = false;
            state.error = None;
            state.status = if is_complete(&state) {
                AdventureStatus::Completed
            } else {
                AdventureStatus::Active
            };
        }
        AdventureAction::PlanningFailed(message) => {
            state.status = AdventureStatus::Idle;
            state.loading = false;
            state.route_data = None;
            state.deck_id = None;
            state.current_stop_index = 0;
            state.drawn_cards.clear();
            state.completed_npcs.clear();
            state.error = Some(message);
        }
        AdventureAction::AddDrawnCard(card) => state.drawn_cards.push(card),
        AdventureAction::CompleteNpc(completion) => {
            if state.status != AdventureStatus::Active {
                warn!("Ignoring NPC completion while {}", state.status);
                return state;
            }
            if state.completed_npcs.len() >= state.stop_count() {
                warn!("Ignoring NPC completion: every stop is already served");
                return state;
            }
            if state.current_stop_served() {
                warn!(
                    "Ignoring NPC completion: stop {} is already served",
                    state.current_stop_index + 1
                );
                return state;
            }
            state.completed_npcs.push(CompletedNpcRecord {
                npc_id: completion.npc_id,
                npc_name: completion.npc_name,
                stop_index: state.current_stop_index,
                drink_crafted: completion.drink_crafted,
                ingredients_used: completion.ingredients_used,
                crafted_at: completion.crafted_at,
            });
            if is_complete(&state) {
                state.status = AdventureStatus::Completed;
            }
        }
        AdventureAction::AdvanceToNextStop => {
            if state.current_stop_index < state.stop_count() {
                state.current_stop_index += 1;
            }
        }
        AdventureAction::SetStatus(status) => {
            debug!("Adventure status {} -> {status}", state.status);
            state.status = status;
        }
        AdventureAction::ClearError => state.error = None,
        AdventureAction::Reset => return AdventureState::default(),
    }
    state
}
