//! Error taxonomy surfaced by adventure operations.

use thiserror::Error;

use crate::adventure::AdventureStatus;
use crate::services::ServiceError;

/// Failure of a user-facing adventure operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdventureError {
    #[error("Failed to create a deck: {0}")]
    DeckCreation(ServiceError),
    #[error("Failed to draw a card: {0}")]
    Draw(ServiceError),
    #[error("Failed to calculate route: {0}")]
    RouteCalculation(ServiceError),
    #[error("Failed to look up location: {0}")]
    Geocoding(ServiceError),
    #[error("Both a start and an end location are required")]
    MissingLocations,
    #[error("No deck has been dealt for this adventure")]
    NoDeck,
    #[error("Adventure is {status}, expected active")]
    NotActive { status: AdventureStatus },
    #[error("Adventure already {status}; reset before starting again")]
    AlreadyStarted { status: AdventureStatus },
    #[error("Every stop on this route has been visited")]
    NoStopsRemaining,
    #[error("No traveler is waiting at this stop")]
    NoCurrentNpc,
    #[error("The traveler at stop {} has already been served", stop_index + 1)]
    AlreadyServed { stop_index: usize },
    #[error("Missing ingredients: {}", missing.join(", "))]
    NotCraftable { missing: Vec<String> },
    #[error("Adventure was reset while the request was in flight")]
    Stale,
}

impl AdventureError {
    /// Message stored in the adventure slice when planning fails.
    #[must_use]
    pub fn planning_message(&self) -> String {
        match self {
            Self::RouteCalculation(inner) | Self::DeckCreation(inner) => inner.to_string(),
            other => other.to_string(),
        }
    }
}
