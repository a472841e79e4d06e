//! Ports to the outside world: weather, geocoding, routing, card dealing,
//! recipe lookup, and time.
//!
//! The core never talks to a network directly. Hosts (the browser shell, the
//! tester, unit tests) provide implementations of these traits. All futures
//! are `?Send` because the game runs on a single-threaded event loop.

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

use crate::cards::Card;
use crate::recipes::Recipe;
use crate::route::{Coordinate, RoutePath};
use crate::weather::WeatherData;

/// Upper bound on cards requested in a single multi-draw.
pub const MAX_CARDS_PER_DRAW: usize = 52;

/// Failure reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Service rejected the request: {0}")]
    Rejected(String),
    #[error("Deck {deck_id} has no cards remaining")]
    DeckEmpty { deck_id: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ServiceError {
    /// Whether a failed draw means the deck ran out rather than broke.
    #[must_use]
    pub const fn is_deck_empty(&self) -> bool {
        matches!(self, Self::DeckEmpty { .. })
    }
}

/// Current-conditions weather lookup.
#[async_trait(?Send)]
pub trait WeatherService {
    /// Fetch the weather at a coordinate.
    ///
    /// # Errors
    ///
    /// Returns an error when the provider cannot be reached or answers badly.
    /// Callers degrade to [`WeatherData::neutral`] instead of propagating.
    async fn get_weather(&self, latitude: f64, longitude: f64)
    -> Result<WeatherData, ServiceError>;
}

/// Forward and reverse geocoding.
#[async_trait(?Send)]
pub trait GeocodingService {
    /// Resolve a free-text query into ranked candidate coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error when the lookup fails.
    async fn geocode_location(&self, query: &str) -> Result<Vec<Coordinate>, ServiceError>;

    /// Best-effort place name for a coordinate.
    ///
    /// # Errors
    ///
    /// Returns an error when no name can be resolved; callers fall back to
    /// coordinate text.
    async fn reverse_geocode(&self, latitude: f64, longitude: f64)
    -> Result<String, ServiceError>;
}

/// Driving directions between two points.
#[async_trait(?Send)]
pub trait RoutingService {
    /// Compute a driving path from `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns an error when no route is available. There is no fallback.
    async fn get_route(
        &self,
        start: &Coordinate,
        end: &Coordinate,
    ) -> Result<RoutePath, ServiceError>;
}

/// Remote 52-card deck sessions.
#[async_trait(?Send)]
pub trait CardDealer {
    /// Open a freshly shuffled deck and return its id.
    ///
    /// # Errors
    ///
    /// Returns an error when the dealer refuses or cannot be reached.
    async fn create_deck(&self) -> Result<String, ServiceError>;

    /// Draw a single card.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::DeckEmpty`] when the deck is exhausted and other
    /// variants for transport failures.
    async fn draw_card(&self, deck_id: &str) -> Result<Card, ServiceError>;

    /// Return every drawn card to the deck and shuffle.
    ///
    /// # Errors
    ///
    /// Returns an error when the dealer cannot reshuffle.
    async fn reshuffle_deck(&self, deck_id: &str) -> Result<(), ServiceError>;

    /// Draw up to `count` cards (capped at [`MAX_CARDS_PER_DRAW`]).
    ///
    /// Stops early when the deck runs out after at least one card was drawn.
    ///
    /// # Errors
    ///
    /// Returns the first draw error when no card could be drawn at all.
    async fn draw_cards(&self, deck_id: &str, count: usize) -> Result<Vec<Card>, ServiceError> {
        let wanted = count.min(MAX_CARDS_PER_DRAW);
        let mut cards = Vec::with_capacity(wanted);
        for _ in 0..wanted {
            match self.draw_card(deck_id).await {
                Ok(card) => cards.push(card),
                Err(err) if err.is_deck_empty() && !cards.is_empty() => break,
                Err(err) => return Err(err),
            }
        }
        Ok(cards)
    }
}

/// Cocktail recipe lookup.
#[async_trait(?Send)]
pub trait RecipeBook {
    /// Recipes whose name contains `query`.
    ///
    /// # Errors
    ///
    /// Returns an error when the lookup fails.
    async fn search_by_name(&self, query: &str) -> Result<Vec<Recipe>, ServiceError>;

    /// Recipes that use the named ingredient.
    ///
    /// # Errors
    ///
    /// Returns an error when the lookup fails.
    async fn search_by_ingredient(&self, ingredient: &str) -> Result<Vec<Recipe>, ServiceError>;

    /// Recipes in a category.
    ///
    /// # Errors
    ///
    /// Returns an error when the lookup fails.
    async fn search_by_category(&self, category: &str) -> Result<Vec<Recipe>, ServiceError>;

    /// Full recipe, including measures.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for unknown ids.
    async fn get_by_id(&self, id: &str) -> Result<Recipe, ServiceError>;

    /// A random recipe.
    ///
    /// # Errors
    ///
    /// Returns an error when the book is empty or unreachable.
    async fn random_recipe(&self) -> Result<Recipe, ServiceError>;

    /// Every known category.
    ///
    /// # Errors
    ///
    /// Returns an error when the lookup fails.
    async fn categories(&self) -> Result<Vec<String>, ServiceError>;
}

/// Time source for timestamps, in milliseconds since the Unix epoch.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

/// Wall clock backed by `chrono`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Bundle of the collaborators an adventure session needs.
pub trait Services {
    type Weather: WeatherService;
    type Geocoder: GeocodingService;
    type Router: RoutingService;
    type Dealer: CardDealer;

    fn weather(&self) -> &Self::Weather;
    fn geocoder(&self) -> &Self::Geocoder;
    fn router(&self) -> &Self::Router;
    fn dealer(&self) -> &Self::Dealer;
}
