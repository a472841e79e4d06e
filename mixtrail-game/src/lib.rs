//! Mixtrail Game Engine
//!
//! Platform-agnostic core for the Mixtrail cocktail road trip: weather-driven
//! NPC moods, card-drawn ingredients, route stops, and craft eligibility.
//! Network collaborators are traits in [`services`]; this crate performs no
//! I/O of its own.

pub mod adventure;
pub mod cards;
pub mod config;
pub mod crafting;
pub mod error;
pub mod inventory;
pub mod npc;
pub mod numbers;
pub mod offline;
pub mod recipes;
pub mod rng;
pub mod route;
pub mod services;
pub mod session;
pub mod store;
pub mod summary;
pub mod weather;

// Re-export commonly used types
pub use adventure::{
    AdventureAction, AdventureState, AdventureStatus, CompletedNpcRecord, NpcCompletion,
    is_complete,
};
pub use cards::{
    Card, CardDetails, DrawnCard, Suit, card_details, card_to_ingredient, create_deck,
    draw_ingredient, draw_with_reshuffle, ingredient_for_code,
};
pub use config::{AdventureConfig, ConfigError, NpcConfig};
pub use crafting::{
    CraftEligibility, CraftOutcome, CraftingAction, CraftingSession, IngredientCheck,
    RequirementMatch, check_ingredients, check_recipe, plan_craft, requirement_match,
};
pub use error::AdventureError;
pub use inventory::{GameAction, GameState, GameStatus, Inventory};
pub use npc::{Npc, NpcAction, NpcRequest, NpcState, NpcStatus, generate_npc};
pub use offline::{
    Gazetteer, ManualClock, OfflineDealer, OfflineRecipeBook, OfflineServices, ScriptedWeather,
    StraightLineRouter, WeatherScript,
};
pub use recipes::{Recipe, RecipeCatalog, RecipeIngredient};
pub use rng::RngBundle;
pub use route::{Coordinate, DEFAULT_STOP_COUNT, RouteData, RoutePath, plan_route, stop_indices};
pub use services::{
    CardDealer, Clock, GeocodingService, RecipeBook, RoutingService, ServiceError, Services,
    SystemClock, WeatherService,
};
pub use session::{AdventureSession, Arrival, WeatherSource, weather_or_neutral};
pub use store::{RequestTicket, RootAction, RootState, Store};
pub use summary::{AdventureSummary, ServedDrink, summarize};
pub use weather::{
    MoodCategory, WeatherData, WeatherMoodModifier, apply_modifier_to_ingredients,
    calculate_mood_modifier,
};
