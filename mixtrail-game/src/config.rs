//! Adventure tuning: stop count, starting pantry, and the NPC name and
//! ingredient pools.
//!
//! Built-in defaults cover everything; hosts may override any field with a
//! JSON document.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use crate::route::DEFAULT_STOP_COUNT;

/// Ingredients every new player starts with.
pub const STARTER_INVENTORY: [&str; 19] = [
    "Rum",
    "Gin",
    "Tequila",
    "Whiskey",
    "Vodka",
    "Lime Juice",
    "Lemon Juice",
    "Orange Juice",
    "Simple Syrup",
    "Sugar",
    "Honey",
    "Agave Syrup",
    "Fresh Mint",
    "Fresh Basil",
    "Bitters",
    "Vermouth",
    "Olive",
    "Lemon Peel",
    "Orange Peel",
];

/// Vocabulary NPC requirements are drawn from.
pub const BASE_INGREDIENTS: [&str; 19] = [
    "Rum",
    "Gin",
    "Vodka",
    "Tequila",
    "Whiskey",
    "Lime Juice",
    "Lemon Juice",
    "Orange Juice",
    "Cranberry Juice",
    "Pineapple Juice",
    "Grenadine Syrup",
    "Simple Syrup",
    "Mint",
    "Basil",
    "Vermouth",
    "Cointreau",
    "Angostura Bitters",
    "Lime Peel",
    "Orange Peel",
];

/// Traveler names paired with their backstories.
pub const NPC_PROFILES: [(&str, &str); 15] = [
    ("Marcus", "A seasoned traveler who loves exploring new cities"),
    ("Sofia", "A fashionable artist visiting the region"),
    ("James", "A businessman passing through on a trip"),
    ("Elena", "A local historian passionate about culture"),
    ("Samuel", "An adventurous chef searching for inspirations"),
    ("Isabella", "A romantic poet looking for muse"),
    ("Lucas", "A photography enthusiast capturing memories"),
    ("Olivia", "A student backpacking across Europe"),
    ("Gabriel", "A musician on tour between cities"),
    ("Emma", "A writer researching for her novel"),
    ("Vincent", "A retired sailor with stories to tell"),
    ("Charlotte", "A fashion designer on business"),
    ("Alexander", "A food critic evaluating local cuisine"),
    ("Amelia", "A nature photographer exploring landscapes"),
    ("Sebastian", "A student traveling on a budget"),
];

/// Backstory used for names without one.
pub const FALLBACK_DESCRIPTION: &str = "A curious traveler";

const MAX_STOP_COUNT: usize = 25;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How NPCs are generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcConfig {
    pub names: Vec<String>,
    pub descriptions: BTreeMap<String, String>,
    pub fallback_description: String,
    pub base_ingredients: Vec<String>,
    pub min_requirements: usize,
    pub max_requirements: usize,
}

impl Default for NpcConfig {
    fn default() -> Self {
        Self {
            names: NPC_PROFILES.iter().map(|(name, _)| (*name).to_string()).collect(),
            descriptions: NPC_PROFILES
                .iter()
                .map(|(name, desc)| ((*name).to_string(), (*desc).to_string()))
                .collect(),
            fallback_description: FALLBACK_DESCRIPTION.to_string(),
            base_ingredients: BASE_INGREDIENTS.iter().map(|s| (*s).to_string()).collect(),
            min_requirements: 3,
            max_requirements: 5,
        }
    }
}

impl NpcConfig {
    /// Backstory for a name, or the fallback.
    #[must_use]
    pub fn description_for(&self, name: &str) -> &str {
        self.descriptions
            .get(name)
            .map_or(self.fallback_description.as_str(), String::as_str)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.names.is_empty() {
            return Err(ConfigError::Invalid("npc.names must not be empty".into()));
        }
        if self.min_requirements == 0 || self.min_requirements > self.max_requirements {
            return Err(ConfigError::Invalid(format!(
                "npc requirement range {}..={} is empty",
                self.min_requirements, self.max_requirements
            )));
        }
        let distinct: HashSet<_> = self.base_ingredients.iter().collect();
        if distinct.len() < self.max_requirements {
            return Err(ConfigError::Invalid(format!(
                "npc.base_ingredients has {} distinct entries, need at least {}",
                distinct.len(),
                self.max_requirements
            )));
        }
        Ok(())
    }
}

/// Top-level adventure configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdventureConfig {
    pub stop_count: usize,
    pub starter_inventory: Vec<String>,
    pub npc: NpcConfig,
}

impl Default for AdventureConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl AdventureConfig {
    /// Built-in configuration.
    #[must_use]
    pub fn default_config() -> Self {
        Self {
            stop_count: DEFAULT_STOP_COUNT,
            starter_inventory: STARTER_INVENTORY.iter().map(|s| (*s).to_string()).collect(),
            npc: NpcConfig::default(),
        }
    }

    /// Parse and validate a JSON override. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the JSON is malformed or the values are unusable.
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration can drive an adventure.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stop_count == 0 || self.stop_count > MAX_STOP_COUNT {
            return Err(ConfigError::Invalid(format!(
                "stop_count must be between 1 and {MAX_STOP_COUNT}, got {}",
                self.stop_count
            )));
        }
        self.npc.validate()
    }
}
