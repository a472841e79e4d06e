//! Ingredient inventory and the game slice that owns it.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::STARTER_INVENTORY;

/// Case-insensitive ingredient name comparison.
#[must_use]
pub fn same_ingredient(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// Set of ingredient names with case-insensitive identity.
///
/// The first spelling added is the one kept.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Inventory {
    items: Vec<String>,
}

impl Inventory {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// The default starting pantry.
    #[must_use]
    pub fn starter() -> Self {
        Self::from_names(STARTER_INVENTORY.iter().copied())
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inventory = Self::new();
        for name in names {
            inventory.add(name.as_ref());
        }
        inventory
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Add an ingredient. Returns `false` if it was already held.
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.items.push(name.to_string());
        true
    }

    /// Remove an ingredient. Returns `false` if it was not held.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|held| same_ingredient(held, name))
    }
}

impl From<Vec<String>> for Inventory {
    fn from(names: Vec<String>) -> Self {
        Self::from_names(names)
    }
}

impl From<Inventory> for Vec<String> {
    fn from(inventory: Inventory) -> Self {
        inventory.items
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.items.join(", "))
    }
}

/// Whether a run is under way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Idle,
    Playing,
    Finished,
}

impl GameStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub status: GameStatus,
    pub inventory: Inventory,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            status: GameStatus::Idle,
            inventory: Inventory::starter(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameAction {
    StartGame,
    FinishGame,
    AddIngredient(String),
    RemoveIngredient(String),
    SetInventory(Inventory),
}

#[must_use]
pub fn reduce(mut state: GameState, action: GameAction) -> GameState {
    match action {
        GameAction::StartGame => state.status = GameStatus::Playing,
        GameAction::FinishGame => state.status = GameStatus::Finished,
        GameAction::AddIngredient(name) => {
            if !state.inventory.add(&name) {
                debug!("Ignoring duplicate ingredient {name}");
            }
        }
        GameAction::RemoveIngredient(name) => {
            state.inventory.remove(&name);
        }
        GameAction::SetInventory(inventory) => state.inventory = inventory,
    }
    state
}
