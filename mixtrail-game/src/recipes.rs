//! Cocktail recipes and the bundled catalog used when no recipe service is
//! reachable.

use log::error;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::inventory::same_ingredient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,
}

impl RecipeIngredient {
    #[must_use]
    pub fn new(name: impl Into<String>, measure: Option<&str>) -> Self {
        Self {
            name: name.into(),
            measure: measure.map(str::to_string),
        }
    }
}

/// A drink and everything needed to make it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub alcoholic: String,
    #[serde(default)]
    pub glass: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub image: String,
    pub ingredients: Vec<RecipeIngredient>,
}

impl Recipe {
    pub fn ingredient_names(&self) -> impl Iterator<Item = &str> {
        self.ingredients.iter().map(|ingredient| ingredient.name.as_str())
    }

    #[must_use]
    pub fn uses(&self, ingredient: &str) -> bool {
        self.ingredient_names().any(|name| same_ingredient(name, ingredient))
    }
}

/// In-memory recipe collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RecipeCatalog {
    pub recipes: Vec<Recipe>,
}

impl RecipeCatalog {
    /// Parse a catalog document.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON, duplicate ids, or recipes without
    /// ingredients.
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        let catalog: Self = serde_json::from_str(json_str)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (index, recipe) in self.recipes.iter().enumerate() {
            if recipe.ingredients.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "recipe {} has no ingredients",
                    recipe.id
                )));
            }
            if self.recipes[..index].iter().any(|other| other.id == recipe.id) {
                return Err(ConfigError::Invalid(format!("duplicate recipe id {}", recipe.id)));
            }
        }
        Ok(())
    }

    /// The bundled catalog.
    #[must_use]
    pub fn default_catalog() -> Self {
        Self::from_json(include_str!("../assets/data/recipes.json")).unwrap_or_else(|err| {
            error!("Bundled recipe catalog is unusable: {err}");
            Self::default()
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Recipes whose name contains `query`, ignoring case.
    #[must_use]
    pub fn search_by_name(&self, query: &str) -> Vec<Recipe> {
        let needle = query.trim().to_lowercase();
        self.recipes
            .iter()
            .filter(|recipe| recipe.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Recipes using exactly the named ingredient, ignoring case.
    #[must_use]
    pub fn search_by_ingredient(&self, ingredient: &str) -> Vec<Recipe> {
        self.recipes
            .iter()
            .filter(|recipe| recipe.uses(ingredient))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn search_by_category(&self, category: &str) -> Vec<Recipe> {
        self.recipes
            .iter()
            .filter(|recipe| recipe.category.eq_ignore_ascii_case(category.trim()))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id == id)
    }

    /// Categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for recipe in &self.recipes {
            if !recipe.category.is_empty() && !categories.contains(&recipe.category) {
                categories.push(recipe.category.clone());
            }
        }
        categories
    }
}
