//! Craft eligibility and the transient crafting session.
//!
//! Possession is binary: a recipe is craftable when every ingredient name is
//! held, compared case-insensitively with no partial matching.

use serde::{Deserialize, Serialize};

use crate::adventure::NpcCompletion;
use crate::error::AdventureError;
use crate::inventory::{Inventory, same_ingredient};
use crate::npc::Npc;
use crate::recipes::{Recipe, RecipeIngredient};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientCheck {
    pub name: String,
    pub measure: Option<String>,
    pub held: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftEligibility {
    pub ingredients: Vec<IngredientCheck>,
    pub craftable: bool,
}

impl CraftEligibility {
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.ingredients
            .iter()
            .filter(|check| !check.held)
            .map(|check| check.name.as_str())
    }

    pub fn held(&self) -> impl Iterator<Item = &str> {
        self.ingredients
            .iter()
            .filter(|check| check.held)
            .map(|check| check.name.as_str())
    }
}

/// Check each ingredient against the inventory.
#[must_use]
pub fn check_ingredients(ingredients: &[RecipeIngredient], inventory: &Inventory) -> CraftEligibility {
    let ingredients: Vec<IngredientCheck> = ingredients
        .iter()
        .map(|ingredient| IngredientCheck {
            name: ingredient.name.clone(),
            measure: ingredient.measure.clone(),
            held: inventory.contains(&ingredient.name),
        })
        .collect();
    let craftable = ingredients.iter().all(|check| check.held);
    CraftEligibility {
        ingredients,
        craftable,
    }
}

#[must_use]
pub fn check_recipe(recipe: &Recipe, inventory: &Inventory) -> CraftEligibility {
    check_ingredients(&recipe.ingredients, inventory)
}

/// How well a recipe lines up with what an NPC asked for. Advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementMatch {
    pub matched: Vec<String>,
    pub unmet: Vec<String>,
}

impl RequirementMatch {
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.unmet.is_empty()
    }
}

#[must_use]
pub fn requirement_match(recipe: &Recipe, npc: &Npc) -> RequirementMatch {
    let (matched, unmet): (Vec<String>, Vec<String>) = npc
        .current_requirements
        .iter()
        .cloned()
        .partition(|wanted| recipe.uses(wanted));
    RequirementMatch { matched, unmet }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CraftingSession {
    pub is_crafting_for_npc: bool,
    pub current_npc_id: Option<String>,
    pub current_npc_name: Option<String>,
    pub selected_drink_id: Option<String>,
    pub selected_drink_name: Option<String>,
    pub ingredients_used: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CraftingAction {
    StartCraftingForNpc { npc_id: String, npc_name: String },
    SelectDrink {
        drink_id: String,
        drink_name: String,
        ingredients: Vec<String>,
    },
    CompleteCrafting,
    ResetCrafting,
}

#[must_use]
pub fn reduce(mut session: CraftingSession, action: CraftingAction) -> CraftingSession {
    match action {
        CraftingAction::StartCraftingForNpc { npc_id, npc_name } => {
            session.is_crafting_for_npc = true;
            session.current_npc_id = Some(npc_id);
            session.current_npc_name = Some(npc_name);
        }
        CraftingAction::SelectDrink {
            drink_id,
            drink_name,
            ingredients,
        } => {
            session.selected_drink_id = Some(drink_id);
            session.selected_drink_name = Some(drink_name);
            session.ingredients_used = ingredients;
        }
        CraftingAction::CompleteCrafting | CraftingAction::ResetCrafting => {
            return CraftingSession::default();
        }
    }
    session
}

/// Side effects of a confirmed craft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CraftOutcome {
    pub drink: String,
    /// Distinct inventory names to remove, in recipe order.
    pub consumed: Vec<String>,
    /// Present when the craft serves an NPC.
    pub completion: Option<NpcCompletion>,
}

/// Work out what a craft does without applying it.
///
/// # Errors
///
/// Returns [`AdventureError::NotCraftable`] listing missing ingredients.
pub fn plan_craft(
    recipe: &Recipe,
    inventory: &Inventory,
    session: &CraftingSession,
    crafted_at: i64,
) -> Result<CraftOutcome, AdventureError> {
    let eligibility = check_recipe(recipe, inventory);
    if !eligibility.craftable {
        return Err(AdventureError::NotCraftable {
            missing: eligibility.missing().map(str::to_string).collect(),
        });
    }

    let mut consumed: Vec<String> = Vec::new();
    for name in eligibility.held() {
        if !consumed.iter().any(|seen| same_ingredient(seen, name)) {
            consumed.push(name.to_string());
        }
    }

    let completion = match (
        session.is_crafting_for_npc,
        &session.current_npc_id,
        &session.current_npc_name,
    ) {
        (true, Some(npc_id), Some(npc_name)) => Some(NpcCompletion {
            npc_id: npc_id.clone(),
            npc_name: npc_name.clone(),
            drink_crafted: recipe.name.clone(),
            ingredients_used: recipe.ingredient_names().map(str::to_string).collect(),
            crafted_at,
        }),
        _ => None,
    };

    Ok(CraftOutcome {
        drink: recipe.name.clone(),
        consumed,
        completion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(names: &[&str]) -> Recipe {
        Recipe {
            id: "r1".into(),
            name: "Test Sour".into(),
            category: "Cocktail".into(),
            alcoholic: "Alcoholic".into(),
            glass: "Coupe".into(),
            instructions: String::new(),
            image: String::new(),
            ingredients: names
                .iter()
                .map(|name| RecipeIngredient::new(*name, Some("1 oz")))
                .collect(),
        }
    }

    #[test]
    fn missing_sugar_blocks_craft() {
        let inventory = Inventory::from_names(["Rum", "Lime Juice"]);
        let eligibility = check_recipe(&recipe(&["rum", "Lime Juice", "Sugar"]), &inventory);
        assert!(!eligibility.craftable);
        assert_eq!(eligibility.missing().collect::<Vec<_>>(), ["Sugar"]);
        assert!(eligibility.ingredients[0].held);
    }

    #[test]
    fn no_partial_matching() {
        let inventory = Inventory::from_names(["Lime"]);
        assert!(!check_recipe(&recipe(&["Lime Juice"]), &inventory).craftable);
    }

    #[test]
    fn plan_consumes_distinct_names_only() {
        let inventory = Inventory::from_names(["Rum", "Lime Juice"]);
        let outcome = plan_craft(
            &recipe(&["Rum", "lime juice", "RUM"]),
            &inventory,
            &CraftingSession::default(),
            5,
        )
        .unwrap();
        assert_eq!(outcome.consumed, ["Rum", "lime juice"]);
        assert!(outcome.completion.is_none());
    }

    #[test]
    fn plan_for_npc_emits_completion() {
        let inventory = Inventory::from_names(["Gin", "Honey", "Lemon Juice"]);
        let session = reduce(
            CraftingSession::default(),
            CraftingAction::StartCraftingForNpc {
                npc_id: "Emma-1".into(),
                npc_name: "Emma".into(),
            },
        );
        let outcome = plan_craft(&recipe(&["Gin", "Honey", "Lemon Juice"]), &inventory, &session, 42)
            .unwrap();
        let completion = outcome.completion.unwrap();
        assert_eq!(completion.npc_id, "Emma-1");
        assert_eq!(completion.drink_crafted, "Test Sour");
        assert_eq!(completion.ingredients_used, ["Gin", "Honey", "Lemon Juice"]);
        assert_eq!(completion.crafted_at, 42);
    }

    #[test]
    fn uncraftable_plan_lists_missing() {
        let err = plan_craft(
            &recipe(&["Gin", "Olive"]),
            &Inventory::from_names(["gin"]),
            &CraftingSession::default(),
            0,
        )
        .unwrap_err();
        assert_eq!(
            err,
            AdventureError::NotCraftable {
                missing: vec!["Olive".into()]
            }
        );
    }

    #[test]
    fn session_resets_on_completion() {
        let session = reduce(
            CraftingSession::default(),
            CraftingAction::SelectDrink {
                drink_id: "1".into(),
                drink_name: "Daiquiri".into(),
                ingredients: vec!["Rum".into()],
            },
        );
        assert_eq!(session.selected_drink_name.as_deref(), Some("Daiquiri"));
        assert_eq!(
            reduce(session, CraftingAction::CompleteCrafting),
            CraftingSession::default()
        );
    }
}
