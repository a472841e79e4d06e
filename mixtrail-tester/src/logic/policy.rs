use mixtrail_game::{Inventory, Npc, Recipe, RecipeCatalog, check_recipe, requirement_match};
use rand::Rng;

/// Scored craftable recipe.
#[derive(Debug, Clone)]
pub struct RecipeChoice<'a> {
    pub recipe: &'a Recipe,
    pub requirement_hits: usize,
}

/// Pick the craftable recipe that covers the most of the NPC's wishes.
///
/// Ties are broken at random so repeated runs explore different drinks.
pub fn choose_recipe<'a, R>(
    catalog: &'a RecipeCatalog,
    inventory: &Inventory,
    npc: Option<&Npc>,
    rng: &mut R,
) -> Option<RecipeChoice<'a>>
where
    R: Rng + ?Sized,
{
    let scored: Vec<RecipeChoice<'a>> = catalog
        .recipes
        .iter()
        .filter(|recipe| check_recipe(recipe, inventory).craftable)
        .map(|recipe| RecipeChoice {
            recipe,
            requirement_hits: npc.map_or(0, |npc| requirement_match(recipe, npc).matched.len()),
        })
        .collect();

    let best = scored.iter().map(|choice| choice.requirement_hits).max()?;
    let top: Vec<&RecipeChoice<'a>> = scored
        .iter()
        .filter(|choice| choice.requirement_hits == best)
        .collect();
    let pick = rng.gen_range(0..top.len());
    Some(top[pick].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixtrail_game::npc::{NpcRequest, generate_npc};
    use mixtrail_game::{NpcConfig, WeatherData};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn nothing_craftable_yields_none() {
        let catalog = RecipeCatalog::default_catalog();
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(choose_recipe(&catalog, &Inventory::new(), None, &mut rng).is_none());
    }

    #[test]
    fn prefers_recipes_matching_requests() {
        let catalog = RecipeCatalog::default_catalog();
        let inventory = Inventory::from_names([
            "Rum", "Lime Juice", "Simple Syrup", "Gin", "Honey", "Lemon Juice",
        ]);
        let weather = WeatherData::neutral();
        let mut npc = generate_npc(
            &NpcRequest {
                weather: &weather,
                location_name: "Dijon",
                held_ingredients: &[],
                timestamp: 0,
            },
            &NpcConfig::default(),
            &mut SmallRng::seed_from_u64(3),
        );
        npc.current_requirements = vec!["Gin".into(), "Honey".into()];

        let mut rng = SmallRng::seed_from_u64(9);
        let choice = choose_recipe(&catalog, &inventory, Some(&npc), &mut rng).unwrap();
        assert_eq!(choice.recipe.name, "Bee's Knees");
        assert_eq!(choice.requirement_hits, 2);
    }
}
