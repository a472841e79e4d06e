//! Weather-shaped travelers met at each stop, and the slice that tracks them.

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::NpcConfig;
use crate::inventory::same_ingredient;
use crate::weather::{
    MoodCategory, WeatherData, apply_modifier_to_ingredients, calculate_mood_modifier,
    raw_mood_score,
};

/// Upper bound on random draws while filling a requirement list.
const MAX_REQUIREMENT_ATTEMPTS: usize = 1_000;

/// A generated traveler waiting for a drink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub base_requirements: Vec<String>,
    pub current_requirements: Vec<String>,
    pub mood_category: MoodCategory,
    pub mood_score: i32,
    pub location_weather: WeatherData,
    pub mood_description: String,
    pub is_generated: bool,
}

/// Inputs for generating one NPC.
#[derive(Debug, Clone, Copy)]
pub struct NpcRequest<'a> {
    pub weather: &'a WeatherData,
    pub location_name: &'a str,
    /// Held ingredients, used only to bias requirements.
    pub held_ingredients: &'a [String],
    pub timestamp: i64,
}

/// Pick a name uniformly from the pool. Repeats across a session are allowed.
pub fn pick_npc_name<'c, R>(config: &'c NpcConfig, rng: &mut R) -> &'c str
where
    R: Rng + ?Sized,
{
    if config.names.is_empty() {
        return "Traveler";
    }
    let index = rng.gen_range(0..config.names.len());
    config.names[index].as_str()
}

/// Draw `min..=max` distinct requirements from the base vocabulary.
///
/// Held ingredients that belong to the vocabulary are listed a second time in
/// the draw pool, so they come up about twice as often.
pub fn generate_base_requirements<R>(
    held: &[String],
    config: &NpcConfig,
    rng: &mut R,
) -> Vec<String>
where
    R: Rng + ?Sized,
{
    let vocabulary = &config.base_ingredients;
    if vocabulary.is_empty() {
        return Vec::new();
    }

    let mut pool: Vec<&str> = vocabulary
        .iter()
        .filter(|base| held.iter().any(|name| same_ingredient(name, base)))
        .map(String::as_str)
        .collect();
    pool.extend(vocabulary.iter().map(String::as_str));

    let mut distinct: Vec<&str> = Vec::new();
    for name in &pool {
        if !distinct.iter().any(|seen| same_ingredient(seen, name)) {
            distinct.push(name);
        }
    }

    let (min, max) = (config.min_requirements, config.max_requirements.max(config.min_requirements));
    let wanted = rng.gen_range(min..=max).min(distinct.len());

    let mut picked: Vec<String> = Vec::with_capacity(wanted);
    let mut attempts = 0;
    while picked.len() < wanted && attempts < MAX_REQUIREMENT_ATTEMPTS {
        attempts += 1;
        let candidate = pool[rng.gen_range(0..pool.len())];
        if !picked.iter().any(|name| same_ingredient(name, candidate)) {
            picked.push(candidate.to_string());
        }
    }
    for name in distinct {
        if picked.len() >= wanted {
            break;
        }
        if !picked.iter().any(|held| same_ingredient(held, name)) {
            picked.push(name.to_string());
        }
    }
    picked
}

/// Build a complete NPC for a stop.
pub fn generate_npc<R>(request: &NpcRequest<'_>, config: &NpcConfig, rng: &mut R) -> Npc
where
    R: Rng + ?Sized,
{
    let name = pick_npc_name(config, rng).to_string();
    let base_requirements = generate_base_requirements(request.held_ingredients, config, rng);
    let modifier = calculate_mood_modifier(request.weather);
    let current_requirements = apply_modifier_to_ingredients(&base_requirements, &modifier);

    let npc = Npc {
        id: format!("{name}-{}", request.timestamp),
        description: format!(
            "{} passing through {}",
            config.description_for(&name),
            request.location_name
        ),
        location: request.location_name.to_string(),
        base_requirements,
        current_requirements,
        mood_category: modifier.overall_mood,
        mood_score: raw_mood_score(request.weather),
        location_weather: request.weather.clone(),
        mood_description: modifier.description,
        is_generated: true,
        name,
    };
    debug!(
        "Generated {} at {} ({}, score {})",
        npc.name, npc.location, npc.mood_category, npc.mood_score
    );
    npc
}

/// Progress of the current NPC request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NpcStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NpcState {
    pub current: Option<Npc>,
    /// Every NPC met this session, oldest first.
    pub generated: Vec<Npc>,
    pub status: NpcStatus,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NpcAction {
    Loading,
    SetStatus(NpcStatus),
    SetCurrentNpc(Npc),
    ClearCurrentNpc,
    SetError(String),
    /// Replace the current NPC's adjusted requirements.
    OverrideRequirements(Vec<String>),
}

#[must_use]
pub fn reduce(mut state: NpcState, action: NpcAction) -> NpcState {
    match action {
        NpcAction::Loading => {
            state.status = NpcStatus::Loading;
            state.error = None;
        }
        NpcAction::SetStatus(status) => state.status = status,
        NpcAction::SetCurrentNpc(npc) => {
            state.generated.push(npc.clone());
            state.current = Some(npc);
            state.status = NpcStatus::Succeeded;
            state.error = None;
        }
        NpcAction::ClearCurrentNpc => {
            state.current = None;
            state.status = NpcStatus::Idle;
        }
        NpcAction::SetError(message) => {
            state.status = NpcStatus::Failed;
            state.error = Some(message);
        }
        NpcAction::OverrideRequirements(requirements) => {
            if let Some(npc) = state.current.as_mut() {
                npc.current_requirements = requirements;
            }
        }
    }
    state
}
