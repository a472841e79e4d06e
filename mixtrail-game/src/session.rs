//! Adventure session: wires collaborators, RNG streams and the store
//! together behind player-level operations.

use log::{debug, info, warn};

use crate::adventure::{self, AdventureAction, AdventureStatus};
use crate::cards::{self, DrawnCard};
use crate::config::AdventureConfig;
use crate::crafting::{self, CraftEligibility, CraftOutcome, CraftingAction};
use crate::error::AdventureError;
use crate::inventory::{GameAction, Inventory};
use crate::npc::{self, Npc, NpcAction, NpcRequest};
use crate::recipes::Recipe;
use crate::rng::RngBundle;
use crate::route::{self, Coordinate};
use crate::services::{Clock, ServiceError, Services, SystemClock, WeatherService};
use crate::store::{RequestTicket, RootAction, RootState, Store};
use crate::summary::{AdventureSummary, summarize};
use crate::weather::WeatherData;

/// Where an NPC's weather came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeatherSource {
    Live,
    /// The lookup failed and neutral conditions were substituted.
    Degraded(ServiceError),
}

impl WeatherSource {
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

/// Result of arriving at a stop.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrival {
    pub stop_index: usize,
    pub stop_name: String,
    pub npc: Npc,
    pub weather_source: WeatherSource,
}

/// Current weather, or neutral conditions when the lookup fails.
pub async fn weather_or_neutral<W>(service: &W, latitude: f64, longitude: f64) -> (WeatherData, WeatherSource)
where
    W: WeatherService + ?Sized,
{
    match service.get_weather(latitude, longitude).await {
        Ok(weather) => (weather, WeatherSource::Live),
        Err(err) => {
            warn!("Weather lookup degraded at {latitude:.4}, {longitude:.4}: {err}");
            (WeatherData::neutral(), WeatherSource::Degraded(err))
        }
    }
}

/// One player's adventure.
pub struct AdventureSession<S, C = SystemClock> {
    services: S,
    clock: C,
    config: AdventureConfig,
    rng: RngBundle,
    store: Store,
}

impl<S: Services> AdventureSession<S> {
    /// Session on the wall clock.
    #[must_use]
    pub fn with_system_clock(services: S, config: AdventureConfig, seed: u64) -> Self {
        Self::new(services, SystemClock, config, seed)
    }
}

impl<S: Services, C: Clock> AdventureSession<S, C> {
    #[must_use]
    pub fn new(services: S, clock: C, config: AdventureConfig, seed: u64) -> Self {
        let inventory = Inventory::from_names(&config.starter_inventory);
        Self {
            services,
            clock,
            config,
            rng: RngBundle::from_user_seed(seed),
            store: Store::new(RootState::with_inventory(inventory)),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &RootState {
        self.store.state()
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// Direct store access for hosts that dispatch their own actions.
    pub const fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    #[must_use]
    pub const fn services(&self) -> &S {
        &self.services
    }

    #[must_use]
    pub const fn config(&self) -> &AdventureConfig {
        &self.config
    }

    #[must_use]
    pub const fn rng(&self) -> &RngBundle {
        &self.rng
    }

    /// Candidate coordinates for a typed location.
    ///
    /// # Errors
    ///
    /// Returns [`AdventureError::Geocoding`] when the lookup fails.
    pub async fn search_locations(&self, query: &str) -> Result<Vec<Coordinate>, AdventureError> {
        route::search_locations(self.services.geocoder(), query).await
    }

    pub fn set_start_location(&mut self, location: Coordinate) {
        self.store.dispatch(AdventureAction::SetStartLocation(location));
    }

    pub fn set_end_location(&mut self, location: Coordinate) {
        self.store.dispatch(AdventureAction::SetEndLocation(location));
    }

    /// Open a deck and plan the route; on success the adventure is active.
    ///
    /// `num_stops` falls back to the configured stop count.
    ///
    /// # Errors
    ///
    /// Returns [`AdventureError::MissingLocations`] or
    /// [`AdventureError::AlreadyStarted`] without changing state. Deck or
    /// route failures return the adventure to idle with the error recorded.
    pub async fn start_adventure(&mut self, num_stops: Option<usize>) -> Result<(), AdventureError> {
        let adventure = &self.store.state().adventure;
        let (Some(start), Some(end)) = (
            adventure.start_location.clone(),
            adventure.end_location.clone(),
        ) else {
            return Err(AdventureError::MissingLocations);
        };
        if adventure.status != AdventureStatus::Idle {
            return Err(AdventureError::AlreadyStarted {
                status: adventure.status,
            });
        }
        let stops = num_stops.unwrap_or(self.config.stop_count);

        let ticket = self.store.ticket();
        self.store.dispatch(AdventureAction::BeginPlanning);

        let deck_id = match cards::create_deck(self.services.dealer()).await {
            Ok(deck_id) => deck_id,
            Err(err) => return Err(self.fail_planning(ticket, err)),
        };
        let route = match route::plan_route(
            self.services.router(),
            self.services.geocoder(),
            &start,
            &end,
            stops,
        )
        .await
        {
            Ok(route) => route,
            Err(err) => return Err(self.fail_planning(ticket, err)),
        };

        info!(
            "Adventure {} -> {}: {} stops, deck {deck_id}",
            start.display_name(),
            end.display_name(),
            route.stop_count()
        );
        self.store
            .dispatch_if_current(ticket, AdventureAction::SetDeckId(deck_id))?;
        self.store
            .dispatch_if_current(ticket, AdventureAction::SetRouteData(route))?;
        self.store.dispatch(GameAction::StartGame);
        Ok(())
    }

    fn fail_planning(&mut self, ticket: RequestTicket, err: AdventureError) -> AdventureError {
        warn!("Adventure planning failed: {err}");
        if self
            .store
            .dispatch_if_current(ticket, AdventureAction::PlanningFailed(err.planning_message()))
            .is_err()
        {
            return AdventureError::Stale;
        }
        err
    }

    fn require_active(&self) -> Result<(), AdventureError> {
        let status = self.store.state().adventure.status;
        if status == AdventureStatus::Active {
            Ok(())
        } else {
            Err(AdventureError::NotActive { status })
        }
    }

    /// Look up the weather at the current stop and generate its NPC.
    ///
    /// A failed weather lookup degrades to neutral conditions.
    ///
    /// # Errors
    ///
    /// Returns [`AdventureError::NotActive`] outside an active adventure and
    /// [`AdventureError::NoStopsRemaining`] past the last stop.
    pub async fn arrive_at_current_stop(&mut self) -> Result<Arrival, AdventureError> {
        self.require_active()?;
        let adventure = &self.store.state().adventure;
        let stop_index = adventure.current_stop_index;
        let stop = adventure
            .current_stop()
            .cloned()
            .ok_or(AdventureError::NoStopsRemaining)?;

        let ticket = self.store.ticket();
        self.store.dispatch(NpcAction::Loading);
        let (weather, weather_source) =
            weather_or_neutral(self.services.weather(), stop.latitude, stop.longitude).await;

        let stop_name = stop.display_name();
        let npc = {
            let request = NpcRequest {
                weather: &weather,
                location_name: &stop_name,
                held_ingredients: self.store.state().game.inventory.as_slice(),
                timestamp: self.clock.now_millis(),
            };
            npc::generate_npc(&request, &self.config.npc, &mut *self.rng.npc())
        };
        info!(
            "Stop {} ({stop_name}): {} is {} and wants {}",
            stop_index + 1,
            npc.name,
            npc.mood_category,
            npc.current_requirements.join(", ")
        );
        self.store
            .dispatch_if_current(ticket, NpcAction::SetCurrentNpc(npc.clone()))?;

        Ok(Arrival {
            stop_index,
            stop_name,
            npc,
            weather_source,
        })
    }

    /// Draw a card and add its ingredient to the inventory.
    ///
    /// # Errors
    ///
    /// Returns [`AdventureError::NoDeck`] before a deck is dealt and
    /// [`AdventureError::Draw`] when drawing fails after the single reshuffle.
    pub async fn draw_card(&mut self) -> Result<DrawnCard, AdventureError> {
        let deck_id = self
            .store
            .state()
            .adventure
            .deck_id
            .clone()
            .ok_or(AdventureError::NoDeck)?;
        let ticket = self.store.ticket();
        let drawn = cards::draw_ingredient(self.services.dealer(), &deck_id, &self.clock).await?;
        self.store
            .dispatch_if_current(ticket, AdventureAction::AddDrawnCard(drawn.clone()))?;
        self.store
            .dispatch(GameAction::AddIngredient(drawn.ingredient.clone()));
        Ok(drawn)
    }

    /// Begin crafting for the NPC at the current stop.
    ///
    /// # Errors
    ///
    /// Returns [`AdventureError::NotActive`], [`AdventureError::AlreadyServed`]
    /// once this stop has a completion record, or
    /// [`AdventureError::NoCurrentNpc`].
    pub fn serve_current_npc(&mut self) -> Result<(), AdventureError> {
        self.require_active()?;
        let state = self.store.state();
        if state.adventure.current_stop_served() {
            return Err(AdventureError::AlreadyServed {
                stop_index: state.adventure.current_stop_index,
            });
        }
        let npc = state
            .npc
            .current
            .as_ref()
            .ok_or(AdventureError::NoCurrentNpc)?;
        let action = CraftingAction::StartCraftingForNpc {
            npc_id: npc.id.clone(),
            npc_name: npc.name.clone(),
        };
        self.store.dispatch(action);
        Ok(())
    }

    #[must_use]
    pub fn check_recipe(&self, recipe: &Recipe) -> CraftEligibility {
        crafting::check_recipe(recipe, &self.store.state().game.inventory)
    }

    /// Craft a drink, consuming its ingredients. When serving an NPC the
    /// stop is recorded as completed.
    ///
    /// # Errors
    ///
    /// Returns [`AdventureError::NotCraftable`] listing what is missing, or
    /// [`AdventureError::NotActive`] when serving an NPC outside an active
    /// adventure.
    pub fn craft(&mut self, recipe: &Recipe) -> Result<CraftOutcome, AdventureError> {
        if self.store.state().crafting.is_crafting_for_npc {
            self.require_active()?;
        }
        let state = self.store.state();
        let outcome = crafting::plan_craft(
            recipe,
            &state.game.inventory,
            &state.crafting,
            self.clock.now_millis(),
        )?;
        self.store.dispatch(CraftingAction::SelectDrink {
            drink_id: recipe.id.clone(),
            drink_name: recipe.name.clone(),
            ingredients: recipe.ingredient_names().map(str::to_string).collect(),
        });
        debug!("Crafted {} using {}", outcome.drink, outcome.consumed.join(", "));
        self.store.dispatch(RootAction::ApplyCraft(outcome.clone()));
        Ok(outcome)
    }

    /// Move on to the next stop. Returns the new stop index.
    pub fn advance_to_next_stop(&mut self) -> usize {
        self.store.dispatch(AdventureAction::AdvanceToNextStop);
        self.store.dispatch(NpcAction::ClearCurrentNpc);
        self.store.state().adventure.current_stop_index
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        adventure::is_complete(&self.store.state().adventure)
    }

    #[must_use]
    pub fn summary(&self) -> AdventureSummary {
        summarize(self.store.state())
    }

    /// Abandon the adventure. Responses still in flight are discarded.
    pub fn reset(&mut self) {
        self.store.dispatch(RootAction::NewAdventure);
    }
}
