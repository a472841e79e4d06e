//! Deterministic, network-free collaborators.
//!
//! Used by the QA tester and by tests. Every source of randomness is a seeded
//! ChaCha stream so a seed replays the same adventure.

use async_trait::async_trait;
use log::debug;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::cards::{Card, full_deck_codes};
use crate::recipes::{Recipe, RecipeCatalog};
use crate::rng::derive_stream_seed;
use crate::route::{
    Coordinate, RoutePath, haversine_meters, interpolate, path_length_meters,
};
use crate::services::{
    CardDealer, Clock, GeocodingService, RecipeBook, RoutingService, ServiceError, Services,
    WeatherService,
};
use crate::weather::WeatherData;

/// Counters kept by [`OfflineDealer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DealerStats {
    pub decks_created: u32,
    pub draws: u32,
    pub failed_draws: u32,
    pub reshuffles: u32,
}

#[derive(Debug, Default)]
struct DeckState {
    remaining: Vec<String>,
    drawn: Vec<String>,
}

/// In-memory 52-card dealer.
#[derive(Debug)]
pub struct OfflineDealer {
    rng: RefCell<ChaCha20Rng>,
    decks: RefCell<HashMap<String, DeckState>>,
    stats: Cell<DealerStats>,
    reject_new_decks: bool,
}

impl OfflineDealer {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: RefCell::new(ChaCha20Rng::seed_from_u64(derive_stream_seed(seed, b"deck"))),
            decks: RefCell::new(HashMap::new()),
            stats: Cell::new(DealerStats::default()),
            reject_new_decks: false,
        }
    }

    /// A dealer that refuses to open decks.
    #[must_use]
    pub fn refusing(seed: u64) -> Self {
        Self {
            reject_new_decks: true,
            ..Self::new(seed)
        }
    }

    #[must_use]
    pub fn stats(&self) -> DealerStats {
        self.stats.get()
    }

    /// Cards left before the deck reports empty.
    #[must_use]
    pub fn remaining(&self, deck_id: &str) -> Option<usize> {
        self.decks.borrow().get(deck_id).map(|deck| deck.remaining.len())
    }

    fn bump(&self, update: impl FnOnce(&mut DealerStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }
}

#[async_trait(?Send)]
impl CardDealer for OfflineDealer {
    async fn create_deck(&self) -> Result<String, ServiceError> {
        if self.reject_new_decks {
            return Err(ServiceError::Rejected("deck service unavailable".into()));
        }
        let mut remaining = full_deck_codes();
        remaining.shuffle(&mut *self.rng.borrow_mut());
        let id = format!("offline-{:08x}", self.rng.borrow_mut().r#gen::<u32>());
        self.decks.borrow_mut().insert(
            id.clone(),
            DeckState {
                remaining,
                drawn: Vec::new(),
            },
        );
        self.bump(|stats| stats.decks_created += 1);
        Ok(id)
    }

    async fn draw_card(&self, deck_id: &str) -> Result<Card, ServiceError> {
        let mut decks = self.decks.borrow_mut();
        let deck = decks
            .get_mut(deck_id)
            .ok_or_else(|| ServiceError::NotFound(format!("deck {deck_id}")))?;
        match deck.remaining.pop() {
            Some(code) => {
                deck.drawn.push(code.clone());
                self.bump(|stats| stats.draws += 1);
                Ok(Card::from_code(&code))
            }
            None => {
                self.bump(|stats| stats.failed_draws += 1);
                Err(ServiceError::DeckEmpty {
                    deck_id: deck_id.to_string(),
                })
            }
        }
    }

    async fn reshuffle_deck(&self, deck_id: &str) -> Result<(), ServiceError> {
        let mut decks = self.decks.borrow_mut();
        let deck = decks
            .get_mut(deck_id)
            .ok_or_else(|| ServiceError::NotFound(format!("deck {deck_id}")))?;
        let returned = std::mem::take(&mut deck.drawn);
        deck.remaining.extend(returned);
        deck.remaining.shuffle(&mut *self.rng.borrow_mut());
        self.bump(|stats| stats.reshuffles += 1);
        debug!("Reshuffled {deck_id}: {} cards", deck.remaining.len());
        Ok(())
    }
}

/// Router that drives in a straight line at a constant speed.
#[derive(Debug, Clone)]
pub struct StraightLineRouter {
    pub samples: usize,
    pub speed_kmh: f64,
    pub unreachable: bool,
}

impl Default for StraightLineRouter {
    fn default() -> Self {
        Self {
            samples: 200,
            speed_kmh: 80.0,
            unreachable: false,
        }
    }
}

impl StraightLineRouter {
    /// A router that never finds a route.
    #[must_use]
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }
}

#[async_trait(?Send)]
impl RoutingService for StraightLineRouter {
    async fn get_route(
        &self,
        start: &Coordinate,
        end: &Coordinate,
    ) -> Result<RoutePath, ServiceError> {
        if self.unreachable {
            return Err(ServiceError::Rejected("NoRoute".into()));
        }
        let polyline = interpolate(start.lat_lon(), end.lat_lon(), self.samples);
        let distance_meters = path_length_meters(&polyline);
        let meters_per_second = self.speed_kmh.max(1.0) * 1_000.0 / 3_600.0;
        Ok(RoutePath {
            polyline,
            distance_meters,
            duration_seconds: distance_meters / meters_per_second,
        })
    }
}

const GAZETTEER: [(&str, f64, f64); 18] = [
    ("Paris", 48.8566, 2.3522),
    ("Orléans", 47.9030, 1.9093),
    ("Auxerre", 47.7982, 3.5673),
    ("Dijon", 47.3220, 5.0415),
    ("Beaune", 47.0260, 4.8400),
    ("Chalon-sur-Saône", 46.7806, 4.8539),
    ("Mâcon", 46.3069, 4.8287),
    ("Lyon", 45.7640, 4.8357),
    ("Vienne", 45.5256, 4.8744),
    ("Valence", 44.9334, 4.8924),
    ("Montélimar", 44.5581, 4.7509),
    ("Orange", 44.1381, 4.8075),
    ("Avignon", 43.9493, 4.8055),
    ("Aix-en-Provence", 43.5297, 5.4474),
    ("Marseille", 43.2965, 5.3698),
    ("Grenoble", 45.1885, 5.7245),
    ("Clermont-Ferrand", 45.7772, 3.0870),
    ("Nice", 43.7102, 7.2620),
];

/// Geocoder over a fixed list of towns.
#[derive(Debug, Clone)]
pub struct Gazetteer {
    places: Vec<Coordinate>,
    /// Reverse lookups further than this from every town fail.
    pub max_reverse_distance_meters: f64,
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self {
            places: GAZETTEER
                .iter()
                .map(|(name, lat, lon)| Coordinate::named(*lat, *lon, *name).with_country("France"))
                .collect(),
            max_reverse_distance_meters: 40_000.0,
        }
    }
}

impl Gazetteer {
    #[must_use]
    pub fn with_places(places: Vec<Coordinate>) -> Self {
        Self {
            places,
            ..Self::default()
        }
    }

    /// Exact (case-insensitive) lookup by name.
    #[must_use]
    pub fn place(&self, name: &str) -> Option<&Coordinate> {
        self.places.iter().find(|place| {
            place
                .name
                .as_deref()
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name.trim()))
        })
    }
}

#[async_trait(?Send)]
impl GeocodingService for Gazetteer {
    async fn geocode_location(&self, query: &str) -> Result<Vec<Coordinate>, ServiceError> {
        let needle = query.trim().to_lowercase();
        let mut hits: Vec<Coordinate> = self
            .places
            .iter()
            .filter(|place| {
                place
                    .name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        hits.sort_by_key(|place| {
            !place
                .name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().starts_with(&needle))
        });
        Ok(hits)
    }

    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<String, ServiceError> {
        let here = (latitude, longitude);
        self.places
            .iter()
            .map(|place| (place, haversine_meters(here, place.lat_lon())))
            .filter(|(_, distance)| *distance <= self.max_reverse_distance_meters)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .and_then(|(place, _)| place.name.clone())
            .ok_or_else(|| ServiceError::NotFound(format!("no town near {latitude:.4}, {longitude:.4}")))
    }
}

/// Source of conditions for [`ScriptedWeather`].
#[derive(Debug, Clone)]
pub enum WeatherScript {
    /// The same observation everywhere.
    Fixed(WeatherData),
    /// Observations in order, repeating.
    Cycle(Vec<WeatherData>),
    /// Plausible random conditions from a seeded stream.
    Seeded(u64),
    /// Every lookup fails.
    Offline,
}

/// Weather service replaying a script.
#[derive(Debug)]
pub struct ScriptedWeather {
    script: WeatherScript,
    rng: RefCell<ChaCha20Rng>,
    lookups: Cell<usize>,
}

impl ScriptedWeather {
    #[must_use]
    pub fn new(script: WeatherScript) -> Self {
        let seed = match &script {
            WeatherScript::Seeded(seed) => *seed,
            _ => 0,
        };
        Self {
            script,
            rng: RefCell::new(ChaCha20Rng::seed_from_u64(derive_stream_seed(seed, b"weather"))),
            lookups: Cell::new(0),
        }
    }

    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }

    fn random_conditions(&self) -> WeatherData {
        const CODES: [u16; 8] = [0, 1, 2, 3, 45, 61, 63, 95];
        let mut rng = self.rng.borrow_mut();
        let code = CODES[rng.gen_range(0..CODES.len())];
        let precipitation = if rng.gen_bool(0.5) {
            0.0
        } else {
            (rng.gen_range(0.0..12.0_f64) * 10.0).round() / 10.0
        };
        WeatherData::from_observation(
            (rng.gen_range(-5.0..38.0_f64) * 10.0).round() / 10.0,
            code,
            (rng.gen_range(0.0..45.0_f64) * 10.0).round() / 10.0,
            rng.gen_range(10.0..95.0_f64).round(),
            precipitation,
            rng.gen_range(0.0..100.0_f64).round(),
        )
    }
}

#[async_trait(?Send)]
impl WeatherService for ScriptedWeather {
    async fn get_weather(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<WeatherData, ServiceError> {
        let call = self.lookups.get();
        self.lookups.set(call + 1);
        match &self.script {
            WeatherScript::Fixed(weather) => Ok(weather.clone()),
            WeatherScript::Cycle(observations) => observations
                .get(call % observations.len().max(1))
                .cloned()
                .ok_or_else(|| ServiceError::InvalidResponse("empty weather script".into())),
            WeatherScript::Seeded(_) => Ok(self.random_conditions()),
            WeatherScript::Offline => Err(ServiceError::Network("weather offline".into())),
        }
    }
}

/// Recipe book over a [`RecipeCatalog`].
#[derive(Debug)]
pub struct OfflineRecipeBook {
    catalog: RecipeCatalog,
    rng: RefCell<ChaCha20Rng>,
}

impl OfflineRecipeBook {
    #[must_use]
    pub fn new(catalog: RecipeCatalog, seed: u64) -> Self {
        Self {
            catalog,
            rng: RefCell::new(ChaCha20Rng::seed_from_u64(derive_stream_seed(seed, b"recipes"))),
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &RecipeCatalog {
        &self.catalog
    }
}

impl Default for OfflineRecipeBook {
    fn default() -> Self {
        Self::new(RecipeCatalog::default_catalog(), 0)
    }
}

#[async_trait(?Send)]
impl RecipeBook for OfflineRecipeBook {
    async fn search_by_name(&self, query: &str) -> Result<Vec<Recipe>, ServiceError> {
        Ok(self.catalog.search_by_name(query))
    }

    async fn search_by_ingredient(&self, ingredient: &str) -> Result<Vec<Recipe>, ServiceError> {
        Ok(self.catalog.search_by_ingredient(ingredient))
    }

    async fn search_by_category(&self, category: &str) -> Result<Vec<Recipe>, ServiceError> {
        Ok(self.catalog.search_by_category(category))
    }

    async fn get_by_id(&self, id: &str) -> Result<Recipe, ServiceError> {
        self.catalog
            .get_by_id(id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("recipe {id}")))
    }

    async fn random_recipe(&self) -> Result<Recipe, ServiceError> {
        self.catalog
            .recipes
            .choose(&mut *self.rng.borrow_mut())
            .cloned()
            .ok_or_else(|| ServiceError::NotFound("recipe catalog is empty".into()))
    }

    async fn categories(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.catalog.categories())
    }
}

/// Clock that advances a fixed step on every read.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<i64>,
    step: i64,
}

impl ManualClock {
    #[must_use]
    pub const fn new(start_millis: i64, step_millis: i64) -> Self {
        Self {
            now: Cell::new(start_millis),
            step: step_millis,
        }
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        let now = self.now.get();
        self.now.set(now.saturating_add(self.step));
        now
    }
}

/// All four adventure collaborators, offline.
#[derive(Debug)]
pub struct OfflineServices {
    pub weather: ScriptedWeather,
    pub geocoder: Gazetteer,
    pub router: StraightLineRouter,
    pub dealer: OfflineDealer,
}

impl OfflineServices {
    /// Seeded weather, default towns, a reachable road and a fresh dealer.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            weather: ScriptedWeather::new(WeatherScript::Seeded(seed)),
            geocoder: Gazetteer::default(),
            router: StraightLineRouter::default(),
            dealer: OfflineDealer::new(seed),
        }
    }
}

impl Services for OfflineServices {
    type Weather = ScriptedWeather;
    type Geocoder = Gazetteer;
    type Router = StraightLineRouter;
    type Dealer = OfflineDealer;

    fn weather(&self) -> &ScriptedWeather {
        &self.weather
    }

    fn geocoder(&self) -> &Gazetteer {
        &self.geocoder
    }

    fn router(&self) -> &StraightLineRouter {
        &self.router
    }

    fn dealer(&self) -> &OfflineDealer {
        &self.dealer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::draw_with_reshuffle;
    use futures::executor::block_on;
    use std::collections::HashSet;

    #[test]
    fn dealer_deals_each_card_once_per_shuffle() {
        let dealer = OfflineDealer::new(5);
        let deck = block_on(dealer.create_deck()).unwrap();
        let mut seen = HashSet::new();
        for _ in 0..52 {
            seen.insert(block_on(dealer.draw_card(&deck)).unwrap().code);
        }
        assert_eq!(seen.len(), 52);
        assert!(block_on(dealer.draw_card(&deck)).unwrap_err().is_deck_empty());
    }

    #[test]
    fn exhausted_deck_reshuffles_once() {
        let dealer = OfflineDealer::new(8);
        let deck = block_on(dealer.create_deck()).unwrap();
        for _ in 0..52 {
            block_on(dealer.draw_card(&deck)).unwrap();
        }
        let card = block_on(draw_with_reshuffle(&dealer, &deck)).unwrap();
        assert!(!card.code.is_empty());
        let stats = dealer.stats();
        assert_eq!(stats.reshuffles, 1);
        assert_eq!(stats.failed_draws, 1);
        assert_eq!(stats.draws, 53);
        assert_eq!(dealer.remaining(&deck), Some(51));
    }

    #[test]
    fn same_seed_same_shuffle() {
        let a = OfflineDealer::new(99);
        let b = OfflineDealer::new(99);
        let deck_a = block_on(a.create_deck()).unwrap();
        let deck_b = block_on(b.create_deck()).unwrap();
        assert_eq!(deck_a, deck_b);
        for _ in 0..10 {
            assert_eq!(
                block_on(a.draw_card(&deck_a)).unwrap(),
                block_on(b.draw_card(&deck_b)).unwrap()
            );
        }
    }

    #[test]
    fn refusing_dealer_rejects() {
        let dealer = OfflineDealer::refusing(1);
        assert!(block_on(dealer.create_deck()).is_err());
    }

    #[test]
    fn router_measures_the_line() {
        let geo = Gazetteer::default();
        let paris = geo.place("paris").unwrap().clone();
        let lyon = geo.place("Lyon").unwrap().clone();
        let path = block_on(StraightLineRouter::default().get_route(&paris, &lyon)).unwrap();
        assert_eq!(path.polyline.len(), 200);
        assert!((path.distance_meters - 392_000.0).abs() < 5_000.0);
        assert!((path.duration_seconds / 3_600.0 - 4.9).abs() < 0.2);

        let err = block_on(StraightLineRouter::unreachable().get_route(&paris, &lyon)).unwrap_err();
        assert_eq!(err, ServiceError::Rejected("NoRoute".into()));
    }

    #[test]
    fn gazetteer_lookups() {
        let geo = Gazetteer::default();
        let hits = block_on(geo.geocode_location("val")).unwrap();
        assert_eq!(hits[0].name.as_deref(), Some("Valence"));
        assert_eq!(
            block_on(geo.reverse_geocode(47.33, 5.05)).unwrap(),
            "Dijon"
        );
        assert!(block_on(geo.reverse_geocode(0.0, 0.0)).is_err());
    }

    #[test]
    fn scripted_weather_modes() {
        let cycle = ScriptedWeather::new(WeatherScript::Cycle(vec![
            WeatherData::neutral(),
            WeatherData::from_observation(30.0, 95, 40.0, 20.0, 10.0, 100.0),
        ]));
        assert_eq!(block_on(cycle.get_weather(0.0, 0.0)).unwrap().temperature, 20.0);
        assert_eq!(block_on(cycle.get_weather(0.0, 0.0)).unwrap().temperature, 30.0);
        assert_eq!(block_on(cycle.get_weather(0.0, 0.0)).unwrap().temperature, 20.0);
        assert_eq!(cycle.lookups(), 3);

        let offline = ScriptedWeather::new(WeatherScript::Offline);
        assert!(block_on(offline.get_weather(0.0, 0.0)).is_err());

        let seeded = ScriptedWeather::new(WeatherScript::Seeded(4));
        let reading = block_on(seeded.get_weather(0.0, 0.0)).unwrap();
        assert!((-5.0..=38.0).contains(&reading.temperature));
        assert!((0.0..=100.0).contains(&reading.cloud_cover));
    }

    #[test]
    fn recipe_book_serves_catalog() {
        let book = OfflineRecipeBook::default();
        assert_eq!(block_on(book.get_by_id("11002")).unwrap().name, "Daiquiri");
        assert!(block_on(book.get_by_id("nope")).is_err());
        assert!(block_on(book.random_recipe()).is_ok());
        assert!(!block_on(book.categories()).unwrap().is_empty());
    }

    #[test]
    fn manual_clock_ticks() {
        let clock = ManualClock::new(1_000, 250);
        assert_eq!(clock.now_millis(), 1_000);
        assert_eq!(clock.now_millis(), 1_250);
    }
}
