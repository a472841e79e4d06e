use async_trait::async_trait;
use futures::executor::block_on;
use mixtrail_game::offline::{Gazetteer, OfflineDealer, ScriptedWeather, StraightLineRouter};
use mixtrail_game::{
    AdventureConfig, AdventureError, AdventureSession, AdventureStatus, Coordinate,
    GeocodingService, ManualClock, RoutePath, RoutingService, ServiceError, Services,
    WeatherScript, plan_route, stop_indices,
};

struct FixedRouter {
    points: usize,
}

#[async_trait(?Send)]
impl RoutingService for FixedRouter {
    async fn get_route(
        &self,
        _start: &Coordinate,
        _end: &Coordinate,
    ) -> Result<RoutePath, ServiceError> {
        let geometry: Vec<[f64; 2]> = (0..self.points)
            .map(|i| [i as f64 / 100.0, 45.0])
            .collect();
        Ok(RoutePath::from_lon_lat(&geometry, 12_345.0, 678.0))
    }
}

struct SilentGeocoder;

#[async_trait(?Send)]
impl GeocodingService for SilentGeocoder {
    async fn geocode_location(&self, _query: &str) -> Result<Vec<Coordinate>, ServiceError> {
        Err(ServiceError::Network("down".into()))
    }

    async fn reverse_geocode(&self, _lat: f64, _lon: f64) -> Result<String, ServiceError> {
        Err(ServiceError::Network("down".into()))
    }
}

struct TestServices {
    router: StraightLineRouter,
    dealer: OfflineDealer,
    geocoder: Gazetteer,
    weather: ScriptedWeather,
}

impl TestServices {
    fn new(router: StraightLineRouter, dealer: OfflineDealer) -> Self {
        Self {
            router,
            dealer,
            geocoder: Gazetteer::default(),
            weather: ScriptedWeather::new(WeatherScript::Seeded(1)),
        }
    }
}

impl Services for TestServices {
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

fn session(services: TestServices) -> AdventureSession<TestServices, ManualClock> {
    let mut session = AdventureSession::new(
        services,
        ManualClock::new(0, 10),
        AdventureConfig::default_config(),
        42,
    );
    session.set_start_location(Coordinate::named(48.8566, 2.3522, "Paris"));
    session.set_end_location(Coordinate::named(45.764, 4.8357, "Lyon"));
    session
}

#[test]
fn hundred_point_route_puts_stops_at_quarters() {
    assert_eq!(stop_indices(100, 3), vec![25, 50, 75]);
    let route = block_on(plan_route(
        &FixedRouter { points: 100 },
        &SilentGeocoder,
        &Coordinate::new(45.0, 0.0),
        &Coordinate::new(45.0, 0.99),
        3,
    ))
    .unwrap();
    let lons: Vec<f64> = route.stop_points.iter().map(|c| c.longitude).collect();
    assert_eq!(lons, vec![0.25, 0.5, 0.75]);
    assert_eq!(route.waypoints.len(), 2);
    assert_eq!(route.main_path[0], (45.0, 0.0));
    assert_eq!(route.total_distance_meters, 12_345.0);
    assert_eq!(route.total_duration_seconds, 678.0);
}

#[test]
fn failed_reverse_geocoding_names_stops_by_coordinates() {
    let route = block_on(plan_route(
        &FixedRouter { points: 10 },
        &SilentGeocoder,
        &Coordinate::new(45.0, 0.0),
        &Coordinate::new(45.0, 0.09),
        1,
    ))
    .unwrap();
    assert_eq!(route.stop_points[0].name.as_deref(), Some("45.0000, 0.0500"));
}

#[test]
fn single_point_route_has_no_stops() {
    let route = block_on(plan_route(
        &FixedRouter { points: 1 },
        &SilentGeocoder,
        &Coordinate::new(45.0, 0.0),
        &Coordinate::new(45.0, 0.0),
        3,
    ))
    .unwrap();
    assert!(route.stop_points.is_empty());
}

#[test]
fn route_failure_returns_to_idle_with_error() {
    let mut session = session(TestServices::new(
        StraightLineRouter::unreachable(),
        OfflineDealer::new(1),
    ));
    let err = block_on(session.start_adventure(None)).unwrap_err();
    assert_eq!(
        err,
        AdventureError::RouteCalculation(ServiceError::Rejected("NoRoute".into()))
    );
    let adventure = &session.state().adventure;
    assert_eq!(adventure.status, AdventureStatus::Idle);
    assert!(adventure.route_data.is_none());
    assert!(adventure.deck_id.is_none());
    assert!(!adventure.loading);
    assert_eq!(
        adventure.error.as_deref(),
        Some("Service rejected the request: NoRoute")
    );
}

#[test]
fn deck_failure_returns_to_idle() {
    let mut session = session(TestServices::new(
        StraightLineRouter::default(),
        OfflineDealer::refusing(1),
    ));
    let err = block_on(session.start_adventure(Some(4))).unwrap_err();
    assert!(matches!(err, AdventureError::DeckCreation(_)));
    assert_eq!(session.state().adventure.status, AdventureStatus::Idle);
    assert!(session.state().adventure.route_data.is_none());
}

#[test]
fn retry_after_failure_can_succeed() {
    let mut services = TestServices::new(StraightLineRouter::unreachable(), OfflineDealer::new(2));
    services.router.unreachable = false;
    let mut session = session(services);
    block_on(session.start_adventure(Some(4))).unwrap();
    assert_eq!(session.state().adventure.stop_count(), 4);
    assert_eq!(
        block_on(session.start_adventure(None)),
        Err(AdventureError::AlreadyStarted {
            status: AdventureStatus::Active
        })
    );
}

#[test]
fn start_without_locations_is_rejected_without_transition() {
    let mut session = AdventureSession::new(
        TestServices::new(StraightLineRouter::default(), OfflineDealer::new(3)),
        ManualClock::new(0, 1),
        AdventureConfig::default_config(),
        1,
    );
    session.set_start_location(Coordinate::new(1.0, 1.0));
    assert_eq!(
        block_on(session.start_adventure(None)),
        Err(AdventureError::MissingLocations)
    );
    assert_eq!(session.state().adventure.status, AdventureStatus::Idle);
}

#[test]
fn location_search_goes_through_the_geocoder() {
    let session = session(TestServices::new(
        StraightLineRouter::default(),
        OfflineDealer::new(4),
    ));
    let hits = block_on(session.search_locations("lyon")).unwrap();
    assert_eq!(hits[0].display_name(), "Lyon");
    assert!(block_on(session.search_locations("   ")).unwrap().is_empty());
}
