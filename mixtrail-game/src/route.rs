//! Route planning: pick evenly spaced stops along a driving path.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::AdventureError;
use crate::numbers::usize_to_f64;
use crate::services::{GeocodingService, RoutingService};

/// Stops planned when the caller does not ask for a specific number.
pub const DEFAULT_STOP_COUNT: usize = 3;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A point on the map, optionally named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            name: None,
            country: None,
        }
    }

    #[must_use]
    pub fn named(latitude: f64, longitude: f64, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(latitude, longitude)
        }
    }

    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Name when known, otherwise the coordinate text.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format_coordinate(self.latitude, self.longitude))
    }

    #[must_use]
    pub const fn lat_lon(&self) -> LatLon {
        (self.latitude, self.longitude)
    }
}

/// `(latitude, longitude)` pair.
pub type LatLon = (f64, f64);

/// Path returned by a routing provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RoutePath {
    pub polyline: Vec<LatLon>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

impl RoutePath {
    /// Build from provider geometry given as `[longitude, latitude]` pairs.
    #[must_use]
    pub fn from_lon_lat(geometry: &[[f64; 2]], distance_meters: f64, duration_seconds: f64) -> Self {
        Self {
            polyline: geometry.iter().map(|[lon, lat]| (*lat, *lon)).collect(),
            distance_meters,
            duration_seconds,
        }
    }
}

/// A planned trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteData {
    pub main_path: Vec<LatLon>,
    /// Exactly the start and end locations.
    pub waypoints: Vec<Coordinate>,
    pub stop_points: Vec<Coordinate>,
    pub total_distance_meters: f64,
    pub total_duration_seconds: f64,
}

impl RouteData {
    #[must_use]
    pub const fn stop_count(&self) -> usize {
        self.stop_points.len()
    }
}

/// Polyline indices for `num_stops` evenly spaced stops.
///
/// Stop `i` (1-based) sits at `floor(i * len / (num_stops + 1))`, clamped to
/// the last point. Paths with fewer than two points yield no stops.
#[must_use]
pub fn stop_indices(path_len: usize, num_stops: usize) -> Vec<usize> {
    if path_len < 2 {
        return Vec::new();
    }
    let divisor = num_stops.saturating_add(1);
    (1..=num_stops)
        .map(|i| (i.saturating_mul(path_len) / divisor).min(path_len - 1))
        .collect()
}

/// The polyline points chosen as stops.
#[must_use]
pub fn intermediate_waypoints(path: &[LatLon], num_stops: usize) -> Vec<LatLon> {
    stop_indices(path.len(), num_stops)
        .into_iter()
        .map(|index| path[index])
        .collect()
}

/// `"{lat}, {lon}"` with four decimals.
#[must_use]
pub fn format_coordinate(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.4}, {longitude:.4}")
}

/// Great-circle distance between two points.
#[must_use]
pub fn haversine_meters(from: LatLon, to: LatLon) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Length of a polyline.
#[must_use]
pub fn path_length_meters(path: &[LatLon]) -> f64 {
    path.windows(2)
        .map(|pair| haversine_meters(pair[0], pair[1]))
        .sum()
}

/// Evenly sample `points` positions on the straight line between two coordinates.
#[must_use]
pub fn interpolate(from: LatLon, to: LatLon, points: usize) -> Vec<LatLon> {
    match points {
        0 => Vec::new(),
        1 => vec![from],
        _ => {
            let last = usize_to_f64(points - 1);
            (0..points)
                .map(|i| {
                    let t = usize_to_f64(i) / last;
                    (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)
                })
                .collect()
        }
    }
}

/// Candidate coordinates for a free-text location query.
///
/// # Errors
///
/// Returns [`AdventureError::Geocoding`] when the lookup fails.
pub async fn search_locations<G>(geocoder: &G, query: &str) -> Result<Vec<Coordinate>, AdventureError>
where
    G: GeocodingService + ?Sized,
{
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    geocoder
        .geocode_location(query)
        .await
        .map_err(AdventureError::Geocoding)
}

/// Place name for a coordinate, falling back to coordinate text.
pub async fn reverse_geocode_or_fallback<G>(geocoder: &G, latitude: f64, longitude: f64) -> String
where
    G: GeocodingService + ?Sized,
{
    match geocoder.reverse_geocode(latitude, longitude).await {
        Ok(name) if !name.trim().is_empty() => name,
        Ok(_) => format_coordinate(latitude, longitude),
        Err(err) => {
            warn!("Reverse geocoding failed at {latitude:.4}, {longitude:.4}: {err}");
            format_coordinate(latitude, longitude)
        }
    }
}

/// Fetch a driving path and name `num_stops` evenly spaced stops along it.
///
/// # Errors
///
/// Returns [`AdventureError::RouteCalculation`] when the router fails.
/// Reverse geocoding failures never fail the plan.
pub async fn plan_route<R, G>(
    router: &R,
    geocoder: &G,
    start: &Coordinate,
    end: &Coordinate,
    num_stops: usize,
) -> Result<RouteData, AdventureError>
where
    R: RoutingService + ?Sized,
    G: GeocodingService + ?Sized,
{
    let path = router
        .get_route(start, end)
        .await
        .map_err(AdventureError::RouteCalculation)?;

    let mut stop_points = Vec::with_capacity(num_stops);
    for (latitude, longitude) in intermediate_waypoints(&path.polyline, num_stops) {
        let name = reverse_geocode_or_fallback(geocoder, latitude, longitude).await;
        stop_points.push(Coordinate::named(latitude, longitude, name));
    }
    debug!(
        "Planned {} stops over {} path points from {} to {}",
        stop_points.len(),
        path.polyline.len(),
        start.display_name(),
        end.display_name()
    );

    Ok(RouteData {
        main_path: path.polyline,
        waypoints: vec![start.clone(), end.clone()],
        stop_points,
        total_distance_meters: path.distance_meters,
        total_duration_seconds: path.duration_seconds,
    })
}
