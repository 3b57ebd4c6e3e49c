use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{NetworkFailure, Result, SafeRideError, Service};
use crate::geometry::Coord;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// A place offered while typing a location.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub name: String,
    pub lon: f64,
    pub lat: f64,
    pub category: String,
    pub icon: Option<String>,
}

impl Suggestion {
    pub fn coord(&self) -> Coord {
        Coord::new(self.lon, self.lat)
    }

    /// Glyph shown next to the suggestion, chosen by OSM class.
    pub fn glyph(&self) -> &'static str {
        match self.category.as_str() {
            "railway" => "🚉",
            "amenity" => "📍",
            "highway" => "🛣️",
            _ => "📌",
        }
    }
}

/// Raw Nominatim search result. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct Place {
    display_name: String,
    lon: String,
    lat: String,
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    icon: Option<String>,
}

impl Place {
    fn into_suggestion(self) -> Option<Suggestion> {
        let lon = self.lon.trim().parse::<f64>().ok()?;
        let lat = self.lat.trim().parse::<f64>().ok()?;
        Some(Suggestion {
            name: self.display_name,
            lon,
            lat,
            category: self.class.unwrap_or_default(),
            icon: self.icon,
        })
    }
}

/// Parse a Nominatim `format=json` body, skipping entries without usable coordinates.
pub fn parse_places(body: &str) -> Result<Vec<Suggestion>> {
    let places: Vec<Place> = serde_json::from_str(body).map_err(|e| SafeRideError::Network {
        service: Service::Geocoding,
        failure: NetworkFailure::Transport(format!("invalid response body: {e}")),
    })?;
    let total = places.len();
    let suggestions: Vec<Suggestion> = places
        .into_iter()
        .filter_map(Place::into_suggestion)
        .collect();
    if suggestions.len() < total {
        warn!(
            skipped = total - suggestions.len(),
            "dropped geocoder results without coordinates"
        );
    }
    Ok(suggestions)
}

/// Blocking client for a Nominatim-compatible search endpoint.
#[derive(Clone)]
pub struct GeocodingClient {
    agent: ureq::Agent,
    base_url: String,
}

impl GeocodingClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn search(&self, query: &str, limit: usize, address_details: bool) -> Result<Vec<Suggestion>> {
        let url = format!("{}/search", self.base_url);
        debug!(%url, query, limit, "geocoder search");

        let mut request = self
            .agent
            .get(&url)
            .query("format", "json")
            .query("limit", limit.to_string())
            .query("q", query)
            .header("Accept-Language", "en");
        if address_details {
            request = request.query("addressdetails", "1");
        }

        let body = request
            .call()
            .map_err(|e| SafeRideError::from_ureq(Service::Geocoding, e))?
            .body_mut()
            .read_to_string()
            .map_err(|e| SafeRideError::from_ureq(Service::Geocoding, e))?;
        parse_places(&body)
    }

    /// Up to `limit` candidate places. An empty list is a valid answer.
    pub fn suggest(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>> {
        self.search(query, limit, true)
    }

    /// Resolve free text to the best matching coordinate.
    pub fn geocode(&self, query: &str) -> Result<Coord> {
        first_match(query, self.search(query, 1, false)?)
    }
}

fn first_match(query: &str, suggestions: Vec<Suggestion>) -> Result<Coord> {
    suggestions
        .first()
        .map(Suggestion::coord)
        .ok_or_else(|| SafeRideError::NoResults {
            query: query.to_string(),
        })
}
