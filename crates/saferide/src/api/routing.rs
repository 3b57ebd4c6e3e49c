use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classify::Route;
use crate::error::{NetworkFailure, Result, SafeRideError, Service};
use crate::geometry::{Coord, parse_linestring_or_empty};

/// Crash search buffer around each route, in meters.
pub const DEFAULT_BUFFER_M: f64 = 60.0;
/// Alternatives requested from the routing service.
pub const MAX_ALTS: u32 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Cycling,
    Walking,
}

impl TravelMode {
    pub fn all() -> &'static [TravelMode] {
        &[TravelMode::Driving, TravelMode::Cycling, TravelMode::Walking]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Cycling => "cycling",
            Self::Walking => "walking",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|m| m.as_str() == s)
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Body of `POST /routes/rank`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankRequest {
    pub start: Coord,
    pub end: Coord,
    pub buffer_m: f64,
    pub max_alternatives: u32,
    pub mode: TravelMode,
    pub use_fixture: bool,
}

impl RankRequest {
    pub fn new(start: Coord, end: Coord) -> Self {
        Self {
            start,
            end,
            buffer_m: DEFAULT_BUFFER_M,
            max_alternatives: MAX_ALTS,
            mode: TravelMode::default(),
            use_fixture: false,
        }
    }
}

/// One entry of `routes_ranked`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteRecord {
    pub index: usize,
    pub crashes: u32,
    pub length_km: f64,
    pub wkt: String,
}

impl RouteRecord {
    /// Convert to a [`Route`]. A malformed `wkt` is logged and becomes an empty geometry
    /// so the rest of the response still renders.
    pub fn into_route(self) -> Route {
        Route {
            index: self.index,
            geometry: parse_linestring_or_empty(&self.wkt),
            crashes: self.crashes,
            length_km: self.length_km,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RankResponse {
    #[serde(default)]
    pub winner: Option<usize>,
    #[serde(default)]
    pub routes_ranked: Vec<RouteRecord>,
}

impl RankResponse {
    /// Decode a response body. An empty `routes_ranked` is reported as
    /// [`SafeRideError::EmptyRouteSet`].
    pub fn from_json(body: &str) -> Result<Self> {
        let response: RankResponse =
            serde_json::from_str(body).map_err(|e| SafeRideError::Network {
                service: Service::Routing,
                failure: NetworkFailure::Transport(format!("invalid response body: {e}")),
            })?;
        response.non_empty()
    }

    fn non_empty(self) -> Result<Self> {
        if self.routes_ranked.is_empty() {
            return Err(SafeRideError::EmptyRouteSet);
        }
        Ok(self)
    }

    /// Parsed routes, in response order.
    pub fn into_routes(self) -> (Vec<Route>, Option<usize>) {
        let winner = self.winner;
        let routes = self
            .routes_ranked
            .into_iter()
            .map(RouteRecord::into_route)
            .collect();
        (routes, winner)
    }
}

/// Blocking client for the crash-aware ranking API.
#[derive(Clone)]
pub struct RoutingClient {
    agent: ureq::Agent,
    base_url: String,
}

impl RoutingClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn rank_url(&self) -> String {
        format!("{}/routes/rank", self.base_url)
    }

    /// Request ranked alternatives between two points.
    pub fn rank(&self, request: &RankRequest) -> Result<RankResponse> {
        let url = self.rank_url();
        debug!(%url, start = %request.start, end = %request.end, mode = %request.mode, "requesting routes");

        let body = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json")
            .send_json(request)
            .map_err(|e| SafeRideError::from_ureq(Service::Routing, e))?
            .body_mut()
            .read_to_string()
            .map_err(|e| SafeRideError::from_ureq(Service::Routing, e))?;

        let response = RankResponse::from_json(&body)?;
        info!(
            routes = response.routes_ranked.len(),
            winner = ?response.winner,
            "received ranked routes"
        );
        Ok(response)
    }
}
