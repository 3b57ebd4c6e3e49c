//! Clients for the external routing and geocoding services.

pub mod geocoding;
pub mod routing;

pub use geocoding::{GeocodingClient, Suggestion};
pub use routing::{RankRequest, RankResponse, RouteRecord, RoutingClient, TravelMode};
