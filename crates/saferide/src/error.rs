use std::fmt;

use thiserror::Error;

/// External service an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// The crash-aware route ranking API.
    Routing,
    /// Forward geocoding and place suggestions.
    Geocoding,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Routing => write!(f, "API"),
            Self::Geocoding => write!(f, "geocode"),
        }
    }
}

/// Why a network call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkFailure {
    #[error("HTTP {0}")]
    Status(u16),
    #[error("transport failure: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SafeRideError {
    #[error("{service} {failure}")]
    Network {
        service: Service,
        failure: NetworkFailure,
    },
    #[error("No results for \"{query}\"")]
    NoResults { query: String },
    #[error("No routes found between these points")]
    EmptyRouteSet,
    #[error("Malformed route geometry: {0}")]
    MalformedGeometry(String),
}

impl SafeRideError {
    /// Classify a `ureq` failure: HTTP status errors keep their code, everything else
    /// (DNS, TLS, connection reset, undecodable body) is a transport failure.
    pub fn from_ureq(service: Service, err: ureq::Error) -> Self {
        let failure = match err {
            ureq::Error::StatusCode(code) => NetworkFailure::Status(code),
            other => NetworkFailure::Transport(other.to_string()),
        };
        Self::Network { service, failure }
    }
}

pub type Result<T> = std::result::Result<T, SafeRideError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages_are_readable() {
        let err = SafeRideError::Network {
            service: Service::Routing,
            failure: NetworkFailure::Status(502),
        };
        assert_eq!(err.to_string(), "API HTTP 502");

        let err = SafeRideError::Network {
            service: Service::Geocoding,
            failure: NetworkFailure::Status(500),
        };
        assert_eq!(err.to_string(), "geocode HTTP 500");
    }

    #[test]
    fn test_no_results_quotes_query() {
        let err = SafeRideError::NoResults {
            query: "Union Station".to_string(),
        };
        assert_eq!(err.to_string(), "No results for \"Union Station\"");
    }

    #[test]
    fn test_status_code_error_keeps_code() {
        let err = SafeRideError::from_ureq(Service::Routing, ureq::Error::StatusCode(404));
        assert_eq!(
            err,
            SafeRideError::Network {
                service: Service::Routing,
                failure: NetworkFailure::Status(404),
            }
        );
    }
}
