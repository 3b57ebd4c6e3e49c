use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SafeRideError};

/// A longitude/latitude pair in WGS84 degrees.
///
/// Serializes as a two-element `[lon, lat]` array, matching what the routing
/// service expects for `start` and `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

impl Coord {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Parse `"lon,lat"` text, e.g. `-105.0,39.7`.
    ///
    /// Returns `None` unless both parts are finite numbers in range.
    pub fn parse_lon_lat(s: &str) -> Option<Self> {
        let (lon, lat) = s.split_once(',')?;
        let lon: f64 = lon.trim().parse().ok()?;
        let lat: f64 = lat.trim().parse().ok()?;
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return None;
        }
        Some(Self { lon, lat })
    }
}

impl From<[f64; 2]> for Coord {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Coord> for [f64; 2] {
    fn from(c: Coord) -> Self {
        [c.lon, c.lat]
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lon, self.lat)
    }
}

/// Axis-aligned lon/lat bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Coord,
    pub max: Coord,
}

impl Bounds {
    /// A degenerate box containing a single point.
    pub fn around(c: Coord) -> Self {
        Self { min: c, max: c }
    }

    pub fn extend(&mut self, c: Coord) {
        self.min.lon = self.min.lon.min(c.lon);
        self.min.lat = self.min.lat.min(c.lat);
        self.max.lon = self.max.lon.max(c.lon);
        self.max.lat = self.max.lat.max(c.lat);
    }

    /// Smallest box covering every point, or `None` for an empty input.
    pub fn covering<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coord>,
    {
        let mut iter = points.into_iter();
        let mut bounds = Self::around(iter.next()?);
        for c in iter {
            bounds.extend(c);
        }
        Some(bounds)
    }

    pub fn contains(&self, c: Coord) -> bool {
        (self.min.lon..=self.max.lon).contains(&c.lon)
            && (self.min.lat..=self.max.lat).contains(&c.lat)
    }
}

static LINESTRING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*LINESTRING\s*\((?P<body>.*)\)\s*$").expect("static regex")
});

static EMPTY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*LINESTRING\s+EMPTY\s*$").expect("static regex"));

/// Parse WKT `LINESTRING(lon lat, lon lat, ...)` into an ordered coordinate list.
///
/// `LINESTRING EMPTY` and `LINESTRING()` yield an empty list. Any pair that is not two
/// finite numbers makes the whole string malformed; callers that must keep going use
/// [`parse_linestring_or_empty`].
pub fn parse_linestring(wkt: &str) -> Result<Vec<Coord>> {
    if EMPTY_RE.is_match(wkt) {
        return Ok(Vec::new());
    }

    let caps = LINESTRING_RE
        .captures(wkt)
        .ok_or_else(|| SafeRideError::MalformedGeometry(truncate(wkt)))?;
    let body = caps["body"].trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }

    body.split(',')
        .map(|pair| {
            let mut parts = pair.split_whitespace();
            let coord = match (parts.next(), parts.next(), parts.next()) {
                // A trailing Z value is tolerated and dropped.
                (Some(lon), Some(lat), _) => lon
                    .parse::<f64>()
                    .ok()
                    .zip(lat.parse::<f64>().ok())
                    .filter(|(lon, lat)| lon.is_finite() && lat.is_finite())
                    .map(|(lon, lat)| Coord { lon, lat }),
                _ => None,
            };
            coord.ok_or_else(|| SafeRideError::MalformedGeometry(truncate(wkt)))
        })
        .collect()
}

/// Like [`parse_linestring`], but a malformed string becomes an empty geometry.
pub fn parse_linestring_or_empty(wkt: &str) -> Vec<Coord> {
    match parse_linestring(wkt) {
        Ok(coords) => coords,
        Err(err) => {
            tracing::warn!("{err}; using empty geometry");
            Vec::new()
        }
    }
}

fn truncate(wkt: &str) -> String {
    const MAX: usize = 48;
    match wkt.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}…", &wkt[..cut]),
        None => wkt.to_string(),
    }
}
