use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::TravelMode;
use crate::api::geocoding::{DEFAULT_GEOCODER_URL, DEFAULT_SUGGESTION_LIMIT};
use crate::api::routing::{DEFAULT_BUFFER_M, MAX_ALTS};
use crate::autocomplete::{DEFAULT_DEBOUNCE, DEFAULT_MIN_QUERY_LEN, DebounceSettings};

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "saferide";

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

const VALID_KEYS: &str = "api.base_url, api.buffer_m, api.max_alternatives, api.mode, \
    geocoder.base_url, geocoder.limit, autocomplete.debounce_ms, autocomplete.min_query_len";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoder: Option<GeocoderConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<AutocompleteConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Crash search buffer in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_m: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_alternatives: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<TravelMode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocoderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutocompleteConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_query_len: Option<usize>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `saferide config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# SafeRide configuration - https://github.com/mklab-se/saferide\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api.base_url" => {
                self.api.get_or_insert_with(ApiConfig::default).base_url = Some(parse_url(value)?);
            }
            "api.buffer_m" => {
                let buffer: f64 = value
                    .parse()
                    .ok()
                    .filter(|b: &f64| b.is_finite() && *b >= 0.0)
                    .ok_or_else(|| {
                        anyhow::anyhow!("Invalid buffer_m: {value}. Must be a number of meters >= 0.")
                    })?;
                self.api.get_or_insert_with(ApiConfig::default).buffer_m = Some(buffer);
            }
            "api.max_alternatives" => {
                let alts: u32 = value
                    .parse()
                    .ok()
                    .filter(|n| (1..=5).contains(n))
                    .ok_or_else(|| {
                        anyhow::anyhow!("Invalid max_alternatives: {value}. Must be 1 to 5.")
                    })?;
                self.api.get_or_insert_with(ApiConfig::default).max_alternatives = Some(alts);
            }
            "api.mode" => {
                let mode = TravelMode::parse(value).ok_or_else(|| {
                    anyhow::anyhow!(
                        "Invalid mode: {value}. Must be 'driving', 'cycling', or 'walking'."
                    )
                })?;
                self.api.get_or_insert_with(ApiConfig::default).mode = Some(mode);
            }
            "geocoder.base_url" => {
                self.geocoder
                    .get_or_insert_with(GeocoderConfig::default)
                    .base_url = Some(parse_url(value)?);
            }
            "geocoder.limit" => {
                let limit: usize = value
                    .parse()
                    .ok()
                    .filter(|n| (1..=20).contains(n))
                    .ok_or_else(|| anyhow::anyhow!("Invalid limit: {value}. Must be 1 to 20."))?;
                self.geocoder
                    .get_or_insert_with(GeocoderConfig::default)
                    .limit = Some(limit);
            }
            "autocomplete.debounce_ms" => {
                let ms: u64 = value.parse().map_err(|_| {
                    anyhow::anyhow!("Invalid debounce_ms: {value}. Must be a whole number of milliseconds.")
                })?;
                self.autocomplete
                    .get_or_insert_with(AutocompleteConfig::default)
                    .debounce_ms = Some(ms);
            }
            "autocomplete.min_query_len" => {
                let len: usize = value
                    .parse()
                    .ok()
                    .filter(|n| *n >= 1)
                    .ok_or_else(|| {
                        anyhow::anyhow!("Invalid min_query_len: {value}. Must be at least 1.")
                    })?;
                self.autocomplete
                    .get_or_insert_with(AutocompleteConfig::default)
                    .min_query_len = Some(len);
            }
            _ => anyhow::bail!("Unknown config key: {key}. Valid keys: {VALID_KEYS}"),
        }
        Ok(())
    }

    pub fn api_url(&self) -> &str {
        self.api
            .as_ref()
            .and_then(|a| a.base_url.as_deref())
            .unwrap_or(DEFAULT_API_URL)
    }

    pub fn buffer_m(&self) -> f64 {
        self.api
            .as_ref()
            .and_then(|a| a.buffer_m)
            .unwrap_or(DEFAULT_BUFFER_M)
    }

    pub fn max_alternatives(&self) -> u32 {
        self.api
            .as_ref()
            .and_then(|a| a.max_alternatives)
            .unwrap_or(MAX_ALTS)
    }

    pub fn mode(&self) -> TravelMode {
        self.api.as_ref().and_then(|a| a.mode).unwrap_or_default()
    }

    pub fn geocoder_url(&self) -> &str {
        self.geocoder
            .as_ref()
            .and_then(|g| g.base_url.as_deref())
            .unwrap_or(DEFAULT_GEOCODER_URL)
    }

    pub fn suggestion_limit(&self) -> usize {
        self.geocoder
            .as_ref()
            .and_then(|g| g.limit)
            .unwrap_or(DEFAULT_SUGGESTION_LIMIT)
    }

    pub fn debounce(&self) -> Duration {
        self.autocomplete
            .as_ref()
            .and_then(|a| a.debounce_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DEBOUNCE)
    }

    pub fn min_query_len(&self) -> usize {
        self.autocomplete
            .as_ref()
            .and_then(|a| a.min_query_len)
            .unwrap_or(DEFAULT_MIN_QUERY_LEN)
    }

    pub fn debounce_settings(&self) -> DebounceSettings {
        DebounceSettings {
            delay: self.debounce(),
            min_query_len: self.min_query_len(),
            limit: self.suggestion_limit(),
        }
    }
}

fn parse_url(value: &str) -> Result<String> {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        anyhow::bail!("Invalid URL: {value}. Must start with http:// or https://.");
    }
    Ok(value.trim_end_matches('/').to_string())
}
