//! Service endpoints and classification thresholds
//!
//! Every tunable number used by the pipeline lives here with a note on
//! what it controls. Values can be overridden from a TOML file and from
//! environment variables.

use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the impact assessment pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    // === SERVICES ===
    /// Base URL of the impact-physics backend
    ///
    /// Serves `/impact`, `/api/cities`, `/api/evacuation-plan` and
    /// `/api/orbital-data`.
    pub backend_url: String,

    /// GeoJSON FeatureCollection of country polygons used for land tests
    pub boundary_dataset_url: String,

    /// USGS FDSN event query endpoint
    pub earthquake_endpoint: String,

    /// Timeout applied to every outbound HTTP request
    pub request_timeout_secs: u64,

    // === CLASSIFICATION ===
    /// Water impacts closer than this to land count as coastal (km)
    pub coastal_threshold_km: f64,

    // === EARTHQUAKE COMPARISON ===
    /// Search radius around the impact point for historical quakes (km)
    pub earthquake_radius_km: f64,

    /// Earliest event date included in the comparison (YYYY-MM-DD)
    pub earthquake_start_time: String,

    /// Quakes within +/- this many magnitude units are "similar"
    ///
    /// At 0.5 a 1 Mt impact (M ~6.84) is compared against M 6.34 - 7.34.
    pub magnitude_band_half_width: f64,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:5000".into(),
            boundary_dataset_url:
                "https://raw.githubusercontent.com/datasets/geo-countries/master/data/countries.geojson"
                    .into(),
            earthquake_endpoint: "https://earthquake.usgs.gov/fdsnws/event/1/query".into(),
            request_timeout_secs: 30,
            coastal_threshold_km: 30.0,
            earthquake_radius_km: 500.0,
            earthquake_start_time: "1900-01-01".into(),
            magnitude_band_half_width: 0.5,
        }
    }
}

impl AtlasConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a TOML file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply environment overrides
    ///
    /// Optional: IMPACT_BACKEND_URL, IMPACT_BOUNDARY_URL, IMPACT_EARTHQUAKE_URL
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("IMPACT_BACKEND_URL") {
            self.backend_url = url;
        }
        if let Ok(url) = std::env::var("IMPACT_BOUNDARY_URL") {
            self.boundary_dataset_url = url;
        }
        if let Ok(url) = std::env::var("IMPACT_EARTHQUAKE_URL") {
            self.earthquake_endpoint = url;
        }
        self
    }
}
