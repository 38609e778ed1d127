//! Historical earthquake comparison
//!
//! An impact's energy is mapped onto an equivalent seismic magnitude and the
//! USGS catalogue is searched for past quakes of similar size near the
//! impact point.

use crate::core::config::AtlasConfig;
use crate::core::error::{ImpactError, Result};
use crate::core::types::{megatons_to_joules, ImpactPoint};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Equivalent seismic magnitude for an impact energy in megatons
///
/// `M = (2/3) * log10(E_joules) - 3.2`. Returns `None` for zero or negative
/// energy where the logarithm is undefined.
pub fn estimate_magnitude(energy_megatons: f64) -> Option<f64> {
    let joules = megatons_to_joules(energy_megatons);
    if !joules.is_finite() || joules <= 0.0 {
        return None;
    }
    Some((2.0 / 3.0) * joules.log10() - 3.2)
}

/// Magnitude rounded to two decimals, as displayed
pub fn rounded_magnitude(energy_megatons: f64) -> Option<f64> {
    estimate_magnitude(energy_megatons).map(|m| (m * 100.0).round() / 100.0)
}

/// Inclusive magnitude range used to find "similar" quakes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MagnitudeBand {
    pub min: f64,
    pub max: f64,
}

impl MagnitudeBand {
    pub fn around(magnitude: f64, half_width: f64) -> Self {
        Self {
            min: magnitude - half_width,
            max: magnitude + half_width,
        }
    }

    pub fn contains(&self, magnitude: f64) -> bool {
        magnitude >= self.min && magnitude <= self.max
    }
}

/// Parameters of a USGS FDSN event search
#[derive(Debug, Clone, PartialEq)]
pub struct EarthquakeQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub max_radius_km: f64,
    pub start_time: String,
    pub band: MagnitudeBand,
}

impl EarthquakeQuery {
    /// Build the comparison search for an impact
    ///
    /// Returns `None` when the impact has no positive energy.
    pub fn for_impact(point: &ImpactPoint, config: &AtlasConfig) -> Option<Self> {
        let magnitude = rounded_magnitude(point.energy_megatons())?;
        Some(Self {
            latitude: point.latitude(),
            longitude: point.longitude(),
            max_radius_km: config.earthquake_radius_km,
            start_time: config.earthquake_start_time.clone(),
            band: MagnitudeBand::around(magnitude, config.magnitude_band_half_width),
        })
    }

    /// Full request URL against an FDSN event endpoint
    pub fn to_url(&self, endpoint: &str) -> Result<Url> {
        Url::parse_with_params(
            endpoint,
            &[
                ("format", "geojson".to_string()),
                ("latitude", self.latitude.to_string()),
                ("longitude", self.longitude.to_string()),
                ("maxradiuskm", self.max_radius_km.to_string()),
                ("starttime", self.start_time.clone()),
                ("minmagnitude", format!("{:.2}", self.band.min)),
                ("maxmagnitude", format!("{:.2}", self.band.max)),
            ],
        )
        .map_err(|e| ImpactError::InvalidUrl(format!("{}: {}", endpoint, e)))
    }
}

/// One historical quake
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Earthquake {
    pub id: String,
    pub magnitude: f64,
    pub place: Option<String>,
    /// Milliseconds since the Unix epoch
    pub time_ms: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
}

// USGS GeoJSON response format
#[derive(Deserialize)]
struct FeedResponse {
    #[serde(default)]
    features: Vec<FeedFeature>,
}

#[derive(Deserialize)]
struct FeedFeature {
    id: Option<String>,
    properties: Option<FeedProperties>,
    geometry: Option<FeedGeometry>,
}

#[derive(Deserialize)]
struct FeedProperties {
    mag: Option<f64>,
    place: Option<String>,
    time: Option<i64>,
}

#[derive(Deserialize)]
struct FeedGeometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

/// Parse a USGS GeoJSON response, skipping events without a magnitude or
/// position
pub fn parse_earthquakes(json: &str) -> Result<Vec<Earthquake>> {
    let response: FeedResponse = serde_json::from_str(json)?;
    let total = response.features.len();

    let quakes: Vec<Earthquake> = response
        .features
        .into_iter()
        .filter_map(|feature| {
            let properties = feature.properties?;
            let coordinates = feature.geometry?.coordinates;
            let (&longitude, &latitude) = (coordinates.first()?, coordinates.get(1)?);
            Some(Earthquake {
                id: feature.id.unwrap_or_default(),
                magnitude: properties.mag?,
                place: properties.place,
                time_ms: properties.time,
                latitude,
                longitude,
            })
        })
        .collect();

    if quakes.len() < total {
        tracing::warn!("Dropped {} incomplete earthquake records", total - quakes.len());
    }
    Ok(quakes)
}
