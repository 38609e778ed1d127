//! Async HTTP client for the impact-physics backend
//!
//! The backend owns trajectory integration and energy physics; this client
//! only speaks its HTTP contract:
//! - `GET  /impact`              impact energy report
//! - `GET  /api/cities`          cities within a radius
//! - `GET  /api/evacuation-plan` ranked evacuation list
//! - `POST /api/orbital-data`    orbit path and asteroid position

use crate::core::config::AtlasConfig;
use crate::core::error::{ImpactError, Result};
use crate::core::types::City;
use crate::evacuation::EvacuationPlan;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Simulation inputs for the `/impact` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactRequest {
    /// Entry velocity (m/s)
    pub velocity: f64,
    /// Asteroid mass (kg)
    pub mass: f64,
    /// Asteroid diameter (m)
    pub diameter: f64,
    /// Entry angle (degrees from horizontal)
    pub angle: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl ImpactRequest {
    fn validate(&self) -> Result<()> {
        let positive = [
            ("velocity", self.velocity),
            ("mass", self.mass),
            ("diameter", self.diameter),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ImpactError::InvalidParameter {
                    name,
                    value: value.to_string(),
                });
            }
        }
        if !self.angle.is_finite() || self.angle <= 0.0 || self.angle > 90.0 {
            return Err(ImpactError::InvalidParameter {
                name: "angle",
                value: self.angle.to_string(),
            });
        }
        if !crate::core::types::is_valid_coordinate(self.latitude, self.longitude) {
            return Err(ImpactError::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }
        Ok(())
    }

    fn query(&self) -> [(&'static str, f64); 6] {
        [
            ("velocity", self.velocity),
            ("mass", self.mass),
            ("diameter", self.diameter),
            ("angle", self.angle),
            ("latitude", self.latitude),
            ("longitude", self.longitude),
        ]
    }
}

/// Energy report from the `/impact` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactReport {
    /// Energy delivered to the ground (J)
    pub impact_energy: f64,
    /// Same energy in tons of TNT
    pub impact_energy_tnt: f64,
    /// Energy lost during atmospheric entry (J)
    pub lost_energy: f64,
    /// Share of excavated mass escaping Earth's gravity (%)
    pub percent_to_space: f64,
    /// Same energy in Hiroshima-bomb equivalents
    pub impact_energy_hiroshima: f64,
}

#[derive(Debug, Clone, Serialize)]
struct OrbitalRequest<'a> {
    asteroid_id: &'a str,
    target_date: &'a str,
}

/// Heliocentric coordinates (AU), one entry per sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitPath {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Orbit and current position of a near-Earth asteroid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalData {
    pub asteroid_name: String,
    pub orbit_path: OrbitPath,
    pub asteroid_position: OrbitPosition,
}

/// Client for the impact-physics backend
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client against a base URL such as `http://localhost:5000`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AtlasConfig) -> Result<Self> {
        Self::new(
            config.backend_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Run the impact energy calculation
    pub async fn impact(&self, request: &ImpactRequest) -> Result<ImpactReport> {
        request.validate()?;
        let response = self
            .client
            .get(self.endpoint("/impact"))
            .query(&request.query())
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    /// Cities within `radius_km` of a point
    pub async fn cities(&self, latitude: f64, longitude: f64, radius_km: f64) -> Result<Vec<City>> {
        let response = self
            .client
            .get(self.endpoint("/api/cities"))
            .query(&[("lat", latitude), ("lon", longitude), ("radius", radius_km)])
            .send()
            .await?;
        let cities: Vec<City> = check_status(response).await?.json().await?;
        tracing::debug!("Backend returned {} cities within {} km", cities.len(), radius_km);
        Ok(cities)
    }

    /// Ranked evacuation list for an impact
    pub async fn evacuation_plan(
        &self,
        energy_megatons: f64,
        latitude: f64,
        longitude: f64,
    ) -> Result<EvacuationPlan> {
        let response = self
            .client
            .get(self.endpoint("/api/evacuation-plan"))
            .query(&[
                ("energy_mt", energy_megatons),
                ("latitude", latitude),
                ("longitude", longitude),
            ])
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    /// Orbit path and position of an asteroid on a date (YYYY-MM-DD)
    pub async fn orbital_data(&self, asteroid_id: &str, target_date: &str) -> Result<OrbitalData> {
        let response = self
            .client
            .post(self.endpoint("/api/orbital-data"))
            .json(&OrbitalRequest {
                asteroid_id,
                target_date,
            })
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }
}

/// Turn non-2xx responses into `ImpactError::Service`
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!("{} returned {}: {}", url, status, body);
    Err(ImpactError::Service {
        status: status.as_u16(),
        body,
    })
}
