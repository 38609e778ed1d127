//! Core type definitions used throughout the codebase

use crate::core::error::{ImpactError, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Joules released by one megaton of TNT
pub const JOULES_PER_MEGATON: f64 = 4.184e15;

/// Joules released by one ton of TNT
pub const JOULES_PER_TNT_TON: f64 = 4.184e9;

/// Joules released by the Hiroshima bomb
pub const JOULES_PER_HIROSHIMA: f64 = 6.3e13;

pub fn joules_to_megatons(joules: f64) -> f64 {
    joules / JOULES_PER_MEGATON
}

pub fn megatons_to_joules(megatons: f64) -> f64 {
    megatons * JOULES_PER_MEGATON
}

pub fn joules_to_tnt_tons(joules: f64) -> f64 {
    joules / JOULES_PER_TNT_TON
}

pub fn joules_to_hiroshima(joules: f64) -> f64 {
    joules / JOULES_PER_HIROSHIMA
}

/// Where and how hard an impact lands
///
/// Fields are private so a constructed point is always within range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpactPoint {
    latitude: f64,
    longitude: f64,
    energy_megatons: f64,
}

impl ImpactPoint {
    /// Validate and build an impact point
    ///
    /// Latitude must lie in [-90, 90], longitude in [-180, 180] and the
    /// energy must be a finite, non-negative number of megatons.
    pub fn new(latitude: f64, longitude: f64, energy_megatons: f64) -> Result<Self> {
        if !is_valid_coordinate(latitude, longitude) {
            return Err(ImpactError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        if !energy_megatons.is_finite() || energy_megatons < 0.0 {
            return Err(ImpactError::InvalidEnergy(energy_megatons));
        }
        Ok(Self {
            latitude,
            longitude,
            energy_megatons,
        })
    }

    /// Build an impact point from an energy given in joules
    pub fn from_joules(latitude: f64, longitude: f64, energy_joules: f64) -> Result<Self> {
        Self::new(latitude, longitude, joules_to_megatons(energy_joules))
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn energy_megatons(&self) -> f64 {
        self.energy_megatons
    }

    pub fn energy_joules(&self) -> f64 {
        megatons_to_joules(self.energy_megatons)
    }
}

pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

/// A populated place returned by the city query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, deserialize_with = "population_or_zero")]
    pub population: u64,
}

impl City {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64, population: u64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            population,
        }
    }
}

// The city feed sends null or fractional populations for some rows
pub(crate) fn population_or_zero<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = Option::deserialize(deserializer)?;
    Ok(value
        .filter(|p| p.is_finite() && *p > 0.0)
        .map(|p| p.round() as u64)
        .unwrap_or(0))
}

/// Outcome of an optional external lookup
///
/// Keeps "the service failed" apart from "the service returned nothing".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum DataState<T> {
    Available(T),
    Unavailable { reason: String },
    NotRequested,
}

impl<T> DataState<T> {
    pub fn unavailable(reason: impl std::fmt::Display) -> Self {
        DataState::Unavailable {
            reason: reason.to_string(),
        }
    }

    pub fn available(&self) -> Option<&T> {
        match self {
            DataState::Available(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, DataState::Available(_))
    }
}

impl<T> From<Result<T>> for DataState<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => DataState::Available(value),
            Err(e) => DataState::unavailable(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_point_validation() {
        assert!(ImpactPoint::new(10.0, -70.0, 1.0).is_ok());
        assert!(ImpactPoint::new(90.0, 180.0, 0.0).is_ok());
        assert!(matches!(
            ImpactPoint::new(91.0, 0.0, 1.0),
            Err(ImpactError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            ImpactPoint::new(0.0, -180.5, 1.0),
            Err(ImpactError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            ImpactPoint::new(0.0, 0.0, -1.0),
            Err(ImpactError::InvalidEnergy(_))
        ));
        assert!(ImpactPoint::new(f64::NAN, 0.0, 1.0).is_err());
        assert!(ImpactPoint::new(0.0, 0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_energy_conversions() {
        let point = ImpactPoint::from_joules(0.0, 0.0, 4.184e15).unwrap();
        assert!((point.energy_megatons() - 1.0).abs() < 1e-12);
        assert!((point.energy_joules() - 4.184e15).abs() < 1.0);
        assert!((joules_to_tnt_tons(4.184e9) - 1.0).abs() < 1e-12);
        assert!((joules_to_hiroshima(6.3e13) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_data_state_from_result() {
        let ok: DataState<u32> = Ok(7).into();
        assert_eq!(ok.available(), Some(&7));

        let failed: DataState<u32> = Err(ImpactError::InvalidEnergy(-1.0)).into();
        assert!(!failed.is_available());
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "unavailable");
        assert_eq!(json["data"]["reason"], "Invalid energy: -1 Mt");

        let skipped: DataState<Vec<u32>> = DataState::NotRequested;
        assert_eq!(serde_json::to_value(&skipped).unwrap()["status"], "not_requested");
    }

    #[test]
    fn test_city_population_defaults() {
        let json = r#"[
            {"name": "A", "latitude": 1.0, "longitude": 2.0, "population": 1500},
            {"name": "B", "latitude": 1.0, "longitude": 2.0, "population": null},
            {"name": "C", "latitude": 1.0, "longitude": 2.0}
        ]"#;
        let cities: Vec<City> = serde_json::from_str(json).unwrap();
        assert_eq!(cities[0].population, 1500);
        assert_eq!(cities[1].population, 0);
        assert_eq!(cities[2].population, 0);
    }
}
