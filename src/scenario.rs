//! Impact scenario from URL query parameters
//!
//! Accepts `latitude`/`lat`, `longitude`/`lon` and `energy` (joules).
//! A link without coordinates means no scenario is loaded; it is never
//! read as the (0, 0) ocean point.

use crate::core::error::{ImpactError, Result};
use crate::core::types::ImpactPoint;
use reqwest::Url;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scenario {
    NotLoaded,
    Loaded(ImpactPoint),
}

impl Scenario {
    pub fn point(&self) -> Option<&ImpactPoint> {
        match self {
            Scenario::Loaded(point) => Some(point),
            Scenario::NotLoaded => None,
        }
    }

    /// Parse a full URL such as `https://host/map?lat=10&lon=-70&energy=4.184e15`
    pub fn from_url(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| ImpactError::InvalidUrl(format!("{}: {}", url, e)))?;
        Self::from_pairs(url.query_pairs().into_owned().collect())
    }

    /// Parse a bare query string, with or without the leading `?`
    pub fn from_query(query: &str) -> Result<Self> {
        let mut url = Url::parse("http://scenario.local/")
            .map_err(|e| ImpactError::InvalidUrl(e.to_string()))?;
        url.set_query(Some(query.trim_start_matches('?')));
        Self::from_pairs(url.query_pairs().into_owned().collect())
    }

    fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self> {
        // First occurrence of a key wins
        let mut params: HashMap<String, String> = HashMap::new();
        for (key, value) in pairs {
            params.entry(key).or_insert(value);
        }

        let latitude = first_present(&params, &["latitude", "lat"]);
        let longitude = first_present(&params, &["longitude", "lon"]);
        let (latitude, longitude) = match (latitude, longitude) {
            (Some(lat), Some(lon)) => (
                parse_number("latitude", lat)?,
                parse_number("longitude", lon)?,
            ),
            _ => {
                tracing::debug!("No impact coordinates in query; scenario not loaded");
                return Ok(Scenario::NotLoaded);
            }
        };

        let energy_joules = match first_present(&params, &["energy"]) {
            Some(raw) => parse_number("energy", raw)?,
            None => 0.0,
        };

        Ok(Scenario::Loaded(ImpactPoint::from_joules(
            latitude,
            longitude,
            energy_joules,
        )?))
    }
}

// Empty values fall through to the next alias
fn first_present<'a>(params: &'a HashMap<String, String>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| params.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

fn parse_number(name: &'static str, raw: &str) -> Result<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ImpactError::InvalidParameter {
            name,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_parameter_names() {
        let scenario =
            Scenario::from_query("latitude=10.5&longitude=-70.25&energy=4.184e15").unwrap();
        let point = scenario.point().unwrap();
        assert_eq!(point.latitude(), 10.5);
        assert_eq!(point.longitude(), -70.25);
        assert!((point.energy_megatons() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_short_parameter_names() {
        let scenario = Scenario::from_url("https://impact.example/map?lat=-33.9&lon=18.4").unwrap();
        let point = scenario.point().unwrap();
        assert_eq!(point.latitude(), -33.9);
        assert_eq!(point.energy_megatons(), 0.0);
    }

    #[test]
    fn test_long_name_preferred_and_empty_falls_back() {
        let scenario = Scenario::from_query("?latitude=1&lat=2&longitude=&lon=3").unwrap();
        let point = scenario.point().unwrap();
        assert_eq!(point.latitude(), 1.0);
        assert_eq!(point.longitude(), 3.0);
    }

    #[test]
    fn test_missing_coordinates_not_loaded() {
        assert_eq!(Scenario::from_query("").unwrap(), Scenario::NotLoaded);
        assert_eq!(Scenario::from_query("energy=1e15").unwrap(), Scenario::NotLoaded);
        assert_eq!(Scenario::from_query("lat=10").unwrap(), Scenario::NotLoaded);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Scenario::from_query("lat=north&lon=3"),
            Err(ImpactError::InvalidParameter { name: "latitude", .. })
        ));
        assert!(matches!(
            Scenario::from_query("lat=95&lon=3"),
            Err(ImpactError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            Scenario::from_query("lat=1&lon=3&energy=-5"),
            Err(ImpactError::InvalidEnergy(_))
        ));
        assert!(Scenario::from_url("not a url").is_err());
    }
}
