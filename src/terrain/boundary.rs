//! Load world landmass polygons from GeoJSON
//!
//! `LandBoundaryDataset` turns a GeoJSON FeatureCollection of country
//! shapes into plain `geo-types` polygons. MultiPolygon features are
//! expanded into independent polygons. Features with missing or malformed
//! geometry are skipped with a warning rather than failing the whole load.

use geo::BoundingRect;
use geo_types::{Coord, LineString, Polygon, Rect};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// Errors that make the whole dataset unusable
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// JSON parsing failed
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Document parsed but is not a FeatureCollection
    #[error("Not a GeoJSON FeatureCollection: {0}")]
    NotFeatureCollection(String),
    /// File I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// One simple polygon of land, with the name of the feature it came from
#[derive(Debug, Clone)]
pub struct LandPolygon {
    pub name: Option<String>,
    pub polygon: Polygon<f64>,
    bounds: Option<Rect<f64>>,
}

impl LandPolygon {
    pub fn new(name: Option<String>, polygon: Polygon<f64>) -> Self {
        let bounds = polygon.bounding_rect();
        Self {
            name,
            polygon,
            bounds,
        }
    }

    /// Cheap rejection test before the exact containment check
    pub fn bounds_contain(&self, coord: Coord<f64>) -> bool {
        match self.bounds {
            Some(rect) => {
                coord.x >= rect.min().x
                    && coord.x <= rect.max().x
                    && coord.y >= rect.min().y
                    && coord.y <= rect.max().y
            }
            None => false,
        }
    }
}

/// Read-only set of land polygons shared across classification queries
#[derive(Debug, Clone, Default)]
pub struct LandBoundaryDataset {
    polygons: Vec<LandPolygon>,
    skipped_features: usize,
}

impl LandBoundaryDataset {
    /// Build a dataset directly from polygons
    pub fn from_polygons(polygons: Vec<LandPolygon>) -> Self {
        Self {
            polygons,
            skipped_features: 0,
        }
    }

    /// Parse a GeoJSON FeatureCollection string
    pub fn from_geojson_str(json: &str) -> Result<Self, BoundaryError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_geojson_value(&value)
    }

    /// Load a GeoJSON FeatureCollection file from disk
    pub fn from_file(path: &Path) -> Result<Self, BoundaryError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_geojson_str(&content)
    }

    /// Convert an already-parsed GeoJSON document
    pub fn from_geojson_value(value: &Value) -> Result<Self, BoundaryError> {
        let kind = value.get("type").and_then(Value::as_str).unwrap_or("");
        if kind != "FeatureCollection" {
            return Err(BoundaryError::NotFeatureCollection(format!(
                "type is '{}'",
                kind
            )));
        }
        let features = value
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| BoundaryError::NotFeatureCollection("missing features array".into()))?;

        let mut dataset = Self::default();
        for (index, feature) in features.iter().enumerate() {
            let name = feature_name(feature);
            match feature_polygons(feature) {
                Ok(polygons) => {
                    dataset.polygons.extend(
                        polygons
                            .into_iter()
                            .map(|polygon| LandPolygon::new(name.clone(), polygon)),
                    );
                }
                Err(reason) => {
                    tracing::warn!(
                        "Skipping invalid feature #{} ({}): {}",
                        index,
                        name.as_deref().unwrap_or("unnamed"),
                        reason
                    );
                    dataset.skipped_features += 1;
                }
            }
        }

        tracing::debug!(
            "Loaded {} land polygons ({} features skipped)",
            dataset.polygons.len(),
            dataset.skipped_features
        );
        Ok(dataset)
    }

    pub fn polygons(&self) -> &[LandPolygon] {
        &self.polygons
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Number of features dropped for malformed geometry
    pub fn skipped_features(&self) -> usize {
        self.skipped_features
    }
}

fn feature_name(feature: &Value) -> Option<String> {
    let properties = feature.get("properties")?;
    ["ADMIN", "name", "NAME"]
        .iter()
        .find_map(|key| properties.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn feature_polygons(feature: &Value) -> Result<Vec<Polygon<f64>>, String> {
    let geometry = feature
        .get("geometry")
        .filter(|g| !g.is_null())
        .ok_or("missing geometry")?;
    let coordinates = geometry.get("coordinates").ok_or("missing coordinates")?;

    match geometry.get("type").and_then(Value::as_str) {
        Some("Polygon") => Ok(vec![parse_polygon(coordinates)?]),
        Some("MultiPolygon") => coordinates
            .as_array()
            .ok_or("MultiPolygon coordinates are not an array")?
            .iter()
            .map(parse_polygon)
            .collect(),
        Some(other) => Err(format!("unsupported geometry type '{}'", other)),
        None => Err("geometry has no type".into()),
    }
}

fn parse_polygon(rings: &Value) -> Result<Polygon<f64>, String> {
    let rings = rings.as_array().ok_or("polygon rings are not an array")?;
    let (exterior, interiors) = rings.split_first().ok_or("polygon has no rings")?;
    let exterior = parse_ring(exterior)?;
    let interiors = interiors
        .iter()
        .map(parse_ring)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn parse_ring(ring: &Value) -> Result<LineString<f64>, String> {
    let positions = ring.as_array().ok_or("ring is not an array")?;
    if positions.len() < 4 {
        return Err(format!("ring has {} positions, need at least 4", positions.len()));
    }
    let coords = positions
        .iter()
        .map(parse_position)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LineString::from(coords))
}

fn parse_position(position: &Value) -> Result<Coord<f64>, String> {
    let pair = position.as_array().ok_or("position is not an array")?;
    let x = pair.first().and_then(Value::as_f64);
    let y = pair.get(1).and_then(Value::as_f64);
    match (x, y) {
        (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Ok(Coord { x, y }),
        _ => Err(format!("bad position {}", position)),
    }
}
