//! Land / open water / coastal classification of an impact point

use crate::core::geodesy::haversine_km;
use crate::core::types::ImpactPoint;
use crate::terrain::boundary::{LandBoundaryDataset, LandPolygon};
use derive_more::Display;
use geo::{Closest, HaversineClosestPoint, Intersects};
use geo_types::{LineString, Point};
use serde::Serialize;

/// Default distance below which a water impact is treated as coastal (km)
pub const DEFAULT_COASTAL_THRESHOLD_KM: f64 = 30.0;

/// Coarse terrain label used to pick a zone set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum TerrainKind {
    #[display(fmt = "Land Impact")]
    Land,
    #[display(fmt = "Water Impact")]
    Water,
    #[display(fmt = "Coastal Impact")]
    Coastal,
}

/// Result of classifying one point against the land dataset
///
/// `is_coastal` implies `is_water`, and `distance_to_land_km` is zero
/// exactly when the point is on land.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerrainClassification {
    pub is_water: bool,
    pub is_coastal: bool,
    pub distance_to_land_km: f64,
    /// Containing feature for land hits, nearest feature for water
    pub nearest_land: Option<String>,
}

impl TerrainClassification {
    pub fn land(name: Option<String>) -> Self {
        Self {
            is_water: false,
            is_coastal: false,
            distance_to_land_km: 0.0,
            nearest_land: name,
        }
    }

    pub fn kind(&self) -> TerrainKind {
        if self.is_coastal {
            TerrainKind::Coastal
        } else if self.is_water {
            TerrainKind::Water
        } else {
            TerrainKind::Land
        }
    }
}

/// Point-in-polygon and nearest-coastline tests over a land dataset
#[derive(Debug, Clone, Copy)]
pub struct GeoClassifier {
    coastal_threshold_km: f64,
}

impl Default for GeoClassifier {
    fn default() -> Self {
        Self {
            coastal_threshold_km: DEFAULT_COASTAL_THRESHOLD_KM,
        }
    }
}

impl GeoClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coastal_threshold(coastal_threshold_km: f64) -> Self {
        Self {
            coastal_threshold_km,
        }
    }

    pub fn coastal_threshold_km(&self) -> f64 {
        self.coastal_threshold_km
    }

    /// Classify an impact point
    pub fn classify_impact(
        &self,
        point: &ImpactPoint,
        boundaries: &LandBoundaryDataset,
    ) -> TerrainClassification {
        self.classify(point.latitude(), point.longitude(), boundaries)
    }

    /// Classify a lat/lon pair
    ///
    /// The first polygon containing the point (boundary inclusive) wins and
    /// the point is land. Otherwise the point is water and the distance to
    /// the closest polygon outline decides whether it is coastal.
    pub fn classify(
        &self,
        latitude: f64,
        longitude: f64,
        boundaries: &LandBoundaryDataset,
    ) -> TerrainClassification {
        let point = Point::new(longitude, latitude);
        let mut min_distance = f64::INFINITY;
        let mut nearest: Option<&LandPolygon> = None;

        for land in boundaries.polygons() {
            if land.bounds_contain(point.0) && land.polygon.intersects(&point) {
                tracing::debug!(
                    "({:.4}, {:.4}) is on land: {}",
                    latitude,
                    longitude,
                    land.name.as_deref().unwrap_or("unnamed")
                );
                return TerrainClassification::land(land.name.clone());
            }

            let distance = distance_to_outline_km(&point, land);
            if distance < min_distance {
                min_distance = distance;
                nearest = Some(land);
            }
        }

        let is_coastal = min_distance < self.coastal_threshold_km;
        tracing::debug!(
            "({:.4}, {:.4}) is water, {:.1} km from land (coastal: {})",
            latitude,
            longitude,
            min_distance,
            is_coastal
        );

        TerrainClassification {
            is_water: true,
            is_coastal,
            distance_to_land_km: min_distance,
            nearest_land: nearest.and_then(|land| land.name.clone()),
        }
    }
}

/// Great-circle distance from a point to the nearest point of a polygon's
/// outline (exterior plus holes)
fn distance_to_outline_km(point: &Point<f64>, land: &LandPolygon) -> f64 {
    std::iter::once(land.polygon.exterior())
        .chain(land.polygon.interiors())
        .map(|ring| distance_to_ring_km(point, ring))
        .fold(f64::INFINITY, f64::min)
}

fn distance_to_ring_km(point: &Point<f64>, ring: &LineString<f64>) -> f64 {
    let from = |p: Point<f64>| haversine_km(point.y(), point.x(), p.y(), p.x());
    ring.lines()
        .map(|segment| match segment.haversine_closest_point(point) {
            Closest::Intersection(p) | Closest::SinglePoint(p) => from(p),
            // Zero-length segment: both ends are the same vertex
            Closest::Indeterminate => from(segment.start_point()),
        })
        .filter(|d| !d.is_nan())
        .fold(f64::INFINITY, f64::min)
}
