//! Static damage-zone catalogs keyed by terrain
//!
//! Radii are fixed catalog values and do not scale with impact energy.

use crate::core::error::{ImpactError, Result};
use crate::terrain::classifier::{TerrainClassification, TerrainKind};
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::borrow::Cow;

/// Colour token used to draw a zone ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityColor {
    Black,
    Red,
    Orange,
    Yellow,
    Gray,
    Blue,
    #[serde(rename = "lightblue")]
    LightBlue,
    Purple,
}

/// One concentric ring around the impact point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageZone {
    pub id: Cow<'static, str>,
    pub radius_km: f64,
    pub description: Cow<'static, str>,
    pub color: SeverityColor,
}

impl DamageZone {
    /// Build a caller-defined zone
    pub fn new(
        id: impl Into<String>,
        radius_km: f64,
        description: impl Into<String>,
        color: SeverityColor,
    ) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(ImpactError::InvalidZone("zone id is empty".into()));
        }
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(ImpactError::InvalidZone(format!(
                "zone '{}' has radius {} km",
                id, radius_km
            )));
        }
        Ok(Self {
            id: Cow::Owned(id),
            radius_km,
            description: Cow::Owned(description.into()),
            color,
        })
    }

    const fn fixed(
        id: &'static str,
        radius_km: f64,
        description: &'static str,
        color: SeverityColor,
    ) -> Self {
        Self {
            id: Cow::Borrowed(id),
            radius_km,
            description: Cow::Borrowed(description),
            color,
        }
    }
}

pub static LAND_ZONES: [DamageZone; 5] = [
    DamageZone::fixed("crater", 3.0, "Permanent impact crater zone.", SeverityColor::Black),
    DamageZone::fixed(
        "thermal",
        25.0,
        "Severe burns and fires from thermal radiation.",
        SeverityColor::Red,
    ),
    DamageZone::fixed("airblast", 60.0, "Shockwave destruction.", SeverityColor::Orange),
    DamageZone::fixed("ejecta", 120.0, "Secondary impacts and debris.", SeverityColor::Yellow),
    DamageZone::fixed("seismic", 200.0, "Major seismic damage.", SeverityColor::Gray),
];

// Stored widest first; consumers sort by radius before aggregating
pub static WATER_ZONES: [DamageZone; 2] = [
    DamageZone::fixed(
        "tsunami",
        300.0,
        "Massive tsunami generation and coastal flooding.",
        SeverityColor::Blue,
    ),
    DamageZone::fixed(
        "vapor_cloud",
        80.0,
        "Water vapor cloud and atmospheric effects.",
        SeverityColor::LightBlue,
    ),
];

pub static COASTAL_ZONES: [DamageZone; 2] = [
    DamageZone::fixed(
        "mixed_wave",
        150.0,
        "Coastal tsunami and partial land flooding.",
        SeverityColor::Purple,
    ),
    DamageZone::fixed(
        "shockwave",
        40.0,
        "Shockwave from near-shore explosion.",
        SeverityColor::Orange,
    ),
];

/// Zone set for a terrain label
pub fn zones_for_kind(kind: TerrainKind) -> &'static [DamageZone] {
    match kind {
        TerrainKind::Coastal => &COASTAL_ZONES,
        TerrainKind::Water => &WATER_ZONES,
        TerrainKind::Land => &LAND_ZONES,
    }
}

/// Zone set for a classification, in catalog storage order
pub fn zones_for(classification: &TerrainClassification) -> &'static [DamageZone] {
    zones_for_kind(classification.kind())
}

/// Zones ordered by ascending radius
pub fn sorted_by_radius(zones: &[DamageZone]) -> Vec<&DamageZone> {
    let mut sorted: Vec<&DamageZone> = zones.iter().collect();
    sorted.sort_by_key(|zone| OrderedFloat(zone.radius_km));
    sorted
}

/// Largest radius in a zone set, if any
pub fn max_radius_km(zones: &[DamageZone]) -> Option<f64> {
    zones
        .iter()
        .map(|zone| OrderedFloat(zone.radius_km))
        .max()
        .map(|r| r.0)
}

/// Check a caller-supplied zone set: positive radii and unique ids
pub fn validate_zone_set(zones: &[DamageZone]) -> Result<()> {
    for (i, zone) in zones.iter().enumerate() {
        if !zone.radius_km.is_finite() || zone.radius_km <= 0.0 {
            return Err(ImpactError::InvalidZone(format!(
                "zone '{}' has radius {} km",
                zone.id, zone.radius_km
            )));
        }
        if zones[..i].iter().any(|other| other.id == zone.id) {
            return Err(ImpactError::InvalidZone(format!("duplicate zone id '{}'", zone.id)));
        }
    }
    Ok(())
}

/// What residents of a zone are told to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EvacuationGuideline {
    pub title: &'static str,
    pub guideline: &'static str,
}

const FALLBACK_GUIDELINE: &str = "Follow local emergency instructions.";

/// Guidance for a zone id; unknown zones get a generic instruction
pub fn guideline_for(zone_id: &str) -> EvacuationGuideline {
    let (title, guideline) = match zone_id {
        "crater" => (
            "Crater Zone",
            "Immediate and mandatory evacuation. No entry until cleared by authorities.",
        ),
        "thermal" => (
            "Thermal Zone",
            "Evacuate immediately. Severe burns and fires possible. Seek shelter far from the impact.",
        ),
        "airblast" => (
            "Airblast Zone",
            "Evacuate as soon as possible. Shockwave damage expected. Follow official evacuation routes.",
        ),
        "ejecta" => (
            "Ejecta Zone",
            "Evacuate if possible. Risk of falling debris and secondary impacts.",
        ),
        "seismic" => (
            "Seismic Zone",
            "Prepare for evacuation. Major seismic damage possible. Follow local emergency instructions.",
        ),
        "tsunami" => (
            "Tsunami Zone",
            "Evacuate to higher ground immediately. Massive tsunami and flooding expected.",
        ),
        "vapor_cloud" => (
            "Vapor Cloud Zone",
            "Evacuate if possible. Water vapor and atmospheric effects may be hazardous.",
        ),
        "mixed_wave" => (
            "Mixed Wave Zone",
            "Evacuate coastal areas. Tsunami and partial flooding possible.",
        ),
        "shockwave" => (
            "Shockwave Zone",
            "Evacuate as soon as possible. Shockwave damage expected.",
        ),
        _ => ("Zone", FALLBACK_GUIDELINE),
    };
    EvacuationGuideline { title, guideline }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification(is_water: bool, is_coastal: bool, distance: f64) -> TerrainClassification {
        TerrainClassification {
            is_water,
            is_coastal,
            distance_to_land_km: distance,
            nearest_land: None,
        }
    }

    #[test]
    fn test_zone_selection() {
        let land = zones_for(&classification(false, false, 0.0));
        assert_eq!(land.len(), 5);
        assert_eq!(land[0].id, "crater");

        let water = zones_for(&classification(true, false, 120.0));
        assert_eq!(water[0].id, "tsunami");

        let coastal = zones_for(&classification(true, true, 12.0));
        assert_eq!(coastal[0].id, "mixed_wave");
    }

    #[test]
    fn test_zones_for_is_pure() {
        let c = classification(true, true, 5.0);
        let a = zones_for(&c);
        let b = zones_for(&c);
        assert!(std::ptr::eq(a, b));
        assert_eq!(a, b);
    }

    #[test]
    fn test_land_radii() {
        let radii: Vec<f64> = LAND_ZONES.iter().map(|z| z.radius_km).collect();
        assert_eq!(radii, vec![3.0, 25.0, 60.0, 120.0, 200.0]);
    }

    #[test]
    fn test_sorted_by_radius() {
        let sorted = sorted_by_radius(&WATER_ZONES);
        assert_eq!(sorted[0].id, "vapor_cloud");
        assert_eq!(sorted[1].id, "tsunami");
        assert_eq!(max_radius_km(&WATER_ZONES), Some(300.0));
        assert_eq!(max_radius_km(&[]), None);
    }

    #[test]
    fn test_zone_validation() {
        assert!(DamageZone::new("z1", 0.0, "", SeverityColor::Red).is_err());
        assert!(DamageZone::new("", 10.0, "", SeverityColor::Red).is_err());

        let z1 = DamageZone::new("z1", 10.0, "inner", SeverityColor::Red).unwrap();
        let dup = DamageZone::new("z1", 20.0, "outer", SeverityColor::Gray).unwrap();
        assert!(validate_zone_set(&[z1.clone()]).is_ok());
        assert!(validate_zone_set(&[z1, dup]).is_err());
        assert!(validate_zone_set(&LAND_ZONES).is_ok());
    }

    #[test]
    fn test_guidelines() {
        assert_eq!(guideline_for("crater").title, "Crater Zone");
        for zone in LAND_ZONES.iter().chain(&WATER_ZONES).chain(&COASTAL_ZONES) {
            assert_ne!(guideline_for(&zone.id).guideline, FALLBACK_GUIDELINE);
        }
        assert_eq!(guideline_for("z9").guideline, FALLBACK_GUIDELINE);
    }

    #[test]
    fn test_color_tokens_serialize() {
        let json = serde_json::to_string(&SeverityColor::LightBlue).unwrap();
        assert_eq!(json, "\"lightblue\"");
        let json = serde_json::to_string(&SeverityColor::Gray).unwrap();
        assert_eq!(json, "\"gray\"");
    }
}
