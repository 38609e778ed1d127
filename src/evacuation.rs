//! Evacuation plan as returned by the backend, grouped for display

use crate::zones::catalog::{guideline_for, DamageZone, EvacuationGuideline};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// One city in the backend's evacuation ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvacuationEntry {
    pub zone: String,
    pub name: String,
    /// Distance from the impact point (km)
    pub distance: f64,
    #[serde(default, deserialize_with = "crate::core::types::population_or_zero")]
    pub population: u64,
    pub order: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvacuationPlan {
    #[serde(default)]
    pub evacuation_order: Vec<EvacuationEntry>,
}

/// Evacuation entries for one zone, with its guidance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneEvacuation<'a> {
    pub zone_id: &'a str,
    pub guideline: EvacuationGuideline,
    pub entries: Vec<&'a EvacuationEntry>,
}

impl EvacuationPlan {
    pub fn is_empty(&self) -> bool {
        self.evacuation_order.is_empty()
    }

    /// Group entries under the given zones, in zone order
    ///
    /// Each group is sorted by evacuation order. Entries naming a zone that
    /// is not in `zones` are left out.
    pub fn grouped_by_zone<'a>(&'a self, zones: &'a [DamageZone]) -> Vec<ZoneEvacuation<'a>> {
        let mut by_zone: AHashMap<&str, Vec<&EvacuationEntry>> = AHashMap::new();
        for entry in &self.evacuation_order {
            by_zone.entry(entry.zone.as_str()).or_default().push(entry);
        }

        zones
            .iter()
            .map(|zone| {
                let zone_id: &str = &zone.id;
                let mut entries = by_zone.remove(zone_id).unwrap_or_default();
                entries.sort_by_key(|e| e.order);
                ZoneEvacuation {
                    zone_id,
                    guideline: guideline_for(zone_id),
                    entries,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::catalog::LAND_ZONES;

    const PLAN: &str = r#"{
        "evacuation_order": [
            {"zone": "thermal", "name": "Villa Sur", "distance": 18.2, "population": 40000, "order": 3},
            {"zone": "crater", "name": "Ground Zero", "distance": 1.1, "population": 1200, "order": 1},
            {"zone": "thermal", "name": "Puerto Alto", "distance": 12.4, "population": 90000, "order": 2},
            {"zone": "tsunami", "name": "Elsewhere", "distance": 250.0, "population": 5, "order": 9}
        ]
    }"#;

    #[test]
    fn test_group_by_zone() {
        let plan: EvacuationPlan = serde_json::from_str(PLAN).unwrap();
        let groups = plan.grouped_by_zone(&LAND_ZONES);

        assert_eq!(groups.len(), 5);
        assert_eq!(groups[0].zone_id, "crater");
        assert_eq!(groups[0].entries.len(), 1);
        assert_eq!(groups[0].guideline.title, "Crater Zone");

        let thermal: Vec<&str> = groups[1].entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(thermal, vec!["Puerto Alto", "Villa Sur"]);

        // Zones without entries still appear
        assert!(groups[4].entries.is_empty());
        // Entry for a zone outside the set is dropped
        let total: usize = groups.iter().map(|g| g.entries.len()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_missing_order_list() {
        let plan: EvacuationPlan = serde_json::from_str("{}").unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_null_population_entry_decodes_as_zero() {
        let json = r#"{
            "evacuation_order": [
                {"zone": "crater", "name": "Ground Zero", "distance": 1.1, "population": 1200, "order": 1},
                {"zone": "thermal", "name": "Unknown Hamlet", "distance": 9.0, "population": null, "order": 2},
                {"zone": "thermal", "name": "No Census", "distance": 11.0, "order": 3}
            ]
        }"#;
        let plan: EvacuationPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.evacuation_order.len(), 3);
        assert_eq!(plan.evacuation_order[0].population, 1200);
        assert_eq!(plan.evacuation_order[1].population, 0);
        assert_eq!(plan.evacuation_order[2].population, 0);
    }
}
