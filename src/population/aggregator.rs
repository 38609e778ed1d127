//! Affected population per damage zone
//!
//! Zones are processed in ascending radius order. Every zone reports three
//! figures:
//! - `cumulative_affected`: everyone within the zone radius
//! - `marginal_affected`: only the ring between the previous radius and this one
//! - `running_total`: the map page's stacked sum, which adds each zone's
//!   full in-radius population on top of the previous zone's running total
//!   and therefore counts inner cities again in every outer zone

use crate::core::geodesy::haversine_km;
use crate::core::types::{City, DataState};
use crate::zones::catalog::{sorted_by_radius, DamageZone};
use serde::Serialize;

/// Population figures for one zone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneTally {
    pub zone_id: String,
    pub radius_km: f64,
    /// Cities with distance <= radius
    pub cities_in_radius: usize,
    pub cumulative_affected: u64,
    pub marginal_affected: u64,
    pub running_total: u64,
}

/// Per-zone population, ordered by ascending radius
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ZonePopulation {
    tallies: Vec<ZoneTally>,
}

impl ZonePopulation {
    pub fn tallies(&self) -> &[ZoneTally] {
        &self.tallies
    }

    pub fn get(&self, zone_id: &str) -> Option<&ZoneTally> {
        self.tallies.iter().find(|t| t.zone_id == zone_id)
    }

    /// Everyone within the zone's radius
    pub fn cumulative(&self, zone_id: &str) -> Option<u64> {
        self.get(zone_id).map(|t| t.cumulative_affected)
    }

    /// Only the ring this zone adds beyond the next smaller one
    pub fn marginal(&self, zone_id: &str) -> Option<u64> {
        self.get(zone_id).map(|t| t.marginal_affected)
    }

    /// Stacked running total as shown on the impact map
    pub fn running_total(&self, zone_id: &str) -> Option<u64> {
        self.get(zone_id).map(|t| t.running_total)
    }

    /// Distinct population inside the widest zone
    pub fn total_affected(&self) -> u64 {
        self.tallies.last().map_or(0, |t| t.cumulative_affected)
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }
}

/// Population estimate that keeps "no data" apart from "nobody there"
pub type PopulationEstimate = DataState<ZonePopulation>;

/// Cities whose great-circle distance from the point is within `radius_km`
pub fn cities_within_radius<'a>(
    latitude: f64,
    longitude: f64,
    radius_km: f64,
    cities: &'a [City],
) -> Vec<&'a City> {
    cities
        .iter()
        .filter(|city| haversine_km(latitude, longitude, city.latitude, city.longitude) <= radius_km)
        .collect()
}

/// Aggregate city populations into the given zones around a point
pub fn aggregate(
    latitude: f64,
    longitude: f64,
    zones: &[DamageZone],
    cities: &[City],
) -> ZonePopulation {
    let distances: Vec<(f64, u64)> = cities
        .iter()
        .map(|city| {
            (
                haversine_km(latitude, longitude, city.latitude, city.longitude),
                city.population,
            )
        })
        .collect();

    let mut tallies = Vec::with_capacity(zones.len());
    let mut running_total: u64 = 0;
    let mut previous_radius: Option<f64> = None;

    for zone in sorted_by_radius(zones) {
        let mut cities_in_radius = 0;
        let mut zone_sum: u64 = 0;
        let mut marginal: u64 = 0;

        for &(distance, population) in &distances {
            if distance > zone.radius_km {
                continue;
            }
            cities_in_radius += 1;
            zone_sum = zone_sum.saturating_add(population);
            if previous_radius.map_or(true, |inner| distance > inner) {
                marginal = marginal.saturating_add(population);
            }
        }

        running_total = running_total.saturating_add(zone_sum);
        previous_radius = Some(zone.radius_km);

        tallies.push(ZoneTally {
            zone_id: zone.id.to_string(),
            radius_km: zone.radius_km,
            cities_in_radius,
            cumulative_affected: zone_sum,
            marginal_affected: marginal,
            running_total,
        });
    }

    tracing::debug!(
        "Aggregated {} cities into {} zones",
        cities.len(),
        tallies.len()
    );
    ZonePopulation { tallies }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::catalog::{SeverityColor, LAND_ZONES, WATER_ZONES};
    use proptest::prelude::*;

    fn zone(id: &str, radius_km: f64) -> DamageZone {
        DamageZone::new(id, radius_km, "", SeverityColor::Red).unwrap()
    }

    /// A city `km` kilometres due north of the equator/prime meridian
    fn city_north(name: &str, km: f64, population: u64) -> City {
        let latitude = km / 111.194_926_644_558_73;
        City::new(name, latitude, 0.0, population)
    }

    #[test]
    fn test_two_zone_scenario() {
        let cities = vec![city_north("A", 5.0, 1000), city_north("B", 50.0, 2000)];
        let zones = vec![zone("z1", 10.0), zone("z2", 100.0)];
        let population = aggregate(0.0, 0.0, &zones, &cities);

        assert_eq!(population.cumulative("z1"), Some(1000));
        assert_eq!(population.cumulative("z2"), Some(3000));
        assert_eq!(population.marginal("z1"), Some(1000));
        assert_eq!(population.marginal("z2"), Some(2000));
        // Stacked sum counts A again in z2
        assert_eq!(population.running_total("z1"), Some(1000));
        assert_eq!(population.running_total("z2"), Some(4000));
        assert_eq!(population.total_affected(), 3000);
    }

    #[test]
    fn test_zones_sorted_before_aggregation() {
        let cities = vec![city_north("A", 70.0, 500), city_north("B", 250.0, 700)];
        let population = aggregate(0.0, 0.0, &WATER_ZONES, &cities);
        let ids: Vec<&str> = population.tallies().iter().map(|t| t.zone_id.as_str()).collect();
        assert_eq!(ids, vec!["vapor_cloud", "tsunami"]);
        assert_eq!(population.cumulative("vapor_cloud"), Some(500));
        assert_eq!(population.cumulative("tsunami"), Some(1200));
        assert_eq!(population.running_total("tsunami"), Some(1700));
    }

    #[test]
    fn test_empty_cities() {
        let population = aggregate(10.0, 10.0, &LAND_ZONES, &[]);
        assert_eq!(population.tallies().len(), 5);
        for tally in population.tallies() {
            assert_eq!(tally.cumulative_affected, 0);
            assert_eq!(tally.marginal_affected, 0);
            assert_eq!(tally.running_total, 0);
        }
    }

    #[test]
    fn test_empty_zones() {
        let cities = vec![city_north("A", 5.0, 1000)];
        let population = aggregate(0.0, 0.0, &[], &cities);
        assert!(population.is_empty());
        assert_eq!(population.total_affected(), 0);
    }

    #[test]
    fn test_city_on_radius_is_included() {
        let cities = vec![City::new("Edge", 1.0, 0.0, 42)];
        let radius = haversine_km(0.0, 0.0, 1.0, 0.0);
        let found = cities_within_radius(0.0, 0.0, radius, &cities);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_equal_radii_have_no_marginal() {
        let cities = vec![city_north("A", 5.0, 100)];
        let zones = vec![zone("a", 10.0), zone("b", 10.0)];
        let population = aggregate(0.0, 0.0, &zones, &cities);
        assert_eq!(population.marginal("a"), Some(100));
        assert_eq!(population.marginal("b"), Some(0));
        assert_eq!(population.cumulative("b"), Some(100));
    }

    #[test]
    fn test_unavailable_is_not_zero() {
        let estimate = PopulationEstimate::unavailable("city service returned 503");
        assert!(estimate.available().is_none());
        let json = serde_json::to_value(&estimate).unwrap();
        assert_eq!(json["status"], "unavailable");

        let empty = PopulationEstimate::Available(aggregate(0.0, 0.0, &LAND_ZONES, &[]));
        assert_eq!(empty.available().map(|p| p.total_affected()), Some(0));
    }

    proptest! {
        #[test]
        fn prop_totals_are_monotonic(
            radii in prop::collection::vec(1.0f64..500.0, 1..6),
            cities in prop::collection::vec((-4.0f64..4.0, -4.0f64..4.0, 0u64..1_000_000), 0..40),
        ) {
            let zones: Vec<DamageZone> = radii
                .iter()
                .enumerate()
                .map(|(i, r)| zone(&format!("z{}", i), *r))
                .collect();
            let cities: Vec<City> = cities
                .into_iter()
                .enumerate()
                .map(|(i, (lat, lon, pop))| City::new(format!("c{}", i), lat, lon, pop))
                .collect();

            let population = aggregate(0.0, 0.0, &zones, &cities);
            let tallies = population.tallies();
            for pair in tallies.windows(2) {
                prop_assert!(pair[0].radius_km <= pair[1].radius_km);
                prop_assert!(pair[0].cumulative_affected <= pair[1].cumulative_affected);
                prop_assert!(pair[0].running_total <= pair[1].running_total);
                prop_assert!(pair[0].cities_in_radius <= pair[1].cities_in_radius);
            }
            let marginal_sum: u64 = tallies.iter().map(|t| t.marginal_affected).sum();
            prop_assert_eq!(marginal_sum, population.total_affected());
        }
    }
}
