pub mod aggregator;

pub use aggregator::{aggregate, PopulationEstimate, ZonePopulation, ZoneTally};
