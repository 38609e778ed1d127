pub mod catalog;

pub use catalog::{guideline_for, zones_for, DamageZone, EvacuationGuideline, SeverityColor};
