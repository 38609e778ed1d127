pub mod config;
pub mod error;
pub mod geodesy;
pub mod types;

pub use config::AtlasConfig;
pub use error::{ImpactError, Result};
pub use geodesy::haversine_km;
pub use types::{City, ImpactPoint};
