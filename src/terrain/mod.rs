//! Land / water / coastal classification against world land polygons

pub mod boundary;
pub mod classifier;

pub use boundary::{BoundaryError, LandBoundaryDataset, LandPolygon};
pub use classifier::{GeoClassifier, TerrainClassification, TerrainKind};
