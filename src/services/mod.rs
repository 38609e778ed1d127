//! HTTP clients for the services this crate consumes

pub mod backend;
pub mod feeds;

pub use backend::{BackendClient, ImpactReport, ImpactRequest, OrbitalData};
pub use feeds::FeedClient;
