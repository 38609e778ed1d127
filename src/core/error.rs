use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImpactError {
    #[error("Invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Invalid energy: {0} Mt")]
    InvalidEnergy(f64),

    #[error("Invalid zone: {0}")]
    InvalidZone(String),

    #[error("Invalid scenario parameter '{name}': {value}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("Boundary dataset error: {0}")]
    Boundary(#[from] crate::terrain::boundary::BoundaryError),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Service error ({status}): {body}")]
    Service { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ImpactError>;
