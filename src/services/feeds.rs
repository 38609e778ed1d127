//! Third-party data feeds: world land boundaries and the USGS catalogue

use crate::core::config::AtlasConfig;
use crate::core::error::Result;
use crate::seismic::{parse_earthquakes, Earthquake, EarthquakeQuery};
use crate::services::backend::check_status;
use crate::terrain::boundary::LandBoundaryDataset;
use reqwest::Client;
use std::time::Duration;

pub struct FeedClient {
    client: Client,
    boundary_url: String,
    earthquake_endpoint: String,
}

impl FeedClient {
    pub fn new(
        boundary_url: impl Into<String>,
        earthquake_endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            boundary_url: boundary_url.into(),
            earthquake_endpoint: earthquake_endpoint.into(),
        })
    }

    pub fn from_config(config: &AtlasConfig) -> Result<Self> {
        Self::new(
            config.boundary_dataset_url.clone(),
            config.earthquake_endpoint.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Download and parse the land boundary dataset
    ///
    /// Load once per session and share the result; it is read-only.
    pub async fn land_boundaries(&self) -> Result<LandBoundaryDataset> {
        tracing::info!("Fetching land boundaries from {}", self.boundary_url);
        let response = self.client.get(&self.boundary_url).send().await?;
        let body = check_status(response).await?.text().await?;
        let dataset = LandBoundaryDataset::from_geojson_str(&body)?;
        tracing::info!(
            "Loaded {} land polygons ({} features skipped)",
            dataset.len(),
            dataset.skipped_features()
        );
        Ok(dataset)
    }

    /// Historical quakes matching a comparison query
    pub async fn earthquakes(&self, query: &EarthquakeQuery) -> Result<Vec<Earthquake>> {
        let url = query.to_url(&self.earthquake_endpoint)?;
        tracing::debug!("Querying earthquakes: {}", url);
        let response = self.client.get(url).send().await?;
        let body = check_status(response).await?.text().await?;
        parse_earthquakes(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ImpactError;
    use crate::core::types::ImpactPoint;

    #[test]
    fn test_from_config() {
        let client = FeedClient::from_config(&AtlasConfig::default()).unwrap();
        assert!(client.boundary_url.ends_with("countries.geojson"));
        assert!(client.earthquake_endpoint.contains("fdsnws"));
    }

    #[tokio::test]
    async fn test_bad_endpoint_fails_before_request() {
        let client = FeedClient::new("http://127.0.0.1:9/land.geojson", "::bad::", Duration::from_secs(1))
            .unwrap();
        let point = ImpactPoint::new(0.0, 0.0, 1.0).unwrap();
        let query = EarthquakeQuery::for_impact(&point, &AtlasConfig::default()).unwrap();
        let result = client.earthquakes(&query).await;
        assert!(matches!(result, Err(ImpactError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_unreachable_boundaries() {
        let client = FeedClient::new(
            "http://127.0.0.1:9/land.geojson",
            "http://127.0.0.1:9/query",
            Duration::from_secs(2),
        )
        .unwrap();
        assert!(matches!(
            client.land_boundaries().await,
            Err(ImpactError::HttpError(_))
        ));
    }
}
