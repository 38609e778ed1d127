//! End-to-end impact assessment
//!
//! Classification, zone selection and aggregation are synchronous and
//! pure. Only the city, evacuation and earthquake lookups suspend, and any
//! one of them failing degrades that part of the assessment instead of
//! failing the whole run.
//!
//! Superseded scenarios are handled with generation tokens: each run takes
//! a token from `ScenarioTracker::begin` and its result is only kept if no
//! newer run has started since.

use crate::core::config::AtlasConfig;
use crate::core::error::Result;
use crate::core::types::{City, DataState, ImpactPoint};
use crate::evacuation::EvacuationPlan;
use crate::population::aggregator::{aggregate, PopulationEstimate};
use crate::seismic::{rounded_magnitude, Earthquake, EarthquakeQuery};
use crate::services::backend::BackendClient;
use crate::services::feeds::FeedClient;
use crate::terrain::boundary::LandBoundaryDataset;
use crate::terrain::classifier::{GeoClassifier, TerrainClassification, TerrainKind};
use crate::zones::catalog::{max_radius_km, zones_for, DamageZone};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// External lookups the pipeline depends on
#[allow(async_fn_in_trait)]
pub trait ImpactServices {
    async fn cities(&self, latitude: f64, longitude: f64, radius_km: f64) -> Result<Vec<City>>;

    async fn evacuation_plan(
        &self,
        energy_megatons: f64,
        latitude: f64,
        longitude: f64,
    ) -> Result<EvacuationPlan>;

    async fn earthquakes(&self, query: &EarthquakeQuery) -> Result<Vec<Earthquake>>;
}

/// Real HTTP services
pub struct LiveServices {
    pub backend: BackendClient,
    pub feeds: FeedClient,
}

impl LiveServices {
    pub fn from_config(config: &AtlasConfig) -> Result<Self> {
        Ok(Self {
            backend: BackendClient::from_config(config)?,
            feeds: FeedClient::from_config(config)?,
        })
    }
}

impl ImpactServices for LiveServices {
    async fn cities(&self, latitude: f64, longitude: f64, radius_km: f64) -> Result<Vec<City>> {
        self.backend.cities(latitude, longitude, radius_km).await
    }

    async fn evacuation_plan(
        &self,
        energy_megatons: f64,
        latitude: f64,
        longitude: f64,
    ) -> Result<EvacuationPlan> {
        self.backend
            .evacuation_plan(energy_megatons, latitude, longitude)
            .await
    }

    async fn earthquakes(&self, query: &EarthquakeQuery) -> Result<Vec<Earthquake>> {
        self.feeds.earthquakes(query).await
    }
}

/// Everything known about one impact scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactAssessment {
    pub point: ImpactPoint,
    pub classification: TerrainClassification,
    pub kind: TerrainKind,
    /// Zone set in catalog order
    pub zones: Vec<DamageZone>,
    pub population: PopulationEstimate,
    pub evacuation: DataState<EvacuationPlan>,
    /// Equivalent magnitude, absent for zero energy
    pub magnitude: Option<f64>,
    pub earthquakes: DataState<Vec<Earthquake>>,
}

impl ImpactAssessment {
    pub fn new(
        point: ImpactPoint,
        classification: TerrainClassification,
        zones: &[DamageZone],
        population: PopulationEstimate,
        evacuation: DataState<EvacuationPlan>,
        earthquakes: DataState<Vec<Earthquake>>,
    ) -> Self {
        Self {
            point,
            kind: classification.kind(),
            classification,
            zones: zones.to_vec(),
            population,
            evacuation,
            magnitude: rounded_magnitude(point.energy_megatons()),
            earthquakes,
        }
    }
}

/// Classification and zone selection for one point
pub fn classify_point(
    classifier: &GeoClassifier,
    boundaries: &LandBoundaryDataset,
    point: &ImpactPoint,
) -> (TerrainClassification, &'static [DamageZone]) {
    let classification = classifier.classify_impact(point, boundaries);
    let zones = zones_for(&classification);
    (classification, zones)
}

/// Assessment from local data only
///
/// Population is aggregated when a city list is given and left
/// `NotRequested` otherwise. Evacuation and earthquakes are never fetched.
pub fn assess_offline(
    classifier: &GeoClassifier,
    boundaries: &LandBoundaryDataset,
    point: ImpactPoint,
    cities: Option<&[City]>,
) -> ImpactAssessment {
    let (classification, zones) = classify_point(classifier, boundaries, &point);
    let population = match cities {
        Some(cities) => DataState::Available(aggregate(
            point.latitude(),
            point.longitude(),
            zones,
            cities,
        )),
        None => DataState::NotRequested,
    };
    ImpactAssessment::new(
        point,
        classification,
        zones,
        population,
        DataState::NotRequested,
        DataState::NotRequested,
    )
}

/// Runs assessments against a shared land dataset
pub struct ImpactPipeline<S> {
    services: S,
    boundaries: Arc<LandBoundaryDataset>,
    classifier: GeoClassifier,
    config: AtlasConfig,
}

impl<S: ImpactServices> ImpactPipeline<S> {
    pub fn new(services: S, boundaries: Arc<LandBoundaryDataset>, config: AtlasConfig) -> Self {
        Self {
            services,
            boundaries,
            classifier: GeoClassifier::with_coastal_threshold(config.coastal_threshold_km),
            config,
        }
    }

    /// Classify and pick zones without touching any service
    pub fn classify(&self, point: &ImpactPoint) -> (TerrainClassification, &'static [DamageZone]) {
        classify_point(&self.classifier, &self.boundaries, point)
    }

    /// Full assessment for one point
    pub async fn assess(&self, point: ImpactPoint) -> ImpactAssessment {
        let (classification, zones) = self.classify(&point);
        let kind = classification.kind();
        tracing::info!(
            "Impact at ({:.4}, {:.4}): {} ({} zones)",
            point.latitude(),
            point.longitude(),
            kind,
            zones.len()
        );

        let earthquake_query = EarthquakeQuery::for_impact(&point, &self.config);
        let (lat, lon) = (point.latitude(), point.longitude());

        let population = async {
            let Some(radius) = max_radius_km(zones) else {
                return DataState::NotRequested;
            };
            match self.services.cities(lat, lon, radius).await {
                Ok(cities) => DataState::Available(aggregate(lat, lon, zones, &cities)),
                Err(e) => {
                    tracing::warn!("Error loading city data: {}", e);
                    DataState::unavailable(e)
                }
            }
        };

        let evacuation = async {
            match self
                .services
                .evacuation_plan(point.energy_megatons(), lat, lon)
                .await
            {
                Ok(plan) => DataState::Available(plan),
                Err(e) => {
                    tracing::warn!("Error loading evacuation plan: {}", e);
                    DataState::unavailable(e)
                }
            }
        };

        let earthquakes = async {
            let Some(query) = earthquake_query.as_ref() else {
                return DataState::NotRequested;
            };
            match self.services.earthquakes(query).await {
                Ok(quakes) => DataState::Available(quakes),
                Err(e) => {
                    tracing::warn!("Error fetching earthquakes: {}", e);
                    DataState::unavailable(e)
                }
            }
        };

        let (population, evacuation, earthquakes) =
            tokio::join!(population, evacuation, earthquakes);

        ImpactAssessment::new(
            point,
            classification,
            zones,
            population,
            evacuation,
            earthquakes,
        )
    }

    /// Assess under a generation token and keep the result only if it is
    /// still the newest scenario
    pub async fn assess_tracked(&self, tracker: &ScenarioTracker, point: ImpactPoint) -> bool {
        let generation = tracker.begin();
        let assessment = self.assess(point).await;
        tracker.commit(generation, assessment)
    }
}

/// Token identifying one assessment run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

/// Holds the latest committed assessment and rejects stale ones
#[derive(Debug, Default)]
pub struct ScenarioTracker {
    latest: AtomicU64,
    current: Mutex<Option<(Generation, ImpactAssessment)>>,
}

impl ScenarioTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new scenario; every earlier generation becomes stale
    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::SeqCst) == generation.0
    }

    /// Store a result if its generation is still the newest
    pub fn commit(&self, generation: Generation, assessment: ImpactAssessment) -> bool {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if !self.is_current(generation) {
            tracing::debug!(
                "Dropping stale assessment (generation {}, latest {})",
                generation.0,
                self.latest.load(Ordering::SeqCst)
            );
            return false;
        }
        *current = Some((generation, assessment));
        true
    }

    /// Most recent committed assessment
    pub fn current(&self) -> Option<ImpactAssessment> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|(_, assessment)| assessment.clone())
    }
}
