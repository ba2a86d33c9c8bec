//! Shared business logic for the logistics API
//!
//! Holds the artifacts loaded at startup. Nothing here is mutated after
//! construction, so the service is shared across requests behind an `Arc`.

use tracing::info;

use crate::artifacts::WarehouseArtifacts;
use crate::districts::DistrictRegistry;
use crate::error::{LogisticsError, Result};
use crate::logistics::{LogisticsEstimator, LogisticsRates, Shipment};
use crate::models::{PestPrediction, RouteEstimate, WarehouseLocation};
use crate::pests::{PestClassifierClient, RemedyBook};
use crate::pipeline::{read_inventory, AssignmentPipeline, BatchAssignment};

pub struct LogisticsService {
    registry: DistrictRegistry,
    artifacts: Option<WarehouseArtifacts>,
    rates: LogisticsRates,
    remedies: RemedyBook,
    classifier: Option<PestClassifierClient>,
}

impl LogisticsService {
    pub fn new(registry: DistrictRegistry, rates: LogisticsRates) -> Self {
        Self {
            registry,
            artifacts: None,
            rates,
            remedies: RemedyBook::default(),
            classifier: None,
        }
    }

    pub fn with_artifacts(mut self, artifacts: WarehouseArtifacts) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    pub fn with_remedies(mut self, remedies: RemedyBook) -> Self {
        self.remedies = remedies;
        self
    }

    pub fn with_classifier(mut self, classifier: PestClassifierClient) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn has_model(&self) -> bool {
        self.artifacts.is_some()
    }

    /// District names for pick-lists, alphabetical
    pub fn districts(&self) -> Vec<String> {
        self.registry.sorted_names()
    }

    /// Candidate warehouses in model order
    pub fn candidates(&self) -> Result<Vec<WarehouseLocation>> {
        let artifacts = self.require_artifacts()?;
        Ok(artifacts
            .candidates
            .iter()
            .map(|d| WarehouseLocation {
                district: d.name.clone(),
                latitude: d.location.lat,
                longitude: d.location.lon,
            })
            .collect())
    }

    /// Run the batch pipeline over an uploaded CSV body
    pub fn assign_inventory(&self, upload: &[u8]) -> Result<BatchAssignment> {
        let artifacts = self.require_artifacts()?;
        let records = read_inventory(upload).map_err(|e| match e {
            LogisticsError::Csv(err) => {
                LogisticsError::validation(format!("unreadable inventory file: {}", err))
            }
            other => other,
        })?;
        info!("Processing inventory upload with {} rows", records.len());

        AssignmentPipeline::new(
            &artifacts.coordinates,
            &artifacts.candidates,
            &artifacts.model.scaler,
            &artifacts.model.model,
        )
        .run(&records)
    }

    pub fn estimate(&self, delivery_district: &str, shipment: Shipment) -> Result<RouteEstimate> {
        LogisticsEstimator::new(&self.registry, self.rates).estimate(delivery_district, shipment)
    }

    pub fn remedy(&self, pest_type: &str) -> &str {
        self.remedies.lookup(pest_type)
    }

    pub fn classifier(&self) -> Option<&PestClassifierClient> {
        self.classifier.as_ref()
    }

    pub async fn classify(&self, image: Vec<u8>, content_type: &str) -> Result<PestPrediction> {
        let client = self
            .classifier
            .as_ref()
            .ok_or_else(|| LogisticsError::Classifier("no classifier endpoint configured".into()))?;
        client.classify(image, content_type).await
    }

    fn require_artifacts(&self) -> Result<&WarehouseArtifacts> {
        self.artifacts
            .as_ref()
            .ok_or_else(|| LogisticsError::artifact("warehouse model is not loaded"))
    }
}
