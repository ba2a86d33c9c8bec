//! Pest advisory: remedy lookup and the external image classifier client

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Duration;

use csv::ReaderBuilder;
use tracing::{debug, warn};

use crate::error::{LogisticsError, Result};
use crate::models::{PestPrediction, RemedyRow};

pub const NO_REMEDY: &str = "No specific remedy found for this pest.";

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
const TABLE_EXTENSIONS: &[&str] = &["csv"];

/// Kind of upload a form field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Table,
}

/// Check a client-supplied filename against the allowed extensions
pub fn allowed_file(filename: &str, kind: UploadKind) -> bool {
    let Some((stem, ext)) = filename.rsplit_once('.') else {
        return false;
    };
    if stem.is_empty() {
        return false;
    }
    let ext = ext.to_ascii_lowercase();
    let allowed = match kind {
        UploadKind::Image => IMAGE_EXTENSIONS,
        UploadKind::Table => TABLE_EXTENSIONS,
    };
    allowed.contains(&ext.as_str())
}

/// Case-insensitive pest → remedy table
#[derive(Debug, Clone, Default)]
pub struct RemedyBook {
    remedies: HashMap<String, String>,
}

impl RemedyBook {
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut remedies = HashMap::new();
        for row in reader.deserialize::<RemedyRow>() {
            let row = row?;
            // first row for a pest wins
            remedies.entry(row.pestname.to_lowercase()).or_insert(row.remedy);
        }
        Ok(Self { remedies })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_csv_reader(BufReader::new(file))
    }

    pub fn lookup(&self, pest_type: &str) -> &str {
        self.remedies
            .get(&pest_type.to_lowercase())
            .map(String::as_str)
            .unwrap_or(NO_REMEDY)
    }

    pub fn len(&self) -> usize {
        self.remedies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remedies.is_empty()
    }
}

/// HTTP client for the pest image classification service.
///
/// The service accepts raw image bytes and answers with
/// `{"pest_type": "...", "confidence": 97.4}`.
#[derive(Debug, Clone)]
pub struct PestClassifierClient {
    client: reqwest::Client,
    endpoint: String,
}

impl PestClassifierClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LogisticsError::Classifier(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub async fn classify(&self, image: Vec<u8>, content_type: &str) -> Result<PestPrediction> {
        debug!("Classifying {} byte image via {}", image.len(), self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(image)
            .send()
            .await
            .map_err(|e| LogisticsError::Classifier(e.to_string()))?;

        if !response.status().is_success() {
            warn!("Classifier returned {}", response.status());
            return Err(LogisticsError::Classifier(format!(
                "classifier returned {}",
                response.status()
            )));
        }

        let prediction: PestPrediction = response
            .json()
            .await
            .map_err(|e| LogisticsError::Classifier(e.to_string()))?;
        if !(0.0..=100.0).contains(&prediction.confidence) {
            return Err(LogisticsError::Classifier(format!(
                "confidence {} outside 0-100",
                prediction.confidence
            )));
        }
        Ok(prediction)
    }
}
