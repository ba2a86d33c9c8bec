//! Batch warehouse assignment
//!
//! Joins an uploaded inventory to district coordinates, builds one distance
//! vector per record against every candidate warehouse, runs the trained
//! scaler and cluster model, and keeps the warehouses that receive a
//! top-quartile share of the assignments.

use std::collections::HashMap;
use std::io::Read;

use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use ndarray::Array2;
use serde::Serialize;
use tracing::{debug, info};

use crate::districts::DistrictRegistry;
use crate::error::{LogisticsError, Result};
use crate::geo::{distance_km, GeoPoint};
use crate::model::{ClusterModel, Matrix, Scaler};
use crate::models::{InventoryRecord, WarehouseLocation};
use crate::stats::quantile_linear;

/// Column every inventory upload must carry
pub const DISTRICT_COLUMN: &str = "District";

/// Assignment-count quantile a warehouse must reach to be significant
pub const SIGNIFICANCE_QUANTILE: f64 = 0.75;

/// Below this many distinct assigned warehouses the quantile cut is skipped
/// and every assigned warehouse is significant.
pub const MIN_WAREHOUSES_FOR_QUANTILE: usize = 4;

/// Outcome of one batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchAssignment {
    /// Set whenever the pipeline ran, including on an empty join
    pub show_prediction: bool,
    pub warehouses: Vec<WarehouseLocation>,
    pub rows_in: usize,
    pub rows_matched: usize,
    pub rows_dropped: usize,
    /// Optimal warehouse per matched row, in input order
    pub assignments: Vec<String>,
    /// Assignment count per warehouse, most assigned first
    pub counts: Vec<(String, usize)>,
    pub threshold: Option<f64>,
    pub processed_at: DateTime<Utc>,
}

impl BatchAssignment {
    pub fn significant_names(&self) -> Vec<&str> {
        self.warehouses.iter().map(|w| w.district.as_str()).collect()
    }
}

/// Parse an inventory table. Only the `District` column is required; other
/// columns are kept as strings.
pub fn read_inventory<R: Read>(reader: R) -> Result<Vec<InventoryRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let district_idx = headers
        .iter()
        .position(|h| h == DISTRICT_COLUMN)
        .ok_or_else(|| {
            LogisticsError::validation(format!(
                "inventory file has no '{}' column",
                DISTRICT_COLUMN
            ))
        })?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let district = row.get(district_idx).unwrap_or_default().to_string();
        let fields = headers
            .iter()
            .zip(row.iter())
            .enumerate()
            .filter(|(i, _)| *i != district_idx)
            .map(|(_, (h, v))| (h.to_string(), v.to_string()))
            .collect();
        records.push(InventoryRecord { district, fields });
    }

    Ok(records)
}

/// Distances (km) from `origin` to every candidate, in candidate order
pub fn distance_vector(origin: GeoPoint, candidates: &DistrictRegistry) -> Vec<f64> {
    candidates
        .iter()
        .map(|wh| distance_km(origin, wh.location))
        .collect()
}

/// Stack one distance vector per origin into the model's feature matrix
pub fn feature_matrix(origins: &[GeoPoint], candidates: &DistrictRegistry) -> Result<Matrix> {
    let flat: Vec<f64> = origins
        .iter()
        .flat_map(|p| distance_vector(*p, candidates))
        .collect();
    Array2::from_shape_vec((origins.len(), candidates.len()), flat)
        .map_err(|e| LogisticsError::processing(format!("bad feature matrix: {}", e)))
}

/// Count assignments per warehouse: most assigned first, ties in order of
/// first appearance.
pub fn tally(assignments: &[String]) -> Vec<(String, usize)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for name in assignments {
        match positions.get(name.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                positions.insert(name.as_str(), counts.len());
                counts.push((name.clone(), 1));
            }
        }
    }
    // stable sort keeps first-appearance order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Select the warehouses whose count reaches the significance threshold.
///
/// Returns the threshold used (absent when nothing was assigned) and the
/// selected names in `counts` order.
pub fn significant_warehouses(counts: &[(String, usize)]) -> (Option<f64>, Vec<String>) {
    if counts.len() < MIN_WAREHOUSES_FOR_QUANTILE {
        let threshold = counts.iter().map(|(_, c)| *c as f64).reduce(f64::min);
        let names = counts.iter().map(|(n, _)| n.clone()).collect();
        return (threshold, names);
    }

    let values: Vec<f64> = counts.iter().map(|(_, c)| *c as f64).collect();
    let threshold = quantile_linear(&values, SIGNIFICANCE_QUANTILE);
    let names = match threshold {
        Some(t) => counts
            .iter()
            .filter(|(_, c)| *c as f64 >= t)
            .map(|(n, _)| n.clone())
            .collect(),
        None => Vec::new(),
    };
    (threshold, names)
}

/// Batch assignment over shared, read-only artifacts
pub struct AssignmentPipeline<'a, S, M> {
    /// Join table: district → coordinates for inventory rows and display
    coordinates: &'a DistrictRegistry,
    /// Candidate warehouses in model feature/cluster order
    candidates: &'a DistrictRegistry,
    scaler: &'a S,
    model: &'a M,
}

impl<'a, S: Scaler, M: ClusterModel> AssignmentPipeline<'a, S, M> {
    pub fn new(
        coordinates: &'a DistrictRegistry,
        candidates: &'a DistrictRegistry,
        scaler: &'a S,
        model: &'a M,
    ) -> Self {
        Self {
            coordinates,
            candidates,
            scaler,
            model,
        }
    }

    pub fn run(&self, records: &[InventoryRecord]) -> Result<BatchAssignment> {
        let rows_in = records.len();

        // Join to coordinates; unresolvable districts are dropped, not errors
        let located: Vec<GeoPoint> = records
            .iter()
            .filter_map(|r| {
                let point = self.coordinates.lookup(&r.district);
                if point.is_none() {
                    debug!("Dropping inventory row with unknown district '{}'", r.district);
                }
                point
            })
            .collect();
        let rows_matched = located.len();
        let rows_dropped = rows_in - rows_matched;

        let assignments = if located.is_empty() {
            Vec::new()
        } else {
            let features = feature_matrix(&located, self.candidates)?;
            let scaled = self.scaler.transform(&features)?;
            let clusters = self.model.predict(&scaled)?;
            if clusters.len() != rows_matched {
                return Err(LogisticsError::processing(format!(
                    "model returned {} labels for {} rows",
                    clusters.len(),
                    rows_matched
                )));
            }
            clusters
                .into_iter()
                .map(|c| {
                    self.candidates
                        .get(c)
                        .map(|wh| wh.name.clone())
                        .ok_or_else(|| {
                            LogisticsError::processing(format!(
                                "cluster {} has no warehouse ({} candidates)",
                                c,
                                self.candidates.len()
                            ))
                        })
                })
                .collect::<Result<Vec<String>>>()?
        };

        let counts = tally(&assignments);
        let (threshold, significant) = significant_warehouses(&counts);

        let warehouses = significant
            .into_iter()
            .filter_map(|name| {
                let point = self
                    .coordinates
                    .lookup(&name)
                    .or_else(|| self.candidates.lookup(&name))?;
                Some(WarehouseLocation {
                    district: name,
                    latitude: point.lat,
                    longitude: point.lon,
                })
            })
            .collect::<Vec<_>>();

        info!(
            "Assigned {} of {} rows ({} dropped) to {} warehouses, {} significant",
            rows_matched,
            rows_in,
            rows_dropped,
            counts.len(),
            warehouses.len()
        );

        Ok(BatchAssignment {
            show_prediction: true,
            warehouses,
            rows_in,
            rows_matched,
            rows_dropped,
            assignments,
            counts,
            threshold,
            processed_at: Utc::now(),
        })
    }
}
