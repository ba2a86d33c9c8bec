//! Trained warehouse-assignment model
//!
//! The pipeline only needs two capabilities from the trained artifacts: a
//! feature transform and a cluster assignment. Both are traits so tests can
//! plug in fakes; the concrete types below are what the JSON bundle holds.

use linfa_nn::distance::{Distance, L2Dist};
use linfa_nn::{BallTree, NearestNeighbour};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{LogisticsError, Result};
use crate::models::DistrictRow;

/// Feature matrix, one row per inventory record
pub type Matrix = Array2<f64>;

/// Fitted feature normalization
pub trait Scaler {
    fn transform(&self, features: &Matrix) -> Result<Matrix>;
}

/// Fitted cluster assignment; returns one cluster index per row
pub trait ClusterModel {
    fn predict(&self, features: &Matrix) -> Result<Vec<usize>>;
}

/// Zero-mean / unit-variance scaler: `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl Scaler for StandardScaler {
    fn transform(&self, features: &Matrix) -> Result<Matrix> {
        if features.ncols() != self.mean.len() || self.scale.len() != self.mean.len() {
            return Err(LogisticsError::processing(format!(
                "scaler expects {} features, got {}",
                self.mean.len(),
                features.ncols()
            )));
        }
        let mean = ArrayView1::from(self.mean.as_slice());
        // constant features are fitted with scale 0
        let scale: Array1<f64> = self
            .scale
            .iter()
            .map(|s| if *s == 0.0 { 1.0 } else { *s })
            .collect();
        Ok((features - &mean) / &scale)
    }
}

/// Centroids as stored in the JSON bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentroidModelData {
    pub centroids: Vec<Vec<f64>>,
}

/// Nearest-centroid assignment (k-means inference)
///
/// Lookup goes through a linfa-nn ball tree. Among centroids at exactly the
/// same distance the lowest index wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CentroidModelData", into = "CentroidModelData")]
pub struct CentroidModel {
    centroids: Array2<f64>,
}

impl CentroidModel {
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();
        let dim = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != dim) {
            return Err(LogisticsError::artifact(format!(
                "centroid has {} dimensions, expected {}",
                bad.len(),
                dim
            )));
        }
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let centroids = Array2::from_shape_vec((n, dim), flat)
            .map_err(|e| LogisticsError::artifact(format!("failed to restore centroids: {}", e)))?;
        Ok(Self { centroids })
    }

    pub fn num_clusters(&self) -> usize {
        self.centroids.nrows()
    }

    pub fn dimension(&self) -> usize {
        self.centroids.ncols()
    }
}

impl TryFrom<CentroidModelData> for CentroidModel {
    type Error = LogisticsError;

    fn try_from(data: CentroidModelData) -> Result<Self> {
        Self::from_rows(data.centroids)
    }
}

impl From<CentroidModel> for CentroidModelData {
    fn from(model: CentroidModel) -> Self {
        Self {
            centroids: model.centroids.rows().into_iter().map(|r| r.to_vec()).collect(),
        }
    }
}

impl ClusterModel for CentroidModel {
    fn predict(&self, features: &Matrix) -> Result<Vec<usize>> {
        if self.num_clusters() == 0 {
            return Err(LogisticsError::processing("model has no centroids"));
        }
        if features.ncols() != self.dimension() {
            return Err(LogisticsError::processing(format!(
                "model expects {} features, got {}",
                self.dimension(),
                features.ncols()
            )));
        }

        let tree = BallTree::new()
            .from_batch(&self.centroids, L2Dist)
            .map_err(|e| LogisticsError::processing(format!("failed to index centroids: {}", e)))?;

        features
            .rows()
            .into_iter()
            .map(|row| {
                // all centroids come back sorted by distance; re-rank by
                // (distance, index) so exact ties are deterministic
                let neighbours = tree
                    .k_nearest(row, self.num_clusters())
                    .map_err(|e| LogisticsError::processing(format!("centroid search failed: {}", e)))?;
                neighbours
                    .into_iter()
                    .map(|(point, idx)| (L2Dist.rdistance(point, row), idx))
                    .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
                    .map(|(_, idx)| idx)
                    .ok_or_else(|| LogisticsError::processing("no nearest centroid found"))
            })
            .collect()
    }
}

/// The trained bundle: scaler, model and the warehouse list it was fitted on.
///
/// Column `i` of every feature row is the distance to `warehouses[i]`, and
/// cluster `i` names `warehouses[i]`. The list must not be reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseModel {
    pub scaler: StandardScaler,
    pub model: CentroidModel,
    pub warehouses: Vec<DistrictRow>,
}

impl WarehouseModel {
    /// Check that every part agrees on the number of warehouses
    pub fn validate(&self) -> Result<()> {
        let n = self.warehouses.len();
        if n == 0 {
            return Err(LogisticsError::artifact("model bundle lists no warehouses"));
        }
        if self.scaler.mean.len() != n || self.scaler.scale.len() != n {
            return Err(LogisticsError::artifact(format!(
                "scaler fitted on {} features but bundle lists {} warehouses",
                self.scaler.mean.len(),
                n
            )));
        }
        if self.model.num_clusters() == 0 || self.model.num_clusters() > n {
            return Err(LogisticsError::artifact(format!(
                "model has {} clusters for {} warehouses",
                self.model.num_clusters(),
                n
            )));
        }
        if self.model.dimension() != n {
            return Err(LogisticsError::artifact(format!(
                "centroids have {} dimensions, expected {}",
                self.model.dimension(),
                n
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn row(district: &str, latitude: f64, longitude: f64) -> DistrictRow {
        DistrictRow {
            district: district.to_string(),
            latitude,
            longitude,
        }
    }

    #[test]
    fn test_standard_scaler() {
        let scaler = StandardScaler {
            mean: vec![10.0, 0.0],
            scale: vec![2.0, 0.0],
        };
        let out = scaler.transform(&array![[14.0, 3.0], [8.0, -1.0]]).unwrap();
        assert_eq!(out, array![[2.0, 3.0], [-1.0, -1.0]]);
    }

    #[test]
    fn test_scaler_dimension_mismatch() {
        let scaler = StandardScaler {
            mean: vec![0.0; 3],
            scale: vec![1.0; 3],
        };
        assert!(matches!(
            scaler.transform(&array![[1.0]]),
            Err(LogisticsError::Processing(_))
        ));
    }

    #[test]
    fn test_nearest_centroid() {
        let model = CentroidModel::from_rows(vec![vec![0.0, 0.0], vec![10.0, 10.0]]).unwrap();
        let labels = model
            .predict(&array![[1.0, 1.0], [9.0, 8.0], [5.0, 5.0]])
            .unwrap();
        // (5, 5) is equidistant; first centroid wins
        assert_eq!(labels, vec![0, 1, 0]);
    }

    #[test]
    fn test_tie_goes_to_lowest_index() {
        // three centroids on a circle around the origin, queried at the centre
        let model = CentroidModel::from_rows(vec![
            vec![3.0, 0.0],
            vec![0.0, 3.0],
            vec![-3.0, 0.0],
            vec![9.0, 9.0],
        ])
        .unwrap();
        assert_eq!(model.predict(&array![[0.0, 0.0]]).unwrap(), vec![0]);

        let model = CentroidModel::from_rows(vec![vec![9.0, 9.0], vec![0.0, -3.0], vec![0.0, 3.0]])
            .unwrap();
        assert_eq!(model.predict(&array![[0.0, 0.0]]).unwrap(), vec![1]);
    }

    #[test]
    fn test_predict_dimension_mismatch() {
        let model = CentroidModel::from_rows(vec![vec![0.0, 0.0]]).unwrap();
        assert!(matches!(
            model.predict(&array![[1.0, 2.0, 3.0]]),
            Err(LogisticsError::Processing(_))
        ));
    }

    #[test]
    fn test_ragged_centroids_rejected() {
        assert!(matches!(
            CentroidModel::from_rows(vec![vec![0.0, 0.0], vec![1.0]]),
            Err(LogisticsError::Artifact(_))
        ));
    }

    #[test]
    fn test_bundle_validation() {
        let mut bundle = WarehouseModel {
            scaler: StandardScaler {
                mean: vec![0.0; 2],
                scale: vec![1.0; 2],
            },
            model: CentroidModel::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap(),
            warehouses: vec![
                row("Kathmandu", 27.7103, 85.3222),
                row("Kaski", 28.2622, 84.0167),
            ],
        };
        assert!(bundle.validate().is_ok());

        bundle.model =
            CentroidModel::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.5, 0.5]]).unwrap();
        assert!(matches!(bundle.validate(), Err(LogisticsError::Artifact(_))));

        bundle.model = CentroidModel::from_rows(vec![vec![0.0, 1.0, 2.0]]).unwrap();
        assert!(matches!(bundle.validate(), Err(LogisticsError::Artifact(_))));
    }

    #[test]
    fn test_bundle_from_json() {
        let json = r#"{
            "scaler": {"mean": [100.0], "scale": [50.0]},
            "model": {"centroids": [[0.0]]},
            "warehouses": [{"District": "Kathmandu", "Latitude": 27.7103, "Longitude": 85.3222}]
        }"#;
        let bundle: WarehouseModel = serde_json::from_str(json).unwrap();
        assert!(bundle.validate().is_ok());
        assert_eq!(bundle.warehouses[0].district, "Kathmandu");
        assert_eq!(bundle.model.num_clusters(), 1);

        let back = serde_json::to_value(&bundle).unwrap();
        assert_eq!(back["model"]["centroids"], serde_json::json!([[0.0]]));
    }

    #[test]
    fn test_bundle_rejects_ragged_json() {
        let json = r#"{
            "scaler": {"mean": [1.0, 1.0], "scale": [1.0, 1.0]},
            "model": {"centroids": [[0.0, 0.0], [1.0]]},
            "warehouses": []
        }"#;
        assert!(serde_json::from_str::<WarehouseModel>(json).is_err());
    }
}
