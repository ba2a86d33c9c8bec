//! Loading of the trained warehouse artifacts
//!
//! Everything here runs once at startup; the result is shared read-only.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::info;

use crate::districts::DistrictRegistry;
use crate::error::{LogisticsError, Result};
use crate::geo::GeoPoint;
use crate::model::WarehouseModel;

/// Trained model plus the two warehouse tables it is used with
#[derive(Debug, Clone)]
pub struct WarehouseArtifacts {
    pub model: WarehouseModel,
    /// Feature order and cluster vocabulary, taken from the bundle
    pub candidates: DistrictRegistry,
    /// Coordinates used to join uploads and to place results on the map
    pub coordinates: DistrictRegistry,
}

impl WarehouseArtifacts {
    /// Combine a bundle with a join table. Falls back to the bundle's own
    /// warehouse list when no separate table is given.
    pub fn new(model: WarehouseModel, coordinates: Option<DistrictRegistry>) -> Result<Self> {
        model.validate()?;
        let candidates = DistrictRegistry::from_entries(
            model
                .warehouses
                .iter()
                .map(|w| (w.district.clone(), GeoPoint::new(w.latitude, w.longitude))),
        )
        .map_err(|e| LogisticsError::artifact(format!("bundle warehouse list: {}", e)))?;

        let coordinates = match coordinates {
            Some(table) if table.is_empty() => {
                return Err(LogisticsError::artifact("warehouse table is empty"));
            }
            Some(table) => table,
            None => candidates.clone(),
        };

        Ok(Self {
            model,
            candidates,
            coordinates,
        })
    }

    pub fn load(model_path: &Path, table_path: Option<&Path>) -> Result<Self> {
        let model = load_model(model_path)?;
        let coordinates = table_path.map(load_warehouse_table).transpose()?;
        let artifacts = Self::new(model, coordinates)?;
        info!(
            "Loaded model with {} candidate warehouses, {} join districts",
            artifacts.candidates.len(),
            artifacts.coordinates.len()
        );
        Ok(artifacts)
    }
}

pub fn read_model<R: Read>(reader: R) -> Result<WarehouseModel> {
    let model: WarehouseModel = serde_json::from_reader(reader)?;
    model.validate()?;
    Ok(model)
}

pub fn load_model(path: &Path) -> Result<WarehouseModel> {
    let file = File::open(path).map_err(|e| {
        LogisticsError::artifact(format!("cannot open model {}: {}", path.display(), e))
    })?;
    read_model(BufReader::new(file))
}

/// Load a `District,Latitude,Longitude` table
pub fn load_warehouse_table(path: &Path) -> Result<DistrictRegistry> {
    let file = File::open(path).map_err(|e| {
        LogisticsError::artifact(format!("cannot open warehouse table {}: {}", path.display(), e))
    })?;
    let table = DistrictRegistry::from_csv_reader(BufReader::new(file))?;
    if table.is_empty() {
        return Err(LogisticsError::artifact(format!(
            "warehouse table {} has no rows",
            path.display()
        )));
    }
    Ok(table)
}
