use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Row of a `District,Latitude,Longitude` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistrictRow {
    #[serde(rename = "District")]
    pub district: String,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
}

/// One row of an uploaded inventory table.
///
/// Only `District` is interpreted; the remaining columns (quantity, weight,
/// crop, ...) are carried through untouched in header order.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRecord {
    pub district: String,
    pub fields: Vec<(String, String)>,
}

impl InventoryRecord {
    pub fn new(district: impl Into<String>) -> Self {
        Self {
            district: district.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Significant warehouse as shown on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseLocation {
    pub district: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Route endpoint in map-friendly form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub lat: f64,
    pub lng: f64,
    pub district: String,
}

impl RoutePoint {
    pub fn new(district: impl Into<String>, point: GeoPoint) -> Self {
        Self {
            lat: point.lat,
            lng: point.lon,
            district: district.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDetails {
    pub origin: RoutePoint,
    pub destination: RoutePoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub distance_cost: f64,
    pub weight_cost: f64,
    pub quantity_cost: f64,
    pub total_cost: f64,
}

/// Single-shipment delivery estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEstimate {
    pub nearest_warehouse: String,
    pub delivery_district: String,
    /// Kilometres
    pub estimated_distance: f64,
    /// Hours
    pub estimated_time: f64,
    pub route_details: RouteDetails,
    pub cost_breakdown: CostBreakdown,
}

/// Label returned by the external pest classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PestPrediction {
    pub pest_type: String,
    /// Percentage, 0-100
    pub confidence: f64,
}

/// Row of the pest remedy table
#[derive(Debug, Clone, Deserialize)]
pub struct RemedyRow {
    pub pestname: String,
    pub remedy: String,
}
