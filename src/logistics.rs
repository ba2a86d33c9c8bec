//! Single-shipment delivery estimate
//!
//! Finds the closest other district to the delivery point and prices the
//! leg by distance, weight and quantity.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::districts::{DistrictRegistry, FALLBACK_LOCATION};
use crate::error::{LogisticsError, Result};
use crate::geo::{distance_km, GeoPoint};
use crate::models::{CostBreakdown, RouteDetails, RouteEstimate, RoutePoint};
use crate::stats::round2;

/// Tariff and speed used for estimates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticsRates {
    /// Currency units per km
    pub distance_rate: f64,
    /// Currency units per kg
    pub weight_rate: f64,
    /// Currency units per item
    pub quantity_rate: f64,
    /// km/h, averaged over hill roads
    pub avg_speed_kmh: f64,
}

impl Default for LogisticsRates {
    fn default() -> Self {
        Self {
            distance_rate: 50.0,
            weight_rate: 10.0,
            quantity_rate: 5.0,
            avg_speed_kmh: 40.0,
        }
    }
}

/// Validated shipment figures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shipment {
    pub quantity: f64,
    pub weight: f64,
}

impl Shipment {
    pub fn new(quantity: f64, weight: f64) -> Result<Self> {
        for (label, value) in [("product_quantity", quantity), ("product_weight", weight)] {
            if !value.is_finite() || value < 0.0 {
                return Err(LogisticsError::validation(format!(
                    "{} must be a non-negative number, got {}",
                    label, value
                )));
            }
        }
        Ok(Self { quantity, weight })
    }

    /// Parse raw form fields
    pub fn parse(quantity: &str, weight: &str) -> Result<Self> {
        Self::new(parse_amount("product_quantity", quantity)?, parse_amount("product_weight", weight)?)
    }
}

fn parse_amount(label: &str, raw: &str) -> Result<f64> {
    let raw = raw.trim();
    raw.parse::<f64>().map_err(|_| {
        LogisticsError::validation(format!("{} must be numeric, got '{}'", label, raw))
    })
}

/// Round a cost for reporting; costs that leave the finite range are
/// rejected as bad input.
fn priced(label: &str, cost: f64) -> Result<f64> {
    let rounded = round2(cost);
    if rounded.is_finite() {
        Ok(rounded)
    } else {
        Err(LogisticsError::validation(format!(
            "{} is too large to price",
            label
        )))
    }
}

/// Closest registry district other than `target`, first minimum in
/// registry order.
pub fn nearest_district<'a>(
    registry: &'a DistrictRegistry,
    target: &str,
    origin: GeoPoint,
) -> Option<(&'a str, GeoPoint, f64)> {
    let mut best: Option<(&str, GeoPoint, f64)> = None;
    for district in registry.iter().filter(|d| d.name != target) {
        let d = distance_km(origin, district.location);
        if best.map_or(true, |(_, _, b)| d < b) {
            best = Some((district.name.as_str(), district.location, d));
        }
    }
    best
}

pub struct LogisticsEstimator<'a> {
    registry: &'a DistrictRegistry,
    rates: LogisticsRates,
}

impl<'a> LogisticsEstimator<'a> {
    pub fn new(registry: &'a DistrictRegistry, rates: LogisticsRates) -> Self {
        Self { registry, rates }
    }

    pub fn estimate(&self, delivery_district: &str, shipment: Shipment) -> Result<RouteEstimate> {
        let destination = match self.registry.lookup(delivery_district) {
            Some(point) => point,
            None => {
                warn!(
                    "Unknown delivery district '{}', falling back to Kathmandu",
                    delivery_district
                );
                FALLBACK_LOCATION
            }
        };

        let (nearest, origin, _) = nearest_district(self.registry, delivery_district, destination)
            .ok_or_else(|| LogisticsError::processing("district registry has no other districts"))?;

        let distance = distance_km(origin, destination);

        let distance_cost = priced("distance", distance * self.rates.distance_rate)?;
        let weight_cost = priced("product_weight", shipment.weight * self.rates.weight_rate)?;
        let quantity_cost = priced("product_quantity", shipment.quantity * self.rates.quantity_rate)?;
        // total is reported as the sum of the reported parts
        let total_cost = priced("shipment", distance_cost + weight_cost + quantity_cost)?;

        Ok(RouteEstimate {
            nearest_warehouse: nearest.to_string(),
            delivery_district: delivery_district.to_string(),
            estimated_distance: round2(distance),
            estimated_time: round2(distance / self.rates.avg_speed_kmh),
            route_details: RouteDetails {
                origin: RoutePoint::new(nearest, origin),
                destination: RoutePoint::new(delivery_district, destination),
            },
            cost_breakdown: CostBreakdown {
                distance_cost,
                weight_cost,
                quantity_cost,
                total_cost,
            },
        })
    }
}
