//! Great-circle distance between district coordinates

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres (IUGG)
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A (latitude, longitude) pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceUnit {
    #[default]
    Kilometers,
    Meters,
    Miles,
    NauticalMiles,
}

impl DistanceUnit {
    /// Multiplier applied to a kilometre value
    fn per_km(self) -> f64 {
        match self {
            DistanceUnit::Kilometers => 1.0,
            DistanceUnit::Meters => 1000.0,
            DistanceUnit::Miles => 0.621_371_192_237_333_9,
            DistanceUnit::NauticalMiles => 0.539_956_803_455_723_5,
        }
    }
}

/// Haversine distance between two points in the requested unit
pub fn distance(a: GeoPoint, b: GeoPoint, unit: DistanceUnit) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // rounding can push h a hair above 1 for antipodal points
    let km = 2.0 * EARTH_RADIUS_KM * h.min(1.0).sqrt().asin();
    km * unit.per_km()
}

/// Shorthand for [`distance`] in kilometres
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    distance(a, b, DistanceUnit::Kilometers)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KATHMANDU: GeoPoint = GeoPoint::new(27.7103, 85.3222);
    const POKHARA: GeoPoint = GeoPoint::new(28.2096, 83.9856);

    #[test]
    fn test_same_point_is_zero() {
        assert!(distance_km(KATHMANDU, KATHMANDU).abs() < 1e-6);
        let p = GeoPoint::new(-33.8688, 151.2093);
        assert!(distance_km(p, p).abs() < 1e-6);
    }

    #[test]
    fn test_symmetry() {
        let ab = distance_km(KATHMANDU, POKHARA);
        let ba = distance_km(POKHARA, KATHMANDU);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_kathmandu_pokhara_reference() {
        // great-circle, not road distance (~200 km by highway)
        let d = distance_km(KATHMANDU, POKHARA);
        assert!((d - 142.5).abs() <= 142.5 * 0.05, "Kathmandu-Pokhara was {:.1} km", d);
    }

    #[test]
    fn test_units() {
        let km = distance(KATHMANDU, POKHARA, DistanceUnit::Kilometers);
        let m = distance(KATHMANDU, POKHARA, DistanceUnit::Meters);
        let mi = distance(KATHMANDU, POKHARA, DistanceUnit::Miles);
        assert!((m - km * 1000.0).abs() < 1e-6);
        assert!((mi - km / 1.609344).abs() < 1e-6);
    }

    #[test]
    fn test_antipodal_is_half_circumference() {
        let d = distance_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }
}
