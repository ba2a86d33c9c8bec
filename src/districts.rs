//! District geo-registry
//! Maps district names to coordinates, preserving registry order

use std::collections::{HashMap, HashSet};
use std::io::Read;

use csv::ReaderBuilder;

use crate::error::{LogisticsError, Result};
use crate::geo::GeoPoint;
use crate::models::DistrictRow;

/// Kathmandu, used when a delivery district cannot be resolved
pub const FALLBACK_LOCATION: GeoPoint = GeoPoint::new(27.7103, 85.3222);

/// Built-in district table: (name, latitude, longitude), grouped by province.
/// Order matters: nearest-district searches break ties on first entry.
pub const NEPAL_DISTRICTS: &[(&str, f64, f64)] = &[
    // Koshi
    ("Bhojpur", 26.9302, 87.0372),
    ("Dhankuta", 26.9862, 87.0919),
    ("Ilam", 26.9092, 88.0841),
    ("Jhapa", 26.7271, 88.0845),
    ("Khotang", 27.1838, 86.7819),
    ("Morang", 26.5333, 87.2667),
    ("Okhaldunga", 27.3175, 86.5314),
    ("Panchthar", 27.0769, 87.9183),
    ("Sankhuwasabha", 27.2667, 87.2333),
    ("Solukhumbu", 27.7900, 86.5400),
    ("Sunsari", 26.6276, 87.1822),
    ("Taplejung", 27.3552, 87.6689),
    ("Tehrathum", 27.1831, 87.4269),
    ("Udayapur", 26.8406, 86.8406),
    // Madhesh
    ("Bara", 26.7272, 85.9300),
    ("Dhanusa", 26.8350, 86.0122),
    ("Mahottari", 26.7333, 86.0667),
    ("Parsa", 27.0667, 84.8833),
    ("Rautahat", 26.6667, 86.1667),
    ("Sarlahi", 26.7333, 85.8333),
    ("Saptari", 26.5667, 86.7333),
    ("Siraha", 26.6667, 86.2167),
    // Bagmati
    ("Bhaktapur", 27.6712, 85.4298),
    ("Dhading", 28.0833, 84.8833),
    ("Kathmandu", 27.7103, 85.3222),
    ("Kavrepalanchok", 27.5333, 85.5333),
    ("Lalitpur", 27.6589, 85.3378),
    ("Nuwakot", 28.1667, 85.2667),
    ("Rasuwa", 28.1667, 85.4167),
    ("Sindhuli", 27.3333, 86.0333),
    ("Sindhupalchok", 27.8333, 85.7500),
    // Gandaki
    ("Gorkha", 27.9842, 84.6270),
    ("Kaski", 28.2622, 84.0167),
    ("Lamjung", 28.2333, 84.3667),
    ("Manang", 28.6667, 84.0333),
    ("Mustang", 28.8333, 83.7667),
    ("Myagdi", 28.3667, 83.7667),
    ("Nawalpur", 27.7000, 84.4333),
    ("Parbat", 28.2333, 83.9667),
    ("Syangja", 28.1167, 83.9000),
    ("Tanahun", 28.0333, 84.3333),
    // Lumbini
    ("Arghakhanchi", 27.7500, 83.3833),
    ("Banke", 28.1500, 81.7500),
    ("Bardiya", 28.2000, 81.4333),
    ("Dang", 28.0833, 82.3000),
    ("Gulmi", 28.0833, 83.3000),
    ("Kapilvastu", 27.5667, 83.0000),
    ("Parasi", 27.5333, 83.3789),
    ("Palpa", 28.1500, 83.5167),
    ("Pyuthan", 28.1000, 82.8667),
    ("Rolpa", 28.3816, 82.6483),
    ("Rukum", 28.3500, 82.2000),
    ("Rupandehi", 27.5330, 83.3789),
    // Karnali
    ("Dailekh", 28.8500, 81.7000),
    ("Dolpa", 29.0333, 82.8333),
    ("Humla", 29.9667, 81.8167),
    ("Jajarkot", 28.6167, 81.6833),
    ("Jumla", 29.2889, 82.3018),
    ("Kalikot", 28.8667, 81.6167),
    ("Mugu", 29.2500, 81.9833),
    ("Rukum East", 28.3816, 82.6483),
    ("Salyan", 28.3500, 81.9667),
    ("Surkhet", 28.6167, 81.6500),
    // Sudurpashchim
    ("Achham", 29.0396, 81.2519),
    ("Baitadi", 29.3333, 80.5833),
    ("Bajhang", 29.5167, 81.3000),
    ("Bajura", 29.4833, 81.5167),
    ("Dadeldhura", 29.2188, 80.4994),
    ("Darchula", 29.8667, 80.5667),
    ("Doti", 29.0000, 81.4000),
    ("Kailali", 28.7000, 80.9667),
    ("Kanchanpur", 28.9333, 80.5667),
];

/// A named location in the registry
#[derive(Debug, Clone, PartialEq)]
pub struct District {
    pub name: String,
    pub location: GeoPoint,
}

/// Immutable name → coordinate table with stable iteration order.
///
/// Built once at startup and shared read-only; used both for the delivery
/// district registry and for the warehouse candidate table.
#[derive(Debug, Clone, Default)]
pub struct DistrictRegistry {
    districts: Vec<District>,
    index: HashMap<String, usize>,
}

impl DistrictRegistry {
    /// Build from `(name, point)` pairs. Duplicate names are rejected.
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, GeoPoint)>,
        S: Into<String>,
    {
        let mut registry = Self::default();
        for (name, location) in entries {
            let name = name.into();
            if registry.index.contains_key(&name) {
                return Err(LogisticsError::validation(format!(
                    "duplicate district '{}'",
                    name
                )));
            }
            registry.index.insert(name.clone(), registry.districts.len());
            registry.districts.push(District { name, location });
        }
        Ok(registry)
    }

    /// The built-in district table of Nepal
    pub fn nepal() -> Self {
        let districts: Vec<District> = NEPAL_DISTRICTS
            .iter()
            .map(|(name, lat, lon)| District {
                name: name.to_string(),
                location: GeoPoint::new(*lat, *lon),
            })
            .collect();
        let index = districts
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();
        Self { districts, index }
    }

    /// Read a `District,Latitude,Longitude` table; extra columns are ignored
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for row in reader.deserialize::<DistrictRow>() {
            let row = row?;
            rows.push((row.district, GeoPoint::new(row.latitude, row.longitude)));
        }
        Self::from_entries(rows)
    }

    pub fn lookup(&self, name: &str) -> Option<GeoPoint> {
        self.index.get(name).map(|&i| self.districts[i].location)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Position of a district in registry order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn get(&self, position: usize) -> Option<&District> {
        self.districts.get(position)
    }

    pub fn all_districts(&self) -> HashSet<&str> {
        self.districts.iter().map(|d| d.name.as_str()).collect()
    }

    /// Names in alphabetical order, for pick-lists
    pub fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.districts.iter().map(|d| d.name.clone()).collect();
        names.sort();
        names
    }

    /// Districts in registry order
    pub fn iter(&self) -> impl Iterator<Item = &District> {
        self.districts.iter()
    }

    pub fn len(&self) -> usize {
        self.districts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }
}
