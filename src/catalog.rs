//! Known ocean reference points used as land fallback targets.
//!
//! The catalog is built once (from `config.toml` or [`ReferenceCatalog::builtin`])
//! and handed to the resolver. Iteration order is the order the points were
//! supplied in, which is what breaks distance ties in [`crate::geo::find_nearest`].

use crate::models::Coordinate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OceanReferencePoint {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

impl OceanReferencePoint {
    pub fn new(latitude: f64, longitude: f64, name: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            name: name.into(),
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Immutable, shareable list of reference points.
///
/// Cloning only bumps a reference count, so every resolver clone (one per
/// spawned check-in task) reads the same points without locking.
#[derive(Debug, Clone)]
pub struct ReferenceCatalog {
    points: Arc<[OceanReferencePoint]>,
}

impl ReferenceCatalog {
    pub fn new(points: Vec<OceanReferencePoint>) -> Self {
        Self {
            points: points.into(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(default_points())
    }

    pub fn points(&self) -> &[OceanReferencePoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

impl Default for ReferenceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Hand-picked coordinates that are reliably covered by the marine model.
///
/// Two Great Lakes entries are included for users around the lakes; the
/// marine model has little coverage there, so they sit after the coastal
/// North American points.
pub fn default_points() -> Vec<OceanReferencePoint> {
    vec![
        OceanReferencePoint::new(36.8, -122.0, "Pacific Ocean - Monterey Bay"),
        OceanReferencePoint::new(33.75, -119.05, "Pacific Ocean - Santa Monica Basin"),
        OceanReferencePoint::new(44.6, -124.5, "Pacific Ocean - Oregon Coast"),
        OceanReferencePoint::new(57.0, -145.0, "Gulf of Alaska"),
        OceanReferencePoint::new(20.0, -157.0, "Pacific Ocean - Hawaii"),
        OceanReferencePoint::new(27.5, -90.5, "Gulf of Mexico"),
        OceanReferencePoint::new(35.0, -75.0, "Atlantic Ocean - Cape Hatteras"),
        OceanReferencePoint::new(43.0, -69.0, "Gulf of Maine"),
        OceanReferencePoint::new(15.0, -75.0, "Caribbean Sea"),
        OceanReferencePoint::new(44.0, -87.0, "Lake Michigan"),
        OceanReferencePoint::new(47.7, -87.5, "Lake Superior"),
        OceanReferencePoint::new(0.0, -20.0, "Atlantic Ocean - Equatorial"),
        OceanReferencePoint::new(45.5, -4.0, "Bay of Biscay"),
        OceanReferencePoint::new(56.0, 3.0, "North Sea"),
        OceanReferencePoint::new(35.0, 18.0, "Mediterranean Sea"),
        OceanReferencePoint::new(-34.5, 17.5, "South Atlantic - Cape Peninsula"),
        OceanReferencePoint::new(15.0, 65.0, "Arabian Sea"),
        OceanReferencePoint::new(15.0, 88.0, "Bay of Bengal"),
        OceanReferencePoint::new(12.0, 114.0, "South China Sea"),
        OceanReferencePoint::new(40.0, 135.0, "Sea of Japan"),
        OceanReferencePoint::new(-18.0, 152.0, "Coral Sea"),
        OceanReferencePoint::new(-38.0, 160.0, "Tasman Sea"),
    ]
}
