//! Great-circle distances and nearest reference point lookup.

use crate::catalog::OceanReferencePoint;
use crate::error::{Error, Result};
use crate::models::Coordinate;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two coordinates in kilometres.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Returns the closest point in `catalog` and its distance from `query`.
///
/// Scans the whole catalog once. On equal distances the point that comes
/// first in the catalog wins.
///
/// # Errors
///
/// [`Error::NoReferencePoints`] if the catalog is empty.
pub fn find_nearest(
    query: Coordinate,
    catalog: &[OceanReferencePoint],
) -> Result<(&OceanReferencePoint, f64)> {
    let mut nearest: Option<(&OceanReferencePoint, f64)> = None;

    for point in catalog {
        let distance = haversine_km(query, point.coordinate());
        match nearest {
            Some((_, best)) if distance >= best => {}
            _ => nearest = Some((point, distance)),
        }
    }

    nearest.ok_or(Error::NoReferencePoints)
}
