//! Great-circle distance and nearby-place lookup.

use crate::error::InvalidInput;
use crate::telemetry::GeoPoint;

/// Mean Earth radius (km).
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points (km).
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Anything with a fixed position (bike shops, parking, mechanics).
pub trait Located {
    fn position(&self) -> GeoPoint;
}

impl Located for GeoPoint {
    fn position(&self) -> GeoPoint {
        *self
    }
}

/// Items within `radius_km` of `origin` (inclusive), nearest first, each
/// paired with its distance.
pub fn nearby<'a, T: Located>(
    origin: GeoPoint,
    items: &'a [T],
    radius_km: f64,
) -> Result<Vec<(&'a T, f64)>, InvalidInput> {
    if !radius_km.is_finite() {
        return Err(InvalidInput::NonFinite("radius"));
    }
    if radius_km < 0.0 {
        return Err(InvalidInput::NegativeDistance);
    }
    origin.validate()?;

    let mut hits: Vec<(&T, f64)> = items
        .iter()
        .map(|item| (item, haversine_km(origin, item.position())))
        .filter(|(_, d)| *d <= radius_km)
        .collect();
    hits.sort_by(|a, b| a.1.total_cmp(&b.1));
    Ok(hits)
}

/// Human-readable distance: metres below 1 km, one decimal above.
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{}m", (km * 1000.0).round() as i64)
    } else {
        format!("{km:.1}km")
    }
}
