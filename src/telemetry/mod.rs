//! Telemetry samples reported by a tracked bike.
//!
//! Samples are validated once, at the boundary where they enter a
//! [`SampleBuffer`]; the classifiers downstream assume physical values.

pub mod buffer;

use core::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::InvalidInput;

pub use buffer::{SampleBuffer, SharedSampleBuffer};

/// A WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn validate(&self) -> Result<(), InvalidInput> {
        if !self.latitude.is_finite() {
            return Err(InvalidInput::NonFinite("latitude"));
        }
        if !self.longitude.is_finite() {
            return Err(InvalidInput::NonFinite("longitude"));
        }
        if self.latitude.abs() > 90.0 || self.longitude.abs() > 180.0 {
            return Err(InvalidInput::CoordinateOutOfRange);
        }
        Ok(())
    }
}

/// One motion reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    /// Ground speed (km/h).
    pub speed_kmh: f64,
    /// Longitudinal acceleration (m/s², signed).
    pub acceleration: f64,
    pub position: GeoPoint,
}

impl TelemetrySample {
    pub const fn new(timestamp_ms: i64, speed_kmh: f64, acceleration: f64, position: GeoPoint) -> Self {
        Self {
            timestamp_ms,
            speed_kmh,
            acceleration,
            position,
        }
    }

    pub fn validate(&self) -> Result<(), InvalidInput> {
        if !self.speed_kmh.is_finite() {
            return Err(InvalidInput::NonFinite("speed"));
        }
        if self.speed_kmh < 0.0 {
            return Err(InvalidInput::NegativeSpeed);
        }
        if !self.acceleration.is_finite() {
            return Err(InvalidInput::NonFinite("acceleration"));
        }
        self.position.validate()
    }

    /// Acceleration magnitude, sign dropped.
    pub fn accel_magnitude(&self) -> f64 {
        self.acceleration.abs()
    }

    /// Total order used to canonicalise sample windows: timestamp first,
    /// then quieter readings before louder ones at the same instant.
    pub(crate) fn chronological_cmp(&self, other: &Self) -> Ordering {
        self.timestamp_ms
            .cmp(&other.timestamp_ms)
            .then_with(|| self.accel_magnitude().total_cmp(&other.accel_magnitude()))
            .then_with(|| self.acceleration.total_cmp(&other.acceleration))
            .then_with(|| self.speed_kmh.total_cmp(&other.speed_kmh))
            .then_with(|| self.position.latitude.total_cmp(&other.position.latitude))
            .then_with(|| self.position.longitude.total_cmp(&other.position.longitude))
    }
}
