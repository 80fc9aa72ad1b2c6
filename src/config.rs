//! System configuration parameters
//!
//! All tunable thresholds for the cyclesense classifiers and the alert
//! pipeline.  Built once at the composition root and handed to
//! [`MonitorService`](crate::app::service::MonitorService); every section
//! uses `#[serde(default)]` so a partial JSON file only overrides what it
//! names.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub motion: MotionThresholds,
    pub maintenance: MaintenanceConfig,
    pub alerts: AlertConfig,
    pub buffer: BufferConfig,
}

impl SystemConfig {
    /// Reject invalid ranges instead of clamping them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.motion.validate()?;
        self.maintenance.validate()?;
        self.alerts.validate()?;
        self.buffer.validate()?;
        Ok(())
    }
}

/// Thresholds for the vehicle-transport heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionThresholds {
    /// Acceleration magnitude (m/s²) above which an episode is "high".
    pub sustained_threshold: f64,
    /// Peak acceleration magnitude (m/s²) no pedalled bike reaches.
    pub max_threshold: f64,
    /// Episode length (ms) that counts as sustained.
    pub duration_threshold_ms: i64,
    /// Speed variance (km/h)² below which speed is "too steady".
    pub variance_threshold: f64,
    /// Fewest samples for which speed variance is evaluated.
    pub min_variance_samples: usize,
    /// Confidence strictly above which a verdict is anomalous.
    pub anomaly_confidence_threshold: f64,
}

impl Default for MotionThresholds {
    fn default() -> Self {
        Self {
            sustained_threshold: 1.2,
            max_threshold: 2.5,
            duration_threshold_ms: 5000,
            variance_threshold: 1.0,
            min_variance_samples: 3,
            anomaly_confidence_threshold: 0.6,
        }
    }
}

impl MotionThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sustained_threshold.is_finite() && self.sustained_threshold > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "motion.sustained_threshold must be a positive number",
            ));
        }
        if !(self.max_threshold.is_finite() && self.max_threshold > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "motion.max_threshold must be a positive number",
            ));
        }
        if self.duration_threshold_ms < 0 {
            return Err(ConfigError::ValidationFailed(
                "motion.duration_threshold_ms must not be negative",
            ));
        }
        if !(self.variance_threshold.is_finite() && self.variance_threshold >= 0.0) {
            return Err(ConfigError::ValidationFailed(
                "motion.variance_threshold must not be negative",
            ));
        }
        if self.min_variance_samples < 2 {
            return Err(ConfigError::ValidationFailed(
                "motion.min_variance_samples must be at least 2",
            ));
        }
        if !(0.0..=1.0).contains(&self.anomaly_confidence_threshold) {
            return Err(ConfigError::ValidationFailed(
                "motion.anomaly_confidence_threshold must lie in [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Maintenance scheduling knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Fraction of the service interval after which service is "soon".
    pub service_soon_ratio: f64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            service_soon_ratio: 0.8,
        }
    }
}

impl MaintenanceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.service_soon_ratio > 0.0 && self.service_soon_ratio <= 1.0) {
            return Err(ConfigError::ValidationFailed(
                "maintenance.service_soon_ratio must lie in (0, 1]",
            ));
        }
        Ok(())
    }
}

/// Alert dispatch policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Minimum gap (ms) between two delivered alerts of the same kind for
    /// the same bike.
    pub cooldown_ms: i64,
    /// Verdict confidence at or above which an alert is high severity.
    pub high_severity_confidence: f64,
    pub preferences: NotificationPreferences,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 5 * 60 * 1000,
            high_severity_confidence: 0.9,
            preferences: NotificationPreferences::default(),
        }
    }
}

impl AlertConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cooldown_ms < 0 {
            return Err(ConfigError::ValidationFailed(
                "alerts.cooldown_ms must not be negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.high_severity_confidence) {
            return Err(ConfigError::ValidationFailed(
                "alerts.high_severity_confidence must lie in [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Which alerts a rider wants delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPreferences {
    pub enabled: bool,
    pub unauthorized_movement: bool,
    pub maintenance_due: bool,
    pub low: bool,
    pub medium: bool,
    pub high: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            enabled: true,
            unauthorized_movement: true,
            maintenance_due: true,
            low: false,
            medium: true,
            high: true,
        }
    }
}

/// Per-bike telemetry retention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Samples kept per bike before the oldest is evicted.
    pub capacity: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: 600, // 10 min at 1 Hz
        }
    }
}

impl BufferConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity < 2 {
            return Err(ConfigError::ValidationFailed(
                "buffer.capacity must hold at least 2 samples",
            ));
        }
        Ok(())
    }
}
