//! Inbound commands to the application service.
//!
//! Actions requested by the outside world (rider settings screen, admin
//! tooling, retention jobs) that the
//! [`MonitorService`](super::service::MonitorService) interprets.

use crate::config::{NotificationPreferences, SystemConfig};

#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Hot-reload configuration.  Rejected if it fails validation.
    UpdateConfig(SystemConfig),

    /// Replace the rider's notification preferences.
    UpdatePreferences(NotificationPreferences),

    /// Drop a bike's telemetry older than the cutoff.
    PruneBefore { bike_id: String, cutoff_ms: i64 },

    /// Forget a bike's telemetry and alert cooldowns (e.g. bike recovered).
    ResetBike(String),
}
