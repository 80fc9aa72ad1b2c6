//! Alerts raised from classifier output.
//!
//! A motion verdict or wear assessment that crosses a severity threshold
//! becomes an [`Alert`].  The [`AlertDispatcher`] decides whether it is
//! delivered and hands it to an [`AlertSink`](crate::app::ports::AlertSink);
//! actual SMS / push delivery lives on the other side of that port.

pub mod dispatcher;

use core::fmt;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::classify::motion::MotionVerdict;
use crate::classify::wear::{Condition, ServiceStatus, TrackedComponent, WearAssessment};
use crate::telemetry::GeoPoint;

pub use dispatcher::{AlertDispatcher, DispatchOutcome, SuppressReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Bike appears to be moving inside a vehicle.
    UnauthorizedMovement,
    /// A component is worn or overdue for service.
    MaintenanceDue,
}

impl AlertKind {
    pub const fn headline(self) -> &'static str {
        match self {
            Self::UnauthorizedMovement => "Unauthorized movement detected",
            Self::MaintenanceDue => "Maintenance due",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub bike_id: String,
    pub kind: AlertKind,
    pub severity: Severity,
    pub timestamp_ms: i64,
    pub location: Option<GeoPoint>,
    pub description: String,
}

impl Alert {
    /// Alert for an anomalous verdict, `None` otherwise.  Confidence at or
    /// above `high_confidence` is high severity, anything else medium.
    pub fn from_verdict(
        bike_id: &str,
        verdict: &MotionVerdict,
        location: Option<GeoPoint>,
        high_confidence: f64,
        timestamp_ms: i64,
    ) -> Option<Self> {
        if !verdict.is_anomalous {
            return None;
        }
        let severity = if verdict.confidence >= high_confidence {
            Severity::High
        } else {
            Severity::Medium
        };
        Some(Self {
            bike_id: bike_id.to_owned(),
            kind: AlertKind::UnauthorizedMovement,
            severity,
            timestamp_ms,
            location,
            description: format!(
                "possible vehicle transport ({:.0}% confidence): {}",
                verdict.confidence * 100.0,
                verdict.describe()
            ),
        })
    }

    /// Alert for a worn or overdue component, `None` if it is fine.
    pub fn from_assessment(
        bike_id: &str,
        component: &TrackedComponent,
        assessment: &WearAssessment,
        timestamp_ms: i64,
    ) -> Option<Self> {
        let severity = match (assessment.condition, assessment.service_status) {
            (Condition::Critical, _) => Severity::High,
            (Condition::NeedsAttention, _) => Severity::Medium,
            (_, ServiceStatus::NeedsService) => Severity::Low,
            _ => return None,
        };
        Some(Self {
            bike_id: bike_id.to_owned(),
            kind: AlertKind::MaintenanceDue,
            severity,
            timestamp_ms,
            location: None,
            description: format!(
                "{} at {:.0}% wear ({}): {}",
                component.name, assessment.wear_percentage, assessment.condition, assessment.recommendation
            ),
        })
    }

    /// Text handed to the delivery layer.  The description stays on the
    /// alert for logs and rider-facing history.
    pub fn message(&self) -> String {
        let mut msg = format!(
            "[{}] BIKE ALERT: {} at {}.",
            self.severity,
            self.kind.headline(),
            clock_time_utc(self.timestamp_ms)
        );
        if let Some(at) = self.location {
            msg.push_str(&format!(
                " Location: https://maps.google.com/?q={},{}",
                at.latitude, at.longitude
            ));
        }
        msg
    }
}

/// `HH:MM:SS UTC` for a millisecond epoch timestamp.
fn clock_time_utc(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || "--:--:-- UTC".to_owned(),
        |at| at.format("%H:%M:%S UTC").to_string(),
    )
}
