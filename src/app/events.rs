//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.

use crate::alert::{AlertKind, DispatchOutcome};
use crate::classify::motion::MotionVerdict;
use crate::classify::wear::WearAssessment;
use crate::error::Error;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A sample was refused by the bike's buffer.
    SampleRejected { bike_id: String, error: Error },

    /// The motion classifier produced a verdict for a bike.
    Verdict {
        bike_id: String,
        verdict: MotionVerdict,
    },

    /// A component was assessed.
    WearAssessed {
        bike_id: String,
        component_id: String,
        assessment: WearAssessment,
    },

    /// An alert went through the dispatcher (delivered or not).
    AlertDispatched {
        bike_id: String,
        kind: AlertKind,
        outcome: DispatchOutcome,
    },

    /// Configuration was replaced at runtime.
    ConfigUpdated,
}
