//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   MonitorService ──▶ AlertSink  ──▶ SMS / push gateway
//!                  ──▶ EventSink  ──▶ log / metrics / UI feed
//! ```
//!
//! Driven adapters implement these traits.  The
//! [`MonitorService`](super::service::MonitorService) consumes them via
//! generics, so the domain core never touches a network client directly.

use crate::alert::Alert;
use crate::error::DeliveryError;

use super::events::AppEvent;

/// Delivery side of the alert pipeline.
///
/// Implementations own transport concerns (timeouts, retries, backoff).
/// A returned error is logged by the dispatcher and not retried.
pub trait AlertSink {
    /// Deliver one alert.  `message` is the rendered rider-facing text.
    fn deliver(&mut self, alert: &Alert, message: &str) -> Result<(), DeliveryError>;
}

/// The domain emits structured [`AppEvent`]s through this port.  Adapters
/// decide where they go (log, time-series store, live dashboard, ...).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
