//! Log-based sink adapters.
//!
//! Implement [`EventSink`] and [`AlertSink`] by writing through the `log`
//! facade.  Used by the CLI and as a fallback when no delivery gateway is
//! configured.

use log::{debug, info, warn};

use crate::alert::{Alert, DispatchOutcome};
use crate::app::events::AppEvent;
use crate::app::ports::{AlertSink, EventSink};
use crate::error::DeliveryError;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::SampleRejected { bike_id, error } => {
                warn!("REJECT | bike={bike_id} | {error}");
            }
            AppEvent::Verdict { bike_id, verdict } => {
                debug!(
                    "MOTION | bike={} | anomalous={} confidence={:.2} | {}",
                    bike_id,
                    verdict.is_anomalous,
                    verdict.confidence,
                    verdict.describe(),
                );
            }
            AppEvent::WearAssessed {
                bike_id,
                component_id,
                assessment,
            } => {
                info!(
                    "WEAR | bike={} component={} | {:.1}% {} | due in {}d ({:?})",
                    bike_id,
                    component_id,
                    assessment.wear_percentage,
                    assessment.condition,
                    assessment.days_until_maintenance,
                    assessment.service_status,
                );
            }
            AppEvent::AlertDispatched {
                bike_id,
                kind,
                outcome,
            } => match outcome {
                DispatchOutcome::Failed(e) => warn!("ALERT | bike={bike_id} kind={kind:?} | failed: {e}"),
                other => info!("ALERT | bike={bike_id} kind={kind:?} | {other:?}"),
            },
            AppEvent::ConfigUpdated => {
                info!("CONFIG | updated");
            }
        }
    }
}

/// Alert "delivery" to the log.  Never fails unless built with
/// [`LogAlertSink::unavailable`], which stands in for a gateway outage.
#[derive(Debug, Default)]
pub struct LogAlertSink {
    delivered: u32,
    unavailable: bool,
}

impl LogAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            delivered: 0,
            unavailable: true,
        }
    }

    pub fn delivered(&self) -> u32 {
        self.delivered
    }
}

impl AlertSink for LogAlertSink {
    fn deliver(&mut self, alert: &Alert, message: &str) -> Result<(), DeliveryError> {
        if self.unavailable {
            return Err(DeliveryError::Unavailable);
        }
        self.delivered = self.delivered.saturating_add(1);
        info!("NOTIFY | bike={} | {}", alert.bike_id, message);
        Ok(())
    }
}
