//! Alert gating and hand-off.
//!
//! ## Gate order
//!
//! 1. Notifications globally disabled  → suppressed.
//! 2. Alert kind muted by the rider     → suppressed.
//! 3. Severity muted by the rider       → suppressed.
//! 4. Same (bike, kind) delivered less than `cooldown_ms` ago → suppressed.
//! 5. Otherwise the formatted message goes to the [`AlertSink`].
//!
//! Only successful deliveries start a cooldown, so a failed delivery is
//! attempted again on the next qualifying alert.  There is no retry loop
//! here; backoff belongs to the delivery adapter.

use std::collections::HashMap;

use log::{info, warn};

use crate::app::ports::AlertSink;
use crate::config::{AlertConfig, NotificationPreferences};
use crate::error::DeliveryError;

use super::{Alert, AlertKind, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    NotificationsDisabled,
    KindMuted,
    SeverityMuted,
    Cooldown { remaining_ms: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    Suppressed(SuppressReason),
    Failed(DeliveryError),
}

pub struct AlertDispatcher {
    preferences: NotificationPreferences,
    cooldown_ms: i64,
    /// Timestamp of the last delivered alert per (bike, kind).
    last_delivered: HashMap<(String, AlertKind), i64>,
}

impl AlertDispatcher {
    pub fn new(config: &AlertConfig) -> Self {
        Self {
            preferences: config.preferences.clone(),
            cooldown_ms: config.cooldown_ms.max(0),
            last_delivered: HashMap::new(),
        }
    }

    pub fn set_preferences(&mut self, preferences: NotificationPreferences) {
        self.preferences = preferences;
    }

    /// Applies to the next gate check, including running cooldowns.
    pub fn set_cooldown_ms(&mut self, cooldown_ms: i64) {
        self.cooldown_ms = cooldown_ms.max(0);
    }

    pub fn preferences(&self) -> &NotificationPreferences {
        &self.preferences
    }

    /// Gate `alert` and, if it passes, hand it to `sink`.
    pub fn dispatch(&mut self, alert: &Alert, sink: &mut impl AlertSink) -> DispatchOutcome {
        if let Some(reason) = self.gate(alert) {
            info!(
                "Alert suppressed for {} ({:?}, {}): {:?}",
                alert.bike_id, alert.kind, alert.severity, reason
            );
            return DispatchOutcome::Suppressed(reason);
        }

        let message = alert.message();
        match sink.deliver(alert, &message) {
            Ok(()) => {
                self.last_delivered
                    .insert((alert.bike_id.clone(), alert.kind), alert.timestamp_ms);
                info!("Alert delivered for {}: {}", alert.bike_id, message);
                DispatchOutcome::Delivered
            }
            Err(e) => {
                warn!("Alert delivery failed for {}: {}", alert.bike_id, e);
                DispatchOutcome::Failed(e)
            }
        }
    }

    /// Forget cooldown state for a bike (e.g. after the rider resolves it).
    pub fn reset_cooldown(&mut self, bike_id: &str) {
        self.last_delivered.retain(|(bike, _), _| bike != bike_id);
    }

    fn gate(&self, alert: &Alert) -> Option<SuppressReason> {
        let prefs = &self.preferences;
        if !prefs.enabled {
            return Some(SuppressReason::NotificationsDisabled);
        }
        let kind_on = match alert.kind {
            AlertKind::UnauthorizedMovement => prefs.unauthorized_movement,
            AlertKind::MaintenanceDue => prefs.maintenance_due,
        };
        if !kind_on {
            return Some(SuppressReason::KindMuted);
        }
        let severity_on = match alert.severity {
            Severity::Low => prefs.low,
            Severity::Medium => prefs.medium,
            Severity::High => prefs.high,
        };
        if !severity_on {
            return Some(SuppressReason::SeverityMuted);
        }
        if let Some(last) = self
            .last_delivered
            .get(&(alert.bike_id.clone(), alert.kind))
        {
            let since = alert.timestamp_ms.saturating_sub(*last);
            if since < self.cooldown_ms {
                return Some(SuppressReason::Cooldown {
                    remaining_ms: self.cooldown_ms - since,
                });
            }
        }
        None
    }
}
