//! Monitor service, the hexagonal core.
//!
//! [`MonitorService`] owns one telemetry buffer per bike, the motion
//! classifier, the wear estimator and the alert dispatcher.  All output
//! flows through port traits injected at call sites.
//!
//! ```text
//!  telemetry ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                │        MonitorService         │
//!  components ──▶│ buffers · classify · dispatch │ ──▶ AlertSink
//!                └──────────────────────────────┘
//! ```

use std::collections::HashMap;

use log::info;

use crate::alert::{Alert, AlertDispatcher, DispatchOutcome};
use crate::classify::motion::{MotionClassifier, MotionVerdict};
use crate::classify::wear::{TrackedComponent, WearAssessment, WearEstimator};
use crate::co2::{TransportMode, co2_saved_kg};
use crate::config::SystemConfig;
use crate::error::Result;
use crate::telemetry::{SampleBuffer, TelemetrySample};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{AlertSink, EventSink};

pub struct MonitorService {
    config: SystemConfig,
    classifier: MotionClassifier,
    estimator: WearEstimator,
    dispatcher: AlertDispatcher,
    buffers: HashMap<String, SampleBuffer>,
}

impl MonitorService {
    /// Build the service.  Fails if the configuration does not validate.
    pub fn new(config: SystemConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            classifier: MotionClassifier::new(config.motion.clone()),
            estimator: WearEstimator::new(config.maintenance.clone()),
            dispatcher: AlertDispatcher::new(&config.alerts),
            buffers: HashMap::new(),
            config,
        })
    }

    // ── Telemetry ─────────────────────────────────────────────

    /// Append a sample to the bike's buffer, classify the updated window,
    /// and raise an alert if the verdict is anomalous.
    pub fn ingest(
        &mut self,
        bike_id: &str,
        sample: TelemetrySample,
        alerts: &mut impl AlertSink,
        events: &mut impl EventSink,
    ) -> Result<MotionVerdict> {
        let capacity = self.config.buffer.capacity;
        let buffer = self
            .buffers
            .entry(bike_id.to_owned())
            .or_insert_with(|| SampleBuffer::new(capacity));

        if let Err(error) = buffer.push(sample) {
            events.emit(&AppEvent::SampleRejected {
                bike_id: bike_id.to_owned(),
                error,
            });
            return Err(error);
        }

        let verdict = buffer.classify(&self.classifier);
        let location = buffer.last().map(|s| s.position);
        events.emit(&AppEvent::Verdict {
            bike_id: bike_id.to_owned(),
            verdict: verdict.clone(),
        });

        if let Some(alert) = Alert::from_verdict(
            bike_id,
            &verdict,
            location,
            self.config.alerts.high_severity_confidence,
            sample.timestamp_ms,
        ) {
            self.dispatch(&alert, alerts, events);
        }
        Ok(verdict)
    }

    /// Classify a bike's current window on demand.  Unknown bikes have an
    /// empty window and get the insufficient-data verdict.
    pub fn evaluate(&self, bike_id: &str) -> MotionVerdict {
        match self.buffers.get(bike_id) {
            Some(buffer) => buffer.classify(&self.classifier),
            None => self.classifier.classify(&[]),
        }
    }

    // ── Maintenance ───────────────────────────────────────────

    /// Assess one component and raise a maintenance alert if it is worn
    /// or overdue.
    pub fn assess_component(
        &mut self,
        bike_id: &str,
        component: &TrackedComponent,
        now_ms: i64,
        alerts: &mut impl AlertSink,
        events: &mut impl EventSink,
    ) -> Result<WearAssessment> {
        let assessment = self.estimator.assess(&component.usage, now_ms)?;
        events.emit(&AppEvent::WearAssessed {
            bike_id: bike_id.to_owned(),
            component_id: component.id.clone(),
            assessment: assessment.clone(),
        });

        if let Some(alert) = Alert::from_assessment(bike_id, component, &assessment, now_ms) {
            self.dispatch(&alert, alerts, events);
        }
        Ok(assessment)
    }

    // ── Ride accounting ───────────────────────────────────────

    /// Distance covered by the bike's buffered positions (km).
    pub fn ride_distance_km(&self, bike_id: &str) -> f64 {
        self.buffers
            .get(bike_id)
            .map_or(0.0, SampleBuffer::path_length_km)
    }

    /// CO2 saved by the buffered ride versus `mode` (kg).
    pub fn ride_co2_kg(&self, bike_id: &str, mode: TransportMode) -> Result<f64> {
        Ok(co2_saved_kg(self.ride_distance_km(bike_id), mode)?)
    }

    // ── Command handling ──────────────────────────────────────

    pub fn handle_command(&mut self, cmd: AppCommand, events: &mut impl EventSink) -> Result<()> {
        match cmd {
            AppCommand::UpdateConfig(new_config) => {
                new_config.validate()?;
                self.classifier = MotionClassifier::new(new_config.motion.clone());
                self.estimator = WearEstimator::new(new_config.maintenance.clone());
                self.dispatcher.set_preferences(new_config.alerts.preferences.clone());
                self.dispatcher.set_cooldown_ms(new_config.alerts.cooldown_ms);
                // Existing windows keep their capacity; new bikes use the new one.
                self.config = new_config;
                info!("Configuration updated at runtime");
                events.emit(&AppEvent::ConfigUpdated);
            }
            AppCommand::UpdatePreferences(prefs) => {
                self.config.alerts.preferences = prefs.clone();
                self.dispatcher.set_preferences(prefs);
                info!("Notification preferences updated");
            }
            AppCommand::PruneBefore { bike_id, cutoff_ms } => {
                if let Some(buffer) = self.buffers.get_mut(&bike_id) {
                    let removed = buffer.prune_before(cutoff_ms);
                    info!("Pruned {removed} samples for {bike_id}");
                }
            }
            AppCommand::ResetBike(bike_id) => {
                self.buffers.remove(&bike_id);
                self.dispatcher.reset_cooldown(&bike_id);
                info!("Reset telemetry and alert state for {bike_id}");
            }
        }
        Ok(())
    }

    // ── Persistence ───────────────────────────────────────────

    /// Snapshot a bike's buffer, `None` for an unknown bike.
    pub fn snapshot(&self, bike_id: &str) -> Result<Option<Vec<u8>>> {
        self.buffers
            .get(bike_id)
            .map(SampleBuffer::snapshot)
            .transpose()
    }

    /// Replace a bike's buffer with a decoded snapshot.
    pub fn restore(&mut self, bike_id: &str, bytes: &[u8]) -> Result<()> {
        let buffer = SampleBuffer::restore(bytes)?;
        self.buffers.insert(bike_id.to_owned(), buffer);
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn buffer(&self, bike_id: &str) -> Option<&SampleBuffer> {
        self.buffers.get(bike_id)
    }

    pub fn tracked_bikes(&self) -> impl Iterator<Item = &str> {
        self.buffers.keys().map(String::as_str)
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn dispatch(
        &mut self,
        alert: &Alert,
        alerts: &mut impl AlertSink,
        events: &mut impl EventSink,
    ) -> DispatchOutcome {
        let outcome = self.dispatcher.dispatch(alert, alerts);
        events.emit(&AppEvent::AlertDispatched {
            bike_id: alert.bike_id.clone(),
            kind: alert.kind,
            outcome,
        });
        outcome
    }
}
