//! Vehicle-transport detection.
//!
//! Decides, from a short window of telemetry, whether a bike is being
//! carried by a vehicle rather than ridden.  Three independent signals
//! each add a fixed weight to the verdict's confidence:
//!
//! | signal                          | weight |
//! |---------------------------------|--------|
//! | sustained high acceleration     | 0.4    |
//! | excessive peak acceleration     | 0.3    |
//! | unnaturally steady speed        | 0.3    |
//!
//! Human pedalling produces short acceleration bursts and a wandering
//! speed; a car or van produces long smooth pulls, harder peaks and a
//! speed held by a throttle.
//!
//! The classifier holds only its thresholds.  Every call is a pure
//! function of its input, so one instance can serve any number of
//! threads.

use core::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::MotionThresholds;
use crate::telemetry::TelemetrySample;

const SUSTAINED_WEIGHT: f64 = 0.4;
const PEAK_WEIGHT: f64 = 0.3;
const STEADY_SPEED_WEIGHT: f64 = 0.3;

/// Why a verdict came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionReason {
    InsufficientData,
    SustainedHighAcceleration,
    ExcessivePeakAcceleration,
    UnnaturallySteadySpeed,
}

impl MotionReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InsufficientData => "insufficient data points",
            Self::SustainedHighAcceleration => "sustained high acceleration",
            Self::ExcessivePeakAcceleration => "excessive maximum acceleration",
            Self::UnnaturallySteadySpeed => "unusually consistent speed",
        }
    }
}

impl fmt::Display for MotionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionVerdict {
    pub is_anomalous: bool,
    /// Sum of triggered signal weights, in [0, 1].
    pub confidence: f64,
    /// Triggered signals in evaluation order (sustained, peak, variance).
    pub reasons: heapless::Vec<MotionReason, 3>,
}

impl MotionVerdict {
    fn insufficient_data() -> Self {
        let mut reasons = heapless::Vec::new();
        let _ = reasons.push(MotionReason::InsufficientData);
        Self {
            is_anomalous: false,
            confidence: 0.0,
            reasons,
        }
    }

    /// Reasons joined for display, e.g. in alert descriptions.
    pub fn describe(&self) -> String {
        self.reasons
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Raw features the signals are derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionFeatures {
    pub sample_count: usize,
    /// Longest high-acceleration episode (ms).
    pub longest_episode_ms: i64,
    /// Largest acceleration magnitude (m/s²).
    pub peak_acceleration: f64,
    /// Population variance of speed ((km/h)²).
    pub speed_variance: f64,
}

/// Heuristic vehicle-transport classifier.
#[derive(Debug, Clone, Default)]
pub struct MotionClassifier {
    thresholds: MotionThresholds,
}

impl MotionClassifier {
    pub fn new(thresholds: MotionThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &MotionThresholds {
        &self.thresholds
    }

    /// Classify a window of samples.  Input order is not trusted; fewer
    /// than two samples yields a non-anomalous "insufficient data" verdict.
    pub fn classify(&self, samples: &[TelemetrySample]) -> MotionVerdict {
        let Some(features) = self.features(samples) else {
            return MotionVerdict::insufficient_data();
        };
        let t = &self.thresholds;

        let sustained = features.longest_episode_ms > t.duration_threshold_ms;
        let excessive_peak = features.peak_acceleration > t.max_threshold;
        let steady_speed = features.sample_count >= t.min_variance_samples
            && features.speed_variance < t.variance_threshold;

        let mut confidence = 0.0;
        let mut reasons = heapless::Vec::new();
        for (fired, weight, reason) in [
            (sustained, SUSTAINED_WEIGHT, MotionReason::SustainedHighAcceleration),
            (excessive_peak, PEAK_WEIGHT, MotionReason::ExcessivePeakAcceleration),
            (steady_speed, STEADY_SPEED_WEIGHT, MotionReason::UnnaturallySteadySpeed),
        ] {
            if fired {
                confidence += weight;
                let _ = reasons.push(reason);
            }
        }
        // 0.4 + 0.3 + 0.3 lands a hair above 1.0 in binary floating point.
        let confidence = f64::min(confidence, 1.0);

        let verdict = MotionVerdict {
            is_anomalous: confidence > t.anomaly_confidence_threshold,
            confidence,
            reasons,
        };
        debug!(
            "motion verdict: anomalous={} confidence={:.2} episode={}ms peak={:.2} var={:.3} n={}",
            verdict.is_anomalous,
            verdict.confidence,
            features.longest_episode_ms,
            features.peak_acceleration,
            features.speed_variance,
            features.sample_count,
        );
        verdict
    }

    /// Extract the raw features, or `None` with fewer than two samples.
    pub fn features(&self, samples: &[TelemetrySample]) -> Option<MotionFeatures> {
        if samples.len() < 2 {
            return None;
        }
        let mut window = samples.to_vec();
        window.sort_by(TelemetrySample::chronological_cmp);

        let sustained_threshold = self.thresholds.sustained_threshold;
        let mut episode_start: Option<i64> = None;
        let mut longest_episode_ms = 0_i64;
        let mut peak_acceleration = 0.0_f64;

        for s in &window {
            let magnitude = s.accel_magnitude();
            peak_acceleration = peak_acceleration.max(magnitude);

            if magnitude > sustained_threshold {
                let start = *episode_start.get_or_insert(s.timestamp_ms);
                longest_episode_ms = longest_episode_ms.max(s.timestamp_ms.saturating_sub(start));
            } else {
                episode_start = None;
            }
        }

        Some(MotionFeatures {
            sample_count: window.len(),
            longest_episode_ms,
            peak_acceleration,
            speed_variance: population_variance(window.iter().map(|s| s.speed_kmh)),
        })
    }
}

fn population_variance(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let (sum, n) = values.clone().fold((0.0, 0_usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        return 0.0;
    }
    let mean = sum / n as f64;
    values.map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::GeoPoint;

    fn s(t: i64, speed: f64, accel: f64) -> TelemetrySample {
        TelemetrySample::new(t, speed, accel, GeoPoint::new(51.0, -0.1))
    }

    fn classifier() -> MotionClassifier {
        MotionClassifier::default()
    }

    #[test]
    fn fewer_than_two_samples_is_insufficient() {
        for window in [vec![], vec![s(0, 20.0, 9.0)]] {
            let v = classifier().classify(&window);
            assert!(!v.is_anomalous);
            assert!(v.confidence.abs() < f64::EPSILON);
            assert_eq!(v.reasons.as_slice(), [MotionReason::InsufficientData]);
            assert_eq!(v.describe(), "insufficient data points");
        }
    }

    #[test]
    fn two_gentle_samples_trigger_nothing() {
        let v = classifier().classify(&[s(0, 20.0, 0.5), s(1000, 20.0, 0.5)]);
        assert!(!v.is_anomalous);
        assert!(v.confidence.abs() < f64::EPSILON);
        assert!(v.reasons.is_empty());
    }

    #[test]
    fn long_smooth_pull_at_constant_speed_is_transport() {
        let window: Vec<_> = (0..=6).map(|i| s(i * 1000, 15.0, 2.0)).collect();
        let v = classifier().classify(&window);
        assert!(v.is_anomalous);
        assert!((v.confidence - 0.7).abs() < 1e-9);
        assert_eq!(
            v.reasons.as_slice(),
            [
                MotionReason::SustainedHighAcceleration,
                MotionReason::UnnaturallySteadySpeed
            ]
        );
    }

    #[test]
    fn all_three_signals_cap_at_one() {
        let window: Vec<_> = (0..=6).map(|i| s(i * 1000, 40.0, -3.0)).collect();
        let v = classifier().classify(&window);
        assert!(v.is_anomalous);
        assert!(v.confidence <= 1.0);
        assert!((v.confidence - 1.0).abs() < 1e-9);
        assert_eq!(v.reasons.len(), 3);
    }

    #[test]
    fn peak_plus_steady_is_exactly_at_threshold_and_not_anomalous() {
        let window = [s(0, 30.0, 0.1), s(1000, 30.0, 3.0), s(2000, 30.0, 0.1)];
        let v = classifier().classify(&window);
        assert!((v.confidence - 0.6).abs() < 1e-9);
        assert!(!v.is_anomalous);
    }

    #[test]
    fn episode_resets_when_acceleration_drops() {
        // Two 4 s episodes split by a quiet sample: neither exceeds 5 s.
        let mut window = Vec::new();
        for i in 0..=4 {
            window.push(s(i * 1000, 10.0 + i as f64 * 3.0, 1.5));
        }
        window.push(s(4500, 12.0, 0.2));
        for i in 5..=9 {
            window.push(s(i * 1000, 10.0 + i as f64 * 3.0, 1.5));
        }
        let f = classifier().features(&window).unwrap();
        assert_eq!(f.longest_episode_ms, 4000);
        assert!(!classifier().classify(&window).is_anomalous);
    }

    #[test]
    fn earlier_episode_still_counts_after_reset() {
        let mut window: Vec<_> = (0..=6).map(|i| s(i * 1000, 5.0 + i as f64 * 4.0, 1.8)).collect();
        window.push(s(7000, 20.0, 0.0));
        let f = classifier().features(&window).unwrap();
        assert_eq!(f.longest_episode_ms, 6000);
        let v = classifier().classify(&window);
        assert_eq!(v.reasons.as_slice(), [MotionReason::SustainedHighAcceleration]);
        assert!(!v.is_anomalous);
    }

    #[test]
    fn episode_starting_at_epoch_zero_is_tracked() {
        let window: Vec<_> = (0..=6).map(|i| s(i * 1000, 3.0 * i as f64, 1.3)).collect();
        assert_eq!(classifier().features(&window).unwrap().longest_episode_ms, 6000);
    }

    #[test]
    fn unsorted_input_is_sorted() {
        let sorted: Vec<_> = (0..=6).map(|i| s(i * 1000, 15.0, 2.0)).collect();
        let mut reversed = sorted.clone();
        reversed.reverse();
        assert_eq!(classifier().classify(&sorted), classifier().classify(&reversed));
    }

    #[test]
    fn equal_at_threshold_is_not_high() {
        let window: Vec<_> = (0..=6).map(|i| s(i * 1000, 3.0 * i as f64, 1.2)).collect();
        assert_eq!(classifier().features(&window).unwrap().longest_episode_ms, 0);
    }

    #[test]
    fn custom_thresholds_apply() {
        let thresholds = MotionThresholds {
            max_threshold: 1.0,
            anomaly_confidence_threshold: 0.2,
            ..MotionThresholds::default()
        };
        let v = MotionClassifier::new(thresholds)
            .classify(&[s(0, 10.0, 1.1), s(1000, 25.0, 0.0)]);
        assert_eq!(v.reasons.as_slice(), [MotionReason::ExcessivePeakAcceleration]);
        assert!(v.is_anomalous);
    }

    #[test]
    fn variance_of_constant_is_zero() {
        assert!(population_variance([4.0, 4.0, 4.0].into_iter()).abs() < f64::EPSILON);
        assert!((population_variance([1.0, 3.0].into_iter()) - 1.0).abs() < 1e-12);
    }
}
