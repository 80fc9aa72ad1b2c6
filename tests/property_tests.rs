//! Property tests for the classifiers and the telemetry buffer.

use cyclesense::classify::motion::{MotionClassifier, MotionReason};
use cyclesense::classify::wear::{
    ComponentUsageRecord, Condition, MS_PER_DAY, ServiceStatus, WearEstimator,
};
use cyclesense::config::MotionThresholds;
use cyclesense::telemetry::{GeoPoint, SampleBuffer, TelemetrySample};
use proptest::prelude::*;

// ── Strategies ────────────────────────────────────────────────

fn arb_sample(max_t: i64) -> impl Strategy<Value = TelemetrySample> {
    (0..=max_t, 0.0f64..80.0, -6.0f64..6.0, -80.0f64..80.0, -170.0f64..170.0).prop_map(
        |(t, speed, accel, lat, lon)| TelemetrySample::new(t, speed, accel, GeoPoint::new(lat, lon)),
    )
}

/// Samples with strictly increasing timestamps, 1..=2000 ms apart.
fn arb_ride(len: std::ops::RangeInclusive<usize>) -> impl Strategy<Value = Vec<TelemetrySample>> {
    proptest::collection::vec((1i64..=2000, 0.0f64..80.0, -6.0f64..6.0), len).prop_map(|steps| {
        let mut t = 0;
        steps
            .into_iter()
            .map(|(dt, speed, accel)| {
                t += dt;
                TelemetrySample::new(t, speed, accel, GeoPoint::new(48.85, 2.35))
            })
            .collect()
    })
}

/// Samples on a coarse 1 s grid so several share a timestamp.
fn arb_tied_window() -> impl Strategy<Value = Vec<TelemetrySample>> {
    proptest::collection::vec((0i64..=8, 0.0f64..40.0, -4.0f64..4.0), 2..=30).prop_map(|raw| {
        raw.into_iter()
            .map(|(k, speed, accel)| {
                TelemetrySample::new(k * 1000, speed, accel, GeoPoint::new(48.85, 2.35))
            })
            .collect()
    })
}

// ── Motion classifier ─────────────────────────────────────────

proptest! {
    #[test]
    fn short_windows_are_insufficient_data(
        samples in proptest::collection::vec(arb_sample(100_000), 0..=1),
    ) {
        let v = MotionClassifier::default().classify(&samples);
        prop_assert!(!v.is_anomalous);
        prop_assert_eq!(v.confidence, 0.0);
        prop_assert_eq!(v.reasons.as_slice(), &[MotionReason::InsufficientData]);
    }

    #[test]
    fn confidence_bounded_and_consistent_with_verdict(
        samples in proptest::collection::vec(arb_sample(30_000), 2..=40),
    ) {
        let classifier = MotionClassifier::default();
        let v = classifier.classify(&samples);
        prop_assert!((0.0..=1.0).contains(&v.confidence), "confidence {}", v.confidence);
        prop_assert_eq!(
            v.is_anomalous,
            v.confidence > classifier.thresholds().anomaly_confidence_threshold
        );
        prop_assert!(!v.reasons.contains(&MotionReason::InsufficientData));
    }

    /// Input order never changes the verdict, duplicate timestamps included.
    #[test]
    fn verdict_ignores_input_order(
        (original, shuffled) in proptest::collection::vec(arb_sample(20_000), 2..=30)
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
    ) {
        let classifier = MotionClassifier::default();
        prop_assert_eq!(classifier.classify(&original), classifier.classify(&shuffled));
        prop_assert_eq!(classifier.features(&original), classifier.features(&shuffled));
    }

    /// Harder acceleration never lowers confidence.
    #[test]
    fn stronger_acceleration_never_lowers_confidence(
        ride in arb_ride(2..=40),
        factor in 1.0f64..4.0,
    ) {
        let classifier = MotionClassifier::default();
        let harder: Vec<_> = ride
            .iter()
            .map(|s| TelemetrySample { acceleration: s.acceleration * factor, ..*s })
            .collect();
        let base = classifier.classify(&ride);
        let boosted = classifier.classify(&harder);
        prop_assert!(
            boosted.confidence >= base.confidence,
            "{} < {}", boosted.confidence, base.confidence
        );
    }

    /// Raising one sample's |acceleration| never lowers confidence, even when
    /// that sample shares its timestamp with others.
    #[test]
    fn one_harder_sample_never_lowers_confidence(
        window in arb_tied_window(),
        pick in any::<proptest::sample::Index>(),
        extra in 0.0f64..5.0,
    ) {
        let classifier = MotionClassifier::default();
        let i = pick.index(window.len());
        let mut harder = window.clone();
        let a = harder[i].acceleration;
        harder[i].acceleration = a.signum() * (a.abs() + extra);

        let base = classifier.classify(&window);
        let boosted = classifier.classify(&harder);
        prop_assert!(
            boosted.confidence >= base.confidence,
            "sample {}: {} < {}", i, boosted.confidence, base.confidence
        );
    }

    /// Stricter thresholds never raise confidence.
    #[test]
    fn stricter_thresholds_never_raise_confidence(
        ride in arb_ride(2..=40),
        bump in 0.0f64..2.0,
    ) {
        let loose = MotionClassifier::default();
        let defaults = MotionThresholds::default();
        let strict = MotionClassifier::new(MotionThresholds {
            sustained_threshold: defaults.sustained_threshold + bump,
            max_threshold: defaults.max_threshold + bump,
            variance_threshold: (defaults.variance_threshold - bump / 2.0).max(0.0),
            ..defaults
        });
        prop_assert!(strict.classify(&ride).confidence <= loose.classify(&ride).confidence);
    }
}

// ── Wear estimator ────────────────────────────────────────────

const NOW: i64 = 1_750_000_000_000;

fn arb_record() -> impl Strategy<Value = ComponentUsageRecord> {
    (0.0f64..10_000.0, 1.0f64..10_000.0, 1u32..=365, 0i64..=800).prop_map(
        |(mileage, lifespan, interval, days_ago)| ComponentUsageRecord {
            current_mileage: mileage,
            expected_lifespan: lifespan,
            maintenance_interval_days: interval,
            last_maintenance_ms: NOW - days_ago * MS_PER_DAY,
        },
    )
}

proptest! {
    #[test]
    fn assessment_is_deterministic(record in arb_record()) {
        let estimator = WearEstimator::default();
        let a = estimator.assess(&record, NOW).unwrap();
        let b = estimator.assess(&record, NOW).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.recommendation.as_str(), a.condition.recommendation());
        prop_assert_eq!(a.condition, Condition::from_wear(a.wear_percentage));
    }

    #[test]
    fn condition_is_monotone_in_wear(a in 0.0f64..200.0, b in 0.0f64..200.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(Condition::from_wear(lo) <= Condition::from_wear(hi));
    }

    #[test]
    fn service_days_are_consistent(record in arb_record()) {
        let a = WearEstimator::default().assess(&record, NOW).unwrap();
        let interval = record.maintenance_interval_days;
        if a.days_since_maintenance >= interval {
            prop_assert_eq!(a.days_until_maintenance, 0);
            prop_assert_eq!(a.service_status, ServiceStatus::NeedsService);
        } else {
            prop_assert_eq!(a.days_until_maintenance, interval - a.days_since_maintenance);
            prop_assert_ne!(a.service_status, ServiceStatus::NeedsService);
        }
    }

    /// A service date after `now` reads as serviced today.
    #[test]
    fn future_service_date_clamps_to_zero(record in arb_record(), ahead in 1i64..=1_000_000_000) {
        let record = ComponentUsageRecord { last_maintenance_ms: NOW + ahead, ..record };
        let a = WearEstimator::default().assess(&record, NOW).unwrap();
        prop_assert_eq!(a.days_since_maintenance, 0);
        prop_assert_eq!(a.days_until_maintenance, record.maintenance_interval_days);
    }
}

// ── Sample buffer ─────────────────────────────────────────────

proptest! {
    #[test]
    fn buffer_never_exceeds_capacity_and_stays_ordered(
        ride in arb_ride(0..=120),
        capacity in 2usize..=50,
    ) {
        let mut buffer = SampleBuffer::new(capacity);
        for s in &ride {
            buffer.push(*s).unwrap();
            prop_assert!(buffer.len() <= capacity);
        }
        prop_assert_eq!(buffer.len(), ride.len().min(capacity));
        let kept = buffer.to_vec();
        prop_assert!(kept.windows(2).all(|w| w[0].timestamp_ms <= w[1].timestamp_ms));
        prop_assert_eq!(kept.as_slice(), &ride[ride.len() - kept.len()..]);
    }

    #[test]
    fn out_of_order_push_leaves_buffer_untouched(
        ride in arb_ride(1..=30),
        back in 1i64..=10_000,
    ) {
        let mut buffer = SampleBuffer::new(64);
        for s in &ride {
            buffer.push(*s).unwrap();
        }
        let before = buffer.to_vec();
        let last = *buffer.last().unwrap();
        let stale = TelemetrySample { timestamp_ms: last.timestamp_ms - back, ..last };
        prop_assert!(buffer.push(stale).is_err());
        prop_assert_eq!(buffer.to_vec(), before);
    }

    #[test]
    fn snapshot_restores_same_window(ride in arb_ride(0..=40)) {
        let mut buffer = SampleBuffer::new(32);
        for s in &ride {
            buffer.push(*s).unwrap();
        }
        let restored = SampleBuffer::restore(&buffer.snapshot().unwrap()).unwrap();
        prop_assert_eq!(restored.capacity(), buffer.capacity());
        prop_assert_eq!(restored.to_vec(), buffer.to_vec());
    }

    /// Arbitrary bytes decode to a typed error or a valid buffer, never a panic.
    #[test]
    fn restore_survives_garbage(bytes in proptest::collection::vec(any::<u8>(), 0..=256)) {
        if let Ok(buffer) = SampleBuffer::restore(&bytes) {
            prop_assert!(buffer.len() <= buffer.capacity());
        }
    }
}
