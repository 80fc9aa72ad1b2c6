//! Fuzz target: `MotionClassifier::classify`
//!
//! Builds a window of unvalidated samples (NaN and infinities included)
//! from raw bytes and checks that the verdict stays well-formed and does
//! not depend on input order.
//!
//! cargo fuzz run fuzz_classify

#![no_main]

use cyclesense::classify::MotionClassifier;
use cyclesense::telemetry::{GeoPoint, TelemetrySample};
use libfuzzer_sys::fuzz_target;

/// i32 timestamp + four f32 fields.
const RECORD_LEN: usize = 20;

fn f32_at(chunk: &[u8], at: usize) -> f64 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&chunk[at..at + 4]);
    f64::from(f32::from_le_bytes(b))
}

fuzz_target!(|data: &[u8]| {
    let samples: Vec<TelemetrySample> = data
        .chunks_exact(RECORD_LEN)
        .map(|c| {
            let mut t = [0u8; 4];
            t.copy_from_slice(&c[..4]);
            TelemetrySample::new(
                i64::from(i32::from_le_bytes(t)),
                f32_at(c, 4),
                f32_at(c, 8),
                GeoPoint::new(f32_at(c, 12), f32_at(c, 16)),
            )
        })
        .collect();

    let classifier = MotionClassifier::default();
    let verdict = classifier.classify(&samples);
    assert!((0.0..=1.0).contains(&verdict.confidence));
    assert_eq!(
        verdict.is_anomalous,
        verdict.confidence > classifier.thresholds().anomaly_confidence_threshold
    );

    let mut reversed = samples.clone();
    reversed.reverse();
    assert_eq!(classifier.classify(&reversed), verdict);
});
