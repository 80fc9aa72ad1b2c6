//! Fuzz target: `SampleBuffer::restore`
//!
//! Feeds arbitrary bytes to the snapshot decoder and asserts that it
//! never panics, that anything it accepts respects the buffer invariants,
//! and that a re-encoded buffer decodes to the same window.
//!
//! cargo fuzz run fuzz_snapshot_restore

#![no_main]

use cyclesense::telemetry::SampleBuffer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(buffer) = SampleBuffer::restore(data) else {
        return;
    };

    assert!(buffer.len() <= buffer.capacity());
    let samples = buffer.to_vec();
    assert!(samples.windows(2).all(|w| w[0].timestamp_ms <= w[1].timestamp_ms));
    assert!(samples.iter().all(|s| s.validate().is_ok()));

    let blob = buffer.snapshot().expect("accepted buffer must re-encode");
    let again = SampleBuffer::restore(&blob).expect("re-encoded snapshot must decode");
    assert_eq!(again.to_vec(), samples);
});
