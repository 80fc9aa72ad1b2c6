//! Per-bike telemetry buffer.
//!
//! Samples are kept in arrival order, which must also be chronological:
//! a sample older than the newest buffered one is rejected.  Retention is
//! bounded by a capacity (oldest evicted first); any finer policy is the
//! caller's job via [`SampleBuffer::prune_before`].
//!
//! ```text
//!   ingest ──▶ validate ──▶ order check ──▶ [ s0 s1 s2 … sN ] ──▶ classify
//!                                             ▲ evict when full
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock};

use log::info;
use serde::{Deserialize, Serialize};

use crate::classify::motion::{MotionClassifier, MotionVerdict};
use crate::error::{BufferError, Result};
use crate::geo::haversine_km;

use super::TelemetrySample;

/// Ordered, bounded collection of samples for one tracked asset.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: VecDeque<TelemetrySample>,
    capacity: usize,
}

/// Wire form of a buffer for persistence between sessions.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    capacity: u32,
    samples: Vec<TelemetrySample>,
}

impl SampleBuffer {
    /// Create an empty buffer.  A capacity below 2 is raised to 2, the
    /// fewest samples the classifier can work with.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            samples: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Append a sample.  Invalid or out-of-order samples leave the buffer
    /// untouched.  Returns the evicted sample, if the buffer was full.
    pub fn push(&mut self, sample: TelemetrySample) -> Result<Option<TelemetrySample>> {
        sample.validate()?;
        if let Some(last) = self.samples.back() {
            if sample.timestamp_ms < last.timestamp_ms {
                return Err(BufferError::OutOfOrder {
                    last_ms: last.timestamp_ms,
                    rejected_ms: sample.timestamp_ms,
                }
                .into());
            }
        }

        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        Ok(evicted)
    }

    /// Drop every sample strictly older than `cutoff_ms`.  Returns how many
    /// were removed.
    pub fn prune_before(&mut self, cutoff_ms: i64) -> usize {
        let keep_from = self
            .samples
            .iter()
            .position(|s| s.timestamp_ms >= cutoff_ms)
            .unwrap_or(self.samples.len());
        self.samples.drain(..keep_from);
        keep_from
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last(&self) -> Option<&TelemetrySample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TelemetrySample> {
        self.samples.iter()
    }

    /// Contiguous copy of the window, oldest first.
    pub fn to_vec(&self) -> Vec<TelemetrySample> {
        self.samples.iter().copied().collect()
    }

    /// Span between the oldest and newest sample (ms).
    pub fn span_ms(&self) -> i64 {
        match (self.samples.front(), self.samples.back()) {
            (Some(first), Some(last)) => last.timestamp_ms - first.timestamp_ms,
            _ => 0,
        }
    }

    /// Distance travelled along the recorded positions (km).
    pub fn path_length_km(&self) -> f64 {
        self.samples
            .iter()
            .zip(self.samples.iter().skip(1))
            .map(|(a, b)| haversine_km(a.position, b.position))
            .sum()
    }

    /// Run the classifier over the current window.
    pub fn classify(&self, classifier: &MotionClassifier) -> MotionVerdict {
        classifier.classify(&self.to_vec())
    }

    // ── Snapshot ──────────────────────────────────────────────

    /// Encode the buffer into a compact postcard blob.
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        let snap = Snapshot {
            capacity: u32::try_from(self.capacity).unwrap_or(u32::MAX),
            samples: self.to_vec(),
        };
        postcard::to_allocvec(&snap).map_err(|_| BufferError::EncodeFailed.into())
    }

    /// Rebuild a buffer from [`snapshot`](Self::snapshot) output.  Every
    /// sample goes through [`push`](Self::push) again, so a tampered blob
    /// cannot smuggle in invalid or unordered data.
    pub fn restore(bytes: &[u8]) -> Result<Self> {
        let snap: Snapshot =
            postcard::from_bytes(bytes).map_err(|_| BufferError::CorruptSnapshot)?;
        let mut buffer = Self::new(snap.capacity as usize);
        for sample in snap.samples {
            buffer.push(sample)?;
        }
        info!(
            "Restored telemetry buffer: {} samples, capacity {}",
            buffer.len(),
            buffer.capacity
        );
        Ok(buffer)
    }
}

// ───────────────────────────────────────────────────────────────
// Shared buffer
// ───────────────────────────────────────────────────────────────

/// A [`SampleBuffer`] shared between one telemetry writer and any number
/// of classifying readers.  Clones share the same underlying buffer.
///
/// A poisoned lock is recovered: every buffer mutation completes before
/// it can panic, so the data behind a poisoned lock is still consistent.
#[derive(Debug, Clone)]
pub struct SharedSampleBuffer {
    inner: Arc<RwLock<SampleBuffer>>,
}

impl SharedSampleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self::from_buffer(SampleBuffer::new(capacity))
    }

    pub fn from_buffer(buffer: SampleBuffer) -> Self {
        Self {
            inner: Arc::new(RwLock::new(buffer)),
        }
    }

    /// Append under the exclusive lock.
    pub fn push(&self, sample: TelemetrySample) -> Result<Option<TelemetrySample>> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sample)
    }

    /// Classify under the shared lock.
    pub fn classify(&self, classifier: &MotionClassifier) -> MotionVerdict {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .classify(classifier)
    }

    pub fn prune_before(&self, cutoff_ms: i64) -> usize {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .prune_before(cutoff_ms)
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_vec(&self) -> Vec<TelemetrySample> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .to_vec()
    }
}
