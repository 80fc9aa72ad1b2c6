//! Pure classifiers over already-collected data.
//!
//! Neither classifier performs I/O or keeps state between calls; both are
//! safe to share across threads.

pub mod motion;
pub mod wear;

pub use motion::{MotionClassifier, MotionFeatures, MotionReason, MotionVerdict};
pub use wear::{
    ComponentUsageRecord, Condition, ServiceStatus, TrackedComponent, WearAssessment,
    WearEstimator,
};
