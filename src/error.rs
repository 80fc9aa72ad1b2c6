//! Unified error types for the cyclesense library.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! caller's error handling uniform. Variants are `Copy` so they can be
//! passed through the monitor service and event sinks without allocation.
//!
//! Insufficient telemetry is **not** an error: the motion classifier
//! answers it with a defined non-anomalous verdict.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Caller supplied non-physical input (negative mileage, NaN speed, ...).
    InvalidInput(InvalidInput),
    /// A sample buffer rejected an operation.
    Buffer(BufferError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// An alert could not be handed to the delivery layer.
    Delivery(DeliveryError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(e) => write!(f, "invalid input: {e}"),
            Self::Buffer(e) => write!(f, "buffer: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Delivery(e) => write!(f, "delivery: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Invalid input
// ---------------------------------------------------------------------------

/// Contract violations on numeric input.  These are deterministic: retrying
/// with the same input always fails the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidInput {
    /// A field was NaN or infinite.  Carries the field name.
    NonFinite(&'static str),
    /// Speed below zero.
    NegativeSpeed,
    /// Latitude outside [-90, 90] or longitude outside [-180, 180].
    CoordinateOutOfRange,
    /// Mileage below zero.
    NegativeMileage,
    /// Expected lifespan zero or below (would divide by zero).
    NonPositiveLifespan,
    /// Maintenance interval of zero days.
    ZeroInterval,
    /// Distance below zero.
    NegativeDistance,
}

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite(field) => write!(f, "{field} is not a finite number"),
            Self::NegativeSpeed => write!(f, "speed must not be negative"),
            Self::CoordinateOutOfRange => write!(f, "coordinate out of range"),
            Self::NegativeMileage => write!(f, "mileage must not be negative"),
            Self::NonPositiveLifespan => write!(f, "expected lifespan must be positive"),
            Self::ZeroInterval => write!(f, "maintenance interval must be at least one day"),
            Self::NegativeDistance => write!(f, "distance must not be negative"),
        }
    }
}

impl From<InvalidInput> for Error {
    fn from(e: InvalidInput) -> Self {
        Self::InvalidInput(e)
    }
}

// ---------------------------------------------------------------------------
// Buffer errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// Sample timestamp is older than the newest buffered sample.
    OutOfOrder { last_ms: i64, rejected_ms: i64 },
    /// A snapshot could not be decoded.
    CorruptSnapshot,
    /// A snapshot could not be encoded.
    EncodeFailed,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfOrder {
                last_ms,
                rejected_ms,
            } => write!(
                f,
                "sample at {rejected_ms} ms is older than last sample at {last_ms} ms"
            ),
            Self::CorruptSnapshot => write!(f, "snapshot corrupted"),
            Self::EncodeFailed => write!(f, "snapshot encoding failed"),
        }
    }
}

impl From<BufferError> for Error {
    fn from(e: BufferError) -> Self {
        Self::Buffer(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Delivery errors
// ---------------------------------------------------------------------------

/// Errors reported by an [`AlertSink`](crate::app::ports::AlertSink).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// No delivery channel configured for the recipient.
    NoRecipient,
    /// The delivery backend refused or failed the request.
    Rejected,
    /// The delivery backend could not be reached.
    Unavailable,
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRecipient => write!(f, "no recipient configured"),
            Self::Rejected => write!(f, "rejected by backend"),
            Self::Unavailable => write!(f, "backend unavailable"),
        }
    }
}

impl From<DeliveryError> for Error {
    fn from(e: DeliveryError) -> Self {
        Self::Delivery(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
