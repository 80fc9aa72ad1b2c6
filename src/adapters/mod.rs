//! Adapters: concrete implementations of the [`app::ports`](crate::app::ports) traits.
//!
//! Only log-backed sinks live in this crate; SMS / push gateways and
//! persistent stores are provided by the embedding application.

pub mod log_sink;
