//! Application core.  Pure domain logic, zero I/O.
//!
//! This module wires the classifiers, per-bike telemetry buffers and the
//! alert dispatcher together.  Everything that leaves the process (alert
//! delivery, structured events) goes through the **port traits** in
//! [`ports`], keeping this layer testable with in-memory adapters.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
