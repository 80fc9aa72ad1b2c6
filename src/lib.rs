//! cyclesense library.
//!
//! Pure decision logic for a cycling companion: vehicle-transport
//! detection over bike telemetry, component wear estimation, nearby-place
//! lookup and ride CO2 accounting, plus the alert pipeline that turns
//! their results into rider notifications through port traits.

#![deny(unused_must_use)]

pub mod adapters;
pub mod alert;
pub mod app;
pub mod classify;
pub mod co2;
pub mod config;
pub mod error;
pub mod geo;
pub mod telemetry;

pub use error::{Error, Result};
