//! CO2 savings from rides that replaced motorised trips.
//!
//! Linear model: every kilometre ridden saves the per-kilometre emissions
//! of the transport mode it displaced.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvalidInput;

/// Yearly CO2 uptake of one tree (kg).
const KG_PER_TREE_YEAR: f64 = 21.0;

/// Motorised mode a ride replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    #[default]
    Car,
    Bus,
    Motorcycle,
}

impl TransportMode {
    pub const ALL: [Self; 3] = [Self::Car, Self::Bus, Self::Motorcycle];

    /// Emissions per kilometre (kg CO2).
    pub const fn kg_per_km(self) -> f64 {
        match self {
            Self::Car => 0.192,
            Self::Bus => 0.082,
            Self::Motorcycle => 0.103,
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Car => write!(f, "car"),
            Self::Bus => write!(f, "bus"),
            Self::Motorcycle => write!(f, "motorcycle"),
        }
    }
}

/// CO2 saved by riding `distance_km` instead of taking `mode` (kg).
pub fn co2_saved_kg(distance_km: f64, mode: TransportMode) -> Result<f64, InvalidInput> {
    if !distance_km.is_finite() {
        return Err(InvalidInput::NonFinite("distance"));
    }
    if distance_km < 0.0 {
        return Err(InvalidInput::NegativeDistance);
    }
    Ok(distance_km * mode.kg_per_km())
}

/// Running per-mode totals for one rider or community.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Co2Ledger {
    pub car_kg: f64,
    pub bus_kg: f64,
    pub motorcycle_kg: f64,
    pub rides: u32,
}

impl Co2Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one ride; returns the CO2 it saved.
    pub fn record_ride(&mut self, distance_km: f64, mode: TransportMode) -> Result<f64, InvalidInput> {
        let saved = co2_saved_kg(distance_km, mode)?;
        *self.slot_mut(mode) += saved;
        self.rides = self.rides.saturating_add(1);
        Ok(saved)
    }

    pub fn by_mode(&self, mode: TransportMode) -> f64 {
        match mode {
            TransportMode::Car => self.car_kg,
            TransportMode::Bus => self.bus_kg,
            TransportMode::Motorcycle => self.motorcycle_kg,
        }
    }

    pub fn total_kg(&self) -> f64 {
        TransportMode::ALL.iter().map(|m| self.by_mode(*m)).sum()
    }

    /// Fold another ledger into this one (e.g. members into a community).
    pub fn merge(&mut self, other: &Self) {
        for mode in TransportMode::ALL {
            *self.slot_mut(mode) += other.by_mode(mode);
        }
        self.rides = self.rides.saturating_add(other.rides);
    }

    fn slot_mut(&mut self, mode: TransportMode) -> &mut f64 {
        match mode {
            TransportMode::Car => &mut self.car_kg,
            TransportMode::Bus => &mut self.bus_kg,
            TransportMode::Motorcycle => &mut self.motorcycle_kg,
        }
    }
}

/// Grams below one kilogram, two decimals above.
pub fn format_co2(kg: f64) -> String {
    if kg < 1.0 {
        format!("{} g", (kg * 1000.0).round() as i64)
    } else {
        format!("{kg:.2} kg")
    }
}

pub fn tree_equivalent(kg: f64) -> String {
    format!("Equivalent to {:.1} trees planted", kg / KG_PER_TREE_YEAR)
}
