//! Component wear and service scheduling.
//!
//! Translates raw usage numbers into a discrete condition, an actionable
//! recommendation, and a service-interval status.  Pure: the caller passes
//! the reference time, so the same record and `now` always give the same
//! assessment.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::config::MaintenanceConfig;
use crate::error::{InvalidInput, Result};

pub const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Usage counters for one maintained component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentUsageRecord {
    /// Distance ridden on this component (km).
    pub current_mileage: f64,
    /// Distance the component is rated for (km).
    pub expected_lifespan: f64,
    pub maintenance_interval_days: u32,
    /// Last service, milliseconds since the Unix epoch.
    pub last_maintenance_ms: i64,
}

impl ComponentUsageRecord {
    pub fn validate(&self) -> core::result::Result<(), InvalidInput> {
        if !self.current_mileage.is_finite() {
            return Err(InvalidInput::NonFinite("current_mileage"));
        }
        if self.current_mileage < 0.0 {
            return Err(InvalidInput::NegativeMileage);
        }
        if !self.expected_lifespan.is_finite() {
            return Err(InvalidInput::NonFinite("expected_lifespan"));
        }
        if self.expected_lifespan <= 0.0 {
            return Err(InvalidInput::NonPositiveLifespan);
        }
        if self.maintenance_interval_days == 0 {
            return Err(InvalidInput::ZeroInterval);
        }
        Ok(())
    }
}

/// A named component on a bike (chain, brake pads, tyres, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedComponent {
    pub id: String,
    pub name: String,
    pub usage: ComponentUsageRecord,
}

/// Discrete wear band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    Excellent,
    Good,
    Fair,
    NeedsAttention,
    Critical,
}

impl Condition {
    /// Band for a wear percentage; bands are inclusive at their lower edge.
    pub fn from_wear(wear_percentage: f64) -> Self {
        if wear_percentage >= 90.0 {
            Self::Critical
        } else if wear_percentage >= 75.0 {
            Self::NeedsAttention
        } else if wear_percentage >= 50.0 {
            Self::Fair
        } else if wear_percentage >= 25.0 {
            Self::Good
        } else {
            Self::Excellent
        }
    }

    pub const fn recommendation(self) -> &'static str {
        match self {
            Self::Critical => "Immediate replacement recommended",
            Self::NeedsAttention => "Plan for replacement soon",
            Self::Fair => "Monitor wear and schedule maintenance",
            Self::Good => "Regular maintenance recommended",
            Self::Excellent => "Continue regular maintenance",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::NeedsAttention => "needs-attention",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a component stands against its service interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceStatus {
    Good,
    ServiceSoon,
    NeedsService,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WearAssessment {
    /// Usage as a share of lifespan; above 100 means overdue.
    pub wear_percentage: f64,
    pub condition: Condition,
    pub recommendation: String,
    pub days_since_maintenance: u32,
    pub days_until_maintenance: u32,
    pub service_status: ServiceStatus,
}

#[derive(Debug, Clone, Default)]
pub struct WearEstimator {
    config: MaintenanceConfig,
}

impl WearEstimator {
    pub fn new(config: MaintenanceConfig) -> Self {
        Self { config }
    }

    pub fn assess(&self, record: &ComponentUsageRecord, now_ms: i64) -> Result<WearAssessment> {
        record.validate()?;

        // A service date in the future (clock skew, bad input) counts as
        // "just serviced".
        let elapsed_ms = now_ms.saturating_sub(record.last_maintenance_ms).max(0);
        let days_since = u32::try_from(elapsed_ms / MS_PER_DAY).unwrap_or(u32::MAX);
        let interval = record.maintenance_interval_days;
        let days_until = interval.saturating_sub(days_since);

        let wear_percentage = record.current_mileage * 100.0 / record.expected_lifespan;
        let condition = Condition::from_wear(wear_percentage);

        let service_status = if days_since >= interval {
            ServiceStatus::NeedsService
        } else if f64::from(days_since) >= f64::from(interval) * self.config.service_soon_ratio {
            ServiceStatus::ServiceSoon
        } else {
            ServiceStatus::Good
        };

        Ok(WearAssessment {
            wear_percentage,
            condition,
            recommendation: condition.recommendation().to_owned(),
            days_since_maintenance: days_since,
            days_until_maintenance: days_until,
            service_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const NOW: i64 = 1_750_000_000_000;

    fn record(mileage: f64, lifespan: f64, interval: u32, days_ago: i64) -> ComponentUsageRecord {
        ComponentUsageRecord {
            current_mileage: mileage,
            expected_lifespan: lifespan,
            maintenance_interval_days: interval,
            last_maintenance_ms: NOW - days_ago * MS_PER_DAY,
        }
    }

    #[test]
    fn overdue_worn_chain_is_critical() {
        let a = WearEstimator::default()
            .assess(&record(450.0, 500.0, 30, 40), NOW)
            .unwrap();
        assert!((a.wear_percentage - 90.0).abs() < 1e-9);
        assert_eq!(a.condition, Condition::Critical);
        assert_eq!(a.recommendation, "Immediate replacement recommended");
        assert_eq!(a.days_until_maintenance, 0);
        assert_eq!(a.days_since_maintenance, 40);
        assert_eq!(a.service_status, ServiceStatus::NeedsService);
    }

    #[test]
    fn condition_band_edges() {
        let cases = [
            (90.0, Condition::Critical),
            (89.999, Condition::NeedsAttention),
            (75.0, Condition::NeedsAttention),
            (74.9, Condition::Fair),
            (50.0, Condition::Fair),
            (25.0, Condition::Good),
            (24.99, Condition::Excellent),
            (0.0, Condition::Excellent),
            (250.0, Condition::Critical),
        ];
        for (wear, expected) in cases {
            assert_eq!(Condition::from_wear(wear), expected, "wear {wear}");
        }
    }

    #[test]
    fn wear_is_uncapped() {
        let a = WearEstimator::default()
            .assess(&record(1500.0, 1000.0, 90, 0), NOW)
            .unwrap();
        assert!((a.wear_percentage - 150.0).abs() < 1e-9);
    }

    #[test]
    fn future_service_date_clamps_to_zero_days() {
        let a = WearEstimator::default()
            .assess(&record(10.0, 1000.0, 30, -3), NOW)
            .unwrap();
        assert_eq!(a.days_since_maintenance, 0);
        assert_eq!(a.days_until_maintenance, 30);
        assert_eq!(a.service_status, ServiceStatus::Good);
    }

    #[test]
    fn partial_days_floor() {
        let mut r = record(0.0, 100.0, 10, 0);
        r.last_maintenance_ms = NOW - (2 * MS_PER_DAY + MS_PER_DAY / 2);
        let a = WearEstimator::default().assess(&r, NOW).unwrap();
        assert_eq!(a.days_since_maintenance, 2);
        assert_eq!(a.days_until_maintenance, 8);
    }

    #[test]
    fn service_soon_after_eighty_percent_of_interval() {
        let est = WearEstimator::default();
        assert_eq!(
            est.assess(&record(0.0, 100.0, 30, 23), NOW).unwrap().service_status,
            ServiceStatus::Good
        );
        assert_eq!(
            est.assess(&record(0.0, 100.0, 30, 25), NOW).unwrap().service_status,
            ServiceStatus::ServiceSoon
        );
        assert_eq!(
            est.assess(&record(0.0, 100.0, 30, 30), NOW).unwrap().service_status,
            ServiceStatus::NeedsService
        );
    }

    #[test]
    fn rejects_invalid_records() {
        let est = WearEstimator::default();
        let cases = [
            (record(-1.0, 100.0, 30, 0), InvalidInput::NegativeMileage),
            (record(1.0, 0.0, 30, 0), InvalidInput::NonPositiveLifespan),
            (record(1.0, -5.0, 30, 0), InvalidInput::NonPositiveLifespan),
            (record(1.0, 100.0, 0, 0), InvalidInput::ZeroInterval),
            (record(f64::NAN, 100.0, 30, 0), InvalidInput::NonFinite("current_mileage")),
            (record(1.0, f64::INFINITY, 30, 0), InvalidInput::NonFinite("expected_lifespan")),
        ];
        for (r, expected) in cases {
            assert_eq!(est.assess(&r, NOW), Err(Error::InvalidInput(expected)));
        }
    }

    #[test]
    fn condition_serialises_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Condition::NeedsAttention).unwrap(),
            "\"needs-attention\""
        );
        assert_eq!(Condition::NeedsAttention.to_string(), "needs-attention");
    }
}
