//! Dashboard metric outputs.

use serde::{Deserialize, Serialize};

/// Direction of the month-over-month change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Increase,
    Decrease,
    #[default]
    #[serde(rename = "NOCHANGE")]
    NoChange,
}

/// A percent change between two periods.
///
/// `Unbounded` is the change from a zero baseline to a nonzero value; it is
/// kept apart from finite values so it never reaches a display as a number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PercentChange {
    Finite(f64),
    Unbounded,
}

impl Default for PercentChange {
    fn default() -> Self {
        PercentChange::Finite(0.0)
    }
}

impl PercentChange {
    /// The finite value, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            PercentChange::Finite(v) => Some(*v),
            PercentChange::Unbounded => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, PercentChange::Unbounded)
    }

    /// Unbounded growth from zero counts as an increase.
    pub fn change_type(&self) -> ChangeType {
        match self {
            PercentChange::Unbounded => ChangeType::Increase,
            PercentChange::Finite(v) if *v > 0.0 => ChangeType::Increase,
            PercentChange::Finite(v) if *v < 0.0 => ChangeType::Decrease,
            PercentChange::Finite(_) => ChangeType::NoChange,
        }
    }
}

/// Revenue, subscription and customer figures for one account.
///
/// Volumes are in major currency units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub volume_gross_today: f64,
    pub volume_gross_month_current: f64,
    pub volume_gross_month_current_percent: f64,
    pub volume_gross_month_previous: f64,
    pub volume_gross_month_to_date_previous: f64,
    pub volume_gross_month_forecast: f64,
    pub volume_gross_month_over_month_percent_change: PercentChange,
    pub volume_gross_month_over_month_change_type: ChangeType,
    /// Current month-to-date actual against previous month-to-date.
    pub volume_gross_month_to_date_percent_change: PercentChange,
    pub volume_pending: f64,
    pub volume_pending_percent: f64,
    pub volume_trialing: f64,
    pub volume_trialing_percent: f64,
    pub count_payments_today: u64,
    /// Customers created today.
    pub count_trialing_today: u64,
    pub count_trialing_month_current: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_type_follows_sign() {
        assert_eq!(PercentChange::Finite(12.5).change_type(), ChangeType::Increase);
        assert_eq!(PercentChange::Finite(-3.0).change_type(), ChangeType::Decrease);
        assert_eq!(PercentChange::Finite(0.0).change_type(), ChangeType::NoChange);
        assert_eq!(PercentChange::Unbounded.change_type(), ChangeType::Increase);
    }

    #[test]
    fn test_percent_change_serialization() {
        let finite = serde_json::to_value(PercentChange::Finite(25.0)).unwrap();
        assert_eq!(finite, serde_json::json!({ "kind": "finite", "value": 25.0 }));

        let unbounded = serde_json::to_value(PercentChange::Unbounded).unwrap();
        assert_eq!(unbounded, serde_json::json!({ "kind": "unbounded" }));
    }

    #[test]
    fn test_change_type_serialization() {
        assert_eq!(
            serde_json::to_value(ChangeType::NoChange).unwrap(),
            serde_json::json!("NOCHANGE")
        );
    }
}
