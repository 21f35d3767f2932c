//! Filter-and-sum routines over record snapshots.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::models::{ChargeRecord, CustomerRecord, SubscriptionRecord, SubscriptionStatus, Window};

/// Minor currency units per major unit.
const MINOR_UNITS_PER_MAJOR: f64 = 100.0;

pub fn to_major_units(minor: i64) -> f64 {
    minor as f64 / MINOR_UNITS_PER_MAJOR
}

/// Sum (major units) and count of matched records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub amount: f64,
    pub count: u64,
}

impl Totals {
    fn add(mut self, minor: i64) -> Self {
        self.amount += to_major_units(minor);
        self.count += 1;
        self
    }
}

/// Which subscriptions count as trialing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialingBound {
    /// Trialing or canceled subscriptions created inside the window.
    Created(Window),
    /// Trialing subscriptions whose current period ends by the instant.
    PeriodEnd(DateTime<FixedOffset>),
}

/// Settled charges created inside `window`.
pub fn transactions_in_window(charges: &[ChargeRecord], window: &Window) -> Totals {
    charges
        .iter()
        .filter(|c| window.contains(c.created_at) && c.is_settled())
        .fold(Totals::default(), |totals, c| totals.add(c.amount))
}

/// Plan value and count of trialing subscriptions.
pub fn subscriptions_trialing(
    subscriptions: &[SubscriptionRecord],
    bound: &TrialingBound,
) -> Totals {
    subscriptions
        .iter()
        .filter(|s| match bound {
            TrialingBound::Created(window) => {
                matches!(
                    s.status,
                    SubscriptionStatus::Trialing | SubscriptionStatus::Canceled
                ) && window.contains(s.created_at)
            }
            TrialingBound::PeriodEnd(end) => {
                s.status == SubscriptionStatus::Trialing && s.current_period_end <= *end
            }
        })
        .fold(Totals::default(), |totals, s| totals.add(s.plan_amount))
}

/// Plan value of active subscriptions that renew by `end`.
pub fn subscriptions_upcoming(
    subscriptions: &[SubscriptionRecord],
    end: &DateTime<FixedOffset>,
) -> f64 {
    subscriptions
        .iter()
        .filter(|s| s.status == SubscriptionStatus::Active && s.current_period_end <= *end)
        .map(|s| to_major_units(s.plan_amount))
        .sum()
}

/// Customers created inside `window`.
pub fn customers_in_window(customers: &[CustomerRecord], window: &Window) -> u64 {
    customers
        .iter()
        .filter(|c| window.contains(c.created_at))
        .count() as u64
}
