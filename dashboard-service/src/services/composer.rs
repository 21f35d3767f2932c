//! Combines window aggregates into dashboard metrics.

use crate::models::{
    ChargeRecord, CustomerRecord, DashboardMetrics, PercentChange, SubscriptionRecord,
    TimeWindowSet,
};

use super::aggregation::{
    customers_in_window, subscriptions_trialing, subscriptions_upcoming, transactions_in_window,
    TrialingBound,
};

/// Percent change from `previous` to `current`.
///
/// Equal values are no change; a zero baseline with a nonzero current value is
/// `Unbounded`.
pub fn percentage_diff(previous: f64, current: f64) -> PercentChange {
    if current == previous {
        PercentChange::Finite(0.0)
    } else if previous == 0.0 {
        PercentChange::Unbounded
    } else {
        PercentChange::Finite((current - previous) / previous * 100.0)
    }
}

/// `part` as a percentage of `whole`; 0 when `whole` is 0.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// Compute every dashboard figure from one request's record snapshots.
pub fn compose(
    windows: &TimeWindowSet,
    charges: &[ChargeRecord],
    subscriptions: &[SubscriptionRecord],
    customers: &[CustomerRecord],
) -> DashboardMetrics {
    let today = transactions_in_window(charges, &windows.day());
    let month_current = transactions_in_window(charges, &windows.month()).amount;
    let month_previous = transactions_in_window(charges, &windows.previous_month()).amount;
    let month_to_date_previous =
        transactions_in_window(charges, &windows.previous_month_to_date()).amount;
    let month_to_date_current = transactions_in_window(charges, &windows.month_to_date()).amount;

    let pending = subscriptions_upcoming(subscriptions, &windows.month_end);
    let trialing =
        subscriptions_trialing(subscriptions, &TrialingBound::PeriodEnd(windows.month_end));

    let forecast = month_current + pending + trialing.amount;
    let month_over_month = percentage_diff(month_previous, forecast);

    DashboardMetrics {
        volume_gross_today: today.amount,
        volume_gross_month_current: month_current,
        volume_gross_month_current_percent: percent_of(month_current, forecast),
        volume_gross_month_previous: month_previous,
        volume_gross_month_to_date_previous: month_to_date_previous,
        volume_gross_month_forecast: forecast,
        volume_gross_month_over_month_percent_change: month_over_month,
        volume_gross_month_over_month_change_type: month_over_month.change_type(),
        volume_gross_month_to_date_percent_change: percentage_diff(
            month_to_date_previous,
            month_to_date_current,
        ),
        volume_pending: pending,
        volume_pending_percent: percent_of(pending, forecast),
        volume_trialing: trialing.amount,
        volume_trialing_percent: percent_of(trialing.amount, forecast),
        count_payments_today: today.count,
        count_trialing_today: customers_in_window(customers, &windows.day()),
        count_trialing_month_current: trialing.count,
    }
}
