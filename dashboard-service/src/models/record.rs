//! Immutable snapshots of payment platform records.
//!
//! Timestamps are UTC instants; amounts stay in minor units (cents) until
//! aggregation converts them for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A charge as seen by the aggregation core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub amount: i64,
    pub succeeded: bool,
    pub refunded: bool,
    pub disputed: bool,
}

impl ChargeRecord {
    /// Settled revenue: succeeded, not refunded, not disputed.
    pub fn is_settled(&self) -> bool {
        self.succeeded && !self.refunded && !self.disputed
    }
}

/// Subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    Canceled,
    Incomplete,
    IncompleteExpired,
    PastDue,
    Unpaid,
    Paused,
    #[serde(other)]
    Unknown,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Incomplete => "incomplete",
            SubscriptionStatus::IncompleteExpired => "incomplete_expired",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Unpaid => "unpaid",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Unknown => "unknown",
        }
    }
}

/// Subscription snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub status: SubscriptionStatus,
    /// Plan price per period, minor units. Zero when the subscription has no plan.
    pub plan_amount: i64,
}

/// Customer snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

/// Connected account profile and branding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: String,
    pub business_name: Option<String>,
    /// File id of the branding icon, if one is uploaded.
    pub icon_file_id: Option<String>,
}

/// Result of an OAuth authorization-code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthToken {
    /// Connected account id (`stripe_user_id`).
    pub account_id: Option<String>,
    pub scope: Option<String>,
    pub livemode: bool,
}
