//! Domain models for dashboard-service.

mod metrics;
mod record;
mod report;
mod window;

pub use metrics::{ChangeType, DashboardMetrics, PercentChange};
pub use record::{
    AccountProfile, ChargeRecord, CustomerRecord, OAuthToken, SubscriptionRecord,
    SubscriptionStatus,
};
pub use report::{AuthorizationStatus, DashboardReport, LogoutReport};
pub use window::{TimeWindowSet, Window};
