pub mod aggregation;
pub mod composer;
pub mod dashboard;
pub mod error;
pub mod metrics;
pub mod provider;
pub mod stripe;
pub mod windows;

pub use dashboard::DashboardService;
pub use error::ServiceError;
pub use metrics::{get_metrics, init_metrics};
pub use provider::{AccountDataProvider, ProviderError};
pub use stripe::StripeClient;
pub use windows::{calculate_windows, Zone};
