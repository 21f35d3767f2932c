//! Dashboard orchestration: fan out to the provider, then compose metrics.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinError;

use super::composer::compose;
use super::metrics::record_upstream_failure;
use super::provider::{AccountDataProvider, ProviderError};
use super::windows::Zone;
use super::ServiceError;
use crate::models::{AccountProfile, AuthorizationStatus, DashboardReport, LogoutReport};

#[derive(Clone)]
pub struct DashboardService {
    provider: Arc<dyn AccountDataProvider>,
    icon_link_ttl: Duration,
}

impl DashboardService {
    pub fn new(provider: Arc<dyn AccountDataProvider>, icon_link_ttl_minutes: i64) -> Self {
        Self {
            provider,
            icon_link_ttl: Duration::minutes(icon_link_ttl_minutes),
        }
    }

    /// Windows only, for a caller that has not attached an account yet.
    pub fn initialize(&self, timezone: Option<&str>) -> Result<DashboardReport, ServiceError> {
        let zone = Zone::parse(timezone)?;
        Ok(DashboardReport::initialized(zone.windows(Utc::now())))
    }

    pub async fn compute_dashboard(
        &self,
        account_id: &str,
        timezone: Option<&str>,
    ) -> Result<DashboardReport, ServiceError> {
        self.compute_dashboard_at(account_id, timezone, Utc::now())
            .await
    }

    /// Fetch the account's records and compose metrics as of `now`.
    ///
    /// Each fetch runs as its own task; a failed fetch contributes an empty
    /// collection. Only a failed account lookup marks the report as an error.
    pub async fn compute_dashboard_at(
        &self,
        account_id: &str,
        timezone: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<DashboardReport, ServiceError> {
        let zone = Zone::parse(timezone)?;
        let windows = zone.windows(now);

        let charges_since = windows.prev_month_start.to_utc();
        let period_end_before = windows.month_end.to_utc();
        let customers_since = windows.day_start.to_utc();

        let charges = tokio::spawn({
            let provider = Arc::clone(&self.provider);
            let account_id = account_id.to_string();
            async move { provider.list_charges(&account_id, charges_since).await }
        });
        let subscriptions = tokio::spawn({
            let provider = Arc::clone(&self.provider);
            let account_id = account_id.to_string();
            async move {
                provider
                    .list_subscriptions(&account_id, period_end_before, None)
                    .await
            }
        });
        let customers = tokio::spawn({
            let provider = Arc::clone(&self.provider);
            let account_id = account_id.to_string();
            async move { provider.list_customers(&account_id, customers_since).await }
        });
        let account = tokio::spawn({
            let provider = Arc::clone(&self.provider);
            let account_id = account_id.to_string();
            async move { provider.get_account(&account_id).await }
        });

        let (charges, subscriptions, customers, account) =
            tokio::join!(charges, subscriptions, customers, account);

        let charges = settle("charges", account_id, charges).unwrap_or_default();
        let subscriptions = settle("subscriptions", account_id, subscriptions).unwrap_or_default();
        let customers = settle("customers", account_id, customers).unwrap_or_default();
        let account = settle("account", account_id, account);

        let metrics = compose(&windows, &charges, &subscriptions, &customers);

        let mut report = DashboardReport::initialized(windows);
        report.metrics = metrics;
        report.account_id = Some(account_id.to_string());

        let report = match account {
            Ok(profile) => {
                report.account_icon_url = self.icon_url(&profile).await;
                report.account_name = profile.business_name;
                report.status = AuthorizationStatus::AuthorizedId;
                report.is_authorized = true;
                report.code = 200;
                report
            }
            Err(e) => report.with_error(e.http_status(), e.user_message()),
        };

        tracing::info!(
            account_id = %account_id,
            status = report.status.as_str(),
            charges = charges.len(),
            subscriptions = subscriptions.len(),
            customers = customers.len(),
            "Dashboard computed"
        );

        Ok(report)
    }

    /// Exchange an OAuth authorization code for a connected account.
    pub async fn authorize_code(
        &self,
        code: &str,
        timezone: Option<&str>,
    ) -> Result<DashboardReport, ServiceError> {
        let zone = Zone::parse(timezone)?;
        let report = DashboardReport::initialized(zone.windows(Utc::now()));

        match self.provider.exchange_code(code).await {
            Ok(token) => {
                tracing::info!(account_id = ?token.account_id, livemode = token.livemode, "Account connected");
                Ok(DashboardReport {
                    status: AuthorizationStatus::AuthorizedCode,
                    is_authorized: true,
                    code: 200,
                    account_id: token.account_id,
                    ..report
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "Authorization code exchange failed");
                Ok(report.with_error(e.http_status(), e.user_message()))
            }
        }
    }

    /// Revoke the platform's access to `account_id`.
    pub async fn revoke(&self, account_id: &str) -> LogoutReport {
        match self.provider.deauthorize(account_id).await {
            Ok(()) => LogoutReport {
                status: AuthorizationStatus::Revoked,
                account_id: account_id.to_string(),
                code: 200,
                error: None,
            },
            Err(e) => {
                tracing::error!(account_id = %account_id, error = %e, "Deauthorization failed");
                LogoutReport {
                    status: AuthorizationStatus::Error,
                    account_id: account_id.to_string(),
                    code: e.http_status(),
                    error: Some(e.user_message()),
                }
            }
        }
    }

    async fn icon_url(&self, profile: &AccountProfile) -> Option<String> {
        let file_id = profile.icon_file_id.as_deref()?;
        let expires_at = Utc::now() + self.icon_link_ttl;

        match self
            .provider
            .create_file_link(&profile.id, file_id, expires_at)
            .await
        {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(account_id = %profile.id, file_id = %file_id, error = %e, "Icon link creation failed");
                None
            }
        }
    }
}

/// Flatten a joined fetch task, logging and counting failures.
fn settle<T>(
    resource: &'static str,
    account_id: &str,
    joined: Result<Result<T, ProviderError>, JoinError>,
) -> Result<T, ProviderError> {
    let result = joined
        .unwrap_or_else(|e| Err(ProviderError::Network(format!("fetch task failed: {}", e))));

    if let Err(e) = &result {
        tracing::error!(resource, account_id = %account_id, error = %e, "Upstream fetch failed");
        record_upstream_failure(resource);
    }

    result
}
