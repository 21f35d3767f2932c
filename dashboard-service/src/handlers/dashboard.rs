//! Dashboard and logout handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use service_core::error::AppError;
use validator::{Validate, ValidationError};

use crate::{
    models::{DashboardReport, LogoutReport},
    services::metrics::record_dashboard_request,
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct DashboardQuery {
    /// IANA timezone; blank selects the server's local zone.
    #[serde(rename = "tzIdentifier")]
    #[validate(length(max = 64))]
    pub tz_identifier: Option<String>,
    /// OAuth authorization code returned by Stripe Connect.
    #[validate(length(max = 256))]
    pub code: Option<String>,
    /// Connected account id.
    #[validate(length(max = 255))]
    pub account: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LogoutQuery {
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub account: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Dashboard for the calling account.
///
/// A `code` takes precedence and connects a new account; otherwise an
/// `account` computes its metrics; with neither only windows are returned.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardReport>, AppError> {
    query.validate()?;

    let timezone = query.tz_identifier.as_deref();

    let report = if let Some(code) = present(&query.code) {
        state.dashboard.authorize_code(code, timezone).await?
    } else if let Some(account_id) = present(&query.account) {
        state.dashboard.compute_dashboard(account_id, timezone).await?
    } else {
        state.dashboard.initialize(timezone)?
    };

    record_dashboard_request(report.status.as_str());

    Ok(Json(report))
}

/// Disconnect an account from the platform.
pub async fn logout(
    State(state): State<AppState>,
    Query(query): Query<LogoutQuery>,
) -> Result<Json<LogoutReport>, AppError> {
    query.validate()?;

    let report = state.dashboard.revoke(query.account.trim()).await;
    record_dashboard_request(report.status.as_str());

    Ok(Json(report))
}
