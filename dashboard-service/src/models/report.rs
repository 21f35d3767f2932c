use serde::{Deserialize, Serialize};

use super::{DashboardMetrics, TimeWindowSet};

/// How the caller's account connection was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationStatus {
    Initialized,
    AuthorizedCode,
    AuthorizedId,
    Revoked,
    Error,
}

impl AuthorizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationStatus::Initialized => "INITIALIZED",
            AuthorizationStatus::AuthorizedCode => "AUTHORIZED_CODE",
            AuthorizationStatus::AuthorizedId => "AUTHORIZED_ID",
            AuthorizationStatus::Revoked => "REVOKED",
            AuthorizationStatus::Error => "ERROR",
        }
    }
}

/// Response body of the dashboard endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub status: AuthorizationStatus,
    pub is_authorized: bool,
    /// HTTP status reported by the payment platform, 0 when no call was made.
    pub code: u16,
    pub error: Option<String>,
    pub account_id: Option<String>,
    pub account_name: Option<String>,
    pub account_icon_url: Option<String>,
    pub timezone: String,
    pub windows: TimeWindowSet,
    pub metrics: DashboardMetrics,
}

impl DashboardReport {
    /// Report with windows only, before any account is attached.
    pub fn initialized(windows: TimeWindowSet) -> Self {
        Self {
            status: AuthorizationStatus::Initialized,
            is_authorized: false,
            code: 0,
            error: None,
            account_id: None,
            account_name: None,
            account_icon_url: None,
            timezone: windows.timezone.clone(),
            windows,
            metrics: DashboardMetrics::default(),
        }
    }

    pub fn with_error(mut self, code: u16, message: impl Into<String>) -> Self {
        self.status = AuthorizationStatus::Error;
        self.is_authorized = false;
        self.code = code;
        self.error = Some(message.into());
        self
    }
}

/// Response body of the logout endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LogoutReport {
    pub status: AuthorizationStatus,
    pub account_id: String,
    pub code: u16,
    pub error: Option<String>,
}
