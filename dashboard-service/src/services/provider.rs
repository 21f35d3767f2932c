//! Account data provider abstraction.
//!
//! The dashboard only reads through this trait, so the payment platform can be
//! swapped for a fake in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    AccountProfile, ChargeRecord, CustomerRecord, OAuthToken, SubscriptionRecord,
    SubscriptionStatus,
};

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// HTTP status to report to the dashboard client.
    pub fn http_status(&self) -> u16 {
        match self {
            ProviderError::Api { status, .. } => *status,
            ProviderError::NotConfigured(_) => 500,
            ProviderError::Network(_) | ProviderError::Decode(_) => 502,
        }
    }

    /// Message safe to show an end user.
    pub fn user_message(&self) -> String {
        match self {
            ProviderError::Api { message, .. } => message.clone(),
            ProviderError::NotConfigured(_) => "Payment platform is not configured".to_string(),
            ProviderError::Network(_) => "Payment platform is unreachable".to_string(),
            ProviderError::Decode(_) => "Unexpected response from payment platform".to_string(),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

/// Read access to a connected account plus the OAuth connection lifecycle.
#[async_trait]
pub trait AccountDataProvider: Send + Sync {
    /// Charges created at or after `created_after`.
    async fn list_charges(
        &self,
        account_id: &str,
        created_after: DateTime<Utc>,
    ) -> Result<Vec<ChargeRecord>, ProviderError>;

    /// Subscriptions whose current period ends at or before `period_end_before`.
    async fn list_subscriptions(
        &self,
        account_id: &str,
        period_end_before: DateTime<Utc>,
        status: Option<SubscriptionStatus>,
    ) -> Result<Vec<SubscriptionRecord>, ProviderError>;

    /// Customers created at or after `created_after`.
    async fn list_customers(
        &self,
        account_id: &str,
        created_after: DateTime<Utc>,
    ) -> Result<Vec<CustomerRecord>, ProviderError>;

    async fn get_account(&self, account_id: &str) -> Result<AccountProfile, ProviderError>;

    /// Public URL for an uploaded file, valid until `expires_at`.
    async fn create_file_link(
        &self,
        account_id: &str,
        file_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, ProviderError>;

    /// Exchange an OAuth authorization code for an account connection.
    async fn exchange_code(&self, code: &str) -> Result<OAuthToken, ProviderError>;

    /// Revoke this platform's access to the account.
    async fn deauthorize(&self, account_id: &str) -> Result<(), ProviderError>;
}
