//! Stripe Connect client.
//!
//! Reads charges, subscriptions, customers and account branding for a
//! connected account, and runs the OAuth connect/deauthorize flow.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Deserialize};
use service_core::observability::TracedClientExt;

use super::provider::{AccountDataProvider, ProviderError};
use crate::config::StripeConfig;
use crate::models::{
    AccountProfile, ChargeRecord, CustomerRecord, OAuthToken, SubscriptionRecord,
    SubscriptionStatus,
};

/// Header selecting the connected account a request acts on.
const STRIPE_ACCOUNT_HEADER: &str = "Stripe-Account";

/// Header pinning the API version responses are shaped by.
const STRIPE_VERSION_HEADER: &str = "Stripe-Version";

/// Stripe client for interacting with the Stripe API.
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    config: StripeConfig,
}

/// One page of a Stripe list endpoint.
#[derive(Debug, Deserialize)]
struct ListPage<T> {
    data: Vec<T>,
    #[serde(default)]
    has_more: bool,
}

/// Objects that can be used as a pagination cursor.
trait Listed: DeserializeOwned {
    fn id(&self) -> &str;
}

#[derive(Debug, Deserialize)]
pub struct StripeCharge {
    pub id: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created: DateTime<Utc>,
    pub amount: i64,
    pub status: String,
    #[serde(default)]
    pub refunded: bool,
    #[serde(default)]
    pub disputed: bool,
}

#[derive(Debug, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub current_period_start: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub current_period_end: DateTime<Utc>,
    pub status: SubscriptionStatus,
    pub plan: Option<StripePlan>,
}

#[derive(Debug, Deserialize)]
pub struct StripePlan {
    pub amount: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StripeCustomer {
    pub id: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct StripeAccount {
    pub id: String,
    pub business_profile: Option<BusinessProfile>,
    pub settings: Option<AccountSettings>,
}

#[derive(Debug, Deserialize)]
pub struct BusinessProfile {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AccountSettings {
    pub branding: Option<Branding>,
}

#[derive(Debug, Deserialize)]
pub struct Branding {
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileLink {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    stripe_user_id: Option<String>,
    scope: Option<String>,
    #[serde(default)]
    livemode: bool,
}

/// Stripe error bodies: the REST API nests an object, OAuth uses flat strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Api { error: ApiErrorDetail },
    OAuth {
        error: String,
        error_description: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

impl Listed for StripeCharge {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Listed for StripeSubscription {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Listed for StripeCustomer {
    fn id(&self) -> &str {
        &self.id
    }
}

impl From<StripeCharge> for ChargeRecord {
    fn from(charge: StripeCharge) -> Self {
        ChargeRecord {
            succeeded: charge.status == "succeeded",
            id: charge.id,
            created_at: charge.created,
            amount: charge.amount,
            refunded: charge.refunded,
            disputed: charge.disputed,
        }
    }
}

impl From<StripeSubscription> for SubscriptionRecord {
    fn from(sub: StripeSubscription) -> Self {
        SubscriptionRecord {
            id: sub.id,
            created_at: sub.created,
            current_period_start: sub.current_period_start,
            current_period_end: sub.current_period_end,
            status: sub.status,
            plan_amount: sub.plan.and_then(|p| p.amount).unwrap_or(0),
        }
    }
}

impl From<StripeCustomer> for CustomerRecord {
    fn from(customer: StripeCustomer) -> Self {
        CustomerRecord {
            id: customer.id,
            created_at: customer.created,
        }
    }
}

impl From<StripeAccount> for AccountProfile {
    fn from(account: StripeAccount) -> Self {
        AccountProfile {
            id: account.id,
            business_name: account.business_profile.and_then(|p| p.name),
            icon_file_id: account
                .settings
                .and_then(|s| s.branding)
                .and_then(|b| b.icon),
        }
    }
}

impl StripeClient {
    /// Create a new Stripe client.
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Check if Stripe is configured (API key is set).
    pub fn is_configured(&self) -> bool {
        !self.config.api_key.expose_secret().is_empty()
    }

    fn ensure_configured(&self) -> Result<(), ProviderError> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Stripe API key not configured".to_string(),
            ))
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        account_id: Option<&str>,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        self.ensure_configured()?;

        let url = format!("{}{}", self.config.api_base_url, path);
        let mut request = self
            .client
            .traced_get(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .header(STRIPE_VERSION_HEADER, &self.config.api_version)
            .query(query);
        if let Some(account_id) = account_id {
            request = request.header(STRIPE_ACCOUNT_HEADER, account_id);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Stripe request failed to send");
            ProviderError::from(e)
        })?;

        Self::parse(response).await
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        url: &str,
        account_id: Option<&str>,
        form: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        self.ensure_configured()?;

        let mut request = self
            .client
            .traced_post(url)
            .bearer_auth(self.config.api_key.expose_secret())
            .header(STRIPE_VERSION_HEADER, &self.config.api_version)
            .form(form);
        if let Some(account_id) = account_id {
            request = request.header(STRIPE_ACCOUNT_HEADER, account_id);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Stripe request failed to send");
            ProviderError::from(e)
        })?;

        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()));
        }

        let (code, message) = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody::Api { error }) => (error.code, error.message),
            Ok(ErrorBody::OAuth {
                error,
                error_description,
            }) => (Some(error), error_description),
            Err(_) => (None, None),
        };
        let message = message.unwrap_or_else(|| body.clone());

        tracing::error!(
            status = %status,
            code = ?code,
            message = %message,
            "Stripe API returned an error"
        );

        Err(ProviderError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    /// Follow `has_more`/`starting_after` until the list is exhausted.
    async fn list_all<T: Listed>(
        &self,
        path: &str,
        account_id: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, ProviderError> {
        let mut items: Vec<T> = Vec::new();
        let mut starting_after: Option<String> = None;

        loop {
            let mut query = filters.to_vec();
            query.push(("limit", self.config.page_size.to_string()));
            if let Some(cursor) = &starting_after {
                query.push(("starting_after", cursor.clone()));
            }

            let page: ListPage<T> = self.get(path, Some(account_id), &query).await?;
            starting_after = page.data.last().map(|item| item.id().to_string());
            let has_more = page.has_more;
            items.extend(page.data);

            if !has_more || starting_after.is_none() {
                break;
            }
        }

        tracing::debug!(path = %path, account_id = %account_id, count = items.len(), "Stripe list fetched");
        Ok(items)
    }
}

#[async_trait]
impl AccountDataProvider for StripeClient {
    async fn list_charges(
        &self,
        account_id: &str,
        created_after: DateTime<Utc>,
    ) -> Result<Vec<ChargeRecord>, ProviderError> {
        let filters = [("created[gte]", created_after.timestamp().to_string())];
        let charges: Vec<StripeCharge> = self.list_all("/charges", account_id, &filters).await?;
        Ok(charges.into_iter().map(ChargeRecord::from).collect())
    }

    async fn list_subscriptions(
        &self,
        account_id: &str,
        period_end_before: DateTime<Utc>,
        status: Option<SubscriptionStatus>,
    ) -> Result<Vec<SubscriptionRecord>, ProviderError> {
        let mut filters = vec![(
            "current_period_end[lte]",
            period_end_before.timestamp().to_string(),
        )];
        if let Some(status) = status {
            filters.push(("status", status.as_str().to_string()));
        }

        let subscriptions: Vec<StripeSubscription> =
            self.list_all("/subscriptions", account_id, &filters).await?;
        Ok(subscriptions
            .into_iter()
            .map(SubscriptionRecord::from)
            .collect())
    }

    async fn list_customers(
        &self,
        account_id: &str,
        created_after: DateTime<Utc>,
    ) -> Result<Vec<CustomerRecord>, ProviderError> {
        let filters = [("created[gte]", created_after.timestamp().to_string())];
        let customers: Vec<StripeCustomer> =
            self.list_all("/customers", account_id, &filters).await?;
        Ok(customers.into_iter().map(CustomerRecord::from).collect())
    }

    async fn get_account(&self, account_id: &str) -> Result<AccountProfile, ProviderError> {
        let account: StripeAccount = self
            .get(&format!("/accounts/{}", account_id), None, &[])
            .await?;
        Ok(account.into())
    }

    async fn create_file_link(
        &self,
        account_id: &str,
        file_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/file_links", self.config.api_base_url);
        let form = [
            ("file", file_id.to_string()),
            ("expires_at", expires_at.timestamp().to_string()),
        ];

        let link: FileLink = self.post_form(&url, Some(account_id), &form).await?;
        link.url
            .ok_or_else(|| ProviderError::Decode("file link has no url".to_string()))
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthToken, ProviderError> {
        let url = format!("{}/oauth/token", self.config.connect_base_url);
        let form = [
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
        ];

        let token: TokenResponse = self.post_form(&url, None, &form).await?;
        tracing::info!(account_id = ?token.stripe_user_id, "Stripe OAuth code exchanged");

        Ok(OAuthToken {
            account_id: token.stripe_user_id,
            scope: token.scope,
            livemode: token.livemode,
        })
    }

    async fn deauthorize(&self, account_id: &str) -> Result<(), ProviderError> {
        if self.config.client_id.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Stripe OAuth client id not configured".to_string(),
            ));
        }

        let url = format!("{}/oauth/deauthorize", self.config.connect_base_url);
        let form = [
            ("client_id", self.config.client_id.clone()),
            ("stripe_user_id", account_id.to_string()),
        ];

        let _: serde_json::Value = self.post_form(&url, None, &form).await?;
        tracing::info!(account_id = %account_id, "Stripe account deauthorized");
        Ok(())
    }
}
