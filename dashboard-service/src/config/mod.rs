use anyhow::Result;
use secrecy::Secret;
use serde::Deserialize;
use service_core::config::Config as CommonConfig;
use std::env;

pub const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com/v1";
pub const DEFAULT_CONNECT_BASE_URL: &str = "https://connect.stripe.com";
/// API version the wire types in `services::stripe` are written against.
pub const DEFAULT_API_VERSION: &str = "2024-06-20";

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub common: CommonConfig,
    pub stripe: StripeConfig,
    pub cors: CorsConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StripeConfig {
    pub api_key: Secret<String>,
    /// OAuth client id of the Connect platform, used for deauthorization.
    pub client_id: String,
    pub api_base_url: String,
    pub connect_base_url: String,
    /// Sent as `Stripe-Version` on every request.
    pub api_version: String,
    pub page_size: u32,
    pub icon_link_ttl_minutes: i64,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct CorsConfig {
    /// Empty blocks every cross-origin request.
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let common = CommonConfig::load()?;
        Self::from_lookup(common, |key| env::var(key).ok())
    }

    /// Build from an explicit variable lookup instead of the process environment.
    pub fn from_lookup<F>(common: CommonConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("STRIPE_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("STRIPE_API_KEY not set, Stripe calls will fail");
        }

        let page_size = lookup("STRIPE_PAGE_SIZE")
            .unwrap_or_else(|| "100".to_string())
            .parse()?;
        let icon_link_ttl_minutes = lookup("STRIPE_ICON_LINK_TTL_MINUTES")
            .unwrap_or_else(|| "5".to_string())
            .parse()?;

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            common,
            stripe: StripeConfig {
                api_key: Secret::new(api_key),
                client_id: lookup("STRIPE_CLIENT_ID").unwrap_or_default(),
                api_base_url: lookup("STRIPE_API_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
                connect_base_url: lookup("STRIPE_CONNECT_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_CONNECT_BASE_URL.to_string()),
                api_version: lookup("STRIPE_API_VERSION")
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
                page_size,
                icon_link_ttl_minutes,
            },
            cors: CorsConfig { allowed_origins },
            service_name: "dashboard-service".to_string(),
        })
    }
}
