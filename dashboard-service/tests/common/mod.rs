use dashboard_service::config::{Config, CorsConfig, StripeConfig};
use dashboard_service::services::init_metrics;
use dashboard_service::startup::Application;
use secrecy::Secret;
use service_core::config::Config as CommonConfig;
use wiremock::MockServer;

pub const TEST_ACCOUNT_ID: &str = "acct_test_123";
pub const TEST_STRIPE_VERSION: &str = "2024-06-20";

pub struct TestApp {
    pub http_address: String,
    pub http_port: u16,
    /// Stands in for both the Stripe API and Stripe Connect.
    pub stripe: MockServer,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        init_metrics();
        let stripe = MockServer::start().await;

        let config = Config {
            common: CommonConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
                log_level: "debug".to_string(),
                otlp_endpoint: None,
            },
            stripe: StripeConfig {
                api_key: Secret::new("sk_test_dashboard".to_string()),
                client_id: "ca_test_dashboard".to_string(),
                api_base_url: format!("{}/v1", stripe.uri()),
                connect_base_url: stripe.uri(),
                api_version: TEST_STRIPE_VERSION.to_string(),
                page_size: 100,
                icon_link_ttl_minutes: 5,
            },
            cors: CorsConfig {
                allowed_origins: vec!["https://dashboard.example.com".to_string()],
            },
            service_name: "dashboard-service-test".to_string(),
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let http_port = app.http_port();
        let http_address = format!("http://127.0.0.1:{}", http_port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", http_address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            http_address,
            http_port,
            stripe,
            client,
        }
    }

    pub async fn get(&self, path_and_query: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.http_address, path_and_query))
            .send()
            .await
            .expect("Failed to execute request")
    }
}
