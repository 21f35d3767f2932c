mod common;

use chrono::Utc;
use common::{TestApp, TEST_ACCOUNT_ID, TEST_STRIPE_VERSION};
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn list(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "object": "list",
        "has_more": false,
        "data": data
    }))
}

async fn mount_account(app: &TestApp) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/accounts/{}", TEST_ACCOUNT_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": TEST_ACCOUNT_ID,
            "business_profile": { "name": "Acme Widgets" },
            "settings": { "branding": { "icon": "file_icon_1" } }
        })))
        .mount(&app.stripe)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/file_links"))
        .and(header("Stripe-Account", TEST_ACCOUNT_ID))
        .and(body_string_contains("file=file_icon_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "link_1",
            "url": "https://files.stripe.com/links/icon"
        })))
        .mount(&app.stripe)
        .await;
}

async fn mount_empty(app: &TestApp, resource: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/{}", resource)))
        .respond_with(list(json!([])))
        .mount(&app.stripe)
        .await;
}

#[tokio::test]
async fn dashboard_without_account_returns_windows() {
    let app = TestApp::spawn().await;

    let response = app.get("/v1/dashboard?tzIdentifier=America/Los_Angeles").await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "INITIALIZED");
    assert_eq!(body["is_authorized"], false);
    assert_eq!(body["timezone"], "America/Los_Angeles");
    assert!(body["windows"]["month_start"].is_string());
    assert_eq!(body["metrics"]["volume_gross_today"], 0.0);
}

#[tokio::test]
async fn dashboard_rejects_invalid_timezone() {
    let app = TestApp::spawn().await;

    let response = app
        .get(&format!(
            "/v1/dashboard?tzIdentifier=Not/AZone&account={}",
            TEST_ACCOUNT_ID
        ))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    assert!(app.stripe.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn dashboard_exchanges_authorization_code() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=ac_valid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "sk_test_connected",
            "livemode": false,
            "scope": "read_only",
            "stripe_user_id": "acct_connected_1",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&app.stripe)
        .await;

    let response = app.get("/v1/dashboard?tzIdentifier=UTC&code=ac_valid").await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "AUTHORIZED_CODE");
    assert_eq!(body["is_authorized"], true);
    assert_eq!(body["account_id"], "acct_connected_1");
}

#[tokio::test]
async fn dashboard_reports_failed_code_exchange() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Authorization code expired: ac_old"
        })))
        .mount(&app.stripe)
        .await;

    let response = app.get("/v1/dashboard?code=ac_old").await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ERROR");
    assert_eq!(body["code"], 400);
    assert_eq!(body["error"], "Authorization code expired: ac_old");
}

#[tokio::test]
async fn dashboard_computes_account_metrics() {
    let app = TestApp::spawn().await;
    let now = Utc::now().timestamp();

    Mock::given(method("GET"))
        .and(path("/v1/charges"))
        .and(header("Stripe-Account", TEST_ACCOUNT_ID))
        .and(header("Authorization", "Bearer sk_test_dashboard"))
        .respond_with(list(json!([
            { "id": "ch_1", "created": now, "amount": 10000, "status": "succeeded", "refunded": false, "disputed": false },
            { "id": "ch_2", "created": now, "amount": 5000, "status": "failed", "refunded": false, "disputed": false },
            { "id": "ch_3", "created": now, "amount": 2500, "status": "succeeded", "refunded": true, "disputed": false }
        ])))
        .expect(1)
        .mount(&app.stripe)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/customers"))
        .respond_with(list(json!([
            { "id": "cus_1", "created": now },
            { "id": "cus_2", "created": now }
        ])))
        .mount(&app.stripe)
        .await;

    // Subscriptions only decode in the pinned version's shape.
    Mock::given(method("GET"))
        .and(path("/v1/subscriptions"))
        .and(header("Stripe-Version", TEST_STRIPE_VERSION))
        .respond_with(list(json!([
            {
                "id": "sub_trial",
                "created": now,
                "current_period_start": now,
                "current_period_end": now,
                "status": "trialing",
                "plan": { "amount": 5000 }
            }
        ])))
        .expect(1)
        .mount(&app.stripe)
        .await;

    mount_account(&app).await;

    let response = app
        .get(&format!(
            "/v1/dashboard?tzIdentifier=UTC&account={}",
            TEST_ACCOUNT_ID
        ))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "AUTHORIZED_ID");
    assert_eq!(body["is_authorized"], true);
    assert_eq!(body["code"], 200);
    assert_eq!(body["account_id"], TEST_ACCOUNT_ID);
    assert_eq!(body["account_name"], "Acme Widgets");
    assert_eq!(body["account_icon_url"], "https://files.stripe.com/links/icon");

    let metrics = &body["metrics"];
    assert_eq!(metrics["volume_gross_today"], 100.0);
    assert_eq!(metrics["count_payments_today"], 1);
    assert_eq!(metrics["volume_gross_month_current"], 100.0);
    assert_eq!(metrics["volume_trialing"], 50.0);
    assert_eq!(metrics["count_trialing_month_current"], 1);
    assert_eq!(metrics["volume_gross_month_forecast"], 150.0);
    assert_eq!(metrics["count_trialing_today"], 2);
    assert_eq!(
        metrics["volume_gross_month_over_month_percent_change"]["kind"],
        "unbounded"
    );
    assert_eq!(
        metrics["volume_gross_month_over_month_change_type"],
        "INCREASE"
    );
}

#[tokio::test]
async fn dashboard_survives_failed_fetch() {
    let app = TestApp::spawn().await;

    Mock::given(method("GET"))
        .and(path("/v1/charges"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "type": "api_error", "message": "Something went wrong" }
        })))
        .mount(&app.stripe)
        .await;

    mount_empty(&app, "subscriptions").await;
    mount_empty(&app, "customers").await;
    mount_account(&app).await;

    let response = app
        .get(&format!("/v1/dashboard?account={}", TEST_ACCOUNT_ID))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "AUTHORIZED_ID");
    assert_eq!(body["metrics"]["volume_gross_today"], 0.0);
    assert_eq!(body["metrics"]["volume_gross_month_current_percent"], 0.0);

    let metrics = app.get("/metrics").await.text().await.unwrap();
    assert!(metrics.contains("upstream_fetch_failures_total"));
}

#[tokio::test]
async fn dashboard_reports_inaccessible_account() {
    let app = TestApp::spawn().await;

    mount_empty(&app, "charges").await;
    mount_empty(&app, "subscriptions").await;
    mount_empty(&app, "customers").await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/accounts/{}", TEST_ACCOUNT_ID)))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "type": "invalid_request_error",
                "code": "account_invalid",
                "message": "The provided key does not have access to this account"
            }
        })))
        .mount(&app.stripe)
        .await;

    let response = app
        .get(&format!("/v1/dashboard?account={}", TEST_ACCOUNT_ID))
        .await;

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ERROR");
    assert_eq!(body["is_authorized"], false);
    assert_eq!(body["code"], 403);
    assert_eq!(
        body["error"],
        "The provided key does not have access to this account"
    );
}

#[tokio::test]
async fn logout_revokes_account() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/oauth/deauthorize"))
        .and(body_string_contains("client_id=ca_test_dashboard"))
        .and(body_string_contains(format!("stripe_user_id={}", TEST_ACCOUNT_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stripe_user_id": TEST_ACCOUNT_ID
        })))
        .expect(1)
        .mount(&app.stripe)
        .await;

    let response = app
        .get(&format!("/v1/logout?account={}", TEST_ACCOUNT_ID))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "REVOKED");
    assert_eq!(body["account_id"], TEST_ACCOUNT_ID);
}

#[tokio::test]
async fn logout_reports_upstream_error() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/oauth/deauthorize"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "No such application"
        })))
        .mount(&app.stripe)
        .await;

    let response = app.get("/v1/logout?account=acct_gone").await;

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ERROR");
    assert_eq!(body["code"], 401);
    assert_eq!(body["error"], "No such application");
}

#[tokio::test]
async fn logout_requires_account() {
    let app = TestApp::spawn().await;

    let response = app.get("/v1/logout?account=").await;

    assert_eq!(response.status().as_u16(), 422);
}

#[tokio::test]
async fn logout_rejects_blank_account() {
    let app = TestApp::spawn().await;

    let response = app.get("/v1/logout?account=%20%20%20").await;

    assert_eq!(response.status().as_u16(), 422);
    assert!(app.stripe.received_requests().await.unwrap().is_empty());
}
