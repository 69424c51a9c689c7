//! Widget and public form endpoints over a live server.

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};

use consent_guard::clock::SystemClock;

mod common;
use common::{start_server, test_config, APP_ORIGIN, SITE_ID};

fn consent_body() -> Value {
    json!({
        "website_id": SITE_ID,
        "visitor_id": "visitor-42",
        "action": "accept_all"
    })
}

#[tokio::test]
async fn test_public_form_throttle() {
    let (addr, _shutdown) = start_server(test_config(), Arc::new(SystemClock)).await;
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/api/public/consent");

    for i in 0..10 {
        let res = client.post(&url).json(&consent_body()).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::CREATED, "request {} refused", i + 1);
    }

    let res = client.post(&url).json(&consent_body()).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.headers()["x-ratelimit-limit"], "10");
    assert_eq!(res.headers()["x-ratelimit-remaining"], "0");
    assert!(res.headers().contains_key("x-ratelimit-reset"));

    let retry_after: u64 = res.headers()["retry-after"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after > 0 && retry_after <= 300);

    // Another client keeps its own budget.
    let res = client
        .post(&url)
        .header("X-Forwarded-For", "203.0.113.7")
        .json(&consent_body())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_consent_receipt() {
    let (addr, _shutdown) = start_server(test_config(), Arc::new(SystemClock)).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{addr}/api/public/consent"))
        .json(&json!({
            "website_id": SITE_ID,
            "visitor_id": "visitor-42",
            "action": "custom",
            "categories": { "analytics": true }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let receipt: Value = res.json().await.unwrap();
    assert_eq!(receipt["action"], "custom");
    assert_eq!(receipt["categories"]["necessary"], true);
    assert_eq!(receipt["categories"]["analytics"], true);
    assert_eq!(receipt["categories"]["marketing"], false);
}

#[tokio::test]
async fn test_widget_cors_www_normalization() {
    let (addr, _shutdown) = start_server(test_config(), Arc::new(SystemClock)).await;
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/api/public/widget/{SITE_ID}");

    let res = client
        .get(&url)
        .header("Origin", "https://www.example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()["access-control-allow-origin"],
        "https://www.example.com"
    );
    assert_eq!(res.headers()["access-control-max-age"], "86400");

    let config: Value = res.json().await.unwrap();
    assert_eq!(config["website_id"], SITE_ID);
    assert_eq!(config["name"], "Example Shop");

    let res = client
        .get(&url)
        .header("Origin", "https://evil.example.net")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["access-control-allow-origin"], APP_ORIGIN);
    assert!(res.headers().get("access-control-max-age").is_none());
}

#[tokio::test]
async fn test_unknown_website_is_not_found() {
    let (addr, _shutdown) = start_server(test_config(), Arc::new(SystemClock)).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("http://{addr}/api/public/widget/nope"))
        .header("Origin", "https://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    // No registered domain to match, so the origin is not echoed.
    assert_eq!(res.headers()["access-control-allow-origin"], APP_ORIGIN);

    let res = client
        .post(format!("http://{addr}/api/public/dsar"))
        .json(&json!({
            "website_id": "nope",
            "requester_email": "jane@example.org",
            "request_type": "access"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_preflight() {
    let (addr, _shutdown) = start_server(test_config(), Arc::new(SystemClock)).await;
    let client = reqwest::Client::new();

    let res = client
        .request(
            reqwest::Method::OPTIONS,
            format!("http://{addr}/api/public/consent?website_id={SITE_ID}"),
        )
        .header("Origin", "https://example.com")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        res.headers()["access-control-allow-origin"],
        "https://example.com"
    );
    assert_eq!(
        res.headers()["access-control-allow-methods"],
        "GET, POST, OPTIONS"
    );
    assert_eq!(res.headers()["vary"], "Origin");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let (addr, _shutdown) = start_server(test_config(), Arc::new(SystemClock)).await;

    let res = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_rejected_form_bodies_keep_site_cors() {
    let (addr, _shutdown) = start_server(test_config(), Arc::new(SystemClock)).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{addr}/api/public/consent"))
        .header("Origin", "https://example.com")
        .json(&json!({
            "website_id": SITE_ID,
            "visitor_id": "visitor-42",
            "action": "bogus"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.headers()["access-control-allow-origin"],
        "https://example.com"
    );
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("action"));

    let res = client
        .post(format!("http://{addr}/api/public/dsar"))
        .header("Origin", "https://www.example.com")
        .json(&json!({ "website_id": SITE_ID, "request_type": "access" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.headers()["access-control-allow-origin"],
        "https://www.example.com"
    );

    // Nothing to read a website from.
    let res = client
        .post(format!("http://{addr}/api/public/consent"))
        .header("Origin", "https://example.com")
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.headers()["access-control-allow-origin"], APP_ORIGIN);
}
