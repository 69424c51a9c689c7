//! Sign-in lockout over a live server, with a hand-driven clock.

use chrono::TimeDelta;
use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;
use common::{
    admin_client, jan_first_2024, manual_clock, start_server, test_config, ACCOUNT_EMAIL,
    ACCOUNT_PASSWORD,
};

const CLIENT_IP: &str = "198.51.100.20";

async fn sign_in(client: &reqwest::Client, addr: std::net::SocketAddr, password: &str) -> reqwest::Response {
    client
        .post(format!("http://{addr}/api/auth/login"))
        .header("X-Forwarded-For", CLIENT_IP)
        .json(&json!({ "email": ACCOUNT_EMAIL, "password": password }))
        .send()
        .await
        .unwrap()
}

fn roomy_config() -> consent_guard::GuardConfig {
    let mut config = test_config();
    config.rate_limit.strict.max_requests = 100;
    config
}

#[tokio::test]
async fn test_lockout_after_five_failures() {
    let clock = manual_clock(jan_first_2024());
    let (addr, _shutdown) = start_server(roomy_config(), clock.clone()).await;
    let client = reqwest::Client::new();

    for expected_remaining in [4, 3, 2, 1] {
        let res = sign_in(&client, addr, "wrong").await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = res.json().await.unwrap();
        let message = body["error"].as_str().unwrap();
        assert!(
            message.contains(&format!("{expected_remaining} attempt(s) remaining")),
            "unexpected message: {message}"
        );
    }

    let res = sign_in(&client, addr, "wrong").await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.headers()["retry-after"], "900");

    // The right password does not get through a lock.
    clock.advance(TimeDelta::minutes(10));
    let res = sign_in(&client, addr, ACCOUNT_PASSWORD).await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.headers()["retry-after"], "300");

    clock.advance(TimeDelta::minutes(5));
    let res = sign_in(&client, addr, ACCOUNT_PASSWORD).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["email"], ACCOUNT_EMAIL);
}

#[tokio::test]
async fn test_success_resets_failures() {
    let clock = manual_clock(jan_first_2024());
    let (addr, _shutdown) = start_server(roomy_config(), clock).await;
    let client = reqwest::Client::new();

    for _ in 0..4 {
        assert_eq!(sign_in(&client, addr, "wrong").await.status(), StatusCode::UNAUTHORIZED);
    }
    assert_eq!(sign_in(&client, addr, ACCOUNT_PASSWORD).await.status(), StatusCode::OK);

    // A fresh budget of five.
    let res = sign_in(&client, addr, "wrong").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("4 attempt(s) remaining"));
}

#[tokio::test]
async fn test_admin_lists_and_clears_lockout() {
    let clock = manual_clock(jan_first_2024());
    let (addr, _shutdown) = start_server(roomy_config(), clock).await;
    let client = reqwest::Client::new();
    let admin = admin_client();

    for _ in 0..5 {
        sign_in(&client, addr, "wrong").await;
    }

    let lockouts: Vec<Value> = admin
        .get(format!("http://{addr}/admin/lockouts"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(lockouts.len(), 1);
    assert_eq!(lockouts[0]["ip"], CLIENT_IP);
    assert_eq!(lockouts[0]["failed_attempts"], 5);

    let res: Value = admin
        .post(format!("http://{addr}/admin/lockouts/unlock"))
        .json(&json!({ "email": ACCOUNT_EMAIL, "ip": CLIENT_IP }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(res["unlocked"], true);

    assert_eq!(sign_in(&client, addr, ACCOUNT_PASSWORD).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_requires_key() {
    let clock = manual_clock(jan_first_2024());
    let (addr, _shutdown) = start_server(test_config(), clock).await;

    let res = reqwest::get(format!("http://{addr}/admin/lockouts")).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = reqwest::Client::new()
        .get(format!("http://{addr}/admin/status"))
        .bearer_auth("wrong-key")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sign_in_route_is_strictly_throttled() {
    let clock = manual_clock(jan_first_2024());
    let (addr, _shutdown) = start_server(test_config(), clock.clone()).await;
    let client = reqwest::Client::new();

    // Ten requests per fifteen minutes, locked or not.
    for _ in 0..10 {
        let status = sign_in(&client, addr, "wrong").await.status();
        assert_ne!(status.as_u16(), 404);
    }
    let res = sign_in(&client, addr, ACCOUNT_PASSWORD).await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(res.headers().contains_key("x-ratelimit-limit"));

    clock.advance(TimeDelta::minutes(15));
    let res = sign_in(&client, addr, ACCOUNT_PASSWORD).await;
    // Window reset, and the login lock set at the fifth failure has expired too.
    assert_eq!(res.status(), StatusCode::OK);
}
