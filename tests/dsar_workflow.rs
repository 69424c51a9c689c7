//! DSAR submission and the admin deadline view, with a hand-driven clock.

use chrono::{TimeZone, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;
use common::{admin_client, jan_first_2024, manual_clock, start_server, test_config, SITE_ID};

#[tokio::test]
async fn test_overdue_request_lifecycle() {
    let clock = manual_clock(jan_first_2024());
    let (addr, _shutdown) = start_server(test_config(), clock.clone()).await;
    let client = reqwest::Client::new();
    let admin = admin_client();

    let res = client
        .post(format!("http://{addr}/api/public/dsar"))
        .header("Origin", "https://example.com")
        .json(&json!({
            "website_id": SITE_ID,
            "requester_email": "jane@example.org",
            "requester_name": "Jane",
            "request_type": "erasure"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(
        res.headers()["access-control-allow-origin"],
        "https://example.com"
    );
    let receipt: Value = res.json().await.unwrap();
    assert_eq!(receipt["status"], "pending");
    let due: chrono::DateTime<Utc> = receipt["due_date"].as_str().unwrap().parse().unwrap();
    assert_eq!(due, Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap());
    let id = receipt["id"].as_str().unwrap().to_string();

    clock.set(Utc.with_ymd_and_hms(2024, 2, 5, 0, 0, 0).unwrap());

    let list: Vec<Value> = admin
        .get(format!("http://{addr}/admin/dsar"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], id.as_str());
    assert_eq!(list[0]["is_overdue"], true);
    assert_eq!(list[0]["days_remaining"], -5);

    let summary: Value = admin
        .get(format!("http://{addr}/admin/dsar/summary"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["total"], 1);
    assert_eq!(summary["pending"], 1);
    assert_eq!(summary["overdue"], 1);

    let res = admin
        .patch(format!("http://{addr}/admin/dsar/{id}"))
        .json(&json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let view: Value = res.json().await.unwrap();
    assert_eq!(view["status"], "completed");
    assert_eq!(view["is_overdue"], false);
    assert!(!view["resolved_at"].is_null());

    // Completed requests stay completed.
    let res = admin
        .patch(format!("http://{addr}/admin/dsar/{id}"))
        .json(&json!({ "status": "in_progress" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_and_missing_requests() {
    let clock = manual_clock(jan_first_2024());
    let (addr, _shutdown) = start_server(test_config(), clock).await;

    let res = reqwest::Client::new()
        .post(format!("http://{addr}/api/public/dsar"))
        .json(&json!({
            "website_id": SITE_ID,
            "requester_email": "not-an-email",
            "request_type": "access"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = admin_client()
        .patch(format!(
            "http://{addr}/admin/dsar/00000000-0000-0000-0000-000000000000"
        ))
        .json(&json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
