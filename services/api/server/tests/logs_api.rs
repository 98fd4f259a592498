mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use chrono::{DateTime, Duration, Utc};
use common::{build_seeded_test_app, build_test_app, create_log, log_body};
use hvac_api::store::MaintenanceStore;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn timestamp_of(log: &Value) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(log["timestamp"].as_str().unwrap())
        .unwrap()
        .with_timezone(&Utc)
}

#[tokio::test]
async fn test_list_logs_empty() {
    let app = build_test_app();
    let response = app.server.get("/api/logs").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_create_log() {
    let app = build_test_app();
    let response = app
        .server
        .post("/api/logs")
        .json(&log_body("Building C", "PREVENTIVE", "100.50"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["id"], 1);
    assert_eq!(body["building_name"], "Building C");
    assert_eq!(body["maintenance_type"], "PREVENTIVE");
    assert_eq!(body["energy_draw_kw"], "100.5");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_create_log_auto_creates_building_once() {
    let app = build_test_app();
    assert!(!app.store.building_exists("Annex").await.unwrap());

    create_log(&app.server, log_body("Annex", "CORRECTIVE", "5")).await;
    create_log(&app.server, log_body("Annex", "EMERGENCY", "7")).await;

    assert!(app.store.building_exists("Annex").await.unwrap());
    assert_eq!(app.store.building_names(), vec!["Annex".to_string()]);
    assert_eq!(app.store.count_logs().await.unwrap(), 2);
}

#[tokio::test]
async fn test_create_log_accepts_numbers_and_rounds() {
    let app = build_test_app();
    let body = create_log(
        &app.server,
        json!({
            "building_name": "Building A",
            "maintenance_type": "PREVENTIVE",
            "energy_draw_kw": 12.345,
        }),
    )
    .await;

    assert_eq!(body["energy_draw_kw"], "12.35");
}

#[tokio::test]
async fn test_create_log_keeps_unknown_maintenance_type() {
    let app = build_test_app();
    let body =
        create_log(&app.server, log_body("Building A", "INSPECTION", "1.00"))
            .await;

    assert_eq!(body["maintenance_type"], "INSPECTION");
}

#[tokio::test]
async fn test_create_log_defaults_timestamp_to_now() {
    let app = build_test_app();
    let before = Utc::now();

    let body =
        create_log(&app.server, log_body("Building A", "PREVENTIVE", "1"))
            .await;

    let stamped = timestamp_of(&body);
    assert!(stamped >= before - Duration::seconds(1));
    assert!(stamped <= Utc::now() + Duration::seconds(1));
}

#[tokio::test]
async fn test_create_log_treats_zero_timestamp_as_missing() {
    let app = build_test_app();
    let mut request = log_body("Building A", "PREVENTIVE", "1");
    request["timestamp"] = json!("0001-01-01T00:00:00Z");

    let body = create_log(&app.server, request).await;

    assert!(timestamp_of(&body) > Utc::now() - Duration::minutes(1));
}

#[tokio::test]
async fn test_create_log_keeps_explicit_timestamp() {
    let app = build_test_app();
    let mut request = log_body("Building A", "PREVENTIVE", "1");
    request["timestamp"] = json!("2024-03-01T08:30:00Z");

    let body = create_log(&app.server, request).await;

    assert_eq!(body["timestamp"], "2024-03-01T08:30:00Z");
}

#[tokio::test]
async fn test_create_log_missing_field() {
    let app = build_test_app();
    let response = app
        .server
        .post("/api/logs")
        .json(&json!({
            "building_name": "Building A",
            "maintenance_type": "PREVENTIVE",
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Cannot parse JSON");
    assert_eq!(body["error"]["details"][0]["field"], "energy_draw_kw");
    assert_eq!(app.store.count_logs().await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_log_malformed_json() {
    let app = build_test_app();
    let response = app
        .server
        .post("/api/logs")
        .text("{\"building_name\": ")
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_create_log_wrong_content_type() {
    let app = build_test_app();
    let response = app
        .server
        .post("/api/logs")
        .text("building_name=Building A")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["details"][0]["field"], "Content-Type");
}

#[tokio::test]
async fn test_create_log_non_numeric_energy() {
    let app = build_test_app();
    let response = app
        .server
        .post("/api/logs")
        .json(&log_body("Building A", "PREVENTIVE", "lots"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["details"][0]["field"], "energy_draw_kw");
}

#[tokio::test]
async fn test_create_log_validation_errors() {
    let app = build_test_app();
    let long_name = "x".repeat(256);
    let response = app
        .server
        .post("/api/logs")
        .json(&log_body(&long_name, "PREVENTIVE", "1"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"][0]["field"], "building_name");

    let response = app
        .server
        .post("/api/logs")
        .json(&log_body("Building A", "PREVENTIVE", "100000000"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(app.store.count_logs().await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_log_rejects_huge_exponent_promptly() {
    let app = build_test_app();
    let started = std::time::Instant::now();
    let response = app
        .server
        .post("/api/logs")
        .json(&log_body("Building A", "PREVENTIVE", "1e1000000000"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"][0]["field"], "energy_draw_kw");
    assert!(started.elapsed() < std::time::Duration::from_secs(1));

    let created = create_log(
        &app.server,
        log_body("Building A", "PREVENTIVE", "10.00"),
    )
    .await;
    let id = created["id"].as_i64().unwrap();
    let response = app
        .server
        .put(&format!("/api/logs/{id}"))
        .json(&json!({
            "building_name": "Building A",
            "maintenance_type": "PREVENTIVE",
            "energy_draw_kw": "-1e200000000",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(started.elapsed() < std::time::Duration::from_secs(1));
}

#[tokio::test]
async fn test_create_log_accepts_empty_labels() {
    let app = build_test_app();
    let created = create_log(&app.server, log_body("", "", "1.00")).await;

    assert_eq!(created["building_name"], "");
    assert_eq!(created["maintenance_type"], "");
    assert_eq!(created["energy_draw_kw"], "1");
    assert!(app.store.building_exists("").await.unwrap());
}

#[tokio::test]
async fn test_list_logs_newest_first() {
    let app = build_test_app();
    for ts in [
        "2024-01-05T00:00:00Z",
        "2024-01-01T00:00:00Z",
        "2024-03-01T00:00:00Z",
        "2023-12-31T23:59:59Z",
        "2024-02-14T12:00:00Z",
    ] {
        let mut request = log_body("Building A", "PREVENTIVE", "1");
        request["timestamp"] = json!(ts);
        create_log(&app.server, request).await;
    }

    let body: Value = app.server.get("/api/logs").await.json();
    let logs = body.as_array().unwrap();
    assert_eq!(logs.len(), 5);

    let stamps: Vec<DateTime<Utc>> = logs.iter().map(timestamp_of).collect();
    assert!(stamps.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(logs[0]["timestamp"], "2024-03-01T00:00:00Z");
}

#[tokio::test]
async fn test_list_seeded_logs() {
    let app = build_seeded_test_app().await;
    let body: Value = app.server.get("/api/logs").await.json();

    let draws: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|log| log["energy_draw_kw"].as_str().unwrap())
        .collect();
    assert_eq!(draws, vec!["100.5", "250", "50"]);
}

#[tokio::test]
async fn test_update_log() {
    let app = build_test_app();
    let created =
        create_log(&app.server, log_body("Building A", "PREVENTIVE", "10"))
            .await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .server
        .put(&format!("/api/logs/{id}"))
        .json(&log_body("Building Z", "EMERGENCY", "42.10"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["id"], id);
    assert_eq!(body["building_name"], "Building Z");
    assert_eq!(body["maintenance_type"], "EMERGENCY");
    assert_eq!(body["energy_draw_kw"], "42.1");
    assert_eq!(body["timestamp"], created["timestamp"]);
    assert!(app.store.building_exists("Building Z").await.unwrap());
}

#[tokio::test]
async fn test_update_log_ignores_timestamp_in_body() {
    let app = build_test_app();
    let created =
        create_log(&app.server, log_body("Building A", "PREVENTIVE", "10"))
            .await;
    let id = created["id"].as_i64().unwrap();

    let mut request = log_body("Building A", "PREVENTIVE", "11");
    request["timestamp"] = json!("2020-01-01T00:00:00Z");
    let body: Value = app
        .server
        .put(&format!("/api/logs/{id}"))
        .json(&request)
        .await
        .json();

    assert_eq!(body["timestamp"], created["timestamp"]);
}

#[tokio::test]
async fn test_update_log_not_found() {
    let app = build_seeded_test_app().await;
    let before: Value = app.server.get("/api/logs").await.json();

    let response = app
        .server
        .put("/api/logs/999")
        .json(&log_body("Building Q", "CORRECTIVE", "1"))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Log not found");
    assert_eq!(body["error"]["details"][0]["code"], "LOG_NOT_FOUND");

    let after: Value = app.server.get("/api/logs").await.json();
    assert_eq!(before, after);
    assert!(!app.store.building_exists("Building Q").await.unwrap());
}

#[tokio::test]
async fn test_update_log_requires_every_field() {
    let app = build_seeded_test_app().await;
    let response = app
        .server
        .put("/api/logs/1")
        .json(&json!({ "building_name": "Building A" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_log_invalid_id() {
    let app = build_seeded_test_app().await;
    let response = app
        .server
        .put("/api/logs/abc")
        .json(&log_body("Building A", "PREVENTIVE", "1"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_PATH");
}

#[tokio::test]
async fn test_delete_log() {
    let app = build_seeded_test_app().await;

    let response = app.server.delete("/api/logs/1").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "");

    let body: Value = app.server.get("/api/logs").await.json();
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert!(body.as_array().unwrap().iter().all(|log| log["id"] != 1));
}

#[tokio::test]
async fn test_delete_missing_log_succeeds() {
    let app = build_seeded_test_app().await;

    let response = app.server.delete("/api/logs/4242").await;
    response.assert_status_ok();
    assert_eq!(app.store.count_logs().await.unwrap(), 3);
}

#[tokio::test]
async fn test_delete_log_invalid_id() {
    let app = build_test_app();
    let response = app.server.delete("/api/logs/1.5").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_logs_store_failure() {
    let app = build_seeded_test_app().await;
    app.store.set_fail_reads(true);

    let response = app.server.get("/api/logs").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "DATABASE_ERROR");
    assert_eq!(body["error"]["message"], "Failed to fetch logs");
    assert_eq!(body["error"]["details"], json!([]));
}

#[tokio::test]
async fn test_create_log_building_failure() {
    let app = build_test_app();
    app.store.set_fail_building_writes(true);

    let response = app
        .server
        .post("/api/logs")
        .json(&log_body("Building A", "PREVENTIVE", "1"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Failed to create building");
    assert_eq!(app.store.count_logs().await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_log_store_failure() {
    let app = build_seeded_test_app().await;
    app.store.set_fail_writes(true);

    let response = app
        .server
        .put("/api/logs/1")
        .json(&log_body("Building A", "PREVENTIVE", "1"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Failed to update log");
}

#[tokio::test]
async fn test_delete_log_store_failure() {
    let app = build_seeded_test_app().await;
    app.store.set_fail_writes(true);

    let response = app.server.delete("/api/logs/1").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Failed to delete log");
}

#[tokio::test]
async fn test_errors_carry_request_id() {
    let app = build_test_app();
    app.store.set_fail_reads(true);
    let request_id = "8d1f3f3e-6c0a-4a5e-9a57-0f7e4c1b2d3a";

    let response = app
        .server
        .get("/api/logs")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(request_id),
        )
        .await;

    let body: Value = response.json();
    assert_eq!(body["error"]["context"]["trace_id"], request_id);
}
