#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use hvac_api::store::InMemoryMaintenanceStore;
use hvac_api::{AppState, Config};
use serde_json::{Value, json};

pub struct TestApp {
    pub server: TestServer,
    pub store: InMemoryMaintenanceStore,
    pub state: AppState,
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(Config::default())
}

pub fn build_test_app_with(config: Config) -> TestApp {
    let store = InMemoryMaintenanceStore::new();
    let state = AppState::new(Arc::new(store.clone()), config).unwrap();
    let app = hvac_api::build_router(state.clone()).unwrap();

    TestApp {
        server: TestServer::new(app).unwrap(),
        store,
        state,
    }
}

pub async fn build_seeded_test_app() -> TestApp {
    let app = build_test_app();
    hvac_api::seed::seed_demo_data(&app.state.gateway)
        .await
        .unwrap();
    app
}

pub fn log_body(building: &str, kind: &str, draw: &str) -> Value {
    json!({
        "building_name": building,
        "maintenance_type": kind,
        "energy_draw_kw": draw,
    })
}

pub async fn create_log(server: &TestServer, body: Value) -> Value {
    let response = server.post("/api/logs").json(&body).await;
    response.assert_status_ok();
    response.json()
}
