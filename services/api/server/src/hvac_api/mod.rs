use axum::Router;
use axum::routing::{get, put};

pub(crate) mod error_recorder;
pub mod logs;
pub mod roi;

pub fn get_routes(state: crate::AppState) -> Router {
    Router::new()
        .route("/roi", get(roi::handler::handler))
        .route("/logs", get(logs::list::handler).post(logs::create::handler))
        .route(
            "/logs/{id}",
            put(logs::update::handler).delete(logs::delete::handler),
        )
        .with_state(state)
}
