// The OpenApi derive macro generates code using Iterator::for_each,
// which is disallowed by our clippy config. Allow it at module level.
#![allow(clippy::disallowed_methods)]

use utoipa::OpenApi;

/// OpenAPI documentation for the maintenance log and ROI endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::hvac_api::roi::handler::handler,
        crate::hvac_api::logs::list::handler,
        crate::hvac_api::logs::create::handler,
        crate::hvac_api::logs::update::handler,
        crate::hvac_api::logs::delete::handler,
    ),
    info(
        title = "HVAC Maintenance API",
        version = "1.0.0",
        description = "Maintenance logs per building and the energy ROI derived from them",
        license(name = "Apache-2.0")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    tags(
        (name = "logs", description = "Maintenance log CRUD"),
        (name = "roi", description = "Return on investment over all logs")
    )
)]
pub struct HvacApiDoc;

impl HvacApiDoc {
    pub fn openapi() -> utoipa::openapi::OpenApi {
        <HvacApiDoc as utoipa::OpenApi>::openapi()
    }
}
