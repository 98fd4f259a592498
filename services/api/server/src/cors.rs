use std::collections::HashSet;

use anyhow::Context;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Origins allowed to call the API from a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

fn normalize_origin(value: &str) -> Option<String> {
    let normalized = value.trim().trim_end_matches('/');
    if normalized.is_empty() {
        None
    } else {
        Some(normalized.to_string())
    }
}

/// `*` (or an empty value) allows any origin; otherwise a comma separated
/// list, trimmed and deduplicated.
pub fn parse_allowed_origins(raw: &str) -> AllowedOrigins {
    let mut out = Vec::new();
    let mut seen = HashSet::new();

    for candidate in raw.split(',') {
        let Some(origin) = normalize_origin(candidate) else {
            continue;
        };
        if origin == "*" {
            return AllowedOrigins::Any;
        }
        if seen.insert(origin.clone()) {
            out.push(origin);
        }
    }

    if out.is_empty() {
        AllowedOrigins::Any
    } else {
        AllowedOrigins::List(out)
    }
}

pub fn cors_layer(allow_origins: &str) -> anyhow::Result<CorsLayer> {
    let allow_origin = match parse_allowed_origins(allow_origins) {
        AllowedOrigins::Any => AllowOrigin::from(Any),
        AllowedOrigins::List(origins) => {
            let values = origins
                .iter()
                .map(|origin| {
                    HeaderValue::from_str(origin).with_context(|| {
                        format!("Invalid CORS origin '{origin}'")
                    })
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            AllowOrigin::list(values)
        }
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT]))
}
