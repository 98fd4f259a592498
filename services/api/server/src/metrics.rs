use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::AppState;

#[derive(Clone, Debug)]
pub struct ServerMetrics {
    pub registry: Registry,

    pub requests: IntCounterVec,
    pub request_errors: IntCounterVec,
}

impl ServerMetrics {
    /// Metrics live in their own registry, so several instances (one per
    /// test server, say) never collide in the process-global one.
    pub fn new(prefix: Option<String>) -> anyhow::Result<Self> {
        let registry = Registry::new_custom(prefix, None)?;

        let requests = IntCounterVec::new(
            Opts::new("requests", "A metric counting requests by handler"),
            &["handler"],
        )?;
        let request_errors = IntCounterVec::new(
            Opts::new(
                "request_errors",
                "A metric counting request errors by handler and error code",
            ),
            &["handler", "error_code"],
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(request_errors.clone()))?;

        Ok(Self {
            registry,
            requests,
            request_errors,
        })
    }

    pub fn record_request(&self, handler: &str) {
        self.requests.with_label_values(&[handler]).inc();
    }

    pub fn record_error(&self, handler: &str, error_code: &str) {
        self.request_errors
            .with_label_values(&[handler, error_code])
            .inc();
    }

    /// Prometheus text exposition of this registry.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            tracing::error!("could not encode prometheus metrics: {}", e);
        }

        match String::from_utf8(buffer) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("prometheus metrics could not be from_utf8'd: {}", e);
                String::default()
            }
        }
    }
}

pub async fn handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_rendered_output() {
        let metrics = ServerMetrics::new(Some("hvac".to_string())).unwrap();
        metrics.record_request("logs_list");
        metrics.record_error("logs_list", "database_error");
        metrics.record_error("logs_list", "database_error");

        let text = metrics.render();
        assert!(text.contains("hvac_requests{handler=\"logs_list\"} 1"));
        assert!(text.contains(
            "hvac_request_errors{error_code=\"database_error\",handler=\"logs_list\"} 2"
        ));
    }

    #[test]
    fn instances_do_not_share_state() {
        let first = ServerMetrics::new(None).unwrap();
        let second = ServerMetrics::new(None).unwrap();
        first.record_request("roi");

        assert_eq!(first.requests.with_label_values(&["roi"]).get(), 1);
        assert_eq!(second.requests.with_label_values(&["roi"]).get(), 0);
    }
}
