use std::time::Duration;

use axum::{Router, http::Request, http::Response};
use tower_http::trace::TraceLayer;
use tracing::{Span, error, info, info_span};

pub(crate) fn apply_trace(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &Request<_>| {
                info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri(),
                    status = tracing::field::Empty,
                )
            })
            .on_response(|res: &Response<_>, latency: Duration, span: &Span| {
                let status = res.status();
                span.record("status", tracing::field::display(status));
                let latency_ms = latency.as_millis();
                if status.is_server_error() {
                    error!(%status, latency_ms, "response");
                } else {
                    info!(%status, latency_ms, "response");
                }
            }),
    )
}
