use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::handlers::{
    admin::{
        admin_dashboard_handler, admin_login_handler, admin_logout_handler,
        clear_registries_handler,
    },
    app::{exam_redirect, health_check, index},
    keys::request_key_handler,
};
use crate::middleware::admin::admin_middleware;
use crate::AppState;

pub fn build_router(state: AppState, secure_cookies: bool) -> Router {
    // The admin flag lives until the browser session ends; no inactivity timeout.
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(secure_cookies)
        .with_expiry(Expiry::OnSessionEnd);

    let admin_routes = Router::new()
        .route("/admin", get(admin_dashboard_handler))
        .route("/admin/clear", post(clear_registries_handler))
        .route_layer(from_fn(admin_middleware));

    Router::new()
        .route("/", get(index))
        .route("/keys", post(request_key_handler))
        .route("/exam", get(exam_redirect))
        .route("/admin/login", post(admin_login_handler))
        .route("/admin/logout", post(admin_logout_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(crate::handlers::metrics::metrics))
        .merge(admin_routes)
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
