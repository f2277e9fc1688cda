use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

/// Session key holding the admin flag. Lives as long as the session itself.
pub const ADMIN_SESSION_KEY: &str = "admin_access_granted";

pub async fn is_admin(session: &Session) -> bool {
    session
        .get::<bool>(ADMIN_SESSION_KEY)
        .await
        .unwrap_or(None)
        .unwrap_or(false)
}

pub async fn grant_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.insert(ADMIN_SESSION_KEY, true).await
}

pub async fn revoke_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<bool>(ADMIN_SESSION_KEY).await.map(|_| ())
}

/// Send anyone without the admin flag back to the form.
pub async fn admin_middleware(session: Session, request: Request<Body>, next: Next) -> Response {
    if !is_admin(&session).await {
        tracing::debug!(path = %request.uri().path(), "Admin route requested without access");
        return Redirect::to("/").into_response();
    }

    next.run(request).await
}
