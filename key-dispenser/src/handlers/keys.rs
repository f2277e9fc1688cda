use crate::handlers::app::{IndexTemplate, Notice};
use crate::middleware::admin::is_admin;
use crate::services::{DispenseError, DispenseRequest};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;

#[derive(Deserialize)]
pub struct KeyRequestForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub exam: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub authorization_code: Option<String>,
}

impl From<KeyRequestForm> for DispenseRequest {
    fn from(form: KeyRequestForm) -> Self {
        DispenseRequest {
            email: form.email,
            name: form.name,
            exam: form.exam,
            mode: form.mode,
            authorization_code: form.authorization_code,
        }
    }
}

/// "Generate key": validate, dispense and show the assigned key, or re-render with a warning.
pub async fn request_key_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<KeyRequestForm>,
) -> Response {
    let mut template = IndexTemplate::new(state.dispenser.catalog())
        .with_selection(&form.exam, &form.mode);
    template.admin = is_admin(&session).await;
    template.email = form.email.clone();
    template.name = form.name.clone();

    match state.dispenser.dispense(form.into()).await {
        Ok(registration) => {
            template.notice = Some(Notice::success("Tu clave asignada es:"));
            template.assigned_key = Some(registration.assigned_key);
            (StatusCode::OK, template).into_response()
        }
        Err(e) => {
            if let DispenseError::Store(store_error) = &e {
                tracing::error!(error = %store_error, "Failed to record registration");
            }
            let status = e.status_code();
            template.notice = Some(Notice::warning(e.user_message()));
            (status, template).into_response()
        }
    }
}
