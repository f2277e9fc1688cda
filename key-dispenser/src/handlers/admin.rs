use crate::handlers::app::{IndexTemplate, Notice};
use crate::middleware::admin::{grant_admin, revoke_admin};
use crate::models::Registration;
use crate::services::{metrics, SlotRegistrations};
use crate::AppState;
use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use service_core::error::AppError;
use tower_sessions::Session;

#[derive(Deserialize)]
pub struct AdminLoginRequest {
    #[serde(default)]
    pub password: String,
}

pub struct RegistryView {
    pub exam_label: String,
    pub mode_label: String,
    pub registrations: Vec<Registration>,
}

#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub registries: Vec<RegistryView>,
    pub notice: Option<Notice>,
}

impl AdminTemplate {
    pub fn total(&self) -> usize {
        self.registries.iter().map(|r| r.registrations.len()).sum()
    }
}

async fn admin_template(state: &AppState, notice: Option<Notice>) -> Result<AdminTemplate, AppError> {
    let catalog = state.dispenser.catalog();
    let registries = state
        .dispenser
        .registrations()
        .await?
        .into_iter()
        .map(|SlotRegistrations { slot, registrations }| RegistryView {
            exam_label: catalog
                .exam(&slot.exam)
                .map_or_else(|| slot.exam.clone(), |exam| exam.label.clone()),
            mode_label: catalog
                .mode(&slot.mode)
                .map_or_else(|| slot.mode.clone(), |mode| mode.label.clone()),
            registrations,
        })
        .collect();

    Ok(AdminTemplate { registries, notice })
}

pub async fn admin_login_handler(
    State(state): State<AppState>,
    session: Session,
    Form(payload): Form<AdminLoginRequest>,
) -> Result<Response, AppError> {
    if !state.admin_gate.check(&payload.password) {
        tracing::warn!("Rejected admin login");
        metrics::record_admin_login("rejected");

        let mut template = IndexTemplate::new(state.dispenser.catalog());
        template.admin_notice = Some(Notice::error("Buen intento, aquí no, es allá."));
        return Ok((StatusCode::UNAUTHORIZED, template).into_response());
    }

    grant_admin(&session).await.map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("Failed to store admin session: {}", e))
    })?;

    tracing::info!("Admin access granted");
    metrics::record_admin_login("granted");

    Ok(Redirect::to("/admin").into_response())
}

pub async fn admin_dashboard_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    Ok(admin_template(&state, None).await?.into_response())
}

pub async fn clear_registries_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    state.dispenser.clear().await?;

    let notice = Notice::success("Se han borrado todos los registros.");
    Ok(admin_template(&state, Some(notice)).await?.into_response())
}

pub async fn admin_logout_handler(session: Session) -> Result<Response, AppError> {
    revoke_admin(&session).await.map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("Failed to update admin session: {}", e))
    })?;

    Ok(Redirect::to("/").into_response())
}
