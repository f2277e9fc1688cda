use crate::middleware::admin::is_admin;
use crate::models::Catalog;
use crate::AppState;
use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use tower_sessions::Session;

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: &'static str,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: "success",
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: "warning",
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: "error",
            message: message.into(),
        }
    }
}

pub struct ExamOption {
    pub id: String,
    pub label: String,
    pub requires_code: bool,
    pub selected: bool,
}

pub struct ModeOption {
    pub id: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub exams: Vec<ExamOption>,
    pub modes: Vec<ModeOption>,
    pub email: String,
    pub name: String,
    pub notice: Option<Notice>,
    pub assigned_key: Option<String>,
    pub admin_notice: Option<Notice>,
    pub admin: bool,
}

impl IndexTemplate {
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            exams: catalog
                .exams()
                .iter()
                .enumerate()
                .map(|(i, exam)| ExamOption {
                    id: exam.id.clone(),
                    label: exam.label.clone(),
                    requires_code: exam.requires_authorization(),
                    selected: i == 0,
                })
                .collect(),
            modes: catalog
                .modes()
                .iter()
                .enumerate()
                .map(|(i, mode)| ModeOption {
                    id: mode.id.clone(),
                    label: mode.label.clone(),
                    selected: i == 0,
                })
                .collect(),
            email: String::new(),
            name: String::new(),
            notice: None,
            assigned_key: None,
            admin_notice: None,
            admin: false,
        }
    }

    /// Keep the user's previous choices when the form is re-rendered.
    pub fn with_selection(mut self, exam: &str, mode: &str) -> Self {
        if self.exams.iter().any(|option| option.id == exam) {
            for option in &mut self.exams {
                option.selected = option.id == exam;
            }
        }
        if self.modes.iter().any(|option| option.id == mode) {
            for option in &mut self.modes {
                option.selected = option.id == mode;
            }
        }
        self
    }

    pub fn code_required_labels(&self) -> String {
        self.exams
            .iter()
            .filter(|exam| exam.requires_code)
            .map(|exam| exam.label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub async fn index(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let mut template = IndexTemplate::new(state.dispenser.catalog());
    template.admin = is_admin(&session).await;
    template
}

/// The "access exam" button.
pub async fn exam_redirect(State(state): State<AppState>) -> impl IntoResponse {
    Redirect::to(&state.exam_url)
}

pub async fn health_check() -> &'static str {
    "OK"
}
