//! Test harness for key-dispenser integration tests.
//!
//! Builds the full router over temporary key files and sends requests with
//! `tower::ServiceExt::oneshot`, carrying the session cookie by hand.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use key_dispenser::config::{
    AdminSettings, CatalogSettings, ExamAccessSettings, ExamSettings, LoggingSettings,
    ModeSettings, PoolSettings, ServerSettings, Settings, StoreBackend, StoreSettings,
};
use key_dispenser::startup::build_router;
use key_dispenser::AppState;
use secrecy::Secret;
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "francisco14%";
pub const FULL_EXAM_CODE: &str = "echosonomovil&%$#";
pub const EXAM_URL: &str = "https://spiardmstest.streamlit.app";

pub const SAMPLE_KEYS: [&str; 3] = ["MUE-001", "MUE-002", "MUE-003"];
pub const FULL_KEYS: [&str; 2] = ["COM-001", "COM-002"];

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub cookie: Option<String>,
    pub body: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(StoreBackend::Memory).await
    }

    pub async fn spawn_with(backend: StoreBackend) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::create_dir_all(dir.path().join("keys")).unwrap();
        std::fs::write(
            dir.path().join("keys/muestra.txt"),
            SAMPLE_KEYS.join("\n"),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("keys/completo.csv"),
            format!("Clave\n{}\n", FULL_KEYS.join("\n")),
        )
        .unwrap();

        let settings = test_settings(&dir, backend);
        let state = AppState::from_settings(&settings)
            .await
            .expect("Failed to build app state");
        let router = build_router(state.clone(), false);

        Self { router, state, dir }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");
        read_response(response).await
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> TestResponse {
        let body = serde_urlencoded::to_string(fields).expect("Failed to encode form");
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    pub async fn request_key(
        &self,
        exam: &str,
        mode: &str,
        authorization_code: Option<&str>,
    ) -> TestResponse {
        let mut fields = vec![
            ("email", "a@b.c"),
            ("name", "John Smith"),
            ("exam", exam),
            ("mode", mode),
        ];
        if let Some(code) = authorization_code {
            fields.push(("authorization_code", code));
        }
        self.post_form("/keys", &fields, None).await
    }

    /// Log in as admin and return the session cookie.
    pub async fn admin_cookie(&self) -> String {
        let response = self
            .post_form("/admin/login", &[("password", ADMIN_PASSWORD)], None)
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        response.cookie.expect("Login did not set a session cookie")
    }

    pub async fn registration_count(&self) -> usize {
        self.state
            .dispenser
            .registrations()
            .await
            .unwrap()
            .iter()
            .map(|slot| slot.registrations.len())
            .sum()
    }
}

pub fn test_settings(dir: &TempDir, backend: StoreBackend) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            secure_cookies: false,
        },
        logging: LoggingSettings {
            service_name: "key-dispenser-test".to_string(),
            level: "debug".to_string(),
            otlp_endpoint: None,
        },
        admin: AdminSettings {
            password: Secret::new(ADMIN_PASSWORD.to_string()),
        },
        exam_access: ExamAccessSettings {
            url: EXAM_URL.to_string(),
        },
        store: StoreSettings {
            backend,
            directory: "registros".into(),
        },
        catalog: CatalogSettings {
            exams: vec![
                ExamSettings {
                    id: "Muestra".to_string(),
                    label: "Examen Muestra".to_string(),
                    authorization_code: None,
                },
                ExamSettings {
                    id: "Completo".to_string(),
                    label: "Examen Completo".to_string(),
                    authorization_code: Some(Secret::new(FULL_EXAM_CODE.to_string())),
                },
            ],
            modes: vec![
                ModeSettings {
                    id: "Tutor".to_string(),
                    label: "Modo tutor".to_string(),
                },
                ModeSettings {
                    id: "Cronometrado".to_string(),
                    label: "Modo cronometrado".to_string(),
                },
            ],
            pools: vec![
                PoolSettings {
                    exam: "Muestra".to_string(),
                    mode: "Tutor".to_string(),
                    path: "keys/muestra.txt".into(),
                },
                PoolSettings {
                    exam: "Completo".to_string(),
                    mode: "Tutor".to_string(),
                    path: "keys/completo.csv".into(),
                },
                PoolSettings {
                    exam: "Muestra".to_string(),
                    mode: "Cronometrado".to_string(),
                    path: "keys/missing.txt".into(),
                },
            ],
        },
        base_dir: dir.path().to_path_buf(),
    }
}

async fn read_response(response: Response<Body>) -> TestResponse {
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");

    TestResponse {
        status,
        location,
        cookie,
        body: String::from_utf8_lossy(&bytes).to_string(),
    }
}
