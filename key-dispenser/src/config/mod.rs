use secrecy::Secret;
use serde::Deserialize;
use service_core::config::{load_settings, service_directory};
use service_core::error::AppError;
use std::path::{Path, PathBuf};

pub const SERVICE_NAME: &str = "key-dispenser";

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub admin: AdminSettings,
    pub exam_access: ExamAccessSettings,
    pub store: StoreSettings,
    pub catalog: CatalogSettings,
    /// Directory that relative key-file and store paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Settings {
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Mark the session cookie `Secure`. Enable behind HTTPS.
    #[serde(default)]
    pub secure_cookies: bool,
}

#[derive(Deserialize, Clone)]
pub struct LoggingSettings {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub level: String,
    /// OTLP gRPC endpoint (e.g. http://tempo:4317). Spans are not exported when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_service_name() -> String {
    SERVICE_NAME.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Clone)]
pub struct AdminSettings {
    pub password: Secret<String>,
}

#[derive(Deserialize, Clone)]
pub struct ExamAccessSettings {
    /// Where the "access exam" button sends the user.
    pub url: String,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process memory; registrations vanish on restart.
    Memory,
    /// One CSV file per exam/mode slot.
    Csv,
}

#[derive(Deserialize, Clone)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    #[serde(default = "default_store_directory")]
    pub directory: PathBuf,
}

fn default_store_directory() -> PathBuf {
    PathBuf::from("registros")
}

#[derive(Deserialize, Clone)]
pub struct CatalogSettings {
    pub exams: Vec<ExamSettings>,
    pub modes: Vec<ModeSettings>,
    #[serde(default)]
    pub pools: Vec<PoolSettings>,
}

#[derive(Deserialize, Clone)]
pub struct ExamSettings {
    pub id: String,
    pub label: String,
    /// Code the user must type to get a key for this exam. Open exam when absent.
    #[serde(default)]
    pub authorization_code: Option<Secret<String>>,
}

#[derive(Deserialize, Clone)]
pub struct ModeSettings {
    pub id: String,
    pub label: String,
}

#[derive(Deserialize, Clone)]
pub struct PoolSettings {
    pub exam: String,
    pub mode: String,
    pub path: PathBuf,
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let service_dir = service_directory(SERVICE_NAME)?;

    let mut settings: Settings = load_settings(&service_dir.join("config"))?;
    settings.base_dir = service_dir;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Catalog;
    use secrecy::ExposeSecret;

    #[test]
    fn test_shipped_configuration_is_valid() {
        let config_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("config");
        let settings: Settings = load_settings(&config_dir).unwrap();

        assert_eq!(settings.store.backend, StoreBackend::Csv);
        assert!(!settings.admin.password.expose_secret().is_empty());

        let catalog = Catalog::from_settings(&settings.catalog).unwrap();
        assert_eq!(catalog.slots().len(), settings.catalog.pools.len());
        assert!(!catalog.exam("Muestra").unwrap().requires_authorization());
        assert!(catalog.exam("Completo").unwrap().requires_authorization());
    }

    #[test]
    fn test_resolve_path() {
        let config_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("config");
        let mut settings: Settings = load_settings(&config_dir).unwrap();
        settings.base_dir = PathBuf::from("/srv/key-dispenser");

        assert_eq!(
            settings.resolve_path(Path::new("keys/a.txt")),
            PathBuf::from("/srv/key-dispenser/keys/a.txt")
        );
        assert_eq!(
            settings.resolve_path(Path::new("/data/a.txt")),
            PathBuf::from("/data/a.txt")
        );
    }
}
