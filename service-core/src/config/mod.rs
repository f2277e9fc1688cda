//! Layered configuration loading shared by the workspace services.
//!
//! A service keeps its settings in `<service>/config/base.yaml`. Values are
//! overridden by environment variables prefixed with `APP_`, using `__` to
//! descend into nested sections (`APP_SERVER__PORT=9000`).

use crate::error::AppError;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Locate a service directory whether the process runs from the workspace
/// root or from inside the service crate.
pub fn service_directory(service_name: &str) -> Result<PathBuf, AppError> {
    let base_path = std::env::current_dir()?;

    if base_path.ends_with(service_name) {
        Ok(base_path)
    } else {
        Ok(base_path.join(service_name))
    }
}

/// Load `base.yaml` from `configuration_directory` and overlay `APP_*` environment variables.
pub fn load_settings<T: DeserializeOwned>(configuration_directory: &Path) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}
