pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use axum::http::HeaderValue;
use config::{Settings, StoreBackend};
use models::{Catalog, PoolSlot};
use service_core::error::AppError;
use services::{
    AdminGate, CsvRegistrationStore, Dispenser, KeyPool, MemoryRegistrationStore,
    RegistrationStore,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub dispenser: Arc<Dispenser>,
    pub admin_gate: Arc<AdminGate>,
    pub exam_url: Arc<str>,
}

impl AppState {
    pub fn new(dispenser: Arc<Dispenser>, admin_gate: Arc<AdminGate>, exam_url: &str) -> Self {
        Self {
            dispenser,
            admin_gate,
            exam_url: Arc::from(exam_url),
        }
    }

    /// Validate the catalog, load every key pool and open the configured registry.
    pub async fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        // Served as a `Location` header by the exam redirect.
        HeaderValue::from_str(&settings.exam_access.url).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "exam_access.url is not a valid redirect target: {}",
                e
            ))
        })?;

        let catalog = Catalog::from_settings(&settings.catalog)
            .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;

        let mut pools = HashMap::new();
        for pool in &settings.catalog.pools {
            let path = settings.resolve_path(&pool.path);
            let keys = KeyPool::load(&path)
                .await
                .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;
            pools.insert(PoolSlot::new(pool.exam.clone(), pool.mode.clone()), keys);
        }

        let store: Arc<dyn RegistrationStore> = match settings.store.backend {
            StoreBackend::Memory => Arc::new(MemoryRegistrationStore::new()),
            StoreBackend::Csv => {
                let directory = settings.resolve_path(&settings.store.directory);
                tracing::info!(directory = %directory.display(), "Using CSV registry");
                Arc::new(CsvRegistrationStore::new(directory))
            }
        };

        let dispenser = Arc::new(Dispenser::new(catalog, pools, store));
        let admin_gate = Arc::new(AdminGate::new(settings.admin.password.clone()));

        Ok(Self::new(dispenser, admin_gate, &settings.exam_access.url))
    }
}
