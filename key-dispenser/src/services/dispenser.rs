//! Round-robin key dispensation.
//!
//! The key for a slot is `pool[prior_registrations % pool.len()]`, so the Nth
//! registration of a slot always receives `pool[(N - 1) % len]` no matter what
//! happened in other slots. Clearing the registry starts every slot over at
//! the first key.

use crate::models::{Catalog, PoolSlot, Registration};
use crate::services::key_pool::KeyPool;
use crate::services::metrics;
use crate::services::store::{RegistrationStore, StoreError};
use crate::utils::{is_valid_email, is_valid_name};
use axum::http::StatusCode;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Returned by [`Dispenser::next_key`] when a slot has no keys loaded.
pub const NO_KEYS_AVAILABLE: &str = "No hay claves disponibles";

#[derive(Debug, Error)]
pub enum DispenseError {
    #[error("invalid email or name")]
    InvalidContact,

    #[error("unknown exam '{0}'")]
    UnknownExam(String),

    #[error("unknown mode '{0}'")]
    UnknownMode(String),

    #[error("invalid authorization code")]
    InvalidAuthorizationCode,

    #[error("no keys available for {0}")]
    NoKeysAvailable(PoolSlot),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DispenseError {
    /// Warning shown inline on the form.
    pub fn user_message(&self) -> &'static str {
        match self {
            DispenseError::InvalidContact => "Por favor, introduce un correo y nombre válidos.",
            DispenseError::UnknownExam(_) => "Selecciona un tipo de examen válido.",
            DispenseError::UnknownMode(_) => "Selecciona un modo válido.",
            DispenseError::InvalidAuthorizationCode => "Código de autorización inválido.",
            DispenseError::NoKeysAvailable(_) => {
                "No hay claves disponibles para este examen. Contacta al administrador."
            }
            DispenseError::Store(_) => "No se pudo registrar la solicitud. Inténtalo de nuevo.",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            DispenseError::InvalidContact => StatusCode::UNPROCESSABLE_ENTITY,
            DispenseError::UnknownExam(_) | DispenseError::UnknownMode(_) => {
                StatusCode::BAD_REQUEST
            }
            DispenseError::InvalidAuthorizationCode => StatusCode::FORBIDDEN,
            DispenseError::NoKeysAvailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            DispenseError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label for the rejection counter.
    pub fn reason(&self) -> &'static str {
        match self {
            DispenseError::InvalidContact => "invalid_contact",
            DispenseError::UnknownExam(_) => "unknown_exam",
            DispenseError::UnknownMode(_) => "unknown_mode",
            DispenseError::InvalidAuthorizationCode => "invalid_authorization_code",
            DispenseError::NoKeysAvailable(_) => "no_keys_available",
            DispenseError::Store(_) => "store_error",
        }
    }
}

/// A key request as submitted by the form.
#[derive(Debug, Clone, Default)]
pub struct DispenseRequest {
    pub email: String,
    pub name: String,
    pub exam: String,
    pub mode: String,
    pub authorization_code: Option<String>,
}

/// One slot of the registry, in catalog order.
#[derive(Debug, Clone)]
pub struct SlotRegistrations {
    pub slot: PoolSlot,
    pub registrations: Vec<Registration>,
}

pub struct Dispenser {
    catalog: Catalog,
    pools: HashMap<PoolSlot, KeyPool>,
    store: Arc<dyn RegistrationStore>,
    // Held across count + append so one process never hands out the same index twice.
    dispense_lock: Mutex<()>,
}

impl Dispenser {
    pub fn new(
        catalog: Catalog,
        pools: HashMap<PoolSlot, KeyPool>,
        store: Arc<dyn RegistrationStore>,
    ) -> Self {
        for slot in catalog.slots() {
            if pools.get(&slot).map_or(true, KeyPool::is_empty) {
                tracing::warn!(exam = %slot.exam, mode = %slot.mode, "No keys loaded for slot");
            }
        }

        Self {
            catalog,
            pools,
            store,
            dispense_lock: Mutex::new(()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Key the next registration of `slot` would receive, or [`NO_KEYS_AVAILABLE`].
    pub async fn next_key(&self, slot: &PoolSlot) -> Result<String, StoreError> {
        let Some(pool) = self.pools.get(slot).filter(|pool| !pool.is_empty()) else {
            return Ok(NO_KEYS_AVAILABLE.to_string());
        };

        let prior = self.store.count(slot).await?;
        Ok(pool
            .key_for(prior)
            .map_or_else(|| NO_KEYS_AVAILABLE.to_string(), str::to_string))
    }

    /// Validate a request, pick the slot's next key and record the registration.
    ///
    /// Nothing is appended unless every check passes.
    pub async fn dispense(&self, request: DispenseRequest) -> Result<Registration, DispenseError> {
        let result = self.try_dispense(request).await;
        if let Err(e) = &result {
            metrics::record_rejection(e.reason());
        }
        result
    }

    async fn try_dispense(&self, request: DispenseRequest) -> Result<Registration, DispenseError> {
        if !is_valid_email(&request.email) || !is_valid_name(&request.name) {
            return Err(DispenseError::InvalidContact);
        }

        let exam = self
            .catalog
            .exam(&request.exam)
            .ok_or_else(|| DispenseError::UnknownExam(request.exam.clone()))?;
        let mode = self
            .catalog
            .mode(&request.mode)
            .ok_or_else(|| DispenseError::UnknownMode(request.mode.clone()))?;

        let supplied_code = request
            .authorization_code
            .as_deref()
            .filter(|code| !code.is_empty());
        if !exam.authorizes(supplied_code) {
            tracing::warn!(exam = %exam.id, "Rejected key request with invalid authorization code");
            return Err(DispenseError::InvalidAuthorizationCode);
        }

        let slot = PoolSlot::new(exam.id.clone(), mode.id.clone());
        let pool = self
            .pools
            .get(&slot)
            .filter(|pool| !pool.is_empty())
            .ok_or_else(|| DispenseError::NoKeysAvailable(slot.clone()))?;

        let _guard = self.dispense_lock.lock().await;

        let prior = self.store.count(&slot).await?;
        let assigned_key = pool
            .key_for(prior)
            .ok_or_else(|| DispenseError::NoKeysAvailable(slot.clone()))?
            .to_string();

        let registration = Registration {
            email: request.email,
            name: request.name,
            assigned_key,
            exam: slot.exam.clone(),
            mode: slot.mode.clone(),
            auth_code: if exam.requires_authorization() {
                supplied_code.map(str::to_string)
            } else {
                None
            },
        };
        self.store.append(&registration).await?;

        tracing::info!(
            exam = %slot.exam,
            mode = %slot.mode,
            registration_number = prior + 1,
            pool_size = pool.len(),
            "Key dispensed"
        );
        metrics::record_key_dispensed(&slot.exam, &slot.mode);

        Ok(registration)
    }

    /// Every catalog slot with its registrations, empty slots included.
    pub async fn registrations(&self) -> Result<Vec<SlotRegistrations>, StoreError> {
        let mut all = Vec::new();
        for slot in self.catalog.slots() {
            let registrations = self.store.list(&slot).await?;
            all.push(SlotRegistrations {
                slot,
                registrations,
            });
        }
        Ok(all)
    }

    /// Purge every registry. Each slot starts over at its first key.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.dispense_lock.lock().await;
        self.store.clear_all().await?;
        tracing::warn!("All registries cleared");
        metrics::record_registries_cleared();
        Ok(())
    }
}
