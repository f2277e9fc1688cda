//! Registration log backends.

pub mod csv_file;
pub mod memory;

pub use csv_file::CsvRegistrationStore;
pub use memory::MemoryRegistrationStore;

use crate::models::{PoolSlot, Registration};
use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("registry I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("registry CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("registry CSV buffer error: {0}")]
    Buffer(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::StorageError(anyhow::Error::new(err))
    }
}

/// Append-only registration log, one ordered sequence per slot.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Number of registrations recorded for `slot`.
    async fn count(&self, slot: &PoolSlot) -> Result<usize, StoreError>;

    async fn append(&self, registration: &Registration) -> Result<(), StoreError>;

    /// Registrations for `slot` in insertion order.
    async fn list(&self, slot: &PoolSlot) -> Result<Vec<Registration>, StoreError>;

    /// Remove every registration in every slot.
    async fn clear_all(&self) -> Result<(), StoreError>;
}
