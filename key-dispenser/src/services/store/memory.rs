use super::{RegistrationStore, StoreError};
use crate::models::{PoolSlot, Registration};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Registrations kept in process memory; lost on restart.
#[derive(Default)]
pub struct MemoryRegistrationStore {
    registries: RwLock<HashMap<PoolSlot, Vec<Registration>>>,
}

impl MemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistrationStore for MemoryRegistrationStore {
    async fn count(&self, slot: &PoolSlot) -> Result<usize, StoreError> {
        let registries = self.registries.read().await;
        Ok(registries.get(slot).map_or(0, Vec::len))
    }

    async fn append(&self, registration: &Registration) -> Result<(), StoreError> {
        let mut registries = self.registries.write().await;
        registries
            .entry(registration.slot())
            .or_default()
            .push(registration.clone());
        Ok(())
    }

    async fn list(&self, slot: &PoolSlot) -> Result<Vec<Registration>, StoreError> {
        let registries = self.registries.read().await;
        Ok(registries.get(slot).cloned().unwrap_or_default())
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        self.registries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(email: &str, exam: &str, mode: &str) -> Registration {
        Registration {
            email: email.to_string(),
            name: "Ana Lopez".to_string(),
            assigned_key: "K1".to_string(),
            exam: exam.to_string(),
            mode: mode.to_string(),
            auth_code: None,
        }
    }

    #[tokio::test]
    async fn test_append_count_and_list_per_slot() {
        let store = MemoryRegistrationStore::new();
        let sample = PoolSlot::new("Muestra", "Tutor");
        let full = PoolSlot::new("Completo", "Tutor");

        store.append(&registration("a@b.c", "Muestra", "Tutor")).await.unwrap();
        store.append(&registration("d@e.f", "Muestra", "Tutor")).await.unwrap();
        store.append(&registration("g@h.i", "Completo", "Tutor")).await.unwrap();

        assert_eq!(store.count(&sample).await.unwrap(), 2);
        assert_eq!(store.count(&full).await.unwrap(), 1);

        let listed = store.list(&sample).await.unwrap();
        assert_eq!(listed[0].email, "a@b.c");
        assert_eq!(listed[1].email, "d@e.f");
    }

    #[tokio::test]
    async fn test_clear_all() {
        let store = MemoryRegistrationStore::new();
        let slot = PoolSlot::new("Muestra", "Tutor");
        store.append(&registration("a@b.c", "Muestra", "Tutor")).await.unwrap();

        store.clear_all().await.unwrap();

        assert_eq!(store.count(&slot).await.unwrap(), 0);
        assert!(store.list(&slot).await.unwrap().is_empty());
    }
}
