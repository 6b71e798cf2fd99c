// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process entity store

use crate::error::StoreError;
use crate::repository::Repository;
use async_trait::async_trait;
use fd_core::{TenantId, TenantScoped, Versioned};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Key = (TenantId, String);

#[derive(Debug)]
pub struct MemoryStore<T> {
    entries: Arc<Mutex<HashMap<Key, T>>>,
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

fn key_of<T: TenantScoped>(entity: &T) -> Key {
    (entity.tenant_id().clone(), entity.id().to_string())
}

#[async_trait]
impl<T> Repository<T> for MemoryStore<T>
where
    T: TenantScoped + Versioned + Send + Sync + 'static,
{
    async fn get(&self, tenant_id: &TenantId, id: &str) -> Result<Option<T>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(&(tenant_id.clone(), id.to_string())).cloned())
    }

    async fn list_by_tenant(&self, tenant_id: &TenantId) -> Result<Vec<T>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut found: Vec<T> = entries
            .iter()
            .filter(|((tenant, _), _)| tenant == tenant_id)
            .map(|(_, entity)| entity.clone())
            .collect();
        found.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(found)
    }

    async fn insert(&self, entity: T) -> Result<T, StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let key = key_of(&entity);
        if entries.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                kind: T::KIND,
                id: key.1,
            });
        }
        entries.insert(key, entity.clone());
        Ok(entity)
    }

    async fn save(&self, entity: T, expected_version: u64) -> Result<T, StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let key = key_of(&entity);
        let Some(stored) = entries.get(&key) else {
            return Err(StoreError::NotFound {
                kind: T::KIND,
                id: key.1,
            });
        };
        if stored.version() != expected_version {
            return Err(StoreError::VersionMismatch {
                kind: T::KIND,
                id: key.1,
                expected: expected_version,
                actual: stored.version(),
            });
        }
        if entity.version() != expected_version + 1 {
            return Err(StoreError::NotIncremented {
                kind: T::KIND,
                id: key.1,
                required: expected_version + 1,
                given: entity.version(),
            });
        }
        entries.insert(key, entity.clone());
        Ok(entity)
    }

    async fn delete(
        &self,
        tenant_id: &TenantId,
        id: &str,
        expected_version: u64,
    ) -> Result<T, StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let key = (tenant_id.clone(), id.to_string());
        match entries.get(&key) {
            None => Err(StoreError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            }),
            Some(stored) if stored.version() != expected_version => {
                Err(StoreError::VersionMismatch {
                    kind: T::KIND,
                    id: id.to_string(),
                    expected: expected_version,
                    actual: stored.version(),
                })
            }
            Some(_) => entries.remove(&key).ok_or_else(|| StoreError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
