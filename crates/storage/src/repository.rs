// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tenant-first entity repository

use crate::error::StoreError;
use async_trait::async_trait;
use fd_core::{TenantId, TenantScoped, Versioned};

/// Storage for one entity type
///
/// The tenant id is the first parameter of every read and the first key
/// component of every write. An id stored under another tenant is invisible.
#[async_trait]
pub trait Repository<T>: Clone + Send + Sync + 'static
where
    T: TenantScoped + Versioned + Send + Sync + 'static,
{
    async fn get(&self, tenant_id: &TenantId, id: &str) -> Result<Option<T>, StoreError>;

    async fn list_by_tenant(&self, tenant_id: &TenantId) -> Result<Vec<T>, StoreError>;

    async fn insert(&self, entity: T) -> Result<T, StoreError>;

    /// Atomic compare-and-set on version
    ///
    /// Succeeds only if the stored version equals `expected_version` and
    /// `entity` carries `expected_version + 1`.
    async fn save(&self, entity: T, expected_version: u64) -> Result<T, StoreError>;

    async fn delete(
        &self,
        tenant_id: &TenantId,
        id: &str,
        expected_version: u64,
    ) -> Result<T, StoreError>;
}
