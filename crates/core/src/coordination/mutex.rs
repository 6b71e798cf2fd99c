// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource mutex guarding compound read-validate-write sequences
//!
//! Acquisition never waits. A busy key fails with `LockBusy`, which the retry
//! policy treats as transient. Release is tied to [`LockGuard`], so every exit
//! path of a critical section frees its keys, including a dropped future.

use super::lock::{HolderId, LockKey, LockMetadata};
use super::locker::Locker;
use crate::error::{DeskError, DeskResult};
use crate::tenant::TenantId;
use std::future::Future;

#[derive(Clone, Debug)]
pub struct ResourceMutex<L: Locker> {
    locker: L,
}

/// Holds one key until dropped
#[derive(Debug)]
pub struct LockGuard<L: Locker> {
    locker: L,
    key: LockKey,
    holder: HolderId,
}

impl<L: Locker> LockGuard<L> {
    pub fn key(&self) -> &LockKey {
        &self.key
    }

    pub fn holder(&self) -> HolderId {
        self.holder
    }
}

impl<L: Locker> Drop for LockGuard<L> {
    /// Frees the key only while this acquisition still owns it
    fn drop(&mut self) {
        self.locker.release_if_held(&self.key, self.holder);
    }
}

impl<L: Locker> ResourceMutex<L> {
    pub fn new(locker: L) -> Self {
        Self { locker }
    }

    pub fn locker(&self) -> &L {
        &self.locker
    }

    /// Raw try-lock; pair with [`ResourceMutex::release`]
    pub fn acquire(&self, tenant_id: &TenantId, resource_id: &str, label: &str) -> bool {
        self.locker
            .try_acquire(&LockKey::new(tenant_id.clone(), resource_id), label)
    }

    pub fn release(&self, tenant_id: &TenantId, resource_id: &str) {
        self.locker
            .release(&LockKey::new(tenant_id.clone(), resource_id));
    }

    pub fn holder(&self, tenant_id: &TenantId, resource_id: &str) -> Option<LockMetadata> {
        self.locker
            .holder(&LockKey::new(tenant_id.clone(), resource_id))
    }

    /// Take one key, or fail with `LockBusy`
    pub fn lock(
        &self,
        tenant_id: &TenantId,
        resource_id: &str,
        label: &str,
    ) -> DeskResult<LockGuard<L>> {
        let key = LockKey::new(tenant_id.clone(), resource_id);
        let Some(holder) = self.locker.acquire(&key, label) else {
            tracing::warn!(%key, label, "resource busy");
            return Err(DeskError::lock_busy(resource_id));
        };
        Ok(LockGuard {
            locker: self.locker.clone(),
            key,
            holder,
        })
    }

    /// Take several keys in sorted order
    ///
    /// Duplicates are collapsed. If any key is busy, the keys already taken
    /// are released before returning `LockBusy`.
    pub fn lock_all(
        &self,
        tenant_id: &TenantId,
        resource_ids: &[&str],
        label: &str,
    ) -> DeskResult<Vec<LockGuard<L>>> {
        let mut ids = resource_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.lock(tenant_id, id, label)?);
        }
        Ok(guards)
    }

    /// Run `op` while holding `resource_id`
    pub async fn with_lock<F, Fut, T>(
        &self,
        tenant_id: &TenantId,
        resource_id: &str,
        label: &str,
        op: F,
    ) -> DeskResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DeskResult<T>>,
    {
        let _guard = self.lock(tenant_id, resource_id, label)?;
        op().await
    }

    /// Run `op` while holding every id in `resource_ids`
    pub async fn with_locks<F, Fut, T>(
        &self,
        tenant_id: &TenantId,
        resource_ids: &[&str],
        label: &str,
        op: F,
    ) -> DeskResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DeskResult<T>>,
    {
        let _guards = self.lock_all(tenant_id, resource_ids, label)?;
        op().await
    }
}

#[cfg(test)]
#[path = "mutex_tests.rs"]
mod tests;
