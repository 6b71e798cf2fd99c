// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{GuestDirectory, GuestError};
use async_trait::async_trait;
use fd_core::TenantId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// In-process guest directory
#[derive(Clone, Debug, Default)]
pub struct MemoryGuestDirectory {
    guests: Arc<Mutex<HashSet<(TenantId, String)>>>,
}

impl MemoryGuestDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tenant_id: &TenantId, guest_id: impl Into<String>) {
        self.guests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((tenant_id.clone(), guest_id.into()));
    }
}

#[async_trait]
impl GuestDirectory for MemoryGuestDirectory {
    async fn exists(&self, tenant_id: &TenantId, guest_id: &str) -> Result<bool, GuestError> {
        let guests = self.guests.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guests.contains(&(tenant_id.clone(), guest_id.to_string())))
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
