// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Guest directory adapters

mod memory;

pub use memory::MemoryGuestDirectory;

use async_trait::async_trait;
use fd_core::{DeskError, TenantId};
use thiserror::Error;

/// Errors from guest directory lookups
#[derive(Debug, Error)]
pub enum GuestError {
    #[error("guest directory unavailable: {0}")]
    Unavailable(String),
}

impl From<GuestError> for DeskError {
    fn from(err: GuestError) -> Self {
        DeskError::Internal(err.to_string())
    }
}

/// Existence check for guests, scoped by tenant
#[async_trait]
pub trait GuestDirectory: Clone + Send + Sync + 'static {
    async fn exists(&self, tenant_id: &TenantId, guest_id: &str) -> Result<bool, GuestError>;
}
