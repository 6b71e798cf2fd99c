// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fd-storage: tenant-first entity stores and the append-only audit log

mod audit;
mod error;
mod memory;
mod repository;
mod trail;

pub use audit::{AuditAction, AuditEntry, AuditStore, MemoryAuditStore, NewAuditEntry};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use repository::Repository;
pub use trail::{AuditTrail, Subject};
