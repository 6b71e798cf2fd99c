// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Short-lived mutual exclusion for tenant-scoped resources
//!
//! This module provides:
//! - **Lock** - Pure per-key state machine with timeout expiry
//! - **Locker** - Non-blocking try-lock backend
//! - **ResourceMutex** - Guarded critical sections over one or many keys

pub mod lock;
pub mod locker;
pub mod mutex;

pub use lock::{HolderId, Lock, LockEvent, LockInput, LockKey, LockMetadata, LockState};
pub use locker::{InMemoryLocker, Locker};
pub use mutex::{LockGuard, ResourceMutex};
