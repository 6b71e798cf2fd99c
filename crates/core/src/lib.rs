// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fd-core: leaf types for the frontdesk resource-lifecycle layer
//!
//! This crate provides:
//! - Tenant scope and the caller context threaded through every operation
//! - The error taxonomy shared by every crate
//! - Pure transition tables for rooms and reservations
//! - Optimistic version checks and the short-lived resource mutex
//! - Retry policy, authorization check and configuration

pub mod clock;
pub mod id;

pub mod authz;
pub mod config;
pub mod coordination;
pub mod error;
pub mod retry;
pub mod tenant;
pub mod version;

// State machines (order matters for dependencies)
pub mod machine;
pub mod reservation;
pub mod room;

// Re-exports
pub use authz::{has_permission, require_permission, Operation, Role};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{DeskConfig, LockSettings, RetrySettings, WorkflowSettings};
pub use coordination::{
    HolderId, InMemoryLocker, Lock, LockEvent, LockGuard, LockKey, LockMetadata, Locker,
    ResourceMutex,
};
pub use error::{DeskError, DeskResult};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use machine::StateMachine;
pub use reservation::{
    NewReservation, Reservation, ReservationMachine, ReservationPatch, ReservationStatus,
};
pub use retry::{with_retry, RetryPolicy};
pub use room::{NewRoom, Room, RoomMachine, RoomStatus};
pub use tenant::{Caller, TenantId, TenantScoped};
pub use version::{check_version, next_version, Versioned};

/// Amounts are carried in minor currency units
pub type Amount = i64;
