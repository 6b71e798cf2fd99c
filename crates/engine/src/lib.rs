// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Frontdesk engine: room and reservation services and the workflows that
//! compose them

mod desk;
mod idempotency;
mod reservation;
mod room;
mod workflow;

#[cfg(test)]
mod test_helpers;

pub use desk::{DeskReservations, DeskRooms, DeskWorkflow, MemoryDesk};
pub use idempotency::{idempotency_key, IdempotencyCache};
pub use reservation::{CheckIn, ReservationService};
pub use room::{RoomService, RoomStatusResult, TransferOutcome, TransferRequest};
pub use workflow::{
    CheckInOutcome, CheckInRequest, CheckOutOutcome, CheckOutRequest, RoomMoveOutcome,
    RoomRelease, TerminalOutcome, Workflow,
};
