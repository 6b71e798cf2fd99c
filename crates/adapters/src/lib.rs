// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Collaborators the desk calls but does not own: the guest directory and
//! the billing folio ledger

pub mod folio;
pub mod guests;
pub mod traced;

pub use folio::{
    Folio, FolioError, FolioLine, FolioService, FolioStatus, LedgerFolioService, NewFolio,
};
pub use guests::{GuestDirectory, GuestError, MemoryGuestDirectory};
pub use traced::{TracedFolioService, TracedGuestDirectory};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use folio::{FakeFolioService, FolioCall, FolioOp};
