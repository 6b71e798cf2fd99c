// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use fd_core::DeskError;
use thiserror::Error;

/// Errors raised by entity and audit stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: &'static str, id: String },

    /// Lost compare-and-set
    #[error("{kind} {id} is at version {actual}, expected {expected}")]
    VersionMismatch {
        kind: &'static str,
        id: String,
        expected: u64,
        actual: u64,
    },

    /// The entity handed to `save` does not carry `expected + 1`
    #[error("{kind} {id} must be saved at version {required}, got {given}")]
    NotIncremented {
        kind: &'static str,
        id: String,
        required: u64,
        given: u64,
    },

    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for DeskError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => DeskError::not_found(kind, id),
            StoreError::AlreadyExists { kind, id } => {
                DeskError::validation(format!("{kind} with ID {id} already exists"))
            }
            StoreError::VersionMismatch { kind, .. } => DeskError::version_conflict(kind),
            err @ StoreError::NotIncremented { .. } => DeskError::Internal(err.to_string()),
            StoreError::Backend(message) => DeskError::Internal(message),
        }
    }
}
