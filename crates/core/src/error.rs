// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared by every frontdesk crate
//!
//! Each variant maps to a stable machine-readable code via [`DeskError::code`];
//! the `Display` output is the human message.

use thiserror::Error;

/// Errors raised by the resource-lifecycle layer
#[derive(Debug, Error)]
pub enum DeskError {
    /// Entity absent, or present under another tenant
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    BusinessRule { rule: &'static str, message: String },

    /// Optimistic version mismatch or a lost compare-and-set
    #[error("{resource} {message}")]
    Conflict { resource: String, message: String },

    #[error("{resource} is currently locked by another operation. Please try again.")]
    LockBusy { resource: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("workflow failed at step \"{step}\": {source}")]
    Workflow {
        step: &'static str,
        rollback_required: bool,
        #[source]
        source: Box<DeskError>,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

pub type DeskResult<T> = Result<T, DeskError>;

impl DeskError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DeskError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DeskError::Validation {
            message: message.into(),
        }
    }

    pub fn business_rule(rule: &'static str, message: impl Into<String>) -> Self {
        DeskError::BusinessRule {
            rule,
            message: message.into(),
        }
    }

    /// A stale write; the message tells the caller how to recover
    pub fn version_conflict(resource: impl Into<String>) -> Self {
        DeskError::Conflict {
            resource: resource.into(),
            message: "has been modified by another user. Please refresh and try again."
                .to_string(),
        }
    }

    pub fn lock_busy(resource: impl Into<String>) -> Self {
        DeskError::LockBusy {
            resource: resource.into(),
        }
    }

    pub fn workflow(step: &'static str, source: DeskError) -> Self {
        DeskError::Workflow {
            step,
            rollback_required: true,
            source: Box::new(source),
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            DeskError::NotFound { .. } => "NOT_FOUND",
            DeskError::Validation { .. } => "VALIDATION_ERROR",
            DeskError::BusinessRule { .. } => "BUSINESS_RULE_ERROR",
            DeskError::Conflict { .. } | DeskError::LockBusy { .. } => "CONFLICT",
            DeskError::Forbidden { .. } => "FORBIDDEN",
            DeskError::Unauthorized { .. } => "UNAUTHORIZED",
            DeskError::Workflow { .. } => "WORKFLOW_ERROR",
            DeskError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The named rule for business-rule errors
    pub fn rule(&self) -> Option<&'static str> {
        match self {
            DeskError::BusinessRule { rule, .. } => Some(rule),
            _ => None,
        }
    }

    /// Only version conflicts and busy locks can change outcome on retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, DeskError::Conflict { .. } | DeskError::LockBusy { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, DeskError::Conflict { .. })
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
