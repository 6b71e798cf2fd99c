// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optimistic version guard
//!
//! Versions start at 0 on creation and increase by exactly one per write.

use crate::error::{DeskError, DeskResult};
use crate::tenant::TenantScoped;

/// An entity carrying an optimistic-lock version
pub trait Versioned: Clone {
    fn version(&self) -> u64;
    fn set_version(&mut self, version: u64);
}

/// Refuse a write validated against a stale version
pub fn check_version<T>(entity: &T, expected_version: u64) -> DeskResult<()>
where
    T: Versioned + TenantScoped,
{
    if entity.version() != expected_version {
        tracing::warn!(
            kind = T::KIND,
            id = entity.id(),
            expected = expected_version,
            actual = entity.version(),
            "version conflict"
        );
        return Err(DeskError::version_conflict(T::KIND));
    }
    Ok(())
}

/// Copy of `entity` at the following version
pub fn next_version<T: Versioned>(entity: &T) -> T {
    let mut next = entity.clone();
    next.set_version(entity.version() + 1);
    next
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
