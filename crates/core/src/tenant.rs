// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tenant scope and the caller context
//!
//! Every service call receives a [`Caller`]. The tenant id it carries is the
//! first key component of every lookup; an entity found under another tenant
//! is reported exactly like a missing one.

use crate::authz::Role;
use crate::error::{DeskError, DeskResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an isolated customer (a hotel)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Parse a tenant id, refusing blank input
    pub fn parse(raw: &str) -> DeskResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DeskError::validation(
                "Tenant ID is required for this operation",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authenticated caller threaded through every operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub tenant_id: TenantId,
    pub actor_id: String,
    pub role: Option<Role>,
}

impl Caller {
    pub fn new(tenant_id: TenantId, actor_id: impl Into<String>, role: Role) -> Self {
        Self {
            tenant_id,
            actor_id: actor_id.into(),
            role: Some(role),
        }
    }

    /// Internal actor with no role; may run unprivileged operations only
    pub fn system(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            actor_id: "system".to_string(),
            role: None,
        }
    }

    /// Actor id recorded as `performed_by`
    pub fn require_actor(&self) -> DeskResult<&str> {
        let actor = self.actor_id.trim();
        if actor.is_empty() {
            return Err(DeskError::Unauthorized {
                message: "An authenticated actor is required for this operation".to_string(),
            });
        }
        Ok(actor)
    }
}

/// An entity owned by exactly one tenant
pub trait TenantScoped {
    /// Entity name used in errors and audit entries
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn tenant_id(&self) -> &TenantId;
}

/// Hide entities that belong to another tenant
pub fn ensure_same_tenant<T: TenantScoped>(entity: &T, tenant: &TenantId) -> DeskResult<()> {
    if entity.tenant_id() != tenant {
        return Err(DeskError::not_found(T::KIND, entity.id()));
    }
    Ok(())
}

#[cfg(test)]
#[path = "tenant_tests.rs"]
mod tests;
