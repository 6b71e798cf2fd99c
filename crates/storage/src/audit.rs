// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only audit log
//!
//! Entries are never updated or deleted. Each gets a store-assigned sequence
//! that orders entries sharing a timestamp.

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fd_core::TenantId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    StatusChange,
    Assignment,
    Release,
    Transfer,
    FieldUpdate,
    Deleted,
    FailedOperation,
    ConflictDetected,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Created => "created",
            AuditAction::StatusChange => "status_change",
            AuditAction::Assignment => "assignment",
            AuditAction::Release => "release",
            AuditAction::Transfer => "transfer",
            AuditAction::FieldUpdate => "field_update",
            AuditAction::Deleted => "deleted",
            AuditAction::FailedOperation => "failed_operation",
            AuditAction::ConflictDetected => "conflict_detected",
        }
    }

    /// Whether the entry records a rejected attempt
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            AuditAction::FailedOperation | AuditAction::ConflictDetected
        )
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry as handed to the store
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewAuditEntry {
    pub tenant_id: TenantId,
    pub resource_type: String,
    pub resource_id: String,
    pub action: AuditAction,
    pub previous_value: Option<String>,
    pub new_value: Option<String>,
    pub performed_by: String,
    pub notes: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Entry as stored
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub sequence: u64,
    pub tenant_id: TenantId,
    pub resource_type: String,
    pub resource_id: String,
    pub action: AuditAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    pub performed_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait AuditStore: Clone + Send + Sync + 'static {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditEntry, StoreError>;

    /// Entries for one resource, oldest first
    async fn entries_for(
        &self,
        tenant_id: &TenantId,
        resource_id: &str,
    ) -> Result<Vec<AuditEntry>, StoreError>;

    /// Entries for one tenant with `from <= created_at <= to`, oldest first
    async fn entries_between(
        &self,
        tenant_id: &TenantId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<AuditEntry>, StoreError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryAuditStore {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditEntry, StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let stored = AuditEntry {
            sequence: entries.len() as u64 + 1,
            tenant_id: entry.tenant_id,
            resource_type: entry.resource_type,
            resource_id: entry.resource_id,
            action: entry.action,
            previous_value: entry.previous_value,
            new_value: entry.new_value,
            performed_by: entry.performed_by,
            notes: entry.notes,
            metadata: entry.metadata,
            created_at: entry.created_at,
        };
        entries.push(stored.clone());
        Ok(stored)
    }

    async fn entries_for(
        &self,
        tenant_id: &TenantId,
        resource_id: &str,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries
            .iter()
            .filter(|e| &e.tenant_id == tenant_id && e.resource_id == resource_id)
            .cloned()
            .collect())
    }

    async fn entries_between(
        &self,
        tenant_id: &TenantId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries
            .iter()
            .filter(|e| &e.tenant_id == tenant_id)
            .filter(|e| from.is_none_or(|from| e.created_at >= from))
            .filter(|e| to.is_none_or(|to| e.created_at <= to))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
