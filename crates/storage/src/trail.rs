// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Audit recorders for the common entry shapes
//!
//! Recording never fails the audited operation: a store error is logged at
//! `error!` and swallowed.

use crate::audit::{AuditAction, AuditEntry, AuditStore, NewAuditEntry};
use chrono::{DateTime, Utc};
use fd_core::{Caller, Clock, DeskError, DeskResult, TenantId};
use serde_json::json;

/// The resource an entry is about
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subject<'a> {
    pub kind: &'static str,
    pub id: &'a str,
}

impl<'a> Subject<'a> {
    pub fn new(kind: &'static str, id: &'a str) -> Self {
        Self { kind, id }
    }
}

#[derive(Clone, Debug)]
pub struct AuditTrail<A: AuditStore, C: Clock> {
    store: A,
    clock: C,
}

fn actor(caller: &Caller) -> String {
    let actor = caller.actor_id.trim();
    if actor.is_empty() {
        "unknown".to_string()
    } else {
        actor.to_string()
    }
}

impl<A: AuditStore, C: Clock> AuditTrail<A, C> {
    pub fn new(store: A, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &A {
        &self.store
    }

    fn entry(&self, caller: &Caller, subject: Subject<'_>, action: AuditAction) -> NewAuditEntry {
        NewAuditEntry {
            tenant_id: caller.tenant_id.clone(),
            resource_type: subject.kind.to_string(),
            resource_id: subject.id.to_string(),
            action,
            previous_value: None,
            new_value: None,
            performed_by: actor(caller),
            notes: None,
            metadata: serde_json::Value::Null,
            created_at: self.clock.utc_now(),
        }
    }

    /// Append unconditionally
    pub async fn record(&self, entry: NewAuditEntry) -> Option<AuditEntry> {
        let tenant_id = entry.tenant_id.clone();
        let resource_id = entry.resource_id.clone();
        let action = entry.action;
        match self.store.append(entry).await {
            Ok(stored) => Some(stored),
            Err(e) => {
                tracing::error!(
                    %tenant_id,
                    resource_id,
                    %action,
                    error = %e,
                    "failed to write audit entry"
                );
                None
            }
        }
    }

    pub async fn created(
        &self,
        caller: &Caller,
        subject: Subject<'_>,
        summary: &str,
    ) -> Option<AuditEntry> {
        let mut entry = self.entry(caller, subject, AuditAction::Created);
        entry.new_value = Some(summary.to_string());
        self.record(entry).await
    }

    pub async fn deleted(
        &self,
        caller: &Caller,
        subject: Subject<'_>,
        summary: &str,
    ) -> Option<AuditEntry> {
        let mut entry = self.entry(caller, subject, AuditAction::Deleted);
        entry.previous_value = Some(summary.to_string());
        self.record(entry).await
    }

    pub async fn status_change(
        &self,
        caller: &Caller,
        subject: Subject<'_>,
        previous: &str,
        new: &str,
        reason: Option<&str>,
    ) -> Option<AuditEntry> {
        self.status_change_with(caller, subject, previous, new, reason, serde_json::Value::Null)
            .await
    }

    /// Status change carrying extra context, e.g. the room a reservation held
    pub async fn status_change_with(
        &self,
        caller: &Caller,
        subject: Subject<'_>,
        previous: &str,
        new: &str,
        reason: Option<&str>,
        metadata: serde_json::Value,
    ) -> Option<AuditEntry> {
        let mut entry = self.entry(caller, subject, AuditAction::StatusChange);
        entry.previous_value = Some(previous.to_string());
        entry.new_value = Some(new.to_string());
        entry.notes = reason.map(str::to_string);
        entry.metadata = metadata;
        self.record(entry).await
    }

    pub async fn assignment(
        &self,
        caller: &Caller,
        subject: Subject<'_>,
        guest_id: &str,
        reservation_id: &str,
    ) -> Option<AuditEntry> {
        let mut entry = self.entry(caller, subject, AuditAction::Assignment);
        entry.new_value = Some(format!("Guest: {guest_id}, Reservation: {reservation_id}"));
        self.record(entry).await
    }

    pub async fn release(
        &self,
        caller: &Caller,
        subject: Subject<'_>,
        previous_guest_id: Option<&str>,
        previous_reservation_id: Option<&str>,
    ) -> Option<AuditEntry> {
        let mut entry = self.entry(caller, subject, AuditAction::Release);
        entry.previous_value = match (previous_guest_id, previous_reservation_id) {
            (Some(guest), Some(reservation)) => {
                Some(format!("Guest: {guest}, Reservation: {reservation}"))
            }
            _ => None,
        };
        self.record(entry).await
    }

    /// One side of a room transfer
    pub async fn transfer(
        &self,
        caller: &Caller,
        subject: Subject<'_>,
        previous: &str,
        new: &str,
        details: serde_json::Value,
    ) -> Option<AuditEntry> {
        let mut entry = self.entry(caller, subject, AuditAction::Transfer);
        entry.previous_value = Some(previous.to_string());
        entry.new_value = Some(new.to_string());
        entry.metadata = details;
        self.record(entry).await
    }

    pub async fn field_update(
        &self,
        caller: &Caller,
        subject: Subject<'_>,
        field: &str,
        previous: &str,
        new: &str,
    ) -> Option<AuditEntry> {
        let mut entry = self.entry(caller, subject, AuditAction::FieldUpdate);
        entry.previous_value = Some(format!("{field}: {previous}"));
        entry.new_value = Some(format!("{field}: {new}"));
        entry.metadata = json!({ "field": field, "previous_value": previous, "new_value": new });
        self.record(entry).await
    }

    pub async fn failed_operation(
        &self,
        caller: &Caller,
        subject: Subject<'_>,
        operation: &str,
        error: &DeskError,
    ) -> Option<AuditEntry> {
        let mut entry = self.entry(caller, subject, AuditAction::FailedOperation);
        entry.new_value = Some(format!("Failed {operation}: {error}"));
        entry.metadata = json!({
            "failed_operation": operation,
            "error": error.to_string(),
            "code": error.code(),
        });
        self.record(entry).await
    }

    pub async fn conflict_detected(
        &self,
        caller: &Caller,
        subject: Subject<'_>,
        conflict_type: &str,
        details: &str,
    ) -> Option<AuditEntry> {
        let mut entry = self.entry(caller, subject, AuditAction::ConflictDetected);
        entry.new_value = Some(format!("Conflict detected ({conflict_type}): {details}"));
        entry.metadata = json!({ "conflict_type": conflict_type, "details": details });
        self.record(entry).await
    }

    /// Record a rejected attempt, as a conflict when it was one
    pub async fn rejected(
        &self,
        caller: &Caller,
        subject: Subject<'_>,
        operation: &str,
        error: &DeskError,
    ) -> Option<AuditEntry> {
        let conflict_type = match error {
            DeskError::Conflict { .. } => "version_mismatch",
            DeskError::LockBusy { .. } => "lock_busy",
            _ => return self.failed_operation(caller, subject, operation, error).await,
        };
        let details = format!("{operation}: {error}");
        self.conflict_detected(caller, subject, conflict_type, &details)
            .await
    }

    /// Entries for one resource, newest first
    pub async fn query(
        &self,
        tenant_id: &TenantId,
        resource_id: &str,
        limit: Option<usize>,
    ) -> DeskResult<Vec<AuditEntry>> {
        let mut entries = self.store.entries_for(tenant_id, resource_id).await?;
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.sequence.cmp(&a.sequence))
        });
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    /// Every entry for a tenant in a time range, oldest first
    pub async fn export(
        &self,
        tenant_id: &TenantId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> DeskResult<Vec<AuditEntry>> {
        let mut entries = self.store.entries_between(tenant_id, from, to).await?;
        entries.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.sequence.cmp(&b.sequence))
        });
        Ok(entries)
    }
}

#[cfg(test)]
#[path = "trail_tests.rs"]
mod tests;
