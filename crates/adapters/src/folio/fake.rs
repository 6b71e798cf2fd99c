// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake folio service for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Folio, FolioError, FolioService, LedgerFolioService, NewFolio};
use async_trait::async_trait;
use fd_core::{Amount, SequentialIdGen, TenantId};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Folio operation, used to target failure injection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FolioOp {
    Create,
    PostCharge,
    PostPayment,
    Close,
    Get,
    FindByReservation,
}

/// Recorded folio call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FolioCall {
    Create {
        reservation_id: String,
    },
    PostCharge {
        folio_id: String,
        amount: Amount,
    },
    PostPayment {
        folio_id: String,
        amount: Amount,
    },
    Close {
        folio_id: String,
    },
    Get {
        folio_id: String,
    },
    FindByReservation {
        reservation_id: String,
    },
}

/// Ledger-backed fake that records calls and fails on demand
#[derive(Clone)]
pub struct FakeFolioService {
    ledger: LedgerFolioService<SequentialIdGen>,
    calls: Arc<Mutex<Vec<FolioCall>>>,
    failing: Arc<Mutex<HashSet<FolioOp>>>,
}

impl Default for FakeFolioService {
    fn default() -> Self {
        Self {
            ledger: LedgerFolioService::new(SequentialIdGen::new()),
            calls: Arc::default(),
            failing: Arc::default(),
        }
    }
}

impl FakeFolioService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<FolioCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Make every later call to `op` fail with `Unavailable`
    pub fn fail_on(&self, op: FolioOp) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(op);
    }

    pub fn heal(&self, op: FolioOp) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&op);
    }

    fn record(&self, call: FolioCall, op: FolioOp) -> Result<(), FolioError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        if self
            .failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&op)
        {
            return Err(FolioError::Unavailable(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl FolioService for FakeFolioService {
    async fn create_folio(&self, tenant_id: &TenantId, new: NewFolio) -> Result<Folio, FolioError> {
        self.record(
            FolioCall::Create {
                reservation_id: new.reservation_id.clone(),
            },
            FolioOp::Create,
        )?;
        self.ledger.create_folio(tenant_id, new).await
    }

    async fn post_charge(
        &self,
        tenant_id: &TenantId,
        folio_id: &str,
        description: &str,
        amount: Amount,
    ) -> Result<Folio, FolioError> {
        self.record(
            FolioCall::PostCharge {
                folio_id: folio_id.to_string(),
                amount,
            },
            FolioOp::PostCharge,
        )?;
        self.ledger
            .post_charge(tenant_id, folio_id, description, amount)
            .await
    }

    async fn post_payment(
        &self,
        tenant_id: &TenantId,
        folio_id: &str,
        description: &str,
        amount: Amount,
    ) -> Result<Folio, FolioError> {
        self.record(
            FolioCall::PostPayment {
                folio_id: folio_id.to_string(),
                amount,
            },
            FolioOp::PostPayment,
        )?;
        self.ledger
            .post_payment(tenant_id, folio_id, description, amount)
            .await
    }

    async fn close_folio(&self, tenant_id: &TenantId, folio_id: &str) -> Result<Folio, FolioError> {
        self.record(
            FolioCall::Close {
                folio_id: folio_id.to_string(),
            },
            FolioOp::Close,
        )?;
        self.ledger.close_folio(tenant_id, folio_id).await
    }

    async fn get_folio(
        &self,
        tenant_id: &TenantId,
        folio_id: &str,
    ) -> Result<Option<Folio>, FolioError> {
        self.record(
            FolioCall::Get {
                folio_id: folio_id.to_string(),
            },
            FolioOp::Get,
        )?;
        self.ledger.get_folio(tenant_id, folio_id).await
    }

    async fn find_by_reservation(
        &self,
        tenant_id: &TenantId,
        reservation_id: &str,
    ) -> Result<Option<Folio>, FolioError> {
        self.record(
            FolioCall::FindByReservation {
                reservation_id: reservation_id.to_string(),
            },
            FolioOp::FindByReservation,
        )?;
        self.ledger
            .find_by_reservation(tenant_id, reservation_id)
            .await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
