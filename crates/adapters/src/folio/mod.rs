// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Billing folio adapters
//!
//! Amounts are minor currency units. A folio closes only at zero balance.

mod ledger;

pub use ledger::LedgerFolioService;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeFolioService, FolioCall, FolioOp};

use async_trait::async_trait;
use fd_core::{Amount, DeskError, TenantId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from folio operations
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("folio not found: {0}")]
    NotFound(String),
    #[error("folio {0} is closed")]
    Closed(String),
    #[error("Cannot close folio with outstanding balance: {balance}")]
    BalanceOutstanding { folio_id: String, balance: Amount },
    #[error("amount must be positive, got {0}")]
    InvalidAmount(Amount),
    #[error("billing unavailable: {0}")]
    Unavailable(String),
}

impl From<FolioError> for DeskError {
    fn from(err: FolioError) -> Self {
        match err {
            FolioError::NotFound(id) => DeskError::not_found("Folio", id),
            err @ FolioError::Closed(_) => DeskError::business_rule("FOLIO_CLOSED", err.to_string()),
            err @ FolioError::BalanceOutstanding { .. } => {
                DeskError::business_rule("FOLIO_BALANCE_MUST_BE_ZERO", err.to_string())
            }
            err @ FolioError::InvalidAmount(_) => DeskError::validation(err.to_string()),
            err @ FolioError::Unavailable(_) => DeskError::Internal(err.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolioStatus {
    Open,
    Closed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolioLine {
    pub description: String,
    pub amount: Amount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folio {
    pub id: String,
    pub tenant_id: TenantId,
    pub reservation_id: String,
    pub guest_id: String,
    pub room_id: String,
    pub status: FolioStatus,
    pub charges: Vec<FolioLine>,
    pub payments: Vec<FolioLine>,
}

impl Folio {
    /// Charges minus payments
    pub fn balance(&self) -> Amount {
        let charged: Amount = self.charges.iter().map(|line| line.amount).sum();
        let paid: Amount = self.payments.iter().map(|line| line.amount).sum();
        charged - paid
    }

    pub fn is_open(&self) -> bool {
        self.status == FolioStatus::Open
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewFolio {
    pub reservation_id: String,
    pub guest_id: String,
    pub room_id: String,
}

/// Billing collaborator
#[async_trait]
pub trait FolioService: Clone + Send + Sync + 'static {
    async fn create_folio(&self, tenant_id: &TenantId, new: NewFolio) -> Result<Folio, FolioError>;

    async fn post_charge(
        &self,
        tenant_id: &TenantId,
        folio_id: &str,
        description: &str,
        amount: Amount,
    ) -> Result<Folio, FolioError>;

    async fn post_payment(
        &self,
        tenant_id: &TenantId,
        folio_id: &str,
        description: &str,
        amount: Amount,
    ) -> Result<Folio, FolioError>;

    /// Refused while the balance is non-zero
    async fn close_folio(&self, tenant_id: &TenantId, folio_id: &str) -> Result<Folio, FolioError>;

    async fn get_folio(
        &self,
        tenant_id: &TenantId,
        folio_id: &str,
    ) -> Result<Option<Folio>, FolioError>;

    /// Most recent folio opened for a reservation
    async fn find_by_reservation(
        &self,
        tenant_id: &TenantId,
        reservation_id: &str,
    ) -> Result<Option<Folio>, FolioError>;
}
