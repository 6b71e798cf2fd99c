// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process folio ledger

use super::{Folio, FolioError, FolioLine, FolioService, FolioStatus, NewFolio};
use async_trait::async_trait;
use fd_core::{Amount, IdGen, TenantId};
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug)]
pub struct LedgerFolioService<I: IdGen> {
    ids: I,
    folios: Arc<Mutex<Vec<Folio>>>,
}

impl<I: IdGen> LedgerFolioService<I> {
    pub fn new(ids: I) -> Self {
        Self {
            ids,
            folios: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn update<F>(&self, tenant_id: &TenantId, folio_id: &str, f: F) -> Result<Folio, FolioError>
    where
        F: FnOnce(&mut Folio) -> Result<(), FolioError>,
    {
        let mut folios = self.folios.lock().unwrap_or_else(|e| e.into_inner());
        let folio = folios
            .iter_mut()
            .find(|folio| &folio.tenant_id == tenant_id && folio.id == folio_id)
            .ok_or_else(|| FolioError::NotFound(folio_id.to_string()))?;
        f(folio)?;
        Ok(folio.clone())
    }

    fn post(
        &self,
        tenant_id: &TenantId,
        folio_id: &str,
        line: FolioLine,
        payment: bool,
    ) -> Result<Folio, FolioError> {
        if line.amount <= 0 {
            return Err(FolioError::InvalidAmount(line.amount));
        }
        self.update(tenant_id, folio_id, |folio| {
            if !folio.is_open() {
                return Err(FolioError::Closed(folio.id.clone()));
            }
            if payment {
                folio.payments.push(line);
            } else {
                folio.charges.push(line);
            }
            Ok(())
        })
    }
}

#[async_trait]
impl<I: IdGen> FolioService for LedgerFolioService<I> {
    async fn create_folio(&self, tenant_id: &TenantId, new: NewFolio) -> Result<Folio, FolioError> {
        let folio = Folio {
            id: self.ids.next("folio"),
            tenant_id: tenant_id.clone(),
            reservation_id: new.reservation_id,
            guest_id: new.guest_id,
            room_id: new.room_id,
            status: FolioStatus::Open,
            charges: Vec::new(),
            payments: Vec::new(),
        };
        self.folios
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(folio.clone());
        Ok(folio)
    }

    async fn post_charge(
        &self,
        tenant_id: &TenantId,
        folio_id: &str,
        description: &str,
        amount: Amount,
    ) -> Result<Folio, FolioError> {
        let line = FolioLine {
            description: description.to_string(),
            amount,
        };
        self.post(tenant_id, folio_id, line, false)
    }

    async fn post_payment(
        &self,
        tenant_id: &TenantId,
        folio_id: &str,
        description: &str,
        amount: Amount,
    ) -> Result<Folio, FolioError> {
        let line = FolioLine {
            description: description.to_string(),
            amount,
        };
        self.post(tenant_id, folio_id, line, true)
    }

    async fn close_folio(&self, tenant_id: &TenantId, folio_id: &str) -> Result<Folio, FolioError> {
        self.update(tenant_id, folio_id, |folio| {
            let balance = folio.balance();
            if balance != 0 {
                return Err(FolioError::BalanceOutstanding {
                    folio_id: folio.id.clone(),
                    balance,
                });
            }
            folio.status = FolioStatus::Closed;
            Ok(())
        })
    }

    async fn get_folio(
        &self,
        tenant_id: &TenantId,
        folio_id: &str,
    ) -> Result<Option<Folio>, FolioError> {
        let folios = self.folios.lock().unwrap_or_else(|e| e.into_inner());
        Ok(folios
            .iter()
            .find(|folio| &folio.tenant_id == tenant_id && folio.id == folio_id)
            .cloned())
    }

    async fn find_by_reservation(
        &self,
        tenant_id: &TenantId,
        reservation_id: &str,
    ) -> Result<Option<Folio>, FolioError> {
        let folios = self.folios.lock().unwrap_or_else(|e| e.into_inner());
        Ok(folios
            .iter()
            .rev()
            .find(|folio| &folio.tenant_id == tenant_id && folio.reservation_id == reservation_id)
            .cloned())
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
