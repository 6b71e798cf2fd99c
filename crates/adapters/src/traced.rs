// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced collaborator wrappers for consistent observability

use crate::folio::{Folio, FolioError, FolioService, NewFolio};
use crate::guests::{GuestDirectory, GuestError};
use async_trait::async_trait;
use fd_core::{Amount, TenantId};
use tracing::Instrument;

/// Wrapper that adds tracing to any FolioService
#[derive(Clone)]
pub struct TracedFolioService<F> {
    inner: F,
}

impl<F> TracedFolioService<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

fn log_folio_result(result: &Result<Folio, FolioError>, start: std::time::Instant, what: &str) {
    let elapsed_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok(folio) => tracing::info!(
            folio_id = %folio.id,
            balance = folio.balance(),
            elapsed_ms,
            "{what}"
        ),
        Err(e) => tracing::error!(elapsed_ms, error = %e, "folio operation failed"),
    }
}

#[async_trait]
impl<F: FolioService> FolioService for TracedFolioService<F> {
    async fn create_folio(&self, tenant_id: &TenantId, new: NewFolio) -> Result<Folio, FolioError> {
        let span = tracing::info_span!(
            "folio.create",
            tenant_id = %tenant_id,
            reservation_id = %new.reservation_id
        );
        async {
            let start = std::time::Instant::now();
            let result = self.inner.create_folio(tenant_id, new).await;
            log_folio_result(&result, start, "folio created");
            result
        }
        .instrument(span)
        .await
    }

    async fn post_charge(
        &self,
        tenant_id: &TenantId,
        folio_id: &str,
        description: &str,
        amount: Amount,
    ) -> Result<Folio, FolioError> {
        let span = tracing::info_span!("folio.charge", tenant_id = %tenant_id, folio_id, amount);
        async {
            tracing::info!(description, "posting charge");
            let start = std::time::Instant::now();
            let result = self
                .inner
                .post_charge(tenant_id, folio_id, description, amount)
                .await;
            log_folio_result(&result, start, "charge posted");
            result
        }
        .instrument(span)
        .await
    }

    async fn post_payment(
        &self,
        tenant_id: &TenantId,
        folio_id: &str,
        description: &str,
        amount: Amount,
    ) -> Result<Folio, FolioError> {
        let span = tracing::info_span!("folio.payment", tenant_id = %tenant_id, folio_id, amount);
        async {
            tracing::info!(description, "posting payment");
            let start = std::time::Instant::now();
            let result = self
                .inner
                .post_payment(tenant_id, folio_id, description, amount)
                .await;
            log_folio_result(&result, start, "payment posted");
            result
        }
        .instrument(span)
        .await
    }

    async fn close_folio(&self, tenant_id: &TenantId, folio_id: &str) -> Result<Folio, FolioError> {
        let span = tracing::info_span!("folio.close", tenant_id = %tenant_id, folio_id);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.close_folio(tenant_id, folio_id).await;
            log_folio_result(&result, start, "folio closed");
            result
        }
        .instrument(span)
        .await
    }

    async fn get_folio(
        &self,
        tenant_id: &TenantId,
        folio_id: &str,
    ) -> Result<Option<Folio>, FolioError> {
        let result = self.inner.get_folio(tenant_id, folio_id).await;
        tracing::trace!(
            %tenant_id,
            folio_id,
            found = ?result.as_ref().ok().map(Option::is_some),
            "looked up"
        );
        result
    }

    async fn find_by_reservation(
        &self,
        tenant_id: &TenantId,
        reservation_id: &str,
    ) -> Result<Option<Folio>, FolioError> {
        let result = self
            .inner
            .find_by_reservation(tenant_id, reservation_id)
            .await;
        tracing::trace!(
            %tenant_id,
            reservation_id,
            found = ?result.as_ref().ok().map(Option::is_some),
            "looked up"
        );
        result
    }
}

/// Wrapper that adds tracing to any GuestDirectory
#[derive(Clone)]
pub struct TracedGuestDirectory<G> {
    inner: G,
}

impl<G> TracedGuestDirectory<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<G: GuestDirectory> GuestDirectory for TracedGuestDirectory<G> {
    async fn exists(&self, tenant_id: &TenantId, guest_id: &str) -> Result<bool, GuestError> {
        let span = tracing::info_span!("guests.exists", tenant_id = %tenant_id, guest_id);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.exists(tenant_id, guest_id).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(found) => tracing::debug!(found, elapsed_ms, "checked"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "lookup failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
