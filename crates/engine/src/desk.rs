// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process wiring of the services over memory-backed stores

use crate::reservation::ReservationService;
use crate::room::RoomService;
use crate::workflow::Workflow;
use fd_adapters::{FolioService, MemoryGuestDirectory, TracedFolioService, TracedGuestDirectory};
use fd_core::{
    Clock, DeskConfig, IdGen, InMemoryLocker, Reservation, ResourceMutex, RetryPolicy, Room,
};
use fd_storage::{AuditTrail, MemoryAuditStore, MemoryStore};

type Guests = TracedGuestDirectory<MemoryGuestDirectory>;

pub type DeskRooms<C, I> =
    RoomService<MemoryStore<Room>, Guests, MemoryAuditStore, InMemoryLocker<C>, C, I>;

pub type DeskReservations<C, I> =
    ReservationService<MemoryStore<Reservation>, Guests, MemoryAuditStore, C, I>;

pub type DeskWorkflow<F, C, I> = Workflow<
    MemoryStore<Room>,
    MemoryStore<Reservation>,
    Guests,
    MemoryAuditStore,
    InMemoryLocker<C>,
    TracedFolioService<F>,
    C,
    I,
>;

/// One property's front desk held entirely in memory
#[derive(Clone)]
pub struct MemoryDesk<F: FolioService, C: Clock, I: IdGen> {
    guests: MemoryGuestDirectory,
    audit: MemoryAuditStore,
    workflow: DeskWorkflow<F, C, I>,
}

impl<F: FolioService, C: Clock, I: IdGen> MemoryDesk<F, C, I> {
    pub fn new(config: &DeskConfig, folios: F, clock: C, ids: I) -> Self {
        let guests = MemoryGuestDirectory::new();
        let audit = MemoryAuditStore::new();
        let trail = AuditTrail::new(audit.clone(), clock.clone());
        let mutex = ResourceMutex::new(InMemoryLocker::new(clock.clone(), config.locks.timeout));

        let rooms = RoomService::new(
            MemoryStore::new(),
            TracedGuestDirectory::new(guests.clone()),
            trail.clone(),
            mutex,
            clock.clone(),
            ids.clone(),
        );
        let reservations = ReservationService::new(
            MemoryStore::new(),
            TracedGuestDirectory::new(guests.clone()),
            trail,
            clock,
            ids,
        );
        let workflow = Workflow::new(
            rooms,
            reservations,
            TracedFolioService::new(folios),
            RetryPolicy::from(&config.retry),
            config.workflow.idempotency_ttl,
        );
        tracing::debug!(
            lock_timeout_ms = config.locks.timeout.as_millis() as u64,
            max_retries = config.retry.max_retries,
            "desk assembled"
        );
        Self {
            guests,
            audit,
            workflow,
        }
    }

    /// Guest registry consulted on assignment and reservation writes
    pub fn guests(&self) -> &MemoryGuestDirectory {
        &self.guests
    }

    pub fn audit(&self) -> &MemoryAuditStore {
        &self.audit
    }

    pub fn workflow(&self) -> &DeskWorkflow<F, C, I> {
        &self.workflow
    }

    pub fn rooms(&self) -> &DeskRooms<C, I> {
        self.workflow.rooms()
    }

    pub fn reservations(&self) -> &DeskReservations<C, I> {
        self.workflow.reservations()
    }

    /// The billing collaborator as passed to [`MemoryDesk::new`]
    pub fn folios(&self) -> &F {
        self.workflow.folios().inner()
    }

    pub fn trail(&self) -> &AuditTrail<MemoryAuditStore, C> {
        self.workflow.trail()
    }
}
