// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine tests

use crate::desk::MemoryDesk;
use crate::reservation::CheckIn;
use chrono::{NaiveDate, TimeZone, Utc};
use fd_adapters::FakeFolioService;
use fd_core::{
    Caller, DeskConfig, FakeClock, NewReservation, NewRoom, Reservation, Role, Room, RoomStatus,
    SequentialIdGen, TenantId,
};
use fd_storage::AuditEntry;
use std::time::Duration;

pub(crate) type TestDesk = MemoryDesk<FakeFolioService, FakeClock, SequentialIdGen>;

pub(crate) const GUEST: &str = "guest-1";

/// Nightly rate used by [`Fixture::reservation`]
pub(crate) const RATE: i64 = 10_000;

pub(crate) fn tenant(raw: &str) -> TenantId {
    TenantId::parse(raw).unwrap()
}

pub(crate) fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, month, day).unwrap()
}

/// Fast retries so conflict paths don't slow the suite
pub(crate) fn test_config() -> DeskConfig {
    let mut config = DeskConfig::default();
    config.retry.initial_delay = Duration::from_millis(1);
    config.retry.max_delay = Duration::from_millis(2);
    config
}

pub(crate) struct Fixture {
    pub desk: TestDesk,
    pub clock: FakeClock,
    pub folios: FakeFolioService,
    pub caller: Caller,
}

impl Fixture {
    pub fn new() -> Self {
        let clock = FakeClock::starting_at(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
        let folios = FakeFolioService::new();
        let desk = MemoryDesk::new(
            &test_config(),
            folios.clone(),
            clock.clone(),
            SequentialIdGen::new(),
        );
        let caller = Caller::new(tenant("hotel-1"), "clerk-1", Role::Staff);
        desk.guests().register(&caller.tenant_id, GUEST);
        Self {
            desk,
            clock,
            folios,
            caller,
        }
    }

    pub fn as_role(&self, role: Role) -> Caller {
        Caller::new(self.caller.tenant_id.clone(), "boss-1", role)
    }

    pub async fn room(&self, number: &str) -> Room {
        self.room_with_status(number, RoomStatus::Available).await
    }

    pub async fn room_with_status(&self, number: &str, status: RoomStatus) -> Room {
        self.desk
            .rooms()
            .create(
                &self.caller,
                NewRoom {
                    room_number: number.to_string(),
                    floor: 1,
                    room_type: "double".to_string(),
                    status: Some(status),
                },
            )
            .await
            .unwrap()
    }

    /// A confirmed two-night stay starting today
    pub async fn reservation(&self) -> Reservation {
        self.desk
            .reservations()
            .create(&self.caller, new_reservation(date(3, 1), date(3, 3)))
            .await
            .unwrap()
    }

    /// Reservation checked in to `room`, with the room occupied
    pub async fn checked_in(&self, room: &Room) -> Reservation {
        let reservation = self.reservation().await;
        let reservation = self
            .desk
            .reservations()
            .check_in(
                &self.caller,
                &reservation.id,
                CheckIn {
                    room_id: room.id.clone(),
                    notes: None,
                    expected_version: reservation.version,
                    reason: None,
                },
            )
            .await
            .unwrap();
        self.desk
            .rooms()
            .assign_to_guest(&self.caller, &room.id, GUEST, &reservation.id, room.version)
            .await
            .unwrap();
        reservation
    }

    /// Audit history of one resource, newest first
    pub async fn history(&self, resource_id: &str) -> Vec<AuditEntry> {
        self.desk
            .trail()
            .query(&self.caller.tenant_id, resource_id, None)
            .await
            .unwrap()
    }
}

pub(crate) fn new_reservation(check_in: NaiveDate, check_out: NaiveDate) -> NewReservation {
    NewReservation {
        guest_id: GUEST.to_string(),
        room_type: "double".to_string(),
        check_in_date: check_in,
        check_out_date: check_out,
        adults: 2,
        children: 0,
        room_rate: RATE,
        notes: None,
        status: None,
    }
}
