// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflows spanning reservation, room and folio
//!
//! There is no shared transaction. The reservation step defines the outcome:
//! a failure before it changes nothing, a failure after it is reported as a
//! [`DeskError::Workflow`] without unwinding earlier steps. Room release on
//! check-out, cancellation and no-show is best effort: a failure is logged
//! with full context and the reservation outcome stands. A room that is not
//! occupied (a pre-assigned room still `reserved`, say) has nothing to
//! release and is reported as not assigned. A room occupied by a different
//! reservation is left alone and reported as a failed release.

use crate::idempotency::{idempotency_key, IdempotencyCache};
use crate::reservation::{CheckIn, ReservationService};
use crate::room::{RoomService, TransferRequest};
use fd_adapters::{Folio, FolioService, GuestDirectory, NewFolio};
use fd_core::{
    with_retry, Caller, Clock, DeskError, DeskResult, IdGen, Locker, Reservation,
    ReservationMachine, ReservationStatus, RetryPolicy, Room, TenantScoped,
};
use fd_storage::{AuditStore, AuditTrail, Repository, Subject};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub reservation_id: String,
    pub room_id: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Derived from the reservation and room when omitted
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheckInOutcome {
    pub reservation: Reservation,
    pub room: Room,
    pub folio: Folio,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutRequest {
    pub reservation_id: String,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// What happened to the room a reservation held
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RoomRelease {
    Released(Room),
    /// No room id on the reservation, or the room was not occupied
    NotAssigned,
    /// Room still shows the stay; needs manual reconciliation
    Failed {
        room_id: String,
        code: &'static str,
        error: String,
    },
}

impl RoomRelease {
    pub fn is_failed(&self) -> bool {
        matches!(self, RoomRelease::Failed { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheckOutOutcome {
    pub reservation: Reservation,
    pub folio: Option<Folio>,
    pub room_release: RoomRelease,
}

/// Result of a cancellation or no-show
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TerminalOutcome {
    pub reservation: Reservation,
    pub room_release: RoomRelease,
}

/// Rooms and reservation after a guest changed rooms
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoomMoveOutcome {
    pub reservation: Reservation,
    pub from_room: Room,
    pub to_room: Room,
}

#[derive(Clone)]
pub struct Workflow<R, V, G, A, L, F, C, I>
where
    A: AuditStore,
    L: Locker,
    C: Clock,
{
    rooms: RoomService<R, G, A, L, C, I>,
    reservations: ReservationService<V, G, A, C, I>,
    folios: F,
    trail: AuditTrail<A, C>,
    retry: RetryPolicy,
    clock: C,
    check_ins: IdempotencyCache<CheckInOutcome, C>,
    check_outs: IdempotencyCache<CheckOutOutcome, C>,
}

impl<R, V, G, A, L, F, C, I> Workflow<R, V, G, A, L, F, C, I>
where
    R: Repository<Room>,
    V: Repository<Reservation>,
    G: GuestDirectory,
    A: AuditStore,
    L: Locker,
    F: FolioService,
    C: Clock,
    I: IdGen,
{
    pub fn new(
        rooms: RoomService<R, G, A, L, C, I>,
        reservations: ReservationService<V, G, A, C, I>,
        folios: F,
        retry: RetryPolicy,
        idempotency_ttl: Duration,
    ) -> Self {
        let trail = reservations.trail().clone();
        let clock = reservations.clock().clone();
        Self {
            check_ins: IdempotencyCache::new(clock.clone(), idempotency_ttl),
            check_outs: IdempotencyCache::new(clock.clone(), idempotency_ttl),
            rooms,
            reservations,
            folios,
            trail,
            retry,
            clock,
        }
    }

    pub fn rooms(&self) -> &RoomService<R, G, A, L, C, I> {
        &self.rooms
    }

    pub fn reservations(&self) -> &ReservationService<V, G, A, C, I> {
        &self.reservations
    }

    pub fn folios(&self) -> &F {
        &self.folios
    }

    pub fn trail(&self) -> &AuditTrail<A, C> {
        &self.trail
    }

    /// Check in, occupy the room, open a folio and charge the stay
    pub async fn perform_check_in(
        &self,
        caller: &Caller,
        request: CheckInRequest,
    ) -> DeskResult<CheckInOutcome> {
        let reservation_id = request.reservation_id.trim();
        let room_id = request.room_id.trim();
        if reservation_id.is_empty() {
            return Err(DeskError::validation("Reservation ID is required"));
        }
        if room_id.is_empty() {
            return Err(DeskError::validation("Room ID is required"));
        }
        let key = self.key(
            caller,
            request.idempotency_key.as_deref(),
            "checkIn",
            &[reservation_id, room_id],
        );
        if let Some(outcome) = self.check_ins.get(&key) {
            tracing::info!(
                tenant_id = %caller.tenant_id,
                reservation_id,
                key,
                "check-in replayed"
            );
            return Ok(outcome);
        }

        let (reservation, room) = self
            .refused(caller, reservation_id, "perform_check_in", async {
                caller.require_actor()?;
                let reservation = self.reservations.get(caller, reservation_id).await?;
                ReservationMachine::ensure_can_check_in(reservation.status)?;
                let room = self.rooms.get(caller, room_id).await?;
                room.ensure_assignable()?;
                Ok((reservation, room))
            })
            .await?;

        let reservation = self
            .reservations
            .check_in(
                caller,
                reservation_id,
                CheckIn {
                    room_id: room.id.clone(),
                    notes: request.notes.clone(),
                    expected_version: reservation.version,
                    reason: None,
                },
            )
            .await?;

        let rooms = &self.rooms;
        let guest_id = reservation.guest_id.as_str();
        let room = self
            .after_primary(
                caller,
                reservation_id,
                "assign_room",
                with_retry(&self.retry, move || async move {
                    let current = rooms.get(caller, room_id).await?;
                    rooms
                        .assign_to_guest(caller, room_id, guest_id, reservation_id, current.version)
                        .await
                }),
            )
            .await?;

        let folio = self
            .after_primary(caller, reservation_id, "create_folio", async {
                self.folios
                    .create_folio(
                        &caller.tenant_id,
                        NewFolio {
                            reservation_id: reservation.id.clone(),
                            guest_id: reservation.guest_id.clone(),
                            room_id: room.id.clone(),
                        },
                    )
                    .await
                    .map_err(DeskError::from)
            })
            .await?;

        let charge = reservation.total_amount;
        let folio = if charge > 0 {
            let description = format!(
                "Room {} - {} night(s)",
                room.room_number, reservation.nights
            );
            self.after_primary(caller, reservation_id, "post_room_charge", async {
                self.folios
                    .post_charge(&caller.tenant_id, &folio.id, &description, charge)
                    .await
                    .map_err(DeskError::from)
            })
            .await?
        } else {
            folio
        };

        tracing::info!(
            tenant_id = %caller.tenant_id,
            reservation_id,
            room_id,
            folio_id = %folio.id,
            charge,
            "check-in completed"
        );
        let outcome = CheckInOutcome {
            reservation,
            room,
            folio,
        };
        self.check_ins.put(key, outcome.clone());
        Ok(outcome)
    }

    /// Settle, release the room and close the stay
    ///
    /// Refused without side effects while the folio carries a balance.
    pub async fn perform_check_out(
        &self,
        caller: &Caller,
        request: CheckOutRequest,
    ) -> DeskResult<CheckOutOutcome> {
        let reservation_id = request.reservation_id.trim();
        if reservation_id.is_empty() {
            return Err(DeskError::validation("Reservation ID is required"));
        }
        let key = self.key(
            caller,
            request.idempotency_key.as_deref(),
            "checkOut",
            &[reservation_id],
        );
        if let Some(outcome) = self.check_outs.get(&key) {
            tracing::info!(
                tenant_id = %caller.tenant_id,
                reservation_id,
                key,
                "check-out replayed"
            );
            return Ok(outcome);
        }

        let (reservation, folio) = self
            .refused(caller, reservation_id, "perform_check_out", async {
                let reservation = self.reservations.get(caller, reservation_id).await?;
                let folio = self
                    .folios
                    .find_by_reservation(&caller.tenant_id, reservation_id)
                    .await
                    .map_err(DeskError::from)?;
                if let Some(folio) = &folio {
                    let balance = folio.balance();
                    if balance > 0 {
                        return Err(DeskError::business_rule(
                            "FOLIO_BALANCE_MUST_BE_ZERO",
                            format!(
                                "Outstanding balance of {balance}. Please settle before checkout."
                            ),
                        ));
                    }
                }
                self.reservations
                    .preflight(
                        caller,
                        reservation_id,
                        ReservationStatus::CheckedOut,
                        reservation.version,
                    )
                    .await?;
                let folio = match folio {
                    Some(folio) if folio.is_open() => Some(
                        self.folios
                            .close_folio(&caller.tenant_id, &folio.id)
                            .await
                            .map_err(DeskError::from)?,
                    ),
                    other => other,
                };
                Ok((reservation, folio))
            })
            .await?;

        let room_release = self
            .release_room(caller, &reservation, "perform_check_out")
            .await;

        let reservation = self
            .after_primary(
                caller,
                reservation_id,
                "check_out_reservation",
                self.reservations
                    .check_out(caller, reservation_id, reservation.version, None),
            )
            .await?;

        tracing::info!(
            tenant_id = %caller.tenant_id,
            reservation_id,
            room_released = !room_release.is_failed(),
            "check-out completed"
        );
        let outcome = CheckOutOutcome {
            reservation,
            folio,
            room_release,
        };
        self.check_outs.put(key, outcome.clone());
        Ok(outcome)
    }

    /// Move a checked-in guest to another room, then follow with the reservation
    ///
    /// The room transfer is the primary step; a reservation that cannot be
    /// re-pointed afterwards is reported as a workflow error.
    pub async fn transfer_room(
        &self,
        caller: &Caller,
        request: &TransferRequest,
    ) -> DeskResult<RoomMoveOutcome> {
        let moved = self.rooms.transfer(caller, request).await?;

        let reservations = &self.reservations;
        let reservation_id = request.reservation_id.as_str();
        let to_room_id = moved.to_room.id.as_str();
        let reservation = self
            .after_primary(
                caller,
                reservation_id,
                "reassign_reservation",
                with_retry(&self.retry, move || async move {
                    let current = reservations.get(caller, reservation_id).await?;
                    reservations
                        .move_room(caller, reservation_id, to_room_id, current.version)
                        .await
                }),
            )
            .await?;

        tracing::info!(
            tenant_id = %caller.tenant_id,
            reservation_id,
            from_room_id = %moved.from_room.id,
            to_room_id,
            "room transfer completed"
        );
        Ok(RoomMoveOutcome {
            reservation,
            from_room: moved.from_room,
            to_room: moved.to_room,
        })
    }

    /// Cancel, then release any held room on a best-effort basis
    pub async fn cancel_reservation(
        &self,
        caller: &Caller,
        reservation_id: &str,
        expected_version: u64,
        reason: Option<&str>,
    ) -> DeskResult<TerminalOutcome> {
        self.terminate(
            caller,
            reservation_id,
            ReservationStatus::Cancelled,
            expected_version,
            reason,
            "cancel",
        )
        .await
    }

    pub async fn mark_no_show(
        &self,
        caller: &Caller,
        reservation_id: &str,
        expected_version: u64,
        reason: Option<&str>,
    ) -> DeskResult<TerminalOutcome> {
        self.terminate(
            caller,
            reservation_id,
            ReservationStatus::NoShow,
            expected_version,
            reason,
            "mark_no_show",
        )
        .await
    }

    async fn terminate(
        &self,
        caller: &Caller,
        reservation_id: &str,
        target: ReservationStatus,
        expected_version: u64,
        reason: Option<&str>,
        operation: &str,
    ) -> DeskResult<TerminalOutcome> {
        let (held, reservation) = self
            .reservations
            .close(
                caller,
                reservation_id,
                target,
                expected_version,
                reason,
                operation,
            )
            .await?;
        let room_release = self.release_room(caller, &held, operation).await;
        Ok(TerminalOutcome {
            reservation,
            room_release,
        })
    }

    /// Release the room `reservation` holds, never failing the caller
    async fn release_room(
        &self,
        caller: &Caller,
        reservation: &Reservation,
        operation: &str,
    ) -> RoomRelease {
        let Some(room_id) = reservation.room_id.as_deref() else {
            return RoomRelease::NotAssigned;
        };
        let rooms = &self.rooms;
        let reservation_id = reservation.id.as_str();
        let result = with_retry(&self.retry, move || async move {
            let room = rooms.get(caller, room_id).await?;
            if !room.is_occupied() {
                return Ok(None);
            }
            if room.current_reservation_id.as_deref() != Some(reservation_id) {
                return Err(DeskError::business_rule(
                    "ROOM_HELD_BY_ANOTHER_RESERVATION",
                    format!(
                        "Room {} is occupied by another reservation",
                        room.room_number
                    ),
                ));
            }
            rooms.release(caller, room_id, room.version).await.map(Some)
        })
        .await;

        match result {
            Ok(Some(room)) => RoomRelease::Released(room),
            Ok(None) => {
                tracing::info!(
                    tenant_id = %caller.tenant_id,
                    reservation_id,
                    room_id,
                    operation,
                    "room not occupied; nothing to release"
                );
                RoomRelease::NotAssigned
            }
            Err(err) => {
                tracing::error!(
                    tenant_id = %caller.tenant_id,
                    reservation_id,
                    room_id,
                    operation,
                    actor = %caller.actor_id,
                    code = err.code(),
                    error = %err,
                    timestamp = %self.clock.utc_now(),
                    "room release failed; reservation outcome stands and the room needs manual reconciliation"
                );
                RoomRelease::Failed {
                    room_id: room_id.to_string(),
                    code: err.code(),
                    error: err.to_string(),
                }
            }
        }
    }

    /// Tenant-scoped replay key; derived from the ids when none is supplied
    fn key(
        &self,
        caller: &Caller,
        supplied: Option<&str>,
        operation: &str,
        parts: &[&str],
    ) -> String {
        match supplied.map(str::trim).filter(|key| !key.is_empty()) {
            Some(key) => format!("{}:{key}", caller.tenant_id),
            None => idempotency_key(operation, &caller.tenant_id, parts),
        }
    }

    /// Audit a refusal that happened before anything changed
    async fn refused<T, Fut>(
        &self,
        caller: &Caller,
        reservation_id: &str,
        operation: &str,
        work: Fut,
    ) -> DeskResult<T>
    where
        Fut: Future<Output = DeskResult<T>>,
    {
        let result = work.await;
        if let Err(err) = &result {
            tracing::warn!(
                tenant_id = %caller.tenant_id,
                reservation_id,
                operation,
                actor = %caller.actor_id,
                code = err.code(),
                error = %err,
                "workflow refused"
            );
            self.trail
                .rejected(
                    caller,
                    Subject::new(Reservation::KIND, reservation_id),
                    operation,
                    err,
                )
                .await;
        }
        result
    }

    /// Wrap a failure after the reservation changed as a workflow error
    async fn after_primary<T, Fut>(
        &self,
        caller: &Caller,
        reservation_id: &str,
        step: &'static str,
        work: Fut,
    ) -> DeskResult<T>
    where
        Fut: Future<Output = DeskResult<T>>,
    {
        match work.await {
            Ok(value) => Ok(value),
            Err(source) => {
                tracing::error!(
                    tenant_id = %caller.tenant_id,
                    reservation_id,
                    step,
                    actor = %caller.actor_id,
                    code = source.code(),
                    error = %source,
                    timestamp = %self.clock.utc_now(),
                    "workflow step failed after the reservation changed; earlier steps stand"
                );
                let err = DeskError::workflow(step, source);
                self.trail
                    .failed_operation(
                        caller,
                        Subject::new(Reservation::KIND, reservation_id),
                        step,
                        &err,
                    )
                    .await;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
