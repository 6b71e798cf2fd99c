// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Room lifecycle service
//!
//! Every write runs under the room's mutex entry and in the same order:
//! resolve within the tenant, check the expected version, validate the
//! transition, apply, then compare-and-set. Each call leaves exactly one audit
//! entry per room it names, whether it succeeded or was refused.

use fd_adapters::GuestDirectory;
use fd_core::tenant::ensure_same_tenant;
use fd_core::{
    check_version, next_version, require_permission, Amount, Caller, Clock, DeskError,
    DeskResult, IdGen, Locker, NewRoom, Operation, ResourceMutex, Room, RoomMachine, RoomStatus,
    StateMachine, TenantScoped,
};
use fd_storage::{AuditStore, AuditTrail, Repository, Subject};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::future::Future;

/// Move a checked-in reservation from one room to another
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from_room_id: String,
    pub to_room_id: String,
    pub reservation_id: String,
    #[serde(default)]
    pub reason: Option<String>,
    pub from_expected_version: u64,
    pub to_expected_version: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    pub from_room: Room,
    pub to_room: Room,
}

/// Per-room result of a bulk status update
#[derive(Debug)]
pub struct RoomStatusResult {
    pub room_id: String,
    pub result: DeskResult<Room>,
}

#[derive(Clone)]
pub struct RoomService<R, G, A, L, C, I>
where
    A: AuditStore,
    L: Locker,
    C: Clock,
{
    rooms: R,
    guests: G,
    trail: AuditTrail<A, C>,
    mutex: ResourceMutex<L>,
    clock: C,
    ids: I,
}

impl<R, G, A, L, C, I> RoomService<R, G, A, L, C, I>
where
    R: Repository<Room>,
    G: GuestDirectory,
    A: AuditStore,
    L: Locker,
    C: Clock,
    I: IdGen,
{
    pub fn new(
        rooms: R,
        guests: G,
        trail: AuditTrail<A, C>,
        mutex: ResourceMutex<L>,
        clock: C,
        ids: I,
    ) -> Self {
        Self {
            rooms,
            guests,
            trail,
            mutex,
            clock,
            ids,
        }
    }

    pub fn trail(&self) -> &AuditTrail<A, C> {
        &self.trail
    }

    pub fn mutex(&self) -> &ResourceMutex<L> {
        &self.mutex
    }

    pub async fn create(&self, caller: &Caller, new: NewRoom) -> DeskResult<Room> {
        let result = self.create_inner(caller, new).await;
        if let Err(err) = &result {
            tracing::warn!(
                tenant_id = %caller.tenant_id,
                code = err.code(),
                error = %err,
                "room creation refused"
            );
        }
        result
    }

    async fn create_inner(&self, caller: &Caller, new: NewRoom) -> DeskResult<Room> {
        caller.require_actor()?;
        let number = new.room_number.trim().to_string();
        if number.is_empty() {
            return Err(DeskError::validation("Room number is required"));
        }
        if new.status == Some(RoomStatus::Occupied) {
            return Err(DeskError::validation(
                "A new room cannot start occupied; assign a guest instead",
            ));
        }

        let _guard = self
            .mutex
            .lock(&caller.tenant_id, &format!("number:{number}"), "create")?;
        let existing = self.rooms.list_by_tenant(&caller.tenant_id).await?;
        if existing.iter().any(|room| room.room_number == number) {
            return Err(DeskError::validation(format!(
                "Room number {number} already exists"
            )));
        }

        let new = NewRoom {
            room_number: number,
            ..new
        };
        let room = Room::new(
            self.ids.next("room"),
            caller.tenant_id.clone(),
            new,
            self.clock.utc_now(),
        );
        let room = self.rooms.insert(room).await?;
        self.trail
            .created(
                caller,
                Subject::new(Room::KIND, &room.id),
                &format!("Room {} ({})", room.room_number, room.status),
            )
            .await;
        tracing::info!(
            tenant_id = %caller.tenant_id,
            room_id = %room.id,
            room_number = %room.room_number,
            "room created"
        );
        Ok(room)
    }

    pub async fn get(&self, caller: &Caller, room_id: &str) -> DeskResult<Room> {
        let room = self
            .rooms
            .get(&caller.tenant_id, room_id)
            .await?
            .ok_or_else(|| DeskError::not_found(Room::KIND, room_id))?;
        ensure_same_tenant(&room, &caller.tenant_id)?;
        Ok(room)
    }

    pub async fn get_by_number(&self, caller: &Caller, room_number: &str) -> DeskResult<Room> {
        self.rooms
            .list_by_tenant(&caller.tenant_id)
            .await?
            .into_iter()
            .find(|room| room.room_number == room_number)
            .ok_or_else(|| DeskError::not_found(Room::KIND, room_number))
    }

    /// Every room of the caller's tenant, ordered by room number
    pub async fn list(&self, caller: &Caller) -> DeskResult<Vec<Room>> {
        let mut rooms = self.rooms.list_by_tenant(&caller.tenant_id).await?;
        rooms.sort_by(|a, b| a.room_number.cmp(&b.room_number));
        Ok(rooms)
    }

    pub async fn status_counts(&self, caller: &Caller) -> DeskResult<BTreeMap<RoomStatus, usize>> {
        let mut counts = BTreeMap::new();
        for room in self.rooms.list_by_tenant(&caller.tenant_id).await? {
            *counts.entry(room.status).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Change status; occupying a room goes through [`Self::assign_to_guest`]
    pub async fn update_status(
        &self,
        caller: &Caller,
        room_id: &str,
        status: RoomStatus,
        expected_version: u64,
        reason: Option<&str>,
    ) -> DeskResult<Room> {
        self.audited(caller, &[room_id], "update_status", async {
            self.change_status(
                caller,
                room_id,
                status,
                expected_version,
                reason,
                "update_status",
                |_| Ok(()),
            )
            .await
        })
        .await
    }

    /// Change status to a target given by name
    ///
    /// A name outside the room status set is refused with the same
    /// transition error as an illegal move, listing the allowed targets.
    pub async fn request_status(
        &self,
        caller: &Caller,
        room_id: &str,
        status: &str,
        expected_version: u64,
        reason: Option<&str>,
    ) -> DeskResult<Room> {
        self.audited(caller, &[room_id], "update_status", async {
            caller.require_actor()?;
            let room = self.get(caller, room_id).await?;
            check_version(&room, expected_version)?;
            let target = RoomMachine::validate_named_transition(room.status, status)?;
            self.change_status(
                caller,
                room_id,
                target,
                expected_version,
                reason,
                "update_status",
                |_| Ok(()),
            )
            .await
        })
        .await
    }

    pub async fn assign_to_guest(
        &self,
        caller: &Caller,
        room_id: &str,
        guest_id: &str,
        reservation_id: &str,
        expected_version: u64,
    ) -> DeskResult<Room> {
        self.audited(caller, &[room_id], "assign_to_guest", async {
            caller.require_actor()?;
            if guest_id.trim().is_empty() {
                return Err(DeskError::validation("Guest ID is required for assignment"));
            }
            if reservation_id.trim().is_empty() {
                return Err(DeskError::validation(
                    "Reservation ID is required for assignment",
                ));
            }
            let _guard = self
                .mutex
                .lock(&caller.tenant_id, room_id, "assign_to_guest")?;
            let room = self.get(caller, room_id).await?;
            check_version(&room, expected_version)?;
            room.ensure_assignable()?;
            RoomMachine::validate_transition(room.status, RoomStatus::Occupied)?;
            if !self.guests.exists(&caller.tenant_id, guest_id).await? {
                return Err(DeskError::not_found("Guest", guest_id));
            }

            let saved = self
                .persist(&room, |next| {
                    next.status = RoomStatus::Occupied;
                    next.current_guest_id = Some(guest_id.to_string());
                    next.current_reservation_id = Some(reservation_id.to_string());
                })
                .await?;
            self.trail
                .assignment(
                    caller,
                    Subject::new(Room::KIND, room_id),
                    guest_id,
                    reservation_id,
                )
                .await;
            tracing::info!(
                tenant_id = %caller.tenant_id,
                room_id,
                guest_id,
                reservation_id,
                version = saved.version,
                "room assigned"
            );
            Ok(saved)
        })
        .await
    }

    /// Vacate an occupied room; it becomes dirty
    pub async fn release(
        &self,
        caller: &Caller,
        room_id: &str,
        expected_version: u64,
    ) -> DeskResult<Room> {
        self.audited(caller, &[room_id], "release", async {
            caller.require_actor()?;
            let _guard = self.mutex.lock(&caller.tenant_id, room_id, "release")?;
            let room = self.get(caller, room_id).await?;
            check_version(&room, expected_version)?;
            if !room.is_occupied() {
                return Err(DeskError::business_rule(
                    "INVALID_STATUS_FOR_RELEASE",
                    format!(
                        "Cannot release room {} with status \"{}\". Only occupied rooms can be released.",
                        room.room_number, room.status
                    ),
                ));
            }
            RoomMachine::validate_transition(room.status, RoomStatus::Dirty)?;

            let saved = self
                .persist(&room, |next| {
                    next.status = RoomStatus::Dirty;
                    next.clear_guest_unless_occupied();
                })
                .await?;
            self.trail
                .release(
                    caller,
                    Subject::new(Room::KIND, room_id),
                    room.current_guest_id.as_deref(),
                    room.current_reservation_id.as_deref(),
                )
                .await;
            tracing::info!(
                tenant_id = %caller.tenant_id,
                room_id,
                version = saved.version,
                "room released"
            );
            Ok(saved)
        })
        .await
    }

    /// Move a guest between rooms under both room locks
    pub async fn transfer(
        &self,
        caller: &Caller,
        request: &TransferRequest,
    ) -> DeskResult<TransferOutcome> {
        let ids = [request.from_room_id.as_str(), request.to_room_id.as_str()];
        self.audited(caller, &ids, "transfer", async {
            caller.require_actor()?;
            if request.from_room_id == request.to_room_id {
                return Err(DeskError::validation(
                    "Source and destination rooms must differ",
                ));
            }
            if request.reservation_id.trim().is_empty() {
                return Err(DeskError::validation("Reservation ID is required for transfer"));
            }
            let _guards = self.mutex.lock_all(&caller.tenant_id, &ids, "transfer")?;

            let from = self.get(caller, &request.from_room_id).await?;
            let to = self.get(caller, &request.to_room_id).await?;
            check_version(&from, request.from_expected_version)?;
            check_version(&to, request.to_expected_version)?;
            if !from.is_occupied()
                || from.current_reservation_id.as_deref() != Some(request.reservation_id.as_str())
            {
                return Err(DeskError::business_rule(
                    "INVALID_TRANSFER_SOURCE",
                    format!(
                        "Source room {} is not occupied by this reservation",
                        from.room_number
                    ),
                ));
            }
            if to.status != RoomStatus::Available {
                return Err(DeskError::business_rule(
                    "DESTINATION_ROOM_NOT_AVAILABLE",
                    format!(
                        "Destination room {} is not available (status: {})",
                        to.room_number, to.status
                    ),
                ));
            }
            RoomMachine::validate_transition(from.status, RoomStatus::Dirty)?;
            RoomMachine::validate_transition(to.status, RoomStatus::Occupied)?;

            let guest_id = from.current_guest_id.clone();
            let from_room = self
                .persist(&from, |next| {
                    next.status = RoomStatus::Dirty;
                    next.clear_guest_unless_occupied();
                })
                .await?;
            let to_room = self
                .persist(&to, |next| {
                    next.status = RoomStatus::Occupied;
                    next.current_guest_id = guest_id.clone();
                    next.current_reservation_id = Some(request.reservation_id.clone());
                })
                .await?;

            let details = json!({
                "from_room_id": from.id,
                "to_room_id": to.id,
                "reservation_id": request.reservation_id,
                "guest_id": guest_id,
                "reason": request.reason,
            });
            let previous = format!("Room {}", from.room_number);
            let new = format!("Room {}", to.room_number);
            for room_id in ids {
                self.trail
                    .transfer(
                        caller,
                        Subject::new(Room::KIND, room_id),
                        &previous,
                        &new,
                        details.clone(),
                    )
                    .await;
            }
            tracing::info!(
                tenant_id = %caller.tenant_id,
                from_room_id = %from.id,
                to_room_id = %to.id,
                reservation_id = %request.reservation_id,
                "room transferred"
            );
            Ok(TransferOutcome { from_room, to_room })
        })
        .await
    }

    pub async fn delete(
        &self,
        caller: &Caller,
        room_id: &str,
        expected_version: u64,
    ) -> DeskResult<Room> {
        self.audited(caller, &[room_id], "delete", async {
            caller.require_actor()?;
            require_permission(caller, Operation::RoomDelete)?;
            let _guard = self.mutex.lock(&caller.tenant_id, room_id, "delete")?;
            let room = self.get(caller, room_id).await?;
            check_version(&room, expected_version)?;
            if matches!(room.status, RoomStatus::Occupied | RoomStatus::Reserved) {
                return Err(DeskError::business_rule(
                    "ROOM_IN_USE",
                    "Cannot delete room that is occupied or reserved",
                ));
            }
            let removed = self
                .rooms
                .delete(&caller.tenant_id, room_id, expected_version)
                .await?;
            self.trail
                .deleted(
                    caller,
                    Subject::new(Room::KIND, room_id),
                    &format!("Room {}", removed.room_number),
                )
                .await;
            tracing::info!(tenant_id = %caller.tenant_id, room_id, "room deleted");
            Ok(removed)
        })
        .await
    }

    /// Apply one status to many rooms; each room succeeds or fails alone
    pub async fn bulk_update_status(
        &self,
        caller: &Caller,
        updates: &[(&str, u64)],
        status: RoomStatus,
        reason: Option<&str>,
    ) -> DeskResult<Vec<RoomStatusResult>> {
        let ids: Vec<&str> = updates.iter().map(|(id, _)| *id).collect();
        self.audited(caller, &ids, "bulk_update", async {
            caller.require_actor()?;
            require_permission(caller, Operation::RoomBulkUpdate)
        })
        .await?;

        let mut results = Vec::with_capacity(updates.len());
        for (room_id, expected_version) in updates {
            let result = self
                .update_status(caller, room_id, status, *expected_version, reason)
                .await;
            results.push(RoomStatusResult {
                room_id: room_id.to_string(),
                result,
            });
        }
        Ok(results)
    }

    /// Take a room out of service
    pub async fn block(
        &self,
        caller: &Caller,
        room_id: &str,
        expected_version: u64,
        reason: Option<&str>,
    ) -> DeskResult<Room> {
        self.audited(caller, &[room_id], "block", async {
            require_permission(caller, Operation::RoomBlock)?;
            self.change_status(
                caller,
                room_id,
                RoomStatus::OutOfService,
                expected_version,
                reason,
                "block",
                |_| Ok(()),
            )
            .await
        })
        .await
    }

    /// Pass an inspected room back into the available pool
    pub async fn approve_inspection(
        &self,
        caller: &Caller,
        room_id: &str,
        expected_version: u64,
    ) -> DeskResult<Room> {
        self.audited(caller, &[room_id], "approve_inspection", async {
            require_permission(caller, Operation::RoomInspectionApprove)?;
            self.change_status(
                caller,
                room_id,
                RoomStatus::Available,
                expected_version,
                Some("inspection approved"),
                "approve_inspection",
                |room| {
                    if room.status != RoomStatus::Inspecting {
                        return Err(DeskError::business_rule(
                            "INSPECTION_NOT_PENDING",
                            format!(
                                "Room {} is not awaiting inspection (status: {})",
                                room.room_number, room.status
                            ),
                        ));
                    }
                    Ok(())
                },
            )
            .await
        })
        .await
    }

    pub async fn schedule_maintenance(
        &self,
        caller: &Caller,
        room_id: &str,
        expected_version: u64,
        reason: Option<&str>,
    ) -> DeskResult<Room> {
        self.audited(caller, &[room_id], "schedule_maintenance", async {
            require_permission(caller, Operation::RoomMaintenanceSchedule)?;
            self.change_status(
                caller,
                room_id,
                RoomStatus::OutOfOrder,
                expected_version,
                reason,
                "schedule_maintenance",
                |_| Ok(()),
            )
            .await
        })
        .await
    }

    /// Set or clear the nightly rate override
    pub async fn set_rate_override(
        &self,
        caller: &Caller,
        room_id: &str,
        rate: Option<Amount>,
        expected_version: u64,
    ) -> DeskResult<Room> {
        self.audited(caller, &[room_id], "rate_override", async {
            caller.require_actor()?;
            require_permission(caller, Operation::RoomRateOverride)?;
            if let Some(rate) = rate {
                if rate <= 0 {
                    return Err(DeskError::validation(
                        "Rate override must be greater than zero",
                    ));
                }
            }
            let _guard = self
                .mutex
                .lock(&caller.tenant_id, room_id, "rate_override")?;
            let room = self.get(caller, room_id).await?;
            check_version(&room, expected_version)?;

            let saved = self.persist(&room, |next| next.rate_override = rate).await?;
            self.trail
                .field_update(
                    caller,
                    Subject::new(Room::KIND, room_id),
                    "rate_override",
                    &describe_rate(room.rate_override),
                    &describe_rate(rate),
                )
                .await;
            Ok(saved)
        })
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn change_status<P>(
        &self,
        caller: &Caller,
        room_id: &str,
        status: RoomStatus,
        expected_version: u64,
        reason: Option<&str>,
        operation: &str,
        precondition: P,
    ) -> DeskResult<Room>
    where
        P: FnOnce(&Room) -> DeskResult<()>,
    {
        caller.require_actor()?;
        let _guard = self.mutex.lock(&caller.tenant_id, room_id, operation)?;
        let room = self.get(caller, room_id).await?;
        check_version(&room, expected_version)?;
        if status == RoomStatus::Occupied && !room.is_occupied() {
            return Err(DeskError::validation(
                "A room becomes occupied only through guest assignment, which requires a guest and a reservation",
            ));
        }
        RoomMachine::validate_transition(room.status, status)?;
        precondition(&room)?;

        let saved = self
            .persist(&room, |next| {
                next.status = status;
                next.clear_guest_unless_occupied();
            })
            .await?;
        self.trail
            .status_change(
                caller,
                Subject::new(Room::KIND, room_id),
                room.status.as_str(),
                status.as_str(),
                reason,
            )
            .await;
        tracing::info!(
            tenant_id = %caller.tenant_id,
            room_id,
            from = %room.status,
            to = %status,
            version = saved.version,
            operation,
            "room status changed"
        );
        Ok(saved)
    }

    /// Write the next version of `room` with `apply` folded in
    async fn persist(&self, room: &Room, apply: impl FnOnce(&mut Room)) -> DeskResult<Room> {
        let mut next = next_version(room);
        apply(&mut next);
        next.updated_at = self.clock.utc_now();
        Ok(self.rooms.save(next, room.version).await?)
    }

    /// Record one rejection entry per named room when `work` fails
    async fn audited<T, Fut>(
        &self,
        caller: &Caller,
        room_ids: &[&str],
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
                ?room_ids,
                operation,
                actor = %caller.actor_id,
                code = err.code(),
                error = %err,
                "room operation refused"
            );
            let mut seen: Vec<&str> = Vec::with_capacity(room_ids.len());
            for room_id in room_ids {
                if seen.contains(room_id) {
                    continue;
                }
                seen.push(room_id);
                self.trail
                    .rejected(caller, Subject::new(Room::KIND, room_id), operation, err)
                    .await;
            }
        }
        result
    }
}

fn describe_rate(rate: Option<Amount>) -> String {
    match rate {
        Some(rate) => rate.to_string(),
        None => "none".to_string(),
    }
}

#[cfg(test)]
#[path = "room_tests.rs"]
mod tests;
