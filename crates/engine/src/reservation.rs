// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reservation lifecycle service
//!
//! Writes rely on the version compare-and-set alone; two callers validated
//! against the same version cannot both land. Terminal reservations refuse
//! every change.

use chrono::NaiveDate;
use fd_adapters::GuestDirectory;
use fd_core::reservation::nights_between;
use fd_core::tenant::ensure_same_tenant;
use fd_core::{
    check_version, next_version, Amount, Caller, Clock, DeskError, DeskResult, IdGen,
    NewReservation, Reservation, ReservationMachine, ReservationPatch, ReservationStatus,
    StateMachine, TenantScoped,
};
use fd_storage::{AuditStore, AuditTrail, Repository, Subject};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;

/// Arguments for moving a confirmed reservation into a room
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub room_id: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub expected_version: u64,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Clone)]
pub struct ReservationService<V, G, A, C, I>
where
    A: AuditStore,
    C: Clock,
{
    reservations: V,
    guests: G,
    trail: AuditTrail<A, C>,
    clock: C,
    ids: I,
}

impl<V, G, A, C, I> ReservationService<V, G, A, C, I>
where
    V: Repository<Reservation>,
    G: GuestDirectory,
    A: AuditStore,
    C: Clock,
    I: IdGen,
{
    pub fn new(reservations: V, guests: G, trail: AuditTrail<A, C>, clock: C, ids: I) -> Self {
        Self {
            reservations,
            guests,
            trail,
            clock,
            ids,
        }
    }

    pub fn trail(&self) -> &AuditTrail<A, C> {
        &self.trail
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub async fn create(&self, caller: &Caller, new: NewReservation) -> DeskResult<Reservation> {
        let result = self.create_inner(caller, new).await;
        if let Err(err) = &result {
            tracing::warn!(
                tenant_id = %caller.tenant_id,
                code = err.code(),
                error = %err,
                "reservation creation refused"
            );
        }
        result
    }

    async fn create_inner(&self, caller: &Caller, new: NewReservation) -> DeskResult<Reservation> {
        caller.require_actor()?;
        if new.guest_id.trim().is_empty() {
            return Err(DeskError::validation("Guest ID is required"));
        }
        let today = self.clock.utc_now().date_naive();
        if new.check_in_date < today {
            return Err(DeskError::validation("Check-in date cannot be in the past"));
        }
        let nights = stay_nights(new.check_in_date, new.check_out_date)?;
        if new.adults < 1 {
            return Err(DeskError::validation(
                "Reservation must have at least 1 adult",
            ));
        }
        let total_amount = stay_total(nights, new.room_rate)?;
        let status = match new.status {
            None => ReservationStatus::Confirmed,
            Some(status @ (ReservationStatus::Inquiry | ReservationStatus::Confirmed)) => status,
            Some(other) => {
                return Err(DeskError::validation(format!(
                    "A new reservation starts as inquiry or confirmed, not \"{other}\""
                )))
            }
        };
        if !self.guests.exists(&caller.tenant_id, &new.guest_id).await? {
            return Err(DeskError::not_found("Guest", new.guest_id));
        }

        let now = self.clock.utc_now();
        let reservation = Reservation {
            id: self.ids.next("res"),
            tenant_id: caller.tenant_id.clone(),
            guest_id: new.guest_id,
            room_type: new.room_type,
            room_id: None,
            check_in_date: new.check_in_date,
            check_out_date: new.check_out_date,
            adults: new.adults,
            children: new.children,
            nights,
            room_rate: new.room_rate,
            total_amount,
            status,
            notes: new.notes,
            checked_in_at: None,
            checked_out_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        let reservation = self.reservations.insert(reservation).await?;
        self.trail
            .created(
                caller,
                Subject::new(Reservation::KIND, &reservation.id),
                &format!(
                    "Reservation for guest {}: {} to {} ({} night(s), {})",
                    reservation.guest_id,
                    reservation.check_in_date,
                    reservation.check_out_date,
                    reservation.nights,
                    reservation.status
                ),
            )
            .await;
        tracing::info!(
            tenant_id = %caller.tenant_id,
            reservation_id = %reservation.id,
            status = %reservation.status,
            "reservation created"
        );
        Ok(reservation)
    }

    pub async fn get(&self, caller: &Caller, reservation_id: &str) -> DeskResult<Reservation> {
        let reservation = self
            .reservations
            .get(&caller.tenant_id, reservation_id)
            .await?
            .ok_or_else(|| DeskError::not_found(Reservation::KIND, reservation_id))?;
        ensure_same_tenant(&reservation, &caller.tenant_id)?;
        Ok(reservation)
    }

    /// Every reservation of the caller's tenant, by arrival date
    pub async fn list(&self, caller: &Caller) -> DeskResult<Vec<Reservation>> {
        let mut reservations = self.reservations.list_by_tenant(&caller.tenant_id).await?;
        reservations.sort_by(|a, b| {
            a.check_in_date
                .cmp(&b.check_in_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(reservations)
    }

    /// Load and validate a move to `target` without writing anything
    pub async fn preflight(
        &self,
        caller: &Caller,
        reservation_id: &str,
        target: ReservationStatus,
        expected_version: u64,
    ) -> DeskResult<Reservation> {
        caller.require_actor()?;
        let reservation = self.get(caller, reservation_id).await?;
        check_version(&reservation, expected_version)?;
        ReservationMachine::ensure_mutable(reservation.status)?;
        ReservationMachine::validate_transition(reservation.status, target)?;
        Ok(reservation)
    }

    /// Inquiry to confirmed
    pub async fn confirm(
        &self,
        caller: &Caller,
        reservation_id: &str,
        expected_version: u64,
    ) -> DeskResult<Reservation> {
        self.audited(caller, reservation_id, "confirm", async {
            let reservation = self
                .preflight(
                    caller,
                    reservation_id,
                    ReservationStatus::Confirmed,
                    expected_version,
                )
                .await?;
            let saved = self
                .persist(&reservation, |next| {
                    next.status = ReservationStatus::Confirmed;
                })
                .await?;
            self.trail
                .status_change(
                    caller,
                    Subject::new(Reservation::KIND, reservation_id),
                    reservation.status.as_str(),
                    saved.status.as_str(),
                    None,
                )
                .await;
            Ok(saved)
        })
        .await
    }

    /// Change booking details; status moves go through the dedicated operations
    pub async fn update(
        &self,
        caller: &Caller,
        reservation_id: &str,
        patch: ReservationPatch,
        expected_version: u64,
    ) -> DeskResult<Reservation> {
        self.audited(caller, reservation_id, "update", async {
            caller.require_actor()?;
            if patch.is_empty() {
                return Err(DeskError::validation("No changes requested"));
            }
            let current = self.get(caller, reservation_id).await?;
            check_version(&current, expected_version)?;
            ReservationMachine::ensure_mutable(current.status)?;
            if let Some(status) = patch.status {
                ReservationMachine::validate_transition(current.status, status)?;
                if status != current.status {
                    return Err(DeskError::business_rule(
                        "STATUS_CHANGE_REQUIRES_OPERATION",
                        format!(
                            "Reservation status \"{}\" must be reached through its own operation, not an update",
                            status
                        ),
                    ));
                }
            }

            let mut next = next_version(&current);
            let mut changes: Vec<(&'static str, String, String)> = Vec::new();

            if let Some(guest_id) = patch.guest_id {
                if guest_id != current.guest_id {
                    if !self.guests.exists(&caller.tenant_id, &guest_id).await? {
                        return Err(DeskError::not_found("Guest", guest_id));
                    }
                    changes.push(("guest_id", current.guest_id.clone(), guest_id.clone()));
                    next.guest_id = guest_id;
                }
            }
            if let Some(room_type) = patch.room_type {
                if room_type != current.room_type {
                    changes.push(("room_type", current.room_type.clone(), room_type.clone()));
                    next.room_type = room_type;
                }
            }
            if let Some(room_id) = patch.room_id {
                if room_id.trim().is_empty() {
                    return Err(DeskError::validation("Room ID cannot be blank"));
                }
                if current.room_id.as_deref() != Some(room_id.as_str()) {
                    if current.status == ReservationStatus::CheckedIn {
                        return Err(DeskError::business_rule(
                            "ROOM_CHANGE_REQUIRES_TRANSFER",
                            "A checked-in reservation changes rooms through a room transfer",
                        ));
                    }
                    changes.push((
                        "room_id",
                        describe(current.room_id.as_deref()),
                        room_id.clone(),
                    ));
                    next.room_id = Some(room_id);
                }
            }
            let check_in_date = patch.check_in_date.unwrap_or(current.check_in_date);
            let check_out_date = patch.check_out_date.unwrap_or(current.check_out_date);
            if check_in_date != current.check_in_date || check_out_date != current.check_out_date {
                next.nights = stay_nights(check_in_date, check_out_date)?;
                if check_in_date != current.check_in_date {
                    changes.push((
                        "check_in_date",
                        current.check_in_date.to_string(),
                        check_in_date.to_string(),
                    ));
                }
                if check_out_date != current.check_out_date {
                    changes.push((
                        "check_out_date",
                        current.check_out_date.to_string(),
                        check_out_date.to_string(),
                    ));
                }
                next.check_in_date = check_in_date;
                next.check_out_date = check_out_date;
            }
            if let Some(adults) = patch.adults {
                if adults < 1 {
                    return Err(DeskError::validation(
                        "Reservation must have at least 1 adult",
                    ));
                }
                if adults != current.adults {
                    changes.push(("adults", current.adults.to_string(), adults.to_string()));
                    next.adults = adults;
                }
            }
            if let Some(children) = patch.children {
                if children != current.children {
                    changes.push((
                        "children",
                        current.children.to_string(),
                        children.to_string(),
                    ));
                    next.children = children;
                }
            }
            if let Some(rate) = patch.room_rate {
                if rate != current.room_rate {
                    changes.push(("room_rate", current.room_rate.to_string(), rate.to_string()));
                    next.room_rate = rate;
                }
            }
            if let Some(notes) = patch.notes {
                if current.notes.as_deref() != Some(notes.as_str()) {
                    changes.push(("notes", describe(current.notes.as_deref()), notes.clone()));
                    next.notes = Some(notes);
                }
            }
            next.total_amount = stay_total(next.nights, next.room_rate)?;
            if next.total_amount != current.total_amount {
                changes.push((
                    "total_amount",
                    current.total_amount.to_string(),
                    next.total_amount.to_string(),
                ));
            }
            if changes.is_empty() {
                return Err(DeskError::validation("No changes requested"));
            }
            next.updated_at = self.clock.utc_now();

            let saved = self.reservations.save(next, current.version).await?;
            let fields: Vec<&str> = changes.iter().map(|(field, _, _)| *field).collect();
            let previous: Vec<&str> = changes.iter().map(|(_, old, _)| old.as_str()).collect();
            let new: Vec<&str> = changes.iter().map(|(_, _, new)| new.as_str()).collect();
            self.trail
                .field_update(
                    caller,
                    Subject::new(Reservation::KIND, reservation_id),
                    &fields.join(","),
                    &previous.join("; "),
                    &new.join("; "),
                )
                .await;
            tracing::info!(
                tenant_id = %caller.tenant_id,
                reservation_id,
                fields = %fields.join(","),
                version = saved.version,
                "reservation updated"
            );
            Ok(saved)
        })
        .await
    }

    /// Confirmed to checked in; the room id is mandatory
    pub async fn check_in(
        &self,
        caller: &Caller,
        reservation_id: &str,
        request: CheckIn,
    ) -> DeskResult<Reservation> {
        self.audited(caller, reservation_id, "check_in", async {
            let actor = caller.require_actor()?.to_string();
            let reservation = self.get(caller, reservation_id).await?;
            check_version(&reservation, request.expected_version)?;
            ReservationMachine::ensure_can_check_in(reservation.status)?;
            let room_id = request.room_id.trim();
            if room_id.is_empty() {
                return Err(DeskError::validation("Room ID is required for check-in"));
            }

            let now = self.clock.utc_now();
            let saved = self
                .persist(&reservation, |next| {
                    next.status = ReservationStatus::CheckedIn;
                    next.room_id = Some(room_id.to_string());
                    next.checked_in_at = Some(now);
                    if let Some(notes) = request.notes.as_deref() {
                        let line = stamp("Check-in", &actor, notes, request.reason.as_deref());
                        next.notes = Some(append_note(next.notes.as_deref(), &line));
                    }
                })
                .await?;
            self.trail
                .status_change_with(
                    caller,
                    Subject::new(Reservation::KIND, reservation_id),
                    reservation.status.as_str(),
                    saved.status.as_str(),
                    request.reason.as_deref(),
                    json!({ "room_id": room_id }),
                )
                .await;
            tracing::info!(
                tenant_id = %caller.tenant_id,
                reservation_id,
                room_id,
                version = saved.version,
                "reservation checked in"
            );
            Ok(saved)
        })
        .await
    }

    pub async fn check_out(
        &self,
        caller: &Caller,
        reservation_id: &str,
        expected_version: u64,
        reason: Option<&str>,
    ) -> DeskResult<Reservation> {
        self.close(
            caller,
            reservation_id,
            ReservationStatus::CheckedOut,
            expected_version,
            reason,
            "check_out",
        )
        .await
        .map(|(_, closed)| closed)
    }

    pub async fn cancel(
        &self,
        caller: &Caller,
        reservation_id: &str,
        expected_version: u64,
        reason: Option<&str>,
    ) -> DeskResult<Reservation> {
        self.close(
            caller,
            reservation_id,
            ReservationStatus::Cancelled,
            expected_version,
            reason,
            "cancel",
        )
        .await
        .map(|(_, closed)| closed)
    }

    /// Confirmed to no-show; any other status is refused
    pub async fn mark_no_show(
        &self,
        caller: &Caller,
        reservation_id: &str,
        expected_version: u64,
        reason: Option<&str>,
    ) -> DeskResult<Reservation> {
        self.close(
            caller,
            reservation_id,
            ReservationStatus::NoShow,
            expected_version,
            reason,
            "mark_no_show",
        )
        .await
        .map(|(_, closed)| closed)
    }

    /// Point a checked-in reservation at the room its guest moved to
    ///
    /// Not audited as a refusal: the transfer that calls it records the
    /// failure against the reservation.
    pub(crate) async fn move_room(
        &self,
        caller: &Caller,
        reservation_id: &str,
        to_room_id: &str,
        expected_version: u64,
    ) -> DeskResult<Reservation> {
        let current = self.get(caller, reservation_id).await?;
        check_version(&current, expected_version)?;
        if current.status != ReservationStatus::CheckedIn {
            return Err(DeskError::business_rule(
                "ROOM_CHANGE_REQUIRES_CHECK_IN",
                format!(
                    "Only a checked-in reservation moves with its guest, status is \"{}\"",
                    current.status
                ),
            ));
        }
        let previous = describe(current.room_id.as_deref());
        let saved = self
            .persist(&current, |next| next.room_id = Some(to_room_id.to_string()))
            .await?;
        self.trail
            .field_update(
                caller,
                Subject::new(Reservation::KIND, reservation_id),
                "room_id",
                &previous,
                to_room_id,
            )
            .await;
        tracing::info!(
            tenant_id = %caller.tenant_id,
            reservation_id,
            from_room_id = %previous,
            to_room_id,
            version = saved.version,
            "reservation moved rooms"
        );
        Ok(saved)
    }

    /// Move into a terminal status, dropping the room reference
    ///
    /// Returns the reservation as it was validated alongside the stored
    /// result, so callers can still see the room it held.
    pub(crate) async fn close(
        &self,
        caller: &Caller,
        reservation_id: &str,
        target: ReservationStatus,
        expected_version: u64,
        reason: Option<&str>,
        operation: &str,
    ) -> DeskResult<(Reservation, Reservation)> {
        self.audited(caller, reservation_id, operation, async {
            let reservation = self
                .preflight(caller, reservation_id, target, expected_version)
                .await?;
            let actor = caller.actor_id.trim().to_string();
            let now = self.clock.utc_now();
            let saved = self
                .persist(&reservation, |next| {
                    next.status = target;
                    next.room_id = None;
                    match target {
                        ReservationStatus::CheckedOut => next.checked_out_at = Some(now),
                        ReservationStatus::Cancelled => {
                            next.cancelled_at = Some(now);
                            next.cancellation_reason = Some(
                                reason
                                    .map(str::to_string)
                                    .unwrap_or_else(|| format!("Cancelled by {actor}")),
                            );
                            let line = stamp(
                                "Cancelled",
                                &actor,
                                reason.unwrap_or("No reason provided"),
                                None,
                            );
                            next.notes = Some(append_note(next.notes.as_deref(), &line));
                        }
                        _ => {}
                    }
                })
                .await?;
            self.trail
                .status_change_with(
                    caller,
                    Subject::new(Reservation::KIND, reservation_id),
                    reservation.status.as_str(),
                    target.as_str(),
                    reason,
                    json!({ "previous_room_id": reservation.room_id }),
                )
                .await;
            tracing::info!(
                tenant_id = %caller.tenant_id,
                reservation_id,
                status = %target,
                previous_room_id = ?reservation.room_id,
                version = saved.version,
                "reservation closed"
            );
            Ok((reservation, saved))
        })
        .await
    }

    async fn persist(
        &self,
        reservation: &Reservation,
        apply: impl FnOnce(&mut Reservation),
    ) -> DeskResult<Reservation> {
        let mut next = next_version(reservation);
        apply(&mut next);
        next.updated_at = self.clock.utc_now();
        Ok(self.reservations.save(next, reservation.version).await?)
    }

    async fn audited<T, Fut>(
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
                "reservation operation refused"
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
}

fn stay_nights(check_in: NaiveDate, check_out: NaiveDate) -> DeskResult<u32> {
    let nights = nights_between(check_in, check_out);
    if nights < 1 {
        return Err(DeskError::validation(
            "Check-out date must be after check-in date",
        ));
    }
    u32::try_from(nights).map_err(|_| DeskError::validation("Stay is too long"))
}

fn stay_total(nights: u32, rate: Amount) -> DeskResult<Amount> {
    if rate < 0 {
        return Err(DeskError::validation("Room rate cannot be negative"));
    }
    rate.checked_mul(Amount::from(nights))
        .ok_or_else(|| DeskError::validation("Reservation total is out of range"))
}

fn stamp(what: &str, actor: &str, text: &str, reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("[{what} by {actor}] {text} (Reason: {reason})"),
        None => format!("[{what} by {actor}] {text}"),
    }
}

fn append_note(existing: Option<&str>, line: &str) -> String {
    match existing {
        Some(existing) if !existing.is_empty() => format!("{existing}\n{line}"),
        _ => line.to_string(),
    }
}

fn describe(value: Option<&str>) -> String {
    value.unwrap_or("none").to_string()
}

#[cfg(test)]
#[path = "reservation_tests.rs"]
mod tests;
