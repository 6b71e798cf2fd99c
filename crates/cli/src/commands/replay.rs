// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fdesk replay`: run a scenario against an in-memory desk

use crate::error::CliError;
use crate::output::{self, OutputFormat};
use crate::scenario::{Scenario, Step};
use anyhow::Result;
use clap::Args;
use fd_adapters::{FolioService, LedgerFolioService};
use fd_core::{
    Caller, DeskConfig, DeskError, DeskResult, FakeClock, NewReservation, NewRoom, Reservation,
    Room, SequentialIdGen, TenantId,
};
use fd_engine::{CheckInRequest, CheckOutRequest, MemoryDesk, RoomRelease, TransferRequest};
use fd_storage::AuditEntry;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

#[derive(Args)]
pub struct ReplayArgs {
    /// Scenario file (TOML)
    pub scenario: PathBuf,

    /// Desk configuration file (TOML); defaults apply when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

type ReplayDesk = MemoryDesk<LedgerFolioService<SequentialIdGen>, FakeClock, SequentialIdGen>;

pub async fn replay(args: ReplayArgs) -> Result<()> {
    let scenario = Scenario::load(&args.scenario)?;
    let config = match &args.config {
        Some(path) => DeskConfig::load(path).map_err(|e| CliError::invalid_config(path, e))?,
        None => DeskConfig::default(),
    };
    let report = run(&scenario, &config).await?;
    output::print(&report, args.format)
}

/// Seed the desk, run every step and collect the final state
pub async fn run(scenario: &Scenario, config: &DeskConfig) -> Result<ReplayReport, CliError> {
    let tenant = scenario.tenant_id().map_err(CliError::new)?;
    let clock = match scenario.now {
        Some(now) => FakeClock::starting_at(now),
        None => FakeClock::new(),
    };
    let ids = SequentialIdGen::new();
    let desk = MemoryDesk::new(config, LedgerFolioService::new(ids.clone()), clock, ids);
    for guest in &scenario.guests {
        desk.guests().register(&tenant, guest.clone());
    }

    let mut replay = Replay {
        desk,
        caller: Caller::new(tenant, scenario.actor.clone(), scenario.role),
        rooms: HashMap::new(),
        reservations: HashMap::new(),
    };
    replay.seed(scenario).await?;

    let mut steps = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        let result = replay.apply(step).await;
        if let Err(err) = &result {
            tracing::debug!(
                step = index + 1,
                action = step.action(),
                code = err.code(),
                "step failed"
            );
        }
        steps.push(StepReport::new(index + 1, step, result));
    }
    replay.report(steps).await
}

struct Replay {
    desk: ReplayDesk,
    caller: Caller,
    /// Room number to id
    rooms: HashMap<String, String>,
    /// Reservation ref to id
    reservations: HashMap<String, String>,
}

impl Replay {
    async fn seed(&mut self, scenario: &Scenario) -> Result<(), CliError> {
        for room in &scenario.rooms {
            let created = self
                .desk
                .rooms()
                .create(
                    &self.caller,
                    NewRoom {
                        room_number: room.number.clone(),
                        floor: room.floor,
                        room_type: room.room_type.clone(),
                        status: room.status,
                    },
                )
                .await
                .map_err(|e| CliError::seed_refused(&format!("room {}", room.number), e))?;
            self.rooms.insert(room.number.clone(), created.id);
        }

        for reservation in &scenario.reservations {
            let created = self
                .desk
                .reservations()
                .create(
                    &self.caller,
                    NewReservation {
                        guest_id: reservation.guest.clone(),
                        room_type: reservation.room_type.clone(),
                        check_in_date: reservation.check_in,
                        check_out_date: reservation.check_out,
                        adults: reservation.adults,
                        children: reservation.children,
                        room_rate: reservation.rate,
                        notes: None,
                        status: reservation.status,
                    },
                )
                .await
                .map_err(|e| {
                    CliError::seed_refused(&format!("reservation '{}'", reservation.reference), e)
                })?;
            self.reservations
                .insert(reservation.reference.clone(), created.id);
        }
        Ok(())
    }

    fn room_id(&self, number: &str) -> DeskResult<&str> {
        self.rooms
            .get(number)
            .map(String::as_str)
            .ok_or_else(|| DeskError::not_found("Room", number))
    }

    fn reservation_id(&self, reference: &str) -> DeskResult<&str> {
        self.reservations
            .get(reference)
            .map(String::as_str)
            .ok_or_else(|| DeskError::not_found("Reservation", reference))
    }

    /// Run one step with versions read fresh; the `Ok` value describes the result
    async fn apply(&self, step: &Step) -> DeskResult<String> {
        let caller = &self.caller;
        let workflow = self.desk.workflow();
        let rooms = self.desk.rooms();
        let reservations = self.desk.reservations();

        match step {
            Step::CheckIn {
                reservation,
                room,
                notes,
                key,
            } => {
                let outcome = workflow
                    .perform_check_in(
                        caller,
                        CheckInRequest {
                            reservation_id: self.reservation_id(reservation)?.to_string(),
                            room_id: self.room_id(room)?.to_string(),
                            notes: notes.clone(),
                            idempotency_key: key.clone(),
                        },
                    )
                    .await?;
                Ok(format!(
                    "{} checked in to room {}, folio {} balance {}",
                    outcome.reservation.id,
                    outcome.room.room_number,
                    outcome.folio.id,
                    outcome.folio.balance()
                ))
            }
            Step::CheckOut { reservation, key } => {
                let outcome = workflow
                    .perform_check_out(
                        caller,
                        CheckOutRequest {
                            reservation_id: self.reservation_id(reservation)?.to_string(),
                            idempotency_key: key.clone(),
                        },
                    )
                    .await?;
                Ok(format!(
                    "{} checked out, {}",
                    outcome.reservation.id,
                    describe_release(&outcome.room_release)
                ))
            }
            Step::Cancel {
                reservation,
                reason,
            } => {
                let id = self.reservation_id(reservation)?;
                let current = reservations.get(caller, id).await?;
                let outcome = workflow
                    .cancel_reservation(caller, id, current.version, reason.as_deref())
                    .await?;
                Ok(format!(
                    "{} cancelled, {}",
                    outcome.reservation.id,
                    describe_release(&outcome.room_release)
                ))
            }
            Step::NoShow {
                reservation,
                reason,
            } => {
                let id = self.reservation_id(reservation)?;
                let current = reservations.get(caller, id).await?;
                let outcome = workflow
                    .mark_no_show(caller, id, current.version, reason.as_deref())
                    .await?;
                Ok(format!(
                    "{} marked no-show, {}",
                    outcome.reservation.id,
                    describe_release(&outcome.room_release)
                ))
            }
            Step::RoomStatus {
                room,
                status,
                reason,
            } => {
                let id = self.room_id(room)?;
                let current = rooms.get(caller, id).await?;
                let updated = rooms
                    .request_status(caller, id, status, current.version, reason.as_deref())
                    .await?;
                Ok(format!(
                    "room {} {} -> {}",
                    updated.room_number, current.status, updated.status
                ))
            }
            Step::Block { room, reason } => {
                let id = self.room_id(room)?;
                let current = rooms.get(caller, id).await?;
                let updated = rooms
                    .block(caller, id, current.version, reason.as_deref())
                    .await?;
                Ok(format!(
                    "room {} {} -> {}",
                    updated.room_number, current.status, updated.status
                ))
            }
            Step::Payment {
                reservation,
                amount,
            } => {
                let id = self.reservation_id(reservation)?;
                let folios = workflow.folios();
                let folio = folios
                    .find_by_reservation(&caller.tenant_id, id)
                    .await?
                    .ok_or_else(|| {
                        DeskError::validation(format!("Reservation {id} has no folio"))
                    })?;
                let amount = amount.unwrap_or_else(|| folio.balance());
                let folio = folios
                    .post_payment(&caller.tenant_id, &folio.id, "Payment", amount)
                    .await?;
                Ok(format!(
                    "paid {} into folio {}, balance {}",
                    amount,
                    folio.id,
                    folio.balance()
                ))
            }
            Step::Transfer {
                reservation,
                from,
                to,
                reason,
            } => {
                let from_room = rooms.get(caller, self.room_id(from)?).await?;
                let to_room = rooms.get(caller, self.room_id(to)?).await?;
                let outcome = workflow
                    .transfer_room(
                        caller,
                        &TransferRequest {
                            from_room_id: from_room.id.clone(),
                            to_room_id: to_room.id.clone(),
                            reservation_id: self.reservation_id(reservation)?.to_string(),
                            reason: reason.clone(),
                            from_expected_version: from_room.version,
                            to_expected_version: to_room.version,
                        },
                    )
                    .await?;
                Ok(format!(
                    "{} moved from room {} to room {}",
                    outcome.reservation.id,
                    outcome.from_room.room_number,
                    outcome.to_room.room_number
                ))
            }
        }
    }

    async fn report(&self, steps: Vec<StepReport>) -> Result<ReplayReport, CliError> {
        let read = |e: DeskError| {
            CliError::new("Cannot read final desk state").with_context(e.to_string())
        };
        let rooms = self.desk.rooms().list(&self.caller).await.map_err(read)?;
        let reservations = self
            .desk
            .reservations()
            .list(&self.caller)
            .await
            .map_err(read)?;
        let audit = self
            .desk
            .trail()
            .export(&self.caller.tenant_id, None, None)
            .await
            .map_err(read)?;
        let references = self
            .reservations
            .iter()
            .map(|(reference, id)| (id.clone(), reference.clone()))
            .collect();
        Ok(ReplayReport {
            tenant: self.caller.tenant_id.clone(),
            steps,
            rooms,
            reservations,
            audit,
            references,
        })
    }
}

fn describe_release(release: &RoomRelease) -> String {
    match release {
        RoomRelease::Released(room) => {
            format!("room {} released ({})", room.room_number, room.status)
        }
        RoomRelease::NotAssigned => "no room held".to_string(),
        RoomRelease::Failed {
            room_id,
            code,
            error,
        } => format!("room {room_id} release failed ({code}): {error}"),
    }
}

#[derive(Debug, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub action: &'static str,
    pub target: String,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Ok {
        detail: String,
    },
    Error {
        code: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        rule: Option<&'static str>,
        message: String,
    },
}

impl StepReport {
    fn new(number: usize, step: &Step, result: DeskResult<String>) -> Self {
        let outcome = match result {
            Ok(detail) => StepOutcome::Ok { detail },
            Err(err) => StepOutcome::Error {
                code: err.code(),
                rule: err.rule(),
                message: err.to_string(),
            },
        };
        Self {
            step: number,
            action: step.action(),
            target: step.target(),
            outcome,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, StepOutcome::Error { .. })
    }
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}: ", self.step, self.action, self.target)?;
        match &self.outcome {
            StepOutcome::Ok { detail } => write!(f, "ok, {detail}"),
            StepOutcome::Error {
                code,
                rule: Some(rule),
                message,
            } => write!(f, "{code} {rule}: {message}"),
            StepOutcome::Error {
                code,
                rule: None,
                message,
            } => write!(f, "{code}: {message}"),
        }
    }
}

/// Final state of a replayed scenario
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub tenant: TenantId,
    pub steps: Vec<StepReport>,
    pub rooms: Vec<Room>,
    pub reservations: Vec<Reservation>,
    pub audit: Vec<AuditEntry>,
    /// Reservation id to scenario ref
    #[serde(skip)]
    pub references: HashMap<String, String>,
}

impl fmt::Display for ReplayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tenant {}", self.tenant)?;

        writeln!(f)?;
        let failed = self.steps.iter().filter(|step| step.is_error()).count();
        writeln!(f, "steps ({} run, {} failed):", self.steps.len(), failed)?;
        if self.steps.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        writeln!(f)?;
        writeln!(f, "rooms:")?;
        writeln!(
            f,
            "  {:<8} {:<6} {:<10} {:<15} {:<4} RESERVATION",
            "NUMBER", "FLOOR", "TYPE", "STATUS", "VER"
        )?;
        for room in &self.rooms {
            writeln!(
                f,
                "  {:<8} {:<6} {:<10} {:<15} {:<4} {}",
                room.room_number,
                room.floor,
                room.room_type,
                room.status,
                room.version,
                room.current_reservation_id.as_deref().unwrap_or("-")
            )?;
        }

        writeln!(f)?;
        writeln!(f, "reservations:")?;
        writeln!(
            f,
            "  {:<8} {:<10} {:<12} {:<12} {:<8} {:<6} {:<10} VER",
            "ID", "REF", "GUEST", "STATUS", "ROOM", "NIGHTS", "TOTAL"
        )?;
        for reservation in &self.reservations {
            writeln!(
                f,
                "  {:<8} {:<10} {:<12} {:<12} {:<8} {:<6} {:<10} {}",
                reservation.id,
                self.references
                    .get(&reservation.id)
                    .map(String::as_str)
                    .unwrap_or("-"),
                reservation.guest_id,
                reservation.status,
                reservation.room_id.as_deref().unwrap_or("-"),
                reservation.nights,
                reservation.total_amount,
                reservation.version
            )?;
        }

        writeln!(f)?;
        writeln!(f, "audit:")?;
        for entry in &self.audit {
            write!(
                f,
                "  {:>4} {} {} {} by {}",
                entry.sequence,
                entry.resource_type,
                entry.resource_id,
                entry.action.as_str(),
                entry.performed_by
            )?;
            match (&entry.previous_value, &entry.new_value) {
                (Some(previous), Some(new)) => write!(f, ": {previous} -> {new}")?,
                (None, Some(new)) => write!(f, ": {new}")?,
                (Some(previous), None) => write!(f, ": {previous}")?,
                (None, None) => {}
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
