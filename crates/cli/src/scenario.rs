// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario files replayed by `fdesk replay`
//!
//! ```toml
//! tenant = "hotel-1"
//! actor = "clerk-1"
//! role = "staff"
//! now = "2026-03-01T12:00:00Z"
//! guests = ["guest-1"]
//!
//! [[rooms]]
//! number = "101"
//! type = "standard"
//!
//! [[reservations]]
//! ref = "smith"
//! guest = "guest-1"
//! check_in = "2026-03-01"
//! check_out = "2026-03-03"
//! adults = 2
//! rate = 10000
//!
//! [[steps]]
//! action = "check_in"
//! reservation = "smith"
//! room = "101"
//! ```

use crate::error::CliError;
use chrono::{DateTime, NaiveDate, Utc};
use fd_core::{Amount, ReservationStatus, Role, RoomStatus, TenantId};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub tenant: String,
    pub actor: String,
    #[serde(default = "default_role")]
    pub role: Role,
    /// Wall-clock start; the current time when omitted
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
    #[serde(default)]
    pub guests: Vec<String>,
    #[serde(default)]
    pub rooms: Vec<ScenarioRoom>,
    #[serde(default)]
    pub reservations: Vec<ScenarioReservation>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_role() -> Role {
    Role::Staff
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioRoom {
    pub number: String,
    #[serde(default)]
    pub floor: i32,
    #[serde(default, rename = "type")]
    pub room_type: String,
    #[serde(default)]
    pub status: Option<RoomStatus>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioReservation {
    #[serde(rename = "ref")]
    pub reference: String,
    pub guest: String,
    #[serde(default, rename = "type")]
    pub room_type: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default = "default_adults")]
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    pub rate: Amount,
    #[serde(default)]
    pub status: Option<ReservationStatus>,
}

fn default_adults() -> u32 {
    1
}

/// One operation run against the seeded desk
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    CheckIn {
        reservation: String,
        room: String,
        #[serde(default)]
        notes: Option<String>,
        #[serde(default)]
        key: Option<String>,
    },
    CheckOut {
        reservation: String,
        #[serde(default)]
        key: Option<String>,
    },
    Cancel {
        reservation: String,
        #[serde(default)]
        reason: Option<String>,
    },
    NoShow {
        reservation: String,
        #[serde(default)]
        reason: Option<String>,
    },
    /// Status given by name so unknown names reach the room's transition check
    RoomStatus {
        room: String,
        status: String,
        #[serde(default)]
        reason: Option<String>,
    },
    /// Take a room out of service; gated on the caller's role
    Block {
        room: String,
        #[serde(default)]
        reason: Option<String>,
    },
    /// Pay into the reservation's folio; the full balance when no amount is given
    Payment {
        reservation: String,
        #[serde(default)]
        amount: Option<Amount>,
    },
    Transfer {
        reservation: String,
        from: String,
        to: String,
        #[serde(default)]
        reason: Option<String>,
    },
}

impl Step {
    pub fn action(&self) -> &'static str {
        match self {
            Step::CheckIn { .. } => "check_in",
            Step::CheckOut { .. } => "check_out",
            Step::Cancel { .. } => "cancel",
            Step::NoShow { .. } => "no_show",
            Step::RoomStatus { .. } => "room_status",
            Step::Block { .. } => "block",
            Step::Payment { .. } => "payment",
            Step::Transfer { .. } => "transfer",
        }
    }

    /// Human label for the step's subject, e.g. "smith -> 101"
    pub fn target(&self) -> String {
        match self {
            Step::CheckIn {
                reservation, room, ..
            } => format!("{reservation} -> {room}"),
            Step::CheckOut { reservation, .. }
            | Step::Cancel { reservation, .. }
            | Step::NoShow { reservation, .. }
            | Step::Payment { reservation, .. } => reservation.clone(),
            Step::RoomStatus { room, status, .. } => format!("{room} -> {status}"),
            Step::Block { room, .. } => room.clone(),
            Step::Transfer {
                reservation,
                from,
                to,
                ..
            } => format!("{reservation} {from} -> {to}"),
        }
    }

    fn references(&self) -> (Option<&str>, Vec<&str>) {
        match self {
            Step::CheckIn {
                reservation, room, ..
            } => (Some(reservation.as_str()), vec![room.as_str()]),
            Step::CheckOut { reservation, .. }
            | Step::Cancel { reservation, .. }
            | Step::NoShow { reservation, .. }
            | Step::Payment { reservation, .. } => (Some(reservation.as_str()), vec![]),
            Step::RoomStatus { room, .. } | Step::Block { room, .. } => {
                (None, vec![room.as_str()])
            }
            Step::Transfer {
                reservation,
                from,
                to,
                ..
            } => (Some(reservation.as_str()), vec![from.as_str(), to.as_str()]),
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CliError::unreadable("scenario", path, e))?;
        Self::parse(&raw).map_err(|detail| CliError::invalid_scenario(path, detail))
    }

    /// Parse and cross-check references; the error is a one-line reason
    pub fn parse(raw: &str) -> Result<Self, String> {
        let scenario: Scenario = toml::from_str(raw).map_err(|e| e.message().to_string())?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn tenant_id(&self) -> Result<TenantId, String> {
        TenantId::parse(&self.tenant).map_err(|e| e.to_string())
    }

    fn validate(&self) -> Result<(), String> {
        self.tenant_id()?;
        if self.actor.trim().is_empty() {
            return Err("actor must not be blank".to_string());
        }

        let mut numbers = HashSet::new();
        for room in &self.rooms {
            if !numbers.insert(room.number.as_str()) {
                return Err(format!("room {} is declared twice", room.number));
            }
        }
        let mut refs = HashSet::new();
        for reservation in &self.reservations {
            if !refs.insert(reservation.reference.as_str()) {
                return Err(format!(
                    "reservation '{}' is declared twice",
                    reservation.reference
                ));
            }
        }

        for (index, step) in self.steps.iter().enumerate() {
            let (reservation, rooms) = step.references();
            if let Some(reference) = reservation {
                if !refs.contains(reference) {
                    return Err(format!(
                        "step {} ({}) names unknown reservation '{}'",
                        index + 1,
                        step.action(),
                        reference
                    ));
                }
            }
            for number in rooms {
                if !numbers.contains(number) {
                    return Err(format!(
                        "step {} ({}) names unknown room {}",
                        index + 1,
                        step.action(),
                        number
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "scenario_tests.rs"]
mod tests;
