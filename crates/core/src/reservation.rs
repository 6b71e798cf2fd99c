// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reservation entity and its status machine

use crate::error::{DeskError, DeskResult};
use crate::machine::StateMachine;
use crate::tenant::{TenantId, TenantScoped};
use crate::version::Versioned;
use crate::Amount;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Inquiry,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
    NoShow,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Inquiry => "inquiry",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::CheckedIn => "checked_in",
            ReservationStatus::CheckedOut => "checked_out",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::NoShow => "no_show",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReservationMachine::statuses()
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DeskError::validation(format!("Unknown reservation status \"{s}\"")))
    }
}

/// Transition table for reservations
pub struct ReservationMachine;

impl StateMachine for ReservationMachine {
    type Status = ReservationStatus;

    const RULE: &'static str = "INVALID_RESERVATION_STATUS_TRANSITION";
    const SUBJECT: &'static str = "reservation status";

    fn statuses() -> &'static [ReservationStatus] {
        use ReservationStatus::*;
        &[Inquiry, Confirmed, CheckedIn, CheckedOut, Cancelled, NoShow]
    }

    fn allowed_transitions(status: ReservationStatus) -> &'static [ReservationStatus] {
        use ReservationStatus::*;
        match status {
            Inquiry => &[Confirmed],
            Confirmed => &[CheckedIn, Cancelled, NoShow],
            CheckedIn => &[CheckedOut],
            CheckedOut | Cancelled | NoShow => &[],
        }
    }
}

impl ReservationMachine {
    /// Refuse any change to a reservation in a terminal status
    pub fn ensure_mutable(status: ReservationStatus) -> DeskResult<()> {
        if Self::is_terminal(status) {
            return Err(DeskError::business_rule(
                "TERMINAL_STATE_IMMUTABLE",
                format!(
                    "Cannot modify reservation with terminal status \"{status}\". Terminal states (checked_out, cancelled, no_show) are immutable."
                ),
            ));
        }
        Ok(())
    }

    /// Check-in is a move out of `confirmed` only; a stay already checked in
    /// is refused rather than treated as a same-status no-op
    pub fn ensure_can_check_in(status: ReservationStatus) -> DeskResult<()> {
        Self::ensure_mutable(status)?;
        if status != ReservationStatus::Confirmed {
            return Err(Self::refusal(
                status,
                ReservationStatus::CheckedIn.as_str(),
            ));
        }
        Ok(())
    }
}

/// Number of nights between two dates; zero or negative when out of order
pub fn nights_between(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub tenant_id: TenantId,
    pub guest_id: String,
    pub room_type: String,
    /// Required while checked in, cleared on every terminal transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    pub nights: u32,
    pub room_rate: Amount,
    pub total_amount: Amount,
    pub status: ReservationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_in_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_out_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn is_terminal(&self) -> bool {
        ReservationMachine::is_terminal(self.status)
    }
}

impl TenantScoped for Reservation {
    const KIND: &'static str = "Reservation";

    fn id(&self) -> &str {
        &self.id
    }

    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

impl Versioned for Reservation {
    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

/// Input for creating a reservation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    pub guest_id: String,
    #[serde(default)]
    pub room_type: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    /// Nightly rate in minor units
    pub room_rate: Amount,
    #[serde(default)]
    pub notes: Option<String>,
    /// Confirmed unless `inquiry` is requested
    #[serde(default)]
    pub status: Option<ReservationStatus>,
}

/// Field changes accepted by a reservation update
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationPatch {
    pub guest_id: Option<String>,
    pub room_type: Option<String>,
    pub room_id: Option<String>,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub adults: Option<u32>,
    pub children: Option<u32>,
    pub room_rate: Option<Amount>,
    pub notes: Option<String>,
    /// Refused unless equal to the current status
    pub status: Option<ReservationStatus>,
}

impl ReservationPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
#[path = "reservation_tests.rs"]
mod tests;
