// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Room entity and its status machine

use crate::error::{DeskError, DeskResult};
use crate::machine::StateMachine;
use crate::tenant::{TenantId, TenantScoped};
use crate::version::Versioned;
use crate::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Available,
    Occupied,
    Reserved,
    Dirty,
    Cleaning,
    Inspecting,
    OutOfOrder,
    OutOfService,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "available",
            RoomStatus::Occupied => "occupied",
            RoomStatus::Reserved => "reserved",
            RoomStatus::Dirty => "dirty",
            RoomStatus::Cleaning => "cleaning",
            RoomStatus::Inspecting => "inspecting",
            RoomStatus::OutOfOrder => "out_of_order",
            RoomStatus::OutOfService => "out_of_service",
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomStatus {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomMachine::statuses()
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DeskError::validation(format!("Unknown room status \"{s}\"")))
    }
}

/// Transition table for rooms
pub struct RoomMachine;

impl StateMachine for RoomMachine {
    type Status = RoomStatus;

    const RULE: &'static str = "INVALID_STATUS_TRANSITION";
    const SUBJECT: &'static str = "status";

    fn statuses() -> &'static [RoomStatus] {
        use RoomStatus::*;
        &[
            Available,
            Occupied,
            Reserved,
            Dirty,
            Cleaning,
            Inspecting,
            OutOfOrder,
            OutOfService,
        ]
    }

    fn allowed_transitions(status: RoomStatus) -> &'static [RoomStatus] {
        use RoomStatus::*;
        match status {
            Available => &[
                Reserved,
                Occupied,
                OutOfOrder,
                OutOfService,
                Cleaning,
                Inspecting,
            ],
            Occupied => &[Dirty, OutOfOrder],
            Reserved => &[Available, Occupied, OutOfOrder],
            Dirty => &[Cleaning, OutOfOrder],
            Cleaning => &[Inspecting, Available, Dirty, OutOfOrder],
            Inspecting => &[Available, Dirty, OutOfOrder],
            OutOfOrder => &[Dirty, Cleaning, Available, OutOfService],
            OutOfService => &[OutOfOrder, Available],
        }
    }
}

/// A physical room owned by one tenant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub tenant_id: TenantId,
    pub room_number: String,
    pub floor: i32,
    pub room_type: String,
    pub status: RoomStatus,
    /// Set only while occupied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_guest_id: Option<String>,
    /// Set only while occupied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_reservation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_override: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Build a fresh room at version 0
    pub fn new(
        id: impl Into<String>,
        tenant_id: TenantId,
        new: NewRoom,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            tenant_id,
            room_number: new.room_number,
            floor: new.floor,
            room_type: new.room_type,
            status: new.status.unwrap_or(RoomStatus::Available),
            current_guest_id: None,
            current_reservation_id: None,
            rate_override: None,
            notes: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.status == RoomStatus::Occupied
    }

    /// Refuse assignment unless the room is available or held
    pub fn ensure_assignable(&self) -> DeskResult<()> {
        if !matches!(self.status, RoomStatus::Available | RoomStatus::Reserved) {
            return Err(DeskError::business_rule(
                "ROOM_NOT_AVAILABLE_FOR_ASSIGNMENT",
                format!(
                    "Cannot assign room {} with status \"{}\". Room must be available or reserved.",
                    self.room_number, self.status
                ),
            ));
        }
        Ok(())
    }

    /// Drop guest refs unless occupied
    pub fn clear_guest_unless_occupied(&mut self) {
        if !self.is_occupied() {
            self.current_guest_id = None;
            self.current_reservation_id = None;
        }
    }
}

impl TenantScoped for Room {
    const KIND: &'static str = "Room";

    fn id(&self) -> &str {
        &self.id
    }

    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

impl Versioned for Room {
    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

/// Input for creating a room
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRoom {
    pub room_number: String,
    #[serde(default)]
    pub floor: i32,
    #[serde(default)]
    pub room_type: String,
    /// Initial status, available when omitted
    #[serde(default)]
    pub status: Option<RoomStatus>,
}

#[cfg(test)]
#[path = "room_tests.rs"]
mod tests;
