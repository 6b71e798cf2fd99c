// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Role-based authorization check for privileged room operations

use crate::error::{DeskError, DeskResult};
use crate::tenant::Caller;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Staff role of an authenticated caller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    GeneralManager,
    Manager,
    Supervisor,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::GeneralManager => "general_manager",
            Role::Manager => "manager",
            Role::Supervisor => "supervisor",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Role::SuperAdmin),
            "admin" => Ok(Role::Admin),
            "general_manager" => Ok(Role::GeneralManager),
            "manager" => Ok(Role::Manager),
            "supervisor" => Ok(Role::Supervisor),
            "staff" => Ok(Role::Staff),
            other => Err(DeskError::validation(format!("Unknown role \"{other}\""))),
        }
    }
}

/// Operations gated behind a role check
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    RoomDelete,
    RoomBulkUpdate,
    RoomBlock,
    RoomTypeCrud,
    RoomRateOverride,
    RoomInspectionApprove,
    RoomMaintenanceSchedule,
}

const MANAGERS: &[Role] = &[
    Role::SuperAdmin,
    Role::Admin,
    Role::GeneralManager,
    Role::Manager,
];

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::RoomDelete => "room.delete",
            Operation::RoomBulkUpdate => "room.bulk_update",
            Operation::RoomBlock => "room.block",
            Operation::RoomTypeCrud => "room_type.crud",
            Operation::RoomRateOverride => "room.rate_override",
            Operation::RoomInspectionApprove => "room.inspection_approve",
            Operation::RoomMaintenanceSchedule => "room.maintenance_schedule",
        }
    }

    /// Roles permitted to run this operation
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Operation::RoomDelete | Operation::RoomTypeCrud => &[Role::SuperAdmin, Role::Admin],
            Operation::RoomBulkUpdate
            | Operation::RoomBlock
            | Operation::RoomRateOverride
            | Operation::RoomMaintenanceSchedule => MANAGERS,
            Operation::RoomInspectionApprove => &[
                Role::SuperAdmin,
                Role::Admin,
                Role::GeneralManager,
                Role::Manager,
                Role::Supervisor,
            ],
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn has_permission(role: Role, operation: Operation) -> bool {
    operation.allowed_roles().contains(&role)
}

/// Refuse the operation unless the caller's role is on its allow-list
pub fn require_permission(caller: &Caller, operation: Operation) -> DeskResult<()> {
    let Some(role) = caller.role else {
        return Err(DeskError::Unauthorized {
            message: "User role is required for this operation".to_string(),
        });
    };

    if has_permission(role, operation) {
        return Ok(());
    }

    let allowed = operation
        .allowed_roles()
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    tracing::warn!(
        tenant_id = %caller.tenant_id,
        actor = %caller.actor_id,
        operation = %operation,
        role = %role,
        "permission denied"
    );
    Err(DeskError::Forbidden {
        message: format!(
            "Operation '{}' requires one of: {}. Current role: {}",
            operation, allowed, role
        ),
    })
}

#[cfg(test)]
#[path = "authz_tests.rs"]
mod tests;
