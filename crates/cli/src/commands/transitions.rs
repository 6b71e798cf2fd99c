// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fdesk transitions`: print a status transition table

use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::{Args, ValueEnum};
use fd_core::{ReservationMachine, RoomMachine, StateMachine};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Entity {
    Room,
    Reservation,
}

#[derive(Args)]
pub struct TransitionsArgs {
    /// Entity whose table to print
    #[arg(value_enum)]
    pub entity: Entity,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// One row of a transition table
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct TransitionRow {
    pub status: String,
    pub allowed: Vec<String>,
    pub terminal: bool,
}

impl fmt::Display for TransitionRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terminal {
            write!(f, "{:<15} -> none (terminal state)", self.status)
        } else {
            write!(f, "{:<15} -> {}", self.status, self.allowed.join(", "))
        }
    }
}

pub fn transitions(args: TransitionsArgs) -> Result<()> {
    let rows = match args.entity {
        Entity::Room => table::<RoomMachine>(),
        Entity::Reservation => table::<ReservationMachine>(),
    };
    output::print_list(&rows, args.format)
}

pub fn table<M: StateMachine>() -> Vec<TransitionRow> {
    M::statuses()
        .iter()
        .map(|&status| TransitionRow {
            status: status.to_string(),
            allowed: M::allowed_transitions(status)
                .iter()
                .map(ToString::to_string)
                .collect(),
            terminal: M::is_terminal(status),
        })
        .collect()
}

#[cfg(test)]
#[path = "transitions_tests.rs"]
mod tests;
