// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Table-driven status transition validation
//!
//! A machine is a static table mapping each status to the statuses it may move
//! to. Moving to the current status is always allowed. A status with an empty
//! row is terminal.

use crate::error::{DeskError, DeskResult};
use std::fmt::Display;
use std::str::FromStr;

pub trait StateMachine {
    type Status: Copy + Eq + Display + FromStr + 'static;

    /// Business rule named when a transition is refused
    const RULE: &'static str;

    /// Noun used in the refusal message, e.g. "status"
    const SUBJECT: &'static str;

    /// Every status, in table order
    fn statuses() -> &'static [Self::Status];

    /// The table row for `status`
    fn allowed_transitions(status: Self::Status) -> &'static [Self::Status];

    fn is_terminal(status: Self::Status) -> bool {
        Self::allowed_transitions(status).is_empty()
    }

    fn is_transition_allowed(current: Self::Status, next: Self::Status) -> bool {
        current == next || Self::allowed_transitions(current).contains(&next)
    }

    fn validate_transition(current: Self::Status, next: Self::Status) -> DeskResult<()> {
        if Self::is_transition_allowed(current, next) {
            return Ok(());
        }
        Err(Self::refusal(current, &next.to_string()))
    }

    /// Validate a target status given by name, as received from an API layer
    ///
    /// Names outside the status set are refused like any other illegal
    /// transition, so the caller learns the allowed next states.
    fn validate_named_transition(current: Self::Status, next: &str) -> DeskResult<Self::Status> {
        match next.parse::<Self::Status>() {
            Ok(status) => {
                Self::validate_transition(current, status)?;
                Ok(status)
            }
            Err(_) => Err(Self::refusal(current, next)),
        }
    }

    fn refusal(current: Self::Status, next: &str) -> DeskError {
        let allowed = Self::allowed_transitions(current);
        let allowed = if allowed.is_empty() {
            "none (terminal state)".to_string()
        } else {
            allowed
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        DeskError::business_rule(
            Self::RULE,
            format!(
                "Invalid {} transition from \"{}\" to \"{}\". Allowed transitions: {}",
                Self::SUBJECT,
                current,
                next,
                allowed
            ),
        )
    }
}
