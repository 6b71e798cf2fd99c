// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.
//!
//! Only failures that stop a command reach this type: unreadable or invalid
//! input files and a scenario that cannot be seeded. Step failures inside a
//! replay are part of the report, not errors.

use fd_core::DeskError;
use std::fmt;
use std::path::Path;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct CliError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    /// Original error if any
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Common error builders for typical failure scenarios.
impl CliError {
    pub fn unreadable(kind: &str, path: &Path, err: std::io::Error) -> Self {
        CliError::new(format!("Cannot read {} '{}'", kind, path.display()))
            .with_context(err.to_string())
            .with_suggestion("Check that the path exists and is readable")
            .with_source(err)
    }

    pub fn invalid_scenario(path: &Path, detail: impl Into<String>) -> Self {
        CliError::new(format!("Invalid scenario '{}'", path.display()))
            .with_context(detail)
            .with_suggestion("Dates are quoted strings such as \"2026-03-01\"")
            .with_suggestion("Steps name rooms by number and reservations by ref")
    }

    pub fn invalid_config(path: &Path, err: DeskError) -> Self {
        CliError::new(format!("Invalid desk config '{}'", path.display()))
            .with_context(err.to_string())
            .with_suggestion("Durations are quoted strings such as \"30s\" or \"100ms\"")
            .with_suggestion("Known sections are [locks], [retry] and [workflow]")
    }

    /// A room or reservation the scenario declares was refused by the desk
    pub fn seed_refused(what: &str, err: DeskError) -> Self {
        CliError::new(format!("Cannot seed {}", what))
            .with_context(format!("{}: {}", err.code(), err))
            .with_suggestion("Register every guest the reservations name under `guests`")
            .with_suggestion("Set `now` on or before the earliest check-in date")
    }
}
