// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desk configuration loaded from TOML
//!
//! ```toml
//! [locks]
//! timeout = "30s"
//!
//! [retry]
//! max_retries = 2
//! initial_delay = "100ms"
//! max_delay = "500ms"
//! multiplier = 2
//!
//! [workflow]
//! idempotency_ttl = "60m"
//! ```

use crate::error::{DeskError, DeskResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeskConfig {
    pub locks: LockSettings,
    pub retry: RetrySettings,
    pub workflow: WorkflowSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LockSettings {
    /// Age at which a held resource lock may be reclaimed
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    pub max_retries: u32,
    #[serde(with = "humantime_serde")]
    pub initial_delay: Duration,
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
            multiplier: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkflowSettings {
    /// How long a completed check-in or check-out is replayed for a repeat key
    #[serde(with = "humantime_serde")]
    pub idempotency_ttl: Duration,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            idempotency_ttl: Duration::from_secs(60 * 60),
        }
    }
}

impl DeskConfig {
    pub fn from_toml_str(raw: &str) -> DeskResult<Self> {
        let config: DeskConfig = toml::from_str(raw)
            .map_err(|e| DeskError::validation(format!("invalid desk config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> DeskResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DeskError::validation(format!("cannot read config {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> DeskResult<()> {
        if self.locks.timeout.is_zero() {
            return Err(DeskError::validation("locks.timeout must be greater than zero"));
        }
        if self.retry.multiplier.is_nan() || self.retry.multiplier < 1.0 {
            return Err(DeskError::validation("retry.multiplier must be at least 1"));
        }
        if self.retry.max_delay < self.retry.initial_delay {
            return Err(DeskError::validation(
                "retry.max_delay must not be shorter than retry.initial_delay",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
