// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock state machine for short-lived exclusive access to one resource
//!
//! A held lock expires once `now - acquired_at >= timeout`; the next acquire
//! on the same key reclaims it.

use crate::clock::Clock;
use crate::tenant::TenantId;
use std::fmt;
use std::time::{Duration, Instant};

/// Lock key: one resource within one tenant
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LockKey {
    pub tenant_id: TenantId,
    pub resource_id: String,
}

impl LockKey {
    pub fn new(tenant_id: TenantId, resource_id: impl Into<String>) -> Self {
        Self {
            tenant_id,
            resource_id: resource_id.into(),
        }
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tenant_id, self.resource_id)
    }
}

/// Identifies one acquisition, so a holder whose lock was reclaimed cannot
/// free the lock of whoever took it over
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HolderId(pub u64);

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "holder-{}", self.0)
    }
}

/// What is known about the current holder
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockMetadata {
    pub holder: HolderId,
    pub acquired_at: Instant,
    /// Operation holding the lock, e.g. "transfer_room"
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockState {
    Free,
    Held(LockMetadata),
}

#[derive(Clone, Debug)]
pub struct Lock {
    pub key: LockKey,
    pub timeout: Duration,
    pub state: LockState,
}

#[derive(Clone, Debug)]
pub enum LockInput {
    Acquire { holder: HolderId, label: String },
    /// Unconditional release
    Release,
    /// Release only if `holder` still owns the lock
    ReleaseHeld { holder: HolderId },
    /// Reap the lock if it has expired
    Tick,
}

/// Observable outcomes of a lock transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockEvent {
    Acquired {
        key: LockKey,
        label: String,
    },
    Denied {
        key: LockKey,
        label: String,
        held_by: String,
    },
    Reclaimed {
        key: LockKey,
        previous_label: String,
        label: String,
    },
    Released {
        key: LockKey,
        label: String,
    },
    /// A release from a holder that no longer owns the lock
    StaleRelease {
        key: LockKey,
        holder: HolderId,
    },
    Expired {
        key: LockKey,
        label: String,
    },
}

impl Lock {
    pub fn new(key: LockKey, timeout: Duration) -> Self {
        Self {
            key,
            timeout,
            state: LockState::Free,
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self.state, LockState::Free)
    }

    pub fn metadata(&self) -> Option<&LockMetadata> {
        match &self.state {
            LockState::Free => None,
            LockState::Held(meta) => Some(meta),
        }
    }

    pub fn is_held_by(&self, holder: HolderId) -> bool {
        matches!(&self.state, LockState::Held(meta) if meta.holder == holder)
    }

    pub fn is_expired(&self, clock: &impl Clock) -> bool {
        match &self.state {
            LockState::Free => false,
            LockState::Held(meta) => {
                clock.now().saturating_duration_since(meta.acquired_at) >= self.timeout
            }
        }
    }

    /// Pure state transition function
    pub fn transition(&self, input: LockInput, clock: &impl Clock) -> (Lock, Vec<LockEvent>) {
        let mut next = self.clone();
        let mut events = Vec::new();

        match input {
            LockInput::Acquire { holder, label } => match &self.state {
                LockState::Free => {
                    next.state = LockState::Held(LockMetadata {
                        holder,
                        acquired_at: clock.now(),
                        label: label.clone(),
                    });
                    events.push(LockEvent::Acquired {
                        key: self.key.clone(),
                        label,
                    });
                }
                LockState::Held(current) if self.is_expired(clock) => {
                    next.state = LockState::Held(LockMetadata {
                        holder,
                        acquired_at: clock.now(),
                        label: label.clone(),
                    });
                    events.push(LockEvent::Reclaimed {
                        key: self.key.clone(),
                        previous_label: current.label.clone(),
                        label: label.clone(),
                    });
                    events.push(LockEvent::Acquired {
                        key: self.key.clone(),
                        label,
                    });
                }
                LockState::Held(current) => {
                    events.push(LockEvent::Denied {
                        key: self.key.clone(),
                        label,
                        held_by: current.label.clone(),
                    });
                }
            },

            LockInput::Release => {
                if let LockState::Held(current) = &self.state {
                    next.state = LockState::Free;
                    events.push(LockEvent::Released {
                        key: self.key.clone(),
                        label: current.label.clone(),
                    });
                }
            }

            LockInput::ReleaseHeld { holder } => match &self.state {
                LockState::Held(current) if current.holder == holder => {
                    next.state = LockState::Free;
                    events.push(LockEvent::Released {
                        key: self.key.clone(),
                        label: current.label.clone(),
                    });
                }
                _ => {
                    events.push(LockEvent::StaleRelease {
                        key: self.key.clone(),
                        holder,
                    });
                }
            },

            LockInput::Tick => {
                if let LockState::Held(current) = &self.state {
                    if self.is_expired(clock) {
                        next.state = LockState::Free;
                        events.push(LockEvent::Expired {
                            key: self.key.clone(),
                            label: current.label.clone(),
                        });
                    }
                }
            }
        }

        (next, events)
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
