// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock backends
//!
//! A [`Locker`] is a non-blocking try-lock keyed by tenant and resource. Any
//! backend must keep the timeout-based expiry; a distributed backend would map
//! `try_acquire` onto a conditional put with a TTL.

use super::lock::{HolderId, Lock, LockEvent, LockInput, LockKey, LockMetadata};
use crate::clock::Clock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub trait Locker: Clone + Send + Sync + 'static {
    /// Take the lock unless a live holder exists; never blocks
    ///
    /// Returns the id of this acquisition for [`Locker::release_if_held`].
    fn acquire(&self, key: &LockKey, label: &str) -> Option<HolderId>;

    fn try_acquire(&self, key: &LockKey, label: &str) -> bool {
        self.acquire(key, label).is_some()
    }

    /// Drop the lock whoever holds it
    fn release(&self, key: &LockKey);

    /// Drop the lock only while `holder` still owns it; false when it was
    /// reclaimed by someone else in the meantime
    fn release_if_held(&self, key: &LockKey, holder: HolderId) -> bool;

    /// Current live holder, if any
    fn holder(&self, key: &LockKey) -> Option<LockMetadata>;

    /// Drop every expired lock, returning how many were dropped
    fn reap_expired(&self) -> usize;
}

/// Process-local locker
#[derive(Clone, Debug)]
pub struct InMemoryLocker<C: Clock> {
    clock: C,
    timeout: Duration,
    locks: Arc<Mutex<HashMap<LockKey, Lock>>>,
    next_holder: Arc<AtomicU64>,
}

impl<C: Clock> InMemoryLocker<C> {
    pub fn new(clock: C, timeout: Duration) -> Self {
        Self {
            clock,
            timeout,
            locks: Arc::new(Mutex::new(HashMap::new())),
            next_holder: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of keys currently held (expired entries included until reaped)
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn apply(
        &self,
        locks: &mut HashMap<LockKey, Lock>,
        key: &LockKey,
        input: LockInput,
    ) -> (Lock, Vec<LockEvent>) {
        let lock = locks
            .get(key)
            .cloned()
            .unwrap_or_else(|| Lock::new(key.clone(), self.timeout));
        let (next, events) = lock.transition(input, &self.clock);
        for event in &events {
            log_event(event);
        }
        if next.is_free() {
            locks.remove(key);
        } else {
            locks.insert(key.clone(), next.clone());
        }
        (next, events)
    }
}

fn log_event(event: &LockEvent) {
    match event {
        LockEvent::Acquired { key, label } => {
            tracing::debug!(%key, label, "lock acquired");
        }
        LockEvent::Denied {
            key,
            label,
            held_by,
        } => {
            tracing::debug!(%key, label, held_by, "lock denied");
        }
        LockEvent::Reclaimed {
            key,
            previous_label,
            label,
        } => {
            tracing::warn!(%key, previous_label, label, "reclaimed expired lock");
        }
        LockEvent::Released { key, label } => {
            tracing::debug!(%key, label, "lock released");
        }
        LockEvent::StaleRelease { key, holder } => {
            tracing::warn!(%key, %holder, "ignored release from a reclaimed holder");
        }
        LockEvent::Expired { key, label } => {
            tracing::warn!(%key, label, "lock expired");
        }
    }
}

impl<C: Clock> Locker for InMemoryLocker<C> {
    fn acquire(&self, key: &LockKey, label: &str) -> Option<HolderId> {
        let holder = HolderId(self.next_holder.fetch_add(1, Ordering::Relaxed));
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        let (lock, _) = self.apply(
            &mut locks,
            key,
            LockInput::Acquire {
                holder,
                label: label.to_string(),
            },
        );
        lock.is_held_by(holder).then_some(holder)
    }

    fn release(&self, key: &LockKey) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        self.apply(&mut locks, key, LockInput::Release);
    }

    fn release_if_held(&self, key: &LockKey, holder: HolderId) -> bool {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        let (_, events) = self.apply(&mut locks, key, LockInput::ReleaseHeld { holder });
        events
            .iter()
            .any(|event| matches!(event, LockEvent::Released { .. }))
    }

    fn holder(&self, key: &LockKey) -> Option<LockMetadata> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.get(key)?;
        let (lock, _) = self.apply(&mut locks, key, LockInput::Tick);
        lock.metadata().cloned()
    }

    fn reap_expired(&self) -> usize {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        let keys: Vec<LockKey> = locks.keys().cloned().collect();
        keys.iter()
            .filter(|key| {
                let (_, events) = self.apply(&mut locks, key, LockInput::Tick);
                !events.is_empty()
            })
            .count()
    }
}

#[cfg(test)]
#[path = "locker_tests.rs"]
mod tests;
