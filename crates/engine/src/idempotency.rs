// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replay cache for completed workflows
//!
//! A repeat of a completed check-in or check-out inside the TTL returns the
//! first outcome instead of running the steps again. Only successes are
//! cached; a failed attempt can be retried under the same key.

use fd_core::{Clock, TenantId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// `operation:tenant:part:part...`
pub fn idempotency_key(operation: &str, tenant_id: &TenantId, parts: &[&str]) -> String {
    let mut key = format!("{operation}:{tenant_id}");
    for part in parts {
        key.push(':');
        key.push_str(part);
    }
    key
}

#[derive(Debug)]
struct Cached<V> {
    value: V,
    /// `None` when the TTL overflows the monotonic clock
    expires_at: Option<Instant>,
}

impl<V> Cached<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

fn sweep<V>(entries: &mut HashMap<String, Cached<V>>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, cached| !cached.is_expired(now));
    before - entries.len()
}

#[derive(Debug)]
pub struct IdempotencyCache<V, C: Clock> {
    clock: C,
    ttl: Duration,
    entries: Arc<Mutex<HashMap<String, Cached<V>>>>,
}

impl<V, C: Clock> Clone for IdempotencyCache<V, C> {
    fn clone(&self) -> Self {
        Self {
            clock: self.clock.clone(),
            ttl: self.ttl,
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<V: Clone, C: Clock> IdempotencyCache<V, C> {
    pub fn new(clock: C, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The cached outcome for `key`, dropping it if expired
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let expired = entries.get(key)?.is_expired(now);
        if expired {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|cached| cached.value.clone())
    }

    /// Cache `value` under `key`; expired entries are swept on the way in
    pub fn put(&self, key: impl Into<String>, value: V) {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let purged = sweep(&mut entries, now);
        if purged > 0 {
            tracing::debug!(purged, "dropped expired workflow outcomes");
        }
        entries.insert(
            key.into(),
            Cached {
                value,
                expires_at: now.checked_add(self.ttl),
            },
        );
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        sweep(&mut entries, now)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "idempotency_tests.rs"]
mod tests;
