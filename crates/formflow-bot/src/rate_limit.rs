// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-window per-user rate limiter.
//!
//! Purely local, in-memory, single process. A request is accepted when at
//! least `min_interval` has passed since the last accepted request from
//! the same identity. Entries idle past the retention window are pruned
//! opportunistically during checks, bounding the map to active users.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

/// Per-identity cooldown map.
pub struct RateLimiter {
    last_accepted: DashMap<String, Instant>,
    min_interval: Duration,
    retention: Duration,
    cleanup_interval: Duration,
    last_cleanup: Mutex<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration, retention: Duration, cleanup_interval: Duration) -> Self {
        Self {
            last_accepted: DashMap::new(),
            min_interval,
            retention,
            cleanup_interval,
            last_cleanup: Mutex::new(Instant::now()),
        }
    }

    /// Check and record one request. Returns `true` when accepted.
    pub fn check(&self, user_id: &str) -> bool {
        self.check_at(user_id, Instant::now())
    }

    /// Clock-injectable body of [`check`].
    fn check_at(&self, user_id: &str, now: Instant) -> bool {
        self.maybe_cleanup(now);

        let accepted = match self.last_accepted.get(user_id) {
            Some(last) => now.duration_since(*last) >= self.min_interval,
            None => true,
        };
        if accepted {
            self.last_accepted.insert(user_id.to_string(), now);
        } else {
            debug!(user_id, "rate limited");
        }
        accepted
    }

    /// Drop entries idle past the retention window, at most once per
    /// cleanup interval.
    fn maybe_cleanup(&self, now: Instant) {
        {
            let Ok(mut last) = self.last_cleanup.lock() else {
                return;
            };
            if now.duration_since(*last) < self.cleanup_interval {
                return;
            }
            *last = now;
        }
        let before = self.last_accepted.len();
        self.last_accepted
            .retain(|_, last| now.duration_since(*last) < self.retention);
        let removed = before.saturating_sub(self.last_accepted.len());
        if removed > 0 {
            debug!(removed, "rate limiter cleanup");
        }
    }

    /// Number of identities currently tracked.
    pub fn tracked(&self) -> usize {
        self.last_accepted.len()
    }
}
