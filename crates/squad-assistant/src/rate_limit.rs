//! Sliding-window request limiter keyed by session and client address.

use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

pub const WINDOW: Duration = Duration::from_secs(60);
pub const MAX_REQUESTS: usize = 12;

/// One full sweep of the map per this many checks.
const SWEEP_INTERVAL: usize = 1024;

/// In-process sliding window. Each key keeps the timestamps of its
/// requests inside the current window. Keys whose sessions go quiet
/// are dropped by a periodic sweep, so the map stays bounded by the
/// set of recently active clients.
pub struct RateLimiter {
    windows: DashMap<String, Vec<Instant>>,
    window: Duration,
    max_requests: usize,
    checks: AtomicUsize,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(WINDOW, MAX_REQUESTS)
    }
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            windows: DashMap::new(),
            window,
            max_requests,
            checks: AtomicUsize::new(0),
        }
    }

    fn key(session_id: &str, client_ip: &str) -> String {
        format!("{}:{}", session_id, client_ip)
    }

    /// Record one request and report whether it is allowed. Denied
    /// requests still count toward the window.
    pub fn check(&self, session_id: &str, client_ip: &str) -> bool {
        self.check_at(session_id, client_ip, Instant::now())
    }

    fn check_at(&self, session_id: &str, client_ip: &str, now: Instant) -> bool {
        if self.checks.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            self.sweep(now);
        }
        let mut entry = self
            .windows
            .entry(Self::key(session_id, client_ip))
            .or_default();
        entry.retain(|at| now.duration_since(*at) < self.window);
        entry.push(now);
        entry.len() <= self.max_requests
    }

    // Must not run while an entry guard is held.
    fn sweep(&self, now: Instant) {
        self.windows
            .retain(|_, stamps| stamps.iter().any(|at| now.duration_since(*at) < self.window));
    }
}
