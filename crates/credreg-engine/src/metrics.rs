//! # Console Counters
//!
//! In-process atomic counters for loads and revocations.

use std::sync::atomic::{AtomicU64, Ordering};

/// Shared counters, updated by the console.
#[derive(Debug, Default)]
pub struct ConsoleMetrics {
    loads: AtomicU64,
    load_failures: AtomicU64,
    revocations: AtomicU64,
    revocation_failures: AtomicU64,
}

impl ConsoleMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_load(&self, ok: bool) {
        let counter = if ok { &self.loads } else { &self.load_failures };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_revocation(&self, ok: bool) {
        let counter = if ok {
            &self.revocations
        } else {
            &self.revocation_failures
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Successful loads.
    pub fn loads(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    /// Failed loads.
    pub fn load_failures(&self) -> u64 {
        self.load_failures.load(Ordering::Relaxed)
    }

    /// Completed revocations.
    pub fn revocations(&self) -> u64 {
        self.revocations.load(Ordering::Relaxed)
    }

    /// Failed revocation attempts (precondition or call failures).
    pub fn revocation_failures(&self) -> u64 {
        self.revocation_failures.load(Ordering::Relaxed)
    }
}
