use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Issues monotonically increasing request numbers per key so that a slow
/// response can be recognised as stale once a newer request exists.
#[derive(Default)]
pub struct RequestSequencer {
    counter: AtomicU64,
    latest: DashMap<String, u64>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request for `key` and return its sequence number.
    pub fn issue(&self, key: &str) -> u64 {
        let sequence = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.latest
            .entry(key.to_string())
            .and_modify(|current| *current = (*current).max(sequence))
            .or_insert(sequence);
        sequence
    }

    /// Latest sequence issued for `key`.
    pub fn latest(&self, key: &str) -> Option<u64> {
        self.latest.get(key).map(|v| *v)
    }

    /// Whether `sequence` is still the newest request for `key`.
    pub fn is_current(&self, key: &str, sequence: u64) -> bool {
        self.latest(key) == Some(sequence)
    }
}
