use std::num::NonZeroU64;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// When a running check reports liveness. One policy per deployment.
///
/// In TOML: `progress = { every_chunks = 100 }` or
/// `progress = { interval_ms = 5000 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPolicy {
    /// Emit on every N-th chunk.
    EveryChunks(NonZeroU64),

    /// Emit once at least this many milliseconds passed since the last
    /// emission (or since the stream started).
    IntervalMs(u64),
}

impl ProgressPolicy {
    pub const DEFAULT_CHUNK_INTERVAL: NonZeroU64 = NonZeroU64::new(100).unwrap();

    pub fn every_chunks(n: NonZeroU64) -> Self { Self::EveryChunks(n) }

    pub fn interval(period: Duration) -> Self {
        Self::IntervalMs(u64::try_from(period.as_millis()).unwrap_or(u64::MAX))
    }
}

impl Default for ProgressPolicy {
    fn default() -> Self { Self::EveryChunks(Self::DEFAULT_CHUNK_INTERVAL) }
}

/// Decides, chunk by chunk, whether a progress event is due.
///
/// Counters reset on every emission.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    policy:           ProgressPolicy,
    chunks_since:     u64,
    last_emission_at: Instant,
}

impl ProgressThrottle {
    pub fn new(policy: ProgressPolicy, started_at: Instant) -> Self {
        Self {
            policy,
            chunks_since: 0,
            last_emission_at: started_at,
        }
    }

    pub fn policy(&self) -> ProgressPolicy { self.policy }

    /// Record one chunk observed at `now`. Returns `true` when an event should
    /// be emitted for it.
    pub fn should_emit(&mut self, now: Instant) -> bool {
        let emit = match self.policy {
            ProgressPolicy::EveryChunks(n) => {
                self.chunks_since += 1;
                self.chunks_since >= n.get()
            }
            ProgressPolicy::IntervalMs(ms) => {
                now.saturating_duration_since(self.last_emission_at) >= Duration::from_millis(ms)
            }
        };

        if emit {
            self.chunks_since = 0;
            self.last_emission_at = now;
        }
        emit
    }
}
