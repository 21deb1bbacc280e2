//! Wall-clock time derived from the monotonic uptime plus a boot-time
//! anchor set whenever an NTP sync lands.

use core::sync::atomic::Ordering;

use embassy_time::Instant;
use portable_atomic::AtomicI64;

use crate::unix_seconds::UnixSeconds;

/// Current Unix time reconstructed as `boot_unix + uptime`.
///
/// Lock-free so the orchestrator can read it on every pass; suitable for a
/// `static`. The RP2040 has no native 64-bit atomics, hence `portable_atomic`.
pub struct SyncedClock {
    // Unix timestamp when the processor booted (0 = not synced yet).
    boot_unix_seconds: AtomicI64,
}

impl SyncedClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            boot_unix_seconds: AtomicI64::new(0),
        }
    }

    /// Anchor the clock to a network reading: boot time = network time minus
    /// uptime. Later syncs simply move the anchor.
    pub fn set_from_unix(&self, unix_seconds: UnixSeconds) {
        let boot_unix = unix_seconds.as_i64().saturating_sub(uptime_secs());
        self.boot_unix_seconds.store(boot_unix, Ordering::Relaxed);
    }

    /// The current Unix time, or an epoch-adjacent value while no sync has
    /// landed yet so callers see an implausible reading instead of uptime.
    pub fn now(&self) -> UnixSeconds {
        let boot_unix = self.boot_unix_seconds.load(Ordering::Relaxed);
        if boot_unix == 0 {
            return UnixSeconds(0);
        }
        UnixSeconds(boot_unix.saturating_add(uptime_secs()))
    }
}

impl Default for SyncedClock {
    fn default() -> Self {
        Self::new()
    }
}

fn uptime_secs() -> i64 {
    i64::try_from(Instant::now().as_secs()).unwrap_or(i64::MAX)
}
