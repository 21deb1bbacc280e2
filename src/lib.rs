//! Shared items for the countdown clock project.
#![no_std]

pub mod config;
pub mod countdown;
pub mod digits;
mod error;
pub mod reporter;
pub mod seven_segment;
pub mod tz;
pub mod unix_seconds;

#[cfg(feature = "pico1")]
pub mod hardware;
#[cfg(feature = "pico1")]
pub mod led4;
#[cfg(feature = "pico1")]
pub mod synced_clock;
#[cfg(feature = "pico1")]
pub mod time_sync;
#[cfg(all(feature = "pico1", feature = "wifi"))]
pub mod wifi;

// Re-export commonly used items
pub use config::Config;
pub use countdown::{Countdown, HoursRemaining};
pub use digits::{DisplayMode, DisplayValue};
pub use error::{Error, Result};
pub use reporter::{Reporter, StepActions};
pub use seven_segment::SegmentFrame;
pub use tz::TzRule;
pub use unix_seconds::UnixSeconds;

#[cfg(feature = "pico1")]
pub use hardware::Hardware;
#[cfg(feature = "pico1")]
pub use led4::{Led4, Led4Static, OutputArray};
#[cfg(feature = "pico1")]
pub use synced_clock::SyncedClock;
#[cfg(feature = "pico1")]
pub use time_sync::{TimeSync, TimeSyncEvent, TimeSyncStatic};
#[cfg(all(feature = "pico1", feature = "wifi"))]
pub use wifi::{Wifi, WifiCredentials, WifiStatic};
