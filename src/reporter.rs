//! Decides when to print a report, when to announce that sync is still
//! pending, and what the display should show. Pure bookkeeping over uptime
//! milliseconds so the cadence rules are testable off-hardware.

use crate::countdown::HoursRemaining;
use crate::digits::{DisplayMode, DisplayValue, display_value};

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SyncState {
    WaitingForSync,
    Synced,
}

/// What the orchestrator should do after one step: push a new value to the
/// display, print a report with the given hour count, or announce that the
/// clock is still waiting for sync.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StepActions {
    pub show: Option<DisplayValue>,
    pub report: Option<u32>,
    pub announce_waiting: bool,
}

/// Cadence state for reporting and display updates.
///
/// Reports are change-gated on a fixed interval, except the first reading
/// after sync which reports immediately. The display alternates between
/// hours and days on its own interval and only pushes changed values.
pub struct Reporter {
    state: SyncState,
    mode: DisplayMode,
    waiting_announced: bool,
    last_reported: Option<u32>,
    last_shown: Option<DisplayValue>,
    next_report_at: u64,
    next_mode_toggle_at: Option<u64>,
    print_interval_ms: u64,
    mode_interval_ms: u64,
}

impl Reporter {
    #[must_use]
    pub const fn new(print_interval_ms: u64, mode_interval_ms: u64) -> Self {
        Self {
            state: SyncState::WaitingForSync,
            mode: DisplayMode::Hours,
            waiting_announced: false,
            last_reported: None,
            last_shown: None,
            next_report_at: 0,
            next_mode_toggle_at: None,
            print_interval_ms,
            mode_interval_ms,
        }
    }

    /// Advance the cadence to `uptime_ms` with the current reading.
    ///
    /// Call on every pass of the orchestrator loop; deadlines are absolute
    /// uptimes, so the call rate only bounds how late an action can fire.
    pub fn step(&mut self, uptime_ms: u64, reading: HoursRemaining) -> StepActions {
        let mut actions = StepActions::default();

        // The hours/days toggle runs in every state, first flip one full
        // interval after startup.
        match self.next_mode_toggle_at {
            None => {
                self.next_mode_toggle_at = Some(uptime_ms.saturating_add(self.mode_interval_ms));
            }
            Some(deadline) if uptime_ms >= deadline => {
                self.mode = self.mode.toggled();
                self.next_mode_toggle_at = Some(uptime_ms.saturating_add(self.mode_interval_ms));
            }
            Some(_) => {}
        }

        match (self.state, reading) {
            (SyncState::WaitingForSync, HoursRemaining::Unsynced) => {
                if !self.waiting_announced {
                    self.waiting_announced = true;
                    actions.announce_waiting = true;
                }
            }
            (SyncState::WaitingForSync, HoursRemaining::Hours(hours)) => {
                // First synced reading reports right away instead of waiting
                // out the print interval.
                self.state = SyncState::Synced;
                self.waiting_announced = false;
                self.last_reported = Some(hours);
                self.next_report_at = uptime_ms.saturating_add(self.print_interval_ms);
                actions.report = Some(hours);
            }
            (SyncState::Synced, HoursRemaining::Unsynced) => {
                self.state = SyncState::WaitingForSync;
                self.waiting_announced = true;
                actions.announce_waiting = true;
            }
            (SyncState::Synced, HoursRemaining::Hours(hours)) => {
                if uptime_ms >= self.next_report_at {
                    if self.last_reported != Some(hours) {
                        self.last_reported = Some(hours);
                        actions.report = Some(hours);
                    }
                    // The interval restarts whether or not anything printed.
                    self.next_report_at = uptime_ms.saturating_add(self.print_interval_ms);
                }
            }
        }

        let value = display_value(reading, self.mode);
        if self.last_shown != Some(value) {
            self.last_shown = Some(value);
            actions.show = Some(value);
        }

        actions
    }
}
