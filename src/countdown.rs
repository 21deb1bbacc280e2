//! Whole hours remaining until a fixed wall-clock target.

use time::PrimitiveDateTime;

use crate::error::Result;
use crate::tz::TzRule;
use crate::unix_seconds::UnixSeconds;

const SECS_PER_HOUR: i64 = 3600;

/// Hours left until the target, or [`HoursRemaining::Unsynced`] while the
/// clock has not been set from the network yet.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HoursRemaining {
    Unsynced,
    Hours(u32),
}

/// A countdown target resolved to a Unix instant once at startup.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Copy, Clone, Debug)]
pub struct Countdown {
    target: UnixSeconds,
    label: &'static str,
}

impl Countdown {
    /// Resolve `target_local` (a wall-clock datetime in `tz`) to a Unix
    /// instant. `label` is the human-readable name used in reports.
    ///
    /// # Errors
    ///
    /// Returns an error when the datetime cannot be represented in `tz`.
    pub fn new(tz: &TzRule, target_local: PrimitiveDateTime, label: &'static str) -> Result<Self> {
        let target = tz.unix_from_local(target_local)?;
        Ok(Self { target, label })
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    #[must_use]
    pub const fn target(&self) -> UnixSeconds {
        self.target
    }

    /// Whole hours from `now` to the target, truncated. Zero once the target
    /// has passed; [`HoursRemaining::Unsynced`] while `now` predates the
    /// plausibility threshold.
    #[must_use]
    pub fn hours_remaining(&self, now: UnixSeconds) -> HoursRemaining {
        if !now.is_plausibly_synced() {
            return HoursRemaining::Unsynced;
        }
        let seconds_left = self.target.as_i64().saturating_sub(now.as_i64());
        if seconds_left <= 0 {
            return HoursRemaining::Hours(0);
        }
        #[expect(
            clippy::integer_division_remainder_used,
            reason = "seconds_left is positive, divisor is a nonzero constant"
        )]
        let hours = seconds_left / SECS_PER_HOUR;
        HoursRemaining::Hours(u32::try_from(hours).unwrap_or(u32::MAX))
    }
}

/// Split an hour count into whole days and leftover hours.
#[must_use]
#[expect(
    clippy::integer_division_remainder_used,
    reason = "division and remainder by a nonzero constant"
)]
pub const fn days_and_remainder(hours: u32) -> (u32, u32) {
    (hours / 24, hours % 24)
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use time::{Date, Month, Time};

    use super::*;

    fn local(year: i32, month: u8, day: u8, hour: u8) -> PrimitiveDateTime {
        PrimitiveDateTime::new(
            Date::from_calendar_date(year, Month::try_from(month).unwrap(), day).unwrap(),
            Time::from_hms(hour, 0, 0).unwrap(),
        )
    }

    fn unix_utc(year: i32, month: u8, day: u8, hour: u8) -> UnixSeconds {
        UnixSeconds(local(year, month, day, hour).assume_utc().unix_timestamp())
    }

    fn budapest_countdown() -> Countdown {
        let tz = TzRule::parse("CET-1CEST,M3.5.0/2,M10.5.0/3").unwrap();
        Countdown::new(&tz, local(2026, 4, 12, 6), "2026-04-12 06:00").unwrap()
    }

    #[test]
    fn test_target_resolves_under_dst() {
        // April is summer time, so 06:00 local is 04:00 UTC.
        let countdown = budapest_countdown();
        assert_eq!(countdown.target(), unix_utc(2026, 4, 12, 4));
    }

    #[test]
    fn test_two_days_out() {
        let countdown = budapest_countdown();
        let now = unix_utc(2026, 4, 10, 4);
        assert_eq!(countdown.hours_remaining(now), HoursRemaining::Hours(48));
    }

    #[test]
    fn test_truncates_partial_hours() {
        let countdown = budapest_countdown();
        let almost_two_days = UnixSeconds(unix_utc(2026, 4, 10, 4).as_i64() + 1);
        assert_eq!(
            countdown.hours_remaining(almost_two_days),
            HoursRemaining::Hours(47)
        );
    }

    #[test]
    fn test_clamps_at_zero_once_past() {
        let countdown = budapest_countdown();
        assert_eq!(
            countdown.hours_remaining(unix_utc(2026, 4, 12, 4)),
            HoursRemaining::Hours(0)
        );
        assert_eq!(
            countdown.hours_remaining(unix_utc(2027, 1, 1, 0)),
            HoursRemaining::Hours(0)
        );
    }

    #[test]
    fn test_unsynced_below_threshold() {
        let countdown = budapest_countdown();
        assert_eq!(
            countdown.hours_remaining(UnixSeconds(0)),
            HoursRemaining::Unsynced
        );
        assert_eq!(
            countdown.hours_remaining(UnixSeconds(99_999)),
            HoursRemaining::Unsynced
        );
    }

    #[test]
    fn test_days_and_remainder() {
        assert_eq!(days_and_remainder(0), (0, 0));
        assert_eq!(days_and_remainder(23), (0, 23));
        assert_eq!(days_and_remainder(24), (1, 0));
        assert_eq!(days_and_remainder(48), (2, 0));
        assert_eq!(days_and_remainder(50), (2, 2));
    }
}
