//! Chooses what the 4-digit display shows: the hour count, the day count,
//! or dashes while the clock is not synced yet.

use crate::countdown::HoursRemaining;

/// Largest value a 4-digit display can show.
pub const DISPLAY_MAX: u16 = 9999;

/// Which unit the display is currently showing. The orchestrator alternates
/// between the two on a fixed cadence.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Hours,
    Days,
}

impl DisplayMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Hours => Self::Days,
            Self::Days => Self::Hours,
        }
    }
}

/// What to put on the display: a number or the all-dashes sync marker.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DisplayValue {
    Dashes,
    Number(u16),
}

/// The value to show for `remaining` in `mode`. Unsynced readings show
/// dashes in either mode; numbers clamp to [`DISPLAY_MAX`].
#[must_use]
pub fn display_value(remaining: HoursRemaining, mode: DisplayMode) -> DisplayValue {
    match remaining {
        HoursRemaining::Unsynced => DisplayValue::Dashes,
        HoursRemaining::Hours(hours) => {
            #[expect(
                clippy::integer_division_remainder_used,
                reason = "division by a nonzero constant"
            )]
            let value = match mode {
                DisplayMode::Hours => hours,
                DisplayMode::Days => hours / 24,
            };
            DisplayValue::Number(clamp_to_display(value))
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_lossless,
    reason = "value is clamped to four digits before the cast"
)]
const fn clamp_to_display(value: u32) -> u16 {
    if value > DISPLAY_MAX as u32 {
        DISPLAY_MAX
    } else {
        value as u16
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    #[test]
    fn test_unsynced_shows_dashes_in_both_modes() {
        assert_eq!(
            display_value(HoursRemaining::Unsynced, DisplayMode::Hours),
            DisplayValue::Dashes
        );
        assert_eq!(
            display_value(HoursRemaining::Unsynced, DisplayMode::Days),
            DisplayValue::Dashes
        );
    }

    #[test]
    fn test_hours_mode_shows_hours() {
        assert_eq!(
            display_value(HoursRemaining::Hours(48), DisplayMode::Hours),
            DisplayValue::Number(48)
        );
    }

    #[test]
    fn test_days_mode_truncates() {
        assert_eq!(
            display_value(HoursRemaining::Hours(48), DisplayMode::Days),
            DisplayValue::Number(2)
        );
        assert_eq!(
            display_value(HoursRemaining::Hours(47), DisplayMode::Days),
            DisplayValue::Number(1)
        );
        assert_eq!(
            display_value(HoursRemaining::Hours(23), DisplayMode::Days),
            DisplayValue::Number(0)
        );
    }

    #[test]
    fn test_clamps_to_four_digits() {
        assert_eq!(
            display_value(HoursRemaining::Hours(10_000), DisplayMode::Hours),
            DisplayValue::Number(9999)
        );
        // 10_000 days out is 240_000 hours.
        assert_eq!(
            display_value(HoursRemaining::Hours(240_000), DisplayMode::Days),
            DisplayValue::Number(9999)
        );
    }

    #[test]
    fn test_toggle_alternates() {
        assert_eq!(DisplayMode::Hours.toggled(), DisplayMode::Days);
        assert_eq!(DisplayMode::Days.toggled(), DisplayMode::Hours);
        assert_eq!(DisplayMode::default(), DisplayMode::Hours);
    }
}
