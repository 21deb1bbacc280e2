//! Unix timestamp type for time-related devices

use time::{OffsetDateTime, UtcOffset};

/// A clock that was never set reads epoch-near, so anything below this
/// cannot be a synchronized wall-clock reading.
const MIN_SYNCED_UNIX: i64 = 100_000;

/// Units-safe wrapper for Unix timestamps (seconds since 1970-01-01 00:00:00 UTC)
#[repr(transparent)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct UnixSeconds(pub i64);

impl UnixSeconds {
    /// Get the underlying i64 value
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// Convert NTP seconds (since 1900-01-01) to Unix seconds (since
    /// 1970-01-01), rejecting pre-1970 results.
    #[expect(
        clippy::cast_lossless,
        clippy::arithmetic_side_effects,
        reason = "u32 promoted to i64 cannot overflow the subtraction"
    )]
    #[must_use]
    pub const fn from_ntp_seconds(ntp: u32) -> Option<Self> {
        // 70 years and 17 leap days between the NTP and Unix epochs.
        const NTP_TO_UNIX_SECONDS: i64 = 2_208_988_800;
        let seconds = (ntp as i64) - NTP_TO_UNIX_SECONDS;
        if seconds >= 0 { Some(Self(seconds)) } else { None }
    }

    /// Whether this reading is plausibly a synchronized wall-clock time
    /// rather than elapsed-time-since-boot.
    #[must_use]
    pub const fn is_plausibly_synced(self) -> bool {
        self.0 >= MIN_SYNCED_UNIX
    }

    /// Convert to OffsetDateTime with the given timezone offset
    #[must_use]
    pub fn to_offset_datetime(self, offset: UtcOffset) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.as_i64())
            .ok()
            .and_then(|dt| dt.checked_to_offset(offset))
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    #[test]
    fn test_from_ntp_seconds() {
        // 2026-01-01T00:00:00Z is NTP 3_976_214_400 (unix 1_767_225_600 + era offset)
        let unix = UnixSeconds::from_ntp_seconds(3_976_214_400).unwrap();
        assert_eq!(unix.as_i64(), 1_767_225_600);
    }

    #[test]
    fn test_from_ntp_seconds_rejects_pre_1970() {
        // One second before the Unix epoch in NTP time
        assert!(UnixSeconds::from_ntp_seconds(2_208_988_799).is_none());
        // Exactly the epoch is accepted
        assert_eq!(
            UnixSeconds::from_ntp_seconds(2_208_988_800),
            Some(UnixSeconds(0))
        );
    }

    #[test]
    fn test_to_offset_datetime() {
        use time::Month;

        // 2026-04-12 04:00 UTC seen from UTC+2.
        let offset = UtcOffset::from_whole_seconds(7200).unwrap();
        let dt = UnixSeconds(1_775_966_400)
            .to_offset_datetime(offset)
            .unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2026, Month::April, 12));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (6, 0, 0));
    }

    #[test]
    fn test_plausibly_synced_threshold() {
        assert!(!UnixSeconds(0).is_plausibly_synced());
        assert!(!UnixSeconds(99_999).is_plausibly_synced());
        assert!(UnixSeconds(100_000).is_plausibly_synced());
        assert!(UnixSeconds(1_767_312_000).is_plausibly_synced());
    }
}
