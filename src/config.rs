//! Build-time configuration baked in by `build.rs` from environment
//! variables (or a `.env` file). Parsing happens once at startup so a bad
//! value fails loudly instead of producing a silent countdown to nowhere.

use core::str::FromStr;

use time::{Date, Month, PrimitiveDateTime, Time};

use crate::error::{Error, Result};
use crate::tz::TzRule;

/// Everything the firmware needs to know that is not wired to a pin.
#[derive(Debug, Clone)]
pub struct Config {
    /// The countdown target as a wall-clock datetime in [`Config::tz`].
    pub target_datetime: PrimitiveDateTime,
    /// Human-readable form of the target used in report lines.
    pub target_label: &'static str,
    pub tz: TzRule,
    pub wifi_ssid: &'static str,
    pub wifi_pass: &'static str,
    /// Comma-separated NTP host names, tried in order.
    pub ntp_servers: &'static str,
    pub print_interval_ms: u64,
    pub resync_interval_ms: u64,
    pub sync_grace_ms: u64,
    pub display_mode_ms: u64,
}

impl Config {
    /// Parse the configuration baked in at build time.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending value when the target datetime,
    /// time-zone rule, or an interval does not parse.
    pub fn from_build_env() -> Result<Self> {
        Ok(Self {
            target_datetime: parse_datetime(env!("TARGET_DATETIME"))?,
            target_label: env!("TARGET_LABEL"),
            tz: TzRule::parse(env!("TZ_SPEC"))?,
            wifi_ssid: env!("WIFI_SSID"),
            wifi_pass: env!("WIFI_PASS"),
            ntp_servers: env!("NTP_SERVERS"),
            print_interval_ms: parse_secs_to_ms(
                env!("PRINT_INTERVAL_SECS"),
                "PRINT_INTERVAL_SECS",
            )?,
            resync_interval_ms: parse_secs_to_ms(
                env!("RESYNC_INTERVAL_SECS"),
                "RESYNC_INTERVAL_SECS",
            )?,
            sync_grace_ms: parse_secs_to_ms(env!("SYNC_GRACE_SECS"), "SYNC_GRACE_SECS")?,
            display_mode_ms: parse_secs_to_ms(env!("DISPLAY_MODE_SECS"), "DISPLAY_MODE_SECS")?,
        })
    }
}

/// Parse a `YYYY-MM-DDTHH:MM:SS` datetime with no zone suffix.
fn parse_datetime(text: &str) -> Result<PrimitiveDateTime> {
    let (date_part, time_part) = text.split_once('T').ok_or(Error::InvalidTargetDatetime)?;

    let mut fields = date_part.split('-');
    let year: i32 = datetime_field(fields.next())?;
    let month: u8 = datetime_field(fields.next())?;
    let day: u8 = datetime_field(fields.next())?;
    if fields.next().is_some() {
        return Err(Error::InvalidTargetDatetime);
    }

    let mut fields = time_part.split(':');
    let hour: u8 = datetime_field(fields.next())?;
    let minute: u8 = datetime_field(fields.next())?;
    let second: u8 = datetime_field(fields.next())?;
    if fields.next().is_some() {
        return Err(Error::InvalidTargetDatetime);
    }

    let month = Month::try_from(month).map_err(|_| Error::InvalidTargetDatetime)?;
    let date =
        Date::from_calendar_date(year, month, day).map_err(|_| Error::InvalidTargetDatetime)?;
    let time = Time::from_hms(hour, minute, second).map_err(|_| Error::InvalidTargetDatetime)?;
    Ok(PrimitiveDateTime::new(date, time))
}

fn datetime_field<T: FromStr>(field: Option<&str>) -> Result<T> {
    field
        .and_then(|text| text.parse().ok())
        .ok_or(Error::InvalidTargetDatetime)
}

fn parse_secs_to_ms(text: &str, name: &'static str) -> Result<u64> {
    let secs: u64 = text.parse().map_err(|_| Error::InvalidConfigValue(name))?;
    secs.checked_mul(1000)
        .ok_or(Error::InvalidConfigValue(name))
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime() {
        let datetime = parse_datetime("2026-04-12T06:00:00").unwrap();
        assert_eq!(datetime.year(), 2026);
        assert_eq!(datetime.month(), Month::April);
        assert_eq!(datetime.day(), 12);
        assert_eq!(datetime.hour(), 6);
        assert_eq!(datetime.minute(), 0);
        assert_eq!(datetime.second(), 0);
    }

    #[test]
    fn test_parse_datetime_rejects_malformed() {
        for text in [
            "",
            "2026-04-12",            // no time
            "2026-04-12 06:00:00",   // space instead of T
            "2026-04-12T06:00",      // missing seconds
            "2026-13-01T00:00:00",   // month out of range
            "2026-02-30T00:00:00",   // day out of range
            "2026-04-12T24:00:00",   // hour out of range
            "2026-04-12T06:00:00Z",  // zone suffix not accepted
            "2026-04-12T06:00:00:01",
        ] {
            assert!(parse_datetime(text).is_err(), "accepted {text:?}");
        }
    }

    #[test]
    fn test_parse_secs_to_ms() {
        assert_eq!(parse_secs_to_ms("60", "X").unwrap(), 60_000);
        assert_eq!(parse_secs_to_ms("0", "X").unwrap(), 0);
        assert!(parse_secs_to_ms("", "X").is_err());
        assert!(parse_secs_to_ms("-1", "X").is_err());
        assert!(parse_secs_to_ms("60s", "X").is_err());
        assert!(parse_secs_to_ms("18446744073709551615", "X").is_err());
    }

    #[test]
    fn test_baked_in_defaults_parse() {
        // Whatever build.rs baked in must survive startup parsing.
        let config = Config::from_build_env().unwrap();
        assert!(config.print_interval_ms > 0);
        assert!(config.display_mode_ms > 0);
    }
}
