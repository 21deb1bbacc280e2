//! POSIX time-zone rule: fixed UTC offset plus optional daylight-saving
//! transitions of the `Mm.w.d[/time]` form (e.g. `CET-1CEST,M3.5.0/2,M10.5.0/3`).

use time::util::days_in_year_month;
use time::{Date, Month, PrimitiveDateTime, Time, UtcOffset};

use crate::error::{Error, Result};
use crate::unix_seconds::UnixSeconds;

/// Default transition time when a rule has no `/time` suffix (02:00 local).
const DEFAULT_TRANSITION_SECS: i32 = 2 * 3600;

/// One `Mm.w.d[/time]` transition: week `w` (5 = last) occurrence of weekday
/// `d` (0 = Sunday) in month `m`, at `local_secs` past local midnight.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Transition {
    month: u8,
    week: u8,
    weekday: u8,
    local_secs: i32,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct DstRules {
    start: Transition,
    end: Transition,
}

/// A parsed POSIX TZ rule.
///
/// Offsets are stored east-positive (UTC+1 is `3600`), the opposite of the
/// POSIX string convention where `CET-1` means one hour east.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TzRule {
    std_offset_secs: i32,
    dst_offset_secs: i32,
    dst: Option<DstRules>,
}

impl TzRule {
    /// Parse a POSIX TZ string of the subset `STDoffset[DST[offset][,start,end]]`
    /// with `Mm.w.d[/time]` transition rules. Day-of-year (`Jn`/`n`) rules are
    /// not accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTimeZoneSpec`] when the string does not match
    /// the recognized subset.
    pub fn parse(spec: &str) -> Result<Self> {
        let (zone, rules) = match spec.split_once(',') {
            Some((zone, rules)) => (zone, Some(rules)),
            None => (spec, None),
        };

        let rest = skip_name(zone)?;
        let (std_posix, rest) = take_offset(rest).ok_or(Error::InvalidTimeZoneSpec)?;
        let std_offset_secs = checked_neg(std_posix)?;

        if rest.is_empty() {
            // Fixed-offset zone; transition rules without a DST name are malformed.
            if rules.is_some() {
                return Err(Error::InvalidTimeZoneSpec);
            }
            return Ok(Self {
                std_offset_secs,
                dst_offset_secs: std_offset_secs,
                dst: None,
            });
        }

        let rest = skip_name(rest)?;
        let (dst_offset_secs, rest) = match take_offset(rest) {
            Some((dst_posix, rest)) => (checked_neg(dst_posix)?, rest),
            // POSIX default: DST is one hour ahead of standard time.
            None => (
                std_offset_secs
                    .checked_add(3600)
                    .ok_or(Error::InvalidTimeZoneSpec)?,
                rest,
            ),
        };
        if !rest.is_empty() {
            return Err(Error::InvalidTimeZoneSpec);
        }

        // A DST name always comes with explicit rules in this subset.
        let rules = rules.ok_or(Error::InvalidTimeZoneSpec)?;
        let (start, end) = rules.split_once(',').ok_or(Error::InvalidTimeZoneSpec)?;
        let start = parse_transition(start)?;
        let end = parse_transition(end)?;

        Ok(Self {
            std_offset_secs,
            dst_offset_secs,
            dst: Some(DstRules { start, end }),
        })
    }

    /// The standard-time UTC offset in seconds, east-positive.
    #[must_use]
    pub const fn std_offset_secs(&self) -> i32 {
        self.std_offset_secs
    }

    /// The UTC offset in effect at `instant`, in seconds east-positive.
    ///
    /// Pure calendar math; transition instants are computed for the civil
    /// year the instant falls in. Rules whose start lies after their end
    /// (southern hemisphere) span the year boundary.
    #[must_use]
    pub fn offset_seconds(&self, instant: UnixSeconds) -> i32 {
        let Some(rules) = &self.dst else {
            return self.std_offset_secs;
        };

        let unix = instant.as_i64();
        let Some(year) = year_at_offset(unix, self.std_offset_secs) else {
            return self.std_offset_secs;
        };

        // Start is expressed in standard local time, end in DST local time.
        let (Some(start), Some(end)) = (
            transition_instant(year, &rules.start, self.std_offset_secs),
            transition_instant(year, &rules.end, self.dst_offset_secs),
        ) else {
            return self.std_offset_secs;
        };

        let in_dst = if start <= end {
            start <= unix && unix < end
        } else {
            unix >= start || unix < end
        };

        if in_dst {
            self.dst_offset_secs
        } else {
            self.std_offset_secs
        }
    }

    /// Resolve a wall-clock datetime in this zone to a Unix instant, the way
    /// `mktime` does with DST detection left to the library: guess standard
    /// time, then correct once if the instant lands under the other offset.
    /// Times inside the spring-forward gap resolve to the last guess.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TargetOutOfRange`] when the datetime cannot be
    /// represented with this zone's offsets.
    pub fn unix_from_local(&self, local: PrimitiveDateTime) -> Result<UnixSeconds> {
        let mut offset = self.std_offset_secs;
        let mut candidate = at_offset(local, offset)?;
        for _ in 0..2 {
            let actual = self.offset_seconds(candidate);
            if actual == offset {
                break;
            }
            offset = actual;
            candidate = at_offset(local, offset)?;
        }
        Ok(candidate)
    }
}

fn at_offset(local: PrimitiveDateTime, offset_secs: i32) -> Result<UnixSeconds> {
    let offset =
        UtcOffset::from_whole_seconds(offset_secs).map_err(|_| Error::TargetOutOfRange)?;
    Ok(UnixSeconds(local.assume_offset(offset).unix_timestamp()))
}

/// The civil year at `unix` under a fixed offset, if representable.
fn year_at_offset(unix: i64, offset_secs: i32) -> Option<i32> {
    let offset = UtcOffset::from_whole_seconds(offset_secs).ok()?;
    UnixSeconds(unix)
        .to_offset_datetime(offset)
        .map(|dt| dt.year())
}

/// The Unix instant of a transition in `year`, given the local offset in
/// effect just before it.
fn transition_instant(year: i32, transition: &Transition, offset_secs: i32) -> Option<i64> {
    let date = transition_date(year, transition)?;
    let offset = UtcOffset::from_whole_seconds(offset_secs).ok()?;
    let midnight = PrimitiveDateTime::new(date, Time::MIDNIGHT)
        .assume_offset(offset)
        .unix_timestamp();
    midnight.checked_add(i64::from(transition.local_secs))
}

/// The calendar date of the `w`-th (5 = last) `weekday` of `month` in `year`.
#[expect(
    clippy::arithmetic_side_effects,
    reason = "weekday distances are mod-7 bounded, week factor is at most 4"
)]
fn transition_date(year: i32, transition: &Transition) -> Option<Date> {
    let month = Month::try_from(transition.month).ok()?;
    let weekday = i64::from(transition.weekday);

    if transition.week >= 5 {
        let last = Date::from_calendar_date(year, month, days_in_year_month(year, month)).ok()?;
        let back = (i64::from(last.weekday().number_days_from_sunday()) - weekday).rem_euclid(7);
        last.checked_sub(time::Duration::days(back))
    } else {
        // Weeks 1-4 land inside the month (day 28 at the latest).
        let first = Date::from_calendar_date(year, month, 1).ok()?;
        let forward =
            (weekday - i64::from(first.weekday().number_days_from_sunday())).rem_euclid(7);
        first.checked_add(time::Duration::days(
            forward + 7 * (i64::from(transition.week) - 1),
        ))
    }
}

fn checked_neg(posix_secs: i32) -> Result<i32> {
    posix_secs.checked_neg().ok_or(Error::InvalidTimeZoneSpec)
}

/// Consume the leading alphabetic zone name; at least one letter is required.
fn skip_name(s: &str) -> Result<&str> {
    let rest = s.trim_start_matches(|ch: char| ch.is_ascii_alphabetic());
    if rest.len() == s.len() {
        return Err(Error::InvalidTimeZoneSpec);
    }
    Ok(rest)
}

/// Take a `[+|-]h[:mm[:ss]]` offset in POSIX sign convention, returning its
/// value in seconds and the rest of the string. `None` when the string does
/// not start with an offset.
fn take_offset(s: &str) -> Option<(i32, &str)> {
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (secs, rest) = take_hms(rest)?;
    let secs = if negative { secs.checked_neg()? } else { secs };
    Some((secs, rest))
}

/// Take `h[:mm[:ss]]` as seconds, hours bounded to 0..=24.
#[expect(
    clippy::arithmetic_side_effects,
    reason = "components are bounded (h <= 24, m/s <= 59) before combining"
)]
fn take_hms(s: &str) -> Option<(i32, &str)> {
    let (hours, rest) = take_u32(s)?;
    if hours > 24 {
        return None;
    }
    let mut secs = hours * 3600;

    let Some(after_colon) = rest.strip_prefix(':') else {
        return Some((i32::try_from(secs).ok()?, rest));
    };
    let (minutes, rest) = take_u32(after_colon)?;
    if minutes > 59 {
        return None;
    }
    secs += minutes * 60;

    let Some(after_colon) = rest.strip_prefix(':') else {
        return Some((i32::try_from(secs).ok()?, rest));
    };
    let (seconds, rest) = take_u32(after_colon)?;
    if seconds > 59 {
        return None;
    }
    secs += seconds;

    Some((i32::try_from(secs).ok()?, rest))
}

/// Take a leading run of ASCII digits as a number (at most 3 digits).
#[expect(
    clippy::arithmetic_side_effects,
    reason = "at most three digits, so the value is bounded by 999"
)]
fn take_u32(s: &str) -> Option<(u32, &str)> {
    let digits = s.len() - s.trim_start_matches(|ch: char| ch.is_ascii_digit()).len();
    if digits == 0 || digits > 3 {
        return None;
    }
    let (number, rest) = s.split_at(digits);
    Some((number.parse().ok()?, rest))
}

/// Parse one `Mm.w.d[/time]` transition rule.
fn parse_transition(s: &str) -> Result<Transition> {
    let s = s.strip_prefix('M').ok_or(Error::InvalidTimeZoneSpec)?;
    let (date_part, time_part) = match s.split_once('/') {
        Some((date_part, time_part)) => (date_part, Some(time_part)),
        None => (s, None),
    };

    let mut fields = date_part.split('.');
    let month = parse_field(fields.next(), 1, 12)?;
    let week = parse_field(fields.next(), 1, 5)?;
    let weekday = parse_field(fields.next(), 0, 6)?;
    if fields.next().is_some() {
        return Err(Error::InvalidTimeZoneSpec);
    }

    let local_secs = match time_part {
        Some(time_part) => {
            let (secs, rest) = take_hms(time_part).ok_or(Error::InvalidTimeZoneSpec)?;
            if !rest.is_empty() {
                return Err(Error::InvalidTimeZoneSpec);
            }
            secs
        }
        None => DEFAULT_TRANSITION_SECS,
    };

    Ok(Transition {
        month,
        week,
        weekday,
        local_secs,
    })
}

fn parse_field(field: Option<&str>, min: u8, max: u8) -> Result<u8> {
    let value: u8 = field
        .and_then(|text| text.parse().ok())
        .ok_or(Error::InvalidTimeZoneSpec)?;
    if value < min || value > max {
        return Err(Error::InvalidTimeZoneSpec);
    }
    Ok(value)
}
