//! End-to-end countdown arithmetic: local targets resolved through the zone
//! rules, hour counts across DST transitions, and the report breakdown.
#![cfg(feature = "host")]

use countdown_clock::countdown::days_and_remainder;
use countdown_clock::{Countdown, HoursRemaining, TzRule, UnixSeconds};
use time::{Date, Month, PrimitiveDateTime, Time};

/// 2026-04-12 06:00 in Budapest is 04:00 UTC (DST active).
const TARGET_UNIX: i64 = 1_775_966_400;

#[test]
fn two_days_out_reads_forty_eight_hours() {
    let countdown = countdown_to(2026, Month::April, 12, 6, 0);
    assert_eq!(countdown.target(), UnixSeconds(TARGET_UNIX));

    let two_days_before = UnixSeconds(TARGET_UNIX - 48 * 3600);
    assert_eq!(
        countdown.hours_remaining(two_days_before),
        HoursRemaining::Hours(48)
    );

    // One second later the whole-hour count truncates down.
    assert_eq!(
        countdown.hours_remaining(UnixSeconds(TARGET_UNIX - 48 * 3600 + 1)),
        HoursRemaining::Hours(47)
    );
}

#[test]
fn reaching_the_target_pins_at_zero() {
    let countdown = countdown_to(2026, Month::April, 12, 6, 0);
    assert_eq!(
        countdown.hours_remaining(UnixSeconds(TARGET_UNIX)),
        HoursRemaining::Hours(0)
    );
    // The first second past the target clamps instead of going negative.
    assert_eq!(
        countdown.hours_remaining(UnixSeconds(TARGET_UNIX + 1)),
        HoursRemaining::Hours(0)
    );
    assert_eq!(
        countdown.hours_remaining(UnixSeconds(TARGET_UNIX + 86_400)),
        HoursRemaining::Hours(0)
    );
}

#[test]
fn implausible_clock_readings_are_unsynced() {
    let countdown = countdown_to(2026, Month::April, 12, 6, 0);
    assert_eq!(
        countdown.hours_remaining(UnixSeconds(0)),
        HoursRemaining::Unsynced
    );
    assert_eq!(
        countdown.hours_remaining(UnixSeconds(99_999)),
        HoursRemaining::Unsynced
    );
    // The first plausible second counts normally, however far out it is.
    assert_eq!(
        countdown.hours_remaining(UnixSeconds(100_000)),
        HoursRemaining::Hours(493_296)
    );
}

#[test]
fn hours_never_increase_as_the_clock_advances() {
    let countdown = countdown_to(2026, Month::April, 12, 6, 0);
    // Ten-minute steps from three days out to a day past the target.
    let start = TARGET_UNIX - 3 * 86_400;
    let mut previous = u32::MAX;
    for now in (start..=TARGET_UNIX + 86_400).step_by(600) {
        let reading = countdown.hours_remaining(UnixSeconds(now));
        // Rereading the same instant gives the same answer.
        assert_eq!(countdown.hours_remaining(UnixSeconds(now)), reading);
        let hours = match reading {
            HoursRemaining::Hours(hours) => hours,
            HoursRemaining::Unsynced => panic!("reading at unix {now} should be synced"),
        };
        assert!(hours <= previous, "count rose at unix {now}");
        previous = hours;
    }
    assert_eq!(previous, 0);
}

#[test]
fn fall_back_night_has_twenty_five_hours_between_noons() {
    let countdown = countdown_to(2026, Month::October, 25, 12, 0);
    let noon_before = budapest()
        .unix_from_local(datetime(2026, Month::October, 24, 12, 0))
        .expect("must resolve");
    assert_eq!(
        countdown.hours_remaining(noon_before),
        HoursRemaining::Hours(25)
    );
}

#[test]
fn spring_forward_night_has_twenty_three_hours_between_noons() {
    let countdown = countdown_to(2026, Month::March, 29, 12, 0);
    let noon_before = budapest()
        .unix_from_local(datetime(2026, Month::March, 28, 12, 0))
        .expect("must resolve");
    assert_eq!(
        countdown.hours_remaining(noon_before),
        HoursRemaining::Hours(23)
    );
}

#[test]
fn report_breakdown_into_days_and_hours() {
    assert_eq!(days_and_remainder(48), (2, 0));
    assert_eq!(days_and_remainder(47), (1, 23));
    assert_eq!(days_and_remainder(25), (1, 1));
    assert_eq!(days_and_remainder(23), (0, 23));
    assert_eq!(days_and_remainder(0), (0, 0));
}

fn budapest() -> TzRule {
    TzRule::parse("CET-1CEST,M3.5.0/2,M10.5.0/3").expect("zone spec must parse")
}

fn datetime(year: i32, month: Month, day: u8, hour: u8, minute: u8) -> PrimitiveDateTime {
    PrimitiveDateTime::new(
        Date::from_calendar_date(year, month, day).expect("valid date"),
        Time::from_hms(hour, minute, 0).expect("valid time"),
    )
}

fn countdown_to(year: i32, month: Month, day: u8, hour: u8, minute: u8) -> Countdown {
    Countdown::new(&budapest(), datetime(year, month, day, hour, minute), "target")
        .expect("target must resolve")
}
