//! Property-based tests for HL7 timestamp conversion using QuickCheck

use chrono::NaiveDate;
use cobalt_convert::{date_from_hl7, date_time_from_hl7};
use quickcheck::{QuickCheck, TestResult};

fn prop_valid_calendar_dates_convert(year: u16, month: u8, day: u8) -> TestResult {
    let year = 1900 + i32::from(year % 200);
    let Some(date) = NaiveDate::from_ymd_opt(year, u32::from(month % 13), u32::from(day % 32)) else {
        return TestResult::discard();
    };

    let hl7 = date.format("%Y%m%d").to_string();
    let expected = date.format("%Y-%m-%d").to_string();
    TestResult::from_bool(
        date_time_from_hl7(&hl7).as_deref() == Some(expected.as_str())
            && date_from_hl7(&hl7).as_deref() == Some(expected.as_str()),
    )
}

fn prop_arbitrary_input_never_panics(input: String) -> TestResult {
    // Whatever comes out must at least start with a four digit year
    let ok = |value: Option<String>| match value {
        None => true,
        Some(v) => v.len() >= 4 && v.as_bytes()[..4].iter().all(u8::is_ascii_digit),
    };
    TestResult::from_bool(ok(date_time_from_hl7(&input)) && ok(date_from_hl7(&input)))
}

fn prop_times_gain_an_offset(hour: u8, minute: u8, negative: bool) -> TestResult {
    let (hour, minute) = (hour % 24, minute % 60);
    let sign = if negative { '-' } else { '+' };
    let hl7 = format!("20200229{hour:02}{minute:02}{sign}0500");

    let expected = format!("2020-02-29T{hour:02}:{minute:02}:00{sign}05:00");
    TestResult::from_bool(date_time_from_hl7(&hl7) == Some(expected))
}

#[test]
fn valid_calendar_dates_convert() {
    QuickCheck::new()
        .tests(500)
        .quickcheck(prop_valid_calendar_dates_convert as fn(u16, u8, u8) -> TestResult);
}

#[test]
fn arbitrary_input_never_panics() {
    QuickCheck::new()
        .tests(1000)
        .quickcheck(prop_arbitrary_input_never_panics as fn(String) -> TestResult);
}

#[test]
fn times_gain_an_offset() {
    QuickCheck::new()
        .tests(200)
        .quickcheck(prop_times_gain_an_offset as fn(u8, u8, bool) -> TestResult);
}
