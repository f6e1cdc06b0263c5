use super::model::RingCounts;
use super::{CELESTIAL_CYCLE_YEARS, DAYS_PER_WEEK, DEFAULT_CLOCK_FORMAT, EPOCH_YEAR, MS_PER_DAY};
use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use std::fmt::Write;
use strum::Display as StrumDisplay;

/// Progress through each ring's cycle, every value in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeFractions {
    pub spirit: f64,
    pub planetary: f64,
    pub celestial: f64,
}

/// Day-of-week table, indexed from Sunday, paired with the ruling planet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
pub enum PlanetaryDay {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl PlanetaryDay {
    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => Self::Sunday,
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
        }
    }

    pub fn ruler(&self) -> &'static str {
        match self {
            Self::Sunday => "Sun",
            Self::Monday => "Moon",
            Self::Tuesday => "Mars",
            Self::Wednesday => "Mercury",
            Self::Thursday => "Jupiter",
            Self::Friday => "Venus",
            Self::Saturday => "Saturn",
        }
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn year_length(year: i32) -> u32 {
    if is_leap_year(year) { 366 } else { 365 }
}

fn millis_since_midnight(now: &NaiveDateTime) -> f64 {
    // chrono reports leap seconds as nanos past 1e9; fold them into the last second
    let nanos = now.nanosecond().min(999_999_999);
    now.num_seconds_from_midnight() as f64 * 1000.0 + nanos as f64 / 1_000_000.0
}

/// Elapsed share of the local day, in `[0, 1)`.
pub fn day_progress(now: &NaiveDateTime) -> f64 {
    millis_since_midnight(now) / MS_PER_DAY
}

pub fn hours_into_day(now: &NaiveDateTime) -> f64 {
    day_progress(now) * 24.0
}

pub fn day_of_week(now: &NaiveDateTime) -> u32 {
    now.weekday().num_days_from_sunday()
}

pub fn year_fraction(now: &NaiveDateTime) -> f64 {
    let day_of_year = now.ordinal0() as f64;
    (day_of_year + day_progress(now)) / year_length(now.year()) as f64
}

pub fn week_fraction(now: &NaiveDateTime) -> f64 {
    let weeks = (day_of_week(now) as f64 + hours_into_day(now) / 24.0) / DAYS_PER_WEEK;
    wrap_unit(weeks)
}

pub fn celestial_fraction(now: &NaiveDateTime, year_fraction: f64) -> f64 {
    let years_since_epoch = (now.year() - EPOCH_YEAR) as f64 + year_fraction;
    wrap_unit(years_since_epoch.rem_euclid(CELESTIAL_CYCLE_YEARS) / CELESTIAL_CYCLE_YEARS)
}

// rem_euclid can round up to the modulus itself for tiny negative inputs
fn wrap_unit(value: f64) -> f64 {
    let wrapped = value.rem_euclid(1.0);
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

/// Derives every ring's cycle position from a local wall-clock instant.
///
/// Rings without items get a fraction of `0`.
pub fn compute_fractions(now: &NaiveDateTime, counts: &RingCounts) -> TimeFractions {
    let year = year_fraction(now);

    TimeFractions {
        spirit: if counts.spirit > 0 { wrap_unit(year) } else { 0.0 },
        planetary: if counts.planetary_groups > 0 {
            week_fraction(now)
        } else {
            0.0
        },
        celestial: if counts.celestial > 0 {
            celestial_fraction(now, year)
        } else {
            0.0
        },
    }
}

/// Formats the `hour:minute` label, falling back to `%H:%M` when the
/// configured format cannot be rendered.
pub fn clock_text(now: &NaiveDateTime, format: &str) -> String {
    let mut text = String::new();
    if write!(text, "{}", now.format(format)).is_err() {
        log::warn!("Invalid clock format '{}', using default", format);
        text.clear();
        let _ = write!(text, "{}", now.format(DEFAULT_CLOCK_FORMAT));
    }
    text
}
