//! Relative-date labels anchored to the generation instant.

use crate::constants::DATE_FORMAT;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use rand::Rng;
use serde::Serialize;
use std::fmt;

/// A calendar date expressed relative to the generation instant.
///
/// The label always carries the absolute date, so a reader never has to know when the
/// document was produced to interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelativeDate {
    /// Whole days from the generation instant (negative is the past)
    pub offset_days: i64,
    pub date: NaiveDate,
    /// Human label, e.g. `Yesterday (03/14/2026)`
    pub label: String,
}

impl RelativeDate {
    /// Builds the date `now + offset_days` and its label.
    ///
    /// Offsets 0, -1 and 1 get `Today`, `Yesterday` and `Tomorrow` prefixes around the
    /// absolute date; any other offset renders as the bare `MM/DD/YYYY` date.
    pub fn from_offset(now: NaiveDateTime, offset_days: i64) -> Self {
        let date = now.date() + Duration::days(offset_days);
        let absolute = format_date(date);
        let label = match offset_days {
            0 => format!("Today ({absolute})"),
            -1 => format!("Yesterday ({absolute})"),
            1 => format!("Tomorrow ({absolute})"),
            _ => absolute,
        };
        Self {
            offset_days,
            date,
            label,
        }
    }

    pub fn today(now: NaiveDateTime) -> Self {
        Self::from_offset(now, 0)
    }
}

impl fmt::Display for RelativeDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Formats a date as `MM/DD/YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Completed years between `birth` and `on`.
pub fn age_on(birth: NaiveDate, on: NaiveDate) -> u32 {
    let mut years = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Samples a date of birth such that the person is exactly `age` years old on `today`.
pub fn birth_date_for_age<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate, age: u32) -> NaiveDate {
    // Birthdays fall in the half-open window (today - (age + 1) years, today - age years].
    let latest = shift_years(today, -(age as i32));
    let earliest = shift_years(today, -(age as i32 + 1)) + Duration::days(1);
    let span = (latest - earliest).num_days().max(0);
    earliest + Duration::days(rng.gen_range(0..=span))
}

/// Moves a date by whole years, clamping 29 February to 28 February when needed.
fn shift_years(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year() + years;
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
        .unwrap_or(date)
}
