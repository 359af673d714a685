// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::{Date, Month};

/// Returns the first day of the month containing `date`.
pub fn first_of_month(date: Date) -> Date {
    date.replace_day(1).unwrap_or(date)
}

/// Moves `date` by whole calendar months, clamping the day to the length of
/// the target month (Jan 31 + 1 month lands on Feb 28/29).
pub fn shift_date_by_months(date: Date, months: i32) -> Option<Date> {
    let base_month = i32::from(date.month() as u8);
    let total_month = months.checked_add(base_month - 1)?;
    let year = date.year().checked_add(total_month.div_euclid(12))?;
    let month_number = (total_month.rem_euclid(12) + 1) as u8;
    let month = Month::try_from(month_number).ok()?;
    let max_day = last_day_of_month(year, month)?;
    Date::from_calendar_date(year, month, date.day().min(max_day)).ok()
}

pub fn last_day_of_month(year: i32, month: Month) -> Option<u8> {
    let (next_year, next_month) = if month == Month::December {
        (year + 1, Month::January)
    } else {
        (year, month.next())
    };

    let first_next_month = Date::from_calendar_date(next_year, next_month, 1).ok()?;
    let last = first_next_month.previous_day()?;
    Some(last.day())
}

/// Wire encoding of a month anchor: `YYYY-MM`.
pub fn format_year_month(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), date.month() as u8)
}

/// Human label for the month header, e.g. `March 2024`.
pub fn month_label(date: Date) -> String {
    format!("{} {}", date.month(), date.year())
}
