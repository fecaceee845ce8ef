// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Calendar arithmetic for day-of-month recurrence rules.
//!
//! Months are 1-based throughout (`1` = January), matching `chrono`.

use chrono::{Datelike, Days, NaiveDate};

use crate::models::Subscription;

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year`. Out-of-range months are clamped
/// into 1..=12.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month.clamp(1, 12) {
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

/// The calendar day a nominal day-of-month actually falls on in the given
/// month: `nominal_day` clamped into 1..=31 and then to the month length.
pub fn normalize_day(year: i32, month: u32, nominal_day: u32) -> u32 {
    nominal_day.clamp(1, 31).min(days_in_month(year, month))
}

/// Concrete date of a day-of-month rule in the given month.
pub fn occurrence_in(year: i32, month: u32, nominal_day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, normalize_day(year, month, nominal_day))
}

/// Moves a (year, month) pair by `delta` calendar months.
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + (month.clamp(1, 12) as i32 - 1) + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// Next date, on or after `today`, that a day-of-month rule falls on.
pub fn next_payment_date(nominal_day: u32, today: NaiveDate) -> Option<NaiveDate> {
    let this_month = occurrence_in(today.year(), today.month(), nominal_day)?;
    if this_month >= today {
        return Some(this_month);
    }
    let (y, m) = shift_month(today.year(), today.month(), 1);
    occurrence_in(y, m, nominal_day)
}

/// Whether one of the subscription's reminder offsets lands on `today`.
///
/// Works from `recurrence.day_of_month` (default 1) independently of the
/// calendar projection.
pub fn is_reminder_due(sub: &Subscription, today: NaiveDate) -> bool {
    if !sub.is_active || sub.reminders.is_empty() {
        return false;
    }
    let day = sub.recurrence.day_of_month.unwrap_or(1);
    let Some(next) = next_payment_date(day, today) else {
        return false;
    };
    sub.reminders
        .iter()
        .any(|days_before| next.checked_sub_days(Days::new(u64::from(*days_before))) == Some(today))
}
