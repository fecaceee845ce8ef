// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Projects subscription records onto concrete calendar dates.

use chrono::{Datelike, Days, NaiveDate};
use std::collections::{BTreeMap, HashSet};

use crate::models::{DayData, EventKind, Schedule, Subscription, SubscriptionEvent};
use crate::recurrence::{occurrence_in, shift_month};

/// Days shown by the month calendar: six Monday-first weeks.
pub const GRID_DAYS: u64 = 42;

/// Stable event identity, `<subscription>-<kind>-<YYYY-MM-DD>`.
pub fn event_id(subscription_id: &str, kind: EventKind, date: NaiveDate) -> String {
    format!(
        "{}-{}-{}",
        subscription_id,
        kind.as_str(),
        date.format("%Y-%m-%d")
    )
}

/// Every event of the active, well-formed subscriptions that falls inside
/// `[start, end]` (both inclusive), in canonical order: subscription sort
/// order, then subscription id, then date.
///
/// Malformed records are skipped with a warning; an inverted window yields
/// nothing.
pub fn project(subs: &[Subscription], start: NaiveDate, end: NaiveDate) -> Vec<SubscriptionEvent> {
    if start > end {
        return Vec::new();
    }
    let mut active: Vec<&Subscription> = subs
        .iter()
        .filter(|s| s.is_active)
        .filter(|s| match s.validate() {
            Ok(()) => true,
            Err(err) => {
                log::warn!("skipping subscription in projection: {}", err);
                false
            }
        })
        .collect();
    active.sort_by(|a, b| a.order_key().cmp(&b.order_key()));

    // One month either side catches clamped dates near the window edges.
    let months = candidate_months(start, end);
    log::debug!(
        "projecting {} subscriptions over {}..={} ({} candidate months)",
        active.len(),
        start,
        end,
        months.len()
    );

    let mut seen = HashSet::new();
    let mut events = Vec::new();
    for sub in active {
        let mut emit = |kind: EventKind, nominal_day: u32| {
            for &(year, month) in &months {
                let Some(date) = occurrence_in(year, month, nominal_day) else {
                    continue;
                };
                if date < start || date > end {
                    continue;
                }
                let id = event_id(&sub.id, kind, date);
                if seen.insert(id.clone()) {
                    events.push(make_event(sub, id, kind, date));
                }
            }
        };
        match sub.schedule() {
            Schedule::CreditCard {
                statement_day,
                due_day,
            } => {
                if let Some(day) = statement_day {
                    emit(EventKind::Statement, day);
                }
                if let Some(day) = due_day {
                    emit(EventKind::Due, day);
                }
            }
            Schedule::Recurring { day_of_month } => emit(EventKind::Payment, day_of_month),
        }
    }

    events.sort_by(|a, b| {
        (a.sort_order, &a.subscription_id, a.date, a.kind).cmp(&(
            b.sort_order,
            &b.subscription_id,
            b.date,
            b.kind,
        ))
    });
    events
}

fn make_event(
    sub: &Subscription,
    id: String,
    kind: EventKind,
    date: NaiveDate,
) -> SubscriptionEvent {
    let title = match kind {
        EventKind::Statement => format!("{} - Statement", sub.name),
        EventKind::Due => format!("{} - Due", sub.name),
        EventKind::Payment | EventKind::Reminder => sub.name.clone(),
    };
    SubscriptionEvent {
        id,
        subscription_id: sub.id.clone(),
        date,
        kind,
        title,
        category: sub.category,
        amount: sub.amount,
        currency: sub.currency.clone(),
        sort_order: sub.sort_order,
    }
}

fn candidate_months(start: NaiveDate, end: NaiveDate) -> Vec<(i32, u32)> {
    let (mut year, mut month) = shift_month(start.year(), start.month(), -1);
    let last = shift_month(end.year(), end.month(), 1);
    let mut out = Vec::new();
    while (year, month) <= last {
        out.push((year, month));
        (year, month) = shift_month(year, month, 1);
    }
    out
}

/// One entry per day of `[start, end]`, each carrying that day's events in
/// the order they appear in `events`.
pub fn group_by_day(events: &[SubscriptionEvent], start: NaiveDate, end: NaiveDate) -> Vec<DayData> {
    let mut by_date: BTreeMap<NaiveDate, Vec<SubscriptionEvent>> = BTreeMap::new();
    for e in events {
        by_date.entry(e.date).or_default().push(e.clone());
    }
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| DayData {
            date,
            events: by_date.remove(&date).unwrap_or_default(),
        })
        .collect()
}

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (ny, nm) = shift_month(year, month, 1);
    let last = NaiveDate::from_ymd_opt(ny, nm, 1)?.pred_opt()?;
    Some((first, last))
}

/// The Monday-first, six-week grid that contains the given month.
pub fn month_grid(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let (first, _) = month_bounds(year, month)?;
    let lead = u64::from(first.weekday().num_days_from_monday());
    let start = first.checked_sub_days(Days::new(lead))?;
    let end = start.checked_add_days(Days::new(GRID_DAYS - 1))?;
    Some((start, end))
}
