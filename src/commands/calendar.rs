// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::filters::{FilterSpec, filter};
use crate::models::{Category, DayData};
use crate::projector::{group_by_day, month_grid, project};
use crate::store;
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_month, pretty_table, today};
use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let today = match sub.get_one::<String>("today") {
        Some(s) => parse_date(s)?,
        None => today(),
    };
    let (start, end) = resolve_window(sub, today)?;
    let spec = read_filter(sub)?;
    let days = calendar_days(conn, start, end, &spec, today)?;

    let shown: Vec<&DayData> = if sub.get_flag("all_days") {
        days.iter().collect()
    } else {
        days.iter().filter(|d| !d.events.is_empty()).collect()
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &shown)? {
        return Ok(());
    }

    let mut rows = Vec::new();
    for day in shown {
        if day.events.is_empty() {
            rows.push(vec![
                day.date.format("%Y-%m-%d %a").to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ]);
        }
        for e in &day.events {
            rows.push(vec![
                day.date.format("%Y-%m-%d %a").to_string(),
                e.kind.to_string(),
                e.title.clone(),
                e.category.to_string(),
                e.amount
                    .map(|a| fmt_money(&a, &e.currency))
                    .unwrap_or_default(),
            ]);
        }
    }
    println!("{} .. {}", start, end);
    println!(
        "{}",
        pretty_table(&["Date", "Kind", "Title", "Category", "Amount"], rows)
    );
    Ok(())
}

/// Active records projected over the window, filtered and grouped per day.
pub fn calendar_days(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
    spec: &FilterSpec,
    today: NaiveDate,
) -> Result<Vec<DayData>> {
    let subs = store::get_active(conn)?;
    let events = filter(&project(&subs, start, end), spec, today);
    Ok(group_by_day(&events, start, end))
}

/// `--month` grid, `--from/--to` window, or the grid of the current month.
pub fn resolve_window(sub: &clap::ArgMatches, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    let (start, end) = if let Some(m) = sub.get_one::<String>("month") {
        let (y, mo) = parse_month(m)?;
        month_grid(y, mo).with_context(|| format!("Month '{}' out of range", m))?
    } else if let (Some(f), Some(t)) = (sub.get_one::<String>("from"), sub.get_one::<String>("to")) {
        (parse_date(f)?, parse_date(t)?)
    } else {
        month_grid(today.year(), today.month()).context("Current month out of range")?
    };
    if start > end {
        return Err(anyhow!("Window start {} is after end {}", start, end));
    }
    Ok((start, end))
}

pub fn read_filter(sub: &clap::ArgMatches) -> Result<FilterSpec> {
    let categories = sub
        .get_many::<String>("category")
        .map(|vals| {
            vals.map(|v| v.parse::<Category>())
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?
        .unwrap_or_default();
    Ok(FilterSpec {
        categories,
        upcoming_days: sub.get_one::<u32>("upcoming").copied(),
        payments_only: sub.get_flag("payments_only"),
        search_text: sub
            .get_one::<String>("search")
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    })
}
