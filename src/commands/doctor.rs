// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Frequency, Schedule};
use crate::store;
use crate::utils::{pretty_table, today};
use anyhow::Result;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;

static CURRENCY_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = diagnose(conn, today())?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn diagnose(conn: &Connection, today: NaiveDate) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Day fields outside 1..=31 (written around the CLI)
    let mut stmt = conn.prepare(
        "SELECT name FROM subscriptions
         WHERE day_of_month NOT BETWEEN 1 AND 31
            OR statement_day NOT BETWEEN 1 AND 31
            OR due_day NOT BETWEEN 1 AND 31
         ORDER BY sort_order, id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let name: String = r.get(0)?;
        rows.push(vec!["day_out_of_range".into(), name]);
    }

    // 2) Shared sort orders
    let mut stmt2 = conn.prepare(
        "SELECT sort_order, COUNT(*) FROM subscriptions GROUP BY sort_order HAVING COUNT(*) > 1",
    )?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let order: i64 = r.get(0)?;
        let n: i64 = r.get(1)?;
        rows.push(vec![
            "duplicate_sort_order".into(),
            format!("{} records share {}", n, order),
        ]);
    }

    // 3) Per-record checks
    for s in store::get_all(conn)? {
        if let Schedule::CreditCard {
            statement_day: None,
            due_day: None,
        } = s.schedule()
        {
            rows.push(vec!["card_without_days".into(), s.name.clone()]);
        }
        if s.recurrence.frequency != Frequency::Monthly {
            rows.push(vec![
                "projected_monthly".into(),
                format!("{} ({})", s.name, s.recurrence.frequency),
            ]);
        }
        if !CURRENCY_CODE.is_match(&s.currency) {
            rows.push(vec![
                "odd_currency".into(),
                format!("{} ({})", s.name, s.currency),
            ]);
        }
        if s.is_active && s.end_date.is_some_and(|d| d < today) {
            rows.push(vec!["ended_but_active".into(), s.name.clone()]);
        }
    }
    Ok(rows)
}
