// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::recurrence::{is_reminder_due, next_payment_date};
use crate::settings;
use crate::store;
use crate::utils::{fmt_money, maybe_print_json, parse_date, pretty_table, today};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DueReminder {
    pub subscription_id: String,
    pub name: String,
    pub payment_date: NaiveDate,
    pub amount: Option<String>,
}

/// Reminders due on `date` that were not reported yet. With `mark`, the
/// returned reminders are recorded as reported.
pub fn due_reminders(conn: &Connection, date: NaiveDate, mark: bool) -> Result<Vec<DueReminder>> {
    let mut out = Vec::new();
    for sub in store::get_active(conn)? {
        if !is_reminder_due(&sub, date) || store::was_notified(conn, &sub.id, date)? {
            continue;
        }
        let Some(payment_date) =
            next_payment_date(sub.recurrence.day_of_month.unwrap_or(1), date)
        else {
            continue;
        };
        if mark {
            store::mark_notified(conn, &sub.id, date)?;
        }
        out.push(DueReminder {
            amount: sub.amount.map(|a| fmt_money(&a, &sub.currency)),
            subscription_id: sub.id,
            name: sub.name,
            payment_date,
        });
    }
    Ok(out)
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    if !settings::load(conn)?.notifications_enabled {
        println!("Reminders are turned off (config set notifications_enabled true)");
        return Ok(());
    }
    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => today(),
    };
    let due = due_reminders(conn, date, sub.get_flag("mark"))?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &due)? {
        return Ok(());
    }
    if due.is_empty() {
        println!("No reminders for {}", date);
        return Ok(());
    }
    let rows = due
        .into_iter()
        .map(|d| {
            let days = (d.payment_date - date).num_days();
            vec![
                d.name,
                d.payment_date.to_string(),
                if days == 0 {
                    "today".to_string()
                } else {
                    format!("in {} days", days)
                },
                d.amount.unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Payment", "Date", "When", "Amount"], rows)
    );
    Ok(())
}
