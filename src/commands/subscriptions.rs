// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Category, Frequency, Schedule, Subscription, SubscriptionType};
use crate::ordering::Position;
use crate::recurrence::next_payment_date;
use crate::store::{self, NewSubscription, SubscriptionPatch};
use crate::utils::{
    fmt_money, fmt_opt_day, maybe_print_json, parse_date, parse_day, parse_decimal,
    parse_reminders, pretty_table, today,
};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap().trim();
            store::delete(conn, id)?;
            println!("Removed {}", id);
        }
        Some(("toggle", sub)) => {
            let id = sub.get_one::<String>("id").unwrap().trim();
            let s = store::toggle_active(conn, id)?;
            println!(
                "'{}' is now {}",
                s.name,
                if s.is_active { "active" } else { "inactive" }
            );
        }
        Some(("duplicate", sub)) => {
            let id = sub.get_one::<String>("id").unwrap().trim();
            let s = store::duplicate(conn, id)?;
            println!("Added '{}' ({}) id={}", s.name, s.r#type, s.id);
        }
        Some(("search", sub)) => {
            let q = sub.get_one::<String>("query").unwrap();
            let rows = store::search(conn, q)?;
            print_list(sub, &rows)?;
        }
        Some(("move", sub)) => move_record(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Field values shared by `add` and `edit`; absent flags stay `None`.
fn read_patch(sub: &clap::ArgMatches) -> Result<SubscriptionPatch> {
    let text = |k: &str| {
        sub.get_one::<String>(k)
            .map(|s| s.trim().to_string())
    };
    Ok(SubscriptionPatch {
        name: text("name"),
        r#type: text("type")
            .map(|s| s.parse::<SubscriptionType>())
            .transpose()?,
        category: text("category").map(|s| s.parse::<Category>()).transpose()?,
        frequency: text("frequency")
            .map(|s| s.parse::<Frequency>())
            .transpose()?,
        day_of_month: text("day").map(|s| parse_day(&s)).transpose()?,
        amount: text("amount").map(|s| parse_decimal(&s)).transpose()?,
        currency: text("currency"),
        payment_method: text("payment_method"),
        reminders: text("reminders")
            .map(|s| parse_reminders(&s))
            .transpose()?,
        notes: text("notes"),
        statement_day: text("statement_day").map(|s| parse_day(&s)).transpose()?,
        due_day: text("due_day").map(|s| parse_day(&s)).transpose()?,
        start_date: text("start_date").map(|s| parse_date(&s)).transpose()?,
        end_date: text("end_date").map(|s| parse_date(&s)).transpose()?,
        is_active: sub.try_get_one::<bool>("active").ok().flatten().copied(),
    })
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let p = read_patch(sub)?;
    let mut input = NewSubscription::new(
        p.name.unwrap_or_default(),
        p.r#type.unwrap_or(SubscriptionType::Subscription),
        p.category.unwrap_or(Category::Other),
    );
    input.frequency = p.frequency.unwrap_or_default();
    input.day_of_month = p.day_of_month;
    input.amount = p.amount;
    input.currency = p.currency;
    input.payment_method = p.payment_method;
    input.reminders = p.reminders;
    input.notes = p.notes;
    input.statement_day = p.statement_day;
    input.due_day = p.due_day;
    input.start_date = p.start_date;
    input.end_date = p.end_date;
    let s = store::create(conn, input)?;
    println!("Added '{}' ({}) id={}", s.name, s.r#type, s.id);
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap().trim();
    let patch = read_patch(sub)?;
    if patch.is_empty() {
        println!("Nothing to change");
        return Ok(());
    }
    let s = store::update(conn, id, patch)?;
    println!("Updated '{}'", s.name);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let all = sub.get_flag("all");
    let category = sub
        .get_one::<String>("category")
        .map(|s| s.parse::<Category>())
        .transpose()?;
    let rows = match (all, category) {
        (false, Some(c)) => store::get_by_category(conn, c)?,
        (false, None) => store::get_active(conn)?,
        (true, c) => store::get_all(conn)?
            .into_iter()
            .filter(|s| c.is_none_or(|c| s.category == c))
            .collect(),
    };
    print_list(sub, &rows)
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap().trim();
    let s = store::get(conn, id)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        return Ok(());
    }
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    let rows = vec![
        vec!["ID".into(), s.id.clone()],
        vec!["Name".into(), s.name.clone()],
        vec!["Type".into(), s.r#type.to_string()],
        vec!["Category".into(), s.category.to_string()],
        vec!["Schedule".into(), schedule_label(&s)],
        vec!["Amount".into(), amount_label(&s)],
        vec!["Payment method".into(), opt(&s.payment_method)],
        vec![
            "Reminders".into(),
            s.reminders
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(","),
        ],
        vec!["Active".into(), s.is_active.to_string()],
        vec!["Notes".into(), opt(&s.notes)],
        vec![
            "Start / end".into(),
            format!(
                "{} / {}",
                s.start_date.map(|d| d.to_string()).unwrap_or_default(),
                s.end_date.map(|d| d.to_string()).unwrap_or_default()
            ),
        ],
        vec!["Sort order".into(), s.sort_order.to_string()],
        vec!["Created".into(), s.created_at.to_rfc3339()],
        vec!["Updated".into(), s.updated_at.to_rfc3339()],
    ];
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}

fn move_record(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap().trim();
    let target = sub.get_one::<String>("target").unwrap().trim();
    let position: Position = sub.get_one::<String>("position").unwrap().parse()?;
    let ordered = store::move_subscription(conn, id, target, position)?;
    let names: Vec<&str> = ordered.iter().map(|s| s.name.as_str()).collect();
    println!("Order: {}", names.join(" > "));
    Ok(())
}

pub fn schedule_label(s: &Subscription) -> String {
    match s.schedule() {
        Schedule::CreditCard {
            statement_day,
            due_day,
        } => format!(
            "statement {} / due {}",
            fmt_opt_day(statement_day),
            fmt_opt_day(due_day)
        ),
        Schedule::Recurring { day_of_month } => {
            format!("{} on day {}", s.recurrence.frequency, day_of_month)
        }
    }
}

/// Next payment (or card due date) on or after `today`; empty for a card
/// without a due day.
pub fn next_label(s: &Subscription, today: NaiveDate) -> String {
    let day = match s.schedule() {
        Schedule::CreditCard { due_day, .. } => due_day,
        Schedule::Recurring { day_of_month } => Some(day_of_month),
    };
    day.and_then(|d| next_payment_date(d, today))
        .map(|d| d.to_string())
        .unwrap_or_default()
}

fn amount_label(s: &Subscription) -> String {
    s.amount
        .map(|a| fmt_money(&a, &s.currency))
        .unwrap_or_default()
}

fn print_list(sub: &clap::ArgMatches, rows: &[Subscription]) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
        return Ok(());
    }
    let today = today();
    let data: Vec<Vec<String>> = rows
        .iter()
        .map(|s| {
            vec![
                s.sort_order.to_string(),
                s.id.clone(),
                s.name.clone(),
                s.r#type.to_string(),
                s.category.to_string(),
                schedule_label(s),
                next_label(s, today),
                amount_label(s),
                if s.is_active { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["#", "ID", "Name", "Type", "Category", "Schedule", "Next", "Amount", "Active"],
            data
        )
    );
    Ok(())
}
