// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! SQLite-backed subscription store. Every write returns the refreshed record
//! (or collection) as stored.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::{Category, Frequency, Recurrence, Subscription, SubscriptionType};
use crate::ordering::{Position, move_id, renumber};
use crate::settings;

const COLUMNS: &str = "id, name, type, category, frequency, day_of_month, amount, currency, \
     payment_method, reminders, is_active, notes, statement_day, due_day, start_date, end_date, \
     sort_order, created_at, updated_at";

/// Appended to the name of a duplicated record.
pub const COPY_SUFFIX: &str = " (Kopya)";

/// Input for a new record; unset optional fields take the configured defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    pub name: String,
    pub r#type: SubscriptionType,
    pub category: Category,
    pub frequency: Frequency,
    pub day_of_month: Option<u32>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub payment_method: Option<String>,
    pub reminders: Option<Vec<u32>>,
    pub notes: Option<String>,
    pub statement_day: Option<u32>,
    pub due_day: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
}

impl NewSubscription {
    pub fn new(name: impl Into<String>, r#type: SubscriptionType, category: Category) -> Self {
        NewSubscription {
            name: name.into(),
            r#type,
            category,
            frequency: Frequency::Monthly,
            day_of_month: None,
            amount: None,
            currency: None,
            payment_method: None,
            reminders: None,
            notes: None,
            statement_day: None,
            due_day: None,
            start_date: None,
            end_date: None,
            is_active: true,
        }
    }
}

/// Partial update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionPatch {
    pub name: Option<String>,
    pub r#type: Option<SubscriptionType>,
    pub category: Option<Category>,
    pub frequency: Option<Frequency>,
    pub day_of_month: Option<u32>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub payment_method: Option<String>,
    pub reminders: Option<Vec<u32>>,
    pub notes: Option<String>,
    pub statement_day: Option<u32>,
    pub due_day: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

impl SubscriptionPatch {
    pub fn is_empty(&self) -> bool {
        *self == SubscriptionPatch::default()
    }

    fn apply(self, sub: &mut Subscription) {
        if let Some(v) = self.name {
            sub.name = v;
        }
        if let Some(v) = self.r#type {
            sub.r#type = v;
        }
        if let Some(v) = self.category {
            sub.category = v;
        }
        if let Some(v) = self.frequency {
            sub.recurrence.frequency = v;
        }
        if let Some(v) = self.day_of_month {
            sub.recurrence.day_of_month = Some(v);
        }
        if let Some(v) = self.amount {
            sub.amount = Some(v);
        }
        if let Some(v) = self.currency {
            sub.currency = v.trim().to_uppercase();
        }
        if let Some(v) = self.payment_method {
            sub.payment_method = Some(v);
        }
        if let Some(v) = self.reminders {
            sub.reminders = v;
        }
        if let Some(v) = self.notes {
            sub.notes = Some(v);
        }
        if let Some(v) = self.statement_day {
            sub.statement_day = Some(v);
        }
        if let Some(v) = self.due_day {
            sub.due_day = Some(v);
        }
        if let Some(v) = self.start_date {
            sub.start_date = Some(v);
        }
        if let Some(v) = self.end_date {
            sub.end_date = Some(v);
        }
        if let Some(v) = self.is_active {
            sub.is_active = v;
        }
    }
}

/// Form-level checks applied before anything is written.
fn check_input(sub: &Subscription) -> Result<(), CoreError> {
    if sub.name.trim().is_empty() {
        return Err(CoreError::InvalidInput("name must not be empty".into()));
    }
    for (label, day) in [
        ("day of month", sub.recurrence.day_of_month),
        ("statement day", sub.statement_day),
        ("due day", sub.due_day),
    ] {
        if let Some(d) = day.filter(|d| !(1..=31).contains(d)) {
            return Err(CoreError::InvalidInput(format!(
                "{} {} out of range, expected 1-31",
                label, d
            )));
        }
    }
    if sub.amount.is_some_and(|a| a < Decimal::ZERO) {
        return Err(CoreError::InvalidInput("amount must not be negative".into()));
    }
    if sub.currency.trim().is_empty() {
        return Err(CoreError::InvalidInput("currency must not be empty".into()));
    }
    Ok(())
}

struct RawRow {
    id: String,
    name: String,
    r#type: String,
    category: String,
    frequency: String,
    day_of_month: Option<i64>,
    amount: Option<String>,
    currency: String,
    payment_method: Option<String>,
    reminders: String,
    is_active: i64,
    notes: Option<String>,
    statement_day: Option<i64>,
    due_day: Option<i64>,
    start_date: Option<String>,
    end_date: Option<String>,
    sort_order: i64,
    created_at: String,
    updated_at: String,
}

impl RawRow {
    fn read(r: &Row<'_>) -> rusqlite::Result<RawRow> {
        Ok(RawRow {
            id: r.get(0)?,
            name: r.get(1)?,
            r#type: r.get(2)?,
            category: r.get(3)?,
            frequency: r.get(4)?,
            day_of_month: r.get(5)?,
            amount: r.get(6)?,
            currency: r.get(7)?,
            payment_method: r.get(8)?,
            reminders: r.get(9)?,
            is_active: r.get(10)?,
            notes: r.get(11)?,
            statement_day: r.get(12)?,
            due_day: r.get(13)?,
            start_date: r.get(14)?,
            end_date: r.get(15)?,
            sort_order: r.get(16)?,
            created_at: r.get(17)?,
            updated_at: r.get(18)?,
        })
    }

    fn into_subscription(self) -> Result<Subscription> {
        let id = self.id;
        let day = |v: Option<i64>| v.and_then(|d| u32::try_from(d).ok());
        let date = |v: Option<String>| -> Result<Option<NaiveDate>> {
            v.filter(|s| !s.is_empty())
                .map(|s| {
                    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                        .with_context(|| format!("Invalid date '{}' on subscription {}", s, id))
                })
                .transpose()
        };
        let stamp = |s: &str| -> Result<DateTime<Utc>> {
            Ok(DateTime::parse_from_rfc3339(s)
                .with_context(|| format!("Invalid timestamp '{}' on subscription {}", s, id))?
                .with_timezone(&Utc))
        };
        Ok(Subscription {
            name: self.name,
            r#type: self.r#type.parse()?,
            category: self.category.parse()?,
            recurrence: Recurrence {
                frequency: self.frequency.parse()?,
                day_of_month: day(self.day_of_month),
            },
            amount: self
                .amount
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<Decimal>()
                        .with_context(|| format!("Invalid amount '{}' on subscription {}", s, id))
                })
                .transpose()?,
            currency: self.currency,
            payment_method: self.payment_method,
            reminders: serde_json::from_str(&self.reminders)
                .with_context(|| format!("Invalid reminders '{}' on subscription {}", self.reminders, id))?,
            is_active: self.is_active != 0,
            notes: self.notes,
            statement_day: day(self.statement_day),
            due_day: day(self.due_day),
            start_date: date(self.start_date)?,
            end_date: date(self.end_date)?,
            sort_order: self.sort_order,
            created_at: stamp(&self.created_at)?,
            updated_at: stamp(&self.updated_at)?,
            id,
        })
    }
}

fn query(conn: &Connection, filter: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<Subscription>> {
    let sql = format!(
        "SELECT {} FROM subscriptions {} ORDER BY sort_order, id",
        COLUMNS, filter
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(args, RawRow::read)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?.into_subscription()?);
    }
    Ok(out)
}

pub fn find(conn: &Connection, id: &str) -> Result<Option<Subscription>> {
    let raw = conn
        .query_row(
            &format!("SELECT {} FROM subscriptions WHERE id=?1", COLUMNS),
            params![id],
            RawRow::read,
        )
        .optional()?;
    raw.map(RawRow::into_subscription).transpose()
}

pub fn get(conn: &Connection, id: &str) -> Result<Subscription> {
    find(conn, id)?.ok_or_else(|| CoreError::NotFound(format!("subscription '{}'", id)).into())
}

pub fn get_all(conn: &Connection) -> Result<Vec<Subscription>> {
    query(conn, "", &[])
}

pub fn get_active(conn: &Connection) -> Result<Vec<Subscription>> {
    query(conn, "WHERE is_active = 1", &[])
}

/// Case-insensitive name match. Compared in Rust so non-ASCII names fold
/// the same way the calendar search does and `%`/`_` stay literal.
pub fn search(conn: &Connection, text: &str) -> Result<Vec<Subscription>> {
    let needle = text.trim().to_lowercase();
    Ok(get_all(conn)?
        .into_iter()
        .filter(|s| s.name.to_lowercase().contains(&needle))
        .collect())
}

pub fn get_by_category(conn: &Connection, category: Category) -> Result<Vec<Subscription>> {
    query(
        conn,
        "WHERE category = ?1 AND is_active = 1",
        params![category.as_str()],
    )
}

fn write(conn: &Connection, sub: &Subscription, insert: bool) -> Result<()> {
    let sql = if insert {
        format!(
            "INSERT INTO subscriptions({}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19)",
            COLUMNS
        )
    } else {
        "UPDATE subscriptions SET name=?2, type=?3, category=?4, frequency=?5, day_of_month=?6, \
         amount=?7, currency=?8, payment_method=?9, reminders=?10, is_active=?11, notes=?12, \
         statement_day=?13, due_day=?14, start_date=?15, end_date=?16, sort_order=?17, \
         created_at=?18, updated_at=?19 WHERE id=?1"
            .to_string()
    };
    conn.execute(
        &sql,
        params![
            sub.id,
            sub.name,
            sub.r#type.as_str(),
            sub.category.as_str(),
            sub.recurrence.frequency.as_str(),
            sub.recurrence.day_of_month,
            sub.amount.map(|a| a.to_string()),
            sub.currency,
            sub.payment_method,
            serde_json::to_string(&sub.reminders)?,
            sub.is_active,
            sub.notes,
            sub.statement_day,
            sub.due_day,
            sub.start_date.map(|d| d.to_string()),
            sub.end_date.map(|d| d.to_string()),
            sub.sort_order,
            sub.created_at.to_rfc3339(),
            sub.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn next_sort_order(conn: &Connection) -> Result<i64> {
    let v: i64 = conn.query_row(
        "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM subscriptions",
        [],
        |r| r.get(0),
    )?;
    Ok(v)
}

/// Stores a new record at the end of the ordering.
pub fn create(conn: &Connection, input: NewSubscription) -> Result<Subscription> {
    let defaults = settings::load(conn)?;
    let now = Utc::now();
    let sub = Subscription {
        id: Uuid::new_v4().to_string(),
        name: input.name.trim().to_string(),
        r#type: input.r#type,
        category: input.category,
        recurrence: Recurrence {
            frequency: input.frequency,
            day_of_month: input.day_of_month,
        },
        amount: input.amount,
        currency: input
            .currency
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or(defaults.default_currency),
        payment_method: input.payment_method,
        reminders: input.reminders.unwrap_or(defaults.default_reminders),
        is_active: input.is_active,
        notes: input.notes,
        statement_day: input.statement_day,
        due_day: input.due_day,
        start_date: input.start_date,
        end_date: input.end_date,
        sort_order: next_sort_order(conn)?,
        created_at: now,
        updated_at: now,
    };
    check_input(&sub)?;
    write(conn, &sub, true)?;
    log::info!("created subscription {} ({})", sub.id, sub.name);
    get(conn, &sub.id)
}

pub fn update(conn: &Connection, id: &str, patch: SubscriptionPatch) -> Result<Subscription> {
    let mut sub = get(conn, id)?;
    patch.apply(&mut sub);
    sub.name = sub.name.trim().to_string();
    check_input(&sub)?;
    sub.updated_at = Utc::now();
    write(conn, &sub, false)?;
    log::info!("updated subscription {}", id);
    get(conn, id)
}

/// Copies a record as a new one named "<name> (Kopya)", appended to the end
/// of the ordering.
pub fn duplicate(conn: &Connection, id: &str) -> Result<Subscription> {
    let src = get(conn, id)?;
    let mut input = NewSubscription::new(
        format!("{}{}", src.name, COPY_SUFFIX),
        src.r#type,
        src.category,
    );
    input.frequency = src.recurrence.frequency;
    input.day_of_month = src.recurrence.day_of_month;
    input.amount = src.amount;
    input.currency = Some(src.currency);
    input.payment_method = src.payment_method;
    input.reminders = Some(src.reminders);
    input.notes = src.notes;
    input.statement_day = src.statement_day;
    input.due_day = src.due_day;
    input.start_date = src.start_date;
    input.end_date = src.end_date;
    input.is_active = src.is_active;
    create(conn, input)
}

pub fn toggle_active(conn: &Connection, id: &str) -> Result<Subscription> {
    let sub = get(conn, id)?;
    update(
        conn,
        id,
        SubscriptionPatch {
            is_active: Some(!sub.is_active),
            ..Default::default()
        },
    )
}

pub fn delete(conn: &Connection, id: &str) -> Result<()> {
    let n = conn.execute("DELETE FROM subscriptions WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(CoreError::NotFound(format!("subscription '{}'", id)).into());
    }
    log::info!("deleted subscription {}", id);
    Ok(())
}

/// Moves `id` next to `target` and persists the renumbered ordering in one
/// write transaction. Returns the whole collection in its new order.
pub fn move_subscription(
    conn: &mut Connection,
    id: &str,
    target: &str,
    position: Position,
) -> Result<Vec<Subscription>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let current: Vec<(String, i64)> = {
        let mut stmt = tx.prepare("SELECT id, sort_order FROM subscriptions ORDER BY sort_order, id")?;
        let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()?
    };
    let ordered: Vec<String> = current.iter().map(|(id, _)| id.clone()).collect();
    let moved = move_id(&ordered, id, target, position)?;
    if id != target {
        let by_id: HashMap<String, i64> = current.into_iter().collect();
        let changes = renumber(&moved, &by_id);
        let now = Utc::now().to_rfc3339();
        for (sub_id, order) in &changes {
            if sub_id == id {
                tx.execute(
                    "UPDATE subscriptions SET sort_order=?1, updated_at=?2 WHERE id=?3",
                    params![order, now, sub_id],
                )?;
            } else {
                tx.execute(
                    "UPDATE subscriptions SET sort_order=?1 WHERE id=?2",
                    params![order, sub_id],
                )?;
            }
        }
        log::info!(
            "moved subscription {} {} {} ({} rows renumbered)",
            id,
            position,
            target,
            changes.len()
        );
    }
    tx.commit()?;
    get_all(conn)
}

/// Records that a reminder was reported; false when it already was.
pub fn mark_notified(conn: &Connection, subscription_id: &str, date: NaiveDate) -> Result<bool> {
    let n = conn.execute(
        "INSERT OR IGNORE INTO notifications(subscription_id, date) VALUES (?1, ?2)",
        params![subscription_id, date.to_string()],
    )?;
    Ok(n > 0)
}

pub fn was_notified(conn: &Connection, subscription_id: &str, date: NaiveDate) -> Result<bool> {
    let v: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM notifications WHERE subscription_id=?1 AND date=?2",
            params![subscription_id, date.to_string()],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v.is_some())
}
