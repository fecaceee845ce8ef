// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Whole-collection JSON backup.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::models::{Category, Frequency, SubscriptionType};
use crate::store::{self, NewSubscription};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Loosely typed record; everything but `name` and `type` may be missing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackupRecord {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    category: Option<String>,
    recurrence: Option<BackupRecurrence>,
    amount: Option<Value>,
    currency: Option<String>,
    payment_method: Option<String>,
    reminders: Option<Vec<u32>>,
    is_active: Option<bool>,
    notes: Option<String>,
    statement_day: Option<u32>,
    due_day: Option<u32>,
    start_date: Option<String>,
    end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackupRecurrence {
    frequency: Option<String>,
    day_of_month: Option<u32>,
}

pub fn export_to(conn: &Connection, path: &Path) -> Result<usize> {
    let subs = store::get_all(conn)?;
    std::fs::write(path, serde_json::to_string_pretty(&subs)?)
        .with_context(|| format!("Write backup {}", path.display()))?;
    log::info!("exported {} subscriptions to {}", subs.len(), path.display());
    Ok(subs.len())
}

/// Adds every usable record of the backup as a new subscription. Records
/// that cannot be used are skipped and reported, never fatal.
pub fn import_from(conn: &mut Connection, path: &Path) -> Result<ImportReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Read backup {}", path.display()))?;
    let values: Vec<Value> = serde_json::from_str(&content)
        .with_context(|| format!("Backup {} is not a JSON array", path.display()))?;

    let tx = conn.transaction()?;
    let mut report = ImportReport::default();
    for (idx, value) in values.into_iter().enumerate() {
        let input = match to_input(value) {
            Ok(input) => input,
            Err(err) => {
                log::warn!("skipping backup record #{}: {}", idx, err);
                report.skipped += 1;
                continue;
            }
        };
        let name = input.name.clone();
        match store::create(&tx, input) {
            Ok(_) => report.imported += 1,
            Err(err) => {
                log::warn!("failed to import '{}': {:#}", name, err);
                report.skipped += 1;
            }
        }
    }
    tx.commit()?;
    log::info!(
        "imported {} subscriptions from {} ({} skipped)",
        report.imported,
        path.display(),
        report.skipped
    );
    Ok(report)
}

fn to_input(value: Value) -> Result<NewSubscription> {
    let rec: BackupRecord = serde_json::from_value(value).context("malformed record")?;
    let name = rec
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| anyhow!("missing name"))?;
    let kind: SubscriptionType = rec
        .kind
        .as_deref()
        .ok_or_else(|| anyhow!("missing type"))?
        .parse()?;
    let category = match rec.category.as_deref().map(str::parse::<Category>) {
        Some(Ok(c)) => c,
        Some(Err(err)) => {
            log::warn!("{} for '{}', using Other", err, name);
            Category::Other
        }
        None => Category::Other,
    };
    let recurrence = rec.recurrence.unwrap_or_default();
    let frequency = match recurrence.frequency.as_deref() {
        Some(f) => f.parse::<Frequency>()?,
        None => Frequency::Monthly,
    };

    let mut input = NewSubscription::new(name, kind, category);
    input.frequency = frequency;
    input.day_of_month = recurrence.day_of_month;
    input.amount = rec.amount.as_ref().map(parse_amount).transpose()?.flatten();
    input.currency = rec.currency;
    input.payment_method = rec.payment_method;
    input.reminders = rec.reminders;
    input.notes = rec.notes;
    input.statement_day = rec.statement_day;
    input.due_day = rec.due_day;
    input.start_date = rec.start_date.as_deref().and_then(parse_backup_date);
    input.end_date = rec.end_date.as_deref().and_then(parse_backup_date);
    input.is_active = rec.is_active.unwrap_or(true);
    Ok(input)
}

fn parse_amount(v: &Value) -> Result<Option<Decimal>> {
    match v {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(Some(
            n.to_string()
                .parse::<Decimal>()
                .with_context(|| format!("Invalid amount {}", n))?,
        )),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(
            s.trim()
                .parse::<Decimal>()
                .with_context(|| format!("Invalid amount '{}'", s))?,
        )),
        other => Err(anyhow!("Invalid amount {}", other)),
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp. Timestamps are read
/// as the local calendar date, since exports store local midnight in UTC.
fn parse_backup_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    match DateTime::parse_from_rfc3339(s) {
        Ok(ts) => Some(ts.with_timezone(&Local).date_naive()),
        Err(err) => {
            log::warn!("ignoring unreadable date '{}': {}", s, err);
            None
        }
    }
}
