// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use crate::error::CoreError;
use crate::models::DEFAULT_CURRENCY;
use crate::utils::parse_reminders;

pub const KEY_DEFAULT_CURRENCY: &str = "default_currency";
pub const KEY_DEFAULT_REMINDERS: &str = "default_reminders";
pub const KEY_NOTIFICATIONS: &str = "notifications_enabled";

pub const KEYS: [&str; 3] = [KEY_DEFAULT_CURRENCY, KEY_DEFAULT_REMINDERS, KEY_NOTIFICATIONS];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub default_currency: String,
    pub default_reminders: Vec<u32>,
    pub notifications_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default_currency: DEFAULT_CURRENCY.to_string(),
            default_reminders: vec![1],
            notifications_enabled: true,
        }
    }
}

fn get_raw(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn load(conn: &Connection) -> Result<Settings> {
    let mut s = Settings::default();
    if let Some(v) = get_raw(conn, KEY_DEFAULT_CURRENCY)? {
        s.default_currency = v;
    }
    if let Some(v) = get_raw(conn, KEY_DEFAULT_REMINDERS)? {
        match parse_reminders(&v) {
            Ok(r) => s.default_reminders = r,
            Err(err) => log::warn!("ignoring stored {}: {}", KEY_DEFAULT_REMINDERS, err),
        }
    }
    if let Some(v) = get_raw(conn, KEY_NOTIFICATIONS)? {
        s.notifications_enabled = parse_bool(&v).unwrap_or(true);
    }
    Ok(s)
}

/// Validates and stores one setting; returns the normalized value.
pub fn set(conn: &Connection, key: &str, value: &str) -> Result<String> {
    let value = value.trim();
    let normalized = match key {
        KEY_DEFAULT_CURRENCY => {
            if value.is_empty() {
                return Err(CoreError::InvalidInput("currency must not be empty".into()).into());
            }
            value.to_uppercase()
        }
        KEY_DEFAULT_REMINDERS => parse_reminders(value)?
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(","),
        KEY_NOTIFICATIONS => parse_bool(value)
            .ok_or_else(|| CoreError::InvalidInput(format!("Expected true|false, got '{}'", value)))?
            .to_string(),
        other => {
            return Err(CoreError::InvalidInput(format!(
                "Unknown setting '{}' (known: {})",
                other,
                KEYS.join(", ")
            ))
            .into());
        }
    };
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, normalized],
    )?;
    Ok(normalized)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
