// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::settings;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let s = settings::load(conn)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
                return Ok(());
            }
            let reminders = s
                .default_reminders
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(",");
            let rows = vec![
                vec![settings::KEY_DEFAULT_CURRENCY.to_string(), s.default_currency],
                vec![settings::KEY_DEFAULT_REMINDERS.to_string(), reminders],
                vec![
                    settings::KEY_NOTIFICATIONS.to_string(),
                    s.notifications_enabled.to_string(),
                ],
            ];
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            let value = sub.get_one::<String>("value").unwrap();
            let stored = settings::set(conn, key, value)?;
            println!("{} = {}", key, stored);
        }
        _ => {}
    }
    Ok(())
}
