// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backup;
use crate::commands::calendar::resolve_window;
use crate::projector::project;
use crate::store;
use crate::utils::today;
use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("subscriptions", sub)) => {
            let out = sub.get_one::<String>("out").unwrap().trim();
            let n = backup::export_to(conn, Path::new(out))?;
            println!("Exported {} records to {}", n, out);
            Ok(())
        }
        Some(("events", sub)) => export_events(conn, sub),
        _ => Ok(()),
    }
}

fn export_events(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap().trim();
    let (start, end) = resolve_window(sub, today())?;
    let events = project(&store::get_active(conn)?, start, end);

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date", "kind", "title", "category", "amount", "currency", "id",
            ])?;
            for e in &events {
                wtr.write_record([
                    e.date.to_string(),
                    e.kind.to_string(),
                    e.title.clone(),
                    e.category.to_string(),
                    e.amount.map(|a| a.to_string()).unwrap_or_default(),
                    e.currency.clone(),
                    e.id.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&events)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
            return Ok(());
        }
    }
    println!("Exported {} events ({} .. {}) to {}", events.len(), start, end, out);
    Ok(())
}
