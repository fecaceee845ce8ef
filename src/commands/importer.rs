// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backup;
use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("subscriptions", sub)) => {
            let path = sub.get_one::<String>("path").unwrap().trim();
            let report = backup::import_from(conn, Path::new(path))?;
            println!(
                "Imported {} records from {} ({} skipped)",
                report.imported, path, report.skipped
            );
            Ok(())
        }
        _ => Ok(()),
    }
}
