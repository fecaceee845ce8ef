// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{CategoryShare, aggregate};
use crate::store;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CurrencyReport {
    pub currency: String,
    pub monthly_total: Decimal,
    pub records: usize,
    pub categories: Vec<CategoryShare>,
}

pub fn build(conn: &Connection, only: Option<&str>) -> Result<Vec<CurrencyReport>> {
    let subs = store::get_active(conn)?;
    let only = only.map(|c| c.trim().to_uppercase());
    Ok(aggregate(&subs)
        .into_iter()
        .filter(|(ccy, _)| only.as_ref().is_none_or(|o| o == ccy))
        .map(|(currency, s)| CurrencyReport {
            monthly_total: s.total.round_dp(2),
            records: s.count,
            categories: s
                .ranked_shares()
                .into_iter()
                .map(|c| CategoryShare {
                    amount: c.amount.round_dp(2),
                    percent: c.percent.round_dp(1),
                    ..c
                })
                .collect(),
            currency,
        })
        .collect())
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let report = build(conn, sub.get_one::<String>("currency").map(String::as_str))?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    if report.is_empty() {
        println!("No active records with an amount");
        return Ok(());
    }
    for r in &report {
        println!(
            "{}: {:.2} per month across {} records",
            r.currency, r.monthly_total, r.records
        );
        let data: Vec<Vec<String>> = r
            .categories
            .iter()
            .map(|c| {
                vec![
                    c.category.to_string(),
                    format!("{:.2}", c.amount),
                    format!("{:.1}%", c.percent),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", &format!("Monthly ({})", r.currency), "Share"], data)
        );
    }
    Ok(())
}
