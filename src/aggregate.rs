// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly-equivalent cost per currency. Currencies are never converted
//! into each other; each one is its own bucket.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Category, DEFAULT_CURRENCY, Frequency, Subscription};

/// Average weeks per month (4.33).
pub fn weeks_per_month() -> Decimal {
    Decimal::new(433, 2)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrencySummary {
    pub total: Decimal,
    pub count: usize,
    pub by_category: BTreeMap<Category, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: Category,
    pub amount: Decimal,
    /// Percentage of the currency total, 0..=100.
    pub percent: Decimal,
}

impl CurrencySummary {
    /// Category breakdown, largest first. Equal amounts keep category order.
    pub fn ranked(&self) -> Vec<(Category, Decimal)> {
        let mut items: Vec<(Category, Decimal)> =
            self.by_category.iter().map(|(c, a)| (*c, *a)).collect();
        items.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        items
    }

    pub fn share_of_total(&self, category: Category) -> Option<Decimal> {
        if self.total.is_zero() {
            return None;
        }
        self.by_category
            .get(&category)
            .map(|amount| amount * Decimal::ONE_HUNDRED / self.total)
    }

    pub fn ranked_shares(&self) -> Vec<CategoryShare> {
        self.ranked()
            .into_iter()
            .map(|(category, amount)| CategoryShare {
                category,
                amount,
                percent: self.share_of_total(category).unwrap_or(Decimal::ZERO),
            })
            .collect()
    }
}

pub fn monthly_equivalent(amount: Decimal, frequency: Frequency) -> Decimal {
    match frequency {
        Frequency::Weekly => amount * weeks_per_month(),
        Frequency::Yearly => amount / Decimal::from(12),
        Frequency::Monthly | Frequency::Custom => amount,
    }
}

/// Sums the monthly equivalent of every active subscription with a
/// non-zero amount, keyed by currency.
pub fn aggregate(subs: &[Subscription]) -> BTreeMap<String, CurrencySummary> {
    let mut out: BTreeMap<String, CurrencySummary> = BTreeMap::new();
    for sub in subs.iter().filter(|s| s.is_active) {
        if let Err(err) = sub.validate() {
            log::warn!("skipping subscription in summary: {}", err);
            continue;
        }
        let Some(amount) = sub.amount.filter(|a| !a.is_zero()) else {
            continue;
        };
        let monthly = monthly_equivalent(amount, sub.recurrence.frequency);
        let currency = if sub.currency.trim().is_empty() {
            DEFAULT_CURRENCY.to_string()
        } else {
            sub.currency.trim().to_uppercase()
        };
        let bucket = out.entry(currency).or_default();
        bucket.total += monthly;
        bucket.count += 1;
        *bucket.by_category.entry(sub.category).or_insert(Decimal::ZERO) += monthly;
    }
    out
}
