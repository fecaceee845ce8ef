// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Category, DayData, EventKind, SubscriptionEvent};

/// Calendar filter. Each dimension is an independent predicate and an event
/// is kept only when all of them accept it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Empty means every category.
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Drop events later than `today + N` days.
    #[serde(default)]
    pub upcoming_days: Option<u32>,
    /// Keep only payment and due events.
    #[serde(default)]
    pub payments_only: bool,
    /// Case-insensitive substring of the event title; empty matches all.
    #[serde(default)]
    pub search_text: String,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.upcoming_days.is_none()
            && !self.payments_only
            && self.search_text.is_empty()
    }

    pub fn matches(&self, event: &SubscriptionEvent, today: NaiveDate) -> bool {
        self.category_ok(event)
            && self.horizon_ok(event, today)
            && self.kind_ok(event)
            && self.search_ok(event)
    }

    fn category_ok(&self, event: &SubscriptionEvent) -> bool {
        self.categories.is_empty() || self.categories.contains(&event.category)
    }

    fn horizon_ok(&self, event: &SubscriptionEvent, today: NaiveDate) -> bool {
        match self.upcoming_days {
            None => true,
            Some(n) => match today.checked_add_days(Days::new(u64::from(n))) {
                Some(cutoff) => event.date <= cutoff,
                None => true,
            },
        }
    }

    fn kind_ok(&self, event: &SubscriptionEvent) -> bool {
        !self.payments_only || matches!(event.kind, EventKind::Payment | EventKind::Due)
    }

    fn search_ok(&self, event: &SubscriptionEvent) -> bool {
        self.search_text.is_empty()
            || event
                .title
                .to_lowercase()
                .contains(&self.search_text.to_lowercase())
    }
}

/// Events accepted by `spec`, in their original order.
pub fn filter(
    events: &[SubscriptionEvent],
    spec: &FilterSpec,
    today: NaiveDate,
) -> Vec<SubscriptionEvent> {
    events
        .iter()
        .filter(|e| spec.matches(e, today))
        .cloned()
        .collect()
}

/// Applies `spec` inside each day, keeping every day in place.
pub fn filter_days(days: &[DayData], spec: &FilterSpec, today: NaiveDate) -> Vec<DayData> {
    days.iter()
        .map(|d| DayData {
            date: d.date,
            events: filter(&d.events, spec, today),
        })
        .collect()
}
