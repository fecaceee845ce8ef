// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

pub const DEFAULT_CURRENCY: &str = "TRY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionType {
    Subscription,
    CreditCard,
    Bill,
    Other,
}

impl SubscriptionType {
    pub const ALL: [SubscriptionType; 4] = [
        SubscriptionType::Subscription,
        SubscriptionType::CreditCard,
        SubscriptionType::Bill,
        SubscriptionType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionType::Subscription => "subscription",
            SubscriptionType::CreditCard => "credit_card",
            SubscriptionType::Bill => "bill",
            SubscriptionType::Other => "other",
        }
    }
}

impl fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubscriptionType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::InvalidInput(format!("Unknown subscription type '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Banking,
    Entertainment,
    Bills,
    SaaS,
    Insurance,
    Shopping,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Banking,
        Category::Entertainment,
        Category::Bills,
        Category::SaaS,
        Category::Insurance,
        Category::Shopping,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Banking => "Banking",
            Category::Entertainment => "Entertainment",
            Category::Bills => "Bills",
            Category::SaaS => "SaaS",
            Category::Insurance => "Insurance",
            Category::Shopping => "Shopping",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::InvalidInput(format!("Unknown category '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[default]
    Monthly,
    Weekly,
    Yearly,
    Custom,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Monthly => "monthly",
            Frequency::Weekly => "weekly",
            Frequency::Yearly => "yearly",
            Frequency::Custom => "custom",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Frequency::Monthly),
            "weekly" => Ok(Frequency::Weekly),
            "yearly" => Ok(Frequency::Yearly),
            "custom" => Ok(Frequency::Custom),
            other => Err(CoreError::InvalidInput(format!(
                "Unknown frequency '{}'",
                other
            ))),
        }
    }
}

/// Recurrence rule. Only `day_of_month` drives projection; the frequency is
/// kept as data and used by the cost aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub name: String,
    pub r#type: SubscriptionType,
    pub category: Category,
    pub recurrence: Recurrence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub reminders: Vec<u32>,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How a subscription lands on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    CreditCard {
        statement_day: Option<u32>,
        due_day: Option<u32>,
    },
    Recurring {
        day_of_month: u32,
    },
}

impl Subscription {
    pub fn schedule(&self) -> Schedule {
        match self.r#type {
            SubscriptionType::CreditCard => Schedule::CreditCard {
                statement_day: self.statement_day,
                due_day: self.due_day,
            },
            SubscriptionType::Subscription | SubscriptionType::Bill | SubscriptionType::Other => {
                Schedule::Recurring {
                    day_of_month: self.recurrence.day_of_month.unwrap_or(1),
                }
            }
        }
    }

    /// Checks the fields the calendar and the report cannot work without.
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |reason: &str| CoreError::InvalidSubscription {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.id.trim().is_empty() {
            return Err(invalid("missing id"));
        }
        if self.name.trim().is_empty() {
            return Err(invalid("missing name"));
        }
        if self.amount.is_some_and(|a| a < Decimal::ZERO) {
            return Err(invalid("negative amount"));
        }
        Ok(())
    }

    /// Canonical ordering key: explicit sort order, then id.
    pub fn order_key(&self) -> (i64, &str) {
        (self.sort_order, self.id.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Payment,
    Statement,
    Due,
    Reminder,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Payment => "payment",
            EventKind::Statement => "statement",
            EventKind::Due => "due",
            EventKind::Reminder => "reminder",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionEvent {
    pub id: String,
    pub subscription_id: String,
    pub date: NaiveDate,
    pub kind: EventKind,
    pub title: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    pub currency: String,
    pub sort_order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayData {
    pub date: NaiveDate,
    pub events: Vec<SubscriptionEvent>,
}
