// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Manual ordering of subscriptions ("move before/after").
//!
//! A move is always applied to the full ordering, so the moved record ends up
//! directly next to its target there and therefore in any filtered view that
//! contains both.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::models::Subscription;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Before,
    After,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Before => f.write_str("before"),
            Position::After => f.write_str("after"),
        }
    }
}

impl FromStr for Position {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "before" => Ok(Position::Before),
            "after" => Ok(Position::After),
            other => Err(CoreError::InvalidInput(format!(
                "Unknown position '{}', expected before|after",
                other
            ))),
        }
    }
}

/// Ids in display order: `sort_order`, ties broken by id.
pub fn canonical_order(subs: &[Subscription]) -> Vec<String> {
    let mut refs: Vec<&Subscription> = subs.iter().collect();
    refs.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
    refs.into_iter().map(|s| s.id.clone()).collect()
}

/// Places `moving` immediately before or after `target`; every other id keeps
/// its relative order. Moving an id onto itself returns the ordering unchanged.
pub fn move_id(
    ordered: &[String],
    moving: &str,
    target: &str,
    position: Position,
) -> Result<Vec<String>, CoreError> {
    if !ordered.iter().any(|id| id == target) {
        return Err(CoreError::NotFound(format!("subscription '{}'", target)));
    }
    if !ordered.iter().any(|id| id == moving) {
        return Err(CoreError::NotFound(format!("subscription '{}'", moving)));
    }
    if moving == target {
        return Ok(ordered.to_vec());
    }

    let mut out: Vec<String> = ordered
        .iter()
        .filter(|id| id.as_str() != moving)
        .cloned()
        .collect();
    let at = out
        .iter()
        .position(|id| id == target)
        .ok_or_else(|| CoreError::NotFound(format!("subscription '{}'", target)))?;
    let at = match position {
        Position::Before => at,
        Position::After => at + 1,
    };
    out.insert(at, moving.to_string());
    Ok(out)
}

/// Contiguous sort orders (0, 1, 2, ...) for `ordered`, returning only the
/// ids whose value differs from `current`.
pub fn renumber(ordered: &[String], current: &HashMap<String, i64>) -> Vec<(String, i64)> {
    ordered
        .iter()
        .enumerate()
        .filter_map(|(idx, id)| {
            let next = idx as i64;
            (current.get(id) != Some(&next)).then(|| (id.clone(), next))
        })
        .collect()
}
