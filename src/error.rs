// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid subscription '{id}': {reason}")]
    InvalidSubscription { id: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
