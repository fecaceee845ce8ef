// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod aggregate;
pub mod backup;
pub mod cli;
pub mod commands;
pub mod db;
pub mod error;
pub mod filters;
pub mod models;
pub mod ordering;
pub mod projector;
pub mod recurrence;
pub mod settings;
pub mod store;
pub mod utils;
