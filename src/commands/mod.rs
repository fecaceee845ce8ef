// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod subscriptions;
pub mod calendar;
pub mod summary;
pub mod reminders;
pub mod importer;
pub mod exporter;
pub mod config;
pub mod doctor;
