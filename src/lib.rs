// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod amortization;
pub mod assets;
pub mod cli;
pub mod commands;
pub mod db;
pub mod error;
pub mod ledger;
pub mod models;
pub mod overview;
pub mod period;
pub mod store;
pub mod suggestion;
pub mod summary;
pub mod utils;
pub mod workflow;
