// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod users;
pub mod categories;
pub mod records;
pub mod importer;
pub mod exporter;
pub mod loans;
pub mod debts;
pub mod assets;
pub mod dashboard;
pub mod month;
pub mod settings;
