// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::store;
use crate::utils::string_arg;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            println!("currency_symbol = {}", store::currency_symbol(conn)?);
            println!("household_id    = {}", store::household(conn)?.id);
        }
        Some(("set-symbol", sub)) => {
            let symbol = string_arg(sub, "symbol")?;
            store::set_currency_symbol(conn, &symbol)?;
            println!("Currency symbol set to {}", symbol);
        }
        _ => {}
    }
    Ok(())
}
