// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{LedgerError, Result};

pub const DEFAULT_CURRENCY_SYMBOL: &str = "₪";

const CURRENCY_KEY: &str = "currency_symbol";

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(value)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

/// Symbol used in human-readable amounts.
pub fn currency_symbol(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, CURRENCY_KEY)?.unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string()))
}

pub fn set_currency_symbol(conn: &Connection, symbol: &str) -> Result<()> {
    let symbol = symbol.trim();
    if symbol.is_empty() || symbol.chars().count() > 4 {
        return Err(LedgerError::InvalidAmount(format!(
            "currency symbol '{}' must be 1-4 characters",
            symbol
        )));
    }
    set_setting(conn, CURRENCY_KEY, symbol)
}
