// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Repository access to the ledger tables.
//!
//! Functions take a `&Connection`, so they work the same on a plain connection
//! and inside a `rusqlite::Transaction` (which derefs to one). Callers that need
//! several writes to land together open the transaction themselves.

mod assets;
mod categories;
mod debts;
mod loans;
mod records;
mod settings;
mod users;

pub use assets::*;
pub use categories::*;
pub use debts::*;
pub use loans::*;
pub use records::*;
pub use settings::*;
pub use users::*;

use rusqlite::Row;
use rusqlite::types::Type;
use rust_decimal::Decimal;

use crate::error::{LedgerError, Result};

/// Read a TEXT decimal column.
pub(crate) fn dec(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    parse_stored(&raw, idx)
}

pub(crate) fn opt_dec(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| parse_stored(&s, idx)).transpose()
}

fn parse_stored(raw: &str, idx: usize) -> rusqlite::Result<Decimal> {
    Decimal::from_str_exact(raw.trim())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn validate_rate(rate: Decimal) -> Result<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(LedgerError::InvalidAmount(format!(
            "interest rate {} must be between 0 and 100",
            rate
        )));
    }
    Ok(())
}

pub(crate) fn validate_non_negative(what: &str, v: Decimal) -> Result<()> {
    if v < Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!("{} {} is negative", what, v)));
    }
    Ok(())
}
