// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use super::{dec, opt_dec, validate_non_negative};
use crate::error::{LedgerError, Result};
use crate::models::{Asset, AssetTransaction, AssetTxKind, Scope};
use crate::period::Period;

const ASSET_COLS: &str = "id, user_id, name, type, current_value, cost_basis, target_amount, \
                          monthly_contribution, shares, total_units, vested_units, unvested_units, is_active";

fn asset_from_row(r: &Row<'_>) -> rusqlite::Result<Asset> {
    Ok(Asset {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        kind: r.get(3)?,
        current_value: dec(r, 4)?,
        cost_basis: dec(r, 5)?,
        target_amount: opt_dec(r, 6)?,
        monthly_contribution: dec(r, 7)?,
        shares: dec(r, 8)?,
        total_units: dec(r, 9)?,
        vested_units: dec(r, 10)?,
        unvested_units: dec(r, 11)?,
        is_active: r.get(12)?,
    })
}

fn transaction_from_row(r: &Row<'_>) -> rusqlite::Result<AssetTransaction> {
    Ok(AssetTransaction {
        id: r.get(0)?,
        asset_id: r.get(1)?,
        kind: r.get(2)?,
        amount: dec(r, 3)?,
        units: opt_dec(r, 4)?,
        date: r.get(5)?,
        note: r.get(6)?,
    })
}

#[derive(Debug, Clone)]
pub struct NewAsset {
    pub user_id: i64,
    pub name: String,
    pub kind: String,
    pub current_value: Decimal,
    pub cost_basis: Decimal,
    pub target_amount: Option<Decimal>,
    pub monthly_contribution: Decimal,
    pub shares: Decimal,
    pub total_units: Decimal,
    pub vested_units: Decimal,
}

impl NewAsset {
    pub fn new(user_id: i64, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            kind: kind.into(),
            current_value: Decimal::ZERO,
            cost_basis: Decimal::ZERO,
            target_amount: None,
            monthly_contribution: Decimal::ZERO,
            shares: Decimal::ZERO,
            total_units: Decimal::ZERO,
            vested_units: Decimal::ZERO,
        }
    }
}

pub fn add_asset(conn: &Connection, new: &NewAsset) -> Result<Asset> {
    validate_non_negative("current value", new.current_value)?;
    validate_non_negative("cost basis", new.cost_basis)?;
    let mut asset = Asset {
        id: 0,
        user_id: new.user_id,
        name: new.name.trim().to_string(),
        kind: new.kind.trim().to_string(),
        current_value: new.current_value,
        cost_basis: new.cost_basis,
        target_amount: new.target_amount,
        monthly_contribution: new.monthly_contribution,
        shares: new.shares,
        total_units: new.total_units,
        vested_units: new.vested_units,
        unvested_units: Decimal::ZERO,
        is_active: true,
    };
    asset.recompute_unvested();
    conn.execute(
        "INSERT INTO assets(user_id, name, type, current_value, cost_basis, target_amount,
                            monthly_contribution, shares, total_units, vested_units, unvested_units, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 1)",
        params![
            asset.user_id,
            asset.name,
            asset.kind,
            asset.current_value.to_string(),
            asset.cost_basis.to_string(),
            asset.target_amount.map(|d| d.to_string()),
            asset.monthly_contribution.to_string(),
            asset.shares.to_string(),
            asset.total_units.to_string(),
            asset.vested_units.to_string(),
            asset.unvested_units.to_string()
        ],
    )?;
    asset.id = conn.last_insert_rowid();
    Ok(asset)
}

pub fn get_asset(conn: &Connection, id: i64) -> Result<Asset> {
    conn.query_row(
        &format!("SELECT {ASSET_COLS} FROM assets WHERE id = ?1"),
        params![id],
        asset_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::asset_not_found(id))
}

/// Active assets in scope, ordered by type then name.
pub fn active_assets(conn: &Connection, scope: Scope) -> Result<Vec<Asset>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {ASSET_COLS} FROM assets
         WHERE is_active = 1 AND (?1 IS NULL OR user_id = ?1)
         ORDER BY type, name"
    ))?;
    let rows = stmt.query_map(params![scope.user_id()], asset_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Persist every mutable column; unvested units are recomputed first.
pub fn save_asset(conn: &Connection, asset: &mut Asset) -> Result<()> {
    asset.recompute_unvested();
    let n = conn.execute(
        "UPDATE assets SET name=?1, type=?2, current_value=?3, cost_basis=?4, target_amount=?5,
                monthly_contribution=?6, shares=?7, total_units=?8, vested_units=?9,
                unvested_units=?10, is_active=?11
         WHERE id=?12",
        params![
            asset.name,
            asset.kind,
            asset.current_value.to_string(),
            asset.cost_basis.to_string(),
            asset.target_amount.map(|d| d.to_string()),
            asset.monthly_contribution.to_string(),
            asset.shares.to_string(),
            asset.total_units.to_string(),
            asset.vested_units.to_string(),
            asset.unvested_units.to_string(),
            asset.is_active,
            asset.id
        ],
    )?;
    if n == 0 {
        return Err(LedgerError::asset_not_found(asset.id));
    }
    Ok(())
}

pub fn deactivate_asset(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("UPDATE assets SET is_active = 0 WHERE id = ?1", params![id])?;
    if n == 0 {
        return Err(LedgerError::asset_not_found(id));
    }
    Ok(())
}

pub fn insert_asset_transaction(
    conn: &Connection,
    asset_id: i64,
    kind: AssetTxKind,
    amount: Decimal,
    units: Option<Decimal>,
    date: NaiveDate,
    note: Option<&str>,
) -> Result<AssetTransaction> {
    conn.execute(
        "INSERT INTO asset_transactions(asset_id, type, amount, units, date, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            asset_id,
            kind,
            amount.to_string(),
            units.map(|u| u.to_string()),
            date,
            note
        ],
    )?;
    Ok(AssetTransaction {
        id: conn.last_insert_rowid(),
        asset_id,
        kind,
        amount,
        units,
        date,
        note: note.map(str::to_string),
    })
}

/// Transactions of one asset, newest first.
pub fn asset_transactions(conn: &Connection, asset_id: i64) -> Result<Vec<AssetTransaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, asset_id, type, amount, units, date, note
         FROM asset_transactions WHERE asset_id = ?1 ORDER BY date DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![asset_id], transaction_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Record the asset's value for `period`, replacing any earlier snapshot.
pub fn snapshot_asset_value(
    conn: &Connection,
    asset_id: i64,
    period: Period,
    value: Decimal,
) -> Result<()> {
    conn.execute(
        "INSERT INTO asset_history(asset_id, month_year, value) VALUES (?1, ?2, ?3)
         ON CONFLICT(asset_id, month_year) DO UPDATE SET value = excluded.value",
        params![asset_id, period, value.to_string()],
    )?;
    Ok(())
}

/// `(period, value)` snapshots of one asset, oldest first.
pub fn asset_value_history(conn: &Connection, asset_id: i64) -> Result<Vec<(Period, Decimal)>> {
    let mut stmt = conn.prepare(
        "SELECT month_year, value FROM asset_history WHERE asset_id = ?1 ORDER BY month_year",
    )?;
    let rows = stmt.query_map(params![asset_id], |r| Ok((r.get::<_, Period>(0)?, dec(r, 1)?)))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
