// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Asset transactions, asset summary and net worth.

use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{LedgerError, Result};
use crate::models::{Asset, AssetTransaction, AssetTxKind, Scope};
use crate::period::Period;
use crate::store::{self, NewAsset};

/// Apply one transaction to an asset in place.
///
/// Subtractions clamp at zero; a missing `units` counts as zero.
pub fn apply_transaction(asset: &mut Asset, kind: AssetTxKind, amount: Decimal, units: Option<Decimal>) {
    let units = units.unwrap_or_default();
    match kind {
        AssetTxKind::Deposit | AssetTxKind::Contribution => {
            asset.current_value += amount;
            asset.cost_basis += amount;
        }
        AssetTxKind::Withdraw => {
            asset.current_value = (asset.current_value - amount).max(Decimal::ZERO);
        }
        AssetTxKind::Buy => {
            asset.shares += units;
            asset.cost_basis += amount;
            asset.current_value += amount;
        }
        AssetTxKind::Sell => {
            asset.shares = (asset.shares - units).max(Decimal::ZERO);
            asset.current_value = (asset.current_value - amount).max(Decimal::ZERO);
        }
        AssetTxKind::Vest => {
            asset.vested_units += units;
            asset.recompute_unvested();
        }
        AssetTxKind::Dividend => {
            asset.current_value += amount;
        }
    }
}

/// Insert the transaction and update the asset together, then snapshot the
/// new value for the transaction's period.
pub fn apply_asset_transaction(
    conn: &mut Connection,
    asset_id: i64,
    kind: AssetTxKind,
    amount: Decimal,
    units: Option<Decimal>,
    date: Option<NaiveDate>,
    note: Option<&str>,
) -> Result<AssetTransaction> {
    if amount < Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!("amount {} is negative", amount)));
    }
    if units.is_some_and(|u| u < Decimal::ZERO) {
        return Err(LedgerError::InvalidAmount("units must not be negative".into()));
    }
    let date = date.unwrap_or_else(|| Local::now().date_naive());

    let tx = conn.transaction()?;
    let mut asset = store::get_asset(&tx, asset_id)?;
    let record = store::insert_asset_transaction(&tx, asset_id, kind, amount, units, date, note)?;
    apply_transaction(&mut asset, kind, amount, units);
    store::save_asset(&tx, &mut asset)?;
    store::snapshot_asset_value(&tx, asset_id, Period::from_date(date), asset.current_value)?;
    tx.commit()?;

    tracing::info!(asset_id, %kind, %amount, value = %asset.current_value, "asset transaction applied");
    Ok(record)
}

/// Create an asset and record its opening value for the current period.
pub fn create_asset(conn: &mut Connection, new: &NewAsset) -> Result<Asset> {
    let tx = conn.transaction()?;
    let asset = store::add_asset(&tx, new)?;
    store::snapshot_asset_value(&tx, asset.id, Period::current(), asset.current_value)?;
    tx.commit()?;
    Ok(asset)
}

/// Partial asset update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct AssetUpdate {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub current_value: Option<Decimal>,
    pub cost_basis: Option<Decimal>,
    /// `Some(None)` clears the target.
    pub target_amount: Option<Option<Decimal>>,
    pub monthly_contribution: Option<Decimal>,
    pub shares: Option<Decimal>,
    pub total_units: Option<Decimal>,
    pub vested_units: Option<Decimal>,
}

pub fn update_asset(conn: &mut Connection, id: i64, update: &AssetUpdate) -> Result<Asset> {
    let tx = conn.transaction()?;
    let mut asset = store::get_asset(&tx, id)?;
    if let Some(v) = &update.name {
        asset.name = v.trim().to_string();
    }
    if let Some(v) = &update.kind {
        asset.kind = v.trim().to_string();
    }
    if let Some(v) = update.current_value {
        asset.current_value = v;
    }
    if let Some(v) = update.cost_basis {
        asset.cost_basis = v;
    }
    if let Some(v) = update.target_amount {
        asset.target_amount = v;
    }
    if let Some(v) = update.monthly_contribution {
        asset.monthly_contribution = v;
    }
    if let Some(v) = update.shares {
        asset.shares = v;
    }
    if let Some(v) = update.total_units {
        asset.total_units = v;
    }
    if let Some(v) = update.vested_units {
        asset.vested_units = v;
    }
    store::save_asset(&tx, &mut asset)?;
    store::snapshot_asset_value(&tx, id, Period::current(), asset.current_value)?;
    tx.commit()?;
    Ok(asset)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypeTotals {
    pub count: usize,
    pub total_value: Decimal,
    pub cost_basis: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssetSummary {
    pub total_value: Decimal,
    pub total_cost_basis: Decimal,
    pub total_gain_loss: Decimal,
    /// Zero when nothing was invested.
    pub gain_loss_percent: Decimal,
    pub by_type: BTreeMap<String, TypeTotals>,
}

pub fn summarize_assets(assets: &[Asset]) -> AssetSummary {
    let mut s = AssetSummary::default();
    for a in assets.iter().filter(|a| a.is_active) {
        s.total_value += a.current_value;
        s.total_cost_basis += a.cost_basis;
        let bucket = s.by_type.entry(a.kind.clone()).or_default();
        bucket.count += 1;
        bucket.total_value += a.current_value;
        bucket.cost_basis += a.cost_basis;
    }
    s.total_gain_loss = s.total_value - s.total_cost_basis;
    if s.total_cost_basis > Decimal::ZERO {
        s.gain_loss_percent = (s.total_gain_loss / s.total_cost_basis * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    }
    s
}

pub fn get_asset_summary(conn: &Connection, scope: Scope) -> Result<AssetSummary> {
    let assets = store::active_assets(conn, scope)?;
    Ok(summarize_assets(&assets))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetWorth {
    pub assets: Decimal,
    pub loans: Decimal,
    pub debts: Decimal,
    pub liabilities: Decimal,
    pub net_worth: Decimal,
}

pub fn get_net_worth(conn: &Connection, scope: Scope) -> Result<NetWorth> {
    let assets: Decimal = store::active_assets(conn, scope)?
        .iter()
        .map(|a| a.current_value)
        .sum();
    let loans: Decimal = store::loans_for_scope(conn, scope)?
        .iter()
        .map(|l| l.remaining_balance)
        .sum();
    let debts: Decimal = store::debts_for_scope(conn, scope)?
        .iter()
        .map(|d| d.current_balance)
        .sum();
    let liabilities = loans + debts;
    Ok(NetWorth {
        assets,
        loans,
        debts,
        liabilities,
        net_worth: assets - liabilities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn asset(kind: &str) -> Asset {
        Asset {
            id: 1,
            user_id: 1,
            name: "Broker".into(),
            kind: kind.into(),
            current_value: dec!(1000),
            cost_basis: dec!(800),
            target_amount: None,
            monthly_contribution: dec!(0),
            shares: dec!(10),
            total_units: dec!(100),
            vested_units: dec!(25),
            unvested_units: dec!(75),
            is_active: true,
        }
    }

    #[test]
    fn deposit_and_contribution_raise_value_and_basis() {
        for kind in [AssetTxKind::Deposit, AssetTxKind::Contribution] {
            let mut a = asset("savings");
            apply_transaction(&mut a, kind, dec!(200), None);
            assert_eq!(a.current_value, dec!(1200));
            assert_eq!(a.cost_basis, dec!(1000));
        }
    }

    #[test]
    fn withdraw_and_sell_clamp_at_zero() {
        let mut a = asset("stocks");
        apply_transaction(&mut a, AssetTxKind::Withdraw, dec!(5000), None);
        assert_eq!(a.current_value, dec!(0));
        assert_eq!(a.cost_basis, dec!(800));

        let mut a = asset("stocks");
        apply_transaction(&mut a, AssetTxKind::Sell, dec!(300), Some(dec!(50)));
        assert_eq!(a.shares, dec!(0));
        assert_eq!(a.current_value, dec!(700));
    }

    #[test]
    fn buy_adds_shares_basis_and_value() {
        let mut a = asset("stocks");
        apply_transaction(&mut a, AssetTxKind::Buy, dec!(500), Some(dec!(4)));
        assert_eq!(a.shares, dec!(14));
        assert_eq!(a.cost_basis, dec!(1300));
        assert_eq!(a.current_value, dec!(1500));
    }

    #[test]
    fn vest_moves_units_and_recomputes_unvested() {
        let mut a = asset("rsu");
        apply_transaction(&mut a, AssetTxKind::Vest, dec!(0), Some(dec!(25)));
        assert_eq!(a.vested_units, dec!(50));
        assert_eq!(a.unvested_units, dec!(50));
        apply_transaction(&mut a, AssetTxKind::Vest, dec!(0), Some(dec!(80)));
        assert_eq!(a.unvested_units, dec!(0));
        assert_eq!(a.current_value, dec!(1000));
    }

    #[test]
    fn dividend_only_raises_value() {
        let mut a = asset("stocks");
        apply_transaction(&mut a, AssetTxKind::Dividend, dec!(12.5), None);
        assert_eq!(a.current_value, dec!(1012.5));
        assert_eq!(a.cost_basis, dec!(800));
    }

    #[test]
    fn summary_groups_by_type_and_skips_inactive() {
        let mut gone = asset("crypto");
        gone.is_active = false;
        let assets = vec![asset("stocks"), asset("stocks"), asset("savings"), gone];
        let s = summarize_assets(&assets);
        assert_eq!(s.total_value, dec!(3000));
        assert_eq!(s.total_cost_basis, dec!(2400));
        assert_eq!(s.total_gain_loss, dec!(600));
        assert_eq!(s.gain_loss_percent, dec!(25));
        assert_eq!(s.by_type["stocks"].count, 2);
        assert!(!s.by_type.contains_key("crypto"));
    }

    #[test]
    fn summary_without_basis_has_zero_percent() {
        let mut a = asset("cash");
        a.cost_basis = dec!(0);
        assert_eq!(summarize_assets(&[a]).gain_loss_percent, dec!(0));
    }
}
