// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use homefin::assets::{self, AssetUpdate};
use homefin::error::LedgerError;
use homefin::models::{AssetTxKind, Scope};
use homefin::period::Period;
use homefin::store::{self, NewAsset, NewDebt};
use homefin::{cli, commands, db};
use rusqlite::Connection;
use rust_decimal_macros::dec;

fn setup() -> (Connection, i64) {
    let conn = db::open_in_memory().unwrap();
    let alice = store::add_user(&conn, "Alice").unwrap();
    (conn, alice.id)
}

fn stocks(user_id: i64) -> NewAsset {
    let mut new = NewAsset::new(user_id, "Broker", "stocks");
    new.current_value = dec!(1000);
    new.cost_basis = dec!(1000);
    new.shares = dec!(10);
    new
}

#[test]
fn create_snapshots_opening_value() {
    let (mut conn, alice) = setup();
    let asset = assets::create_asset(&mut conn, &stocks(alice)).unwrap();
    let history = store::asset_value_history(&conn, asset.id).unwrap();
    assert_eq!(history, vec![(Period::current(), dec!(1000))]);
}

#[test]
fn transaction_updates_asset_and_history_together() {
    let (mut conn, alice) = setup();
    let asset = assets::create_asset(&mut conn, &stocks(alice)).unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
    assets::apply_asset_transaction(
        &mut conn,
        asset.id,
        AssetTxKind::Buy,
        dec!(500),
        Some(dec!(5)),
        Some(date),
        Some("dip"),
    )
    .unwrap();

    let after = store::get_asset(&conn, asset.id).unwrap();
    assert_eq!(after.shares, dec!(15));
    assert_eq!(after.cost_basis, dec!(1500));
    assert_eq!(after.current_value, dec!(1500));

    let txs = store::asset_transactions(&conn, asset.id).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].date, date);
    let march: Period = "2025-03".parse().unwrap();
    assert!(
        store::asset_value_history(&conn, asset.id)
            .unwrap()
            .contains(&(march, dec!(1500)))
    );
}

#[test]
fn transaction_on_missing_asset_writes_nothing() {
    let (mut conn, _) = setup();
    let err = assets::apply_asset_transaction(
        &mut conn,
        42,
        AssetTxKind::Deposit,
        dec!(10),
        None,
        None,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { .. }));
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM asset_transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);
}

#[test]
fn update_recomputes_unvested_and_can_clear_target() {
    let (mut conn, alice) = setup();
    let mut rsu = NewAsset::new(alice, "Employer RSU", "rsu");
    rsu.total_units = dec!(400);
    rsu.vested_units = dec!(100);
    rsu.target_amount = Some(dec!(50000));
    let asset = assets::create_asset(&mut conn, &rsu).unwrap();
    assert_eq!(asset.unvested_units, dec!(300));

    let updated = assets::update_asset(
        &mut conn,
        asset.id,
        &AssetUpdate {
            vested_units: Some(dec!(250)),
            target_amount: Some(None),
            ..AssetUpdate::default()
        },
    )
    .unwrap();
    assert_eq!(updated.unvested_units, dec!(150));
    assert_eq!(updated.target_amount, None);
}

#[test]
fn deactivated_assets_leave_summary_and_net_worth() {
    let (mut conn, alice) = setup();
    let a = assets::create_asset(&mut conn, &stocks(alice)).unwrap();
    let mut cash = NewAsset::new(alice, "Savings", "savings");
    cash.current_value = dec!(2000);
    cash.cost_basis = dec!(2000);
    assets::create_asset(&mut conn, &cash).unwrap();
    store::add_debt(
        &conn,
        &NewDebt {
            user_id: alice,
            name: "Visa".into(),
            current_balance: dec!(700),
            credit_limit: dec!(0),
            minimum_payment: dec!(0),
            interest_rate: dec!(0),
            is_temporary: false,
        },
    )
    .unwrap();

    let nw = assets::get_net_worth(&conn, Scope::Family).unwrap();
    assert_eq!(nw.assets, dec!(3000));
    assert_eq!(nw.net_worth, dec!(2300));

    store::deactivate_asset(&conn, a.id).unwrap();
    let summary = assets::get_asset_summary(&conn, Scope::User(alice)).unwrap();
    assert_eq!(summary.total_value, dec!(2000));
    assert_eq!(summary.by_type.len(), 1);
    assert_eq!(assets::get_net_worth(&conn, Scope::Family).unwrap().net_worth, dec!(1300));
}

#[test]
fn tx_command_parses_type_and_units() {
    let (mut conn, alice) = setup();
    let a = assets::create_asset(&mut conn, &stocks(alice)).unwrap();
    let id = a.id.to_string();
    let matches = cli::build_cli().get_matches_from([
        "homefin", "asset", "tx", "--id", id.as_str(), "--type", "Sell", "--amount", "400",
        "--units", "4", "--date", "2025-01-31",
    ]);
    let (_, sub) = matches.subcommand().unwrap();
    commands::assets::handle(&mut conn, sub).unwrap();

    let after = store::get_asset(&conn, a.id).unwrap();
    assert_eq!(after.shares, dec!(6));
    assert_eq!(after.current_value, dec!(600));
}
