// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use homefin::error::LedgerError;
use homefin::period::Period;
use homefin::store::{self, DebtUpdate, NewDebt};
use homefin::{cli, commands::debts, db, ledger};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn period() -> Period {
    "2025-06".parse().unwrap()
}

fn setup(balance: Decimal, temporary: bool) -> (Connection, i64) {
    let conn = db::open_in_memory().unwrap();
    let user = store::add_user(&conn, "Alice").unwrap();
    let debt = store::add_debt(
        &conn,
        &NewDebt {
            user_id: user.id,
            name: "Visa".into(),
            current_balance: balance,
            credit_limit: dec!(5000),
            minimum_payment: dec!(50),
            interest_rate: dec!(18),
            is_temporary: temporary,
        },
    )
    .unwrap();
    (conn, debt.id)
}

fn balance(conn: &Connection, id: i64) -> Decimal {
    store::get_debt(conn, id).unwrap().current_balance
}

#[test]
fn re_recording_a_payment_only_applies_the_difference() {
    let (mut conn, id) = setup(dec!(1000), false);
    ledger::record_payment(&mut conn, id, period(), dec!(100), None, true).unwrap();
    assert_eq!(balance(&conn, id), dec!(900));
    ledger::record_payment(&mut conn, id, period(), dec!(150), None, true).unwrap();
    assert_eq!(balance(&conn, id), dec!(850));

    let payments = store::payments_for_debt(&conn, id).unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount, dec!(150));
}

#[test]
fn payment_without_balance_update_leaves_balance() {
    let (mut conn, id) = setup(dec!(1000), false);
    ledger::record_payment(&mut conn, id, period(), dec!(100), Some("autopay"), false).unwrap();
    assert_eq!(balance(&conn, id), dec!(1000));
    let p = store::find_payment(&conn, id, period()).unwrap().unwrap();
    assert_eq!(p.note.as_deref(), Some("autopay"));
}

#[test]
fn negative_payment_is_rejected() {
    let (mut conn, id) = setup(dec!(1000), false);
    let err = ledger::record_payment(&mut conn, id, period(), dec!(-1), None, true).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));
}

#[test]
fn payment_on_missing_debt_is_not_found() {
    let (mut conn, _) = setup(dec!(1000), false);
    let err = ledger::record_payment(&mut conn, 999, period(), dec!(10), None, true).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { entity: "Debt", .. }));
}

#[test]
fn pay_in_full_records_balance_and_zeroes_it() {
    let (mut conn, id) = setup(dec!(640), true);
    let full = ledger::pay_in_full(&mut conn, id, period()).unwrap();
    assert_eq!(full.amount_paid, dec!(640));
    assert_eq!(full.payment.note.as_deref(), Some(ledger::PAID_IN_FULL_NOTE));
    assert_eq!(balance(&conn, id), dec!(0));
}

#[test]
fn delete_with_revert_adds_the_payment_back() {
    let (mut conn, id) = setup(dec!(1000), false);
    let p = ledger::record_payment(&mut conn, id, period(), dec!(300), None, true).unwrap();
    assert_eq!(balance(&conn, id), dec!(700));
    let debt = ledger::delete_payment(&mut conn, id, p.id, true).unwrap();
    assert_eq!(debt.current_balance, dec!(1000));
    assert!(store::payments_for_debt(&conn, id).unwrap().is_empty());
}

#[test]
fn delete_without_revert_keeps_balance() {
    let (mut conn, id) = setup(dec!(1000), false);
    let p = ledger::record_payment(&mut conn, id, period(), dec!(300), None, true).unwrap();
    let debt = ledger::delete_payment(&mut conn, id, p.id, false).unwrap();
    assert_eq!(debt.current_balance, dec!(700));
}

#[test]
fn deleting_another_debts_payment_is_not_found() {
    let (mut conn, id) = setup(dec!(1000), false);
    let p = ledger::record_payment(&mut conn, id, period(), dec!(300), None, false).unwrap();
    let err = ledger::delete_payment(&mut conn, id + 1, p.id, true).unwrap_err();
    assert!(err.is_precondition());
}

#[test]
fn set_balance_overwrites_without_touching_payments() {
    let (mut conn, id) = setup(dec!(1000), false);
    ledger::record_payment(&mut conn, id, period(), dec!(100), None, true).unwrap();
    let debt = ledger::set_balance(&conn, id, dec!(2500)).unwrap();
    assert_eq!(debt.current_balance, dec!(2500));
    assert_eq!(store::payments_for_debt(&conn, id).unwrap().len(), 1);
}

#[test]
fn switching_to_temporary_with_balance_resets_minimum() {
    let (conn, id) = setup(dec!(1000), false);
    let debt = store::update_debt(
        &conn,
        id,
        &DebtUpdate {
            current_balance: Some(dec!(420)),
            is_temporary: Some(true),
            ..DebtUpdate::default()
        },
    )
    .unwrap();
    assert!(debt.is_temporary);
    assert_eq!(debt.minimum_payment, dec!(420));
}

#[test]
fn pay_command_with_update_balance_flag() {
    let (mut conn, id) = setup(dec!(1000), false);
    let id_s = id.to_string();
    let matches = cli::build_cli().get_matches_from([
        "homefin",
        "debt",
        "pay",
        "--id",
        id_s.as_str(),
        "--amount",
        "250",
        "--month",
        "2025-06",
        "--update-balance",
    ]);
    if let Some(("debt", sub)) = matches.subcommand() {
        debts::handle(&mut conn, sub).unwrap();
    } else {
        panic!("no debt subcommand");
    }
    assert_eq!(balance(&conn, id), dec!(750));
}
