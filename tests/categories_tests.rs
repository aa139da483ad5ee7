// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use homefin::error::LedgerError;
use homefin::models::CategoryType;
use homefin::store::{self, NewCategory};
use homefin::{cli, commands, db};
use rusqlite::Connection;
use rust_decimal_macros::dec;

fn handle(conn: &Connection, argv: &[&str]) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("category", sub)) => commands::categories::handle(conn, sub),
        Some(("user", sub)) => commands::users::handle(conn, sub),
        _ => panic!("unexpected subcommand"),
    }
}

#[test]
fn add_with_flags_and_reject_duplicates() {
    let conn = db::open_in_memory().unwrap();
    handle(
        &conn,
        &["homefin", "category", "add", "--name", "Gym", "--type", "fixed expense", "--static", "--individual", "--default", "150"],
    )
    .unwrap();
    let gym = &store::find_categories(&conn, "Gym", None).unwrap()[0];
    assert_eq!(gym.kind, CategoryType::FixedExpense);
    assert!(gym.is_static && !gym.is_household && gym.is_recurring);
    assert_eq!(gym.default_amount, dec!(150));

    let err = store::add_category(&conn, &NewCategory::new("Gym", CategoryType::FixedExpense)).unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateCategory { .. }));
    // same name, different type is fine
    store::add_category(&conn, &NewCategory::new("Gym", CategoryType::Utility)).unwrap();
}

#[test]
fn set_default_marks_category_static() {
    let conn = db::open_in_memory().unwrap();
    let water = store::find_categories(&conn, "Water", None).unwrap()[0].clone();
    assert!(!water.is_static);
    let id = water.id.to_string();
    handle(&conn, &["homefin", "category", "set-default", "--id", id.as_str(), "--amount", "90"]).unwrap();
    let water = store::get_category(&conn, water.id).unwrap();
    assert!(water.is_static);
    assert_eq!(water.default_amount, dec!(90));
}

#[test]
fn household_account_cannot_be_removed() {
    let conn = db::open_in_memory().unwrap();
    assert!(handle(&conn, &["homefin", "user", "rm", "--name", "Household"]).is_err());
    assert!(store::household(&conn).is_ok());
}

#[test]
fn removing_a_user_cascades_their_data() {
    let conn = db::open_in_memory().unwrap();
    handle(&conn, &["homefin", "user", "add", "--name", "Bob"]).unwrap();
    let bob = store::find_user_by_name(&conn, "Bob").unwrap().unwrap();
    store::add_debt(
        &conn,
        &store::NewDebt {
            user_id: bob.id,
            name: "Store card".into(),
            current_balance: dec!(90),
            credit_limit: dec!(500),
            minimum_payment: dec!(10),
            interest_rate: dec!(0),
            is_temporary: false,
        },
    )
    .unwrap();
    handle(&conn, &["homefin", "user", "rm", "--name", "Bob"]).unwrap();
    let debts: i64 = conn
        .query_row("SELECT COUNT(*) FROM debts", [], |r| r.get(0))
        .unwrap();
    assert_eq!(debts, 0);
    assert!(store::list_real_users(&conn).unwrap().is_empty());
}
