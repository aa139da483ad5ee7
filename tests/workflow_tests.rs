// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use homefin::error::LedgerError;
use homefin::models::{CategoryType, Scope};
use homefin::period::Period;
use homefin::store::{self, NewCategory, RecordInput};
use homefin::{cli, commands::month, db, workflow};
use rusqlite::Connection;
use rust_decimal_macros::dec;

fn period() -> Period {
    "2025-04".parse().unwrap()
}

/// Fresh database with three real users and only the listed categories.
fn setup(categories: &[NewCategory]) -> Connection {
    let conn = db::open_in_memory().unwrap();
    conn.execute("DELETE FROM categories", []).unwrap();
    for name in ["Alice", "Bob", "Carol"] {
        store::add_user(&conn, name).unwrap();
    }
    for c in categories {
        store::add_category(&conn, c).unwrap();
    }
    conn
}

fn household(name: &str, kind: CategoryType) -> NewCategory {
    NewCategory::new(name, kind)
}

fn per_user(name: &str, kind: CategoryType) -> NewCategory {
    let mut c = NewCategory::new(name, kind);
    c.is_household = false;
    c
}

#[test]
fn household_category_seeds_one_record_and_per_user_seeds_three() {
    let mut conn = setup(&[
        household("Rent", CategoryType::FixedExpense),
        per_user("Salary", CategoryType::Income),
    ]);
    let created = workflow::start_new_month(&mut conn, period()).unwrap();
    assert_eq!(created.created_count, 4);
    assert_eq!(created.message, "Created empty month: April 2025");

    let h = store::household(&conn).unwrap();
    let records = store::records_for_period(&conn, period(), Scope::Family).unwrap();
    let rent: Vec<_> = records.iter().filter(|r| r.category_name == "Rent").collect();
    assert_eq!(rent.len(), 1);
    assert_eq!(rent[0].record.user_id, h.id);
    let salary = records.iter().filter(|r| r.category_name == "Salary").count();
    assert_eq!(salary, 3);
}

#[test]
fn starting_a_month_twice_fails_and_changes_nothing() {
    let mut conn = setup(&[household("Rent", CategoryType::FixedExpense)]);
    workflow::start_new_month(&mut conn, period()).unwrap();
    let before = store::count_records_for_period(&conn, period()).unwrap();

    let err = workflow::start_new_month(&mut conn, period()).unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyExistsForPeriod { .. }));
    assert!(err.is_precondition());
    assert_eq!(store::count_records_for_period(&conn, period()).unwrap(), before);
}

#[test]
fn static_categories_copy_defaults_and_dynamic_reset_to_zero() {
    let mut internet = household("Internet", CategoryType::Utility);
    internet.is_static = true;
    internet.default_amount = dec!(120);
    let mut stale = household("Water", CategoryType::Utility);
    stale.default_amount = dec!(80);
    let mut conn = setup(&[internet, stale]);

    workflow::start_new_month(&mut conn, period()).unwrap();
    let records = store::records_for_period(&conn, period(), Scope::Family).unwrap();
    let amount = |name: &str| {
        records
            .iter()
            .find(|r| r.category_name == name)
            .map(|r| r.record.amount)
            .unwrap()
    };
    assert_eq!(amount("Internet"), dec!(120));
    assert_eq!(amount("Water"), dec!(0));
}

#[test]
fn non_recurring_categories_are_not_seeded() {
    let mut bonus = per_user("Bonus", CategoryType::Income);
    bonus.is_recurring = false;
    let mut conn = setup(&[bonus, household("Rent", CategoryType::FixedExpense)]);
    let created = workflow::start_new_month(&mut conn, period()).unwrap();
    assert_eq!(created.created_count, 1);
}

#[test]
fn start_without_users_or_categories_is_rejected() {
    let mut conn = db::open_in_memory().unwrap();
    let err = workflow::start_new_month(&mut conn, period()).unwrap_err();
    assert!(matches!(err, LedgerError::NoUsersFound));

    store::add_user(&conn, "Alice").unwrap();
    conn.execute("DELETE FROM categories", []).unwrap();
    let err = workflow::start_new_month(&mut conn, period()).unwrap_err();
    assert!(matches!(err, LedgerError::NoCategoriesFound));
}

#[test]
fn status_tracks_filled_amounts() {
    let mut internet = household("Internet", CategoryType::Utility);
    internet.is_static = true;
    internet.default_amount = dec!(120);
    let mut conn = setup(&[
        internet,
        household("Groceries", CategoryType::FixedExpense),
        per_user("Salary", CategoryType::Income),
    ]);

    let empty = workflow::get_month_status(&conn, Scope::Family, period()).unwrap();
    assert!(!empty.is_setup);

    workflow::start_new_month(&mut conn, period()).unwrap();
    let status = workflow::get_month_status(&conn, Scope::Family, period()).unwrap();
    assert!(status.is_setup);
    assert_eq!(status.static_progress, 100);
    // groceries + 3 salaries, all still zero
    assert_eq!(status.dynamic_total_count, 4);
    assert_eq!(status.dynamic_progress, 0);

    let alice = store::find_user_by_name(&conn, "Alice").unwrap().unwrap();
    let salary = store::find_categories(&conn, "Salary", None).unwrap()[0].id;
    workflow::save_records(
        &mut conn,
        &[RecordInput {
            user_id: alice.id,
            category_id: salary,
            month_year: period(),
            amount: dec!(9000),
            note: None,
        }],
    )
    .unwrap();
    let status = workflow::get_month_status(&conn, Scope::Family, period()).unwrap();
    assert_eq!(status.dynamic_set_count, 1);
    assert_eq!(status.dynamic_progress, 25);
    assert_eq!(status.overall_progress, 63);
}

#[test]
fn save_records_rejects_negative_amounts_without_writing() {
    let mut conn = setup(&[household("Rent", CategoryType::FixedExpense)]);
    let h = store::household(&conn).unwrap();
    let rent = store::find_categories(&conn, "Rent", None).unwrap()[0].id;
    let input = |amount| RecordInput {
        user_id: h.id,
        category_id: rent,
        month_year: period(),
        amount,
        note: None,
    };
    let err = workflow::save_records(&mut conn, &[input(dec!(10)), input(dec!(-5))]).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));
    assert_eq!(store::count_records_for_period(&conn, period()).unwrap(), 0);
}

#[test]
fn month_start_command_seeds_the_requested_period() {
    let mut conn = setup(&[household("Rent", CategoryType::FixedExpense)]);
    let matches = cli::build_cli().get_matches_from(["homefin", "month", "start", "--month", "2025-04"]);
    if let Some(("month", sub)) = matches.subcommand() {
        month::handle(&mut conn, sub).unwrap();
    } else {
        panic!("no month subcommand");
    }
    assert_eq!(workflow::available_months(&conn).unwrap(), vec![period()]);
}
