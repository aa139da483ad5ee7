// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly setup: progress tracking, the setup wizard view and seeding a new
//! period from category metadata.

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::{LedgerError, Result, is_constraint_violation};
use crate::models::{Category, CategoryType, OwnershipScope, Record, Scope, User};
use crate::period::Period;
use crate::store::{self, RecordInput};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthStatus {
    pub month_year: Period,
    pub is_setup: bool,
    pub record_count: usize,
    pub dynamic_categories: usize,
    pub static_categories: usize,
    pub dynamic_set_count: usize,
    pub dynamic_total_count: usize,
    pub static_set_count: usize,
    pub static_total_count: usize,
    pub dynamic_progress: u32,
    pub static_progress: u32,
    pub overall_progress: u32,
}

fn percent(set: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    // round half up
    ((set * 200 + total) / (total * 2)) as u32
}

/// User ids expected to hold a record for `cat` under `scope`.
///
/// Family view fans out by ownership; a single-user view only expects that
/// user's per-user categories.
fn expected_owners(cat: &Category, scope: Scope, household_id: i64, users: &[User]) -> Vec<i64> {
    match scope {
        Scope::Family => cat.ownership().target_users(household_id, users),
        Scope::User(id) => match cat.ownership() {
            OwnershipScope::Household => Vec::new(),
            OwnershipScope::PerUser => vec![id],
        },
    }
}

/// Pure progress computation over fetched rows.
pub fn month_status(
    period: Period,
    scope: Scope,
    household_id: i64,
    users: &[User],
    categories: &[Category],
    records: &[Record],
) -> MonthStatus {
    let amounts: HashMap<(i64, i64), Decimal> = records
        .iter()
        .map(|r| ((r.user_id, r.category_id), r.amount))
        .collect();
    let is_set = |user: i64, cat: i64| {
        amounts
            .get(&(user, cat))
            .is_some_and(|amount| *amount > Decimal::ZERO)
    };

    let (mut dyn_set, mut dyn_total, mut st_set, mut st_total) = (0, 0, 0, 0);
    for cat in categories.iter().filter(|c| c.is_recurring) {
        for owner in expected_owners(cat, scope, household_id, users) {
            let set = is_set(owner, cat.id) as usize;
            if cat.is_static {
                st_total += 1;
                st_set += set;
            } else {
                dyn_total += 1;
                dyn_set += set;
            }
        }
    }

    let dynamic_progress = percent(dyn_set, dyn_total);
    let static_progress = percent(st_set, st_total);
    MonthStatus {
        month_year: period,
        is_setup: !records.is_empty(),
        record_count: records.len(),
        dynamic_categories: categories.iter().filter(|c| c.is_recurring && !c.is_static).count(),
        static_categories: categories.iter().filter(|c| c.is_recurring && c.is_static).count(),
        dynamic_set_count: dyn_set,
        dynamic_total_count: dyn_total,
        static_set_count: st_set,
        static_total_count: st_total,
        dynamic_progress,
        static_progress,
        overall_progress: (dynamic_progress + static_progress + 1) / 2,
    }
}

pub fn get_month_status(conn: &Connection, scope: Scope, period: Period) -> Result<MonthStatus> {
    let household = store::household(conn)?;
    let users = store::list_real_users(conn)?;
    let categories = store::recurring_categories(conn)?;
    let records: Vec<Record> = store::records_for_period(conn, period, scope)?
        .into_iter()
        .map(|r| r.record)
        .collect();
    Ok(month_status(period, scope, household.id, &users, &categories, &records))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetupEntry {
    pub user_id: i64,
    pub user_name: String,
    pub amount: Decimal,
    pub record_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetupCategory {
    pub id: i64,
    pub name: String,
    pub kind: CategoryType,
    pub is_static: bool,
    pub is_household: bool,
    pub default_amount: Decimal,
    pub users: Vec<SetupEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SetupCategories {
    #[serde(rename = "static")]
    pub static_categories: Vec<SetupCategory>,
    #[serde(rename = "dynamic")]
    pub dynamic_categories: Vec<SetupCategory>,
}

/// Wizard view: every recurring category with one entry per target user,
/// pre-filled from the period's record or the category's seed amount.
pub fn setup_categories(
    household: &User,
    users: &[User],
    categories: &[Category],
    records: &[Record],
) -> SetupCategories {
    let existing: HashMap<(i64, i64), &Record> = records
        .iter()
        .map(|r| ((r.user_id, r.category_id), r))
        .collect();
    let mut out = SetupCategories::default();

    for cat in categories.iter().filter(|c| c.is_recurring) {
        let entries = cat
            .ownership()
            .target_users(household.id, users)
            .into_iter()
            .map(|uid| {
                let name = if uid == household.id {
                    household.name.clone()
                } else {
                    users
                        .iter()
                        .find(|u| u.id == uid)
                        .map(|u| u.name.clone())
                        .unwrap_or_default()
                };
                let record = existing.get(&(uid, cat.id));
                SetupEntry {
                    user_id: uid,
                    user_name: name,
                    amount: record.map_or_else(|| cat.seed_amount(), |r| r.amount),
                    record_id: record.map(|r| r.id),
                }
            })
            .collect();
        let entry = SetupCategory {
            id: cat.id,
            name: cat.name.clone(),
            kind: cat.kind,
            is_static: cat.is_static,
            is_household: cat.is_household,
            default_amount: cat.default_amount,
            users: entries,
        };
        if cat.is_static {
            out.static_categories.push(entry);
        } else {
            out.dynamic_categories.push(entry);
        }
    }
    out
}

pub fn get_setup_categories(
    conn: &Connection,
    scope: Scope,
    period: Period,
) -> Result<SetupCategories> {
    let household = store::household(conn)?;
    let users: Vec<User> = store::list_real_users(conn)?
        .into_iter()
        .filter(|u| scope.user_id().is_none_or(|id| id == u.id))
        .collect();
    let categories = store::recurring_categories(conn)?;
    let records: Vec<Record> = store::records_for_period(conn, period, Scope::Family)?
        .into_iter()
        .map(|r| r.record)
        .collect();
    Ok(setup_categories(&household, &users, &categories, &records))
}

/// Set a category's default and mark it static; applies to future seeds.
pub fn apply_static_default(conn: &Connection, category_id: i64, amount: Decimal) -> Result<Category> {
    let update = store::CategoryUpdate {
        is_static: Some(true),
        default_amount: Some(amount),
        ..Default::default()
    };
    let cat = store::update_category(conn, category_id, &update)?;
    tracing::info!(category_id, %amount, "static default applied");
    Ok(cat)
}

/// Records a new period starts with: one per (category, target user).
pub fn seed_plan(
    period: Period,
    household_id: i64,
    users: &[User],
    categories: &[Category],
) -> Vec<RecordInput> {
    categories
        .iter()
        .filter(|c| c.is_recurring)
        .flat_map(|cat| {
            let amount = cat.seed_amount();
            cat.ownership()
                .target_users(household_id, users)
                .into_iter()
                .map(move |user_id| RecordInput {
                    user_id,
                    category_id: cat.id,
                    month_year: period,
                    amount,
                    note: None,
                })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMonth {
    pub month_year: Period,
    pub created_count: usize,
    pub message: String,
}

/// Seed an empty period. Fails when the period already has records, or when
/// there is nobody or nothing to seed. All inserts land or none do.
pub fn start_new_month(conn: &mut Connection, period: Period) -> Result<NewMonth> {
    let tx = conn.transaction()?;

    let existing = store::count_records_for_period(&tx, period)?;
    if existing > 0 {
        tracing::warn!(%period, existing, "month already started");
        return Err(LedgerError::AlreadyExistsForPeriod {
            period: period.to_string(),
            existing,
        });
    }
    let users = store::list_real_users(&tx)?;
    if users.is_empty() {
        return Err(LedgerError::NoUsersFound);
    }
    let categories = store::recurring_categories(&tx)?;
    if categories.is_empty() {
        return Err(LedgerError::NoCategoriesFound);
    }
    let household = store::get_or_create_system_account(&tx)?;

    let plan = seed_plan(period, household.id, &users, &categories);
    for input in &plan {
        match store::insert_record(&tx, input) {
            Ok(_) => {}
            Err(LedgerError::Storage(e)) if is_constraint_violation(&e) => {
                return Err(LedgerError::AlreadyExistsForPeriod {
                    period: period.to_string(),
                    existing: store::count_records_for_period(&tx, period)?,
                });
            }
            Err(e) => return Err(e),
        }
    }
    tx.commit()?;

    tracing::info!(%period, created = plan.len(), "new month seeded");
    Ok(NewMonth {
        month_year: period,
        created_count: plan.len(),
        message: format!("Created empty month: {}", period.display()),
    })
}

/// Upsert a batch of records as one unit.
pub fn save_records(conn: &mut Connection, inputs: &[RecordInput]) -> Result<Vec<Record>> {
    if let Some(bad) = inputs.iter().find(|i| i.amount < Decimal::ZERO) {
        return Err(LedgerError::InvalidAmount(format!(
            "record amount {} is negative",
            bad.amount
        )));
    }
    let tx = conn.transaction()?;
    let mut saved = Vec::with_capacity(inputs.len());
    for input in inputs {
        saved.push(store::upsert_record(&tx, input)?);
    }
    tx.commit()?;
    tracing::info!(count = saved.len(), "records saved");
    Ok(saved)
}

/// Periods with data, newest first.
pub fn available_months(conn: &Connection) -> Result<Vec<Period>> {
    store::record_periods(conn)
}
