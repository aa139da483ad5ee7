// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, params};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::CategoryType;
use crate::store;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Homefin", "homefin"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("homefin.sqlite"))
}

/// Open the database at `path` (or the platform default), creating the schema,
/// the Household account and the default categories when missing.
pub fn open_or_init(path: Option<&Path>) -> Result<Connection> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => db_path()?,
    };
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    bootstrap(&mut conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory()?;
    init_schema(&mut conn)?;
    bootstrap(&mut conn)?;
    Ok(conn)
}

fn bootstrap(conn: &mut Connection) -> Result<()> {
    store::get_or_create_system_account(conn).context("Ensure Household account")?;
    seed_default_categories(conn).context("Seed default categories")?;
    Ok(())
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS users(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        is_system_account INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE UNIQUE INDEX IF NOT EXISTS idx_users_single_system
        ON users(is_system_account) WHERE is_system_account = 1;

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        type TEXT NOT NULL,
        is_recurring INTEGER NOT NULL DEFAULT 1,
        is_static INTEGER NOT NULL DEFAULT 0,
        is_household INTEGER NOT NULL DEFAULT 1,
        default_amount TEXT NOT NULL DEFAULT '0',
        UNIQUE(name, type)
    );

    CREATE TABLE IF NOT EXISTS records(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        category_id INTEGER NOT NULL,
        amount TEXT NOT NULL,
        month_year TEXT NOT NULL,
        note TEXT,
        UNIQUE(user_id, category_id, month_year),
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_records_month ON records(month_year);

    CREATE TABLE IF NOT EXISTS loans(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        total_principal TEXT NOT NULL,
        remaining_balance TEXT NOT NULL,
        interest_rate TEXT NOT NULL DEFAULT '0',
        monthly_payment TEXT NOT NULL,
        start_date TEXT NOT NULL,
        target_payoff_date TEXT,
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS debts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        current_balance TEXT NOT NULL,
        credit_limit TEXT NOT NULL DEFAULT '0',
        minimum_payment TEXT NOT NULL DEFAULT '0',
        interest_rate TEXT NOT NULL DEFAULT '0',
        is_temporary INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS debt_payments(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        debt_id INTEGER NOT NULL,
        amount TEXT NOT NULL,
        month_year TEXT NOT NULL,
        note TEXT,
        UNIQUE(debt_id, month_year),
        FOREIGN KEY(debt_id) REFERENCES debts(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS assets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        type TEXT NOT NULL,
        current_value TEXT NOT NULL DEFAULT '0',
        cost_basis TEXT NOT NULL DEFAULT '0',
        target_amount TEXT,
        monthly_contribution TEXT NOT NULL DEFAULT '0',
        shares TEXT NOT NULL DEFAULT '0',
        total_units TEXT NOT NULL DEFAULT '0',
        vested_units TEXT NOT NULL DEFAULT '0',
        unvested_units TEXT NOT NULL DEFAULT '0',
        is_active INTEGER NOT NULL DEFAULT 1,
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS asset_transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        asset_id INTEGER NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('deposit','withdraw','buy','sell','vest','dividend','contribution')),
        amount TEXT NOT NULL,
        units TEXT,
        date TEXT NOT NULL,
        note TEXT,
        FOREIGN KEY(asset_id) REFERENCES assets(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS asset_history(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        asset_id INTEGER NOT NULL,
        month_year TEXT NOT NULL,
        value TEXT NOT NULL,
        UNIQUE(asset_id, month_year),
        FOREIGN KEY(asset_id) REFERENCES assets(id) ON DELETE CASCADE
    );
    "#,
    )?;
    Ok(())
}

/// (name, type, recurring, static, household)
const DEFAULT_CATEGORIES: &[(&str, CategoryType, bool, bool, bool)] = &[
    ("Salary", CategoryType::Income, true, true, false),
    ("Freelance", CategoryType::Income, false, false, false),
    ("Investment Returns", CategoryType::Income, false, false, false),
    ("Rent", CategoryType::FixedExpense, true, true, true),
    ("Property Tax", CategoryType::FixedExpense, true, true, true),
    ("Insurance", CategoryType::FixedExpense, true, true, true),
    ("Groceries", CategoryType::FixedExpense, true, false, true),
    ("Electricity", CategoryType::Utility, true, false, true),
    ("Water", CategoryType::Utility, true, false, true),
    ("Internet", CategoryType::Utility, true, true, true),
    ("Gas", CategoryType::Utility, true, false, true),
];

fn seed_default_categories(conn: &Connection) -> Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))?;
    if count > 0 {
        return Ok(());
    }
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO categories(name, type, is_recurring, is_static, is_household, default_amount)
         VALUES (?1, ?2, ?3, ?4, ?5, '0')",
    )?;
    for (name, kind, recurring, is_static, household) in DEFAULT_CATEGORIES {
        stmt.execute(params![name, kind, recurring, is_static, household])?;
    }
    tracing::info!(count = DEFAULT_CATEGORIES.len(), "seeded default categories");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_is_idempotent() {
        let mut conn = open_in_memory().unwrap();
        bootstrap(&mut conn).unwrap();
        let households: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE is_system_account = 1",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(households, 1);
        let cats: i64 = conn
            .query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))
            .unwrap();
        assert_eq!(cats as usize, DEFAULT_CATEGORIES.len());
    }

    #[test]
    fn second_system_account_is_rejected() {
        let conn = open_in_memory().unwrap();
        let err = conn
            .execute(
                "INSERT INTO users(name, is_system_account) VALUES ('Other', 1)",
                [],
            )
            .unwrap_err();
        assert!(crate::error::is_constraint_violation(&err));
    }
}
