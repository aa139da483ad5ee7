// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::{LedgerError, Result, is_constraint_violation};
use crate::models::User;

pub const HOUSEHOLD_NAME: &str = "Household";

const USER_COLS: &str = "id, name, is_system_account";

fn user_from_row(r: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: r.get(0)?,
        name: r.get(1)?,
        is_system_account: r.get(2)?,
    })
}

fn find_system_account(conn: &Connection) -> Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLS} FROM users WHERE is_system_account = 1"),
            [],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

/// Find-or-create the Household account.
///
/// The partial unique index on `is_system_account` means a racing second
/// insert fails; in that case the row the other writer created is returned.
pub fn get_or_create_system_account(conn: &Connection) -> Result<User> {
    if let Some(user) = find_system_account(conn)? {
        return Ok(user);
    }
    match conn.execute(
        "INSERT INTO users(name, is_system_account) VALUES (?1, 1)",
        params![HOUSEHOLD_NAME],
    ) {
        Ok(_) => tracing::info!("created Household system account"),
        Err(e) if is_constraint_violation(&e) => {}
        Err(e) => return Err(e.into()),
    }
    find_system_account(conn)?.ok_or_else(|| LedgerError::not_found("User", HOUSEHOLD_NAME))
}

pub fn household(conn: &Connection) -> Result<User> {
    find_system_account(conn)?.ok_or_else(|| LedgerError::not_found("User", HOUSEHOLD_NAME))
}

/// Real (non-system) users ordered by name.
pub fn list_real_users(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLS} FROM users WHERE is_system_account = 0 ORDER BY name, id"
    ))?;
    let rows = stmt.query_map([], user_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_user(conn: &Connection, id: i64) -> Result<User> {
    conn.query_row(
        &format!("SELECT {USER_COLS} FROM users WHERE id = ?1"),
        params![id],
        user_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("User", id))
}

pub fn find_user_by_name(conn: &Connection, name: &str) -> Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLS} FROM users WHERE name = ?1 ORDER BY id LIMIT 1"),
            params![name.trim()],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

pub fn add_user(conn: &Connection, name: &str) -> Result<User> {
    let name = name.trim();
    conn.execute(
        "INSERT INTO users(name, is_system_account) VALUES (?1, 0)",
        params![name],
    )?;
    get_user(conn, conn.last_insert_rowid())
}

/// Delete a real user; records, loans, debts and assets cascade.
pub fn remove_user(conn: &Connection, id: i64) -> Result<()> {
    let user = get_user(conn, id)?;
    if user.is_system_account {
        return Err(LedgerError::SystemAccount);
    }
    conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    Ok(())
}
