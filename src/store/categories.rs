// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use super::dec;
use crate::error::{LedgerError, Result, is_constraint_violation};
use crate::models::{Category, CategoryType};

const CATEGORY_COLS: &str =
    "id, name, type, is_recurring, is_static, is_household, default_amount";

pub(crate) fn category_from_row(r: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        name: r.get(1)?,
        kind: r.get(2)?,
        is_recurring: r.get(3)?,
        is_static: r.get(4)?,
        is_household: r.get(5)?,
        default_amount: dec(r, 6)?,
    })
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub kind: CategoryType,
    pub is_recurring: bool,
    pub is_static: bool,
    pub is_household: bool,
    pub default_amount: Decimal,
}

impl NewCategory {
    /// A recurring, dynamic household category with no default.
    pub fn new(name: impl Into<String>, kind: CategoryType) -> Self {
        Self {
            name: name.into(),
            kind,
            is_recurring: true,
            is_static: false,
            is_household: true,
            default_amount: Decimal::ZERO,
        }
    }
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub kind: Option<CategoryType>,
    pub is_recurring: Option<bool>,
    pub is_static: Option<bool>,
    pub is_household: Option<bool>,
    pub default_amount: Option<Decimal>,
}

fn duplicate(name: &str, kind: CategoryType) -> LedgerError {
    LedgerError::DuplicateCategory {
        name: name.to_string(),
        kind: kind.to_string(),
    }
}

pub fn add_category(conn: &Connection, new: &NewCategory) -> Result<Category> {
    let name = new.name.trim();
    if new.default_amount < Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!(
            "default amount {} is negative",
            new.default_amount
        )));
    }
    let res = conn.execute(
        "INSERT INTO categories(name, type, is_recurring, is_static, is_household, default_amount)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            name,
            new.kind,
            new.is_recurring,
            new.is_static,
            new.is_household,
            new.default_amount.to_string()
        ],
    );
    match res {
        Ok(_) => get_category(conn, conn.last_insert_rowid()),
        Err(e) if is_constraint_violation(&e) => Err(duplicate(name, new.kind)),
        Err(e) => Err(e.into()),
    }
}

pub fn get_category(conn: &Connection, id: i64) -> Result<Category> {
    conn.query_row(
        &format!("SELECT {CATEGORY_COLS} FROM categories WHERE id = ?1"),
        params![id],
        category_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("Category", id))
}

/// Categories named `name`, optionally narrowed to one type.
pub fn find_categories(
    conn: &Connection,
    name: &str,
    kind: Option<CategoryType>,
) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CATEGORY_COLS} FROM categories
         WHERE name = ?1 AND (?2 IS NULL OR type = ?2) ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![name.trim(), kind], category_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn list_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CATEGORY_COLS} FROM categories ORDER BY type, name"
    ))?;
    let rows = stmt.query_map([], category_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn recurring_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CATEGORY_COLS} FROM categories WHERE is_recurring = 1 ORDER BY type, name"
    ))?;
    let rows = stmt.query_map([], category_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn update_category(conn: &Connection, id: i64, update: &CategoryUpdate) -> Result<Category> {
    let mut cat = get_category(conn, id)?;
    if let Some(name) = &update.name {
        cat.name = name.trim().to_string();
    }
    if let Some(kind) = update.kind {
        cat.kind = kind;
    }
    if let Some(v) = update.is_recurring {
        cat.is_recurring = v;
    }
    if let Some(v) = update.is_static {
        cat.is_static = v;
    }
    if let Some(v) = update.is_household {
        cat.is_household = v;
    }
    if let Some(amount) = update.default_amount {
        if amount < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "default amount {} is negative",
                amount
            )));
        }
        cat.default_amount = amount;
    }
    let res = conn.execute(
        "UPDATE categories SET name=?1, type=?2, is_recurring=?3, is_static=?4, is_household=?5, default_amount=?6
         WHERE id=?7",
        params![
            cat.name,
            cat.kind,
            cat.is_recurring,
            cat.is_static,
            cat.is_household,
            cat.default_amount.to_string(),
            id
        ],
    );
    match res {
        Ok(_) => Ok(cat),
        Err(e) if is_constraint_violation(&e) => Err(duplicate(&cat.name, cat.kind)),
        Err(e) => Err(e.into()),
    }
}

pub fn remove_category(conn: &Connection, id: i64) -> Result<()> {
    let removed = conn.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
    if removed == 0 {
        return Err(LedgerError::not_found("Category", id));
    }
    Ok(())
}
