// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use rust_decimal::Decimal;
use serde::Serialize;

use super::dec;
use crate::error::{LedgerError, Result};
use crate::models::{CategorizedRecord, CategoryType, Record, Scope};
use crate::period::Period;

const RECORD_COLS: &str = "r.id, r.user_id, r.category_id, r.amount, r.month_year, r.note";

fn record_from_row(r: &Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        id: r.get(0)?,
        user_id: r.get(1)?,
        category_id: r.get(2)?,
        amount: dec(r, 3)?,
        month_year: r.get(4)?,
        note: r.get(5)?,
    })
}

fn categorized_from_row(r: &Row<'_>) -> rusqlite::Result<CategorizedRecord> {
    Ok(CategorizedRecord {
        record: record_from_row(r)?,
        category_name: r.get(6)?,
        kind: r.get(7)?,
    })
}

/// Natural key plus payload for an idempotent record write.
#[derive(Debug, Clone, Serialize)]
pub struct RecordInput {
    pub user_id: i64,
    pub category_id: i64,
    pub month_year: Period,
    pub amount: Decimal,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub period: Option<Period>,
    pub user_id: Option<i64>,
    pub kind: Option<CategoryType>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordListing {
    pub id: i64,
    pub month_year: Period,
    pub user: String,
    pub category: String,
    pub kind: CategoryType,
    pub amount: Decimal,
    pub note: Option<String>,
}

/// Records of `period` joined to their category type.
pub fn records_for_period(
    conn: &Connection,
    period: Period,
    scope: Scope,
) -> Result<Vec<CategorizedRecord>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {RECORD_COLS}, c.name, c.type
         FROM records r JOIN categories c ON r.category_id = c.id
         WHERE r.month_year = ?1 AND (?2 IS NULL OR r.user_id = ?2)
         ORDER BY r.id"
    ))?;
    let rows = stmt.query_map(params![period, scope.user_id()], categorized_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Records of `period` owned by real users only.
pub fn real_user_records_for_period(
    conn: &Connection,
    period: Period,
) -> Result<Vec<CategorizedRecord>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {RECORD_COLS}, c.name, c.type
         FROM records r
         JOIN categories c ON r.category_id = c.id
         JOIN users u ON r.user_id = u.id
         WHERE r.month_year = ?1 AND u.is_system_account = 0
         ORDER BY r.id"
    ))?;
    let rows = stmt.query_map(params![period], categorized_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn list_records(conn: &Connection, filter: &RecordFilter) -> Result<Vec<RecordListing>> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.month_year, u.name, c.name, c.type, r.amount, r.note
         FROM records r
         JOIN users u ON r.user_id = u.id
         JOIN categories c ON r.category_id = c.id
         WHERE (?1 IS NULL OR r.month_year = ?1)
           AND (?2 IS NULL OR r.user_id = ?2)
           AND (?3 IS NULL OR c.type = ?3)
         ORDER BY r.month_year DESC, r.category_id ASC, r.id ASC",
    )?;
    let rows = stmt.query_map(params![filter.period, filter.user_id, filter.kind], |r| {
        Ok(RecordListing {
            id: r.get(0)?,
            month_year: r.get(1)?,
            user: r.get(2)?,
            category: r.get(3)?,
            kind: r.get(4)?,
            amount: dec(r, 5)?,
            note: r.get(6)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn count_records_for_period(conn: &Connection, period: Period) -> Result<i64> {
    let n = conn.query_row(
        "SELECT COUNT(*) FROM records WHERE month_year = ?1",
        params![period],
        |r| r.get(0),
    )?;
    Ok(n)
}

pub fn find_record(
    conn: &Connection,
    user_id: i64,
    category_id: i64,
    period: Period,
) -> Result<Option<Record>> {
    let rec = conn
        .query_row(
            &format!(
                "SELECT {RECORD_COLS} FROM records r
                 WHERE r.user_id = ?1 AND r.category_id = ?2 AND r.month_year = ?3"
            ),
            params![user_id, category_id, period],
            record_from_row,
        )
        .optional()?;
    Ok(rec)
}

/// Insert or overwrite the record keyed by `(user, category, period)`.
pub fn upsert_record(conn: &Connection, input: &RecordInput) -> Result<Record> {
    conn.execute(
        "INSERT INTO records(user_id, category_id, amount, month_year, note)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(user_id, category_id, month_year)
         DO UPDATE SET amount = excluded.amount, note = excluded.note",
        params![
            input.user_id,
            input.category_id,
            input.amount.to_string(),
            input.month_year,
            input.note
        ],
    )?;
    find_record(conn, input.user_id, input.category_id, input.month_year)?
        .ok_or_else(|| LedgerError::not_found("Record", input.month_year))
}

/// Plain insert; a key collision surfaces as a constraint violation.
pub fn insert_record(conn: &Connection, input: &RecordInput) -> Result<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO records(user_id, category_id, amount, month_year, note)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    stmt.execute(params![
        input.user_id,
        input.category_id,
        input.amount.to_string(),
        input.month_year,
        input.note
    ])?;
    Ok(conn.last_insert_rowid())
}

pub fn delete_record(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM records WHERE id = ?1", params![id])?;
    if n == 0 {
        return Err(LedgerError::not_found("Record", id));
    }
    Ok(())
}

/// Deletes every listed record that exists; an empty list deletes nothing.
pub fn delete_records(conn: &Connection, ids: &[i64]) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }
    let placeholders = vec!["?"; ids.len()].join(",");
    let n = conn.execute(
        &format!("DELETE FROM records WHERE id IN ({placeholders})"),
        params_from_iter(ids.iter()),
    )?;
    Ok(n)
}

pub fn delete_period_records(conn: &Connection, period: Period, scope: Scope) -> Result<usize> {
    let n = conn.execute(
        "DELETE FROM records WHERE month_year = ?1 AND (?2 IS NULL OR user_id = ?2)",
        params![period, scope.user_id()],
    )?;
    Ok(n)
}

/// Periods that hold at least one record, newest first.
pub fn record_periods(conn: &Connection) -> Result<Vec<Period>> {
    let mut stmt =
        conn.prepare("SELECT DISTINCT month_year FROM records ORDER BY month_year DESC")?;
    let rows = stmt.query_map([], |r| r.get::<_, Period>(0))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
