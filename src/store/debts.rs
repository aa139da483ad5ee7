// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, OptionalExtension, Row, ToSql, params};
use rust_decimal::Decimal;

use super::{dec, validate_non_negative, validate_rate};
use crate::error::{LedgerError, Result};
use crate::models::{DebtPayment, DebtWithPayment, RevolvingDebt, Scope};
use crate::period::Period;

const DEBT_COLS: &str = "d.id, d.user_id, d.name, d.current_balance, d.credit_limit, \
                         d.minimum_payment, d.interest_rate, d.is_temporary";

const PAYMENT_COLS: &str = "p.id, p.debt_id, p.amount, p.month_year, p.note";

fn debt_from_row(r: &Row<'_>) -> rusqlite::Result<RevolvingDebt> {
    Ok(RevolvingDebt {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        current_balance: dec(r, 3)?,
        credit_limit: dec(r, 4)?,
        minimum_payment: dec(r, 5)?,
        interest_rate: dec(r, 6)?,
        is_temporary: r.get(7)?,
    })
}

fn payment_from_row(r: &Row<'_>) -> rusqlite::Result<DebtPayment> {
    Ok(DebtPayment {
        id: r.get(0)?,
        debt_id: r.get(1)?,
        amount: dec(r, 2)?,
        month_year: r.get(3)?,
        note: r.get(4)?,
    })
}

#[derive(Debug, Clone)]
pub struct NewDebt {
    pub user_id: i64,
    pub name: String,
    pub current_balance: Decimal,
    pub credit_limit: Decimal,
    pub minimum_payment: Decimal,
    pub interest_rate: Decimal,
    pub is_temporary: bool,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct DebtUpdate {
    pub name: Option<String>,
    pub current_balance: Option<Decimal>,
    pub credit_limit: Option<Decimal>,
    pub minimum_payment: Option<Decimal>,
    pub interest_rate: Option<Decimal>,
    pub is_temporary: Option<bool>,
}

/// Temporary debts are paid in full, so their minimum is the whole balance.
pub fn add_debt(conn: &Connection, new: &NewDebt) -> Result<RevolvingDebt> {
    validate_non_negative("balance", new.current_balance)?;
    validate_non_negative("credit limit", new.credit_limit)?;
    validate_non_negative("minimum payment", new.minimum_payment)?;
    validate_rate(new.interest_rate)?;
    let minimum = if new.is_temporary {
        new.current_balance
    } else {
        new.minimum_payment
    };
    conn.execute(
        "INSERT INTO debts(user_id, name, current_balance, credit_limit, minimum_payment,
                           interest_rate, is_temporary)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            new.user_id,
            new.name.trim(),
            new.current_balance.to_string(),
            new.credit_limit.to_string(),
            minimum.to_string(),
            new.interest_rate.to_string(),
            new.is_temporary
        ],
    )?;
    get_debt(conn, conn.last_insert_rowid())
}

pub fn get_debt(conn: &Connection, id: i64) -> Result<RevolvingDebt> {
    conn.query_row(
        &format!("SELECT {DEBT_COLS} FROM debts d WHERE d.id = ?1"),
        params![id],
        debt_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::debt_not_found(id))
}

/// Debts in scope, in id order.
pub fn debts_for_scope(conn: &Connection, scope: Scope) -> Result<Vec<RevolvingDebt>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {DEBT_COLS} FROM debts d WHERE (?1 IS NULL OR d.user_id = ?1) ORDER BY d.id"
    ))?;
    let rows = stmt.query_map(params![scope.user_id()], debt_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Debts in scope with the payment recorded for `period` (zero when absent).
pub fn debts_with_payment(
    conn: &Connection,
    scope: Scope,
    period: Period,
) -> Result<Vec<DebtWithPayment>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {DEBT_COLS}, p.id, p.amount
         FROM debts d
         LEFT JOIN debt_payments p ON p.debt_id = d.id AND p.month_year = ?2
         WHERE (?1 IS NULL OR d.user_id = ?1)
         ORDER BY d.id"
    ))?;
    let rows = stmt.query_map(params![scope.user_id(), period], |r| {
        let payment_id: Option<i64> = r.get(8)?;
        let amount = match payment_id {
            Some(_) => dec(r, 9)?,
            None => Decimal::ZERO,
        };
        Ok(DebtWithPayment {
            debt: debt_from_row(r)?,
            period_payment: amount,
            period_payment_id: payment_id,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Apply a partial update.
///
/// Switching a debt to temporary while also setting a balance resets the
/// minimum payment to that balance.
pub fn update_debt(conn: &Connection, id: i64, update: &DebtUpdate) -> Result<RevolvingDebt> {
    let mut debt = get_debt(conn, id)?;
    if let Some(name) = update.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        debt.name = name.to_string();
    }
    if let Some(balance) = update.current_balance {
        validate_non_negative("balance", balance)?;
        debt.current_balance = balance;
    }
    if let Some(limit) = update.credit_limit {
        validate_non_negative("credit limit", limit)?;
        debt.credit_limit = limit;
    }
    if let Some(minimum) = update.minimum_payment {
        validate_non_negative("minimum payment", minimum)?;
        debt.minimum_payment = minimum;
    }
    if let Some(rate) = update.interest_rate {
        validate_rate(rate)?;
        debt.interest_rate = rate;
    }
    if let Some(temp) = update.is_temporary {
        debt.is_temporary = temp;
    }
    if update.is_temporary == Some(true) {
        if let Some(balance) = update.current_balance {
            debt.minimum_payment = balance;
        }
    }
    save_debt(conn, &debt)?;
    Ok(debt)
}

fn save_debt(conn: &Connection, debt: &RevolvingDebt) -> Result<()> {
    conn.execute(
        "UPDATE debts SET name=?1, current_balance=?2, credit_limit=?3, minimum_payment=?4,
                interest_rate=?5, is_temporary=?6
         WHERE id=?7",
        params![
            debt.name,
            debt.current_balance.to_string(),
            debt.credit_limit.to_string(),
            debt.minimum_payment.to_string(),
            debt.interest_rate.to_string(),
            debt.is_temporary,
            debt.id
        ],
    )?;
    Ok(())
}

pub fn set_debt_balance(conn: &Connection, id: i64, balance: Decimal) -> Result<()> {
    let n = conn.execute(
        "UPDATE debts SET current_balance = ?1 WHERE id = ?2",
        params![balance.to_string(), id],
    )?;
    if n == 0 {
        return Err(LedgerError::debt_not_found(id));
    }
    Ok(())
}

pub fn remove_debt(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM debts WHERE id = ?1", params![id])?;
    if n == 0 {
        return Err(LedgerError::debt_not_found(id));
    }
    Ok(())
}

pub fn find_payment(conn: &Connection, debt_id: i64, period: Period) -> Result<Option<DebtPayment>> {
    let payment = conn
        .query_row(
            &format!(
                "SELECT {PAYMENT_COLS} FROM debt_payments p
                 WHERE p.debt_id = ?1 AND p.month_year = ?2"
            ),
            params![debt_id, period],
            payment_from_row,
        )
        .optional()?;
    Ok(payment)
}

pub fn get_payment(conn: &Connection, id: i64) -> Result<Option<DebtPayment>> {
    let payment = conn
        .query_row(
            &format!("SELECT {PAYMENT_COLS} FROM debt_payments p WHERE p.id = ?1"),
            params![id],
            payment_from_row,
        )
        .optional()?;
    Ok(payment)
}

/// Insert or overwrite the payment keyed by `(debt, period)`.
pub fn upsert_payment(
    conn: &Connection,
    debt_id: i64,
    period: Period,
    amount: Decimal,
    note: Option<&str>,
) -> Result<DebtPayment> {
    conn.execute(
        "INSERT INTO debt_payments(debt_id, amount, month_year, note) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(debt_id, month_year) DO UPDATE SET amount = excluded.amount, note = excluded.note",
        params![debt_id, amount.to_string(), period, note],
    )?;
    find_payment(conn, debt_id, period)?.ok_or_else(|| LedgerError::not_found("Payment", period))
}

pub fn delete_payment(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM debt_payments WHERE id = ?1", params![id])?;
    if n == 0 {
        return Err(LedgerError::payment_not_found(id));
    }
    Ok(())
}

/// Payment history of one debt, newest period first.
pub fn payments_for_debt(conn: &Connection, debt_id: i64) -> Result<Vec<DebtPayment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PAYMENT_COLS} FROM debt_payments p WHERE p.debt_id = ?1 ORDER BY p.month_year DESC"
    ))?;
    let rows = stmt.query_map(params![debt_id], payment_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Payments on in-scope debts whose period is one of `periods`.
pub fn payments_in_periods(
    conn: &Connection,
    scope: Scope,
    periods: &[Period],
) -> Result<Vec<DebtPayment>> {
    if periods.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = (0..periods.len())
        .map(|i| format!("?{}", i + 2))
        .collect::<Vec<_>>()
        .join(",");
    let sql = format!(
        "SELECT {PAYMENT_COLS} FROM debt_payments p JOIN debts d ON p.debt_id = d.id
         WHERE (?1 IS NULL OR d.user_id = ?1) AND p.month_year IN ({placeholders})
         ORDER BY p.month_year, p.id"
    );
    let user_id = scope.user_id();
    let mut values: Vec<&dyn ToSql> = vec![&user_id];
    values.extend(periods.iter().map(|p| p as &dyn ToSql));
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(values.as_slice(), payment_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// `(owner user id, amount)` for every payment in `period` on a real user's debt.
pub fn real_user_payments(conn: &Connection, period: Period) -> Result<Vec<(i64, Decimal)>> {
    let mut stmt = conn.prepare_cached(
        "SELECT d.user_id, p.amount
         FROM debt_payments p
         JOIN debts d ON p.debt_id = d.id
         JOIN users u ON d.user_id = u.id
         WHERE p.month_year = ?1 AND u.is_system_account = 0
         ORDER BY p.id",
    )?;
    let rows = stmt.query_map(params![period], |r| Ok((r.get::<_, i64>(0)?, dec(r, 1)?)))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
