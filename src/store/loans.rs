// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use super::{dec, validate_non_negative, validate_rate};
use crate::error::{LedgerError, Result};
use crate::models::{Loan, Scope};

const LOAN_COLS: &str = "id, user_id, name, total_principal, remaining_balance, interest_rate, \
                         monthly_payment, start_date, target_payoff_date";

fn loan_from_row(r: &Row<'_>) -> rusqlite::Result<Loan> {
    Ok(Loan {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        total_principal: dec(r, 3)?,
        remaining_balance: dec(r, 4)?,
        interest_rate: dec(r, 5)?,
        monthly_payment: dec(r, 6)?,
        start_date: r.get(7)?,
        target_payoff_date: r.get(8)?,
    })
}

#[derive(Debug, Clone)]
pub struct NewLoan {
    pub user_id: i64,
    pub name: String,
    pub total_principal: Decimal,
    /// Defaults to the total principal.
    pub remaining_balance: Option<Decimal>,
    pub interest_rate: Decimal,
    pub monthly_payment: Decimal,
    pub start_date: NaiveDate,
    pub target_payoff_date: Option<NaiveDate>,
}

pub fn add_loan(conn: &Connection, new: &NewLoan) -> Result<Loan> {
    let remaining = new.remaining_balance.unwrap_or(new.total_principal);
    validate_non_negative("principal", new.total_principal)?;
    validate_non_negative("remaining balance", remaining)?;
    validate_non_negative("monthly payment", new.monthly_payment)?;
    validate_rate(new.interest_rate)?;
    conn.execute(
        "INSERT INTO loans(user_id, name, total_principal, remaining_balance, interest_rate,
                           monthly_payment, start_date, target_payoff_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            new.user_id,
            new.name.trim(),
            new.total_principal.to_string(),
            remaining.to_string(),
            new.interest_rate.to_string(),
            new.monthly_payment.to_string(),
            new.start_date,
            new.target_payoff_date
        ],
    )?;
    get_loan(conn, conn.last_insert_rowid())
}

pub fn get_loan(conn: &Connection, id: i64) -> Result<Loan> {
    conn.query_row(
        &format!("SELECT {LOAN_COLS} FROM loans WHERE id = ?1"),
        params![id],
        loan_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("Loan", id))
}

/// Loans in scope, in id order.
pub fn loans_for_scope(conn: &Connection, scope: Scope) -> Result<Vec<Loan>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {LOAN_COLS} FROM loans WHERE (?1 IS NULL OR user_id = ?1) ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![scope.user_id()], loan_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Loans owned by real users, in id order.
pub fn real_user_loans(conn: &Connection) -> Result<Vec<Loan>> {
    let mut stmt = conn.prepare_cached(
        "SELECT l.id, l.user_id, l.name, l.total_principal, l.remaining_balance, l.interest_rate,
                l.monthly_payment, l.start_date, l.target_payoff_date
         FROM loans l JOIN users u ON l.user_id = u.id
         WHERE u.is_system_account = 0 ORDER BY l.id",
    )?;
    let rows = stmt.query_map([], loan_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn save_loan(conn: &Connection, loan: &Loan) -> Result<()> {
    validate_non_negative("principal", loan.total_principal)?;
    validate_non_negative("remaining balance", loan.remaining_balance)?;
    validate_non_negative("monthly payment", loan.monthly_payment)?;
    validate_rate(loan.interest_rate)?;
    let n = conn.execute(
        "UPDATE loans SET user_id=?1, name=?2, total_principal=?3, remaining_balance=?4,
                interest_rate=?5, monthly_payment=?6, start_date=?7, target_payoff_date=?8
         WHERE id=?9",
        params![
            loan.user_id,
            loan.name,
            loan.total_principal.to_string(),
            loan.remaining_balance.to_string(),
            loan.interest_rate.to_string(),
            loan.monthly_payment.to_string(),
            loan.start_date,
            loan.target_payoff_date,
            loan.id
        ],
    )?;
    if n == 0 {
        return Err(LedgerError::not_found("Loan", loan.id));
    }
    Ok(())
}

pub fn remove_loan(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM loans WHERE id = ?1", params![id])?;
    if n == 0 {
        return Err(LedgerError::not_found("Loan", id));
    }
    Ok(())
}
