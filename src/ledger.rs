// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Revolving-debt payments, one per debt and period.
//!
//! Re-saving a period's payment moves the balance by the difference from
//! the previous amount only. Each operation runs in its own transaction.

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{LedgerError, Result};
use crate::models::{DebtPayment, RevolvingDebt};
use crate::period::Period;
use crate::store;

pub const PAID_IN_FULL_NOTE: &str = "Paid in full";

/// Balance after replacing a `previous` payment with `new`, clamped at zero.
pub fn apply_payment_delta(balance: Decimal, previous: Decimal, new: Decimal) -> Decimal {
    (balance - (new - previous)).max(Decimal::ZERO)
}

pub fn record_payment(
    conn: &mut Connection,
    debt_id: i64,
    period: Period,
    amount: Decimal,
    note: Option<&str>,
    update_balance: bool,
) -> Result<DebtPayment> {
    if amount < Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!("payment {} is negative", amount)));
    }
    let tx = conn.transaction()?;
    let debt = store::get_debt(&tx, debt_id)?;
    let previous = store::find_payment(&tx, debt_id, period)?
        .map(|p| p.amount)
        .unwrap_or_default();
    let payment = store::upsert_payment(&tx, debt_id, period, amount, note)?;
    if update_balance && amount != previous {
        let balance = apply_payment_delta(debt.current_balance, previous, amount);
        store::set_debt_balance(&tx, debt_id, balance)?;
        tracing::info!(debt_id, %period, %previous, %amount, %balance, "payment recorded");
    } else {
        tracing::info!(debt_id, %period, %amount, "payment recorded without balance change");
    }
    tx.commit()?;
    Ok(payment)
}

#[derive(Debug, Clone, Serialize)]
pub struct FullPayment {
    pub payment: DebtPayment,
    pub amount_paid: Decimal,
}

/// Pay the whole current balance for `period` and zero the debt.
pub fn pay_in_full(conn: &mut Connection, debt_id: i64, period: Period) -> Result<FullPayment> {
    let tx = conn.transaction()?;
    let debt = store::get_debt(&tx, debt_id)?;
    let full = debt.current_balance;
    let payment = store::upsert_payment(&tx, debt_id, period, full, Some(PAID_IN_FULL_NOTE))?;
    store::set_debt_balance(&tx, debt_id, Decimal::ZERO)?;
    tx.commit()?;
    tracing::info!(debt_id, %period, amount = %full, "debt paid in full");
    Ok(FullPayment {
        payment,
        amount_paid: full,
    })
}

/// Overwrite the balance, e.g. from a new statement. Payments are untouched.
pub fn set_balance(conn: &Connection, debt_id: i64, balance: Decimal) -> Result<RevolvingDebt> {
    if balance < Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!("balance {} is negative", balance)));
    }
    store::set_debt_balance(conn, debt_id, balance)?;
    store::get_debt(conn, debt_id)
}

/// Remove a payment, optionally adding its full amount back to the balance.
pub fn delete_payment(
    conn: &mut Connection,
    debt_id: i64,
    payment_id: i64,
    revert_balance: bool,
) -> Result<RevolvingDebt> {
    let tx = conn.transaction()?;
    let debt = store::get_debt(&tx, debt_id)?;
    let payment = store::get_payment(&tx, payment_id)?
        .filter(|p| p.debt_id == debt_id)
        .ok_or_else(|| LedgerError::payment_not_found(payment_id))?;
    if revert_balance {
        store::set_debt_balance(&tx, debt_id, debt.current_balance + payment.amount)?;
    }
    store::delete_payment(&tx, payment_id)?;
    let debt = store::get_debt(&tx, debt_id)?;
    tx.commit()?;
    tracing::info!(debt_id, payment_id, revert_balance, "payment deleted");
    Ok(debt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn delta_only_moves_by_the_difference() {
        assert_eq!(apply_payment_delta(dec!(1000), dec!(0), dec!(100)), dec!(900));
        assert_eq!(apply_payment_delta(dec!(900), dec!(100), dec!(150)), dec!(850));
        assert_eq!(apply_payment_delta(dec!(850), dec!(150), dec!(50)), dec!(950));
    }

    #[test]
    fn delta_is_clamped_at_zero() {
        assert_eq!(apply_payment_delta(dec!(40), dec!(0), dec!(100)), dec!(0));
    }
}
