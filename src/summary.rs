// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Period totals for the dashboard.

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::Result;
use crate::models::{CategorizedRecord, CategoryType, DebtWithPayment, Loan, Scope};
use crate::period::Period;
use crate::store;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_fixed_expenses: Decimal,
    pub total_utilities: Decimal,
    /// Records filed under `Dynamic Debt` / `Static Loan` categories.
    pub total_category_debts: Decimal,
    pub total_loan_payments: Decimal,
    pub total_loans_remaining: Decimal,
    pub total_debt_payments: Decimal,
    pub total_one_time_payments: Decimal,
    pub total_minimum_payments_due: Decimal,
    pub total_debts_remaining: Decimal,
    pub total_credit_limit: Decimal,
    pub total_credit_available: Decimal,
    /// Debt balance as a percentage of credit limit, 2dp; zero with no limit.
    pub credit_utilization: Decimal,
    pub net_cash_flow: Decimal,
}

impl Summary {
    pub fn total_expenses(&self) -> Decimal {
        self.total_fixed_expenses
            + self.total_utilities
            + self.total_category_debts
            + self.total_loan_payments
            + self.total_debt_payments
    }
}

/// What a revolving debt contributes to the period's obligations.
///
/// Never less than what is due, never less than what was actually paid.
pub fn effective_payment(d: &DebtWithPayment) -> Decimal {
    let required = if d.debt.is_temporary {
        d.debt.current_balance
    } else {
        d.debt.minimum_payment
    };
    d.period_payment.max(required)
}

pub fn summarize(
    records: &[CategorizedRecord],
    loans: &[Loan],
    debts: &[DebtWithPayment],
) -> Summary {
    let mut s = Summary::default();

    for r in records {
        let amount = r.record.amount;
        match r.kind {
            CategoryType::Income => s.total_income += amount,
            CategoryType::FixedExpense => s.total_fixed_expenses += amount,
            CategoryType::Utility => s.total_utilities += amount,
            CategoryType::DynamicDebt | CategoryType::StaticLoan => {
                s.total_category_debts += amount
            }
        }
    }

    for loan in loans {
        s.total_loan_payments += loan.monthly_payment;
        s.total_loans_remaining += loan.remaining_balance;
    }

    for d in debts {
        s.total_debt_payments += effective_payment(d);
        if d.debt.is_temporary {
            s.total_one_time_payments += d.debt.current_balance;
        } else {
            s.total_minimum_payments_due += d.debt.minimum_payment;
        }
        s.total_debts_remaining += d.debt.current_balance;
        s.total_credit_limit += d.debt.credit_limit;
    }

    s.total_credit_available = s.total_credit_limit - s.total_debts_remaining;
    if s.total_credit_limit > Decimal::ZERO {
        s.credit_utilization =
            (s.total_debts_remaining / s.total_credit_limit * Decimal::ONE_HUNDRED).round_dp(2);
    }
    s.net_cash_flow = s.total_income - s.total_expenses();
    s
}

/// Fetch the period's rows for `scope` and aggregate them.
pub fn get_summary(conn: &Connection, scope: Scope, period: Period) -> Result<Summary> {
    let records = store::records_for_period(conn, period, scope)?;
    let loans = store::loans_for_scope(conn, scope)?;
    let debts = store::debts_with_payment(conn, scope, period)?;
    let summary = summarize(&records, &loans, &debts);
    tracing::debug!(
        %period,
        ?scope,
        records = records.len(),
        net = %summary.net_cash_flow,
        "computed summary"
    );
    Ok(summary)
}
