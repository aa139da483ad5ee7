// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Cross-entity debt views: overview, 12-month trend, per-user comparison and
//! the expense breakdown chart.

use rusqlite::Connection;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::Result;
use crate::models::{CategorizedRecord, DebtPayment, DebtWithPayment, Loan, RevolvingDebt, Scope, User};
use crate::period::Period;
use crate::store;

pub const TREND_MONTHS: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebtBucket {
    pub name: &'static str,
    pub count: usize,
    pub total: Decimal,
    pub names: Vec<String>,
}

impl DebtBucket {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            count: 0,
            total: Decimal::ZERO,
            names: Vec::new(),
        }
    }

    fn push(&mut self, name: &str, balance: Decimal) {
        self.count += 1;
        self.total += balance;
        self.names.push(name.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebtOverview {
    pub total_debt: Decimal,
    /// Loan payments plus revolving minimums.
    pub total_monthly_payments: Decimal,
    pub loan_count: usize,
    pub debt_count: usize,
    pub highest_interest_rate: Decimal,
    pub highest_interest_item: Option<String>,
    pub average_interest_rate: Decimal,
    /// Always `[Loans, Variable Debts]`.
    pub by_type: Vec<DebtBucket>,
}

pub fn debt_overview(loans: &[Loan], debts: &[RevolvingDebt]) -> DebtOverview {
    let mut loans_bucket = DebtBucket::new("Loans");
    let mut debts_bucket = DebtBucket::new("Variable Debts");
    let mut total_debt = Decimal::ZERO;
    let mut total_monthly = Decimal::ZERO;
    let mut highest = Decimal::ZERO;
    let mut highest_item: Option<String> = None;
    let mut rate_sum = Decimal::ZERO;
    let mut rated = 0u32;

    let mut consider = |name: &str, rate: Decimal| {
        // strict comparison: the first item seen keeps a tie
        if rate > highest {
            highest = rate;
            highest_item = Some(name.to_string());
        }
        if rate > Decimal::ZERO {
            rate_sum += rate;
            rated += 1;
        }
    };

    for loan in loans {
        total_debt += loan.remaining_balance;
        total_monthly += loan.monthly_payment;
        consider(&loan.name, loan.interest_rate);
        loans_bucket.push(&loan.name, loan.remaining_balance);
    }
    for debt in debts {
        total_debt += debt.current_balance;
        total_monthly += debt.minimum_payment;
        consider(&debt.name, debt.interest_rate);
        debts_bucket.push(&debt.name, debt.current_balance);
    }

    let average = if rated > 0 {
        (rate_sum / Decimal::from(rated)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    } else {
        Decimal::ZERO
    };

    DebtOverview {
        total_debt,
        total_monthly_payments: total_monthly,
        loan_count: loans.len(),
        debt_count: debts.len(),
        highest_interest_rate: highest,
        highest_interest_item: highest_item,
        average_interest_rate: average,
        by_type: vec![loans_bucket, debts_bucket],
    }
}

pub fn get_debt_overview(conn: &Connection, scope: Scope) -> Result<DebtOverview> {
    let loans = store::loans_for_scope(conn, scope)?;
    let debts = store::debts_for_scope(conn, scope)?;
    Ok(debt_overview(&loans, &debts))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub month_year: Period,
    pub label: String,
    pub loan_payments: Decimal,
    pub debt_payments: Decimal,
    pub payments: Decimal,
}

/// One point per period, in the order given.
pub fn debt_trends(periods: &[Period], loans: &[Loan], payments: &[DebtPayment]) -> Vec<TrendPoint> {
    let loan_total: Decimal = loans.iter().map(|l| l.monthly_payment).sum();
    let mut by_period: HashMap<Period, Decimal> = HashMap::new();
    for p in payments {
        *by_period.entry(p.month_year).or_default() += p.amount;
    }
    periods
        .iter()
        .map(|&period| {
            let debt_total = by_period.get(&period).copied().unwrap_or_default();
            TrendPoint {
                month_year: period,
                label: period.short_label(),
                loan_payments: loan_total,
                debt_payments: debt_total,
                payments: loan_total + debt_total,
            }
        })
        .collect()
}

/// The twelve periods ending at `anchor`, oldest first.
pub fn get_debt_trends(conn: &Connection, scope: Scope, anchor: Period) -> Result<Vec<TrendPoint>> {
    let periods = anchor.window(TREND_MONTHS);
    let loans = store::loans_for_scope(conn, scope)?;
    let payments = store::payments_in_periods(conn, scope, &periods)?;
    Ok(debt_trends(&periods, &loans, &payments))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserComparison {
    pub user_id: i64,
    pub name: String,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

/// `debt_payments` pairs each payment amount with the debt owner's id.
pub fn compare_users(
    users: &[User],
    records: &[CategorizedRecord],
    loans: &[Loan],
    debt_payments: &[(i64, Decimal)],
) -> Vec<UserComparison> {
    users
        .iter()
        .filter(|u| !u.is_system_account)
        .map(|u| {
            let mut income = Decimal::ZERO;
            let mut expenses = Decimal::ZERO;
            for r in records.iter().filter(|r| r.record.user_id == u.id) {
                if r.kind.is_income() {
                    income += r.record.amount;
                } else {
                    expenses += r.record.amount;
                }
            }
            expenses += loans
                .iter()
                .filter(|l| l.user_id == u.id)
                .map(|l| l.monthly_payment)
                .sum::<Decimal>();
            expenses += debt_payments
                .iter()
                .filter(|(owner, _)| *owner == u.id)
                .map(|(_, amount)| *amount)
                .sum::<Decimal>();
            UserComparison {
                user_id: u.id,
                name: u.name.clone(),
                income,
                expenses,
                net: income - expenses,
            }
        })
        .collect()
}

pub fn get_user_comparison(conn: &Connection, period: Period) -> Result<Vec<UserComparison>> {
    let users = store::list_real_users(conn)?;
    let records = store::real_user_records_for_period(conn, period)?;
    let loans = store::real_user_loans(conn)?;
    let payments = store::real_user_payments(conn, period)?;
    Ok(compare_users(&users, &records, &loans, &payments))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownItem {
    pub name: String,
    pub value: Decimal,
    /// Category type, or `Loan` / `Debt`.
    pub kind: String,
}

/// Expense totals keyed by name, largest first; zero entries are dropped.
pub fn expense_breakdown(
    records: &[CategorizedRecord],
    loans: &[Loan],
    debts: &[DebtWithPayment],
) -> Vec<BreakdownItem> {
    let mut items: Vec<BreakdownItem> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut add = |name: &str, kind: &str, value: Decimal| {
        let i = *index.entry(name.to_string()).or_insert_with(|| {
            items.push(BreakdownItem {
                name: name.to_string(),
                value: Decimal::ZERO,
                kind: kind.to_string(),
            });
            items.len() - 1
        });
        items[i].value += value;
    };

    for r in records.iter().filter(|r| !r.kind.is_income()) {
        add(&r.category_name, r.kind.as_str(), r.record.amount);
    }
    for loan in loans {
        add(&loan.name, "Loan", loan.monthly_payment);
    }
    for d in debts.iter().filter(|d| d.period_payment > Decimal::ZERO) {
        add(&d.debt.name, "Debt", d.period_payment);
    }

    items.retain(|i| i.value > Decimal::ZERO);
    items.sort_by(|a, b| b.value.cmp(&a.value));
    items
}

pub fn get_expense_breakdown(
    conn: &Connection,
    scope: Scope,
    period: Period,
) -> Result<Vec<BreakdownItem>> {
    let records = store::records_for_period(conn, period, scope)?;
    let loans = store::loans_for_scope(conn, scope)?;
    let debts = store::debts_with_payment(conn, scope, period)?;
    Ok(expense_breakdown(&records, &loans, &debts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryType;
    use crate::summary::fixtures::{debt, loan, rec};
    use rust_decimal_macros::dec;

    fn p(s: &str) -> Period {
        s.parse().unwrap()
    }

    #[test]
    fn overview_tracks_highest_rate_and_average() {
        let loans = vec![
            loan(1, dec!(1500), dec!(90000), dec!(4)),
            loan(2, dec!(200), dec!(1000), dec!(0)),
        ];
        let debts = vec![
            debt(1, dec!(5000), dec!(200), dec!(20), dec!(0)).debt,
            debt(2, dec!(800), dec!(50), dec!(20), dec!(0)).debt,
            debt(3, dec!(100), dec!(25), dec!(7.33), dec!(0)).debt,
        ];
        let o = debt_overview(&loans, &debts);
        assert_eq!(o.total_debt, dec!(96900));
        assert_eq!(o.total_monthly_payments, dec!(1975));
        assert_eq!(o.highest_interest_rate, dec!(20));
        assert_eq!(o.highest_interest_item.as_deref(), Some("Card 1"));
        // (4 + 20 + 20 + 7.33) / 4
        assert_eq!(o.average_interest_rate, dec!(12.83));
        assert_eq!(o.by_type[0].name, "Loans");
        assert_eq!(o.by_type[0].count, 2);
        assert_eq!(o.by_type[1].names, vec!["Card 1", "Card 2", "Card 3"]);
        assert_eq!(o.by_type[1].total, dec!(5900));
    }

    #[test]
    fn overview_of_nothing_is_zero() {
        let o = debt_overview(&[], &[]);
        assert_eq!(o.total_debt, Decimal::ZERO);
        assert_eq!(o.highest_interest_item, None);
        assert_eq!(o.average_interest_rate, Decimal::ZERO);
        assert_eq!(o.by_type.len(), 2);
    }

    #[test]
    fn trends_keep_loans_constant_and_group_payments() {
        let periods = p("2025-03").window(3);
        let loans = vec![loan(1, dec!(100), dec!(1000), dec!(0))];
        let pay = |period: &str, amount| DebtPayment {
            id: 0,
            debt_id: 1,
            amount,
            month_year: p(period),
            note: None,
        };
        let payments = vec![pay("2025-02", dec!(40)), pay("2025-02", dec!(10)), pay("2025-03", dec!(5))];
        let t = debt_trends(&periods, &loans, &payments);
        assert_eq!(t.len(), 3);
        assert_eq!(t[0].month_year, p("2025-01"));
        assert_eq!(t[0].label, "Jan 25");
        assert_eq!(t[0].payments, dec!(100));
        assert_eq!(t[1].debt_payments, dec!(50));
        assert_eq!(t[1].payments, dec!(150));
        assert_eq!(t[2].payments, dec!(105));
        assert!(t.iter().all(|pt| pt.loan_payments == dec!(100)));
    }

    #[test]
    fn comparison_skips_household_and_nets_per_user() {
        let users = vec![
            User { id: 1, name: "Household".into(), is_system_account: true },
            User { id: 2, name: "Alex".into(), is_system_account: false },
            User { id: 3, name: "Sam".into(), is_system_account: false },
        ];
        let records = vec![
            rec(2, CategoryType::Income, dec!(5000)),
            rec(2, CategoryType::Utility, dec!(300)),
            rec(3, CategoryType::Income, dec!(4000)),
        ];
        let mut l = loan(1, dec!(700), dec!(9000), dec!(3));
        l.user_id = 3;
        let cmp = compare_users(&users, &records, &[l], &[(2, dec!(150))]);
        assert_eq!(cmp.len(), 2);
        assert_eq!(cmp[0].name, "Alex");
        assert_eq!(cmp[0].expenses, dec!(450));
        assert_eq!(cmp[0].net, dec!(4550));
        assert_eq!(cmp[1].expenses, dec!(700));
        assert_eq!(cmp[1].net, dec!(3300));
    }

    #[test]
    fn breakdown_merges_by_name_and_sorts_descending() {
        let mut rent = rec(1, CategoryType::FixedExpense, dec!(3000));
        rent.category_name = "Rent".into();
        let mut rent2 = rec(2, CategoryType::FixedExpense, dec!(500));
        rent2.category_name = "Rent".into();
        let mut water = rec(1, CategoryType::Utility, dec!(0));
        water.category_name = "Water".into();
        let salary = rec(1, CategoryType::Income, dec!(9000));
        let loans = vec![loan(1, dec!(1500), dec!(10000), dec!(0))];
        let debts = vec![
            debt(1, dec!(900), dec!(100), dec!(0), dec!(200)),
            debt(2, dec!(900), dec!(100), dec!(0), dec!(0)),
        ];
        let items = expense_breakdown(&[rent, salary, water, rent2], &loans, &debts);
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Loan 1", "Card 1"]);
        assert_eq!(items[0].value, dec!(3500));
        assert_eq!(items[0].kind, "Fixed Expense");
        assert_eq!(items[2].kind, "Debt");
    }
}
