// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Months-to-payoff for a fixed monthly payment against an annual rate.
//!
//! The closed form `n = -ln(1 - r·B/P) / ln(1 + r)` is evaluated in `f64`;
//! the guards that decide which branch applies are evaluated in `Decimal` so
//! "payment exactly equals interest" is detected without float noise.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

use crate::models::Loan;
use crate::period::Period;

/// Result of a payoff projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payoff {
    Months(u32),
    /// The payment never covers the accruing interest (or is zero).
    Never,
}

impl Payoff {
    pub fn months(&self) -> Option<u32> {
        match self {
            Payoff::Months(n) => Some(*n),
            Payoff::Never => None,
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Payoff::Never)
    }
}

impl Ord for Payoff {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Payoff::Months(a), Payoff::Months(b)) => a.cmp(b),
            (Payoff::Months(_), Payoff::Never) => Ordering::Less,
            (Payoff::Never, Payoff::Months(_)) => Ordering::Greater,
            (Payoff::Never, Payoff::Never) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Payoff {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Payoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payoff::Months(n) => write!(f, "{} mo", n),
            Payoff::Never => f.write_str("never"),
        }
    }
}

/// Serialised as the month count, or `null` when it never pays off.
impl Serialize for Payoff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.months().serialize(serializer)
    }
}

/// Annual percentage rate to a monthly fraction.
pub fn monthly_rate(annual_rate_pct: Decimal) -> Decimal {
    annual_rate_pct / Decimal::ONE_HUNDRED / Decimal::from(12)
}

/// `ceil(balance / payment)`; `Never` when the quotient has no month count.
pub fn ceil_months(balance: Decimal, payment: Decimal) -> Payoff {
    balance
        .checked_div(payment)
        .map(|q| q.ceil())
        .and_then(|n| n.to_u32())
        .map_or(Payoff::Never, Payoff::Months)
}

pub fn months_to_payoff(balance: Decimal, payment: Decimal, annual_rate_pct: Decimal) -> Payoff {
    if balance <= Decimal::ZERO {
        return Payoff::Months(0);
    }
    if payment <= Decimal::ZERO {
        return Payoff::Never;
    }
    let r = monthly_rate(annual_rate_pct);
    if r.is_zero() {
        return ceil_months(balance, payment);
    }
    if payment <= balance * r {
        return Payoff::Never;
    }
    let (Some(ratio), Some(rf)) = ((r * balance / payment).to_f64(), r.to_f64()) else {
        return Payoff::Never;
    };
    let n = -(1.0 - ratio).ln() / (1.0 + rf).ln();
    if !n.is_finite() || n < 0.0 || n > f64::from(u32::MAX) {
        return Payoff::Never;
    }
    Payoff::Months(n.ceil() as u32)
}

/// `max(0, payment·months − balance)`, a rough interest cost.
///
/// This is not an amortised interest sum; it is the estimate the payoff
/// suggestion compares between scenarios.
pub fn estimated_interest(balance: Decimal, payment: Decimal, payoff: Payoff) -> Option<Decimal> {
    payoff
        .months()
        .and_then(|n| payment.checked_mul(Decimal::from(n)))
        .map(|paid| (paid - balance).max(Decimal::ZERO))
}

#[derive(Debug, Clone, Serialize)]
pub struct LoanProjection {
    pub loan_id: i64,
    pub name: String,
    pub remaining_balance: Decimal,
    pub monthly_payment: Decimal,
    pub interest_rate: Decimal,
    pub months_remaining: Payoff,
    /// Last period with a payment, counted from the anchor period.
    pub payoff_period: Option<Period>,
    pub estimated_interest: Option<Decimal>,
}

pub fn project_loan(loan: &Loan, from: Period) -> LoanProjection {
    let payoff = months_to_payoff(loan.remaining_balance, loan.monthly_payment, loan.interest_rate);
    let payoff_period = payoff.months().map(|n| from.plus_months(n.saturating_sub(1)));
    LoanProjection {
        loan_id: loan.id,
        name: loan.name.clone(),
        remaining_balance: loan.remaining_balance,
        monthly_payment: loan.monthly_payment,
        interest_rate: loan.interest_rate,
        months_remaining: payoff,
        payoff_period,
        estimated_interest: estimated_interest(loan.remaining_balance, loan.monthly_payment, payoff)
            .map(|d| d.round_dp(2)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn zero_balance_is_already_paid() {
        assert_eq!(months_to_payoff(dec!(0), dec!(0), dec!(0)), Payoff::Months(0));
        assert_eq!(months_to_payoff(dec!(0), dec!(50), dec!(99)), Payoff::Months(0));
        assert_eq!(months_to_payoff(dec!(-5), dec!(50), dec!(10)), Payoff::Months(0));
    }

    #[test]
    fn zero_payment_never_pays_off() {
        assert_eq!(months_to_payoff(dec!(100), dec!(0), dec!(0)), Payoff::Never);
        assert_eq!(months_to_payoff(dec!(100), dec!(0), dec!(12)), Payoff::Never);
    }

    #[test]
    fn zero_rate_is_ceiling_division() {
        assert_eq!(months_to_payoff(dec!(1200), dec!(100), dec!(0)), Payoff::Months(12));
        assert_eq!(months_to_payoff(dec!(1201), dec!(100), dec!(0)), Payoff::Months(13));
        assert_eq!(months_to_payoff(dec!(50), dec!(100), dec!(0)), Payoff::Months(1));
    }

    #[test]
    fn payment_not_covering_interest_never_pays_off() {
        // 24% / 12 = 2% of 1000 = 20 interest per month
        assert_eq!(months_to_payoff(dec!(1000), dec!(10), dec!(24)), Payoff::Never);
        assert_eq!(months_to_payoff(dec!(1000), dec!(20), dec!(24)), Payoff::Never);
    }

    #[test]
    fn closed_form_rounds_up() {
        // -ln(0.9) / ln(1.01) = 10.59
        assert_eq!(months_to_payoff(dec!(1000), dec!(100), dec!(12)), Payoff::Months(11));
        assert_eq!(months_to_payoff(dec!(1000), dec!(21), dec!(24)), Payoff::Months(154));
    }

    #[test]
    fn zero_rate_quotient_beyond_decimal_range_never_pays_off() {
        let balance = dec!(10000000000000000000000);
        assert_eq!(months_to_payoff(balance, dec!(0.0000001), dec!(0)), Payoff::Never);
        assert_eq!(months_to_payoff(balance, dec!(0.0000001), dec!(12)), Payoff::Never);
        assert_eq!(ceil_months(dec!(100), dec!(0)), Payoff::Never);
        // fits a Decimal but not a month count
        assert_eq!(ceil_months(dec!(10000000000), dec!(1)), Payoff::Never);
    }

    #[test]
    fn larger_payment_never_takes_longer() {
        let mut last = Payoff::Never;
        for p in [25, 50, 100, 250, 500, 1000, 6000] {
            let now = months_to_payoff(dec!(5000), Decimal::from(p), dec!(20));
            assert!(now <= last, "{p}: {now} > {last}");
            last = now;
        }
        assert_eq!(last, Payoff::Months(1));
    }

    #[test]
    fn never_sorts_after_any_month_count() {
        assert!(Payoff::Months(u32::MAX) < Payoff::Never);
        assert!(Payoff::Months(3) < Payoff::Months(4));
    }

    #[test]
    fn estimated_interest_is_clamped() {
        assert_eq!(estimated_interest(dec!(1200), dec!(100), Payoff::Months(12)), Some(dec!(0)));
        assert_eq!(estimated_interest(dec!(1000), dec!(100), Payoff::Months(11)), Some(dec!(100)));
        assert_eq!(estimated_interest(dec!(1000), dec!(100), Payoff::Never), None);
    }

    #[test]
    fn loan_projection_counts_from_anchor() {
        let loan = Loan {
            id: 7,
            user_id: 1,
            name: "Car".into(),
            total_principal: dec!(1200),
            remaining_balance: dec!(1200),
            interest_rate: dec!(0),
            monthly_payment: dec!(100),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            target_payoff_date: None,
        };
        let proj = project_loan(&loan, "2025-01".parse().unwrap());
        assert_eq!(proj.months_remaining, Payoff::Months(12));
        assert_eq!(proj.payoff_period, Some("2025-12".parse().unwrap()));
        assert_eq!(proj.estimated_interest, Some(dec!(0)));
    }
}
