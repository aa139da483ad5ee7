// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Where this period's surplus should go.
//!
//! A positive surplus is put against the revolving debt with the highest
//! interest rate; with no such debt it is projected as a monthly investment.
//! Loans are left out, their payments are fixed.

use rusqlite::Connection;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};

use crate::amortization::{Payoff, ceil_months, estimated_interest, months_to_payoff};
use crate::error::Result;
use crate::models::{CategorizedRecord, DebtWithPayment, Loan, RevolvingDebt, Scope};
use crate::period::Period;
use crate::store;

pub const INVEST_ANNUAL_RETURN_PCT: u32 = 7;
pub const INVEST_HORIZON_MONTHS: u32 = 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebtTarget {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
    pub user_name: Option<String>,
    pub interest_rate: Decimal,
    pub remaining_balance: Decimal,
    pub minimum_payment: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub extra_payment: Decimal,
    pub new_payment: Decimal,
    pub months_without_extra: Payoff,
    pub months_to_payoff: Payoff,
    /// `None` when the minimum alone never clears the balance.
    pub months_saved: Option<u32>,
    pub interest_saved: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentProjection {
    pub monthly_surplus: Decimal,
    pub projected_in_5_years: Decimal,
    pub total_invested: Decimal,
    pub projected_gain: Decimal,
    pub assumed_return: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestOption {
    pub name: &'static str,
    pub description: &'static str,
    pub priority: u8,
}

pub const INVEST_OPTIONS: [InvestOption; 3] = [
    InvestOption {
        name: "Emergency Fund",
        description: "Build 3-6 months of expenses",
        priority: 1,
    },
    InvestOption {
        name: "Index Funds",
        description: "Low-cost diversified investing",
        priority: 2,
    },
    InvestOption {
        name: "Retirement Savings",
        description: "Tax-advantaged accounts",
        priority: 3,
    },
];

/// Serialized as a flat object carrying `has_suggestion` and a
/// `suggestion_type` tag next to the variant's fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestion {
    None {
        surplus: Decimal,
        message: String,
    },
    Invest {
        surplus: Decimal,
        message: String,
        investment: InvestmentProjection,
        options: Vec<InvestOption>,
    },
    PayDebt {
        surplus: Decimal,
        message: String,
        debt: DebtTarget,
        recommendation: Recommendation,
    },
}

impl Suggestion {
    pub fn has_suggestion(&self) -> bool {
        !matches!(self, Suggestion::None { .. })
    }

    pub fn surplus(&self) -> Decimal {
        match self {
            Suggestion::None { surplus, .. }
            | Suggestion::Invest { surplus, .. }
            | Suggestion::PayDebt { surplus, .. } => *surplus,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Suggestion::None { message, .. }
            | Suggestion::Invest { message, .. }
            | Suggestion::PayDebt { message, .. } => message,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "suggestion_type", rename_all = "snake_case")]
enum TaggedSuggestion<'a> {
    None {
        surplus: &'a Decimal,
        message: &'a str,
    },
    Invest {
        surplus: &'a Decimal,
        message: &'a str,
        investment: &'a InvestmentProjection,
        options: &'a [InvestOption],
    },
    PayDebt {
        surplus: &'a Decimal,
        message: &'a str,
        debt: &'a DebtTarget,
        recommendation: &'a Recommendation,
    },
}

#[derive(Serialize)]
struct SuggestionView<'a> {
    has_suggestion: bool,
    #[serde(flatten)]
    suggestion: TaggedSuggestion<'a>,
}

impl Serialize for Suggestion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let suggestion = match self {
            Suggestion::None { surplus, message } => TaggedSuggestion::None { surplus, message },
            Suggestion::Invest { surplus, message, investment, options } => {
                TaggedSuggestion::Invest { surplus, message, investment, options }
            }
            Suggestion::PayDebt { surplus, message, debt, recommendation } => {
                TaggedSuggestion::PayDebt { surplus, message, debt, recommendation }
            }
        };
        SuggestionView { has_suggestion: self.has_suggestion(), suggestion }.serialize(serializer)
    }
}

fn round2(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn whole(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Income minus every outflow actually incurred this period.
///
/// Debts count with what was paid, not with what was due.
pub fn surplus(records: &[CategorizedRecord], loans: &[Loan], debts: &[DebtWithPayment]) -> Decimal {
    let mut income = Decimal::ZERO;
    let mut expenses = Decimal::ZERO;
    for r in records {
        if r.kind.is_income() {
            income += r.record.amount;
        } else {
            expenses += r.record.amount;
        }
    }
    expenses += loans.iter().map(|l| l.monthly_payment).sum::<Decimal>();
    expenses += debts.iter().map(|d| d.period_payment).sum::<Decimal>();
    income - expenses
}

/// Debts with a balance, highest rate first; equal rates keep input order.
pub fn rank_payable(debts: &[RevolvingDebt]) -> Vec<&RevolvingDebt> {
    let mut payable: Vec<&RevolvingDebt> =
        debts.iter().filter(|d| d.current_balance > Decimal::ZERO).collect();
    payable.sort_by(|a, b| b.interest_rate.cmp(&a.interest_rate));
    payable
}

pub fn project_investment(monthly: Decimal) -> InvestmentProjection {
    let rate = Decimal::from(INVEST_ANNUAL_RETURN_PCT) / Decimal::ONE_HUNDRED / Decimal::from(12);
    let mut growth = Decimal::ONE;
    for _ in 0..INVEST_HORIZON_MONTHS {
        growth *= Decimal::ONE + rate;
    }
    let future_value = monthly * (growth - Decimal::ONE) / rate;
    let invested = monthly * Decimal::from(INVEST_HORIZON_MONTHS);
    InvestmentProjection {
        monthly_surplus: round2(monthly),
        projected_in_5_years: whole(future_value),
        total_invested: whole(invested),
        projected_gain: whole(future_value - invested),
        assumed_return: format!("{}% annually", INVEST_ANNUAL_RETURN_PCT),
    }
}

/// Accelerated payoff of `debt` with `surplus` on top of its minimum.
pub fn recommend(debt: &RevolvingDebt, surplus: Decimal) -> Recommendation {
    let balance = debt.current_balance;
    let minimum = debt.minimum_payment;
    let rate = debt.interest_rate;

    // without a minimum the baseline spreads the balance over the surplus
    let (baseline_payment, without) = if minimum > Decimal::ZERO {
        (minimum, months_to_payoff(balance, minimum, rate))
    } else {
        (surplus, ceil_months(balance, surplus))
    };

    let extra = surplus.min(balance);
    let new_payment = minimum + extra;
    let with = months_to_payoff(balance, new_payment, rate);

    let months_saved = match (without, with) {
        (Payoff::Months(a), Payoff::Months(b)) => Some(a.saturating_sub(b)),
        (Payoff::Months(_), Payoff::Never) | (Payoff::Never, Payoff::Never) => Some(0),
        (Payoff::Never, Payoff::Months(_)) => None,
    };

    let interest_saved = match (
        estimated_interest(balance, baseline_payment, without),
        estimated_interest(balance, new_payment, with),
    ) {
        (Some(a), Some(b)) => Some(round2((a - b).max(Decimal::ZERO))),
        (None, Some(_)) => None,
        (_, None) => Some(Decimal::ZERO),
    };

    Recommendation {
        extra_payment: round2(extra),
        new_payment,
        months_without_extra: without,
        months_to_payoff: with,
        months_saved,
        interest_saved,
    }
}

/// Pure decision over already-fetched data.
pub fn suggest(surplus: Decimal, debts: &[RevolvingDebt], symbol: &str) -> Suggestion {
    if surplus <= Decimal::ZERO {
        return Suggestion::None {
            surplus,
            message: "No surplus available. Focus on reducing expenses or increasing income."
                .to_string(),
        };
    }

    let Some(target) = rank_payable(debts).first().copied() else {
        return Suggestion::Invest {
            surplus: round2(surplus),
            message: format!(
                "Great news! No debts to pay off. Consider investing your {}{} surplus.",
                symbol,
                whole(surplus)
            ),
            investment: project_investment(surplus),
            options: INVEST_OPTIONS.to_vec(),
        };
    };

    let recommendation = recommend(target, surplus);
    let extra = whole(recommendation.extra_payment);
    let message = if target.interest_rate > Decimal::ZERO {
        let rate = target.interest_rate.normalize();
        match recommendation.months_saved {
            Some(n) => format!(
                "Pay extra {symbol}{extra} to \"{}\" ({rate}% APR) to save {n} months!",
                target.name
            ),
            None => format!(
                "Pay extra {symbol}{extra} to \"{}\" ({rate}% APR); the minimum alone never pays it off!",
                target.name
            ),
        }
    } else {
        format!("Pay extra {symbol}{extra} to \"{}\" to pay it off faster!", target.name)
    };

    Suggestion::PayDebt {
        surplus: round2(surplus),
        message,
        debt: DebtTarget {
            id: target.id,
            name: target.name.clone(),
            user_id: target.user_id,
            user_name: None,
            interest_rate: target.interest_rate,
            remaining_balance: target.current_balance,
            minimum_payment: target.minimum_payment,
        },
        recommendation,
    }
}

pub fn get_smart_suggestion(conn: &Connection, scope: Scope, period: Period) -> Result<Suggestion> {
    let records = store::records_for_period(conn, period, scope)?;
    let loans = store::loans_for_scope(conn, scope)?;
    let debts = store::debts_with_payment(conn, scope, period)?;
    let symbol = store::currency_symbol(conn)?;

    let available = surplus(&records, &loans, &debts);
    let plain: Vec<RevolvingDebt> = debts.into_iter().map(|d| d.debt).collect();
    let mut suggestion = suggest(available, &plain, &symbol);

    if let Suggestion::PayDebt { debt, .. } = &mut suggestion {
        debt.user_name = Some(store::get_user(conn, debt.user_id)?.name);
    }
    tracing::debug!(%period, ?scope, surplus = %available, has = suggestion.has_suggestion(), "smart suggestion");
    Ok(suggestion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryType;
    use crate::summary::fixtures::{debt, loan, rec};
    use rust_decimal_macros::dec;

    #[test]
    fn no_surplus_means_no_suggestion() {
        let s = suggest(dec!(0), &[], "$");
        assert!(!s.has_suggestion());
        let s = suggest(dec!(-250), &[debt(1, dec!(100), dec!(10), dec!(5), dec!(0)).debt], "$");
        assert!(matches!(s, Suggestion::None { surplus, .. } if surplus == dec!(-250)));
    }

    #[test]
    fn household_scenario_targets_the_only_debt() {
        let records = vec![
            rec(1, CategoryType::Income, dec!(10000)),
            rec(1, CategoryType::FixedExpense, dec!(3000)),
            rec(1, CategoryType::Utility, dec!(500)),
        ];
        let loans = vec![loan(1, dec!(1500), dec!(60000), dec!(3))];
        let debts = vec![debt(9, dec!(5000), dec!(200), dec!(20), dec!(200))];

        let available = surplus(&records, &loans, &debts);
        assert_eq!(available, dec!(4800));

        let plain: Vec<_> = debts.into_iter().map(|d| d.debt).collect();
        let s = suggest(available, &plain, "₪");
        let Suggestion::PayDebt { debt, recommendation, message, .. } = s else {
            panic!("expected a debt suggestion");
        };
        assert_eq!(debt.id, 9);
        assert_eq!(recommendation.extra_payment, dec!(4800));
        assert_eq!(recommendation.new_payment, dec!(5000));
        assert_eq!(recommendation.months_without_extra, Payoff::Months(33));
        assert_eq!(recommendation.months_to_payoff, Payoff::Months(2));
        assert_eq!(recommendation.months_saved, Some(31));
        // 200*33-5000 = 1600 vs 5000*2-5000 = 5000, clamped
        assert_eq!(recommendation.interest_saved, Some(dec!(0)));
        assert_eq!(message, "Pay extra ₪4800 to \"Card 9\" (20% APR) to save 31 months!");
    }

    #[test]
    fn highest_rate_wins_and_ties_keep_id_order() {
        let debts = vec![
            debt(1, dec!(100), dec!(10), dec!(12), dec!(0)).debt,
            debt(2, dec!(100), dec!(10), dec!(24), dec!(0)).debt,
            debt(3, dec!(100), dec!(10), dec!(24), dec!(0)).debt,
            debt(4, dec!(0), dec!(10), dec!(99), dec!(0)).debt,
        ];
        let ranked: Vec<i64> = rank_payable(&debts).iter().map(|d| d.id).collect();
        assert_eq!(ranked, vec![2, 3, 1]);
    }

    #[test]
    fn extra_payment_is_monotonic_in_surplus() {
        let card = debt(1, dec!(5000), dec!(200), dec!(20), dec!(0)).debt;
        let mut last_extra = Decimal::ZERO;
        let mut last_months = Payoff::Never;
        for s in [100, 500, 1000, 3000, 4800, 5000, 8000] {
            let rec = recommend(&card, Decimal::from(s));
            assert!(rec.extra_payment >= last_extra);
            assert!(rec.extra_payment <= dec!(5000));
            assert!(rec.months_to_payoff <= last_months);
            last_extra = rec.extra_payment;
            last_months = rec.months_to_payoff;
        }
        assert_eq!(last_extra, dec!(5000));
        assert_eq!(last_months, Payoff::Months(1));
    }

    #[test]
    fn zero_minimum_spreads_balance_over_surplus() {
        let card = debt(1, dec!(1000), dec!(0), dec!(0), dec!(0)).debt;
        let rec = recommend(&card, dec!(300));
        assert_eq!(rec.months_without_extra, Payoff::Months(4));
        assert_eq!(rec.months_to_payoff, Payoff::Months(4));
        assert_eq!(rec.months_saved, Some(0));

        let s = suggest(dec!(300), &[card], "$");
        assert_eq!(s.message(), "Pay extra $300 to \"Card 1\" to pay it off faster!");
    }

    #[test]
    fn tiny_surplus_on_huge_interest_free_balance_does_not_panic() {
        let card = debt(1, dec!(10000000000000000000000), dec!(0), dec!(0), dec!(0)).debt;
        let rec = recommend(&card, dec!(0.0000001));
        assert_eq!(rec.months_without_extra, Payoff::Never);
        assert_eq!(rec.months_to_payoff, Payoff::Never);
        assert_eq!(rec.months_saved, Some(0));
    }

    #[test]
    fn minimum_below_interest_has_unbounded_savings() {
        // 24% on 1000 accrues 20 a month
        let card = debt(1, dec!(1000), dec!(10), dec!(24), dec!(0)).debt;
        let rec = recommend(&card, dec!(200));
        assert_eq!(rec.months_without_extra, Payoff::Never);
        assert!(matches!(rec.months_to_payoff, Payoff::Months(_)));
        assert_eq!(rec.months_saved, None);
        assert_eq!(rec.interest_saved, None);
    }

    #[test]
    fn no_debt_projects_investment() {
        let s = suggest(dec!(1000), &[], "$");
        let Suggestion::Invest { investment, options, message, .. } = s else {
            panic!("expected an investment suggestion");
        };
        assert_eq!(investment.total_invested, dec!(60000));
        assert_eq!(investment.projected_in_5_years, dec!(71593));
        assert_eq!(investment.projected_gain, dec!(11593));
        assert_eq!(options.iter().map(|o| o.priority).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(message.contains("$1000"));
    }

    #[test]
    fn json_carries_has_suggestion_next_to_the_tag() {
        let none = serde_json::to_value(suggest(dec!(0), &[], "$")).unwrap();
        assert_eq!(none["has_suggestion"], false);
        assert_eq!(none["suggestion_type"], "none");

        let card = debt(7, dec!(5000), dec!(200), dec!(20), dec!(0)).debt;
        let pay = serde_json::to_value(suggest(dec!(500), &[card], "$")).unwrap();
        assert_eq!(pay["has_suggestion"], true);
        assert_eq!(pay["suggestion_type"], "pay_debt");
        assert_eq!(pay["debt"]["id"], 7);
        assert!(pay["recommendation"].is_object());

        let invest = serde_json::to_value(suggest(dec!(1000), &[], "$")).unwrap();
        assert_eq!(invest["has_suggestion"], true);
        assert_eq!(invest["suggestion_type"], "invest");
        assert_eq!(invest["options"].as_array().map(Vec::len), Some(3));
    }
}
