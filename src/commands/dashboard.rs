// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use rusqlite::Connection;

use crate::assets;
use crate::models::Scope;
use crate::overview;
use crate::period::Period;
use crate::store;
use crate::suggestion::{self, Suggestion};
use crate::summary;
use crate::utils::{fmt_money, maybe_print_json, output_flags, period_arg, pretty_table, scope_arg};

/// Every dashboard view takes the same `--user` / `--month` pair.
fn view_args(conn: &Connection, sub: &clap::ArgMatches) -> Result<(Scope, Period)> {
    Ok((scope_arg(conn, sub)?, period_arg(sub)?))
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let Some((name, sub)) = m.subcommand() else {
        return Ok(());
    };
    let (scope, period) = view_args(conn, sub)?;
    let (json, jsonl) = output_flags(sub);
    let symbol = store::currency_symbol(conn)?;
    let money = |d| fmt_money(d, &symbol);

    match name {
        "summary" => {
            let s = summary::get_summary(conn, scope, period)?;
            if maybe_print_json(json, jsonl, &s)? {
                return Ok(());
            }
            let rows = vec![
                vec!["Income".into(), money(s.total_income)],
                vec!["Fixed expenses".into(), money(s.total_fixed_expenses)],
                vec!["Utilities".into(), money(s.total_utilities)],
                vec!["Category debts".into(), money(s.total_category_debts)],
                vec!["Loan payments".into(), money(s.total_loan_payments)],
                vec!["Debt payments".into(), money(s.total_debt_payments)],
                vec!["One-time payments".into(), money(s.total_one_time_payments)],
                vec!["Net cash flow".into(), money(s.net_cash_flow)],
                vec!["Loans remaining".into(), money(s.total_loans_remaining)],
                vec!["Debts remaining".into(), money(s.total_debts_remaining)],
                vec!["Minimums due".into(), money(s.total_minimum_payments_due)],
                vec!["Credit available".into(), money(s.total_credit_available)],
                vec!["Credit utilization".into(), format!("{}%", s.credit_utilization)],
            ];
            println!("{}", period.display());
            println!("{}", pretty_table(&["", "Amount"], rows));
        }
        "overview" => {
            let o = overview::get_debt_overview(conn, scope)?;
            if maybe_print_json(json, jsonl, &o)? {
                return Ok(());
            }
            let rows = o
                .by_type
                .iter()
                .map(|b| vec![b.name.to_string(), b.count.to_string(), money(b.total), b.names.join(", ")])
                .collect();
            println!("{}", pretty_table(&["Kind", "Count", "Total", "Items"], rows));
            println!(
                "Total debt {}, monthly payments {}",
                money(o.total_debt),
                money(o.total_monthly_payments)
            );
            if let Some(item) = &o.highest_interest_item {
                println!(
                    "Highest rate {}% ({}), average {}%",
                    o.highest_interest_rate, item, o.average_interest_rate
                );
            }
        }
        "trends" => {
            let points = overview::get_debt_trends(conn, scope, period)?;
            if maybe_print_json(json, jsonl, &points)? {
                return Ok(());
            }
            let rows = points
                .iter()
                .map(|p| {
                    vec![
                        p.label.clone(),
                        money(p.loan_payments),
                        money(p.debt_payments),
                        money(p.payments),
                    ]
                })
                .collect();
            println!("{}", pretty_table(&["Month", "Loans", "Debts", "Total"], rows));
        }
        "compare" => {
            if !scope.is_family() {
                bail!("User comparison is a family view; drop --user");
            }
            let data = overview::get_user_comparison(conn, period)?;
            if maybe_print_json(json, jsonl, &data)? {
                return Ok(());
            }
            let rows = data
                .iter()
                .map(|c| vec![c.name.clone(), money(c.income), money(c.expenses), money(c.net)])
                .collect();
            println!("{}", pretty_table(&["User", "Income", "Expenses", "Net"], rows));
        }
        "suggest" => {
            let s = suggestion::get_smart_suggestion(conn, scope, period)?;
            if maybe_print_json(json, jsonl, &s)? {
                return Ok(());
            }
            println!("Surplus: {}", money(s.surplus()));
            println!("{}", s.message());
            match &s {
                Suggestion::PayDebt { recommendation: r, .. } => {
                    println!(
                        "New payment {} (extra {}), payoff {} instead of {}",
                        money(r.new_payment),
                        money(r.extra_payment),
                        r.months_to_payoff,
                        r.months_without_extra
                    );
                    if let Some(saved) = r.interest_saved {
                        println!("Estimated interest saved: {}", money(saved));
                    }
                }
                Suggestion::Invest { investment, options, .. } => {
                    println!(
                        "Investing monthly for 5 years at {}: {} ({} gain)",
                        investment.assumed_return,
                        money(investment.projected_in_5_years),
                        money(investment.projected_gain)
                    );
                    for o in options {
                        println!("  {}. {}: {}", o.priority, o.name, o.description);
                    }
                }
                Suggestion::None { .. } => {}
            }
        }
        "breakdown" => {
            let items = overview::get_expense_breakdown(conn, scope, period)?;
            if maybe_print_json(json, jsonl, &items)? {
                return Ok(());
            }
            let rows = items
                .iter()
                .map(|i| vec![i.name.clone(), i.kind.clone(), money(i.value)])
                .collect();
            println!("{}", pretty_table(&["Item", "Kind", "Amount"], rows));
        }
        "net-worth" => {
            let nw = assets::get_net_worth(conn, scope)?;
            if maybe_print_json(json, jsonl, &nw)? {
                return Ok(());
            }
            let rows = vec![
                vec!["Assets".into(), money(nw.assets)],
                vec!["Loans".into(), money(nw.loans)],
                vec!["Debts".into(), money(nw.debts)],
                vec!["Net worth".into(), money(nw.net_worth)],
            ];
            println!("{}", pretty_table(&["", "Amount"], rows));
        }
        _ => {}
    }
    Ok(())
}
