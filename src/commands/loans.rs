// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::Connection;

use crate::amortization::{self, LoanProjection};
use crate::models::Loan;
use crate::store::{self, NewLoan};
use crate::utils::{
    decimal_arg, fmt_money, id_arg, id_for_user, maybe_print_json, opt_decimal_arg,
    opt_string_arg, output_flags, parse_date, period_arg, pretty_table, scope_arg, string_arg,
};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("rm", sub)) => {
            let id = id_arg(sub, "id")?;
            store::remove_loan(conn, id)?;
            println!("Removed loan {}", id);
        }
        Some(("projection", sub)) => projection(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = string_arg(sub, "user")?;
    let new = NewLoan {
        user_id: id_for_user(conn, &user)?,
        name: string_arg(sub, "name")?,
        total_principal: decimal_arg(sub, "principal")?,
        remaining_balance: opt_decimal_arg(sub, "remaining")?,
        interest_rate: decimal_arg(sub, "rate")?,
        monthly_payment: decimal_arg(sub, "payment")?,
        start_date: match opt_string_arg(sub, "start") {
            Some(raw) => parse_date(&raw)?,
            None => Local::now().date_naive(),
        },
        target_payoff_date: opt_string_arg(sub, "target")
            .map(|s| parse_date(&s))
            .transpose()?,
    };
    let loan = store::add_loan(conn, &new).with_context(|| format!("Add loan '{}'", new.name))?;
    println!("Added loan '{}' (id {})", loan.name, loan.id);
    Ok(())
}

/// Loans in scope, largest remaining balance first.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Loan>> {
    let mut loans = store::loans_for_scope(conn, scope_arg(conn, sub)?)?;
    loans.sort_by(|a, b| b.remaining_balance.cmp(&a.remaining_balance));
    Ok(loans)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let loans = query_rows(conn, sub)?;
    let (json, jsonl) = output_flags(sub);
    if maybe_print_json(json, jsonl, &loans)? {
        return Ok(());
    }
    let symbol = store::currency_symbol(conn)?;
    let rows = loans
        .iter()
        .map(|l| {
            vec![
                l.id.to_string(),
                l.name.clone(),
                fmt_money(l.total_principal, &symbol),
                fmt_money(l.remaining_balance, &symbol),
                format!("{}%", l.interest_rate),
                fmt_money(l.monthly_payment, &symbol),
                l.start_date.to_string(),
                l.target_payoff_date.map(|d| d.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Name", "Principal", "Remaining", "Rate", "Payment", "Start", "Target"],
            rows
        )
    );
    Ok(())
}

fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub, "id")?;
    let mut loan = store::get_loan(conn, id)?;
    if let Some(name) = opt_string_arg(sub, "name") {
        loan.name = name;
    }
    if let Some(v) = opt_decimal_arg(sub, "principal")? {
        loan.total_principal = v;
    }
    if let Some(v) = opt_decimal_arg(sub, "remaining")? {
        loan.remaining_balance = v;
    }
    if let Some(v) = opt_decimal_arg(sub, "rate")? {
        loan.interest_rate = v;
    }
    if let Some(v) = opt_decimal_arg(sub, "payment")? {
        loan.monthly_payment = v;
    }
    if let Some(raw) = opt_string_arg(sub, "target") {
        loan.target_payoff_date = Some(parse_date(&raw)?);
    }
    store::save_loan(conn, &loan)?;
    println!("Updated loan '{}'", loan.name);
    Ok(())
}

fn projection(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let from = period_arg(sub)?;
    let loans = store::loans_for_scope(conn, scope_arg(conn, sub)?)?;
    let data: Vec<LoanProjection> = loans
        .iter()
        .map(|l| amortization::project_loan(l, from))
        .collect();
    let (json, jsonl) = output_flags(sub);
    if maybe_print_json(json, jsonl, &data)? {
        return Ok(());
    }
    let symbol = store::currency_symbol(conn)?;
    let rows = data
        .iter()
        .map(|p| {
            vec![
                p.name.clone(),
                fmt_money(p.remaining_balance, &symbol),
                fmt_money(p.monthly_payment, &symbol),
                p.months_remaining.to_string(),
                p.payoff_period.map(|x| x.display()).unwrap_or_else(|| "-".into()),
                p.estimated_interest
                    .map(|i| fmt_money(i, &symbol))
                    .unwrap_or_else(|| "-".into()),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Loan", "Remaining", "Payment", "Months", "Paid off", "Est. interest"],
            rows
        )
    );
    Ok(())
}
