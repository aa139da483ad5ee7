// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::ledger;
use crate::models::DebtWithPayment;
use crate::store::{self, DebtUpdate, NewDebt};
use crate::summary::effective_payment;
use crate::utils::{
    decimal_arg, fmt_money, id_arg, id_for_user, maybe_print_json, opt_bool_arg,
    opt_decimal_arg, opt_string_arg, output_flags, period_arg, pretty_table, scope_arg,
    string_arg,
};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("rm", sub)) => {
            let id = id_arg(sub, "id")?;
            store::remove_debt(conn, id)?;
            println!("Removed debt {}", id);
        }
        Some(("pay", sub)) => pay(conn, sub)?,
        Some(("pay-full", sub)) => {
            let id = id_arg(sub, "id")?;
            let period = period_arg(sub)?;
            let full = ledger::pay_in_full(conn, id, period)
                .with_context(|| format!("Pay debt {} in full", id))?;
            let symbol = store::currency_symbol(conn)?;
            println!(
                "Paid {} in full for {}; balance cleared",
                fmt_money(full.amount_paid, &symbol),
                period.display()
            );
        }
        Some(("set-balance", sub)) => {
            let id = id_arg(sub, "id")?;
            let debt = ledger::set_balance(conn, id, decimal_arg(sub, "amount")?)?;
            let symbol = store::currency_symbol(conn)?;
            println!(
                "'{}' balance set to {}",
                debt.name,
                fmt_money(debt.current_balance, &symbol)
            );
        }
        Some(("payments", sub)) => payments(conn, sub)?,
        Some(("rm-payment", sub)) => {
            let id = id_arg(sub, "id")?;
            let payment_id = id_arg(sub, "payment")?;
            let debt = ledger::delete_payment(conn, id, payment_id, sub.get_flag("revert"))?;
            let symbol = store::currency_symbol(conn)?;
            println!(
                "Deleted payment {}; '{}' balance is {}",
                payment_id,
                debt.name,
                fmt_money(debt.current_balance, &symbol)
            );
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = string_arg(sub, "user")?;
    let new = NewDebt {
        user_id: id_for_user(conn, &user)?,
        name: string_arg(sub, "name")?,
        current_balance: decimal_arg(sub, "balance")?,
        credit_limit: decimal_arg(sub, "limit")?,
        minimum_payment: decimal_arg(sub, "minimum")?,
        interest_rate: decimal_arg(sub, "rate")?,
        is_temporary: sub.get_flag("temporary"),
    };
    let debt = store::add_debt(conn, &new).with_context(|| format!("Add debt '{}'", new.name))?;
    println!("Added debt '{}' (id {})", debt.name, debt.id);
    Ok(())
}

/// Debts in scope with the selected period's payment attached.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<DebtWithPayment>> {
    let scope = scope_arg(conn, sub)?;
    Ok(store::debts_with_payment(conn, scope, period_arg(sub)?)?)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    let (json, jsonl) = output_flags(sub);
    if maybe_print_json(json, jsonl, &data)? {
        return Ok(());
    }
    let symbol = store::currency_symbol(conn)?;
    let rows = data
        .iter()
        .map(|d| {
            vec![
                d.debt.id.to_string(),
                d.debt.name.clone(),
                fmt_money(d.debt.current_balance, &symbol),
                fmt_money(d.debt.credit_limit, &symbol),
                fmt_money(d.debt.minimum_payment, &symbol),
                format!("{}%", d.debt.interest_rate),
                if d.debt.is_temporary { "yes" } else { "" }.to_string(),
                fmt_money(d.period_payment, &symbol),
                fmt_money(effective_payment(d), &symbol),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Name", "Balance", "Limit", "Minimum", "Rate", "Temp", "Paid", "Counted"],
            rows
        )
    );
    Ok(())
}

fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub, "id")?;
    let update = DebtUpdate {
        name: opt_string_arg(sub, "name"),
        current_balance: opt_decimal_arg(sub, "balance")?,
        credit_limit: opt_decimal_arg(sub, "limit")?,
        minimum_payment: opt_decimal_arg(sub, "minimum")?,
        interest_rate: opt_decimal_arg(sub, "rate")?,
        is_temporary: opt_bool_arg(sub, "temporary"),
    };
    let debt = store::update_debt(conn, id, &update)?;
    println!("Updated debt '{}'", debt.name);
    Ok(())
}

fn pay(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub, "id")?;
    let period = period_arg(sub)?;
    let amount = decimal_arg(sub, "amount")?;
    let note = opt_string_arg(sub, "note");
    let payment = ledger::record_payment(
        conn,
        id,
        period,
        amount,
        note.as_deref(),
        sub.get_flag("update-balance"),
    )
    .with_context(|| format!("Record payment on debt {}", id))?;
    let debt = store::get_debt(conn, id)?;
    let symbol = store::currency_symbol(conn)?;
    println!(
        "Payment {} of {} for {}; '{}' balance is {}",
        payment.id,
        fmt_money(payment.amount, &symbol),
        period.display(),
        debt.name,
        fmt_money(debt.current_balance, &symbol)
    );
    Ok(())
}

fn payments(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub, "id")?;
    store::get_debt(conn, id)?;
    let data = store::payments_for_debt(conn, id)?;
    let (json, jsonl) = output_flags(sub);
    if maybe_print_json(json, jsonl, &data)? {
        return Ok(());
    }
    let symbol = store::currency_symbol(conn)?;
    let rows = data
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.month_year.to_string(),
                fmt_money(p.amount, &symbol),
                p.note.clone().unwrap_or_default(),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["ID", "Month", "Amount", "Note"], rows));
    Ok(())
}
