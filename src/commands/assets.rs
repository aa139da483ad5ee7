// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::assets::{self, AssetUpdate};
use crate::models::{Asset, AssetTxKind};
use crate::store::{self, NewAsset};
use crate::utils::{
    decimal_arg, fmt_money, id_arg, id_for_user, maybe_print_json, opt_decimal_arg,
    opt_string_arg, output_flags, parse_date, parse_decimal, pretty_table, scope_arg, string_arg,
};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("rm", sub)) => {
            let id = id_arg(sub, "id")?;
            store::deactivate_asset(conn, id)?;
            println!("Deactivated asset {}", id);
        }
        Some(("tx", sub)) => transaction(conn, sub)?,
        Some(("txs", sub)) => {
            let id = id_arg(sub, "id")?;
            store::get_asset(conn, id)?;
            let data = store::asset_transactions(conn, id)?;
            let (json, jsonl) = output_flags(sub);
            if !maybe_print_json(json, jsonl, &data)? {
                let rows = data
                    .iter()
                    .map(|t| {
                        vec![
                            t.id.to_string(),
                            t.date.to_string(),
                            t.kind.to_string(),
                            t.amount.to_string(),
                            t.units.map(|u| u.to_string()).unwrap_or_default(),
                            t.note.clone().unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Date", "Type", "Amount", "Units", "Note"], rows)
                );
            }
        }
        Some(("history", sub)) => history(conn, sub)?,
        Some(("summary", sub)) => summary(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = string_arg(sub, "user")?;
    let mut new = NewAsset::new(
        id_for_user(conn, &user)?,
        string_arg(sub, "name")?,
        string_arg(sub, "type")?,
    );
    new.current_value = decimal_arg(sub, "value")?;
    new.cost_basis = opt_decimal_arg(sub, "cost")?.unwrap_or(new.current_value);
    new.target_amount = opt_decimal_arg(sub, "target")?;
    new.monthly_contribution = decimal_arg(sub, "contribution")?;
    new.shares = decimal_arg(sub, "shares")?;
    new.total_units = decimal_arg(sub, "total-units")?;
    new.vested_units = decimal_arg(sub, "vested-units")?;
    let asset =
        assets::create_asset(conn, &new).with_context(|| format!("Add asset '{}'", new.name))?;
    println!("Added asset '{}' [{}] (id {})", asset.name, asset.kind, asset.id);
    Ok(())
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Asset>> {
    Ok(store::active_assets(conn, scope_arg(conn, sub)?)?)
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
        .map(|a| {
            vec![
                a.id.to_string(),
                a.name.clone(),
                a.kind.clone(),
                fmt_money(a.current_value, &symbol),
                fmt_money(a.cost_basis, &symbol),
                a.target_amount
                    .map(|t| fmt_money(t, &symbol))
                    .unwrap_or_default(),
                a.shares.to_string(),
                format!("{}/{}", a.vested_units, a.total_units),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Name", "Type", "Value", "Cost", "Target", "Shares", "Vested"],
            rows
        )
    );
    Ok(())
}

fn update(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub, "id")?;
    let target_amount = match opt_string_arg(sub, "target") {
        None => None,
        Some(raw) if raw.eq_ignore_ascii_case("none") => Some(None),
        Some(raw) => Some(Some(parse_decimal(&raw)?)),
    };
    let update = AssetUpdate {
        name: opt_string_arg(sub, "name"),
        kind: opt_string_arg(sub, "type"),
        current_value: opt_decimal_arg(sub, "value")?,
        cost_basis: opt_decimal_arg(sub, "cost")?,
        target_amount,
        monthly_contribution: opt_decimal_arg(sub, "contribution")?,
        shares: opt_decimal_arg(sub, "shares")?,
        total_units: opt_decimal_arg(sub, "total-units")?,
        vested_units: opt_decimal_arg(sub, "vested-units")?,
    };
    let asset = assets::update_asset(conn, id, &update)?;
    println!("Updated asset '{}'", asset.name);
    Ok(())
}

fn transaction(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub, "id")?;
    let kind: AssetTxKind = string_arg(sub, "type")?.parse()?;
    let date = opt_string_arg(sub, "date")
        .map(|s| parse_date(&s))
        .transpose()?;
    let note = opt_string_arg(sub, "note");
    let tx = assets::apply_asset_transaction(
        conn,
        id,
        kind,
        decimal_arg(sub, "amount")?,
        opt_decimal_arg(sub, "units")?,
        date,
        note.as_deref(),
    )
    .with_context(|| format!("Apply {} to asset {}", kind, id))?;
    let asset = store::get_asset(conn, id)?;
    let symbol = store::currency_symbol(conn)?;
    println!(
        "Recorded {} of {} on {}; '{}' is worth {}",
        tx.kind,
        fmt_money(tx.amount, &symbol),
        tx.date,
        asset.name,
        fmt_money(asset.current_value, &symbol)
    );
    Ok(())
}

fn history(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub, "id")?;
    store::get_asset(conn, id)?;
    let data = store::asset_value_history(conn, id)?;
    let (json, jsonl) = output_flags(sub);
    let items: Vec<serde_json::Value> = data
        .iter()
        .map(|(p, v)| serde_json::json!({ "month": p, "value": v }))
        .collect();
    if maybe_print_json(json, jsonl, &items)? {
        return Ok(());
    }
    let symbol = store::currency_symbol(conn)?;
    let rows = data
        .iter()
        .map(|(p, v)| vec![p.display(), fmt_money(*v, &symbol)])
        .collect();
    println!("{}", pretty_table(&["Month", "Value"], rows));
    Ok(())
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let s = assets::get_asset_summary(conn, scope_arg(conn, sub)?)?;
    let (json, jsonl) = output_flags(sub);
    if maybe_print_json(json, jsonl, &s)? {
        return Ok(());
    }
    let symbol = store::currency_symbol(conn)?;
    let mut rows: Vec<Vec<String>> = s
        .by_type
        .iter()
        .map(|(kind, t)| {
            vec![
                kind.clone(),
                t.count.to_string(),
                fmt_money(t.total_value, &symbol),
                fmt_money(t.cost_basis, &symbol),
                fmt_money(t.total_value - t.cost_basis, &symbol),
            ]
        })
        .collect();
    rows.push(vec![
        "Total".into(),
        s.by_type.values().map(|t| t.count).sum::<usize>().to_string(),
        fmt_money(s.total_value, &symbol),
        fmt_money(s.total_cost_basis, &symbol),
        format!(
            "{} ({}%)",
            fmt_money(s.total_gain_loss, &symbol),
            s.gain_loss_percent
        ),
    ]);
    println!(
        "{}",
        pretty_table(&["Type", "Count", "Value", "Cost", "Gain/Loss"], rows)
    );
    if s.by_type.is_empty() {
        println!("No active assets");
    }
    Ok(())
}
