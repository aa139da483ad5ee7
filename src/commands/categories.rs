// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::models::{Category, CategoryType};
use crate::store::{self, CategoryUpdate, NewCategory};
use crate::utils::{
    decimal_arg, id_arg, maybe_print_json, opt_bool_arg, opt_decimal_arg, opt_string_arg,
    output_flags, pretty_table, string_arg,
};
use crate::workflow;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("set-default", sub)) => {
            let id = id_arg(sub, "id")?;
            let cat = workflow::apply_static_default(conn, id, decimal_arg(sub, "amount")?)?;
            println!("'{}' is static with default {}", cat.name, cat.default_amount);
        }
        Some(("rm", sub)) => {
            let id = id_arg(sub, "id")?;
            store::remove_category(conn, id)?;
            println!("Removed category {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn parse_kind(raw: &str) -> Result<CategoryType> {
    Ok(raw.parse::<CategoryType>()?)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = string_arg(sub, "name")?;
    let mut new = NewCategory::new(&name, parse_kind(&string_arg(sub, "type")?)?);
    new.is_static = sub.get_flag("static");
    new.is_household = !sub.get_flag("individual");
    new.is_recurring = !sub.get_flag("once");
    if let Some(amount) = opt_decimal_arg(sub, "default")? {
        new.default_amount = amount;
    }
    let cat = store::add_category(conn, &new).with_context(|| format!("Add category '{}'", name))?;
    println!("Added category '{}' [{}] (id {})", cat.name, cat.kind, cat.id);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let cats = store::list_categories(conn)?;
    let (json, jsonl) = output_flags(sub);
    if maybe_print_json(json, jsonl, &cats)? {
        return Ok(());
    }
    let flag = |b: bool| if b { "yes" } else { "" }.to_string();
    let rows = cats
        .iter()
        .map(|c: &Category| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                c.kind.to_string(),
                flag(c.is_recurring),
                flag(c.is_static),
                if c.is_household { "household" } else { "per user" }.to_string(),
                c.default_amount.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Name", "Type", "Recurring", "Static", "Owner", "Default"],
            rows
        )
    );
    Ok(())
}

fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub, "id")?;
    let update = CategoryUpdate {
        name: opt_string_arg(sub, "name"),
        kind: opt_string_arg(sub, "type").map(|s| parse_kind(&s)).transpose()?,
        is_recurring: opt_bool_arg(sub, "recurring"),
        is_static: opt_bool_arg(sub, "static"),
        is_household: opt_bool_arg(sub, "household"),
        default_amount: opt_decimal_arg(sub, "default")?,
    };
    let cat = store::update_category(conn, id, &update)?;
    println!("Updated category '{}' [{}]", cat.name, cat.kind);
    Ok(())
}
