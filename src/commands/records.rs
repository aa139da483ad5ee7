// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::commands::importer;
use crate::models::{CategoryType, Scope};
use crate::period::Period;
use crate::store::{self, RecordFilter, RecordInput, RecordListing};
use crate::utils::{
    decimal_arg, id_arg, id_for_category, id_for_user, maybe_print_json, opt_string_arg,
    output_flags, parse_period, period_arg, pretty_table, scope_arg, string_arg,
};
use crate::workflow;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let id = id_arg(sub, "id")?;
            store::delete_record(conn, id)?;
            println!("Deleted record {}", id);
        }
        Some(("rm-many", sub)) => {
            let ids: Vec<i64> = sub
                .get_many::<i64>("ids")
                .map(|v| v.copied().collect())
                .unwrap_or_default();
            let n = store::delete_records(conn, &ids)?;
            println!("Deleted {} record(s)", n);
        }
        Some(("clear", sub)) => {
            let period = period_arg(sub)?;
            let scope = scope_arg(conn, sub)?;
            let n = store::delete_period_records(conn, period, scope)?;
            println!("Cleared {} record(s) from {}", n, period.display());
        }
        Some(("months", sub)) => months(conn, sub)?,
        Some(("import", sub)) => {
            let path = string_arg(sub, "path")?;
            let n = importer::import_records(conn, &path)?;
            println!("Imported {} record(s) from {}", n, path);
        }
        _ => {}
    }
    Ok(())
}

fn set(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = string_arg(sub, "user")?;
    let category = string_arg(sub, "category")?;
    let kind = opt_string_arg(sub, "type")
        .map(|s| s.parse::<CategoryType>())
        .transpose()?;
    let input = RecordInput {
        user_id: id_for_user(conn, &user)?,
        category_id: id_for_category(conn, &category, kind)?,
        month_year: period_arg(sub)?,
        amount: decimal_arg(sub, "amount")?,
        note: opt_string_arg(sub, "note"),
    };
    let saved = workflow::save_records(conn, std::slice::from_ref(&input))?;
    if let Some(rec) = saved.first() {
        println!(
            "Saved {} for {} / {} in {} (record {})",
            rec.amount,
            user,
            category,
            rec.month_year.display(),
            rec.id
        );
    }
    Ok(())
}

/// Rows for `record list`, newest period first.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<RecordListing>> {
    let period = opt_string_arg(sub, "month")
        .map(|s| parse_period(&s))
        .transpose()?;
    let user_id = match scope_arg(conn, sub)? {
        Scope::Family => None,
        Scope::User(id) => Some(id),
    };
    let kind = opt_string_arg(sub, "type")
        .map(|s| s.parse::<CategoryType>())
        .transpose()?;
    Ok(store::list_records(
        conn,
        &RecordFilter {
            period,
            user_id,
            kind,
        },
    )?)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    let (json, jsonl) = output_flags(sub);
    if !maybe_print_json(json, jsonl, &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.month_year.to_string(),
                    r.user.clone(),
                    r.category.clone(),
                    r.kind.to_string(),
                    r.amount.to_string(),
                    r.note.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Month", "User", "Category", "Type", "Amount", "Note"],
                rows
            )
        );
    }
    Ok(())
}

fn months(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let periods: Vec<Period> = workflow::available_months(conn)?;
    let (json, jsonl) = output_flags(sub);
    if maybe_print_json(json, jsonl, &periods)? {
        return Ok(());
    }
    if periods.is_empty() {
        println!("No months with records yet");
    }
    for p in periods {
        println!("{}  {}", p, p.display());
    }
    Ok(())
}
