// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;

use crate::store::{self, RecordFilter};
use crate::utils::{opt_string_arg, parse_period, string_arg};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("records", sub)) => export_records(conn, sub),
        _ => Ok(()),
    }
}

fn export_records(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = string_arg(sub, "format")?.to_lowercase();
    let out = string_arg(sub, "out")?;
    let period = opt_string_arg(sub, "month")
        .map(|s| parse_period(&s))
        .transpose()?;
    let rows = store::list_records(
        conn,
        &RecordFilter {
            period,
            ..RecordFilter::default()
        },
    )?;

    match fmt.as_str() {
        "csv" => {
            // same columns `record import` reads
            let mut wtr = csv::Writer::from_path(&out)?;
            wtr.write_record(["month", "user", "category", "type", "amount", "note"])?;
            for r in &rows {
                wtr.write_record([
                    r.month_year.to_string(),
                    r.user.clone(),
                    r.category.clone(),
                    r.kind.to_string(),
                    r.amount.to_string(),
                    r.note.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = rows
                .iter()
                .map(|r| {
                    json!({
                        "month": r.month_year,
                        "user": r.user,
                        "category": r.category,
                        "type": r.kind,
                        "amount": r.amount,
                        "note": r.note,
                    })
                })
                .collect();
            std::fs::write(&out, serde_json::to_string_pretty(&items)?)?;
        }
        other => bail!("Unsupported export format '{}' (csv | json)", other),
    }
    tracing::info!(out = %out, count = rows.len(), "records exported");
    println!("Exported {} record(s) to {}", rows.len(), out);
    Ok(())
}
