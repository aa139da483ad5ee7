// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::utils::{maybe_print_json, output_flags, period_arg, pretty_table, scope_arg};
use crate::workflow::{self, SetupCategory};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("status", sub)) => {
            let status =
                workflow::get_month_status(conn, scope_arg(conn, sub)?, period_arg(sub)?)?;
            let (json, jsonl) = output_flags(sub);
            if !maybe_print_json(json, jsonl, &status)? {
                println!(
                    "{}: {} ({} records)",
                    status.month_year.display(),
                    if status.is_setup { "set up" } else { "not started" },
                    status.record_count
                );
                let rows = vec![
                    vec![
                        "Dynamic".to_string(),
                        format!("{}/{}", status.dynamic_set_count, status.dynamic_total_count),
                        format!("{}%", status.dynamic_progress),
                    ],
                    vec![
                        "Static".to_string(),
                        format!("{}/{}", status.static_set_count, status.static_total_count),
                        format!("{}%", status.static_progress),
                    ],
                    vec![
                        "Overall".to_string(),
                        String::new(),
                        format!("{}%", status.overall_progress),
                    ],
                ];
                println!("{}", pretty_table(&["", "Filled", "Progress"], rows));
            }
        }
        Some(("setup", sub)) => {
            let setup =
                workflow::get_setup_categories(conn, scope_arg(conn, sub)?, period_arg(sub)?)?;
            let (json, jsonl) = output_flags(sub);
            if !maybe_print_json(json, jsonl, &setup)? {
                let mut rows = Vec::new();
                push_rows(&mut rows, "static", &setup.static_categories);
                push_rows(&mut rows, "dynamic", &setup.dynamic_categories);
                println!(
                    "{}",
                    pretty_table(&["Group", "Category", "Type", "User", "Amount", "Record"], rows)
                );
            }
        }
        Some(("start", sub)) => {
            let created = workflow::start_new_month(conn, period_arg(sub)?)?;
            println!("{} ({} records)", created.message, created.created_count);
        }
        Some(("list", sub)) => {
            let months = workflow::available_months(conn)?;
            let (json, jsonl) = output_flags(sub);
            if !maybe_print_json(json, jsonl, &months)? {
                for p in months {
                    println!("{}  {}", p, p.display());
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn push_rows(rows: &mut Vec<Vec<String>>, group: &str, cats: &[SetupCategory]) {
    for c in cats {
        for u in &c.users {
            rows.push(vec![
                group.to_string(),
                c.name.clone(),
                c.kind.to_string(),
                u.user_name.clone(),
                u.amount.to_string(),
                u.record_id.map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
            ]);
        }
    }
}
