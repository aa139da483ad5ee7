// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

use crate::models::{CategoryType, Scope};
use crate::period::Period;
use crate::store;

static TRACING: Once = Once::new();

/// Install the stderr subscriber once; `RUST_LOG` overrides `homefin=warn`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("homefin=warn"));
        // a subscriber set elsewhere (e.g. by a test harness) wins
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s.trim()))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s.trim()))
}

pub fn parse_period(s: &str) -> Result<Period> {
    Ok(s.parse::<Period>()?)
}

pub fn fmt_money(d: Decimal, symbol: &str) -> String {
    format!("{}{:.2}", symbol, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// `--json` / `--jsonl` flags of a subcommand.
pub fn output_flags(m: &clap::ArgMatches) -> (bool, bool) {
    (m.get_flag("json"), m.get_flag("jsonl"))
}

pub fn id_for_user(conn: &Connection, name: &str) -> Result<i64> {
    let name = name.trim();
    let user = store::find_user_by_name(conn, name)?
        .ok_or_else(|| anyhow!("User '{}' not found", name))?;
    Ok(user.id)
}

/// Resolve a category by name; the type disambiguates a name used twice.
pub fn id_for_category(conn: &Connection, name: &str, kind: Option<CategoryType>) -> Result<i64> {
    let found = store::find_categories(conn, name, kind)?;
    match found.as_slice() {
        [] => bail!("Category '{}' not found", name.trim()),
        [only] => Ok(only.id),
        _ => bail!(
            "Category '{}' exists with several types; pass --type",
            name.trim()
        ),
    }
}

/// `--user <NAME>`; absent or `family` selects the family view.
pub fn scope_arg(conn: &Connection, m: &clap::ArgMatches) -> Result<Scope> {
    match m.get_one::<String>("user").map(|s| s.trim()) {
        None | Some("") => Ok(Scope::Family),
        Some(name) if name.eq_ignore_ascii_case("family") => Ok(Scope::Family),
        Some(name) => Ok(Scope::User(id_for_user(conn, name)?)),
    }
}

/// `--month YYYY-MM`, defaulting to the current period.
pub fn period_arg(m: &clap::ArgMatches) -> Result<Period> {
    match m.get_one::<String>("month") {
        Some(raw) => parse_period(raw),
        None => Ok(Period::current()),
    }
}

pub fn opt_decimal_arg(m: &clap::ArgMatches, id: &str) -> Result<Option<Decimal>> {
    m.get_one::<String>(id).map(|s| parse_decimal(s)).transpose()
}

pub fn decimal_arg(m: &clap::ArgMatches, id: &str) -> Result<Decimal> {
    opt_decimal_arg(m, id)?.ok_or_else(|| anyhow!("--{} is required", id))
}

pub fn string_arg(m: &clap::ArgMatches, id: &str) -> Result<String> {
    m.get_one::<String>(id)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| anyhow!("--{} is required", id))
}

pub fn opt_string_arg(m: &clap::ArgMatches, id: &str) -> Option<String> {
    m.get_one::<String>(id)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn id_arg(m: &clap::ArgMatches, id: &str) -> Result<i64> {
    m.get_one::<i64>(id)
        .copied()
        .ok_or_else(|| anyhow!("--{} is required", id))
}

pub fn opt_bool_arg(m: &clap::ArgMatches, id: &str) -> Option<bool> {
    m.get_one::<bool>(id).copied()
}
