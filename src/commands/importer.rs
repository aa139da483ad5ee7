// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rusqlite::Connection;
use std::collections::{HashMap, hash_map::Entry};

use crate::models::CategoryType;
use crate::store::RecordInput;
use crate::utils::{id_for_category, id_for_user, parse_decimal, parse_period};
use crate::workflow;

/// Upsert records from a CSV with header `month,user,category,type,amount,note`.
///
/// `type` may be empty when the category name is unambiguous. Every row is
/// resolved before anything is written, and the write is one transaction.
pub fn import_records(conn: &mut Connection, path: &str) -> Result<usize> {
    let path = path.trim();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let mut user_cache: HashMap<String, i64> = HashMap::new();
    let mut category_cache: HashMap<(String, Option<CategoryType>), i64> = HashMap::new();
    let mut inputs = Vec::new();

    for (line, result) in rdr.records().enumerate() {
        let rec = result?;
        // header is line 1
        let row = line + 2;
        let month_raw = rec.get(0).context("month missing")?.trim();
        let user = rec.get(1).context("user missing")?.trim().to_string();
        let category = rec.get(2).context("category missing")?.trim().to_string();
        let kind_raw = rec.get(3).unwrap_or("").trim();
        let amount_raw = rec.get(4).context("amount missing")?.trim();
        let note = rec
            .get(5)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        let month_year =
            parse_period(month_raw).with_context(|| format!("Row {}: bad month", row))?;
        let amount = parse_decimal(amount_raw)
            .with_context(|| format!("Row {}: bad amount for {}", row, category))?;
        let kind = if kind_raw.is_empty() {
            None
        } else {
            Some(kind_raw.parse::<CategoryType>()?)
        };

        let user_id = match user_cache.entry(user.clone()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let id = id_for_user(conn, &user).with_context(|| format!("Row {}", row))?;
                *entry.insert(id)
            }
        };
        let category_id = match category_cache.entry((category.clone(), kind)) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let id = id_for_category(conn, &category, kind)
                    .with_context(|| format!("Row {}", row))?;
                *entry.insert(id)
            }
        };

        inputs.push(RecordInput {
            user_id,
            category_id,
            month_year,
            amount,
            note,
        });
    }

    let saved = workflow::save_records(conn, &inputs)
        .with_context(|| format!("Import {}", path))?;
    tracing::info!(path, count = saved.len(), "records imported");
    Ok(saved.len())
}
