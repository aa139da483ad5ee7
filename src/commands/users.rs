// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::store;
use crate::utils::{id_for_user, maybe_print_json, output_flags, pretty_table, string_arg};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = string_arg(sub, "name")?;
            let user = store::add_user(conn, &name)
                .with_context(|| format!("Add user '{}'", name))?;
            println!("Added user '{}' (id {})", user.name, user.id);
        }
        Some(("list", sub)) => {
            let users = store::list_real_users(conn)?;
            let (json, jsonl) = output_flags(sub);
            if !maybe_print_json(json, jsonl, &users)? {
                let rows = users
                    .iter()
                    .map(|u| vec![u.id.to_string(), u.name.clone()])
                    .collect();
                println!("{}", pretty_table(&["ID", "Name"], rows));
            }
        }
        Some(("household", _)) => {
            let h = store::household(conn)?;
            println!("{} (id {})", h.name, h.id);
        }
        Some(("rm", sub)) => {
            let name = string_arg(sub, "name")?;
            let id = id_for_user(conn, &name)?;
            store::remove_user(conn, id).with_context(|| format!("Remove user '{}'", name))?;
            println!("Removed user '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
