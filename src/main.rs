// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::Path;

use homefin::{cli, commands, db, utils};

fn run(matches: &clap::ArgMatches) -> Result<()> {
    let db_path = matches.get_one::<String>("db").map(Path::new);
    let mut conn = db::open_or_init(db_path)?;

    match matches.subcommand() {
        Some(("init", _)) => match db_path {
            Some(p) => println!("Database initialized at {}", p.display()),
            None => println!("Database initialized at {}", db::db_path()?.display()),
        },
        Some(("user", sub)) => commands::users::handle(&conn, sub)?,
        Some(("category", sub)) => commands::categories::handle(&conn, sub)?,
        Some(("record", sub)) => commands::records::handle(&mut conn, sub)?,
        Some(("loan", sub)) => commands::loans::handle(&conn, sub)?,
        Some(("debt", sub)) => commands::debts::handle(&mut conn, sub)?,
        Some(("asset", sub)) => commands::assets::handle(&mut conn, sub)?,
        Some(("dashboard", sub)) => commands::dashboard::handle(&conn, sub)?,
        Some(("month", sub)) => commands::month::handle(&mut conn, sub)?,
        Some(("config", sub)) => commands::settings::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    utils::init_tracing();
    let matches = cli::build_cli().get_matches();
    if let Err(err) = run(&matches) {
        let op = match matches.subcommand() {
            Some((name, sub)) => match sub.subcommand_name() {
                Some(action) => format!("{} {}", name, action),
                None => name.to_string(),
            },
            None => "homefin".to_string(),
        };
        tracing::error!(operation = %op, error = %format!("{:#}", err), "command failed");
        return Err(err);
    }
    Ok(())
}
