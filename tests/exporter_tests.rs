// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use homefin::store::{self, RecordInput};
use homefin::{cli, commands::exporter, commands::importer, db, workflow};
use rusqlite::Connection;
use rust_decimal_macros::dec;
use std::fs;
use tempfile::tempdir;

fn seeded() -> Connection {
    let mut conn = db::open_in_memory().unwrap();
    let alice = store::add_user(&conn, "Alice").unwrap();
    let salary = store::find_categories(&conn, "Salary", None).unwrap()[0].id;
    let inputs: Vec<RecordInput> = ["2025-01", "2025-02"]
        .iter()
        .map(|m| RecordInput {
            user_id: alice.id,
            category_id: salary,
            month_year: m.parse().unwrap(),
            amount: dec!(9000.50),
            note: Some("net, after tax".into()),
        })
        .collect();
    workflow::save_records(&mut conn, &inputs).unwrap();
    conn
}

fn export(conn: &Connection, args: &[&str]) {
    let mut argv = vec!["homefin", "export", "records"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let (_, sub) = matches.subcommand().unwrap();
    exporter::handle(conn, sub).unwrap();
}

#[test]
fn csv_export_quotes_notes_and_filters_month() {
    let conn = seeded();
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.csv");
    let out_s = out.to_str().unwrap().to_string();
    export(&conn, &["--out", out_s.as_str(), "--month", "2025-02"]);

    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "month,user,category,type,amount,note");
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1], "2025-02,Alice,Salary,Income,9000.50,\"net, after tax\"");
}

#[test]
fn json_export_lists_every_record() {
    let conn = seeded();
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.json");
    let out_s = out.to_str().unwrap().to_string();
    export(&conn, &["--format", "json", "--out", out_s.as_str()]);

    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let items = v.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["month"], "2025-02");
    assert_eq!(items[0]["user"], "Alice");
}

#[test]
fn exported_csv_imports_back_into_a_fresh_database() {
    let conn = seeded();
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.csv");
    let out_s = out.to_str().unwrap().to_string();
    export(&conn, &["--out", out_s.as_str()]);

    let mut fresh = db::open_in_memory().unwrap();
    store::add_user(&fresh, "Alice").unwrap();
    let n = importer::import_records(&mut fresh, &out_s).unwrap();
    assert_eq!(n, 2);
    assert_eq!(store::record_periods(&fresh).unwrap().len(), 2);
}

#[test]
fn unknown_format_is_an_error() {
    let conn = seeded();
    let matches = cli::build_cli().get_matches_from([
        "homefin", "export", "records", "--format", "xml", "--out", "/dev/null",
    ]);
    let (_, sub) = matches.subcommand().unwrap();
    assert!(exporter::handle(&conn, sub).is_err());
}
