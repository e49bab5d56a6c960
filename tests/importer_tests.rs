// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use moneydash::{cli, commands::importer, db};
use rusqlite::Connection;
use std::io::Write;
use tempfile::NamedTempFile;

const HEADER: &str = "date,type,amount,category,account,merchant,tags,notes,currency";

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO accounts(id,name,type,currency) VALUES (1,'A1','bank','USD')",
        [],
    )
    .unwrap();
    conn.execute("INSERT INTO categories(id,name) VALUES (1,'Groceries')", [])
        .unwrap();
    conn
}

fn csv_file(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}\n{}", HEADER, body).unwrap();
    file.flush().unwrap();
    file
}

fn import(conn: &mut Connection, path: &str) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from(["moneydash", "import", "transactions", path]);
    let Some(("import", import_m)) = matches.subcommand() else {
        panic!("no import subcommand");
    };
    importer::handle(conn, import_m)
}

fn count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap()
}

#[test]
fn importer_trims_cli_path_argument() {
    let mut conn = base_conn();
    let file = csv_file("2025-02-03,expense,5.00,,A1,,,,USD");
    let padded = format!("  {}  ", file.path().to_str().unwrap());
    import(&mut conn, &padded).unwrap();
    assert_eq!(count(&conn), 1);
}

#[test]
fn importer_trims_fields_and_resolves_references() {
    let mut conn = base_conn();
    let file = csv_file(
        " 2025-02-03 , Expense , 20.00 , Groceries , A1 , Corner  Shop , weekly;x , memo text , usd ",
    );
    import(&mut conn, file.path().to_str().unwrap()).unwrap();

    let (kind, amount, cat, merchant, notes, ccy): (String, String, Option<i64>, String, String, String) = conn
        .query_row(
            "SELECT t.type, t.amount, t.category_id, m.normalized_name, t.notes, t.currency
             FROM transactions t JOIN merchants m ON t.merchant_id=m.id",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?)),
        )
        .unwrap();
    assert_eq!(kind, "expense");
    assert_eq!(amount, "20.00");
    assert_eq!(cat, Some(1));
    assert_eq!(merchant, "corner shop");
    assert_eq!(notes, "memo text");
    assert_eq!(ccy, "USD");
}

#[test]
fn importer_applies_category_rules_when_blank() {
    let mut conn = base_conn();
    conn.execute(
        "INSERT INTO rules(pattern, category_id) VALUES ('(?i)market', 1)",
        [],
    )
    .unwrap();
    let file = csv_file("2025-02-03,expense,12.00,,A1,Fresh Market,,,");
    import(&mut conn, file.path().to_str().unwrap()).unwrap();
    let cat: Option<i64> = conn
        .query_row("SELECT category_id FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(cat, Some(1));
}

#[test]
fn importer_rejects_negative_amount() {
    let mut conn = base_conn();
    let file = csv_file("2025-02-03,expense,-5.00,,A1,,,,");
    let err = import(&mut conn, file.path().to_str().unwrap()).unwrap_err();
    assert!(format!("{:#}", err).contains("must not be negative"));
    assert_eq!(count(&conn), 0);
}

#[test]
fn importer_rejects_currency_mismatch() {
    let mut conn = base_conn();
    let file = csv_file("2025-02-03,expense,5.00,,A1,,,,EUR");
    let err = import(&mut conn, file.path().to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("does not match account 'A1' currency 'USD'"));
    assert_eq!(count(&conn), 0);
}

#[test]
fn importer_rolls_back_when_row_fails() {
    let mut conn = base_conn();
    let file = csv_file(
        "2025-02-03,expense,5.00,,A1,,,,\n2025-02-04,refund,5.00,,A1,,,,",
    );
    let err = import(&mut conn, file.path().to_str().unwrap()).unwrap_err();
    let msg = format!("{:#}", err);
    assert!(msg.contains("line 3"), "{}", msg);
    assert!(msg.contains("Unknown transaction type 'refund'"), "{}", msg);
    assert_eq!(count(&conn), 0);
}

#[test]
fn importer_rejects_invalid_date() {
    let mut conn = base_conn();
    let file = csv_file("03/02/2025,expense,5.00,,A1,,,,");
    let err = import(&mut conn, file.path().to_str().unwrap()).unwrap_err();
    assert!(format!("{:#}", err).contains("Invalid date '03/02/2025'"));
    assert_eq!(count(&conn), 0);
}
