// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use moneydash::{cli, commands::transactions, db};
use rusqlite::{Connection, params};

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO accounts(id,name,type,currency) VALUES (1,'A1','bank','USD')",
        [],
    )
    .unwrap();
    conn.execute("INSERT INTO categories(id,name) VALUES (1,'Cat1')", [])
        .unwrap();
    for i in 1..=3 {
        conn.execute(
            "INSERT INTO transactions(date,account_id,type,amount,category_id,currency) VALUES (?1,1,'expense','10',1,'USD')",
            params![format!("2025-01-0{}", i)],
        )
        .unwrap();
    }
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["moneydash", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    transactions::handle(conn, tx_m)
}

#[test]
fn list_limit_respected() {
    let conn = setup();
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["moneydash", "tx", "list", "--limit", "2"]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let rows = transactions::query_rows(&conn, list_m).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].date, "2025-01-03");
            assert_eq!(rows[0].r#type, "expense");
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn add_rejects_negative_amounts() {
    let conn = setup();
    let err = run(&conn, &["add", "--date", "2025-01-05", "--account", "A1", "--amount=-5"])
        .unwrap_err();
    assert!(err.to_string().contains("must not be negative"));
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 3);
}

#[test]
fn add_rejects_unknown_type_and_bad_date() {
    let conn = setup();
    let err = run(
        &conn,
        &["add", "--date", "2025-01-05", "--account", "A1", "--amount", "5", "--type", "refund"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("Unknown transaction type"));

    let err = run(&conn, &["add", "--date", "05/01/2025", "--account", "A1", "--amount", "5"])
        .unwrap_err();
    assert!(err.to_string().contains("Invalid date"));
}

#[test]
fn add_stores_merchant_tags_and_rule_category() {
    let conn = setup();
    conn.execute("INSERT INTO categories(id,name) VALUES (2,'Coffee')", [])
        .unwrap();
    conn.execute(
        "INSERT INTO rules(pattern, category_id) VALUES ('(?i)starbucks', 2)",
        [],
    )
    .unwrap();

    run(
        &conn,
        &[
            "add", "--date", "2025-01-06", "--account", "A1", "--amount", "4.75",
            "--merchant", "  Starbucks  Reserve ", "--tags", "latte, ,morning",
        ],
    )
    .unwrap();

    let (cat, merchant, tags, ccy): (Option<i64>, String, String, String) = conn
        .query_row(
            "SELECT t.category_id, m.normalized_name, t.tags, t.currency FROM transactions t
             JOIN merchants m ON t.merchant_id=m.id WHERE t.date='2025-01-06'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .unwrap();
    assert_eq!(cat, Some(2));
    assert_eq!(merchant, "starbucks reserve");
    assert_eq!(tags, "latte,morning");
    assert_eq!(ccy, "USD");

    let loaded = db::load_transactions(&conn, None, None).unwrap();
    let last = loaded.last().unwrap();
    assert_eq!(last.tags, vec!["latte".to_string(), "morning".to_string()]);
}

#[test]
fn list_filters_by_type_and_month() {
    let conn = setup();
    run(
        &conn,
        &["add", "--date", "2025-02-01", "--account", "A1", "--amount", "900", "--type", "income"],
    )
    .unwrap();
    let matches =
        cli::build_cli().get_matches_from(["moneydash", "tx", "list", "--type", "income"]);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    let Some(("list", list_m)) = tx_m.subcommand() else {
        panic!("no list subcommand");
    };
    let rows = transactions::query_rows(&conn, list_m).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, "900");

    let matches =
        cli::build_cli().get_matches_from(["moneydash", "tx", "list", "--month", "2025-01"]);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    let Some(("list", list_m)) = tx_m.subcommand() else {
        panic!("no list subcommand");
    };
    assert_eq!(transactions::query_rows(&conn, list_m).unwrap().len(), 3);
}

#[test]
fn list_month_filter_accepts_single_digit_month() {
    let conn = setup();
    let matches = cli::build_cli().get_matches_from(["moneydash", "tx", "list", "--month", "2025-1"]);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    let Some(("list", list_m)) = tx_m.subcommand() else {
        panic!("no list subcommand");
    };
    assert_eq!(transactions::query_rows(&conn, list_m).unwrap().len(), 3);
}
