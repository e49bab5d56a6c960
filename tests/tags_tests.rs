// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use moneydash::{
    cli,
    commands::{accounts, merchants, tags, transactions},
    db,
};
use rusqlite::Connection;
use rust_decimal_macros::dec;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["moneydash"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("tag", m)) => tags::handle(conn, m),
        Some(("account", m)) => accounts::handle(conn, m),
        Some(("merchant", m)) => merchants::handle(conn, m),
        Some(("tx", m)) => transactions::handle(conn, m),
        _ => panic!("unexpected subcommand"),
    }
}

#[test]
fn tag_add_sets_color_and_validates() {
    let conn = setup();
    run(&conn, &["tag", "add", "--name", " travel ", "--color", "#ff9f43"]).unwrap();
    run(&conn, &["tag", "add", "--name", "travel", "--color", "#00D2D3"]).unwrap();
    let loaded = db::load_tags(&conn).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "travel");
    assert_eq!(loaded[0].color.as_deref(), Some("#00D2D3"));

    assert!(run(&conn, &["tag", "add", "--name", "a,b"]).is_err());
    assert!(run(&conn, &["tag", "add", "--name", "x", "--color", "red"]).is_err());
    assert!(run(&conn, &["tag", "rm", "--name", "missing"]).is_err());
}

#[test]
fn transaction_tags_join_the_registry() {
    let conn = setup();
    run(&conn, &["account", "add", "--name", "A1", "--type", "bank", "--currency", "usd"]).unwrap();
    run(&conn, &["tag", "add", "--name", "coffee", "--color", "#6F4E37"]).unwrap();
    for _ in 0..2 {
        run(
            &conn,
            &["tx", "add", "--date", "2025-01-02", "--account", "A1", "--amount", "4", "--tags", "coffee,work"],
        )
        .unwrap();
    }

    let loaded = db::load_tags(&conn).unwrap();
    let names: Vec<_> = loaded.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["coffee", "work"]);
    assert_eq!(loaded[0].color.as_deref(), Some("#6F4E37"));
    assert_eq!(loaded[1].color, None);

    let usage = tags::usage_counts(&conn).unwrap();
    assert_eq!(usage.get("coffee"), Some(&2));
    assert_eq!(usage.get("work"), Some(&2));
}

#[test]
fn account_and_merchant_lists_read_typed_rows() {
    let conn = setup();
    run(
        &conn,
        &["account", "add", "--name", "Wallet", "--type", "cash", "--currency", "eur", "--starting-balance", "25.50"],
    )
    .unwrap();
    run(&conn, &["merchant", "add", "--name", "  Corner   Shop "]).unwrap();
    run(&conn, &["account", "list", "--json"]).unwrap();
    run(&conn, &["merchant", "list", "--jsonl"]).unwrap();

    let accounts = db::load_accounts(&conn).unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].currency, "EUR");
    assert_eq!(accounts[0].starting_balance, dec!(25.50));

    let merchants = db::load_merchants(&conn).unwrap();
    assert_eq!(merchants.len(), 1);
    assert_eq!(merchants[0].name, "Corner   Shop");
    assert_eq!(merchants[0].normalized_name, "corner shop");
}
