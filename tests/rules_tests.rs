// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use moneydash::{cli, commands::rules, db, utils::apply_category_rules};
use rusqlite::{Connection, params};

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute("INSERT INTO categories(name) VALUES('Shopping')", [])
        .unwrap();
    conn.execute("INSERT INTO categories(name) VALUES('Groceries')", [])
        .unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["moneydash", "rules"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let Some(("rules", m)) = matches.subcommand() else {
        panic!("rules command not parsed");
    };
    rules::handle(conn, m)
}

#[test]
fn rule_matches_merchant_or_notes() {
    let conn = setup();
    let cat_id: i64 = conn
        .query_row("SELECT id FROM categories WHERE name='Shopping'", [], |r| {
            r.get(0)
        })
        .unwrap();
    conn.execute(
        "INSERT INTO rules(pattern, category_id) VALUES('(?i)amazon|amzn', ?1)",
        params![cat_id],
    )
    .unwrap();

    assert_eq!(
        apply_category_rules(&conn, Some("AMZN Mktp US*AB123"), None).unwrap(),
        Some(cat_id)
    );
    assert_eq!(
        apply_category_rules(&conn, None, Some("order from amazon")).unwrap(),
        Some(cat_id)
    );
    assert_eq!(apply_category_rules(&conn, Some("Corner Shop"), None).unwrap(), None);
    assert_eq!(apply_category_rules(&conn, None, None).unwrap(), None);
}

#[test]
fn newest_rule_wins() {
    let conn = setup();
    run(&conn, &["add", "--pattern", "(?i)market", "--category", "Shopping"]).unwrap();
    run(&conn, &["add", "--pattern", "(?i)fresh", "--category", "Groceries"]).unwrap();
    let groceries: i64 = conn
        .query_row("SELECT id FROM categories WHERE name='Groceries'", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(
        apply_category_rules(&conn, Some("Fresh Market"), None).unwrap(),
        Some(groceries)
    );
}

#[test]
fn rules_add_rejects_invalid_regex() {
    let conn = setup();
    let err = run(&conn, &["add", "--pattern", " (?P< ", "--category", " Shopping "]).unwrap_err();
    assert!(err.to_string().contains("Invalid regex pattern"));
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM rules", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn rules_rm_trims_id_argument() {
    let conn = setup();
    run(&conn, &["add", "--pattern", "foo", "--category", "Shopping"]).unwrap();
    let id: i64 = conn
        .query_row("SELECT id FROM rules", [], |r| r.get(0))
        .unwrap();
    run(&conn, &["rm", "--id", &format!("  {}  ", id)]).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM rules", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}
