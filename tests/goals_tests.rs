// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use moneydash::models::Goal;
use moneydash::{cli, commands::goals, db};
use rusqlite::Connection;
use rust_decimal_macros::dec;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO accounts(id,name,type,currency) VALUES (1,'Savings','bank','USD')",
        [],
    )
    .unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["moneydash", "goal"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let Some(("goal", m)) = matches.subcommand() else {
        panic!("no goal subcommand");
    };
    goals::handle(conn, m)
}

#[test]
fn goal_add_and_list_with_progress() {
    let conn = setup();
    run(
        &conn,
        &[
            "add",
            "--name",
            "Emergency Fund",
            "--target",
            "10000",
            "--saved",
            "6500",
            "--target-date",
            "2025-12-31",
            "--account",
            "Savings",
            "--description",
            "Six months of expenses",
        ],
    )
    .unwrap();
    run(&conn, &["add", "--name", "Vacation", "--target", "3000"]).unwrap();

    let loaded = db::load_goals(&conn).unwrap();
    assert_eq!(loaded.len(), 2);
    let fund = &loaded[0];
    assert_eq!(fund.name, "Emergency Fund");
    assert_eq!(fund.account_id, Some(1));
    assert_eq!(fund.target_date.unwrap().to_string(), "2025-12-31");
    assert_eq!(fund.progress(), dec!(65));
    assert_eq!(fund.remaining(), dec!(3500));
    // goals without a date sort last
    assert_eq!(loaded[1].name, "Vacation");
    assert_eq!(loaded[1].progress(), dec!(0));
}

#[test]
fn goal_update_contributes_and_replaces() {
    let conn = setup();
    run(&conn, &["add", "--name", "Car", "--target", "3000", "--saved", "1000"]).unwrap();
    run(&conn, &["update", "--name", "Car", "--contribute", "250.50"]).unwrap();
    assert_eq!(db::load_goals(&conn).unwrap()[0].saved_amount, dec!(1250.50));

    run(&conn, &["update", "--name", "Car", "--saved", "3300", "--target", "3200"]).unwrap();
    let car = &db::load_goals(&conn).unwrap()[0];
    assert_eq!(car.target_amount, dec!(3200));
    assert_eq!(car.progress(), dec!(103.13));
    assert_eq!(car.remaining(), dec!(0));

    // a rejected field leaves the whole goal untouched
    assert!(run(&conn, &["update", "--name", "Car", "--contribute", "100", "--target", "0"]).is_err());
    assert_eq!(db::load_goals(&conn).unwrap()[0].saved_amount, dec!(3300));
}

#[test]
fn goal_rejects_bad_input() {
    let conn = setup();
    assert!(run(&conn, &["add", "--name", "Zero", "--target", "0"]).is_err());
    assert!(run(&conn, &["add", "--name", "Neg", "--target=-10"]).is_err());
    assert!(run(&conn, &["update", "--name", "Missing", "--contribute", "5"]).is_err());
    assert!(run(&conn, &["rm", "--name", "Missing"]).is_err());
    assert!(
        cli::build_cli()
            .try_get_matches_from([
                "moneydash", "goal", "update", "--name", "Car", "--saved", "1", "--contribute", "2",
            ])
            .is_err()
    );
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM goals", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn goal_json_uses_camel_case() {
    let goal = Goal {
        id: 1,
        name: "House".into(),
        target_amount: dec!(50000),
        saved_amount: dec!(12500),
        target_date: None,
        account_id: None,
        description: None,
    };
    let v = serde_json::to_value(&goal).unwrap();
    assert_eq!(v["targetAmount"], "50000");
    assert_eq!(v["savedAmount"], "12500");
    assert!(v.get("targetDate").is_none());
    assert_eq!(goal.progress(), dec!(25));
}
