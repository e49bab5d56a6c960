// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use moneydash::{commands::doctor, db};
use rusqlite::Connection;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO accounts(id,name,type,currency) VALUES (1,'Checking','bank','USD');
        INSERT INTO categories(id,name,kind) VALUES (1,'Food','expense'),(2,'Salary','income');
        "#,
    )
    .unwrap();
    conn
}

#[test]
fn clean_ledger_has_no_issues() {
    let conn = setup();
    conn.execute(
        "INSERT INTO transactions(date,account_id,type,amount,currency,category_id) VALUES ('2025-01-02',1,'expense','5','USD',1)",
        [],
    )
    .unwrap();
    assert!(doctor::find_issues(&conn).unwrap().is_empty());
}

#[test]
fn doctor_reports_rows_the_engine_would_misread() {
    let conn = setup();
    conn.execute_batch(
        r#"
        INSERT INTO transactions(date,account_id,type,amount,currency,category_id) VALUES
            ('2025-01-02',1,'expense','-5','USD',1),
            ('2025-13-40',1,'expense','5','USD',1),
            ('2025-01-03',1,'expense','abc','USD',1),
            ('2025-01-04',1,'expense','5','EUR',1),
            ('2025-01-05',1,'expense','5','USD',2);
        "#,
    )
    .unwrap();
    let kinds: Vec<String> = doctor::find_issues(&conn)
        .unwrap()
        .into_iter()
        .map(|r| r[0].clone())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "negative_amount",
            "bad_date",
            "bad_amount",
            "foreign_currency",
            "expense_in_income_category"
        ]
    );
}
