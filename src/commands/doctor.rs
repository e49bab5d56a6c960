// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{get_base_currency, pretty_table};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;

/// Ledger rows the summary engine would misread: bad amounts or dates,
/// foreign currencies summed as base, expense rows in income categories.
pub fn find_issues(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    let mut stmt = conn.prepare("SELECT id, date, amount FROM transactions ORDER BY id")?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let d: String = r.get(1)?;
        let a: String = r.get(2)?;
        if NaiveDate::parse_from_str(&d, "%Y-%m-%d").is_err() {
            rows.push(vec!["bad_date".into(), format!("tx {} date '{}'", id, d)]);
        }
        match a.parse::<Decimal>() {
            Ok(v) if v.is_sign_negative() && !v.is_zero() => {
                rows.push(vec!["negative_amount".into(), format!("tx {} amount {}", id, a)]);
            }
            Ok(_) => {}
            Err(_) => rows.push(vec!["bad_amount".into(), format!("tx {} amount '{}'", id, a)]),
        }
    }

    let base = get_base_currency(conn)?;
    let mut stmt = conn.prepare(
        "SELECT currency, COUNT(*) FROM transactions WHERE currency != ?1 GROUP BY currency ORDER BY currency",
    )?;
    let mut cur = stmt.query([&base])?;
    while let Some(r) = cur.next()? {
        let ccy: String = r.get(0)?;
        let n: i64 = r.get(1)?;
        rows.push(vec![
            "foreign_currency".into(),
            format!("{} transactions in {} (base {})", n, ccy, base),
        ]);
    }

    let mut stmt = conn.prepare(
        "SELECT t.id, c.name FROM transactions t JOIN categories c ON t.category_id=c.id
         WHERE t.type='expense' AND c.kind='income' ORDER BY t.id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let cat: String = r.get(1)?;
        rows.push(vec![
            "expense_in_income_category".into(),
            format!("tx {} in '{}'", id, cat),
        ]);
    }

    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = find_issues(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
