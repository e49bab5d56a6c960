// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::load_transactions;
use crate::models::TxType;
use crate::utils::{id_for_category, parse_amount, parse_date, parse_month, pretty_table};
use anyhow::{Result, anyhow};
use chrono::Months;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use std::collections::HashMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;
    let cat = sub.get_one::<String>("category").unwrap().trim();
    let limit = parse_amount(sub.get_one::<String>("limit").unwrap())?;
    let cat_id = id_for_category(conn, cat)?;
    conn.execute(
        "INSERT INTO budgets(month, category_id, amount) VALUES (?1,?2,?3)
         ON CONFLICT(month, category_id) DO UPDATE SET amount=excluded.amount",
        params![month, cat_id, limit.to_string()],
    )?;
    println!("Budget set for {} / {} = {}", month, cat, limit);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;
    let cat = sub.get_one::<String>("category").unwrap().trim();
    let cat_id = id_for_category(conn, cat)?;
    let n = conn.execute(
        "DELETE FROM budgets WHERE month=?1 AND category_id=?2",
        params![month, cat_id],
    )?;
    if n == 0 {
        return Err(anyhow!("No budget for {} / {}", month, cat));
    }
    println!("Removed budget for {} / {}", month, cat);
    Ok(())
}

/// Expense totals per category for one `YYYY-MM` month.
pub fn spent_by_category(conn: &Connection, month: &str) -> Result<HashMap<i64, Decimal>> {
    let start = parse_date(&format!("{}-01", month))?;
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| anyhow!("Month '{}' out of range", month))?;
    let mut out = HashMap::new();
    for tx in load_transactions(conn, Some(start), Some(end))? {
        if tx.r#type != TxType::Expense {
            continue;
        }
        if let Some(cid) = tx.category_id {
            *out.entry(cid).or_insert(Decimal::ZERO) += tx.amount;
        }
    }
    Ok(out)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    match sub.get_one::<String>("month") {
        Some(month) => {
            let month = parse_month(month)?;
            let spent = spent_by_category(conn, &month)?;
            let mut stmt = conn.prepare(
                "SELECT c.id, c.name, b.amount FROM budgets b JOIN categories c ON b.category_id=c.id
                 WHERE b.month=?1 ORDER BY c.name",
            )?;
            let rows = stmt.query_map(params![month], |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                ))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (cid, c, a) = row?;
                let limit = a.parse::<Decimal>()?;
                let used = spent.get(&cid).copied().unwrap_or(Decimal::ZERO);
                data.push(vec![
                    c,
                    format!("{:.2}", limit),
                    format!("{:.2}", used),
                    format!("{:.2}", limit - used),
                ]);
            }
            println!(
                "{}",
                pretty_table(&["Category", "Limit", "Spent", "Remaining"], data)
            );
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT b.month, c.name, b.amount FROM budgets b JOIN categories c ON b.category_id=c.id
                 ORDER BY b.month DESC, c.name",
            )?;
            let rows = stmt.query_map([], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                ))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (m, c, a) = row?;
                data.push(vec![m, c, a]);
            }
            println!("{}", pretty_table(&["Month", "Category", "Limit"], data));
        }
    }
    Ok(())
}
