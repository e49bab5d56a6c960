// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde_json::json;

const COLUMNS: [&str; 9] = [
    "date", "type", "amount", "category", "account", "merchant", "tags", "notes", "currency",
];

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

/// Writes the same column layout the importer reads.
fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap().trim();
    if fmt != "csv" && fmt != "json" {
        return Err(anyhow!("Unknown format: {} (use csv|json)", fmt));
    }

    let mut stmt = conn.prepare(
        "SELECT t.date, t.type, t.amount, IFNULL(c.name,''), a.name, IFNULL(m.name,''),
                IFNULL(t.tags,''), IFNULL(t.notes,''), t.currency
         FROM transactions t
         LEFT JOIN accounts a ON t.account_id=a.id
         LEFT JOIN categories c ON t.category_id=c.id
         LEFT JOIN merchants m ON t.merchant_id=m.id
         ORDER BY t.date, t.id",
    )?;
    let rows = stmt.query_map([], |r| {
        let mut rec = Vec::with_capacity(COLUMNS.len());
        for i in 0..COLUMNS.len() {
            rec.push(r.get::<_, Option<String>>(i)?.unwrap_or_default());
        }
        Ok(rec)
    })?;

    let mut count = 0usize;
    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record(COLUMNS)?;
        for row in rows {
            wtr.write_record(row?)?;
            count += 1;
        }
        wtr.flush()?;
    } else {
        let mut items = Vec::new();
        for row in rows {
            let rec = row?;
            let mut obj = serde_json::Map::new();
            for (k, v) in COLUMNS.iter().zip(rec) {
                obj.insert(k.to_string(), json!(v));
            }
            items.push(serde_json::Value::Object(obj));
            count += 1;
        }
        std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
    }
    tracing::info!(out, count, format = %fmt, "transactions exported");
    println!("Exported {} transactions to {}", count, out);
    Ok(())
}
