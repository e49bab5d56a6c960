// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{id_for_category, pretty_table};
use anyhow::{Result, anyhow};
use regex::Regex;
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let pattern = sub.get_one::<String>("pattern").unwrap().trim();
            Regex::new(pattern)
                .map_err(|err| anyhow!("Invalid regex pattern '{}': {}", pattern, err))?;
            let cat = sub.get_one::<String>("category").unwrap().trim();
            let cat_id = id_for_category(conn, cat)?;
            conn.execute(
                "INSERT INTO rules(pattern, category_id) VALUES (?1,?2)",
                params![pattern, cat_id],
            )?;
            println!("Added rule: /{}/ -> {}", pattern, cat);
        }
        Some(("list", _)) => {
            let mut stmt = conn.prepare(
                "SELECT r.id, r.pattern, IFNULL(c.name, '') FROM rules r
                 LEFT JOIN categories c ON r.category_id=c.id ORDER BY r.id DESC",
            )?;
            let rows = stmt.query_map([], |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                ))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (id, pat, cat) = row?;
                data.push(vec![id.to_string(), pat, cat]);
            }
            println!("{}", pretty_table(&["ID", "Pattern", "Category"], data));
        }
        Some(("rm", sub)) => {
            let raw = sub.get_one::<String>("id").unwrap();
            let id = raw.trim().parse::<i64>()?;
            conn.execute("DELETE FROM rules WHERE id=?1", params![id])?;
            println!("Removed rule {}", id);
        }
        _ => {}
    }
    Ok(())
}
