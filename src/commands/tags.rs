// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::load_tags;
use crate::utils::{maybe_print_json, parse_color, parse_tags, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, params};
use std::collections::HashMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            if name.is_empty() || name.contains(',') {
                return Err(anyhow!("Invalid tag name '{}'", name));
            }
            let color = match sub.get_one::<String>("color") {
                Some(c) => Some(parse_color(c)?),
                None => None,
            };
            conn.execute(
                "INSERT INTO tags(name, color) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET color=excluded.color",
                params![name, color],
            )?;
            println!("Tag '{}' saved", name);
        }
        Some(("list", sub)) => {
            let tags = load_tags(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &tags)? {
                let usage = usage_counts(conn)?;
                let data = tags
                    .into_iter()
                    .map(|t| {
                        let n = usage.get(&t.name).copied().unwrap_or(0);
                        vec![t.name, t.color.unwrap_or_default(), n.to_string()]
                    })
                    .collect();
                println!("{}", pretty_table(&["Tag", "Color", "Transactions"], data));
            }
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let n = conn.execute("DELETE FROM tags WHERE name=?1", params![name])?;
            if n == 0 {
                return Err(anyhow!("Tag '{}' not found", name));
            }
            println!("Removed tag '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

/// Number of transactions carrying each tag.
pub fn usage_counts(conn: &Connection) -> Result<HashMap<String, usize>> {
    let mut stmt = conn.prepare("SELECT tags FROM transactions WHERE tags IS NOT NULL")?;
    let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
    let mut out = HashMap::new();
    for row in rows {
        for tag in parse_tags(&row?) {
            *out.entry(tag).or_insert(0) += 1;
        }
    }
    Ok(out)
}
