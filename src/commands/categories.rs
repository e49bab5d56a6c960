// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::CategoryKind;
use crate::utils::{parse_color, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let kind: CategoryKind = sub.get_one::<String>("kind").unwrap().parse()?;
            let color = match sub.get_one::<String>("color") {
                Some(c) => Some(parse_color(c)?),
                None => None,
            };
            conn.execute(
                "INSERT INTO categories(name, kind, color) VALUES (?1, ?2, ?3)",
                params![name, kind.as_str(), color],
            )?;
            println!("Added {} category '{}'", kind.as_str(), name);
        }
        Some(("list", _)) => {
            let mut stmt = conn.prepare(
                "SELECT name, kind, IFNULL(color, '') FROM categories ORDER BY kind, name",
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
                let (n, k, c) = row?;
                data.push(vec![n, k, c]);
            }
            println!("{}", pretty_table(&["Category", "Kind", "Color"], data));
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            conn.execute("DELETE FROM categories WHERE name=?1", params![name])?;
            println!("Removed category '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
