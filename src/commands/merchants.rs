// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::load_merchants;
use crate::utils::{id_for_merchant_or_insert, maybe_print_json, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            if name.is_empty() {
                return Err(anyhow!("Merchant name must not be empty"));
            }
            let id = id_for_merchant_or_insert(conn, name)?;
            println!("Merchant '{}' (id {})", name, id);
        }
        Some(("list", sub)) => {
            let merchants = load_merchants(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &merchants)? {
                let data = merchants
                    .into_iter()
                    .map(|m| vec![m.id.to_string(), m.name, m.normalized_name])
                    .collect();
                println!("{}", pretty_table(&["ID", "Merchant", "Normalized"], data));
            }
        }
        _ => {}
    }
    Ok(())
}
