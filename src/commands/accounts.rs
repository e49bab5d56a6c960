// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::load_accounts;
use crate::utils::{fmt_money, maybe_print_json, parse_currency, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let typ = sub.get_one::<String>("type").unwrap();
            let ccy = parse_currency(sub.get_one::<String>("currency").unwrap())?;
            let start = match sub.get_one::<String>("starting_balance") {
                Some(s) => parse_decimal(s)?,
                None => Decimal::ZERO,
            };
            conn.execute(
                "INSERT INTO accounts(name, type, currency, starting_balance) VALUES (?1, ?2, ?3, ?4)",
                params![name, typ, ccy, start.to_string()],
            )?;
            println!("Added account '{}' ({}, {})", name, typ, ccy);
        }
        Some(("list", sub)) => {
            let accounts = load_accounts(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &accounts)? {
                let data = accounts
                    .into_iter()
                    .map(|a| {
                        vec![
                            a.name,
                            a.r#type,
                            a.currency.clone(),
                            fmt_money(&a.starting_balance, &a.currency),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Name", "Type", "Currency", "Starting"], data)
                );
            }
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            conn.execute("DELETE FROM accounts WHERE name=?1", params![name])?;
            println!("Removed account '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
