// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::load_recurring;
use crate::models::Frequency;
use crate::utils::{
    id_for_account, id_for_category, maybe_print_json, parse_amount, parse_date, pretty_table,
};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("toggle", sub)) => toggle(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim();
    let frequency: Frequency = sub.get_one::<String>("frequency").unwrap().parse()?;
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let next_run = parse_date(sub.get_one::<String>("next_run").unwrap())?;
    let category_id = match sub.get_one::<String>("category") {
        Some(c) => Some(id_for_category(conn, c.trim())?),
        None => None,
    };
    let account_id = match sub.get_one::<String>("account") {
        Some(a) => Some(id_for_account(conn, a.trim())?),
        None => None,
    };
    conn.execute(
        "INSERT INTO recurring(name, frequency, amount, category_id, account_id, next_run)
         VALUES (?1,?2,?3,?4,?5,?6)",
        params![
            name,
            frequency.as_str(),
            amount.to_string(),
            category_id,
            account_id,
            next_run.to_string()
        ],
    )?;
    println!(
        "Added {} bill '{}' ({}), next on {}",
        frequency.as_str(),
        name,
        amount,
        next_run
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let rules = load_recurring(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rules)? {
        let data = rules
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.name.clone(),
                    r.frequency.as_str().to_string(),
                    format!("{:.2}", r.amount),
                    r.next_run.to_string(),
                    if r.enabled { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Name", "Frequency", "Amount", "Next Run", "Enabled"],
                data
            )
        );
    }
    Ok(())
}

fn toggle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let n = conn.execute(
        "UPDATE recurring SET enabled = 1 - enabled WHERE id=?1",
        params![id],
    )?;
    if n == 0 {
        return Err(anyhow!("Recurring bill {} not found", id));
    }
    let enabled: i64 =
        conn.query_row("SELECT enabled FROM recurring WHERE id=?1", params![id], |r| {
            r.get(0)
        })?;
    println!(
        "Recurring bill {} {}",
        id,
        if enabled != 0 { "enabled" } else { "disabled" }
    );
    Ok(())
}
