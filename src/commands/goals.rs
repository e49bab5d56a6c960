// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::load_goals;
use crate::utils::{
    fmt_money, get_base_currency, id_for_account, maybe_print_json, parse_amount, parse_date,
    pretty_table,
};
use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let n = conn.execute("DELETE FROM goals WHERE name=?1", params![name])?;
            if n == 0 {
                return Err(anyhow!("Goal '{}' not found", name));
            }
            println!("Removed goal '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

fn positive_target(raw: &str) -> Result<Decimal> {
    let target = parse_amount(raw)?;
    if target.is_zero() {
        return Err(anyhow!("Goal target must be greater than zero"));
    }
    Ok(target)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim();
    if name.is_empty() {
        return Err(anyhow!("Goal name must not be empty"));
    }
    let target = positive_target(sub.get_one::<String>("target").unwrap())?;
    let saved = parse_amount(sub.get_one::<String>("saved").unwrap())?;
    let target_date = match sub.get_one::<String>("target_date") {
        Some(d) => Some(parse_date(d)?),
        None => None,
    };
    let account_id = match sub.get_one::<String>("account") {
        Some(a) => Some(id_for_account(conn, a.trim())?),
        None => None,
    };
    let description = sub.get_one::<String>("description").map(|s| s.trim().to_string());
    conn.execute(
        "INSERT INTO goals(name, target_amount, saved_amount, target_date, account_id, description)
         VALUES (?1,?2,?3,?4,?5,?6)",
        params![
            name,
            target.to_string(),
            saved.to_string(),
            target_date.map(|d| d.to_string()),
            account_id,
            description
        ],
    )
    .with_context(|| format!("Add goal '{}'", name))?;
    println!("Added goal '{}' ({} of {})", name, saved, target);
    Ok(())
}

fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim();
    let current: Option<(i64, String)> = conn
        .query_row(
            "SELECT id, saved_amount FROM goals WHERE name=?1",
            params![name],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;
    let (id, saved_raw) = current.ok_or_else(|| anyhow!("Goal '{}' not found", name))?;

    let mut saved = saved_raw.parse::<Decimal>()?;
    if let Some(s) = sub.get_one::<String>("saved") {
        saved = parse_amount(s)?;
    }
    if let Some(c) = sub.get_one::<String>("contribute") {
        saved += parse_amount(c)?;
    }
    let target = match sub.get_one::<String>("target") {
        Some(t) => Some(positive_target(t)?),
        None => None,
    };
    let target_date = match sub.get_one::<String>("target_date") {
        Some(d) => Some(parse_date(d)?),
        None => None,
    };
    let description = sub.get_one::<String>("description").map(|s| s.trim());

    conn.execute(
        "UPDATE goals SET saved_amount=?1,
                target_amount=COALESCE(?2, target_amount),
                target_date=COALESCE(?3, target_date),
                description=COALESCE(?4, description)
         WHERE id=?5",
        params![
            saved.to_string(),
            target.map(|t| t.to_string()),
            target_date.map(|d| d.to_string()),
            description,
            id
        ],
    )?;
    tracing::info!(goal = name, %saved, "goal updated");
    println!("Updated goal '{}' (saved {})", name, saved);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let goals = load_goals(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &goals)? {
        return Ok(());
    }
    let ccy = get_base_currency(conn)?;
    let data = goals
        .iter()
        .map(|g| {
            vec![
                g.name.clone(),
                fmt_money(&g.saved_amount, &ccy),
                fmt_money(&g.target_amount, &ccy),
                format!("{:.1}%", g.progress()),
                fmt_money(&g.remaining(), &ccy),
                g.target_date.map(|d| d.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Goal", "Saved", "Target", "Progress", "Remaining", "Target Date"],
            data
        )
    );
    Ok(())
}
