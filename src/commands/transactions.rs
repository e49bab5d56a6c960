// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TxType;
use crate::utils::{
    apply_category_rules, id_for_account, id_for_category, id_for_merchant_or_insert,
    maybe_print_json, parse_amount, parse_date, parse_month, parse_tags, pretty_table, register_tags,
};
use anyhow::Result;
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let account_name = sub.get_one::<String>("account").unwrap().trim();
    let kind: TxType = sub.get_one::<String>("type").unwrap().parse()?;
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let merchant = sub
        .get_one::<String>("merchant")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());
    let note = sub.get_one::<String>("note").map(|s| s.to_string());
    let tags = sub
        .get_one::<String>("tags")
        .map(|s| parse_tags(s))
        .unwrap_or_default();

    let account_id = id_for_account(conn, account_name)?;
    let currency: String = conn.query_row(
        "SELECT currency FROM accounts WHERE id=?1",
        params![account_id],
        |r| r.get(0),
    )?;
    let merchant_id = match merchant {
        Some(name) => Some(id_for_merchant_or_insert(conn, name)?),
        None => None,
    };
    let category_id = match sub.get_one::<String>("category") {
        Some(cat) => Some(id_for_category(conn, cat.trim())?),
        None if kind != TxType::Transfer => {
            apply_category_rules(conn, merchant, note.as_deref())?
        }
        None => None,
    };

    conn.execute(
        "INSERT INTO transactions(date, account_id, type, amount, currency, category_id, merchant_id, tags, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            date.to_string(),
            account_id,
            kind.as_str(),
            amount.to_string(),
            currency,
            category_id,
            merchant_id,
            if tags.is_empty() { None } else { Some(tags.join(",")) },
            note
        ],
    )?;
    register_tags(conn, &tags)?;
    tracing::info!(%date, kind = kind.as_str(), %amount, account = account_name, "transaction recorded");
    println!(
        "Recorded {} {} on {} (acct: {})",
        kind, amount, date, account_name
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.account.clone(),
                    r.r#type.clone(),
                    r.amount.clone(),
                    r.currency.clone(),
                    r.category.clone(),
                    r.merchant.clone(),
                    r.tags.clone(),
                    r.notes.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "Date", "Account", "Type", "Amount", "CCY", "Category", "Merchant", "Tags",
                    "Notes"
                ],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub date: String,
    pub account: String,
    pub r#type: String,
    pub amount: String,
    pub currency: String,
    pub category: String,
    pub merchant: String,
    pub tags: String,
    pub notes: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let mut sql = String::from(
        "SELECT t.date, a.name, t.type, t.amount, t.currency, c.name, m.name, t.tags, t.notes
         FROM transactions t
         LEFT JOIN accounts a ON t.account_id=a.id
         LEFT JOIN categories c ON t.category_id=c.id
         LEFT JOIN merchants m ON t.merchant_id=m.id
         WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(month) = sub.get_one::<String>("month") {
        sql.push_str(" AND substr(t.date,1,7)=?");
        params_vec.push(parse_month(month)?);
    }
    if let Some(kind) = sub.get_one::<String>("type") {
        let kind: TxType = kind.parse()?;
        sql.push_str(" AND t.type=?");
        params_vec.push(kind.as_str().into());
    }
    if let Some(acct) = sub.get_one::<String>("account") {
        sql.push_str(" AND a.name=?");
        params_vec.push(acct.trim().into());
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        sql.push_str(" AND c.name=?");
        params_vec.push(cat.trim().into());
    }
    sql.push_str(" ORDER BY t.date DESC, t.id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let category: Option<String> = r.get(5)?;
        let merchant: Option<String> = r.get(6)?;
        let tags: Option<String> = r.get(7)?;
        let notes: Option<String> = r.get(8)?;
        data.push(TransactionRow {
            date: r.get(0)?,
            account: r.get::<_, Option<String>>(1)?.unwrap_or_default(),
            r#type: r.get(2)?,
            amount: r.get(3)?,
            currency: r.get(4)?,
            category: category.unwrap_or_default(),
            merchant: merchant.unwrap_or_default(),
            tags: tags.unwrap_or_default(),
            notes: notes.unwrap_or_default(),
        });
    }
    Ok(data)
}
