// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TxType;
use crate::utils::{
    apply_category_rules, id_for_category, id_for_merchant_or_insert, parse_amount, parse_date,
    parse_tags, register_tags,
};
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use rusqlite::{Connection, params};
use std::collections::{HashMap, hash_map::Entry};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => import_transactions(conn, sub),
        _ => Ok(()),
    }
}

/// Columns: date,type,amount,category,account,merchant,tags,notes,currency.
/// The whole file is imported in one SQLite transaction; any bad row aborts it.
fn import_transactions(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = conn.transaction()?;
    let mut account_cache: HashMap<String, (i64, String)> = HashMap::new();
    let mut category_cache: HashMap<String, i64> = HashMap::new();
    let mut imported = 0usize;

    for (idx, result) in rdr.records().enumerate() {
        let line = idx + 2;
        let rec = result?;
        let field = |i: usize| rec.get(i).map(str::trim).filter(|s| !s.is_empty());

        let date_raw = field(0).with_context(|| format!("line {}: date missing", line))?;
        let kind = field(1)
            .with_context(|| format!("line {}: type missing", line))?
            .parse::<TxType>()
            .with_context(|| format!("line {}", line))?;
        let amount_raw = field(2).with_context(|| format!("line {}: amount missing", line))?;
        let category = field(3);
        let account = field(4).with_context(|| format!("line {}: account missing", line))?;
        let merchant = field(5);
        let tags = field(6).map(parse_tags).unwrap_or_default();
        let notes = field(7).map(str::to_string);
        let csv_currency = field(8);

        let date = parse_date(date_raw).with_context(|| format!("line {}", line))?;
        let amount = parse_amount(amount_raw).with_context(|| format!("line {}", line))?;

        let (acct_id, account_currency) = match account_cache.entry(account.to_string()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                let found: (i64, String) = tx
                    .query_row(
                        "SELECT id, currency FROM accounts WHERE name=?1",
                        params![account],
                        |r| Ok((r.get(0)?, r.get(1)?)),
                    )
                    .with_context(|| format!("line {}: account '{}' not found", line, account))?;
                entry.insert(found).clone()
            }
        };
        if let Some(ccy) = csv_currency {
            if !ccy.eq_ignore_ascii_case(&account_currency) {
                return Err(anyhow!(
                    "line {}: currency '{}' does not match account '{}' currency '{}'",
                    line,
                    ccy,
                    account,
                    account_currency
                ));
            }
        }

        let merchant_id = match merchant {
            Some(name) => Some(id_for_merchant_or_insert(&tx, name)?),
            None => None,
        };
        let cat_id = match category {
            Some(name) => Some(match category_cache.entry(name.to_string()) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => *entry.insert(id_for_category(&tx, name)?),
            }),
            None if kind != TxType::Transfer => {
                apply_category_rules(&tx, merchant, notes.as_deref())?
            }
            None => None,
        };

        tx.execute(
            "INSERT INTO transactions(date, account_id, type, amount, currency, category_id, merchant_id, tags, notes) \
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
            params![
                date.to_string(),
                acct_id,
                kind.as_str(),
                amount.to_string(),
                account_currency,
                cat_id,
                merchant_id,
                if tags.is_empty() { None } else { Some(tags.join(",")) },
                notes
            ],
        )?;
        register_tags(&tx, &tags)?;
        imported += 1;
    }
    tx.commit()?;
    tracing::info!(path, imported, "transactions imported");
    println!("Imported {} transactions from {}", imported, path);
    Ok(())
}
