// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Once;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::error::InputError;

static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());
static COLOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

static TRACING_INIT: Once = Once::new();

/// Installs the stderr subscriber. `MONEYDASH_LOG` takes `EnvFilter` syntax.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_from_env("MONEYDASH_LOG")
            .unwrap_or_else(|_| EnvFilter::new("moneydash=warn"));
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| InputError::Date(s.to_string()).into())
}

/// Accepts `YYYY-M` or `YYYY-MM` and returns the zero-padded `YYYY-MM` key
/// budgets and month filters are stored under.
pub fn parse_month(s: &str) -> Result<String> {
    let s = s.trim();
    let first = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .map_err(|_| InputError::Month(s.to_string()))?;
    Ok(first.format("%Y-%m").to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    let s = s.trim();
    s.parse::<Decimal>()
        .map_err(|_| InputError::Decimal(s.to_string()).into())
}

/// Ledger amounts are magnitudes; direction comes from the transaction type.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    if d.is_sign_negative() && !d.is_zero() {
        return Err(InputError::NegativeAmount(s.trim().to_string()).into());
    }
    Ok(d)
}

pub fn parse_currency(s: &str) -> Result<String> {
    let ccy = s.trim().to_uppercase();
    if !CURRENCY_RE.is_match(&ccy) {
        return Err(InputError::Currency(s.trim().to_string()).into());
    }
    Ok(ccy)
}

pub fn parse_color(s: &str) -> Result<String> {
    let c = s.trim();
    if !COLOR_RE.is_match(c) {
        return Err(InputError::Color(c.to_string()).into());
    }
    Ok(c.to_uppercase())
}

/// Comma separated tags, trimmed, empties dropped.
pub fn parse_tags(s: &str) -> Vec<String> {
    s.split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

pub fn normalize_merchant(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, d)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn id_for_account(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM accounts WHERE name=?1")?;
    let id: i64 = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Account '{}' not found", name))?;
    Ok(id)
}

pub fn id_for_category(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM categories WHERE name=?1")?;
    let id: i64 = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Category '{}' not found", name))?;
    Ok(id)
}

/// Looks a merchant up by normalized name, creating it on first use.
pub fn id_for_merchant_or_insert(conn: &Connection, name: &str) -> Result<i64> {
    let normalized = normalize_merchant(name);
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM merchants WHERE normalized_name=?1",
            params![normalized],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute(
        "INSERT INTO merchants(name, normalized_name) VALUES (?1, ?2)",
        params![name.trim(), normalized],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Adds transaction tags to the registry; existing entries keep their color.
pub fn register_tags(conn: &Connection, tags: &[String]) -> Result<()> {
    for tag in tags {
        conn.execute(
            "INSERT OR IGNORE INTO tags(name) VALUES (?1)",
            params![tag],
        )?;
    }
    Ok(())
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn get_base_currency(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, "base_currency")?.unwrap_or_else(|| "USD".to_string()))
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// First matching rule (newest wins) against "merchant notes". Patterns that
/// no longer compile are skipped.
pub fn apply_category_rules(
    conn: &Connection,
    merchant: Option<&str>,
    notes: Option<&str>,
) -> Result<Option<i64>> {
    let hay = [merchant, notes]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    if hay.is_empty() {
        return Ok(None);
    }
    let mut stmt = conn.prepare("SELECT pattern, category_id FROM rules ORDER BY id DESC")?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let pat: String = r.get(0)?;
        let cat: i64 = r.get(1)?;
        if let Ok(re) = Regex::new(&pat) {
            if re.is_match(&hay) {
                tracing::debug!(pattern = %pat, category_id = cat, "category rule matched");
                return Ok(Some(cat));
            }
        }
    }
    Ok(None)
}
