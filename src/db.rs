// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::models::{
    Account, Budget, BudgetItem, Category, Goal, Merchant, RecurringRule, Tag, Transaction,
};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Moneydash", "moneydash"));

pub const DB_ENV: &str = "MONEYDASH_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Ok(p) = std::env::var(DB_ENV) {
        if !p.trim().is_empty() {
            return Ok(PathBuf::from(p.trim()));
        }
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("moneydash.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    info!(path = %path.display(), "ledger opened");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS accounts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        type TEXT NOT NULL CHECK(type IN ('cash','bank','card','wallet')),
        currency TEXT NOT NULL,
        starting_balance TEXT NOT NULL DEFAULT '0',
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        kind TEXT NOT NULL DEFAULT 'expense' CHECK(kind IN ('expense','income')),
        color TEXT
    );

    CREATE TABLE IF NOT EXISTS merchants(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        normalized_name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        account_id INTEGER NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('expense','income','transfer')),
        amount TEXT NOT NULL,
        currency TEXT NOT NULL,
        category_id INTEGER,
        merchant_id INTEGER,
        tags TEXT,
        notes TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE CASCADE,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL,
        FOREIGN KEY(merchant_id) REFERENCES merchants(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        month TEXT NOT NULL,
        category_id INTEGER NOT NULL,
        amount TEXT NOT NULL,
        UNIQUE(month, category_id),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS recurring(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        frequency TEXT NOT NULL CHECK(frequency IN ('daily','weekly','monthly','yearly')),
        amount TEXT NOT NULL,
        category_id INTEGER,
        account_id INTEGER,
        next_run TEXT NOT NULL,
        enabled INTEGER NOT NULL DEFAULT 1,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL,
        FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE SET NULL
    );

    CREATE TABLE IF NOT EXISTS goals(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        target_amount TEXT NOT NULL,
        saved_amount TEXT NOT NULL DEFAULT '0',
        target_date TEXT,
        account_id INTEGER,
        description TEXT,
        FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE SET NULL
    );

    CREATE TABLE IF NOT EXISTS tags(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        color TEXT
    );

    CREATE TABLE IF NOT EXISTS rules(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        pattern TEXT NOT NULL,
        category_id INTEGER NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE
    );
    "#,
    )?;
    Ok(())
}

fn decimal_col(r: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    s.parse::<Decimal>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn date_col(r: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let s: String = r.get(idx)?;
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parsed_col<T>(r: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let s: String = r.get(idx)?;
    s.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Transactions dated within `[from, to]`; either bound may be open.
pub fn load_transactions(
    conn: &Connection,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<Transaction>> {
    let from_s = from.map(|d| d.to_string());
    let to_s = to.map(|d| d.to_string());
    let mut stmt = conn.prepare(
        "SELECT id, account_id, type, amount, currency, category_id, merchant_id, tags, date, notes
         FROM transactions
         WHERE (?1 IS NULL OR date >= ?1) AND (?2 IS NULL OR date <= ?2)
         ORDER BY date, id",
    )?;
    let rows = stmt.query_map(params![from_s, to_s], |r| {
        let tags: Option<String> = r.get(7)?;
        Ok(Transaction {
            id: r.get(0)?,
            account_id: r.get(1)?,
            r#type: parsed_col(r, 2)?,
            amount: decimal_col(r, 3)?,
            currency: r.get(4)?,
            category_id: r.get(5)?,
            merchant_id: r.get(6)?,
            tags: tags
                .map(|t| crate::utils::parse_tags(&t))
                .unwrap_or_default(),
            date: date_col(r, 8)?,
            notes: r.get(9)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("Malformed transaction row")?);
    }
    debug!(count = out.len(), ?from, ?to, "transactions loaded");
    Ok(out)
}

pub fn load_categories(conn: &Connection) -> Result<HashMap<i64, Category>> {
    let mut stmt = conn.prepare("SELECT id, name, kind, color FROM categories")?;
    let rows = stmt.query_map([], |r| {
        Ok(Category {
            id: r.get(0)?,
            name: r.get(1)?,
            kind: parsed_col(r, 2)?,
            color: r.get(3)?,
        })
    })?;
    let mut out = HashMap::new();
    for row in rows {
        let c = row.context("Malformed category row")?;
        out.insert(c.id, c);
    }
    Ok(out)
}

/// Budgets grouped by month, months ascending.
pub fn load_budgets(conn: &Connection) -> Result<Vec<Budget>> {
    let mut stmt =
        conn.prepare("SELECT month, category_id, amount FROM budgets ORDER BY month, category_id")?;
    let rows = stmt.query_map([], |r| {
        Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?, decimal_col(r, 2)?))
    })?;
    let mut out: Vec<Budget> = Vec::new();
    for row in rows {
        let (month, category_id, limit) = row.context("Malformed budget row")?;
        let item = BudgetItem { category_id, limit };
        match out.last_mut() {
            Some(b) if b.month == month => b.items.push(item),
            _ => out.push(Budget {
                month,
                items: vec![item],
            }),
        }
    }
    Ok(out)
}

pub fn load_recurring(conn: &Connection) -> Result<Vec<RecurringRule>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, frequency, amount, category_id, account_id, next_run, enabled
         FROM recurring ORDER BY next_run, id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(RecurringRule {
            id: r.get(0)?,
            name: r.get(1)?,
            frequency: parsed_col(r, 2)?,
            amount: decimal_col(r, 3)?,
            category_id: r.get(4)?,
            account_id: r.get(5)?,
            next_run: date_col(r, 6)?,
            enabled: r.get::<_, i64>(7)? != 0,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("Malformed recurring row")?);
    }
    Ok(out)
}

pub fn load_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, type, currency, starting_balance FROM accounts ORDER BY name",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(Account {
            id: r.get(0)?,
            name: r.get(1)?,
            r#type: r.get(2)?,
            currency: r.get(3)?,
            starting_balance: decimal_col(r, 4)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("Malformed account row")?);
    }
    Ok(out)
}

pub fn load_merchants(conn: &Connection) -> Result<Vec<Merchant>> {
    let mut stmt =
        conn.prepare("SELECT id, name, normalized_name FROM merchants ORDER BY normalized_name")?;
    let rows = stmt.query_map([], |r| {
        Ok(Merchant {
            id: r.get(0)?,
            name: r.get(1)?,
            normalized_name: r.get(2)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("Malformed merchant row")?);
    }
    Ok(out)
}

pub fn load_goals(conn: &Connection) -> Result<Vec<Goal>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, target_amount, saved_amount, target_date, account_id, description
         FROM goals ORDER BY target_date IS NULL, target_date, name",
    )?;
    let rows = stmt.query_map([], |r| {
        let target_date = match r.get::<_, Option<String>>(4)? {
            Some(_) => Some(date_col(r, 4)?),
            None => None,
        };
        Ok(Goal {
            id: r.get(0)?,
            name: r.get(1)?,
            target_amount: decimal_col(r, 2)?,
            saved_amount: decimal_col(r, 3)?,
            target_date,
            account_id: r.get(5)?,
            description: r.get(6)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("Malformed goal row")?);
    }
    Ok(out)
}

pub fn load_tags(conn: &Connection) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare("SELECT id, name, color FROM tags ORDER BY name")?;
    let rows = stmt.query_map([], |r| {
        Ok(Tag {
            id: r.get(0)?,
            name: r.get(1)?,
            color: r.get(2)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("Malformed tag row")?);
    }
    Ok(out)
}
