// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::summary::{SummaryConfig, check_lookback};
use crate::utils::{get_setting, parse_amount, parse_currency, pretty_table, set_setting};
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;

pub const KEY_BASE_CURRENCY: &str = "base_currency";
pub const KEY_DEFAULT_BUDGET: &str = "default_budget_limit";
pub const KEY_LOOKBACK: &str = "trend_lookback_days";

const KEYS: [&str; 3] = [KEY_BASE_CURRENCY, KEY_DEFAULT_BUDGET, KEY_LOOKBACK];

impl SummaryConfig {
    /// Engine settings as stored in the ledger, defaults filled in.
    pub fn from_settings(conn: &Connection) -> Result<Self> {
        let mut cfg = SummaryConfig::default();
        if let Some(ccy) = get_setting(conn, KEY_BASE_CURRENCY)? {
            cfg.currency = ccy;
        }
        if let Some(v) = get_setting(conn, KEY_DEFAULT_BUDGET)? {
            cfg.default_budget_limit = Some(
                parse_amount(&v).with_context(|| format!("Setting {}", KEY_DEFAULT_BUDGET))?,
            );
        }
        if let Some(v) = get_setting(conn, KEY_LOOKBACK)? {
            let days = v
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Setting {} = '{}'", KEY_LOOKBACK, v))?;
            cfg.lookback_days =
                check_lookback(days).with_context(|| format!("Setting {}", KEY_LOOKBACK))?;
        }
        Ok(cfg)
    }
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => get(conn, sub)?,
        Some(("set", sub)) => set(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn get(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let cfg = SummaryConfig::from_settings(conn)?;
    let effective = |key: &str| match key {
        KEY_BASE_CURRENCY => cfg.currency.clone(),
        KEY_DEFAULT_BUDGET => cfg
            .default_budget_limit
            .map(|d| d.to_string())
            .unwrap_or_else(|| "(unset)".into()),
        _ => cfg.lookback_days.to_string(),
    };
    let rows: Vec<Vec<String>> = match sub.get_one::<String>("key") {
        Some(key) => {
            let key = validate_key(key)?;
            vec![vec![key.to_string(), effective(key)]]
        }
        None => KEYS
            .iter()
            .map(|k| vec![k.to_string(), effective(k)])
            .collect(),
    };
    println!("{}", pretty_table(&["Key", "Value"], rows));
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let key = validate_key(sub.get_one::<String>("key").unwrap())?;
    let raw = sub.get_one::<String>("value").unwrap();
    let value = match key {
        KEY_BASE_CURRENCY => parse_currency(raw)?,
        KEY_DEFAULT_BUDGET => parse_amount(raw)?.to_string(),
        _ => {
            let days = raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid day count '{}'", raw.trim()))?;
            check_lookback(days)?.to_string()
        }
    };
    set_setting(conn, key, &value)?;
    tracing::info!(key, %value, "setting updated");
    println!("Set {} = {}", key, value);
    Ok(())
}

fn validate_key(key: &str) -> Result<&'static str> {
    let key = key.trim();
    KEYS.iter()
        .copied()
        .find(|k| *k == key)
        .ok_or_else(|| anyhow!("Unknown setting '{}' (known: {})", key, KEYS.join(", ")))
}
