// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{load_budgets, load_categories, load_recurring, load_transactions};
use crate::error::InputError;
use crate::models::{CategorySummary, DashboardOverview, Kpi, ReportWindow, TrendPoint, UpcomingBill};
use crate::summary::{
    FinancialSummaryEngine, LABEL_SAVINGS_RATE, SummaryConfig, check_lookback, prior_month_span,
};
use crate::utils::{fmt_money, maybe_print_json, parse_amount, parse_date, pretty_table};
use anyhow::Result;
use chrono::{Duration, NaiveDate};
use rusqlite::Connection;
use tracing::info;

/// Pie-chart legend size; the computed breakdown itself is never cut.
pub const LEGEND_LIMIT: usize = 8;

/// Reference date, optional breakdown window and engine settings for one
/// report invocation.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub now: NaiveDate,
    pub window: Option<ReportWindow>,
    pub config: SummaryConfig,
}

impl ReportRequest {
    pub fn from_args(conn: &Connection, sub: &clap::ArgMatches) -> Result<Self> {
        let now = match sub.get_one::<String>("as_of") {
            Some(s) => parse_date(s)?,
            None => chrono::Local::now().date_naive(),
        };
        let window = match (sub.get_one::<String>("from"), sub.get_one::<String>("to")) {
            (Some(f), Some(t)) => {
                let (from, to) = (parse_date(f)?, parse_date(t)?);
                if from > to {
                    return Err(InputError::Window {
                        from: from.to_string(),
                        to: to.to_string(),
                    }
                    .into());
                }
                Some(ReportWindow::new(from, to))
            }
            _ => None,
        };
        let mut config = SummaryConfig::from_settings(conn)?;
        if let Some(days) = sub.get_one::<u32>("lookback") {
            config.lookback_days = check_lookback(*days)?;
        }
        if let Some(limit) = sub.get_one::<String>("budget_default") {
            config.default_budget_limit = Some(parse_amount(limit)?);
        }
        Ok(Self {
            now,
            window,
            config,
        })
    }

    /// Smallest date range covering the month-to-date KPIs, their prior
    /// month baseline, the trend lookback and the breakdown window.
    pub fn load_range(&self) -> Result<(NaiveDate, NaiveDate), InputError> {
        let mut from = prior_month_span(self.now).date_from;
        let trend_from = self
            .now
            .checked_sub_signed(Duration::days(self.config.lookback_days as i64))
            .ok_or_else(|| InputError::DateRange {
                end: self.now.to_string(),
            })?;
        from = from.min(trend_from);
        let mut to = self.now;
        if let Some(w) = self.window {
            from = from.min(w.date_from);
            to = to.max(w.date_to);
        }
        Ok((from, to))
    }
}

pub fn overview(conn: &Connection, req: &ReportRequest) -> Result<DashboardOverview> {
    let (from, to) = req.load_range()?;
    let transactions = load_transactions(conn, Some(from), Some(to))?;
    let categories = load_categories(conn)?;
    let budgets = load_budgets(conn)?;
    let bills = load_recurring(conn)?;
    info!(
        now = %req.now,
        transactions = transactions.len(),
        lookback = req.config.lookback_days,
        "computing dashboard overview"
    );
    let engine = FinancialSummaryEngine::new(req.config.clone(), &categories, &budgets);
    Ok(engine.compute_overview(&transactions, req.now, req.window, &bills))
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let Some((name, sub)) = m.subcommand() else {
        return Ok(());
    };
    let req = ReportRequest::from_args(conn, sub)?;
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = overview(conn, &req)?;
    let ccy = req.config.currency.as_str();
    match name {
        "overview" => {
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                println!("{}", kpi_table(&data.kpis));
                println!("{}", category_table(&data.categories, ccy, false));
                println!("{}", trend_table(&data.trend));
                println!("{}", bills_table(&data.upcoming_bills, ccy));
            }
        }
        "kpis" => {
            if !maybe_print_json(json_flag, jsonl_flag, &data.kpis)? {
                println!("{}", kpi_table(&data.kpis));
            }
        }
        "trend" => {
            if !maybe_print_json(json_flag, jsonl_flag, &data.trend)? {
                println!("{}", trend_table(&data.trend));
            }
        }
        "categories" => {
            if !maybe_print_json(json_flag, jsonl_flag, &data.categories)? {
                println!(
                    "{}",
                    category_table(&data.categories, ccy, sub.get_flag("all"))
                );
            }
        }
        _ => {}
    }
    Ok(())
}

/// Savings rate is kept at full precision and shown with one decimal.
pub fn format_kpi_value(kpi: &Kpi) -> String {
    match &kpi.currency {
        Some(ccy) => fmt_money(&kpi.value, ccy),
        None if kpi.label == LABEL_SAVINGS_RATE => format!("{:.1}%", kpi.value),
        None => kpi.value.to_string(),
    }
}

fn kpi_table(kpis: &[Kpi]) -> comfy_table::Table {
    let rows = kpis
        .iter()
        .map(|k| {
            let diff = match (&k.diff, k.currency.is_some()) {
                (Some(d), true) => format!("{:+.2}", d),
                (Some(d), false) => format!("{:+.1}", d),
                (None, _) => String::new(),
            };
            let pct = k
                .diff_percent
                .map(|p| format!("{:+.1}%", p))
                .unwrap_or_else(|| "n/a".into());
            vec![
                k.label.clone(),
                format_kpi_value(k),
                k.trend.as_str().to_string(),
                diff,
                pct,
            ]
        })
        .collect();
    pretty_table(&["KPI", "Value", "Trend", "Diff", "Diff %"], rows)
}

/// Legend rows: the first `LEGEND_LIMIT` entries unless `all` is set.
pub fn legend(categories: &[CategorySummary], all: bool) -> &[CategorySummary] {
    if all {
        categories
    } else {
        &categories[..categories.len().min(LEGEND_LIMIT)]
    }
}

fn category_table(categories: &[CategorySummary], ccy: &str, all: bool) -> comfy_table::Table {
    let rows = legend(categories, all)
        .iter()
        .map(|c| {
            vec![
                c.category_name
                    .clone()
                    .unwrap_or_else(|| format!("(unknown #{})", c.category_id)),
                fmt_money(&c.amount, ccy),
                format!("{:.2}%", c.percentage),
                c.transaction_count.to_string(),
                c.color.clone().unwrap_or_default(),
            ]
        })
        .collect();
    pretty_table(&["Category", "Spent", "Share", "Txns", "Color"], rows)
}

fn trend_table(trend: &[TrendPoint]) -> comfy_table::Table {
    let rows = trend
        .iter()
        .map(|p| vec![p.date.clone(), p.label.clone(), format!("{:.2}", p.value)])
        .collect();
    pretty_table(&["Date", "Day", "Spend"], rows)
}

fn bills_table(bills: &[UpcomingBill], ccy: &str) -> comfy_table::Table {
    let rows = bills
        .iter()
        .map(|b| {
            vec![
                b.name.clone(),
                b.frequency.as_str().to_string(),
                fmt_money(&b.amount, ccy),
                b.next_run.to_string(),
            ]
        })
        .collect();
    pretty_table(&["Upcoming Bill", "Frequency", "Amount", "Due"], rows)
}
