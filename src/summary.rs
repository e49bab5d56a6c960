// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Dashboard aggregation: KPIs, the daily spending trend and the
//! per-category expense breakdown.
//!
//! Everything here is a pure function of the transactions handed in, the
//! optional reporting window and the reference date. Nothing reads the clock.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::error::InputError;
use crate::models::{
    Budget, Category, CategorySummary, DashboardOverview, Kpi, RecurringRule, ReportWindow,
    Transaction, Trend, TrendPoint, TxType, UpcomingBill,
};

pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;
/// Ten years of daily points.
pub const MAX_LOOKBACK_DAYS: u32 = 3660;
pub const UPCOMING_BILLS_LIMIT: usize = 3;

pub const LABEL_SPEND: &str = "This Month Spend";
pub const LABEL_INCOME: &str = "Income";
pub const LABEL_NET: &str = "Net Income";
pub const LABEL_BUDGET_REMAINING: &str = "Budget Remaining";
pub const LABEL_SAVINGS_RATE: &str = "Savings Rate";

/// Resolves category ids to display metadata.
pub trait CategoryRegistry {
    fn lookup(&self, id: i64) -> Option<&Category>;
}

impl CategoryRegistry for HashMap<i64, Category> {
    fn lookup(&self, id: i64) -> Option<&Category> {
        self.get(&id)
    }
}

impl CategoryRegistry for Vec<Category> {
    fn lookup(&self, id: i64) -> Option<&Category> {
        self.iter().find(|c| c.id == id)
    }
}

/// Supplies the summed budget limit for a month (`YYYY-MM`).
/// `None` means the registry has no budget items for that month.
pub trait BudgetRegistry {
    fn total_limit(&self, month: &str) -> Option<Decimal>;
}

impl BudgetRegistry for Vec<Budget> {
    fn total_limit(&self, month: &str) -> Option<Decimal> {
        let mut items = self
            .iter()
            .filter(|b| b.month == month)
            .flat_map(|b| b.items.iter())
            .peekable();
        items.peek()?;
        Some(items.map(|i| i.limit).sum())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryConfig {
    pub currency: String,
    /// Applied when the budget registry has nothing for the month.
    pub default_budget_limit: Option<Decimal>,
    pub lookback_days: u32,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            default_budget_limit: None,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

pub fn check_lookback(days: u32) -> Result<u32, InputError> {
    if days == 0 || days > MAX_LOOKBACK_DAYS {
        return Err(InputError::Lookback {
            got: days,
            max: MAX_LOOKBACK_DAYS,
        });
    }
    Ok(days)
}

/// Half-up (away from zero) rounding to cents.
pub fn round_money(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Month-to-date window ending at `now`.
pub fn month_to_date(now: NaiveDate) -> ReportWindow {
    ReportWindow::new(month_start(now), now)
}

/// The matching span of the previous month: its first day up to the same
/// day-of-month as `now`, clamped to the previous month's last day.
pub fn prior_month_span(now: NaiveDate) -> ReportWindow {
    let prior_end_of_month = month_start(now) - Duration::days(1);
    let prior_start = month_start(prior_end_of_month);
    let same_day = prior_start + Duration::days(now.day0() as i64);
    ReportWindow::new(prior_start, same_day.min(prior_end_of_month))
}

#[derive(Debug, Clone, Copy, Default)]
struct PeriodMetrics {
    spend: Decimal,
    income: Decimal,
    net: Decimal,
    budget_remaining: Decimal,
    savings_rate: Decimal,
}

pub struct FinancialSummaryEngine<'a> {
    config: SummaryConfig,
    categories: &'a dyn CategoryRegistry,
    budgets: &'a dyn BudgetRegistry,
}

impl<'a> FinancialSummaryEngine<'a> {
    pub fn new(
        config: SummaryConfig,
        categories: &'a dyn CategoryRegistry,
        budgets: &'a dyn BudgetRegistry,
    ) -> Self {
        Self {
            config,
            categories,
            budgets,
        }
    }

    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    /// Budget limit for the month containing `date`.
    pub fn budget_limit(&self, date: NaiveDate) -> Decimal {
        let month = month_key(date);
        match self.budgets.total_limit(&month) {
            Some(limit) => limit,
            None => {
                debug!(%month, default = ?self.config.default_budget_limit, "no budget items for month");
                self.config.default_budget_limit.unwrap_or(Decimal::ZERO)
            }
        }
    }

    fn period_metrics(&self, transactions: &[Transaction], window: ReportWindow) -> PeriodMetrics {
        let mut spend = Decimal::ZERO;
        let mut income = Decimal::ZERO;
        for tx in transactions.iter().filter(|t| window.contains(t.date)) {
            match tx.r#type {
                TxType::Expense => spend += tx.amount,
                TxType::Income => income += tx.amount,
                TxType::Transfer => {}
            }
        }
        let net = income - spend;
        let savings_rate = if income > Decimal::ZERO {
            net.checked_div(income)
                .map(|r| r * Decimal::ONE_HUNDRED)
                .unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };
        PeriodMetrics {
            spend,
            income,
            net,
            budget_remaining: self.budget_limit(window.date_to) - spend,
            savings_rate,
        }
    }

    /// The five dashboard KPIs for the month to date, each compared against
    /// the same span of the previous month.
    pub fn compute_kpis(&self, transactions: &[Transaction], now: NaiveDate) -> Vec<Kpi> {
        let current = self.period_metrics(transactions, month_to_date(now));
        let baseline = self.period_metrics(transactions, prior_month_span(now));
        let ccy = Some(self.config.currency.as_str());
        vec![
            kpi(LABEL_SPEND, current.spend, baseline.spend, ccy),
            kpi(LABEL_INCOME, current.income, baseline.income, ccy),
            kpi(LABEL_NET, current.net, baseline.net, ccy),
            kpi(
                LABEL_BUDGET_REMAINING,
                current.budget_remaining,
                baseline.budget_remaining,
                ccy,
            ),
            kpi(LABEL_SAVINGS_RATE, current.savings_rate, baseline.savings_rate, None),
        ]
    }

    /// Dense daily expense series of `lookback_days` points ending at `now`.
    pub fn compute_trend(
        &self,
        transactions: &[Transaction],
        now: NaiveDate,
        lookback_days: u32,
    ) -> Vec<TrendPoint> {
        let mut by_day: HashMap<NaiveDate, Decimal> = HashMap::new();
        for tx in transactions.iter().filter(|t| t.r#type == TxType::Expense) {
            *by_day.entry(tx.date).or_insert(Decimal::ZERO) += tx.amount;
        }
        (0..lookback_days as i64)
            .rev()
            .filter_map(|back| now.checked_sub_signed(Duration::days(back)))
            .map(|day| {
                let value = by_day.get(&day).copied().unwrap_or(Decimal::ZERO);
                TrendPoint {
                    date: day.format("%Y-%m-%d").to_string(),
                    value: round_money(value),
                    label: day.format("%b %d").to_string(),
                }
            })
            .collect()
    }

    /// Expense distribution across categories, largest first. Percentages
    /// are taken against every expense in the window, categorized or not.
    pub fn compute_category_breakdown(
        &self,
        transactions: &[Transaction],
        now: NaiveDate,
        window: Option<ReportWindow>,
    ) -> Vec<CategorySummary> {
        let window = window.unwrap_or_else(|| month_to_date(now));
        let mut total = Decimal::ZERO;
        let mut index: HashMap<i64, usize> = HashMap::new();
        let mut groups: Vec<(i64, Decimal, usize)> = Vec::new();

        for tx in transactions
            .iter()
            .filter(|t| t.r#type == TxType::Expense && window.contains(t.date))
        {
            total += tx.amount;
            let Some(cid) = tx.category_id else {
                continue;
            };
            let slot = *index.entry(cid).or_insert_with(|| {
                groups.push((cid, Decimal::ZERO, 0));
                groups.len() - 1
            });
            groups[slot].1 += tx.amount;
            groups[slot].2 += 1;
        }

        let mut rows: Vec<CategorySummary> = groups
            .into_iter()
            .map(|(cid, sum, count)| {
                let category = self.categories.lookup(cid);
                let percentage = if total > Decimal::ZERO {
                    sum.checked_div(total)
                        .map(|r| round_money(r * Decimal::ONE_HUNDRED))
                        .unwrap_or(Decimal::ZERO)
                } else {
                    Decimal::ZERO
                };
                CategorySummary {
                    category_id: cid,
                    category_name: category.map(|c| c.name.clone()),
                    amount: round_money(sum),
                    percentage,
                    transaction_count: count,
                    color: category.and_then(|c| c.color.clone()),
                }
            })
            .filter(|row| row.amount > Decimal::ZERO)
            .collect();
        rows.sort_by(|a, b| b.amount.cmp(&a.amount));
        debug!(
            from = %window.date_from,
            to = %window.date_to,
            rows = rows.len(),
            "category breakdown computed"
        );
        rows
    }

    /// Full dashboard payload. The breakdown uses `window` when given,
    /// otherwise the month to date.
    pub fn compute_overview(
        &self,
        transactions: &[Transaction],
        now: NaiveDate,
        window: Option<ReportWindow>,
        bills: &[RecurringRule],
    ) -> DashboardOverview {
        DashboardOverview {
            kpis: self.compute_kpis(transactions, now),
            trend: self.compute_trend(transactions, now, self.config.lookback_days),
            categories: self.compute_category_breakdown(transactions, now, window),
            upcoming_bills: upcoming_bills(bills, now),
        }
    }
}

fn kpi(label: &str, current: Decimal, baseline: Decimal, currency: Option<&str>) -> Kpi {
    let money = currency.is_some();
    let (value, diff) = if money {
        (round_money(current), round_money(current - baseline))
    } else {
        (current, current - baseline)
    };
    let trend = match current.cmp(&baseline) {
        std::cmp::Ordering::Greater => Trend::Up,
        std::cmp::Ordering::Less => Trend::Down,
        std::cmp::Ordering::Equal => Trend::Neutral,
    };
    let diff_percent = if baseline.is_zero() {
        None
    } else {
        (current - baseline)
            .checked_div(baseline.abs())
            .map(|r| round_money(r * Decimal::ONE_HUNDRED))
    };
    Kpi {
        label: label.to_string(),
        value,
        currency: currency.map(str::to_string),
        trend,
        diff: Some(diff),
        diff_percent,
    }
}

/// Enabled rules due on or after `now`, soonest first.
pub fn upcoming_bills(rules: &[RecurringRule], now: NaiveDate) -> Vec<UpcomingBill> {
    let mut due: Vec<&RecurringRule> = rules
        .iter()
        .filter(|r| r.enabled && r.next_run >= now)
        .collect();
    due.sort_by_key(|r| r.next_run);
    due.into_iter()
        .take(UPCOMING_BILLS_LIMIT)
        .map(|r| UpcomingBill {
            id: r.id,
            name: r.name.clone(),
            frequency: r.frequency,
            amount: r.amount,
            next_run: r.next_run,
        })
        .collect()
}
