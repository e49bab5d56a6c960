// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Rejections raised while parsing user input, before anything reaches the
/// ledger or the summary engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    Date(String),
    #[error("Invalid month '{0}', expected YYYY-MM")]
    Month(String),
    #[error("Invalid decimal '{0}'")]
    Decimal(String),
    #[error("Amount must not be negative, got {0} (use --type to mark expenses)")]
    NegativeAmount(String),
    #[error("Unknown transaction type '{0}' (use expense|income|transfer)")]
    TxType(String),
    #[error("Unknown category kind '{0}' (use expense|income)")]
    CategoryKind(String),
    #[error("Unknown frequency '{0}' (use daily|weekly|monthly|yearly)")]
    Frequency(String),
    #[error("Invalid currency code '{0}', expected three letters")]
    Currency(String),
    #[error("Invalid color '{0}', expected #RRGGBB")]
    Color(String),
    #[error("Invalid window: {from} is after {to}")]
    Window { from: String, to: String },
    #[error("Lookback must be between 1 and {max} days, got {got}")]
    Lookback { got: u32, max: u32 },
    #[error("Date range ending {end} reaches outside the supported calendar")]
    DateRange { end: String },
}
