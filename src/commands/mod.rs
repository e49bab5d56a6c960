// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod categories;
pub mod merchants;
pub mod transactions;
pub mod budgets;
pub mod recurring;
pub mod rules;
pub mod goals;
pub mod tags;
pub mod reports;
pub mod importer;
pub mod exporter;
pub mod config;
pub mod doctor;
