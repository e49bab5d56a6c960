// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

use crate::summary::MAX_LOOKBACK_DAYS;

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON document per line"),
    )
}

fn report_args(cmd: Command) -> Command {
    json_flags(
        cmd.arg(
            Arg::new("as_of")
                .long("as-of")
                .help("Reference date YYYY-MM-DD (default: today)"),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .requires("to")
                .help("Breakdown window start YYYY-MM-DD"),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .requires("from")
                .help("Breakdown window end YYYY-MM-DD"),
        )
        .arg(
            Arg::new("lookback")
                .long("lookback")
                .value_parser(value_parser!(u32).range(1..=MAX_LOOKBACK_DAYS as i64))
                .help("Trend length in days"),
        )
        .arg(
            Arg::new("budget_default")
                .long("budget-default")
                .help("Budget limit used when no budget is set for the month"),
        ),
    )
}

pub fn build_cli() -> Command {
    Command::new("moneydash")
        .version(clap::crate_version!())
        .about("Personal finance dashboard: ledger, budgets and KPI reports")
        .subcommand(Command::new("init").about("Create the ledger database"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .value_parser(["cash", "bank", "card", "wallet"]),
                        )
                        .arg(Arg::new("currency").long("currency").required(true))
                        .arg(Arg::new("starting_balance").long("starting-balance")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true))),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("kind").long("kind").default_value("expense"))
                        .arg(Arg::new("color").long("color").help("#RRGGBB")),
                )
                .subcommand(Command::new("list"))
                .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true))),
        )
        .subcommand(
            Command::new("merchant")
                .about("Manage merchants")
                .subcommand(Command::new("add").arg(Arg::new("name").long("name").required(true)))
                .subcommand(json_flags(Command::new("list"))),
        )
        .subcommand(
            Command::new("tag")
                .about("Tag registry")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("color").long("color").help("#RRGGBB")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true))),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and list transactions")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(Arg::new("account").long("account").required(true))
                        .arg(Arg::new("type").long("type").default_value("expense"))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("merchant").long("merchant"))
                        .arg(Arg::new("tags").long("tags").help("Comma separated"))
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("month").long("month"))
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly budget limits per category")
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("month").long("month").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("limit").long("limit").required(true)),
                )
                .subcommand(Command::new("list").arg(Arg::new("month").long("month")))
                .subcommand(
                    Command::new("rm")
                        .arg(Arg::new("month").long("month").required(true))
                        .arg(Arg::new("category").long("category").required(true)),
                ),
        )
        .subcommand(
            Command::new("recurring")
                .about("Recurring bills")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("frequency").long("frequency").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("next_run").long("next-run").required(true))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("account").long("account")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("toggle").arg(
                        Arg::new("id")
                            .long("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            Command::new("goal")
                .about("Savings goals")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("target").long("target").required(true))
                        .arg(Arg::new("saved").long("saved").default_value("0"))
                        .arg(
                            Arg::new("target_date")
                                .long("target-date")
                                .help("YYYY-MM-DD"),
                        )
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("description").long("description")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("update")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("saved")
                                .long("saved")
                                .conflicts_with("contribute")
                                .help("Replace the saved amount"),
                        )
                        .arg(
                            Arg::new("contribute")
                                .long("contribute")
                                .help("Add to the saved amount"),
                        )
                        .arg(Arg::new("target").long("target"))
                        .arg(Arg::new("target_date").long("target-date"))
                        .arg(Arg::new("description").long("description")),
                )
                .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true))),
        )
        .subcommand(
            Command::new("rules")
                .about("Regex rules assigning categories to new transactions")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("pattern").long("pattern").required(true))
                        .arg(Arg::new("category").long("category").required(true)),
                )
                .subcommand(Command::new("list"))
                .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true))),
        )
        .subcommand(
            Command::new("report")
                .about("Dashboard reports")
                .subcommand(report_args(
                    Command::new("overview").about("KPIs, trend, categories and upcoming bills"),
                ))
                .subcommand(report_args(Command::new("kpis")))
                .subcommand(report_args(Command::new("trend")))
                .subcommand(report_args(
                    Command::new("categories").arg(
                        Arg::new("all")
                            .long("all")
                            .action(ArgAction::SetTrue)
                            .help("Show every category instead of the legend top entries"),
                    ),
                )),
        )
        .subcommand(
            Command::new("import").about("Import data").subcommand(
                Command::new("transactions").arg(Arg::new("path").required(true)),
            ),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("transactions")
                    .arg(Arg::new("format").long("format").default_value("csv"))
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(
            Command::new("config")
                .about("Report settings")
                .subcommand(Command::new("get").arg(Arg::new("key")))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check ledger consistency"))
}
