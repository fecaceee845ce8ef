// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn record_args(cmd: Command, adding: bool) -> Command {
    cmd.arg(
        Arg::new("name")
            .long("name")
            .required(adding)
            .help("Display name"),
    )
    .arg(
        Arg::new("type")
            .long("type")
            .value_parser(["subscription", "credit_card", "bill", "other"])
            .help("subscription | credit_card | bill | other"),
    )
    .arg(Arg::new("category").long("category").help(
        "Banking | Entertainment | Bills | SaaS | Insurance | Shopping | Other",
    ))
    .arg(
        Arg::new("frequency")
            .long("frequency")
            .value_parser(["monthly", "weekly", "yearly", "custom"])
            .help("Billing frequency"),
    )
    .arg(Arg::new("day").long("day").help("Day of month, 1-31"))
    .arg(Arg::new("amount").long("amount").help("Amount per period"))
    .arg(Arg::new("currency").long("currency").help("Currency code"))
    .arg(Arg::new("payment_method").long("payment-method"))
    .arg(
        Arg::new("reminders")
            .long("reminders")
            .help("Days before payment to remind, e.g. 7,1,0"),
    )
    .arg(Arg::new("notes").long("notes"))
    .arg(
        Arg::new("statement_day")
            .long("statement-day")
            .help("Credit card statement day, 1-31"),
    )
    .arg(
        Arg::new("due_day")
            .long("due-day")
            .help("Credit card due day, 1-31"),
    )
    .arg(Arg::new("start_date").long("start-date").help("YYYY-MM-DD"))
    .arg(Arg::new("end_date").long("end-date").help("YYYY-MM-DD"))
}

fn filter_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("category")
            .long("category")
            .action(ArgAction::Append)
            .help("Only these categories (repeatable)"),
    )
    .arg(
        Arg::new("upcoming")
            .long("upcoming")
            .value_parser(value_parser!(u32))
            .help("Hide events more than N days after today"),
    )
    .arg(
        Arg::new("payments_only")
            .long("payments-only")
            .action(ArgAction::SetTrue)
            .help("Only payment and due events"),
    )
    .arg(
        Arg::new("search")
            .long("search")
            .help("Case-insensitive title search"),
    )
    .arg(
        Arg::new("today")
            .long("today")
            .help("Reference date for --upcoming (YYYY-MM-DD)"),
    )
}

fn window_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("month")
            .long("month")
            .conflicts_with_all(["from", "to"])
            .help("Calendar month YYYY-MM (six-week grid)"),
    )
    .arg(
        Arg::new("from")
            .long("from")
            .requires("to")
            .help("Window start YYYY-MM-DD"),
    )
    .arg(
        Arg::new("to")
            .long("to")
            .requires("from")
            .help("Window end YYYY-MM-DD"),
    )
}

pub fn build_cli() -> Command {
    Command::new("paydays")
        .version(clap::crate_version!())
        .about("Recurring payments, card statements and due dates on a calendar")
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("sub")
                .about("Manage subscriptions, cards and bills")
                .subcommand(record_args(
                    Command::new("add").about("Add a record"),
                    true,
                ))
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List records in display order")
                        .arg(
                            Arg::new("all")
                                .long("all")
                                .action(ArgAction::SetTrue)
                                .help("Include inactive records"),
                        )
                        .arg(Arg::new("category").long("category")),
                ))
                .subcommand(json_flags(
                    Command::new("show")
                        .about("Show one record")
                        .arg(Arg::new("id").long("id").required(true)),
                ))
                .subcommand(
                    record_args(Command::new("edit").about("Change fields of a record"), false)
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(
                            Arg::new("active")
                                .long("active")
                                .value_parser(value_parser!(bool))
                                .help("true | false"),
                        ),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a record")
                        .arg(Arg::new("id").long("id").required(true)),
                )
                .subcommand(
                    Command::new("duplicate")
                        .about("Copy a record as a new one")
                        .arg(Arg::new("id").long("id").required(true)),
                )
                .subcommand(
                    Command::new("toggle")
                        .about("Flip the active flag")
                        .arg(Arg::new("id").long("id").required(true)),
                )
                .subcommand(json_flags(
                    Command::new("search")
                        .about("Find records by name")
                        .arg(Arg::new("query").long("query").required(true)),
                ))
                .subcommand(
                    Command::new("move")
                        .about("Reorder: place a record before or after another")
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(Arg::new("target").long("target").required(true))
                        .arg(
                            Arg::new("position")
                                .long("position")
                                .value_parser(["before", "after"])
                                .default_value("before"),
                        ),
                ),
        )
        .subcommand(json_flags(filter_args(window_args(
            Command::new("calendar")
                .about("Payments, statements and due dates in a window")
                .arg(
                    Arg::new("all_days")
                        .long("all-days")
                        .action(ArgAction::SetTrue)
                        .help("Also print days without events"),
                ),
        ))))
        .subcommand(json_flags(
            Command::new("summary")
                .about("Monthly-equivalent cost per currency and category")
                .arg(Arg::new("currency").long("currency").help("Only this currency")),
        ))
        .subcommand(json_flags(
            Command::new("remind")
                .about("Reminders due on a date")
                .arg(Arg::new("date").long("date").help("YYYY-MM-DD, default today"))
                .arg(
                    Arg::new("mark")
                        .long("mark")
                        .action(ArgAction::SetTrue)
                        .help("Record the reminders so they are not reported again"),
                ),
        ))
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("subscriptions")
                        .about("JSON backup of every record")
                        .arg(Arg::new("out").long("out").required(true)),
                )
                .subcommand(window_args(
                    Command::new("events")
                        .about("Projected events as CSV or JSON")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .value_parser(["csv", "json"])
                                .default_value("csv"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                )),
        )
        .subcommand(
            Command::new("import").about("Import data").subcommand(
                Command::new("subscriptions")
                    .about("Restore records from a JSON backup")
                    .arg(Arg::new("path").long("path").required(true)),
            ),
        )
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand(json_flags(Command::new("show").about("Print settings")))
                .subcommand(
                    Command::new("set")
                        .about("Change a setting")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check stored records for problems"))
}
