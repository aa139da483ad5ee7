// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn user_arg() -> Arg {
    Arg::new("user")
        .long("user")
        .help("User name, or 'family' for everyone")
}

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .help("Period as YYYY-MM (default: current month)")
}

fn id_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .required(true)
        .value_parser(value_parser!(i64))
}

fn bool_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_parser(value_parser!(bool))
        .help("true or false")
}

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Pretty JSON output"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("One JSON object per line"),
    )
}

fn view(name: &'static str, about: &'static str) -> Command {
    json_args(Command::new(name).about(about).arg(user_arg()).arg(month_arg()))
}

pub fn build_cli() -> Command {
    Command::new("homefin")
        .about("Household finance tracker: monthly records, debts, payoff suggestions")
        .version(crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("HOMEFIN_DB")
                .help("SQLite database path (default: platform data dir)"),
        )
        .subcommand(Command::new("init").about("Create the database and seed defaults"))
        .subcommand(
            Command::new("user")
                .about("Manage user profiles")
                .subcommand(
                    Command::new("add").arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(Command::new("household").about("Show the Household account"))
                .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true))),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("type").long("type").required(true).help(
                            "Income | Fixed Expense | Utility | Static Loan | Dynamic Debt",
                        ))
                        .arg(
                            Arg::new("static")
                                .long("static")
                                .action(ArgAction::SetTrue)
                                .help("Seed new months with the default amount"),
                        )
                        .arg(
                            Arg::new("individual")
                                .long("individual")
                                .action(ArgAction::SetTrue)
                                .help("One record per user instead of one Household record"),
                        )
                        .arg(
                            Arg::new("once")
                                .long("once")
                                .action(ArgAction::SetTrue)
                                .help("Not recurring"),
                        )
                        .arg(Arg::new("default").long("default")),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(
                    Command::new("update")
                        .arg(id_arg("id"))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("type").long("type"))
                        .arg(bool_arg("recurring"))
                        .arg(bool_arg("static"))
                        .arg(bool_arg("household"))
                        .arg(Arg::new("default").long("default")),
                )
                .subcommand(
                    Command::new("set-default")
                        .about("Set the default amount and mark the category static")
                        .arg(id_arg("id"))
                        .arg(Arg::new("amount").long("amount").required(true)),
                )
                .subcommand(Command::new("rm").arg(id_arg("id"))),
        )
        .subcommand(
            Command::new("record")
                .about("Monthly financial records")
                .subcommand(
                    Command::new("set")
                        .about("Insert or overwrite a user's amount for a category and month")
                        .arg(Arg::new("user").long("user").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(month_arg())
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(json_args(
                    Command::new("list")
                        .arg(Arg::new("month").long("month"))
                        .arg(Arg::new("user").long("user"))
                        .arg(Arg::new("type").long("type")),
                ))
                .subcommand(Command::new("rm").arg(id_arg("id")))
                .subcommand(
                    Command::new("rm-many").arg(
                        Arg::new("ids")
                            .long("ids")
                            .required(true)
                            .value_delimiter(',')
                            .value_parser(value_parser!(i64)),
                    ),
                )
                .subcommand(
                    Command::new("clear")
                        .about("Delete every record of a month")
                        .arg(Arg::new("month").long("month").required(true))
                        .arg(user_arg()),
                )
                .subcommand(json_args(
                    Command::new("months").about("Months that have records"),
                ))
                .subcommand(
                    Command::new("import")
                        .about("Bulk upsert from CSV: month,user,category,type,amount,note")
                        .arg(Arg::new("path").long("path").required(true)),
                ),
        )
        .subcommand(
            Command::new("loan")
                .about("Fixed-payment loans")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("user").long("user").required(true))
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("principal").long("principal").required(true))
                        .arg(Arg::new("remaining").long("remaining"))
                        .arg(Arg::new("rate").long("rate").default_value("0"))
                        .arg(Arg::new("payment").long("payment").required(true))
                        .arg(Arg::new("start").long("start").help("YYYY-MM-DD (default: today)"))
                        .arg(Arg::new("target").long("target").help("Target payoff date YYYY-MM-DD")),
                )
                .subcommand(json_args(Command::new("list").arg(user_arg())))
                .subcommand(
                    Command::new("update")
                        .arg(id_arg("id"))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("principal").long("principal"))
                        .arg(Arg::new("remaining").long("remaining"))
                        .arg(Arg::new("rate").long("rate"))
                        .arg(Arg::new("payment").long("payment"))
                        .arg(Arg::new("target").long("target")),
                )
                .subcommand(Command::new("rm").arg(id_arg("id")))
                .subcommand(view("projection", "Months to payoff for each loan")),
        )
        .subcommand(
            Command::new("debt")
                .about("Revolving debts and their monthly payments")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("user").long("user").required(true))
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("balance").long("balance").required(true))
                        .arg(Arg::new("limit").long("limit").default_value("0"))
                        .arg(Arg::new("minimum").long("minimum").default_value("0"))
                        .arg(Arg::new("rate").long("rate").default_value("0"))
                        .arg(
                            Arg::new("temporary")
                                .long("temporary")
                                .action(ArgAction::SetTrue)
                                .help("Paid in full every month"),
                        ),
                )
                .subcommand(view("list", "Debts with this month's payment"))
                .subcommand(
                    Command::new("update")
                        .arg(id_arg("id"))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("balance").long("balance"))
                        .arg(Arg::new("limit").long("limit"))
                        .arg(Arg::new("minimum").long("minimum"))
                        .arg(Arg::new("rate").long("rate"))
                        .arg(bool_arg("temporary")),
                )
                .subcommand(Command::new("rm").arg(id_arg("id")))
                .subcommand(
                    Command::new("pay")
                        .about("Record this month's payment")
                        .arg(id_arg("id"))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(month_arg())
                        .arg(Arg::new("note").long("note"))
                        .arg(
                            Arg::new("update-balance")
                                .long("update-balance")
                                .action(ArgAction::SetTrue)
                                .help("Reduce the balance by the change in payment"),
                        ),
                )
                .subcommand(
                    Command::new("pay-full")
                        .about("Pay the whole balance and zero it")
                        .arg(id_arg("id"))
                        .arg(month_arg()),
                )
                .subcommand(
                    Command::new("set-balance")
                        .about("Overwrite the current balance")
                        .arg(id_arg("id"))
                        .arg(Arg::new("amount").long("amount").required(true)),
                )
                .subcommand(json_args(Command::new("payments").arg(id_arg("id"))))
                .subcommand(
                    Command::new("rm-payment")
                        .arg(id_arg("id"))
                        .arg(id_arg("payment"))
                        .arg(
                            Arg::new("revert")
                                .long("revert")
                                .action(ArgAction::SetTrue)
                                .help("Add the payment back to the balance"),
                        ),
                ),
        )
        .subcommand(
            Command::new("asset")
                .about("Savings and investments")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("user").long("user").required(true))
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("type").long("type").required(true))
                        .arg(Arg::new("value").long("value").default_value("0"))
                        .arg(Arg::new("cost").long("cost"))
                        .arg(Arg::new("target").long("target"))
                        .arg(Arg::new("contribution").long("contribution").default_value("0"))
                        .arg(Arg::new("shares").long("shares").default_value("0"))
                        .arg(Arg::new("total-units").long("total-units").default_value("0"))
                        .arg(Arg::new("vested-units").long("vested-units").default_value("0")),
                )
                .subcommand(json_args(Command::new("list").arg(user_arg())))
                .subcommand(
                    Command::new("update")
                        .arg(id_arg("id"))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("value").long("value"))
                        .arg(Arg::new("cost").long("cost"))
                        .arg(Arg::new("target").long("target").help("Amount, or 'none' to clear"))
                        .arg(Arg::new("contribution").long("contribution"))
                        .arg(Arg::new("shares").long("shares"))
                        .arg(Arg::new("total-units").long("total-units"))
                        .arg(Arg::new("vested-units").long("vested-units")),
                )
                .subcommand(Command::new("rm").about("Deactivate an asset").arg(id_arg("id")))
                .subcommand(
                    Command::new("tx")
                        .about("Apply a transaction to an asset")
                        .arg(id_arg("id"))
                        .arg(Arg::new("type").long("type").required(true).help(
                            "deposit | withdraw | buy | sell | vest | dividend | contribution",
                        ))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("units").long("units"))
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(json_args(Command::new("txs").arg(id_arg("id"))))
                .subcommand(json_args(Command::new("history").arg(id_arg("id"))))
                .subcommand(json_args(Command::new("summary").arg(user_arg()))),
        )
        .subcommand(
            Command::new("dashboard")
                .about("Derived views")
                .subcommand(view("summary", "Period totals and net cash flow"))
                .subcommand(view("overview", "Debt overview"))
                .subcommand(view("trends", "Twelve months of debt payments"))
                .subcommand(view("compare", "Income and expenses per user"))
                .subcommand(view("suggest", "Where to put this month's surplus"))
                .subcommand(view("breakdown", "Expenses by category"))
                .subcommand(view("net-worth", "Assets minus liabilities")),
        )
        .subcommand(
            Command::new("month")
                .about("Monthly setup workflow")
                .subcommand(view("status", "Setup progress for a month"))
                .subcommand(view("setup", "Categories to fill in for a month"))
                .subcommand(
                    Command::new("start")
                        .about("Seed an empty month from recurring categories")
                        .arg(month_arg()),
                )
                .subcommand(json_args(Command::new("list").about("Months that have records"))),
        )
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set-symbol")
                        .arg(Arg::new("symbol").long("symbol").required(true)),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("records")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv | json"),
                        )
                        .arg(Arg::new("out").long("out").required(true))
                        .arg(Arg::new("month").long("month")),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn db_flag_is_global() {
        let m = build_cli().get_matches_from(["homefin", "month", "start", "--db", "/tmp/x.sqlite"]);
        assert_eq!(m.get_one::<String>("db").map(String::as_str), Some("/tmp/x.sqlite"));
    }
}
