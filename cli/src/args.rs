use crate::global_settings::GlobalSettings;
use clap::{ArgAction, Command, arg};

fn timelines_arg() -> clap::Arg {
    arg!(-t --timeline <TIMELINE> "A timeline, as \"RANGE=VALUE;RANGE=VALUE\"")
        .action(ArgAction::Append)
        .required(true)
}

pub(crate) fn build_cli() -> Command {
    Command::new("tempora")
        .version("0.1")
        .about("Compute with time intervals and timelines")
        .subcommand_required(true)
        .subcommand_precedence_over_arg(true) // --x val1 val2 subcommand
        .flatten_help(true) // show help for all subcommands
        .arg_required_else_help(true) // show full help if nothing given
        .args(GlobalSettings::cli())
        .subcommand(
            Command::new("parse")
                .about("Show the canonical form and duration of intervals")
                .arg(arg!(<INTERVALS>... "Intervals, as START/END")),
        )
        .subcommand(
            Command::new("relation")
                .about("Show how two intervals are positioned in time")
                .arg(arg!(<FIRST> "First interval"))
                .arg(arg!(<SECOND> "Second interval")),
        )
        .subcommand(
            Command::new("subtract")
                .about("Remove the second interval from the first one")
                .arg(arg!(<FIRST> "First interval"))
                .arg(arg!(<SECOND> "Second interval")),
        )
        .subcommand(
            Command::new("intersect")
                .about("Show the common part of two intervals")
                .arg(arg!(<FIRST> "First interval"))
                .arg(arg!(<SECOND> "Second interval")),
        )
        .subcommand(
            Command::new("containers")
                .about("Show the disjoint intervals that cover all inputs")
                .arg(arg!(<INTERVALS>... "Intervals, as START/END")),
        )
        .subcommand(
            Command::new("zip")
                .about("Show the values of all timelines side by side")
                .arg(timelines_arg()),
        )
        .subcommand(
            Command::new("merge")
                .about("Merge timelines, earlier ones have priority")
                .arg(timelines_arg())
                .arg(arg!(--simplify "Join consecutive ranges with same value")),
        )
        .subcommand(
            Command::new("at")
                .about("Show the value of a timeline at a given time")
                .arg(timelines_arg())
                .arg(arg!(<TIME> "A timestamp, as 2022-01-01T10:00")),
        )
        .subcommand(
            Command::new("fill")
                .about("Add a default value where a timeline has none")
                .arg(timelines_arg())
                .arg(arg!(<RANGE> "Range to fill"))
                .arg(arg!(<VALUE> "Value to use")),
        )
}
