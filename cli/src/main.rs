mod args;
mod commands;
mod global_settings;
mod inputs;

use crate::global_settings::GlobalSettings;
use anyhow::{Result, anyhow};
use clap::ArgMatches;

fn required<'a>(args: &'a ArgMatches, id: &str) -> Result<&'a str> {
    args.get_one::<String>(id)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing argument {id}"))
}

fn many<'a>(args: &'a ArgMatches, id: &str) -> Vec<&'a str> {
    args.get_many::<String>(id)
        .map(|v| v.map(String::as_str).collect())
        .unwrap_or_default()
}

fn main() -> Result<()> {
    env_logger::init();

    let args = args::build_cli().get_matches();
    let settings = GlobalSettings::new(&args);
    log::debug!("dates={} colsep={:?}", settings.dates, settings.colsep);

    let output = match args.subcommand() {
        Some(("parse", sub)) => {
            commands::parse(&many(sub, "INTERVALS"), &settings)?
        }
        Some(("relation", sub)) => commands::relation(
            required(sub, "FIRST")?,
            required(sub, "SECOND")?,
            &settings,
        )?,
        Some(("subtract", sub)) => commands::subtract(
            required(sub, "FIRST")?,
            required(sub, "SECOND")?,
            &settings,
        )?,
        Some(("intersect", sub)) => commands::intersect(
            required(sub, "FIRST")?,
            required(sub, "SECOND")?,
            &settings,
        )?,
        Some(("containers", sub)) => {
            commands::containers(&many(sub, "INTERVALS"), &settings)?
        }
        Some(("zip", sub)) => {
            commands::zip(&many(sub, "timeline"), &settings)?
        }
        Some(("merge", sub)) => commands::merge(
            &many(sub, "timeline"),
            sub.get_flag("simplify"),
            &settings,
        )?,
        Some(("at", sub)) => {
            let specs = many(sub, "timeline");
            let merged = specs.join(";");
            commands::value_at(&merged, required(sub, "TIME")?, &settings)?
        }
        Some(("fill", sub)) => {
            let specs = many(sub, "timeline");
            let merged = specs.join(";");
            commands::fill(
                &merged,
                required(sub, "RANGE")?,
                required(sub, "VALUE")?,
                &settings,
            )?
        }
        Some((name, _)) => return Err(anyhow!("Unknown command {name}")),
        None => return Err(anyhow!("No command given")),
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
