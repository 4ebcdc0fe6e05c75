use crate::global_settings::GlobalSettings;
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDateTime;
use tempora_lib::{DateInterval, Interval, Timeline, times::parse_time_point};

/// Parse an interval given on the command line.  With --dates, the end date
/// is part of the interval.
pub fn parse_interval(text: &str, settings: &GlobalSettings) -> Result<Interval> {
    let interval = if settings.dates {
        *DateInterval::parse(text)?.as_interval()
    } else {
        Interval::parse(text)?
    };
    Ok(interval)
}

pub fn parse_time(text: &str) -> Result<NaiveDateTime> {
    parse_time_point(text.trim())
        .ok_or_else(|| anyhow!("Invalid time point \"{text}\""))
}

/// Parse a timeline given as "RANGE=VALUE;RANGE=VALUE".  Ranges must not
/// overlap.
pub fn parse_timeline(
    text: &str,
    settings: &GlobalSettings,
) -> Result<Timeline<String>> {
    let mut entries = Vec::new();
    for entry in text.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let (range, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected RANGE=VALUE, got \"{entry}\""))?;
        let range = parse_interval(range.trim(), settings)
            .with_context(|| format!("In timeline entry \"{entry}\""))?;
        entries.push((range, value.trim().to_string()));
    }
    Timeline::import(entries, |(range, value)| [(*range, value.clone())])
        .with_context(|| format!("Invalid timeline \"{text}\""))
}
