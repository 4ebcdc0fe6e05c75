use crate::global_settings::GlobalSettings;
use crate::inputs::{parse_interval, parse_time, parse_timeline};
use anyhow::Result;
use itertools::Itertools;
use tempora_lib::{Interval, Timeline};

const NONE: &str = "-";

/// Show the normalized form of each interval, with its duration
pub fn parse(intervals: &[&str], settings: &GlobalSettings) -> Result<String> {
    let mut lines = Vec::new();
    for text in intervals {
        let interval = parse_interval(text, settings)?;
        let duration = match interval.duration() {
            Ok(d) => format!("{}s", d.num_seconds()),
            Err(_) => "unbounded".to_string(),
        };
        lines.push(format!(
            "{}{}{}",
            settings.show(&interval),
            settings.colsep,
            duration
        ));
    }
    Ok(lines.join("\n"))
}

pub fn relation(
    first: &str,
    second: &str,
    settings: &GlobalSettings,
) -> Result<String> {
    let first = parse_interval(first, settings)?;
    let second = parse_interval(second, settings)?;
    Ok(first.relation_with(&second).name().to_string())
}

pub fn subtract(
    first: &str,
    second: &str,
    settings: &GlobalSettings,
) -> Result<String> {
    let first = parse_interval(first, settings)?;
    let second = parse_interval(second, settings)?;
    Ok(first
        .subtract(&second)
        .iter()
        .map(|i| settings.show(i))
        .join("\n"))
}

pub fn intersect(
    first: &str,
    second: &str,
    settings: &GlobalSettings,
) -> Result<String> {
    let first = parse_interval(first, settings)?;
    let second = parse_interval(second, settings)?;
    Ok(first
        .find_intersection(&second)
        .map_or_else(|| NONE.to_string(), |i| settings.show(&i)))
}

pub fn containers(
    intervals: &[&str],
    settings: &GlobalSettings,
) -> Result<String> {
    let parsed = intervals
        .iter()
        .map(|t| parse_interval(t, settings))
        .collect::<Result<Vec<Interval>>>()?;
    Ok(Interval::disjoint_containers_of(&parsed)
        .iter()
        .map(|i| settings.show(i))
        .join("\n"))
}

fn timelines(
    specs: &[&str],
    settings: &GlobalSettings,
) -> Result<Vec<Timeline<String>>> {
    specs.iter().map(|s| parse_timeline(s, settings)).collect()
}

pub fn zip(specs: &[&str], settings: &GlobalSettings) -> Result<String> {
    let parsed = timelines(specs, settings)?;
    let refs = parsed.iter().collect::<Vec<_>>();
    let zipped = Timeline::zip_all(&refs)?;
    Ok(zipped
        .iter()
        .map(|(range, values)| {
            std::iter::once(settings.show(range))
                .chain(
                    values
                        .iter()
                        .map(|v| v.as_deref().unwrap_or(NONE).to_string()),
                )
                .join(&settings.colsep)
        })
        .join("\n"))
}

pub fn merge(
    specs: &[&str],
    simplify: bool,
    settings: &GlobalSettings,
) -> Result<String> {
    let parsed = timelines(specs, settings)?;
    let refs = parsed.iter().collect::<Vec<_>>();
    let mut merged = Timeline::merge(&refs)?;
    if simplify {
        merged = merged.simplify();
    }
    Ok(show_timeline(&merged, settings))
}

pub fn value_at(
    spec: &str,
    time: &str,
    settings: &GlobalSettings,
) -> Result<String> {
    let timeline = parse_timeline(spec, settings)?;
    let time = parse_time(time)?;
    Ok(timeline.value_at(time).map_or(NONE, String::as_str).to_string())
}

pub fn fill(
    spec: &str,
    range: &str,
    value: &str,
    settings: &GlobalSettings,
) -> Result<String> {
    let timeline = parse_timeline(spec, settings)?;
    let range = parse_interval(range, settings)?;
    let filled = timeline.fill_blanks(range, value.to_string())?;
    Ok(show_timeline(&filled, settings))
}

fn show_timeline(timeline: &Timeline<String>, settings: &GlobalSettings) -> String {
    timeline
        .iter()
        .map(|(range, value)| {
            format!("{}{}{}", settings.show(range), settings.colsep, value)
        })
        .join("\n")
}

#[cfg(test)]
mod test {
    use super::*;

    fn dates() -> GlobalSettings {
        GlobalSettings {
            dates: true,
            ..GlobalSettings::default()
        }
    }

    #[test]
    fn test_relation() -> Result<()> {
        let settings = dates();
        assert_eq!(
            relation("2022-01-01/2022-01-31", "2022-02-01/2022-02-28", &settings)?,
            "meets"
        );
        assert_eq!(
            relation("2022-01-01/2022-01-31", "2022-01-10/2022-01-20", &settings)?,
            "encloses"
        );
        Ok(())
    }

    #[test]
    fn test_subtract() -> Result<()> {
        let settings = dates();
        assert_eq!(
            subtract("2022-01-01/2022-01-31", "2022-01-10/2022-01-20", &settings)?,
            "2022-01-01/2022-01-09\n2022-01-21/2022-01-31"
        );
        assert_eq!(
            subtract("2022-01-01/2022-01-31", "∞/∞", &settings)?,
            ""
        );
        Ok(())
    }

    #[test]
    fn test_intersect() -> Result<()> {
        let settings = dates();
        assert_eq!(
            intersect("2022-01-01/2022-01-31", "2022-01-20/∞", &settings)?,
            "2022-01-20/2022-01-31"
        );
        assert_eq!(
            intersect("2022-01-01/2022-01-31", "2022-03-01/∞", &settings)?,
            NONE
        );
        Ok(())
    }

    #[test]
    fn test_containers() -> Result<()> {
        let settings = dates();
        assert_eq!(
            containers(
                &[
                    "2022-03-01/2022-03-31",
                    "2022-01-01/2022-01-31",
                    "2022-02-01/2022-02-10",
                ],
                &settings
            )?,
            "2022-01-01/2022-02-10\n2022-03-01/2022-03-31"
        );
        Ok(())
    }

    #[test]
    fn test_zip_and_merge() -> Result<()> {
        let settings = dates();
        let specs = [
            "2022-01-01/2022-01-31=a",
            "2022-01-16/2022-02-15=b",
        ];
        assert_eq!(
            zip(&specs, &settings)?,
            "2022-01-01/2022-01-15 | a | -\n\
             2022-01-16/2022-01-31 | a | b\n\
             2022-02-01/2022-02-15 | - | b"
        );
        assert_eq!(
            merge(&specs, false, &settings)?,
            "2022-01-01/2022-01-15 | a\n\
             2022-01-16/2022-01-31 | a\n\
             2022-02-01/2022-02-15 | b"
        );
        assert_eq!(
            merge(&specs, true, &settings)?,
            "2022-01-01/2022-01-31 | a\n\
             2022-02-01/2022-02-15 | b"
        );
        Ok(())
    }

    #[test]
    fn test_value_at_and_fill() -> Result<()> {
        let settings = dates();
        let spec = "2022-01-01/2022-01-10=a;2022-01-21/2022-01-31=b";
        assert_eq!(value_at(spec, "2022-01-05T12:00", &settings)?, "a");
        assert_eq!(value_at(spec, "2022-01-15", &settings)?, NONE);
        assert_eq!(
            fill(spec, "2022-01-01/2022-02-05", "z", &settings)?,
            "2022-01-01/2022-01-10 | a\n\
             2022-01-11/2022-01-20 | z\n\
             2022-01-21/2022-01-31 | b\n\
             2022-02-01/2022-02-05 | z"
        );
        Ok(())
    }

    #[test]
    fn test_parse() -> Result<()> {
        let settings = GlobalSettings::default();
        assert_eq!(
            parse(&["2022-01-01/2022-01-02T12:00", "2022-01-01/∞"], &settings)?,
            "2022-01-01T00:00/2022-01-02T12:00 | 129600s\n\
             2022-01-01T00:00/∞ | unbounded"
        );
        Ok(())
    }
}
