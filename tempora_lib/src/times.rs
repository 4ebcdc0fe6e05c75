use crate::errors::{Error, Result};
use chrono::{
    Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike,
};
use regex::Regex;
use std::sync::OnceLock;

/// The symbol used in the text form of intervals for a missing bound
pub const INFINITY: &str = "∞";

/// Parse a timestamp, as "2022-01-01T10:00", "2022-01-01T10:00:30.5" or
/// "2022-01-01" (which means midnight)
pub fn parse_time_point(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M"))
        .ok()
        .or_else(|| parse_date(text).map(|d| d.and_time(NaiveTime::MIN)))
}

/// Parse a date, as "2022-01-01"
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Format a timestamp.  Seconds are only output when they are not zero, so
/// that the result can always be parsed back to the same timestamp.
pub fn format_time_point(time: &NaiveDateTime) -> String {
    if time.second() == 0 && time.nanosecond() == 0 {
        time.format("%Y-%m-%dT%H:%M").to_string()
    } else {
        time.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    }
}

/// Calendar arithmetic shared by dates and timestamps
trait Calendar: Sized + Copy {
    fn plus_months(self, months: Months) -> Option<Self>;
    fn minus_months(self, months: Months) -> Option<Self>;
    fn plus_days(self, days: Days) -> Option<Self>;
    fn minus_days(self, days: Days) -> Option<Self>;
}

impl Calendar for NaiveDate {
    fn plus_months(self, months: Months) -> Option<Self> {
        self.checked_add_months(months)
    }
    fn minus_months(self, months: Months) -> Option<Self> {
        self.checked_sub_months(months)
    }
    fn plus_days(self, days: Days) -> Option<Self> {
        self.checked_add_days(days)
    }
    fn minus_days(self, days: Days) -> Option<Self> {
        self.checked_sub_days(days)
    }
}

impl Calendar for NaiveDateTime {
    fn plus_months(self, months: Months) -> Option<Self> {
        self.checked_add_months(months)
    }
    fn minus_months(self, months: Months) -> Option<Self> {
        self.checked_sub_months(months)
    }
    fn plus_days(self, days: Days) -> Option<Self> {
        self.checked_add_days(days)
    }
    fn minus_days(self, days: Days) -> Option<Self> {
        self.checked_sub_days(days)
    }
}

/// A calendar-based amount of time, as found in ISO-8601 "P1Y2M3D".
/// Months are applied first (clamping to the end of the month as needed),
/// then days.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Period {
    pub years: i32,
    pub months: i32,
    pub days: i32,
}

impl Period {
    pub fn days(days: i32) -> Self {
        Period {
            days,
            ..Default::default()
        }
    }

    pub fn months(months: i32) -> Self {
        Period {
            months,
            ..Default::default()
        }
    }

    pub fn years(years: i32) -> Self {
        Period {
            years,
            ..Default::default()
        }
    }

    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }

    fn apply<C: Calendar>(&self, time: C, negate: bool) -> Option<C> {
        let sign = if negate { -1 } else { 1 };
        let months = sign * (i64::from(self.years) * 12 + i64::from(self.months));
        let days = sign * i64::from(self.days);
        let shifted = if months >= 0 {
            time.plus_months(Months::new(u32::try_from(months).ok()?))?
        } else {
            time.minus_months(Months::new(
                u32::try_from(months.unsigned_abs()).ok()?,
            ))?
        };
        if days >= 0 {
            shifted.plus_days(Days::new(days.unsigned_abs()))
        } else {
            shifted.minus_days(Days::new(days.unsigned_abs()))
        }
    }

    pub fn add_to_date(&self, date: NaiveDate) -> Result<NaiveDate> {
        self.apply(date, false)
            .ok_or_else(|| Error::InvalidDate(format!("{date} + {self}")))
    }

    pub fn sub_from_date(&self, date: NaiveDate) -> Result<NaiveDate> {
        self.apply(date, true)
            .ok_or_else(|| Error::InvalidDate(format!("{date} - {self}")))
    }

    fn parse(text: &str) -> Option<Self> {
        static PERIOD: OnceLock<Regex> = OnceLock::new();
        let re = PERIOD.get_or_init(|| {
            Regex::new(
                r"(?i)^([-+]?)P(?:([-+]?[0-9]+)Y)?(?:([-+]?[0-9]+)M)?(?:([-+]?[0-9]+)W)?(?:([-+]?[0-9]+)D)?$",
            )
            .expect("period regex is valid")
        });
        let caps = re.captures(text)?;
        let field = |idx: usize| -> Option<Option<i32>> {
            match caps.get(idx) {
                None => Some(None),
                Some(m) => m.as_str().parse::<i32>().ok().map(Some),
            }
        };
        let years = field(2)?;
        let months = field(3)?;
        let weeks = field(4)?;
        let days = field(5)?;
        if years.is_none() && months.is_none() && weeks.is_none() && days.is_none()
        {
            return None;
        }
        let sign = if caps.get(1).is_some_and(|m| m.as_str() == "-") {
            -1
        } else {
            1
        };
        let days = weeks
            .unwrap_or(0)
            .checked_mul(7)?
            .checked_add(days.unwrap_or(0))?;
        Some(Period {
            years: years.unwrap_or(0).checked_mul(sign)?,
            months: months.unwrap_or(0).checked_mul(sign)?,
            days: days.checked_mul(sign)?,
        })
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_zero() {
            return write!(f, "P0D");
        }
        write!(f, "P")?;
        if self.years != 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months != 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days != 0 {
            write!(f, "{}D", self.days)?;
        }
        Ok(())
    }
}

/// An amount of time by which timestamps can be moved.  Periods follow the
/// calendar ("one month"), durations are an exact number of seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shift {
    Period(Period),
    Duration(TimeDelta),
}

impl Shift {
    pub fn add_to(&self, time: NaiveDateTime) -> Result<NaiveDateTime> {
        let shifted = match self {
            Shift::Period(p) => p.apply(time, false),
            Shift::Duration(d) => time.checked_add_signed(*d),
        };
        shifted.ok_or_else(|| {
            Error::InvalidDate(format!("{} + {self}", format_time_point(&time)))
        })
    }

    pub fn sub_from(&self, time: NaiveDateTime) -> Result<NaiveDateTime> {
        let shifted = match self {
            Shift::Period(p) => p.apply(time, true),
            Shift::Duration(d) => time.checked_sub_signed(*d),
        };
        shifted.ok_or_else(|| {
            Error::InvalidDate(format!("{} - {self}", format_time_point(&time)))
        })
    }

    /// Parse an ISO-8601 duration, "PnDTnHnMn.nS"
    fn parse_duration(text: &str) -> Option<TimeDelta> {
        static DURATION: OnceLock<Regex> = OnceLock::new();
        let re = DURATION.get_or_init(|| {
            Regex::new(
                r"(?i)^([-+]?)P(?:([-+]?[0-9]+)D)?T(?:([-+]?[0-9]+)H)?(?:([-+]?[0-9]+)M)?(?:([-+]?[0-9]+)(?:[.,]([0-9]{0,9}))?S)?$",
            )
            .expect("duration regex is valid")
        });
        let caps = re.captures(text)?;
        if (2..=5).all(|idx| caps.get(idx).is_none()) {
            return None;
        }
        let field = |idx: usize, factor: i64| -> Option<i64> {
            match caps.get(idx) {
                None => Some(0),
                Some(m) => m.as_str().parse::<i64>().ok()?.checked_mul(factor),
            }
        };
        let seconds = field(2, 86_400)?
            .checked_add(field(3, 3_600)?)?
            .checked_add(field(4, 60)?)?
            .checked_add(field(5, 1)?)?;
        let mut nanos = match caps.get(6) {
            None => 0,
            Some(m) => format!("{:0<9}", m.as_str()).parse::<i64>().ok()?,
        };
        if caps.get(5).is_some_and(|m| m.as_str().starts_with('-')) {
            nanos = -nanos;
        }
        let delta = TimeDelta::try_seconds(seconds)?
            .checked_add(&TimeDelta::nanoseconds(nanos))?;
        if caps.get(1).is_some_and(|m| m.as_str() == "-") {
            Some(-delta)
        } else {
            Some(delta)
        }
    }
}

impl std::str::FromStr for Shift {
    type Err = Error;

    /// Parse either an ISO-8601 period ("P1Y2M", "P2W") or duration
    /// ("PT1H30M", "P1DT12H").  Durations are recognized by their "T".
    fn from_str(text: &str) -> Result<Self> {
        let parsed = if text.contains(['T', 't']) {
            Shift::parse_duration(text).map(Shift::Duration)
        } else {
            Period::parse(text).map(Shift::Period)
        };
        parsed.ok_or_else(|| Error::IntervalSyntax {
            text: text.to_string(),
            reason: "Text cannot be parsed to a period or duration".into(),
        })
    }
}

impl std::fmt::Display for Shift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shift::Period(p) => write!(f, "{p}"),
            Shift::Duration(d) => {
                let sign = if *d < TimeDelta::zero() { "-" } else { "" };
                let abs = d.abs();
                let nanos = abs.subsec_nanos();
                if nanos == 0 {
                    write!(f, "{sign}PT{}S", abs.num_seconds())
                } else {
                    write!(f, "{sign}PT{}.{:09}S", abs.num_seconds(), nanos)
                }
            }
        }
    }
}

impl From<Period> for Shift {
    fn from(period: Period) -> Self {
        Shift::Period(period)
    }
}

impl From<TimeDelta> for Shift {
    fn from(delta: TimeDelta) -> Self {
        Shift::Duration(delta)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn time(text: &str) -> NaiveDateTime {
        parse_time_point(text).unwrap()
    }

    #[test]
    fn test_time_points() {
        assert_eq!(time("2022-01-01"), time("2022-01-01T00:00"));
        assert_eq!(time("2022-01-01T10:00:00"), time("2022-01-01T10:00"));
        assert_eq!(format_time_point(&time("2022-01-01")), "2022-01-01T00:00");
        assert_eq!(
            format_time_point(&time("2022-01-01T10:00:30")),
            "2022-01-01T10:00:30",
        );
        assert_eq!(
            format_time_point(&time("2022-01-01T10:00:30.5")),
            "2022-01-01T10:00:30.500",
        );
        assert_eq!(parse_time_point("2022-13-01"), None);
        assert_eq!(parse_time_point("yesterday"), None);
    }

    #[test]
    fn test_period() {
        assert_eq!(
            "P1Y2M3D".parse::<Shift>().unwrap(),
            Shift::Period(Period {
                years: 1,
                months: 2,
                days: 3
            }),
        );
        assert_eq!(
            "P2W".parse::<Shift>().unwrap(),
            Shift::Period(Period::days(14)),
        );
        assert_eq!(
            "-P1M".parse::<Shift>().unwrap(),
            Shift::Period(Period::months(-1)),
        );
        assert!("P".parse::<Shift>().is_err());
        assert!("1M".parse::<Shift>().is_err());
        assert_eq!(Period::years(2).to_string(), "P2Y");
        assert_eq!(Period::default().to_string(), "P0D");
    }

    #[test]
    fn test_duration() {
        assert_eq!(
            "PT1H30M".parse::<Shift>().unwrap(),
            Shift::Duration(TimeDelta::minutes(90)),
        );
        assert_eq!(
            "P1DT1S".parse::<Shift>().unwrap(),
            Shift::Duration(TimeDelta::seconds(86_401)),
        );
        assert_eq!(
            "PT1.5S".parse::<Shift>().unwrap(),
            Shift::Duration(TimeDelta::milliseconds(1_500)),
        );
        assert_eq!(
            "PT-1.5S".parse::<Shift>().unwrap(),
            Shift::Duration(TimeDelta::milliseconds(-1_500)),
        );
        assert!("PT".parse::<Shift>().is_err());

        //  Fraction overflowing the largest duration
        assert!("PT9223372036854775.9S".parse::<Shift>().is_err());
        assert!(crate::Interval::parse("2022-01-01/PT9223372036854775.9S").is_err());
        assert_eq!(Shift::Duration(TimeDelta::minutes(2)).to_string(), "PT120S");
    }

    #[test]
    fn test_shift() {
        let month = Shift::Period(Period::months(1));
        assert_eq!(
            month.add_to(time("2022-01-31T10:00")).unwrap(),
            time("2022-02-28T10:00"),
        );
        assert_eq!(
            month.sub_from(time("2022-03-31")).unwrap(),
            time("2022-02-28"),
        );
        let hours = Shift::Duration(TimeDelta::hours(36));
        assert_eq!(
            hours.add_to(time("2022-01-01")).unwrap(),
            time("2022-01-02T12:00"),
        );
        assert_eq!(
            Period::days(-1)
                .add_to_date(NaiveDate::from_ymd_opt(2022, 3, 1).unwrap())
                .unwrap(),
            NaiveDate::from_ymd_opt(2022, 2, 28).unwrap(),
        );
        assert!(Shift::Period(Period::years(1_000_000))
            .add_to(time("2022-01-01"))
            .is_err());
    }
}
