use crate::bounds::Bound;
use crate::errors::{Error, Result};
use crate::intervals::{midnight_after, Interval, ToInterval};
use crate::relations::Relation;
use crate::times::{parse_date, Period, Shift, INFINITY};
use chrono::{Datelike, Days, NaiveDate, NaiveTime, TimeDelta, Weekday};
use std::cmp::Ordering;

/// A range of full days [start, end], where both dates are included.
/// Either date might be missing, in which case the range is unbounded on that
/// side.  A date interval is never empty.
///
/// The equivalent time interval (from midnight on start to midnight after
/// end) is computed on creation, and all comparisons are done on it.  This
/// means a date interval can be compared with any time interval.
#[derive(Clone, Copy)]
pub struct DateInterval {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    span: Interval,
}

impl DateInterval {
    fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        DateInterval {
            start,
            end,
            span: Interval::from_bounds(
                start.map_or(Bound::NegInfinity, |s| {
                    Bound::At(s.and_time(NaiveTime::MIN))
                }),
                end.map_or(Bound::PosInfinity, midnight_after),
            ),
        }
    }

    pub fn between(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(Error::InvalidInterval {
                    start: s.to_string(),
                    end: e.to_string(),
                });
            }
        }
        Ok(DateInterval::new(start, end))
    }

    pub fn since(start: NaiveDate) -> Self {
        DateInterval::new(Some(start), None)
    }

    pub fn until(end: NaiveDate) -> Self {
        DateInterval::new(None, Some(end))
    }

    pub fn forever() -> Self {
        DateInterval::new(None, None)
    }

    pub fn day(date: NaiveDate) -> Self {
        DateInterval::new(Some(date), Some(date))
    }

    pub fn month(year: i32, month: u32) -> Result<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::InvalidDate(format!("{year}-{month}")))?;
        let last = first
            .checked_add_months(chrono::Months::new(1))
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| Error::InvalidDate(format!("{year}-{month}")))?;
        Ok(DateInterval::new(Some(first), Some(last)))
    }

    pub fn year(year: i32) -> Result<Self> {
        let bad = || Error::InvalidDate(year.to_string());
        let first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(bad)?;
        let last = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(bad)?;
        Ok(DateInterval::new(Some(first), Some(last)))
    }

    /// From Monday to Sunday of the given ISO week
    pub fn iso_week(year: i32, week: u32) -> Result<Self> {
        let bad = || Error::InvalidDate(format!("{year}-W{week:02}"));
        let first = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
            .ok_or_else(bad)?;
        let last = NaiveDate::from_isoywd_opt(year, week, Weekday::Sun)
            .ok_or_else(bad)?;
        Ok(DateInterval::new(Some(first), Some(last)))
    }

    /// Parse the text form, "START/END".  Each side is a date, the infinity
    /// symbol, or (on one side only) an ISO-8601 period, as in
    /// "2022-01-01/P1M".  The end date is included, and with a period it is
    /// exactly the start date shifted by the period.
    pub fn parse(text: &str) -> Result<Self> {
        let syntax = |reason: &str| Error::IntervalSyntax {
            text: text.to_string(),
            reason: reason.to_string(),
        };
        let Some((start_text, end_text)) = text.trim().split_once('/') else {
            return Err(syntax("Text cannot be parsed to an interval"));
        };
        let side = |t: &str| -> Result<DateSide> {
            if t == INFINITY {
                Ok(DateSide::Infinite)
            } else if t.starts_with('P') {
                match t.parse::<Shift>()? {
                    Shift::Period(p) => Ok(DateSide::Period(p)),
                    Shift::Duration(_) => {
                        Err(syntax("Durations are not allowed in date ranges"))
                    }
                }
            } else {
                parse_date(t)
                    .map(DateSide::Date)
                    .ok_or_else(|| syntax("Text cannot be parsed to a date"))
            }
        };
        match (side(start_text)?, side(end_text)?) {
            (DateSide::Period(_), DateSide::Period(_)) => {
                Err(syntax("Text cannot be parsed to a Period/Period format"))
            }
            (DateSide::Period(_), DateSide::Infinite)
            | (DateSide::Infinite, DateSide::Period(_)) => Err(syntax(
                "Text cannot be parsed to a Period/- or -/Period format",
            )),
            //  Both dates are included, so the range holds one more day
            //  than the period
            (DateSide::Period(p), DateSide::Date(end)) => {
                DateInterval::between(Some(p.sub_from_date(end)?), Some(end))
            }
            (DateSide::Date(start), DateSide::Period(p)) => {
                DateInterval::between(Some(start), Some(p.add_to_date(start)?))
            }
            (start, end) => DateInterval::between(start.date(), end.date()),
        }
    }

    /// The smallest date interval that covers the given time interval
    pub fn covering(interval: &Interval) -> Self {
        let start = interval.start().map(|s| s.date());
        let end = match interval.to_full_days().end_bound() {
            Bound::At(e) => e.date().pred_opt(),
            Bound::NegInfinity | Bound::PosInfinity => None,
        };
        DateInterval::new(start, end)
    }

    /// The smallest date interval that covers all inputs
    pub fn container_of<I>(temporals: I) -> Option<Self>
    where
        I: IntoIterator,
        I::Item: ToInterval,
    {
        Interval::container_of(temporals).map(|c| DateInterval::covering(&c))
    }

    /// The sorted list of disjoint date intervals that cover all inputs.
    /// Inputs that overlap or that are on consecutive days end up in the same
    /// container.
    pub fn disjoint_containers_of<I>(temporals: I) -> Vec<Self>
    where
        I: IntoIterator,
        I::Item: ToInterval,
    {
        let days = temporals
            .into_iter()
            .map(|t| DateInterval::covering(&t.to_interval()));
        Interval::disjoint_containers_of(days)
            .iter()
            .map(DateInterval::covering)
            .collect()
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn finite_start(&self) -> Result<NaiveDate> {
        self.start.ok_or_else(|| self.unbounded("start"))
    }

    pub fn finite_end(&self) -> Result<NaiveDate> {
        self.end.ok_or_else(|| self.unbounded("end"))
    }

    fn unbounded(&self, operation: &'static str) -> Error {
        Error::Unbounded {
            interval: self.to_string(),
            operation,
        }
    }

    pub fn with_start(&self, start: Option<NaiveDate>) -> Result<Self> {
        DateInterval::between(start, self.end)
    }

    pub fn with_end(&self, end: Option<NaiveDate>) -> Result<Self> {
        DateInterval::between(self.start, end)
    }

    pub fn has_infinite_start(&self) -> bool {
        self.start.is_none()
    }

    pub fn has_infinite_end(&self) -> bool {
        self.end.is_none()
    }

    pub fn is_finite(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// The equivalent time interval
    pub fn as_interval(&self) -> &Interval {
        &self.span
    }

    pub fn relation_with(&self, other: &impl ToInterval) -> Relation {
        self.span.relation_with(other)
    }

    pub fn precedes(&self, other: &impl ToInterval) -> bool {
        self.span.precedes(other)
    }

    pub fn preceded_by(&self, other: &impl ToInterval) -> bool {
        self.span.preceded_by(other)
    }

    pub fn meets(&self, other: &impl ToInterval) -> bool {
        self.span.meets(other)
    }

    pub fn met_by(&self, other: &impl ToInterval) -> bool {
        self.span.met_by(other)
    }

    pub fn overlaps(&self, other: &impl ToInterval) -> bool {
        self.span.overlaps(other)
    }

    pub fn overlapped_by(&self, other: &impl ToInterval) -> bool {
        self.span.overlapped_by(other)
    }

    pub fn starts(&self, other: &impl ToInterval) -> bool {
        self.span.starts(other)
    }

    pub fn started_by(&self, other: &impl ToInterval) -> bool {
        self.span.started_by(other)
    }

    pub fn encloses(&self, other: &impl ToInterval) -> bool {
        self.span.encloses(other)
    }

    pub fn enclosed_by(&self, other: &impl ToInterval) -> bool {
        self.span.enclosed_by(other)
    }

    pub fn finishes(&self, other: &impl ToInterval) -> bool {
        self.span.finishes(other)
    }

    pub fn finished_by(&self, other: &impl ToInterval) -> bool {
        self.span.finished_by(other)
    }

    pub fn is_before(&self, other: &impl ToInterval) -> bool {
        self.span.is_before(other)
    }

    pub fn is_after(&self, other: &impl ToInterval) -> bool {
        self.span.is_after(other)
    }

    pub fn contains(&self, other: &impl ToInterval) -> bool {
        self.span.contains(other)
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| s <= date)
            && self.end.map_or(true, |e| date <= e)
    }

    pub fn intersects(&self, other: &impl ToInterval) -> bool {
        self.span.intersects(other)
    }

    pub fn equals(&self, other: &impl ToInterval) -> bool {
        self.span.equals(other)
    }

    pub fn compare(&self, other: &impl ToInterval) -> Ordering {
        self.span.compare(other)
    }

    pub fn duration(&self) -> Result<TimeDelta> {
        self.span.duration()
    }

    /// The days common to both intervals.  When other is not made of full
    /// days, any day it touches counts.
    pub fn find_intersection(&self, other: &impl ToInterval) -> Option<Self> {
        let other = DateInterval::covering(&other.to_interval());
        self.span
            .find_intersection(&other.span)
            .map(|common| DateInterval::covering(&common))
    }

    /// The days of self that are not in other.  Days that other only
    /// partially covers are removed.
    pub fn subtract(&self, other: &impl ToInterval) -> Vec<Self> {
        let other = other.to_interval();
        if other.is_empty() {
            return vec![*self];
        }
        let after_other = || -> Option<Self> {
            let end = other.end()?;
            let first = if end.time() == NaiveTime::MIN {
                end.date()
            } else {
                end.date().succ_opt()?
            };
            DateInterval::between(Some(first), self.end).ok()
        };
        let before_other = || -> Option<Self> {
            let last = other.start()?.date().pred_opt()?;
            DateInterval::between(self.start, Some(last)).ok()
        };
        match self.span.relation_with(&other) {
            Relation::Equals
            | Relation::Starts
            | Relation::Finishes
            | Relation::EnclosedBy => vec![],
            Relation::Precedes
            | Relation::PrecededBy
            | Relation::Meets
            | Relation::MetBy => vec![*self],
            Relation::OverlappedBy | Relation::StartedBy => {
                after_other().into_iter().collect()
            }
            Relation::Overlaps | Relation::FinishedBy => {
                before_other().into_iter().collect()
            }
            Relation::Encloses => {
                before_other().into_iter().chain(after_other()).collect()
            }
        }
    }

    pub fn move_by(&self, period: &Period) -> Result<Self> {
        let start = self.start.map(|s| period.add_to_date(s)).transpose()?;
        let end = self.end.map(|e| period.add_to_date(e)).transpose()?;
        DateInterval::between(start, end)
    }

    /// Extend to full weeks, from Monday to Sunday
    pub fn to_full_weeks(&self) -> Self {
        let start = self.start.map(|s| {
            s.checked_sub_days(Days::new(u64::from(
                s.weekday().num_days_from_monday(),
            )))
            .unwrap_or(NaiveDate::MIN)
        });
        let end = self.end.map(|e| {
            e.checked_add_days(Days::new(u64::from(
                6 - e.weekday().num_days_from_monday(),
            )))
            .unwrap_or(NaiveDate::MAX)
        });
        DateInterval::new(start, end)
    }

    /// Number of days, including both ends
    pub fn days(&self) -> Result<i64> {
        let start = self.finite_start()?;
        let end = self.finite_end()?;
        Ok(end.signed_duration_since(start).num_days() + 1)
    }

    /// All the days in the interval
    pub fn iter(&self) -> Result<DateSteps> {
        self.iterate(Period::days(1))
    }

    /// The successive dates start, start + period, ... that are not after the
    /// end.
    pub fn iterate(&self, period: Period) -> Result<DateSteps> {
        let start = self.finite_start()?;
        let end = self.finite_end()?;
        if period.add_to_date(start)? <= start {
            return Err(Error::InvalidStep {
                step: period.to_string(),
            });
        }
        Ok(DateSteps {
            next: Some(start),
            end,
            period,
        })
    }

    /// Consecutive date intervals of the given length.  The last one might
    /// be shorter.
    pub fn slice(&self, period: Period) -> Result<impl Iterator<Item = Self>> {
        let end = self.finite_end()?;
        Ok(self.iterate(period)?.map(move |s| {
            let last = period
                .add_to_date(s)
                .ok()
                .and_then(|next| next.pred_opt())
                .map_or(end, |last| last.min(end));
            DateInterval::new(Some(s), Some(last))
        }))
    }
}

/// One side of the text form of a date interval
enum DateSide {
    Date(NaiveDate),
    Infinite,
    Period(Period),
}

impl DateSide {
    fn date(&self) -> Option<NaiveDate> {
        match self {
            DateSide::Date(d) => Some(*d),
            DateSide::Infinite | DateSide::Period(_) => None,
        }
    }
}

/// Iterator over the dates of a date interval, see DateInterval::iterate
pub struct DateSteps {
    next: Option<NaiveDate>,
    end: NaiveDate,
    period: Period,
}

impl Iterator for DateSteps {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|n| *n <= self.end)?;
        self.next = self.period.add_to_date(current).ok();
        Some(current)
    }
}

impl ToInterval for DateInterval {
    fn to_interval(&self) -> Interval {
        self.span
    }
}

impl PartialEq for DateInterval {
    fn eq(&self, other: &Self) -> bool {
        self.span == other.span
    }
}

impl Eq for DateInterval {}

impl PartialOrd for DateInterval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateInterval {
    fn cmp(&self, other: &Self) -> Ordering {
        self.span.cmp(&other.span)
    }
}

impl std::hash::Hash for DateInterval {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.span.hash(state);
    }
}

impl std::fmt::Display for DateInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.start {
            Some(s) => write!(f, "{}/", s.format("%Y-%m-%d"))?,
            None => write!(f, "{INFINITY}/")?,
        }
        match self.end {
            Some(e) => write!(f, "{}", e.format("%Y-%m-%d")),
            None => write!(f, "{INFINITY}"),
        }
    }
}

impl std::fmt::Debug for DateInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DateInterval({self})")
    }
}

impl std::str::FromStr for DateInterval {
    type Err = Error;
    fn from_str(text: &str) -> Result<Self> {
        DateInterval::parse(text)
    }
}

impl serde::Serialize for DateInterval {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for DateInterval {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        DateInterval::parse(&text).map_err(serde::de::Error::custom)
    }
}
