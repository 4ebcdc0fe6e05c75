use crate::bounds::Bound;
use crate::date_intervals::DateInterval;
use crate::errors::{Error, Result};
use crate::relations::{Relation, RelationSet};
use crate::times::{format_time_point, parse_time_point, Shift, INFINITY};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use std::cmp::Ordering;

/// Anything that covers a span of time, and can be compared with intervals.
/// A date covers the whole day, a timestamp is an empty interval at that
/// point in time.
pub trait ToInterval {
    fn to_interval(&self) -> Interval;
}

/// A half-open interval of time [start, end).
/// Either bound might be missing, in which case the interval is unbounded
/// on that side.  The interval is empty when both bounds are equal.
///
/// Intervals are sorted by start, then by end.  A missing start sorts before
/// any timestamp, and a missing end sorts after any timestamp.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    start: Bound,
    end: Bound,
}

impl Interval {
    /// Build an interval, checking that start is not after end
    pub fn between(
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(Error::InvalidInterval {
                    start: format_time_point(&s),
                    end: format_time_point(&e),
                });
            }
        }
        Ok(Interval {
            start: Bound::start(start),
            end: Bound::end(end),
        })
    }

    /// Caller must ensure start <= end
    pub(crate) fn from_bounds(start: Bound, end: Bound) -> Self {
        debug_assert!(start <= end, "start after end: {start:?} {end:?}");
        Interval { start, end }
    }

    pub fn since(start: NaiveDateTime) -> Self {
        Interval::from_bounds(Bound::At(start), Bound::PosInfinity)
    }

    pub fn until(end: NaiveDateTime) -> Self {
        Interval::from_bounds(Bound::NegInfinity, Bound::At(end))
    }

    pub fn forever() -> Self {
        Interval::from_bounds(Bound::NegInfinity, Bound::PosInfinity)
    }

    /// The empty interval at the given time
    pub fn empty(at: NaiveDateTime) -> Self {
        Interval::from_bounds(Bound::At(at), Bound::At(at))
    }

    /// From midnight to the next midnight.
    pub fn day(date: NaiveDate) -> Self {
        Interval::from_bounds(
            Bound::At(date.and_time(NaiveTime::MIN)),
            midnight_after(date),
        )
    }

    pub fn month(year: i32, month: u32) -> Result<Self> {
        Ok(DateInterval::month(year, month)?.to_interval())
    }

    pub fn year(year: i32) -> Result<Self> {
        Ok(DateInterval::year(year)?.to_interval())
    }

    /// The ISO week (from Monday to Sunday)
    pub fn iso_week(year: i32, week: u32) -> Result<Self> {
        Ok(DateInterval::iso_week(year, week)?.to_interval())
    }

    /// Parse the text form of an interval, "START/END".
    /// Each side is either a timestamp, the infinity symbol, or (on one side
    /// only) an ISO-8601 period or duration relative to the other side, as
    /// in "2022-01-01T10:00/PT2H".
    pub fn parse(text: &str) -> Result<Self> {
        let syntax = |reason: &str| Error::IntervalSyntax {
            text: text.to_string(),
            reason: reason.to_string(),
        };
        let Some((start_text, end_text)) = text.trim().split_once('/') else {
            return Err(syntax("Text cannot be parsed to an interval"));
        };
        let start_is_shift = start_text.starts_with('P');
        let end_is_shift = end_text.starts_with('P');
        let start_is_infinite = start_text == INFINITY;
        let end_is_infinite = end_text == INFINITY;

        if start_is_shift && end_is_shift {
            return Err(syntax(
                "Text cannot be parsed to a Duration/Duration format",
            ));
        }
        if (start_is_shift && end_is_infinite)
            || (start_is_infinite && end_is_shift)
        {
            return Err(syntax(
                "Text cannot be parsed to a Period/- or -/Duration format",
            ));
        }

        let point = |t: &str| {
            parse_time_point(t)
                .ok_or_else(|| syntax("Text cannot be parsed to a timestamp"))
        };

        if start_is_shift {
            let end = point(end_text)?;
            let start = start_text.parse::<Shift>()?.sub_from(end)?;
            return Interval::between(Some(start), Some(end));
        }

        let start = if start_is_infinite {
            None
        } else {
            Some(point(start_text)?)
        };
        let end = if end_is_infinite {
            None
        } else if end_is_shift {
            let anchor = start.ok_or_else(|| {
                syntax("A period needs a finite timestamp on the other side")
            })?;
            Some(end_text.parse::<Shift>()?.add_to(anchor)?)
        } else {
            Some(point(end_text)?)
        };
        Interval::between(start, end)
    }

    /// The smallest interval that covers all the inputs, or None if there
    /// are no inputs.
    pub fn container_of<I>(temporals: I) -> Option<Self>
    where
        I: IntoIterator,
        I::Item: ToInterval,
    {
        temporals
            .into_iter()
            .map(|t| t.to_interval())
            .reduce(|acc, t| Interval {
                start: acc.start.min(t.start),
                end: acc.end.max(t.end),
            })
    }

    /// The sorted list of disjoint intervals that cover all the inputs.
    /// Inputs that overlap or are adjacent end up in the same container.
    pub fn disjoint_containers_of<I>(temporals: I) -> Vec<Self>
    where
        I: IntoIterator,
        I::Item: ToInterval,
    {
        let mut covers: Vec<Interval> =
            temporals.into_iter().map(|t| t.to_interval()).collect();
        covers.sort();

        let mut containers = Vec::new();
        let mut covers = covers.into_iter();
        let Some(mut current) = covers.next() else {
            return containers;
        };
        for next in covers {
            if current.end < next.start {
                containers.push(current);
                current = next;
            } else if current.end == Bound::PosInfinity
                || next.end == Bound::PosInfinity
            {
                //  Nothing can come after this container
                containers.push(Interval::from_bounds(
                    current.start,
                    Bound::PosInfinity,
                ));
                return containers;
            } else if next.end > current.end {
                current.end = next.end;
            }
        }
        containers.push(current);
        containers
    }

    pub fn start(&self) -> Option<NaiveDateTime> {
        self.start.time()
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        self.end.time()
    }

    pub(crate) fn start_bound(&self) -> Bound {
        self.start
    }

    pub(crate) fn end_bound(&self) -> Bound {
        self.end
    }

    pub fn finite_start(&self) -> Result<NaiveDateTime> {
        self.start().ok_or_else(|| self.unbounded("start"))
    }

    pub fn finite_end(&self) -> Result<NaiveDateTime> {
        self.end().ok_or_else(|| self.unbounded("end"))
    }

    fn unbounded(&self, operation: &'static str) -> Error {
        Error::Unbounded {
            interval: self.to_string(),
            operation,
        }
    }

    pub fn with_start(&self, start: Option<NaiveDateTime>) -> Result<Self> {
        Interval::between(start, self.end())
    }

    pub fn with_end(&self, end: Option<NaiveDateTime>) -> Result<Self> {
        Interval::between(self.start(), end)
    }

    pub fn has_infinite_start(&self) -> bool {
        !self.start.is_finite()
    }

    pub fn has_infinite_end(&self) -> bool {
        !self.end.is_finite()
    }

    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_finite() && self.start == self.end
    }

    /// Whether the given time is in [start, end)
    pub fn contains_point(&self, time: NaiveDateTime) -> bool {
        self.start <= Bound::At(time) && Bound::At(time) < self.end
    }

    /// The relation between self and other.  Exactly one relation holds.
    pub fn relation_with(&self, other: &impl ToInterval) -> Relation {
        let other = other.to_interval();
        match self.start.cmp(&other.start) {
            Ordering::Less => match self.end.cmp(&other.start) {
                Ordering::Less => Relation::Precedes,
                Ordering::Equal => Relation::Meets,
                Ordering::Greater => match self.end.cmp(&other.end) {
                    Ordering::Less => Relation::Overlaps,
                    Ordering::Equal => Relation::FinishedBy,
                    Ordering::Greater => Relation::Encloses,
                },
            },
            Ordering::Equal => match self.end.cmp(&other.end) {
                Ordering::Less => Relation::Starts,
                Ordering::Equal => Relation::Equals,
                Ordering::Greater => Relation::StartedBy,
            },
            Ordering::Greater => match self.start.cmp(&other.end) {
                Ordering::Less => match self.end.cmp(&other.end) {
                    Ordering::Less => Relation::EnclosedBy,
                    Ordering::Equal => Relation::Finishes,
                    Ordering::Greater => Relation::OverlappedBy,
                },
                Ordering::Equal => Relation::MetBy,
                Ordering::Greater => Relation::PrecededBy,
            },
        }
    }

    pub fn relates_in(&self, other: &impl ToInterval, set: RelationSet) -> bool {
        set.contains(self.relation_with(other))
    }

    pub fn precedes(&self, other: &impl ToInterval) -> bool {
        self.relation_with(other) == Relation::Precedes
    }

    pub fn preceded_by(&self, other: &impl ToInterval) -> bool {
        other.to_interval().precedes(self)
    }

    pub fn meets(&self, other: &impl ToInterval) -> bool {
        self.relation_with(other) == Relation::Meets
    }

    pub fn met_by(&self, other: &impl ToInterval) -> bool {
        other.to_interval().meets(self)
    }

    pub fn overlaps(&self, other: &impl ToInterval) -> bool {
        self.relation_with(other) == Relation::Overlaps
    }

    pub fn overlapped_by(&self, other: &impl ToInterval) -> bool {
        other.to_interval().overlaps(self)
    }

    pub fn starts(&self, other: &impl ToInterval) -> bool {
        self.relation_with(other) == Relation::Starts
    }

    pub fn started_by(&self, other: &impl ToInterval) -> bool {
        other.to_interval().starts(self)
    }

    pub fn encloses(&self, other: &impl ToInterval) -> bool {
        self.relation_with(other) == Relation::Encloses
    }

    pub fn enclosed_by(&self, other: &impl ToInterval) -> bool {
        other.to_interval().encloses(self)
    }

    pub fn finishes(&self, other: &impl ToInterval) -> bool {
        self.relation_with(other) == Relation::Finishes
    }

    pub fn finished_by(&self, other: &impl ToInterval) -> bool {
        other.to_interval().finishes(self)
    }

    /// Whether self ends (with a finite end) before other starts
    pub fn is_before(&self, other: &impl ToInterval) -> bool {
        self.end.is_finite()
            && matches!(
                self.relation_with(other),
                Relation::Precedes | Relation::Meets
            )
    }

    /// Whether self starts (with a finite start) after other ends
    pub fn is_after(&self, other: &impl ToInterval) -> bool {
        self.start.is_finite()
            && matches!(
                self.relation_with(other),
                Relation::PrecededBy | Relation::MetBy
            )
    }

    /// An empty interval contains nothing, not even itself
    pub fn contains(&self, other: &impl ToInterval) -> bool {
        !self.is_empty() && self.relates_in(other, RelationSet::CONTAINS)
    }

    pub fn intersects(&self, other: &impl ToInterval) -> bool {
        !self.relates_in(other, RelationSet::DISJOINT)
    }

    pub fn find_intersection(&self, other: &impl ToInterval) -> Option<Self> {
        let other = other.to_interval();
        if !self.intersects(&other) {
            return None;
        }
        Some(Interval::from_bounds(
            self.start.max(other.start),
            self.end.min(other.end),
        ))
    }

    /// The parts of self that are not in other.  This returns zero, one or
    /// two intervals.
    pub fn subtract(&self, other: &impl ToInterval) -> Vec<Self> {
        let other = other.to_interval();
        match self.relation_with(&other) {
            Relation::Equals
            | Relation::Starts
            | Relation::Finishes
            | Relation::EnclosedBy => vec![],
            Relation::Precedes
            | Relation::PrecededBy
            | Relation::Meets
            | Relation::MetBy => vec![*self],
            Relation::OverlappedBy | Relation::StartedBy => {
                vec![Interval::from_bounds(other.end, self.end)]
            }
            Relation::Overlaps | Relation::FinishedBy => {
                vec![Interval::from_bounds(self.start, other.start)]
            }
            Relation::Encloses => vec![
                Interval::from_bounds(self.start, other.start),
                Interval::from_bounds(other.end, self.end),
            ],
        }
    }

    pub fn equals(&self, other: &impl ToInterval) -> bool {
        *self == other.to_interval()
    }

    pub fn compare(&self, other: &impl ToInterval) -> Ordering {
        self.cmp(&other.to_interval())
    }

    /// Move both bounds by the same amount
    pub fn move_by(&self, shift: &Shift) -> Result<Self> {
        let start = self.start().map(|s| shift.add_to(s)).transpose()?;
        let end = self.end().map(|e| shift.add_to(e)).transpose()?;
        Interval::between(start, end)
    }

    /// Extend the interval so that it starts and ends at midnight
    pub fn to_full_days(&self) -> Self {
        let start = match self.start {
            Bound::At(s) => Bound::At(s.date().and_time(NaiveTime::MIN)),
            Bound::NegInfinity | Bound::PosInfinity => self.start,
        };
        let end = match self.end {
            Bound::At(e) if !self.is_empty() && e.time() == NaiveTime::MIN => {
                Bound::At(e)
            }
            Bound::At(e) => midnight_after(e.date()),
            Bound::NegInfinity | Bound::PosInfinity => self.end,
        };
        Interval::from_bounds(start, end)
    }

    pub fn is_full_days(&self) -> bool {
        *self == self.to_full_days()
    }

    pub fn duration(&self) -> Result<TimeDelta> {
        match (self.start, self.end) {
            (Bound::At(s), Bound::At(e)) => Ok(e.signed_duration_since(s)),
            _ => Err(self.unbounded("duration")),
        }
    }

    /// The successive timestamps start, start + step, ... that are before
    /// the end of the interval.
    pub fn iterate(&self, step: Shift) -> Result<Steps> {
        let start = self.finite_start()?;
        let end = self.finite_end()?;
        if step.add_to(start)? <= start {
            return Err(Error::InvalidStep {
                step: step.to_string(),
            });
        }
        Ok(Steps {
            next: Some(start),
            end,
            step,
        })
    }

    /// Split the interval into consecutive slices of the given size.  The
    /// last slice might be shorter.
    pub fn slice(&self, step: Shift) -> Result<impl Iterator<Item = Self>> {
        let end = self.finite_end()?;
        Ok(self.iterate(step)?.map(move |s| {
            let e = step.add_to(s).map_or(end, |e| e.min(end));
            Interval::from_bounds(Bound::At(s), Bound::At(e))
        }))
    }
}

/// The next midnight.  Dates at the end of the calendar have no next
/// midnight, the interval is then unbounded.
pub(crate) fn midnight_after(date: NaiveDate) -> Bound {
    date.succ_opt()
        .map_or(Bound::PosInfinity, |d| Bound::At(d.and_time(NaiveTime::MIN)))
}

/// Iterator over the timestamps of an interval, see Interval::iterate
pub struct Steps {
    next: Option<NaiveDateTime>,
    end: NaiveDateTime,
    step: Shift,
}

impl Iterator for Steps {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|n| *n < self.end)?;
        self.next = self.step.add_to(current).ok();
        Some(current)
    }
}

impl ToInterval for Interval {
    fn to_interval(&self) -> Interval {
        *self
    }
}

impl ToInterval for NaiveDateTime {
    fn to_interval(&self) -> Interval {
        Interval::empty(*self)
    }
}

impl ToInterval for NaiveDate {
    fn to_interval(&self) -> Interval {
        Interval::day(*self)
    }
}

impl<T: ToInterval + ?Sized> ToInterval for &T {
    fn to_interval(&self) -> Interval {
        (**self).to_interval()
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.start {
            Bound::At(s) => write!(f, "{}", format_time_point(&s))?,
            Bound::NegInfinity | Bound::PosInfinity => write!(f, "{INFINITY}")?,
        }
        write!(f, "/")?;
        match self.end {
            Bound::At(e) => write!(f, "{}", format_time_point(&e)),
            Bound::NegInfinity | Bound::PosInfinity => write!(f, "{INFINITY}"),
        }
    }
}

impl std::fmt::Debug for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({self})")
    }
}

impl std::str::FromStr for Interval {
    type Err = Error;
    fn from_str(text: &str) -> Result<Self> {
        Interval::parse(text)
    }
}

impl serde::Serialize for Interval {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Interval {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Interval::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::times::Period;
    use proptest::prelude::*;

    fn intv(text: &str) -> Interval {
        Interval::parse(text).unwrap()
    }

    fn time(text: &str) -> NaiveDateTime {
        parse_time_point(text).unwrap()
    }

    #[test]
    fn test_parse() {
        let i = intv("2022-01-01T10:00/2022-01-01T12:00");
        assert_eq!(i.start(), Some(time("2022-01-01T10:00")));
        assert_eq!(i.end(), Some(time("2022-01-01T12:00")));
        assert_eq!(i.to_string(), "2022-01-01T10:00/2022-01-01T12:00");

        assert_eq!(intv(" 2022-01-01T10:00/PT2H "), i);
        assert_eq!(intv("PT2H/2022-01-01T12:00"), i);
        assert_eq!(
            intv("2022-01-01/P1M"),
            intv("2022-01-01T00:00/2022-02-01T00:00"),
        );
        assert_eq!(intv("∞/∞"), Interval::forever());
        assert_eq!(intv("2022-01-01/∞").to_string(), "2022-01-01T00:00/∞");
        assert_eq!(
            intv("2022-01-01T10:00:30/∞").to_string(),
            "2022-01-01T10:00:30/∞",
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Interval::parse("2022-01-01"),
            Err(Error::IntervalSyntax { .. }),
        ));
        assert!(matches!(
            Interval::parse("P1D/PT1H"),
            Err(Error::IntervalSyntax { .. }),
        ));
        assert!(matches!(
            Interval::parse("P1D/∞"),
            Err(Error::IntervalSyntax { .. }),
        ));
        assert!(matches!(
            Interval::parse("∞/P1D"),
            Err(Error::IntervalSyntax { .. }),
        ));
        assert!(matches!(
            Interval::parse("2022-01-01/tomorrow"),
            Err(Error::IntervalSyntax { .. }),
        ));
        assert!(matches!(
            Interval::parse("2022-01-02/2022-01-01"),
            Err(Error::InvalidInterval { .. }),
        ));
        assert_eq!(
            Interval::parse("P1D/∞").unwrap_err().to_string(),
            "Text cannot be parsed to a Period/- or -/Duration format: \"P1D/∞\"",
        );
    }

    #[test]
    fn test_between() {
        assert!(Interval::between(
            Some(time("2022-01-02")),
            Some(time("2022-01-01"))
        )
        .is_err());
        let t = time("2022-01-02");
        let e = Interval::between(Some(t), Some(t)).unwrap();
        assert!(e.is_empty());
        assert_eq!(e, Interval::empty(time("2022-01-02")));
        assert!(!Interval::forever().is_empty());
        assert!(Interval::since(time("2022-01-01")).has_infinite_end());
        assert!(Interval::until(time("2022-01-01")).has_infinite_start());
        assert!(!Interval::until(time("2022-01-01")).is_finite());
    }

    #[test]
    fn test_relations() {
        let a = intv("2022-01-01/2022-01-05");
        let check = |other: &str, expected: Relation| {
            assert_eq!(a.relation_with(&intv(other)), expected, "{a} vs {other}");
        };
        check("2022-01-06/2022-01-10", Relation::Precedes);
        check("2022-01-05/2022-01-10", Relation::Meets);
        check("2022-01-03/2022-01-10", Relation::Overlaps);
        check("2022-01-03/2022-01-05", Relation::FinishedBy);
        check("2022-01-02/2022-01-03", Relation::Encloses);
        check("2022-01-01/2022-01-10", Relation::Starts);
        check("2022-01-01/2022-01-05", Relation::Equals);
        check("2022-01-01/2022-01-03", Relation::StartedBy);
        check("2021-12-01/2022-01-10", Relation::EnclosedBy);
        check("2021-12-01/2022-01-05", Relation::Finishes);
        check("2021-12-01/2022-01-03", Relation::OverlappedBy);
        check("2021-12-01/2022-01-01", Relation::MetBy);
        check("2021-12-01/2021-12-05", Relation::PrecededBy);

        check("∞/∞", Relation::EnclosedBy);
        check("∞/2022-01-01", Relation::MetBy);
        check("2022-01-05/∞", Relation::Meets);
        check("2022-01-01/∞", Relation::Starts);
    }

    #[test]
    fn test_predicates() {
        let a = intv("2022-01-01/2022-01-05");
        let b = intv("2022-01-05/2022-01-10");
        assert!(a.meets(&b));
        assert!(b.met_by(&a));
        assert!(a.is_before(&b));
        assert!(b.is_after(&a));
        assert!(!a.intersects(&b));
        assert!(!a.is_after(&b));

        let forever = Interval::forever();
        assert!(!forever.is_before(&a));
        assert!(forever.contains(&a));
        assert!(forever.intersects(&a));
        assert!(a.enclosed_by(&forever));

        //  Points
        let t = time("2022-01-03");
        assert!(a.contains(&t));
        assert!(a.contains_point(t));
        assert!(!a.contains_point(time("2022-01-05")));
        assert!(a.is_before(&time("2022-01-05")));
        assert!(a.contains(&time("2022-01-01")));

        //  Empty intervals contain nothing
        let empty = Interval::empty(t);
        assert!(!empty.contains(&empty));
        assert!(!empty.contains(&t));
        assert!(a.contains(&empty));
    }

    #[test]
    fn test_intersection() {
        let a = intv("2022-01-01/2022-01-10");
        assert_eq!(
            a.find_intersection(&intv("2022-01-05/∞")),
            Some(intv("2022-01-05/2022-01-10")),
        );
        assert_eq!(a.find_intersection(&intv("2022-01-10/∞")), None);
        assert_eq!(a.find_intersection(&Interval::forever()), Some(a));
    }

    #[test]
    fn test_subtract() {
        let a = intv("2022-01-01/2022-02-01");
        assert_eq!(
            a.subtract(&intv("2022-01-15/∞")),
            vec![intv("2022-01-01/2022-01-15")],
        );
        assert_eq!(
            a.subtract(&intv("2022-01-10/2022-01-15")),
            vec![intv("2022-01-01/2022-01-10"), intv("2022-01-15/2022-02-01")],
        );
        assert_eq!(
            a.subtract(&intv("∞/2022-01-10")),
            vec![intv("2022-01-10/2022-02-01")],
        );
        assert!(a.subtract(&a).is_empty());
        assert_eq!(a.subtract(&intv("2022-03-01/∞")), vec![a]);
        assert_eq!(
            Interval::forever().subtract(&a),
            vec![intv("∞/2022-01-01"), intv("2022-02-01/∞")],
        );
    }

    #[test]
    fn test_containers() {
        let containers = Interval::disjoint_containers_of([
            intv("2022-01-10/2022-01-20"),
            intv("2022-01-01/2022-01-05"),
            intv("2022-01-05/2022-01-07"),
            intv("2022-01-15/2022-01-18"),
        ]);
        assert_eq!(
            containers,
            vec![intv("2022-01-01/2022-01-07"), intv("2022-01-10/2022-01-20")],
        );

        let containers = Interval::disjoint_containers_of([
            intv("2022-01-01/2022-01-05"),
            intv("2022-01-03/∞"),
            intv("2022-03-01/2022-03-05"),
        ]);
        assert_eq!(containers, vec![intv("2022-01-01/∞")]);

        assert!(Interval::disjoint_containers_of(Vec::<Interval>::new())
            .is_empty());
        assert_eq!(Interval::container_of(Vec::<Interval>::new()), None);
        assert_eq!(
            Interval::container_of([
                intv("2022-01-10/2022-01-20"),
                intv("2022-01-01/2022-01-05"),
            ]),
            Some(intv("2022-01-01/2022-01-20")),
        );
        assert_eq!(
            Interval::container_of([
                Interval::empty(time("2022-01-03")),
                intv("∞/2022-01-01"),
            ]),
            Some(intv("∞/2022-01-03")),
        );
    }

    #[test]
    fn test_ord() {
        let mut all = vec![
            intv("2022-01-01/∞"),
            intv("2022-01-01/2022-01-02"),
            intv("∞/2022-01-05"),
            intv("∞/∞"),
        ];
        all.sort();
        assert_eq!(
            all,
            vec![
                intv("∞/2022-01-05"),
                intv("∞/∞"),
                intv("2022-01-01/2022-01-02"),
                intv("2022-01-01/∞"),
            ],
        );
        let day = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        assert_eq!(intv("2022-01-01/2022-01-02").compare(&day), Ordering::Equal);
        assert_eq!(
            intv("2022-01-01/2022-01-02").compare(&time("2022-01-01T10:00")),
            Ordering::Less,
        );
        assert!(intv("2022-01-01/2022-01-02").equals(&day));
    }

    #[test]
    fn test_days() {
        let i = intv("2022-01-01T10:00/2022-01-03T12:00");
        assert_eq!(i.to_full_days(), intv("2022-01-01/2022-01-04"));
        assert!(!i.is_full_days());
        assert!(intv("2022-01-01/2022-01-04").is_full_days());
        assert_eq!(
            Interval::empty(time("2022-01-01")).to_full_days(),
            intv("2022-01-01/2022-01-02"),
        );
        assert_eq!(
            Interval::day(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()),
            intv("2022-01-01/2022-01-02"),
        );
        assert_eq!(Interval::month(2022, 2).unwrap(), intv("2022-02-01/2022-03-01"));
        assert_eq!(Interval::year(2022).unwrap(), intv("2022-01-01/2023-01-01"));
        assert_eq!(
            Interval::iso_week(2022, 1).unwrap(),
            intv("2022-01-03/2022-01-10"),
        );
        assert!(Interval::month(2022, 13).is_err());
    }

    #[test]
    fn test_with_bounds() {
        let i = intv("2022-01-01/2022-01-03");
        assert_eq!(
            i.with_start(None).unwrap(),
            intv("∞/2022-01-03"),
        );
        assert_eq!(
            i.with_end(Some(time("2022-01-02"))).unwrap(),
            intv("2022-01-01/2022-01-02"),
        );
        assert!(i.with_end(Some(time("2021-01-01"))).is_err());
        assert!(matches!(
            intv("∞/2022-01-03").finite_start(),
            Err(Error::Unbounded { .. }),
        ));
        assert_eq!(i.finite_end().unwrap(), time("2022-01-03"));
    }

    #[test]
    fn test_duration() {
        assert_eq!(
            intv("2022-01-01/2022-01-03").duration().unwrap(),
            TimeDelta::days(2),
        );
        assert!(matches!(
            intv("2022-01-01/∞").duration(),
            Err(Error::Unbounded { .. }),
        ));
        assert_eq!(
            intv("2022-01-01/2022-01-03")
                .move_by(&Shift::Period(Period::months(1)))
                .unwrap(),
            intv("2022-02-01/2022-02-03"),
        );
        assert_eq!(
            intv("2022-01-01/∞")
                .move_by(&Shift::Duration(TimeDelta::hours(1)))
                .unwrap(),
            intv("2022-01-01T01:00/∞"),
        );
    }

    #[test]
    fn test_iterate() {
        let i = intv("2022-01-01/2022-01-02T12:00");
        let points: Vec<_> = i
            .iterate(Shift::Duration(TimeDelta::hours(12)))
            .unwrap()
            .collect();
        assert_eq!(
            points,
            vec![time("2022-01-01"), time("2022-01-01T12:00"), time("2022-01-02")],
        );
        let slices: Vec<_> =
            i.slice(Shift::Period(Period::days(1))).unwrap().collect();
        assert_eq!(
            slices,
            vec![intv("2022-01-01/2022-01-02"), intv("2022-01-02/2022-01-02T12:00")],
        );
        assert!(matches!(
            i.iterate(Shift::Period(Period::default())),
            Err(Error::InvalidStep { .. }),
        ));
        assert!(matches!(
            Interval::forever().iterate(Shift::Period(Period::days(1))),
            Err(Error::Unbounded { .. }),
        ));
    }

    #[test]
    fn test_serde() {
        let i = intv("2022-01-01T10:00/∞");
        let json = serde_json::to_string(&i).unwrap();
        assert_eq!(json, "\"2022-01-01T10:00/∞\"");
        let back: Interval = serde_json::from_str(&json).unwrap();
        assert_eq!(back, i);
        assert!(serde_json::from_str::<Interval>("\"nonsense\"").is_err());
    }

    fn arb_bound_time() -> impl Strategy<Value = NaiveDateTime> {
        //  A small set of timestamps, to get many equal bounds
        (0i64..20).prop_map(|h| {
            time("2022-01-01") + TimeDelta::hours(h)
        })
    }

    fn arb_interval() -> impl Strategy<Value = Interval> {
        (
            proptest::option::weighted(0.85, arb_bound_time()),
            proptest::option::weighted(0.85, arb_bound_time()),
        )
            .prop_map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) if a > b => {
                    Interval::between(Some(b), Some(a)).unwrap()
                }
                _ => Interval::between(a, b).unwrap(),
            })
    }

    proptest! {
        #[test]
        fn prop_relation_inverse(a in arb_interval(), b in arb_interval()) {
            prop_assert_eq!(
                a.relation_with(&b).inverse(),
                b.relation_with(&a),
            );
        }

        #[test]
        fn prop_intersects_commutes(a in arb_interval(), b in arb_interval()) {
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        }

        #[test]
        fn prop_subtract_reunion(a in arb_interval(), b in arb_interval()) {
            let pieces = a.subtract(&b);
            if !a.is_empty() {
                for p in &pieces {
                    prop_assert!(!p.is_empty());
                    prop_assert!(!p.intersects(&b) || b.is_empty());
                    prop_assert!(a.contains(p));
                }
            }
            if !a.is_empty() && !b.is_empty() {
                let mut all = pieces.clone();
                if let Some(common) = a.find_intersection(&b) {
                    if !common.is_empty() {
                        all.push(common);
                    }
                }
                let rebuilt = Interval::disjoint_containers_of(all);
                prop_assert_eq!(rebuilt, vec![a]);
            }
        }

        #[test]
        fn prop_text_roundtrip(a in arb_interval()) {
            prop_assert_eq!(Interval::parse(&a.to_string()).unwrap(), a);
        }
    }
}
