use chrono::NaiveDateTime;

/// One side of an interval.
/// A missing start is represented as NegInfinity and a missing end as
/// PosInfinity, so that the derived ordering sorts unbounded starts before
/// any timestamp, and unbounded ends after any timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Bound {
    NegInfinity,
    At(NaiveDateTime),
    PosInfinity,
}

impl Bound {
    /// The bound to use as the start of an interval
    pub fn start(time: Option<NaiveDateTime>) -> Self {
        time.map_or(Bound::NegInfinity, Bound::At)
    }

    /// The bound to use as the end of an interval
    pub fn end(time: Option<NaiveDateTime>) -> Self {
        time.map_or(Bound::PosInfinity, Bound::At)
    }

    /// The timestamp, unless the bound is infinite
    pub fn time(&self) -> Option<NaiveDateTime> {
        match self {
            Bound::At(t) => Some(*t),
            Bound::NegInfinity | Bound::PosInfinity => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, Bound::At(_))
    }
}
