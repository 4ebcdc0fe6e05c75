use crate::intervals::Interval;
use crate::timelines::Timeline;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Start after end: {start} / {end}")]
    InvalidInterval { start: String, end: String },

    #[error("{reason}: \"{text}\"")]
    IntervalSyntax { text: String, reason: String },

    #[error(transparent)]
    RangeConflict(#[from] RangeConflict),

    #[error("{reason} (in \"{range}\")")]
    AmbiguousRange {
        range: Interval,
        reason: &'static str,
    },

    #[error("The interval \"{interval}\" is unbounded, cannot compute its {operation}")]
    Unbounded {
        interval: String,
        operation: &'static str,
    },

    #[error("Iteration step {step} does not move forward")]
    InvalidStep { step: String },

    #[error("Invalid calendar date: {0}")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Raised when inserting a range in a timeline that already holds a value
/// for part of that range.  Both ranges are reported so that callers can
/// retry elsewhere (for instance in another timeline).
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("\"{conflicting}\" conflicts with \"{existing}\"")]
pub struct RangeConflict {
    pub conflicting: Interval,
    pub existing: Interval,
}

/// Raised by `Timeline::import` when one of the imported values cannot be
/// added.  This carries the offending value, and a timeline of the values
/// already imported that occupy its range.
#[derive(thiserror::Error, Debug)]
#[error("Cannot import {value:?} in \"{range}\": {source}")]
pub struct ImportConflict<S: std::fmt::Debug> {
    pub range: Interval,
    pub value: S,
    pub occupied: Timeline<S>,
    #[source]
    pub source: RangeConflict,
}
