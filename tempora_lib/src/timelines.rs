use crate::bounds::Bound;
use crate::errors::{Error, ImportConflict, RangeConflict, Result};
use crate::intervals::{Interval, ToInterval};
use crate::trees::IntervalTree;
use bisection::bisect_left_by;
use chrono::NaiveDateTime;
use itertools::Itertools;
use std::cmp::Ordering;

/// A value that changes over time.
/// This is a list of non-overlapping, non-empty intervals sorted in time,
/// each associated with a value.  There might be gaps between intervals, in
/// which case there is no value at that time.
///
/// Timelines are never modified once built: `add` and all the other
/// operations return a new timeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeline<T> {
    items: Vec<(Interval, T)>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Timeline<T> {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The same value at all times
    pub fn constant(value: T) -> Self {
        Self {
            items: vec![(Interval::forever(), value)],
        }
    }

    /// A single value, on the given range
    pub fn with(range: impl ToInterval, value: T) -> Self {
        let range = range.to_interval();
        if range.is_empty() {
            Self::empty()
        } else {
            Self {
                items: vec![(range, value)],
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Interval, &T)> {
        self.items.iter().map(|(range, value)| (range, value))
    }

    /// From the start of the first interval to the end of the last one
    pub fn span(&self) -> Option<Interval> {
        let (first, _) = self.items.first()?;
        let (last, _) = self.items.last()?;
        Some(Interval::from_bounds(first.start_bound(), last.end_bound()))
    }

    /// Where a new range would be inserted.  The range must not be empty.
    fn locate(
        &self,
        range: &Interval,
    ) -> std::result::Result<usize, RangeConflict> {
        let idx = bisect_left_by(&self.items, |(item, _)| {
            if item.is_before(range) {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        });
        match self.items.get(idx) {
            Some((existing, _)) if existing.intersects(range) => {
                Err(RangeConflict {
                    conflicting: *range,
                    existing: *existing,
                })
            }
            Some(_) | None => Ok(idx),
        }
    }

    /// Insert in place, while the timeline is being built.  Empty ranges are
    /// ignored.
    pub(crate) fn insert(
        &mut self,
        range: Interval,
        value: T,
    ) -> std::result::Result<(), RangeConflict> {
        if range.is_empty() {
            return Ok(());
        }
        let idx = self.locate(&range)?;
        self.items.insert(idx, (range, value));
        Ok(())
    }

    /// The value at the given time
    pub fn value_at(&self, time: NaiveDateTime) -> Option<&T> {
        let idx = bisect_left_by(&self.items, |(item, _)| {
            if item.is_before(&time) {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        });
        self.items
            .get(idx)
            .filter(|(item, _)| item.contains_point(time))
            .map(|(_, value)| value)
    }

    /// The items that intersect range, truncated to it
    fn kept(&self, range: &Interval) -> Vec<(Interval, &T)> {
        if range.is_empty() {
            return Vec::new();
        }
        let first = bisect_left_by(&self.items, |(item, _)| {
            if item.end_bound() <= range.start_bound() {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        });
        let last = bisect_left_by(&self.items, |(item, _)| {
            if item.start_bound() < range.end_bound() {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        });
        self.items
            .get(first..last)
            .unwrap_or_default()
            .iter()
            .map(|(item, value)| {
                (
                    Interval::from_bounds(
                        item.start_bound().max(range.start_bound()),
                        item.end_bound().min(range.end_bound()),
                    ),
                    value,
                )
            })
            .collect()
    }

    /// The value that applies on the whole range, if any.
    /// It is an error if several values apply on parts of the range, or if
    /// the only value applies on part of the range only.
    pub fn sole_value_in(&self, range: &Interval) -> Result<Option<&T>> {
        let kept = self.kept(range);
        match kept.as_slice() {
            [] => Ok(None),
            [(item, value)] if item == range => Ok(Some(*value)),
            [_] => Err(Error::AmbiguousRange {
                range: *range,
                reason: "The only value does not cover the whole range",
            }),
            [_, _, ..] => Err(Error::AmbiguousRange {
                range: *range,
                reason: "More than one value in range",
            }),
        }
    }

    /// Intervals of all items, possibly restricted to range
    pub fn time_ranges(&self, range: Option<&Interval>) -> Vec<Interval> {
        match range {
            None => self.items.iter().map(|(r, _)| *r).collect(),
            Some(range) => self.kept(range).into_iter().map(|(r, _)| r).collect(),
        }
    }

    /// Values of all items, possibly restricted to range
    pub fn values(&self, range: Option<&Interval>) -> Vec<&T> {
        match range {
            None => self.items.iter().map(|(_, v)| v).collect(),
            Some(range) => self.kept(range).into_iter().map(|(_, v)| v).collect(),
        }
    }

    /// Whether some times in range have no value
    pub fn has_blanks(&self, range: impl ToInterval) -> bool {
        let range = range.to_interval();
        let covered = Interval::disjoint_containers_of(
            self.kept(&range).into_iter().map(|(r, _)| r),
        );
        !matches!(covered.as_slice(), [only] if *only == range)
    }

    /// Transform each value.  The intervals are unchanged
    pub fn map<U, F>(&self, mut transform: F) -> Timeline<U>
    where
        F: FnMut(&T, &Interval) -> U,
    {
        Timeline {
            items: self
                .items
                .iter()
                .map(|(range, value)| (*range, transform(value, range)))
                .collect(),
        }
    }

    /// Combine all values, in time order
    pub fn reduce<B, F>(&self, init: B, mut accumulate: F) -> B
    where
        F: FnMut(B, &T, &Interval) -> B,
    {
        self.items
            .iter()
            .fold(init, |acc, (range, value)| accumulate(acc, value, range))
    }
}

impl<T: Clone> Timeline<T> {
    /// A new timeline with one more value.
    /// It is an error if range intersects an existing interval.  An empty
    /// range leaves the timeline unchanged.
    pub fn add(&self, range: impl ToInterval, value: T) -> Result<Self> {
        let mut timeline = self.clone();
        timeline.insert(range.to_interval(), value)?;
        Ok(timeline)
    }

    /// Restrict the timeline to range.  Items partially in range are
    /// truncated.
    pub fn keep(&self, range: impl ToInterval) -> Self {
        Self {
            items: self
                .kept(&range.to_interval())
                .into_iter()
                .map(|(r, v)| (r, v.clone()))
                .collect(),
        }
    }

    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&T, &Interval) -> bool,
    {
        Self {
            items: self
                .items
                .iter()
                .filter(|(range, value)| predicate(value, range))
                .cloned()
                .collect(),
        }
    }

    /// Merge consecutive items when they have the same value and there is
    /// no gap between them
    pub fn simplify(&self) -> Self
    where
        T: PartialEq,
    {
        self.simplify_by(|a, b| a == b)
    }

    /// Same as simplify, with a custom comparison of values.  When two items
    /// are merged, the value of the later one is kept.
    pub fn simplify_by<F>(&self, mut equals: F) -> Self
    where
        F: FnMut(&T, &T) -> bool,
    {
        let mut items: Vec<(Interval, T)> = Vec::with_capacity(self.len());
        for (range, value) in &self.items {
            if let Some((last_range, last_value)) = items.last_mut() {
                if last_range.meets(range) && equals(last_value, value) {
                    *last_range = Interval::from_bounds(
                        last_range.start_bound(),
                        range.end_bound(),
                    );
                    *last_value = value.clone();
                    continue;
                }
            }
            items.push((*range, value.clone()));
        }
        Self { items }
    }

    /// Synchronize several timelines.
    /// The result has one item for each range where at least one timeline
    /// has a value, and where none of the timelines changes value.  Each
    /// item holds the values of all timelines (in the same order), None for
    /// timelines that have no value on that range.
    pub fn zip_all(
        timelines: &[&Timeline<T>],
    ) -> Result<Timeline<Vec<Option<T>>>> {
        let mut infinite_start = false;
        let mut infinite_end = false;
        let mut times: Vec<NaiveDateTime> = Vec::new();
        for timeline in timelines {
            for (range, _) in &timeline.items {
                match range.start() {
                    Some(s) => times.push(s),
                    None => infinite_start = true,
                }
                match range.end() {
                    Some(e) => times.push(e),
                    None => infinite_end = true,
                }
            }
        }
        log::trace!(
            "zip {} timelines, {} boundaries",
            timelines.len(),
            times.len()
        );

        let bounds: Vec<Bound> = infinite_start
            .then_some(Bound::NegInfinity)
            .into_iter()
            .chain(times.into_iter().sorted().dedup().map(Bound::At))
            .chain(infinite_end.then_some(Bound::PosInfinity))
            .collect();

        let mut items = Vec::new();
        for (start, end) in bounds.into_iter().tuple_windows() {
            let slice = Interval::from_bounds(start, end);
            let values = timelines
                .iter()
                .map(|t| t.sole_value_in(&slice).map(|v| v.cloned()))
                .collect::<Result<Vec<Option<T>>>>()?;
            if values.iter().any(Option::is_some) {
                items.push((slice, values));
            }
        }
        Ok(Timeline { items })
    }

    /// Synchronize self with other timelines, see zip_all
    pub fn zip(
        &self,
        others: &[&Timeline<T>],
    ) -> Result<Timeline<Vec<Option<T>>>> {
        let all: Vec<&Timeline<T>> =
            std::iter::once(self).chain(others.iter().copied()).collect();
        Self::zip_all(&all)
    }

    /// Merge several timelines.  For each range, the value comes from the
    /// first timeline that has one.
    pub fn merge(timelines: &[&Timeline<T>]) -> Result<Self> {
        Ok(Self {
            items: Self::zip_all(timelines)?
                .items
                .into_iter()
                .filter_map(|(range, values)| {
                    values.into_iter().flatten().next().map(|v| (range, v))
                })
                .collect(),
        })
    }

    /// Merge several timelines, computing each value from the synchronized
    /// values of all timelines.
    pub fn merge_with<U, F>(
        timelines: &[&Timeline<T>],
        mut combine: F,
    ) -> Result<Timeline<U>>
    where
        F: FnMut(&[Option<T>], &Interval) -> U,
    {
        Ok(Self::zip_all(timelines)?
            .map(|values, range| combine(values.as_slice(), range)))
    }

    /// Add value on all parts of range that have no value yet
    pub fn fill_blanks(&self, range: impl ToInterval, value: T) -> Result<Self> {
        let range = range.to_interval();
        let zipped = self.keep(range).zip(&[&Timeline::with(range, value)])?;
        let mut timeline = self.clone();
        for (slice, values) in zipped.items {
            if !self.kept(&slice).is_empty() {
                continue;
            }
            if let Some(Some(v)) = values.into_iter().last() {
                timeline.insert(slice, v)?;
            }
        }
        Ok(timeline)
    }

    /// Build a timeline from values.  Each value is converted to zero, one or
    /// more (range, value) pairs by convert.  It is an error if the ranges
    /// overlap.
    pub fn import<S, I, K, V, F>(
        values: V,
        mut convert: F,
    ) -> std::result::Result<Self, ImportConflict<S>>
    where
        S: Clone + std::fmt::Debug,
        V: IntoIterator<Item = S>,
        F: FnMut(&S) -> I,
        I: IntoIterator<Item = (K, T)>,
        K: ToInterval,
    {
        let mut timeline = Self::empty();
        let mut sources: Timeline<S> = Timeline::empty();
        for value in values {
            for (key, converted) in convert(&value) {
                let range = key.to_interval();
                if let Err(conflict) = timeline.insert(range, converted) {
                    log::debug!("import conflict: {conflict}");
                    return Err(ImportConflict {
                        range,
                        occupied: sources.keep(range),
                        value,
                        source: conflict,
                    });
                }
                sources.insert(range, value.clone()).map_err(|conflict| {
                    ImportConflict {
                        range,
                        occupied: sources.keep(range),
                        value: value.clone(),
                        source: conflict,
                    }
                })?;
            }
        }
        log::debug!("imported {} items in timeline", timeline.len());
        Ok(timeline)
    }

    /// Build a timeline from values that are their own range, for instance
    /// a list of date intervals.
    pub fn import_ranges<V>(
        values: V,
    ) -> std::result::Result<Self, ImportConflict<T>>
    where
        T: ToInterval + std::fmt::Debug,
        V: IntoIterator<Item = T>,
    {
        Self::import(values, |v| [(v.to_interval(), v.clone())])
    }

    /// Flatten an interval tree, possibly restricted to range.  Overlapping
    /// intervals in the tree are split, so that each item of the result
    /// holds all values that apply on its range.
    pub fn from_tree(
        tree: &IntervalTree<T>,
        range: Option<&Interval>,
    ) -> Result<Timeline<Vec<T>>> {
        let mut layers: Vec<Timeline<T>> = Vec::new();
        for (key, value) in tree.stream(range) {
            if key.is_empty() {
                continue;
            }
            match layers.iter_mut().find(|l| l.locate(key).is_ok()) {
                Some(layer) => layer.insert(*key, value.clone())?,
                None => layers.push(Timeline::with(*key, value.clone())),
            }
        }
        log::debug!("flattening interval tree with {} layers", layers.len());

        let refs: Vec<&Timeline<T>> = layers.iter().collect();
        let zipped = Self::zip_all(&refs)?;
        let flat = Timeline {
            items: zipped
                .items
                .into_iter()
                .map(|(r, values)| (r, values.into_iter().flatten().collect()))
                .collect(),
        };
        Ok(match range {
            Some(r) => flat.keep(r),
            None => flat,
        })
    }
}

impl<T> IntoIterator for Timeline<T> {
    type Item = (Interval, T);
    type IntoIter = std::vec::IntoIter<(Interval, T)>;
    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
