//! Time intervals, Allen's interval algebra, interval trees and timelines.

mod bounds;
pub mod date_intervals;
pub mod errors;
pub mod intervals;
pub mod relations;
pub mod timelines;
pub mod times;
pub mod trees;

pub use date_intervals::DateInterval;
pub use errors::{Error, ImportConflict, RangeConflict, Result};
pub use intervals::{Interval, ToInterval};
pub use relations::{Relation, RelationSet};
pub use timelines::Timeline;
pub use times::{Period, Shift};
pub use trees::IntervalTree;
