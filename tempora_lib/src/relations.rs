use std::ops::{BitOr, Not};

/// The relative position of two intervals, following Allen's interval
/// algebra.  Exactly one relation holds between any two intervals.
/// Each relation is a single bit, so that they can be combined in a
/// RelationSet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Relation {
    Precedes = 1 << 12,
    PrecededBy = 1 << 11,
    Meets = 1 << 10,
    MetBy = 1 << 9,
    Overlaps = 1 << 8,
    OverlappedBy = 1 << 7,
    Starts = 1 << 6,
    StartedBy = 1 << 5,
    Encloses = 1 << 4,
    EnclosedBy = 1 << 3,
    Finishes = 1 << 2,
    FinishedBy = 1 << 1,
    Equals = 1,
}

impl Relation {
    pub const ALL: [Relation; 13] = [
        Relation::Precedes,
        Relation::PrecededBy,
        Relation::Meets,
        Relation::MetBy,
        Relation::Overlaps,
        Relation::OverlappedBy,
        Relation::Starts,
        Relation::StartedBy,
        Relation::Encloses,
        Relation::EnclosedBy,
        Relation::Finishes,
        Relation::FinishedBy,
        Relation::Equals,
    ];

    pub const fn bit(self) -> u16 {
        self as u16
    }

    /// The relation seen from the other interval: if A precedes B, then
    /// B is preceded by A.
    pub fn inverse(self) -> Relation {
        match self {
            Relation::Precedes => Relation::PrecededBy,
            Relation::PrecededBy => Relation::Precedes,
            Relation::Meets => Relation::MetBy,
            Relation::MetBy => Relation::Meets,
            Relation::Overlaps => Relation::OverlappedBy,
            Relation::OverlappedBy => Relation::Overlaps,
            Relation::Starts => Relation::StartedBy,
            Relation::StartedBy => Relation::Starts,
            Relation::Encloses => Relation::EnclosedBy,
            Relation::EnclosedBy => Relation::Encloses,
            Relation::Finishes => Relation::FinishedBy,
            Relation::FinishedBy => Relation::Finishes,
            Relation::Equals => Relation::Equals,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Relation::Precedes => "precedes",
            Relation::PrecededBy => "preceded by",
            Relation::Meets => "meets",
            Relation::MetBy => "met by",
            Relation::Overlaps => "overlaps",
            Relation::OverlappedBy => "overlapped by",
            Relation::Starts => "starts",
            Relation::StartedBy => "started by",
            Relation::Encloses => "encloses",
            Relation::EnclosedBy => "enclosed by",
            Relation::Finishes => "finishes",
            Relation::FinishedBy => "finished by",
            Relation::Equals => "equals",
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A set of relations, stored as a bitmask
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RelationSet(u16);

impl RelationSet {
    pub const EMPTY: RelationSet = RelationSet(0);
    pub const ALL: RelationSet = RelationSet((1 << 13) - 1);

    /// The relations for which the first interval contains the second one
    pub const CONTAINS: RelationSet = RelationSet::EMPTY
        .with(Relation::Encloses)
        .with(Relation::Equals)
        .with(Relation::StartedBy)
        .with(Relation::FinishedBy);

    /// The relations for which the two intervals have no time in common
    pub const DISJOINT: RelationSet = RelationSet::EMPTY
        .with(Relation::Precedes)
        .with(Relation::PrecededBy)
        .with(Relation::Meets)
        .with(Relation::MetBy);

    pub const fn with(self, relation: Relation) -> Self {
        RelationSet(self.0 | relation.bit())
    }

    pub fn contains(&self, relation: Relation) -> bool {
        self.0 & relation.bit() != 0
    }

    pub fn complement(&self) -> Self {
        RelationSet(!self.0 & RelationSet::ALL.0)
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    /// The relations in the set, in the order of Relation::ALL
    pub fn iter(&self) -> impl Iterator<Item = Relation> + '_ {
        Relation::ALL.into_iter().filter(|r| self.contains(*r))
    }
}

impl From<Relation> for RelationSet {
    fn from(relation: Relation) -> Self {
        RelationSet::EMPTY.with(relation)
    }
}

impl BitOr for Relation {
    type Output = RelationSet;
    fn bitor(self, rhs: Relation) -> RelationSet {
        RelationSet::from(self).with(rhs)
    }
}

impl BitOr<Relation> for RelationSet {
    type Output = RelationSet;
    fn bitor(self, rhs: Relation) -> RelationSet {
        self.with(rhs)
    }
}

impl BitOr for RelationSet {
    type Output = RelationSet;
    fn bitor(self, rhs: RelationSet) -> RelationSet {
        RelationSet(self.0 | rhs.0)
    }
}

impl Not for RelationSet {
    type Output = RelationSet;
    fn not(self) -> RelationSet {
        self.complement()
    }
}

impl FromIterator<Relation> for RelationSet {
    fn from_iter<I: IntoIterator<Item = Relation>>(iter: I) -> Self {
        iter.into_iter().fold(RelationSet::EMPTY, RelationSet::with)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bits() {
        assert_eq!(Relation::Precedes.bit(), 4096);
        assert_eq!(Relation::Equals.bit(), 1);
        let all: u16 = Relation::ALL.iter().map(|r| r.bit()).sum();
        assert_eq!(all, RelationSet::ALL.bits());
        assert_eq!(RelationSet::ALL.len(), 13);
    }

    #[test]
    fn test_inverse() {
        for r in Relation::ALL {
            assert_eq!(r.inverse().inverse(), r);
        }
        assert_eq!(Relation::Meets.inverse(), Relation::MetBy);
        assert_eq!(Relation::Equals.inverse(), Relation::Equals);
        assert_eq!(Relation::Encloses.to_string(), "encloses");
    }

    #[test]
    fn test_set() {
        let set = Relation::Meets | Relation::Precedes;
        assert!(set.contains(Relation::Meets));
        assert!(!set.contains(Relation::MetBy));
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Relation::Precedes, Relation::Meets],
        );

        let others = !set;
        assert_eq!(others.len(), 11);
        assert!(!others.contains(Relation::Meets));
        assert_eq!(others | set, RelationSet::ALL);
        assert!(RelationSet::EMPTY.is_empty());

        let collected: RelationSet =
            [Relation::Precedes, Relation::Meets].into_iter().collect();
        assert_eq!(collected, set);
        assert_eq!(
            RelationSet::DISJOINT,
            set | Relation::PrecededBy | Relation::MetBy,
        );
    }
}
