//! Travel sense along a road and angular slots around an intersection.

use std::fmt;

// ── Direction ─────────────────────────────────────────────────────────────────

/// Which way a vehicle travels along a road.
///
/// `Forward` runs from the road's start intersection to its end intersection;
/// `Backward` is only legal on duplex roads.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub const BOTH: [Direction; 2] = [Direction::Forward, Direction::Backward];

    /// Index into per-direction `[T; 2]` arrays.
    #[inline(always)]
    pub fn index(self) -> usize {
        match self {
            Direction::Forward  => 0,
            Direction::Backward => 1,
        }
    }

    #[inline]
    pub fn reverse(self) -> Direction {
        match self {
            Direction::Forward  => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

// ── Approach ──────────────────────────────────────────────────────────────────

/// One of the four road slots of an intersection, clockwise from north.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Approach {
    North = 0,
    East  = 1,
    South = 2,
    West  = 3,
}

impl Approach {
    pub const ALL: [Approach; 4] = [Approach::North, Approach::East, Approach::South, Approach::West];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Slot for any integer, taken modulo 4.
    #[inline]
    pub fn from_index(i: usize) -> Approach {
        Self::ALL[i % 4]
    }

    /// The slot `n` clockwise steps from `self`.
    #[inline]
    pub fn rotate(self, n: usize) -> Approach {
        Self::from_index(self.index() + n)
    }

    #[inline]
    pub fn opposite(self) -> Approach {
        self.rotate(2)
    }

    /// Clockwise steps from `self` to `other`, in `0..4`.
    ///
    /// Seen from a vehicle arriving on `self`, an exit at offset 1 is a left
    /// turn, 2 is straight through and 3 is a right turn.
    #[inline]
    pub fn offset_to(self, other: Approach) -> usize {
        (other.index() + 4 - self.index()) % 4
    }
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Approach::North => "N",
            Approach::East  => "E",
            Approach::South => "S",
            Approach::West  => "W",
        };
        f.write_str(s)
    }
}
