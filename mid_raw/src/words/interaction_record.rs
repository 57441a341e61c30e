//! The [InteractionRecord] identifying the time of an event by bunch crossing and orbit.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::ops::{Add, Sub};

/// Number of bunch crossings in one LHC orbit.
pub const LHC_MAX_BUNCHES: u16 = 3564;

/// Bunch crossing and orbit of an event.
///
/// Ordered by orbit first, then by bunch crossing.
/// Adding or subtracting a number of bunch crossings wraps into the adjacent orbits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InteractionRecord {
    /// Bunch crossing, in `[0, LHC_MAX_BUNCHES)`
    pub bc: u16,
    /// Orbit counter
    pub orbit: u32,
}

impl InteractionRecord {
    /// Creates a new [InteractionRecord].
    pub const fn new(bc: u16, orbit: u32) -> Self {
        Self { bc, orbit }
    }

    /// Compact 64 bit encoding: `orbit << 12 | bc`.
    ///
    /// The encoding preserves the ordering of the records, it is used as key to sort events.
    #[inline]
    pub fn to_long(&self) -> u64 {
        (u64::from(self.orbit) << 12) | u64::from(self.bc)
    }

    /// Inverse of [InteractionRecord::to_long].
    #[inline]
    pub fn from_long(long: u64) -> Self {
        Self {
            bc: (long & 0xFFF) as u16,
            orbit: (long >> 12) as u32,
        }
    }

    /// Total number of bunch crossings since orbit 0.
    #[inline]
    pub fn to_bc_count(&self) -> i64 {
        i64::from(self.orbit) * i64::from(LHC_MAX_BUNCHES) + i64::from(self.bc)
    }

    /// Builds the record from a total number of bunch crossings, the orbit wraps around on 32 bits.
    #[inline]
    pub fn from_bc_count(bc_count: i64) -> Self {
        Self {
            bc: bc_count.rem_euclid(i64::from(LHC_MAX_BUNCHES)) as u16,
            orbit: bc_count.div_euclid(i64::from(LHC_MAX_BUNCHES)) as u32,
        }
    }

    /// Returns the record shifted by `n_bc` bunch crossings (which can be negative).
    #[inline]
    pub fn shifted(&self, n_bc: i64) -> Self {
        Self::from_bc_count(self.to_bc_count() + n_bc)
    }
}

impl Ord for InteractionRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.orbit
            .cmp(&other.orbit)
            .then_with(|| self.bc.cmp(&other.bc))
    }
}

impl PartialOrd for InteractionRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add<i64> for InteractionRecord {
    type Output = Self;
    fn add(self, n_bc: i64) -> Self {
        self.shifted(n_bc)
    }
}

impl Sub<i64> for InteractionRecord {
    type Output = Self;
    fn sub(self, n_bc: i64) -> Self {
        self.shifted(-n_bc)
    }
}

impl Display for InteractionRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "BCid: {:#x} Orbit: {:#x}", self.bc, self.orbit)
    }
}
