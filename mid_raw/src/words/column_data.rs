//! The [ColumnData] holding the strip patterns of one column of a detection element.

use std::fmt::{self, Display};
use std::ops::BitOrAssign;

/// Index of the non-bending plane pattern in [ColumnData::patterns].
const NBP_INDEX: usize = 4;

/// Strip patterns of one column of a detection element.
///
/// Each column has up to 4 lines of strips in the bending plane (one per local board)
/// and a single pattern of strips in the non-bending plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColumnData {
    /// Detection element ID
    pub de_id: u8,
    /// Column ID in the detection element
    pub column_id: u8,
    /// Bending plane patterns of lines 0 to 3, followed by the non-bending plane pattern
    pub patterns: [u16; 5],
}

impl ColumnData {
    /// Creates an empty column.
    pub const fn new(de_id: u8, column_id: u8) -> Self {
        Self {
            de_id,
            column_id,
            patterns: [0; 5],
        }
    }

    /// Creates a column from its non-bending pattern and its 4 bending patterns.
    pub const fn from_patterns(de_id: u8, column_id: u8, nbp: u16, bp: [u16; 4]) -> Self {
        Self {
            de_id,
            column_id,
            patterns: [bp[0], bp[1], bp[2], bp[3], nbp],
        }
    }

    /// Sets the bending plane pattern of a line.
    #[inline]
    pub fn set_bend_pattern(&mut self, pattern: u16, line: usize) {
        self.patterns[line] = pattern;
    }

    /// Gets the bending plane pattern of a line.
    #[inline]
    pub fn bend_pattern(&self, line: usize) -> u16 {
        self.patterns[line]
    }

    /// Sets the non-bending plane pattern.
    #[inline]
    pub fn set_non_bend_pattern(&mut self, pattern: u16) {
        self.patterns[NBP_INDEX] = pattern;
    }

    /// Gets the non-bending plane pattern.
    #[inline]
    pub fn non_bend_pattern(&self) -> u16 {
        self.patterns[NBP_INDEX]
    }

    // Cathode 0 is the bending plane, cathode 1 the non-bending plane
    #[inline]
    fn pattern_index(cathode: usize, line: usize) -> usize {
        if cathode == 0 {
            line
        } else {
            NBP_INDEX
        }
    }

    /// Gets the pattern of a cathode, the line is ignored for the non-bending plane.
    #[inline]
    pub fn pattern(&self, cathode: usize, line: usize) -> u16 {
        self.patterns[Self::pattern_index(cathode, line)]
    }

    /// Sets the pattern of a cathode, the line is ignored for the non-bending plane.
    #[inline]
    pub fn set_pattern(&mut self, pattern: u16, cathode: usize, line: usize) {
        self.patterns[Self::pattern_index(cathode, line)] = pattern;
    }

    /// Adds a strip to the pattern.
    #[inline]
    pub fn add_strip(&mut self, strip: usize, cathode: usize, line: usize) {
        self.patterns[Self::pattern_index(cathode, line)] |= 1 << strip;
    }

    /// Checks if the strip is fired.
    #[inline]
    pub fn is_strip(&self, strip: usize, cathode: usize, line: usize) -> bool {
        self.pattern(cathode, line) >> strip & 0x1 == 1
    }

    /// Checks if no bending plane strip is fired.
    #[inline]
    pub fn is_bp_empty(&self) -> bool {
        self.patterns[..NBP_INDEX].iter().all(|&p| p == 0)
    }

    /// Checks if no non-bending plane strip is fired.
    #[inline]
    pub fn is_nbp_empty(&self) -> bool {
        self.non_bend_pattern() == 0
    }

    /// Checks if no strip is fired.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.patterns.iter().all(|&p| p == 0)
    }

    /// Key combining detection element and column, unique for a column in the detector.
    #[inline]
    pub fn column_key(&self) -> u16 {
        make_column_key(self.de_id, self.column_id)
    }
}

/// Key combining detection element and column.
#[inline]
pub fn make_column_key(de_id: u8, column_id: u8) -> u16 {
    u16::from(de_id) << 8 | u16::from(column_id)
}

impl BitOrAssign<&ColumnData> for ColumnData {
    /// Merges the patterns of another column into this one.
    fn bitor_assign(&mut self, rhs: &ColumnData) {
        for (pattern, other) in self.patterns.iter_mut().zip(rhs.patterns.iter()) {
            *pattern |= other;
        }
    }
}

impl Display for ColumnData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "deId: {:>2}  col: {}  NBP: {:#06x}  BP: {:#06x} {:#06x} {:#06x} {:#06x}",
            self.de_id,
            self.column_id,
            self.non_bend_pattern(),
            self.patterns[0],
            self.patterns[1],
            self.patterns[2],
            self.patterns[3]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strips() {
        let mut col = ColumnData::new(3, 1);
        assert!(col.is_empty());
        col.add_strip(2, 0, 0);
        col.add_strip(3, 0, 0);
        col.add_strip(15, 1, 3);
        assert_eq!(col.bend_pattern(0), (1 << 2) | (1 << 3));
        assert_eq!(col.non_bend_pattern(), 0x8000);
        assert!(col.is_strip(15, 1, 0));
        assert!(!col.is_strip(15, 0, 3));
        assert!(!col.is_bp_empty());
        assert!(!col.is_nbp_empty());
    }

    #[test]
    fn test_merge() {
        let mut col = ColumnData::from_patterns(3, 1, 0x1, [0x1, 0, 0, 0x8]);
        col |= &ColumnData::from_patterns(3, 1, 0x2, [0x2, 0x4, 0, 0]);
        assert_eq!(col.patterns, [0x3, 0x4, 0, 0x8, 0x3]);
    }

    #[test]
    fn test_column_key() {
        assert_eq!(ColumnData::new(71, 6).column_key(), 0x4706);
    }
}
