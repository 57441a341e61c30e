//! Contains [ColumnDataHandler], merging column data of several events into one.

use crate::util::*;

/// Merges column data, one entry per column, in order of first appearance.
#[derive(Debug, Default, Clone)]
pub struct ColumnDataHandler {
    merged: Vec<ColumnData>,
    indexes: HashMap<u16, usize>,
}

impl ColumnDataHandler {
    /// Creates an empty handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the columns, the patterns of a column already present are combined with a bitwise OR.
    pub fn merge(&mut self, data: &[ColumnData]) {
        for col in data {
            match self.indexes.get(&col.column_key()) {
                Some(&index) => self.merged[index] |= col,
                None => {
                    let _ = self.indexes.insert(col.column_key(), self.merged.len());
                    self.merged.push(*col);
                }
            }
        }
    }

    /// The merged columns.
    #[inline]
    pub fn merged(&self) -> &[ColumnData] {
        &self.merged
    }

    /// Removes all columns.
    pub fn clear(&mut self) {
        self.merged.clear();
        self.indexes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge() {
        let mut handler = ColumnDataHandler::new();
        handler.merge(&[
            ColumnData::from_patterns(3, 1, 0, [0x4, 0, 0, 0]),
            ColumnData::from_patterns(3, 2, 0x1, [0; 4]),
        ]);
        handler.merge(&[ColumnData::from_patterns(3, 1, 0x2, [0x8, 0, 0, 0])]);
        assert_eq!(
            handler.merged(),
            &[
                ColumnData::from_patterns(3, 1, 0x2, [0xC, 0, 0, 0]),
                ColumnData::from_patterns(3, 2, 0x1, [0; 4]),
            ]
        );
        handler.clear();
        assert!(handler.merged().is_empty());
    }
}
