//! Contains [Filterer], removing the masked channels from the data.

use crate::util::*;

/// Applies channel masks to column data.
#[derive(Debug, Default, Clone)]
pub struct Filterer {
    masks: ChannelMasks,
    data: Vec<ColumnData>,
    rofs: Vec<RofRecord>,
}

impl Filterer {
    /// Creates a filterer with the given masks.
    pub fn new(masks: ChannelMasks) -> Self {
        Self {
            masks,
            ..Default::default()
        }
    }

    /// Replaces the masks.
    pub fn set_masks(&mut self, masks: ChannelMasks) {
        self.masks = masks;
    }

    /// Masks the data, replacing the previous output. `rofs` index into `data`.
    ///
    /// Fully masked columns are removed, and events without any column left are removed too.
    pub fn process(&mut self, data: &[ColumnData], rofs: &[RofRecord]) {
        self.data.clear();
        self.rofs.clear();
        for rof in rofs {
            let first_entry = self.data.len();
            for col in &data[rof.range()] {
                let mut col = *col;
                if self.masks.apply_mask(&mut col) {
                    self.data.push(col);
                }
            }
            let n_entries = self.data.len() - first_entry;
            if n_entries > 0 {
                self.rofs.push(RofRecord {
                    first_entry,
                    n_entries,
                    ..*rof
                });
            }
        }
    }

    /// Filtered data.
    #[inline]
    pub fn data(&self) -> &[ColumnData] {
        &self.data
    }

    /// Events of the filtered data.
    #[inline]
    pub fn rof_records(&self) -> &[RofRecord] {
        &self.rofs
    }
}
