//! Contains [ChannelMasks], the masks of the channels excluded from the data.
//!
//! A mask has the layout of a [ColumnData]: a bit set to 1 keeps the strip, a bit set to 0 removes it.
//! Columns without a mask are kept as they are.

use crate::util::*;

/// Masks per column of detection element.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChannelMasks {
    masks: BTreeMap<u16, ColumnData>,
}

impl ChannelMasks {
    /// Creates masks that keep every channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the masks from a list of column masks.
    pub fn from_masks(masks: &[ColumnData]) -> Self {
        let mut channel_masks = Self::new();
        masks
            .iter()
            .for_each(|mask| channel_masks.set_from_channel_mask(*mask));
        channel_masks
    }

    // A new mask starts with all the channels on
    fn mask_mut(&mut self, de_id: u8, column_id: u8) -> &mut ColumnData {
        self.masks
            .entry(make_column_key(de_id, column_id))
            .or_insert_with(|| ColumnData::from_patterns(de_id, column_id, 0xFFFF, [0xFFFF; 4]))
    }

    /// Switches off one strip. Cathode 0 is the bending plane, where `line_id` selects the pattern.
    pub fn switch_off_channel(&mut self, de_id: u8, column_id: u8, line_id: usize, strip: usize, cathode: usize) {
        let mask = self.mask_mut(de_id, column_id);
        let pattern = mask.pattern(cathode, line_id) & !(1 << strip);
        mask.set_pattern(pattern, cathode, line_id);
    }

    /// Switches off all the strips fired in `dead`.
    pub fn switch_off_channels(&mut self, dead: &ColumnData) {
        let mask = self.mask_mut(dead.de_id, dead.column_id);
        for (pattern, dead_pattern) in mask.patterns.iter_mut().zip(dead.patterns) {
            *pattern &= !dead_pattern;
        }
    }

    /// Sets the mask of a column, replacing the previous one.
    pub fn set_from_channel_mask(&mut self, mask: ColumnData) {
        let _ = self.masks.insert(mask.column_key(), mask);
    }

    /// Combines with other masks: a channel is kept only if both keep it.
    pub fn merge(&mut self, other: &ChannelMasks) {
        for mask in other.masks.values() {
            self.switch_off_channels(&ColumnData {
                patterns: mask.patterns.map(|pattern| !pattern),
                ..*mask
            });
        }
    }

    /// Masks the column. Returns false if no strip is left.
    ///
    /// Applying the same mask twice has the same effect as applying it once.
    pub fn apply_mask(&self, data: &mut ColumnData) -> bool {
        let Some(mask) = self.masks.get(&data.column_key()) else {
            return true;
        };
        for (pattern, mask_pattern) in data.patterns.iter_mut().zip(mask.patterns) {
            *pattern &= mask_pattern;
        }
        !data.is_empty()
    }

    /// The masks, sorted by detection element and column.
    pub fn masks(&self) -> Vec<ColumnData> {
        self.masks.values().copied().collect()
    }

    /// Number of masked columns.
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    /// True if no column is masked.
    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_switch_off_dead_channels() {
        let mut dead = ColumnData::new(71, 6);
        dead.set_non_bend_pattern(0x8000);
        let mut masks = ChannelMasks::new();
        masks.switch_off_channels(&dead);

        let mask_vec = masks.masks();
        assert_eq!(mask_vec.len(), 1);
        for mask in mask_vec {
            for iline in 0..4 {
                assert_eq!(mask.bend_pattern(iline), !dead.bend_pattern(iline));
            }
            assert_eq!(mask.non_bend_pattern(), !dead.non_bend_pattern());
        }
    }

    #[test]
    fn test_switch_off_channel() {
        let mut masks = ChannelMasks::new();
        masks.switch_off_channel(4, 2, 1, 3, 0);
        masks.switch_off_channel(4, 2, 3, 0, 1);
        assert_eq!(
            masks.masks(),
            vec![ColumnData::from_patterns(4, 2, 0xFFFE, [0xFFFF, 0xFFF7, 0xFFFF, 0xFFFF])]
        );
    }

    #[test]
    fn test_apply_mask() {
        let mut masks = ChannelMasks::new();
        masks.set_from_channel_mask(ColumnData::from_patterns(0, 0, 0x00FF, [0x0F0F, 0, 0, 0]));

        let mut col = ColumnData::from_patterns(0, 0, 0xFFFF, [0xFFFF, 0xFFFF, 0, 0]);
        assert!(masks.apply_mask(&mut col));
        assert_eq!(col, ColumnData::from_patterns(0, 0, 0x00FF, [0x0F0F, 0, 0, 0]));
        let once = col;
        assert!(masks.apply_mask(&mut col));
        assert_eq!(col, once);

        let mut masked = ColumnData::from_patterns(0, 0, 0xFF00, [0xF0F0, 0, 0, 0]);
        assert!(!masks.apply_mask(&mut masked));

        let mut unmasked = ColumnData::from_patterns(1, 0, 0x1, [0; 4]);
        assert!(masks.apply_mask(&mut unmasked));
        assert_eq!(unmasked.non_bend_pattern(), 0x1);
    }

    #[test]
    fn test_merge_and_order() {
        let mut masks = ChannelMasks::from_masks(&[ColumnData::from_patterns(9, 0, 0x00FF, [0xFFFF; 4])]);
        let mut other = ChannelMasks::new();
        other.switch_off_channel(9, 0, 0, 0, 1);
        other.switch_off_channel(2, 5, 0, 15, 0);
        masks.merge(&other);

        let mask_vec = masks.masks();
        assert_eq!(mask_vec.len(), 2);
        assert_eq!((mask_vec[0].de_id, mask_vec[0].column_id), (2, 5));
        assert_eq!(mask_vec[0].bend_pattern(0), 0x7FFF);
        assert_eq!(mask_vec[1].non_bend_pattern(), 0x00FE);
    }
}
