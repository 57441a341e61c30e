//! Contains [ChannelScalers], counting how many times each strip was fired.

use crate::util::*;

/// Number of strips of a pattern.
const N_STRIPS: usize = 16;

/// Counts of the fired strips, per channel.
///
/// A channel is identified by `strip | cathode << 4 | line << 5 | column << 7 | de << 10`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChannelScalers {
    scalers: BTreeMap<u32, u64>,
}

impl ChannelScalers {
    /// Creates empty scalers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unique ID of a channel.
    #[inline]
    pub fn channel_id(de_id: u8, column_id: u8, line_id: usize, strip: usize, cathode: usize) -> u32 {
        strip as u32 | (cathode as u32) << 4 | (line_id as u32) << 5 | u32::from(column_id) << 7 | u32::from(de_id) << 10
    }

    /// Detection element of a channel.
    #[inline]
    pub fn de_id(channel_id: u32) -> u8 {
        (channel_id >> 10) as u8
    }

    /// Column of a channel.
    #[inline]
    pub fn column_id(channel_id: u32) -> u8 {
        ((channel_id >> 7) & 0x7) as u8
    }

    /// Line of a channel, always 0 for the non-bending plane.
    #[inline]
    pub fn line_id(channel_id: u32) -> usize {
        ((channel_id >> 5) & 0x3) as usize
    }

    /// Cathode of a channel: 0 for the bending plane, 1 for the non-bending plane.
    #[inline]
    pub fn cathode(channel_id: u32) -> usize {
        ((channel_id >> 4) & 0x1) as usize
    }

    /// Strip of a channel.
    #[inline]
    pub fn strip(channel_id: u32) -> usize {
        (channel_id & 0xF) as usize
    }

    fn count_pattern(&mut self, de_id: u8, column_id: u8, line_id: usize, cathode: usize, pattern: u16) {
        for strip in (0..N_STRIPS).filter(|strip| pattern >> strip & 0x1 == 1) {
            *self
                .scalers
                .entry(Self::channel_id(de_id, column_id, line_id, strip, cathode))
                .or_default() += 1;
        }
    }

    /// Counts the fired strips of a column.
    pub fn count(&mut self, col: &ColumnData) {
        for line_id in 0..4 {
            self.count_pattern(col.de_id, col.column_id, line_id, 0, col.bend_pattern(line_id));
        }
        self.count_pattern(col.de_id, col.column_id, 0, 1, col.non_bend_pattern());
    }

    /// Counts per channel ID, sorted by ID. Channels that never fired are absent.
    pub fn scalers(&self) -> &BTreeMap<u32, u64> {
        &self.scalers
    }

    /// Clears the counts.
    pub fn reset(&mut self) {
        self.scalers.clear();
    }
}
