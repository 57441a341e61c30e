//! Builds channel masks: the default masks of the detector, and the masks switching off the noisy channels.

use crate::config::crate_mapper::N_CHAMBERS;
use crate::util::*;

/// Fraction of the events in which a channel must fire to be considered noisy.
pub const DEFAULT_THRESHOLD: f64 = 0.9;

/// Makes the masks switching off the channels fired in at least `threshold * n_events` events.
///
/// The masks start from `ref_masks`, channels already off stay off.
pub fn make_masks(
    scalers: &ChannelScalers,
    n_events: u64,
    threshold: f64,
    ref_masks: &[ColumnData],
) -> Vec<ColumnData> {
    let mut masks = ChannelMasks::from_masks(ref_masks);
    let min_count = threshold * n_events as f64;
    for (&channel_id, &count) in scalers.scalers() {
        if count as f64 >= min_count {
            masks.switch_off_channel(
                ChannelScalers::de_id(channel_id),
                ChannelScalers::column_id(channel_id),
                ChannelScalers::line_id(channel_id),
                ChannelScalers::strip(channel_id),
                ChannelScalers::cathode(channel_id),
            );
        }
    }
    masks.masks()
}

/// Masks with all the channels on, for each column and line read out by a local board.
///
/// Lines without a board are switched off. The result is sorted by detection element and column.
pub fn make_default_masks(mapper: &CrateMapper) -> Vec<ColumnData> {
    let mut masks: BTreeMap<u16, ColumnData> = BTreeMap::new();
    for de_board in mapper.local_boards().filter_map(|id| mapper.ro_board_to_de(id)) {
        for ich in 0..N_CHAMBERS {
            let de_id = de_board.de_id(ich);
            let mask = masks
                .entry(make_column_key(de_id, de_board.column_id))
                .or_insert_with(|| ColumnData::from_patterns(de_id, de_board.column_id, 0xFFFF, [0; 4]));
            mask.set_bend_pattern(0xFFFF, usize::from(de_board.line_id));
        }
    }
    masks.into_values().collect()
}
