//! Contains the [DecodedDataAggregator] that converts the decoded board words into strip patterns per column of detection element.
//!
//! The boards of the same event are spread over the links and arrive in link order.
//! They are grouped by event type and interaction record, in increasing time order,
//! and each group becomes one event with at most one [ColumnData] per column.

use crate::util::*;

/// Aggregates decoded local boards into [ColumnData], one event per event type and interaction record.
#[derive(Debug, Default, Clone)]
pub struct DecodedDataAggregator {
    data: [Vec<ColumnData>; 3],
    rofs: [Vec<RofRecord>; 3],
}

impl DecodedDataAggregator {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregates the decoded boards, replacing the previous output.
    ///
    /// `rofs` index into `boards`. Regional boards, and local boards that are not in the mapping, are skipped.
    /// Events without any column left get no [RofRecord], instead of a record with no entry.
    pub fn process(&mut self, boards: &[RoBoard], rofs: &[RofRecord]) {
        let mapper = CrateMapper::instance();
        let mut events: [BTreeMap<u64, Vec<&RofRecord>>; 3] = Default::default();
        for rof in rofs {
            events[rof.event_type.index()]
                .entry(rof.ir.to_long())
                .or_default()
                .push(rof);
        }

        for event_type in EventType::ALL {
            let data = &mut self.data[event_type.index()];
            let out_rofs = &mut self.rofs[event_type.index()];
            data.clear();
            out_rofs.clear();
            for (ir_long, event_rofs) in &events[event_type.index()] {
                let first_entry = data.len();
                for board in event_rofs.iter().flat_map(|rof| &boards[rof.range()]) {
                    if !board.is_local() {
                        continue;
                    }
                    let Some(de_board) = mapper.ro_board_to_de(board.board_id) else {
                        log::debug!("Board {:#04x} is not in the mapping, skipped", board.board_id);
                        continue;
                    };
                    add_board(data, first_entry, board, de_board);
                }
                let n_entries = data.len() - first_entry;
                if n_entries > 0 {
                    out_rofs.push(RofRecord::new(
                        InteractionRecord::from_long(*ir_long),
                        event_type,
                        first_entry,
                        n_entries,
                    ));
                }
            }
        }
    }

    /// Columns of the events of one type.
    #[inline]
    pub fn data(&self, event_type: EventType) -> &[ColumnData] {
        &self.data[event_type.index()]
    }

    /// Events of one type, pointing into [DecodedDataAggregator::data].
    #[inline]
    pub fn rof_records(&self, event_type: EventType) -> &[RofRecord] {
        &self.rofs[event_type.index()]
    }

    /// Columns of all event types, standard events first, then noise and dead channels.
    pub fn all_data(&self) -> Vec<ColumnData> {
        self.data.concat()
    }

    /// Events of all types, pointing into [DecodedDataAggregator::all_data].
    pub fn all_rof_records(&self) -> Vec<RofRecord> {
        let mut offset = 0;
        let mut all = Vec::with_capacity(self.rofs.iter().map(Vec::len).sum());
        for (data, rofs) in self.data.iter().zip(&self.rofs) {
            all.extend(rofs.iter().map(|rof| RofRecord {
                first_entry: rof.first_entry + offset,
                ..*rof
            }));
            offset += data.len();
        }
        all
    }
}

// Bending patterns go to the line of the board, non-bending patterns are shared by the column
fn add_board(data: &mut Vec<ColumnData>, first_entry: usize, board: &RoBoard, de_board: DeBoard) {
    for ich in 0..4u8 {
        if !board.is_fired(usize::from(ich)) {
            continue;
        }
        let de_id = de_board.de_id(ich);
        let index = match data[first_entry..]
            .iter()
            .position(|col| col.de_id == de_id && col.column_id == de_board.column_id)
        {
            Some(pos) => first_entry + pos,
            None => {
                data.push(ColumnData::new(de_id, de_board.column_id));
                data.len() - 1
            }
        };
        let col = &mut data[index];
        col.set_bend_pattern(board.patterns_bp[usize::from(ich)], usize::from(de_board.line_id));
        col.set_non_bend_pattern(col.non_bend_pattern() | board.patterns_nbp[usize::from(ich)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn local(board_id: u8, fired: u8, bp: u16, nbp: u16) -> RoBoard {
        RoBoard {
            patterns_bp: [bp; 4],
            patterns_nbp: [nbp; 4],
            ..RoBoard::new(raw_info::STARTBIT | raw_info::CARDTYPE, 0, board_id, fired)
        }
    }

    #[test]
    fn test_boards_of_same_column_are_merged() {
        // Boards 0x00 and 0x01 read lines 0 and 1 of column 0 of RPC line 0, right side
        let boards = [local(0x01, 0x1, 0x0F00, 0x0002), local(0x00, 0x1, 0x00F0, 0x0001)];
        let ir = InteractionRecord::new(10, 3);
        let rofs = [
            RofRecord::new(ir, EventType::Standard, 0, 1),
            RofRecord::new(ir, EventType::Standard, 1, 1),
        ];
        let mut aggregator = DecodedDataAggregator::new();
        aggregator.process(&boards, &rofs);

        let data = aggregator.data(EventType::Standard);
        assert_eq!(data, &[ColumnData::from_patterns(0, 0, 0x0003, [0x00F0, 0x0F00, 0, 0])]);
        assert_eq!(
            aggregator.rof_records(EventType::Standard),
            &[RofRecord::new(ir, EventType::Standard, 0, 1)]
        );
    }

    #[test]
    fn test_events_sorted_by_time_and_type() {
        let boards = [
            local(0x00, 0x3, 0x1, 0),
            local(0x80, 0x1, 0x2, 0),
            local(0x00, 0x1, 0x4, 0),
        ];
        let rofs = [
            RofRecord::new(InteractionRecord::new(5, 2), EventType::Standard, 0, 1),
            RofRecord::new(InteractionRecord::new(100, 1), EventType::Standard, 1, 1),
            RofRecord::new(InteractionRecord::new(1, 1), EventType::Dead, 2, 1),
        ];
        let mut aggregator = DecodedDataAggregator::new();
        aggregator.process(&boards, &rofs);

        let standard = aggregator.rof_records(EventType::Standard);
        assert_eq!(standard.len(), 2);
        assert_eq!(standard[0].ir, InteractionRecord::new(100, 1));
        assert_eq!(standard[1].ir, InteractionRecord::new(5, 2));
        assert_eq!(standard[1].n_entries, 2);
        assert_eq!(aggregator.data(EventType::Standard)[0].de_id, 36);
        assert!(aggregator.rof_records(EventType::Noise).is_empty());

        let all_rofs = aggregator.all_rof_records();
        assert_eq!(all_rofs.len(), 3);
        assert_eq!(all_rofs[2].first_entry, 3);
        assert_eq!(all_rofs[2].event_type, EventType::Dead);
        assert_eq!(aggregator.all_data()[3].bend_pattern(0), 0x4);
    }

    #[test]
    fn test_regional_and_unmapped_boards_are_skipped() {
        let boards = [
            RoBoard::new(raw_info::STARTBIT, raw_info::PHY, 0x08, 0xF),
            local(0x1F, 0x1, 0x1, 0x1),
        ];
        let rofs = [
            RofRecord::new(InteractionRecord::new(1, 1), EventType::Standard, 0, 1),
            RofRecord::new(InteractionRecord::new(1, 1), EventType::Standard, 1, 1),
        ];
        let mut aggregator = DecodedDataAggregator::new();
        aggregator.process(&boards, &rofs);
        assert!(aggregator.all_data().is_empty());
        assert!(aggregator.all_rof_records().is_empty());
    }
}
