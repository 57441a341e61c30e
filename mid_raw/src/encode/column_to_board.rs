//! Contains [ColumnDataToLocalBoard], converting the strip patterns of the columns into local board words.

use crate::config::crate_mapper::{self, n_lines};
use crate::util::*;

/// Converts [ColumnData] into [RoBoard] words, one per local board reading out a line of a column.
#[derive(Debug, Default, Clone)]
pub struct ColumnDataToLocalBoard {
    boards: BTreeMap<u8, RoBoard>,
}

impl ColumnDataToLocalBoard {
    /// Creates a converter without boards.
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts the columns of one event, replacing the previous boards.
    ///
    /// The non-bending pattern is read out by all the boards of the column, so each board of the column gets it.
    /// A chamber is fired if it has a bending or a non-bending pattern.
    /// Columns of unknown detection elements and lines without a board are skipped.
    pub fn process(&mut self, cols: &[ColumnData]) {
        let mapper = CrateMapper::instance();
        self.boards.clear();
        for col in cols {
            let ich = usize::from(crate_mapper::chamber(col.de_id));
            let nbp = col.non_bend_pattern();
            for line in 0..n_lines(crate_mapper::rpc_line(col.de_id), col.column_id) {
                let bp = col.bend_pattern(usize::from(line));
                if bp == 0 && nbp == 0 {
                    continue;
                }
                let Some(board_id) = mapper.de_board_to_ro(col.de_id, col.column_id, line) else {
                    log::warn!(
                        "No local board for DE {} column {} line {line}, pattern skipped",
                        col.de_id,
                        col.column_id
                    );
                    continue;
                };
                let board = self.boards.entry(board_id).or_insert_with(|| {
                    RoBoard::new(raw_info::STARTBIT | raw_info::CARDTYPE, 0, board_id, 0)
                });
                board.fired_chambers |= 1 << ich;
                board.patterns_bp[ich] = bp;
                board.patterns_nbp[ich] = nbp;
            }
        }
    }

    /// Boards of the last event, sorted by unique ID.
    #[inline]
    pub fn boards(&self) -> &BTreeMap<u8, RoBoard> {
        &self.boards
    }
}
