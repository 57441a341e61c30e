//! Contains the [CrateMapper], the static mapping between the local boards of the readout
//! and the columns and lines of the detection elements.
//!
//! Each side of the detector has 9 RPC lines, numbered from bottom to top, with 7 columns each.
//! A local board reads out one line of strips of one column, in the same RPC line of the 4 chambers.
//! The detection element ID is `(right ? 0 : 36) + 9 * chamber + rpc_line`.
//!
//! The table is not the cabling of the detector. Local boards are assigned to the RPC lines, columns and lines
//! in order, following the active boards of the default [CrateMasks] from the first GBT link of the side to the last.
//! It only guarantees that every board maps to one line of one column and back.

use super::crate_masks::CrateMasks;
use super::crate_params::{self, N_GBTS_PER_SIDE, N_LOCALS_PER_GBT};
use crate::util::*;

/// Number of RPC lines per side and chamber.
pub const N_RPC_LINES: u8 = 9;
/// Number of columns per RPC.
pub const N_COLUMNS: u8 = 7;
/// Number of chambers.
pub const N_CHAMBERS: u8 = 4;
/// Number of detection elements per side.
pub const N_DES_PER_SIDE: u8 = N_RPC_LINES * N_CHAMBERS;
/// Number of detection elements.
pub const N_DES: u8 = 2 * N_DES_PER_SIDE;

/// Number of lines of local boards in a column of an RPC line.
///
/// The RPCs close to the beam pipe have smaller strips in the inner columns, read out by more boards,
/// and the central one has no column 0.
pub fn n_lines(rpc_line: u8, column_id: u8) -> u8 {
    let close_to_beam = (3..=5).contains(&rpc_line);
    match column_id {
        0 if rpc_line == 4 => 0,
        0 | 2 if rpc_line == 3 || rpc_line == 5 => 4,
        1 if close_to_beam => 4,
        0..=3 => 2,
        4 | 5 if close_to_beam => 2,
        4..=6 => 1,
        _ => 0,
    }
}

/// Builds the detection element ID.
#[inline]
pub fn make_de_id(is_right: bool, chamber: u8, rpc_line: u8) -> u8 {
    let side_offset = if is_right { 0 } else { N_DES_PER_SIDE };
    side_offset + N_RPC_LINES * chamber + rpc_line
}

/// RPC line of a detection element.
#[inline]
pub fn rpc_line(de_id: u8) -> u8 {
    de_id % N_RPC_LINES
}

/// Chamber of a detection element.
#[inline]
pub fn chamber(de_id: u8) -> u8 {
    (de_id % N_DES_PER_SIDE) / N_RPC_LINES
}

/// True if the detection element is on the right side.
#[inline]
pub fn is_right_de(de_id: u8) -> bool {
    de_id < N_DES_PER_SIDE
}

/// Position of a local board in the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeBoard {
    /// RPC line, the same in the 4 chambers
    pub rpc_line: u8,
    /// Column in the RPC
    pub column_id: u8,
    /// Line of the board in the column
    pub line_id: u8,
    /// True for the right side
    pub is_right: bool,
}

impl DeBoard {
    /// Detection element read out by the board in a chamber.
    #[inline]
    pub fn de_id(&self, chamber: u8) -> u8 {
        make_de_id(self.is_right, chamber, self.rpc_line)
    }
}

/// Mapping between local boards and their position in the detector.
#[derive(Debug, Clone)]
pub struct CrateMapper {
    ro_to_de: BTreeMap<u8, DeBoard>,
    de_to_ro: HashMap<DeBoard, u8>,
}

static CRATE_MAPPER: OnceLock<CrateMapper> = OnceLock::new();

impl CrateMapper {
    /// Gets the mapping, building it on first use.
    pub fn instance() -> &'static CrateMapper {
        CRATE_MAPPER.get_or_init(CrateMapper::new)
    }

    fn new() -> Self {
        let masks = CrateMasks::default();
        let mut ro_to_de = BTreeMap::new();
        for is_right in [true, false] {
            let first_fee = if is_right { 0 } else { N_GBTS_PER_SIDE };
            let boards = (first_fee..first_fee + N_GBTS_PER_SIDE).flat_map(|fee_id| {
                let fee_id = fee_id as u16;
                (0..N_LOCALS_PER_GBT)
                    .filter(move |&ilink| masks.is_active(ilink, fee_id))
                    .map(move |ilink| {
                        crate_params::make_unique_loc_id(
                            crate_params::crate_id_from_fee_id(fee_id),
                            crate_params::gbt_id_in_crate(fee_id) * N_LOCALS_PER_GBT as u8
                                + ilink as u8,
                        )
                    })
            });
            let slots = (0..N_RPC_LINES).flat_map(|rpc_line| {
                (0..N_COLUMNS).flat_map(move |column_id| {
                    (0..n_lines(rpc_line, column_id)).map(move |line_id| DeBoard {
                        rpc_line,
                        column_id,
                        line_id,
                        is_right,
                    })
                })
            });
            ro_to_de.extend(boards.zip(slots));
        }
        let de_to_ro = ro_to_de.iter().map(|(&id, &board)| (board, id)).collect();
        Self { ro_to_de, de_to_ro }
    }

    /// Position in the detector of a local board, given its unique ID. [None] for unknown boards.
    #[inline]
    pub fn ro_board_to_de(&self, unique_loc_id: u8) -> Option<DeBoard> {
        self.ro_to_de.get(&unique_loc_id).copied()
    }

    /// Unique ID of the local board reading out a line of a column. [None] if there is no such board.
    pub fn de_board_to_ro(&self, de_id: u8, column_id: u8, line_id: u8) -> Option<u8> {
        if de_id >= N_DES {
            return None;
        }
        let board = DeBoard {
            rpc_line: rpc_line(de_id),
            column_id,
            line_id,
            is_right: is_right_de(de_id),
        };
        self.de_to_ro.get(&board).copied()
    }

    /// Unique IDs of all the mapped local boards, in increasing order.
    pub fn local_boards(&self) -> impl Iterator<Item = u8> + '_ {
        self.ro_to_de.keys().copied()
    }

    /// Number of mapped local boards.
    pub fn n_boards(&self) -> usize {
        self.ro_to_de.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_active_boards_are_mapped() {
        let mapper = CrateMapper::instance();
        let n_slots: usize = (0..N_RPC_LINES)
            .cartesian_product(0..N_COLUMNS)
            .map(|(rpc, col)| usize::from(n_lines(rpc, col)))
            .sum();
        assert_eq!(n_slots, 117);
        assert_eq!(mapper.n_boards(), 2 * n_slots);
    }

    #[test]
    fn test_first_board_of_each_side() {
        let mapper = CrateMapper::instance();
        let right = mapper.ro_board_to_de(0x00).unwrap();
        assert_eq!(
            right,
            DeBoard {
                rpc_line: 0,
                column_id: 0,
                line_id: 0,
                is_right: true
            }
        );
        assert_eq!(right.de_id(2), 18);
        let left = mapper.ro_board_to_de(0x80).unwrap();
        assert!(!left.is_right);
        assert_eq!(left.de_id(0), 36);
        assert_eq!(mapper.ro_board_to_de(0x01).unwrap().line_id, 1);
    }

    #[test]
    fn test_inactive_board_is_not_mapped() {
        // Crate 1, second GBT link, last board is masked
        assert!(CrateMapper::instance().ro_board_to_de(0x1F).is_none());
    }

    #[test]
    fn test_mapping_is_bijective() {
        let mapper = CrateMapper::instance();
        for id in mapper.local_boards() {
            let board = mapper.ro_board_to_de(id).unwrap();
            for ich in 0..N_CHAMBERS {
                let de_id = board.de_id(ich);
                assert_eq!(chamber(de_id), ich);
                assert_eq!(
                    mapper.de_board_to_ro(de_id, board.column_id, board.line_id),
                    Some(id)
                );
            }
        }
    }

    #[test]
    fn test_no_column_0_in_central_rpc() {
        let mapper = CrateMapper::instance();
        assert_eq!(mapper.de_board_to_ro(4, 0, 0), None);
        assert!(mapper.de_board_to_ro(4, 1, 3).is_some());
        assert_eq!(mapper.de_board_to_ro(N_DES, 1, 0), None);
    }
}
