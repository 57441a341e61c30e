//! Contains [CrateMasks] holding the active local boards read out by each GBT link.
//!
//! The configuration file has one line per link, in the form `feeId mask`.
//! The mask has at most 8 bits since each GBT link reads out at most 8 local boards.

use super::crate_params::{N_GBTS, N_GBTS_PER_SIDE};
use super::{narrow, parse_table};
use crate::util::*;

/// Active boards per GBT link, from the cabling of the crates.
const DEFAULT_MASKS_PER_SIDE: [u8; N_GBTS_PER_SIDE] = [
    0xFF, 0xFF, // crate 0
    0xFF, 0x7F, // crate 1
    0x7F, 0x7F, // crate 2
    0xFF, 0x7F, // crate 3
    0xFF, 0xFF, // crate 4
    0xFF, 0xFF, // crate 5
    0xFF, 0xFF, // crate 6
    0xFF, 0x01, // crate 7
];

/// Bit mask of the active local boards of each GBT link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrateMasks {
    active_boards: [u8; N_GBTS],
}

impl Default for CrateMasks {
    fn default() -> Self {
        let mut masks = Self::empty();
        for (fee_id, mask) in masks.active_boards.iter_mut().enumerate() {
            *mask = DEFAULT_MASKS_PER_SIDE[fee_id % N_GBTS_PER_SIDE];
        }
        masks
    }
}

impl CrateMasks {
    /// Masks with no active board.
    pub fn empty() -> Self {
        Self {
            active_boards: [0; N_GBTS],
        }
    }

    /// Masks with all boards active.
    pub fn all_active() -> Self {
        Self {
            active_boards: [0xFF; N_GBTS],
        }
    }

    /// Loads the masks from a configuration file. Links that are not in the file have no active board.
    pub fn load(path: &Path) -> Result<Self, io::Error> {
        let content = fs::read_to_string(path)?;
        content.parse().map_err(|e: io::Error| {
            io::Error::new(e.kind(), format!("{}: {e}", path.display()))
        })
    }

    /// Writes the masks to a configuration file that can be read back with [CrateMasks::load].
    pub fn write(&self, path: &Path) -> Result<(), io::Error> {
        fs::write(path, self.to_string())
    }

    /// Sets the mask of active boards of a GBT link. Unknown FEE IDs are ignored.
    pub fn set_active_boards(&mut self, fee_id: u16, mask: u8) {
        if let Some(active) = self.active_boards.get_mut(usize::from(fee_id)) {
            *active = mask;
        } else {
            log::warn!("Cannot set mask {mask:#x} of FEE ID {fee_id}: out of range");
        }
    }

    /// Gets the mask of active boards of a GBT link, unknown FEE IDs have no active board.
    #[inline]
    pub fn mask(&self, fee_id: u16) -> u8 {
        self.active_boards
            .get(usize::from(fee_id))
            .copied()
            .unwrap_or_default()
    }

    /// Checks if a board, given by its index in the GBT link, is active.
    #[inline]
    pub fn is_active(&self, board_in_gbt: usize, fee_id: u16) -> bool {
        (self.mask(fee_id) >> board_in_gbt) & 0x1 == 1
    }
}

impl FromStr for CrateMasks {
    type Err = io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut masks = Self::empty();
        for record in parse_table(s, 2)? {
            let fee_id: u16 = narrow(record[0], "FEE ID")?;
            if usize::from(fee_id) >= N_GBTS {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("FEE ID {fee_id} out of range"),
                ));
            }
            masks.set_active_boards(fee_id, narrow(record[1], "mask")?);
        }
        Ok(masks)
    }
}

impl Display for CrateMasks {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "# feeId mask")?;
        for (fee_id, mask) in self.active_boards.iter().enumerate() {
            writeln!(f, "{fee_id} {mask:#04x}")?;
        }
        Ok(())
    }
}
