//! The [RoBoard] holding the content of one board word read out from a local or regional board.

use super::raw_info;
use std::fmt::{self, Display};

/// Board word of a local or regional board.
///
/// For regional boards the patterns are always empty and `fired_chambers` holds
/// the bits of the local boards that responded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct RoBoard {
    /// Status byte, see [raw_info]
    pub status_word: u8,
    /// Trigger byte, see [raw_info]
    pub trigger_word: u8,
    /// Unique board ID: `crate_id << 4 | board index in crate`
    pub board_id: u8,
    /// Fired chambers (local boards) or fired local boards (regional boards), 4 bits
    pub fired_chambers: u8,
    /// Bending plane pattern per chamber
    pub patterns_bp: [u16; 4],
    /// Non-bending plane pattern per chamber
    pub patterns_nbp: [u16; 4],
}

impl RoBoard {
    /// Creates a board without patterns.
    pub fn new(status_word: u8, trigger_word: u8, board_id: u8, fired_chambers: u8) -> Self {
        Self {
            status_word,
            trigger_word,
            board_id,
            fired_chambers,
            ..Default::default()
        }
    }

    /// True if this is a local board.
    #[inline]
    pub fn is_local(&self) -> bool {
        raw_info::is_loc(self.status_word)
    }

    /// Crate ID of the board.
    #[inline]
    pub fn crate_id(&self) -> u8 {
        self.board_id >> 4
    }

    /// Index of the board in the crate.
    #[inline]
    pub fn loc_id(&self) -> u8 {
        self.board_id & 0xF
    }

    /// True if the chamber has its fired bit set.
    #[inline]
    pub fn is_fired(&self, chamber: usize) -> bool {
        self.fired_chambers >> chamber & 0x1 == 1
    }

    /// Inverts the patterns of a dead channel event, where the electronics reports 1 for the strips that did not respond.
    ///
    /// Chambers without any dead strip after the inversion are removed from the fired chambers.
    /// Returns true if no chamber is left, i.e. the board carries no information.
    pub fn invert_patterns(&mut self) -> bool {
        for ich in 0..4 {
            self.patterns_bp[ich] = !self.patterns_bp[ich];
            self.patterns_nbp[ich] = !self.patterns_nbp[ich];
            if self.patterns_bp[ich] == 0 && self.patterns_nbp[ich] == 0 {
                self.fired_chambers &= !(1 << ich);
            }
        }
        self.fired_chambers == 0
    }
}

impl Display for RoBoard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "status: {:#04x}  trig: {:#04x}  ID: {:#04x}  fired: {:#03x}",
            self.status_word, self.trigger_word, self.board_id, self.fired_chambers
        )?;
        if self.is_local() {
            for ich in 0..4 {
                write!(
                    f,
                    "  ch{ich}: {:#06x} {:#06x}",
                    self.patterns_bp[ich], self.patterns_nbp[ich]
                )?;
            }
        }
        Ok(())
    }
}
