//! State machine assembling the bytes received on one e-link into a board word.
//!
//! A board word starts with a 5 byte header:
//! status, trigger, local clock counter (2 bytes, big endian), `board_id << 4 | inputs`.
//! Local boards then send 4 bytes per fired chamber, in increasing chamber order:
//! the bending plane pattern followed by the non-bending plane pattern, both big endian.
//! Regional boards only send the header.
#![allow(non_camel_case_types)]

use self::ELink_Decoding::Idle_;
use crate::util::*;

/// Size of the header of a board word.
pub const HEADER_SIZE: usize = 5;
/// Size of the patterns of one fired chamber.
pub const CHAMBER_SIZE: usize = 4;
/// Maximum size of a board word.
pub const MAX_SIZE: usize = HEADER_SIZE + 4 * CHAMBER_SIZE;

sm! {
    ELink_Decoding {
        InitialStates { Idle_ }

        // A start sentinel was received
        _Start {
            Idle_ => Feeding_
        }

        _Collect {
            Feeding_ => Feeding_
        }

        // The expected number of bytes was received
        _Finish {
            Feeding_ => Complete_
        }

        _Reset {
            Feeding_ => Idle_,
            Complete_ => Idle_
        }
    }
}

/// Decoder of the board words of one e-link, fed one byte at a time.
pub struct ELinkDecoder {
    state: ELink_Decoding::Variant,
    start_mask: u8,
    bytes: Vec<u8>,
    total_size: usize,
}

impl fmt::Debug for ELinkDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ELinkDecoder")
            .field("feeding", &self.is_feeding())
            .field("complete", &self.is_complete())
            .field("bytes", &self.bytes)
            .finish()
    }
}

impl ELinkDecoder {
    fn new(start_mask: u8) -> Self {
        Self {
            state: ELink_Decoding::Machine::new(Idle_).as_enum(),
            start_mask,
            bytes: Vec::with_capacity(MAX_SIZE),
            total_size: HEADER_SIZE,
        }
    }

    /// Decoder for an e-link of a local board: a record starts with both the start bit and the card type bit.
    pub fn new_local() -> Self {
        Self::new(raw_info::STARTBIT | raw_info::CARDTYPE)
    }

    /// Decoder for an e-link carrying any board type: a record starts with the start bit.
    pub fn new_any() -> Self {
        Self::new(raw_info::STARTBIT)
    }

    /// Feeds one byte. Returns true if the board word is complete with this byte.
    ///
    /// While idle, bytes that are not a start sentinel are discarded.
    /// Once complete, bytes are discarded until [ELinkDecoder::reset] is called.
    pub fn feed(&mut self, byte: u8) -> bool {
        use ELink_Decoding as event;
        use ELink_Decoding::Variant as state;

        let current_state = self.state.clone();

        let (next_state, is_complete) = match current_state {
            state::InitialIdle_(m) if self.is_start(byte) => {
                let _ = self.push(byte);
                (m.transition(event::_Start).as_enum(), false)
            }
            state::Idle_By_Reset(m) if self.is_start(byte) => {
                let _ = self.push(byte);
                (m.transition(event::_Start).as_enum(), false)
            }
            state::InitialIdle_(_) | state::Idle_By_Reset(_) => return false,
            state::Feeding_By_Start(m) => {
                if self.push(byte) {
                    (m.transition(event::_Finish).as_enum(), true)
                } else {
                    (m.transition(event::_Collect).as_enum(), false)
                }
            }
            state::Feeding_By_Collect(m) => {
                if self.push(byte) {
                    (m.transition(event::_Finish).as_enum(), true)
                } else {
                    (m.transition(event::_Collect).as_enum(), false)
                }
            }
            state::Complete_By_Finish(_) => {
                log::trace!("Byte {byte:#04x} discarded: board word is complete");
                return false;
            }
        };
        self.state = next_state;
        is_complete
    }

    #[inline]
    fn is_start(&self, byte: u8) -> bool {
        byte & self.start_mask == self.start_mask
    }

    // Returns true if the expected size is reached
    fn push(&mut self, byte: u8) -> bool {
        self.bytes.push(byte);
        if self.bytes.len() == HEADER_SIZE {
            self.total_size = if raw_info::is_loc(self.bytes[0]) {
                HEADER_SIZE + CHAMBER_SIZE * (self.inputs().count_ones() as usize)
            } else {
                HEADER_SIZE
            };
        }
        self.bytes.len() >= HEADER_SIZE && self.bytes.len() == self.total_size
    }

    /// Discards the bytes received and waits for the next start sentinel.
    pub fn reset(&mut self) {
        use ELink_Decoding as event;
        use ELink_Decoding::Variant as state;

        let current_state = self.state.clone();
        self.state = match current_state {
            state::Feeding_By_Start(m) => m.transition(event::_Reset).as_enum(),
            state::Feeding_By_Collect(m) => m.transition(event::_Reset).as_enum(),
            state::Complete_By_Finish(m) => m.transition(event::_Reset).as_enum(),
            idle => idle,
        };
        self.bytes.clear();
        self.total_size = HEADER_SIZE;
    }

    /// True if a board word is being received.
    #[inline]
    pub fn is_feeding(&self) -> bool {
        matches!(
            self.state,
            ELink_Decoding::Variant::Feeding_By_Start(_)
                | ELink_Decoding::Variant::Feeding_By_Collect(_)
        )
    }

    /// True if the board word is complete.
    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self.state, ELink_Decoding::Variant::Complete_By_Finish(_))
    }

    /// Number of bytes received for the current board word.
    #[inline]
    pub fn n_bytes(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    fn byte(&self, index: usize) -> u8 {
        self.bytes.get(index).copied().unwrap_or_default()
    }

    /// Status word of the board.
    #[inline]
    pub fn status_word(&self) -> u8 {
        self.byte(0)
    }

    /// Trigger word of the board.
    #[inline]
    pub fn trigger_word(&self) -> u8 {
        self.byte(1)
    }

    /// Local clock counter.
    #[inline]
    pub fn counter(&self) -> u16 {
        u16::from(self.byte(2)) << 8 | u16::from(self.byte(3))
    }

    /// ID of the board in the crate.
    #[inline]
    pub fn id(&self) -> u8 {
        self.byte(4) >> 4
    }

    /// Fired chambers for local boards, fired local boards for regional boards.
    #[inline]
    pub fn inputs(&self) -> u8 {
        self.byte(4) & 0xF
    }

    /// Pattern of a chamber, cathode 0 is the bending plane and 1 the non-bending plane.
    ///
    /// Returns 0 if the chamber is not fired.
    pub fn pattern(&self, cathode: usize, chamber: usize) -> u16 {
        let inputs = self.inputs();
        if (inputs >> chamber) & 0x1 == 0 {
            return 0;
        }
        let fired_before = (inputs & ((1 << chamber) - 1)).count_ones() as usize;
        let offset = HEADER_SIZE + CHAMBER_SIZE * fired_before + 2 * cathode;
        self.bytes
            .get(offset..offset + 2)
            .map_or(0, BigEndian::read_u16)
    }

    /// Builds the board word from the bytes received. The board ID is given by the caller, which knows the crate.
    pub fn to_board(&self, board_id: u8) -> RoBoard {
        let mut board = RoBoard::new(
            self.status_word(),
            self.trigger_word(),
            board_id,
            self.inputs(),
        );
        if board.is_local() {
            for ich in 0..4 {
                board.patterns_bp[ich] = self.pattern(0, ich);
                board.patterns_nbp[ich] = self.pattern(1, ich);
            }
        }
        board
    }
}
