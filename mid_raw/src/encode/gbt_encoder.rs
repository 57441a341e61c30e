//! Contains [GbtEncoder], serializing the board words of one GBT link into RDH framed pages.
//!
//! In the bare format each e-link has its own byte queue and the queues are interleaved in GBT words,
//! one byte per e-link per word. In the user logic format the board words are written one after the other
//! and each page is padded to a multiple of the CRU word size. A board word never spans two pages in that format.

use crate::decode::gbt_bare_decoder::{elink_byte_index, GBT_WORD_SIZE};
use crate::decode::user_logic_decoder::CRU_WORD_SIZE;
use crate::config::crate_params::N_ELINKS_PER_GBT;
use crate::util::*;

/// Largest page accepted by the readout, header included.
pub const MAX_PAGE_SIZE: usize = 8192;

/// Largest payload of a page. A multiple of both the GBT word and the CRU word.
pub const MAX_PAYLOAD_SIZE: usize = MAX_PAGE_SIZE - RDH_SIZE_BYTES;

/// Serializes one board word: header, then the bending and non-bending patterns of each fired chamber of a local board.
pub fn board_to_bytes(board: &RoBoard, counter: u16) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(21);
    bytes.push(board.status_word);
    bytes.push(board.trigger_word);
    let mut clock = [0u8; 2];
    BigEndian::write_u16(&mut clock, counter);
    bytes.extend_from_slice(&clock);
    bytes.push(board.loc_id() << 4 | (board.fired_chambers & 0xF));
    if board.is_local() {
        let mut pattern = [0u8; 2];
        for ich in (0..4).filter(|&ich| board.is_fired(ich)) {
            BigEndian::write_u16(&mut pattern, board.patterns_bp[ich]);
            bytes.extend_from_slice(&pattern);
            BigEndian::write_u16(&mut pattern, board.patterns_nbp[ich]);
            bytes.extend_from_slice(&pattern);
        }
    }
    bytes
}

/// Encoder of one GBT link.
#[derive(Debug, Clone)]
pub struct GbtEncoder {
    fee_id: u16,
    link: (u8, u8, u16),
    user_logic: bool,
    elinks: [Vec<u8>; N_ELINKS_PER_GBT],
    records: Vec<Vec<u8>>,
    orbit: u32,
    pages_counter: u16,
    packet_counter: u8,
}

impl GbtEncoder {
    /// Creates the encoder of GBT link `fee_id`, sending pages with the `(link ID, end point, CRU ID)` of `link`.
    pub fn new(fee_id: u16, link: (u8, u8, u16), user_logic: bool) -> Self {
        Self {
            fee_id,
            link,
            user_logic,
            elinks: Default::default(),
            records: Vec::new(),
            orbit: 0,
            pages_counter: 0,
            packet_counter: 0,
        }
    }

    /// FEE ID of the link.
    #[inline]
    pub fn fee_id(&self) -> u16 {
        self.fee_id
    }

    /// Queues a board word received on e-link `ilink` with the local clock `counter`.
    pub fn add_board(&mut self, ilink: usize, board: &RoBoard, counter: u16) {
        let bytes = board_to_bytes(board, counter);
        if self.user_logic {
            self.records.push(bytes);
        } else {
            self.elinks[ilink].extend(bytes);
        }
    }

    /// True if no board word is waiting to be written.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.elinks.iter().all(Vec::is_empty)
    }

    /// Starts a heartbeat frame: the following pages carry the orbit and the page counter restarts.
    pub fn open_hbf(&mut self, orbit: u32) {
        self.orbit = orbit;
        self.pages_counter = 0;
    }

    /// Writes the queued board words to `buffer`, followed by a page without payload closing the heartbeat frame.
    pub fn close_hbf(&mut self, buffer: &mut Vec<u8>) {
        let payloads = if self.user_logic {
            self.user_logic_payloads()
        } else {
            self.bare_payloads()
        };
        for payload in &payloads {
            self.write_page(buffer, payload, false);
        }
        self.write_page(buffer, &[], true);
    }

    fn bare_payloads(&mut self) -> Vec<Vec<u8>> {
        let n_words = self.elinks.iter().map(Vec::len).max().unwrap_or_default();
        let mut words = vec![0u8; n_words * GBT_WORD_SIZE];
        for (ilink, queue) in self.elinks.iter_mut().enumerate() {
            for (iword, byte) in queue.drain(..).enumerate() {
                words[iword * GBT_WORD_SIZE + elink_byte_index(ilink)] = byte;
            }
        }
        words.chunks(MAX_PAYLOAD_SIZE).map(<[u8]>::to_vec).collect()
    }

    fn user_logic_payloads(&mut self) -> Vec<Vec<u8>> {
        let mut payloads = Vec::new();
        let mut payload = Vec::new();
        for record in self.records.drain(..) {
            if payload.len() + record.len() > MAX_PAYLOAD_SIZE {
                payloads.push(pad_to_cru_word(std::mem::take(&mut payload)));
            }
            payload.extend(record);
        }
        if !payload.is_empty() {
            payloads.push(pad_to_cru_word(payload));
        }
        payloads
    }

    fn write_page(&mut self, buffer: &mut Vec<u8>, payload: &[u8], stop: bool) {
        let (link_id, endpoint, cru_id) = self.link;
        let mut rdh = Rdh::new_mid(self.fee_id, link_id, endpoint, cru_id, 0, self.orbit);
        rdh.pages_counter = self.pages_counter;
        rdh.packet_counter = self.packet_counter;
        rdh.stop_bit = u8::from(stop);
        rdh.set_payload_size(payload.len() as u16);
        buffer.extend_from_slice(&rdh.to_bytes());
        buffer.extend_from_slice(payload);
        self.pages_counter = self.pages_counter.wrapping_add(1);
        self.packet_counter = self.packet_counter.wrapping_add(1);
    }
}

fn pad_to_cru_word(mut payload: Vec<u8>) -> Vec<u8> {
    let padded_size = payload.len().div_ceil(CRU_WORD_SIZE) * CRU_WORD_SIZE;
    payload.resize(padded_size, 0);
    payload
}
