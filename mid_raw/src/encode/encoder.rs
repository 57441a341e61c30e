//! Contains the [Encoder] that writes events of column data as the raw data of the GBT links.
//!
//! All the links share the heartbeat frames: when an event belongs to a new orbit the frame of every link is closed
//! and a new one is opened, starting with the answers of the boards to the orbit trigger.
//! The local clock of the boards counts the bunch crossings since the start of the frame.

use super::column_to_board::ColumnDataToLocalBoard;
use super::gbt_encoder::GbtEncoder;
use crate::config::crate_params::{self, N_GBTS, N_LOCALS_PER_GBT, N_REGIONALS_PER_GBT};
use crate::util::*;

const LOCALS_PER_REGIONAL: usize = N_LOCALS_PER_GBT / N_REGIONALS_PER_GBT;

/// Encoder of the MID raw data.
#[derive(Debug)]
pub struct Encoder {
    gbt_encoders: Vec<Option<GbtEncoder>>,
    crate_masks: CrateMasks,
    delays: ElectronicsDelay,
    converter: ColumnDataToLocalBoard,
    orbit: Option<u32>,
    buffer: Vec<u8>,
}

impl Encoder {
    /// Creates an encoder writing the format selected by `config` for the links of `fee_id_config`.
    ///
    /// Only the local boards active in `crate_masks` are written. Links missing from the FEE ID mapping are not written.
    pub fn new(config: &impl DecodeOpt, fee_id_config: &FeeIdConfig, crate_masks: CrateMasks) -> Self {
        let gbt_encoders = (0..N_GBTS as u16)
            .map(|fee_id| {
                fee_id_config
                    .link_of(fee_id)
                    .map(|link| GbtEncoder::new(fee_id, link, config.user_logic()))
            })
            .collect();
        Self {
            gbt_encoders,
            crate_masks,
            delays: config.electronics_delay(),
            converter: ColumnDataToLocalBoard::new(),
            orbit: None,
            buffer: Vec::new(),
        }
    }

    /// Creates an encoder from a [DecoderConfig], loading the FEE ID mapping and the crate masks it refers to.
    pub fn from_config(config: &DecoderConfig) -> Result<Self, io::Error> {
        let fee_id_config = config.fee_id_config()?;
        let crate_masks = config.crate_masks()?;
        Ok(Self::new(config, &fee_id_config, crate_masks))
    }

    /// Writes an event.
    ///
    /// Standard events are self-triggered, noise events answer a calibration trigger.
    /// The patterns of dead channel events are written inverted, as sent by the electronics:
    /// to be decoded as such they must follow a calibration trigger by the calibration to FET delay.
    pub fn process(&mut self, cols: &[ColumnData], ir: InteractionRecord, event_type: EventType) {
        if !self.start_event(ir) {
            return;
        }
        self.converter.process(cols);
        let trigger_word = match event_type {
            EventType::Noise => raw_info::CALIBRATE,
            EventType::Standard | EventType::Dead => 0,
        };
        let boards = self
            .converter
            .boards()
            .values()
            .map(|board| {
                let mut board = RoBoard {
                    trigger_word,
                    ..*board
                };
                if event_type == EventType::Dead {
                    invert_for_dead_channels(&mut board);
                }
                board
            })
            .collect_vec();
        self.write_event(&boards, ir, trigger_word);
    }

    /// Writes the answers of all the active boards to a trigger.
    ///
    /// The regional boards report the active local boards of their half of the link as fired.
    pub fn process_trigger(&mut self, ir: InteractionRecord, trigger_word: u8) {
        if !self.start_event(ir) {
            return;
        }
        let counter = self.local_clock(ir, trigger_word, false);
        for fee_id in 0..N_GBTS as u16 {
            self.write_answers(fee_id, trigger_word, counter);
        }
    }

    /// Closes the open heartbeat frames and returns the raw data written so far.
    pub fn finalize(&mut self) -> Vec<u8> {
        if self.orbit.take().is_some() {
            self.close_hbfs();
        }
        std::mem::take(&mut self.buffer)
    }

    // Opens the heartbeat frame of the event if needed. False if the event is older than the open frame.
    fn start_event(&mut self, ir: InteractionRecord) -> bool {
        match self.orbit {
            Some(orbit) if ir.orbit < orbit => {
                log::warn!("Event at {ir} is older than the current orbit {orbit}, skipped");
                return false;
            }
            Some(orbit) if ir.orbit == orbit => return true,
            Some(_) => self.close_hbfs(),
            None => (),
        }
        self.open_hbfs(ir.orbit);
        true
    }

    fn open_hbfs(&mut self, orbit: u32) {
        self.orbit = Some(orbit);
        for encoder in self.gbt_encoders.iter_mut().flatten() {
            encoder.open_hbf(orbit);
        }
        for fee_id in 0..N_GBTS as u16 {
            self.write_answers(fee_id, raw_info::ORB, 0);
        }
    }

    fn close_hbfs(&mut self) {
        for encoder in self.gbt_encoders.iter_mut().flatten() {
            encoder.close_hbf(&mut self.buffer);
        }
    }

    // Self-triggered regional boards answer after the decision of the local boards
    fn local_clock(&self, ir: InteractionRecord, trigger_word: u8, is_regional: bool) -> u16 {
        let mut clock = ir.bc.wrapping_add(self.delays.bc_to_local);
        if is_regional && trigger_word == 0 {
            clock = clock.wrapping_add(self.delays.reg_to_local);
        }
        clock
    }

    fn write_answers(&mut self, fee_id: u16, trigger_word: u8, counter: u16) {
        let Some(encoder) = self.gbt_encoders[usize::from(fee_id)].as_mut() else {
            return;
        };
        let mask = self.crate_masks.mask(fee_id);
        let crate_id = crate_params::crate_id_from_fee_id(fee_id);
        let first_board = N_LOCALS_PER_GBT as u8 * crate_params::gbt_id_in_crate(fee_id);
        for ilink in (0..N_LOCALS_PER_GBT).filter(|&ilink| mask >> ilink & 0x1 == 1) {
            let board_id = crate_params::make_unique_loc_id(crate_id, first_board + ilink as u8);
            let board = RoBoard::new(raw_info::STARTBIT | raw_info::CARDTYPE, trigger_word, board_id, 0);
            encoder.add_board(ilink, &board, counter);
        }
        for ireg in 0..N_REGIONALS_PER_GBT {
            let inputs = mask >> (LOCALS_PER_REGIONAL * ireg) & 0xF;
            let board_id = crate_params::make_unique_loc_id(crate_id, first_board + ireg as u8);
            let board = RoBoard::new(raw_info::STARTBIT, trigger_word, board_id, inputs);
            encoder.add_board(N_LOCALS_PER_GBT + ireg, &board, counter);
        }
    }

    fn write_event(&mut self, locals: &[RoBoard], ir: InteractionRecord, trigger_word: u8) {
        let local_counter = self.local_clock(ir, trigger_word, false);
        let regional_counter = self.local_clock(ir, trigger_word, true);
        let mut fired_locals = [0u8; N_GBTS];
        for board in locals {
            let fee_id = crate_params::fee_id_from_board(board.board_id);
            let ilink = usize::from(board.loc_id()) % N_LOCALS_PER_GBT;
            if !self.crate_masks.is_active(ilink, fee_id) {
                log::warn!("Board {:#04x} is masked, not written", board.board_id);
                continue;
            }
            let Some(encoder) = self.gbt_encoders[usize::from(fee_id)].as_mut() else {
                log::warn!("FEE ID {fee_id} of board {:#04x} has no link, not written", board.board_id);
                continue;
            };
            encoder.add_board(ilink, board, local_counter);
            fired_locals[usize::from(fee_id)] |= 1 << ilink;
        }

        for (fee_id, fired) in fired_locals.into_iter().enumerate() {
            let Some(encoder) = self.gbt_encoders[fee_id].as_mut() else {
                continue;
            };
            let fee_id = fee_id as u16;
            let crate_id = crate_params::crate_id_from_fee_id(fee_id);
            let first_board = N_LOCALS_PER_GBT as u8 * crate_params::gbt_id_in_crate(fee_id);
            for ireg in 0..N_REGIONALS_PER_GBT {
                let inputs = fired >> (LOCALS_PER_REGIONAL * ireg) & 0xF;
                if inputs == 0 {
                    continue;
                }
                let board_id = crate_params::make_unique_loc_id(crate_id, first_board + ireg as u8);
                let board = RoBoard::new(raw_info::STARTBIT, trigger_word, board_id, inputs);
                encoder.add_board(N_LOCALS_PER_GBT + ireg, &board, regional_counter);
            }
        }
    }
}

// The electronics reports the strips that did not answer the test pulse as 1, on all chambers
fn invert_for_dead_channels(board: &mut RoBoard) {
    board.fired_chambers = 0xF;
    for ich in 0..4 {
        board.patterns_bp[ich] = !board.patterns_bp[ich];
        board.patterns_nbp[ich] = !board.patterns_nbp[ich];
    }
}
