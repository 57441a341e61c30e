//! Contains [LinkState], turning the complete board words of the e-links of a GBT link into output records,
//! and the [Mode] strategies selecting what is checked and emitted.
//!
//! The local clock of the boards is reset by the orbit trigger, at the start of each heartbeat frame.
//! The interaction record of a board is the interaction record of the heartbeat frame (taken from the first page of the frame)
//! shifted by the local clock, corrected for the delays of the electronics.

use crate::config::crate_params::{self, N_ELINKS_PER_GBT, N_LOCALS_PER_GBT};
use crate::util::*;

/// Compile time strategy of a link decoder.
pub trait Mode: fmt::Debug + Default + Send + 'static {
    /// In debug mode the local board IDs are not checked against their e-link and regional boards are emitted.
    const DEBUG: bool;
}

/// Boards with an ID that does not match the e-link are discarded, regional boards only update the clocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProductionMode;

impl Mode for ProductionMode {
    const DEBUG: bool = false;
}

/// All boards are emitted, including the regional boards.
#[derive(Debug, Default, Clone, Copy)]
pub struct DebugMode;

impl Mode for DebugMode {
    const DEBUG: bool = true;
}

/// Clock bookkeeping and output of one GBT link.
#[derive(Debug, Clone)]
pub struct LinkState {
    fee_id: u16,
    delays: ElectronicsDelay,
    is_synchronized: bool,
    ir_first_page: InteractionRecord,
    irs: [InteractionRecord; N_ELINKS_PER_GBT],
    calib_clocks: [Option<u16>; N_ELINKS_PER_GBT],
    data: Vec<RoBoard>,
    rofs: Vec<RofRecord>,
}

impl LinkState {
    /// Creates the state of the GBT link `fee_id`.
    pub fn new(fee_id: u16, delays: ElectronicsDelay) -> Self {
        Self {
            fee_id,
            delays,
            is_synchronized: false,
            ir_first_page: InteractionRecord::default(),
            irs: [InteractionRecord::default(); N_ELINKS_PER_GBT],
            calib_clocks: [None; N_ELINKS_PER_GBT],
            data: Vec::new(),
            rofs: Vec::new(),
        }
    }

    /// FEE ID of the link.
    #[inline]
    pub fn fee_id(&self) -> u16 {
        self.fee_id
    }

    /// Updates the reference interaction records with the header of a new page.
    ///
    /// The first page ever received synchronizes all the e-links,
    /// the first page of each heartbeat frame gives the reference for the next orbit trigger.
    pub fn start_page(&mut self, rdh: &Rdh) {
        let page_ir = InteractionRecord::new(rdh.trigger_bc, rdh.trigger_orbit);
        if !self.is_synchronized {
            self.irs = [page_ir; N_ELINKS_PER_GBT];
            self.ir_first_page = page_ir;
            self.is_synchronized = true;
        }
        if rdh.pages_counter == 0 {
            self.ir_first_page = page_ir;
        }
    }

    /// Handles the complete board word of e-link `ilink`.
    pub fn on_complete<M: Mode>(&mut self, ilink: usize, elink: &ELinkDecoder) {
        if ilink < N_LOCALS_PER_GBT {
            self.on_local::<M>(ilink, elink);
        } else {
            self.on_regional::<M>(ilink, elink);
        }
    }

    fn on_local<M: Mode>(&mut self, ilink: usize, elink: &ELinkDecoder) {
        if self.update_ir(ilink, elink) {
            return;
        }
        if !M::DEBUG && usize::from(elink.id()) % N_LOCALS_PER_GBT != ilink {
            log::debug!(
                "FEE {}: local board {} received on e-link {ilink}, discarded",
                self.fee_id,
                elink.id()
            );
            return;
        }
        let board_id = crate_params::make_unique_loc_id(
            crate_params::crate_id_from_fee_id(self.fee_id),
            elink.id(),
        );
        self.add_board(ilink, elink.to_board(board_id), elink.counter());
    }

    fn on_regional<M: Mode>(&mut self, ilink: usize, elink: &ELinkDecoder) {
        if self.update_ir(ilink, elink) || !M::DEBUG {
            return;
        }
        let ireg = (ilink - N_LOCALS_PER_GBT) as u8;
        let board_id = crate_params::make_unique_loc_id(
            crate_params::crate_id_from_fee_id(self.fee_id),
            N_LOCALS_PER_GBT as u8 * crate_params::gbt_id_in_crate(self.fee_id) + ireg,
        );
        self.add_board(ilink, elink.to_board(board_id), elink.counter());
    }

    // Answer to an orbit trigger: the local clock restarts with the heartbeat frame
    fn update_ir(&mut self, ilink: usize, elink: &ELinkDecoder) -> bool {
        if elink.trigger_word() & raw_info::ORB == 0 {
            return false;
        }
        self.irs[ilink] = self.ir_first_page;
        true
    }

    fn add_board(&mut self, ilink: usize, mut board: RoBoard, local_clock: u16) {
        let event_type = if raw_info::is_calibration(board.trigger_word) {
            self.calib_clocks[ilink] = Some(local_clock);
            EventType::Noise
        } else if self.calib_clocks[ilink]
            .is_some_and(|calib| local_clock == calib.wrapping_add(self.delays.calib_to_fet))
        {
            EventType::Dead
        } else {
            EventType::Standard
        };

        if event_type == EventType::Dead && board.is_local() && board.invert_patterns() {
            log::trace!("FEE {}: {board} has no dead channel", self.fee_id);
            return;
        }

        let mut n_bc = i64::from(local_clock) - i64::from(self.delays.bc_to_local);
        if !board.is_local() && board.trigger_word == 0 {
            // Self-triggered regional boards wait for the decision of the local boards
            n_bc -= i64::from(self.delays.reg_to_local);
        }
        let ir = self.irs[ilink].shifted(n_bc);
        log::trace!("FEE {} e-link {ilink}: {ir} {event_type} {board}", self.fee_id);
        self.rofs
            .push(RofRecord::new(ir, event_type, self.data.len(), 1));
        self.data.push(board);
    }

    /// Decoded boards.
    #[inline]
    pub fn data(&self) -> &[RoBoard] {
        &self.data
    }

    /// One record per decoded board.
    #[inline]
    pub fn rof_records(&self) -> &[RofRecord] {
        &self.rofs
    }

    /// Clears the output, the clock bookkeeping is kept.
    pub fn clear(&mut self) {
        self.data.clear();
        self.rofs.clear();
    }

    /// Clears the output and the clock bookkeeping.
    pub fn reset(&mut self) {
        *self = Self::new(self.fee_id, self.delays);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rdh(bc: u16, orbit: u32, pages_counter: u16) -> Rdh {
        let mut rdh = Rdh::new_mid(5, 5, 0, 0, bc, orbit);
        rdh.pages_counter = pages_counter;
        rdh
    }

    fn complete(bytes: &[u8]) -> ELinkDecoder {
        let mut elink = ELinkDecoder::new_any();
        let completed = bytes.iter().map(|&b| elink.feed(b)).collect_vec();
        assert_eq!(completed.last(), Some(&true));
        elink
    }

    #[test]
    fn test_local_board_ir() {
        let mut state = LinkState::new(5, ElectronicsDelay::default());
        state.start_page(&rdh(0, 100, 0));
        // Local board 9 (GBT 1 of crate 2) on e-link 1, clock 20, chamber 0
        let elink = complete(&[0xC0, 0x00, 0x00, 20, 0x91, 0x00, 0x01, 0x00, 0x02]);
        state.on_complete::<ProductionMode>(1, &elink);

        assert_eq!(state.data().len(), 1);
        assert_eq!(state.data()[0].board_id, 0x29);
        assert_eq!(state.data()[0].patterns_bp[0], 0x1);
        assert_eq!(state.rof_records()[0].ir, InteractionRecord::new(20, 100));
        assert_eq!(state.rof_records()[0].event_type, EventType::Standard);
    }

    #[test]
    fn test_wrong_elink_is_discarded_in_production() {
        let mut state = LinkState::new(5, ElectronicsDelay::default());
        state.start_page(&rdh(0, 100, 0));
        let elink = complete(&[0xC0, 0x00, 0x00, 20, 0x90]);
        state.on_complete::<ProductionMode>(2, &elink);
        assert!(state.data().is_empty());
        state.on_complete::<DebugMode>(2, &elink);
        assert_eq!(state.data().len(), 1);
    }

    #[test]
    fn test_orbit_trigger_resets_reference() {
        let mut state = LinkState::new(5, ElectronicsDelay::default());
        state.start_page(&rdh(0, 100, 0));
        state.start_page(&rdh(0, 101, 0));
        // Orbit trigger answer: never emitted, even in debug mode
        let orb = complete(&[0xC0, raw_info::ORB, 0x00, 0x03, 0x10]);
        state.on_complete::<DebugMode>(0, &orb);
        assert!(state.data().is_empty());

        let elink = complete(&[0xC0, 0x00, 0x00, 7, 0x00]);
        state.on_complete::<ProductionMode>(0, &elink);
        assert_eq!(state.rof_records()[0].ir, InteractionRecord::new(7, 101));
    }

    #[test]
    fn test_calibration_and_dead_channels() {
        let delays = ElectronicsDelay::default();
        let mut state = LinkState::new(5, delays);
        state.start_page(&rdh(0, 1, 0));
        let calib = complete(&[0xC0, raw_info::CALIBRATE, 0x00, 50, 0x00]);
        state.on_complete::<ProductionMode>(0, &calib);
        assert_eq!(state.rof_records()[0].event_type, EventType::Noise);

        // FET answer with all strips responding but one
        let fet_clock = 50 + delays.calib_to_fet as u8;
        let fet = complete(&[
            0xC0, 0x00, 0x00, fet_clock, 0x03, 0xFF, 0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        ]);
        state.on_complete::<ProductionMode>(0, &fet);
        assert_eq!(state.data().len(), 2);
        let dead = state.data()[1];
        assert_eq!(dead.fired_chambers, 0x1);
        assert_eq!(dead.patterns_bp[0], 0x1);
        assert_eq!(state.rof_records()[1].event_type, EventType::Dead);
        assert_eq!(
            state.rof_records()[1].ir,
            InteractionRecord::new(u16::from(fet_clock), 1)
        );

        // All strips responding: no dead channel, nothing emitted
        let fet_ok = complete(&[0xC0, 0x00, 0x00, fet_clock, 0x01, 0xFF, 0xFF, 0xFF, 0xFF]);
        state.on_complete::<ProductionMode>(0, &fet_ok);
        assert_eq!(state.data().len(), 2);
    }

    #[test]
    fn test_self_triggered_regional_delay() {
        let delays = ElectronicsDelay::default();
        let mut state = LinkState::new(5, delays);
        state.start_page(&rdh(0, 10, 0));
        let reg = complete(&[0x80, 0x00, 0x00, 30, 0x93]);
        state.on_complete::<ProductionMode>(9, &reg);
        assert!(state.data().is_empty());
        state.on_complete::<DebugMode>(9, &reg);
        assert_eq!(state.data()[0].board_id, 0x29);
        assert_eq!(
            state.rof_records()[0].ir,
            InteractionRecord::new(30 - delays.reg_to_local, 10)
        );
    }

    #[test]
    fn test_reset() {
        let mut state = LinkState::new(5, ElectronicsDelay::default());
        state.start_page(&rdh(0, 10, 3));
        let elink = complete(&[0xC0, 0x00, 0x00, 1, 0x00]);
        state.on_complete::<ProductionMode>(0, &elink);
        state.clear();
        assert!(state.data().is_empty());
        state.reset();
        state.start_page(&rdh(0, 20, 1));
        state.on_complete::<ProductionMode>(0, &elink);
        assert_eq!(state.rof_records()[0].ir, InteractionRecord::new(1, 20));
    }
}
