//! Contains [UserLogicDecoder], the decoder of a GBT link read out through the CRU user logic.
//!
//! The user logic strips the idle bytes and writes the complete board words one after the other,
//! in 32 byte CRU words padded with zeros. A board word never spans two pages.
//! The e-link of a board is recovered from its ID: `id % 8` for local boards and `8 + id % 2` for regional boards.

use crate::config::crate_params::N_LOCALS_PER_GBT;
use crate::util::*;

/// Size of a CRU word, the payload of a page is padded to a multiple of it.
pub const CRU_WORD_SIZE: usize = 32;

/// Decoder of one GBT link in the user logic format.
#[derive(Debug)]
pub struct UserLogicDecoder<M: Mode> {
    elink: ELinkDecoder,
    state: LinkState,
    mode: PhantomData<M>,
}

impl<M: Mode> UserLogicDecoder<M> {
    /// Creates the decoder of GBT link `fee_id`.
    pub fn new(fee_id: u16, delays: ElectronicsDelay) -> Self {
        Self {
            elink: ELinkDecoder::new_any(),
            state: LinkState::new(fee_id, delays),
            mode: PhantomData,
        }
    }

    #[inline]
    fn elink_id(&self) -> usize {
        let id = usize::from(self.elink.id());
        if raw_info::is_loc(self.elink.status_word()) {
            id % N_LOCALS_PER_GBT
        } else {
            N_LOCALS_PER_GBT + id % 2
        }
    }
}

impl<M: Mode> LinkDecoder for UserLogicDecoder<M> {
    fn process(&mut self, payload: &[u8], rdh: &Rdh) {
        self.state.start_page(rdh);
        for (pos, &byte) in payload.iter().enumerate() {
            if !self.elink.is_feeding() {
                if byte == 0 {
                    // Padding: no more board words in the page
                    return;
                }
                if !raw_info::is_start(byte) {
                    log::warn!(
                        "FEE {}: byte {byte:#04x} at position {pos} of the payload does not start a board word, rest of the page skipped",
                        self.state.fee_id()
                    );
                    return;
                }
            }
            if self.elink.feed(byte) {
                let ilink = self.elink_id();
                self.state.on_complete::<M>(ilink, &self.elink);
                self.elink.reset();
            }
        }
        if self.elink.is_feeding() {
            log::warn!(
                "FEE {}: board word truncated at the end of the page after {} bytes",
                self.state.fee_id(),
                self.elink.n_bytes()
            );
            self.elink.reset();
        }
    }

    #[inline]
    fn data(&self) -> &[RoBoard] {
        self.state.data()
    }

    #[inline]
    fn rof_records(&self) -> &[RofRecord] {
        self.state.rof_records()
    }

    fn clear(&mut self) {
        self.state.clear();
    }

    fn reset(&mut self) {
        self.state.reset();
        self.elink.reset();
    }

    fn is_complete(&self) -> bool {
        !self.elink.is_feeding()
    }

    #[inline]
    fn fee_id(&self) -> u16 {
        self.state.fee_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rdh(orbit: u32) -> Rdh {
        Rdh::new_mid(7, 7, 0, 0, 0, orbit)
    }

    #[test]
    fn test_decode_packed_words() {
        let mut decoder = UserLogicDecoder::<DebugMode>::new(7, ElectronicsDelay::default());
        let mut payload = vec![
            0xC0, 0x00, 0x00, 0x05, 0xB1, 0x00, 0x08, 0x00, 0x00, // local 11, chamber 0
            0x80, raw_info::PHY, 0x00, 0x05, 0x92, // regional 9
        ];
        payload.resize(CRU_WORD_SIZE, 0);
        decoder.process(&payload, &rdh(4));

        assert_eq!(decoder.data().len(), 2);
        assert_eq!(decoder.data()[0].board_id, 0x3B);
        assert_eq!(decoder.data()[0].patterns_bp[0], 0x8);
        assert_eq!(decoder.data()[1].board_id, 0x39);
        assert_eq!(decoder.data()[1].fired_chambers, 0x2);
        assert!(decoder
            .rof_records()
            .iter()
            .all(|rof| rof.ir == InteractionRecord::new(5, 4)));
    }

    #[test]
    fn test_regional_not_emitted_in_production() {
        let mut decoder = UserLogicDecoder::<ProductionMode>::new(7, ElectronicsDelay::default());
        let payload = [0x80, raw_info::PHY, 0x00, 0x05, 0x92, 0x00];
        decoder.process(&payload, &rdh(4));
        assert!(decoder.data().is_empty());
    }

    #[test]
    fn test_invalid_byte_stops_the_page() {
        let mut decoder = UserLogicDecoder::<ProductionMode>::new(7, ElectronicsDelay::default());
        let payload = [
            0xC0, 0x00, 0x00, 0x01, 0xB0, 0x12, 0xC0, 0x00, 0x00, 0x02, 0xB0,
        ];
        decoder.process(&payload, &rdh(4));
        assert_eq!(decoder.data().len(), 1);
        assert!(decoder.is_complete());
    }

    #[test]
    fn test_truncated_word_is_dropped() {
        let mut decoder = UserLogicDecoder::<ProductionMode>::new(7, ElectronicsDelay::default());
        decoder.process(&[0xC0, 0x00, 0x00, 0x01, 0xB1, 0x00], &rdh(4));
        assert!(decoder.is_complete());
        assert!(decoder.data().is_empty());
        // The next page starts with a fresh board word
        decoder.process(&[0xC0, 0x00, 0x00, 0x01, 0xB0], &rdh(4));
        assert_eq!(decoder.data().len(), 1);
    }
}
