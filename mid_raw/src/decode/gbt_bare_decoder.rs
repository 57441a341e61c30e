//! Contains [GbtBareDecoder], the decoder of a GBT link read out in the bare format.
//!
//! In the bare format the payload is a sequence of 16 byte GBT words.
//! Each word carries one byte per e-link, grouped by half crate:
//! bytes 0 to 3 are the local boards 0 to 3 and byte 4 the first regional board,
//! bytes 5 to 8 the local boards 4 to 7 and byte 9 the second regional board.
//! The last 6 bytes of the word are unused.

use crate::config::crate_params::{N_ELINKS_PER_GBT, N_LOCALS_PER_GBT};
use crate::util::*;

/// Size of a GBT word.
pub const GBT_WORD_SIZE: usize = 16;

const LOCALS_PER_HALF: usize = N_LOCALS_PER_GBT / 2;

/// Position in the GBT word of the byte of an e-link.
#[inline]
pub fn elink_byte_index(ilink: usize) -> usize {
    if ilink < N_LOCALS_PER_GBT {
        (LOCALS_PER_HALF + 1) * (ilink / LOCALS_PER_HALF) + ilink % LOCALS_PER_HALF
    } else {
        (LOCALS_PER_HALF + 1) * (ilink - N_LOCALS_PER_GBT) + LOCALS_PER_HALF
    }
}

/// Decoder of one GBT link in the bare format.
#[derive(Debug)]
pub struct GbtBareDecoder<M: Mode> {
    elinks: [ELinkDecoder; N_ELINKS_PER_GBT],
    mask: u8,
    state: LinkState,
    mode: PhantomData<M>,
}

impl<M: Mode> GbtBareDecoder<M> {
    /// Creates the decoder of GBT link `fee_id`, reading the local boards with their bit set in `mask`.
    pub fn new(fee_id: u16, mask: u8, delays: ElectronicsDelay) -> Self {
        Self {
            elinks: std::array::from_fn(|ilink| {
                if ilink < N_LOCALS_PER_GBT {
                    ELinkDecoder::new_local()
                } else {
                    ELinkDecoder::new_any()
                }
            }),
            mask,
            state: LinkState::new(fee_id, delays),
            mode: PhantomData,
        }
    }

    #[inline]
    fn is_active(&self, ilink: usize) -> bool {
        ilink >= N_LOCALS_PER_GBT || self.mask >> ilink & 0x1 == 1
    }

    fn process_word(&mut self, word: &[u8]) {
        for ilink in 0..N_ELINKS_PER_GBT {
            if !self.is_active(ilink) {
                continue;
            }
            let elink = &mut self.elinks[ilink];
            if elink.feed(word[elink_byte_index(ilink)]) {
                self.state.on_complete::<M>(ilink, elink);
                elink.reset();
            }
        }
    }
}

impl<M: Mode> LinkDecoder for GbtBareDecoder<M> {
    fn process(&mut self, payload: &[u8], rdh: &Rdh) {
        self.state.start_page(rdh);
        let words = payload.chunks_exact(GBT_WORD_SIZE);
        if !words.remainder().is_empty() {
            log::warn!(
                "FEE {}: payload of {} bytes is not a multiple of the GBT word size, {} bytes ignored",
                self.state.fee_id(),
                payload.len(),
                words.remainder().len()
            );
        }
        for word in words {
            self.process_word(word);
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
        self.elinks.iter_mut().for_each(ELinkDecoder::reset);
    }

    fn is_complete(&self) -> bool {
        self.elinks.iter().all(|elink| !elink.is_feeding())
    }

    #[inline]
    fn fee_id(&self) -> u16 {
        self.state.fee_id()
    }
}
