//! Contains the [LinkDecoder] trait shared by the decoders of one GBT link, and [create_link_decoder] to pick one from the options.

use super::gbt_bare_decoder::GbtBareDecoder;
use super::user_logic_decoder::UserLogicDecoder;
use crate::util::*;

/// Decoder of the pages of one GBT link.
///
/// The output accumulates over calls to [LinkDecoder::process] until [LinkDecoder::clear] is called.
pub trait LinkDecoder: fmt::Debug {
    /// Decodes the payload of one page, `rdh` is the header of the page.
    fn process(&mut self, payload: &[u8], rdh: &Rdh);
    /// Decoded boards.
    fn data(&self) -> &[RoBoard];
    /// One record per decoded board, pointing into [LinkDecoder::data].
    fn rof_records(&self) -> &[RofRecord];
    /// Clears the output.
    fn clear(&mut self);
    /// Clears the output and the state of the link, as if no page had been received.
    fn reset(&mut self);
    /// True if no board word is partially received.
    fn is_complete(&self) -> bool;
    /// FEE ID of the decoded link.
    fn fee_id(&self) -> u16;
}

/// Creates the decoder of the GBT link `fee_id` for the data format and mode in `config`.
///
/// `mask` holds one bit per local board e-link, e-links with their bit unset are ignored in the bare format.
pub fn create_link_decoder(
    fee_id: u16,
    mask: u8,
    config: &impl DecodeOpt,
) -> Box<dyn LinkDecoder + Send> {
    let delays = config.electronics_delay();
    match (config.user_logic(), config.debug_mode()) {
        (false, false) => Box::new(GbtBareDecoder::<ProductionMode>::new(fee_id, mask, delays)),
        (false, true) => Box::new(GbtBareDecoder::<DebugMode>::new(fee_id, mask, delays)),
        (true, false) => Box::new(UserLogicDecoder::<ProductionMode>::new(fee_id, delays)),
        (true, true) => Box::new(UserLogicDecoder::<DebugMode>::new(fee_id, delays)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_util::MockConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_link_decoder() {
        let bare = create_link_decoder(3, 0xFF, &MockConfig::new());
        assert_eq!(bare.fee_id(), 3);
        assert!(format!("{bare:?}").starts_with("GbtBareDecoder"));

        let ul = create_link_decoder(4, 0xFF, &MockConfig::new_user_logic());
        assert_eq!(ul.fee_id(), 4);
        assert!(format!("{ul:?}").starts_with("UserLogicDecoder"));
        assert!(ul.is_complete());
        assert!(ul.data().is_empty());
    }
}
