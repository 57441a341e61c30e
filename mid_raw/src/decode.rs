//! Decoding of the MID raw data, from the bytes of the pages to board words with their interaction records.
//!
//! The decoding is layered:
//! * [ELinkDecoder](elink_decoder::ELinkDecoder) assembles the bytes of one e-link into a board word.
//! * [LinkState](link_state::LinkState) turns complete board words into output records, keeping the clock bookkeeping of a GBT link.
//! * [GbtBareDecoder](gbt_bare_decoder::GbtBareDecoder) and [UserLogicDecoder](user_logic_decoder::UserLogicDecoder)
//!   dispatch the payload of a GBT link to the e-links, for the bare GBT and the CRU user logic formats.
//! * [Decoder](decoder::Decoder) splits a buffer of pages by link and merges the output of all links.

pub mod decoder;
pub mod elink_decoder;
pub mod gbt_bare_decoder;
pub mod link_decoder;
pub mod link_state;
pub mod user_logic_decoder;
