//! Headers with known content, used for testing.

use super::{Rdh, MID_SYSTEM_ID, RDH_SIZE_BYTES};

/// Wire representation of a MID header from FEE 3 (link 3), with a 32 byte payload.
pub const CORRECT_RDH_MID_BYTES: [u8; RDH_SIZE_BYTES] = [
    0x06, 0x40, 0x03, 0x00, 0x00, MID_SYSTEM_ID, 0x00, 0x00, // RDH0
    0x60, 0x00, 0x60, 0x00, 0x03, 0x00, 0x00, 0x00, // offset, memory size, link, packet counter, cru/dw
    0x23, 0x01, 0x00, 0x00, 0x75, 0xD5, 0x7D, 0x0B, // RDH1: bc, orbit
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // data format
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // RDH2: trigger type, pages counter, stop bit
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // reserved
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // RDH3
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // reserved
];

/// Builds a single page made of a header for `fee_id` followed by `payload`.
///
/// Follows the default FEE ID mapping: with `gbt = fee_id % 16` the link ID is `gbt % 12`,
/// the end point `gbt / 12` and the CRU ID `fee_id / 16`.
pub fn make_page(fee_id: u16, bc: u16, orbit: u32, pages_counter: u16, payload: &[u8]) -> Vec<u8> {
    let gbt = fee_id % 16;
    let mut rdh = Rdh::new_mid(fee_id, (gbt % 12) as u8, (gbt / 12) as u8, fee_id / 16, bc, orbit);
    rdh.pages_counter = pages_counter;
    rdh.set_payload_size(payload.len() as u16);
    let mut page = rdh.to_bytes().to_vec();
    page.extend_from_slice(payload);
    page
}
