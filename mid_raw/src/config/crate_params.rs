//! Fixed parameters of the MID readout, and helpers to build and split the IDs of boards and links.
//!
//! The detector is read out by 16 crates, 8 per side. Each crate holds up to 16 local boards
//! and is read out through 2 GBT links, each carrying 8 local boards and 2 regional boards.
//! The GBT link is identified by the FEE ID: `2 * crate_id + gbt_in_crate`.

/// Number of crates.
pub const N_CRATES: usize = 16;
/// Number of GBT links.
pub const N_GBTS: usize = 32;
/// Number of GBT links per detector side.
pub const N_GBTS_PER_SIDE: usize = 16;
/// Number of GBT links per crate.
pub const N_GBTS_PER_CRATE: usize = 2;
/// Maximum number of local boards in a crate.
pub const MAX_BOARDS_IN_CRATE: usize = 16;
/// Number of local boards read out by one GBT link.
pub const N_LOCALS_PER_GBT: usize = 8;
/// Number of regional boards read out by one GBT link.
pub const N_REGIONALS_PER_GBT: usize = 2;
/// Number of e-links in a GBT link: local boards first, then regional boards.
pub const N_ELINKS_PER_GBT: usize = N_LOCALS_PER_GBT + N_REGIONALS_PER_GBT;

/// Builds the unique board ID from the crate and the board index in the crate.
#[inline]
pub fn make_unique_loc_id(crate_id: u8, loc_id: u8) -> u8 {
    (crate_id << 4) | (loc_id & 0xF)
}

/// Crate ID of a unique board ID.
#[inline]
pub fn crate_id(unique_loc_id: u8) -> u8 {
    unique_loc_id >> 4
}

/// Board index in the crate of a unique board ID.
#[inline]
pub fn loc_id(unique_loc_id: u8) -> u8 {
    unique_loc_id & 0xF
}

/// Crate ID read out by a GBT link.
#[inline]
pub fn crate_id_from_fee_id(fee_id: u16) -> u8 {
    (fee_id / N_GBTS_PER_CRATE as u16) as u8
}

/// Index of the GBT link in its crate.
#[inline]
pub fn gbt_id_in_crate(fee_id: u16) -> u8 {
    (fee_id % N_GBTS_PER_CRATE as u16) as u8
}

/// FEE ID of the GBT link of a crate.
#[inline]
pub fn make_fee_id(crate_id: u8, gbt_in_crate: u8) -> u16 {
    u16::from(crate_id) * N_GBTS_PER_CRATE as u16 + u16::from(gbt_in_crate)
}

/// FEE ID of the GBT link reading out a local board.
#[inline]
pub fn fee_id_from_board(unique_loc_id: u8) -> u16 {
    make_fee_id(
        crate_id(unique_loc_id),
        loc_id(unique_loc_id) / N_LOCALS_PER_GBT as u8,
    )
}

/// Crates 0 to 7 are on the right side of the detector, 8 to 15 on the left.
#[inline]
pub fn is_right_side(crate_id: u8) -> bool {
    usize::from(crate_id) < N_CRATES / 2
}
