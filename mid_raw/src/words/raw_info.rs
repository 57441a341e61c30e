//! Bit definitions of the status and trigger bytes of a board word.

/// Start bit, set in the first byte of every board word.
pub const STARTBIT: u8 = 0x80;
/// Card type, set for local boards and unset for regional boards.
pub const CARDTYPE: u8 = 0x40;
/// The board was busy.
pub const LOCALBUSY: u8 = 0x20;
/// Local trigger decision.
pub const LOCALDECISION: u8 = 0x10;
/// The board is active.
pub const ACTIVE: u8 = 0x08;
/// The board rejected the event.
pub const REJECTING: u8 = 0x04;
/// The board is masked.
pub const MASKED: u8 = 0x02;
/// The patterns are overwritten by the masks.
pub const OVERWRITTEN: u8 = 0x01;

/// Start of run (start of continuous readout).
pub const SOX: u8 = 0x80;
/// End of run (end of continuous readout).
pub const EOX: u8 = 0x40;
/// Pause trigger.
pub const PAUSE: u8 = 0x20;
/// Resume trigger.
pub const RESUME: u8 = 0x10;
/// Calibration (FET) trigger.
pub const CALIBRATE: u8 = 0x08;
/// Physics trigger.
pub const PHY: u8 = 0x04;
/// Reset trigger.
pub const RESET: u8 = 0x02;
/// Orbit trigger.
pub const ORB: u8 = 0x01;

/// Checks if the status word belongs to a local board.
#[inline]
pub fn is_loc(status_word: u8) -> bool {
    status_word & CARDTYPE != 0
}

/// Checks if the trigger word contains a calibration trigger.
#[inline]
pub fn is_calibration(trigger_word: u8) -> bool {
    trigger_word & CALIBRATE != 0
}

/// Checks if the byte starts a local board word.
#[inline]
pub fn is_local_start(byte: u8) -> bool {
    byte & (STARTBIT | CARDTYPE) == (STARTBIT | CARDTYPE)
}

/// Checks if the byte starts a board word of any type.
#[inline]
pub fn is_start(byte: u8) -> bool {
    byte & STARTBIT != 0
}
