//! Re-exports of the configuration types and option traits.
pub use super::crate_mapper::{CrateMapper, DeBoard};
pub use super::crate_masks::CrateMasks;
pub use super::decoder_config::{BusyPolicy, CheckOpt, DecodeOpt, DecoderConfig};
pub use super::electronics_delay::ElectronicsDelay;
pub use super::fee_id_config::FeeIdConfig;
