//! Filtering of the decoded column data, and the tools to build the channel masks used for it.
//!
//! * [Filterer](filterer::Filterer) removes the masked channels from the data.
//! * [FiltererBc](filterer_bc::FiltererBc) keeps the events compatible with a colliding bunch crossing.
//! * [ChannelScalers](channel_scalers::ChannelScalers) and [make_masks](mask_maker::make_masks) build masks from the noisy channels.
//! * [FetToDead](fet_to_dead::FetToDead) finds the dead channels from the answers to the test pulses.

pub mod bunch_filling;
pub mod channel_masks;
pub mod channel_scalers;
pub mod column_data_handler;
pub mod fet_to_dead;
pub mod filterer;
pub mod filterer_bc;
pub mod mask_maker;
