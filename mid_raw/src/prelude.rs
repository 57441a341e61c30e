//! Re-exports of the types needed to run the processing chain.

pub use super::aggregate::DecodedDataAggregator;
pub use super::check::raw_data_checker::RawDataChecker;
pub use super::config::prelude::*;
pub use super::decode::decoder::Decoder;
pub use super::encode::encoder::Encoder;
pub use super::filter::bunch_filling::BunchFilling;
pub use super::filter::channel_masks::ChannelMasks;
pub use super::filter::channel_scalers::ChannelScalers;
pub use super::filter::fet_to_dead::FetToDead;
pub use super::filter::filterer::Filterer;
pub use super::filter::filterer_bc::FiltererBc;
pub use super::filter::mask_maker::{make_default_masks, make_masks, DEFAULT_THRESHOLD};
pub use super::stats::stats_collector::StatsCollector;
pub use super::stats::StatType;
pub use super::util::lib::{display_error, init_error_logger};
pub use super::words::column_data::ColumnData;
pub use super::words::interaction_record::InteractionRecord;
pub use super::words::raw_info;
pub use super::words::ro_board::RoBoard;
pub use super::words::rof_record::{EventType, RofRecord};
pub use mid_protocol_reader::prelude::{HbfScanner, RawPageReader, Rdh};
