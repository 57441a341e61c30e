//! Includes all the basics for reading MID raw data.

pub use super::hbf_scanner::HbfScanner;
pub use super::init_reader;
pub use super::page_reader::RawPageReader;
pub use super::rdh::test_data;
pub use super::rdh::Rdh;
pub use super::rdh::MID_SYSTEM_ID;
pub use super::rdh::RDH_SIZE_BYTES;
pub use super::stats::InputStatType;
