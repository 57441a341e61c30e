#![warn(unused_extern_crates)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(missing_copy_implementations)]
// Readability lints
#![warn(
    clippy::option_filter_map,
    clippy::manual_filter_map,
    clippy::if_not_else,
    clippy::nonminimal_bool,
    clippy::single_match_else,
    clippy::range_plus_one,
    clippy::int_plus_one,
    clippy::needless_continue
)]
// Performance lints
#![warn(variant_size_differences)]
#![warn(
    clippy::needless_pass_by_value,
    clippy::unnecessary_wraps,
    clippy::mutex_integer,
    clippy::mem_forget,
    clippy::maybe_infinite_iter
)]
// Safety lints
#![warn(unused_results)]
#![warn(unused_import_braces)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(clippy::map_unwrap_or)]

//! Decoding, aggregation, consistency checks and filtering of the raw data of the ALICE Muon IDentifier (MID).
//!
//! The data flows through the crate in stages, each stage taking the output of the previous one:
//!
//! 1. [Decoder](decode::decoder::Decoder) turns a buffer of RDH framed pages into board words ([RoBoard](words::ro_board::RoBoard))
//!    with one [RofRecord](words::rof_record::RofRecord) per board.
//! 2. [RawDataChecker](check::raw_data_checker::RawDataChecker) optionally checks the consistency of the board words.
//! 3. [DecodedDataAggregator](aggregate::DecodedDataAggregator) converts the board words into strip patterns per column
//!    ([ColumnData](words::column_data::ColumnData)), one event per event type and interaction record.
//! 4. [Filterer](filter::filterer::Filterer) and [FiltererBc](filter::filterer_bc::FiltererBc) remove the masked channels
//!    and the events outside of the colliding bunches.
//!
//! The [Encoder](encode::encoder::Encoder) does the inverse of the decoding and writes column data as raw data.
//!
//! # Example
//! ```text
//! use mid_raw::prelude::*;
//!
//! let config = DecoderConfig::load(Path::new("mid_decoder.toml"))?;
//! let mut decoder = Decoder::from_config(&config)?;
//! let mut aggregator = DecodedDataAggregator::new();
//!
//! decoder.process(&buffer);
//! aggregator.process(decoder.data(), decoder.rof_records());
//! for rof in aggregator.rof_records(EventType::Standard) {
//!     println!("{}: {} columns", rof.ir, rof.n_entries);
//! }
//! ```

pub mod aggregate;
pub mod check;
pub mod config;
pub mod decode;
pub mod encode;
pub mod filter;
pub mod prelude;
pub mod stats;
pub mod util;
pub mod words;
