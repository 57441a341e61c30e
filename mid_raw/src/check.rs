//! Consistency checks of the decoded board words.
//!
//! [RawDataChecker](raw_data_checker::RawDataChecker) groups the boards of each event by crate and trigger,
//! and checks that the regional and local boards agree, that the patterns match the fired chambers,
//! that the trigger words are compatible, and that the boards in masked mode report their masks.

pub mod raw_data_checker;
