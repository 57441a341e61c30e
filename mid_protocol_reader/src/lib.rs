#![warn(unused_extern_crates)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(missing_copy_implementations)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unused_results)]
#![warn(unused_import_braces)]
#![warn(variant_size_differences)]
#![warn(
    clippy::option_filter_map,
    clippy::manual_filter_map,
    clippy::if_not_else,
    clippy::nonminimal_bool
)]
// Performance lints
#![warn(
    clippy::needless_pass_by_value,
    clippy::unnecessary_wraps,
    clippy::mutex_integer,
    clippy::mem_forget,
    clippy::maybe_infinite_iter
)]

//! Reader library for raw data of the MID detector, framed in pages by the RAW Data Header ([Rdh](rdh::Rdh)).
//!
//! Two ways of reading are provided:
//! * [RawPageReader](page_reader::RawPageReader) walks the pages of a buffer that is already in memory, without copying.
//! * [HbfScanner](hbf_scanner::HbfScanner) reads pages or complete heartbeat frames from a file or stdin.
//!
//! # Example
//! ```text
//! use mid_protocol_reader::prelude::*;
//!
//! let reader = init_reader(Some(&path)).unwrap();
//! let mut scanner = HbfScanner::minimal(reader);
//!
//! while let Some(hbf) = scanner.load_hbf().unwrap() {
//!     let mut pages = RawPageReader::new(&hbf);
//!     while pages.next_non_empty_page() {
//!         println!("{}", pages.rdh().unwrap());
//!     }
//! }
//! ```

pub mod hbf_scanner;
pub mod page_reader;
pub mod prelude;
pub mod rdh;
pub mod stats;

use std::io::IsTerminal;
use std::path::PathBuf;

const READER_BUFFER_SIZE: usize = 1024 * 50; // 50KB

/// Initializes the reader based on the input mode (file or stdin) and returns it.
///
/// The input mode is determined by the presence of the input file path.
#[inline]
pub fn init_reader(
    input_file: Option<&PathBuf>,
) -> Result<Box<dyn std::io::Read + Send>, std::io::Error> {
    if let Some(path) = input_file {
        let f = std::fs::OpenOptions::new().read(true).open(path)?;
        Ok(Box::new(std::io::BufReader::with_capacity(
            READER_BUFFER_SIZE,
            f,
        )))
    } else if !std::io::stdin().is_terminal() {
        Ok(Box::new(std::io::BufReader::with_capacity(
            READER_BUFFER_SIZE,
            std::io::stdin(),
        )))
    } else {
        Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "stdin not redirected!",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_reader_missing_file() {
        let tmp_d = temp_dir::TempDir::new().unwrap();
        let path = tmp_d.child("does_not_exist.raw");
        let err = init_reader(Some(&path)).err().unwrap();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
