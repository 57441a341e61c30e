//! Configuration of the decoding: static tables describing the readout and the options of the decoders.
//!
//! * [crate_params] holds the fixed numbers of the readout and the helpers to build and split board IDs.
//! * [FeeIdConfig](fee_id_config::FeeIdConfig) maps the physical link identity found in the RDH to the FEE ID.
//! * [CrateMasks](crate_masks::CrateMasks) holds the active local boards of each GBT link.
//! * [CrateMapper](crate_mapper::CrateMapper) maps local boards to the detector columns and lines.
//! * [DecoderConfig](decoder_config::DecoderConfig) holds the options read from a TOML file.
//!
//! The tables are loaded once before processing and never change during a processing pass.

pub mod crate_mapper;
pub mod crate_masks;
pub mod crate_params;
pub mod decoder_config;
pub mod electronics_delay;
pub mod fee_id_config;
pub mod prelude;
#[cfg(test)]
pub mod test_util;

use crate::util::*;

/// Parses a number written in decimal or in hexadecimal with a `0x` prefix.
pub(crate) fn parse_number(token: &str) -> Option<u32> {
    match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => token.parse().ok(),
    }
}

/// Parses a configuration table: whitespace delimited numbers, one record per line.
///
/// Everything following a `#` is a comment, empty lines are ignored.
/// Each record must have at least `n_columns` numbers, additional columns are ignored.
pub(crate) fn parse_table(content: &str, n_columns: usize) -> Result<Vec<Vec<u32>>, io::Error> {
    let mut records = Vec::new();
    for (line_number, line) in content.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default();
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() < n_columns {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "line {}: expected {n_columns} fields, found {}: '{line}'",
                    line_number + 1,
                    tokens.len()
                ),
            ));
        }
        let record = tokens[..n_columns]
            .iter()
            .map(|token| {
                parse_number(token).ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("line {}: invalid number '{token}'", line_number + 1),
                    )
                })
            })
            .collect::<Result<Vec<u32>, io::Error>>()?;
        records.push(record);
    }
    Ok(records)
}

/// Converts a parsed value to a narrower integer type, failing with [InvalidData](io::ErrorKind::InvalidData) if it does not fit.
pub(crate) fn narrow<T: TryFrom<u32>>(value: u32, field: &str) -> Result<T, io::Error> {
    T::try_from(value).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{field} out of range: {value}"),
        )
    })
}
