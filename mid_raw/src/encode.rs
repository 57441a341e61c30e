//! Encoding of column data into MID raw data, the inverse of [decode](crate::decode).
//!
//! * [ColumnDataToLocalBoard](column_to_board::ColumnDataToLocalBoard) converts the strip patterns into local board words.
//! * [GbtEncoder](gbt_encoder::GbtEncoder) serializes the board words of one GBT link into RDH framed pages.
//! * [Encoder](encoder::Encoder) dispatches the events to the GBT links and handles the heartbeat frames.

pub mod column_to_board;
pub mod encoder;
pub mod gbt_encoder;
