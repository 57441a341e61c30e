//! Data structures for the words and records of MID raw data, and the output records of the decoding.
//!
//! * [RoBoard](ro_board::RoBoard): one board word as read out from a local or regional board.
//! * [ColumnData](column_data::ColumnData): the strip patterns of one column of one detection element.
//! * [RofRecord](rof_record::RofRecord): an index entry delimiting the records of one event in a flat vector.
//! * [InteractionRecord](interaction_record::InteractionRecord): the bunch crossing and orbit of an event.

pub mod column_data;
pub mod interaction_record;
pub mod raw_info;
pub mod ro_board;
pub mod rof_record;
