//! Contains the [StatType] messages sent by the processing components, and the [StatsCollector](stats_collector::StatsCollector) that gathers them.
//!
//! Components are given an optional [`flume::Sender<StatType>`], the statistics are reported as they occur
//! and collected on the receiving end, possibly in another thread.

pub mod stats_collector;

use crate::util::*;

#[allow(variant_size_differences)] // The string is already a pointer.
#[derive(Debug, Clone, PartialEq)]
/// Possible stats that can be sent to the [StatsCollector](stats_collector::StatsCollector).
pub enum StatType {
    /// Fatal error, stop processing.
    Fatal(Box<str>),
    /// Non-fatal error, reported but processing continues.
    Error(Box<str>),
    /// Number of pages decoded.
    PagesDecoded(u32),
    /// Number of board words decoded.
    BoardsDecoded(u32),
    /// A page with a link that has no FEE ID in the mapping.
    UnknownFeeId {
        /// Link ID of the page
        link_id: u8,
        /// End point of the page
        endpoint: u8,
        /// CRU ID of the page
        cru_id: u16,
    },
    /// A FEE ID observed in the data.
    FeeId(u16),
    /// Events checked by the consistency checker.
    EventsChecked {
        /// Number of events checked
        processed: u32,
        /// Number of events with an inconsistency
        faulty: u32,
    },
    /// Statistics of the input reader.
    Input(InputStatType),
}

impl Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatType::Fatal(e) => write!(f, "Fatal error: {e}"),
            StatType::Error(e) => write!(f, "Error: {e}"),
            StatType::PagesDecoded(n) => write!(f, "{n} pages decoded"),
            StatType::BoardsDecoded(n) => write!(f, "{n} boards decoded"),
            StatType::UnknownFeeId {
                link_id,
                endpoint,
                cru_id,
            } => write!(
                f,
                "Unknown FEE ID for link {link_id}, end point {endpoint}, CRU {cru_id}"
            ),
            StatType::FeeId(id) => write!(f, "FEE ID: {id}"),
            StatType::EventsChecked { processed, faulty } => {
                write!(f, "{processed} events checked, {faulty} faulty")
            }
            StatType::Input(stat) => write!(f, "Input: {stat:?}"),
        }
    }
}

impl From<InputStatType> for StatType {
    fn from(stat: InputStatType) -> Self {
        StatType::Input(stat)
    }
}

/// Sends a stat if a sender is given. A dropped receiver is not an error for the sender.
pub(crate) fn report(sender: Option<&flume::Sender<StatType>>, stat: StatType) {
    if let Some(sender) = sender {
        if sender.send(stat).is_err() {
            log::debug!("Stats receiver dropped, statistics are lost");
        }
    }
}
