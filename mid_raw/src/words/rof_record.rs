//! The [RofRecord] index entry and the [EventType] of an event.

use super::interaction_record::InteractionRecord;
use std::fmt::{self, Display};
use std::ops::Range;

/// Type of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum EventType {
    /// Physics data
    #[default]
    Standard = 0,
    /// Answer to a calibration trigger: noisy channels
    Noise = 1,
    /// FET answer following a calibration trigger: dead channels
    Dead = 2,
}

impl EventType {
    /// All event types, in the order used for output.
    pub const ALL: [EventType; 3] = [EventType::Standard, EventType::Noise, EventType::Dead];

    /// Index of the event type in [EventType::ALL].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            EventType::Standard => "Standard",
            EventType::Noise => "Noise",
            EventType::Dead => "Dead",
        };
        write!(f, "{name}")
    }
}

/// Read-Out Frame record: delimits the records of one event in a parallel data vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RofRecord {
    /// Time of the event
    pub ir: InteractionRecord,
    /// Type of the event
    pub event_type: EventType,
    /// Index of the first record in the data vector
    pub first_entry: usize,
    /// Number of records
    pub n_entries: usize,
}

impl RofRecord {
    /// Creates a new [RofRecord].
    pub const fn new(
        ir: InteractionRecord,
        event_type: EventType,
        first_entry: usize,
        n_entries: usize,
    ) -> Self {
        Self {
            ir,
            event_type,
            first_entry,
            n_entries,
        }
    }

    /// Index after the last record of the event.
    #[inline]
    pub fn end_index(&self) -> usize {
        self.first_entry + self.n_entries
    }

    /// Range of the records of the event in the data vector.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.first_entry..self.end_index()
    }
}

impl Display for RofRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}  type: {}  first entry: {}  entries: {}",
            self.ir, self.event_type, self.first_entry, self.n_entries
        )
    }
}
