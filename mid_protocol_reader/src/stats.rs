//! Contains the [InputStatType] enum for the statistics gathered while reading input, and the [Stats] struct that tracks and reports them.

#[allow(variant_size_differences)] // The string is already a pointer.
#[derive(Debug, Clone, PartialEq)]
/// Possible stats that can be sent to the stats collector.
pub enum InputStatType {
    /// Fatal error, stop processing.
    Fatal(Box<str>),
    /// A FEE ID observed for the first time.
    FeeId(u16),
    /// A number of pages read.
    PagesSeen(u32),
    /// A number of heartbeat frames read.
    HbfSeen(u32),
    /// Total payload size in bytes.
    PayloadSize(u32),
    /// The system ID of the first page.
    SystemId(u8),
}

/// Tracks statistics about the input data and reports them through a [flume::Sender].
///
/// Counters are accumulated locally and only sent in batches to keep the channel traffic low.
#[derive(Debug)]
pub struct Stats {
    reporter: flume::Sender<InputStatType>,
    pages_seen: u32,
    payload_size_seen: u32,
    unique_fee_ids_observed: Vec<u16>,
}

impl Stats {
    const PAGE_REPORT_BATCH: u32 = 1000;

    /// Create a new [Stats] instance.
    pub fn new(reporter: flume::Sender<InputStatType>) -> Self {
        Self {
            reporter,
            pages_seen: 0,
            payload_size_seen: 0,
            unique_fee_ids_observed: Vec::new(),
        }
    }

    fn report(&self, stat: InputStatType) {
        if self.reporter.send(stat).is_err() {
            log::debug!("Stats receiver dropped, input statistics are lost");
        }
    }

    /// Add a FEE ID to the observed ones, it is reported the first time it is seen.
    pub fn try_add_fee_id(&mut self, fee_id: u16) {
        if !self.unique_fee_ids_observed.contains(&fee_id) {
            self.unique_fee_ids_observed.push(fee_id);
            self.report(InputStatType::FeeId(fee_id));
        }
    }

    /// Increment the page counter.
    pub fn page_seen(&mut self) {
        self.pages_seen += 1;
        if self.pages_seen == Self::PAGE_REPORT_BATCH {
            self.report(InputStatType::PagesSeen(self.pages_seen));
            self.pages_seen = 0;
        }
    }

    /// Add to the payload size counter.
    pub fn add_payload_size(&mut self, payload_size: u32) {
        self.payload_size_seen += payload_size;
    }

    /// Report a closed heartbeat frame.
    pub fn hbf_seen(&self) {
        self.report(InputStatType::HbfSeen(1));
    }

    /// Report the system ID of the data.
    pub fn system_id(&self, system_id: u8) {
        self.report(InputStatType::SystemId(system_id));
    }

    /// Report a fatal error.
    pub fn fatal(&self, msg: impl Into<Box<str>>) {
        self.report(InputStatType::Fatal(msg.into()));
    }
}

impl Drop for Stats {
    // Flush the counters that were not reported yet
    fn drop(&mut self) {
        if self.pages_seen > 0 {
            self.report(InputStatType::PagesSeen(self.pages_seen));
        }
        if self.payload_size_seen > 0 {
            self.report(InputStatType::PayloadSize(self.payload_size_seen));
        }
    }
}
