//! Contains the [StatsCollector] that collects the stats reported during processing.

use crate::util::*;

/// Collects stats from decoding and checking.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsCollector {
    is_finalized: bool,
    pages_seen: u64,
    hbfs_seen: u64,
    payload_size: u64,
    pages_decoded: u64,
    boards_decoded: u64,
    fee_ids: Vec<u16>,
    unknown_links: Vec<String>,
    events_processed: u64,
    events_faulty: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    fatal_error: Option<Box<str>>,
    reported_errors: Vec<Box<str>>,
}

impl StatsCollector {
    /// Record a stat.
    pub fn collect(&mut self, stat: StatType) {
        match stat {
            StatType::Fatal(m) => {
                if self.fatal_error.is_none() {
                    self.fatal_error = Some(m);
                }
            }
            StatType::Error(m) => self.reported_errors.push(m),
            StatType::PagesDecoded(n) => self.pages_decoded += u64::from(n),
            StatType::BoardsDecoded(n) => self.boards_decoded += u64::from(n),
            StatType::UnknownFeeId {
                link_id,
                endpoint,
                cru_id,
            } => self
                .unknown_links
                .push(format!("link {link_id} ep {endpoint} cru {cru_id}")),
            StatType::FeeId(id) => self.fee_ids.push(id),
            StatType::EventsChecked { processed, faulty } => {
                self.events_processed += u64::from(processed);
                self.events_faulty += u64::from(faulty);
            }
            StatType::Input(input_stat) => self.collect_input(input_stat),
        }
    }

    fn collect_input(&mut self, stat: InputStatType) {
        match stat {
            InputStatType::Fatal(m) => self.collect(StatType::Fatal(m)),
            InputStatType::FeeId(id) => self.fee_ids.push(id),
            InputStatType::PagesSeen(n) => self.pages_seen += u64::from(n),
            InputStatType::HbfSeen(n) => self.hbfs_seen += u64::from(n),
            InputStatType::PayloadSize(sz) => self.payload_size += u64::from(sz),
            InputStatType::SystemId(id) => {
                if id != MID_SYSTEM_ID {
                    self.reported_errors
                        .push(format!("Unexpected system ID {id}, expected {MID_SYSTEM_ID}").into());
                }
            }
        }
    }

    /// Collects all the stats currently in the channel, without blocking.
    pub fn collect_pending(&mut self, receiver: &flume::Receiver<StatType>) {
        for stat in receiver.try_iter() {
            self.collect(stat);
        }
    }

    /// Finalize stats collection. Meaning no more stats can be collected.
    ///
    /// Does nothing if already finalized.
    pub fn finalize(&mut self) {
        if self.is_finalized {
            return;
        }
        self.fee_ids.sort_unstable();
        self.fee_ids.dedup();
        self.unknown_links.sort();
        self.unknown_links.dedup();
        self.is_finalized = true;
    }

    /// Returns true if [StatsCollector::finalize] was called.
    pub fn is_finalized(&self) -> bool {
        self.is_finalized
    }

    /// Number of pages decoded.
    pub fn pages_decoded(&self) -> u64 {
        self.pages_decoded
    }

    /// Number of boards decoded.
    pub fn boards_decoded(&self) -> u64 {
        self.boards_decoded
    }

    /// Number of pages read from the input.
    pub fn pages_seen(&self) -> u64 {
        self.pages_seen
    }

    /// Number of heartbeat frames read from the input.
    pub fn hbfs_seen(&self) -> u64 {
        self.hbfs_seen
    }

    /// Total payload size read from the input, in bytes.
    pub fn payload_size(&self) -> u64 {
        self.payload_size
    }

    /// FEE IDs observed, sorted once finalized.
    pub fn fee_ids(&self) -> &[u16] {
        &self.fee_ids
    }

    /// Links without FEE ID that were observed.
    pub fn unknown_links(&self) -> &[String] {
        &self.unknown_links
    }

    /// Number of events checked.
    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Number of events where the checker found an inconsistency.
    pub fn events_faulty(&self) -> u64 {
        self.events_faulty
    }

    /// Fraction of the checked events that are faulty, 0 if no event was checked.
    pub fn faulty_ratio(&self) -> f64 {
        if self.events_processed == 0 {
            0.
        } else {
            self.events_faulty as f64 / self.events_processed as f64
        }
    }

    /// Returns true if the fraction of faulty events is above `threshold`.
    pub fn exceeds_faulty_ratio(&self, threshold: f64) -> bool {
        self.faulty_ratio() > threshold
    }

    /// Returns the number of errors reported.
    pub fn err_count(&self) -> usize {
        self.reported_errors.len()
    }

    /// Return if any errors were reported.
    pub fn any_errors(&self) -> bool {
        !self.reported_errors.is_empty()
    }

    /// Returns if any fatal errors were reported.
    pub fn fatal_err(&self) -> bool {
        self.fatal_error.is_some()
    }

    /// Takes the reported errors and returns them as a vector of owned read-only strings.
    pub fn consume_reported_errors(&mut self) -> Vec<Box<str>> {
        std::mem::take(&mut self.reported_errors)
    }

    /// Takes the reported fatal error, if any.
    pub fn take_fatal_err(&mut self) -> Option<Box<str>> {
        self.fatal_error.take()
    }

    /// Serializes the collected stats as TOML.
    pub fn to_toml_string(&self) -> Result<String, io::Error> {
        toml::to_string_pretty(self).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Deserializes stats from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, io::Error> {
        toml::from_str(content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    }
}
