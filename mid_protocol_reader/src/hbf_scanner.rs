//! Contains the [HbfScanner] that reads RDH framed pages from any [Read] source, one page or one heartbeat frame at a time.

use super::rdh::{Rdh, RDH_SIZE_BYTES};
use super::stats::{InputStatType, Stats};
use std::io::Read;

/// Reads pages from a [Read] source and optionally reports [InputStatType] through a [`flume::Sender<InputStatType>`].
///
/// Pages are returned with their header and any padding up to the next header,
/// so that concatenated pages form a valid buffer for [RawPageReader](crate::page_reader::RawPageReader).
#[derive(Debug)]
pub struct HbfScanner<R: Read> {
    reader: R,
    stats: Option<Stats>,
    pages_read: u64,
}

impl<R: Read> HbfScanner<R> {
    /// Creates a new [HbfScanner] reporting statistics to `stats_sender` if one is given.
    pub fn new(reader: R, stats_sender: Option<flume::Sender<InputStatType>>) -> Self {
        Self {
            reader,
            stats: stats_sender.map(Stats::new),
            pages_read: 0,
        }
    }

    /// Creates a new [HbfScanner] without statistics.
    pub fn minimal(reader: R) -> Self {
        Self::new(reader, None)
    }

    /// Number of pages read so far.
    pub fn pages_read(&self) -> u64 {
        self.pages_read
    }

    // Returns None if the source is exhausted before the first byte of the header.
    fn load_header(&mut self) -> Result<Option<(Rdh, [u8; RDH_SIZE_BYTES])>, std::io::Error> {
        let mut buf = [0u8; RDH_SIZE_BYTES];
        let mut filled = 0;
        while filled < RDH_SIZE_BYTES {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        match filled {
            0 => Ok(None),
            RDH_SIZE_BYTES => Rdh::from_buf(&buf).map(|rdh| Some((rdh, buf))),
            _ => Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("Input ended after {filled} bytes of a header"),
            )),
        }
    }

    /// Loads the next page. Returns `Ok(None)` when the input is exhausted.
    pub fn load_page(&mut self) -> Result<Option<(Rdh, Vec<u8>)>, std::io::Error> {
        let Some((rdh, header)) = self.load_header()? else {
            return Ok(None);
        };
        if usize::from(rdh.offset_to_next) < RDH_SIZE_BYTES
            || rdh.memory_size > rdh.offset_to_next
        {
            let msg = format!(
                "Invalid page sizes after {} pages: memory size {}, offset to next {}",
                self.pages_read, rdh.memory_size, rdh.offset_to_next
            );
            if let Some(stats) = self.stats.as_ref() {
                stats.fatal(msg.as_str());
            }
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, msg));
        }
        let mut page = Vec::with_capacity(usize::from(rdh.offset_to_next));
        page.extend_from_slice(&header);
        page.resize(usize::from(rdh.offset_to_next), 0);
        self.reader.read_exact(&mut page[RDH_SIZE_BYTES..])?;

        if self.pages_read == 0 {
            if let Some(stats) = self.stats.as_ref() {
                stats.system_id(rdh.system_id);
            }
        }
        if let Some(stats) = self.stats.as_mut() {
            stats.page_seen();
            stats.try_add_fee_id(rdh.fee_id);
            stats.add_payload_size(rdh.payload_size() as u32);
        }
        self.pages_read += 1;
        Ok(Some((rdh, page)))
    }

    /// Loads pages until one with the stop bit set, and returns them concatenated.
    ///
    /// Returns `Ok(None)` when the input is exhausted. If the input ends before the stop bit
    /// the pages read so far are returned.
    pub fn load_hbf(&mut self) -> Result<Option<Vec<u8>>, std::io::Error> {
        let mut hbf = Vec::new();
        while let Some((rdh, page)) = self.load_page()? {
            hbf.extend_from_slice(&page);
            if rdh.is_hb_closed() {
                if let Some(stats) = self.stats.as_ref() {
                    stats.hbf_seen();
                }
                return Ok(Some(hbf));
            }
        }
        if hbf.is_empty() {
            Ok(None)
        } else {
            log::warn!("Input ended before the heartbeat frame was closed");
            Ok(Some(hbf))
        }
    }

    /// Reads everything left in the input and returns it as one buffer.
    pub fn load_all(&mut self) -> Result<Vec<u8>, std::io::Error> {
        let mut buf = Vec::new();
        while let Some((_, page)) = self.load_page()? {
            buf.extend_from_slice(&page);
        }
        Ok(buf)
    }
}
