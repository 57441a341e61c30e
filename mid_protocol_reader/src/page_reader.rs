//! Contains the [RawPageReader] that walks the pages of an in-memory buffer of raw data.
//!
//! The reader only keeps offsets into the buffer, nothing is copied.
//! The buffer is expected to be validated upstream, if a header claims more bytes than what is left in the buffer
//! the reader stops at the boundary and reports the end of the buffer.

use super::rdh::{Rdh, RDH_SIZE_BYTES};

/// Page-at-a-time access to a buffer of RDH framed data.
#[derive(Debug, Default, Clone)]
pub struct RawPageReader<'a> {
    buffer: &'a [u8],
    next_header: usize,
    page_start: usize,
    rdh: Option<Rdh>,
    payload: &'a [u8],
    pages_read: usize,
}

impl<'a> RawPageReader<'a> {
    /// Creates a reader positioned before the first page of `buffer`.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            ..Default::default()
        }
    }

    /// Sets a new buffer and rewinds all cursors.
    pub fn set_buffer(&mut self, buffer: &'a [u8]) {
        *self = Self::new(buffer);
    }

    /// Advances to the next page. Returns false at the end of the buffer.
    pub fn next_page(&mut self) -> bool {
        self.rdh = None;
        self.payload = &[];
        if self.next_header >= self.buffer.len() {
            return false;
        }
        let Ok(rdh) = Rdh::from_buf(&self.buffer[self.next_header..]) else {
            log::warn!(
                "Truncated header at byte {}: {} bytes left in buffer",
                self.next_header,
                self.buffer.len() - self.next_header
            );
            return false;
        };
        let payload_start = self.next_header + usize::from(rdh.header_size);
        let payload_end = self.next_header + usize::from(rdh.memory_size);
        if usize::from(rdh.header_size) < RDH_SIZE_BYTES
            || payload_end < payload_start
            || payload_end > self.buffer.len()
            || rdh.offset_to_next == 0
        {
            log::warn!(
                "Invalid page at byte {}: header size {}, memory size {}, offset to next {}, buffer size {}",
                self.next_header,
                rdh.header_size,
                rdh.memory_size,
                rdh.offset_to_next,
                self.buffer.len()
            );
            self.next_header = self.buffer.len();
            return false;
        }
        self.page_start = self.next_header;
        self.payload = &self.buffer[payload_start..payload_end];
        self.next_header += usize::from(rdh.offset_to_next);
        self.rdh = Some(rdh);
        self.pages_read += 1;
        true
    }

    /// Advances to the next page with a payload, skipping pages that only contain a header.
    pub fn next_non_empty_page(&mut self) -> bool {
        while self.next_page() {
            if self.payload.is_empty() {
                continue;
            }
            return true;
        }
        false
    }

    /// Returns the header of the current page, or [None] if no page is loaded.
    #[inline]
    pub fn rdh(&self) -> Option<&Rdh> {
        self.rdh.as_ref()
    }

    /// Returns the payload of the current page.
    #[inline]
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Returns the current page including its header.
    #[inline]
    pub fn page(&self) -> &'a [u8] {
        match self.rdh {
            Some(rdh) => &self.buffer[self.page_start..self.page_start + usize::from(rdh.memory_size)],
            None => &[],
        }
    }

    /// Returns true if the current page closes the heartbeat frame.
    #[inline]
    pub fn is_hb_closed(&self) -> bool {
        self.rdh.is_some_and(|rdh| rdh.is_hb_closed())
    }

    /// Number of pages read since the buffer was set.
    #[inline]
    pub fn pages_read(&self) -> usize {
        self.pages_read
    }

    /// Byte offset of the current page in the buffer.
    #[inline]
    pub fn page_offset(&self) -> usize {
        self.page_start
    }
}

#[cfg(test)]
mod tests {
    use super::super::rdh::test_data::make_page;
    use super::*;
    use pretty_assertions::assert_eq;

    fn three_pages() -> Vec<u8> {
        let mut buf = make_page(0, 0, 10, 0, &[1; 16]);
        buf.extend(make_page(0, 0, 10, 1, &[]));
        let mut last = make_page(0, 0, 10, 2, &[2; 32]);
        last[38] = 1; // stop bit
        buf.extend(last);
        buf
    }

    #[test]
    fn test_next_page_visits_all_pages() {
        let buf = three_pages();
        let mut reader = RawPageReader::new(&buf);
        let mut payload_sizes = Vec::new();
        while reader.next_page() {
            payload_sizes.push(reader.payload().len());
        }
        assert_eq!(payload_sizes, vec![16, 0, 32]);
        assert_eq!(reader.pages_read(), 3);
        assert!(reader.rdh().is_none());
    }

    #[test]
    fn test_next_non_empty_page_skips_header_only_pages() {
        let buf = three_pages();
        let mut reader = RawPageReader::new(&buf);
        assert!(reader.next_non_empty_page());
        assert_eq!(reader.rdh().unwrap().pages_counter, 0);
        assert!(!reader.is_hb_closed());
        assert!(reader.next_non_empty_page());
        assert_eq!(reader.rdh().unwrap().pages_counter, 2);
        assert_eq!(reader.payload(), &[2; 32]);
        assert!(reader.is_hb_closed());
        assert_eq!(reader.page().len(), 64 + 32);
        assert!(!reader.next_non_empty_page());
    }

    #[test]
    fn test_set_buffer_rewinds() {
        let buf = three_pages();
        let mut reader = RawPageReader::new(&buf);
        while reader.next_page() {}
        reader.set_buffer(&buf);
        assert!(reader.next_page());
        assert_eq!(reader.page_offset(), 0);
        assert_eq!(reader.pages_read(), 1);
    }

    #[test]
    fn test_truncated_buffer_stops_at_boundary() {
        let buf = three_pages();
        let truncated = &buf[..buf.len() - 8];
        let mut reader = RawPageReader::new(truncated);
        assert!(reader.next_page());
        assert!(reader.next_page());
        assert!(!reader.next_page());
        assert!(!reader.next_page());
    }

    #[test]
    fn test_empty_buffer() {
        let mut reader = RawPageReader::new(&[]);
        assert!(!reader.next_page());
        assert!(reader.payload().is_empty());
    }
}
