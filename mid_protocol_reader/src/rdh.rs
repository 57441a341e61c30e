//! Definition of the RAW Data Header (RDH) that frames every page of MID raw data.
//!
//! The header is the 64 byte CRU flavour (version 6 and 7), stored little endian.
//! Only the fields that are relevant for decoding MID pages are given names, the reserved words are kept
//! so that a header can be written back bit for bit.

pub mod test_data;

use byteorder::{ByteOrder, LittleEndian};
use std::fmt::{self, Display};

/// The size of a RDH in bytes
pub const RDH_SIZE_BYTES: usize = 64;

/// The system ID of the MID detector
pub const MID_SYSTEM_ID: u8 = 37;

pub(crate) mod macros {
    /// Reads a fixed amount of bytes from a [Read](std::io::Read) into a stack allocated array,
    /// propagating any error with `?`.
    macro_rules! load_bytes {
        ($size:expr, $reader:ident) => {{
            let mut buf = [0u8; $size];
            $reader.read_exact(&mut buf)?;
            buf
        }};
    }
    pub(crate) use load_bytes;
}

/// RAW Data Header of one page.
///
/// The header starts a page of at most 8 KiB, the payload follows directly after the header
/// and spans `memory_size - header_size` bytes.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Rdh {
    /// Header version
    pub version: u8,
    /// Header size in bytes
    pub header_size: u8,
    /// Front-End Electronics ID
    pub fee_id: u16,
    /// Priority bit
    pub priority: u8,
    /// System ID of the detector
    pub system_id: u8,
    /// Offset in bytes to the next header
    pub offset_to_next: u16,
    /// Size in bytes of header + payload
    pub memory_size: u16,
    /// GBT link ID in the CRU end point
    pub link_id: u8,
    /// Packet counter, incremented for each page sent by the link
    pub packet_counter: u8,
    /// CRU ID (12 bits)
    pub cru_id: u16,
    /// CRU end point, the data wrapper ID (4 bits)
    pub endpoint: u8,
    /// Bunch crossing of the trigger (12 bits)
    pub trigger_bc: u16,
    /// Orbit of the trigger
    pub trigger_orbit: u32,
    /// Data format
    pub data_format: u8,
    /// Trigger type
    pub trigger_type: u32,
    /// Page counter within the heartbeat frame
    pub pages_counter: u16,
    /// Set on the last page of the heartbeat frame
    pub stop_bit: u8,
    /// Detector specific field
    pub detector_field: u32,
    /// Parity bits
    pub par_bit: u16,
}

impl Rdh {
    /// Deserializes a [Rdh] from the first [RDH_SIZE_BYTES] of a byte slice.
    ///
    /// Fails with [InvalidData](std::io::ErrorKind::InvalidData) if the slice is too short to contain a header.
    pub fn from_buf(buf: &[u8]) -> Result<Self, std::io::Error> {
        if buf.len() < RDH_SIZE_BYTES {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Cannot read RDH from {} bytes, {RDH_SIZE_BYTES} bytes needed",
                    buf.len()
                ),
            ));
        }
        let cruid_dw = LittleEndian::read_u16(&buf[14..16]);
        Ok(Self {
            version: buf[0],
            header_size: buf[1],
            fee_id: LittleEndian::read_u16(&buf[2..4]),
            priority: buf[4],
            system_id: buf[5],
            offset_to_next: LittleEndian::read_u16(&buf[8..10]),
            memory_size: LittleEndian::read_u16(&buf[10..12]),
            link_id: buf[12],
            packet_counter: buf[13],
            cru_id: cruid_dw & 0x0FFF,
            endpoint: (cruid_dw >> 12) as u8,
            trigger_bc: (LittleEndian::read_u32(&buf[16..20]) & 0x0FFF) as u16,
            trigger_orbit: LittleEndian::read_u32(&buf[20..24]),
            data_format: buf[24],
            trigger_type: LittleEndian::read_u32(&buf[32..36]),
            pages_counter: LittleEndian::read_u16(&buf[36..38]),
            stop_bit: buf[38],
            detector_field: LittleEndian::read_u32(&buf[48..52]),
            par_bit: LittleEndian::read_u16(&buf[52..54]),
        })
    }

    /// Deserializes a [Rdh] from a reader.
    #[inline]
    pub fn load<T: std::io::Read>(reader: &mut T) -> Result<Self, std::io::Error> {
        let raw = macros::load_bytes!(RDH_SIZE_BYTES, reader);
        Self::from_buf(&raw)
    }

    /// Serializes the header into its 64 byte wire representation.
    pub fn to_bytes(&self) -> [u8; RDH_SIZE_BYTES] {
        let mut buf = [0u8; RDH_SIZE_BYTES];
        buf[0] = self.version;
        buf[1] = self.header_size;
        LittleEndian::write_u16(&mut buf[2..4], self.fee_id);
        buf[4] = self.priority;
        buf[5] = self.system_id;
        LittleEndian::write_u16(&mut buf[8..10], self.offset_to_next);
        LittleEndian::write_u16(&mut buf[10..12], self.memory_size);
        buf[12] = self.link_id;
        buf[13] = self.packet_counter;
        LittleEndian::write_u16(
            &mut buf[14..16],
            (self.cru_id & 0x0FFF) | (u16::from(self.endpoint) << 12),
        );
        LittleEndian::write_u32(&mut buf[16..20], u32::from(self.trigger_bc & 0x0FFF));
        LittleEndian::write_u32(&mut buf[20..24], self.trigger_orbit);
        buf[24] = self.data_format;
        LittleEndian::write_u32(&mut buf[32..36], self.trigger_type);
        LittleEndian::write_u16(&mut buf[36..38], self.pages_counter);
        buf[38] = self.stop_bit;
        LittleEndian::write_u32(&mut buf[48..52], self.detector_field);
        LittleEndian::write_u16(&mut buf[52..54], self.par_bit);
        buf
    }

    /// Creates a header for a MID page with the given identifiers and trigger time.
    ///
    /// The sizes describe a page without payload, use [Rdh::set_payload_size] to update them.
    pub fn new_mid(fee_id: u16, link_id: u8, endpoint: u8, cru_id: u16, bc: u16, orbit: u32) -> Self {
        Self {
            version: 6,
            header_size: RDH_SIZE_BYTES as u8,
            fee_id,
            system_id: MID_SYSTEM_ID,
            offset_to_next: RDH_SIZE_BYTES as u16,
            memory_size: RDH_SIZE_BYTES as u16,
            link_id,
            cru_id,
            endpoint,
            trigger_bc: bc,
            trigger_orbit: orbit,
            ..Default::default()
        }
    }

    /// Sets the memory size and offset to the next header from the size of the payload.
    pub fn set_payload_size(&mut self, payload_size: u16) {
        self.memory_size = u16::from(self.header_size) + payload_size;
        self.offset_to_next = self.memory_size;
    }

    /// Returns the size of the payload in bytes.
    /// This size is EXCLUDING the size of the RDH.
    #[inline]
    pub fn payload_size(&self) -> usize {
        usize::from(self.memory_size).saturating_sub(usize::from(self.header_size))
    }

    /// Returns true if the page has no payload.
    #[inline]
    pub fn is_empty_page(&self) -> bool {
        self.memory_size == u16::from(self.header_size)
    }

    /// Returns true if the stop bit is set, i.e. the heartbeat frame is closed with this page.
    #[inline]
    pub fn is_hb_closed(&self) -> bool {
        self.stop_bit != 0
    }

    /// Returns the text describing the columns of the [Display] output.
    pub fn header_text_with_indent(indent: usize) -> String {
        let header_text_top = "RDH   Header  FEE   Offset  Memory  Link  End    CRU   BC    Orbit       Pages    Stop";
        let header_text_bot = "ver   size    ID    next    size    ID    point  ID                      counter  bit";
        format!("{:indent$}{header_text_top}\n{:indent$}{header_text_bot}\n", "", "")
    }
}

impl Display for Rdh {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{ver:<6}{size:<8}{fee:<6}{offset:<8}{mem:<8}{link:<6}{ep:<7}{cru:<6}{bc:<6}{orbit:<12}{pages:<9}{stop}",
            ver = self.version,
            size = self.header_size,
            fee = self.fee_id,
            offset = self.offset_to_next,
            mem = self.memory_size,
            link = self.link_id,
            ep = self.endpoint,
            cru = self.cru_id,
            bc = self.trigger_bc,
            orbit = self.trigger_orbit,
            pages = self.pages_counter,
            stop = self.stop_bit,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_data::*;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_correct_rdh_fields() {
        let rdh = Rdh::from_buf(&CORRECT_RDH_MID_BYTES).unwrap();

        assert_eq!(rdh.version, 6);
        assert_eq!(rdh.header_size, 64);
        assert_eq!(rdh.fee_id, 3);
        assert_eq!(rdh.system_id, MID_SYSTEM_ID);
        assert_eq!(rdh.offset_to_next, 96);
        assert_eq!(rdh.memory_size, 96);
        assert_eq!(rdh.link_id, 3);
        assert_eq!(rdh.cru_id, 0);
        assert_eq!(rdh.endpoint, 0);
        assert_eq!(rdh.trigger_bc, 0x123);
        assert_eq!(rdh.trigger_orbit, 0x0B7D_D575);
        assert_eq!(rdh.pages_counter, 0);
        assert_eq!(rdh.stop_bit, 0);
        assert_eq!(rdh.payload_size(), 32);
        assert!(!rdh.is_empty_page());
        assert!(!rdh.is_hb_closed());
    }

    #[test]
    fn test_cru_id_and_endpoint_share_a_word() {
        let mut rdh = Rdh::new_mid(17, 4, 1, 0x0ABC, 12, 99);
        rdh.set_payload_size(16);

        let parsed = Rdh::from_buf(&rdh.to_bytes()).unwrap();

        assert_eq!(parsed.cru_id, 0x0ABC);
        assert_eq!(parsed.endpoint, 1);
        assert_eq!(parsed.memory_size, 80);
        assert_eq!(parsed, rdh);
    }

    #[test]
    fn test_bc_is_12_bits() {
        let mut bytes = CORRECT_RDH_MID_BYTES;
        bytes[17] = 0xF1; // Upper bits of the word are reserved
        let rdh = Rdh::from_buf(&bytes).unwrap();
        assert_eq!(rdh.trigger_bc, 0x123);
    }

    #[test]
    fn test_too_short_buffer_is_an_error() {
        let err = Rdh::from_buf(&CORRECT_RDH_MID_BYTES[..40]).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_load_from_reader() {
        let mut reader = std::io::Cursor::new(CORRECT_RDH_MID_BYTES.to_vec());
        let rdh = Rdh::load(&mut reader).unwrap();
        assert_eq!(rdh.fee_id, 3);
        assert!(Rdh::load(&mut reader).is_err());
    }

    #[test]
    fn test_display() {
        let rdh = Rdh::from_buf(&CORRECT_RDH_MID_BYTES).unwrap();
        let text = rdh.to_string();
        assert!(text.starts_with("6     64      3"), "{text}");
        println!("{}{rdh}", Rdh::header_text_with_indent(0));
    }
}
