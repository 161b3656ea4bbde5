//! Datagram frame validation.
//!
//! [`parse_frame`] turns a raw datagram into a [`ParsedFrame`] view or a
//! [`ParseReject`] telling the caller why the bytes were refused. Checks run
//! in a fixed order and the earliest failure wins, so a frame that is both
//! the wrong version and the wrong type reports the version problem.
//!
//! The parsed view borrows the payload slice from the input buffer; only the
//! 18-byte header is copied out.

use super::crc::crc32;
use super::{FrameHeader, MsgType, FRAME_CRC_SIZE, FRAME_HEADER_SIZE, MAX_PAYLOAD_SIZE};

/// Why a datagram was refused. Ordered by check priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseReject {
    /// Shorter than a frame header.
    TooShort,
    /// Header version byte is not the supported protocol version.
    BadVersion(u8),
    /// Message type byte outside the known range.
    BadMsgType(u8),
    /// Declared payload length exceeds the protocol maximum.
    PayloadTooLong(u16),
    /// Buffer ends before the declared payload (and CRC, when enabled).
    Truncated { expected: usize, actual: usize },
    /// Trailing CRC-32 disagrees with the computed one.
    CrcMismatch { stored: u32, computed: u32 },
}

impl ParseReject {
    /// Stable label used in counters, events and journal lines.
    pub fn label(&self) -> &'static str {
        match self {
            ParseReject::TooShort => "TOO_SHORT",
            ParseReject::BadVersion(_) => "BAD_VERSION",
            ParseReject::BadMsgType(_) => "BAD_MSG_TYPE",
            ParseReject::PayloadTooLong(_) => "PAYLOAD_TOO_LONG",
            ParseReject::Truncated { .. } => "TRUNCATED",
            ParseReject::CrcMismatch { .. } => "CRC_MISMATCH",
        }
    }

    /// CRC failures are tallied separately from other malformed frames.
    pub fn is_crc_failure(&self) -> bool {
        matches!(self, ParseReject::CrcMismatch { .. })
    }
}

impl std::fmt::Display for ParseReject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated frame borrowing its payload from the receive buffer.
#[derive(Debug, Clone, Copy)]
pub struct ParsedFrame<'a> {
    pub header: FrameHeader,
    pub payload: &'a [u8],
    /// The stored CRC when the frame carried one.
    pub crc: Option<u32>,
}

impl ParsedFrame<'_> {
    /// Message type, already range-checked by the parser.
    pub fn msg_type(&self) -> MsgType {
        // parse_frame rejects unknown type bytes before constructing the view
        MsgType::from_u8(self.header.msg_type).unwrap_or(MsgType::Plot)
    }
}

/// Validate one datagram.
///
/// When `crc_enabled` is set, the frame must carry a 4-byte little-endian
/// CRC-32 after the payload, computed over header + payload.
pub fn parse_frame(buf: &[u8], crc_enabled: bool) -> Result<ParsedFrame<'_>, ParseReject> {
    if buf.len() < FRAME_HEADER_SIZE {
        return Err(ParseReject::TooShort);
    }

    let header = FrameHeader::decode(buf).ok_or(ParseReject::TooShort)?;

    if header.version != super::PROTOCOL_VERSION {
        return Err(ParseReject::BadVersion(header.version));
    }

    if MsgType::from_u8(header.msg_type).is_none() {
        return Err(ParseReject::BadMsgType(header.msg_type));
    }

    if header.payload_len as usize > MAX_PAYLOAD_SIZE {
        return Err(ParseReject::PayloadTooLong(header.payload_len));
    }

    let mut expected = FRAME_HEADER_SIZE + header.payload_len as usize;
    if crc_enabled {
        expected += FRAME_CRC_SIZE;
    }
    if buf.len() < expected {
        return Err(ParseReject::Truncated { expected, actual: buf.len() });
    }

    let payload_end = FRAME_HEADER_SIZE + header.payload_len as usize;
    let payload = &buf[FRAME_HEADER_SIZE..payload_end];

    let crc = if crc_enabled {
        let stored = u32::from_le_bytes([
            buf[payload_end],
            buf[payload_end + 1],
            buf[payload_end + 2],
            buf[payload_end + 3],
        ]);
        let computed = crc32(&buf[..payload_end]);
        if stored != computed {
            return Err(ParseReject::CrcMismatch { stored, computed });
        }
        Some(stored)
    } else {
        None
    };

    Ok(ParsedFrame { header, payload, crc })
}
