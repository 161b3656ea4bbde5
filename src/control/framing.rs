//! Length-prefixed framing for the control channel.
//!
//! Each frame is a 4-byte big-endian length followed by the payload:
//!
//! ```text
//! +----------------------------+------------------+
//! | Length (4 bytes, BE)       | Payload          |
//! +----------------------------+------------------+
//! ```
//!
//! The decoder is a streaming byte sink: [`ControlFramer::feed`] accepts
//! arbitrary chunking and extracts every complete frame FIFO. The length is
//! validated before any payload allocation; a length above
//! [`MAX_CONTROL_FRAME`] means the peer has desynchronized, so the buffer is
//! cleared and decoding resumes fresh on the next bytes. Partial frames stay
//! buffered indefinitely pending more input.

/// Frames longer than this are treated as protocol desynchronization.
pub const MAX_CONTROL_FRAME: usize = 10 * 1024 * 1024;

const LENGTH_PREFIX_SIZE: usize = 4;

/// Encode one payload as a length-prefixed frame.
pub fn encode(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// Streaming decoder for length-prefixed control frames.
#[derive(Debug, Default)]
pub struct ControlFramer {
    buffer: Vec<u8>,
    ready: std::collections::VecDeque<Vec<u8>>,
}

impl ControlFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw stream bytes and extract any complete frames.
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
        self.extract_frames();
    }

    fn extract_frames(&mut self) {
        loop {
            if self.buffer.len() < LENGTH_PREFIX_SIZE {
                return;
            }
            let len = u32::from_be_bytes([
                self.buffer[0],
                self.buffer[1],
                self.buffer[2],
                self.buffer[3],
            ]) as usize;

            if len > MAX_CONTROL_FRAME {
                // Desynchronized stream; drop everything and start over.
                self.buffer.clear();
                return;
            }

            let total = LENGTH_PREFIX_SIZE + len;
            if self.buffer.len() < total {
                return;
            }

            let payload = self.buffer[LENGTH_PREFIX_SIZE..total].to_vec();
            self.buffer.drain(..total);
            self.ready.push_back(payload);
        }
    }

    /// Whether a complete frame is waiting.
    pub fn has_frame(&self) -> bool {
        !self.ready.is_empty()
    }

    /// Pop the oldest complete frame payload.
    pub fn pop_frame(&mut self) -> Option<Vec<u8>> {
        self.ready.pop_front()
    }

    /// Bytes buffered towards the next (incomplete) frame.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Drop all buffered bytes and pending frames.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.ready.clear();
    }
}
