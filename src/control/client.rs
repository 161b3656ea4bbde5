//! Blocking control-channel client.
//!
//! One request, one framed reply. Used by the operator CLI and by
//! integration tests talking to a live [`crate::control::ControlServer`].

use crate::control::framing::{self, ControlFramer};
use crate::error::{Result, SentinelError};
use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// TCP client for the framed command channel.
pub struct ControlClient {
    stream: TcpStream,
    framer: ControlFramer,
}

impl ControlClient {
    /// Connect to a control node at `host:port`.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let addr = format!("{host}:{port}");
        let stream = TcpStream::connect(&addr)
            .map_err(|source| SentinelError::connect_failed(addr.clone(), source))?;
        stream
            .set_read_timeout(Some(RESPONSE_TIMEOUT))
            .map_err(|source| SentinelError::connect_failed(addr, source))?;
        Ok(Self { stream, framer: ControlFramer::new() })
    }

    /// Send one command and wait for its framed reply.
    pub fn send_command(&mut self, command: &str) -> Result<String> {
        let encoded = framing::encode(command.as_bytes());
        self.stream
            .write_all(&encoded)
            .map_err(|e| SentinelError::control(format!("send failed: {e}")))?;

        let mut buf = [0u8; 4096];
        loop {
            if let Some(reply) = self.framer.pop_frame() {
                return Ok(String::from_utf8_lossy(&reply).into_owned());
            }
            let n = self
                .stream
                .read(&mut buf)
                .map_err(|e| SentinelError::control(format!("receive failed: {e}")))?;
            if n == 0 {
                return Err(SentinelError::control("connection closed by peer"));
            }
            self.framer.feed(&buf[..n]);
        }
    }

    /// Shut the connection down.
    pub fn close(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

impl Drop for ControlClient {
    fn drop(&mut self) {
        self.close();
    }
}
