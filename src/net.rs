//! UDP transport for the telemetry wire.
//!
//! One frame per datagram. The receive side uses a bounded read timeout
//! (100 ms by default) so the gateway loop can observe its stop flag
//! between polls; timeouts are silent and have no stats impact. The send
//! side uses a connected socket so the destination is fixed once.

use crate::error::{Result, SentinelError};
use crate::protocol::MAX_DATAGRAM_SIZE;
use crate::source::{FrameSink, FrameSource};
use std::net::UdpSocket;
use std::time::Duration;
use tracing::{debug, trace};

const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Datagram receiver bound to a local port.
pub struct UdpFrameSource {
    socket: UdpSocket,
}

impl UdpFrameSource {
    /// Bind to `port` on all interfaces. Port 0 picks an ephemeral port.
    pub fn bind(port: u16) -> Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", port))
            .map_err(|source| SentinelError::Bind { port, source })?;
        socket
            .set_read_timeout(Some(DEFAULT_RECV_TIMEOUT))
            .map_err(|source| SentinelError::Bind { port, source })?;
        debug!(port = %port, "UDP frame source bound");
        Ok(Self { socket })
    }

    /// Adjust the receive timeout. `None` blocks indefinitely.
    pub fn set_timeout(&self, timeout: Option<Duration>) -> std::io::Result<()> {
        self.socket.set_read_timeout(timeout)
    }

    /// The actual bound port (useful after binding port 0).
    pub fn local_port(&self) -> Option<u16> {
        self.socket.local_addr().ok().map(|addr| addr.port())
    }
}

impl FrameSource for UdpFrameSource {
    fn receive(&mut self, buf: &mut Vec<u8>) -> bool {
        buf.resize(MAX_DATAGRAM_SIZE, 0);
        match self.socket.recv(buf) {
            Ok(n) => {
                buf.truncate(n);
                trace!(len = n, "datagram received");
                true
            }
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                buf.clear();
                false
            }
            Err(e) => {
                debug!(error = %e, "datagram receive failed");
                buf.clear();
                false
            }
        }
    }
}

/// Connected-mode datagram sender.
pub struct UdpFrameSink {
    socket: UdpSocket,
}

impl UdpFrameSink {
    /// Connect to `host:port`; every subsequent send goes there.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let addr = format!("{host}:{port}");
        let socket = UdpSocket::bind(("0.0.0.0", 0))
            .map_err(|source| SentinelError::connect_failed(addr.clone(), source))?;
        socket
            .connect(&addr)
            .map_err(|source| SentinelError::connect_failed(addr.clone(), source))?;
        debug!(target = %addr, "UDP frame sink connected");
        Ok(Self { socket })
    }
}

impl FrameSink for UdpFrameSink {
    fn send(&mut self, frame: &[u8]) -> bool {
        if frame.is_empty() {
            return false;
        }
        match self.socket.send(frame) {
            Ok(n) => n == frame.len(),
            Err(e) => {
                debug!(error = %e, "datagram send failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_send_receive() {
        let mut source = UdpFrameSource::bind(0).unwrap();
        let port = source.local_port().unwrap();
        let mut sink = UdpFrameSink::connect("127.0.0.1", port).unwrap();

        let frame = vec![0xAB; 64];
        assert!(sink.send(&frame));

        let mut buf = Vec::new();
        // Allow a few timeout rounds for delivery on loaded machines.
        let mut received = false;
        for _ in 0..20 {
            if source.receive(&mut buf) {
                received = true;
                break;
            }
        }
        assert!(received);
        assert_eq!(buf, frame);
    }

    #[test]
    fn receive_times_out_quietly() {
        let mut source = UdpFrameSource::bind(0).unwrap();
        source.set_timeout(Some(Duration::from_millis(10))).unwrap();
        let mut buf = vec![1, 2, 3];
        assert!(!source.receive(&mut buf));
        assert!(buf.is_empty());
    }

    #[test]
    fn empty_frame_is_not_sent() {
        let source = UdpFrameSource::bind(0).unwrap();
        let port = source.local_port().unwrap();
        let mut sink = UdpFrameSink::connect("127.0.0.1", port).unwrap();
        assert!(!sink.send(&[]));
    }

    #[test]
    fn connect_to_invalid_host_fails() {
        let result = UdpFrameSink::connect("definitely not a host", 9);
        assert!(result.is_err());
    }
}
