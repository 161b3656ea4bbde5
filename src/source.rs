//! Frame source and sink capability traits.
//!
//! The gateway loop consumes any [`FrameSource`]; the live UDP socket and
//! the replay file reader both implement it, so the pipeline downstream of
//! `receive` cannot tell live traffic from playback. The interface is
//! deliberately narrow - one method - and each source handles its own
//! timing internally (the UDP source blocks up to its timeout, the replay
//! source sleeps to honor playback speed).

/// A source of raw telemetry frames.
pub trait FrameSource: Send {
    /// Receive one frame into `buf`.
    ///
    /// Returns `true` when `buf` holds a complete frame. `false` means no
    /// frame this round - a receive timeout, end of a replay file, or a
    /// transport error - and the caller decides whether to poll again.
    fn receive(&mut self, buf: &mut Vec<u8>) -> bool;

    /// True when the source will never produce another frame. Live sources
    /// never finish; file-backed sources latch this at end of stream.
    fn is_done(&self) -> bool {
        false
    }
}

/// A sink for raw telemetry frames.
pub trait FrameSink: Send {
    /// Send one frame. Returns `true` when the whole frame was handed to
    /// the transport.
    fn send(&mut self, frame: &[u8]) -> bool;
}
