//! Deterministic playback of recorded frame streams.
//!
//! [`ReplayFrameSource`] reads the append-only record format written by
//! [`crate::record::FrameRecorder`] and hands frames to the gateway through
//! the same [`FrameSource`] interface the live UDP socket implements.
//!
//! Playback timing is anchored once: the first frame establishes `t0` on a
//! monotonic clock, and every later frame is delayed until
//! `t0 + (ts - ts_first) / speed`. Speed `0.0` disables pacing entirely.
//! Anchoring against the first frame (rather than sleeping per-delta) keeps
//! long replays from accumulating drift.
//!
//! Two passes over the same file yield byte-identical frame sequences; the
//! pacing only affects *when* frames appear, never their bytes or order.

use crate::error::{Result, SentinelError};
use crate::source::FrameSource;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::debug;

/// Replays a recorded frame stream at a configurable speed.
pub struct ReplayFrameSource {
    reader: BufReader<File>,
    speed: f64,
    frames_replayed: u64,
    done: bool,
    anchor: Option<ReplayAnchor>,
}

struct ReplayAnchor {
    first_frame_ts_ns: u64,
    started_at: Instant,
}

impl ReplayFrameSource {
    /// Open a recording for playback at real-time speed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SentinelError::file_error(path, source))?;
        debug!(path = %path.display(), "replay opened");
        Ok(Self {
            reader: BufReader::new(file),
            speed: 1.0,
            frames_replayed: 0,
            done: false,
            anchor: None,
        })
    }

    /// Playback speed multiplier. `0.0` replays as fast as possible; any
    /// positive value scales recorded inter-frame intervals.
    pub fn set_speed(&mut self, multiplier: f64) {
        self.speed = multiplier;
    }

    /// True once end-of-file or a read failure has been reached.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Frames handed out so far.
    pub fn frames_replayed(&self) -> u64 {
        self.frames_replayed
    }

    fn read_exact_or_finish(&mut self, buf: &mut [u8]) -> bool {
        if self.reader.read_exact(buf).is_err() {
            self.done = true;
            return false;
        }
        true
    }

    fn pace(&mut self, frame_ts_ns: u64) {
        if self.speed <= 0.0 {
            return;
        }
        match &self.anchor {
            None => {
                self.anchor = Some(ReplayAnchor {
                    first_frame_ts_ns: frame_ts_ns,
                    started_at: Instant::now(),
                });
            }
            Some(anchor) => {
                let offset_ns = frame_ts_ns.saturating_sub(anchor.first_frame_ts_ns);
                let target = Duration::from_nanos((offset_ns as f64 / self.speed) as u64);
                let elapsed = anchor.started_at.elapsed();
                if target > elapsed {
                    std::thread::sleep(target - elapsed);
                }
            }
        }
    }
}

impl FrameSource for ReplayFrameSource {
    fn is_done(&self) -> bool {
        self.done
    }

    fn receive(&mut self, buf: &mut Vec<u8>) -> bool {
        buf.clear();
        if self.done {
            return false;
        }

        let mut ts_bytes = [0u8; 8];
        if !self.read_exact_or_finish(&mut ts_bytes) {
            return false;
        }
        let ts_ns = u64::from_le_bytes(ts_bytes);

        let mut len_bytes = [0u8; 4];
        if !self.read_exact_or_finish(&mut len_bytes) {
            return false;
        }
        let len = u32::from_le_bytes(len_bytes) as usize;

        buf.resize(len, 0);
        if len > 0 && self.reader.read_exact(buf).is_err() {
            self.done = true;
            buf.clear();
            return false;
        }

        self.pace(ts_ns);
        self.frames_replayed += 1;

        // Latch done eagerly so callers polling is_done() stop without an
        // extra failed receive.
        if self.reader.fill_buf().map(<[u8]>::is_empty).unwrap_or(true) {
            self.done = true;
        }

        true
    }
}
