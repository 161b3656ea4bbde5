//! Append-only frame recording.
//!
//! Record layout, repeated until end of file, all integers little-endian:
//!
//! ```text
//! +------------------+----------------+--------------------+
//! | rx_timestamp_ns  | frame_len u32  | frame_bytes        |
//! | u64              |                | frame_len bytes    |
//! +------------------+----------------+--------------------+
//! ```
//!
//! No file header, no index, no trailer - end of stream is end of file,
//! which keeps a recording valid even when the process dies mid-capture.
//! Zero-length frames are legal records.

use crate::error::{Result, SentinelError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Writes received frames with their receive timestamps to a file.
#[derive(Default)]
pub struct FrameRecorder {
    file: Option<BufWriter<File>>,
    frame_count: u64,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `path` for writing, truncating any previous recording.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.close();
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| SentinelError::file_error(path, source))?;
        debug!(path = %path.display(), "recording opened");
        self.file = Some(BufWriter::new(file));
        self.frame_count = 0;
        Ok(())
    }

    /// Append one frame. The frame counter advances only on success.
    pub fn record(&mut self, rx_timestamp_ns: u64, frame: &[u8]) -> Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| SentinelError::Record {
                source: std::io::Error::new(std::io::ErrorKind::NotConnected, "recorder not open"),
            })?;

        let write = |file: &mut BufWriter<File>| -> std::io::Result<()> {
            file.write_all(&rx_timestamp_ns.to_le_bytes())?;
            file.write_all(&(frame.len() as u32).to_le_bytes())?;
            file.write_all(frame)
        };
        write(file).map_err(|source| SentinelError::Record { source })?;

        self.frame_count += 1;
        Ok(())
    }

    /// Flush and close the recording. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
            debug!(frames = self.frame_count, "recording closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Frames successfully written since open.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Drop for FrameRecorder {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_have_the_documented_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.bin");

        let mut recorder = FrameRecorder::new();
        recorder.open(&path).unwrap();
        recorder.record(0x0102030405060708, &[0xAA, 0xBB, 0xCC]).unwrap();
        recorder.close();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 8 + 4 + 3);
        assert_eq!(&bytes[0..8], &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[8..12], &[0x03, 0x00, 0x00, 0x00]);
        assert_eq!(&bytes[12..], &[0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn counter_tracks_successful_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("count.bin");

        let mut recorder = FrameRecorder::new();
        recorder.open(&path).unwrap();
        assert_eq!(recorder.frame_count(), 0);
        for i in 0..10u64 {
            recorder.record(i * 1_000_000, &[i as u8, 2 * i as u8]).unwrap();
        }
        assert_eq!(recorder.frame_count(), 10);
    }

    #[test]
    fn empty_frames_are_legal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.bin");

        let mut recorder = FrameRecorder::new();
        recorder.open(&path).unwrap();
        recorder.record(42, &[]).unwrap();
        recorder.close();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 12);
        assert_eq!(recorder.frame_count(), 1);
    }

    #[test]
    fn record_without_open_fails_and_does_not_count() {
        let mut recorder = FrameRecorder::new();
        assert!(recorder.record(1, &[1, 2, 3]).is_err());
        assert_eq!(recorder.frame_count(), 0);
    }

    #[test]
    fn reopen_truncates_previous_recording() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trunc.bin");

        let mut recorder = FrameRecorder::new();
        recorder.open(&path).unwrap();
        recorder.record(1, &[0xFF; 100]).unwrap();
        recorder.close();

        recorder.open(&path).unwrap();
        recorder.record(2, &[0x11]).unwrap();
        recorder.close();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 13);
        assert_eq!(recorder.frame_count(), 1);
    }

    #[test]
    fn open_failure_reports_path() {
        let mut recorder = FrameRecorder::new();
        let err = recorder.open("/nonexistent-dir/x/y/z.bin").unwrap_err();
        assert!(err.to_string().contains("z.bin"));
        assert!(!recorder.is_open());
    }
}
