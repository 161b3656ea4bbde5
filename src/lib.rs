//! Real-time telemetry ingestion gateway for a multi-sensor surveillance
//! fabric.
//!
//! Sensor subsystems emit a compact binary wire protocol over UDP; the
//! gateway validates frames, tracks per-source sequence integrity,
//! aggregates statistics and exposes operator control over a framed TCP
//! channel. A seeded synthetic sensor and a deterministic record/replay
//! engine close the testing loop.
//!
//! # Architecture
//!
//! - **Wire protocol** ([`protocol`]): packed little-endian frame codecs, a
//!   table-driven CRC-32 engine, and an ordered-validation parser.
//! - **Integrity** ([`tracker`], [`stats`]): a per-source 64-bit sliding
//!   window classifies gaps, reorders and duplicates; counters aggregate
//!   behind a reader/writer lock and roll up into a three-level health.
//! - **Eventing** ([`events`], [`journal`]): category-filtered pub/sub plus
//!   an operator journal with a format pinned for downstream tooling.
//! - **Sources** ([`source`], [`net`], [`replay`], [`record`]): the gateway
//!   consumes any [`FrameSource`]; live UDP and recorded files are
//!   interchangeable, and playback is byte-deterministic.
//! - **Control plane** ([`control`]): length-prefixed frames over TCP carry
//!   `GET`/`SET` operator commands to a thread-per-client server.
//! - **Synthetic sensor** ([`sim`]): seeded scenario → world kinematics →
//!   measurement frames → fault injection.
//!
//! # Example (replay a recording through the pipeline)
//!
//! ```rust,no_run
//! use sentinel::{FrameSource, ReplayFrameSource, SequenceTracker, StatsRegistry};
//! use sentinel::protocol::parse_frame;
//!
//! fn main() -> sentinel::Result<()> {
//!     let mut replay = ReplayFrameSource::open("session.bin")?;
//!     replay.set_speed(0.0);
//!
//!     let mut tracker = SequenceTracker::new();
//!     let stats = StatsRegistry::new();
//!
//!     let mut buf = Vec::new();
//!     while replay.receive(&mut buf) {
//!         match parse_frame(&buf, false) {
//!             Ok(frame) => {
//!                 tracker.track(frame.header.src_id, frame.header.seq);
//!                 stats.record_rx(frame.header.src_id, frame.header.seq, frame.header.ts_ns);
//!             }
//!             Err(_) => stats.record_malformed(0),
//!         }
//!     }
//!     println!("{:?}", stats.global());
//!     Ok(())
//! }
//! ```
//!
//! # Concurrency
//!
//! OS threads and mutual exclusion throughout; no async runtime. The
//! gateway loop owns its source and tracker exclusively; stats use a
//! reader/writer lock; event callbacks run outside the bus lock; stop is an
//! atomic flag observed between bounded waits.

pub mod control;
mod error;
pub mod events;
pub mod gateway;
pub mod journal;
pub mod net;
pub mod protocol;
pub mod record;
pub mod replay;
pub mod sim;
pub mod source;
pub mod stats;
pub mod tracker;

pub use control::{ControlClient, ControlServer, ControlState};
pub use error::{Result, SentinelError};
pub use events::{EventBus, EventCategory, EventId, EventRecord, Severity};
pub use gateway::{Gateway, GatewayConfig};
pub use journal::Journal;
pub use net::{UdpFrameSink, UdpFrameSource};
pub use record::FrameRecorder;
pub use replay::ReplayFrameSource;
pub use source::{FrameSink, FrameSource};
pub use stats::{GlobalStats, Health, SourceStats, StatsRegistry};
pub use tracker::{SeqEvent, SeqResult, SequenceTracker};
