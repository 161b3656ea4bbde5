//! The ingestion gateway orchestrator.
//!
//! A single loop thread pulls frames from one [`FrameSource`] - live UDP or
//! a replay file - and threads each frame through record → parse → sequence
//! tracking → stats, publishing events along the way. Bad input never stops
//! the loop; only unrecoverable resource failures (socket bind, file open)
//! abort startup.

use crate::error::Result;
use crate::events::{EventBus, EventCategory, EventId, EventRecord, Severity};
use crate::journal::Journal;
use crate::net::UdpFrameSource;
use crate::protocol::{
    parse_frame, EngagementPayload, HeartbeatPayload, MsgType, ParseReject, PlotPayload,
    SubsystemState, TrackPayload,
};
use crate::record::FrameRecorder;
use crate::replay::ReplayFrameSource;
use crate::source::FrameSource;
use crate::stats::StatsRegistry;
use crate::tracker::{SeqResult, SequenceTracker};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Gateway runtime configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// UDP ingest port (ignored in replay mode).
    pub udp_port: u16,
    /// Whether frames must carry a valid trailing CRC-32.
    pub crc_enabled: bool,
    /// Record received frames to this file when set.
    pub record_path: Option<PathBuf>,
    /// Replay frames from this file instead of listening on UDP.
    pub replay_path: Option<PathBuf>,
    /// Initial journal severity filter.
    pub log_level: Severity,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            udp_port: 5000,
            crc_enabled: true,
            record_path: None,
            replay_path: None,
            log_level: Severity::Info,
        }
    }
}

/// Receive-parse-track-aggregate loop over one frame source.
pub struct Gateway {
    config: GatewayConfig,
    tracker: SequenceTracker,
    stats: Arc<StatsRegistry>,
    events: Arc<EventBus>,
    journal: Arc<Journal>,
    recorder: FrameRecorder,
    crc_policy: Arc<AtomicBool>,
    should_stop: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
}

/// Wall-clock nanoseconds used for receive timestamps and event records.
fn now_ns() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos() as u64).unwrap_or(0)
}

impl Gateway {
    pub fn new(config: GatewayConfig, journal: Arc<Journal>) -> Self {
        journal.set_level(config.log_level);
        let crc_policy = Arc::new(AtomicBool::new(config.crc_enabled));
        Self {
            config,
            tracker: SequenceTracker::new(),
            stats: Arc::new(StatsRegistry::new()),
            events: Arc::new(EventBus::new()),
            journal,
            recorder: FrameRecorder::new(),
            crc_policy,
            should_stop: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn stats(&self) -> Arc<StatsRegistry> {
        Arc::clone(&self.stats)
    }

    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }

    pub fn journal(&self) -> Arc<Journal> {
        Arc::clone(&self.journal)
    }

    /// Shared CRC policy flag. The control node flips this at runtime; the
    /// loop reads it per frame.
    pub fn crc_policy(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.crc_policy)
    }

    /// Handle that makes [`Gateway::run`] return. Safe to signal from any
    /// thread; idempotent.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.should_stop)
    }

    pub fn stop(&self) {
        self.should_stop.store(true, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run the ingest loop until stopped (or, in replay mode, until the
    /// recording is exhausted). Blocking.
    pub fn run(&mut self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.should_stop.store(false, Ordering::SeqCst);

        let mut source: Box<dyn FrameSource> = match &self.config.replay_path {
            Some(path) => {
                let mut replay = ReplayFrameSource::open(path).inspect_err(|e| {
                    self.running.store(false, Ordering::SeqCst);
                    self.journal.log(
                        Severity::Error,
                        EventCategory::Network,
                        EventId::SourceTimeout.name(),
                        &format!("failed to open replay file: {}", path.display()),
                    );
                    warn!(error = %e, "replay open failed");
                })?;
                // Flat out: the pipeline is the pacing bottleneck, not the clock.
                replay.set_speed(0.0);
                info!(path = %path.display(), "gateway replaying");
                Box::new(replay)
            }
            None => {
                let udp = UdpFrameSource::bind(self.config.udp_port).inspect_err(|e| {
                    self.running.store(false, Ordering::SeqCst);
                    self.journal.log(
                        Severity::Error,
                        EventCategory::Network,
                        EventId::SourceTimeout.name(),
                        &format!("failed to bind UDP port {}", self.config.udp_port),
                    );
                    warn!(error = %e, "udp bind failed");
                })?;
                info!(port = self.config.udp_port, "gateway listening");
                Box::new(udp)
            }
        };

        if let Some(path) = self.config.record_path.clone() {
            if let Err(e) = self.recorder.open(&path) {
                self.journal.log(
                    Severity::Warn,
                    EventCategory::Network,
                    EventId::ConfigChange.name(),
                    &format!("failed to open record file: {}", path.display()),
                );
                warn!(error = %e, "recording disabled");
            }
        }

        self.journal.log(
            Severity::Info,
            EventCategory::Control,
            EventId::ConfigChange.name(),
            &format!("gateway started on port {}", self.config.udp_port),
        );

        let mut buf = Vec::new();
        while !self.should_stop.load(Ordering::SeqCst) {
            if !source.receive(&mut buf) {
                if source.is_done() {
                    break;
                }
                continue;
            }
            let rx_timestamp_ns = now_ns();
            self.process_frame(&buf, rx_timestamp_ns);
        }

        self.recorder.close();
        self.running.store(false, Ordering::SeqCst);

        self.journal.log(
            Severity::Info,
            EventCategory::Control,
            EventId::ConfigChange.name(),
            "gateway stopped",
        );
        info!("gateway stopped");
        Ok(())
    }

    /// Push one raw frame through the pipeline. Public so harnesses can
    /// drive the gateway without a socket.
    pub fn process_frame(&mut self, frame: &[u8], rx_timestamp_ns: u64) {
        if self.recorder.is_open() {
            if let Err(e) = self.recorder.record(rx_timestamp_ns, frame) {
                warn!(error = %e, "frame not recorded");
            }
        }

        let crc_enabled = self.crc_policy.load(Ordering::SeqCst);
        let parsed = match parse_frame(frame, crc_enabled) {
            Ok(parsed) => parsed,
            Err(reject) => {
                self.reject_frame(reject, frame.len());
                return;
            }
        };

        let header = parsed.header;
        let seq_event = self.tracker.track(header.src_id, header.seq);
        self.stats.record_rx(header.src_id, header.seq, rx_timestamp_ns);

        match seq_event.result {
            SeqResult::First => {
                self.publish(
                    EventId::SourceOnline,
                    EventCategory::Network,
                    Severity::Info,
                    format!("src_id={}", header.src_id),
                );
            }
            SeqResult::Gap => {
                self.stats.record_gap(header.src_id, seq_event.gap_size);
                self.publish(
                    EventId::SeqGap,
                    EventCategory::Network,
                    Severity::Warn,
                    format!(
                        "src_id={} expected={} actual={} gap={}",
                        header.src_id,
                        seq_event.expected_seq,
                        seq_event.actual_seq,
                        seq_event.gap_size
                    ),
                );
            }
            SeqResult::Reorder => {
                self.stats.record_reorder(header.src_id);
                self.publish(
                    EventId::SeqReorder,
                    EventCategory::Network,
                    Severity::Warn,
                    format!(
                        "src_id={} expected={} actual={}",
                        header.src_id, seq_event.expected_seq, seq_event.actual_seq
                    ),
                );
            }
            // Duplicates are counted but not announced; a noisy link would
            // otherwise flood the journal.
            SeqResult::Duplicate => {
                self.stats.record_duplicate(header.src_id);
            }
            SeqResult::Ok => {}
        }

        self.dispatch_payload(parsed.msg_type(), header.src_id, parsed.payload);
    }

    fn reject_frame(&mut self, reject: ParseReject, frame_len: usize) {
        self.stats.record_malformed(0);
        if reject.is_crc_failure() {
            self.stats.record_crc_fail(0);
            self.publish(
                EventId::CrcFail,
                EventCategory::Network,
                Severity::Warn,
                format!("error={}", reject.label()),
            );
        } else {
            self.publish(
                EventId::FrameMalformed,
                EventCategory::Network,
                Severity::Warn,
                format!("error={} len={frame_len}", reject.label()),
            );
        }
    }

    fn dispatch_payload(&mut self, msg_type: MsgType, src_id: u16, payload: &[u8]) {
        match msg_type {
            MsgType::Track => {
                if let Some(track) = TrackPayload::decode(payload) {
                    self.publish(
                        EventId::TrackUpdate,
                        EventCategory::Tracking,
                        Severity::Debug,
                        format!(
                            "src_id={} track_id={} class={} threat={}",
                            src_id, track.track_id, track.classification, track.threat_level
                        ),
                    );
                }
            }
            MsgType::Plot => {
                if let Some(plot) = PlotPayload::decode(payload) {
                    self.publish(
                        EventId::TrackNew,
                        EventCategory::Tracking,
                        Severity::Debug,
                        format!(
                            "src_id={} plot_id={} range={}m",
                            src_id, plot.plot_id, plot.range_m
                        ),
                    );
                }
            }
            MsgType::Heartbeat => {
                if let Some(hb) = HeartbeatPayload::decode(payload) {
                    let (id, severity) = match SubsystemState::from_u8(hb.state) {
                        Some(SubsystemState::Degraded) => {
                            (EventId::HeartbeatDegrade, Severity::Warn)
                        }
                        Some(SubsystemState::Error) | Some(SubsystemState::Offline) => {
                            (EventId::HeartbeatError, Severity::Alarm)
                        }
                        _ => (EventId::HeartbeatOk, Severity::Debug),
                    };
                    self.publish(
                        id,
                        EventCategory::Health,
                        severity,
                        format!(
                            "subsystem={} state={} cpu={}% mem={}%",
                            hb.subsystem_id, hb.state, hb.cpu_pct, hb.mem_pct
                        ),
                    );
                }
            }
            MsgType::Engagement => {
                if let Some(eng) = EngagementPayload::decode(payload) {
                    self.publish(
                        EventId::WeaponStatus,
                        EventCategory::Engagement,
                        Severity::Info,
                        format!(
                            "weapon={} mode={} track={} rounds={}",
                            eng.weapon_id, eng.mode, eng.assigned_track, eng.rounds_remaining
                        ),
                    );
                }
            }
        }
    }

    fn publish(&self, id: EventId, category: EventCategory, severity: Severity, detail: String) {
        self.journal.log(severity, category, id.name(), &detail);
        self.events.publish(&EventRecord {
            id,
            category,
            severity,
            timestamp_ns: now_ns(),
            detail,
        });
    }
}
