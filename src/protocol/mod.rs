//! Wire protocol structures and little-endian codecs.
//!
//! One telemetry frame per datagram:
//!
//! 1. **Header** (18 bytes) - version, message type, source id, sequence
//!    number, timestamp, payload length
//! 2. **Payload** - one of [`PlotPayload`], [`TrackPayload`],
//!    [`HeartbeatPayload`], [`EngagementPayload`]
//! 3. **CRC-32** (4 bytes, optional) - covers header + payload when the
//!    end-to-end CRC policy is enabled
//!
//! All multi-byte integers are little-endian. Layouts are encoded and
//! decoded with explicit byte operations; nothing here depends on the
//! in-memory representation of the structs.

pub mod crc;
pub mod parser;

pub use parser::{parse_frame, ParseReject, ParsedFrame};

/// Protocol version carried in every frame header.
pub const PROTOCOL_VERSION: u8 = 1;

/// Frame header size in bytes:
/// version(1) + msg_type(1) + src_id(2) + seq(4) + ts_ns(8) + payload_len(2).
pub const FRAME_HEADER_SIZE: usize = 18;

/// Size of the optional trailing CRC-32.
pub const FRAME_CRC_SIZE: usize = 4;

/// Upper bound on the payload length field.
pub const MAX_PAYLOAD_SIZE: usize = 1024;

/// Largest parseable frame: header + max payload + CRC.
pub const MAX_FRAME_SIZE: usize = FRAME_HEADER_SIZE + MAX_PAYLOAD_SIZE + FRAME_CRC_SIZE;

/// Largest datagram the receive path will accept.
pub const MAX_DATAGRAM_SIZE: usize = 65536;

/// Telemetry message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MsgType {
    Plot = 0x01,
    Track = 0x02,
    Heartbeat = 0x03,
    Engagement = 0x04,
}

impl MsgType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x01 => Some(MsgType::Plot),
            0x02 => Some(MsgType::Track),
            0x03 => Some(MsgType::Heartbeat),
            0x04 => Some(MsgType::Engagement),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MsgType::Plot => "PLOT",
            MsgType::Track => "TRACK",
            MsgType::Heartbeat => "HEARTBEAT",
            MsgType::Engagement => "ENGAGEMENT",
        }
    }
}

/// Object classification carried in TRACK payloads and scenario profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TrackClass {
    Unknown = 0x00,
    FixedWing = 0x01,
    RotaryWing = 0x02,
    UavSmall = 0x03,
    UavLarge = 0x04,
    Missile = 0x05,
    RocketArtillery = 0x06,
    Bird = 0x07,
    Decoy = 0x08,
}

impl TrackClass {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x00 => Some(TrackClass::Unknown),
            0x01 => Some(TrackClass::FixedWing),
            0x02 => Some(TrackClass::RotaryWing),
            0x03 => Some(TrackClass::UavSmall),
            0x04 => Some(TrackClass::UavLarge),
            0x05 => Some(TrackClass::Missile),
            0x06 => Some(TrackClass::RocketArtillery),
            0x07 => Some(TrackClass::Bird),
            0x08 => Some(TrackClass::Decoy),
            _ => None,
        }
    }

    /// Scenario-file spelling of the class name.
    pub fn name(self) -> &'static str {
        match self {
            TrackClass::Unknown => "UNKNOWN",
            TrackClass::FixedWing => "FIXED_WING",
            TrackClass::RotaryWing => "ROTARY_WING",
            TrackClass::UavSmall => "UAV_SMALL",
            TrackClass::UavLarge => "UAV_LARGE",
            TrackClass::Missile => "MISSILE",
            TrackClass::RocketArtillery => "ROCKET_ARTILLERY",
            TrackClass::Bird => "BIRD",
            TrackClass::Decoy => "DECOY",
        }
    }

    /// Inverse of [`TrackClass::name`], used by the scenario loader.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "UNKNOWN" => Some(TrackClass::Unknown),
            "FIXED_WING" => Some(TrackClass::FixedWing),
            "ROTARY_WING" => Some(TrackClass::RotaryWing),
            "UAV_SMALL" => Some(TrackClass::UavSmall),
            "UAV_LARGE" => Some(TrackClass::UavLarge),
            "MISSILE" => Some(TrackClass::Missile),
            "ROCKET_ARTILLERY" => Some(TrackClass::RocketArtillery),
            "BIRD" => Some(TrackClass::Bird),
            "DECOY" => Some(TrackClass::Decoy),
            _ => None,
        }
    }
}

/// Threat assessment carried in TRACK payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ThreatLevel {
    Unknown = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl ThreatLevel {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(ThreatLevel::Unknown),
            1 => Some(ThreatLevel::Low),
            2 => Some(ThreatLevel::Medium),
            3 => Some(ThreatLevel::High),
            4 => Some(ThreatLevel::Critical),
            _ => None,
        }
    }
}

/// Identification friend-or-foe status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IffStatus {
    NoResponse = 0,
    Friend = 1,
    Foe = 2,
    Pending = 3,
}

impl IffStatus {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(IffStatus::NoResponse),
            1 => Some(IffStatus::Friend),
            2 => Some(IffStatus::Foe),
            3 => Some(IffStatus::Pending),
            _ => None,
        }
    }
}

/// Subsystem state reported in HEARTBEAT payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SubsystemState {
    Ok = 0,
    Degraded = 1,
    Error = 2,
    Offline = 3,
}

impl SubsystemState {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(SubsystemState::Ok),
            1 => Some(SubsystemState::Degraded),
            2 => Some(SubsystemState::Error),
            3 => Some(SubsystemState::Offline),
            _ => None,
        }
    }
}

/// Weapon mode carried in ENGAGEMENT payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WeaponMode {
    Safe = 0,
    Armed = 1,
    Engaging = 2,
    CeaseFire = 3,
}

impl WeaponMode {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(WeaponMode::Safe),
            1 => Some(WeaponMode::Armed),
            2 => Some(WeaponMode::Engaging),
            3 => Some(WeaponMode::CeaseFire),
            _ => None,
        }
    }
}

// Little-endian field helpers. Callers bound-check the slice once; offsets
// below are compile-time constants within each codec.

#[inline]
fn le_u16(b: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([b[off], b[off + 1]])
}

#[inline]
fn le_i16(b: &[u8], off: usize) -> i16 {
    i16::from_le_bytes([b[off], b[off + 1]])
}

#[inline]
fn le_u32(b: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([b[off], b[off + 1], b[off + 2], b[off + 3]])
}

#[inline]
fn le_i32(b: &[u8], off: usize) -> i32 {
    i32::from_le_bytes([b[off], b[off + 1], b[off + 2], b[off + 3]])
}

#[inline]
fn le_u64(b: &[u8], off: usize) -> u64 {
    u64::from_le_bytes([
        b[off],
        b[off + 1],
        b[off + 2],
        b[off + 3],
        b[off + 4],
        b[off + 5],
        b[off + 6],
        b[off + 7],
    ])
}

/// Telemetry frame header. 18 bytes on the wire.
///
/// `msg_type` is kept as the raw wire byte; the parser validates it and
/// [`FrameHeader::msg_type`] converts on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: u8,
    pub msg_type: u8,
    pub src_id: u16,
    pub seq: u32,
    pub ts_ns: u64,
    pub payload_len: u16,
}

impl FrameHeader {
    pub const SIZE: usize = FRAME_HEADER_SIZE;

    /// Decode a header from the first 18 bytes of `buf`.
    ///
    /// Returns `None` when `buf` is shorter than a header.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            version: buf[0],
            msg_type: buf[1],
            src_id: le_u16(buf, 2),
            seq: le_u32(buf, 4),
            ts_ns: le_u64(buf, 8),
            payload_len: le_u16(buf, 16),
        })
    }

    /// Encode the header into a fixed-size array.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0] = self.version;
        buf[1] = self.msg_type;
        buf[2..4].copy_from_slice(&self.src_id.to_le_bytes());
        buf[4..8].copy_from_slice(&self.seq.to_le_bytes());
        buf[8..16].copy_from_slice(&self.ts_ns.to_le_bytes());
        buf[16..18].copy_from_slice(&self.payload_len.to_le_bytes());
        buf
    }

    /// The validated message type, if the wire byte is a known one.
    pub fn typed_msg(&self) -> Option<MsgType> {
        MsgType::from_u8(self.msg_type)
    }
}

/// Raw radar detection. 21 bytes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlotPayload {
    pub plot_id: u32,
    pub azimuth_mdeg: i32,
    pub elevation_mdeg: i32,
    pub range_m: u32,
    pub amplitude_db: i16,
    pub doppler_mps: i16,
    pub quality: u8,
}

impl PlotPayload {
    pub const SIZE: usize = 21;

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            plot_id: le_u32(buf, 0),
            azimuth_mdeg: le_i32(buf, 4),
            elevation_mdeg: le_i32(buf, 8),
            range_m: le_u32(buf, 12),
            amplitude_db: le_i16(buf, 16),
            doppler_mps: le_i16(buf, 18),
            quality: buf[20],
        })
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&self.plot_id.to_le_bytes());
        buf[4..8].copy_from_slice(&self.azimuth_mdeg.to_le_bytes());
        buf[8..12].copy_from_slice(&self.elevation_mdeg.to_le_bytes());
        buf[12..16].copy_from_slice(&self.range_m.to_le_bytes());
        buf[16..18].copy_from_slice(&self.amplitude_db.to_le_bytes());
        buf[18..20].copy_from_slice(&self.doppler_mps.to_le_bytes());
        buf[20] = self.quality;
        buf
    }
}

/// Associated track report. 25 bytes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackPayload {
    pub track_id: u32,
    pub classification: u8,
    pub threat_level: u8,
    pub iff_status: u8,
    pub azimuth_mdeg: i32,
    pub elevation_mdeg: i32,
    pub range_m: u32,
    pub velocity_mps: i16,
    pub rcs_dbsm: i16,
    pub update_count: u16,
}

impl TrackPayload {
    pub const SIZE: usize = 25;

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            track_id: le_u32(buf, 0),
            classification: buf[4],
            threat_level: buf[5],
            iff_status: buf[6],
            azimuth_mdeg: le_i32(buf, 7),
            elevation_mdeg: le_i32(buf, 11),
            range_m: le_u32(buf, 15),
            velocity_mps: le_i16(buf, 19),
            rcs_dbsm: le_i16(buf, 21),
            update_count: le_u16(buf, 23),
        })
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&self.track_id.to_le_bytes());
        buf[4] = self.classification;
        buf[5] = self.threat_level;
        buf[6] = self.iff_status;
        buf[7..11].copy_from_slice(&self.azimuth_mdeg.to_le_bytes());
        buf[11..15].copy_from_slice(&self.elevation_mdeg.to_le_bytes());
        buf[15..19].copy_from_slice(&self.range_m.to_le_bytes());
        buf[19..21].copy_from_slice(&self.velocity_mps.to_le_bytes());
        buf[21..23].copy_from_slice(&self.rcs_dbsm.to_le_bytes());
        buf[23..25].copy_from_slice(&self.update_count.to_le_bytes());
        buf
    }
}

/// Subsystem liveness report. 11 bytes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeartbeatPayload {
    pub subsystem_id: u16,
    pub state: u8,
    pub cpu_pct: u8,
    pub mem_pct: u8,
    pub uptime_s: u32,
    pub error_code: u16,
}

impl HeartbeatPayload {
    pub const SIZE: usize = 11;

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            subsystem_id: le_u16(buf, 0),
            state: buf[2],
            cpu_pct: buf[3],
            mem_pct: buf[4],
            uptime_s: le_u32(buf, 5),
            error_code: le_u16(buf, 9),
        })
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..2].copy_from_slice(&self.subsystem_id.to_le_bytes());
        buf[2] = self.state;
        buf[3] = self.cpu_pct;
        buf[4] = self.mem_pct;
        buf[5..9].copy_from_slice(&self.uptime_s.to_le_bytes());
        buf[9..11].copy_from_slice(&self.error_code.to_le_bytes());
        buf
    }
}

/// Weapon engagement status. 13 bytes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngagementPayload {
    pub weapon_id: u16,
    pub mode: u8,
    pub assigned_track: u32,
    pub rounds_remaining: u16,
    pub barrel_temp_c: i16,
    pub burst_count: u16,
}

impl EngagementPayload {
    pub const SIZE: usize = 13;

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            weapon_id: le_u16(buf, 0),
            mode: buf[2],
            assigned_track: le_u32(buf, 3),
            rounds_remaining: le_u16(buf, 7),
            barrel_temp_c: le_i16(buf, 9),
            burst_count: le_u16(buf, 11),
        })
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..2].copy_from_slice(&self.weapon_id.to_le_bytes());
        buf[2] = self.mode;
        buf[3..7].copy_from_slice(&self.assigned_track.to_le_bytes());
        buf[7..9].copy_from_slice(&self.rounds_remaining.to_le_bytes());
        buf[9..11].copy_from_slice(&self.barrel_temp_c.to_le_bytes());
        buf[11..13].copy_from_slice(&self.burst_count.to_le_bytes());
        buf
    }
}
