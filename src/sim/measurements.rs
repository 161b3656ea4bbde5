//! Synthetic measurement frames from world state.
//!
//! The generator owns one sequence counter that advances on *every* emitted
//! frame regardless of type, so a gateway fed directly from it sees a clean
//! FIRST/OK… sequence. Detection, noise and housekeeping values all come
//! from one seeded PRNG: identical seed + inputs reproduce identical frame
//! bytes.
//!
//! Frames are emitted without a trailing CRC by default, matching a sensor
//! whose link layer handles integrity. [`MeasurementGenerator::set_crc`]
//! turns on CRC appending for driving a CRC-enforcing gateway end to end.

use crate::protocol::crc::crc32;
use crate::protocol::{
    EngagementPayload, FrameHeader, HeartbeatPayload, IffStatus, MsgType, PlotPayload,
    SubsystemState, ThreatLevel, TrackClass, TrackPayload, WeaponMode, PROTOCOL_VERSION,
};
use crate::sim::objects::WorldObject;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::collections::HashMap;

/// Builds PLOT/TRACK/HEARTBEAT/ENGAGEMENT frames for one sensor source.
pub struct MeasurementGenerator {
    src_id: u16,
    seq: u32,
    rng: StdRng,
    plot_id: u32,
    track_update_counts: HashMap<u16, u16>,
    append_crc: bool,
}

impl MeasurementGenerator {
    pub fn new(src_id: u16, seed: u64) -> Self {
        Self {
            src_id,
            seq: 0,
            rng: StdRng::seed_from_u64(seed),
            plot_id: 1,
            track_update_counts: HashMap::new(),
            append_crc: false,
        }
    }

    /// Append a CRC-32 to every emitted frame.
    pub fn set_crc(&mut self, enabled: bool) {
        self.append_crc = enabled;
    }

    /// Next sequence number to be emitted.
    pub fn seq(&self) -> u32 {
        self.seq
    }

    fn build_frame(&mut self, msg_type: MsgType, payload: &[u8], ts_ns: u64) -> Vec<u8> {
        let header = FrameHeader {
            version: PROTOCOL_VERSION,
            msg_type: msg_type as u8,
            src_id: self.src_id,
            seq: self.seq,
            ts_ns,
            payload_len: payload.len() as u16,
        };
        self.seq = self.seq.wrapping_add(1);

        let mut frame = Vec::with_capacity(FrameHeader::SIZE + payload.len() + 4);
        frame.extend_from_slice(&header.encode());
        frame.extend_from_slice(payload);
        if self.append_crc {
            let sum = crc32(&frame);
            frame.extend_from_slice(&sum.to_le_bytes());
        }
        frame
    }

    /// Raw detections: each object is seen with probability
    /// `clamp(rcs_linear / range_km², 0.1, 1.0)` and measured with noise
    /// proportional to its `noise_stddev`.
    pub fn generate_plots(&mut self, objects: &[WorldObject], ts_ns: u64) -> Vec<Vec<u8>> {
        let mut frames = Vec::with_capacity(objects.len());

        for obj in objects {
            let rcs_linear = 10f64.powf(obj.rcs_dbsm / 10.0);
            let range_km = obj.range_m / 1000.0;
            let p_detect = (rcs_linear / (range_km * range_km)).clamp(0.1, 1.0);

            if self.rng.gen_range(0.0..1.0) > p_detect {
                continue;
            }

            let noise = Normal::new(0.0, obj.noise_stddev).expect("sigma is >= 1");
            let az_noise = noise.sample(&mut self.rng);
            let el_noise = noise.sample(&mut self.rng);
            let range_noise = noise.sample(&mut self.rng);
            let amp_noise = noise.sample(&mut self.rng);

            let payload = PlotPayload {
                plot_id: self.plot_id,
                azimuth_mdeg: ((obj.azimuth_deg + az_noise * 0.01) * 1000.0) as i32,
                elevation_mdeg: ((obj.elevation_deg + el_noise * 0.01) * 1000.0) as i32,
                range_m: (obj.range_m + range_noise).max(0.0) as u32,
                amplitude_db: (obj.rcs_dbsm * 10.0 + amp_noise * 5.0) as i16,
                doppler_mps: (-obj.speed_mps * obj.heading_deg.to_radians().cos()) as i16,
                quality: (p_detect * 100.0).clamp(10.0, 100.0) as u8,
            };
            self.plot_id += 1;

            frames.push(self.build_frame(MsgType::Plot, &payload.encode(), ts_ns));
        }
        frames
    }

    fn threat_level(obj: &WorldObject) -> ThreatLevel {
        if !obj.is_hostile {
            return ThreatLevel::Low;
        }
        match obj.classification {
            TrackClass::Missile | TrackClass::RocketArtillery => ThreatLevel::Critical,
            TrackClass::UavSmall | TrackClass::UavLarge => ThreatLevel::High,
            _ => ThreatLevel::Medium,
        }
    }

    /// Associated tracks: every object yields a frame with threat and IFF
    /// derived from hostility, plus a per-track update counter.
    pub fn generate_tracks(&mut self, objects: &[WorldObject], ts_ns: u64) -> Vec<Vec<u8>> {
        let mut frames = Vec::with_capacity(objects.len());
        let unit_noise = Normal::new(0.0, 1.0).expect("unit sigma is valid");

        for obj in objects {
            let track_key = (obj.id & 0xFFFF) as u16;
            let update_count = {
                let counter = self.track_update_counts.entry(track_key).or_insert(0);
                *counter = counter.wrapping_add(1);
                *counter
            };

            let iff = if obj.is_hostile { IffStatus::Foe } else { IffStatus::Friend };

            let az_noise = unit_noise.sample(&mut self.rng);
            let el_noise = unit_noise.sample(&mut self.rng);
            let range_noise = unit_noise.sample(&mut self.rng);

            let payload = TrackPayload {
                track_id: obj.id,
                classification: obj.classification as u8,
                threat_level: Self::threat_level(obj) as u8,
                iff_status: iff as u8,
                azimuth_mdeg: (obj.azimuth_deg * 1000.0 + az_noise * obj.noise_stddev * 10.0)
                    as i32,
                elevation_mdeg: (obj.elevation_deg * 1000.0 + el_noise * obj.noise_stddev * 10.0)
                    as i32,
                range_m: (obj.range_m + range_noise * obj.noise_stddev).max(0.0) as u32,
                velocity_mps: (-obj.speed_mps * obj.heading_deg.to_radians().cos()) as i16,
                rcs_dbsm: (obj.rcs_dbsm * 100.0) as i16,
                update_count,
            };

            frames.push(self.build_frame(MsgType::Track, &payload.encode(), ts_ns));
        }
        frames
    }

    /// Housekeeping heartbeat for this sensor subsystem.
    pub fn generate_heartbeat(&mut self, ts_ns: u64) -> Vec<u8> {
        let payload = HeartbeatPayload {
            subsystem_id: self.src_id,
            state: SubsystemState::Ok as u8,
            cpu_pct: self.rng.gen_range(10..=60),
            mem_pct: self.rng.gen_range(20..=70),
            uptime_s: (ts_ns / 1_000_000_000) as u32,
            error_code: 0,
        };
        self.build_frame(MsgType::Heartbeat, &payload.encode(), ts_ns)
    }

    /// Weapon engagement status; every field is caller-supplied.
    #[allow(clippy::too_many_arguments)]
    pub fn generate_engagement(
        &mut self,
        weapon_id: u16,
        mode: WeaponMode,
        assigned_track: u32,
        rounds: u16,
        barrel_temp_c: i16,
        bursts: u16,
        ts_ns: u64,
    ) -> Vec<u8> {
        let payload = EngagementPayload {
            weapon_id,
            mode: mode as u8,
            assigned_track,
            rounds_remaining: rounds,
            barrel_temp_c,
            burst_count: bursts,
        };
        self.build_frame(MsgType::Engagement, &payload.encode(), ts_ns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::parse_frame;

    fn strong_object(id: u32) -> WorldObject {
        WorldObject {
            id,
            classification: TrackClass::FixedWing,
            spawn_time_s: 0.0,
            lifetime_s: 120.0,
            azimuth_deg: 45.0,
            elevation_deg: 10.0,
            range_m: 2_000.0,
            speed_mps: 200.0,
            heading_deg: 180.0,
            rcs_dbsm: 10.0,
            is_hostile: false,
            noise_stddev: 1.0,
        }
    }

    fn hostile(class: TrackClass) -> WorldObject {
        WorldObject {
            classification: class,
            is_hostile: true,
            ..strong_object(9)
        }
    }

    #[test]
    fn sequence_advances_across_all_frame_types() {
        let mut generator = MeasurementGenerator::new(1, 123);
        let objects = vec![strong_object(1), strong_object(2)];

        let tracks = generator.generate_tracks(&objects, 0);
        assert_eq!(tracks.len(), 2);
        let hb = generator.generate_heartbeat(0);
        let eng = generator.generate_engagement(1, WeaponMode::Safe, 0, 100, 20, 0, 0);
        assert_eq!(generator.seq(), 4);

        let seqs: Vec<u32> = tracks
            .iter()
            .chain([&hb, &eng])
            .map(|f| parse_frame(f, false).unwrap().header.seq)
            .collect();
        assert_eq!(seqs, vec![0, 1, 2, 3]);
    }

    #[test]
    fn close_strong_object_is_always_detected() {
        // rcs_linear = 10, range_km² = 4 → p = 1.0 after clamping.
        let mut generator = MeasurementGenerator::new(1, 5);
        let objects = vec![strong_object(1)];
        for _ in 0..20 {
            assert_eq!(generator.generate_plots(&objects, 0).len(), 1);
        }
    }

    #[test]
    fn plots_parse_and_carry_noisy_measurements() {
        let mut generator = MeasurementGenerator::new(3, 11);
        let frames = generator.generate_plots(&[strong_object(1)], 42_000);
        let parsed = parse_frame(&frames[0], false).unwrap();
        assert_eq!(parsed.header.src_id, 3);
        assert_eq!(parsed.header.ts_ns, 42_000);
        assert_eq!(parsed.msg_type(), MsgType::Plot);

        let plot = PlotPayload::decode(parsed.payload).unwrap();
        assert_eq!(plot.plot_id, 1);
        // Inbound at 200 m/s: doppler is positive closing speed.
        assert_eq!(plot.doppler_mps, 200);
        assert!((plot.azimuth_mdeg - 45_000).abs() < 1_000);
        assert!(plot.quality >= 10 && plot.quality <= 100);
    }

    #[test]
    fn threat_derivation_follows_class_and_hostility() {
        let mut generator = MeasurementGenerator::new(1, 1);

        let cases = [
            (hostile(TrackClass::Missile), ThreatLevel::Critical),
            (hostile(TrackClass::RocketArtillery), ThreatLevel::Critical),
            (hostile(TrackClass::UavSmall), ThreatLevel::High),
            (hostile(TrackClass::UavLarge), ThreatLevel::High),
            (hostile(TrackClass::FixedWing), ThreatLevel::Medium),
            (strong_object(1), ThreatLevel::Low),
        ];
        for (obj, expected) in cases {
            let frames = generator.generate_tracks(std::slice::from_ref(&obj), 0);
            let parsed = parse_frame(&frames[0], false).unwrap();
            let track = TrackPayload::decode(parsed.payload).unwrap();
            assert_eq!(track.threat_level, expected as u8, "{:?}", obj.classification);
            let expected_iff = if obj.is_hostile { IffStatus::Foe } else { IffStatus::Friend };
            assert_eq!(track.iff_status, expected_iff as u8);
        }
    }

    #[test]
    fn track_update_count_increments_per_track() {
        let mut generator = MeasurementGenerator::new(1, 9);
        let objects = vec![strong_object(7)];
        for expected in 1..=4u16 {
            let frames = generator.generate_tracks(&objects, 0);
            let track =
                TrackPayload::decode(parse_frame(&frames[0], false).unwrap().payload).unwrap();
            assert_eq!(track.update_count, expected);
        }
    }

    #[test]
    fn heartbeat_fields_are_in_range() {
        let mut generator = MeasurementGenerator::new(6, 2);
        let frame = generator.generate_heartbeat(3_000_000_000);
        let parsed = parse_frame(&frame, false).unwrap();
        let hb = HeartbeatPayload::decode(parsed.payload).unwrap();
        assert_eq!(hb.subsystem_id, 6);
        assert_eq!(hb.state, SubsystemState::Ok as u8);
        assert!((10..=60).contains(&hb.cpu_pct));
        assert!((20..=70).contains(&hb.mem_pct));
        assert_eq!(hb.uptime_s, 3);
        assert_eq!(hb.error_code, 0);
    }

    #[test]
    fn engagement_passes_fields_through() {
        let mut generator = MeasurementGenerator::new(1, 2);
        let frame = generator.generate_engagement(5, WeaponMode::Engaging, 77, 250, 180, 3, 10);
        let parsed = parse_frame(&frame, false).unwrap();
        let eng = EngagementPayload::decode(parsed.payload).unwrap();
        assert_eq!(eng.weapon_id, 5);
        assert_eq!(eng.mode, WeaponMode::Engaging as u8);
        assert_eq!(eng.assigned_track, 77);
        assert_eq!(eng.rounds_remaining, 250);
        assert_eq!(eng.barrel_temp_c, 180);
        assert_eq!(eng.burst_count, 3);
    }

    #[test]
    fn identical_seed_and_input_yield_identical_bytes() {
        let objects = vec![strong_object(1), hostile(TrackClass::Missile)];

        let run = || {
            let mut generator = MeasurementGenerator::new(2, 777);
            let mut out = generator.generate_tracks(&objects, 50);
            out.extend(generator.generate_plots(&objects, 51));
            out.push(generator.generate_heartbeat(52));
            out
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn crc_mode_appends_a_valid_checksum() {
        let mut generator = MeasurementGenerator::new(1, 4);
        generator.set_crc(true);
        let frame = generator.generate_heartbeat(0);
        assert_eq!(frame.len(), FrameHeader::SIZE + HeartbeatPayload::SIZE + 4);
        let parsed = parse_frame(&frame, true).unwrap();
        assert!(parsed.crc.is_some());
    }
}
