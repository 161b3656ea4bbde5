//! Seeded world population.
//!
//! [`ObjectGenerator`] draws [`WorldObject`]s under a [`ScenarioProfile`].
//! Everything is driven by one seeded PRNG, so identical profile + seed
//! reproduces the identical population - the backbone of the closed-loop
//! test story.

use crate::protocol::TrackClass;
use crate::sim::scenario::ScenarioProfile;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// One simulated object in the surveillance volume.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldObject {
    pub id: u32,
    pub classification: TrackClass,
    pub spawn_time_s: f64,
    pub lifetime_s: f64,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_m: f64,
    pub speed_mps: f64,
    pub heading_deg: f64,
    pub rcs_dbsm: f64,
    pub is_hostile: bool,
    /// Measurement noise sigma derived from range and RCS.
    pub noise_stddev: f64,
}

/// Median radar cross section per class, dBsm.
fn base_rcs_dbsm(class: TrackClass) -> f64 {
    match class {
        TrackClass::FixedWing => 10.0,
        TrackClass::RotaryWing => 5.0,
        TrackClass::UavSmall => -5.0,
        TrackClass::UavLarge => 3.0,
        TrackClass::Missile => -10.0,
        TrackClass::RocketArtillery => -8.0,
        TrackClass::Bird => -20.0,
        TrackClass::Decoy => 15.0,
        TrackClass::Unknown => 0.0,
    }
}

/// Draws objects under a scenario profile from a seeded PRNG.
pub struct ObjectGenerator {
    profile: ScenarioProfile,
    rng: StdRng,
    rcs_noise: Normal<f64>,
    next_id: u32,
    last_spawn_time_s: f64,
}

impl ObjectGenerator {
    pub fn new(profile: ScenarioProfile, seed: u64) -> Self {
        Self {
            profile,
            rng: StdRng::seed_from_u64(seed),
            rcs_noise: Normal::new(0.0, 2.0).expect("fixed sigma is valid"),
            next_id: 1,
            last_spawn_time_s: 0.0,
        }
    }

    pub fn profile(&self) -> &ScenarioProfile {
        &self.profile
    }

    fn make_object(&mut self, spawn_time_s: f64) -> WorldObject {
        let id = self.next_id;
        self.next_id += 1;

        let class_idx = self.rng.gen_range(0..self.profile.allowed_types.len());
        let classification = self.profile.allowed_types[class_idx];

        let lifetime_s = self.rng.gen_range(10.0..120.0);
        let azimuth_deg = self.rng.gen_range(0.0..360.0);
        let elevation_deg = self.rng.gen_range(0.5..45.0);
        let range_m = self.rng.gen_range(self.profile.min_range_m..self.profile.max_range_m);
        let speed_mps = self.rng.gen_range(self.profile.min_speed_mps..self.profile.max_speed_mps);
        let heading_deg = self.rng.gen_range(0.0..360.0);

        let rcs_dbsm = base_rcs_dbsm(classification) + self.rcs_noise.sample(&mut self.rng);
        let is_hostile = self.rng.gen_range(0.0..1.0) < self.profile.hostile_probability;

        // Noise grows with range and shrinks with RCS, floored at 1.0.
        let rcs_linear = 10f64.powf(rcs_dbsm / 10.0);
        let noise_stddev = (range_m / 1000.0 / rcs_linear.max(0.01)).max(1.0);

        WorldObject {
            id,
            classification,
            spawn_time_s,
            lifetime_s,
            azimuth_deg,
            elevation_deg,
            range_m,
            speed_mps,
            heading_deg,
            rcs_dbsm,
            is_hostile,
            noise_stddev,
        }
    }

    /// Draw the initial population: a uniform count in
    /// `[min_objects, max_objects]`, all spawned at t = 0.
    pub fn generate_initial(&mut self) -> Vec<WorldObject> {
        let count = self.rng.gen_range(self.profile.min_objects..=self.profile.max_objects);
        (0..count).map(|_| self.make_object(0.0)).collect()
    }

    /// Spawn at most one object per `1 / spawn_rate_hz` interval, keyed off
    /// the previous spawn time. Never spawns when the rate is zero.
    pub fn maybe_spawn(&mut self, current_time_s: f64) -> Option<WorldObject> {
        if self.profile.spawn_rate_hz <= 0.0 {
            return None;
        }
        let interval_s = 1.0 / self.profile.spawn_rate_hz;
        if current_time_s - self.last_spawn_time_s >= interval_s {
            self.last_spawn_time_s = current_time_s;
            return Some(self.make_object(current_time_s));
        }
        None
    }
}
