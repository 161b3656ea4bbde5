//! Kinematic propagation of the simulated world.
//!
//! Each tick advances every object along its heading decomposed into a
//! radial component (changes range) and a tangential component (changes
//! azimuth, scaled by 1/range). Objects are pruned when their lifetime
//! expires or they close inside the 50 m dead zone around the sensor.

use crate::sim::objects::WorldObject;

/// Objects closer than this are dropped; inside it the angular rate blows up.
const MIN_RANGE_M: f64 = 50.0;

/// Holds and propagates the live object population.
#[derive(Debug, Default)]
pub struct WorldModel {
    objects: Vec<WorldObject>,
}

impl WorldModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, object: WorldObject) {
        self.objects.push(object);
    }

    /// Advance the world by `dt` seconds and prune dead objects. Returns the
    /// surviving population.
    pub fn tick(&mut self, dt: f64, current_time_s: f64) -> &[WorldObject] {
        for obj in &mut self.objects {
            let heading_rad = obj.heading_deg.to_radians();

            obj.range_m += obj.speed_mps * heading_rad.cos() * dt;

            if obj.range_m > MIN_RANGE_M {
                let tangential_m = obj.speed_mps * heading_rad.sin() * dt;
                obj.azimuth_deg += (tangential_m / obj.range_m).to_degrees();
                obj.azimuth_deg = obj.azimuth_deg.rem_euclid(360.0);
            }
        }

        self.objects.retain(|obj| {
            obj.range_m >= MIN_RANGE_M && current_time_s <= obj.spawn_time_s + obj.lifetime_s
        });

        &self.objects
    }

    pub fn active_count(&self) -> usize {
        self.objects.len()
    }

    pub fn objects(&self) -> &[WorldObject] {
        &self.objects
    }
}
