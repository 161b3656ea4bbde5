//! Synthetic sensor pipeline.
//!
//! Closed-loop testability for the gateway: a seeded scenario spawns
//! [`WorldObject`]s, the [`WorldModel`] propagates them each tick, the
//! [`MeasurementGenerator`] turns world state into wire frames, and the
//! [`FaultInjector`] perturbs the batch the way a bad radio link would.
//! Every stage is deterministic under a fixed seed.

pub mod faults;
pub mod measurements;
pub mod objects;
pub mod scenario;
pub mod world;

pub use faults::{FaultConfig, FaultInjector, FaultStats};
pub use measurements::MeasurementGenerator;
pub use objects::{ObjectGenerator, WorldObject};
pub use scenario::ScenarioProfile;
pub use world::WorldModel;
