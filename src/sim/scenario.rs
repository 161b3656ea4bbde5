//! Scenario profiles for the synthetic sensor.
//!
//! A profile parameterizes the object generator: how many objects, which
//! classes, how fast they spawn and move, and how hostile the population
//! is. Profiles come from the built-in table ([`ScenarioProfile::by_name`])
//! or from a JSON file:
//!
//! ```json
//! {
//!   "name": "patrol",
//!   "min_objects": 3,
//!   "max_objects": 8,
//!   "allowed_types": ["FIXED_WING", "ROTARY_WING", "UAV_SMALL"],
//!   "spawn_rate_hz": 0.1,
//!   "min_range_m": 5000.0,
//!   "max_range_m": 30000.0,
//!   "min_speed_mps": 50.0,
//!   "max_speed_mps": 300.0,
//!   "hostile_probability": 0.3
//! }
//! ```
//!
//! A missing `name`, a missing or empty `allowed_types`, or an unknown
//! class name is a load error - scenario problems are fatal to the operator
//! tool and never reach the ingest pipeline.

use crate::error::{Result, SentinelError};
use crate::protocol::TrackClass;
use serde::Deserialize;
use std::path::Path;

/// Validated generator parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioProfile {
    pub name: String,
    pub min_objects: u32,
    pub max_objects: u32,
    pub allowed_types: Vec<TrackClass>,
    pub spawn_rate_hz: f64,
    pub min_range_m: f64,
    pub max_range_m: f64,
    pub min_speed_mps: f64,
    pub max_speed_mps: f64,
    pub hostile_probability: f64,
}

/// On-disk shape; class names are validated during conversion.
#[derive(Debug, Deserialize)]
struct RawProfile {
    name: String,
    min_objects: u32,
    max_objects: u32,
    #[serde(default)]
    allowed_types: Vec<String>,
    spawn_rate_hz: f64,
    min_range_m: f64,
    max_range_m: f64,
    min_speed_mps: f64,
    max_speed_mps: f64,
    hostile_probability: f64,
}

impl TryFrom<RawProfile> for ScenarioProfile {
    type Error = SentinelError;

    fn try_from(raw: RawProfile) -> Result<Self> {
        if raw.name.is_empty() {
            return Err(SentinelError::scenario("profile name must not be empty"));
        }
        if raw.allowed_types.is_empty() {
            return Err(SentinelError::scenario("allowed_types must not be empty"));
        }
        let allowed_types = raw
            .allowed_types
            .iter()
            .map(|name| {
                TrackClass::from_name(name)
                    .ok_or_else(|| SentinelError::scenario(format!("unknown object class: {name}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: raw.name,
            min_objects: raw.min_objects,
            max_objects: raw.max_objects,
            allowed_types,
            spawn_rate_hz: raw.spawn_rate_hz,
            min_range_m: raw.min_range_m,
            max_range_m: raw.max_range_m,
            min_speed_mps: raw.min_speed_mps,
            max_speed_mps: raw.max_speed_mps,
            hostile_probability: raw.hostile_probability,
        })
    }
}

impl ScenarioProfile {
    /// Parse a profile from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawProfile = serde_json::from_str(json)
            .map_err(|e| SentinelError::scenario(format!("invalid scenario JSON: {e}")))?;
        raw.try_into()
    }

    /// Load a profile from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| SentinelError::file_error(path, source))?;
        Self::from_json(&text)
    }

    /// Look up one of the built-in profiles.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "idle" => Some(Self::idle()),
            "patrol" => Some(Self::patrol()),
            "raid" => Some(Self::raid()),
            "stress" => Some(Self::stress()),
            _ => None,
        }
    }

    /// Quiet skies: the odd bird, nothing hostile.
    pub fn idle() -> Self {
        Self {
            name: "idle".into(),
            min_objects: 0,
            max_objects: 2,
            allowed_types: vec![TrackClass::Bird, TrackClass::Unknown],
            spawn_rate_hz: 0.01,
            min_range_m: 1_000.0,
            max_range_m: 15_000.0,
            min_speed_mps: 5.0,
            max_speed_mps: 30.0,
            hostile_probability: 0.0,
        }
    }

    /// Routine air activity with occasional hostiles.
    pub fn patrol() -> Self {
        Self {
            name: "patrol".into(),
            min_objects: 3,
            max_objects: 8,
            allowed_types: vec![
                TrackClass::FixedWing,
                TrackClass::RotaryWing,
                TrackClass::UavSmall,
            ],
            spawn_rate_hz: 0.1,
            min_range_m: 5_000.0,
            max_range_m: 30_000.0,
            min_speed_mps: 50.0,
            max_speed_mps: 300.0,
            hostile_probability: 0.3,
        }
    }

    /// Saturation attack: drones, missiles and rockets, mostly hostile.
    pub fn raid() -> Self {
        Self {
            name: "raid".into(),
            min_objects: 10,
            max_objects: 30,
            allowed_types: vec![
                TrackClass::UavSmall,
                TrackClass::Missile,
                TrackClass::RocketArtillery,
            ],
            spawn_rate_hz: 1.0,
            min_range_m: 3_000.0,
            max_range_m: 25_000.0,
            min_speed_mps: 100.0,
            max_speed_mps: 600.0,
            hostile_probability: 0.8,
        }
    }

    /// Throughput soak: everything at once.
    pub fn stress() -> Self {
        Self {
            name: "stress".into(),
            min_objects: 50,
            max_objects: 100,
            allowed_types: vec![
                TrackClass::FixedWing,
                TrackClass::RotaryWing,
                TrackClass::UavSmall,
                TrackClass::UavLarge,
                TrackClass::Missile,
                TrackClass::RocketArtillery,
                TrackClass::Bird,
                TrackClass::Decoy,
                TrackClass::Unknown,
            ],
            spawn_rate_hz: 10.0,
            min_range_m: 1_000.0,
            max_range_m: 40_000.0,
            min_speed_mps: 10.0,
            max_speed_mps: 800.0,
            hostile_probability: 0.5,
        }
    }
}
