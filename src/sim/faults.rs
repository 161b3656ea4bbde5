//! Network fault injection on frame batches.
//!
//! Perturbations apply in a fixed order - corrupt, duplicate, loss, reorder
//! - and the order is load-bearing: duplication precedes loss so a
//! duplicated frame may itself be dropped, and reorder walks the post-loss
//! list. Reordering the stages changes the PRNG consumption pattern and
//! breaks reproducibility against recorded runs.
//!
//! The PRNG is seeded once at construction: identical config + seed + input
//! batch produces the identical output batch.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Perturbation probabilities, each in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FaultConfig {
    pub loss_pct: f64,
    pub reorder_pct: f64,
    pub duplicate_pct: f64,
    pub corrupt_pct: f64,
}

/// Operation counts from the most recent [`FaultInjector::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultStats {
    pub dropped: u32,
    pub reordered: u32,
    pub duplicated: u32,
    pub corrupted: u32,
}

/// Applies loss / reorder / duplicate / corrupt faults to frame batches.
pub struct FaultInjector {
    config: FaultConfig,
    rng: StdRng,
    last_stats: FaultStats,
}

impl FaultInjector {
    pub fn new(config: FaultConfig, seed: u64) -> Self {
        Self { config, rng: StdRng::seed_from_u64(seed), last_stats: FaultStats::default() }
    }

    /// Stats from the most recent apply. Reset at the start of each apply.
    pub fn last_stats(&self) -> FaultStats {
        self.last_stats
    }

    /// Perturb `frames` in place.
    pub fn apply(&mut self, frames: &mut Vec<Vec<u8>>) {
        self.last_stats = FaultStats::default();

        if frames.is_empty() {
            return;
        }

        // 1. Corrupt: XOR one random byte per afflicted frame.
        if self.config.corrupt_pct > 0.0 {
            for frame in frames.iter_mut() {
                if self.rng.gen_range(0.0..100.0) < self.config.corrupt_pct && !frame.is_empty() {
                    let idx = self.rng.gen_range(0..frame.len());
                    frame[idx] ^= 0xFF;
                    self.last_stats.corrupted += 1;
                }
            }
        }

        // 2. Duplicate: schedule copies, then insert each at a random
        //    position in the growing batch.
        if self.config.duplicate_pct > 0.0 {
            let mut extras = Vec::new();
            for frame in frames.iter() {
                if self.rng.gen_range(0.0..100.0) < self.config.duplicate_pct {
                    extras.push(frame.clone());
                    self.last_stats.duplicated += 1;
                }
            }
            for extra in extras {
                let pos = self.rng.gen_range(0..=frames.len());
                frames.insert(pos, extra);
            }
        }

        // 3. Loss: duplicates made above are eligible too.
        if self.config.loss_pct > 0.0 {
            let rng = &mut self.rng;
            let stats = &mut self.last_stats;
            let loss_pct = self.config.loss_pct;
            frames.retain(|_| {
                if rng.gen_range(0.0..100.0) < loss_pct {
                    stats.dropped += 1;
                    false
                } else {
                    true
                }
            });
        }

        // 4. Reorder: swap adjacent pairs left to right, skipping the
        //    partner index so one frame moves at most once per pass.
        if self.config.reorder_pct > 0.0 && frames.len() >= 2 {
            let mut i = 0;
            while i + 1 < frames.len() {
                if self.rng.gen_range(0.0..100.0) < self.config.reorder_pct {
                    frames.swap(i, i + 1);
                    self.last_stats.reordered += 1;
                    i += 1;
                }
                i += 1;
            }
        }
    }
}
