//! Shared simulation context
//!
//! Everything entities touch besides the registry itself: the physics world,
//! the scene, the seeded RNG and the aggregate city health. One `World` lives
//! for one level.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::physics::Physics;
use super::scene::Scene;
use crate::clamped_ratio;

/// RNG seed wrapper for reproducible levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Structural tiles still standing versus tiles the city was built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CityHealth {
    pub standing: u32,
    pub max: u32,
}

impl CityHealth {
    pub fn add_standing(&mut self) {
        self.standing += 1;
    }

    pub fn lose_standing(&mut self) {
        self.standing = self.standing.saturating_sub(1);
    }

    /// Freeze the current standing count as the full-health reference
    pub fn latch_max(&mut self) {
        self.max = self.standing;
    }

    /// Fraction of the city still standing; 0 when nothing was ever built
    pub fn ratio(&self) -> f32 {
        clamped_ratio(self.standing as f32, self.max as f32)
    }
}

/// Context passed to every entity's `advance` and `on_remove`
pub struct World {
    pub physics: Box<dyn Physics>,
    pub scene: Box<dyn Scene>,
    pub rng: Pcg32,
    pub city: CityHealth,
}

impl World {
    pub fn new(physics: Box<dyn Physics>, scene: Box<dyn Scene>, seed: u64) -> Self {
        Self {
            physics,
            scene,
            rng: RngState::new(seed).to_rng(),
            city: CityHealth::default(),
        }
    }
}
