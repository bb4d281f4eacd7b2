//! Skyline - destructible grid-built buildings
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (entity registry, structural tiles, grid generation)
//! - `config`: Data-driven city layout (ground spans, building footprints)

pub mod config;
pub mod sim;

pub use config::{BuildingFootprint, CityConfig, GroundSpan};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Edge length of one structural tile (world units)
    pub const TILE_SIZE: f32 = 2.0;
    pub const TILE_DENSITY: f32 = 5.0;
    pub const TILE_RESTITUTION: f32 = 0.5;
    pub const TILE_FRICTION: f32 = 0.3;
    /// Health of a freshly built tile
    pub const TILE_MAX_HEALTH: f32 = 100.0;

    /// Half-range of the random collapse impulse on each axis
    pub const COLLAPSE_IMPULSE: f32 = 200.0;
    pub const FALLING_LINEAR_DAMPING: f32 = 0.25;
    pub const FALLING_ANGULAR_DAMPING: f32 = 0.01;

    /// Below this linear speed a falling tile can be crushed
    pub const REST_SPEED: f32 = 1.0;
    /// Crush damage range (health per second, per qualifying contact)
    pub const CRUSH_DAMAGE_MIN: f32 = 20.0;
    pub const CRUSH_DAMAGE_MAX: f32 = 30.0;
    /// Health lost per second by every falling tile
    pub const FALLING_DECAY: f32 = 10.0;

    /// Ground-row cells closer than `width * DOOR_FRACTION` to the center become doors
    pub const DOOR_FRACTION: f32 = 0.1;

    /// Thickness of the ground slab below y = 0
    pub const GROUND_THICKNESS: f32 = 20.0;
    /// Default gravity (world units/s², pointing down)
    pub const GRAVITY: f32 = 9.81;
}

/// World-space center of the tile at grid cell (x, y).
///
/// Row 0 sits on the ground surface at y = 0; rows grow upward.
#[inline]
pub fn tile_center(x: i32, y: i32) -> Vec2 {
    use consts::TILE_SIZE;
    Vec2::new(x as f32 * TILE_SIZE, (y as f32 + 0.5) * TILE_SIZE)
}

/// Ratio of `value` to `max`, clamped to [0, 1]; zero when `max` is not positive
#[inline]
pub fn clamped_ratio(value: f32, max: f32) -> f32 {
    if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    }
}
