//! Destructible city simulation
//!
//! All gameplay logic lives here. Physics and drawing are reached only
//! through the `Physics` and `Scene` traits:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order of the registry)

pub mod grid;
pub mod ground;
pub mod physics;
pub mod registry;
pub mod scene;
pub mod simulation;
pub mod tile;
pub mod world;

#[cfg(test)]
pub(crate) mod testing;

pub use grid::{build_building, is_door_cell, tile_kind_at};
pub use ground::Ground;
pub use physics::{BodyId, BodyKind, BodyTags, Contact, FixtureDef, FixtureId, Physics, RapierPhysics};
pub use registry::{Entity, EntityId, Registry};
pub use scene::{HeadlessScene, Material, Scene, Sprite, SpriteId};
pub use simulation::Simulation;
pub use tile::{Tile, TileCoord, TileKind, TileState, collapse, detonate};
pub use world::{CityHealth, RngState, World};
