//! Structural tiles and collapse propagation
//!
//! A tile is one cell of a building. Static tiles are fixed bodies that hold
//! the lattice up; when one is detonated, every tile stacked above it along
//! the frozen above-links is swapped for a Falling tile with a dynamic body.
//! Falling tiles decay every frame and get crushed while resting on the
//! ground or on a lower tile, until their health runs out.

use std::any::Any;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::physics::{BodyId, BodyKind, BodyTags, FixtureDef, FixtureId};
use super::registry::{Entity, EntityId, Registry};
use super::scene::{Material, Sprite, SpriteId};
use super::world::World;
use crate::consts::*;
use crate::{clamped_ratio, tile_center};

/// Facade material of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Window,
    Door,
}

impl TileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TileKind::Wall => "wall",
            TileKind::Window => "window",
            TileKind::Door => "door",
        }
    }

    pub fn material(&self) -> Material {
        match self {
            TileKind::Wall => Material::Wall,
            TileKind::Window => Material::Window,
            TileKind::Door => Material::Door,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileState {
    /// Fixed in place, anchoring the tiles above
    Static,
    /// Dynamic body, decaying until destroyed
    Falling,
}

/// Grid cell of a tile (x = column, y = row above ground)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn above(self) -> Self {
        Self::new(self.x, self.y + 1)
    }

    /// World-space center of this cell
    pub fn center(self) -> Vec2 {
        tile_center(self.x, self.y)
    }
}

/// A destructible building tile
#[derive(Debug)]
pub struct Tile {
    coord: TileCoord,
    kind: TileKind,
    health: f32,
    state: TileState,
    body: BodyId,
    fixture: FixtureId,
    sprite: SpriteId,
    /// Tile generated directly above this one; never updated after construction
    above: Option<EntityId>,
}

fn tile_fixture() -> FixtureDef {
    FixtureDef {
        half_extents: Vec2::splat(TILE_SIZE * 0.5),
        density: TILE_DENSITY,
        restitution: TILE_RESTITUTION,
        friction: TILE_FRICTION,
    }
}

impl Tile {
    /// Build a fixed tile that supports `above`
    pub fn new_static(world: &mut World, coord: TileCoord, kind: TileKind, above: Option<EntityId>) -> Self {
        Self::spawn(world, coord, kind, TileState::Static, above)
    }

    /// Build a dynamic tile, kicked by a random impulse at a random point on its face
    pub fn new_falling(world: &mut World, coord: TileCoord, kind: TileKind) -> Self {
        let tile = Self::spawn(world, coord, kind, TileState::Falling, None);

        let rng = &mut world.rng;
        let impulse = Vec2::new(
            rng.random_range(-COLLAPSE_IMPULSE..=COLLAPSE_IMPULSE),
            rng.random_range(-COLLAPSE_IMPULSE..=COLLAPSE_IMPULSE),
        );
        let half = TILE_SIZE * 0.5;
        let offset = Vec2::new(rng.random_range(-half..=half), rng.random_range(-half..=half));

        let physics = &mut world.physics;
        physics.apply_impulse(tile.body, impulse, coord.center() + offset);
        physics.set_linear_damping(tile.body, FALLING_LINEAR_DAMPING);
        physics.set_angular_damping(tile.body, FALLING_ANGULAR_DAMPING);

        tile
    }

    fn spawn(world: &mut World, coord: TileCoord, kind: TileKind, state: TileState, above: Option<EntityId>) -> Self {
        let center = coord.center();
        let body_kind = match state {
            TileState::Static => BodyKind::Static,
            TileState::Falling => BodyKind::Dynamic,
        };
        let body = world.physics.create_body(body_kind, center, BodyTags::BUILDING_BLOCK);
        let fixture = world.physics.create_fixture(body, &tile_fixture());
        let sprite = world.scene.attach(Sprite {
            material: kind.material(),
            size: Vec2::splat(TILE_SIZE),
            position: world.physics.world_center(body),
            rotation: world.physics.angle(body),
        });

        Self {
            coord,
            kind,
            health: TILE_MAX_HEALTH,
            state,
            body,
            fixture,
            sprite,
            above,
        }
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn kind(&self) -> TileKind {
        self.kind
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    /// Health as a fraction of a fresh tile, clamped to [0, 1]
    pub fn health_ratio(&self) -> f32 {
        clamped_ratio(self.health, TILE_MAX_HEALTH)
    }

    pub fn state(&self) -> TileState {
        self.state
    }

    pub fn is_static(&self) -> bool {
        self.state == TileState::Static
    }

    pub fn above(&self) -> Option<EntityId> {
        self.above
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn fixture(&self) -> FixtureId {
        self.fixture
    }

    pub fn sprite(&self) -> SpriteId {
        self.sprite
    }

    /// Crush damage for this frame: one independent roll per qualifying contact
    fn crush_damage(&self, world: &mut World, center: Vec2, dt: f32) -> f32 {
        let mut damage = 0.0;
        for contact in world.physics.touching_contacts(self.fixture) {
            let tags = contact.other_tags;
            let below = tags.building_block && contact.other_center.y < center.y;
            if tags.ground || below {
                damage += dt * world.rng.random_range(CRUSH_DAMAGE_MIN..CRUSH_DAMAGE_MAX);
            }
        }
        damage
    }
}

impl Entity<World> for Tile {
    fn advance(&mut self, _registry: &mut Registry<World>, world: &mut World, dt: f32, _time: f64) -> bool {
        if self.state == TileState::Static {
            return true;
        }
        let dt = dt.max(0.0);

        let center = world.physics.world_center(self.body);
        let angle = world.physics.angle(self.body);
        world.scene.set_pose(self.sprite, center, angle);
        // Sleeping bodies stop reporting contacts
        world.physics.set_awake(self.body, true);

        let speed = world.physics.linear_velocity(self.body).length();
        if speed < REST_SPEED {
            let crush = self.crush_damage(world, center, dt);
            if crush > 0.0 {
                log::trace!("Tile ({}, {}) crushed for {:.3}", self.coord.x, self.coord.y, crush);
            }
            self.health -= crush;
        }
        self.health -= dt * FALLING_DECAY;

        self.health > 0.0
    }

    fn on_remove(&mut self, world: &mut World) {
        world.scene.detach(self.sprite);
        world.physics.destroy_fixture(self.fixture);
        world.physics.destroy_body(self.body);
        if self.state == TileState::Static {
            world.city.lose_standing();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Destroy a tile. A Static tile also brings down every tile chained above it.
///
/// Detonating a Falling tile removes only that tile. Returns `false` if `id`
/// is not a live tile.
pub fn detonate(registry: &mut Registry<World>, world: &mut World, id: EntityId) -> bool {
    let Some(tile) = registry.get::<Tile>(id) else {
        return false;
    };
    let propagate = tile.is_static();
    let mut next = tile.above;
    log::debug!(
        "Detonating {} tile at ({}, {})",
        tile.kind.as_str(),
        tile.coord.x,
        tile.coord.y
    );

    if propagate {
        let mut collapsed = 0;
        while let Some(above) = next {
            // A link to a tile that is gone ends the chain
            let Some(tile) = registry.get::<Tile>(above) else {
                break;
            };
            next = tile.above;
            if collapse(registry, world, above).is_some() {
                collapsed += 1;
            }
        }
        if collapsed > 0 {
            log::debug!("Collapsed {} tiles above", collapsed);
        }
    }

    registry.remove(id, world)
}

/// Replace a tile with a Falling tile of the same coordinates and kind.
///
/// The replacement has no above-link, so it never propagates a collapse of its own.
pub fn collapse(registry: &mut Registry<World>, world: &mut World, id: EntityId) -> Option<EntityId> {
    let (coord, kind) = registry.get::<Tile>(id).map(|tile| (tile.coord, tile.kind))?;
    registry.remove(id, world);
    let falling = Tile::new_falling(world, coord, kind);
    Some(registry.add(Box::new(falling)))
}
