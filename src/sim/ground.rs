//! Terrain under the city
//!
//! Solid spans of ground tagged for crush damage. Columns not covered by a
//! span (water) have no body, so debris falling there never gets crushed.

use std::any::Any;

use glam::Vec2;

use super::physics::{BodyId, BodyKind, BodyTags, FixtureDef};
use super::registry::{Entity, Registry};
use super::scene::{Material, Sprite, SpriteId};
use super::world::World;
use crate::config::GroundSpan;
use crate::consts::*;

#[derive(Debug)]
struct Slab {
    body: BodyId,
    sprite: SpriteId,
}

/// Static ground slabs, one per span, top surface at y = 0
#[derive(Debug)]
pub struct Ground {
    slabs: Vec<Slab>,
}

impl Ground {
    pub fn new(world: &mut World, spans: &[GroundSpan]) -> Self {
        let slabs = spans
            .iter()
            .filter(|span| span.to > span.from)
            .map(|span| {
                // Span edges sit on tile edges, tile x is the column center
                let left = (span.from as f32 - 0.5) * TILE_SIZE;
                let right = (span.to as f32 - 0.5) * TILE_SIZE;
                let size = Vec2::new(right - left, GROUND_THICKNESS);
                let center = Vec2::new((left + right) * 0.5, -GROUND_THICKNESS * 0.5);

                let body = world.physics.create_body(BodyKind::Static, center, BodyTags::GROUND);
                world.physics.create_fixture(
                    body,
                    &FixtureDef {
                        half_extents: size * 0.5,
                        density: 1.0,
                        restitution: 0.0,
                        friction: TILE_FRICTION,
                    },
                );
                let sprite = world.scene.attach(Sprite {
                    material: Material::Ground,
                    size,
                    position: center,
                    rotation: 0.0,
                });
                Slab { body, sprite }
            })
            .collect::<Vec<_>>();

        log::debug!("Ground laid with {} spans", slabs.len());
        Self { slabs }
    }

    pub fn span_count(&self) -> usize {
        self.slabs.len()
    }

    pub fn bodies(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.slabs.iter().map(|slab| slab.body)
    }
}

impl Entity<World> for Ground {
    fn advance(&mut self, _registry: &mut Registry<World>, _world: &mut World, _dt: f32, _time: f64) -> bool {
        true
    }

    fn on_remove(&mut self, world: &mut World) {
        for slab in self.slabs.drain(..) {
            world.scene.detach(slab.sprite);
            world.physics.destroy_body(slab.body);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
