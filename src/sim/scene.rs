//! Presentation collaborator
//!
//! Entities describe what they look like with a `Sprite` and keep the handle
//! the scene returns. The simulation never renders; a renderer implements
//! `Scene` and draws whatever is attached.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Handle to a sprite attached to a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpriteId(pub u32);

/// Material used to draw a sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Material {
    Wall,
    Window,
    Door,
    Ground,
}

/// A textured quad
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub material: Material,
    pub size: Vec2,
    pub position: Vec2,
    pub rotation: f32,
}

pub trait Scene {
    fn attach(&mut self, sprite: Sprite) -> SpriteId;
    fn detach(&mut self, id: SpriteId);
    fn set_pose(&mut self, id: SpriteId, position: Vec2, rotation: f32);
    /// Current state of an attached sprite
    fn sprite(&self, id: SpriteId) -> Option<&Sprite>;
    /// Number of attached sprites
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scene that only keeps sprite state (no drawing)
#[derive(Debug, Default)]
pub struct HeadlessScene {
    sprites: BTreeMap<SpriteId, Sprite>,
    next_id: u32,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attached sprites in attach order
    pub fn sprites(&self) -> impl Iterator<Item = (SpriteId, &Sprite)> {
        self.sprites.iter().map(|(id, sprite)| (*id, sprite))
    }
}

impl Scene for HeadlessScene {
    fn attach(&mut self, sprite: Sprite) -> SpriteId {
        let id = SpriteId(self.next_id);
        self.next_id += 1;
        self.sprites.insert(id, sprite);
        id
    }

    fn detach(&mut self, id: SpriteId) {
        if self.sprites.remove(&id).is_none() {
            log::warn!("Sprite {:?} detached twice", id);
        }
    }

    fn set_pose(&mut self, id: SpriteId, position: Vec2, rotation: f32) {
        if let Some(sprite) = self.sprites.get_mut(&id) {
            sprite.position = position;
            sprite.rotation = rotation;
        }
    }

    fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(&id)
    }

    fn len(&self) -> usize {
        self.sprites.len()
    }
}
