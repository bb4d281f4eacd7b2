//! Ordered registry of simulated entities
//!
//! Every entity that lives in the simulation (tiles, ground, anything the game
//! layers on top) is held here in insertion order and advanced once per frame.
//! The registry owns removal: an entity leaves either because its `advance`
//! reported it dead or because something removed it explicitly, and in both
//! cases its `on_remove` release runs exactly once.

use std::any::Any;

use serde::{Deserialize, Serialize};

/// Stable identity of a registered entity. Never reused within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Capability contract shared by every simulated entity.
///
/// `W` is the context entities advance and release against (physics world,
/// scene, RNG, ...). The registry itself is handed to `advance` so an entity
/// can add or remove others during the frame.
pub trait Entity<W>: Any {
    /// Advance one frame. Returning `false` retires the entity.
    fn advance(&mut self, registry: &mut Registry<W>, world: &mut W, dt: f32, time: f64) -> bool;

    /// Release everything the entity owns in `world`.
    fn on_remove(&mut self, _world: &mut W) {}

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct Slot<W> {
    id: EntityId,
    /// `None` only while the entity is being advanced
    entity: Option<Box<dyn Entity<W>>>,
}

/// Insertion-ordered entity collection driving the frame loop
pub struct Registry<W> {
    slots: Vec<Slot<W>>,
    next_id: u64,
    /// Index of the entity currently inside `advance`, if any
    cursor: Option<usize>,
    /// Set when the entity at `cursor` removed itself mid-advance
    cursor_evicted: bool,
}

impl<W: 'static> Default for Registry<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: 'static> Registry<W> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_id: 1,
            cursor: None,
            cursor_evicted: false,
        }
    }

    /// Append an entity. Entities added during `advance_all` are visited in the same pass.
    pub fn add(&mut self, entity: Box<dyn Entity<W>>) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.slots.push(Slot {
            id,
            entity: Some(entity),
        });
        id
    }

    /// Remove an entity and release it.
    ///
    /// Returns `false` if `id` is not registered. When an entity removes itself
    /// from inside its own `advance`, its release runs as soon as that call returns.
    pub fn remove(&mut self, id: EntityId, world: &mut W) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let slot = self.slots.remove(index);

        if let Some(cursor) = self.cursor {
            if index < cursor {
                self.cursor = Some(cursor - 1);
            } else if index == cursor {
                self.cursor_evicted = true;
            }
        }

        if let Some(mut entity) = slot.entity {
            entity.on_remove(world);
        }
        true
    }

    /// Remove every entity, front to back, releasing each one
    pub fn clear(&mut self, world: &mut W) {
        while let Some(id) = self.slots.first().map(|slot| slot.id) {
            self.remove(id, world);
        }
    }

    /// Advance every entity once, in registry order, retiring the dead.
    pub fn advance_all(&mut self, world: &mut W, dt: f32, time: f64) {
        let mut index = 0;
        while index < self.slots.len() {
            let Some(mut entity) = self.slots[index].entity.take() else {
                index += 1;
                continue;
            };

            self.cursor = Some(index);
            self.cursor_evicted = false;
            let alive = entity.advance(self, world, dt, time);
            // Removals before the cursor during `advance` shift it left
            let cursor = self.cursor.take().unwrap_or(index);

            if std::mem::take(&mut self.cursor_evicted) {
                entity.on_remove(world);
                index = cursor;
            } else if alive {
                self.slots[cursor].entity = Some(entity);
                index = cursor + 1;
            } else {
                self.slots.remove(cursor);
                entity.on_remove(world);
                index = cursor;
            }
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Registered ids in registry order
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots.iter().map(|slot| slot.id)
    }

    /// Typed access to a registered entity (not available while it is being advanced)
    pub fn get<T: 'static>(&self, id: EntityId) -> Option<&T> {
        let index = self.position(id)?;
        self.slots[index].entity.as_ref()?.as_any().downcast_ref::<T>()
    }

    pub fn get_mut<T: 'static>(&mut self, id: EntityId) -> Option<&mut T> {
        let index = self.position(id)?;
        self.slots[index]
            .entity
            .as_mut()?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// All registered entities of type `T`, in registry order
    pub fn iter_of<T: 'static>(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.slots.iter().filter_map(|slot| {
            let entity = slot.entity.as_ref()?.as_any().downcast_ref::<T>()?;
            Some((slot.id, entity))
        })
    }

    fn position(&self, id: EntityId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.id == id)
    }
}
