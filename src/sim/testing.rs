//! Scripted physics double for unit tests
//!
//! Bodies never move on their own; tests place them, set velocities and wire
//! contacts by hand through the shared `ScriptState`.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use glam::Vec2;

use super::physics::{BodyId, BodyKind, BodyTags, Contact, FixtureDef, FixtureId, Physics};
use super::scene::HeadlessScene;
use super::world::World;

#[derive(Debug, Clone)]
pub struct ScriptedBody {
    pub kind: BodyKind,
    pub position: Vec2,
    pub angle: f32,
    pub velocity: Vec2,
    pub tags: BodyTags,
    pub awake: bool,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

#[derive(Debug, Default)]
pub struct ScriptState {
    next_id: u64,
    pub bodies: BTreeMap<BodyId, ScriptedBody>,
    pub fixtures: BTreeMap<FixtureId, BodyId>,
    /// Bodies touching each fixture
    pub contacts: HashMap<FixtureId, Vec<BodyId>>,
    pub impulses: Vec<(BodyId, Vec2, Vec2)>,
    pub destroyed_bodies: Vec<BodyId>,
    pub destroyed_fixtures: Vec<FixtureId>,
    pub steps: u32,
}

impl ScriptState {
    /// Add a bare body that only exists to be touched
    pub fn add_body(&mut self, position: Vec2, tags: BodyTags) -> BodyId {
        self.next_id += 1;
        let id = BodyId(self.next_id);
        self.bodies.insert(id, ScriptedBody::new(BodyKind::Static, position, tags));
        id
    }

    pub fn touch(&mut self, fixture: FixtureId, other: BodyId) {
        self.contacts.entry(fixture).or_default().push(other);
    }
}

impl ScriptedBody {
    fn new(kind: BodyKind, position: Vec2, tags: BodyTags) -> Self {
        Self {
            kind,
            position,
            angle: 0.0,
            velocity: Vec2::ZERO,
            tags,
            awake: true,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }
}

pub struct ScriptedPhysics {
    state: Rc<RefCell<ScriptState>>,
}

impl ScriptedPhysics {
    pub fn new() -> (Self, Rc<RefCell<ScriptState>>) {
        let state = Rc::new(RefCell::new(ScriptState::default()));
        (
            Self {
                state: state.clone(),
            },
            state,
        )
    }
}

/// World over scripted physics and a headless scene
pub fn scripted_world(seed: u64) -> (World, Rc<RefCell<ScriptState>>) {
    let (physics, state) = ScriptedPhysics::new();
    let world = World::new(Box::new(physics), Box::new(HeadlessScene::new()), seed);
    (world, state)
}

impl Physics for ScriptedPhysics {
    fn create_body(&mut self, kind: BodyKind, position: Vec2, tags: BodyTags) -> BodyId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = BodyId(state.next_id);
        state.bodies.insert(id, ScriptedBody::new(kind, position, tags));
        id
    }

    fn create_fixture(&mut self, body: BodyId, _def: &FixtureDef) -> FixtureId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = FixtureId(state.next_id);
        state.fixtures.insert(id, body);
        id
    }

    fn destroy_fixture(&mut self, fixture: FixtureId) {
        let mut state = self.state.borrow_mut();
        state.fixtures.remove(&fixture);
        state.contacts.remove(&fixture);
        state.destroyed_fixtures.push(fixture);
    }

    fn destroy_body(&mut self, body: BodyId) {
        let mut state = self.state.borrow_mut();
        state.bodies.remove(&body);
        state.fixtures.retain(|_, owner| *owner != body);
        state.destroyed_bodies.push(body);
    }

    fn apply_impulse(&mut self, body: BodyId, impulse: Vec2, point: Vec2) {
        self.state.borrow_mut().impulses.push((body, impulse, point));
    }

    fn set_linear_damping(&mut self, body: BodyId, damping: f32) {
        if let Some(b) = self.state.borrow_mut().bodies.get_mut(&body) {
            b.linear_damping = damping;
        }
    }

    fn set_angular_damping(&mut self, body: BodyId, damping: f32) {
        if let Some(b) = self.state.borrow_mut().bodies.get_mut(&body) {
            b.angular_damping = damping;
        }
    }

    fn set_awake(&mut self, body: BodyId, awake: bool) {
        if let Some(b) = self.state.borrow_mut().bodies.get_mut(&body) {
            b.awake = awake;
        }
    }

    fn world_center(&self, body: BodyId) -> Vec2 {
        self.state
            .borrow()
            .bodies
            .get(&body)
            .map(|b| b.position)
            .unwrap_or(Vec2::ZERO)
    }

    fn angle(&self, body: BodyId) -> f32 {
        self.state.borrow().bodies.get(&body).map(|b| b.angle).unwrap_or(0.0)
    }

    fn linear_velocity(&self, body: BodyId) -> Vec2 {
        self.state
            .borrow()
            .bodies
            .get(&body)
            .map(|b| b.velocity)
            .unwrap_or(Vec2::ZERO)
    }

    fn touching_contacts(&self, fixture: FixtureId) -> Vec<Contact> {
        let state = self.state.borrow();
        let Some(others) = state.contacts.get(&fixture) else {
            return Vec::new();
        };
        others
            .iter()
            .filter_map(|other| {
                let body = state.bodies.get(other)?;
                Some(Contact {
                    other: *other,
                    other_tags: body.tags,
                    other_center: body.position,
                })
            })
            .collect()
    }

    fn step(&mut self, _dt: f32) {
        self.state.borrow_mut().steps += 1;
    }

    fn body_count(&self) -> usize {
        self.state.borrow().bodies.len()
    }
}
