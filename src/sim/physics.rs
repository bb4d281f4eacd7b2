//! Physics collaborator
//!
//! The simulation talks to its rigid-body engine through the `Physics` trait.
//! `RapierPhysics` is the production backend; tests may substitute a scripted
//! double. Handles are opaque ids so entities never hold engine types.
//!
//! Every fixture is a box centered on its body, so a body's origin is its
//! world center.

use glam::Vec2;
use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};

/// Opaque handle to a rigid body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u64);

/// Opaque handle to a fixture (collision shape attached to a body)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FixtureId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Immovable, unaffected by forces
    Static,
    /// Integrated by the engine, subject to gravity and contacts
    Dynamic,
}

/// Classification flags carried by every body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BodyTags {
    pub building_block: bool,
    pub ground: bool,
}

impl BodyTags {
    pub const BUILDING_BLOCK: Self = Self {
        building_block: true,
        ground: false,
    };
    pub const GROUND: Self = Self {
        building_block: false,
        ground: true,
    };

    const BUILDING_BIT: u128 = 1;
    const GROUND_BIT: u128 = 1 << 1;

    /// Pack into engine user data
    pub fn pack(self) -> u128 {
        let mut bits = 0;
        if self.building_block {
            bits |= Self::BUILDING_BIT;
        }
        if self.ground {
            bits |= Self::GROUND_BIT;
        }
        bits
    }

    pub fn unpack(bits: u128) -> Self {
        Self {
            building_block: bits & Self::BUILDING_BIT != 0,
            ground: bits & Self::GROUND_BIT != 0,
        }
    }
}

/// Box-shaped fixture definition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixtureDef {
    pub half_extents: Vec2,
    pub density: f32,
    pub restitution: f32,
    pub friction: f32,
}

/// A touching contact as seen from one fixture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Body owning the opposing fixture
    pub other: BodyId,
    pub other_tags: BodyTags,
    /// World center of the opposing body
    pub other_center: Vec2,
}

/// Rigid-body engine contract consumed by the simulation.
///
/// Calls with stale handles are ignored.
pub trait Physics {
    fn create_body(&mut self, kind: BodyKind, position: Vec2, tags: BodyTags) -> BodyId;
    fn create_fixture(&mut self, body: BodyId, def: &FixtureDef) -> FixtureId;
    fn destroy_fixture(&mut self, fixture: FixtureId);
    /// Destroys the body and any fixtures still attached to it
    fn destroy_body(&mut self, body: BodyId);

    /// Apply a linear impulse at a world-space point
    fn apply_impulse(&mut self, body: BodyId, impulse: Vec2, point: Vec2);
    fn set_linear_damping(&mut self, body: BodyId, damping: f32);
    fn set_angular_damping(&mut self, body: BodyId, damping: f32);
    fn set_awake(&mut self, body: BodyId, awake: bool);

    fn world_center(&self, body: BodyId) -> Vec2;
    fn angle(&self, body: BodyId) -> f32;
    fn linear_velocity(&self, body: BodyId) -> Vec2;

    /// Contacts currently touching `fixture`
    fn touching_contacts(&self, fixture: FixtureId) -> Vec<Contact>;

    /// Integrate the world by `dt` seconds
    fn step(&mut self, dt: f32);
    /// Number of live bodies
    fn body_count(&self) -> usize;
}

impl From<RigidBodyHandle> for BodyId {
    fn from(handle: RigidBodyHandle) -> Self {
        let (index, generation) = handle.into_raw_parts();
        Self((generation as u64) << 32 | index as u64)
    }
}

impl From<BodyId> for RigidBodyHandle {
    fn from(id: BodyId) -> Self {
        RigidBodyHandle::from_raw_parts(id.0 as u32, (id.0 >> 32) as u32)
    }
}

impl From<ColliderHandle> for FixtureId {
    fn from(handle: ColliderHandle) -> Self {
        let (index, generation) = handle.into_raw_parts();
        Self((generation as u64) << 32 | index as u64)
    }
}

impl From<FixtureId> for ColliderHandle {
    fn from(id: FixtureId) -> Self {
        ColliderHandle::from_raw_parts(id.0 as u32, (id.0 >> 32) as u32)
    }
}

#[inline]
fn to_vector(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

#[inline]
fn to_vec2(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// `Physics` backed by a rapier2d world
pub struct RapierPhysics {
    gravity: Vector<Real>,
    physics_pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    islands: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl Default for RapierPhysics {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, -crate::consts::GRAVITY))
    }
}

impl RapierPhysics {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: to_vector(gravity),
            physics_pipeline: PhysicsPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    fn body(&self, body: BodyId) -> Option<&RigidBody> {
        let body = self.bodies.get(body.into());
        if body.is_none() {
            log::warn!("Stale body handle queried");
        }
        body
    }

    fn body_mut(&mut self, body: BodyId) -> Option<&mut RigidBody> {
        let body = self.bodies.get_mut(body.into());
        if body.is_none() {
            log::warn!("Stale body handle mutated");
        }
        body
    }
}

impl Physics for RapierPhysics {
    fn create_body(&mut self, kind: BodyKind, position: Vec2, tags: BodyTags) -> BodyId {
        let builder = match kind {
            BodyKind::Static => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
        };
        let rb = builder
            .translation(to_vector(position))
            .user_data(tags.pack())
            .build();

        self.bodies.insert(rb).into()
    }

    fn create_fixture(&mut self, body: BodyId, def: &FixtureDef) -> FixtureId {
        let coll = ColliderBuilder::cuboid(def.half_extents.x, def.half_extents.y)
            .density(def.density)
            .restitution(def.restitution)
            .friction(def.friction)
            .build();

        let handle = self
            .colliders
            .insert_with_parent(coll, body.into(), &mut self.bodies);
        // Mass must be current before the first impulse lands
        if let Some(rb) = self.bodies.get_mut(body.into()) {
            rb.recompute_mass_properties_from_colliders(&self.colliders);
        }
        handle.into()
    }

    fn destroy_fixture(&mut self, fixture: FixtureId) {
        let removed = self
            .colliders
            .remove(fixture.into(), &mut self.islands, &mut self.bodies, true);
        if removed.is_none() {
            log::warn!("Fixture {:?} already destroyed", fixture);
        }
    }

    fn destroy_body(&mut self, body: BodyId) {
        let removed = self.bodies.remove(
            body.into(),
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        if removed.is_none() {
            log::warn!("Body {:?} already destroyed", body);
        }
    }

    fn apply_impulse(&mut self, body: BodyId, impulse: Vec2, point: Vec2) {
        if let Some(rb) = self.body_mut(body) {
            rb.apply_impulse_at_point(to_vector(impulse), point![point.x, point.y], true);
        }
    }

    fn set_linear_damping(&mut self, body: BodyId, damping: f32) {
        if let Some(rb) = self.body_mut(body) {
            rb.set_linear_damping(damping);
        }
    }

    fn set_angular_damping(&mut self, body: BodyId, damping: f32) {
        if let Some(rb) = self.body_mut(body) {
            rb.set_angular_damping(damping);
        }
    }

    fn set_awake(&mut self, body: BodyId, awake: bool) {
        if let Some(rb) = self.body_mut(body) {
            if awake {
                rb.wake_up(true);
            } else {
                rb.sleep();
            }
        }
    }

    fn world_center(&self, body: BodyId) -> Vec2 {
        self.body(body)
            .map(|rb| to_vec2(rb.translation()))
            .unwrap_or(Vec2::ZERO)
    }

    fn angle(&self, body: BodyId) -> f32 {
        self.body(body).map(|rb| rb.rotation().angle()).unwrap_or(0.0)
    }

    fn linear_velocity(&self, body: BodyId) -> Vec2 {
        self.body(body)
            .map(|rb| to_vec2(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    fn touching_contacts(&self, fixture: FixtureId) -> Vec<Contact> {
        let handle: ColliderHandle = fixture.into();
        self.narrow_phase
            .contacts_with(handle)
            .filter(|pair| pair.has_any_active_contact)
            .filter_map(|pair| {
                let other = if pair.collider1 == handle {
                    pair.collider2
                } else {
                    pair.collider1
                };
                let parent = self.colliders.get(other)?.parent()?;
                let rb = self.bodies.get(parent)?;
                Some(Contact {
                    other: parent.into(),
                    other_tags: BodyTags::unpack(rb.user_data),
                    other_center: to_vec2(rb.translation()),
                })
            })
            .collect()
    }

    fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}
