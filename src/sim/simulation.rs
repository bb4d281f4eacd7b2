//! Level lifetime and frame stepping
//!
//! `Simulation` owns the registry and the world for one level. It is built
//! from a `CityConfig` at level start and torn down at level end; the game
//! loop calls `tick` once per fixed timestep.

use glam::Vec2;

use super::ground::Ground;
use super::grid::build_building;
use super::physics::Physics;
use super::registry::{EntityId, Registry};
use super::scene::Scene;
use super::tile::{self, Tile, TileCoord};
use super::world::World;
use crate::config::CityConfig;

pub struct Simulation {
    pub registry: Registry<World>,
    pub world: World,
    /// Fixed ticks since level start
    pub time_ticks: u64,
    /// Seconds since level start
    pub time: f64,
}

impl Simulation {
    /// Empty level over the given collaborators
    pub fn new(physics: Box<dyn Physics>, scene: Box<dyn Scene>, seed: u64) -> Self {
        Self {
            registry: Registry::new(),
            world: World::new(physics, scene, seed),
            time_ticks: 0,
            time: 0.0,
        }
    }

    /// Build ground and every building in `config`, then latch full city health
    pub fn from_config(config: &CityConfig, physics: Box<dyn Physics>, scene: Box<dyn Scene>) -> Self {
        let mut sim = Self::new(physics, scene, config.seed);

        let ground = Ground::new(&mut sim.world, &config.ground);
        sim.registry.add(Box::new(ground));

        for b in &config.buildings {
            sim.build(b.origin_x, b.width, b.height);
        }
        sim.world.city.latch_max();

        log::info!(
            "Level built: {} buildings, {} tiles, {} bodies",
            config.buildings.len(),
            sim.tile_count(),
            sim.world.physics.body_count()
        );
        sim
    }

    /// Generate one building
    pub fn build(&mut self, origin_x: i32, width: i32, height: i32) {
        build_building(&mut self.registry, &mut self.world, origin_x, width, height);
    }

    /// Step physics, then advance every entity once
    pub fn tick(&mut self, dt: f32) {
        self.world.physics.step(dt);
        self.time_ticks += 1;
        self.time += dt as f64;
        self.registry.advance_all(&mut self.world, dt, self.time);
    }

    /// Detonate a tile by id. See [`tile::detonate`].
    pub fn detonate(&mut self, id: EntityId) -> bool {
        tile::detonate(&mut self.registry, &mut self.world, id)
    }

    /// Detonate the Static tile standing at `coord`, if any
    pub fn detonate_at(&mut self, coord: TileCoord) -> bool {
        match self.tile_at(coord) {
            Some(id) => self.detonate(id),
            None => false,
        }
    }

    /// Live Static tile at `coord`
    pub fn tile_at(&self, coord: TileCoord) -> Option<EntityId> {
        self.registry
            .iter_of::<Tile>()
            .find(|(_, tile)| tile.is_static() && tile.coord() == coord)
            .map(|(id, _)| id)
    }

    /// Live tiles, Static and Falling
    pub fn tile_count(&self) -> usize {
        self.registry.iter_of::<Tile>().count()
    }

    pub fn falling_count(&self) -> usize {
        self.registry
            .iter_of::<Tile>()
            .filter(|(_, tile)| !tile.is_static())
            .count()
    }

    /// Centers of every live Falling tile
    pub fn debris_positions(&self) -> Vec<Vec2> {
        self.registry
            .iter_of::<Tile>()
            .filter(|(_, tile)| !tile.is_static())
            .map(|(_, tile)| self.world.physics.world_center(tile.body()))
            .collect()
    }

    /// Fraction of the city still standing
    pub fn city_ratio(&self) -> f32 {
        self.world.city.ratio()
    }

    /// Release every entity (level end)
    pub fn teardown(&mut self) {
        let count = self.registry.len();
        self.registry.clear(&mut self.world);
        log::info!("Level torn down ({} entities released)", count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildingFootprint, GroundSpan};
    use crate::consts::*;
    use crate::sim::scene::HeadlessScene;
    use crate::sim::testing::{ScriptState, ScriptedPhysics};
    use std::cell::RefCell;
    use std::rc::Rc;
    use crate::sim::tile::TileState;

    fn small_city() -> CityConfig {
        CityConfig {
            seed: 9,
            gravity: GRAVITY,
            ground: vec![GroundSpan { from: -10, to: 10 }],
            buildings: vec![
                BuildingFootprint {
                    origin_x: -6,
                    width: 3,
                    height: 4,
                },
                BuildingFootprint {
                    origin_x: 2,
                    width: 2,
                    height: 5,
                },
            ],
        }
    }

    fn scripted(config: &CityConfig) -> Simulation {
        scripted_with_state(config).0
    }

    fn scripted_with_state(config: &CityConfig) -> (Simulation, Rc<RefCell<ScriptState>>) {
        let (physics, state) = ScriptedPhysics::new();
        let sim = Simulation::from_config(config, Box::new(physics), Box::new(HeadlessScene::new()));
        (sim, state)
    }

    #[test]
    fn test_from_config() {
        let sim = scripted(&small_city());

        assert_eq!(sim.tile_count(), 22);
        // Ground plus every tile
        assert_eq!(sim.registry.len(), 23);
        assert_eq!(sim.world.physics.body_count(), 23);
        assert_eq!(sim.world.city.max, 22);
        assert_eq!(sim.city_ratio(), 1.0);
    }

    #[test]
    fn test_empty_city_ratio_is_zero() {
        let config = CityConfig {
            buildings: Vec::new(),
            ..small_city()
        };
        let sim = scripted(&config);
        assert_eq!(sim.tile_count(), 0);
        assert_eq!(sim.city_ratio(), 0.0);
    }

    #[test]
    fn test_detonate_at() {
        let mut sim = scripted(&small_city());

        assert!(sim.detonate_at(TileCoord::new(2, 1)));
        assert_eq!(sim.falling_count(), 3);
        assert!(sim.tile_at(TileCoord::new(2, 1)).is_none());
        assert!(sim.tile_at(TileCoord::new(2, 2)).is_none());
        assert!(sim.tile_at(TileCoord::new(3, 2)).is_some());
        assert_eq!(sim.world.city.standing, 18);

        // Nothing standing there any more
        assert!(!sim.detonate_at(TileCoord::new(2, 1)));
        assert!(!sim.detonate_at(TileCoord::new(50, 0)));
    }

    #[test]
    fn test_tick_advances_clock_and_retires_debris() {
        let (mut sim, script) = scripted_with_state(&small_city());
        sim.detonate_at(TileCoord::new(-5, 0));
        assert_eq!(sim.falling_count(), 3);

        // Base decay alone destroys a falling tile within 10 seconds
        let ticks = (10.0 / SIM_DT) as u64 + 10;
        for _ in 0..ticks {
            sim.tick(SIM_DT);
        }

        assert_eq!(sim.time_ticks, ticks);
        assert_eq!(script.borrow().steps as u64, ticks);
        assert!((sim.time - ticks as f64 * SIM_DT as f64).abs() < 1e-6);
        assert_eq!(sim.falling_count(), 0);
        assert_eq!(sim.tile_count(), 18);
        assert!(
            sim.registry
                .iter_of::<Tile>()
                .all(|(_, t)| t.state() == TileState::Static)
        );
    }

    #[test]
    fn test_teardown_releases_everything() {
        let mut sim = scripted(&small_city());
        sim.detonate_at(TileCoord::new(3, 0));
        sim.teardown();

        assert!(sim.registry.is_empty());
        assert_eq!(sim.world.physics.body_count(), 0);
        assert_eq!(sim.world.scene.len(), 0);
        assert_eq!(sim.world.city.standing, 0);
    }
}
