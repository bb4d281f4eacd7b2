//! Skyline entry point
//!
//! Builds a city from a JSON layout (or the default one), runs it headless on
//! the rapier backend, detonates the first building after a few seconds and
//! reports how the city holds up.
//!
//! Usage: `skyline [config.json] [seconds]`

use std::env;
use std::path::Path;

use glam::Vec2;

use skyline::CityConfig;
use skyline::consts::*;
use skyline::sim::{HeadlessScene, RapierPhysics, Simulation, TileCoord};

/// Wall-clock length of one presented frame
const FRAME_DT: f32 = 1.0 / 30.0;
/// Simulated time before the demolition charges go off
const DETONATE_AT: f64 = 5.0;
const DEFAULT_SECONDS: f64 = 20.0;

/// Fixed-timestep driver around a `Simulation`
struct Runner {
    sim: Simulation,
    accumulator: f32,
    charges: Vec<TileCoord>,
    detonated: bool,
    last_report: u64,
}

impl Runner {
    fn new(sim: Simulation, charges: Vec<TileCoord>) -> Self {
        Self {
            sim,
            accumulator: 0.0,
            charges,
            detonated: false,
            last_report: 0,
        }
    }

    /// Advance by one presented frame
    fn frame(&mut self, dt: f32) {
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.sim.tick(SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            if !self.detonated && self.sim.time >= DETONATE_AT {
                self.detonate();
            }
        }

        // Drop time we could not catch up on
        if substeps >= MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }

        let second = self.sim.time as u64;
        if second > self.last_report {
            self.last_report = second;
            self.report();
        }
    }

    fn detonate(&mut self) {
        self.detonated = true;
        for coord in &self.charges {
            if self.sim.detonate_at(*coord) {
                log::info!("Charge at ({}, {}) detonated", coord.x, coord.y);
            } else {
                log::warn!("No standing tile at ({}, {})", coord.x, coord.y);
            }
        }
    }

    fn report(&self) {
        log::info!(
            "t={:>3}s tiles={} falling={} city={:.1}%",
            self.last_report,
            self.sim.tile_count(),
            self.sim.falling_count(),
            self.sim.city_ratio() * 100.0
        );
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Skyline starting...");

    let mut args = env::args().skip(1);
    let config = match args.next() {
        Some(path) => CityConfig::load(Path::new(&path)),
        None => CityConfig::default(),
    };
    let seconds = match args.next().map(|s| s.parse::<f64>()) {
        Some(Ok(s)) if s > 0.0 => s,
        Some(_) => {
            log::warn!("Invalid duration, running {} seconds", DEFAULT_SECONDS);
            DEFAULT_SECONDS
        }
        None => DEFAULT_SECONDS,
    };

    // Knock out two cells of the first building: a column and its neighbour one row up
    let charges = config
        .buildings
        .first()
        .map(|b| vec![TileCoord::new(b.origin_x, 4), TileCoord::new(b.origin_x + 1, 5)])
        .unwrap_or_default();

    let physics = RapierPhysics::new(Vec2::new(0.0, -config.gravity));
    let sim = Simulation::from_config(&config, Box::new(physics), Box::new(HeadlessScene::new()));
    log::info!("City seeded with {}", config.seed);

    let mut runner = Runner::new(sim, charges);
    while runner.sim.time < seconds {
        runner.frame(FRAME_DT);
    }

    log::info!(
        "Finished after {} ticks, {:.1}% of the city standing",
        runner.sim.time_ticks,
        runner.sim.city_ratio() * 100.0
    );
    runner.sim.teardown();
}
