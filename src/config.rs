//! City layout configuration
//!
//! Describes one level: RNG seed, gravity, the solid ground spans and the
//! footprint of every building. Stored as JSON next to the game data.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::GRAVITY;

/// Solid ground covering tile columns `[from, to)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundSpan {
    pub from: i32,
    pub to: i32,
}

/// One building: `width` columns starting at `origin_x`, `height` rows tall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingFootprint {
    pub origin_x: i32,
    pub width: i32,
    pub height: i32,
}

impl BuildingFootprint {
    pub fn tile_count(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }
}

/// Level description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    /// Seed for impulses and crush damage rolls
    pub seed: u64,
    /// Downward gravity (world units/s²)
    pub gravity: f32,
    pub ground: Vec<GroundSpan>,
    pub buildings: Vec<BuildingFootprint>,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            gravity: GRAVITY,

            // Two land masses with water between
            ground: vec![
                GroundSpan { from: -200, to: 70 },
                GroundSpan { from: 80, to: 200 },
            ],

            buildings: vec![
                BuildingFootprint {
                    origin_x: -80,
                    width: 6,
                    height: 10,
                },
                BuildingFootprint {
                    origin_x: -70,
                    width: 5,
                    height: 14,
                },
                BuildingFootprint {
                    origin_x: -58,
                    width: 8,
                    height: 7,
                },
                BuildingFootprint {
                    origin_x: 10,
                    width: 4,
                    height: 12,
                },
                BuildingFootprint {
                    origin_x: 21,
                    width: 7,
                    height: 15,
                },
                BuildingFootprint {
                    origin_x: 85,
                    width: 6,
                    height: 9,
                },
            ],
        }
    }
}

impl CityConfig {
    /// Total number of tiles the layout generates
    pub fn tile_count(&self) -> usize {
        self.buildings.iter().map(BuildingFootprint::tile_count).sum()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from a JSON file, falling back to the default layout
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!(
                        "Loaded city layout from {} ({} buildings)",
                        path.display(),
                        config.buildings.len()
                    );
                    return config;
                }
                Err(e) => log::warn!("Invalid city layout {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Cannot read city layout {}: {}", path.display(), e),
        }

        log::info!("Using default city layout");
        Self::default()
    }

    /// Save as pretty JSON
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        fs::write(path, json)?;
        log::info!("City layout saved to {}", path.display());
        Ok(())
    }
}
