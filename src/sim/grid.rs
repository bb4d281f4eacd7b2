//! Building generation
//!
//! A building is a `width x height` lattice of Static tiles. Rows are built
//! from the roof down so the tile above each cell already exists when the
//! cell is created, which is what wires the above-links collapse follows.

use std::collections::HashMap;

use super::registry::{EntityId, Registry};
use super::tile::{Tile, TileCoord, TileKind};
use super::world::World;
use crate::consts::DOOR_FRACTION;

/// Whether a ground-row cell is one of the entrance cells near the footprint center
pub fn is_door_cell(x: i32, y: i32, origin_x: i32, width: i32) -> bool {
    let center = origin_x as f32 + width as f32 * 0.5;
    y == 0 && (x as f32 - center).abs().floor() < width as f32 * DOOR_FRACTION
}

/// Material of cell (x, y) in a building starting at `origin_x`
pub fn tile_kind_at(x: i32, y: i32, origin_x: i32, width: i32) -> TileKind {
    if is_door_cell(x, y, origin_x, width) {
        TileKind::Door
    } else if (x + y).rem_euclid(2) == 1 {
        TileKind::Wall
    } else {
        TileKind::Window
    }
}

/// Generate a building of Static tiles spanning columns `[origin_x, origin_x + width)`.
///
/// Every tile is registered and counted as standing city health. Non-positive
/// dimensions build nothing.
pub fn build_building(registry: &mut Registry<World>, world: &mut World, origin_x: i32, width: i32, height: i32) {
    if width <= 0 || height <= 0 {
        return;
    }

    let mut lookup: HashMap<TileCoord, EntityId> = HashMap::new();
    for y in (0..height).rev() {
        for x in origin_x..origin_x + width {
            let coord = TileCoord::new(x, y);
            let kind = tile_kind_at(x, y, origin_x, width);
            let above = lookup.get(&coord.above()).copied();

            let tile = Tile::new_static(world, coord, kind, above);
            let id = registry.add(Box::new(tile));
            lookup.insert(coord, id);
            world.city.add_standing();
        }
    }

    log::debug!(
        "Built {}x{} building at column {} ({} tiles)",
        width,
        height,
        origin_x,
        lookup.len()
    );
}
