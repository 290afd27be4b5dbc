#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Poke RPG simulation.
//!
//! The world holds the generated hex tiles and their two monotonic flags.
//! Flags only ever flip from `false` to `true`, and a cleared tile is always
//! explored.

use std::collections::HashMap;

use poke_rpg_core::{BiomeId, Command, Event, GeneratedHex, HexCoord, HexId, HexRejection};

#[derive(Clone, Debug)]
struct Tile {
    id: HexId,
    coord: HexCoord,
    biome: BiomeId,
    explored: bool,
    cleared: bool,
}

/// Represents the authoritative world state.
#[derive(Clone, Debug, Default)]
pub struct World {
    tiles: Vec<Tile>,
    index: HashMap<HexId, usize>,
}

impl World {
    /// Creates a world from generated tiles, keeping their order.
    ///
    /// A repeated id keeps its first occurrence.
    #[must_use]
    pub fn new(hexes: Vec<GeneratedHex>) -> Self {
        let mut world = Self::default();
        for hex in hexes {
            if world.index.contains_key(&hex.id) {
                tracing::debug!(hex = %hex.id, "duplicate generated hex ignored");
                continue;
            }
            let _ = world.index.insert(hex.id.clone(), world.tiles.len());
            world.tiles.push(Tile {
                id: hex.id,
                coord: hex.coord,
                biome: hex.biome,
                explored: false,
                cleared: false,
            });
        }
        world
    }

    /// Marks a tile explored; returns whether anything changed.
    pub fn explore(&mut self, hex: &HexId) -> bool {
        match self.tile_mut(hex) {
            Some(tile) if !tile.explored => {
                tile.explored = true;
                true
            }
            _ => false,
        }
    }

    /// Marks a tile cleared, and explored with it; returns whether `cleared` changed.
    pub fn mark_cleared(&mut self, hex: &HexId) -> bool {
        match self.tile_mut(hex) {
            Some(tile) if !tile.cleared => {
                tile.explored = true;
                tile.cleared = true;
                true
            }
            _ => false,
        }
    }

    /// Number of tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether the world holds no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    fn tile(&self, hex: &HexId) -> Option<&Tile> {
        self.index.get(hex).and_then(|&position| self.tiles.get(position))
    }

    fn tile_mut(&mut self, hex: &HexId) -> Option<&mut Tile> {
        let position = *self.index.get(hex)?;
        self.tiles.get_mut(position)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ExploreHex { hex } => {
            let Some(tile) = world.tile(&hex) else {
                reject(hex, HexRejection::UnknownHex, out_events);
                return;
            };
            if tile.explored {
                reject(hex, HexRejection::AlreadyExplored, out_events);
                return;
            }
            if world.explore(&hex) {
                out_events.push(Event::HexExplored { hex });
            }
        }
        Command::MarkHexCleared { hex } => {
            let Some(tile) = world.tile(&hex) else {
                reject(hex, HexRejection::UnknownHex, out_events);
                return;
            };
            if tile.cleared {
                reject(hex, HexRejection::AlreadyCleared, out_events);
                return;
            }
            let was_explored = tile.explored;
            if world.mark_cleared(&hex) {
                if !was_explored {
                    out_events.push(Event::HexExplored { hex: hex.clone() });
                }
                out_events.push(Event::HexCleared { hex });
            }
        }
    }
}

fn reject(hex: HexId, reason: HexRejection, out_events: &mut Vec<Event>) {
    if reason == HexRejection::UnknownHex {
        tracing::debug!(%hex, "ignored command for unknown hex");
    }
    out_events.push(Event::HexCommandRejected { hex, reason });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use poke_rpg_core::{BiomeId, HexId, HexTileView, WorldSnapshot};

    use super::{Tile, World};

    /// Captures every tile in generation order.
    #[must_use]
    pub fn snapshot(world: &World) -> WorldSnapshot {
        WorldSnapshot::from_views(world.tiles.iter().map(view).collect())
    }

    /// View of a single tile, if it exists.
    #[must_use]
    pub fn tile(world: &World, hex: &HexId) -> Option<HexTileView> {
        world.tile(hex).map(view)
    }

    /// Biome of a tile, if it exists.
    #[must_use]
    pub fn biome<'a>(world: &'a World, hex: &HexId) -> Option<&'a BiomeId> {
        world.tile(hex).map(|tile| &tile.biome)
    }

    /// First tile, in generation order, that has not been explored yet.
    #[must_use]
    pub fn next_unexplored(world: &World) -> Option<&HexId> {
        world
            .tiles
            .iter()
            .find(|tile| !tile.explored)
            .map(|tile| &tile.id)
    }

    /// Number of explored and cleared tiles.
    #[must_use]
    pub fn progress(world: &World) -> (usize, usize) {
        world
            .tiles
            .iter()
            .fold((0, 0), |(explored, cleared), tile| {
                (
                    explored + usize::from(tile.explored),
                    cleared + usize::from(tile.cleared),
                )
            })
    }

    fn view(tile: &Tile) -> HexTileView {
        HexTileView {
            id: tile.id.clone(),
            biome: tile.biome.clone(),
            coord: tile.coord,
            explored: tile.explored,
            cleared: tile.cleared,
        }
    }
}
