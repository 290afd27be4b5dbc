#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Poke RPG simulation engine.
//!
//! This crate defines the vocabulary that connects the procedural world
//! generator, the authoritative world, the combat systems and the adapters
//! that host them. Adapters submit [`Command`] values describing desired world
//! mutations, the world executes those commands via its `apply` entry point and
//! broadcasts [`Event`] values. Read access always goes through immutable
//! snapshots such as [`WorldSnapshot`] and [`EncounterSnapshot`], never through
//! mutable references into engine state.

use std::{collections::BTreeMap, fmt, time::Duration};

use serde::{Deserialize, Serialize};

pub mod data;
pub mod generation;
pub mod listeners;

pub use data::{
    BaseStats, BiomeConfig, BiomeKind, ElementType, EncounterEntry, EncounterPool, LevelRange,
    PokemonTemplate, Rarity, RarityLevelBonus,
};
pub use generation::{
    merge_generator_config, CenteredVoronoiNoiseConfig, ChunkConfig, GeneratorConfig,
    GeneratorKind, GeneratorOverride, VoronoiOverride, WorldGenerationConfig,
};
pub use listeners::{Listeners, Subscription};

/// Axial offsets of the six neighbours of a hex, in the fixed expansion order.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that a hex be marked as explored.
    ExploreHex {
        /// Identifier of the hex to explore.
        hex: HexId,
    },
    /// Requests that a hex be marked as cleared.
    MarkHexCleared {
        /// Identifier of the hex to clear.
        hex: HexId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a hex flipped from unexplored to explored.
    HexExplored {
        /// Identifier of the explored hex.
        hex: HexId,
    },
    /// Confirms that a hex flipped from uncleared to cleared.
    HexCleared {
        /// Identifier of the cleared hex.
        hex: HexId,
    },
    /// Reports that a hex command produced no state change.
    HexCommandRejected {
        /// Identifier carried by the rejected command.
        hex: HexId,
        /// Specific reason the command was ignored.
        reason: HexRejection,
    },
}

/// Reasons a hex command may leave the world untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HexRejection {
    /// No hex with the provided identifier exists.
    UnknownHex,
    /// The hex was already explored.
    AlreadyExplored,
    /// The hex was already cleared.
    AlreadyCleared,
}

/// Location of a hex expressed in axial coordinates.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct HexCoord {
    q: i32,
    r: i32,
}

impl HexCoord {
    /// The centre of every region.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Creates a new axial coordinate.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Axial column component.
    #[must_use]
    pub const fn q(&self) -> i32 {
        self.q
    }

    /// Axial row component.
    #[must_use]
    pub const fn r(&self) -> i32 {
        self.r
    }

    /// Derived cube component, `-q - r`.
    #[must_use]
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Computes the hex distance between two coordinates.
    #[must_use]
    pub fn distance(self, other: HexCoord) -> u32 {
        let dq = self.q.abs_diff(other.q);
        let dr = self.r.abs_diff(other.r);
        let ds = self.s().abs_diff(other.s());
        dq.max(dr).max(ds)
    }

    /// Returns the six adjacent coordinates in [`NEIGHBOR_OFFSETS`] order.
    #[must_use]
    pub fn neighbors(self) -> [HexCoord; 6] {
        NEIGHBOR_OFFSETS.map(|(dq, dr)| HexCoord::new(self.q + dq, self.r + dr))
    }

    /// Stable identifier used for tiles of a single region, `q{q}-r{r}`.
    #[must_use]
    pub fn region_id(self) -> HexId {
        HexId::new(format!("q{}-r{}", self.q, self.r))
    }

    /// Identifier of a tile that belongs to the named chunk.
    #[must_use]
    pub fn chunk_id(self, chunk: &str) -> HexId {
        HexId::new(format!("{chunk}-q{}-r{}", self.q, self.r))
    }
}

/// Stable identifier of a hex tile.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HexId(String);

impl HexId {
    /// Wraps the provided string as a hex identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the textual form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HexId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Data-driven biome identifier, backed by [`BiomeConfig::id`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BiomeId(String);

impl BiomeId {
    /// Biome assigned when generation runs without any biome list.
    pub const UNKNOWN: &'static str = "unknown";

    /// Wraps the provided string as a biome identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the textual form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BiomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BiomeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifier of a Pokémon template in the reference registry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PokemonId(String);

impl PokemonId {
    /// Wraps the provided string as a Pokémon identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the textual form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PokemonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PokemonId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One of the two participants of a fight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The player's combatant.
    Player,
    /// The opposing combatant.
    Enemy,
}

impl Side {
    /// Returns the other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => f.write_str("player"),
            Self::Enemy => f.write_str("enemy"),
        }
    }
}

/// Context delivered to tick subscribers for every fixed simulation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickContext {
    /// Monotonic index of the tick, starting at 1.
    pub tick_index: u64,
    /// Fixed duration of a single tick.
    pub dt: Duration,
    /// Cumulative simulated time including this tick.
    pub sim_time: Duration,
}

/// Hex produced by the world generator, before any exploration state exists.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneratedHex {
    /// Stable identifier of the tile.
    pub id: HexId,
    /// Global axial coordinate of the tile.
    pub coord: HexCoord,
    /// Biome assigned by nearest-site lookup.
    pub biome: BiomeId,
}

/// Immutable view of a single tile used for queries.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexTileView {
    /// Stable identifier of the tile.
    pub id: HexId,
    /// Biome assigned during generation.
    pub biome: BiomeId,
    /// Global axial coordinate of the tile.
    pub coord: HexCoord,
    /// Whether the player explored the tile.
    pub explored: bool,
    /// Whether the tile's encounter was cleared.
    pub cleared: bool,
}

/// Read-only snapshot of the world: ordered ids plus an id-indexed view map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldSnapshot {
    ids: Vec<HexId>,
    by_id: BTreeMap<HexId, HexTileView>,
}

impl WorldSnapshot {
    /// Creates a snapshot from views listed in their stable iteration order.
    #[must_use]
    pub fn from_views(views: Vec<HexTileView>) -> Self {
        let ids = views.iter().map(|view| view.id.clone()).collect();
        let by_id = views
            .into_iter()
            .map(|view| (view.id.clone(), view))
            .collect();
        Self { ids, by_id }
    }

    /// Identifiers in stable generation order.
    #[must_use]
    pub fn ids(&self) -> &[HexId] {
        &self.ids
    }

    /// Looks up the view of a single tile.
    #[must_use]
    pub fn get(&self, id: &HexId) -> Option<&HexTileView> {
        self.by_id.get(id)
    }

    /// Iterator over tile views in stable generation order.
    pub fn iter(&self) -> impl Iterator<Item = &HexTileView> {
        self.ids.iter().filter_map(|id| self.by_id.get(id))
    }

    /// Number of tiles captured by the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Reports whether the snapshot contains no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Immutable view of a combatant's state.
#[derive(Clone, Debug, PartialEq)]
pub struct CombatantView {
    /// Display name of the template.
    pub name: String,
    /// Level of the template.
    pub level: u32,
    /// Speed stat of the template.
    pub speed: u32,
    /// Current hit points.
    pub hp: u32,
    /// Maximum hit points.
    pub hp_max: u32,
    /// Current gauge value.
    pub gauge: f64,
    /// Gauge threshold required to act.
    pub gauge_max: f64,
    /// Gauge gained every tick.
    pub gauge_gain_per_tick: f64,
}

/// Condensed outcome of the current fight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FightOutcomeView {
    /// Whether the player won.
    pub victory: bool,
    /// Ticks the fight lasted.
    pub ticks: u64,
}

/// Immutable view of the active encounter.
#[derive(Clone, Debug, PartialEq)]
pub struct EncounterSnapshot {
    /// Hex the encounter belongs to.
    pub hex: HexId,
    /// One-based index of the current fight.
    pub fight_index: u32,
    /// Number of victories required to clear the hex.
    pub fight_target: u32,
    /// Whether ticks currently advance the fight.
    pub running: bool,
    /// Whether the current fight produced a result.
    pub ended: bool,
    /// Outcome of the current fight, once ended.
    pub result: Option<FightOutcomeView>,
    /// Player combatant state.
    pub player: CombatantView,
    /// Enemy combatant state.
    pub enemy: CombatantView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_distance_matches_cube_metric() {
        let origin = HexCoord::ORIGIN;
        let target = HexCoord::new(3, -1);
        assert_eq!(origin.distance(target), 3);
        assert_eq!(target.distance(origin), 3);
        assert_eq!(HexCoord::new(-2, 2).distance(HexCoord::new(2, -2)), 4);
        assert_eq!(HexCoord::new(1, 1).s(), -2);
    }

    #[test]
    fn neighbors_follow_fixed_order_and_are_adjacent() {
        let center = HexCoord::new(2, -3);
        let neighbors = center.neighbors();
        assert_eq!(neighbors[0], HexCoord::new(3, -3));
        assert_eq!(neighbors[5], HexCoord::new(2, -2));
        assert!(neighbors.iter().all(|n| n.distance(center) == 1));
    }

    #[test]
    fn identifiers_embed_coordinates() {
        let coord = HexCoord::new(-4, 7);
        assert_eq!(coord.region_id().as_str(), "q-4-r7");
        assert_eq!(coord.chunk_id("chunk-0-0").as_str(), "chunk-0-0-q-4-r7");
    }

    #[test]
    fn world_snapshot_preserves_insertion_order() {
        let views = vec![view("q1-r0"), view("q0-r0"), view("q0-r1")];
        let snapshot = WorldSnapshot::from_views(views);
        let order: Vec<&str> = snapshot.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(order, vec!["q1-r0", "q0-r0", "q0-r1"]);
        assert!(snapshot.get(&HexId::from("q0-r0")).is_some());
        assert!(snapshot.get(&HexId::from("missing")).is_none());
    }

    #[test]
    fn side_opponent_is_involutive() {
        assert_eq!(Side::Player.opponent(), Side::Enemy);
        assert_eq!(Side::Enemy.opponent().opponent(), Side::Enemy);
        assert_eq!(Side::Player.to_string(), "player");
    }

    fn view(id: &str) -> HexTileView {
        HexTileView {
            id: HexId::from(id),
            biome: BiomeId::from("verdant-forest"),
            coord: HexCoord::ORIGIN,
            explored: false,
            cleared: false,
        }
    }
}
