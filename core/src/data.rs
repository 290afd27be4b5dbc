//! Immutable reference data consumed by the engine: Pokémon templates and
//! biome configuration. The engine never mutates these values.

use serde::{Deserialize, Serialize};

use crate::{BiomeId, PokemonId};

/// Elemental type of a Pokémon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Normal type.
    Normal,
    /// Fire type.
    Fire,
    /// Water type.
    Water,
    /// Electric type.
    Electric,
    /// Grass type.
    Grass,
    /// Ice type.
    Ice,
    /// Fighting type.
    Fighting,
    /// Poison type.
    Poison,
    /// Ground type.
    Ground,
    /// Flying type.
    Flying,
    /// Psychic type.
    Psychic,
    /// Bug type.
    Bug,
    /// Rock type.
    Rock,
    /// Ghost type.
    Ghost,
    /// Dragon type.
    Dragon,
    /// Dark type.
    Dark,
    /// Steel type.
    Steel,
    /// Fairy type.
    Fairy,
}

/// Base statistics of a Pokémon template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseStats {
    /// Maximum hit points.
    pub hp: u32,
    /// Physical attack.
    pub atk: u32,
    /// Physical defense.
    pub def: u32,
    /// Special attack.
    #[serde(default = "one")]
    pub sp_atk: u32,
    /// Special defense.
    #[serde(default = "one")]
    pub sp_def: u32,
    /// Speed, which drives gauge gain.
    #[serde(default = "one")]
    pub spd: u32,
}

/// Immutable Pokémon template shared by every combatant created from it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PokemonTemplate {
    /// Stable identifier of the template.
    pub id: PokemonId,
    /// Display name.
    pub name: String,
    /// Primary and optional secondary type.
    #[serde(rename = "type")]
    pub types: (ElementType, Option<ElementType>),
    /// Level used for display and future scaling.
    #[serde(default = "one")]
    pub level: u32,
    /// Base statistics.
    pub base_stats: BaseStats,
}

/// Coarse classification of a biome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BiomeKind {
    /// Wooded terrain.
    Forest,
    /// Open grassland.
    Plains,
    /// High, rocky terrain.
    Mountain,
}

/// Rarity bucket of an encounter entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    /// Most frequent bucket.
    Common,
    /// Occasional encounters.
    Uncommon,
    /// Least frequent bucket.
    Rare,
}

impl Rarity {
    /// Every rarity bucket, from most to least frequent.
    pub const ALL: [Rarity; 3] = [Rarity::Common, Rarity::Uncommon, Rarity::Rare];
}

/// Single entry of an encounter pool.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterEntry {
    /// Template that may be encountered.
    pub pokemon_id: PokemonId,
}

/// Rarity-bucketed list of Pokémon that may appear in a biome.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EncounterPool {
    /// Frequent encounters.
    #[serde(default)]
    pub common: Vec<EncounterEntry>,
    /// Occasional encounters.
    #[serde(default)]
    pub uncommon: Vec<EncounterEntry>,
    /// Infrequent encounters.
    #[serde(default)]
    pub rare: Vec<EncounterEntry>,
}

impl EncounterPool {
    /// Entries listed under the provided rarity.
    #[must_use]
    pub fn entries(&self, rarity: Rarity) -> &[EncounterEntry] {
        match rarity {
            Rarity::Common => &self.common,
            Rarity::Uncommon => &self.uncommon,
            Rarity::Rare => &self.rare,
        }
    }
}

/// Inclusive level range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelRange {
    /// Lowest level.
    pub min: u32,
    /// Highest level.
    pub max: u32,
}

/// Level bonus granted per rarity bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RarityLevelBonus {
    /// Levels added to common encounters.
    #[serde(default)]
    pub common: u32,
    /// Levels added to uncommon encounters.
    #[serde(default)]
    pub uncommon: u32,
    /// Levels added to rare encounters.
    #[serde(default)]
    pub rare: u32,
}

/// Static configuration of a biome.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiomeConfig {
    /// Stable identifier referenced by generated tiles.
    pub id: BiomeId,
    /// Display name.
    pub name: String,
    /// Coarse classification.
    #[serde(rename = "type")]
    pub kind: BiomeKind,
    /// Display colour, as a CSS hex string.
    pub color: String,
    /// Pokémon that may be encountered.
    #[serde(default)]
    pub encounter_pool: EncounterPool,
    /// Victories required to clear a tile of this biome.
    #[serde(alias = "clearTreshold")]
    pub clear_threshold: u32,
    /// Victories required before travelling further.
    pub travel_threshold: u32,
    /// Level range of wild encounters.
    pub level_range: LevelRange,
    /// Extra levels per rarity bucket.
    #[serde(default, alias = "levelRarityAddition")]
    pub rarity_level_bonus: RarityLevelBonus,
}

const fn one() -> u32 {
    1
}
