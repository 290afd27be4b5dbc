//! Static reference data: biome table, Pokémon registry and player template.

use std::{
    collections::{btree_map::Entry, BTreeMap},
    sync::Arc,
};

use poke_rpg_core::{BiomeConfig, BiomeId, PokemonId, PokemonTemplate};
use poke_rpg_system_encounter::PokemonRegistry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading reference data.
#[derive(Debug, Error)]
pub enum ReferenceDataError {
    /// The document is not valid reference data JSON.
    #[error("could not parse reference data: {0}")]
    Parse(#[from] serde_json::Error),
    /// Two biomes share an identifier.
    #[error("biome '{0}' is defined more than once")]
    DuplicateBiome(BiomeId),
    /// Two templates share an identifier.
    #[error("pokemon '{0}' is defined more than once")]
    DuplicatePokemon(PokemonId),
    /// A template has no hit points, so it could never lose a fight.
    #[error("pokemon '{0}' has zero hp")]
    ZeroHp(PokemonId),
    /// The player template is missing from the registry.
    #[error("player pokemon '{0}' is not in the registry")]
    MissingPlayer(PokemonId),
}

/// Serialised layout of the reference data document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceDocument {
    /// Biome table, in declaration order.
    pub biomes: Vec<BiomeConfig>,
    /// Every Pokémon template, the player's included.
    pub pokemon: Vec<PokemonTemplate>,
    /// Template the player fights with.
    pub player: PokemonId,
}

/// Validated, immutable reference data consumed by the engine loop.
#[derive(Clone, Debug)]
pub struct ReferenceData {
    biome_order: Vec<BiomeId>,
    biomes: BTreeMap<BiomeId, BiomeConfig>,
    pokemon: PokemonRegistry,
    player: Arc<PokemonTemplate>,
}

impl ReferenceData {
    /// Parses and validates a JSON reference document.
    pub fn from_json(json: &str) -> Result<Self, ReferenceDataError> {
        let document: ReferenceDocument = serde_json::from_str(json)?;
        Self::try_from(document)
    }

    /// Biome identifiers in declaration order.
    #[must_use]
    pub fn biome_ids(&self) -> &[BiomeId] {
        &self.biome_order
    }

    /// Looks up a biome.
    #[must_use]
    pub fn biome(&self, id: &BiomeId) -> Option<&BiomeConfig> {
        self.biomes.get(id)
    }

    /// Registry of every template.
    #[must_use]
    pub fn pokemon(&self) -> &PokemonRegistry {
        &self.pokemon
    }

    /// Template the player fights with.
    #[must_use]
    pub fn player(&self) -> &Arc<PokemonTemplate> {
        &self.player
    }
}

impl TryFrom<ReferenceDocument> for ReferenceData {
    type Error = ReferenceDataError;

    fn try_from(document: ReferenceDocument) -> Result<Self, Self::Error> {
        let mut biome_order = Vec::with_capacity(document.biomes.len());
        let mut biomes = BTreeMap::new();
        for biome in document.biomes {
            match biomes.entry(biome.id.clone()) {
                Entry::Occupied(_) => return Err(ReferenceDataError::DuplicateBiome(biome.id)),
                Entry::Vacant(slot) => {
                    biome_order.push(biome.id.clone());
                    let _ = slot.insert(biome);
                }
            }
        }

        let mut pokemon = PokemonRegistry::new();
        for template in document.pokemon {
            if template.base_stats.hp == 0 {
                return Err(ReferenceDataError::ZeroHp(template.id));
            }
            match pokemon.entry(template.id.clone()) {
                Entry::Occupied(_) => return Err(ReferenceDataError::DuplicatePokemon(template.id)),
                Entry::Vacant(slot) => {
                    let _ = slot.insert(Arc::new(template));
                }
            }
        }

        let player = pokemon
            .get(&document.player)
            .cloned()
            .ok_or(ReferenceDataError::MissingPlayer(document.player))?;

        Ok(Self {
            biome_order,
            biomes,
            pokemon,
            player,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r##"{
        "biomes": [{
            "id": "verdant-forest",
            "name": "Verdant Forest",
            "type": "FOREST",
            "color": "#8B5E3C",
            "encounterPool": { "COMMON": [{ "pokemonId": "enemy-001" }] },
            "clearTreshold": 10,
            "travelThreshold": 5,
            "levelRange": { "min": 4, "max": 7 },
            "levelRarityAddition": { "COMMON": 0, "UNCOMMON": 2, "RARE": 4 }
        }],
        "pokemon": [
            { "id": "player-001", "name": "Sprout", "type": ["grass", null],
              "baseStats": { "hp": 25, "atk": 8, "def": 6 } },
            { "id": "enemy-001", "name": "Emberling", "type": ["fire", null],
              "baseStats": { "hp": 18, "atk": 9, "def": 4 } }
        ],
        "player": "player-001"
    }"##;

    #[test]
    fn parses_minimal_document() {
        let data = ReferenceData::from_json(MINIMAL).expect("document parses");
        let forest = BiomeId::from("verdant-forest");
        assert_eq!(data.biome_ids(), &[forest.clone()]);
        assert_eq!(data.biome(&forest).map(|b| b.clear_threshold), Some(10));
        assert_eq!(data.pokemon().len(), 2);
        assert_eq!(data.player().name, "Sprout");
    }

    #[test]
    fn missing_player_is_rejected() {
        let json = MINIMAL.replace(r#""player": "player-001""#, r#""player": "player-404""#);
        let error = ReferenceData::from_json(&json).expect_err("player is missing");
        assert!(matches!(
            error,
            ReferenceDataError::MissingPlayer(id) if id.as_str() == "player-404"
        ));
    }

    #[test]
    fn zero_hp_template_is_rejected() {
        let json = MINIMAL.replace(r#""hp": 18"#, r#""hp": 0"#);
        let error = ReferenceData::from_json(&json).expect_err("enemy has no hp");
        assert!(matches!(&error, ReferenceDataError::ZeroHp(id) if id.as_str() == "enemy-001"));
        assert_eq!(error.to_string(), "pokemon 'enemy-001' has zero hp");
    }

    #[test]
    fn duplicate_templates_are_rejected() {
        let json = MINIMAL.replace("enemy-001\", \"name\"", "player-001\", \"name\"");
        let error = ReferenceData::from_json(&json).expect_err("duplicate id");
        assert!(matches!(error, ReferenceDataError::DuplicatePokemon(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let error = ReferenceData::from_json("{").expect_err("truncated document");
        assert!(matches!(error, ReferenceDataError::Parse(_)));
    }
}
