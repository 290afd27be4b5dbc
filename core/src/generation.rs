//! World generation configuration.
//!
//! The field layout mirrors the exported preset format exactly so that a
//! preset written by an external tool reproduces the same world when handed
//! back to the generator. Out-of-range values are accepted here and clamped by
//! the generator.

use serde::{Deserialize, Serialize};

use crate::{BiomeId, HexCoord};

/// Seed used when no other seed is supplied.
pub const DEFAULT_SEED: &str = "dev";

/// Identifier of the single chunk present in the default configuration.
pub const DEFAULT_CHUNK_ID: &str = "chunk-0-0";

/// Available generator algorithms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneratorKind {
    /// Best-first blob growth scored by jittered Voronoi distance.
    #[default]
    #[serde(rename = "centered_voronoi_noise_v1")]
    CenteredVoronoiNoiseV1,
}

/// Parameters of the centred Voronoi-noise generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CenteredVoronoiNoiseConfig {
    /// Candidate boundary distance in hex steps from the centre.
    pub max_distance: i32,
    /// Fraction of `max_distance` used as the target radius, in `[0, 1]`.
    pub coverage: f64,
    /// Number of Voronoi sites.
    pub points_count: i32,
    /// Maximum distance from the centre at which sites may spawn.
    pub sites_max_distance: i32,
    /// Hash-noise jitter strength in hex-distance units; zero yields pure Voronoi.
    pub jitter: f64,
    /// Minimum spacing between sites; derived from the site radius when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_site_distance: Option<i32>,
    /// Rejection-sampling budget for spaced site placement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_site_sample_attempts: Option<i32>,
}

impl Default for CenteredVoronoiNoiseConfig {
    fn default() -> Self {
        Self {
            max_distance: 8,
            coverage: 0.75,
            points_count: 12,
            sites_max_distance: 6,
            jitter: 0.35,
            min_site_distance: Some(2),
            max_site_sample_attempts: Some(1200),
        }
    }
}

/// Generator selection plus its parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Algorithm to run.
    #[serde(rename = "type")]
    pub kind: GeneratorKind,
    /// Parameters of the Voronoi-noise generator.
    pub centered_voronoi_noise: CenteredVoronoiNoiseConfig,
}

/// Partial override of [`CenteredVoronoiNoiseConfig`]; absent fields inherit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoronoiOverride {
    /// Overrides `max_distance`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_distance: Option<i32>,
    /// Overrides `coverage`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f64>,
    /// Overrides `points_count`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_count: Option<i32>,
    /// Overrides `sites_max_distance`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sites_max_distance: Option<i32>,
    /// Overrides `jitter`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter: Option<f64>,
    /// Overrides `min_site_distance`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_site_distance: Option<i32>,
    /// Overrides `max_site_sample_attempts`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_site_sample_attempts: Option<i32>,
}

/// Partial override of [`GeneratorConfig`] attached to a single chunk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorOverride {
    /// Replacement algorithm, if any.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<GeneratorKind>,
    /// Field-wise parameter overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub centered_voronoi_noise: Option<VoronoiOverride>,
}

/// Configuration of a single spatial chunk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkConfig {
    /// Identifier prefixed onto every tile id of the chunk.
    pub id: String,
    /// Chunk position on the chunk lattice.
    pub coord: HexCoord,
    /// Biomes distributed over the chunk's Voronoi sites.
    #[serde(default)]
    pub biome_list: Vec<BiomeId>,
    /// Optional overrides merged over the base generator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_generator: Option<GeneratorOverride>,
}

/// Complete, serialisable world generation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldGenerationConfig {
    /// Seed string hashed into every chunk seed.
    pub seed: String,
    /// Radius of every chunk; clamps each chunk's `max_distance`.
    pub chunk_radius: i32,
    /// Chunks to generate, in generation order.
    #[serde(default)]
    pub chunks: Vec<ChunkConfig>,
    /// Parameters shared by all chunks.
    pub base_generator: GeneratorConfig,
}

impl WorldGenerationConfig {
    /// Assigns the provided biome list to every chunk that has none.
    #[must_use]
    pub fn with_default_biomes(mut self, biomes: &[BiomeId]) -> Self {
        for chunk in &mut self.chunks {
            if chunk.biome_list.is_empty() {
                chunk.biome_list = biomes.to_vec();
            }
        }
        self
    }
}

impl Default for WorldGenerationConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED.to_owned(),
            chunk_radius: 8,
            chunks: vec![ChunkConfig {
                id: DEFAULT_CHUNK_ID.to_owned(),
                coord: HexCoord::ORIGIN,
                biome_list: Vec::new(),
                custom_generator: None,
            }],
            base_generator: GeneratorConfig::default(),
        }
    }
}

/// Resolves a chunk's generator by merging its override over the base.
#[must_use]
pub fn merge_generator_config(
    base: &GeneratorConfig,
    override_config: Option<&GeneratorOverride>,
) -> GeneratorConfig {
    let Some(override_config) = override_config else {
        return base.clone();
    };

    let base_noise = &base.centered_voronoi_noise;
    let noise = match &override_config.centered_voronoi_noise {
        None => base_noise.clone(),
        Some(patch) => CenteredVoronoiNoiseConfig {
            max_distance: patch.max_distance.unwrap_or(base_noise.max_distance),
            coverage: patch.coverage.unwrap_or(base_noise.coverage),
            points_count: patch.points_count.unwrap_or(base_noise.points_count),
            sites_max_distance: patch
                .sites_max_distance
                .unwrap_or(base_noise.sites_max_distance),
            jitter: patch.jitter.unwrap_or(base_noise.jitter),
            min_site_distance: patch.min_site_distance.or(base_noise.min_site_distance),
            max_site_sample_attempts: patch
                .max_site_sample_attempts
                .or(base_noise.max_site_sample_attempts),
        },
    };

    GeneratorConfig {
        kind: override_config.kind.unwrap_or(base.kind),
        centered_voronoi_noise: noise,
    }
}
