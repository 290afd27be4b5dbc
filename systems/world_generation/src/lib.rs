#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural hex world generator.
//!
//! A region is grown from the origin of a hexagonal candidate pool by
//! best-first expansion over a jittered Voronoi shape score, then every
//! accepted tile receives the biome of its nearest (noise-perturbed) site.
//! Multi-chunk worlds run the same algorithm per chunk with a chunk-derived
//! seed and translate chunk-local coordinates into a shared global lattice.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashSet},
};

use poke_rpg_core::{
    merge_generator_config, BiomeId, CenteredVoronoiNoiseConfig, ChunkConfig, GeneratedHex,
    HexCoord, HexId, WorldGenerationConfig,
};
use poke_rpg_system_seed::{chunk_seed, noise2d_signed, Rng};

/// Salt mixed into chunk seeds.
pub const CHUNK_SEED_SALT: &str = "continental";

/// Largest candidate and chunk radius honoured; larger values are clamped.
pub const MAX_RADIUS: i32 = 1024;

const SHAPE_NOISE_SALT: u32 = 1337;
const DEFAULT_SAMPLE_ATTEMPTS: i32 = 600;
const MIN_SAMPLE_ATTEMPTS: i32 = 50;

/// Voronoi site used during generation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VoronoiSite {
    /// Chunk-local coordinate of the site.
    pub coord: HexCoord,
    /// Biome assigned to every tile nearest to this site.
    pub biome: BiomeId,
}

/// Sites plus the parameters needed to score coordinates against them.
#[derive(Clone, Debug, PartialEq)]
pub struct VoronoiContext {
    sites: Vec<VoronoiSite>,
    jitter: f64,
    seed: String,
}

impl VoronoiContext {
    /// Places sites for a region whose candidate pool has the given radius.
    ///
    /// Sites are spaced by rejection sampling until the attempt budget runs
    /// out; any remaining sites are then placed without the spacing rule.
    #[must_use]
    pub fn place(
        seed: &str,
        biomes: &[BiomeId],
        candidate_radius: i32,
        config: &CenteredVoronoiNoiseConfig,
    ) -> Self {
        let mut rng = Rng::from_seed(seed);
        let jitter = config.jitter.max(0.0);
        let sites_radius = candidate_radius.min(config.sites_max_distance).max(0);
        let points_count = usize::try_from(config.points_count.max(1)).unwrap_or(1);
        let min_site_distance = config
            .min_site_distance
            .unwrap_or_else(|| default_min_site_distance(sites_radius, points_count));
        let max_attempts = config
            .max_site_sample_attempts
            .unwrap_or(DEFAULT_SAMPLE_ATTEMPTS)
            .max(MIN_SAMPLE_ATTEMPTS);

        let mut shuffled = if biomes.is_empty() {
            vec![BiomeId::new(BiomeId::UNKNOWN)]
        } else {
            biomes.to_vec()
        };
        rng.shuffle(&mut shuffled);

        let mut sites: Vec<VoronoiSite> = Vec::with_capacity(points_count);
        let mut attempts = 0;
        while sites.len() < points_count && attempts < max_attempts {
            attempts += 1;
            let candidate = random_coord_in_radius(&mut rng, sites_radius);
            let crowded = sites.iter().any(|site| {
                i64::from(candidate.distance(site.coord)) < i64::from(min_site_distance)
            });
            if crowded {
                continue;
            }
            let biome = shuffled[sites.len() % shuffled.len()].clone();
            sites.push(VoronoiSite {
                coord: candidate,
                biome,
            });
        }

        let spaced = sites.len();
        while sites.len() < points_count {
            let candidate = random_coord_in_radius(&mut rng, sites_radius);
            let biome = shuffled[sites.len() % shuffled.len()].clone();
            sites.push(VoronoiSite {
                coord: candidate,
                biome,
            });
        }

        tracing::trace!(
            seed,
            sites = sites.len(),
            spaced,
            attempts,
            "placed voronoi sites"
        );

        Self {
            sites,
            jitter,
            seed: seed.to_owned(),
        }
    }

    /// Sites in placement order.
    #[must_use]
    pub fn sites(&self) -> &[VoronoiSite] {
        &self.sites
    }

    /// Resolved jitter strength.
    #[must_use]
    pub const fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Seed the sites were placed with.
    #[must_use]
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Region-growth score; lower scores are accepted first.
    #[must_use]
    pub fn shape_score(&self, coord: HexCoord) -> f64 {
        let nearest = self
            .sites
            .iter()
            .map(|site| coord.distance(site.coord))
            .min()
            .map_or(f64::INFINITY, f64::from);
        nearest + self.noise(coord, SHAPE_NOISE_SALT)
    }

    /// Biome of the nearest site, with per-site noise added to each distance.
    ///
    /// The first site wins on equal scores.
    #[must_use]
    pub fn biome_at(&self, coord: HexCoord) -> &BiomeId {
        let mut best: Option<(&VoronoiSite, f64)> = None;
        for (index, site) in self.sites.iter().enumerate() {
            let salt = u32::try_from(index).unwrap_or(u32::MAX);
            let score = f64::from(coord.distance(site.coord)) + self.noise(coord, salt);
            match best {
                Some((_, best_score)) if score >= best_score => {}
                _ => best = Some((site, score)),
            }
        }
        best.map_or_else(|| &self.sites[0].biome, |(site, _)| &site.biome)
    }

    fn noise(&self, coord: HexCoord, salt: u32) -> f64 {
        if self.jitter == 0.0 {
            return 0.0;
        }
        noise2d_signed(&self.seed, coord.q(), coord.r(), salt) * self.jitter
    }
}

/// Tiles of a single generated region.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionResult {
    /// Tiles in selection order, identified as `q{q}-r{r}`.
    pub tiles: Vec<GeneratedHex>,
    /// Sites the region was shaped and coloured by.
    pub voronoi: VoronoiContext,
}

/// Hex ids produced by one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkHexMapping {
    /// Identifier of the chunk.
    pub chunk_id: String,
    /// Tiles of the chunk in selection order.
    pub hex_ids: Vec<HexId>,
}

/// Output of a multi-chunk world generation run.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationResult {
    /// Every tile, chunk by chunk, each in selection order.
    pub tiles: Vec<GeneratedHex>,
    /// Sites of the first chunk that produced any tile, for debug overlays.
    pub voronoi: Option<VoronoiContext>,
    /// Per-chunk tile ids.
    pub chunks: Vec<ChunkHexMapping>,
}

/// Number of tiles in a full hexagon of the given radius.
#[must_use]
pub fn tiles_for_radius(radius: i32) -> usize {
    let radius = usize::try_from(radius.max(0)).unwrap_or(0);
    1 + 3 * radius * (radius + 1)
}

/// Generates one region centred on the origin.
#[must_use]
pub fn generate_region(
    seed: &str,
    config: &CenteredVoronoiNoiseConfig,
    biomes: &[BiomeId],
) -> RegionResult {
    let candidate_radius = config.max_distance.clamp(0, MAX_RADIUS);
    let (selected, voronoi) = grow_region(seed, config, biomes, candidate_radius);
    let tiles = selected
        .into_iter()
        .map(|coord| GeneratedHex {
            id: coord.region_id(),
            coord,
            biome: voronoi.biome_at(coord).clone(),
        })
        .collect();
    RegionResult { tiles, voronoi }
}

/// Generates every configured chunk and concatenates their tiles.
#[must_use]
pub fn generate_world(config: &WorldGenerationConfig) -> GenerationResult {
    let mut result = GenerationResult {
        tiles: Vec::new(),
        voronoi: None,
        chunks: Vec::with_capacity(config.chunks.len()),
    };

    for chunk in &config.chunks {
        let (tiles, voronoi) = generate_chunk(config, chunk);
        result.chunks.push(ChunkHexMapping {
            chunk_id: chunk.id.clone(),
            hex_ids: tiles.iter().map(|tile| tile.id.clone()).collect(),
        });
        if result.voronoi.is_none() && !tiles.is_empty() {
            result.voronoi = Some(voronoi);
        }
        result.tiles.extend(tiles);
    }

    tracing::debug!(
        seed = %config.seed,
        chunks = config.chunks.len(),
        tiles = result.tiles.len(),
        "generated world"
    );
    result
}

/// Translates a chunk-local coordinate onto the global lattice.
///
/// The chunk radius is clamped to `0..=MAX_RADIUS`; coordinates beyond the
/// `i32` range saturate.
#[must_use]
pub fn chunk_to_global(chunk_radius: i32, chunk: HexCoord, local: HexCoord) -> HexCoord {
    let spacing = i64::from(chunk_radius.clamp(0, MAX_RADIUS)) + 1;
    let q_axis = (2 * spacing - 1, -(spacing - 1));
    let r_axis = (spacing, -(2 * spacing - 1));
    let (cq, cr) = (i64::from(chunk.q()), i64::from(chunk.r()));
    HexCoord::new(
        saturate(i64::from(local.q()) + cq * q_axis.0 + cr * r_axis.0),
        saturate(i64::from(local.r()) + cq * q_axis.1 + cr * r_axis.1),
    )
}

fn saturate(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

fn generate_chunk(
    config: &WorldGenerationConfig,
    chunk: &ChunkConfig,
) -> (Vec<GeneratedHex>, VoronoiContext) {
    let generator = merge_generator_config(&config.base_generator, chunk.custom_generator.as_ref());
    let noise_config = &generator.centered_voronoi_noise;
    let candidate_radius = noise_config
        .max_distance
        .min(config.chunk_radius)
        .clamp(0, MAX_RADIUS);
    let seed = chunk_seed(
        &config.seed,
        chunk.coord.q(),
        chunk.coord.r(),
        CHUNK_SEED_SALT,
    );

    let (selected, voronoi) = grow_region(&seed, noise_config, &chunk.biome_list, candidate_radius);
    let tiles: Vec<GeneratedHex> = selected
        .into_iter()
        .map(|local| {
            let global = chunk_to_global(config.chunk_radius, chunk.coord, local);
            GeneratedHex {
                id: global.chunk_id(&chunk.id),
                coord: global,
                biome: voronoi.biome_at(local).clone(),
            }
        })
        .collect();

    tracing::debug!(
        chunk = %chunk.id,
        candidates = tiles_for_radius(candidate_radius),
        selected = tiles.len(),
        "generated chunk"
    );
    (tiles, voronoi)
}

fn grow_region(
    seed: &str,
    config: &CenteredVoronoiNoiseConfig,
    biomes: &[BiomeId],
    candidate_radius: i32,
) -> (Vec<HexCoord>, VoronoiContext) {
    let coverage = config.coverage.clamp(0.0, 1.0);
    let target_radius = (coverage * f64::from(candidate_radius)).floor() as i32;
    let target = tiles_for_radius(target_radius)
        .min(tiles_for_radius(candidate_radius))
        .max(1);

    let voronoi = VoronoiContext::place(seed, biomes, candidate_radius, config);
    let selected = grow_connected_blob(candidate_radius, target, |coord| {
        voronoi.shape_score(coord)
    });
    (selected, voronoi)
}

/// Best-first expansion from the origin, bounded to the candidate hexagon.
fn grow_connected_blob<F>(candidate_radius: i32, target: usize, score: F) -> Vec<HexCoord>
where
    F: Fn(HexCoord) -> f64,
{
    let radius = u32::try_from(candidate_radius).unwrap_or(0);
    let in_pool = |coord: HexCoord| coord.distance(HexCoord::ORIGIN) <= radius;

    let mut seen = HashSet::new();
    let mut frontier = BinaryHeap::new();
    let _ = seen.insert(HexCoord::ORIGIN);
    frontier.push(Frontier::new(HexCoord::ORIGIN, score(HexCoord::ORIGIN)));

    let mut selected = Vec::with_capacity(target);
    while selected.len() < target {
        let Some(node) = frontier.pop() else {
            break;
        };
        selected.push(node.coord);
        for neighbor in node.coord.neighbors() {
            if !in_pool(neighbor) || !seen.insert(neighbor) {
                continue;
            }
            frontier.push(Frontier::new(neighbor, score(neighbor)));
        }
    }
    selected
}

fn default_min_site_distance(sites_radius: i32, points_count: usize) -> i32 {
    let spread = (points_count as f64).sqrt().max(1.0);
    ((f64::from(sites_radius) / spread).floor() as i32).max(1)
}

fn random_coord_in_radius(rng: &mut Rng, radius: i32) -> HexCoord {
    let radius = i64::from(radius.max(0));
    let q = rng.int(-radius, radius);
    let r = rng.int((-radius).max(-q - radius), radius.min(-q + radius));
    HexCoord::new(q as i32, r as i32)
}

/// Frontier entry ordered so the heap pops the lowest score, then lowest id.
#[derive(Debug)]
struct Frontier {
    score: f64,
    id: HexId,
    coord: HexCoord,
}

impl Frontier {
    fn new(coord: HexCoord, score: f64) -> Self {
        Self {
            score,
            id: coord.region_id(),
            coord,
        }
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.id.cmp(&self.id))
    }
}
