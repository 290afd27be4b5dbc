use std::{fmt, sync::Arc};

use poke_rpg_core::PokemonTemplate;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Strategy that picks the next enemy from an encounter pool.
pub trait EnemySelector: fmt::Debug {
    /// Picks one template, or `None` when the pool is empty.
    fn select<'a>(&mut self, pool: &'a [Arc<PokemonTemplate>])
        -> Option<&'a Arc<PokemonTemplate>>;
}

/// Uniform selection from a seeded stream; identical seeds replay identically.
#[derive(Clone, Debug)]
pub struct SeededSelector {
    rng: ChaCha8Rng,
}

impl SeededSelector {
    /// Creates a selector seeded with the provided value.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl EnemySelector for SeededSelector {
    fn select<'a>(
        &mut self,
        pool: &'a [Arc<PokemonTemplate>],
    ) -> Option<&'a Arc<PokemonTemplate>> {
        pool.choose(&mut self.rng)
    }
}

/// Uniform selection from the thread-local entropy source.
#[derive(Clone, Copy, Debug, Default)]
pub struct EntropySelector;

impl EnemySelector for EntropySelector {
    fn select<'a>(
        &mut self,
        pool: &'a [Arc<PokemonTemplate>],
    ) -> Option<&'a Arc<PokemonTemplate>> {
        pool.choose(&mut rand::thread_rng())
    }
}
