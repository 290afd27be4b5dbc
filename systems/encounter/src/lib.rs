#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Encounter lifecycle manager.
//!
//! An encounter binds a chain of fights to one hex. The player combatant is
//! carried from fight to fight without healing; every victory below the
//! target spawns a fresh enemy, the final victory clears the hex and a defeat
//! halts the encounter until the host closes it.

use std::{collections::BTreeMap, sync::Arc};

use poke_rpg_core::{
    BiomeConfig, EncounterSnapshot, FightOutcomeView, HexId, PokemonId, PokemonTemplate, Rarity,
    TickContext,
};
use poke_rpg_system_combat::{CombatLog, CombatSession, CombatTuning, Combatant};

mod selector;

pub use selector::{EnemySelector, EntropySelector, SeededSelector};

/// Fights required to clear a hex whose biome defines no threshold.
pub const DEFAULT_FIGHTS_TO_CLEAR: u32 = 5;

/// Immutable Pokémon registry keyed by template id.
pub type PokemonRegistry = BTreeMap<PokemonId, Arc<PokemonTemplate>>;

/// Notifications produced while advancing an encounter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncounterEvent {
    /// Human-readable log line.
    Log(String),
    /// The final fight was won and the hex may be marked cleared.
    HexCleared {
        /// Hex the encounter belonged to.
        hex: HexId,
    },
}

/// Copies each entry of a rarity bucket by its weight.
#[must_use]
pub const fn rarity_weight(rarity: Rarity) -> usize {
    match rarity {
        Rarity::Common => 7,
        Rarity::Uncommon => 2,
        Rarity::Rare => 1,
    }
}

/// Builds the weighted enemy pool of a biome.
///
/// Entries missing from the registry are skipped. An unknown biome or an
/// empty result falls back to every template except the player's.
#[must_use]
pub fn enemy_pool_for_biome(
    biome: Option<&BiomeConfig>,
    registry: &PokemonRegistry,
    player: &PokemonId,
) -> Vec<Arc<PokemonTemplate>> {
    let mut pool = Vec::new();
    if let Some(biome) = biome {
        for rarity in Rarity::ALL {
            for entry in biome.encounter_pool.entries(rarity) {
                let Some(template) = registry.get(&entry.pokemon_id) else {
                    continue;
                };
                pool.extend(std::iter::repeat(template).take(rarity_weight(rarity)).cloned());
            }
        }
    }

    if pool.is_empty() {
        pool = registry
            .values()
            .filter(|template| template.id != *player)
            .cloned()
            .collect();
    }
    pool
}

#[derive(Debug)]
struct Encounter {
    hex: HexId,
    fight_index: u32,
    fight_target: u32,
    enemy_pool: Vec<Arc<PokemonTemplate>>,
    session: CombatSession,
    running: bool,
}

impl Encounter {
    fn into_next_fight(self, enemy: Combatant, tuning: CombatTuning, log: &mut CombatLog) -> Self {
        let Encounter {
            hex,
            fight_index,
            fight_target,
            enemy_pool,
            session,
            running,
        } = self;
        let player = session.into_player();
        Self {
            hex,
            fight_index: fight_index + 1,
            fight_target,
            enemy_pool,
            session: CombatSession::new(player, enemy, tuning, &mut log.writer()),
            running,
        }
    }
}

/// Owns the active encounter, its combat log and the enemy selection policy.
#[derive(Debug)]
pub struct EncounterManager {
    encounter: Option<Encounter>,
    log: CombatLog,
    log_cursor: usize,
    selector: Box<dyn EnemySelector>,
    tuning: CombatTuning,
}

impl EncounterManager {
    /// Creates a manager without an encounter.
    #[must_use]
    pub fn new(selector: Box<dyn EnemySelector>, tuning: CombatTuning) -> Self {
        Self {
            encounter: None,
            log: CombatLog::new(),
            log_cursor: 0,
            selector,
            tuning,
        }
    }

    /// Replaces any encounter with a new, not yet running one.
    ///
    /// Returns `false`, leaving state untouched, when the pool is empty.
    /// A fight target of zero is raised to one.
    pub fn create_encounter(
        &mut self,
        hex: HexId,
        player: Arc<PokemonTemplate>,
        enemy_pool: Vec<Arc<PokemonTemplate>>,
        fights_to_clear: u32,
    ) -> bool {
        let Some(enemy) = self.selector.select(&enemy_pool).cloned() else {
            tracing::debug!(%hex, "encounter rejected: empty enemy pool");
            return false;
        };

        self.log_cursor = self.log.len();
        let session = CombatSession::new(
            Combatant::new(player, &self.tuning),
            Combatant::new(enemy, &self.tuning),
            self.tuning,
            &mut self.log.writer(),
        );
        let fight_target = fights_to_clear.max(1);
        tracing::debug!(%hex, fight_target, pool = enemy_pool.len(), "encounter created");
        self.encounter = Some(Encounter {
            hex,
            fight_index: 1,
            fight_target,
            enemy_pool,
            session,
            running: false,
        });
        true
    }

    /// Lets ticks advance the current fight.
    ///
    /// Returns `false` without an encounter, while running, or after the
    /// current fight ended.
    pub fn start_combat(&mut self) -> bool {
        match self.encounter.as_mut() {
            Some(encounter) if !encounter.running && !encounter.session.is_ended() => {
                encounter.running = true;
                true
            }
            _ => false,
        }
    }

    /// Discards the encounter; returns whether one existed.
    pub fn close_encounter(&mut self) -> bool {
        let closed = self.encounter.take();
        if let Some(encounter) = &closed {
            tracing::debug!(hex = %encounter.hex, "encounter closed");
        }
        closed.is_some()
    }

    /// Advances the running fight by one tick.
    pub fn on_tick(&mut self, context: &TickContext, out: &mut Vec<EncounterEvent>) {
        let Some(encounter) = self.encounter.as_mut() else {
            return;
        };
        if !encounter.running {
            return;
        }

        let result = encounter.session.tick(context.dt, &mut self.log.writer());
        out.extend(
            self.log
                .since(self.log_cursor)
                .iter()
                .map(|entry| EncounterEvent::Log(entry.to_string())),
        );
        self.log_cursor = self.log.len();

        let Some(result) = result else {
            return;
        };

        if !result.is_victory() {
            encounter.running = false;
            tracing::debug!(hex = %encounter.hex, fight = encounter.fight_index, "encounter lost");
            out.push(EncounterEvent::Log("Defeat".to_owned()));
            return;
        }

        if encounter.fight_index >= encounter.fight_target {
            encounter.running = false;
            tracing::debug!(hex = %encounter.hex, "encounter won");
            out.push(EncounterEvent::HexCleared {
                hex: encounter.hex.clone(),
            });
            return;
        }

        let Some(enemy) = self.selector.select(&encounter.enemy_pool).cloned() else {
            encounter.running = false;
            return;
        };
        let enemy = Combatant::new(enemy, &self.tuning);
        let Some(current) = self.encounter.take() else {
            return;
        };
        let next = current.into_next_fight(enemy, self.tuning, &mut self.log);
        out.push(EncounterEvent::Log(format!(
            "Enemy defeated. Next fight {}/{}",
            next.fight_index, next.fight_target
        )));
        self.encounter = Some(next);
    }

    /// Immutable view of the active encounter.
    #[must_use]
    pub fn snapshot(&self) -> Option<EncounterSnapshot> {
        let encounter = self.encounter.as_ref()?;
        let session = &encounter.session;
        Some(EncounterSnapshot {
            hex: encounter.hex.clone(),
            fight_index: encounter.fight_index,
            fight_target: encounter.fight_target,
            running: encounter.running,
            ended: session.is_ended(),
            result: session.result().map(|result| FightOutcomeView {
                victory: result.is_victory(),
                ticks: result.ticks,
            }),
            player: session.player().view(),
            enemy: session.enemy().view(),
        })
    }

    /// Reports whether an encounter exists.
    #[must_use]
    pub fn has_encounter(&self) -> bool {
        self.encounter.is_some()
    }

    /// Reports whether ticks currently advance a fight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.encounter
            .as_ref()
            .is_some_and(|encounter| encounter.running)
    }

    /// Combat history of every fight since the manager was created.
    #[must_use]
    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    /// Tuning applied to new combatants.
    #[must_use]
    pub const fn tuning(&self) -> &CombatTuning {
        &self.tuning
    }
}
