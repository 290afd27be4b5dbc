#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Engine loop orchestrator.
//!
//! The loop owns the tick runner, the world and the encounter manager. Host
//! frames become ticks, ticks advance the active encounter, and encounter
//! outcomes are applied to the world as commands. Derived state is pushed to
//! subscribers; the loop itself holds no simulation rules.

use std::time::Duration;

use poke_rpg_core::{
    Command, EncounterSnapshot, Event, HexId, Listeners, Subscription, TickContext,
    WorldGenerationConfig, WorldSnapshot,
};
use poke_rpg_system_combat::CombatTuning;
use poke_rpg_system_encounter::{
    enemy_pool_for_biome, EncounterEvent, EncounterManager, EnemySelector,
    DEFAULT_FIGHTS_TO_CLEAR,
};
use poke_rpg_system_tick_runner::{RunnerConfig, RunnerEvent, RunnerStats, TickRunner};
use poke_rpg_system_world_generation::generate_world;
use poke_rpg_world::{self as world, query, World};
use serde::{Deserialize, Serialize};

mod reference;

pub use reference::{ReferenceData, ReferenceDataError, ReferenceDocument};

/// Runtime tuning of the engine loop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed-timestep clock settings.
    pub runner: RunnerConfig,
    /// Gauge and damage constants.
    pub combat: CombatTuning,
    /// Victories required on hexes whose biome is unknown.
    pub fights_to_clear: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            runner: RunnerConfig::default(),
            combat: CombatTuning::default(),
            fights_to_clear: DEFAULT_FIGHTS_TO_CLEAR,
        }
    }
}

/// Composition root of the simulation.
#[derive(Debug)]
pub struct EngineLoop {
    runner: TickRunner,
    world: World,
    encounters: EncounterManager,
    data: ReferenceData,
    fights_to_clear: u32,
    throughput_listeners: Listeners<f64>,
    world_listeners: Listeners<WorldSnapshot>,
    encounter_listeners: Listeners<Option<EncounterSnapshot>>,
    log_listeners: Listeners<String>,
}

impl EngineLoop {
    /// Creates a stopped loop over an existing world.
    #[must_use]
    pub fn new(
        config: EngineConfig,
        world: World,
        data: ReferenceData,
        selector: Box<dyn EnemySelector>,
    ) -> Self {
        Self {
            runner: TickRunner::new(config.runner),
            world,
            encounters: EncounterManager::new(selector, config.combat),
            data,
            fights_to_clear: config.fights_to_clear,
            throughput_listeners: Listeners::new(),
            world_listeners: Listeners::new(),
            encounter_listeners: Listeners::new(),
            log_listeners: Listeners::new(),
        }
    }

    /// Generates the world and creates a stopped loop over it.
    ///
    /// Chunks without a biome list receive every biome of the reference data.
    #[must_use]
    pub fn generate(
        config: EngineConfig,
        generation: &WorldGenerationConfig,
        data: ReferenceData,
        selector: Box<dyn EnemySelector>,
    ) -> Self {
        let generation = generation.clone().with_default_biomes(data.biome_ids());
        let generated = generate_world(&generation);
        tracing::info!(
            seed = %generation.seed,
            chunks = generation.chunks.len(),
            tiles = generated.tiles.len(),
            "world generated"
        );
        Self::new(config, World::new(generated.tiles), data, selector)
    }

    /// Starts the runner and publishes the initial snapshots.
    ///
    /// Calling it while running has no effect.
    pub fn start(&mut self) {
        if self.runner.is_running() {
            return;
        }
        self.emit_world();
        self.emit_encounter();
        self.runner.start();
    }

    /// Stops the runner; completed ticks are kept.
    pub fn stop(&mut self) {
        self.runner.stop();
    }

    /// Reports whether frames currently advance the simulation.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.runner.is_running()
    }

    /// Feeds one host frame into the runner and processes the resulting ticks.
    pub fn on_frame(&mut self, timestamp: Duration) {
        let mut events = Vec::new();
        self.runner.on_frame(timestamp, &mut events);
        for event in events {
            match event {
                RunnerEvent::Tick(context) => self.on_tick(&context),
                RunnerEvent::Throughput { tps } => self.throughput_listeners.emit(&tps),
            }
        }
    }

    /// Intent: the player clicked a hex.
    ///
    /// Explores the hex and opens an encounter for it. Returns `false`
    /// when the hex is unknown or already explored.
    pub fn on_hex_clicked(&mut self, hex: &HexId) -> bool {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::ExploreHex { hex: hex.clone() },
            &mut events,
        );
        if !events
            .iter()
            .any(|event| matches!(event, Event::HexExplored { .. }))
        {
            tracing::debug!(%hex, ?events, "hex click ignored");
            return false;
        }

        self.emit_world();
        self.emit_log(format!("Hex explored ({hex})"));

        let biome = query::biome(&self.world, hex).and_then(|biome| self.data.biome(biome));
        let fights_to_clear = biome.map_or(self.fights_to_clear, |biome| biome.clear_threshold);
        let pool = enemy_pool_for_biome(biome, self.data.pokemon(), &self.data.player().id);

        if self.encounters.create_encounter(
            hex.clone(),
            self.data.player().clone(),
            pool,
            fights_to_clear,
        ) {
            self.emit_encounter();
            self.emit_log(format!("Encounter created ({hex})"));
        }
        true
    }

    /// Intent: let ticks advance the current encounter.
    pub fn start_combat(&mut self) -> bool {
        if !self.encounters.start_combat() {
            return false;
        }
        tracing::debug!("combat started");
        self.emit_encounter();
        self.emit_log("Combat started".to_owned());
        true
    }

    /// Intent: discard the current encounter.
    pub fn close_encounter(&mut self) -> bool {
        if !self.encounters.close_encounter() {
            return false;
        }
        self.emit_encounter();
        self.emit_log("Encounter closed".to_owned());
        true
    }

    /// Current world state.
    #[must_use]
    pub fn world_snapshot(&self) -> WorldSnapshot {
        query::snapshot(&self.world)
    }

    /// Current encounter state, if an encounter is open.
    #[must_use]
    pub fn encounter_snapshot(&self) -> Option<EncounterSnapshot> {
        self.encounters.snapshot()
    }

    /// Read access to the world for queries.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Runner counters.
    #[must_use]
    pub fn runner_stats(&self) -> RunnerStats {
        self.runner.stats()
    }

    /// Reports whether an encounter is open.
    #[must_use]
    pub fn has_encounter(&self) -> bool {
        self.encounters.has_encounter()
    }

    /// Reports whether the open encounter is advancing.
    #[must_use]
    pub fn is_combat_running(&self) -> bool {
        self.encounters.is_running()
    }

    /// Registers a listener for throughput samples.
    pub fn subscribe_throughput<F>(&mut self, listener: F) -> Subscription<f64>
    where
        F: FnMut(&f64) + 'static,
    {
        self.throughput_listeners.subscribe(listener)
    }

    /// Removes a throughput listener.
    pub fn unsubscribe_throughput(&mut self, subscription: Subscription<f64>) -> bool {
        self.throughput_listeners.unsubscribe(subscription)
    }

    /// Registers a listener for world snapshots.
    pub fn subscribe_world<F>(&mut self, listener: F) -> Subscription<WorldSnapshot>
    where
        F: FnMut(&WorldSnapshot) + 'static,
    {
        self.world_listeners.subscribe(listener)
    }

    /// Removes a world listener.
    pub fn unsubscribe_world(&mut self, subscription: Subscription<WorldSnapshot>) -> bool {
        self.world_listeners.unsubscribe(subscription)
    }

    /// Registers a listener for encounter snapshots; `None` means no encounter.
    pub fn subscribe_encounter<F>(
        &mut self,
        listener: F,
    ) -> Subscription<Option<EncounterSnapshot>>
    where
        F: FnMut(&Option<EncounterSnapshot>) + 'static,
    {
        self.encounter_listeners.subscribe(listener)
    }

    /// Removes an encounter listener.
    pub fn unsubscribe_encounter(
        &mut self,
        subscription: Subscription<Option<EncounterSnapshot>>,
    ) -> bool {
        self.encounter_listeners.unsubscribe(subscription)
    }

    /// Registers a listener for human-readable log lines.
    pub fn subscribe_log<F>(&mut self, listener: F) -> Subscription<String>
    where
        F: FnMut(&String) + 'static,
    {
        self.log_listeners.subscribe(listener)
    }

    /// Removes a log listener.
    pub fn unsubscribe_log(&mut self, subscription: Subscription<String>) -> bool {
        self.log_listeners.unsubscribe(subscription)
    }

    fn on_tick(&mut self, context: &TickContext) {
        let mut encounter_events = Vec::new();
        self.encounters.on_tick(context, &mut encounter_events);

        for event in encounter_events {
            match event {
                EncounterEvent::Log(line) => self.emit_log(line),
                EncounterEvent::HexCleared { hex } => self.clear_hex(hex),
            }
        }

        // Published every tick, with or without an encounter.
        self.emit_encounter();
    }

    fn clear_hex(&mut self, hex: HexId) {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::MarkHexCleared { hex: hex.clone() },
            &mut events,
        );
        if events
            .iter()
            .any(|event| matches!(event, Event::HexCleared { .. }))
        {
            self.emit_world();
            self.emit_log(format!("Hex cleared ({hex})"));
        }
    }

    fn emit_world(&mut self) {
        if self.world_listeners.is_empty() {
            return;
        }
        let snapshot = query::snapshot(&self.world);
        self.world_listeners.emit(&snapshot);
    }

    fn emit_encounter(&mut self) {
        if self.encounter_listeners.is_empty() {
            return;
        }
        let snapshot = self.encounters.snapshot();
        self.encounter_listeners.emit(&snapshot);
    }

    fn emit_log(&mut self, line: String) {
        self.log_listeners.emit(&line);
    }
}
