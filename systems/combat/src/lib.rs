#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Gauge-based combat engine.
//!
//! Each combatant fills a gauge every tick at a rate derived from its speed
//! stat. Whenever a gauge reaches its threshold the combatant attacks and the
//! threshold is subtracted, keeping any surplus. A [`CombatSession`] advances
//! one fixed tick at a time until one side runs out of hit points.

use std::{sync::Arc, time::Duration};

use poke_rpg_core::{BaseStats, CombatantView, PokemonTemplate, Side};
use serde::{Deserialize, Serialize};

mod log;

pub use log::{CombatLog, CombatLogEntry, LogWriter};

/// Tunable constants of the gauge and damage model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Gauge gained every tick regardless of speed.
    pub base_gain_per_tick: f64,
    /// Weight of the logarithmic speed term.
    pub speed_gain_multiplier: f64,
    /// Larger values flatten the speed contribution.
    pub speed_log_denominator: f64,
    /// Time-to-act window in ticks.
    pub gauge_max_base_ticks: f64,
    /// Multiplier applied to the time-to-act window.
    pub gauge_max_multiplier: f64,
    /// Hard cap on attacks resolved within one tick.
    pub max_actions_per_tick: u32,
    /// Lowest damage any attack can deal; zero is read as one.
    pub min_damage: u32,
    /// Defense is divided by this before being subtracted from attack.
    pub defense_divisor: u32,
}

impl CombatTuning {
    /// Gauge gain used when the configured constants would stall a fight.
    pub const MIN_GAUGE_GAIN: f64 = 0.01;

    /// Gauge threshold of a combatant; speed does not affect it.
    ///
    /// Negative thresholds act as zero. A non-finite product falls back to
    /// the default window.
    #[must_use]
    pub fn gauge_max(&self, _speed: u32) -> f64 {
        let max = self.gauge_max_base_ticks * self.gauge_max_multiplier;
        if max.is_finite() {
            max.max(0.0)
        } else {
            Self::default().gauge_max_base_ticks
        }
    }

    /// Gauge gained per tick for the given speed stat.
    ///
    /// Always finite and at least [`Self::MIN_GAUGE_GAIN`]; a denominator that
    /// is not strictly positive is read as one.
    #[must_use]
    pub fn gauge_gain_per_tick(&self, speed: u32) -> f64 {
        let denominator = if self.speed_log_denominator > 0.0 {
            self.speed_log_denominator
        } else {
            1.0
        };
        let speed_term = (f64::from(speed) / denominator).ln_1p();
        let base = self.base_gain_per_tick.max(Self::MIN_GAUGE_GAIN);
        let gain = base + self.speed_gain_multiplier * speed_term;
        if gain.is_finite() && gain >= Self::MIN_GAUGE_GAIN {
            gain
        } else {
            Self::MIN_GAUGE_GAIN
        }
    }

    /// Attacks allowed within one tick; never below one.
    #[must_use]
    pub const fn action_cap(&self) -> u32 {
        if self.max_actions_per_tick == 0 {
            1
        } else {
            self.max_actions_per_tick
        }
    }
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            base_gain_per_tick: 1.0,
            speed_gain_multiplier: 1.5,
            speed_log_denominator: 20.0,
            gauge_max_base_ticks: 40.0,
            gauge_max_multiplier: 1.0,
            max_actions_per_tick: 10,
            min_damage: 1,
            defense_divisor: 2,
        }
    }
}

/// Prototype damage formula: `max(min_damage, atk - floor(def / divisor))`.
///
/// A zero divisor or a zero minimum is treated as one.
#[must_use]
pub fn compute_damage(attacker: &BaseStats, defender: &BaseStats, tuning: &CombatTuning) -> u32 {
    let reduction = defender.def / tuning.defense_divisor.max(1);
    attacker
        .atk
        .saturating_sub(reduction)
        .max(tuning.min_damage.max(1))
}

/// Per-fight mutable state wrapped around a shared template.
#[derive(Clone, Debug, PartialEq)]
pub struct Combatant {
    template: Arc<PokemonTemplate>,
    current_hp: u32,
    gauge: f64,
    gauge_max: f64,
    gauge_gain_per_tick: f64,
}

impl Combatant {
    /// Creates a combatant at full health with an empty gauge.
    #[must_use]
    pub fn new(template: Arc<PokemonTemplate>, tuning: &CombatTuning) -> Self {
        let speed = template.base_stats.spd;
        Self {
            current_hp: template.base_stats.hp,
            gauge: 0.0,
            gauge_max: tuning.gauge_max(speed),
            gauge_gain_per_tick: tuning.gauge_gain_per_tick(speed),
            template,
        }
    }

    /// Template the combatant was created from.
    #[must_use]
    pub fn template(&self) -> &Arc<PokemonTemplate> {
        &self.template
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn current_hp(&self) -> u32 {
        self.current_hp
    }

    /// Maximum hit points.
    #[must_use]
    pub fn hp_max(&self) -> u32 {
        self.template.base_stats.hp
    }

    /// Current gauge value.
    #[must_use]
    pub const fn gauge(&self) -> f64 {
        self.gauge
    }

    /// Threshold required to act.
    #[must_use]
    pub const fn gauge_max(&self) -> f64 {
        self.gauge_max
    }

    /// Gauge gained every tick.
    #[must_use]
    pub const fn gauge_gain_per_tick(&self) -> f64 {
        self.gauge_gain_per_tick
    }

    /// Reports whether the combatant still has hit points.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    /// Applies damage, clamping at zero, and returns the remaining hit points.
    pub fn receive_damage(&mut self, damage: u32) -> u32 {
        self.current_hp = self.current_hp.saturating_sub(damage);
        self.current_hp
    }

    /// Immutable view for snapshot consumers.
    #[must_use]
    pub fn view(&self) -> CombatantView {
        CombatantView {
            name: self.template.name.clone(),
            level: self.template.level,
            speed: self.template.base_stats.spd,
            hp: self.current_hp,
            hp_max: self.hp_max(),
            gauge: self.gauge,
            gauge_max: self.gauge_max,
            gauge_gain_per_tick: self.gauge_gain_per_tick,
        }
    }

    fn is_ready(&self) -> bool {
        self.gauge >= self.gauge_max
    }

    fn charge(&mut self) {
        self.gauge += self.gauge_gain_per_tick;
    }

    fn consume_gauge(&mut self) {
        self.gauge = (self.gauge - self.gauge_max).max(0.0);
    }
}

/// Terminal outcome of a fight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CombatResult {
    /// Side that won.
    pub winner: Side,
    /// Simulated time the fight lasted.
    pub elapsed: Duration,
    /// Ticks the fight lasted.
    pub ticks: u64,
}

impl CombatResult {
    /// Reports whether the player won.
    #[must_use]
    pub fn is_victory(&self) -> bool {
        self.winner == Side::Player
    }
}

/// One fight between the player and an enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct CombatSession {
    player: Combatant,
    enemy: Combatant,
    tuning: CombatTuning,
    tick_count: u64,
    elapsed: Duration,
    result: Option<CombatResult>,
    actions_last_tick: u32,
}

impl CombatSession {
    /// Starts a fight and logs its start.
    #[must_use]
    pub fn new(
        player: Combatant,
        enemy: Combatant,
        tuning: CombatTuning,
        log: &mut LogWriter<'_>,
    ) -> Self {
        log.append(CombatLogEntry::CombatStart {
            tick: 0,
            elapsed: Duration::ZERO,
        });
        Self {
            player,
            enemy,
            tuning,
            tick_count: 0,
            elapsed: Duration::ZERO,
            result: None,
            actions_last_tick: 0,
        }
    }

    /// Advances the fight by one tick.
    ///
    /// Once a result exists it is returned unchanged and nothing is mutated.
    pub fn tick(&mut self, dt: Duration, log: &mut LogWriter<'_>) -> Option<CombatResult> {
        if self.result.is_some() {
            return self.result;
        }

        self.tick_count += 1;
        self.elapsed += dt;
        self.actions_last_tick = 0;

        for side in [Side::Player, Side::Enemy] {
            let combatant = self.combatant_mut(side);
            if combatant.is_alive() {
                combatant.charge();
            }
        }

        if let Some(winner) = self.sole_survivor() {
            return Some(self.finish(winner, log));
        }

        while self.actions_last_tick < self.tuning.action_cap() {
            let Some(actor) = self.next_actor() else {
                break;
            };
            self.actions_last_tick += 1;
            if let Some(result) = self.resolve_attack(actor, log) {
                return Some(result);
            }
        }

        None
    }

    /// Result of the fight, once ended.
    #[must_use]
    pub const fn result(&self) -> Option<CombatResult> {
        self.result
    }

    /// Reports whether the fight produced a result.
    #[must_use]
    pub const fn is_ended(&self) -> bool {
        self.result.is_some()
    }

    /// Player combatant.
    #[must_use]
    pub const fn player(&self) -> &Combatant {
        &self.player
    }

    /// Enemy combatant.
    #[must_use]
    pub const fn enemy(&self) -> &Combatant {
        &self.enemy
    }

    /// Ticks processed so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.tick_count
    }

    /// Simulated time processed so far.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Attacks resolved during the most recent tick.
    #[must_use]
    pub const fn actions_last_tick(&self) -> u32 {
        self.actions_last_tick
    }

    /// Tuning the session runs with.
    #[must_use]
    pub const fn tuning(&self) -> &CombatTuning {
        &self.tuning
    }

    /// Releases the player combatant so it can enter the next fight.
    #[must_use]
    pub fn into_player(self) -> Combatant {
        self.player
    }

    fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }

    fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        match side {
            Side::Player => &mut self.player,
            Side::Enemy => &mut self.enemy,
        }
    }

    /// Ready side with the higher gauge; the player wins exact ties.
    fn next_actor(&self) -> Option<Side> {
        if !self.player.is_alive() || !self.enemy.is_alive() {
            return None;
        }
        match (self.player.is_ready(), self.enemy.is_ready()) {
            (true, false) => Some(Side::Player),
            (false, true) => Some(Side::Enemy),
            (true, true) if self.enemy.gauge > self.player.gauge => Some(Side::Enemy),
            (true, true) => Some(Side::Player),
            (false, false) => None,
        }
    }

    fn resolve_attack(&mut self, attacker: Side, log: &mut LogWriter<'_>) -> Option<CombatResult> {
        let defender = attacker.opponent();
        let damage = compute_damage(
            &self.combatant(attacker).template.base_stats,
            &self.combatant(defender).template.base_stats,
            &self.tuning,
        );

        self.combatant_mut(attacker).consume_gauge();
        let defender_hp_after = self.combatant_mut(defender).receive_damage(damage);
        log.append(CombatLogEntry::Attack {
            tick: self.tick_count,
            elapsed: self.elapsed,
            attacker,
            defender,
            damage,
            defender_hp_after,
        });

        if defender_hp_after > 0 {
            return None;
        }
        Some(self.finish(attacker, log))
    }

    /// Winner of a fight that started with a side already at zero hit points.
    fn sole_survivor(&self) -> Option<Side> {
        match (self.player.is_alive(), self.enemy.is_alive()) {
            (true, true) => None,
            (true, false) => Some(Side::Player),
            (false, _) => Some(Side::Enemy),
        }
    }

    fn finish(&mut self, winner: Side, log: &mut LogWriter<'_>) -> CombatResult {
        let result = CombatResult {
            winner,
            elapsed: self.elapsed,
            ticks: self.tick_count,
        };
        self.result = Some(result);
        log.append(CombatLogEntry::CombatEnd {
            tick: self.tick_count,
            elapsed: self.elapsed,
            winner,
        });
        tracing::trace!(winner = %winner, ticks = self.tick_count, "combat ended");
        result
    }
}

#[cfg(test)]
mod tests {
    use poke_rpg_core::{ElementType, PokemonId};

    use super::*;

    const DT: Duration = Duration::from_millis(50);

    fn template(name: &str, hp: u32, atk: u32, def: u32, spd: u32) -> Arc<PokemonTemplate> {
        Arc::new(PokemonTemplate {
            id: PokemonId::from(name),
            name: name.to_owned(),
            types: (ElementType::Normal, None),
            level: 5,
            base_stats: BaseStats {
                hp,
                atk,
                def,
                sp_atk: 1,
                sp_def: 1,
                spd,
            },
        })
    }

    fn session(
        player: Arc<PokemonTemplate>,
        enemy: Arc<PokemonTemplate>,
        log: &mut CombatLog,
    ) -> CombatSession {
        let tuning = CombatTuning::default();
        CombatSession::new(
            Combatant::new(player, &tuning),
            Combatant::new(enemy, &tuning),
            tuning,
            &mut log.writer(),
        )
    }

    fn attacks_in_tick(log: &CombatLog, tick: u64) -> Vec<Side> {
        log.entries()
            .iter()
            .filter_map(|entry| match entry {
                CombatLogEntry::Attack {
                    tick: t, attacker, ..
                } if *t == tick => Some(*attacker),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn derived_gauge_constants_follow_tuning() {
        let tuning = CombatTuning::default();
        assert_eq!(tuning.gauge_max(1), 40.0);
        assert_eq!(tuning.gauge_max(200), 40.0);
        assert!((tuning.gauge_gain_per_tick(0) - 1.0).abs() < 1e-12);
        let expected = 1.0 + 1.5 * (135.0_f64 / 20.0).ln_1p();
        assert!((tuning.gauge_gain_per_tick(135) - expected).abs() < 1e-12);
    }

    #[test]
    fn higher_gauge_acts_first_when_both_are_ready() {
        let mut log = CombatLog::new();
        let mut fight = session(
            template("sprout", 100, 5, 0, 1),
            template("rattle", 100, 5, 0, 1),
            &mut log,
        );
        fight.player.gauge = 39.5;
        fight.enemy.gauge = 39.8;

        let _ = fight.tick(DT, &mut log.writer());

        assert_eq!(attacks_in_tick(&log, 1), vec![Side::Enemy, Side::Player]);
    }

    #[test]
    fn exact_tie_favours_the_player() {
        let mut log = CombatLog::new();
        let mut fight = session(
            template("sprout", 100, 5, 0, 1),
            template("rattle", 100, 5, 0, 1),
            &mut log,
        );
        fight.player.gauge = 39.5;
        fight.enemy.gauge = 39.5;

        let _ = fight.tick(DT, &mut log.writer());

        assert_eq!(attacks_in_tick(&log, 1), vec![Side::Player, Side::Enemy]);
    }

    #[test]
    fn surplus_gauge_carries_over() {
        let mut log = CombatLog::new();
        let mut fight = session(
            template("sprout", 100, 5, 0, 1),
            template("rattle", 100, 5, 0, 1),
            &mut log,
        );
        fight.player.gauge = 39.5;
        let gain = fight.player.gauge_gain_per_tick;

        let _ = fight.tick(DT, &mut log.writer());

        assert!((fight.player.gauge - (39.5 + gain - 40.0)).abs() < 1e-12);
    }

    #[test]
    fn killing_blow_ends_the_tick_immediately() {
        let mut log = CombatLog::new();
        let mut fight = session(
            template("sprout", 100, 999, 0, 1),
            template("rattle", 1, 5, 0, 1),
            &mut log,
        );
        fight.player.gauge = 39.9;
        fight.enemy.gauge = 39.5;

        let result = fight.tick(DT, &mut log.writer()).expect("fight ends");

        assert_eq!(result.winner, Side::Player);
        assert_eq!(fight.enemy.current_hp(), 0);
        assert_eq!(attacks_in_tick(&log, 1), vec![Side::Player]);
        assert_eq!(fight.actions_last_tick(), 1);
        assert!(matches!(
            log.entries().last(),
            Some(CombatLogEntry::CombatEnd {
                winner: Side::Player,
                ..
            })
        ));
    }

    #[test]
    fn action_cap_bounds_a_runaway_tick() {
        let tuning = CombatTuning {
            gauge_max_base_ticks: 0.001,
            max_actions_per_tick: 4,
            ..CombatTuning::default()
        };
        let mut log = CombatLog::new();
        let mut fight = CombatSession::new(
            Combatant::new(template("sprout", 1_000, 1, 0, 1), &tuning),
            Combatant::new(template("rattle", 1_000, 1, 0, 1), &tuning),
            tuning,
            &mut log.writer(),
        );

        let _ = fight.tick(DT, &mut log.writer());

        assert_eq!(fight.actions_last_tick(), 4);
        assert_eq!(attacks_in_tick(&log, 1).len(), 4);
    }

    #[test]
    fn zero_action_cap_still_resolves_one_attack() {
        let tuning = CombatTuning {
            max_actions_per_tick: 0,
            ..CombatTuning::default()
        };
        assert_eq!(tuning.action_cap(), 1);

        let mut log = CombatLog::new();
        let mut fight = CombatSession::new(
            Combatant::new(template("sprout", 100, 50, 0, 1), &tuning),
            Combatant::new(template("rattle", 100, 5, 0, 1), &tuning),
            tuning,
            &mut log.writer(),
        );
        fight.player.gauge = 39.9;
        fight.enemy.gauge = 39.9;

        let _ = fight.tick(DT, &mut log.writer());

        assert_eq!(fight.actions_last_tick(), 1);
        assert_eq!(attacks_in_tick(&log, 1), vec![Side::Player]);
    }

    #[test]
    fn degenerate_gain_constants_keep_the_gauge_moving() {
        for tuning in [
            CombatTuning {
                speed_log_denominator: 0.0,
                ..CombatTuning::default()
            },
            CombatTuning {
                speed_log_denominator: -20.0,
                ..CombatTuning::default()
            },
            CombatTuning {
                base_gain_per_tick: -5.0,
                speed_gain_multiplier: 0.0,
                ..CombatTuning::default()
            },
            CombatTuning {
                base_gain_per_tick: f64::NAN,
                speed_gain_multiplier: f64::NAN,
                ..CombatTuning::default()
            },
        ] {
            for speed in [0, 1, 45, u32::MAX] {
                let gain = tuning.gauge_gain_per_tick(speed);
                assert!(gain.is_finite(), "gain {gain} for {tuning:?}");
                assert!(gain >= CombatTuning::MIN_GAUGE_GAIN);
            }
        }
    }

    #[test]
    fn degenerate_gauge_window_is_bounded() {
        let negative = CombatTuning {
            gauge_max_multiplier: -1.0,
            ..CombatTuning::default()
        };
        assert_eq!(negative.gauge_max(1), 0.0);

        let infinite = CombatTuning {
            gauge_max_base_ticks: f64::INFINITY,
            ..CombatTuning::default()
        };
        assert_eq!(infinite.gauge_max(1), 40.0);
    }

    #[test]
    fn zero_hp_side_loses_on_the_first_tick() {
        let mut log = CombatLog::new();
        let mut fight = session(
            template("sprout", 100, 5, 0, 1),
            template("husk", 0, 5, 0, 1),
            &mut log,
        );

        let result = fight.tick(DT, &mut log.writer()).expect("fight ends");

        assert_eq!(result.winner, Side::Player);
        assert_eq!(result.ticks, 1);
        assert!(attacks_in_tick(&log, 1).is_empty());
    }

    #[test]
    fn zero_minimum_damage_still_hurts() {
        let tuning = CombatTuning {
            min_damage: 0,
            ..CombatTuning::default()
        };
        let weak = template("sprout", 10, 0, 0, 1);
        let wall = template("rattle", 10, 0, 50, 1);
        assert_eq!(compute_damage(&weak.base_stats, &wall.base_stats, &tuning), 1);
    }
}
