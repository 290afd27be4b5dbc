use std::{fmt, time::Duration};

use poke_rpg_core::Side;

/// Entry appended to the combat log while a fight is simulated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CombatLogEntry {
    /// A combat session was created.
    CombatStart {
        /// Tick count of the session, always zero.
        tick: u64,
        /// Simulated time of the session, always zero.
        elapsed: Duration,
    },
    /// One attack was resolved.
    Attack {
        /// Session tick the attack happened in.
        tick: u64,
        /// Simulated session time.
        elapsed: Duration,
        /// Side that attacked.
        attacker: Side,
        /// Side that received the damage.
        defender: Side,
        /// Damage dealt.
        damage: u32,
        /// Defender HP after the damage was applied.
        defender_hp_after: u32,
    },
    /// The session produced its result.
    CombatEnd {
        /// Session tick the fight ended in.
        tick: u64,
        /// Simulated session time.
        elapsed: Duration,
        /// Side that won.
        winner: Side,
    },
}

impl fmt::Display for CombatLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CombatStart { tick, .. } => write!(f, "t={tick} start"),
            Self::Attack {
                tick,
                attacker,
                defender,
                damage,
                defender_hp_after,
                ..
            } => write!(
                f,
                "t={tick} {attacker}->{defender} dmg={damage} hp={defender_hp_after}"
            ),
            Self::CombatEnd { tick, winner, .. } => write!(f, "t={tick} end winner={winner}"),
        }
    }
}

/// Append-only history of every session that wrote into it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CombatLog {
    entries: Vec<CombatLogEntry>,
}

impl CombatLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out an append-only capability.
    pub fn writer(&mut self) -> LogWriter<'_> {
        LogWriter { log: self }
    }

    /// Every entry in append order.
    #[must_use]
    pub fn entries(&self) -> &[CombatLogEntry] {
        &self.entries
    }

    /// Entries appended at or after the cursor.
    #[must_use]
    pub fn since(&self, cursor: usize) -> &[CombatLogEntry] {
        self.entries.get(cursor..).unwrap_or(&[])
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether nothing was logged yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Write capability into a [`CombatLog`]; it can append but never remove.
#[derive(Debug)]
pub struct LogWriter<'a> {
    log: &'a mut CombatLog,
}

impl LogWriter<'_> {
    /// Appends one entry.
    pub fn append(&mut self, entry: CombatLogEntry) {
        self.log.entries.push(entry);
    }
}
