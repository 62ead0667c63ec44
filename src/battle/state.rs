use crate::battle::actor::Actor;
use schema::{Side, StatType, StatusKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle for a combatant, unique within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(pub u32);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A timed stat change applied by a spell. Counted down at the end of every round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatModifier {
    pub stat: StatType,
    pub amount: i32,
    pub remaining_rounds: u32,
}

#[derive(Debug)]
pub struct Participant {
    pub id: ParticipantId,
    pub side: Side,
    /// Only used to order the turn sequence at start.
    pub speed: u32,
    actor: Box<dyn Actor>,
    pub(crate) defeated: bool,
    pub(crate) modifiers: Vec<StatModifier>,
}

impl Participant {
    pub fn new(id: ParticipantId, side: Side, actor: impl Actor + 'static) -> Self {
        Self::boxed(id, side, Box::new(actor))
    }

    pub fn boxed(id: ParticipantId, side: Side, actor: Box<dyn Actor>) -> Self {
        let speed = actor.stats().speed;
        Self {
            id,
            side,
            speed,
            actor,
            defeated: false,
            modifiers: Vec::new(),
        }
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self
    }

    pub fn actor(&self) -> &dyn Actor {
        self.actor.as_ref()
    }

    pub(crate) fn actor_mut(&mut self) -> &mut dyn Actor {
        self.actor.as_mut()
    }

    pub(crate) fn into_actor(self) -> Box<dyn Actor> {
        self.actor
    }

    pub fn name(&self) -> &str {
        self.actor.name()
    }

    pub fn is_defeated(&self) -> bool {
        self.defeated
    }

    pub fn modifiers(&self) -> &[StatModifier] {
        &self.modifiers
    }

    /// Base stat plus every active modifier, never below zero.
    pub fn effective_stat(&self, stat: StatType) -> u32 {
        let base = self.actor.stats().get(stat) as i64;
        let delta: i64 = self
            .modifiers
            .iter()
            .filter(|modifier| modifier.stat == stat)
            .map(|modifier| modifier.amount as i64)
            .sum();
        (base + delta).max(0) as u32
    }
}

/// What a participant did with its turn, as recorded in the action log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum CombatAction {
    Attack {
        target: ParticipantId,
    },
    Magic {
        target: ParticipantId,
        move_id: String,
        mp_cost: u32,
    },
    CastSpell {
        spell_id: String,
        target: Option<ParticipantId>,
    },
    UseItem {
        item: String,
    },
    Capture {
        target: ParticipantId,
        item: Option<String>,
        success: bool,
    },
    Flee {
        success: bool,
    },
    Defend,
    Incapacitated {
        status: StatusKind,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActionLogEntry {
    pub round: u32,
    pub actor: ParticipantId,
    pub action: CombatAction,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    Victory { by_capture: bool },
    Defeat,
    Fled,
}

impl BattleOutcome {
    pub fn is_victory(&self) -> bool {
        matches!(self, BattleOutcome::Victory { .. })
    }
}

// --- Per-action reports ---

/// Result of `attack` or `magic`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageReport {
    pub attacker: ParticipantId,
    pub target: ParticipantId,
    pub damage: u32,
    pub critical: bool,
    pub remaining_hp: u32,
    pub mp_spent: u32,
    pub target_defeated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellReport {
    pub spell_id: String,
    pub mp_consumed: u32,
    pub applied: Vec<crate::collaborators::SpellEffect>,
    pub defeated: Vec<ParticipantId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReport {
    pub item: String,
    pub healed: u32,
    pub mp_restored: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureReport {
    pub chance: u32,
    pub roll: u32,
    pub success: bool,
    /// Set when a collection stored the creature.
    pub collection_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleeReport {
    pub chance: u32,
    pub roll: u32,
    pub success: bool,
}
