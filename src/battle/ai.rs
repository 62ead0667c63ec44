//! A module for defining AI behaviors for battle opponents.

use crate::battle::state::{Participant, ParticipantId};
use crate::rng::GameRng;
use serde::{Deserialize, Serialize};

/// What an AI-controlled participant decided to do this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiChoice {
    Special,
    Attack,
    Defend,
    /// Lost the turn to sleep or freezing. Never returned by a behavior.
    Skip,
}

/// Relative preference for each kind of action. The values do not need to
/// sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehaviorWeights {
    pub aggressive: f64,
    pub defensive: f64,
    pub special: f64,
}

impl Default for BehaviorWeights {
    fn default() -> Self {
        Self {
            aggressive: 0.7,
            defensive: 0.3,
            special: 0.2,
        }
    }
}

impl BehaviorWeights {
    /// Wounded actors turtle, healthy ones press the attack.
    pub fn adjusted_for_health(self, health_fraction: f64) -> Self {
        let mut weights = self;
        if health_fraction < 0.3 {
            weights.defensive += 0.3;
        } else if health_fraction > 0.8 {
            weights.aggressive += 0.2;
        }
        weights
    }

    /// Map a uniform draw in `[0, 1)` onto a choice. The draw is scaled by
    /// the total weight and checked against special, then attack, then defend.
    ///
    /// The adjusted weights sum past 1.0, so unscaled thresholds would leave
    /// the defensive share unreachable at full health and the low-health
    /// bonus without effect.
    pub fn choose(&self, draw: f64) -> AiChoice {
        let total = self.special + self.aggressive + self.defensive;
        if total <= 0.0 {
            return AiChoice::Attack;
        }
        let point = draw * total;
        if point < self.special {
            AiChoice::Special
        } else if point < self.special + self.aggressive {
            AiChoice::Attack
        } else {
            AiChoice::Defend
        }
    }
}

/// A trait for any system that can decide on a battle action.
pub trait Behavior {
    fn decide(&self, actor: &Participant, rng: &mut dyn GameRng) -> AiChoice;
}

/// The default weighted-random behavior. Uses the actor's own weight profile
/// when it has one.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedBehavior {
    pub fallback: BehaviorWeights,
}

impl Behavior for WeightedBehavior {
    fn decide(&self, actor: &Participant, rng: &mut dyn GameRng) -> AiChoice {
        let weights = actor
            .actor()
            .behavior()
            .unwrap_or(self.fallback)
            .adjusted_for_health(actor.actor().health_fraction());
        weights.choose(rng.next_unit("ai choice"))
    }
}

/// The opposing participant with the lowest current HP. Ties go to the
/// earliest in turn order.
pub fn lowest_hp_opponent(participants: &[Participant], actor: &Participant) -> Option<ParticipantId> {
    participants
        .iter()
        .filter(|candidate| candidate.side != actor.side && !candidate.is_defeated())
        .min_by_key(|candidate| candidate.actor().vitals().hp)
        .map(|candidate| candidate.id)
}

/// What `ai_take_turn` ended up doing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiTurn {
    pub choice: AiChoice,
    pub target: Option<ParticipantId>,
    pub move_id: Option<String>,
    /// True when the chosen special move could not be paid for and a basic
    /// attack was used instead.
    pub fell_back: bool,
}
