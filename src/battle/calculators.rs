use crate::battle::state::Participant;
use crate::rng::GameRng;
use schema::StatType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageKind {
    Physical,
    Magical,
}

impl DamageKind {
    fn attack_stat(self) -> StatType {
        match self {
            DamageKind::Physical => StatType::Attack,
            DamageKind::Magical => StatType::MagicAttack,
        }
    }

    fn defense_stat(self) -> StatType {
        match self {
            DamageKind::Physical => StatType::Defense,
            DamageKind::Magical => StatType::MagicDefense,
        }
    }
}

/// Everything the damage formula reads, already resolved to numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageInput {
    pub attacker_level: u8,
    pub target_level: u8,
    pub attack: u32,
    pub defense: u32,
    pub accuracy: u32,
    pub power: u32,
    pub flat_bonus: u32,
}

impl DamageInput {
    /// Read the attacker's and target's effective stats for `kind`.
    pub fn between(
        attacker: &Participant,
        target: &Participant,
        kind: DamageKind,
        power: u32,
        flat_bonus: u32,
    ) -> Self {
        Self {
            attacker_level: attacker.actor().level(),
            target_level: target.actor().level(),
            attack: attacker.effective_stat(kind.attack_stat()),
            defense: target.effective_stat(kind.defense_stat()),
            accuracy: attacker.effective_stat(StatType::Accuracy),
            power,
            flat_bonus,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageRoll {
    pub damage: u32,
    pub critical: bool,
}

/// +5% per level of advantage, clamped to [0.8, 1.2].
pub fn level_difference_modifier(attacker_level: u8, target_level: u8) -> f64 {
    let diff = attacker_level as f64 - target_level as f64;
    (1.0 + 0.05 * diff).clamp(0.8, 1.2)
}

pub fn critical_chance(accuracy: u32) -> f64 {
    (accuracy as f64 / 1000.0 + 0.03).clamp(0.05, 0.15)
}

/// Damage before level adjustment, variance and criticals.
pub fn base_damage(input: &DamageInput) -> f64 {
    let level_factor = 2.0 * input.attacker_level as f64 / 5.0 + 2.0;
    let ratio = input.attack as f64 / input.defense.max(1) as f64;
    (level_factor * input.power as f64 * ratio / 50.0 + 2.0).floor() + input.flat_bonus as f64
}

/// Roll damage. Consumes two values: the variance roll, then the critical roll.
pub fn calculate_damage(input: &DamageInput, rng: &mut dyn GameRng) -> DamageRoll {
    let mut damage = base_damage(input)
        * level_difference_modifier(input.attacker_level, input.target_level);

    let variance = 0.9 + rng.next_unit("damage variance") * 0.2;
    damage *= variance;

    let critical = rng.chance(critical_chance(input.accuracy), "critical hit");
    if critical {
        damage *= 2.0;
    }

    DamageRoll {
        damage: (damage.floor() as u32).max(1),
        critical,
    }
}
