use crate::collaborators::{ItemDrop, Loot};
use schema::Rarity;
use serde::{Deserialize, Serialize};

// Constants for reward calculations
const EXP_PER_ENEMY_LEVEL: f64 = 8.0;
const FALLBACK_GOLD_PER_LEVEL: u64 = 5;

// Level-difference scaling
const BONUS_PER_LEVEL_ABOVE: f64 = 0.1;
const MAX_LEVEL_BONUS: f64 = 2.0;
const GRACE_LEVELS_BELOW: i32 = 5;
const PENALTY_PER_LEVEL_BELOW: f64 = 0.1;
const MIN_LEVEL_MULTIPLIER: f64 = 0.1;

/// One defeated foe's contribution to the battle rewards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefeatedFoe {
    pub name: String,
    pub species: Option<String>,
    pub level: u8,
    pub experience: u64,
}

/// What a won battle paid out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSummary {
    pub experience: u64,
    pub gold: u64,
    pub items: Vec<ItemDrop>,
    pub defeated: Vec<DefeatedFoe>,
    /// (creature name, levels gained) for each allied creature that leveled.
    pub level_ups: Vec<(String, u32)>,
}

impl RewardSummary {
    pub fn add_loot(&mut self, loot: Loot) {
        self.gold += loot.gold;
        for drop in loot.items {
            match self.items.iter_mut().find(|held| held.item == drop.item) {
                Some(held) => held.quantity += drop.quantity,
                None => self.items.push(drop),
            }
        }
    }
}

/// Calculator for experience and gold rewards of defeated opponents
pub struct RewardCalculator;

impl RewardCalculator {
    pub fn rarity_multiplier(rarity: Rarity) -> f64 {
        match rarity {
            Rarity::Common => 1.0,
            Rarity::Uncommon => 1.25,
            Rarity::Rare => 1.5,
            Rarity::Epic => 2.0,
            Rarity::Legendary => 3.0,
        }
    }

    /// Stronger foes pay more, up to double. Foes within five levels below
    /// the player pay normally; past that, each level costs 10%, down to 10%.
    pub fn level_difference_multiplier(enemy_level: u8, player_level: u8) -> f64 {
        let diff = enemy_level as i32 - player_level as i32;
        if diff > 0 {
            (1.0 + BONUS_PER_LEVEL_ABOVE * diff as f64).min(MAX_LEVEL_BONUS)
        } else if diff >= -GRACE_LEVELS_BELOW {
            1.0
        } else {
            let excess = (-diff - GRACE_LEVELS_BELOW) as f64;
            (1.0 - PENALTY_PER_LEVEL_BELOW * excess).max(MIN_LEVEL_MULTIPLIER)
        }
    }

    /// Formula: floor(enemy_level * 8 * rarity * level_difference)
    pub fn experience_for(enemy_level: u8, rarity: Rarity, player_level: u8) -> u64 {
        let raw = enemy_level as f64
            * EXP_PER_ENEMY_LEVEL
            * Self::rarity_multiplier(rarity)
            * Self::level_difference_multiplier(enemy_level, player_level);
        raw.floor() as u64
    }

    /// Loot used when no loot generator is wired: gold only.
    pub fn fallback_loot(enemy_level: u8, rarity: Rarity) -> Loot {
        let gold = (enemy_level as u64 * FALLBACK_GOLD_PER_LEVEL) as f64
            * Self::rarity_multiplier(rarity);
        Loot {
            gold: gold.floor() as u64,
            items: Vec::new(),
        }
    }
}
