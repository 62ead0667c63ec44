//! Engine tuning knobs.
//!
//! Every section has sensible defaults, so a RON file only needs to name the
//! values it wants to change:
//!
//! ```ron
//! (
//!     breeding: (cooldown_ms: 600000),
//!     testing: (guaranteed_capture: true),
//! )
//! ```

use crate::errors::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub combat: CombatConfig,
    pub capture: CaptureConfig,
    pub breeding: BreedingConfig,
    pub creatures: CreatureConfig,
    pub testing: TestingOverrides,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub base_power: u32,
    pub magic_bonus: u32,
    /// Share of max MP restored at the end of an actor's turn when no
    /// spellcasting collaborator handles regeneration.
    pub mp_regen_fraction: f64,
    pub default_flee_chance: u32,
    /// MP cost the AI pays for a "special" move without a spellcaster.
    pub ai_special_cost: u32,
    pub basic_potion: String,
    pub basic_potion_heal: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            base_power: 60,
            magic_bonus: 5,
            mp_regen_fraction: 0.05,
            default_flee_chance: 75,
            ai_special_cost: 5,
            basic_potion: "potion".to_string(),
            basic_potion_heal: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub default_capture_rate: u32,
    pub min_chance: u32,
    pub max_chance: u32,
    /// Flat bonus granted by consuming a capture item, keyed by item id.
    pub item_bonuses: BTreeMap<String, i32>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        let item_bonuses = [("capture_orb", 10), ("great_orb", 20), ("ultra_orb", 35)]
            .into_iter()
            .map(|(item, bonus)| (item.to_string(), bonus))
            .collect();
        Self {
            default_capture_rate: 30,
            min_chance: 5,
            max_chance: 95,
            item_bonuses,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreedingConfig {
    pub cooldown_ms: u64,
    pub min_level: u8,
    pub min_friendship: u8,
}

impl Default for BreedingConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 30 * 60 * 1000,
            min_level: 10,
            min_friendship: 50,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatureConfig {
    /// Friendship a creature starts with once it joins a collection.
    pub capture_friendship: u8,
}

/// Switches for playtesting. None of them are read by the production formulas;
/// they are applied on top of a computed result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestingOverrides {
    pub guaranteed_capture: bool,
    pub forced_capture_chance: Option<u32>,
}

impl EngineConfig {
    pub fn from_ron_str(text: &str) -> EngineResult<Self> {
        ron::from_str(text).map_err(|err| EngineError::Config(err.to_string()))
    }

    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|err| EngineError::Config(format!("{}: {}", path.display(), err)))?;
        let config = Self::from_ron_str(&text)?;
        tracing::debug!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }
}
