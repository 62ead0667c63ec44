use crate::{GrowthRates, StatBlock};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        };
        write!(f, "{}", display_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionData {
    pub evolves_into: String, // Species key
    pub min_level: u8,
    #[serde(default)]
    pub required_items: Vec<String>,
}

/// A move unlocked once a creature reaches `level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelMove {
    pub level: u8,
    pub move_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub name: String,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub types: Vec<String>,
    pub base_stats: StatBlock,
    #[serde(default)]
    pub growth: GrowthRates,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub capture_rate: Option<u8>,
    #[serde(default)]
    pub evolutions: Vec<EvolutionData>,
    // Empty means the engine-wide level gates apply
    #[serde(default)]
    pub level_moves: Vec<LevelMove>,
    #[serde(default)]
    pub description: String,
}

impl SpeciesData {
    pub fn shares_type_with(&self, other: &SpeciesData) -> bool {
        self.types.iter().any(|tag| other.types.contains(tag))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedingOutcome {
    pub species: String,
    pub weight: u32, // Relative chance among the pair's outcomes
}

/// A compatible pair of species and what their offspring may be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedingPair {
    pub parents: [String; 2],
    pub outcomes: Vec<BreedingOutcome>,
}

impl BreedingPair {
    /// Parent order does not matter.
    pub fn matches(&self, a: &str, b: &str) -> bool {
        (self.parents[0] == a && self.parents[1] == b)
            || (self.parents[0] == b && self.parents[1] == a)
    }

    pub fn total_weight(&self) -> u32 {
        self.outcomes.iter().map(|outcome| outcome.weight).sum()
    }
}
