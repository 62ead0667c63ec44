//! Pure stat math: derived stats, experience curves and individual values.

use crate::rng::GameRng;
use schema::{GrowthRates, Rarity, StatBlock, StatType};
use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};

pub const MAX_IV: u8 = 31;
pub const MAX_LEVEL: u8 = 100;

/// Experience curve classification, derived from species rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthTier {
    Fast,
    Medium,
    Slow,
}

impl GrowthTier {
    pub fn from_rarity(rarity: Rarity) -> Self {
        match rarity {
            Rarity::Common => GrowthTier::Fast,
            Rarity::Uncommon => GrowthTier::Medium,
            Rarity::Rare | Rarity::Legendary => GrowthTier::Slow,
            _ => GrowthTier::Medium,
        }
    }

    /// `(k, p)` of the curve `floor(k * level^p)`.
    fn curve(self) -> (f64, f64) {
        match self {
            GrowthTier::Fast => (80.0, 2.4),
            GrowthTier::Medium => (100.0, 2.2),
            GrowthTier::Slow => (125.0, 2.0),
        }
    }
}

/// Per-stat random offsets, each held in `[0, 31]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualValues {
    values: [u8; StatType::COUNT],
}

impl IndividualValues {
    /// Values above 31 are clamped.
    pub fn new(values: [u8; StatType::COUNT]) -> Self {
        Self {
            values: values.map(|value| value.min(MAX_IV)),
        }
    }

    pub fn uniform(value: u8) -> Self {
        Self::new([value; StatType::COUNT])
    }

    pub fn get(&self, stat: StatType) -> u8 {
        self.values[stat.index()]
    }

    pub fn set(&mut self, stat: StatType, value: u8) {
        self.values[stat.index()] = value.min(MAX_IV);
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatType, u8)> + '_ {
        StatType::iter().map(move |stat| (stat, self.get(stat)))
    }
}

/// Derive a creature's stats: `floor(base + growth*(level-1) + iv + level*0.5)`
/// for every stat. Negative growth can never push a stat below zero.
pub fn compute_stats(
    base: &StatBlock,
    growth: &GrowthRates,
    level: u8,
    ivs: &IndividualValues,
) -> StatBlock {
    let level = level.max(1) as f64;
    StatBlock::from_fn(|stat| {
        let value = base.get(stat) as f64
            + growth.get(stat) * (level - 1.0)
            + ivs.get(stat) as f64
            + level * 0.5;
        value.floor().max(0.0) as u32
    })
}

/// Experience needed to *enter* `level` from the previous one.
pub fn experience_threshold(level: u8, tier: GrowthTier) -> u64 {
    let (k, p) = tier.curve();
    (k * (level as f64).powf(p)).floor() as u64
}

/// Eight independent uniform draws over `[0, 31]`.
pub fn generate_ivs(rng: &mut dyn GameRng) -> IndividualValues {
    let mut ivs = IndividualValues::default();
    for stat in StatType::iter() {
        let value = rng.range_inclusive(0, MAX_IV as u32, "individual value") as u8;
        ivs.set(stat, value);
    }
    ivs
}
