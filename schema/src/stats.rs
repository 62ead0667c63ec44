use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

/// The eight named stats every creature carries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumCount, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatType {
    Hp,
    Mp,
    Attack,
    Defense,
    MagicAttack,
    MagicDefense,
    Speed,
    Accuracy,
}

impl StatType {
    /// Position of this stat inside array-backed stat records.
    pub const fn index(self) -> usize {
        match self {
            StatType::Hp => 0,
            StatType::Mp => 1,
            StatType::Attack => 2,
            StatType::Defense => 3,
            StatType::MagicAttack => 4,
            StatType::MagicDefense => 5,
            StatType::Speed => 6,
            StatType::Accuracy => 7,
        }
    }
}

/// Integer stat values, used both for species base stats and derived stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBlock {
    pub hp: u32,
    pub mp: u32,
    pub attack: u32,
    pub defense: u32,
    pub magic_attack: u32,
    pub magic_defense: u32,
    pub speed: u32,
    pub accuracy: u32,
}

impl StatBlock {
    /// Build a block by evaluating `f` once per stat.
    pub fn from_fn(mut f: impl FnMut(StatType) -> u32) -> Self {
        let mut block = StatBlock::default();
        for stat in StatType::iter() {
            block.set(stat, f(stat));
        }
        block
    }

    pub fn get(&self, stat: StatType) -> u32 {
        match stat {
            StatType::Hp => self.hp,
            StatType::Mp => self.mp,
            StatType::Attack => self.attack,
            StatType::Defense => self.defense,
            StatType::MagicAttack => self.magic_attack,
            StatType::MagicDefense => self.magic_defense,
            StatType::Speed => self.speed,
            StatType::Accuracy => self.accuracy,
        }
    }

    pub fn set(&mut self, stat: StatType, value: u32) {
        let slot = match stat {
            StatType::Hp => &mut self.hp,
            StatType::Mp => &mut self.mp,
            StatType::Attack => &mut self.attack,
            StatType::Defense => &mut self.defense,
            StatType::MagicAttack => &mut self.magic_attack,
            StatType::MagicDefense => &mut self.magic_defense,
            StatType::Speed => &mut self.speed,
            StatType::Accuracy => &mut self.accuracy,
        };
        *slot = value;
    }

    /// Iterate `(stat, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (StatType, u32)> + '_ {
        StatType::iter().map(move |stat| (stat, self.get(stat)))
    }

    pub fn total(&self) -> u32 {
        self.iter().map(|(_, value)| value).sum()
    }
}

/// Per-level growth of each stat. Fractional growth accumulates across levels
/// and is floored only when the derived stat is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthRates {
    pub hp: f64,
    pub mp: f64,
    pub attack: f64,
    pub defense: f64,
    pub magic_attack: f64,
    pub magic_defense: f64,
    pub speed: f64,
    pub accuracy: f64,
}

impl GrowthRates {
    pub fn get(&self, stat: StatType) -> f64 {
        match stat {
            StatType::Hp => self.hp,
            StatType::Mp => self.mp,
            StatType::Attack => self.attack,
            StatType::Defense => self.defense,
            StatType::MagicAttack => self.magic_attack,
            StatType::MagicDefense => self.magic_defense,
            StatType::Speed => self.speed,
            StatType::Accuracy => self.accuracy,
        }
    }

    /// The same growth for every stat.
    pub fn uniform(rate: f64) -> Self {
        Self {
            hp: rate,
            mp: rate,
            attack: rate,
            defense: rate,
            magic_attack: rate,
            magic_defense: rate,
            speed: rate,
            accuracy: rate,
        }
    }
}
