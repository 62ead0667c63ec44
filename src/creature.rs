use crate::progression::moves::{moves_for_level, MAX_MOVES};
use crate::rng::GameRng;
use crate::stats::{
    compute_stats, experience_threshold, generate_ivs, GrowthTier, IndividualValues, MAX_LEVEL,
};
use schema::{SpeciesData, StatBlock, StatusKind};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

pub const MAX_FRIENDSHIP: u8 = 100;

/// Cosmetic temperament tag. It has no mechanical effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum Personality {
    Brave,
    Calm,
    Timid,
    Jolly,
    Curious,
    Stubborn,
    Gentle,
    Sassy,
}

impl Personality {
    pub fn random(rng: &mut dyn GameRng) -> Self {
        let all: Vec<Personality> = Personality::iter().collect();
        all[rng.pick_index(all.len(), "personality")]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    pub hp: u32,
    pub mp: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub duration: u32,
    pub remaining: i32,
}

/// Active status effects, at most one per kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    effects: Vec<StatusEffect>,
}

impl StatusEffects {
    /// Apply `kind` for `duration` turns, replacing (and returning) any effect
    /// of the same kind.
    pub fn apply(&mut self, kind: StatusKind, duration: u32) -> Option<StatusEffect> {
        let replaced = self.remove(kind);
        self.effects.push(StatusEffect {
            kind,
            duration,
            remaining: duration as i32,
        });
        replaced
    }

    pub fn remove(&mut self, kind: StatusKind) -> Option<StatusEffect> {
        let position = self.effects.iter().position(|effect| effect.kind == kind)?;
        Some(self.effects.remove(position))
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.effects.iter().any(|effect| effect.kind == kind)
    }

    pub fn get(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|effect| effect.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn kinds(&self) -> Vec<StatusKind> {
        self.effects.iter().map(|effect| effect.kind).collect()
    }

    /// Decrement one effect's countdown. Returns the effect if it expired.
    pub fn count_down(&mut self, kind: StatusKind) -> Option<StatusEffect> {
        let effect = self.effects.iter_mut().find(|effect| effect.kind == kind)?;
        effect.remaining -= 1;
        if effect.remaining <= 0 {
            self.remove(kind)
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineage {
    pub parents: [String; 2],
    pub generation: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureInfo {
    pub captured_at: u64,
    pub owner_id: String,
    pub collection_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub species: String, // Key for looking up species data (e.g., "slime")
    pub nickname: Option<String>,
    pub species_name: String,
    pub level: u8,
    pub experience: u64,
    pub experience_to_next: u64,
    pub ivs: IndividualValues,
    pub personality: Personality,
    pub stats: StatBlock,
    pub vitals: Vitals,
    moves: Vec<String>, // Learn order, never more than four
    pub abilities: Vec<String>,
    friendship: u8,
    pub evolution_stage: u32,
    pub lineage: Option<Lineage>,
    pub status_effects: StatusEffects,
    pub capture: Option<CaptureInfo>,
    pub wild: bool,
    pub breeding_cooldown_until: Option<u64>,
}

impl Creature {
    /// Create a creature from species data. The result is wild, at full
    /// health, and knows the moves its species has at `level`.
    pub fn new(
        species_key: impl Into<String>,
        species_data: &SpeciesData,
        level: u8,
        ivs: IndividualValues,
        personality: Personality,
    ) -> Self {
        let level = level.clamp(1, MAX_LEVEL);
        let stats = compute_stats(&species_data.base_stats, &species_data.growth, level, &ivs);

        let mut creature = Creature {
            species: species_key.into(),
            nickname: None,
            species_name: species_data.name.clone(),
            level,
            experience: 0,
            experience_to_next: 0,
            ivs,
            personality,
            stats,
            vitals: Vitals {
                hp: stats.hp,
                mp: stats.mp,
            },
            moves: moves_for_level(species_data, level),
            abilities: species_data.abilities.clone(),
            friendship: 0,
            evolution_stage: 0,
            lineage: None,
            status_effects: StatusEffects::default(),
            capture: None,
            wild: true,
            breeding_cooldown_until: None,
        };
        creature.refresh_experience_to_next(species_data);
        creature
    }

    /// A freshly encountered wild creature with random IVs and personality.
    pub fn wild(
        species_key: impl Into<String>,
        species_data: &SpeciesData,
        level: u8,
        rng: &mut dyn GameRng,
    ) -> Self {
        let ivs = generate_ivs(rng);
        let personality = Personality::random(rng);
        Self::new(species_key, species_data, level, ivs, personality)
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    /// Nickname if set, otherwise the species name.
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.species_name)
    }

    pub fn max_hp(&self) -> u32 {
        self.stats.hp
    }

    pub fn max_mp(&self) -> u32 {
        self.stats.mp
    }

    pub fn current_hp(&self) -> u32 {
        self.vitals.hp
    }

    pub fn current_mp(&self) -> u32 {
        self.vitals.mp
    }

    pub fn is_fainted(&self) -> bool {
        self.vitals.hp == 0
    }

    /// Set current HP, clamped to `[0, max_hp]`.
    pub fn set_hp(&mut self, hp: u32) {
        self.vitals.hp = hp.min(self.max_hp());
    }

    pub fn set_mp(&mut self, mp: u32) {
        self.vitals.mp = mp.min(self.max_mp());
    }

    /// Returns the damage actually taken.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.vitals.hp);
        self.vitals.hp -= taken;
        taken
    }

    /// Returns the HP actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.vitals.hp;
        self.set_hp(before.saturating_add(amount));
        self.vitals.hp - before
    }

    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    /// Replace the move list, keeping only the first four entries.
    pub fn set_moves(&mut self, moves: Vec<String>) {
        self.moves = moves.into_iter().take(MAX_MOVES).collect();
    }

    /// Append a move if it is new and there is room. Returns whether it was added.
    pub fn learn_move(&mut self, move_id: &str) -> bool {
        if self.moves.len() >= MAX_MOVES || self.moves.iter().any(|known| known == move_id) {
            return false;
        }
        self.moves.push(move_id.to_string());
        true
    }

    /// Friendship is only tracked for creatures that are not wild.
    pub fn friendship(&self) -> Option<u8> {
        (!self.wild).then_some(self.friendship)
    }

    pub fn set_friendship(&mut self, value: u8) {
        if !self.wild {
            self.friendship = value.min(MAX_FRIENDSHIP);
        }
    }

    pub fn adjust_friendship(&mut self, delta: i32) {
        let value = (self.friendship as i32 + delta).clamp(0, MAX_FRIENDSHIP as i32);
        self.set_friendship(value as u8);
    }

    /// Generation zero for creatures without recorded parents.
    pub fn generation(&self) -> u32 {
        self.lineage.as_ref().map_or(0, |lineage| lineage.generation)
    }

    pub fn on_breeding_cooldown(&self, now: u64) -> bool {
        self.breeding_cooldown_until
            .is_some_and(|until| now < until)
    }

    /// Hand the creature to an owner. It stops being wild.
    pub fn mark_captured(
        &mut self,
        owner_id: impl Into<String>,
        captured_at: u64,
        friendship: u8,
    ) {
        self.wild = false;
        self.capture = Some(CaptureInfo {
            captured_at,
            owner_id: owner_id.into(),
            collection_id: None,
        });
        self.set_friendship(friendship);
    }

    /// Recompute derived stats from species data without healing.
    /// Current HP/MP are clamped to the new maximums.
    pub fn refresh_stats(&mut self, species_data: &SpeciesData) {
        self.stats = compute_stats(
            &species_data.base_stats,
            &species_data.growth,
            self.level,
            &self.ivs,
        );
        self.vitals.hp = self.vitals.hp.min(self.stats.hp);
        self.vitals.mp = self.vitals.mp.min(self.stats.mp);
    }

    pub fn growth_tier(species_data: &SpeciesData) -> GrowthTier {
        GrowthTier::from_rarity(species_data.rarity)
    }

    pub fn refresh_experience_to_next(&mut self, species_data: &SpeciesData) {
        self.experience_to_next = if self.level >= MAX_LEVEL {
            0
        } else {
            experience_threshold(self.level + 1, Self::growth_tier(species_data))
        };
    }
}
