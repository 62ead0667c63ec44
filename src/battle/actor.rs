//! The one interface combat dispatches through.
//!
//! Both full creatures and the lightweight player stand-in implement
//! [`Actor`]; the session never inspects which one it holds except to hand a
//! captured creature to a collection or award experience.

use crate::battle::ai::BehaviorWeights;
use crate::creature::{Creature, StatusEffects, Vitals};
use schema::StatBlock;
use serde::{Deserialize, Serialize};
use std::fmt;

pub trait Actor: fmt::Debug {
    fn name(&self) -> &str;
    fn level(&self) -> u8;
    /// Max stats.
    fn stats(&self) -> &StatBlock;
    fn vitals(&self) -> &Vitals;
    fn vitals_mut(&mut self) -> &mut Vitals;
    fn status_effects(&self) -> &StatusEffects;
    fn status_effects_mut(&mut self) -> &mut StatusEffects;
    fn known_moves(&self) -> &[String];

    /// AI weight profile; `None` uses the engine default.
    fn behavior(&self) -> Option<BehaviorWeights> {
        None
    }

    fn as_creature(&self) -> Option<&Creature> {
        None
    }

    fn as_creature_mut(&mut self) -> Option<&mut Creature> {
        None
    }

    fn into_creature(self: Box<Self>) -> Option<Creature> {
        None
    }

    fn species(&self) -> Option<&str> {
        self.as_creature().map(|creature| creature.species.as_str())
    }

    fn is_fainted(&self) -> bool {
        self.vitals().hp == 0
    }

    /// Current HP as a share of max HP, 0.0 when max HP is zero.
    fn health_fraction(&self) -> f64 {
        let max = self.stats().hp;
        if max == 0 {
            0.0
        } else {
            self.vitals().hp as f64 / max as f64
        }
    }

    /// Returns the damage actually taken.
    fn take_damage(&mut self, amount: u32) -> u32 {
        let vitals = self.vitals_mut();
        let taken = amount.min(vitals.hp);
        vitals.hp -= taken;
        taken
    }

    /// Returns the HP actually restored.
    fn heal(&mut self, amount: u32) -> u32 {
        let max = self.stats().hp;
        let vitals = self.vitals_mut();
        let before = vitals.hp;
        vitals.hp = before.saturating_add(amount).min(max);
        vitals.hp - before
    }

    fn restore_mp(&mut self, amount: u32) -> u32 {
        let max = self.stats().mp;
        let vitals = self.vitals_mut();
        let before = vitals.mp;
        vitals.mp = before.saturating_add(amount).min(max);
        vitals.mp - before
    }

    fn spend_mp(&mut self, amount: u32) {
        let vitals = self.vitals_mut();
        vitals.mp = vitals.mp.saturating_sub(amount);
    }
}

impl Actor for Creature {
    fn name(&self) -> &str {
        self.display_name()
    }

    fn level(&self) -> u8 {
        self.level
    }

    fn stats(&self) -> &StatBlock {
        &self.stats
    }

    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    fn status_effects(&self) -> &StatusEffects {
        &self.status_effects
    }

    fn status_effects_mut(&mut self) -> &mut StatusEffects {
        &mut self.status_effects
    }

    fn known_moves(&self) -> &[String] {
        self.moves()
    }

    fn as_creature(&self) -> Option<&Creature> {
        Some(self)
    }

    fn as_creature_mut(&mut self) -> Option<&mut Creature> {
        Some(self)
    }

    fn into_creature(self: Box<Self>) -> Option<Creature> {
        Some(*self)
    }
}

/// The player character when it fights in person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAvatar {
    pub name: String,
    pub level: u8,
    pub stats: StatBlock,
    pub vitals: Vitals,
    pub status_effects: StatusEffects,
    pub moves: Vec<String>,
    pub behavior: Option<BehaviorWeights>,
}

impl PlayerAvatar {
    pub fn new(name: impl Into<String>, level: u8, stats: StatBlock) -> Self {
        Self {
            name: name.into(),
            level,
            stats,
            vitals: Vitals {
                hp: stats.hp,
                mp: stats.mp,
            },
            status_effects: StatusEffects::default(),
            moves: Vec::new(),
            behavior: None,
        }
    }

    pub fn with_moves(mut self, moves: &[&str]) -> Self {
        self.moves = moves.iter().map(|m| m.to_string()).collect();
        self
    }
}

impl Actor for PlayerAvatar {
    fn name(&self) -> &str {
        &self.name
    }

    fn level(&self) -> u8 {
        self.level
    }

    fn stats(&self) -> &StatBlock {
        &self.stats
    }

    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    fn status_effects(&self) -> &StatusEffects {
        &self.status_effects
    }

    fn status_effects_mut(&mut self) -> &mut StatusEffects {
        &mut self.status_effects
    }

    fn known_moves(&self) -> &[String] {
        &self.moves
    }

    fn behavior(&self) -> Option<BehaviorWeights> {
        self.behavior
    }
}
