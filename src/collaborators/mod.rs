//! Ports the engines consume instead of reaching for global game state.
//!
//! Every engine receives its collaborators explicitly. The traits here are
//! deliberately small; `memory` provides in-process implementations good
//! enough for the demo binary and the test suite.

pub mod memory;

pub use memory::{
    InMemoryCollection, InMemoryInventory, SimplePlayer, SpeciesTable, TableLoot,
};

use crate::battle::actor::Actor;
use crate::battle::state::ParticipantId;
use crate::creature::Creature;
use crate::events::Notification;
use schema::{BreedingPair, SpeciesData, StatType, StatusKind};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Species and breeding data lookup.
pub trait SpeciesBook {
    fn species(&self, key: &str) -> Option<&SpeciesData>;

    /// The breeding entry for this pair, in either order.
    fn breeding_pair(&self, a: &str, b: &str) -> Option<&BreedingPair>;
}

/// What a consumable item does when used in battle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumable {
    pub heal_hp: u32,
    pub restore_mp: u32,
}

pub trait Inventory {
    fn quantity(&self, item: &str) -> u32;

    /// Remove `amount` units. Returns false, leaving the stock untouched,
    /// when there are not enough.
    fn consume(&mut self, item: &str, amount: u32) -> bool;

    fn add(&mut self, item: &str, amount: u32);

    fn consumable(&self, _item: &str) -> Option<Consumable> {
        None
    }

    /// Flat capture bonus for capture items.
    fn capture_bonus(&self, _item: &str) -> Option<i32> {
        None
    }

    /// True when every listed item is held, counting repeated entries.
    fn has_all(&self, items: &[String]) -> bool {
        items.iter().all(|item| {
            let needed = items.iter().filter(|other| *other == item).count() as u32;
            self.quantity(item) >= needed
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDrop {
    pub item: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loot {
    pub gold: u64,
    pub items: Vec<ItemDrop>,
}

pub trait LootGenerator {
    fn generate(&mut self, species: &str, level: u8, player_level: u8) -> Loot;
}

pub trait PlayerProgression {
    fn player_level(&self) -> u8;
    fn grant_experience(&mut self, amount: u64);
    fn grant_gold(&mut self, amount: u64);
}

/// A spell the combat session asks the spellcaster to resolve.
#[derive(Debug)]
pub struct SpellRequest<'a> {
    pub caster: ParticipantId,
    pub caster_actor: &'a dyn Actor,
    pub spell_id: &'a str,
    pub target: Option<ParticipantId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpellEffectKind {
    Damage(u32),
    Heal(u32),
    StatBuff { stat: StatType, amount: u32, rounds: u32 },
    StatDebuff { stat: StatType, amount: u32, rounds: u32 },
    StatusApplied { status: StatusKind, duration: u32 },
    StatusRemoved(StatusKind),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellEffect {
    pub target: ParticipantId,
    pub kind: SpellEffectKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpellCast {
    pub success: bool,
    pub mp_consumed: u32,
    pub effects: Vec<SpellEffect>,
    pub message: Option<String>,
}

impl SpellCast {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// The spell subsystem. Spell definitions live behind this trait; the
/// session only applies the effects it reports.
pub trait Spellcaster {
    /// Whether `actor` can pay `cost` MP.
    fn has_mana(&self, _caster: ParticipantId, actor: &dyn Actor, cost: u32) -> bool {
        actor.vitals().mp >= cost
    }

    /// Pay `cost` MP for `actor`. Only called after `has_mana` approved it.
    fn spend_mana(&mut self, _caster: ParticipantId, actor: &mut dyn Actor, cost: u32) {
        actor.spend_mp(cost);
    }

    /// MP to restore at the end of the caster's turn.
    fn regeneration(&mut self, caster: ParticipantId, actor: &dyn Actor) -> u32;

    fn cast(&mut self, request: SpellRequest<'_>) -> SpellCast;

    /// Called once per participant at the end of every round.
    fn end_round(&mut self, _caster: ParticipantId) {}
}

/// Fire-and-forget user-facing messages. Implementations must not fail.
pub trait NotificationSink {
    fn notify(&self, notification: Notification);
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl NotificationSink for NullNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Long-term storage for captured creatures.
pub trait CreatureCollection {
    /// Stores the creature and returns the id it was filed under.
    fn store(&mut self, creature: Creature) -> String;
}

/// Yes/no gate for evolutions that consume items.
pub trait EvolutionConfirmer {
    fn confirm(&self, creature: &Creature, into: &str) -> bool;
}

/// Accepts every evolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl EvolutionConfirmer for AutoConfirm {
    fn confirm(&self, _creature: &Creature, _into: &str) -> bool {
        true
    }
}

/// Milliseconds since the Unix epoch.
pub trait Clock {
    fn now_millis(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: Cell<u64>,
}

impl FixedClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn advance(&self, millis: u64) {
        self.now.set(self.now.get() + millis);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.now.get()
    }
}

// Shared handles, so a caller can keep inspecting a collaborator while an
// engine owns another handle to it.

impl<T: SpeciesBook + ?Sized> SpeciesBook for Rc<T> {
    fn species(&self, key: &str) -> Option<&SpeciesData> {
        (**self).species(key)
    }

    fn breeding_pair(&self, a: &str, b: &str) -> Option<&BreedingPair> {
        (**self).breeding_pair(a, b)
    }
}

impl<T: NotificationSink + ?Sized> NotificationSink for Rc<T> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

impl<T: Clock + ?Sized> Clock for Rc<T> {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}

impl<T: Inventory + ?Sized> Inventory for Rc<RefCell<T>> {
    fn quantity(&self, item: &str) -> u32 {
        self.borrow().quantity(item)
    }

    fn consume(&mut self, item: &str, amount: u32) -> bool {
        self.borrow_mut().consume(item, amount)
    }

    fn add(&mut self, item: &str, amount: u32) {
        self.borrow_mut().add(item, amount)
    }

    fn consumable(&self, item: &str) -> Option<Consumable> {
        self.borrow().consumable(item)
    }

    fn capture_bonus(&self, item: &str) -> Option<i32> {
        self.borrow().capture_bonus(item)
    }
}

impl<T: PlayerProgression + ?Sized> PlayerProgression for Rc<RefCell<T>> {
    fn player_level(&self) -> u8 {
        self.borrow().player_level()
    }

    fn grant_experience(&mut self, amount: u64) {
        self.borrow_mut().grant_experience(amount)
    }

    fn grant_gold(&mut self, amount: u64) {
        self.borrow_mut().grant_gold(amount)
    }
}

impl<T: CreatureCollection + ?Sized> CreatureCollection for Rc<RefCell<T>> {
    fn store(&mut self, creature: Creature) -> String {
        self.borrow_mut().store(creature)
    }
}

impl<T: LootGenerator + ?Sized> LootGenerator for Rc<RefCell<T>> {
    fn generate(&mut self, species: &str, level: u8, player_level: u8) -> Loot {
        self.borrow_mut().generate(species, level, player_level)
    }
}

impl<T: Spellcaster + ?Sized> Spellcaster for Rc<RefCell<T>> {
    fn has_mana(&self, caster: ParticipantId, actor: &dyn Actor, cost: u32) -> bool {
        self.borrow().has_mana(caster, actor, cost)
    }

    fn spend_mana(&mut self, caster: ParticipantId, actor: &mut dyn Actor, cost: u32) {
        self.borrow_mut().spend_mana(caster, actor, cost)
    }

    fn regeneration(&mut self, caster: ParticipantId, actor: &dyn Actor) -> u32 {
        self.borrow_mut().regeneration(caster, actor)
    }

    fn cast(&mut self, request: SpellRequest<'_>) -> SpellCast {
        self.borrow_mut().cast(request)
    }

    fn end_round(&mut self, caster: ParticipantId) {
        self.borrow_mut().end_round(caster)
    }
}
