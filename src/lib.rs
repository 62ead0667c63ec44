//! Monster Tamer Rules Engine
//!
//! The game rules of a monster-collecting RPG: derived stats, experience and
//! evolution, breeding, capture and a turn-based combat session. Persistence,
//! spells, loot and user interaction stay outside the crate and are reached
//! through the collaborator traits in [`collaborators`].

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod breeding;
pub mod collaborators;
pub mod config;
pub mod creature;
pub mod errors;
pub mod events;
pub mod progression;
pub mod rng;
pub mod stats;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
// Plain data records shared by every part of the engine.
pub use schema::{
    BreedingOutcome, BreedingPair, EvolutionData, GrowthRates, LevelMove, Rarity, Side,
    SpeciesData, StatBlock, StatType, StatusKind,
};

// --- From this crate's modules (`src/`) ---

// Combat.
pub use battle::{
    Actor, AiChoice, AiTurn, BattleOutcome, BattleServices, CaptureOptions, CombatAction,
    CombatSession, Encounters, Participant, ParticipantId, PlayerAvatar,
};

// Creatures and their growth.
pub use breeding::{BreedCheck, BreedingRecord, BreedingResolver};
pub use creature::{Creature, Personality, StatusEffect, StatusEffects, Vitals};
pub use progression::{Progression, RewardSummary};
pub use stats::{compute_stats, experience_threshold, GrowthTier, IndividualValues};

// Collaborators, configuration and randomness.
pub use collaborators::{
    InMemoryCollection, InMemoryInventory, SimplePlayer, SpeciesBook, SpeciesTable, TableLoot,
};
pub use config::EngineConfig;
pub use rng::{GameRng, ScriptedRng, SeededRng};

// Notifications and errors.
pub use errors::{EngineError, EngineResult};
pub use events::{BattleEvent, BreedingEvent, EventBus, Notification, ProgressionEvent};
