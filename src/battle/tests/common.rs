use crate::battle::services::BattleServices;
use crate::battle::session::CombatSession;
use crate::battle::state::{Participant, ParticipantId};
use crate::collaborators::SpeciesTable;
use crate::config::EngineConfig;
use crate::creature::{Creature, Personality};
use crate::events::EventBus;
use crate::rng::GameRng;
use crate::stats::IndividualValues;
use schema::{
    BreedingOutcome, BreedingPair, EvolutionData, GrowthRates, Rarity, Side, SpeciesData,
    StatBlock, StatusKind,
};
use std::rc::Rc;

/// A plain common species named after its key, with the given abilities and
/// no evolutions.
pub fn species_with(key: &str, abilities: &[&str]) -> SpeciesData {
    let mut name = key.to_string();
    if let Some(first) = name.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    SpeciesData {
        name,
        rarity: Rarity::Common,
        types: Vec::new(),
        base_stats: StatBlock {
            hp: 40,
            mp: 20,
            attack: 12,
            defense: 10,
            magic_attack: 10,
            magic_defense: 8,
            speed: 10,
            accuracy: 40,
        },
        growth: GrowthRates {
            hp: 2.0,
            ..GrowthRates::uniform(1.0)
        },
        abilities: abilities.iter().map(|ability| ability.to_string()).collect(),
        capture_rate: None,
        evolutions: Vec::new(),
        level_moves: Vec::new(),
        description: String::new(),
    }
}

pub fn slime_species() -> SpeciesData {
    let mut slime = species_with("slime", &["bounce"]);
    slime.types = vec!["water".to_string()];
    slime.evolutions = vec![EvolutionData {
        evolves_into: "king_slime".to_string(),
        min_level: 16,
        required_items: Vec::new(),
    }];
    slime
}

/// Slime → King Slime by level, Ember → Blaze with a sun stone, and a Bat
/// that shares the "beast" tag with Ember.
pub fn test_species_table() -> SpeciesTable {
    let mut table = SpeciesTable::new();
    table.insert("slime", slime_species());

    let mut king_slime = species_with("king_slime", &["bounce", "crush"]);
    king_slime.name = "King Slime".to_string();
    king_slime.rarity = Rarity::Uncommon;
    king_slime.types = vec!["water".to_string()];
    king_slime.base_stats.hp = 70;
    table.insert("king_slime", king_slime);

    let mut ember = species_with("ember", &["spark"]);
    ember.types = vec!["fire".to_string(), "beast".to_string()];
    ember.base_stats.speed = 15;
    ember.capture_rate = Some(45);
    ember.evolutions = vec![EvolutionData {
        evolves_into: "blaze".to_string(),
        min_level: 10,
        required_items: vec!["sun_stone".to_string()],
    }];
    table.insert("ember", ember);

    let mut blaze = species_with("blaze", &["spark", "flare"]);
    blaze.rarity = Rarity::Uncommon;
    blaze.types = vec!["fire".to_string(), "beast".to_string()];
    table.insert("blaze", blaze);

    let mut bat = species_with("bat", &["bite"]);
    bat.types = vec!["beast".to_string(), "air".to_string()];
    bat.base_stats.speed = 20;
    bat.rarity = Rarity::Uncommon;
    table.insert("bat", bat);

    table.add_pair(BreedingPair {
        parents: ["slime".to_string(), "bat".to_string()],
        outcomes: vec![
            BreedingOutcome {
                species: "slime".to_string(),
                weight: 3,
            },
            BreedingOutcome {
                species: "bat".to_string(),
                weight: 1,
            },
        ],
    });
    table
}

/// A builder for test creatures with predictable defaults: every IV is 10,
/// the personality is Calm, and the creature is wild unless `owned` is called.
///
/// # Example
/// ```ignore
/// let slime = CreatureBuilder::new("slime", 12)
///     .owned()
///     .with_friendship(60)
///     .with_status(StatusKind::Sleep, 2)
///     .build();
/// ```
pub struct CreatureBuilder {
    species: String,
    level: u8,
    moves: Option<Vec<String>>,
    hp: Option<u32>,
    statuses: Vec<(StatusKind, u32)>,
    owned: bool,
    friendship: Option<u8>,
    ivs: u8,
}

impl CreatureBuilder {
    pub fn new(species: &str, level: u8) -> Self {
        Self {
            species: species.to_string(),
            level,
            moves: None,
            hp: None,
            statuses: Vec::new(),
            owned: false,
            friendship: None,
            ivs: 10,
        }
    }

    pub fn with_moves(mut self, moves: &[&str]) -> Self {
        self.moves = Some(moves.iter().map(|m| m.to_string()).collect());
        self
    }

    /// Sets the current HP. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.hp = Some(hp);
        self
    }

    pub fn with_status(mut self, status: StatusKind, duration: u32) -> Self {
        self.statuses.push((status, duration));
        self
    }

    /// Owned by "player", captured at time zero.
    pub fn owned(mut self) -> Self {
        self.owned = true;
        self
    }

    pub fn with_friendship(mut self, friendship: u8) -> Self {
        self.friendship = Some(friendship);
        self
    }

    pub fn with_ivs(mut self, value: u8) -> Self {
        self.ivs = value;
        self
    }

    pub fn build(self) -> Creature {
        let table = test_species_table();
        let species_data = match crate::collaborators::SpeciesBook::species(&table, &self.species) {
            Some(data) => data,
            None => panic!("No test species data for '{}'", self.species),
        };

        let mut creature = Creature::new(
            self.species.clone(),
            species_data,
            self.level,
            IndividualValues::uniform(self.ivs),
            Personality::Calm,
        );
        if let Some(moves) = self.moves {
            creature.set_moves(moves);
        }
        if let Some(hp) = self.hp {
            creature.set_hp(hp);
        }
        for (status, duration) in self.statuses {
            creature.status_effects.apply(status, duration);
        }
        if self.owned {
            creature.mark_captured("player", 0, 0);
        }
        if let Some(friendship) = self.friendship {
            creature.set_friendship(friendship);
        }
        creature
    }
}

pub fn ally(id: u32, creature: Creature) -> Participant {
    Participant::new(ParticipantId(id), Side::Ally, creature)
}

pub fn opponent(id: u32, creature: Creature) -> Participant {
    Participant::new(ParticipantId(id), Side::Opponent, creature)
}

/// Services with the test species table and a recording notifier.
pub fn test_services() -> (BattleServices, Rc<EventBus>) {
    let bus = Rc::new(EventBus::new());
    let services = BattleServices::new()
        .with_species(Rc::new(test_species_table()))
        .with_notifier(bus.clone());
    (services, bus)
}

/// Start a battle with default configuration and `test_services`.
pub fn start_battle(
    participants: Vec<Participant>,
    rng: impl GameRng + 'static,
) -> (CombatSession, Rc<EventBus>) {
    let (services, bus) = test_services();
    let session = start_battle_with(participants, rng, services, EngineConfig::default());
    (session, bus)
}

pub fn start_battle_with(
    participants: Vec<Participant>,
    rng: impl GameRng + 'static,
    services: BattleServices,
    config: EngineConfig,
) -> CombatSession {
    match CombatSession::begin(participants, services, Box::new(rng), config) {
        Ok(session) => session,
        Err(err) => panic!("Failed to start test battle: {}", err),
    }
}
