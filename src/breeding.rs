//! Pairing owned creatures to produce level-1 offspring.

use crate::collaborators::{Clock, NotificationSink, NullNotifier, SpeciesBook, SystemClock};
use crate::config::BreedingConfig;
use crate::creature::{Creature, Lineage, Personality};
use crate::errors::{EngineError, EngineResult};
use crate::events::{BreedingEvent, Notification};
use crate::rng::GameRng;
use crate::stats::generate_ivs;
use schema::{BreedingOutcome, StatType};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use strum::IntoEnumIterator;

/// Whether two creatures may breed, and why not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedCheck {
    pub ok: bool,
    pub reason: Option<String>,
}

impl BreedCheck {
    fn pass() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    fn fail(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedingRecord {
    pub parents: [String; 2],
    pub parent_names: [String; 2],
    pub offspring_species: String,
    pub generation: u32,
    pub bred_at: u64,
}

pub struct BreedingResolver {
    species: Rc<dyn SpeciesBook>,
    rng: Box<dyn GameRng>,
    clock: Rc<dyn Clock>,
    notifier: Rc<dyn NotificationSink>,
    config: BreedingConfig,
    history: Vec<BreedingRecord>,
}

impl BreedingResolver {
    pub fn new(species: Rc<dyn SpeciesBook>, rng: Box<dyn GameRng>, config: BreedingConfig) -> Self {
        Self {
            species,
            rng,
            clock: Rc::new(SystemClock),
            notifier: Rc::new(NullNotifier),
            config,
            history: Vec::new(),
        }
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: Rc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn history(&self) -> &[BreedingRecord] {
        &self.history
    }

    /// Checks run in a fixed order and the first failure is reported.
    pub fn can_breed_together(&self, a: &Creature, b: &Creature) -> BreedCheck {
        if std::ptr::eq(a, b) {
            return BreedCheck::fail("A monster cannot breed with itself");
        }
        if a.wild || b.wild {
            return BreedCheck::fail("Wild monsters cannot breed");
        }

        let now = self.clock.now_millis();
        for parent in [a, b] {
            if parent.on_breeding_cooldown(now) {
                return BreedCheck::fail(format!("{} needs to rest before breeding again", parent.display_name()));
            }
        }

        if let Err(reason) = self.check_compatible(a, b) {
            return BreedCheck::fail(reason);
        }

        if a.level < self.config.min_level || b.level < self.config.min_level {
            return BreedCheck::fail(format!(
                "Both monsters must be at least level {}",
                self.config.min_level
            ));
        }

        let friendly = |creature: &Creature| {
            creature.friendship().unwrap_or(0) >= self.config.min_friendship
        };
        if !friendly(a) || !friendly(b) {
            return BreedCheck::fail(format!(
                "Both monsters need at least {} friendship",
                self.config.min_friendship
            ));
        }

        BreedCheck::pass()
    }

    fn check_compatible(&self, a: &Creature, b: &Creature) -> Result<(), String> {
        if self.species.breeding_pair(&a.species, &b.species).is_some() || a.species == b.species {
            return Ok(());
        }
        let data_a = self
            .species
            .species(&a.species)
            .ok_or_else(|| format!("Unknown species '{}'", a.species))?;
        let data_b = self
            .species
            .species(&b.species)
            .ok_or_else(|| format!("Unknown species '{}'", b.species))?;
        if data_a.shares_type_with(data_b) {
            Ok(())
        } else {
            Err(format!("{} and {} are not compatible", data_a.name, data_b.name))
        }
    }

    /// The weighted outcome table for this pair. Pairs that are only
    /// compatible through the fallback rule produce either parent's species
    /// with equal weight.
    fn outcomes(&self, a: &Creature, b: &Creature) -> Vec<BreedingOutcome> {
        match self.species.breeding_pair(&a.species, &b.species) {
            Some(pair) => pair.outcomes.clone(),
            None => {
                let mut outcomes = vec![BreedingOutcome {
                    species: a.species.clone(),
                    weight: 1,
                }];
                if b.species != a.species {
                    outcomes.push(BreedingOutcome {
                        species: b.species.clone(),
                        weight: 1,
                    });
                }
                outcomes
            }
        }
    }

    /// Breed two eligible creatures. Both parents go on cooldown.
    ///
    /// Random draws, in order: outcome roll, eight fresh IVs, eight
    /// inheritance coin flips, personality, inherited move.
    pub fn breed(&mut self, a: &mut Creature, b: &mut Creature) -> EngineResult<Creature> {
        let check = self.can_breed_together(a, b);
        if !check.ok {
            return Err(EngineError::InvalidTarget(check.reason.unwrap_or_default()));
        }

        let outcomes = self.outcomes(a, b);
        let total_weight: u32 = outcomes.iter().map(|outcome| outcome.weight).sum();
        if total_weight == 0 {
            return Err(EngineError::DataUnavailable(format!(
                "no breeding outcomes for {} x {}",
                a.species, b.species
            )));
        }
        // Resolve every outcome's data up front so a bad table fails before any roll.
        for outcome in &outcomes {
            if self.species.species(&outcome.species).is_none() {
                return Err(EngineError::DataUnavailable(format!(
                    "no species data for breeding outcome '{}'",
                    outcome.species
                )));
            }
        }

        let roll = self.rng.next_unit("breeding outcome") * total_weight as f64;
        let mut cumulative = 0.0;
        let mut chosen = &outcomes[outcomes.len() - 1];
        for outcome in &outcomes {
            cumulative += outcome.weight as f64;
            if roll < cumulative {
                chosen = outcome;
                break;
            }
        }
        let offspring_key = chosen.species.clone();
        let offspring_data = self.species.species(&offspring_key).ok_or_else(|| {
            EngineError::DataUnavailable(format!("no species data for '{}'", offspring_key))
        })?;

        let mut ivs = generate_ivs(self.rng.as_mut());
        for stat in StatType::iter() {
            if self.rng.chance(0.5, "inherit parent average") {
                let average = (a.ivs.get(stat) as u16 + b.ivs.get(stat) as u16) / 2;
                ivs.set(stat, average as u8);
            }
        }
        let personality = Personality::random(self.rng.as_mut());

        let now = self.clock.now_millis();
        let owner = a
            .capture
            .as_ref()
            .or(b.capture.as_ref())
            .map(|capture| capture.owner_id.clone())
            .unwrap_or_default();

        let mut offspring = Creature::new(offspring_key.clone(), offspring_data, 1, ivs, personality);
        offspring.mark_captured(owner, now, 0);
        offspring.lineage = Some(Lineage {
            parents: [a.species.clone(), b.species.clone()],
            generation: a.generation().max(b.generation()) + 1,
        });

        let mut parent_moves: Vec<&String> = a.moves().iter().collect();
        for move_id in b.moves() {
            if !parent_moves.contains(&move_id) {
                parent_moves.push(move_id);
            }
        }
        if !parent_moves.is_empty() {
            let index = self.rng.pick_index(parent_moves.len(), "inherited move");
            offspring.learn_move(parent_moves[index]);
        }

        let cooldown_until = now + self.config.cooldown_ms;
        a.breeding_cooldown_until = Some(cooldown_until);
        b.breeding_cooldown_until = Some(cooldown_until);

        let generation = offspring.generation();
        self.history.push(BreedingRecord {
            parents: [a.species.clone(), b.species.clone()],
            parent_names: [a.display_name().to_string(), b.display_name().to_string()],
            offspring_species: offspring_key.clone(),
            generation,
            bred_at: now,
        });

        tracing::info!(
            "{} and {} produced a {} (generation {})",
            a.display_name(),
            b.display_name(),
            offspring.species_name,
            generation
        );
        self.notifier.notify(Notification::Breeding(BreedingEvent::Bred {
            parents: [a.display_name().to_string(), b.display_name().to_string()],
            offspring: offspring.species_name.clone(),
            generation,
        }));

        Ok(offspring)
    }
}
