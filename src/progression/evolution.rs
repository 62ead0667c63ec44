use super::moves::moves_for_level;
use super::Progression;
use crate::creature::Creature;
use crate::errors::EngineResult;
use crate::events::ProgressionEvent;
use schema::{EvolutionData, SpeciesData};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionReport {
    pub from: String,
    pub to: String,
    pub stage: u32,
    pub consumed_items: Vec<String>,
}

impl<'a> Progression<'a> {
    /// Evolve the creature if its species has an evolution it now qualifies
    /// for. Runs after every level-up and can be called directly after an
    /// evolution item was obtained.
    ///
    /// `Ok(None)` means no evolution happened; the creature is untouched.
    pub fn check_evolution(&mut self, creature: &mut Creature) -> EngineResult<Option<EvolutionReport>> {
        if creature.wild {
            return Ok(None);
        }
        let species_data = self.lookup(&creature.species)?;
        let Some(evolution) = species_data
            .evolutions
            .iter()
            .find(|evolution| creature.level >= evolution.min_level)
        else {
            return Ok(None);
        };

        let book = self.species;
        let Some(target) = book.species(&evolution.evolves_into) else {
            tracing::warn!(
                "{} cannot evolve: no species data for '{}'",
                creature.species,
                evolution.evolves_into
            );
            return Ok(None);
        };

        if !evolution.required_items.is_empty() && !self.pay_for_evolution(creature, evolution) {
            return Ok(None);
        }

        Ok(Some(self.evolve(creature, &evolution.evolves_into, target, &evolution.required_items)))
    }

    /// Alias of [`Progression::check_evolution`] for item-triggered evolution.
    pub fn try_evolve(&mut self, creature: &mut Creature) -> EngineResult<Option<EvolutionReport>> {
        self.check_evolution(creature)
    }

    /// Possession check, confirmation, then consumption. Returns false (and
    /// consumes nothing) when any gate fails.
    fn pay_for_evolution(&mut self, creature: &Creature, evolution: &EvolutionData) -> bool {
        let name = creature.display_name().to_string();
        let into = evolution.evolves_into.clone();

        let holds_items = match self.inventory.as_deref() {
            Some(inventory) => inventory.has_all(&evolution.required_items),
            None => {
                self.notify(ProgressionEvent::EvolutionBlocked {
                    name,
                    into,
                    reason: "no inventory available".to_string(),
                });
                return false;
            }
        };

        if !holds_items {
            self.notify(ProgressionEvent::EvolutionBlocked {
                name,
                into,
                reason: format!("requires {}", evolution.required_items.join(", ")),
            });
            return false;
        }

        if !self.confirmer.confirm(creature, &evolution.evolves_into) {
            tracing::debug!("Evolution of {} into {} declined", name, into);
            self.notify(ProgressionEvent::EvolutionDeclined { name, into });
            return false;
        }

        if let Some(inventory) = self.inventory.as_deref_mut() {
            for item in &evolution.required_items {
                if !inventory.consume(item, 1) {
                    tracing::warn!("Inventory refused to consume '{}' after reporting it held", item);
                }
            }
        }
        true
    }

    fn evolve(
        &mut self,
        creature: &mut Creature,
        target_key: &str,
        target: &SpeciesData,
        consumed_items: &[String],
    ) -> EvolutionReport {
        let hp_ratio = ratio(creature.vitals.hp, creature.max_hp());
        let mp_ratio = ratio(creature.vitals.mp, creature.max_mp());
        let from = creature.species_name.clone();

        creature.species = target_key.to_string();
        creature.species_name = target.name.clone();
        creature.evolution_stage += 1;
        creature.refresh_stats(target);
        creature.vitals.hp = scaled(hp_ratio, creature.max_hp());
        creature.vitals.mp = scaled(mp_ratio, creature.max_mp());
        creature.abilities = target.abilities.clone();
        creature.set_moves(moves_for_level(target, creature.level));
        creature.refresh_experience_to_next(target);

        tracing::info!("{} evolved into {}", from, target.name);
        self.notify(ProgressionEvent::Evolved {
            name: creature.display_name().to_string(),
            from: from.clone(),
            to: target.name.clone(),
        });

        EvolutionReport {
            from,
            to: target.name.clone(),
            stage: creature.evolution_stage,
            consumed_items: consumed_items.to_vec(),
        }
    }
}

fn ratio(current: u32, max: u32) -> f64 {
    if max == 0 {
        1.0
    } else {
        current as f64 / max as f64
    }
}

/// A live creature never rounds down to zero HP through rescaling.
fn scaled(ratio: f64, max: u32) -> u32 {
    let value = (ratio * max as f64).floor() as u32;
    if ratio > 0.0 && max > 0 {
        value.clamp(1, max)
    } else {
        0
    }
}
