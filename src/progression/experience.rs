use super::moves::moves_for_level;
use super::Progression;
use crate::creature::Creature;
use crate::errors::EngineResult;
use crate::events::ProgressionEvent;
use crate::stats::{experience_threshold, GrowthTier, MAX_LEVEL};
use schema::SpeciesData;

impl<'a> Progression<'a> {
    /// Award experience and apply every level-up it pays for.
    ///
    /// Wild creatures ignore experience entirely. Returns the number of
    /// levels gained.
    pub fn add_experience(&mut self, creature: &mut Creature, amount: u64) -> EngineResult<u32> {
        if creature.wild {
            return Ok(0);
        }
        // Validate before touching the creature.
        self.lookup(&creature.species)?;

        creature.experience = creature.experience.saturating_add(amount);
        let mut levels_gained = 0;

        while creature.level < MAX_LEVEL {
            // Re-read every pass: an evolution swaps the species mid-loop.
            let species_data = self.lookup(&creature.species)?;
            let threshold = experience_threshold(
                creature.level + 1,
                GrowthTier::from_rarity(species_data.rarity),
            );
            if creature.experience < threshold {
                break;
            }
            self.level_up(creature, species_data, threshold)?;
            levels_gained += 1;
        }

        let species_data = self.lookup(&creature.species)?;
        creature.refresh_experience_to_next(species_data);

        if levels_gained > 0 {
            tracing::debug!(
                "{} gained {} level(s), now level {} with {} exp",
                creature.display_name(),
                levels_gained,
                creature.level,
                creature.experience
            );
        }
        Ok(levels_gained)
    }

    fn level_up(
        &mut self,
        creature: &mut Creature,
        species_data: &SpeciesData,
        threshold: u64,
    ) -> EngineResult<()> {
        creature.experience -= threshold;
        creature.level += 1;

        // Heal by the growth of the maximums only.
        let old_stats = creature.stats;
        creature.refresh_stats(species_data);
        let hp_gain = creature.stats.hp.saturating_sub(old_stats.hp);
        let mp_gain = creature.stats.mp.saturating_sub(old_stats.mp);
        creature.set_hp(creature.vitals.hp + hp_gain);
        creature.set_mp(creature.vitals.mp + mp_gain);

        tracing::info!("{} grew to level {}", creature.display_name(), creature.level);
        self.notify(ProgressionEvent::LevelUp {
            name: creature.display_name().to_string(),
            level: creature.level,
        });

        let moves = moves_for_level(species_data, creature.level);
        if moves != creature.moves() {
            creature.set_moves(moves.clone());
            self.notify(ProgressionEvent::MovesChanged {
                name: creature.display_name().to_string(),
                moves,
            });
        }

        self.check_evolution(creature)?;
        let current = self.lookup(&creature.species)?;
        creature.refresh_experience_to_next(current);
        Ok(())
    }
}
