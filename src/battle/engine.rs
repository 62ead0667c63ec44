//! Action resolution for a running [`CombatSession`].
//!
//! Every action validates its input completely before touching any state. An
//! `Err` therefore means nothing changed: no HP, MP or items were spent, no log
//! entry was written and the turn did not advance. A successful action is
//! logged and ends the actor's turn.

use crate::battle::ai::{lowest_hp_opponent, AiChoice, AiTurn, Behavior, WeightedBehavior};
use crate::battle::calculators::{calculate_damage, DamageInput, DamageKind};
use crate::battle::conditions::incapacitating_status;
use crate::battle::session::CombatSession;
use crate::battle::state::{
    BattleOutcome, CombatAction, DamageReport, FleeReport, ItemReport, ParticipantId, SpellReport,
    StatModifier,
};
use crate::collaborators::{Consumable, SpellEffect, SpellEffectKind, SpellRequest};
use crate::errors::{EngineError, EngineResult};
use crate::events::BattleEvent;

impl CombatSession {
    /// A basic physical attack.
    pub fn attack(&mut self, attacker: ParticipantId, target: ParticipantId) -> EngineResult<DamageReport> {
        self.ensure_active()?;
        let attacker_index = self.acting_index(attacker)?;
        let target_index = self.target_index(attacker_index, target)?;

        let input = DamageInput::between(
            &self.participants[attacker_index],
            &self.participants[target_index],
            DamageKind::Physical,
            self.config.combat.base_power,
            0,
        );
        let report = self.strike(attacker_index, target_index, input, 0);
        self.finish_action(attacker, CombatAction::Attack { target });
        Ok(report)
    }

    /// A magical attack paid for with MP. Uses the magic stats and adds the
    /// configured flat bonus before multipliers.
    pub fn magic(
        &mut self,
        attacker: ParticipantId,
        target: ParticipantId,
        move_id: &str,
        mp_cost: u32,
    ) -> EngineResult<DamageReport> {
        self.ensure_active()?;
        let attacker_index = self.acting_index(attacker)?;
        let target_index = self.target_index(attacker_index, target)?;

        let caster = &self.participants[attacker_index];
        let affordable = match self.services.spellcaster.as_ref() {
            Some(spellcaster) => spellcaster.has_mana(attacker, caster.actor(), mp_cost),
            None => caster.actor().vitals().mp >= mp_cost,
        };
        if !affordable {
            return Err(EngineError::InsufficientResource(format!(
                "{} needs {} MP for {} but has {}",
                caster.name(),
                mp_cost,
                move_id,
                caster.actor().vitals().mp
            )));
        }

        let caster = &mut self.participants[attacker_index];
        match self.services.spellcaster.as_mut() {
            Some(spellcaster) => spellcaster.spend_mana(attacker, caster.actor_mut(), mp_cost),
            None => caster.actor_mut().spend_mp(mp_cost),
        }
        let caster_name = caster.name().to_string();
        self.emit(BattleEvent::MagicCast {
            caster: caster_name,
            move_id: move_id.to_string(),
            mp_spent: mp_cost,
        });

        let input = DamageInput::between(
            &self.participants[attacker_index],
            &self.participants[target_index],
            DamageKind::Magical,
            self.config.combat.base_power,
            self.config.combat.magic_bonus,
        );
        let report = self.strike(attacker_index, target_index, input, mp_cost);
        self.finish_action(
            attacker,
            CombatAction::Magic {
                target,
                move_id: move_id.to_string(),
                mp_cost,
            },
        );
        Ok(report)
    }

    fn strike(&mut self, attacker: usize, target: usize, input: DamageInput, mp_spent: u32) -> DamageReport {
        let roll = calculate_damage(&input, self.rng.as_mut());
        let attacker_id = self.participants[attacker].id;
        let attacker_name = self.participants[attacker].name().to_string();

        let defender = &mut self.participants[target];
        defender.actor_mut().take_damage(roll.damage);
        let remaining_hp = defender.actor().vitals().hp;
        let report = DamageReport {
            attacker: attacker_id,
            target: defender.id,
            damage: roll.damage,
            critical: roll.critical,
            remaining_hp,
            mp_spent,
            target_defeated: remaining_hp == 0,
        };
        let target_name = defender.name().to_string();

        tracing::debug!(
            "{} hit {} for {}{}",
            attacker_name,
            target_name,
            roll.damage,
            if roll.critical { " (critical)" } else { "" }
        );
        self.emit(BattleEvent::AttackLanded {
            attacker: attacker_name,
            target: target_name,
            damage: roll.damage,
            critical: roll.critical,
            remaining_hp,
        });
        report
    }

    /// Resolve a spell through the spellcaster and apply the effects it reports.
    pub fn cast_spell(
        &mut self,
        caster: ParticipantId,
        spell_id: &str,
        target: Option<ParticipantId>,
    ) -> EngineResult<SpellReport> {
        self.ensure_active()?;
        let caster_index = self.acting_index(caster)?;
        if let Some(target) = target {
            let index = self.index_of(target)?;
            if self.participants[index].is_defeated() {
                return Err(EngineError::InvalidTarget(format!(
                    "{} has already been defeated",
                    self.participants[index].name()
                )));
            }
        }

        let Some(spellcaster) = self.services.spellcaster.as_mut() else {
            return Err(EngineError::DataUnavailable("no spellcaster available".to_string()));
        };
        let cast = spellcaster.cast(SpellRequest {
            caster,
            caster_actor: self.participants[caster_index].actor(),
            spell_id,
            target,
        });
        if !cast.success {
            let reason = cast
                .message
                .unwrap_or_else(|| format!("{} could not be cast", spell_id));
            return Err(EngineError::SpellFailed(reason));
        }

        let caster_participant = &mut self.participants[caster_index];
        spellcaster.spend_mana(caster, caster_participant.actor_mut(), cast.mp_consumed);
        let caster_name = caster_participant.name().to_string();
        self.emit(BattleEvent::SpellResolved {
            caster: caster_name,
            spell_id: spell_id.to_string(),
        });

        let mut applied = Vec::with_capacity(cast.effects.len());
        for effect in cast.effects {
            if self.apply_spell_effect(&effect) {
                applied.push(effect);
            }
        }
        let defeated = self.resolve_defeats();

        self.finish_action(
            caster,
            CombatAction::CastSpell {
                spell_id: spell_id.to_string(),
                target,
            },
        );
        Ok(SpellReport {
            spell_id: spell_id.to_string(),
            mp_consumed: cast.mp_consumed,
            applied,
            defeated,
        })
    }

    /// Returns false when the effect was skipped.
    fn apply_spell_effect(&mut self, effect: &SpellEffect) -> bool {
        let Some(participant) = self
            .participants
            .iter_mut()
            .find(|p| p.id == effect.target && !p.is_defeated())
        else {
            tracing::warn!("Spell effect on {} skipped: no standing participant", effect.target);
            return false;
        };
        let target = participant.name().to_string();

        let event = match effect.kind {
            SpellEffectKind::Damage(amount) => {
                let damage = participant.actor_mut().take_damage(amount);
                BattleEvent::DamageTaken {
                    target,
                    damage,
                    remaining_hp: participant.actor().vitals().hp,
                }
            }
            SpellEffectKind::Heal(amount) => {
                let healed = participant.actor_mut().heal(amount);
                BattleEvent::Healed {
                    target,
                    amount: healed,
                    new_hp: participant.actor().vitals().hp,
                }
            }
            SpellEffectKind::StatBuff { stat, amount, rounds }
            | SpellEffectKind::StatDebuff { stat, amount, rounds } => {
                let signed = amount.min(i32::MAX as u32) as i32;
                let amount = if matches!(effect.kind, SpellEffectKind::StatDebuff { .. }) {
                    -signed
                } else {
                    signed
                };
                participant.modifiers.push(StatModifier {
                    stat,
                    amount,
                    remaining_rounds: rounds,
                });
                BattleEvent::StatModified {
                    target,
                    stat,
                    amount,
                    rounds,
                }
            }
            SpellEffectKind::StatusApplied { status, duration } => {
                participant.actor_mut().status_effects_mut().apply(status, duration);
                BattleEvent::StatusApplied { target, status }
            }
            SpellEffectKind::StatusRemoved(status) => {
                if participant.actor_mut().status_effects_mut().remove(status).is_none() {
                    return true;
                }
                BattleEvent::StatusRemoved { target, status }
            }
        };
        self.emit(event);
        true
    }

    /// Use a consumable from the inventory on the acting participant.
    pub fn use_item(&mut self, user: ParticipantId, item: &str) -> EngineResult<ItemReport> {
        self.ensure_active()?;
        let user_index = self.acting_index(user)?;

        let Some(inventory) = self.services.inventory.as_mut() else {
            return Err(EngineError::DataUnavailable(format!("no inventory to take {} from", item)));
        };
        if inventory.quantity(item) == 0 {
            return Err(EngineError::InsufficientResource(format!("no {} left", item)));
        }
        let combat = &self.config.combat;
        let effect = inventory.consumable(item).or_else(|| {
            (item == combat.basic_potion).then_some(Consumable {
                heal_hp: combat.basic_potion_heal,
                restore_mp: 0,
            })
        });
        let Some(effect) = effect else {
            return Err(EngineError::InvalidTarget(format!("{} cannot be used in battle", item)));
        };
        if !inventory.consume(item, 1) {
            return Err(EngineError::InsufficientResource(format!("no {} left", item)));
        }

        let participant = &mut self.participants[user_index];
        let healed = participant.actor_mut().heal(effect.heal_hp);
        let mp_restored = participant.actor_mut().restore_mp(effect.restore_mp);
        let name = participant.name().to_string();
        let new_hp = participant.actor().vitals().hp;

        self.emit(BattleEvent::ItemUsed {
            user: name.clone(),
            item: item.to_string(),
        });
        if healed > 0 {
            self.emit(BattleEvent::Healed {
                target: name.clone(),
                amount: healed,
                new_hp,
            });
        }
        if mp_restored > 0 {
            self.emit(BattleEvent::MpRestored {
                target: name,
                amount: mp_restored,
            });
        }

        self.finish_action(user, CombatAction::UseItem { item: item.to_string() });
        Ok(ItemReport {
            item: item.to_string(),
            healed,
            mp_restored,
        })
    }

    /// Try to run. `chance` defaults to the configured flee chance; a roll of
    /// 1-100 at or under it ends the battle as fled.
    pub fn attempt_flee(&mut self, user: ParticipantId, chance: Option<u32>) -> EngineResult<FleeReport> {
        self.ensure_active()?;
        let user_index = self.acting_index(user)?;
        let chance = chance
            .unwrap_or(self.config.combat.default_flee_chance)
            .min(100);

        let roll = self.rng.roll_percent("flee roll");
        let success = roll <= chance;
        let name = self.participants[user_index].name().to_string();
        tracing::debug!("{} tries to flee: rolled {} against {}%", name, roll, chance);

        if success {
            self.record(user, CombatAction::Flee { success });
            self.emit(BattleEvent::FleeSucceeded { name });
            self.end_battle(BattleOutcome::Fled);
        } else {
            self.emit(BattleEvent::FleeFailed { name });
            self.finish_action(user, CombatAction::Flee { success });
        }
        Ok(FleeReport { chance, roll, success })
    }

    /// Guard for the turn. Has no mechanical effect beyond spending it.
    pub fn defend(&mut self, id: ParticipantId) -> EngineResult<()> {
        self.ensure_active()?;
        let index = self.acting_index(id)?;
        let name = self.participants[index].name().to_string();
        self.emit(BattleEvent::Defended { name });
        self.finish_action(id, CombatAction::Defend);
        Ok(())
    }

    /// Let the default weighted AI play this participant's turn.
    pub fn ai_take_turn(&mut self, id: ParticipantId) -> EngineResult<AiTurn> {
        self.ai_take_turn_with(id, &WeightedBehavior::default())
    }

    pub fn ai_take_turn_with(&mut self, id: ParticipantId, behavior: &dyn Behavior) -> EngineResult<AiTurn> {
        self.ensure_active()?;
        let index = self.acting_index(id)?;

        if let Some(status) = incapacitating_status(&self.participants[index]) {
            let name = self.participants[index].name().to_string();
            tracing::debug!("{} cannot act ({})", name, status);
            self.emit(BattleEvent::Incapacitated { name, status });
            self.finish_action(id, CombatAction::Incapacitated { status });
            return Ok(AiTurn {
                choice: AiChoice::Skip,
                target: None,
                move_id: None,
                fell_back: false,
            });
        }

        let Some(target) = lowest_hp_opponent(&self.participants, &self.participants[index]) else {
            return Err(EngineError::InvalidTarget(format!(
                "{} has no opponent to target",
                self.participants[index].name()
            )));
        };
        let choice = behavior.decide(&self.participants[index], self.rng.as_mut());
        tracing::debug!("AI {} chose {:?}", id, choice);

        match choice {
            AiChoice::Defend => {
                self.defend(id)?;
                Ok(AiTurn {
                    choice,
                    target: None,
                    move_id: None,
                    fell_back: false,
                })
            }
            AiChoice::Attack => self.ai_attack(id, target, choice, None, false),
            AiChoice::Special => self.ai_special(id, index, target),
            AiChoice::Skip => {
                self.end_turn();
                Ok(AiTurn {
                    choice,
                    target: None,
                    move_id: None,
                    fell_back: false,
                })
            }
        }
    }

    /// A random known move, cast through the spellcaster when there is one.
    /// Falls back to a basic attack when the move cannot be paid for.
    fn ai_special(&mut self, id: ParticipantId, index: usize, target: ParticipantId) -> EngineResult<AiTurn> {
        let moves = self.participants[index].actor().known_moves();
        if moves.is_empty() {
            return self.ai_attack(id, target, AiChoice::Attack, None, false);
        }
        let pick = self.rng.pick_index(moves.len(), "ai special move");
        let move_id = moves[pick].clone();

        let outcome = if self.services.spellcaster.is_some() {
            self.cast_spell(id, &move_id, Some(target)).map(|_| ())
        } else {
            let cost = self.config.combat.ai_special_cost;
            self.magic(id, target, &move_id, cost).map(|_| ())
        };

        match outcome {
            Ok(()) => Ok(AiTurn {
                choice: AiChoice::Special,
                target: Some(target),
                move_id: Some(move_id),
                fell_back: false,
            }),
            Err(EngineError::InsufficientResource(reason) | EngineError::SpellFailed(reason)) => {
                tracing::debug!("AI {} falls back to attacking: {}", id, reason);
                self.ai_attack(id, target, AiChoice::Special, Some(move_id), true)
            }
            Err(err) => Err(err),
        }
    }

    fn ai_attack(
        &mut self,
        id: ParticipantId,
        target: ParticipantId,
        choice: AiChoice,
        move_id: Option<String>,
        fell_back: bool,
    ) -> EngineResult<AiTurn> {
        self.attack(id, target)?;
        Ok(AiTurn {
            choice,
            target: Some(target),
            move_id,
            fell_back,
        })
    }
}
