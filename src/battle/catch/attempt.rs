use super::calculation::{calculate_capture_chance, total_status_bonus, CaptureInput, CaptureModifiers};
use crate::battle::session::CombatSession;
use crate::battle::state::{BattleOutcome, CaptureReport, CombatAction, Participant, ParticipantId};
use crate::errors::{EngineError, EngineResult};
use crate::events::BattleEvent;
use schema::Side;
use serde::{Deserialize, Serialize};

/// How a capture attempt is made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureOptions {
    /// Capture item consumed for its bonus.
    pub item: Option<String>,
    pub flat_bonus: i32,
    pub multiplier: f64,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            item: None,
            flat_bonus: 0,
            multiplier: 1.0,
        }
    }
}

impl CaptureOptions {
    pub fn with_item(item: impl Into<String>) -> Self {
        Self {
            item: Some(item.into()),
            ..Self::default()
        }
    }
}

impl CombatSession {
    /// Capture chance in percent against `target`, before any testing
    /// overrides. Always within the configured bounds.
    pub fn compute_capture_chance(
        &self,
        target: ParticipantId,
        modifiers: &CaptureModifiers,
    ) -> EngineResult<u32> {
        let index = self.index_of(target)?;
        let actor = self.participants[index].actor();

        let capture_rate = actor
            .species()
            .and_then(|key| self.services.species.as_ref()?.species(key))
            .and_then(|data| data.capture_rate)
            .map_or(self.config.capture.default_capture_rate, u32::from);

        let input = CaptureInput {
            capture_rate,
            hp_fraction: actor.health_fraction(),
            target_level: actor.level(),
            player_level: modifiers.player_level.unwrap_or_else(|| self.player_level()),
            status_bonus: total_status_bonus(actor.status_effects()),
            modifiers: *modifiers,
        };
        Ok(calculate_capture_chance(
            &input,
            self.config.capture.min_chance,
            self.config.capture.max_chance,
        ))
    }

    /// Try to capture a wild opponent. On success the creature leaves the
    /// battle for the collection; capturing the last opponent wins the battle.
    pub fn attempt_capture(
        &mut self,
        user: ParticipantId,
        target: ParticipantId,
        options: CaptureOptions,
    ) -> EngineResult<CaptureReport> {
        let checked = self.validate_capture(user, target, options.item.as_deref())?;
        let modifiers = CaptureModifiers {
            item_bonus: checked.item.as_ref().map_or(0, |(_, bonus)| *bonus),
            flat_bonus: options.flat_bonus,
            multiplier: options.multiplier,
            player_level: None,
        };
        let mut chance = self.compute_capture_chance(target, &modifiers)?;

        if let Some((item, _)) = &checked.item {
            let consumed = self
                .services
                .inventory
                .as_mut()
                .is_some_and(|inventory| inventory.consume(item, 1));
            if !consumed {
                return Err(EngineError::InsufficientResource(format!("no {} left", item)));
            }
        }

        let testing = &self.config.testing;
        if let Some(forced) = testing.forced_capture_chance {
            chance = forced.min(100);
        }
        if testing.guaranteed_capture {
            chance = 100;
        }

        let roll = self.rng.roll_percent("capture roll");
        let success = roll <= chance;
        let name = self.participants[checked.target].name().to_string();
        tracing::debug!("Capture of {}: rolled {} against {}%", name, roll, chance);
        self.emit(BattleEvent::CaptureAttempted {
            target: name.clone(),
            chance,
            roll,
        });

        let action = CombatAction::Capture {
            target,
            item: options.item.clone(),
            success,
        };

        if !success {
            self.emit(BattleEvent::CaptureFailed { target: name });
            self.finish_action(user, action);
            return Ok(CaptureReport {
                chance,
                roll,
                success,
                collection_id: None,
            });
        }

        let removed = self.remove_participant(checked.target);
        self.emit(BattleEvent::CaptureSucceeded { target: name });
        let collection_id = self.adopt(removed);

        self.record(user, action);
        let opponents_left = self
            .participants
            .iter()
            .any(|p| p.side == Side::Opponent && !p.is_defeated());
        if opponents_left {
            self.conclude_turn();
        } else {
            self.end_battle(BattleOutcome::Victory { by_capture: true });
        }

        Ok(CaptureReport {
            chance,
            roll,
            success,
            collection_id,
        })
    }

    /// Hand a captured participant to the collection, or hold it on the
    /// session when no collection is wired.
    fn adopt(&mut self, participant: Participant) -> Option<String> {
        let Some(mut creature) = participant.into_actor().into_creature() else {
            tracing::warn!("Captured participant was not a creature; nothing to keep");
            return None;
        };
        creature.status_effects.clear();
        let owner = self.owner().unwrap_or("player").to_string();
        let now = self.services.clock.now_millis();
        creature.mark_captured(owner, now, self.config.creatures.capture_friendship);

        match self.services.collection.as_mut() {
            Some(collection) => {
                let id = collection.store(creature);
                tracing::info!("Stored captured creature as {}", id);
                Some(id)
            }
            None => {
                tracing::warn!(
                    "No collection wired; holding {} on the session",
                    creature.display_name()
                );
                self.hold_captured(creature);
                None
            }
        }
    }
}
