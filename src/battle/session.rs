//! The combat session state machine: inactive, active, then inactive again
//! with a result.
//!
//! The session owns its participants and turn order. Outside code changes
//! them only through the methods here and in `engine` / `catch`.

use crate::battle::conditions;
use crate::battle::services::BattleServices;
use crate::battle::state::{ActionLogEntry, BattleOutcome, CombatAction, Participant, ParticipantId};
use crate::config::EngineConfig;
use crate::creature::Creature;
use crate::errors::{EngineError, EngineResult};
use crate::events::{BattleEvent, Notification};
use crate::progression::{DefeatedFoe, Progression, RewardCalculator, RewardSummary};
use crate::rng::GameRng;
use schema::{Rarity, Side};
use std::collections::HashSet;
use std::fmt;

pub struct CombatSession {
    active: bool,
    round: u32,
    pub(super) participants: Vec<Participant>,
    current: usize,
    log: Vec<ActionLogEntry>,
    result: Option<BattleOutcome>,
    rewards: Option<RewardSummary>,
    captured: Vec<Creature>,
    owner: Option<String>,
    pub(crate) services: BattleServices,
    pub(crate) rng: Box<dyn GameRng>,
    pub(crate) config: EngineConfig,
}

impl CombatSession {
    /// An inactive session waiting for `start`.
    pub fn new(services: BattleServices, rng: Box<dyn GameRng>, config: EngineConfig) -> Self {
        Self {
            active: false,
            round: 0,
            participants: Vec::new(),
            current: 0,
            log: Vec::new(),
            result: None,
            rewards: None,
            captured: Vec::new(),
            owner: None,
            services,
            rng,
            config,
        }
    }

    /// Build and start a session in one step. Fails without creating a
    /// session when the participant list is unusable.
    pub fn begin(
        participants: Vec<Participant>,
        services: BattleServices,
        rng: Box<dyn GameRng>,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        let mut session = Self::new(services, rng, config);
        session.start(participants)?;
        Ok(session)
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub(crate) fn set_owner(&mut self, owner: &str) {
        self.owner = Some(owner.to_string());
    }

    /// Order participants by descending speed (stable on ties) and begin round 1.
    pub fn start(&mut self, mut participants: Vec<Participant>) -> EngineResult<()> {
        if self.active {
            return Err(EngineError::SessionAlreadyActive(
                "finish the current battle before starting another".to_string(),
            ));
        }
        if participants.is_empty() {
            return Err(EngineError::ConstructionError(
                "a battle needs at least one participant".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = participants.iter().find(|p| !seen.insert(p.id)) {
            return Err(EngineError::ConstructionError(format!(
                "participant id {} is used twice",
                duplicate.id
            )));
        }

        participants.sort_by(|a, b| b.speed.cmp(&a.speed));
        for participant in &mut participants {
            participant.defeated = participant.actor().is_fainted();
        }

        self.current = participants.iter().position(|p| !p.defeated).unwrap_or(0);
        self.participants = participants;
        self.active = true;
        self.round = 1;
        self.log.clear();
        self.result = None;
        self.rewards = None;
        self.captured.clear();

        let names: Vec<String> = self.participants.iter().map(|p| p.name().to_string()).collect();
        tracing::info!("Battle started: {}", names.join(", "));
        self.emit(BattleEvent::BattleStarted { participants: names });

        if !self.check_battle_end() {
            self.emit(BattleEvent::RoundStarted { round: 1 });
        }
        Ok(())
    }

    // --- Accessors ---

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// The participant whose turn it is, or `None` when the battle is not running.
    pub fn current_actor(&self) -> Option<&Participant> {
        if !self.active {
            return None;
        }
        self.participants.get(self.current)
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Participant ids in turn order.
    pub fn turn_order(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.id).collect()
    }

    pub fn log(&self) -> &[ActionLogEntry] {
        &self.log
    }

    pub fn result(&self) -> Option<BattleOutcome> {
        self.result
    }

    pub fn rewards(&self) -> Option<&RewardSummary> {
        self.rewards.as_ref()
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Creatures captured while no collection was wired.
    pub fn captured(&self) -> &[Creature] {
        &self.captured
    }

    pub fn take_captured(&mut self) -> Vec<Creature> {
        std::mem::take(&mut self.captured)
    }

    // --- Turn flow ---

    /// Log an action for the current actor and end its turn. Returns false,
    /// doing nothing, when the battle is not running.
    pub fn perform_action(&mut self, action: CombatAction) -> bool {
        let Some(actor) = self.current_actor().map(|p| p.id) else {
            return false;
        };
        self.record(actor, action);
        self.conclude_turn();
        true
    }

    /// End-of-turn effects for the current actor, then hand the turn to the
    /// next standing participant.
    pub fn end_turn(&mut self) {
        if !self.active || self.participants.is_empty() {
            return;
        }
        let index = self.current;
        if !self.participants[index].defeated {
            self.regenerate_mp(index);
            let events = conditions::tick_status_effects(&mut self.participants[index]);
            self.emit_all(events);
        }
        self.resolve_defeats();
        if self.check_battle_end() {
            return;
        }
        self.advance_turn();
    }

    fn advance_turn(&mut self) {
        let len = self.participants.len();
        for _ in 0..len {
            self.current += 1;
            if self.current >= len {
                self.current = 0;
                self.round += 1;
                if self.end_of_round() {
                    return;
                }
            }
            if !self.participants[self.current].defeated {
                return;
            }
        }
    }

    /// Regeneration, status ticks and modifier countdowns for every standing
    /// participant. Returns true when a tick ended the battle.
    fn end_of_round(&mut self) -> bool {
        for index in 0..self.participants.len() {
            if self.participants[index].defeated {
                continue;
            }
            self.regenerate_mp(index);
            let participant = &mut self.participants[index];
            let mut events = conditions::tick_status_effects(participant);
            events.extend(conditions::tick_modifiers(participant));
            if let Some(spellcaster) = self.services.spellcaster.as_mut() {
                spellcaster.end_round(participant.id);
            }
            self.emit_all(events);
        }
        self.resolve_defeats();
        if self.check_battle_end() {
            return true;
        }
        tracing::debug!("Round {} begins", self.round);
        self.emit(BattleEvent::RoundStarted { round: self.round });
        false
    }

    fn regenerate_mp(&mut self, index: usize) {
        let participant = &mut self.participants[index];
        let amount = match self.services.spellcaster.as_mut() {
            Some(spellcaster) => spellcaster.regeneration(participant.id, participant.actor()),
            None => {
                let max_mp = participant.actor().stats().mp;
                let fraction = self.config.combat.mp_regen_fraction;
                let regen = (max_mp as f64 * fraction).floor() as u32;
                if max_mp > 0 && fraction > 0.0 {
                    regen.max(1)
                } else {
                    regen
                }
            }
        };
        let restored = participant.actor_mut().restore_mp(amount);
        if restored > 0 {
            let target = participant.name().to_string();
            self.emit(BattleEvent::MpRestored {
                target,
                amount: restored,
            });
        }
    }

    /// Record an action, settle defeats and either end the battle or the turn.
    pub(crate) fn finish_action(&mut self, actor: ParticipantId, action: CombatAction) {
        self.record(actor, action);
        self.conclude_turn();
    }

    pub(crate) fn record(&mut self, actor: ParticipantId, action: CombatAction) {
        tracing::debug!("Round {}: {} -> {:?}", self.round, actor, action);
        self.log.push(ActionLogEntry {
            round: self.round,
            actor,
            action,
        });
    }

    pub(crate) fn conclude_turn(&mut self) {
        self.resolve_defeats();
        if !self.check_battle_end() {
            self.end_turn();
        }
    }

    /// Mark every participant at zero HP as defeated. Returns the newly
    /// defeated ids.
    pub(crate) fn resolve_defeats(&mut self) -> Vec<ParticipantId> {
        let mut fallen = Vec::new();
        for participant in self.participants.iter_mut() {
            if !participant.defeated && participant.actor().is_fainted() {
                participant.defeated = true;
                fallen.push((participant.id, participant.name().to_string()));
            }
        }
        for (_, name) in &fallen {
            tracing::debug!("{} was defeated", name);
            self.emit(BattleEvent::ParticipantDefeated { name: name.clone() });
        }
        fallen.into_iter().map(|(id, _)| id).collect()
    }

    /// End the battle when a side has nobody standing. Returns true when the
    /// battle is over.
    pub(crate) fn check_battle_end(&mut self) -> bool {
        if !self.active {
            return true;
        }
        let standing = |side: Side| {
            self.participants
                .iter()
                .any(|p| p.side == side && !p.defeated)
        };
        let opponents_left = standing(Side::Opponent);
        let allies_left = standing(Side::Ally);

        if !opponents_left {
            self.end_battle(BattleOutcome::Victory { by_capture: false });
            true
        } else if !allies_left {
            self.end_battle(BattleOutcome::Defeat);
            true
        } else {
            false
        }
    }

    /// Stop the battle and store its result. A victory with at least one
    /// defeated opponent computes and grants rewards, which are also
    /// returned. Has no effect on an inactive session.
    pub fn end_battle(&mut self, outcome: BattleOutcome) -> Option<RewardSummary> {
        if !self.active {
            return None;
        }
        self.active = false;
        self.result = Some(outcome);
        tracing::info!("Battle ended after {} round(s): {:?}", self.round, outcome);
        self.emit(BattleEvent::BattleEnded { outcome });

        if !outcome.is_victory() {
            return None;
        }
        let any_defeated = self
            .participants
            .iter()
            .any(|p| p.side == Side::Opponent && p.defeated);
        if !any_defeated {
            tracing::debug!("No opponent was defeated; nothing to reward");
            return None;
        }
        let summary = self.grant_rewards();
        self.emit(BattleEvent::RewardsGranted {
            experience: summary.experience,
            gold: summary.gold,
        });
        self.rewards = Some(summary.clone());
        Some(summary)
    }

    // --- Rewards ---

    /// The player's level for difficulty scaling: the progression
    /// collaborator's, else the strongest ally's.
    pub(crate) fn player_level(&self) -> u8 {
        match self.services.player.as_ref() {
            Some(player) => player.player_level(),
            None => self
                .participants
                .iter()
                .filter(|p| p.side == Side::Ally)
                .map(|p| p.actor().level())
                .max()
                .unwrap_or(1),
        }
    }

    fn rarity_of(&self, species: Option<&str>) -> Rarity {
        species
            .and_then(|key| self.services.species.as_ref()?.species(key))
            .map(|data| data.rarity)
            .unwrap_or_default()
    }

    fn grant_rewards(&mut self) -> RewardSummary {
        let player_level = self.player_level();
        let mut summary = RewardSummary::default();

        let foes: Vec<(String, Option<String>, u8)> = self
            .participants
            .iter()
            .filter(|p| p.side == Side::Opponent && p.defeated)
            .map(|p| {
                let actor = p.actor();
                (
                    actor.name().to_string(),
                    actor.species().map(str::to_string),
                    actor.level(),
                )
            })
            .collect();

        for (name, species, level) in foes {
            let rarity = self.rarity_of(species.as_deref());
            let experience = RewardCalculator::experience_for(level, rarity, player_level);
            let loot = match self.services.loot.as_mut() {
                Some(loot) => loot.generate(species.as_deref().unwrap_or(&name), level, player_level),
                None => RewardCalculator::fallback_loot(level, rarity),
            };
            summary.experience += experience;
            summary.add_loot(loot);
            summary.defeated.push(DefeatedFoe {
                name,
                species,
                level,
                experience,
            });
        }

        match self.services.player.as_mut() {
            Some(player) => {
                player.grant_experience(summary.experience);
                player.grant_gold(summary.gold);
            }
            None => tracing::warn!(
                "No player progression wired; {} exp and {} gold were not granted",
                summary.experience,
                summary.gold
            ),
        }

        if !summary.items.is_empty() {
            match self.services.inventory.as_mut() {
                Some(inventory) => {
                    for drop in &summary.items {
                        inventory.add(&drop.item, drop.quantity);
                    }
                }
                None => tracing::warn!("No inventory wired; {} item drop(s) lost", summary.items.len()),
            }
        }

        self.award_ally_experience(&mut summary);
        tracing::info!(
            "Rewards: {} exp, {} gold, {} item kind(s)",
            summary.experience,
            summary.gold,
            summary.items.len()
        );
        summary
    }

    fn award_ally_experience(&mut self, summary: &mut RewardSummary) {
        if summary.experience == 0 {
            return;
        }
        let Some(book) = self.services.species.clone() else {
            tracing::warn!("No species data wired; allied creatures gain no experience");
            return;
        };
        let notifier = self.services.notifier.clone();
        let confirmer = self.services.confirmer.clone();

        let mut progression = Progression::new(&*book)
            .with_confirmer(&*confirmer)
            .with_notifier(&*notifier);
        if let Some(inventory) = self.services.inventory.as_deref_mut() {
            progression = progression.with_inventory(inventory);
        }

        for participant in self.participants.iter_mut() {
            if participant.side != Side::Ally || participant.defeated {
                continue;
            }
            let Some(creature) = participant.actor_mut().as_creature_mut() else {
                continue;
            };
            match progression.add_experience(creature, summary.experience) {
                Ok(0) => {}
                Ok(levels) => summary
                    .level_ups
                    .push((creature.display_name().to_string(), levels)),
                Err(err) => tracing::warn!(
                    "Could not award experience to {}: {}",
                    creature.display_name(),
                    err
                ),
            }
        }
    }

    // --- Shared helpers ---

    pub(crate) fn emit(&self, event: BattleEvent) {
        self.services.notifier.notify(Notification::Battle(event));
    }

    pub(crate) fn emit_all(&self, events: Vec<BattleEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    pub(crate) fn ensure_active(&self) -> EngineResult<()> {
        if self.active {
            Ok(())
        } else {
            Err(EngineError::SessionInactive)
        }
    }

    pub(crate) fn index_of(&self, id: ParticipantId) -> EngineResult<usize> {
        self.participants
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| EngineError::invalid_participant(id, "not in this battle"))
    }

    /// Index of the participant whose turn it is. Anyone else is refused.
    pub(crate) fn acting_index(&self, id: ParticipantId) -> EngineResult<usize> {
        let index = self.index_of(id)?;
        if self.participants[index].defeated {
            return Err(EngineError::invalid_participant(id, "has been defeated"));
        }
        if index != self.current {
            return Err(EngineError::invalid_participant(id, "it is not this participant's turn"));
        }
        Ok(index)
    }

    /// Index of a standing participant other than the actor.
    pub(crate) fn target_index(&self, actor: usize, target: ParticipantId) -> EngineResult<usize> {
        let index = self.index_of(target)?;
        if index == actor {
            return Err(EngineError::InvalidTarget(format!(
                "{} cannot target itself",
                self.participants[index].name()
            )));
        }
        if self.participants[index].defeated {
            return Err(EngineError::InvalidTarget(format!(
                "{} has already been defeated",
                self.participants[index].name()
            )));
        }
        Ok(index)
    }

    pub(crate) fn participant_at(&self, index: usize) -> &Participant {
        &self.participants[index]
    }

    pub(crate) fn participant_at_mut(&mut self, index: usize) -> &mut Participant {
        &mut self.participants[index]
    }

    /// Take a participant out of the battle, keeping the turn index on the
    /// same actor. The current actor itself is never removed.
    pub(crate) fn remove_participant(&mut self, index: usize) -> Participant {
        if index < self.current {
            self.current -= 1;
        }
        self.participants.remove(index)
    }

    pub(crate) fn hold_captured(&mut self, creature: Creature) {
        self.captured.push(creature);
    }
}

impl fmt::Debug for CombatSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombatSession")
            .field("active", &self.active)
            .field("round", &self.round)
            .field("current", &self.current)
            .field("participants", &self.participants)
            .field("result", &self.result)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}
