//! End-of-turn status effects and end-of-round stat modifier countdowns.

use crate::battle::state::Participant;
use crate::events::BattleEvent;
use schema::StatusKind;

/// Per-tick HP change as a percentage of max HP, or `None` for kinds that
/// only tick down.
fn tick_percent(kind: StatusKind) -> Option<u32> {
    match kind {
        StatusKind::Poison => Some(8),
        StatusKind::Burn => Some(6),
        StatusKind::Regeneration => Some(5),
        StatusKind::Sleep | StatusKind::Paralysis | StatusKind::Frozen => None,
    }
}

/// HP moved by one tick of `kind` for a creature with `max_hp`. Never below 1.
pub fn tick_amount(kind: StatusKind, max_hp: u32) -> u32 {
    tick_percent(kind).map_or(0, |percent| (max_hp * percent / 100).max(1))
}

/// Apply every status effect the participant carries once, then count each
/// down. Expired effects are removed. Returns the events to emit.
pub fn tick_status_effects(participant: &mut Participant) -> Vec<BattleEvent> {
    let mut events = Vec::new();
    let name = participant.name().to_string();
    let kinds = participant.actor().status_effects().kinds();

    for kind in kinds {
        let max_hp = participant.actor().stats().hp;
        let amount = tick_amount(kind, max_hp);
        let actor = participant.actor_mut();

        match kind {
            StatusKind::Poison | StatusKind::Burn if !actor.is_fainted() => {
                let damage = actor.take_damage(amount);
                events.push(BattleEvent::StatusDamage {
                    target: name.clone(),
                    status: kind,
                    damage,
                    remaining_hp: actor.vitals().hp,
                });
            }
            StatusKind::Regeneration if !actor.is_fainted() => {
                let healed = actor.heal(amount);
                if healed > 0 {
                    events.push(BattleEvent::Healed {
                        target: name.clone(),
                        amount: healed,
                        new_hp: actor.vitals().hp,
                    });
                }
            }
            _ => {}
        }

        if let Some(expired) = actor.status_effects_mut().count_down(kind) {
            events.push(BattleEvent::StatusExpired {
                target: name.clone(),
                status: expired.kind,
            });
        }
    }

    events
}

/// Count down timed stat modifiers, dropping the ones that ran out.
pub fn tick_modifiers(participant: &mut Participant) -> Vec<BattleEvent> {
    let name = participant.name().to_string();
    let mut events = Vec::new();

    participant.modifiers.retain_mut(|modifier| {
        modifier.remaining_rounds = modifier.remaining_rounds.saturating_sub(1);
        if modifier.remaining_rounds == 0 {
            events.push(BattleEvent::StatModifierExpired {
                target: name.clone(),
                stat: modifier.stat,
            });
            false
        } else {
            true
        }
    });

    events
}

/// The first status that keeps this participant from acting, if any.
pub fn incapacitating_status(participant: &Participant) -> Option<StatusKind> {
    participant
        .actor()
        .status_effects()
        .iter()
        .map(|effect| effect.kind)
        .find(|kind| kind.prevents_action())
}
