use crate::battle::state::BattleOutcome;
use crate::collaborators::NotificationSink;
use schema::{StatType, StatusKind};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Lifecycle
    BattleStarted {
        participants: Vec<String>,
    },
    RoundStarted {
        round: u32,
    },
    BattleEnded {
        outcome: BattleOutcome,
    },

    // Actions
    AttackLanded {
        attacker: String,
        target: String,
        damage: u32,
        critical: bool,
        remaining_hp: u32,
    },
    MagicCast {
        caster: String,
        move_id: String,
        mp_spent: u32,
    },
    SpellResolved {
        caster: String,
        spell_id: String,
    },
    ItemUsed {
        user: String,
        item: String,
    },
    Defended {
        name: String,
    },
    Incapacitated {
        name: String,
        status: StatusKind,
    },

    // Vitals
    Healed {
        target: String,
        amount: u32,
        new_hp: u32,
    },
    DamageTaken {
        target: String,
        damage: u32,
        remaining_hp: u32,
    },
    MpRestored {
        target: String,
        amount: u32,
    },
    ParticipantDefeated {
        name: String,
    },

    // Status Effects
    StatusApplied {
        target: String,
        status: StatusKind,
    },
    StatusRemoved {
        target: String,
        status: StatusKind,
    },
    StatusDamage {
        target: String,
        status: StatusKind,
        damage: u32,
        remaining_hp: u32,
    },
    StatusExpired {
        target: String,
        status: StatusKind,
    },
    StatModified {
        target: String,
        stat: StatType,
        amount: i32,
        rounds: u32,
    },
    StatModifierExpired {
        target: String,
        stat: StatType,
    },

    // Capture / Flight
    CaptureAttempted {
        target: String,
        chance: u32,
        roll: u32,
    },
    CaptureSucceeded {
        target: String,
    },
    CaptureFailed {
        target: String,
    },
    FleeSucceeded {
        name: String,
    },
    FleeFailed {
        name: String,
    },

    // Rewards
    RewardsGranted {
        experience: u64,
        gold: u64,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ProgressionEvent {
    LevelUp {
        name: String,
        level: u8,
    },
    MovesChanged {
        name: String,
        moves: Vec<String>,
    },
    Evolved {
        name: String,
        from: String,
        to: String,
    },
    EvolutionDeclined {
        name: String,
        into: String,
    },
    EvolutionBlocked {
        name: String,
        into: String,
        reason: String,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BreedingEvent {
    Bred {
        parents: [String; 2],
        offspring: String,
        generation: u32,
    },
}

/// Everything the engine tells the outside world about.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Notification {
    Battle(BattleEvent),
    Progression(ProgressionEvent),
    Breeding(BreedingEvent),
}

impl Notification {
    /// Formats the notification into a human-readable string.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self) -> Option<String> {
        match self {
            Notification::Battle(event) => event.format(),
            Notification::Progression(event) => Some(event.format()),
            Notification::Breeding(BreedingEvent::Bred {
                parents,
                offspring,
                generation,
            }) => Some(format!(
                "{} and {} produced a {} (generation {})!",
                parents[0], parents[1], offspring, generation
            )),
        }
    }
}

impl BattleEvent {
    pub fn format(&self) -> Option<String> {
        match self {
            // === Lifecycle Events ===
            BattleEvent::BattleStarted { participants } => {
                Some(format!("Battle start: {}", participants.join(", ")))
            }
            BattleEvent::RoundStarted { round } => Some(format!("=== Round {} ===", round)),
            BattleEvent::BattleEnded { outcome } => Some(match outcome {
                BattleOutcome::Victory { by_capture: true } => {
                    "Every foe was captured. Victory!".to_string()
                }
                BattleOutcome::Victory { by_capture: false } => "Victory!".to_string(),
                BattleOutcome::Defeat => "Your party was defeated...".to_string(),
                BattleOutcome::Fled => "Got away safely!".to_string(),
            }),

            // === Action Events ===
            BattleEvent::AttackLanded {
                attacker,
                target,
                damage,
                critical,
                ..
            } => {
                let crit = if *critical { " A critical hit!" } else { "" };
                Some(format!(
                    "{} hit {} for {} damage!{}",
                    attacker, target, damage, crit
                ))
            }
            BattleEvent::MagicCast {
                caster, move_id, ..
            } => Some(format!("{} used {}!", caster, Self::format_move_name(move_id))),
            BattleEvent::SpellResolved { caster, spell_id } => Some(format!(
                "{} cast {}!",
                caster,
                Self::format_move_name(spell_id)
            )),
            BattleEvent::ItemUsed { user, item } => {
                Some(format!("{} used a {}.", user, Self::format_move_name(item)))
            }
            BattleEvent::Defended { name } => Some(format!("{} is on guard.", name)),
            BattleEvent::Incapacitated { name, status } => Some(match status {
                StatusKind::Sleep => format!("{} is fast asleep.", name),
                StatusKind::Frozen => format!("{} is frozen solid!", name),
                _ => format!("{} can't move!", name),
            }),

            // === Vitals Events ===
            BattleEvent::Healed { target, amount, .. } => {
                Some(format!("{} recovered {} HP!", target, amount))
            }
            BattleEvent::DamageTaken { target, damage, .. } => {
                Some(format!("{} took {} damage!", target, damage))
            }
            BattleEvent::MpRestored { .. } => None, // Silent - happens every turn
            BattleEvent::ParticipantDefeated { name } => Some(format!("{} was defeated!", name)),

            // === Status Events ===
            BattleEvent::StatusApplied { target, status } => Some(format!(
                "{} {}",
                target,
                Self::format_status_applied(*status)
            )),
            BattleEvent::StatusRemoved { target, status } => {
                Some(format!("{} was cured of {}!", target, status))
            }
            BattleEvent::StatusDamage {
                target,
                status,
                damage,
                ..
            } => Some(format!(
                "{} is hurt by its {}! ({} damage)",
                target, status, damage
            )),
            BattleEvent::StatusExpired { target, status } => {
                Some(format!("{}'s {} wore off.", target, status))
            }
            BattleEvent::StatModified {
                target,
                stat,
                amount,
                ..
            } => {
                let direction = if *amount >= 0 { "rose" } else { "fell" };
                Some(format!(
                    "{}'s {} {}!",
                    target,
                    Self::format_stat(*stat),
                    direction
                ))
            }
            BattleEvent::StatModifierExpired { .. } => None,

            // === Capture / Flight Events ===
            BattleEvent::CaptureAttempted { target, chance, .. } => Some(format!(
                "Attempting to capture {} ({}% - {})...",
                target,
                chance,
                crate::battle::catch::capture_chance_description(*chance)
            )),
            BattleEvent::CaptureSucceeded { target } => Some(format!("Gotcha! {} was caught!", target)),
            BattleEvent::CaptureFailed { target } => Some(format!("{} broke free!", target)),
            BattleEvent::FleeSucceeded { .. } => None, // BattleEnded carries the message
            BattleEvent::FleeFailed { name } => Some(format!("{} couldn't get away!", name)),

            BattleEvent::RewardsGranted { experience, gold } => Some(format!(
                "Gained {} experience and {} gold.",
                experience, gold
            )),
        }
    }

    // --- Private Helper Functions ---

    /// snake_case ids to Title Case ("quick_strike" -> "Quick Strike").
    fn format_move_name(move_id: &str) -> String {
        move_id
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn format_status_applied(status: StatusKind) -> &'static str {
        match status {
            StatusKind::Poison => "was poisoned!",
            StatusKind::Burn => "was burned!",
            StatusKind::Regeneration => "is regenerating!",
            StatusKind::Sleep => "fell asleep!",
            StatusKind::Paralysis => "is paralyzed!",
            StatusKind::Frozen => "was frozen solid!",
        }
    }

    fn format_stat(stat: StatType) -> &'static str {
        match stat {
            StatType::Hp => "HP",
            StatType::Mp => "MP",
            StatType::Attack => "Attack",
            StatType::Defense => "Defense",
            StatType::MagicAttack => "Magic Attack",
            StatType::MagicDefense => "Magic Defense",
            StatType::Speed => "Speed",
            StatType::Accuracy => "Accuracy",
        }
    }
}

impl ProgressionEvent {
    pub fn format(&self) -> String {
        match self {
            ProgressionEvent::LevelUp { name, level } => {
                format!("{} grew to level {}!", name, level)
            }
            ProgressionEvent::MovesChanged { name, moves } => {
                format!("{} now knows: {}", name, moves.join(", "))
            }
            ProgressionEvent::Evolved { name, from, to } => {
                format!("{} evolved from {} into {}!", name, from, to)
            }
            ProgressionEvent::EvolutionDeclined { name, into } => {
                format!("{} did not evolve into {}.", name, into)
            }
            ProgressionEvent::EvolutionBlocked { name, into, reason } => {
                format!("{} could not evolve into {}: {}", name, into, reason)
            }
        }
    }
}

/// Recording notification sink.
///
/// ## Usage Examples
///
/// ```rust,ignore
/// let bus = Rc::new(EventBus::new());
/// let services = BattleServices::new().with_notifier(bus.clone());
/// // ... run a battle ...
/// bus.print_formatted();
/// ```
#[derive(Debug, Default)]
pub struct EventBus {
    events: RefCell<Vec<Notification>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, notification: Notification) {
        self.events.borrow_mut().push(notification);
    }

    /// A copy of everything recorded so far.
    pub fn events(&self) -> Vec<Notification> {
        self.events.borrow().clone()
    }

    /// Only the battle events, in order.
    pub fn battle_events(&self) -> Vec<BattleEvent> {
        self.events
            .borrow()
            .iter()
            .filter_map(|notification| match notification {
                Notification::Battle(event) => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    /// Print all notifications using their formatted text, skipping silent ones.
    pub fn print_formatted(&self) {
        for notification in self.events.borrow().iter() {
            if let Some(text) = notification.format() {
                println!("  {}", text);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl NotificationSink for EventBus {
    fn notify(&self, notification: Notification) {
        self.push(notification);
    }
}

impl std::fmt::Display for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for notification in self.events.borrow().iter() {
            writeln!(f, "  {:?}", notification)?;
        }
        Ok(())
    }
}
