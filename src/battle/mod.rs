pub mod actor;
pub mod ai;
pub mod calculators;
pub mod catch;
pub mod conditions;
pub mod encounters;
pub mod engine;
pub mod services;
pub mod session;
pub mod state;

pub use actor::{Actor, PlayerAvatar};
pub use ai::{AiChoice, AiTurn, Behavior, BehaviorWeights, WeightedBehavior};
pub use catch::{capture_chance_description, CaptureModifiers, CaptureOptions};
pub use encounters::Encounters;
pub use services::BattleServices;
pub use session::CombatSession;
pub use state::{
    ActionLogEntry, BattleOutcome, CaptureReport, CombatAction, DamageReport, FleeReport,
    ItemReport, Participant, ParticipantId, SpellReport,
};

#[cfg(test)]
pub(crate) mod tests;
