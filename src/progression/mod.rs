//! Experience, level-ups, move learning and evolution for owned creatures.

pub mod evolution;
pub mod experience;
pub mod moves;
pub mod rewards;

pub use evolution::EvolutionReport;
pub use moves::{moves_for_level, MAX_MOVES};
pub use rewards::{DefeatedFoe, RewardCalculator, RewardSummary};

use crate::collaborators::{
    AutoConfirm, EvolutionConfirmer, Inventory, NotificationSink, NullNotifier, SpeciesBook,
};
use crate::errors::{EngineError, EngineResult};
use crate::events::{Notification, ProgressionEvent};
use schema::SpeciesData;

static AUTO_CONFIRM: AutoConfirm = AutoConfirm;
static NULL_NOTIFIER: NullNotifier = NullNotifier;

/// Drives a creature's (level, experience) state machine.
///
/// Borrowed collaborators only: build one wherever experience is awarded and
/// drop it afterwards.
pub struct Progression<'a> {
    species: &'a dyn SpeciesBook,
    inventory: Option<&'a mut dyn Inventory>,
    confirmer: &'a dyn EvolutionConfirmer,
    notifier: &'a dyn NotificationSink,
}

impl<'a> Progression<'a> {
    /// No inventory, auto-accepted evolutions, silent.
    pub fn new(species: &'a dyn SpeciesBook) -> Self {
        Self {
            species,
            inventory: None,
            confirmer: &AUTO_CONFIRM,
            notifier: &NULL_NOTIFIER,
        }
    }

    pub fn with_inventory(mut self, inventory: &'a mut dyn Inventory) -> Self {
        self.inventory = Some(inventory);
        self
    }

    pub fn with_confirmer(mut self, confirmer: &'a dyn EvolutionConfirmer) -> Self {
        self.confirmer = confirmer;
        self
    }

    pub fn with_notifier(mut self, notifier: &'a dyn NotificationSink) -> Self {
        self.notifier = notifier;
        self
    }

    fn lookup(&self, key: &str) -> EngineResult<&'a SpeciesData> {
        let book: &'a dyn SpeciesBook = self.species;
        book.species(key)
            .ok_or_else(|| EngineError::DataUnavailable(format!("no species data for '{}'", key)))
    }

    fn notify(&self, event: ProgressionEvent) {
        self.notifier.notify(Notification::Progression(event));
    }
}
