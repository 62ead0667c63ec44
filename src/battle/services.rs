use crate::collaborators::{
    AutoConfirm, Clock, CreatureCollection, EvolutionConfirmer, Inventory, LootGenerator,
    NotificationSink, NullNotifier, PlayerProgression, SpeciesBook, Spellcaster, SystemClock,
};
use std::fmt;
use std::rc::Rc;

/// The collaborators a combat session talks to. Everything except the clock,
/// the confirmer and the notifier is optional; missing ones fall back to
/// built-in behavior where a safe default exists.
pub struct BattleServices {
    pub species: Option<Rc<dyn SpeciesBook>>,
    pub inventory: Option<Box<dyn Inventory>>,
    pub loot: Option<Box<dyn LootGenerator>>,
    pub player: Option<Box<dyn PlayerProgression>>,
    pub spellcaster: Option<Box<dyn Spellcaster>>,
    pub collection: Option<Box<dyn CreatureCollection>>,
    pub notifier: Rc<dyn NotificationSink>,
    pub confirmer: Rc<dyn EvolutionConfirmer>,
    pub clock: Rc<dyn Clock>,
}

impl Default for BattleServices {
    fn default() -> Self {
        Self {
            species: None,
            inventory: None,
            loot: None,
            player: None,
            spellcaster: None,
            collection: None,
            notifier: Rc::new(NullNotifier),
            confirmer: Rc::new(AutoConfirm),
            clock: Rc::new(SystemClock),
        }
    }
}

impl BattleServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_species(mut self, species: Rc<dyn SpeciesBook>) -> Self {
        self.species = Some(species);
        self
    }

    pub fn with_inventory(mut self, inventory: impl Inventory + 'static) -> Self {
        self.inventory = Some(Box::new(inventory));
        self
    }

    pub fn with_loot(mut self, loot: impl LootGenerator + 'static) -> Self {
        self.loot = Some(Box::new(loot));
        self
    }

    pub fn with_player(mut self, player: impl PlayerProgression + 'static) -> Self {
        self.player = Some(Box::new(player));
        self
    }

    pub fn with_spellcaster(mut self, spellcaster: impl Spellcaster + 'static) -> Self {
        self.spellcaster = Some(Box::new(spellcaster));
        self
    }

    pub fn with_collection(mut self, collection: impl CreatureCollection + 'static) -> Self {
        self.collection = Some(Box::new(collection));
        self
    }

    pub fn with_notifier(mut self, notifier: Rc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_confirmer(mut self, confirmer: Rc<dyn EvolutionConfirmer>) -> Self {
        self.confirmer = confirmer;
        self
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl fmt::Debug for BattleServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BattleServices")
            .field("species", &self.species.is_some())
            .field("inventory", &self.inventory.is_some())
            .field("loot", &self.loot.is_some())
            .field("player", &self.player.is_some())
            .field("spellcaster", &self.spellcaster.is_some())
            .field("collection", &self.collection.is_some())
            .finish_non_exhaustive()
    }
}
