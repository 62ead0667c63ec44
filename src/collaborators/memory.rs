use super::{
    Consumable, CreatureCollection, Inventory, ItemDrop, Loot, LootGenerator, PlayerProgression,
    SpeciesBook,
};
use crate::creature::Creature;
use crate::errors::{EngineError, EngineResult};
use schema::{BreedingPair, SpeciesData};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Species records and breeding pairs held in memory.
///
/// The RON form mirrors the struct:
///
/// ```ron
/// (
///     species: {
///         "slime": (name: "Slime", base_stats: (hp: 40, mp: 10)),
///     },
///     breeding: [
///         (parents: ("slime", "slime"), outcomes: [(species: "slime", weight: 1)]),
///     ],
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesTable {
    species: HashMap<String, SpeciesData>,
    breeding: Vec<BreedingPair>,
}

impl SpeciesTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ron_str(text: &str) -> EngineResult<Self> {
        let table: SpeciesTable = ron::from_str(text)
            .map_err(|err| EngineError::DataUnavailable(format!("species table: {}", err)))?;
        tracing::debug!(
            "Parsed species table with {} species and {} breeding pairs",
            table.species.len(),
            table.breeding.len()
        );
        Ok(table)
    }

    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = fs::read_to_string(path).map_err(|err| {
            EngineError::DataUnavailable(format!("{}: {}", path.display(), err))
        })?;
        Self::from_ron_str(&text)
    }

    /// Load one species per `*.ron` file in `dir`, keyed by the file stem.
    /// Breeding pairs are not read from a directory; add them afterwards.
    pub fn load_dir(dir: &Path) -> EngineResult<Self> {
        let unavailable =
            |err: std::io::Error| EngineError::DataUnavailable(format!("{}: {}", dir.display(), err));

        let mut table = Self::new();
        for entry in fs::read_dir(dir).map_err(unavailable)? {
            let path = entry.map_err(unavailable)?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("ron") {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let content = fs::read_to_string(&path).map_err(unavailable)?;
            let species: SpeciesData = ron::from_str(&content).map_err(|err| {
                EngineError::DataUnavailable(format!("{}: {}", path.display(), err))
            })?;
            table.insert(key, species);
        }
        Ok(table)
    }

    pub fn insert(&mut self, key: impl Into<String>, species: SpeciesData) {
        self.species.insert(key.into(), species);
    }

    pub fn add_pair(&mut self, pair: BreedingPair) {
        self.breeding.push(pair);
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Species keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.species.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl SpeciesBook for SpeciesTable {
    fn species(&self, key: &str) -> Option<&SpeciesData> {
        self.species.get(key)
    }

    fn breeding_pair(&self, a: &str, b: &str) -> Option<&BreedingPair> {
        self.breeding.iter().find(|pair| pair.matches(a, b))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemoryInventory {
    items: BTreeMap<String, u32>,
    consumables: BTreeMap<String, Consumable>,
    capture_items: BTreeMap<String, i32>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, item: &str, amount: u32) -> Self {
        self.add(item, amount);
        self
    }

    /// Register what `item` does when used in battle.
    pub fn define_consumable(&mut self, item: &str, effect: Consumable) {
        self.consumables.insert(item.to_string(), effect);
    }

    pub fn define_capture_item(&mut self, item: &str, bonus: i32) {
        self.capture_items.insert(item.to_string(), bonus);
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, u32)> {
        self.items.iter().map(|(item, amount)| (item.as_str(), *amount))
    }
}

impl Inventory for InMemoryInventory {
    fn quantity(&self, item: &str) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    fn consume(&mut self, item: &str, amount: u32) -> bool {
        match self.items.get_mut(item) {
            Some(held) if *held >= amount => {
                *held -= amount;
                if *held == 0 {
                    self.items.remove(item);
                }
                true
            }
            _ => false,
        }
    }

    fn add(&mut self, item: &str, amount: u32) {
        if amount > 0 {
            *self.items.entry(item.to_string()).or_insert(0) += amount;
        }
    }

    fn consumable(&self, item: &str) -> Option<Consumable> {
        self.consumables.get(item).copied()
    }

    fn capture_bonus(&self, item: &str) -> Option<i32> {
        self.capture_items.get(item).copied()
    }
}

/// Captured creatures kept in a `Vec`, filed under sequential ids.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCollection {
    creatures: Vec<(String, Creature)>,
    next_id: u32,
}

impl InMemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Creature> {
        self.creatures
            .iter()
            .find(|(stored_id, _)| stored_id == id)
            .map(|(_, creature)| creature)
    }

    pub fn creatures(&self) -> impl Iterator<Item = &Creature> {
        self.creatures.iter().map(|(_, creature)| creature)
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }
}

impl CreatureCollection for InMemoryCollection {
    fn store(&mut self, mut creature: Creature) -> String {
        self.next_id += 1;
        let id = format!("creature-{}", self.next_id);
        if let Some(capture) = creature.capture.as_mut() {
            capture.collection_id = Some(id.clone());
        }
        self.creatures.push((id.clone(), creature));
        id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplePlayer {
    pub level: u8,
    pub experience: u64,
    pub gold: u64,
}

impl SimplePlayer {
    pub fn new(level: u8) -> Self {
        Self {
            level,
            experience: 0,
            gold: 0,
        }
    }
}

impl Default for SimplePlayer {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PlayerProgression for SimplePlayer {
    fn player_level(&self) -> u8 {
        self.level
    }

    fn grant_experience(&mut self, amount: u64) {
        self.experience += amount;
    }

    fn grant_gold(&mut self, amount: u64) {
        self.gold += amount;
    }
}

/// Deterministic loot: gold scales with level, drops are fixed per species.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLoot {
    pub gold_per_level: u64,
    pub drops: BTreeMap<String, Vec<ItemDrop>>,
}

impl TableLoot {
    pub fn new(gold_per_level: u64) -> Self {
        Self {
            gold_per_level,
            drops: BTreeMap::new(),
        }
    }

    pub fn with_drop(mut self, species: &str, item: &str, quantity: u32) -> Self {
        self.drops.entry(species.to_string()).or_default().push(ItemDrop {
            item: item.to_string(),
            quantity,
        });
        self
    }
}

impl LootGenerator for TableLoot {
    fn generate(&mut self, species: &str, level: u8, _player_level: u8) -> Loot {
        Loot {
            gold: self.gold_per_level * level as u64,
            items: self.drops.get(species).cloned().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schema::BreedingOutcome;

    const TABLE: &str = r#"(
        species: {
            "slime": (
                name: "Slime",
                types: ["water"],
                base_stats: (hp: 40, mp: 10, attack: 8, defense: 8, speed: 6),
                capture_rate: Some(45),
            ),
            "bat": (
                name: "Bat",
                rarity: uncommon,
                base_stats: (hp: 30, speed: 14),
            ),
        },
        breeding: [
            (parents: ("slime", "bat"), outcomes: [(species: "slime", weight: 3), (species: "bat", weight: 1)]),
        ],
    )"#;

    #[test]
    fn test_species_table_from_ron() {
        let table = SpeciesTable::from_ron_str(TABLE).unwrap();

        assert_eq!(table.keys(), vec!["bat", "slime"]);
        let slime = table.species("slime").unwrap();
        assert_eq!(slime.capture_rate, Some(45));
        assert_eq!(slime.base_stats.hp, 40);

        let pair = table.breeding_pair("bat", "slime").unwrap();
        assert_eq!(
            pair.outcomes[0],
            BreedingOutcome {
                species: "slime".to_string(),
                weight: 3
            }
        );
        assert!(table.breeding_pair("slime", "slime").is_none());
    }

    #[test]
    fn test_bad_species_table_is_data_unavailable() {
        let err = SpeciesTable::from_ron_str("(species: 12)").unwrap_err();
        assert!(matches!(err, EngineError::DataUnavailable(_)));
    }

    #[test]
    fn test_inventory_consume_is_all_or_nothing() {
        let mut inventory = InMemoryInventory::new().with_item("potion", 2);

        assert!(!inventory.consume("potion", 3));
        assert_eq!(inventory.quantity("potion"), 2);
        assert!(inventory.consume("potion", 2));
        assert_eq!(inventory.quantity("potion"), 0);
        assert_eq!(inventory.items().count(), 0);
    }

    #[test]
    fn test_collection_assigns_sequential_ids() {
        let mut collection = InMemoryCollection::new();
        let slime = crate::battle::tests::common::CreatureBuilder::new("slime", 3).build();

        let first = collection.store(slime.clone());
        let second = collection.store(slime);

        assert_eq!(first, "creature-1");
        assert_eq!(second, "creature-2");
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get("creature-2").unwrap().level, 3);
    }

    #[test]
    fn test_table_loot_scales_with_level() {
        let mut loot = TableLoot::new(4).with_drop("slime", "jelly", 1);
        let drop = loot.generate("slime", 5, 1);
        assert_eq!(drop.gold, 20);
        assert_eq!(drop.items.len(), 1);
        assert!(loot.generate("bat", 5, 1).items.is_empty());
    }
}
