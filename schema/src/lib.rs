// Monster Tamer Schema - Shared data definitions
// This crate contains the plain data records that every part of the rules
// engine agrees on: stat blocks, species records, rarity tiers and status
// kinds. It carries no game logic beyond small accessors.

// Re-export the main types
pub use battle_data::*;
pub use species_data::*;
pub use stats::*;

pub mod battle_data;
pub mod species_data;
pub mod stats;
