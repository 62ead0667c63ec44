use schema::{LevelMove, SpeciesData};

pub const MAX_MOVES: usize = 4;

/// Moves unlocked by level for species that do not define their own gates.
pub const DEFAULT_LEVEL_GATES: [(u8, &str); 4] = [
    (5, "quick_strike"),
    (10, "guard_breaker"),
    (15, "power_surge"),
    (20, "finishing_blow"),
];

/// The level gates that apply to this species, lowest level first.
pub fn level_gates(species: &SpeciesData) -> Vec<LevelMove> {
    let mut gates: Vec<LevelMove> = if species.level_moves.is_empty() {
        DEFAULT_LEVEL_GATES
            .iter()
            .map(|(level, move_id)| LevelMove {
                level: *level,
                move_id: move_id.to_string(),
            })
            .collect()
    } else {
        species.level_moves.clone()
    };
    gates.sort_by_key(|gate| gate.level);
    gates
}

/// The move list a creature of this species knows at `level`.
///
/// The species' abilities come first, followed by every gated move already
/// unlocked, and the combined list is cut to the first four entries. A long
/// ability list therefore crowds out gated moves entirely.
pub fn moves_for_level(species: &SpeciesData, level: u8) -> Vec<String> {
    let gated = level_gates(species)
        .into_iter()
        .filter(|gate| gate.level <= level)
        .map(|gate| gate.move_id);

    let mut moves: Vec<String> = Vec::with_capacity(MAX_MOVES);
    for move_id in species.abilities.iter().cloned().chain(gated) {
        if moves.len() == MAX_MOVES {
            break;
        }
        if !moves.contains(&move_id) {
            moves.push(move_id);
        }
    }
    moves
}
