use crate::creature::StatusEffects;
use schema::StatusKind;
use serde::{Deserialize, Serialize};

/// Caller-supplied adjustments to a capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureModifiers {
    /// Bonus from the capture item being used, if any.
    pub item_bonus: i32,
    pub flat_bonus: i32,
    pub multiplier: f64,
    /// Overrides the level the session would otherwise infer.
    pub player_level: Option<u8>,
}

impl Default for CaptureModifiers {
    fn default() -> Self {
        Self {
            item_bonus: 0,
            flat_bonus: 0,
            multiplier: 1.0,
            player_level: None,
        }
    }
}

/// Everything the capture formula reads, already resolved to numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureInput {
    pub capture_rate: u32,
    pub hp_fraction: f64,
    pub target_level: u8,
    pub player_level: u8,
    pub status_bonus: i32,
    pub modifiers: CaptureModifiers,
}

/// Extra chance for a weakened target. Four tiers by remaining HP fraction.
pub fn hp_bonus(hp_fraction: f64) -> i32 {
    let h = hp_fraction.clamp(0.0, 1.0);
    if h > 0.75 {
        0
    } else if h > 0.5 {
        ((0.75 - h) * 60.0).floor() as i32
    } else if h > 0.25 {
        15 + ((0.5 - h) * 80.0).floor() as i32
    } else {
        35 + ((0.25 - h) * 100.0).floor() as i32
    }
}

/// Two points per level the target has over the player.
pub fn level_penalty(target_level: u8, player_level: u8) -> i32 {
    (2 * (target_level as i32 - player_level as i32)).max(0)
}

pub fn status_bonus(kind: StatusKind) -> i32 {
    match kind {
        StatusKind::Sleep => 12,
        StatusKind::Paralysis => 8,
        StatusKind::Frozen => 10,
        StatusKind::Poison | StatusKind::Burn | StatusKind::Regeneration => 0,
    }
}

/// Bonuses of every status the target carries, stacked.
pub fn total_status_bonus(effects: &StatusEffects) -> i32 {
    effects.iter().map(|effect| status_bonus(effect.kind)).sum()
}

/// The final capture chance in percent, clamped to `[min_chance, max_chance]`.
pub fn calculate_capture_chance(input: &CaptureInput, min_chance: u32, max_chance: u32) -> u32 {
    let raw = input.capture_rate as i64
        + hp_bonus(input.hp_fraction) as i64
        - level_penalty(input.target_level, input.player_level) as i64
        + input.status_bonus as i64
        + input.modifiers.item_bonus as i64
        + input.modifiers.flat_bonus as i64;

    let scaled = (raw as f64 * input.modifiers.multiplier).floor();
    let low = min_chance.min(max_chance) as f64;
    let high = max_chance as f64;
    // NaN multipliers fall to the floor of the range.
    if scaled.is_nan() {
        return low as u32;
    }
    scaled.clamp(low, high) as u32
}

/// A descriptive capture chance category for display purposes.
pub fn capture_chance_description(chance: u32) -> &'static str {
    match chance {
        c if c >= 80 => "Excellent",
        c if c >= 60 => "Very Good",
        c if c >= 40 => "Good",
        c if c >= 25 => "Fair",
        c if c >= 10 => "Poor",
        _ => "Very Poor",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn input(hp_fraction: f64) -> CaptureInput {
        CaptureInput {
            capture_rate: 30,
            hp_fraction,
            target_level: 5,
            player_level: 5,
            status_bonus: 0,
            modifiers: CaptureModifiers::default(),
        }
    }

    #[rstest]
    #[case(1.0, 0)]
    #[case(0.76, 0)]
    #[case(0.75, 0)]
    #[case(0.625, 7)]
    #[case(0.5, 15)]
    #[case(0.375, 25)]
    #[case(0.25, 35)]
    #[case(0.125, 47)]
    #[case(0.0, 60)]
    fn test_hp_bonus_tiers(#[case] fraction: f64, #[case] expected: i32) {
        assert_eq!(hp_bonus(fraction), expected);
    }

    #[rstest]
    #[case(10, 5, 10)]
    #[case(5, 10, 0)]
    #[case(7, 7, 0)]
    fn test_level_penalty(#[case] target: u8, #[case] player: u8, #[case] expected: i32) {
        assert_eq!(level_penalty(target, player), expected);
    }

    #[test]
    fn test_status_bonuses_stack() {
        let mut effects = StatusEffects::default();
        effects.apply(StatusKind::Sleep, 2);
        effects.apply(StatusKind::Paralysis, 2);
        effects.apply(StatusKind::Poison, 2);
        assert_eq!(total_status_bonus(&effects), 20);
    }

    #[test]
    fn test_full_health_uses_base_rate() {
        assert_eq!(calculate_capture_chance(&input(1.0), 5, 95), 30);
    }

    #[test]
    fn test_all_terms_combine_before_multiplier() {
        let mut capture = input(0.5);
        capture.status_bonus = 12;
        capture.modifiers = CaptureModifiers {
            item_bonus: 10,
            flat_bonus: 3,
            multiplier: 1.5,
            player_level: None,
        };
        // (30 + 15 + 12 + 10 + 3) * 1.5 = 105, clamped
        assert_eq!(calculate_capture_chance(&capture, 5, 95), 95);

        capture.modifiers.multiplier = 0.5;
        assert_eq!(calculate_capture_chance(&capture, 5, 95), 35);
    }

    #[rstest]
    #[case(0, 1.0, 0.0)]
    #[case(255, 1.0, 10.0)]
    #[case(30, 0.0, 1.0)]
    #[case(30, 1.0, -5.0)]
    #[case(0, 0.0, f64::NAN)]
    fn test_chance_stays_in_bounds(#[case] rate: u32, #[case] hp: f64, #[case] multiplier: f64) {
        let mut capture = input(hp);
        capture.capture_rate = rate;
        capture.target_level = 60;
        capture.modifiers.multiplier = multiplier;
        let chance = calculate_capture_chance(&capture, 5, 95);
        assert!((5..=95).contains(&chance), "chance {} out of bounds", chance);
    }

    #[rstest]
    #[case(95, "Excellent")]
    #[case(60, "Very Good")]
    #[case(45, "Good")]
    #[case(25, "Fair")]
    #[case(10, "Poor")]
    #[case(5, "Very Poor")]
    fn test_capture_chance_description(#[case] chance: u32, #[case] expected: &str) {
        assert_eq!(capture_chance_description(chance), expected);
    }
}
