use crate::battle::actor::PlayerAvatar;
use crate::battle::catch::{CaptureModifiers, CaptureOptions};
use crate::battle::services::BattleServices;
use crate::battle::session::CombatSession;
use crate::battle::state::{BattleOutcome, CombatAction, Participant, ParticipantId};
use crate::battle::tests::common::{ally, opponent, start_battle_with, test_services, CreatureBuilder};
use crate::collaborators::{FixedClock, InMemoryCollection, InMemoryInventory, Inventory};
use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::events::BattleEvent;
use crate::rng::ScriptedRng;
use pretty_assertions::assert_eq;
use schema::{Side, StatBlock, StatusKind};
use std::cell::RefCell;
use std::rc::Rc;

const HERO: ParticipantId = ParticipantId(1);
const FOE: ParticipantId = ParticipantId(2);

fn wild_encounter(
    foe: crate::creature::Creature,
    rolls: Vec<f64>,
    services: BattleServices,
    config: EngineConfig,
) -> CombatSession {
    start_battle_with(
        vec![
            ally(1, CreatureBuilder::new("slime", 5).owned().build()).with_speed(99),
            opponent(2, foe).with_speed(10),
        ],
        ScriptedRng::new(rolls),
        services,
        config,
    )
}

fn guaranteed() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.testing.guaranteed_capture = true;
    config
}

#[test]
fn test_capture_chance_follows_hp_and_status() {
    // Arrange
    let (services, _) = test_services();
    let healthy = wild_encounter(
        CreatureBuilder::new("slime", 5).build(),
        vec![],
        services,
        EngineConfig::default(),
    );
    let (services, _) = test_services();
    let weakened = wild_encounter(
        CreatureBuilder::new("slime", 5)
            .with_hp(15)
            .with_status(StatusKind::Sleep, 2)
            .build(),
        vec![],
        services,
        EngineConfig::default(),
    );
    let modifiers = CaptureModifiers::default();

    // Act
    let full = healthy.compute_capture_chance(FOE, &modifiers).unwrap();
    let quarter = weakened.compute_capture_chance(FOE, &modifiers).unwrap();

    // Assert: base rate 30, +35 at a quarter HP, +12 asleep
    assert_eq!(full, 30);
    assert_eq!(quarter, 77);
}

#[test]
fn test_species_capture_rate_and_player_level_override() {
    let (services, _) = test_services();
    let session = wild_encounter(
        CreatureBuilder::new("ember", 5).build(),
        vec![],
        services,
        EngineConfig::default(),
    );

    let at_ally_level = session
        .compute_capture_chance(FOE, &CaptureModifiers::default())
        .unwrap();
    let novice = session
        .compute_capture_chance(
            FOE,
            &CaptureModifiers {
                player_level: Some(1),
                ..CaptureModifiers::default()
            },
        )
        .unwrap();

    assert_eq!(at_ally_level, 45);
    assert_eq!(novice, 37);
}

#[test]
fn test_capture_chance_stays_within_bounds() {
    let (services, _) = test_services();
    let session = start_battle_with(
        vec![
            ally(1, CreatureBuilder::new("slime", 1).owned().build()).with_speed(99),
            opponent(2, CreatureBuilder::new("king_slime", 40).build()),
            opponent(3, CreatureBuilder::new("slime", 1).with_hp(1).build()),
        ],
        ScriptedRng::new(vec![]),
        services,
        EngineConfig::default(),
    );
    let boosted = CaptureModifiers {
        multiplier: 10.0,
        ..CaptureModifiers::default()
    };

    let floor = session.compute_capture_chance(FOE, &CaptureModifiers::default()).unwrap();
    let ceiling = session.compute_capture_chance(ParticipantId(3), &boosted).unwrap();

    assert_eq!(floor, 5);
    assert_eq!(ceiling, 95);
}

#[test]
fn test_guaranteed_capture_files_the_creature() {
    // Arrange
    let collection = Rc::new(RefCell::new(InMemoryCollection::new()));
    let (services, bus) = test_services();
    let services = services
        .with_collection(collection.clone())
        .with_clock(Rc::new(FixedClock::new(1_234)));
    let mut config = guaranteed();
    config.creatures.capture_friendship = 70;
    let mut session = wild_encounter(
        CreatureBuilder::new("slime", 5)
            .with_status(StatusKind::Poison, 3)
            .build(),
        vec![0.999],
        services,
        config,
    );

    // Act
    let report = session
        .attempt_capture(HERO, FOE, CaptureOptions::default())
        .unwrap();

    // Assert
    assert!(report.success);
    assert_eq!(report.chance, 100);
    assert_eq!(report.collection_id.as_deref(), Some("creature-1"));
    assert!(session.participant(FOE).is_none());
    assert!(!session.is_active());
    assert_eq!(session.result(), Some(BattleOutcome::Victory { by_capture: true }));

    let stored = collection.borrow();
    let creature = stored.get("creature-1").unwrap();
    assert!(!creature.wild);
    assert!(creature.status_effects.is_empty());
    assert_eq!(creature.friendship(), Some(70));
    let capture = creature.capture.as_ref().unwrap();
    assert_eq!(capture.owner_id, "player");
    assert_eq!(capture.captured_at, 1_234);
    assert_eq!(capture.collection_id.as_deref(), Some("creature-1"));

    let events = bus.battle_events();
    assert!(events.contains(&BattleEvent::CaptureSucceeded { target: "Slime".to_string() }));
    assert!(events.contains(&BattleEvent::BattleEnded {
        outcome: BattleOutcome::Victory { by_capture: true },
    }));
}

#[test]
fn test_session_owner_becomes_the_creature_owner() {
    let collection = Rc::new(RefCell::new(InMemoryCollection::new()));
    let (services, _) = test_services();
    let mut session = CombatSession::new(
        services.with_collection(collection.clone()),
        Box::new(ScriptedRng::new(vec![0.5])),
        guaranteed(),
    )
    .with_owner("trainer-7");
    session
        .start(vec![
            ally(1, CreatureBuilder::new("slime", 5).owned().build()).with_speed(99),
            opponent(2, CreatureBuilder::new("bat", 5).build()),
        ])
        .unwrap();

    session.attempt_capture(HERO, FOE, CaptureOptions::default()).unwrap();

    let stored = collection.borrow();
    let bat = stored.get("creature-1").unwrap();
    assert_eq!(bat.capture.as_ref().unwrap().owner_id, "trainer-7");
}

#[test]
fn test_capture_item_adds_bonus_and_is_consumed() {
    // Arrange: base 30 plus 10 for the orb, rolled at 40
    let inventory = Rc::new(RefCell::new(InMemoryInventory::new().with_item("capture_orb", 2)));
    let (services, _) = test_services();
    let mut session = wild_encounter(
        CreatureBuilder::new("slime", 5).build(),
        vec![0.395],
        services.with_inventory(inventory.clone()),
        EngineConfig::default(),
    );

    // Act
    let report = session
        .attempt_capture(HERO, FOE, CaptureOptions::with_item("capture_orb"))
        .unwrap();

    // Assert
    assert_eq!(report.chance, 40);
    assert_eq!(report.roll, 40);
    assert!(report.success);
    assert_eq!(inventory.borrow().quantity("capture_orb"), 1);
    assert_eq!(session.captured().len(), 1);
    assert_eq!(
        session.log()[0].action,
        CombatAction::Capture {
            target: FOE,
            item: Some("capture_orb".to_string()),
            success: true,
        }
    );
}

#[test]
fn test_inventory_capture_bonus_takes_precedence() {
    let mut held = InMemoryInventory::new().with_item("capture_orb", 1);
    held.define_capture_item("capture_orb", 25);
    let (services, _) = test_services();
    let mut session = wild_encounter(
        CreatureBuilder::new("slime", 5).build(),
        vec![0.99],
        services.with_inventory(held),
        EngineConfig::default(),
    );

    let report = session
        .attempt_capture(HERO, FOE, CaptureOptions::with_item("capture_orb"))
        .unwrap();

    assert_eq!(report.chance, 55);
    assert!(!report.success);
}

#[test]
fn test_bad_capture_items_are_rejected_before_rolling() {
    let inventory = Rc::new(RefCell::new(InMemoryInventory::new().with_item("potion", 1)));
    let (services, _) = test_services();
    let mut session = wild_encounter(
        CreatureBuilder::new("slime", 5).build(),
        vec![],
        services.with_inventory(inventory.clone()),
        EngineConfig::default(),
    );

    let not_an_orb = session
        .attempt_capture(HERO, FOE, CaptureOptions::with_item("potion"))
        .unwrap_err();
    let out_of_stock = session
        .attempt_capture(HERO, FOE, CaptureOptions::with_item("great_orb"))
        .unwrap_err();

    assert!(matches!(not_an_orb, EngineError::InvalidTarget(_)));
    assert!(matches!(out_of_stock, EngineError::InsufficientResource(_)));
    assert_eq!(inventory.borrow().quantity("potion"), 1);
    assert!(session.log().is_empty());
}

#[test]
fn test_failed_capture_passes_the_turn() {
    let (services, bus) = test_services();
    let mut session = wild_encounter(
        CreatureBuilder::new("slime", 5).build(),
        vec![0.99],
        services,
        EngineConfig::default(),
    );

    let report = session.attempt_capture(HERO, FOE, CaptureOptions::default()).unwrap();

    assert!(!report.success);
    assert_eq!(report.roll, 100);
    assert!(session.participant(FOE).is_some());
    assert!(session.is_active());
    assert_eq!(session.current_actor().map(|p| p.id), Some(FOE));
    assert!(bus.battle_events().contains(&BattleEvent::CaptureFailed { target: "Slime".to_string() }));
}

#[test]
fn test_forced_chance_overrides_the_formula() {
    let (services, _) = test_services();
    let mut config = EngineConfig::default();
    config.testing.forced_capture_chance = Some(0);
    let mut session = wild_encounter(
        CreatureBuilder::new("slime", 5).build(),
        vec![0.0],
        services,
        config,
    );

    let report = session.attempt_capture(HERO, FOE, CaptureOptions::default()).unwrap();

    assert_eq!(report.chance, 0);
    assert_eq!(report.roll, 1);
    assert!(!report.success);
}

#[test]
fn test_only_wild_opponents_can_be_captured() {
    let (services, _) = test_services();
    let mut session = start_battle_with(
        vec![
            ally(1, CreatureBuilder::new("slime", 5).owned().build()).with_speed(99),
            opponent(2, CreatureBuilder::new("bat", 5).owned().build()),
            ally(3, CreatureBuilder::new("slime", 5).build()),
            Participant::new(
                ParticipantId(4),
                Side::Opponent,
                PlayerAvatar::new(
                    "Rival",
                    5,
                    StatBlock {
                        hp: 50,
                        ..StatBlock::default()
                    },
                ),
            ),
        ],
        ScriptedRng::new(vec![]),
        services,
        guaranteed(),
    );

    let owned = session.attempt_capture(HERO, FOE, CaptureOptions::default()).unwrap_err();
    let teammate = session
        .attempt_capture(HERO, ParticipantId(3), CaptureOptions::default())
        .unwrap_err();
    let person = session
        .attempt_capture(HERO, ParticipantId(4), CaptureOptions::default())
        .unwrap_err();

    assert!(matches!(owned, EngineError::InvalidTarget(_)));
    assert!(matches!(teammate, EngineError::InvalidTarget(_)));
    assert!(matches!(person, EngineError::InvalidTarget(_)));
    assert_eq!(session.participants().len(), 4);
}

#[test]
fn test_capturing_one_of_two_opponents_continues_the_battle() {
    // Arrange
    let (services, _) = test_services();
    let mut session = start_battle_with(
        vec![
            ally(1, CreatureBuilder::new("slime", 5).owned().build()).with_speed(99),
            opponent(2, CreatureBuilder::new("slime", 5).build()).with_speed(50),
            opponent(3, CreatureBuilder::new("bat", 5).build()).with_speed(10),
        ],
        ScriptedRng::new(vec![0.5]),
        services,
        guaranteed(),
    );

    // Act
    let report = session.attempt_capture(HERO, FOE, CaptureOptions::default()).unwrap();

    // Assert
    assert!(report.success);
    assert!(report.collection_id.is_none());
    assert!(session.is_active());
    assert_eq!(session.turn_order(), vec![HERO, ParticipantId(3)]);
    assert_eq!(session.current_actor().map(|p| p.id), Some(ParticipantId(3)));
    let held = session.take_captured();
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].species, "slime");
    assert!(session.captured().is_empty());
}
