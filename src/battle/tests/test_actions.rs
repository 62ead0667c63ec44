use crate::battle::state::{BattleOutcome, CombatAction, ParticipantId};
use crate::battle::tests::common::{
    ally, opponent, start_battle, start_battle_with, test_services, CreatureBuilder,
};
use crate::collaborators::{Consumable, InMemoryInventory, Inventory};
use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::events::BattleEvent;
use crate::rng::{ScriptedRng, SeededRng};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

const HERO: ParticipantId = ParticipantId(1);
const FOE: ParticipantId = ParticipantId(2);

fn duel(rng: ScriptedRng) -> (crate::battle::session::CombatSession, Rc<crate::events::EventBus>) {
    start_battle(
        vec![
            ally(1, CreatureBuilder::new("slime", 5).owned().build()).with_speed(99),
            opponent(2, CreatureBuilder::new("slime", 5).build()).with_speed(10),
        ],
        rng,
    )
}

fn hp_of(session: &crate::battle::session::CombatSession, id: ParticipantId) -> u32 {
    session.participant(id).unwrap().actor().vitals().hp
}

fn mp_of(session: &crate::battle::session::CombatSession, id: ParticipantId) -> u32 {
    session.participant(id).unwrap().actor().vitals().mp
}

#[test]
fn test_attack_deals_damage_and_ends_turn() {
    // Arrange: neutral variance, no critical hit
    let (mut session, bus) = duel(ScriptedRng::new(vec![0.5, 0.99]));

    // Act
    let report = session.attack(HERO, FOE).unwrap();

    // Assert
    assert_eq!(report.damage, 7);
    assert!(!report.critical);
    assert_eq!(report.remaining_hp, 53);
    assert_eq!(hp_of(&session, FOE), 53);
    assert_eq!(session.log().len(), 1);
    assert_eq!(session.log()[0].action, CombatAction::Attack { target: FOE });
    assert_eq!(session.current_actor().map(|p| p.id), Some(FOE));
    assert!(bus.battle_events().contains(&BattleEvent::AttackLanded {
        attacker: "Slime".to_string(),
        target: "Slime".to_string(),
        damage: 7,
        critical: false,
        remaining_hp: 53,
    }));
}

#[test]
fn test_critical_hit_doubles_damage() {
    let (mut session, _) = duel(ScriptedRng::new(vec![0.5, 0.0]));

    let report = session.attack(HERO, FOE).unwrap();

    assert!(report.critical);
    assert_eq!(report.damage, 14);
}

#[test]
fn test_damage_is_always_positive() {
    // A level 1 attacker against a level 40 wall
    let (services, _) = test_services();
    let mut session = start_battle_with(
        vec![
            ally(1, CreatureBuilder::new("slime", 1).build()).with_speed(99),
            opponent(2, CreatureBuilder::new("king_slime", 40).build()),
        ],
        SeededRng::from_seed(3),
        services,
        EngineConfig::default(),
    );

    let report = session.attack(HERO, FOE).unwrap();

    assert!(report.damage >= 1);
}

#[test]
fn test_lethal_attack_wins_the_battle() {
    let (mut session, bus) = start_battle(
        vec![
            ally(1, CreatureBuilder::new("slime", 5).build()).with_speed(99),
            opponent(2, CreatureBuilder::new("slime", 5).with_hp(3).build()),
        ],
        ScriptedRng::new(vec![0.5, 0.99]),
    );

    let report = session.attack(HERO, FOE).unwrap();

    assert!(report.target_defeated);
    assert_eq!(report.remaining_hp, 0);
    assert!(!session.is_active());
    assert_eq!(session.result(), Some(BattleOutcome::Victory { by_capture: false }));
    assert!(bus
        .battle_events()
        .contains(&BattleEvent::ParticipantDefeated { name: "Slime".to_string() }));
}

#[test]
fn test_invalid_actions_change_nothing() {
    let fallen = CreatureBuilder::new("slime", 5).with_hp(0).build();
    let (mut session, _) = start_battle(
        vec![
            ally(1, CreatureBuilder::new("slime", 5).build()).with_speed(30),
            opponent(2, CreatureBuilder::new("slime", 5).build()).with_speed(20),
            opponent(3, fallen),
        ],
        ScriptedRng::new(vec![]),
    );

    let out_of_turn = session.attack(FOE, HERO).unwrap_err();
    let unknown = session.attack(HERO, ParticipantId(99)).unwrap_err();
    let itself = session.attack(HERO, HERO).unwrap_err();
    let defeated = session.attack(HERO, ParticipantId(3)).unwrap_err();

    assert!(matches!(out_of_turn, EngineError::InvalidParticipant { .. }));
    assert!(matches!(unknown, EngineError::InvalidParticipant { id: ParticipantId(99), .. }));
    assert!(matches!(itself, EngineError::InvalidTarget(_)));
    assert!(matches!(defeated, EngineError::InvalidTarget(_)));
    assert!(session.log().is_empty());
    assert_eq!(session.current_actor().map(|p| p.id), Some(HERO));
    assert_eq!(hp_of(&session, FOE), 60);
}

#[test]
fn test_actions_after_the_battle_are_refused() {
    let (mut session, _) = duel(ScriptedRng::new(vec![]));
    session.end_battle(BattleOutcome::Defeat);

    assert_eq!(session.attack(HERO, FOE).unwrap_err(), EngineError::SessionInactive);
    assert_eq!(session.defend(HERO).unwrap_err(), EngineError::SessionInactive);
}

#[test]
fn test_magic_without_enough_mp_changes_nothing() {
    // Arrange
    let mut caster = CreatureBuilder::new("slime", 5).build();
    caster.set_mp(3);
    let (mut session, _) = start_battle(
        vec![
            ally(1, caster).with_speed(99),
            opponent(2, CreatureBuilder::new("slime", 5).build()),
        ],
        ScriptedRng::new(vec![]),
    );

    // Act
    let err = session.magic(HERO, FOE, "bounce", 10).unwrap_err();

    // Assert
    assert!(matches!(err, EngineError::InsufficientResource(_)));
    assert_eq!(mp_of(&session, HERO), 3);
    assert_eq!(hp_of(&session, FOE), 60);
    assert!(session.log().is_empty());
    assert_eq!(session.current_actor().map(|p| p.id), Some(HERO));
    assert_eq!(session.round(), 1);
}

#[test]
fn test_magic_spends_mp_and_adds_flat_bonus() {
    let (services, _) = test_services();
    let mut config = EngineConfig::default();
    config.combat.mp_regen_fraction = 0.0;
    let mut session = start_battle_with(
        vec![
            ally(1, CreatureBuilder::new("slime", 5).build()).with_speed(99),
            opponent(2, CreatureBuilder::new("slime", 5).build()),
        ],
        ScriptedRng::new(vec![0.5, 0.99]),
        services,
        config,
    );
    let mp_before = mp_of(&session, HERO);

    let report = session.magic(HERO, FOE, "bounce", 10).unwrap();

    // floor(4 * 60 * 26/24 / 50 + 2) = 7, plus 5
    assert_eq!(report.damage, 12);
    assert_eq!(report.mp_spent, 10);
    assert_eq!(mp_of(&session, HERO), mp_before - 10);
    assert_eq!(
        session.log()[0].action,
        CombatAction::Magic {
            target: FOE,
            move_id: "bounce".to_string(),
            mp_cost: 10,
        }
    );
}

#[test]
fn test_mp_regenerates_at_end_of_turn() {
    let mut caster = CreatureBuilder::new("slime", 5).build();
    caster.set_mp(0);
    let (mut session, _) = start_battle(
        vec![
            ally(1, caster).with_speed(99),
            opponent(2, CreatureBuilder::new("slime", 5).build()),
        ],
        ScriptedRng::new(vec![]),
    );

    session.defend(HERO).unwrap();

    // 5% of 36 max MP, floored to 1
    assert_eq!(mp_of(&session, HERO), 1);
}

#[test]
fn test_potion_heals_and_is_consumed() {
    // Arrange
    let inventory = Rc::new(RefCell::new(InMemoryInventory::new().with_item("potion", 2)));
    let (services, bus) = test_services();
    let mut session = start_battle_with(
        vec![
            ally(1, CreatureBuilder::new("slime", 5).with_hp(5).build()).with_speed(99),
            opponent(2, CreatureBuilder::new("slime", 5).build()),
        ],
        ScriptedRng::new(vec![]),
        services.with_inventory(inventory.clone()),
        EngineConfig::default(),
    );

    // Act
    let report = session.use_item(HERO, "potion").unwrap();

    // Assert
    assert_eq!(report.healed, 50);
    assert_eq!(hp_of(&session, HERO), 55);
    assert_eq!(inventory.borrow().quantity("potion"), 1);
    assert_eq!(
        session.log()[0].action,
        CombatAction::UseItem { item: "potion".to_string() }
    );
    assert!(bus.battle_events().contains(&BattleEvent::ItemUsed {
        user: "Slime".to_string(),
        item: "potion".to_string(),
    }));
}

#[test]
fn test_defined_consumable_restores_mp() {
    let mut held = InMemoryInventory::new().with_item("ether", 1);
    held.define_consumable("ether", Consumable { heal_hp: 0, restore_mp: 20 });
    let inventory = Rc::new(RefCell::new(held));
    let mut caster = CreatureBuilder::new("slime", 5).build();
    caster.set_mp(0);
    let (services, _) = test_services();
    let mut config = EngineConfig::default();
    config.combat.mp_regen_fraction = 0.0;
    let mut session = start_battle_with(
        vec![
            ally(1, caster).with_speed(99),
            opponent(2, CreatureBuilder::new("slime", 5).build()),
        ],
        ScriptedRng::new(vec![]),
        services.with_inventory(inventory.clone()),
        config,
    );

    let report = session.use_item(HERO, "ether").unwrap();

    assert_eq!(report.mp_restored, 20);
    assert_eq!(mp_of(&session, HERO), 20);
    assert_eq!(inventory.borrow().quantity("ether"), 0);
}

#[test]
fn test_item_failures_consume_nothing() {
    let inventory = Rc::new(RefCell::new(InMemoryInventory::new().with_item("pebble", 1)));
    let (services, _) = test_services();
    let mut session = start_battle_with(
        vec![
            ally(1, CreatureBuilder::new("slime", 5).with_hp(5).build()).with_speed(99),
            opponent(2, CreatureBuilder::new("slime", 5).build()),
        ],
        ScriptedRng::new(vec![]),
        services.with_inventory(inventory.clone()),
        EngineConfig::default(),
    );

    let missing = session.use_item(HERO, "potion").unwrap_err();
    let useless = session.use_item(HERO, "pebble").unwrap_err();

    assert!(matches!(missing, EngineError::InsufficientResource(_)));
    assert!(matches!(useless, EngineError::InvalidTarget(_)));
    assert_eq!(inventory.borrow().quantity("pebble"), 1);
    assert_eq!(hp_of(&session, HERO), 5);
    assert!(session.log().is_empty());
}

#[test]
fn test_item_without_inventory_is_unavailable() {
    let (mut session, _) = duel(ScriptedRng::new(vec![]));
    let err = session.use_item(HERO, "potion").unwrap_err();
    assert!(matches!(err, EngineError::DataUnavailable(_)));
}

#[test]
fn test_flee_at_full_chance_always_succeeds() {
    // The highest possible roll is 100.
    let (mut session, bus) = duel(ScriptedRng::new(vec![0.999]));

    let report = session.attempt_flee(HERO, Some(100)).unwrap();

    assert!(report.success);
    assert_eq!(report.roll, 100);
    assert!(!session.is_active());
    assert_eq!(session.result(), Some(BattleOutcome::Fled));
    assert!(session.rewards().is_none());
    assert_eq!(session.log()[0].action, CombatAction::Flee { success: true });
    assert!(bus.battle_events().contains(&BattleEvent::BattleEnded {
        outcome: BattleOutcome::Fled,
    }));
}

#[test]
fn test_failed_flee_passes_the_turn() {
    let (mut session, bus) = duel(ScriptedRng::new(vec![0.5]));

    let report = session.attempt_flee(HERO, Some(10)).unwrap();

    assert!(!report.success);
    assert_eq!(report.roll, 51);
    assert!(session.is_active());
    assert_eq!(session.current_actor().map(|p| p.id), Some(FOE));
    assert!(bus
        .battle_events()
        .contains(&BattleEvent::FleeFailed { name: "Slime".to_string() }));
}

#[test]
fn test_flee_uses_configured_default_chance() {
    // Roll 76 misses the default 75%.
    let (mut session, _) = duel(ScriptedRng::new(vec![0.75]));

    let report = session.attempt_flee(HERO, None).unwrap();

    assert_eq!(report.chance, 75);
    assert_eq!(report.roll, 76);
    assert!(!report.success);
}

#[test]
fn test_defend_is_logged() {
    let (mut session, bus) = duel(ScriptedRng::new(vec![]));

    session.defend(HERO).unwrap();

    assert_eq!(session.log()[0].action, CombatAction::Defend);
    assert!(bus
        .battle_events()
        .contains(&BattleEvent::Defended { name: "Slime".to_string() }));
}
