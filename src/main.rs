use monster_tamer::collaborators::Inventory;
use monster_tamer::{
    BattleServices, BreedingResolver, CaptureOptions, CombatSession, Creature, EngineConfig,
    EngineError, EngineResult, EventBus, InMemoryCollection, InMemoryInventory, Participant,
    ParticipantId, SeededRng, Side, SimplePlayer, SpeciesBook, SpeciesTable,
};
use std::cell::RefCell;
use std::rc::Rc;

const SPECIES_DATA: &str = include_str!("../data/species.ron");
const MAX_TURNS: usize = 200;

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if let Err(e) = run() {
        println!("Error: {}", e);
    }
}

fn run() -> EngineResult<()> {
    let table = Rc::new(SpeciesTable::from_ron_str(SPECIES_DATA)?);
    println!("Loaded {} species: {}", table.len(), table.keys().join(", "));
    println!();

    let mut rng = SeededRng::from_seed(7);
    let spawn = |key: &str, level: u8, rng: &mut SeededRng| -> EngineResult<Creature> {
        let data = table
            .species(key)
            .ok_or_else(|| EngineError::DataUnavailable(format!("no species '{}'", key)))?;
        Ok(Creature::wild(key, data, level, rng))
    };

    // Example 1: two AI-controlled parties fight it out
    let mut hero = spawn("ember", 8, &mut rng)?;
    hero.mark_captured("player", 0, 60);
    let mut partner = spawn("slime", 9, &mut rng)?;
    partner.mark_captured("player", 0, 60);
    let participants = vec![
        Participant::new(ParticipantId(1), Side::Ally, hero),
        Participant::new(ParticipantId(2), Side::Ally, partner),
        Participant::new(ParticipantId(3), Side::Opponent, spawn("bat", 8, &mut rng)?),
        Participant::new(ParticipantId(4), Side::Opponent, spawn("slime", 7, &mut rng)?),
    ];

    let bus = Rc::new(EventBus::new());
    let player = Rc::new(RefCell::new(SimplePlayer::new(8)));
    let inventory = Rc::new(RefCell::new(InMemoryInventory::new().with_item("potion", 3)));
    let services = BattleServices::new()
        .with_species(table.clone())
        .with_notifier(bus.clone())
        .with_player(player.clone())
        .with_inventory(inventory.clone());

    let mut session = CombatSession::begin(
        participants,
        services,
        Box::new(SeededRng::from_seed(2024)),
        EngineConfig::default(),
    )?;

    let mut turns = 0;
    while session.is_active() && turns < MAX_TURNS {
        let Some(id) = session.current_actor().map(|p| p.id) else {
            break;
        };
        session.ai_take_turn(id)?;
        turns += 1;
    }

    println!("--- Battle ({} turns) ---", turns);
    bus.print_formatted();
    println!("Result: {:?}", session.result());
    if let Some(rewards) = session.rewards() {
        println!(
            "Rewards: {} exp, {} gold; player now has {} exp",
            rewards.experience,
            rewards.gold,
            player.borrow().experience
        );
    }
    match serde_json::to_string_pretty(session.log()) {
        Ok(json) => println!("Action log:\n{}", json),
        Err(e) => println!("Could not serialize the action log: {}", e),
    }
    println!();

    // Example 2: catch a weakened wild slime with an orb
    bus.clear();
    inventory.borrow_mut().add("capture_orb", 2);
    let collection = Rc::new(RefCell::new(InMemoryCollection::new()));
    let mut catcher = spawn("ember", 10, &mut rng)?;
    catcher.mark_captured("player", 0, 60);
    let mut quarry = spawn("slime", 6, &mut rng)?;
    quarry.set_hp(quarry.max_hp() / 5);

    let mut config = EngineConfig::default();
    config.testing.guaranteed_capture = true;
    let services = BattleServices::new()
        .with_species(table.clone())
        .with_notifier(bus.clone())
        .with_inventory(inventory.clone())
        .with_collection(collection.clone());
    let mut session = CombatSession::begin(
        vec![
            Participant::new(ParticipantId(1), Side::Ally, catcher).with_speed(u32::MAX),
            Participant::new(ParticipantId(2), Side::Opponent, quarry),
        ],
        services,
        Box::new(SeededRng::from_seed(99)),
        config,
    )?;
    let report = session.attempt_capture(
        ParticipantId(1),
        ParticipantId(2),
        CaptureOptions::with_item("capture_orb"),
    )?;

    println!("--- Capture ---");
    bus.print_formatted();
    println!(
        "Chance {}%, rolled {}: {}",
        report.chance,
        report.roll,
        if report.success { "caught" } else { "escaped" }
    );
    println!("Collection holds {} creature(s)", collection.borrow().len());
    println!();

    // Example 3: breed two friendly, compatible creatures
    bus.clear();
    let mut first = spawn("slime", 12, &mut rng)?;
    first.mark_captured("player", 0, 70);
    let mut second = spawn("bat", 12, &mut rng)?;
    second.mark_captured("player", 0, 70);

    let mut resolver = BreedingResolver::new(
        table.clone(),
        Box::new(SeededRng::from_seed(11)),
        EngineConfig::default().breeding,
    )
    .with_notifier(bus.clone());
    let check = resolver.can_breed_together(&first, &second);
    println!("--- Breeding ---");
    if check.ok {
        let egg = resolver.breed(&mut first, &mut second)?;
        bus.print_formatted();
        println!(
            "Offspring: level {} {} (generation {})",
            egg.level,
            egg.display_name(),
            egg.generation()
        );
    } else {
        println!("Cannot breed: {}", check.reason.unwrap_or_default());
    }

    Ok(())
}
