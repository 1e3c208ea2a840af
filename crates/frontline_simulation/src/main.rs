//! Headless бой Frontline
//!
//! Встречная расстановка танков, Bevy App без рендера, 1000 тиков.

use frontline_simulation::{
    create_headless_app, Battle, DeterministicRng, HeadlessSettings, Side, SimulationPlugin,
    TankConfig,
};

fn main() {
    let seed = 42;
    println!("Starting Frontline headless battle (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);

    let mut battle = match Battle::new(HeadlessSettings::default(), TankConfig::default()) {
        Ok(battle) => battle,
        Err(err) => {
            eprintln!("Invalid tank config: {}", err);
            std::process::exit(1);
        }
    };

    let spawned = {
        let mut rng = app.world_mut().resource_mut::<DeterministicRng>();
        battle.spawn_skirmish(&mut rng.rng, 3)
    };
    if let Err(err) = spawned {
        eprintln!("Spawn failed: {}", err);
        std::process::exit(1);
    }
    app.insert_resource(battle);

    // Запускаем 1000 тиков симуляции
    for tick in 0..1000 {
        app.update();

        if tick % 100 == 0 {
            let battle = app.world().resource::<Battle>();
            println!(
                "Tick {}: left={} right={} bullets={}",
                tick,
                battle.alive_on(Side::LEFT),
                battle.alive_on(Side::RIGHT),
                battle.world().bullets().len()
            );
        }
    }

    let battle = app.world().resource::<Battle>();
    if let Some(err) = battle.halted() {
        eprintln!("Battle halted: {}", err);
        std::process::exit(1);
    }
    println!("Simulation complete!");
}
