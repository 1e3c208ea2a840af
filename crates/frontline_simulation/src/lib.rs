//! Frontline Simulation Core
//!
//! Боевые юниты side-scroller'а и их поведение, отвязанные от движка.
//!
//! Разделение ответственности:
//! - Ядро = правила: scan/stop/shoot контроллер, урон, death sequence
//! - Сцена = всё остальное: spatial query, physics, sprites, снаряды
//!
//! Сцена приходит через traits из `scene`. Для headless прогонов и тестов
//! есть in-memory реализация (`headless`), которую шагает Bevy App.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod actor;
pub mod behaviour;
pub mod combat;
pub mod config;
pub mod error;
pub mod headless;
pub mod logger;
pub mod scene;

// Re-export основных типов
pub use actor::{Tank, TANK_DAMAGE, TANK_PROJECTILE};
pub use behaviour::{Millis, Phase, ScanStopShoot, ScanStopShootCapabilities};
pub use combat::{BulletSpawn, DamageTable, Health, HitOutcome, ProjectileKind};
pub use config::TankConfig;
pub use error::{CombatError, ConfigError, SimulationError};
pub use headless::{Battle, BattlePlugin, HeadlessSettings, HeadlessWorld, StepReport, TankDestroyed, TankRemoved};
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use scene::{ActorId, Bounds, SceneHandles, Side};

/// Шаг симуляции (~60Hz, целое число ms для точных интервалов)
pub const TICK: Duration = Duration::from_millis(16);

/// Главный plugin симуляции
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep для simulation tick
            .insert_resource(Time::<Fixed>::from_duration(TICK))
            .add_plugins(BattlePlugin);

        // Детерминистичный RNG (seed по умолчанию, если app не задал свой)
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время шагает вручную: каждый `app.update()` = ровно один `TICK`,
/// результат не зависит от wall clock.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_duration(TICK))
        .insert_resource(TimeUpdateStrategy::ManualDuration(TICK));

    app
}

/// Snapshot боя для сравнения детерминизма
pub fn battle_snapshot(battle: &Battle) -> Vec<u8> {
    let mut snapshot = Vec::new();

    // Танки лежат в BTreeMap по ActorId, порядок стабильный
    for tank in battle.tanks() {
        snapshot.extend_from_slice(&tank.id().0.to_le_bytes());
        snapshot.extend_from_slice(
            format!(
                "{:?}|{:?}|{:.3}|{:.3}|{}",
                tank.phase(),
                tank.health(),
                tank.position().x,
                tank.velocity_x(),
                tank.is_dying()
            )
            .as_bytes(),
        );
    }
    for bullet in battle.world().bullets() {
        snapshot.extend_from_slice(format!("{:?}", bullet).as_bytes());
    }

    snapshot
}
