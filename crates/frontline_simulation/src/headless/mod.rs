//! Headless сцена и bevy-драйвер боя
//!
//! `HeadlessWorld` стоит на месте движка: spatial index, bullet factory,
//! stage и registry в одном in-memory объекте. `Battle` связывает его
//! с танками, `BattlePlugin` шагает бой в FixedUpdate.

use bevy::prelude::*;

use crate::behaviour::Millis;
use crate::logger;
use crate::scene::ActorId;

pub mod battle;
pub mod world;


pub use battle::{Battle, StepReport};
pub use world::{Bullet, BulletHit, HeadlessLoader, HeadlessSettings, HeadlessWorld};

/// Event: танк получил смертельное попадание (начался взрыв)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TankDestroyed {
    pub id: ActorId,
}

/// Event: танк снят со сцены
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TankRemoved {
    pub id: ActorId,
}

/// Battle Plugin
///
/// Шагает `Battle` resource (если он вставлен) в FixedUpdate, время берётся
/// из `Time<Fixed>`. Ошибка боя останавливает дальнейшие шаги.
pub struct BattlePlugin;

impl Plugin for BattlePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<TankDestroyed>()
            .add_event::<TankRemoved>()
            .add_systems(FixedUpdate, advance_battle);
    }
}

/// Система: один шаг боя на один fixed tick
pub fn advance_battle(
    time: Res<Time>,
    battle: Option<ResMut<Battle>>,
    mut destroyed: EventWriter<TankDestroyed>,
    mut removed: EventWriter<TankRemoved>,
) {
    let Some(mut battle) = battle else {
        return;
    };
    if battle.halted().is_some() {
        return;
    }

    let now = time.elapsed().as_millis() as Millis;
    match battle.step(now) {
        Ok(report) => {
            for id in report.destroyed {
                destroyed.write(TankDestroyed { id });
            }
            for id in report.removed {
                removed.write(TankRemoved { id });
            }
        }
        Err(err) => {
            logger::log_error(&format!("advance_battle: step at t={} failed", now));
            battle.halt(err);
        }
    }
}
