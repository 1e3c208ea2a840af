//! Battle: headless driver поверх `HeadlessWorld`
//!
//! Один `step(now)` = один тик фиксированного шага:
//! 1. доигравшие анимации → `Tank::on_animation_complete`
//! 2. `Tank::update` для всех живых танков
//! 3. интеграция тел и снарядов, истечение lifetime
//! 4. попадания → `Tank::on_projectile_hit`
//! 5. снятые со сцены танки выбрасываются из батла
//!
//! Анимации продвигаются первыми: взрыв, начатый на тике N, начинает
//! отсчёт только с тика N+1.

use std::collections::BTreeMap;
use std::sync::Arc;

use bevy::prelude::*;
use rand::Rng;

use crate::actor::Tank;
use crate::behaviour::Millis;
use crate::combat::HitOutcome;
use crate::config::TankConfig;
use crate::error::{ConfigError, SimulationError};
use crate::logger;
use crate::scene::{ActorId, SceneHandles, Side};

use super::world::{HeadlessSettings, HeadlessWorld};

/// Что произошло за один тик
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Попадания, дошедшие до живых танков
    pub hits: usize,
    /// Танки, получившие смертельное попадание
    pub destroyed: Vec<ActorId>,
    /// Танки, снятые со сцены (взрыв доиграл или прямой `remove`)
    pub removed: Vec<ActorId>,
}

/// Headless бой: сцена + танки
#[derive(Resource)]
pub struct Battle {
    world: HeadlessWorld,
    scene: SceneHandles,
    config: Arc<TankConfig>,
    tanks: BTreeMap<ActorId, Tank>,
    last_step: Option<Millis>,
    halted: Option<SimulationError>,
}

impl Battle {
    /// Новая сцена, текстуры танка загружены заранее (preload hook)
    pub fn new(settings: HeadlessSettings, config: TankConfig) -> Result<Self, ConfigError> {
        config
            .validate()
            .inspect_err(|err| logger::log_error(&format!("Battle: invalid tank config: {}", err)))?;
        settings
            .validate()
            .inspect_err(|err| logger::log_error(&format!("Battle: invalid scene settings: {}", err)))?;

        let world = HeadlessWorld::new(settings);
        Tank::preload(&mut world.loader(), &config);
        let scene = SceneHandles::from_shared(Arc::new(world.clone()));

        Ok(Self {
            world,
            scene,
            config: Arc::new(config),
            tanks: BTreeMap::new(),
            last_step: None,
            halted: None,
        })
    }

    pub fn spawn_tank(&mut self, side: Side, x: f32, speed: f32) -> Result<ActorId, ConfigError> {
        let tank = Tank::spawn(self.scene.clone(), self.config.clone(), side, x, speed)
            .inspect_err(|err| logger::log_error(&format!("Battle: spawn rejected: {}", err)))?;
        let id = tank.id();
        self.tanks.insert(id, tank);
        Ok(id)
    }

    /// Встречная расстановка: `per_side` танков слева и справа
    pub fn spawn_skirmish(
        &mut self,
        rng: &mut impl Rng,
        per_side: usize,
    ) -> Result<Vec<ActorId>, ConfigError> {
        let width = self.world.settings().width;
        let mut ids = Vec::with_capacity(per_side * 2);

        for _ in 0..per_side {
            let x = rng.gen_range(0.0..width * 0.15);
            let speed = rng.gen_range(30.0..50.0);
            ids.push(self.spawn_tank(Side::LEFT, x, speed)?);

            let x = rng.gen_range(width * 0.85..width);
            let speed = rng.gen_range(30.0..50.0);
            ids.push(self.spawn_tank(Side::RIGHT, x, speed)?);
        }

        Ok(ids)
    }

    /// Один тик. Время монотонное; шаг назад считается нулевым dt.
    pub fn step(&mut self, now: Millis) -> Result<StepReport, SimulationError> {
        let dt = self.last_step.map_or(0, |last| now.saturating_sub(last));
        self.last_step = Some(now);

        let mut report = StepReport::default();

        for listener in self.world.advance_animations(dt) {
            match self.tanks.get_mut(&listener) {
                Some(tank) => tank.on_animation_complete(),
                None => logger::log_warning(&format!(
                    "Battle: animation listener {:?} is gone",
                    listener
                )),
            }
        }

        for tank in self.tanks.values_mut() {
            tank.update(now);
        }

        self.world.integrate(dt);

        for hit in self.world.collect_hits() {
            let Some(tank) = self.tanks.get_mut(&hit.target) else {
                continue;
            };
            match tank.on_projectile_hit(hit.kind)? {
                HitOutcome::Damaged { .. } => report.hits += 1,
                HitOutcome::Destroyed => {
                    report.hits += 1;
                    report.destroyed.push(hit.target);
                }
                HitOutcome::Ignored => {}
            }
        }

        for id in self.world.drain_deregistered() {
            if self.tanks.remove(&id).is_some() {
                report.removed.push(id);
            }
        }

        Ok(report)
    }

    /// Останавливает бой после ошибки (bevy system дальше не шагает)
    pub fn halt(&mut self, error: SimulationError) {
        logger::log_error(&format!("Battle halted: {}", error));
        self.halted = Some(error);
    }

    pub fn halted(&self) -> Option<&SimulationError> {
        self.halted.as_ref()
    }

    pub fn world(&self) -> &HeadlessWorld {
        &self.world
    }

    pub fn config(&self) -> &TankConfig {
        &self.config
    }

    pub fn tank(&self, id: ActorId) -> Option<&Tank> {
        self.tanks.get(&id)
    }

    pub fn tank_mut(&mut self, id: ActorId) -> Option<&mut Tank> {
        self.tanks.get_mut(&id)
    }

    pub fn tanks(&self) -> impl Iterator<Item = &Tank> {
        self.tanks.values()
    }

    /// Живые (не dying) танки стороны
    pub fn alive_on(&self, side: Side) -> usize {
        self.tanks
            .values()
            .filter(|tank| !tank.is_dying() && tank.side() == side)
            .count()
    }
}
