//! Tank: боевой юнит с scan/stop/shoot поведением
//!
//! Жизненный цикл:
//! 1. `spawn`: регистрация в сцене, sprite + physics body, контроллер
//! 2. `update` каждый тик: контроллер решает ехать/стоять/стрелять
//! 3. попадания → `on_projectile_hit` → урон по `TANK_DAMAGE`
//! 4. health == 0 → `die`: юнит инертен, играет взрыв
//! 5. сцена сообщает о конце анимации → `on_animation_complete` → `remove`
//!
//! Флаг dying монотонный: после него никаких velocity-команд и тиков контроллера.

use std::sync::Arc;

use bevy::math::Vec2;

use crate::behaviour::{Millis, Phase, ScanStopShoot, ScanStopShootCapabilities};
use crate::combat::{BulletSpawn, DamageTable, Health, HitOutcome, ProjectileKind};
use crate::config::TankConfig;
use crate::error::{CombatError, ConfigError};
use crate::logger;
use crate::scene::{
    ActorId, AssetLoader, Bounds, PhysicsBody, PhysicsSprite, SceneHandles, Side, Stage, Visual,
};

/// Урон по танку (общий для всех танков)
pub static TANK_DAMAGE: DamageTable =
    DamageTable::from_entries(&[(ProjectileKind::Tank, 50), (ProjectileKind::Rifle, 1)]);

/// Тип снаряда, которым стреляет танк
pub const TANK_PROJECTILE: ProjectileKind = ProjectileKind::Tank;

/// Часть танка, которую видит контроллер (capability-набор)
struct TankRig {
    id: ActorId,
    side: Side,
    speed: f32,
    face_left: bool,
    ground_y: f32,
    sprite: Box<dyn Visual>,
    body: Box<dyn PhysicsBody>,
    scene: SceneHandles,
    config: Arc<TankConfig>,
}

impl TankRig {
    fn drive(&mut self, velocity_x: f32, face_left: bool) {
        self.face_left = face_left;
        self.body.set_velocity_x(velocity_x);

        if velocity_x > 0.0 {
            self.sprite.set_flip_x(true);
        } else {
            self.sprite.set_flip_x(!face_left);
        }
    }
}

impl ScanStopShootCapabilities for TankRig {
    fn find_target(&mut self) -> bool {
        // Только цели над "горизонтом": нижняя кромка ниже ground - высота танка
        let horizon = self.ground_y - self.body.bounds().height();
        let targets = self.scene.spatial.objects_from(
            self.id,
            self.side.opponent(),
            self.config.scan_direction,
            self.config.scan_range,
            &|bounds: &Bounds| bounds.bottom > horizon,
        );
        !targets.is_empty()
    }

    fn is_moving(&self) -> bool {
        self.body.velocity_x() != 0.0
    }

    fn stop(&mut self) {
        let face_left = self.side.faces_left();
        self.drive(0.0, face_left);
    }

    fn move_forward(&mut self) {
        let velocity_x = self.speed * self.side.sign();
        let face_left = self.side.faces_left();
        self.drive(velocity_x, face_left);
    }

    fn create_bullet(&mut self) {
        let sign = self.side.sign();
        let position = self.sprite.position();
        let bullet = BulletSpawn {
            side: self.side,
            lifetime_ms: self.config.bullet_lifetime_ms,
            position: Vec2::new(position.x + self.config.muzzle_offset * sign, position.y),
            velocity: Vec2::new(self.config.bullet_speed * sign, 0.0),
            kind: TANK_PROJECTILE,
        };

        logger::log(&format!("Tank {:?} fires at x={:.1}", self.id, bullet.position.x));
        self.scene.bullets.create_bullet(bullet);
    }
}

/// Боевой юнит
pub struct Tank {
    rig: TankRig,
    behaviour: ScanStopShoot,
    health: Health,
    damage: &'static DamageTable,
    dying: bool,
    removed: bool,
    explosion: Option<Box<dyn Visual>>,
}

impl Tank {
    /// Регистрирует текстуру танка. Один раз до первого `spawn`.
    pub fn preload(loader: &mut dyn AssetLoader, config: &TankConfig) {
        loader.load_image(&config.texture, &config.texture_path);
    }

    /// Иконка для UI выбора юнитов
    pub fn create_icon(stage: &dyn Stage, config: &TankConfig, x: f32, y: f32) -> Box<dyn Visual> {
        let mut icon = stage.add_sprite(&config.texture, Vec2::new(x, y));
        icon.set_scale(config.icon_scale, config.icon_scale);
        icon
    }

    /// Спавн на линии земли в точке `x`
    ///
    /// Битая конфигурация или сторона без владельца обрывают спавн
    /// до регистрации в сцене.
    pub fn spawn(
        scene: SceneHandles,
        config: Arc<TankConfig>,
        side: Side,
        x: f32,
        speed: f32,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if !side.is_owned() {
            return Err(ConfigError::UnownedSide);
        }
        let behaviour = ScanStopShoot::new(config.scan_interval_ms, config.shoot_interval_ms)?;

        let id = scene.registry.register(side);
        let ground_y = scene.stage.ground_y();
        let PhysicsSprite { mut visual, mut body } = scene.stage.add_physics_sprite(
            id,
            &config.texture,
            Vec2::new(x, ground_y - config.spawn_height),
        );
        visual.set_scale(config.sprite_scale, config.sprite_scale);
        visual.set_depth(config.depth);
        body.set_allow_gravity(false);

        logger::log_info(&format!(
            "Tank {:?} spawned: side={} x={:.1} speed={:.1}",
            id,
            side.raw(),
            x,
            speed
        ));

        Ok(Self {
            rig: TankRig {
                id,
                side,
                speed,
                face_left: side.faces_left(),
                ground_y,
                sprite: visual,
                body,
                scene,
                config: config.clone(),
            },
            behaviour,
            health: Health::new(config.max_health),
            damage: &TANK_DAMAGE,
            dying: false,
            removed: false,
            explosion: None,
        })
    }

    /// Тик симуляции. No-op после `die`/`remove`.
    pub fn update(&mut self, now: Millis) {
        if self.dying || self.removed {
            return;
        }

        if let Some(phase) = self.behaviour.update(now, &mut self.rig) {
            logger::log(&format!("Tank {:?} → {:?} at t={}", self.rig.id, phase, now));
        }
    }

    /// Горизонтальная скорость + направление взгляда
    pub fn drive(&mut self, velocity_x: f32, face_left: bool) {
        if self.dying || self.removed {
            return;
        }
        self.rig.drive(velocity_x, face_left);
    }

    /// Попадание снаряда
    ///
    /// Каждый вызов: отдельное попадание со своим уроном, даже если
    /// несколько снарядов пришли за один тик.
    pub fn on_projectile_hit(&mut self, kind: ProjectileKind) -> Result<HitOutcome, CombatError> {
        let amount = self.damage.damage_for(kind)?;

        if self.dying || self.removed {
            return Ok(HitOutcome::Ignored);
        }

        self.health.take_damage(amount);
        logger::log(&format!(
            "Tank {:?} hit by {:?}: -{} HP ({} left)",
            self.rig.id, kind, amount, self.health.current
        ));

        if self.health.is_alive() {
            Ok(HitOutcome::Damaged { remaining: self.health.current })
        } else {
            self.die();
            Ok(HitOutcome::Destroyed)
        }
    }

    /// Death sequence: юнит инертен, спрайт скрыт, играет взрыв.
    /// Уничтожение: после уведомления о конце анимации.
    pub fn die(&mut self) {
        if self.dying || self.removed {
            return;
        }
        self.dying = true;

        let rig = &mut self.rig;
        rig.sprite.set_visible(false);
        rig.body.set_velocity_x(0.0);
        rig.body.set_enabled(false);

        let position = rig.sprite.position();
        let offset = if rig.face_left { rig.config.explosion_offset } else { -rig.config.explosion_offset };
        let mut explosion = rig
            .scene
            .stage
            .add_sprite(&rig.config.explosion, Vec2::new(position.x + offset, position.y));
        explosion.set_depth(rig.config.depth);
        explosion.play_once(&rig.config.explosion, rig.id);
        self.explosion = Some(explosion);

        logger::log_info(&format!("Tank {:?} destroyed at x={:.1}", rig.id, position.x));
    }

    /// Сцена сообщает, что one-shot анимация этого юнита доиграла
    pub fn on_animation_complete(&mut self) {
        match self.explosion.take() {
            Some(mut explosion) => {
                explosion.destroy();
                self.remove();
            }
            None => logger::log_warning(&format!(
                "Tank {:?}: animation complete without pending explosion",
                self.rig.id
            )),
        }
    }

    /// Освобождает ресурсы и снимает юнит со сцены (без анимации)
    pub fn remove(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;

        self.rig.sprite.destroy();
        self.rig.body.destroy();
        if let Some(mut explosion) = self.explosion.take() {
            explosion.destroy();
        }
        self.rig.scene.registry.deregister(self.rig.id);

        logger::log_info(&format!("Tank {:?} removed", self.rig.id));
    }

    pub fn id(&self) -> ActorId {
        self.rig.id
    }

    pub fn side(&self) -> Side {
        self.rig.side
    }

    pub fn speed(&self) -> f32 {
        self.rig.speed
    }

    pub fn health(&self) -> Health {
        self.health
    }

    pub fn is_dying(&self) -> bool {
        self.dying
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn face_left(&self) -> bool {
        self.rig.face_left
    }

    pub fn phase(&self) -> Phase {
        self.behaviour.phase()
    }

    pub fn position(&self) -> Vec2 {
        self.rig.sprite.position()
    }

    pub fn velocity_x(&self) -> f32 {
        self.rig.body.velocity_x()
    }
}
