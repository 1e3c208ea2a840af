//! Collaborator contracts внешней сцены
//!
//! Ядро не знает про рендер/физику движка. Всё, что ему нужно от сцены,
//! описано узкими traits ниже и передаётся юниту при создании через
//! `SceneHandles`, а не через один omniscient scene-объект.
//!
//! Все вызовы синхронные и total: ошибки рендера/физики это зона
//! ответственности реализаций, ядро их не видит.

use std::sync::Arc;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::combat::BulletSpawn;

/// Идентификатор объекта сцены (выдаётся `ActorRegistry::register`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u32);

/// Сторона (фракция) со знаком
///
/// Знак = команда, `0` зарезервирован под "нет владельца".
/// Магнитуда не используется: скорость, muzzle offset и т.п. умножаются на `sign()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Side(i8);

impl Side {
    /// Наступает слева направо
    pub const LEFT: Side = Side(1);
    /// Наступает справа налево
    pub const RIGHT: Side = Side(-1);
    pub const NONE: Side = Side(0);

    pub const fn new(raw: i8) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> i8 {
        self.0
    }

    pub fn sign(self) -> f32 {
        self.0.signum() as f32
    }

    pub fn opponent(self) -> Side {
        Side(self.0.saturating_neg())
    }

    /// Есть ли у стороны команда (`NONE` = нет владельца)
    pub fn is_owned(self) -> bool {
        self.0 != 0
    }

    pub fn faces_left(self) -> bool {
        self.0 < 0
    }

    pub fn is_hostile_to(self, other: Side) -> bool {
        self.is_owned() && other.is_owned() && self.0.signum() != other.0.signum()
    }
}

/// AABB в экранных координатах (y растёт вниз, `bottom` = нижняя кромка)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Bounds {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            left: center.x - half.x,
            top: center.y - half.y,
            right: center.x + half.x,
            bottom: center.y + half.y,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new((self.left + self.right) * 0.5, (self.top + self.bottom) * 0.5)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }
}

/// Spatial query карты
pub trait SpatialIndex: Send + Sync {
    /// Объекты стороны `side` в пределах `range` по горизонтали от `origin`.
    ///
    /// `direction`: угловой токен карты (в градусах), `filter` получает
    /// bounds кандидата. Ядро смотрит только на пустоту результата.
    fn objects_from(
        &self,
        origin: ActorId,
        side: Side,
        direction: f32,
        range: f32,
        filter: &dyn Fn(&Bounds) -> bool,
    ) -> Vec<ActorId>;
}

/// Bullet factory сцены (fire-and-forget)
pub trait BulletFactory: Send + Sync {
    fn create_bullet(&self, bullet: BulletSpawn);
}

/// Физическое тело юнита. Интеграцию делает движок.
pub trait PhysicsBody: Send + Sync {
    fn velocity_x(&self) -> f32;
    fn set_velocity_x(&mut self, velocity_x: f32);
    fn is_enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
    fn set_allow_gravity(&mut self, allow: bool);
    fn bounds(&self) -> Bounds;
    fn destroy(&mut self);
}

/// Визуальный ресурс (sprite). Для ядра непрозрачен.
pub trait Visual: Send + Sync {
    fn position(&self) -> Vec2;
    fn set_scale(&mut self, x: f32, y: f32);
    fn set_depth(&mut self, depth: i32);
    fn set_flip_x(&mut self, flip: bool);
    fn set_visible(&mut self, visible: bool);
    /// One-shot анимация. По завершении сцена уведомляет `listener`.
    fn play_once(&mut self, animation: &str, listener: ActorId);
    fn destroy(&mut self);
}

/// Sprite вместе с его physics body
pub struct PhysicsSprite {
    pub visual: Box<dyn Visual>,
    pub body: Box<dyn PhysicsBody>,
}

/// Создание визуальных ресурсов
pub trait Stage: Send + Sync {
    fn add_physics_sprite(&self, owner: ActorId, texture: &str, position: Vec2) -> PhysicsSprite;
    fn add_sprite(&self, texture: &str, position: Vec2) -> Box<dyn Visual>;
    /// Y линии земли
    fn ground_y(&self) -> f32;
}

/// Регистрация объектов сцены
pub trait ActorRegistry: Send + Sync {
    fn register(&self, side: Side) -> ActorId;
    fn deregister(&self, id: ActorId);
}

/// Asset preload hook (один раз на kind до первого спавна)
pub trait AssetLoader {
    fn load_image(&mut self, key: &str, path: &str);
}

/// Набор collaborator'ов, который юнит получает при создании
#[derive(Clone)]
pub struct SceneHandles {
    pub spatial: Arc<dyn SpatialIndex>,
    pub bullets: Arc<dyn BulletFactory>,
    pub stage: Arc<dyn Stage>,
    pub registry: Arc<dyn ActorRegistry>,
}

impl SceneHandles {
    /// Все четыре роли из одного объекта сцены
    pub fn from_shared<S>(scene: Arc<S>) -> Self
    where
        S: SpatialIndex + BulletFactory + Stage + ActorRegistry + 'static,
    {
        Self {
            spatial: scene.clone(),
            bullets: scene.clone(),
            stage: scene.clone(),
            registry: scene,
        }
    }
}
