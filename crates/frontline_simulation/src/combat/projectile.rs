//! Projectile kinds и bullet spawn request

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::behaviour::Millis;
use crate::scene::Side;

/// Тип снаряда (закрытое перечисление, ключ damage table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Пехотная пуля
    Rifle,
    /// Танковый снаряд
    Tank,
    /// Авиабомба
    Bomb,
}

impl ProjectileKind {
    pub const COUNT: usize = 3;

    pub const ALL: [ProjectileKind; Self::COUNT] =
        [ProjectileKind::Rifle, ProjectileKind::Tank, ProjectileKind::Bomb];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Запрос на спавн снаряда (ядро → bullet factory)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulletSpawn {
    /// Сторона стрелявшего (снаряд не бьёт своих)
    pub side: Side,
    pub lifetime_ms: Millis,
    pub position: Vec2,
    pub velocity: Vec2,
    pub kind: ProjectileKind,
}
