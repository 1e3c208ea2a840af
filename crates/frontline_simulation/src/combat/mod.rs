//! Combat module
//!
//! Ядро отвечает за:
//! - Damage rules: таблица урона по типу снаряда, Health
//! - Bullet spawn request (ядро → bullet factory)
//!
//! Сцена отвечает за:
//! - Полёт снарядов, collision detection, фильтрацию по стороне
//! - Доставку попаданий в `Tank::on_projectile_hit`

pub mod damage;
pub mod health;
pub mod projectile;

pub use damage::{DamageTable, HitOutcome};
pub use health::Health;
pub use projectile::{BulletSpawn, ProjectileKind};
