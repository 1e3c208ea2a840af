//! Error taxonomy симуляции.
//!
//! Транзиентных ошибок в ядре нет: все capability-вызовы считаются total.
//! Здесь только configuration defects, которые должны обрывать
//! construction/initialization, а не обрабатываться в рантайме.

use crate::combat::ProjectileKind;

/// Некорректная конфигурация юнита или контроллера.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Интервал контроллера должен быть > 0 ms.
    #[error("{name} interval must be positive")]
    ZeroInterval { name: &'static str },

    /// Tuning-значение должно быть > 0.
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    /// Сторона 0 зарезервирована под "нет владельца", юнитом быть не может.
    #[error("unit side must be non-zero")]
    UnownedSide,
}

/// Дефект боевой таблицы.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    /// Снаряд этого типа не может попасть в юнит данного kind'а.
    #[error("projectile kind {kind:?} has no entry in the damage table")]
    UnmappedProjectile { kind: ProjectileKind },
}

/// Всё, что может оборвать headless battle.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Combat(#[from] CombatError),
}
