//! Tuning параметры юнитов
//!
//! Числа здесь: конфигурация, а не логика ядра. Default повторяет
//! боевой танк.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::behaviour::Millis;
use crate::error::ConfigError;

/// Параметры танка (общие для всех экземпляров kind'а)
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct TankConfig {
    /// Дальность обнаружения по горизонтали
    pub scan_range: f32,
    /// Угловой токен для spatial query карты (градусы)
    pub scan_direction: f32,
    /// Throttle для find_target (ms)
    pub scan_interval_ms: Millis,
    /// Минимальный шаг между выстрелами (ms)
    pub shoot_interval_ms: Millis,

    /// Время жизни снаряда (ms)
    pub bullet_lifetime_ms: Millis,
    /// Горизонтальная скорость снаряда
    pub bullet_speed: f32,
    /// Смещение дула от центра спрайта (по направлению стороны)
    pub muzzle_offset: f32,

    /// Смещение взрыва от центра (против направления взгляда)
    pub explosion_offset: f32,
    /// Насколько выше линии земли спавнится центр спрайта
    pub spawn_height: f32,
    pub sprite_scale: f32,
    pub icon_scale: f32,
    pub depth: i32,
    pub max_health: u32,

    pub texture: String,
    pub texture_path: String,
    /// Текстура и анимация взрыва (один ключ)
    pub explosion: String,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            scan_range: 300.0,
            scan_direction: 92.0,
            scan_interval_ms: 2000,
            shoot_interval_ms: 2000,
            bullet_lifetime_ms: 5000,
            bullet_speed: 100.0,
            muzzle_offset: 46.0,
            explosion_offset: 16.0,
            spawn_height: 20.0,
            sprite_scale: 0.5,
            icon_scale: 0.35,
            depth: 1,
            max_health: 100,
            texture: "tank".to_string(),
            texture_path: "/images/tank.png".to_string(),
            explosion: "explode".to_string(),
        }
    }
}

impl TankConfig {
    /// Отсекает заведомо битую конфигурацию до спавна
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval { name: "scan" });
        }
        if self.shoot_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval { name: "shoot" });
        }
        if self.bullet_lifetime_ms == 0 {
            return Err(ConfigError::ZeroInterval { name: "bullet lifetime" });
        }

        let positive = [
            ("scan_range", self.scan_range),
            ("bullet_speed", self.bullet_speed),
            ("sprite_scale", self.sprite_scale),
            ("icon_scale", self.icon_scale),
            ("max_health", self.max_health as f32),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        Ok(())
    }
}
