//! Scan/Stop/Shoot behaviour
//!
//! Таймерный автомат для любого юнита, который умеет capability-набор
//! `ScanStopShootCapabilities`:
//!
//! ```text
//!            find_target() == true
//!   Moving ─────────────────────────▶ Stopped ──┐ create_bullet()
//!     ▲                                  │  ◀───┘ (не чаще shoot_interval)
//!     └──────────────────────────────────┘
//!            find_target() == false
//! ```
//!
//! - `scan_interval`: период скана. Переходы случаются только на тиках
//!   скана, поэтому автомат не дёргается быстрее одного раза за интервал.
//! - `shoot_interval`: минимальный шаг между проверками на выстрел в Stopped.
//!   Выстрел только если свежий `find_target()` видит цель; между сканами
//!   фаза не меняется, даже если цель пропала.
//! - `is_moving()`: только idempotency guard перед `move_forward()`/`stop()`,
//!   решения о переходах принимаются по собственной фазе контроллера.

use crate::behaviour::Millis;
use crate::error::ConfigError;

/// Capability-набор, через который контроллер управляет юнитом
pub trait ScanStopShootCapabilities {
    /// Есть ли враг в зоне обнаружения
    fn find_target(&mut self) -> bool;
    /// Движется ли юнит сейчас (по физике)
    fn is_moving(&self) -> bool;
    /// Остановиться
    fn stop(&mut self);
    /// Ехать вперёд с крейсерской скоростью
    fn move_forward(&mut self);
    /// Выстрелить
    fn create_bullet(&mut self);
}

/// Фаза контроллера
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Едем, периодически сканируем
    #[default]
    Moving,
    /// Стоим и стреляем, пока цель видна
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanStopShoot {
    scan_interval: Millis,
    shoot_interval: Millis,
    phase: Phase,
    last_scan: Option<Millis>,
    last_fire_check: Option<Millis>,
}

impl ScanStopShoot {
    pub fn new(scan_interval: Millis, shoot_interval: Millis) -> Result<Self, ConfigError> {
        if scan_interval == 0 {
            return Err(ConfigError::ZeroInterval { name: "scan" });
        }
        if shoot_interval == 0 {
            return Err(ConfigError::ZeroInterval { name: "shoot" });
        }

        Ok(Self {
            scan_interval,
            shoot_interval,
            phase: Phase::Moving,
            last_scan: None,
            last_fire_check: None,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Один тик. Возвращает новую фазу, если на этом тике был переход.
    pub fn update<C>(&mut self, now: Millis, caps: &mut C) -> Option<Phase>
    where
        C: ScanStopShootCapabilities + ?Sized,
    {
        let mut transition = None;
        let mut sighting = None;

        if is_due(self.last_scan, now, self.scan_interval) {
            self.last_scan = Some(now);
            let target_seen = caps.find_target();
            sighting = Some(target_seen);

            match (self.phase, target_seen) {
                (Phase::Moving, true) => {
                    self.phase = Phase::Stopped;
                    transition = Some(Phase::Stopped);
                }
                (Phase::Stopped, false) => {
                    self.phase = Phase::Moving;
                    transition = Some(Phase::Moving);
                }
                _ => {}
            }
        }

        match self.phase {
            Phase::Moving => {
                if !caps.is_moving() {
                    caps.move_forward();
                }
            }
            Phase::Stopped => {
                if caps.is_moving() {
                    caps.stop();
                }
                // Скан мог быть до shoot_interval назад: перед выстрелом
                // цель проверяется заново (на тике скана его результат)
                if is_due(self.last_fire_check, now, self.shoot_interval) {
                    self.last_fire_check = Some(now);
                    let target_seen = match sighting {
                        Some(seen) => seen,
                        None => caps.find_target(),
                    };
                    if target_seen {
                        caps.create_bullet();
                    }
                }
            }
        }

        transition
    }
}

fn is_due(last: Option<Millis>, now: Millis, interval: Millis) -> bool {
    match last {
        None => true,
        Some(last) => now.saturating_sub(last) >= interval,
    }
}
