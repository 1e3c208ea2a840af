//! Behaviour controllers
//!
//! Контроллер не владеет юнитом: юнит передаёт себя (capability-набор)
//! в `update` на каждом тике. Тик-луп внешний, фиксированный шаг,
//! всё однопоточно.

pub mod scan_stop_shoot;

#[cfg(test)]
mod scan_stop_shoot_tests;

pub use scan_stop_shoot::{Phase, ScanStopShoot, ScanStopShootCapabilities};

/// Timestamp / длительность симуляции в миллисекундах
pub type Millis = u64;
