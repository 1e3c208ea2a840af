//! Боевые юниты

pub mod tank;


pub use tank::{Tank, TANK_DAMAGE, TANK_PROJECTILE};
