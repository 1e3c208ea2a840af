//! Damage table и resolution попаданий
//!
//! Таблица строится один раз на kind юнита (`static`) и шарится по ссылке
//! всеми экземплярами. Отсутствующий в таблице тип снаряда = дефект
//! конфигурации, а не runtime-ситуация.

use crate::combat::ProjectileKind;
use crate::error::CombatError;

/// Урон по типу снаряда для одного kind'а юнита
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageTable {
    amounts: [Option<u32>; ProjectileKind::COUNT],
}

impl DamageTable {
    /// Собирает таблицу в const-контексте (годится для `static`)
    pub const fn from_entries(entries: &[(ProjectileKind, u32)]) -> Self {
        let mut amounts = [None; ProjectileKind::COUNT];
        let mut i = 0;
        while i < entries.len() {
            let (kind, amount) = entries[i];
            amounts[kind.index()] = Some(amount);
            i += 1;
        }
        Self { amounts }
    }

    pub fn damage_for(&self, kind: ProjectileKind) -> Result<u32, CombatError> {
        self.amounts[kind.index()].ok_or(CombatError::UnmappedProjectile { kind })
    }
}

/// Результат попадания
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Урон применён, юнит жив
    Damaged { remaining: u32 },
    /// Здоровье дошло до нуля, запущен death sequence
    Destroyed,
    /// Юнит уже умирает, попадание игнорируется
    Ignored,
}
