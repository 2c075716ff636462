use super::def::{weapon_def, WeaponType};
use serde::{Deserialize, Serialize};

/// A concrete weapon sitting in a player's inventory: static `WeaponType`
/// plus the mutable ammo/reload state the tick loop updates every frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeaponInstance {
    pub weapon_type: WeaponType,
    pub current_ammo: u32,
    pub reserve_ammo: u32,
    pub is_reloading: bool,
    pub reload_start_time: f64,
    pub last_fire_time: f64,
}

impl WeaponInstance {
    pub fn fresh(weapon_type: WeaponType) -> Self {
        let def = weapon_def(weapon_type);
        Self {
            weapon_type,
            current_ammo: def.magazine_size,
            reserve_ammo: def.reserve_ammo,
            is_reloading: false,
            reload_start_time: 0.0,
            last_fire_time: 0.0,
        }
    }

    pub fn is_infinite(&self) -> bool {
        weapon_def(self.weapon_type).magazine_size == u32::MAX
    }

    pub fn can_fire(&self, now_ms: f64) -> bool {
        if self.is_reloading || self.current_ammo == 0 {
            return false;
        }
        let def = weapon_def(self.weapon_type);
        now_ms - self.last_fire_time >= def.fire_interval_ms()
    }

    /// Decrements ammo and records the fire timestamp. Infinite-ammo
    /// weapons (knife) never decrement.
    pub fn fire(&mut self, now_ms: f64) {
        if !self.is_infinite() {
            self.current_ammo = self.current_ammo.saturating_sub(1);
        }
        self.last_fire_time = now_ms;
    }

    pub fn can_reload(&self) -> bool {
        let def = weapon_def(self.weapon_type);
        !self.is_infinite()
            && !self.is_reloading
            && self.current_ammo < def.magazine_size
            && self.reserve_ammo > 0
    }

    pub fn start_reload(&mut self, now_ms: f64) {
        self.is_reloading = true;
        self.reload_start_time = now_ms;
    }

    /// Completes the reload once `reloadTime` has elapsed, moving ammo from
    /// reserve to magazine. Conserves `Δ(current) = -Δ(reserve)`.
    pub fn tick_reload(&mut self, now_ms: f64) {
        if !self.is_reloading {
            return;
        }
        let def = weapon_def(self.weapon_type);
        if now_ms - self.reload_start_time >= def.reload_time as f64 * 1000.0 {
            let needed = def.magazine_size - self.current_ammo;
            let moved = needed.min(self.reserve_ammo);
            self.current_ammo += moved;
            self.reserve_ammo -= moved;
            self.is_reloading = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reload_moves_ammo_from_reserve_preserving_conservation() {
        let mut w = WeaponInstance::fresh(WeaponType::Pistol);
        w.current_ammo = 3;
        w.reserve_ammo = 12;
        w.start_reload(0.0);
        let def = weapon_def(WeaponType::Pistol);
        w.tick_reload(def.reload_time as f64 * 1000.0);
        assert_eq!(w.current_ammo, 12);
        assert_eq!(w.reserve_ammo, 3);
        assert!(!w.is_reloading);
    }

    #[test]
    fn reload_does_not_complete_early() {
        let mut w = WeaponInstance::fresh(WeaponType::Pistol);
        w.current_ammo = 3;
        w.start_reload(0.0);
        w.tick_reload(10.0);
        assert!(w.is_reloading);
        assert_eq!(w.current_ammo, 3);
    }

    #[test]
    fn knife_never_runs_out() {
        let mut w = WeaponInstance::fresh(WeaponType::Knife);
        for _ in 0..1000 {
            w.fire(0.0);
        }
        assert_eq!(w.current_ammo, u32::MAX);
        assert!(!w.can_reload());
    }

    #[test]
    fn ammo_never_exceeds_magazine_size() {
        let w = WeaponInstance::fresh(WeaponType::Rifle);
        assert!(w.current_ammo <= weapon_def(WeaponType::Rifle).magazine_size);
    }
}
