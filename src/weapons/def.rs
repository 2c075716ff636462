use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    Knife,
    Pistol,
    Rifle,
    Shotgun,
    Sniper,
}

/// Inventory slot a weapon type occupies; a player holds at most one weapon
/// per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Melee,
    Sidearm,
    Primary,
}

/// Static per-weapon-type stats. One `WeaponDef` per `WeaponType`, looked up
/// by value rather than constructed per-instance.
#[derive(Debug, Clone, Copy)]
pub struct WeaponDef {
    pub weapon_type: WeaponType,
    pub slot: Slot,
    pub cost: i32,
    pub damage: f32,
    pub fire_rate: f32, // rounds per minute
    pub range: f32,
    pub spread_deg: f32,
    pub headshot_multiplier: f32,
    pub magazine_size: u32,
    pub reserve_ammo: u32,
    pub reload_time: f32, // seconds
}

impl WeaponDef {
    pub fn fire_interval_ms(&self) -> f64 {
        60_000.0 / self.fire_rate as f64
    }
}

pub fn weapon_def(weapon_type: WeaponType) -> &'static WeaponDef {
    WEAPON_TABLE
        .iter()
        .find(|def| def.weapon_type == weapon_type)
        .expect("every WeaponType has a table entry")
}

pub static WEAPON_TABLE: &[WeaponDef] = &[
    WeaponDef {
        weapon_type: WeaponType::Knife,
        slot: Slot::Melee,
        cost: 0,
        damage: 40.0,
        fire_rate: 120.0,
        range: 2.0,
        spread_deg: 0.0,
        headshot_multiplier: 2.0,
        magazine_size: u32::MAX,
        reserve_ammo: u32::MAX,
        reload_time: 0.0,
    },
    WeaponDef {
        weapon_type: WeaponType::Pistol,
        slot: Slot::Sidearm,
        cost: 0,
        damage: 28.0,
        fire_rate: 300.0,
        range: 40.0,
        spread_deg: 2.5,
        headshot_multiplier: 2.0,
        magazine_size: 12,
        reserve_ammo: 36,
        reload_time: 1.5,
    },
    WeaponDef {
        weapon_type: WeaponType::Rifle,
        slot: Slot::Primary,
        cost: 2700,
        damage: 33.0,
        fire_rate: 666.0,
        range: 60.0,
        spread_deg: 3.0,
        headshot_multiplier: 2.2,
        magazine_size: 30,
        reserve_ammo: 90,
        reload_time: 2.5,
    },
    WeaponDef {
        weapon_type: WeaponType::Shotgun,
        slot: Slot::Primary,
        cost: 1800,
        damage: 20.0,
        fire_rate: 70.0,
        range: 15.0,
        spread_deg: 8.0,
        headshot_multiplier: 1.5,
        magazine_size: 8,
        reserve_ammo: 32,
        reload_time: 3.0,
    },
    WeaponDef {
        weapon_type: WeaponType::Sniper,
        slot: Slot::Primary,
        cost: 4750,
        damage: 115.0,
        fire_rate: 40.0,
        range: 100.0,
        spread_deg: 0.5,
        headshot_multiplier: 2.5,
        magazine_size: 5,
        reserve_ammo: 10,
        reload_time: 3.7,
    },
];

/// Kill money reward per weapon type, used by `GameRunner::resolve_kill`.
pub fn kill_reward(weapon_type: WeaponType) -> i32 {
    match weapon_type {
        WeaponType::Knife => 1500,
        WeaponType::Pistol => 300,
        _ => 300,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_weapon_type_has_a_def() {
        for t in [
            WeaponType::Knife,
            WeaponType::Pistol,
            WeaponType::Rifle,
            WeaponType::Shotgun,
            WeaponType::Sniper,
        ] {
            assert_eq!(weapon_def(t).weapon_type, t);
        }
    }

    #[test]
    fn sniper_matches_headshot_scenario_constants() {
        let def = weapon_def(WeaponType::Sniper);
        assert_eq!(def.damage, 115.0);
        assert_eq!(def.headshot_multiplier, 2.5);
        assert_eq!(def.range, 100.0);
    }
}
