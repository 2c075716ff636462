use crate::math::Vec3;
use crate::weapons::WeaponType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroppedWeapon {
    pub id: String,
    pub weapon_type: WeaponType,
    pub position: Vec3,
    pub current_ammo: u32,
    pub reserve_ammo: u32,
    pub dropped_at: f64,
}
