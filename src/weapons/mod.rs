mod def;
mod economy;
mod instance;

pub use def::{kill_reward, weapon_def, Slot, WeaponDef, WeaponType, WEAPON_TABLE};
pub use economy::{EconomyConfig, DEFAULT_ECONOMY_CONFIG};
pub use instance::WeaponInstance;
