pub mod bot;
pub mod dropped_weapon;
pub mod input;
pub mod player;
pub mod spawn;

pub use bot::{Bot, BotState, Difficulty};
pub use dropped_weapon::DroppedWeapon;
pub use input::Input;
pub use player::{apply_damage, Combatant, CombatantMut, Player, Team};
pub use spawn::{MapBounds, MapData, SpawnPoint, SpawnTeam};
