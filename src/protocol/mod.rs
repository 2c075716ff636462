pub mod client_msg;
pub mod server_msg;

pub use client_msg::ClientMsg;
pub use server_msg::{RoomListEntry, ServerMsg};
