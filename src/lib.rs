pub mod ai;
pub mod arena;
pub mod board;
pub mod bot;
pub mod config;
pub mod coordinates;
pub mod game;
pub mod pawn;
pub mod protocol;

pub use ai::*;
pub use arena::*;
pub use board::*;
pub use bot::*;
pub use config::*;
pub use coordinates::*;
pub use game::*;
pub use pawn::*;
pub use protocol::*;
