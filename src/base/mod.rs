pub mod board;
pub mod player;
pub mod round;

pub use board::{Position, Symbol};
pub use player::{Player, PlayerKind};
pub use round::{Outcome, Round, RoundEvent};
