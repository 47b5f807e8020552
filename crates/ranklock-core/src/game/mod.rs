mod player;
mod state;

pub use player::*;
pub use state::*;
