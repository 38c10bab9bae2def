use serde::{Deserialize, Serialize};

use crate::world::ids::PlayerId;
use crate::world::Vec2;

/// The AI core's view of a player: just enough to target and score
/// against. Position is pushed in by `Engine::player_move` (§6); the
/// surrounding game server owns everything else about a player.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: PlayerId,
    pub position: Vec2,
    pub mining: bool,
}

impl PlayerRef {
    pub fn new(id: PlayerId, position: Vec2) -> Self {
        PlayerRef { id, position, mining: false }
    }
}
