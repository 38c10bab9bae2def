//! World hooks (§6): the opaque queries the AI core makes into systems
//! it does not own — map generation, orbital kinematics, the spawner.
//! The engine holds one `Box<dyn WorldHooks>`; a real deployment
//! implements it against its own world state, the binary harness ships
//! `StaticWorldHooks` as a test double.

use crate::world::base::Base;
use crate::world::ids::{BaseId, NpcId};
use crate::world::npc::{Faction, Npc};
use crate::world::Vec2;

pub trait WorldHooks: Send {
    /// Orbital mining targets are looked up fresh every tick rather
    /// than cached (§4.7); static asteroids are not.
    fn world_object_at(&self, object_id: &str) -> Option<Vec2>;

    /// Every `_clm`-marked asteroid or planet within `radius` of
    /// `point` (§3.4, §4.7) — the only candidates a rogue miner may
    /// ever claim. The id is the sole sync contract with the client
    /// world; the AI core never invents one.
    fn mining_claim_candidates(&self, point: Vec2, radius: f64) -> Vec<(String, Vec2)>;

    fn get_active_base(&self, base_id: BaseId) -> Option<Base>;
    fn get_bases_in_range(&self, point: Vec2, radius: f64) -> Vec<Base>;
    fn get_active_bases_by_faction(&self, faction: Faction) -> Vec<Base>;

    /// Returns the spawned captain, or `None` if the spawner declines
    /// (base destroyed, spawn cap reached, etc.) — never a hard error.
    fn spawn_captain_from_intel(&mut self, base_id: BaseId, target_pos: Vec2) -> Option<Npc>;
}

/// Minimal fixed-galaxy implementation for the harness binary and for
/// tests: a handful of bases and a fixed set of claimable asteroids,
/// matching the teacher's `galaxy.rs::create_sol_proxima` fixed-zone
/// approach.
pub struct StaticWorldHooks {
    pub bases: Vec<Base>,
    pub mining_claims: Vec<(String, Vec2)>,
}

impl StaticWorldHooks {
    pub fn new(bases: Vec<Base>) -> Self {
        StaticWorldHooks { bases, mining_claims: Vec::new() }
    }

    pub fn with_mining_claims(mut self, mining_claims: Vec<(String, Vec2)>) -> Self {
        self.mining_claims = mining_claims;
        self
    }
}

impl WorldHooks for StaticWorldHooks {
    fn world_object_at(&self, object_id: &str) -> Option<Vec2> {
        self.mining_claims.iter().find(|(id, _)| id == object_id).map(|(_, pos)| *pos)
    }

    fn mining_claim_candidates(&self, point: Vec2, radius: f64) -> Vec<(String, Vec2)> {
        self.mining_claims
            .iter()
            .filter(|(_, pos)| pos.distance(point) <= radius)
            .cloned()
            .collect()
    }

    fn get_active_base(&self, base_id: BaseId) -> Option<Base> {
        self.bases.iter().find(|b| b.id == base_id && !b.destroyed).cloned()
    }

    fn get_bases_in_range(&self, point: Vec2, radius: f64) -> Vec<Base> {
        self.bases
            .iter()
            .filter(|b| !b.destroyed && b.position.distance(point) <= radius)
            .cloned()
            .collect()
    }

    fn get_active_bases_by_faction(&self, faction: Faction) -> Vec<Base> {
        self.bases
            .iter()
            .filter(|b| !b.destroyed && b.faction == faction)
            .cloned()
            .collect()
    }

    fn spawn_captain_from_intel(&mut self, _base_id: BaseId, _target_pos: Vec2) -> Option<Npc> {
        None
    }
}
