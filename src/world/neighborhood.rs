//! Per-tick, per-NPC view of the world within aggro/ally range (§3.3).
//! Not stored across ticks. `NeighborhoodScratch` is the reusable buffer
//! pool the Neighborhood Builder phase fills once per NPC and the
//! dispatcher reads immediately after — modeled on the teacher's
//! `npc_spawner.rs` building one `NPCSnapshot` vector per zone per tick
//! rather than allocating fresh per NPC (§9 "avoid per-frame allocation").

use std::collections::BTreeMap;

use crate::config::{ALLY_RADIUS, RAGE_ZONE_RADIUS};
use crate::world::ids::{NpcId, PlayerId};
use crate::world::npc::{MiningState, Npc, NpcState};
use crate::world::player::PlayerRef;
use crate::world::Vec2;

#[derive(Debug, Clone, Copy)]
pub struct NearbyPlayer {
    pub id: PlayerId,
    pub position: Vec2,
    pub distance: f64,
    pub mining: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct NearbyNpc {
    pub id: NpcId,
    pub position: Vec2,
    pub distance: f64,
    pub hull_fraction: f64,
}

/// Buffers reused across every NPC in a tick. `Engine` owns exactly one
/// of these and calls `clear()` before each NPC rather than allocating
/// a fresh `Neighborhood`.
#[derive(Debug, Default)]
pub struct NeighborhoodScratch {
    players: Vec<NearbyPlayer>,
    allies: Vec<NearbyNpc>,
    hostiles: Vec<NearbyNpc>,
}

impl NeighborhoodScratch {
    pub fn new() -> Self {
        Self::default()
    }

    fn clear(&mut self) {
        self.players.clear();
        self.allies.clear();
        self.hostiles.clear();
    }

    /// Fills the scratch buffers for `npc` and hands back borrowed
    /// slices as a `Neighborhood`. Must be fully consumed (the strategy
    /// call that follows) before the next call to `build_for`, since the
    /// backing storage is reused.
    pub fn build_for<'a>(
        &'a mut self,
        npc: &Npc,
        all_npcs: &BTreeMap<NpcId, Npc>,
        players: &[PlayerRef],
    ) -> Neighborhood<'a> {
        self.clear();

        // An enraged rogue miner must keep tracking its attacker out to
        // `RAGE_ZONE_RADIUS` (3,000 units, §4.6) even though that's well
        // beyond its normal `aggro_range` — otherwise the attacker drops
        // out of the neighborhood and rage clears long before the spec's
        // 3,000-unit boundary.
        let player_range = if matches!(npc.state, NpcState::Mining(MiningState::Enraged)) {
            npc.aggro_range.max(RAGE_ZONE_RADIUS)
        } else {
            npc.aggro_range
        };

        for p in players {
            let distance = npc.position.distance(p.position);
            if distance <= player_range {
                self.players.push(NearbyPlayer {
                    id: p.id,
                    position: p.position,
                    distance,
                    mining: p.mining,
                });
            }
        }

        for other in all_npcs.values() {
            if other.id == npc.id || !other.is_alive() {
                continue;
            }
            let distance = npc.position.distance(other.position);
            if other.faction == npc.faction {
                if distance <= ALLY_RADIUS {
                    self.allies.push(NearbyNpc {
                        id: other.id,
                        position: other.position,
                        distance,
                        hull_fraction: other.hull_fraction(),
                    });
                }
            } else if npc.faction.is_hostile_to(other.faction) && distance <= npc.aggro_range {
                self.hostiles.push(NearbyNpc {
                    id: other.id,
                    position: other.position,
                    distance,
                    hull_fraction: other.hull_fraction(),
                });
            }
        }

        Neighborhood {
            players: &self.players,
            allies: &self.allies,
            hostiles: &self.hostiles,
        }
    }
}

pub struct Neighborhood<'a> {
    pub players: &'a [NearbyPlayer],
    pub allies: &'a [NearbyNpc],
    pub hostiles: &'a [NearbyNpc],
}

impl<'a> Neighborhood<'a> {
    pub fn nearest_player(&self) -> Option<&NearbyPlayer> {
        self.players
            .iter()
            .min_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap())
    }

    pub fn allies_targeting(&self, target: PlayerId, targets_by_npc: &BTreeMap<NpcId, PlayerId>) -> usize {
        self.allies
            .iter()
            .filter(|a| targets_by_npc.get(&a.id) == Some(&target))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::npc::NpcType;

    #[test]
    fn players_outside_aggro_range_are_excluded() {
        let npc = Npc::spawn(NpcType::Scavenger, Vec2::ZERO, None, Vec2::ZERO);
        let far = PlayerRef::new(PlayerId(1), Vec2::new(npc.aggro_range + 1.0, 0.0));
        let near = PlayerRef::new(PlayerId(2), Vec2::new(10.0, 0.0));
        let mut scratch = NeighborhoodScratch::new();
        let all_npcs = BTreeMap::new();
        let nb = scratch.build_for(&npc, &all_npcs, &[far, near]);
        assert_eq!(nb.players.len(), 1);
        assert_eq!(nb.players[0].id, PlayerId(2));
    }

    #[test]
    fn hostile_faction_map_is_symmetric() {
        let pirate = Npc::spawn(NpcType::PirateFighter, Vec2::ZERO, None, Vec2::ZERO);
        let mut scavenger = Npc::spawn(NpcType::Scavenger, Vec2::new(50.0, 0.0), None, Vec2::ZERO);
        scavenger.id = NpcId(99);
        let mut all_npcs = BTreeMap::new();
        all_npcs.insert(scavenger.id, scavenger);
        let mut scratch = NeighborhoodScratch::new();
        let nb = scratch.build_for(&pirate, &all_npcs, &[]);
        assert_eq!(nb.hostiles.len(), 1);
    }
}
