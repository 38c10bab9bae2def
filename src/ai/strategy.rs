//! The `Strategy` contract every faction behavior implements (§4.1),
//! plus the handful of helpers factored out so flanking/retreat/
//! territorial/formation don't each reinvent target scoring, patrol
//! orbiting, or fire-cooldown checks.

use std::collections::BTreeMap;

use crate::world::base::Base;
use crate::world::ids::NpcId;
use crate::world::neighborhood::{NearbyPlayer, Neighborhood};
use crate::world::npc::Npc;
use crate::world::Vec2;

use super::action::Action;
use super::hooks::WorldHooks;

/// Tick-local lookups handed to every strategy call (§4.1 `context`).
pub struct TickContext<'a> {
    pub now_ms: f64,
    pub dt_ms: f64,
    pub home_base: Option<&'a Base>,
    pub territory_radius: f64,
    pub patrol_radius: f64,
    pub has_foreman: bool,
    pub nearby_bases: &'a [&'a Base],
    pub all_npcs: &'a BTreeMap<NpcId, Npc>,
    pub world: &'a dyn WorldHooks,
}

/// One implementation per faction baseline, plus the Pirate and boss
/// strategies that sub-dispatch on NPC type internally. Strategies own
/// their long-lived caches (§3.4) and must clean them up via `cleanup`
/// when an NPC dies — never by walking every entry (§9).
pub trait Strategy {
    fn update(
        &mut self,
        npc: &mut Npc,
        neighborhood: &Neighborhood,
        ctx: &TickContext,
    ) -> Option<Action>;

    /// Called once, synchronously, in the death tick for every NPC this
    /// strategy has ever touched (§3.4, §8 invariant #3).
    fn cleanup(&mut self, id: NpcId);
}

/// Highest-distance-discounted player, no focus-fire weighting — used
/// by strategies that don't score targets (territorial, formation
/// followers). Flanking and Retreat define their own scoring on top of
/// this.
pub fn select_nearest(players: &[NearbyPlayer]) -> Option<&NearbyPlayer> {
    players
        .iter()
        .min_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap())
}

/// `dist ≤ weaponRange` and `now - lastFireTime > cooldown` (§4.1).
pub fn try_fire(npc: &Npc, distance: f64, now_ms: f64, cooldown_ms: f64) -> bool {
    distance <= npc.weapon_range && now_ms - npc.last_fire_time_ms > cooldown_ms
}

/// Advances `npc`'s patrol angle and returns the new orbit point around
/// `center`. Mutates `patrol_angle`; does not touch `position` so
/// callers can blend the result (e.g. move_toward) rather than snap.
pub fn simple_patrol(npc: &mut Npc, center: Vec2, radius: f64, angular_speed: f64, dt_ms: f64) -> Vec2 {
    npc.patrol_angle += angular_speed * (dt_ms / 1000.0);
    if npc.patrol_angle > std::f64::consts::TAU {
        npc.patrol_angle -= std::f64::consts::TAU;
    }
    center.add(Vec2::from_angle(npc.patrol_angle, radius))
}

/// Faction thresholds from §4.1: pirate 0.4, scavenger 0.2, swarm 0.0
/// (never), void 0.3, rogue_miner 0.5.
pub fn should_retreat(npc: &Npc, threshold: f64) -> bool {
    threshold > 0.0 && npc.hull_fraction() < threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::ids::PlayerId;

    #[test]
    fn select_nearest_picks_minimum_distance() {
        let players = vec![
            NearbyPlayer { id: PlayerId(1), position: Vec2::ZERO, distance: 500.0, mining: false },
            NearbyPlayer { id: PlayerId(2), position: Vec2::ZERO, distance: 100.0, mining: false },
        ];
        let nearest = select_nearest(&players).unwrap();
        assert_eq!(nearest.id, PlayerId(2));
    }

    #[test]
    fn swarm_threshold_zero_never_retreats() {
        use crate::world::npc::NpcType;
        let mut npc = Npc::spawn(NpcType::SwarmWarrior, Vec2::ZERO, None, Vec2::ZERO);
        npc.hull = 0.01;
        assert!(!should_retreat(&npc, 0.0));
    }
}
