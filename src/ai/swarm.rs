//! Swarm collective (§4.6): non-queen swarm units. Covers role patrol,
//! queen-guard override, orbit-tightening combat, linked damage
//! propagation, and assimilation drones.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::config::{
    ASSIMILATE_RANGE, DRONE_ASSIMILATE_SPEED, LINKED_DAMAGE_FRACTION, LINKED_DAMAGE_RADIUS,
    QUEEN_GUARD_ANGULAR_SPEED, QUEEN_GUARD_INNER_RADIUS, QUEEN_GUARD_INTERCEPT_FRACTION,
    QUEEN_GUARD_INTERCEPT_RANGE, QUEEN_GUARD_OUTER_RADIUS, QUEEN_GUARD_RANGE, SWARM_COMBAT_FIRE_COOLDOWN_MS,
    SWARM_DRONE_PATROL_ANGULAR_SPEED, SWARM_DRONE_PATROL_RADIUS_MAX, SWARM_DRONE_PATROL_RADIUS_MIN,
    SWARM_ORBIT_MIN_FRACTION, SWARM_ORBIT_TIGHTEN_PER_MS, SWARM_WARRIOR_PATROL_ANGULAR_SPEED,
    SWARM_WARRIOR_PATROL_RADIUS, SWARM_WORKER_PATROL_ANGULAR_SPEED, SWARM_WORKER_PATROL_RADIUS,
};
use crate::world::ids::NpcId;
use crate::world::neighborhood::Neighborhood;
use crate::world::npc::{Npc, NpcState, NpcType};
use crate::world::Vec2;

use super::action::{Action, ActionTarget, FireAction};
use super::strategy::{simple_patrol, try_fire, Strategy, TickContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwarmState {
    Patrol,
    QueenGuard,
    Combat,
    SeekingBase,
}

/// Applies the static cross-cutting linked-damage pass (§4.6, §8
/// invariant #5): every *other* `linked_health` swarm unit within
/// `LINKED_DAMAGE_RADIUS` of `originator` takes `LINKED_DAMAGE_FRACTION`
/// of `damage`, once, non-recursively. Called directly by the applier
/// right after it resolves the originating hit — not a periodic sweep.
pub fn propagate_linked_damage(
    originator: NpcId,
    origin_pos: Vec2,
    damage: f64,
    all_npcs: &mut BTreeMap<NpcId, Npc>,
) -> Vec<(NpcId, f64)> {
    let splash = damage * LINKED_DAMAGE_FRACTION;
    let targets: Vec<NpcId> = all_npcs
        .values()
        .filter(|n| n.id != originator && n.linked_health && n.is_alive() && n.position.distance(origin_pos) <= LINKED_DAMAGE_RADIUS)
        .map(|n| n.id)
        .collect();

    let mut applied = Vec::new();
    for id in targets {
        if let Some(n) = all_npcs.get_mut(&id) {
            let result = crate::world::damage::apply_damage(n, splash, 0.0);
            applied.push((id, result.hull_damage + result.shield_damage));
        }
    }
    applied
}

#[derive(Default)]
pub struct SwarmStrategy;

impl SwarmStrategy {
    pub fn new() -> Self {
        SwarmStrategy::default()
    }

    fn role_patrol_params(npc_type: NpcType) -> (f64, f64) {
        match npc_type {
            NpcType::SwarmDrone => ((SWARM_DRONE_PATROL_RADIUS_MIN + SWARM_DRONE_PATROL_RADIUS_MAX) / 2.0, SWARM_DRONE_PATROL_ANGULAR_SPEED),
            NpcType::SwarmWorker => (SWARM_WORKER_PATROL_RADIUS, SWARM_WORKER_PATROL_ANGULAR_SPEED),
            _ => (SWARM_WARRIOR_PATROL_RADIUS, SWARM_WARRIOR_PATROL_ANGULAR_SPEED),
        }
    }

    fn queen_guard(npc: &mut Npc, queen_pos: Vec2, ctx: &TickContext, neighborhood: &Neighborhood) -> Option<Action> {
        npc.state = NpcState::Swarm(SwarmState::QueenGuard);

        if let Some(intruder) = neighborhood.players.iter().find(|p| p.position.distance(queen_pos) <= QUEEN_GUARD_INTERCEPT_RANGE) {
            let intercept = queen_pos.add(intruder.position.sub(queen_pos).scale(QUEEN_GUARD_INTERCEPT_FRACTION));
            npc.position = npc.position.move_toward(intercept, npc.speed * (ctx.dt_ms / 1000.0));
            npc.rotation = intruder.position.sub(npc.position).angle();
            if try_fire(npc, intruder.distance, ctx.now_ms, SWARM_COMBAT_FIRE_COOLDOWN_MS) {
                npc.last_fire_time_ms = ctx.now_ms;
                return Some(Action::Fire(FireAction {
                    target: ActionTarget::Player(intruder.id),
                    weapon_type: npc.weapon_type,
                    weapon_tier: npc.weapon_tier,
                    base_damage: npc.weapon_damage,
                    shield_piercing: 0.0,
                    enraged: false,
                    synchronized: false,
                }));
            }
            return None;
        }

        let radius = if (npc.orbit_angle / PI).floor() as i64 % 2 == 0 { QUEEN_GUARD_INNER_RADIUS } else { QUEEN_GUARD_OUTER_RADIUS };
        let point = simple_patrol(npc, queen_pos, radius, QUEEN_GUARD_ANGULAR_SPEED, ctx.dt_ms);
        npc.position = npc.position.move_toward(point, npc.speed * (ctx.dt_ms / 1000.0));
        None
    }
}

impl Strategy for SwarmStrategy {
    fn update(&mut self, npc: &mut Npc, neighborhood: &Neighborhood, ctx: &TickContext) -> Option<Action> {
        if npc.attached_to_base {
            return None; // frozen passenger of the base (§3.1).
        }

        if let Some(base_id) = npc.assimilation_target {
            npc.state = NpcState::Swarm(SwarmState::SeekingBase);
            if let Some(base) = ctx.nearby_bases.iter().find(|b| b.id == base_id) {
                let distance = npc.position.distance(base.position);
                if distance <= ASSIMILATE_RANGE {
                    return Some(Action::Assimilate { drone_id: npc.id, base_id });
                }
                npc.position = npc.position.move_toward(base.position, DRONE_ASSIMILATE_SPEED * (ctx.dt_ms / 1000.0));
                npc.rotation = base.position.sub(npc.position).angle();
            }
            return None;
        }

        let live_queen = ctx
            .all_npcs
            .values()
            .find(|n| n.npc_type == NpcType::SwarmQueen && n.is_alive() && n.position.distance(npc.position) <= QUEEN_GUARD_RANGE);

        if let Some(queen) = live_queen {
            return Self::queen_guard(npc, queen.position, ctx, neighborhood);
        }

        if neighborhood.players.is_empty() {
            let (radius, angular_speed) = Self::role_patrol_params(npc.npc_type);
            let point = simple_patrol(npc, npc.home_base_position, radius, angular_speed, ctx.dt_ms);
            npc.position = npc.position.move_toward(point, npc.speed * (ctx.dt_ms / 1000.0));
            npc.state = NpcState::Swarm(SwarmState::Patrol);
            return None;
        }

        let weakest = neighborhood
            .players
            .iter()
            .min_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap());
        let Some(target) = weakest else { return None };

        npc.set_target_player(target.id);
        npc.state = NpcState::Swarm(SwarmState::Combat);
        npc.orbit_radius = (npc.orbit_radius - SWARM_ORBIT_TIGHTEN_PER_MS * ctx.dt_ms).max(npc.weapon_range * SWARM_ORBIT_MIN_FRACTION);
        let point = target.position.add(Vec2::from_angle(npc.orbit_angle, npc.orbit_radius));
        npc.orbit_angle += 0.5 * (ctx.dt_ms / 1000.0);
        npc.position = npc.position.move_toward(point, npc.speed * (ctx.dt_ms / 1000.0));
        npc.rotation = target.position.sub(npc.position).angle();

        if try_fire(npc, target.distance, ctx.now_ms, SWARM_COMBAT_FIRE_COOLDOWN_MS) {
            npc.last_fire_time_ms = ctx.now_ms;
            Some(Action::Fire(FireAction {
                target: ActionTarget::Player(target.id),
                weapon_type: npc.weapon_type,
                weapon_tier: npc.weapon_tier,
                base_damage: npc.weapon_damage,
                shield_piercing: 0.0,
                enraged: false,
                synchronized: false,
            }))
        } else {
            None
        }
    }

    fn cleanup(&mut self, _id: NpcId) {}
}
