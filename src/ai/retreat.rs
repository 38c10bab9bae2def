//! Retreat strategy (§4.3): the scavenger baseline — hit-and-run combat
//! against hostile NPCs, flee-then-heal at the home base.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{
    RETREAT_AWAY_BLEND, RETREAT_FIRE_COOLDOWN_MS, RETREAT_HEAL_UNTIL_FRACTION, RETREAT_HOME_BLEND,
    RETREAT_HULL_REGEN_PER_SEC, RETREAT_ORBIT_FRACTION, RETREAT_PATROL_RADIUS, RETREAT_SHIELD_REGEN_PER_SEC,
    RETREAT_SPEED_MULT, RETREAT_THRESHOLD_SCAVENGER,
};
use crate::world::damage::apply_heal;
use crate::world::ids::NpcId;
use crate::world::neighborhood::{NearbyNpc, Neighborhood};
use crate::world::npc::{Npc, NpcState};
use crate::world::Vec2;

use super::action::{Action, ActionTarget, FireAction};
use super::strategy::{should_retreat, try_fire, Strategy, TickContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetreatState {
    Patrol,
    Combat,
    Retreat,
    Healing,
}

#[derive(Default)]
pub struct RetreatStrategy;

impl RetreatStrategy {
    pub fn new() -> Self {
        RetreatStrategy
    }

    fn score_target(candidate: &NearbyNpc, hostiles: &[NearbyNpc]) -> f64 {
        let damaged_score = (1.0 - candidate.hull_fraction) * 50.0;
        let nearby_allies_of_target = hostiles
            .iter()
            .filter(|h| h.id != candidate.id && h.position.distance(candidate.position) <= 300.0)
            .count();
        let isolation_score = (5.0 - nearby_allies_of_target as f64).max(0.0) * 10.0;
        damaged_score + isolation_score - candidate.distance / 50.0
    }
}

impl Strategy for RetreatStrategy {
    fn update(&mut self, npc: &mut Npc, neighborhood: &Neighborhood, ctx: &TickContext) -> Option<Action> {
        if let NpcState::Retreat(RetreatState::Healing) = npc.state {
            apply_heal(
                npc,
                npc.hull_max * RETREAT_HULL_REGEN_PER_SEC * (ctx.dt_ms / 1000.0),
                npc.shield_max * RETREAT_SHIELD_REGEN_PER_SEC * (ctx.dt_ms / 1000.0),
            );
            if npc.hull_fraction() >= RETREAT_HEAL_UNTIL_FRACTION {
                npc.state = NpcState::Retreat(RetreatState::Patrol);
            }
            return None;
        }

        if matches!(npc.state, NpcState::Retreat(RetreatState::Retreat)) || should_retreat(npc, RETREAT_THRESHOLD_SCAVENGER) {
            let threat_centroid = if neighborhood.hostiles.is_empty() {
                npc.home_base_position
            } else {
                let sum = neighborhood
                    .hostiles
                    .iter()
                    .fold(Vec2::ZERO, |acc, h| acc.add(h.position));
                sum.scale(1.0 / neighborhood.hostiles.len() as f64)
            };
            let away = npc.position.sub(threat_centroid).normalized();
            let blended = npc
                .home_base_position
                .scale(RETREAT_HOME_BLEND)
                .add(npc.position.add(away.scale(200.0)).scale(RETREAT_AWAY_BLEND));
            npc.position = npc
                .position
                .move_toward(blended, npc.speed * RETREAT_SPEED_MULT * (ctx.dt_ms / 1000.0));
            npc.state = NpcState::Retreat(RetreatState::Retreat);

            if npc.position.distance(npc.home_base_position) < 60.0 {
                npc.reset_transient_state();
                npc.state = NpcState::Retreat(RetreatState::Healing);
            }
            return None;
        }

        let best = neighborhood
            .hostiles
            .iter()
            .map(|h| (h, Self::score_target(h, neighborhood.hostiles)))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

        match best {
            None => {
                if npc.patrol_target.is_none()
                    || npc.position.distance(npc.patrol_target.unwrap()) < 20.0
                {
                    let mut rng = rand::thread_rng();
                    let angle = rng.gen_range(0.0..std::f64::consts::TAU);
                    let radius = rng.gen_range(0.0..RETREAT_PATROL_RADIUS);
                    npc.patrol_target = Some(npc.home_base_position.add(Vec2::from_angle(angle, radius)));
                }
                let target = npc.patrol_target.unwrap();
                npc.position = npc.position.move_toward(target, npc.speed * (ctx.dt_ms / 1000.0));
                npc.state = NpcState::Retreat(RetreatState::Patrol);
                None
            }
            Some((target, _)) => {
                npc.set_target_npc(target.id);
                npc.state = NpcState::Retreat(RetreatState::Combat);

                let orbit_point = target
                    .position
                    .add(npc.position.sub(target.position).normalized().scale(
                        npc.weapon_range * RETREAT_ORBIT_FRACTION,
                    ));
                npc.position = npc.position.move_toward(orbit_point, npc.speed * (ctx.dt_ms / 1000.0));
                npc.rotation = target.position.sub(npc.position).angle();

                if try_fire(npc, target.distance, ctx.now_ms, RETREAT_FIRE_COOLDOWN_MS) {
                    npc.last_fire_time_ms = ctx.now_ms;
                    Some(Action::Fire(FireAction {
                        target: ActionTarget::Npc(target.id),
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
        }
    }

    fn cleanup(&mut self, _id: NpcId) {}
}
