//! Flanking strategy (§4.2): the pirate baseline, also used as the
//! universal fallback for any NPC type that doesn't match a more
//! specific dispatch rule.

use serde::{Deserialize, Serialize};

use crate::config::{
    BASELINE_FIRE_COOLDOWN_MS, FLANKING_APPROACH_FRACTION, FLANKING_FOCUS_FIRE_BONUS,
    FLANKING_PATROL_SWITCH_DISTANCE, FLANKING_RETREAT_ARC_DEGREES, FLANKING_RETREAT_SPEED_MULT,
    RETREAT_THRESHOLD_PIRATE,
};
use crate::world::ids::{NpcId, PlayerId};
use crate::world::neighborhood::Neighborhood;
use crate::world::npc::{Npc, NpcState};
use crate::world::Vec2;

use super::action::{Action, ActionTarget, FireAction};
use super::strategy::{should_retreat, simple_patrol, try_fire, Strategy, TickContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlankingState {
    Patrol,
    Combat,
    Retreat,
}

#[derive(Default)]
pub struct FlankingStrategy;

impl FlankingStrategy {
    pub fn new() -> Self {
        FlankingStrategy
    }

    fn score_target(npc: &Npc, player_id: PlayerId, distance: f64, ctx: &TickContext) -> f64 {
        let focus_fire_allies = ctx
            .all_npcs
            .values()
            .filter(|other| {
                other.id != npc.id
                    && other.faction == npc.faction
                    && other.target_player == Some(player_id)
            })
            .count();
        let proximity_bonus = 1.0 - (distance / npc.aggro_range).clamp(0.0, 1.0);
        focus_fire_allies as f64 * FLANKING_FOCUS_FIRE_BONUS + proximity_bonus
    }

    /// Our index among allies (plus self) currently attacking the same
    /// target, sorted by id, and the total count in that group.
    fn flank_index(npc: &Npc, target: PlayerId, ctx: &TickContext) -> (usize, usize) {
        let mut ids: Vec<NpcId> = ctx
            .all_npcs
            .values()
            .filter(|other| other.faction == npc.faction && other.target_player == Some(target))
            .map(|other| other.id)
            .collect();
        if !ids.contains(&npc.id) {
            ids.push(npc.id);
        }
        ids.sort();
        let total = ids.len();
        let index = ids.iter().position(|id| *id == npc.id).unwrap_or(0);
        (index, total)
    }
}

impl Strategy for FlankingStrategy {
    fn update(&mut self, npc: &mut Npc, neighborhood: &Neighborhood, ctx: &TickContext) -> Option<Action> {
        if should_retreat(npc, RETREAT_THRESHOLD_PIRATE) {
            npc.state = NpcState::Flanking(FlankingState::Retreat);
        }

        match npc.state {
            NpcState::Flanking(FlankingState::Retreat) => {
                npc.position = npc.position.move_toward(
                    npc.home_base_position,
                    npc.speed * FLANKING_RETREAT_SPEED_MULT * (ctx.dt_ms / 1000.0),
                );
                if npc.position.distance(npc.home_base_position) < FLANKING_PATROL_SWITCH_DISTANCE {
                    npc.reset_transient_state();
                    npc.state = NpcState::Flanking(FlankingState::Patrol);
                }
                None
            }
            _ => {
                let best = neighborhood
                    .players
                    .iter()
                    .map(|p| (p, Self::score_target(npc, p.id, p.distance, ctx)))
                    .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

                match best {
                    None => {
                        let point = simple_patrol(npc, npc.home_base_position, ctx.patrol_radius, 0.2, ctx.dt_ms);
                        npc.position = npc.position.move_toward(point, npc.speed * (ctx.dt_ms / 1000.0));
                        npc.state = NpcState::Flanking(FlankingState::Patrol);
                        None
                    }
                    Some((target, _score)) => {
                        npc.set_target_player(target.id);
                        npc.state = NpcState::Flanking(FlankingState::Combat);

                        let (index, total) = Self::flank_index(npc, target.id, ctx);
                        let base_to_target = target.position.sub(npc.home_base_position);
                        let base_angle = base_to_target.angle() + std::f64::consts::PI;
                        let arc = FLANKING_RETREAT_ARC_DEGREES.to_radians();
                        let fraction = if total > 1 { index as f64 / (total - 1) as f64 } else { 0.5 };
                        let angle = base_angle - arc / 2.0 + arc * fraction;
                        let approach_point = target
                            .position
                            .add(Vec2::from_angle(angle, npc.weapon_range * FLANKING_APPROACH_FRACTION));

                        npc.position = npc.position.move_toward(approach_point, npc.speed * (ctx.dt_ms / 1000.0));
                        npc.rotation = target.position.sub(npc.position).angle();

                        if try_fire(npc, target.distance, ctx.now_ms, BASELINE_FIRE_COOLDOWN_MS) {
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
                }
            }
        }
    }

    fn cleanup(&mut self, _id: NpcId) {}
}
