//! Fighter sub-strategy (§4.8): patrol/raid/circling/boost-dive/cooldown,
//! plus opportunistic stealing while raiding.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::{
    FIGHTER_BOOST_DIVE_COOLDOWN_MS, FIGHTER_BOOST_DIVE_DAMAGE_MULT, FIGHTER_BOOST_DIVE_FIRE_RANGE,
    FIGHTER_BOOST_DIVE_MAX_DURATION_MS, FIGHTER_BOOST_DIVE_SHIELD_PIERCING, FIGHTER_BOOST_DIVE_SPEED_MULT,
    FIGHTER_BOOST_DIVE_TIER_BONUS, FIGHTER_CIRCLE_ANGULAR_SPEED, FIGHTER_CIRCLE_ENTER_MARGIN,
    FIGHTER_CIRCLE_RADIUS, FIGHTER_COOLDOWN_BACKOFF_SPEED_MULT, FIGHTER_COOLDOWN_DURATION_MS,
};
use crate::world::ids::NpcId;
use crate::world::neighborhood::Neighborhood;
use crate::world::npc::{Npc, NpcState};

use super::super::action::{Action, ActionTarget, FireAction};
use super::super::strategy::{simple_patrol, TickContext};
use super::steal::try_steal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FighterState {
    Patrol,
    Raid,
    Circling,
    BoostDive,
    Cooldown,
}

#[derive(Debug, Clone, Copy, Default)]
struct FighterRecord {
    raid_target_pos: Option<crate::world::Vec2>,
    boost_dive_elapsed_ms: f64,
    cooldown_elapsed_ms: f64,
    last_boost_dive_ms: f64,
    last_steal_ms: f64,
}

#[derive(Default)]
pub struct FighterStrategy {
    records: HashMap<NpcId, FighterRecord>,
}

impl FighterStrategy {
    pub fn new() -> Self {
        FighterStrategy::default()
    }

    /// Priority order from §4.8: (1) players, (2) enemy NPC defenders
    /// within aggro, (3) the last-known raid position with no living
    /// target attached to it.
    fn pick_target(npc: &Npc, neighborhood: &Neighborhood, record: &FighterRecord) -> Option<(Option<ActionTarget>, crate::world::Vec2, f64)> {
        if let Some(player) = neighborhood.nearest_player() {
            return Some((Some(ActionTarget::Player(player.id)), player.position, player.distance));
        }
        if let Some(hostile) = neighborhood.hostiles.iter().min_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap()) {
            return Some((Some(ActionTarget::Npc(hostile.id)), hostile.position, hostile.distance));
        }
        record.raid_target_pos.map(|pos| (None, pos, npc.position.distance(pos)))
    }
}

impl FighterStrategy {
    pub fn update(&mut self, npc: &mut Npc, neighborhood: &Neighborhood, ctx: &TickContext) -> Option<Action> {
        let record = self.records.entry(npc.id).or_default();

        if !matches!(npc.state, NpcState::Fighter(FighterState::Patrol)) {
            if let Some(steal) = try_steal(npc, ctx, neighborhood, record.last_steal_ms) {
                record.last_steal_ms = ctx.now_ms;
                return Some(steal);
            }
        }

        match npc.state {
            NpcState::Fighter(FighterState::Patrol) => {
                if let Some((target, pos, _)) = Self::pick_target(npc, neighborhood, record) {
                    record.raid_target_pos = Some(pos);
                    npc.rotation = pos.sub(npc.position).angle();
                    match target {
                        Some(ActionTarget::Player(id)) => npc.set_target_player(id),
                        Some(ActionTarget::Npc(id)) => npc.set_target_npc(id),
                        // `pick_target` never hands back a base (§4.8 is
                        // player/NPC-only for fighters).
                        Some(ActionTarget::Base(_)) | None => npc.clear_target(),
                    }
                    npc.state = NpcState::Fighter(FighterState::Raid);
                    return None;
                }
                let point = simple_patrol(npc, npc.home_base_position, 600.0, 0.2, ctx.dt_ms);
                npc.position = npc.position.move_toward(point, npc.speed * (ctx.dt_ms / 1000.0));
                None
            }
            NpcState::Fighter(FighterState::Raid) => {
                let Some((_, pos, distance)) = Self::pick_target(npc, neighborhood, record) else {
                    npc.reset_transient_state();
                    npc.state = NpcState::Fighter(FighterState::Patrol);
                    return None;
                };
                record.raid_target_pos = Some(pos);
                npc.rotation = pos.sub(npc.position).angle();

                if distance <= FIGHTER_CIRCLE_RADIUS + FIGHTER_CIRCLE_ENTER_MARGIN {
                    npc.state = NpcState::Fighter(FighterState::Circling);
                    return None;
                }
                npc.position = npc.position.move_toward(pos, npc.speed * (ctx.dt_ms / 1000.0));
                None
            }
            NpcState::Fighter(FighterState::Circling) => {
                let Some(target_pos) = record.raid_target_pos else {
                    npc.state = NpcState::Fighter(FighterState::Patrol);
                    return None;
                };
                let orbit_point = simple_patrol(npc, target_pos, FIGHTER_CIRCLE_RADIUS, FIGHTER_CIRCLE_ANGULAR_SPEED, ctx.dt_ms);
                npc.position = npc.position.move_toward(orbit_point, npc.speed * (ctx.dt_ms / 1000.0));
                npc.rotation = target_pos.sub(npc.position).angle();

                if ctx.now_ms - record.last_boost_dive_ms > FIGHTER_BOOST_DIVE_COOLDOWN_MS {
                    record.last_boost_dive_ms = ctx.now_ms;
                    record.boost_dive_elapsed_ms = 0.0;
                    npc.state = NpcState::Fighter(FighterState::BoostDive);
                }
                None
            }
            NpcState::Fighter(FighterState::BoostDive) => {
                let Some(target_pos) = record.raid_target_pos else {
                    npc.state = NpcState::Fighter(FighterState::Patrol);
                    return None;
                };
                record.boost_dive_elapsed_ms += ctx.dt_ms;
                npc.position = npc.position.move_toward(target_pos, npc.speed * FIGHTER_BOOST_DIVE_SPEED_MULT * (ctx.dt_ms / 1000.0));
                npc.rotation = target_pos.sub(npc.position).angle();

                let distance = npc.position.distance(target_pos);
                if distance <= FIGHTER_BOOST_DIVE_FIRE_RANGE {
                    record.cooldown_elapsed_ms = 0.0;
                    npc.state = NpcState::Fighter(FighterState::Cooldown);
                    let target = npc.target_player.map(ActionTarget::Player).or(npc.target_npc.map(ActionTarget::Npc));
                    return target.map(|target| {
                        Action::Fire(FireAction {
                            target,
                            weapon_type: npc.weapon_type,
                            weapon_tier: npc.weapon_tier + FIGHTER_BOOST_DIVE_TIER_BONUS,
                            base_damage: npc.weapon_damage * FIGHTER_BOOST_DIVE_DAMAGE_MULT,
                            shield_piercing: FIGHTER_BOOST_DIVE_SHIELD_PIERCING,
                            enraged: false,
                            synchronized: false,
                        })
                    });
                }
                if record.boost_dive_elapsed_ms >= FIGHTER_BOOST_DIVE_MAX_DURATION_MS {
                    record.cooldown_elapsed_ms = 0.0;
                    npc.state = NpcState::Fighter(FighterState::Cooldown);
                }
                None
            }
            NpcState::Fighter(FighterState::Cooldown) => {
                let Some(target_pos) = record.raid_target_pos else {
                    npc.state = NpcState::Fighter(FighterState::Patrol);
                    return None;
                };
                record.cooldown_elapsed_ms += ctx.dt_ms;
                let away = npc.position.sub(target_pos).normalized();
                npc.position = npc.position.add(away.scale(npc.speed * FIGHTER_COOLDOWN_BACKOFF_SPEED_MULT * (ctx.dt_ms / 1000.0)));
                if record.cooldown_elapsed_ms >= FIGHTER_COOLDOWN_DURATION_MS {
                    npc.state = NpcState::Fighter(FighterState::Raid);
                }
                None
            }
            _ => None,
        }
    }

    pub fn cleanup(&mut self, id: NpcId) {
        self.records.remove(&id);
    }
}
