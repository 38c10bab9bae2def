//! Void Leviathan boss (§4.10): spawns minions as its hull drops (plus a
//! slow trickle while healthy), pulls players into a telegraphed gravity
//! well, and occasionally consumes one of its own escorts to heal.
//! Falls back to ordinary pursuit combat when none of those are active.
//! `npc.state` stays `LeviathanCombat` throughout — per-phase bookkeeping
//! lives in side tables here, same pattern as `queen.rs`.

use std::collections::{HashMap, HashSet};

use crate::config::{
    CONSUME_COOLDOWN_MS, CONSUME_DRAG_DURATION_MS, CONSUME_HEAL_MULTIPLIER, CONSUME_HULL_WEIGHT,
    CONSUME_PROXIMITY_WEIGHT, CONSUME_RANGE, CONSUME_TENDRIL_SPEED, GRAVITY_WELL_ACTIVE_DURATION_MS,
    GRAVITY_WELL_COOLDOWN_MS, GRAVITY_WELL_DAMAGE_CENTER, GRAVITY_WELL_DAMAGE_EDGE, GRAVITY_WELL_PULL_STRENGTH,
    GRAVITY_WELL_RADIUS, GRAVITY_WELL_WARNING_DURATION_MS, LEVIATHAN_COMBAT_APPROACH_FRACTION,
    LEVIATHAN_COMBAT_FIRE_COOLDOWN_MS, LEVIATHAN_CONTINUOUS_SPAWN_INTERVAL_MS, LEVIATHAN_HEALTH_THRESHOLDS,
    LEVIATHAN_MAX_ACTIVE_MINIONS,
};
use crate::world::ids::NpcId;
use crate::world::neighborhood::Neighborhood;
use crate::world::npc::Npc;
use crate::world::Vec2;

use super::action::{Action, ActionTarget, ConsumePhase, FireAction, GravityWellPhase, GravityWellPull, MinionSpawnTrigger};
use super::strategy::{try_fire, Strategy, TickContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GravityWellStage {
    Warning,
    Active,
}

#[derive(Debug, Clone, Copy)]
struct PendingGravityWell {
    stage: GravityWellStage,
    center: Vec2,
    stage_end_ms: f64,
}

#[derive(Debug, Clone, Copy)]
struct PendingConsume {
    phase: ConsumePhase,
    target: NpcId,
    phase_end_ms: f64,
}

#[derive(Default)]
struct LeviathanState {
    crossed_thresholds: HashSet<usize>,
    minions: Vec<NpcId>,
    last_continuous_spawn_ms: f64,
    last_gravity_well_ms: f64,
    last_consume_ms: f64,
    gravity_well: Option<PendingGravityWell>,
    consume: Option<PendingConsume>,
}

#[derive(Default)]
pub struct LeviathanStrategy {
    state: HashMap<NpcId, LeviathanState>,
}

impl LeviathanStrategy {
    pub fn new() -> Self {
        LeviathanStrategy::default()
    }

    /// Called by the engine once it has actually spawned a minion
    /// requested via `Action::VoidSpawnMinions`, since the strategy
    /// itself never creates NPCs (§4.12).
    pub fn register_minion(&mut self, leviathan_id: NpcId, minion_id: NpcId) {
        self.state.entry(leviathan_id).or_default().minions.push(minion_id);
    }

    fn active_minion_count(state: &LeviathanState, all_npcs: &std::collections::BTreeMap<NpcId, Npc>) -> usize {
        state.minions.iter().filter(|id| all_npcs.get(id).is_some_and(Npc::is_alive)).count()
    }
}

impl Strategy for LeviathanStrategy {
    fn update(&mut self, npc: &mut Npc, neighborhood: &Neighborhood, ctx: &TickContext) -> Option<Action> {
        let state = self.state.entry(npc.id).or_default();
        let hull_fraction = npc.hull_fraction();

        for (idx, (threshold, rift_count)) in LEVIATHAN_HEALTH_THRESHOLDS.iter().enumerate() {
            if hull_fraction <= *threshold && !state.crossed_thresholds.contains(&idx) {
                state.crossed_thresholds.insert(idx);
                return Some(Action::VoidSpawnMinions {
                    rift_count: *rift_count,
                    trigger: MinionSpawnTrigger::HealthThreshold,
                    health_threshold: Some(*threshold),
                });
            }
        }

        if Self::active_minion_count(state, ctx.all_npcs) < LEVIATHAN_MAX_ACTIVE_MINIONS
            && ctx.now_ms - state.last_continuous_spawn_ms >= LEVIATHAN_CONTINUOUS_SPAWN_INTERVAL_MS
        {
            state.last_continuous_spawn_ms = ctx.now_ms;
            return Some(Action::VoidSpawnMinions { rift_count: 1, trigger: MinionSpawnTrigger::Continuous, health_threshold: None });
        }

        if let Some(well) = state.gravity_well {
            match well.stage {
                GravityWellStage::Warning if ctx.now_ms >= well.stage_end_ms => {
                    state.gravity_well = Some(PendingGravityWell {
                        stage: GravityWellStage::Active,
                        stage_end_ms: ctx.now_ms + GRAVITY_WELL_ACTIVE_DURATION_MS,
                        ..well
                    });
                    return Some(Action::VoidGravityWell { phase: GravityWellPhase::Active, center: well.center });
                }
                GravityWellStage::Active if ctx.now_ms >= well.stage_end_ms => {
                    state.gravity_well = None;
                    return Some(Action::VoidGravityWell { phase: GravityWellPhase::End, center: well.center });
                }
                GravityWellStage::Active => {
                    let affected: Vec<_> = neighborhood
                        .players
                        .iter()
                        .filter(|p| p.distance <= GRAVITY_WELL_RADIUS)
                        .map(|p| {
                            let closeness = 1.0 - (p.distance / GRAVITY_WELL_RADIUS).clamp(0.0, 1.0);
                            let damage = GRAVITY_WELL_DAMAGE_EDGE + (GRAVITY_WELL_DAMAGE_CENTER - GRAVITY_WELL_DAMAGE_EDGE) * closeness;
                            GravityWellPull { player: p.id, distance: p.distance, damage }
                        })
                        .collect();
                    return Some(Action::VoidGravityWellTick { center: well.center, pull_strength: GRAVITY_WELL_PULL_STRENGTH, affected });
                }
                GravityWellStage::Warning => return None,
            }
        }

        if let Some(consume) = state.consume {
            match consume.phase {
                ConsumePhase::Tendril if ctx.now_ms >= consume.phase_end_ms => {
                    state.consume = Some(PendingConsume {
                        phase: ConsumePhase::Drag,
                        phase_end_ms: ctx.now_ms + CONSUME_DRAG_DURATION_MS,
                        ..consume
                    });
                    return Some(Action::VoidConsume { phase: ConsumePhase::Drag, target: consume.target, heal_amount: None, remove_target: false });
                }
                ConsumePhase::Drag if ctx.now_ms >= consume.phase_end_ms => {
                    state.consume = None;
                    let heal = ctx
                        .all_npcs
                        .get(&consume.target)
                        .map(|ally| ally.hull_max * CONSUME_HEAL_MULTIPLIER)
                        .unwrap_or(0.0);
                    return Some(Action::VoidConsume { phase: ConsumePhase::Dissolve, target: consume.target, heal_amount: Some(heal), remove_target: true });
                }
                _ => return None,
            }
        }

        if ctx.now_ms - state.last_gravity_well_ms >= GRAVITY_WELL_COOLDOWN_MS && !neighborhood.players.is_empty() {
            let sum = neighborhood.players.iter().fold(Vec2::ZERO, |acc, p| acc.add(p.position));
            let centroid = sum.scale(1.0 / neighborhood.players.len() as f64);
            state.last_gravity_well_ms = ctx.now_ms;
            state.gravity_well = Some(PendingGravityWell {
                stage: GravityWellStage::Warning,
                center: centroid,
                stage_end_ms: ctx.now_ms + GRAVITY_WELL_WARNING_DURATION_MS,
            });
            return Some(Action::VoidGravityWell { phase: GravityWellPhase::Warning, center: centroid });
        }

        if ctx.now_ms - state.last_consume_ms >= CONSUME_COOLDOWN_MS {
            let best = neighborhood
                .allies
                .iter()
                .filter(|a| a.distance <= CONSUME_RANGE)
                .max_by(|a, b| {
                    let score_a = a.hull_fraction * CONSUME_HULL_WEIGHT + (1.0 - a.distance / CONSUME_RANGE) * CONSUME_PROXIMITY_WEIGHT;
                    let score_b = b.hull_fraction * CONSUME_HULL_WEIGHT + (1.0 - b.distance / CONSUME_RANGE) * CONSUME_PROXIMITY_WEIGHT;
                    score_a.partial_cmp(&score_b).unwrap()
                });
            if let Some(ally) = best {
                let travel_ms = (ally.distance / CONSUME_TENDRIL_SPEED) * 1000.0;
                state.last_consume_ms = ctx.now_ms;
                state.consume = Some(PendingConsume { phase: ConsumePhase::Tendril, target: ally.id, phase_end_ms: ctx.now_ms + travel_ms });
                return Some(Action::VoidConsume { phase: ConsumePhase::Tendril, target: ally.id, heal_amount: None, remove_target: false });
            }
        }

        match neighborhood.nearest_player() {
            Some(target) => {
                npc.set_target_player(target.id);
                let standoff_distance = npc.weapon_range * LEVIATHAN_COMBAT_APPROACH_FRACTION;
                let approach = target.position.add(npc.position.sub(target.position).normalized().scale(standoff_distance));
                npc.position = npc.position.move_toward(approach, npc.speed * (ctx.dt_ms / 1000.0));
                npc.rotation = target.position.sub(npc.position).angle();

                if try_fire(npc, target.distance, ctx.now_ms, LEVIATHAN_COMBAT_FIRE_COOLDOWN_MS) {
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
            None => {
                npc.clear_target();
                None
            }
        }
    }

    fn cleanup(&mut self, id: NpcId) {
        self.state.remove(&id);
    }
}
