//! Mining strategy (§4.7): the rogue-miner role state machine
//! (idle → seeking → mining → returning → depositing → idle, plus the
//! rage preempt) and the faction-wide rage zone.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{
    MINING_CLAIM_MARKER, MINING_CREDIT_REWARD, MINING_CREDIT_REWARD_FOREMAN,
    MINING_DEPOSIT_DURATION_MS, MINING_DEPOSIT_RANGE, MINING_DURATION_MS, MINING_FOREMAN_SPEED_MULT,
    MINING_NEAREST_CANDIDATES, MINING_RETURN_SPEED_FRACTION, MINING_SEARCH_RADIUS,
    RAGE_ENGAGE_FRACTION, RAGE_FIRE_COOLDOWN_MS, RAGE_FIRE_COOLDOWN_MS_NO_FOREMAN, RAGE_SPEED_MULT,
    RAGE_ZONE_RADIUS, RETREAT_THRESHOLD_ROGUE_MINER,
};
use crate::world::ids::{NpcId, PlayerId};
use crate::world::neighborhood::Neighborhood;
use crate::world::npc::{Npc, NpcState};
use crate::world::Vec2;

use super::action::{Action, ActionTarget, FireAction};
use super::strategy::{should_retreat, try_fire, Strategy, TickContext};
use super::territorial::{territorial_tick, WarningEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MiningState {
    Idle,
    Seeking,
    Mining,
    Returning,
    Depositing,
    Enraged,
}

#[derive(Debug, Clone, Copy)]
struct MiningProgress {
    elapsed_ms: f64,
}

#[derive(Debug, Clone, Copy)]
struct RageInfo {
    attacker: PlayerId,
}

#[derive(Default)]
pub struct MiningStrategy {
    /// `claimedTargets{ asteroidId → npcId }` (§3.4): the reverse index
    /// lets `find_target` skip already-worked sites without walking
    /// every miner.
    claimed_by_id: HashMap<String, NpcId>,
    mining_progress: HashMap<NpcId, MiningProgress>,
    depositing: HashMap<NpcId, f64>,
    rage: HashMap<NpcId, RageInfo>,
    warnings: HashMap<NpcId, HashMap<PlayerId, WarningEntry>>,
}

impl MiningStrategy {
    pub fn new() -> Self {
        MiningStrategy::default()
    }

    fn release_claim(&mut self, id: NpcId) {
        self.claimed_by_id.retain(|_, owner| *owner != id);
    }

    /// Faction-wide emergent behavior (§4.7): marks every rogue miner
    /// within `RAGE_ZONE_RADIUS` of the victim as enraged at `attacker`.
    pub fn trigger_rage(&mut self, victim_pos: Vec2, attacker: PlayerId, all_npcs: &mut std::collections::BTreeMap<NpcId, Npc>) {
        for npc in all_npcs.values_mut() {
            if npc.faction != crate::world::npc::Faction::RogueMiner || !npc.is_alive() {
                continue;
            }
            if npc.position.distance(victim_pos) <= RAGE_ZONE_RADIUS {
                self.release_claim(npc.id);
                self.mining_progress.remove(&npc.id);
                self.depositing.remove(&npc.id);
                npc.reset_transient_state();
                npc.set_target_player(attacker);
                npc.state = NpcState::Mining(MiningState::Enraged);
                self.rage.insert(npc.id, RageInfo { attacker });
            }
        }
    }

    /// `findMiningTarget` (§4.7): scans `_clm`-marked asteroids and
    /// planets within `MINING_SEARCH_RADIUS` of home, skips any already
    /// in `claimedTargets`, sorts by distance, and picks uniformly
    /// among the nearest `MINING_NEAREST_CANDIDATES`.
    fn find_target(&self, world: &dyn super::hooks::WorldHooks, home: Vec2) -> Option<(String, Vec2)> {
        let mut candidates: Vec<(String, Vec2)> = world
            .mining_claim_candidates(home, MINING_SEARCH_RADIUS)
            .into_iter()
            .filter(|(id, _)| id.contains(MINING_CLAIM_MARKER) && !self.claimed_by_id.contains_key(id))
            .collect();
        candidates.sort_by(|a, b| a.1.distance(home).partial_cmp(&b.1.distance(home)).unwrap());
        candidates.truncate(MINING_NEAREST_CANDIDATES);
        if candidates.is_empty() {
            return None;
        }
        let idx = rand::thread_rng().gen_range(0..candidates.len());
        Some(candidates.swap_remove(idx))
    }
}

impl Strategy for MiningStrategy {
    fn update(&mut self, npc: &mut Npc, neighborhood: &Neighborhood, ctx: &TickContext) -> Option<Action> {
        if let Some(rage) = self.rage.get(&npc.id).copied() {
            let attacker_nearby = neighborhood.players.iter().find(|p| p.id == rage.attacker);
            match attacker_nearby {
                Some(target) if target.distance <= RAGE_ZONE_RADIUS => {
                    npc.set_target_player(rage.attacker);
                    let push_point = target.position.add(
                        npc.position.sub(target.position).normalized().scale(npc.weapon_range * RAGE_ENGAGE_FRACTION),
                    );
                    npc.position = npc.position.move_toward(push_point, npc.speed * RAGE_SPEED_MULT * (ctx.dt_ms / 1000.0));
                    npc.rotation = target.position.sub(npc.position).angle();
                    let cooldown = if ctx.has_foreman { RAGE_FIRE_COOLDOWN_MS } else { RAGE_FIRE_COOLDOWN_MS_NO_FOREMAN };
                    if try_fire(npc, target.distance, ctx.now_ms, cooldown) {
                        npc.last_fire_time_ms = ctx.now_ms;
                        return Some(Action::Fire(FireAction {
                            target: ActionTarget::Player(rage.attacker),
                            weapon_type: npc.weapon_type,
                            weapon_tier: npc.weapon_tier,
                            base_damage: npc.weapon_damage,
                            shield_piercing: 0.0,
                            enraged: true,
                            synchronized: false,
                        }));
                    }
                    return None;
                }
                _ => {
                    self.rage.remove(&npc.id);
                    npc.state = NpcState::Mining(MiningState::Idle);
                    npc.reset_transient_state();
                    return Some(Action::RogueMinerRageClear);
                }
            }
        }

        if should_retreat(npc, RETREAT_THRESHOLD_ROGUE_MINER) {
            npc.position = npc.position.move_toward(npc.home_base_position, npc.speed * (ctx.dt_ms / 1000.0));
            return None;
        }

        match npc.state {
            NpcState::Mining(MiningState::Seeking) => {
                resync_target_pos(npc, ctx.world);
                let Some(target_pos) = npc.mining_target_pos else {
                    self.release_claim(npc.id);
                    npc.state = NpcState::Mining(MiningState::Idle);
                    return None;
                };
                npc.position = npc.position.move_toward(target_pos, npc.speed * (ctx.dt_ms / 1000.0));
                if npc.position.distance(target_pos) < 20.0 {
                    npc.state = NpcState::Mining(MiningState::Mining);
                    self.mining_progress.insert(npc.id, MiningProgress { elapsed_ms: 0.0 });
                    let asteroid_id = npc.mining_target_id.clone().unwrap_or_default();
                    return Some(Action::RogueMinerStartMining { asteroid_id });
                }
                None
            }
            NpcState::Mining(MiningState::Mining) => {
                resync_target_pos(npc, ctx.world);
                let asteroid_id = npc.mining_target_id.clone().unwrap_or_default();
                if let Some(progress) = self.mining_progress.get_mut(&npc.id) {
                    progress.elapsed_ms += ctx.dt_ms;
                    if progress.elapsed_ms >= MINING_DURATION_MS {
                        npc.has_haul = true;
                        npc.state = NpcState::Mining(MiningState::Returning);
                        self.mining_progress.remove(&npc.id);
                        self.release_claim(npc.id);
                        npc.mining_target_id = None;
                        return Some(Action::RogueMinerMiningComplete { asteroid_id });
                    }
                    return Some(Action::RogueMinerMiningProgress { asteroid_id });
                }
                None
            }
            NpcState::Mining(MiningState::Returning) => {
                let mult = if ctx.has_foreman { MINING_FOREMAN_SPEED_MULT } else { 1.0 };
                npc.position = npc
                    .position
                    .move_toward(npc.home_base_position, npc.speed * MINING_RETURN_SPEED_FRACTION * mult * (ctx.dt_ms / 1000.0));
                if npc.position.distance(npc.home_base_position) < MINING_DEPOSIT_RANGE {
                    npc.state = NpcState::Mining(MiningState::Depositing);
                    self.depositing.insert(npc.id, 0.0);
                    return Some(Action::RogueMinerStartDeposit);
                }
                None
            }
            NpcState::Mining(MiningState::Depositing) => {
                if let Some(elapsed) = self.depositing.get_mut(&npc.id) {
                    *elapsed += ctx.dt_ms;
                    if *elapsed >= MINING_DEPOSIT_DURATION_MS {
                        self.depositing.remove(&npc.id);
                        npc.has_haul = false;
                        npc.state = NpcState::Mining(MiningState::Idle);
                        let reward = if ctx.has_foreman { MINING_CREDIT_REWARD_FOREMAN } else { MINING_CREDIT_REWARD };
                        return Some(Action::RogueMinerDeposited { credit_reward: reward, foreman: ctx.has_foreman });
                    }
                }
                None
            }
            _ => {
                // Idle: defend territory against intruders, or pick a new mining target.
                let warnings = self.warnings.entry(npc.id).or_default();
                let defense = territorial_tick(npc, neighborhood, ctx, warnings, 1.0, 1.0);
                if defense.is_some() {
                    return defense;
                }

                if let Some((asteroid_id, pos)) = self.find_target(ctx.world, npc.home_base_position) {
                    self.claimed_by_id.insert(asteroid_id.clone(), npc.id);
                    npc.mining_target_id = Some(asteroid_id);
                    npc.mining_target_pos = Some(pos);
                    npc.state = NpcState::Mining(MiningState::Seeking);
                }
                None
            }
        }
    }

    fn cleanup(&mut self, id: NpcId) {
        self.release_claim(id);
        self.mining_progress.remove(&id);
        self.depositing.remove(&id);
        self.rage.remove(&id);
        self.warnings.remove(&id);
    }
}

/// Orbital mining targets (planets) move, so their position is
/// re-looked-up through `world_object_at` every tick; a miss just means
/// a static asteroid, whose cached position is left untouched (§4.7).
fn resync_target_pos(npc: &mut Npc, world: &dyn super::hooks::WorldHooks) {
    if let Some(id) = npc.mining_target_id.as_deref() {
        if let Some(pos) = world.world_object_at(id) {
            npc.mining_target_pos = Some(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::hooks::StaticWorldHooks;
    use crate::world::neighborhood::NeighborhoodScratch;
    use crate::world::npc::NpcType;
    use crate::world::player::PlayerRef;
    use std::collections::BTreeMap;

    fn ctx<'a>(world: &'a StaticWorldHooks, all_npcs: &'a BTreeMap<NpcId, Npc>) -> TickContext<'a> {
        TickContext {
            now_ms: 0.0,
            dt_ms: 50.0,
            home_base: None,
            territory_radius: 500.0,
            patrol_radius: 500.0,
            has_foreman: false,
            nearby_bases: &[],
            all_npcs,
            world,
        }
    }

    #[test]
    fn idle_miner_claims_a_nearby_marked_asteroid_and_tracks_it_by_id() {
        let mut npc = Npc::spawn(NpcType::RogueMinerWorker, Vec2::ZERO, None, Vec2::ZERO);
        let world = StaticWorldHooks::new(vec![]).with_mining_claims(vec![
            ("belt_7_clm".to_string(), Vec2::new(300.0, 0.0)),
            ("unclaimed_rock".to_string(), Vec2::new(50.0, 0.0)),
        ]);
        let all_npcs = BTreeMap::new();
        let players: [PlayerRef; 0] = [];
        let mut scratch = NeighborhoodScratch::new();
        let nb = scratch.build_for(&npc, &all_npcs, &players);
        let tick_ctx = ctx(&world, &all_npcs);

        let mut strat = MiningStrategy::new();
        strat.update(&mut npc, &nb, &tick_ctx);

        assert_eq!(npc.mining_target_id.as_deref(), Some("belt_7_clm"));
        assert!(matches!(npc.state, NpcState::Mining(MiningState::Seeking)));
        assert_eq!(strat.claimed_by_id.get("belt_7_clm"), Some(&npc.id));
    }

    #[test]
    fn completing_a_mine_releases_the_claim_for_other_miners() {
        let mut npc = Npc::spawn(NpcType::RogueMinerWorker, Vec2::new(300.0, 0.0), None, Vec2::ZERO);
        npc.mining_target_id = Some("belt_7_clm".to_string());
        npc.mining_target_pos = Some(Vec2::new(300.0, 0.0));
        npc.state = NpcState::Mining(MiningState::Mining);

        let world = StaticWorldHooks::new(vec![]);
        let all_npcs = BTreeMap::new();
        let players: [PlayerRef; 0] = [];
        let mut scratch = NeighborhoodScratch::new();
        let nb = scratch.build_for(&npc, &all_npcs, &players);
        let tick_ctx = ctx(&world, &all_npcs);

        let mut strat = MiningStrategy::new();
        strat.claimed_by_id.insert("belt_7_clm".to_string(), npc.id);
        strat.mining_progress.insert(npc.id, MiningProgress { elapsed_ms: MINING_DURATION_MS });

        let action = strat.update(&mut npc, &nb, &tick_ctx);

        assert!(matches!(action, Some(Action::RogueMinerMiningComplete { ref asteroid_id }) if asteroid_id == "belt_7_clm"));
        assert!(npc.has_haul);
        assert!(npc.mining_target_id.is_none());
        assert!(!strat.claimed_by_id.contains_key("belt_7_clm"));
    }

    #[test]
    fn rage_spreads_within_radius_and_clears_outside() {
        let mut all_npcs = BTreeMap::new();
        let mut near = Npc::spawn(NpcType::RogueMinerWorker, Vec2::new(1000.0, 0.0), None, Vec2::new(1000.0, 0.0));
        near.id = NpcId(1);
        let mut far = Npc::spawn(NpcType::RogueMinerWorker, Vec2::new(4000.0, 0.0), None, Vec2::new(4000.0, 0.0));
        far.id = NpcId(2);
        all_npcs.insert(near.id, near);
        all_npcs.insert(far.id, far);

        let mut strat = MiningStrategy::new();
        strat.trigger_rage(Vec2::ZERO, PlayerId(1), &mut all_npcs);

        assert!(matches!(all_npcs[&NpcId(1)].state, NpcState::Mining(MiningState::Enraged)));
        assert!(!matches!(all_npcs[&NpcId(2)].state, NpcState::Mining(MiningState::Enraged)));
    }
}
