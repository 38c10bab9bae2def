//! Formation strategy (§4.5): the void baseline, fixed V-mesh combat
//! with synchronized volley fire and leader succession. The hardest
//! part of this module is succession: it runs as a cross-cutting pass
//! (`age_and_elect`, invoked once per tick from `Engine::tick` after the
//! action applier) rather than inside `Strategy::update`, because
//! electing a new leader means flipping `formation_leader` on an NPC
//! other than the one `update` was called for — something a single
//! per-NPC strategy call cannot do.

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::ai::action::EngineEvent;
use crate::config::{
    FORMATION_CONFUSION_DURATION_MS, FORMATION_FIRE_COOLDOWN_MS, FORMATION_FOLLOWER_MAX_SPEED_MULT,
    FORMATION_LEADER_APPROACH_FRACTION, FORMATION_LEADER_BACKOFF_FRACTION, FORMATION_REFORMING_DURATION_MS,
    FORMATION_RETREAT_SPEED_MULT, FORMATION_ROW_SPACING, FORMATION_VOLLEY_STAGGER_MS, RETREAT_THRESHOLD_VOID,
};
use crate::world::ids::NpcId;
use crate::world::neighborhood::Neighborhood;
use crate::world::npc::{Npc, NpcState};
use crate::world::Vec2;

use super::action::{Action, ActionTarget, FireAction};
use super::strategy::{select_nearest, should_retreat, try_fire, Strategy, TickContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormationState {
    Patrol,
    Combat,
    Retreat,
    Confusion,
    Reforming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowPhase {
    Confusion,
    Reforming,
}

#[derive(Debug, Clone, Copy)]
struct FormationWindow {
    phase: WindowPhase,
    started_at_ms: f64,
    new_leader_id: NpcId,
}

#[derive(Default)]
pub struct FormationStrategy {
    windows: HashMap<u32, FormationWindow>,
}

impl FormationStrategy {
    pub fn new() -> Self {
        FormationStrategy::default()
    }

    /// Cross-cutting pass (§2 step 4): detect formations whose leader is
    /// gone, elect a successor (highest surviving `hull_max`, ties by
    /// lowest `NpcId` — the Open Question resolution from §9), and age
    /// existing confusion/reforming windows.
    pub fn age_and_elect(&mut self, all_npcs: &mut BTreeMap<NpcId, Npc>, now_ms: f64) -> Vec<EngineEvent> {
        let mut events = Vec::new();

        let mut groups: HashMap<u32, Vec<NpcId>> = HashMap::new();
        for npc in all_npcs.values() {
            if let Some(fid) = npc.formation_id {
                groups.entry(fid).or_default().push(npc.id);
            }
        }

        for (fid, members) in &groups {
            let has_leader = members
                .iter()
                .any(|id| all_npcs.get(id).map(|n| n.formation_leader).unwrap_or(false));

            if !has_leader && !self.windows.contains_key(fid) {
                let mut ranked: Vec<(f64, NpcId)> = members
                    .iter()
                    .filter_map(|id| all_npcs.get(id).map(|n| (n.hull_max, n.id)))
                    .collect();
                ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap().then(a.1.cmp(&b.1)));

                if let Some((_, new_leader_id)) = ranked.first().copied() {
                    if let Some(new_leader) = all_npcs.get_mut(&new_leader_id) {
                        new_leader.formation_leader = true;
                    }
                    self.windows.insert(
                        *fid,
                        FormationWindow { phase: WindowPhase::Confusion, started_at_ms: now_ms, new_leader_id },
                    );
                    events.push(EngineEvent::FormationLeaderChanged { formation_id: *fid, new_leader: new_leader_id });
                }
            }
        }

        self.windows.retain(|_, window| {
            let elapsed = now_ms - window.started_at_ms;
            match window.phase {
                WindowPhase::Confusion if elapsed >= FORMATION_CONFUSION_DURATION_MS => {
                    window.phase = WindowPhase::Reforming;
                    window.started_at_ms = now_ms;
                    true
                }
                WindowPhase::Reforming
                    if elapsed >= FORMATION_REFORMING_DURATION_MS => false,
                _ => true,
            }
        });

        events
    }

    fn formation_members(npc: &Npc, ctx: &TickContext) -> Vec<NpcId> {
        let mut members: Vec<NpcId> = ctx
            .all_npcs
            .values()
            .filter(|other| other.formation_id == npc.formation_id)
            .map(|other| other.id)
            .collect();
        members.sort();
        members
    }

    fn slot_offset(index_among_followers: usize) -> Vec2 {
        let row = (index_among_followers / 2 + 1) as f64;
        let left = index_among_followers % 2 == 0;
        let lateral = if left { 1.0 } else { -1.0 };
        Vec2::new(-row * FORMATION_ROW_SPACING, lateral * row * FORMATION_ROW_SPACING * 0.5)
    }
}

impl Strategy for FormationStrategy {
    fn update(&mut self, npc: &mut Npc, neighborhood: &Neighborhood, ctx: &TickContext) -> Option<Action> {
        if let Some(fid) = npc.formation_id {
            if let Some(window) = self.windows.get(&fid) {
                let elapsed = ctx.now_ms - window.started_at_ms;
                match window.phase {
                    WindowPhase::Confusion => {
                        npc.clear_target();
                        npc.state = NpcState::Formation(FormationState::Confusion);
                        let drift_angle = npc.rotation + (elapsed / 200.0).sin() * 0.3;
                        npc.position = npc.position.add(Vec2::from_angle(drift_angle, npc.speed * 0.3 * (ctx.dt_ms / 1000.0)));
                        return None;
                    }
                    WindowPhase::Reforming => {
                        npc.state = NpcState::Formation(FormationState::Reforming);
                        if let Some(leader) = ctx.all_npcs.get(&window.new_leader_id) {
                            let members = Self::formation_members(npc, ctx);
                            let idx = members.iter().filter(|id| **id != window.new_leader_id).position(|id| *id == npc.id).unwrap_or(0);
                            let slot = leader.position.add(Self::slot_offset(idx));
                            npc.position = npc.position.move_toward(slot, npc.speed * (ctx.dt_ms / 1000.0));
                        }
                        return None;
                    }
                }
            }
        }

        if should_retreat(npc, RETREAT_THRESHOLD_VOID) && npc.formation_leader {
            npc.state = NpcState::Formation(FormationState::Retreat);
            npc.position = npc.position.move_toward(npc.home_base_position, npc.speed * FORMATION_RETREAT_SPEED_MULT * (ctx.dt_ms / 1000.0));
            return None;
        }

        if npc.formation_leader {
            let target = select_nearest(neighborhood.players);
            match target {
                None => {
                    npc.state = NpcState::Formation(FormationState::Patrol);
                    None
                }
                Some(target) => {
                    npc.set_target_player(target.id);
                    npc.state = NpcState::Formation(FormationState::Combat);
                    let standoff = target.position.add(
                        npc.position.sub(target.position).normalized().scale(npc.weapon_range * FORMATION_LEADER_APPROACH_FRACTION),
                    );
                    npc.position = npc.position.move_toward(standoff, npc.speed * (ctx.dt_ms / 1000.0));
                    if target.distance < npc.weapon_range * FORMATION_LEADER_BACKOFF_FRACTION {
                        npc.position = npc.position.move_away(target.position, npc.speed * (ctx.dt_ms / 1000.0));
                    }
                    npc.rotation = target.position.sub(npc.position).angle();

                    if try_fire(npc, target.distance, ctx.now_ms, FORMATION_FIRE_COOLDOWN_MS) {
                        npc.last_fire_time_ms = ctx.now_ms;
                        Some(Action::Fire(FireAction {
                            target: ActionTarget::Player(target.id),
                            weapon_type: npc.weapon_type,
                            weapon_tier: npc.weapon_tier,
                            base_damage: npc.weapon_damage,
                            shield_piercing: 0.0,
                            enraged: false,
                            synchronized: true,
                        }))
                    } else {
                        None
                    }
                }
            }
        } else {
            let members = Self::formation_members(npc, ctx);
            let leader_id = members.iter().find(|id| ctx.all_npcs.get(id).map(|n| n.formation_leader).unwrap_or(false)).copied();
            let leader = leader_id.and_then(|id| ctx.all_npcs.get(&id));

            let Some(leader) = leader else {
                npc.state = NpcState::Formation(FormationState::Patrol);
                return None;
            };

            let idx = members.iter().filter(|id| Some(**id) != leader_id).position(|id| *id == npc.id).unwrap_or(0);
            let slot = leader.position.add(Self::slot_offset(idx));
            let distance_behind = npc.position.distance(slot);
            let speed_mult = if distance_behind > FORMATION_ROW_SPACING * 3.0 { FORMATION_FOLLOWER_MAX_SPEED_MULT } else { 1.0 };
            npc.position = npc.position.move_toward(slot, npc.speed * speed_mult * (ctx.dt_ms / 1000.0));

            npc.target_player = leader.target_player;
            npc.state = NpcState::Formation(FormationState::Combat);

            if let Some(target_id) = leader.target_player {
                if let Some(target) = neighborhood.players.iter().find(|p| p.id == target_id) {
                    npc.rotation = target.position.sub(npc.position).angle();
                    let offset_ms = idx as f64 * FORMATION_VOLLEY_STAGGER_MS;
                    let leader_fire_gap = ctx.now_ms - leader.last_fire_time_ms;
                    if leader_fire_gap >= offset_ms && try_fire(npc, target.distance, ctx.now_ms, FORMATION_FIRE_COOLDOWN_MS) {
                        npc.last_fire_time_ms = ctx.now_ms;
                        return Some(Action::Fire(FireAction {
                            target: ActionTarget::Player(target.id),
                            weapon_type: npc.weapon_type,
                            weapon_tier: npc.weapon_tier,
                            base_damage: npc.weapon_damage,
                            shield_piercing: 0.0,
                            enraged: false,
                            synchronized: true,
                        }));
                    }
                }
            }
            None
        }
    }

    fn cleanup(&mut self, _id: NpcId) {
        // Formation windows are keyed by formation_id, not NpcId; stale
        // windows age out naturally via `age_and_elect` once no members
        // remain in `all_npcs` to re-trigger succession.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::npc::NpcType;

    #[test]
    fn succession_picks_highest_hull_max_ties_by_lowest_id() {
        let mut all_npcs = BTreeMap::new();
        let mut make = |hull_max: f64, id: u32| {
            let mut n = Npc::spawn(NpcType::Void, Vec2::ZERO, None, Vec2::ZERO);
            n.id = NpcId(id);
            n.hull_max = hull_max;
            n.formation_id = Some(1);
            n
        };
        let f1 = make(100.0, 20);
        let f2 = make(100.0, 10);
        let f3 = make(50.0, 30);
        all_npcs.insert(f1.id, f1);
        all_npcs.insert(f2.id, f2);
        all_npcs.insert(f3.id, f3);

        let mut strat = FormationStrategy::new();
        let events = strat.age_and_elect(&mut all_npcs, 0.0);
        assert_eq!(events.len(), 1);
        match &events[0] {
            EngineEvent::FormationLeaderChanged { new_leader, .. } => assert_eq!(*new_leader, NpcId(10)),
            _ => panic!("expected leader change"),
        }
        assert!(all_npcs.get(&NpcId(10)).unwrap().formation_leader);
    }

    #[test]
    fn confusion_then_reforming_windows_age_out_in_order() {
        let mut all_npcs = BTreeMap::new();
        let mut n = Npc::spawn(NpcType::Void, Vec2::ZERO, None, Vec2::ZERO);
        n.formation_id = Some(7);
        all_npcs.insert(n.id, n);

        let mut strat = FormationStrategy::new();
        strat.age_and_elect(&mut all_npcs, 0.0);
        assert!(strat.windows.contains_key(&7));

        strat.age_and_elect(&mut all_npcs, FORMATION_CONFUSION_DURATION_MS + 1.0);
        assert_eq!(strat.windows.get(&7).unwrap().phase, WindowPhase::Reforming);

        strat.age_and_elect(&mut all_npcs, FORMATION_CONFUSION_DURATION_MS + FORMATION_REFORMING_DURATION_MS + 2.0);
        assert!(!strat.windows.contains_key(&7));
    }
}
