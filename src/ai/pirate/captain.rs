//! Captain sub-strategy (§4.8): idles at base until intel or a nearby
//! player calls it into a raid; flees home to heal under fire, then
//! re-engages its remembered target once healthy again.

use std::collections::HashMap;

use crate::config::{
    CAPTAIN_FLEE_THRESHOLD, CAPTAIN_HULL_REGEN_PER_SEC, CAPTAIN_REENGAGE_THRESHOLD, CAPTAIN_SHIELD_REGEN_PER_SEC,
    CAPTAIN_STEAL_RANGE,
};
use crate::world::damage::apply_heal;
use crate::world::ids::NpcId;
use crate::world::neighborhood::Neighborhood;
use crate::world::npc::{CaptainState, Npc, NpcState};

use super::super::action::{Action, ActionTarget, FireAction};
use super::super::strategy::{try_fire, TickContext};
use super::intel::IntelStore;
use super::steal::try_steal;

#[derive(Debug, Clone, Copy, Default)]
struct CaptainRecord {
    remembered_target: Option<ActionTarget>,
    remembered_pos: Option<crate::world::Vec2>,
    last_steal_ms: f64,
}

#[derive(Default)]
pub struct CaptainStrategy {
    records: HashMap<NpcId, CaptainRecord>,
}

impl CaptainStrategy {
    pub fn new() -> Self {
        CaptainStrategy::default()
    }

    pub fn update(
        &mut self,
        npc: &mut Npc,
        neighborhood: &Neighborhood,
        ctx: &TickContext,
        intel: &mut IntelStore,
    ) -> Option<Action> {
        let record = self.records.entry(npc.id).or_default();

        if let NpcState::Captain(CaptainState::Flee) = npc.state {
            apply_heal(
                npc,
                npc.hull_max * CAPTAIN_HULL_REGEN_PER_SEC * (ctx.dt_ms / 1000.0),
                npc.shield_max * CAPTAIN_SHIELD_REGEN_PER_SEC * (ctx.dt_ms / 1000.0),
            );
            npc.position = npc.position.move_toward(npc.home_base_position, npc.speed * (ctx.dt_ms / 1000.0));
            if npc.hull_fraction() >= CAPTAIN_REENGAGE_THRESHOLD {
                if record.remembered_target.is_some() {
                    npc.state = NpcState::Captain(CaptainState::Raid);
                } else {
                    npc.state = NpcState::Captain(CaptainState::Idle);
                }
            }
            return None;
        }

        if npc.hull_fraction() < CAPTAIN_FLEE_THRESHOLD {
            npc.state = NpcState::Captain(CaptainState::Flee);
            npc.reset_transient_state();
            return None;
        }

        if let Some(steal) = try_steal(npc, ctx, neighborhood, record.last_steal_ms) {
            record.last_steal_ms = ctx.now_ms;
            return Some(steal);
        }

        match npc.state {
            NpcState::Captain(CaptainState::Idle) => {
                if let Some(player) = neighborhood.nearest_player() {
                    record.remembered_target = Some(ActionTarget::Player(player.id));
                    record.remembered_pos = Some(player.position);
                    npc.set_target_player(player.id);
                    npc.state = NpcState::Captain(CaptainState::Raid);
                    return None;
                }
                let Some(base_id) = npc.home_base_id else { return None };
                if let Some(report) = intel.consume(base_id, ctx.now_ms) {
                    record.remembered_target = Some(report.target);
                    record.remembered_pos = Some(report.target_pos);
                    match report.target {
                        ActionTarget::Player(id) => npc.set_target_player(id),
                        ActionTarget::Npc(id) => npc.set_target_npc(id),
                        // A base isn't an NPC/player target; the captain
                        // just closes on `remembered_pos` and lets
                        // `try_steal` (already scanning `nearby_bases`)
                        // take it from there.
                        ActionTarget::Base(_) => npc.clear_target(),
                    }
                    npc.state = NpcState::Captain(CaptainState::Raid);
                }
                None
            }
            NpcState::Captain(CaptainState::Raid) => {
                if let Some(player) = neighborhood.nearest_player() {
                    record.remembered_target = Some(ActionTarget::Player(player.id));
                    record.remembered_pos = Some(player.position);
                    npc.set_target_player(player.id);
                    return Self::engage(npc, player.position, player.distance, ctx);
                }

                let Some(target_pos) = record.remembered_pos else {
                    npc.state = NpcState::Captain(CaptainState::Idle);
                    return None;
                };

                if npc.position.distance(target_pos) > CAPTAIN_STEAL_RANGE {
                    npc.position = npc.position.move_toward(target_pos, npc.speed * (ctx.dt_ms / 1000.0));
                    npc.rotation = target_pos.sub(npc.position).angle();
                    return None;
                }

                if let Some(defender) = neighborhood.hostiles.iter().min_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap()) {
                    npc.set_target_npc(defender.id);
                    return Self::engage(npc, defender.position, defender.distance, ctx);
                }
                None
            }
            _ => None,
        }
    }

    fn engage(npc: &mut Npc, target_pos: crate::world::Vec2, distance: f64, ctx: &TickContext) -> Option<Action> {
        if distance > npc.weapon_range * 0.8 {
            let approach = target_pos.add(npc.position.sub(target_pos).normalized().scale(npc.weapon_range * 0.8));
            npc.position = npc.position.move_toward(approach, npc.speed * (ctx.dt_ms / 1000.0));
        }
        npc.rotation = target_pos.sub(npc.position).angle();

        if try_fire(npc, distance, ctx.now_ms, crate::config::BASELINE_FIRE_COOLDOWN_MS) {
            npc.last_fire_time_ms = ctx.now_ms;
            let target = npc.target_player.map(ActionTarget::Player).or(npc.target_npc.map(ActionTarget::Npc))?;
            Some(Action::Fire(FireAction {
                target,
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

    pub fn cleanup(&mut self, id: NpcId) {
        self.records.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::hooks::StaticWorldHooks;
    use crate::world::ids::{BaseId, PlayerId};
    use crate::world::neighborhood::NeighborhoodScratch;
    use crate::world::npc::NpcType;
    use crate::world::player::PlayerRef;
    use crate::world::Vec2;
    use std::collections::BTreeMap;

    fn ctx<'a>(world: &'a StaticWorldHooks, all_npcs: &'a BTreeMap<NpcId, Npc>, now_ms: f64, dt_ms: f64) -> TickContext<'a> {
        TickContext {
            now_ms,
            dt_ms,
            home_base: None,
            territory_radius: 500.0,
            patrol_radius: 800.0,
            has_foreman: false,
            nearby_bases: &[],
            all_npcs,
            world,
        }
    }

    #[test]
    fn a_nearby_player_interrupts_idle_and_starts_a_raid() {
        let mut npc = Npc::spawn(NpcType::PirateCaptain, Vec2::ZERO, None, Vec2::ZERO);
        let players = [PlayerRef::new(PlayerId(1), Vec2::new(200.0, 0.0))];
        let world = StaticWorldHooks::new(vec![]);
        let all_npcs = BTreeMap::new();
        let mut scratch = NeighborhoodScratch::new();
        let nb = scratch.build_for(&npc, &all_npcs, &players);
        let c = ctx(&world, &all_npcs, 0.0, 50.0);
        let mut strat = CaptainStrategy::new();
        let mut intel = IntelStore::new();
        strat.update(&mut npc, &nb, &c, &mut intel);
        assert!(matches!(npc.state, NpcState::Captain(CaptainState::Raid)));
        assert_eq!(npc.target_player, Some(PlayerId(1)));
    }

    #[test]
    fn fresh_intel_launches_a_raid_toward_the_reported_target() {
        let mut npc = Npc::spawn(NpcType::PirateCaptain, Vec2::ZERO, Some(BaseId(1)), Vec2::ZERO);
        let world = StaticWorldHooks::new(vec![]);
        let all_npcs = BTreeMap::new();
        let mut scratch = NeighborhoodScratch::new();
        let nb = scratch.build_for(&npc, &all_npcs, &[]);
        let c = ctx(&world, &all_npcs, 1000.0, 50.0);
        let mut strat = CaptainStrategy::new();
        let mut intel = IntelStore::new();
        intel.publish(
            BaseId(1),
            super::super::intel::IntelReport {
                target: ActionTarget::Player(PlayerId(7)),
                target_pos: Vec2::new(500.0, 500.0),
                is_base_target: false,
                has_resources: false,
                reported_at_ms: 1000.0,
            },
        );
        strat.update(&mut npc, &nb, &c, &mut intel);
        assert!(matches!(npc.state, NpcState::Captain(CaptainState::Raid)));
        assert_eq!(npc.target_player, Some(PlayerId(7)));
    }

    #[test]
    fn low_hull_triggers_flee_and_healing_resumes_raid_at_reengage_threshold() {
        let mut npc = Npc::spawn(NpcType::PirateCaptain, Vec2::new(1000.0, 0.0), None, Vec2::ZERO);
        npc.hull = npc.hull_max * 0.2;
        npc.state = NpcState::Captain(CaptainState::Raid);
        let world = StaticWorldHooks::new(vec![]);
        let all_npcs = BTreeMap::new();
        let mut scratch = NeighborhoodScratch::new();
        let nb = scratch.build_for(&npc, &all_npcs, &[]);
        let mut strat = CaptainStrategy::new();
        let mut intel = IntelStore::new();
        strat.records.entry(npc.id).or_default().remembered_target = Some(ActionTarget::Player(PlayerId(1)));

        let c = ctx(&world, &all_npcs, 0.0, 50.0);
        strat.update(&mut npc, &nb, &c, &mut intel);
        assert!(matches!(npc.state, NpcState::Captain(CaptainState::Flee)));

        // Heal across many ticks until the re-engage threshold is crossed.
        npc.hull = npc.hull_max * CAPTAIN_REENGAGE_THRESHOLD;
        let c2 = ctx(&world, &all_npcs, 5000.0, 50.0);
        strat.update(&mut npc, &nb, &c2, &mut intel);
        assert!(matches!(npc.state, NpcState::Captain(CaptainState::Raid)));
    }
}
