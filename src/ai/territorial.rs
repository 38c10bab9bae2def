//! Territorial strategy (§4.4): the rogue-miner baseline for defending a
//! disc of space around a home base. Reused verbatim (with scaled
//! radius and damage bonus) by the Barnacle King boss (`barnacle_king.rs`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::{
    TERRITORY_DEFENDER_DAMAGE_BONUS, TERRITORY_PURSUE_CLAMP_FRACTION, TERRITORY_RETREAT_THRESHOLD,
    TERRITORY_WARNING_APPROACH_FRACTION, TERRITORY_WARNING_DURATION_MS,
};
use crate::world::ids::{NpcId, PlayerId};
use crate::world::neighborhood::Neighborhood;
use crate::world::npc::{Faction, Npc, NpcState};
use crate::world::Vec2;

use super::action::{Action, ActionTarget, FireAction};
use super::strategy::{should_retreat, try_fire, Strategy, TickContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerritorialState {
    Patrol,
    Warning,
    Combat,
    Retreat,
}

#[derive(Debug, Clone, Copy)]
pub struct WarningEntry {
    pub start_ms: f64,
    pub warned: bool,
}

/// Shared core used both by the rogue-miner baseline strategy below and
/// by the Barnacle King boss with scaled radius/damage parameters.
pub fn territorial_tick(
    npc: &mut Npc,
    neighborhood: &Neighborhood,
    ctx: &TickContext,
    warnings: &mut HashMap<PlayerId, WarningEntry>,
    radius_mult: f64,
    damage_bonus_mult: f64,
) -> Option<Action> {
    let territory_radius = ctx.territory_radius * radius_mult;
    let center = npc.home_base_position;

    if should_retreat(npc, TERRITORY_RETREAT_THRESHOLD) {
        npc.state = NpcState::Territorial(TerritorialState::Retreat);
        npc.position = npc.position.move_toward(center, npc.speed * (ctx.dt_ms / 1000.0));
        return None;
    }

    let intruders: Vec<_> = neighborhood
        .players
        .iter()
        .filter(|p| p.position.distance(center) <= territory_radius)
        .collect();

    let intruder_hostiles: Vec<_> = neighborhood
        .hostiles
        .iter()
        .filter(|h| h.position.distance(center) <= territory_radius)
        .collect();

    if intruders.is_empty() && intruder_hostiles.is_empty() {
        warnings.clear();
        npc.reset_transient_state();
        npc.state = NpcState::Territorial(TerritorialState::Patrol);
        let point = super::strategy::simple_patrol(npc, center, ctx.patrol_radius, 0.2, ctx.dt_ms);
        npc.position = npc.position.move_toward(point, npc.speed * (ctx.dt_ms / 1000.0));
        return None;
    }

    // Hostile NPCs (pirates) get no warning phase — immediate fire.
    if let Some(hostile) = intruder_hostiles.first() {
        npc.set_target_npc(hostile.id);
        npc.state = NpcState::Territorial(TerritorialState::Combat);
        return fire_at_pursuit(npc, hostile.position, hostile.distance, center, territory_radius, ctx, damage_bonus_mult, ActionTarget::Npc(hostile.id));
    }

    let target = intruders[0];
    let skip_warning = target.mining;
    let entry = warnings.entry(target.id).or_insert(WarningEntry { start_ms: ctx.now_ms, warned: skip_warning });

    if !entry.warned {
        let elapsed = ctx.now_ms - entry.start_ms;
        if elapsed >= TERRITORY_WARNING_DURATION_MS {
            entry.warned = true;
        } else {
            let approach = target.position.add(
                npc.position.sub(target.position).normalized().scale(npc.weapon_range * TERRITORY_WARNING_APPROACH_FRACTION),
            );
            npc.position = npc.position.move_toward(approach, npc.speed * (ctx.dt_ms / 1000.0));
            npc.rotation = target.position.sub(npc.position).angle();
            npc.set_target_player(target.id);
            npc.state = NpcState::Territorial(TerritorialState::Warning);
            return Some(Action::Warning { target: target.id });
        }
    }

    npc.set_target_player(target.id);
    npc.state = NpcState::Territorial(TerritorialState::Combat);
    fire_at_pursuit(npc, target.position, target.distance, center, territory_radius, ctx, damage_bonus_mult, ActionTarget::Player(target.id))
}

fn fire_at_pursuit(
    npc: &mut Npc,
    target_pos: Vec2,
    distance: f64,
    center: Vec2,
    territory_radius: f64,
    ctx: &TickContext,
    damage_bonus_mult: f64,
    action_target: ActionTarget,
) -> Option<Action> {
    let pursue = npc.position.move_toward(target_pos, npc.speed * (ctx.dt_ms / 1000.0));
    let clamped = if pursue.distance(center) > territory_radius * TERRITORY_PURSUE_CLAMP_FRACTION {
        center.add(pursue.sub(center).normalized().scale(territory_radius * TERRITORY_PURSUE_CLAMP_FRACTION))
    } else {
        pursue
    };
    npc.position = clamped;
    npc.rotation = target_pos.sub(npc.position).angle();

    if try_fire(npc, distance, ctx.now_ms, crate::config::BASELINE_FIRE_COOLDOWN_MS) {
        npc.last_fire_time_ms = ctx.now_ms;
        Some(Action::Fire(FireAction {
            target: action_target,
            weapon_type: npc.weapon_type,
            weapon_tier: npc.weapon_tier,
            base_damage: npc.weapon_damage * (1.0 + TERRITORY_DEFENDER_DAMAGE_BONUS * damage_bonus_mult),
            shield_piercing: 0.0,
            enraged: false,
            synchronized: false,
        }))
    } else {
        None
    }
}

#[derive(Default)]
pub struct TerritorialStrategy {
    warnings: HashMap<NpcId, HashMap<PlayerId, WarningEntry>>,
}

impl TerritorialStrategy {
    pub fn new() -> Self {
        TerritorialStrategy::default()
    }
}

impl Strategy for TerritorialStrategy {
    fn update(&mut self, npc: &mut Npc, neighborhood: &Neighborhood, ctx: &TickContext) -> Option<Action> {
        let warnings = self.warnings.entry(npc.id).or_default();
        debug_assert_eq!(npc.faction, Faction::RogueMiner);
        territorial_tick(npc, neighborhood, ctx, warnings, 1.0, 1.0)
    }

    fn cleanup(&mut self, id: NpcId) {
        self.warnings.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::hooks::StaticWorldHooks;
    use crate::world::ids::PlayerId;
    use crate::world::neighborhood::NeighborhoodScratch;
    use crate::world::npc::NpcType;
    use crate::world::player::PlayerRef;
    use std::collections::BTreeMap;

    #[test]
    fn warning_phase_precedes_combat_and_never_leaves_territory() {
        let mut npc = Npc::spawn(NpcType::RogueMinerGuard, Vec2::ZERO, None, Vec2::ZERO);
        let world = StaticWorldHooks::new(vec![]);
        let all_npcs = BTreeMap::new();
        let players = [PlayerRef::new(PlayerId(1), Vec2::new(200.0, 0.0))];
        let mut scratch = NeighborhoodScratch::new();
        let nb = scratch.build_for(&npc, &all_npcs, &players);
        let ctx = TickContext {
            now_ms: 0.0,
            dt_ms: 50.0,
            home_base: None,
            territory_radius: 500.0,
            patrol_radius: 500.0,
            has_foreman: false,
            nearby_bases: &[],
            all_npcs: &all_npcs,
            world: &world,
        };
        let mut strat = TerritorialStrategy::new();
        let action = strat.update(&mut npc, &nb, &ctx);
        assert!(matches!(action, Some(Action::Warning { .. })));
        assert!(matches!(npc.state, NpcState::Territorial(TerritorialState::Warning)));
    }
}
