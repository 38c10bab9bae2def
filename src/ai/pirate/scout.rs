//! Scout sub-strategy (§4.8): patrol, spot a target, observe it, flee
//! home with the report, then join the raid it just called in.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::{
    SCOUT_FLEE_SPEED_MULT, SCOUT_LOST_TARGET_TIMEOUT_MS, SCOUT_MAX_CHASE_RADIUS, SCOUT_OBSERVE_DURATION_MS,
    SCOUT_PATROL_RADIUS, SCOUT_RAID_FIRE_COOLDOWN_MS, SCOUT_RAID_ORBIT_RADIUS_MAX, SCOUT_RAID_ORBIT_RADIUS_MIN,
};
use crate::world::base::BaseKind;
use crate::world::ids::NpcId;
use crate::world::neighborhood::Neighborhood;
use crate::world::npc::{Npc, NpcState};
use crate::world::Vec2;

use super::super::action::{Action, ActionTarget, FireAction};
use super::super::strategy::{simple_patrol, try_fire, TickContext};
use super::intel::{IntelReport, IntelStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoutState {
    Patrol,
    Espionage,
    Fleeing,
    AtBase,
    Raid,
}

#[derive(Debug, Clone, Copy)]
struct Sighting {
    target: ActionTarget,
    target_pos: Vec2,
    has_resources: bool,
    is_base_target: bool,
}

/// A sighted base is only worth raiding if it still has something to
/// steal: a non-empty scrap pile or a positive claim balance (§4.8).
fn has_lootable_resources(kind: &BaseKind) -> bool {
    match kind {
        BaseKind::ScavengerYard { scrap_pile } => !scrap_pile.contents.is_empty(),
        BaseKind::MiningClaim { claim_credits, .. } => *claim_credits > 0.0,
        BaseKind::PirateOutpost | BaseKind::SwarmHive => false,
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ScoutRecord {
    sighting: Option<Sighting>,
    observe_elapsed_ms: f64,
    last_seen_ms: f64,
}

#[derive(Default)]
pub struct ScoutStrategy {
    records: HashMap<NpcId, ScoutRecord>,
}

impl ScoutStrategy {
    pub fn new() -> Self {
        ScoutStrategy::default()
    }

    /// Priority 1 player, 2 enemy base, 3 enemy NPC (§4.8).
    fn spot_target(npc: &Npc, neighborhood: &Neighborhood, ctx: &TickContext) -> Option<Sighting> {
        if let Some(player) = neighborhood.nearest_player() {
            return Some(Sighting {
                target: ActionTarget::Player(player.id),
                target_pos: player.position,
                has_resources: true,
                is_base_target: false,
            });
        }

        let nearest_base = ctx
            .nearby_bases
            .iter()
            .filter(|b| npc.faction.is_hostile_to(b.faction))
            .min_by(|a, b| a.position.distance(npc.position).partial_cmp(&b.position.distance(npc.position)).unwrap());
        if let Some(base) = nearest_base {
            return Some(Sighting {
                target: ActionTarget::Base(base.id),
                target_pos: base.position,
                has_resources: has_lootable_resources(&base.kind),
                is_base_target: true,
            });
        }

        neighborhood.hostiles.iter().min_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap()).map(|h| Sighting {
            target: ActionTarget::Npc(h.id),
            target_pos: h.position,
            has_resources: false,
            is_base_target: false,
        })
    }

    pub fn update(
        &mut self,
        npc: &mut Npc,
        neighborhood: &Neighborhood,
        ctx: &TickContext,
        intel: &mut IntelStore,
    ) -> Option<Action> {
        let record = self.records.entry(npc.id).or_default();

        match npc.state {
            NpcState::Scout(ScoutState::Patrol) => {
                if let Some(sighting) = Self::spot_target(npc, neighborhood, ctx) {
                    npc.rotation = sighting.target_pos.sub(npc.position).angle();
                    record.sighting = Some(sighting);
                    record.observe_elapsed_ms = 0.0;
                    npc.state = NpcState::Scout(ScoutState::Espionage);
                    return None;
                }
                let point = simple_patrol(npc, npc.home_base_position, SCOUT_PATROL_RADIUS, 0.2, ctx.dt_ms);
                npc.position = npc.position.move_toward(point, npc.speed * (ctx.dt_ms / 1000.0));
                None
            }
            NpcState::Scout(ScoutState::Espionage) => {
                record.observe_elapsed_ms += ctx.dt_ms;
                if record.observe_elapsed_ms >= SCOUT_OBSERVE_DURATION_MS {
                    npc.state = NpcState::Scout(ScoutState::Fleeing);
                }
                None
            }
            NpcState::Scout(ScoutState::Fleeing) => {
                let Some(home_id) = npc.home_base_id else {
                    let Some(sighting) = record.sighting else {
                        npc.state = NpcState::Scout(ScoutState::Patrol);
                        return None;
                    };
                    npc.state = NpcState::Scout(ScoutState::Raid);
                    npc.rotation = sighting.target_pos.sub(npc.position).angle();
                    return None;
                };

                let home_alive = ctx.world.get_active_base(home_id).is_some();
                if !home_alive {
                    let nearest = ctx.world.get_active_bases_by_faction(npc.faction);
                    if let Some(nearest_base) = nearest.into_iter().min_by(|a, b| {
                        a.position.distance(npc.position).partial_cmp(&b.position.distance(npc.position)).unwrap()
                    }) {
                        npc.home_base_id = Some(nearest_base.id);
                        npc.home_base_position = nearest_base.position;
                    } else {
                        let Some(sighting) = record.sighting else {
                            npc.state = NpcState::Scout(ScoutState::Patrol);
                            return None;
                        };
                        npc.state = NpcState::Scout(ScoutState::Raid);
                        npc.rotation = sighting.target_pos.sub(npc.position).angle();
                        return None;
                    }
                }

                npc.position = npc.position.move_toward(npc.home_base_position, npc.speed * SCOUT_FLEE_SPEED_MULT * (ctx.dt_ms / 1000.0));
                if npc.position.distance(npc.home_base_position) < 40.0 {
                    npc.state = NpcState::Scout(ScoutState::AtBase);
                }
                None
            }
            NpcState::Scout(ScoutState::AtBase) => {
                let Some(sighting) = record.sighting.take() else {
                    npc.state = NpcState::Scout(ScoutState::Patrol);
                    return None;
                };
                let Some(base_id) = npc.home_base_id else {
                    npc.state = NpcState::Scout(ScoutState::Patrol);
                    return None;
                };
                intel.publish(
                    base_id,
                    IntelReport {
                        target: sighting.target,
                        target_pos: sighting.target_pos,
                        is_base_target: sighting.is_base_target,
                        has_resources: sighting.has_resources,
                        reported_at_ms: ctx.now_ms,
                    },
                );
                npc.state = NpcState::Scout(ScoutState::Raid);
                Some(Action::PirateIntelBroadcast { base_id, target: sighting.target, target_pos: sighting.target_pos })
            }
            NpcState::Scout(ScoutState::Raid) => {
                let Some(sighting) = record.sighting else {
                    npc.state = NpcState::Scout(ScoutState::Patrol);
                    return None;
                };

                let still_in_range = match sighting.target {
                    ActionTarget::Player(id) => neighborhood.players.iter().any(|p| p.id == id),
                    ActionTarget::Npc(id) => neighborhood.hostiles.iter().any(|h| h.id == id),
                    ActionTarget::Base(id) => ctx.nearby_bases.iter().any(|b| b.id == id),
                };
                if still_in_range {
                    record.last_seen_ms = ctx.now_ms;
                } else if ctx.now_ms - record.last_seen_ms > SCOUT_LOST_TARGET_TIMEOUT_MS
                    || npc.position.distance(sighting.target_pos) > SCOUT_MAX_CHASE_RADIUS
                {
                    record.sighting = None;
                    npc.reset_transient_state();
                    npc.state = NpcState::Scout(ScoutState::Patrol);
                    return None;
                }

                let orbit_radius = (SCOUT_RAID_ORBIT_RADIUS_MIN + SCOUT_RAID_ORBIT_RADIUS_MAX) / 2.0;
                let orbit_point = sighting.target_pos.add(npc.position.sub(sighting.target_pos).normalized().scale(orbit_radius));
                npc.position = npc.position.move_toward(orbit_point, npc.speed * (ctx.dt_ms / 1000.0));
                npc.rotation = sighting.target_pos.sub(npc.position).angle();

                // A sighted base is orbited, not shot at — firing stays
                // reserved for the player/NPC targets applier.rs actually
                // resolves damage against.
                if matches!(sighting.target, ActionTarget::Base(_)) {
                    return None;
                }

                let distance = npc.position.distance(sighting.target_pos);
                if try_fire(npc, distance, ctx.now_ms, SCOUT_RAID_FIRE_COOLDOWN_MS) {
                    npc.last_fire_time_ms = ctx.now_ms;
                    Some(Action::Fire(FireAction {
                        target: sighting.target,
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
            _ => None,
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
    use crate::world::ids::PlayerId;
    use crate::world::neighborhood::NeighborhoodScratch;
    use crate::world::npc::NpcType;
    use crate::world::player::PlayerRef;
    use std::collections::BTreeMap;

    #[test]
    fn spotting_a_player_moves_from_patrol_to_espionage() {
        let mut npc = Npc::spawn(NpcType::PirateScout, Vec2::ZERO, None, Vec2::ZERO);
        let players = [PlayerRef::new(PlayerId(1), Vec2::new(100.0, 0.0))];
        let world = StaticWorldHooks::new(vec![]);
        let all_npcs = BTreeMap::new();
        let mut scratch = NeighborhoodScratch::new();
        let nb = scratch.build_for(&npc, &all_npcs, &players);
        let ctx = TickContext {
            now_ms: 0.0,
            dt_ms: 50.0,
            home_base: None,
            territory_radius: 500.0,
            patrol_radius: 800.0,
            has_foreman: false,
            nearby_bases: &[],
            all_npcs: &all_npcs,
            world: &world,
        };
        let mut strat = ScoutStrategy::new();
        let mut intel = IntelStore::new();
        strat.update(&mut npc, &nb, &ctx, &mut intel);
        assert!(matches!(npc.state, NpcState::Scout(ScoutState::Espionage)));
    }

    #[test]
    fn with_no_player_nearby_an_enemy_base_is_sighted_with_its_resources() {
        use crate::world::base::{Base, BaseKind, ScrapPile};
        use crate::world::npc::Faction;

        let mut npc = Npc::spawn(NpcType::PirateScout, Vec2::ZERO, None, Vec2::ZERO);
        let base = Base::new(
            Faction::Scavenger,
            BaseKind::ScavengerYard { scrap_pile: ScrapPile { count: 1, contents: vec!["plating".into()] } },
            Vec2::new(100.0, 0.0),
            500.0,
        );
        let nearby_bases = [&base];
        let world = StaticWorldHooks::new(vec![]);
        let all_npcs = BTreeMap::new();
        let mut scratch = NeighborhoodScratch::new();
        let nb = scratch.build_for(&npc, &all_npcs, &[]);
        let ctx = TickContext {
            now_ms: 0.0,
            dt_ms: 50.0,
            home_base: None,
            territory_radius: 500.0,
            patrol_radius: 800.0,
            has_foreman: false,
            nearby_bases: &nearby_bases,
            all_npcs: &all_npcs,
            world: &world,
        };
        let mut strat = ScoutStrategy::new();
        let mut intel = IntelStore::new();
        strat.update(&mut npc, &nb, &ctx, &mut intel);
        assert!(matches!(npc.state, NpcState::Scout(ScoutState::Espionage)));

        let sighting = strat.records[&npc.id].sighting.expect("scout should have sighted the enemy base");
        assert!(sighting.is_base_target);
        assert!(sighting.has_resources);
        assert!(matches!(sighting.target, ActionTarget::Base(id) if id == base.id));
    }

    #[test]
    fn a_hostile_base_with_nothing_to_steal_is_still_sighted_without_resources() {
        use crate::world::base::{Base, BaseKind};
        use crate::world::npc::Faction;

        let npc = Npc::spawn(NpcType::PirateScout, Vec2::ZERO, None, Vec2::ZERO);
        let base = Base::new(Faction::RogueMiner, BaseKind::MiningClaim { claim_credits: 0.0, has_foreman: false }, Vec2::new(50.0, 0.0), 500.0);
        let world = StaticWorldHooks::new(vec![]);
        let all_npcs = BTreeMap::new();
        let mut scratch = NeighborhoodScratch::new();
        let nb = scratch.build_for(&npc, &all_npcs, &[]);
        let nearby_bases = [&base];
        let ctx = TickContext {
            now_ms: 0.0,
            dt_ms: 50.0,
            home_base: None,
            territory_radius: 500.0,
            patrol_radius: 800.0,
            has_foreman: false,
            nearby_bases: &nearby_bases,
            all_npcs: &all_npcs,
            world: &world,
        };
        let sighting = ScoutStrategy::spot_target(&npc, &nb, &ctx).expect("hostile base should still be sighted");
        assert!(sighting.is_base_target);
        assert!(!sighting.has_resources);
    }
}
