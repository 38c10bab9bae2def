//! Rage-mode fallback (§4.11): the universal handler for NPCs orphaned
//! by base destruction whose faction strategy has no bespoke re-homing
//! logic of its own. Pirate scouts reroute themselves in-state
//! (`pirate::scout`) and dreadnoughts enrage permanently
//! (`pirate::dreadnought::enrage`) — `Engine::on_base_destroyed` routes
//! around this module for those two types (see DESIGN.md). Everyone
//! else just chases the nearest player, or patrols the point they were
//! orphaned at if no player is in range.

use crate::config::{RAGE_MODE_DAMAGE_MULT, RAGE_MODE_FIRE_COOLDOWN_MS, RAGE_MODE_SPEED_MULT};
use crate::world::ids::NpcId;
use crate::world::neighborhood::Neighborhood;
use crate::world::npc::{Npc, NpcState};

use super::action::{Action, ActionTarget, FireAction};
use super::strategy::{select_nearest, simple_patrol, try_fire, Strategy, TickContext};

#[derive(Default)]
pub struct RageModeStrategy;

impl RageModeStrategy {
    pub fn new() -> Self {
        RageModeStrategy
    }
}

impl Strategy for RageModeStrategy {
    fn update(&mut self, npc: &mut Npc, neighborhood: &Neighborhood, ctx: &TickContext) -> Option<Action> {
        debug_assert!(npc.orphaned);
        npc.state = NpcState::RageMode;

        match select_nearest(neighborhood.players) {
            Some(target) => {
                npc.set_target_player(target.id);
                npc.position = npc
                    .position
                    .move_toward(target.position, npc.speed * RAGE_MODE_SPEED_MULT * (ctx.dt_ms / 1000.0));
                npc.rotation = target.position.sub(npc.position).angle();

                if try_fire(npc, target.distance, ctx.now_ms, RAGE_MODE_FIRE_COOLDOWN_MS) {
                    npc.last_fire_time_ms = ctx.now_ms;
                    Some(Action::Fire(FireAction {
                        target: ActionTarget::Player(target.id),
                        weapon_type: npc.weapon_type,
                        weapon_tier: npc.weapon_tier,
                        base_damage: npc.weapon_damage * RAGE_MODE_DAMAGE_MULT,
                        shield_piercing: 0.0,
                        enraged: true,
                        synchronized: false,
                    }))
                } else {
                    None
                }
            }
            None => {
                npc.clear_target();
                let center = npc.orphan_center.unwrap_or(npc.home_base_position);
                let point = simple_patrol(npc, center, 400.0, 0.25, ctx.dt_ms);
                npc.position = npc.position.move_toward(point, npc.speed * (ctx.dt_ms / 1000.0));
                None
            }
        }
    }

    fn cleanup(&mut self, _id: NpcId) {}
}
