//! Dreadnought sub-strategy (§4.8): a one-per-base-lifetime boss that
//! spawns at low base health, stands off and shells its target, and
//! turns permanently enraged once its home base falls. The 35%
//! incoming-hit block chance lives in the applier (it only matters
//! while resolving a `fire` action against this NPC), not here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::{
    DREADNOUGHT_ENRAGED_DAMAGE_MULT, DREADNOUGHT_ENRAGED_FIRE_COOLDOWN_MS, DREADNOUGHT_ENRAGED_MIN_AGGRO_RANGE,
    DREADNOUGHT_ENRAGED_SPEED_MULT, DREADNOUGHT_FIRE_COOLDOWN_MS, DREADNOUGHT_SHIELD_PIERCING,
    DREADNOUGHT_SPAWN_DURATION_MS, DREADNOUGHT_STANDOFF_RANGE_MAX, DREADNOUGHT_STANDOFF_RANGE_MIN,
};
use crate::world::ids::NpcId;
use crate::world::neighborhood::Neighborhood;
use crate::world::npc::{Npc, NpcState};

use super::super::action::{Action, ActionTarget, FireAction};
use super::super::strategy::{try_fire, TickContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DreadnoughtState {
    Spawning,
    Raid,
    Enraged,
}

#[derive(Default)]
pub struct DreadnoughtStrategy {
    spawn_elapsed_ms: HashMap<NpcId, f64>,
}

impl DreadnoughtStrategy {
    pub fn new() -> Self {
        DreadnoughtStrategy::default()
    }

    /// Called by the engine's base-destruction handler (§4.8, §9
    /// "cross-cutting passes own transitions no single NPC update can
    /// make on itself"): flips the dreadnought permanently, no way back.
    pub fn enrage(npc: &mut Npc) {
        npc.state = NpcState::Dreadnought(DreadnoughtState::Enraged);
        npc.aggro_range = npc.aggro_range.max(DREADNOUGHT_ENRAGED_MIN_AGGRO_RANGE);
        npc.reset_transient_state();
    }

    pub fn update(&mut self, npc: &mut Npc, neighborhood: &Neighborhood, ctx: &TickContext) -> Option<Action> {
        match npc.state {
            NpcState::Dreadnought(DreadnoughtState::Spawning) => {
                let elapsed = self.spawn_elapsed_ms.entry(npc.id).or_insert(0.0);
                *elapsed += ctx.dt_ms;
                if *elapsed >= DREADNOUGHT_SPAWN_DURATION_MS {
                    npc.state = NpcState::Dreadnought(DreadnoughtState::Raid);
                }
                None
            }
            NpcState::Dreadnought(DreadnoughtState::Raid) => {
                let target = neighborhood.nearest_player()?;
                npc.set_target_player(target.id);
                let standoff = (DREADNOUGHT_STANDOFF_RANGE_MIN + DREADNOUGHT_STANDOFF_RANGE_MAX) / 2.0;
                let point = target.position.add(npc.position.sub(target.position).normalized().scale(standoff));
                npc.position = npc.position.move_toward(point, npc.speed * (ctx.dt_ms / 1000.0));
                npc.rotation = target.position.sub(npc.position).angle();

                if try_fire(npc, target.distance, ctx.now_ms, DREADNOUGHT_FIRE_COOLDOWN_MS) {
                    npc.last_fire_time_ms = ctx.now_ms;
                    Some(Action::Fire(FireAction {
                        target: ActionTarget::Player(target.id),
                        weapon_type: npc.weapon_type,
                        weapon_tier: npc.weapon_tier,
                        base_damage: npc.weapon_damage,
                        shield_piercing: DREADNOUGHT_SHIELD_PIERCING,
                        enraged: false,
                        synchronized: false,
                    }))
                } else {
                    None
                }
            }
            NpcState::Dreadnought(DreadnoughtState::Enraged) => {
                let target = neighborhood.nearest_player()?;
                npc.set_target_player(target.id);
                npc.position = npc.position.move_toward(target.position, npc.speed * DREADNOUGHT_ENRAGED_SPEED_MULT * (ctx.dt_ms / 1000.0));
                npc.rotation = target.position.sub(npc.position).angle();

                if try_fire(npc, target.distance, ctx.now_ms, DREADNOUGHT_ENRAGED_FIRE_COOLDOWN_MS) {
                    npc.last_fire_time_ms = ctx.now_ms;
                    Some(Action::Fire(FireAction {
                        target: ActionTarget::Player(target.id),
                        weapon_type: npc.weapon_type,
                        weapon_tier: npc.weapon_tier,
                        base_damage: npc.weapon_damage * DREADNOUGHT_ENRAGED_DAMAGE_MULT,
                        shield_piercing: DREADNOUGHT_SHIELD_PIERCING,
                        enraged: true,
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
        self.spawn_elapsed_ms.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::npc::NpcType;
    use crate::world::Vec2;

    #[test]
    fn enraging_is_permanent_and_raises_aggro_range() {
        let mut npc = Npc::spawn(NpcType::PirateDreadnought, Vec2::ZERO, None, Vec2::ZERO);
        npc.aggro_range = 500.0;
        DreadnoughtStrategy::enrage(&mut npc);
        assert!(matches!(npc.state, NpcState::Dreadnought(DreadnoughtState::Enraged)));
        assert!(npc.aggro_range >= DREADNOUGHT_ENRAGED_MIN_AGGRO_RANGE);
    }
}
