//! Barnacle King boss (supplemental, see DESIGN.md): the rogue-miner
//! territorial routine scaled up to planetary size, plus a calcify AOE
//! special that has no counterpart in the baseline guard.

use std::collections::HashMap;

use crate::config::{
    BARNACLE_KING_CALCIFY_COOLDOWN_MS, BARNACLE_KING_CALCIFY_DURATION_MS, BARNACLE_KING_CALCIFY_RADIUS,
    BARNACLE_KING_DAMAGE_MULT, BARNACLE_KING_TERRITORY_RADIUS_MULT,
};
use crate::world::ids::{NpcId, PlayerId};
use crate::world::neighborhood::Neighborhood;
use crate::world::npc::Npc;

use super::action::Action;
use super::strategy::{Strategy, TickContext};
use super::territorial::{territorial_tick, WarningEntry};

#[derive(Default)]
pub struct BarnacleKingStrategy {
    warnings: HashMap<NpcId, HashMap<PlayerId, WarningEntry>>,
    last_calcify_ms: HashMap<NpcId, f64>,
}

impl BarnacleKingStrategy {
    pub fn new() -> Self {
        BarnacleKingStrategy::default()
    }
}

impl Strategy for BarnacleKingStrategy {
    fn update(&mut self, npc: &mut Npc, neighborhood: &Neighborhood, ctx: &TickContext) -> Option<Action> {
        let last_calcify = self.last_calcify_ms.entry(npc.id).or_insert(f64::NEG_INFINITY);
        if ctx.now_ms - *last_calcify >= BARNACLE_KING_CALCIFY_COOLDOWN_MS
            && neighborhood
                .players
                .iter()
                .any(|p| p.distance <= ctx.territory_radius * BARNACLE_KING_TERRITORY_RADIUS_MULT)
        {
            *last_calcify = ctx.now_ms;
            return Some(Action::BarnacleKingCalcify {
                center: npc.position,
                radius: BARNACLE_KING_CALCIFY_RADIUS,
                duration_ms: BARNACLE_KING_CALCIFY_DURATION_MS,
            });
        }

        let warnings = self.warnings.entry(npc.id).or_default();
        territorial_tick(npc, neighborhood, ctx, warnings, BARNACLE_KING_TERRITORY_RADIUS_MULT, BARNACLE_KING_DAMAGE_MULT)
    }

    fn cleanup(&mut self, id: NpcId) {
        self.warnings.remove(&id);
        self.last_calcify_ms.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::hooks::StaticWorldHooks;
    use crate::world::neighborhood::NeighborhoodScratch;
    use crate::world::npc::NpcType;
    use crate::world::player::PlayerRef;
    use crate::world::Vec2;
    use std::collections::BTreeMap;

    #[test]
    fn calcifies_once_per_cooldown_when_players_are_in_territory() {
        let mut npc = Npc::spawn(NpcType::BarnacleKing, Vec2::ZERO, None, Vec2::ZERO);
        let world = StaticWorldHooks::new(vec![]);
        let all_npcs = BTreeMap::new();
        let players = [PlayerRef::new(PlayerId(1), Vec2::new(50.0, 0.0))];
        let mut scratch = NeighborhoodScratch::new();
        let mut strat = BarnacleKingStrategy::new();
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
        let nb = scratch.build_for(&npc, &all_npcs, &players);
        let action = strat.update(&mut npc, &nb, &ctx);
        assert!(matches!(action, Some(Action::BarnacleKingCalcify { .. })));

        let nb = scratch.build_for(&npc, &all_npcs, &players);
        let ctx2 = TickContext {
            now_ms: 100.0,
            dt_ms: 50.0,
            home_base: None,
            territory_radius: 500.0,
            patrol_radius: 500.0,
            has_foreman: false,
            nearby_bases: &[],
            all_npcs: &all_npcs,
            world: &world,
        };
        let action2 = strat.update(&mut npc, &nb, &ctx2);
        assert!(!matches!(action2, Some(Action::BarnacleKingCalcify { .. })));
    }
}
