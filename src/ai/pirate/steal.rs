//! Shared stealing logic (§4.8-steal), used by both captains and
//! fighters. Per-NPC cooldown bookkeeping stays with the caller; this
//! only decides whether a steal is available right now and what it
//! would take.

use crate::config::{STEAL_CLAIM_FRACTION, STEAL_COOLDOWN_MS, STEAL_RANGE, STEAL_SCRAP_ITEMS_MAX};
use crate::world::base::BaseKind;
use crate::world::neighborhood::Neighborhood;
use crate::world::npc::Npc;

use super::super::action::{Action, StealAction, StealTarget};
use super::super::strategy::TickContext;

pub fn try_steal(npc: &Npc, ctx: &TickContext, neighborhood: &Neighborhood, last_steal_ms: f64) -> Option<Action> {
    if ctx.now_ms - last_steal_ms <= STEAL_COOLDOWN_MS {
        return None;
    }

    if let Some(base) = ctx
        .nearby_bases
        .iter()
        .find(|b| !b.destroyed && b.position.distance(npc.position) <= STEAL_RANGE)
    {
        match &base.kind {
            BaseKind::ScavengerYard { scrap_pile } if !scrap_pile.contents.is_empty() => {
                let items: Vec<String> = scrap_pile.contents.iter().take(STEAL_SCRAP_ITEMS_MAX).cloned().collect();
                return Some(Action::PirateSteal(StealAction {
                    target: StealTarget::Base(base.id),
                    target_type: "scrap_pile",
                    stolen_amount: items.len() as f64,
                    stolen_items: items,
                }));
            }
            BaseKind::MiningClaim { claim_credits, .. } if *claim_credits > 0.0 => {
                let amount = (claim_credits * STEAL_CLAIM_FRACTION).floor();
                if amount > 0.0 {
                    return Some(Action::PirateSteal(StealAction {
                        target: StealTarget::Base(base.id),
                        target_type: "claim_credits",
                        stolen_amount: amount,
                        stolen_items: Vec::new(),
                    }));
                }
            }
            _ => {}
        }
    }

    let wrecked = neighborhood
        .hostiles
        .iter()
        .filter(|h| h.distance <= STEAL_RANGE)
        .find_map(|h| ctx.all_npcs.get(&h.id).filter(|n| !n.carried_wreckage.is_empty()));

    wrecked.map(|target_npc| {
        Action::PirateSteal(StealAction {
            target: StealTarget::Npc(target_npc.id),
            target_type: "carried_wreckage",
            stolen_amount: target_npc.carried_wreckage.len() as f64,
            stolen_items: target_npc.carried_wreckage.clone(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::hooks::StaticWorldHooks;
    use crate::world::base::{Base, ScrapPile};
    use crate::world::neighborhood::NeighborhoodScratch;
    use crate::world::npc::{Faction, NpcType};
    use crate::world::Vec2;
    use std::collections::BTreeMap;

    #[test]
    fn steal_respects_cooldown() {
        let npc = Npc::spawn(NpcType::PirateFighter, Vec2::ZERO, None, Vec2::ZERO);
        let base = Base::new(
            Faction::Scavenger,
            BaseKind::ScavengerYard { scrap_pile: ScrapPile { count: 1, contents: vec!["plating".into()] } },
            Vec2::ZERO,
            500.0,
        );
        let world = StaticWorldHooks::new(vec![]);
        let all_npcs = BTreeMap::new();
        let mut scratch = NeighborhoodScratch::new();
        let nb = scratch.build_for(&npc, &all_npcs, &[]);
        let nearby_bases = [&base];
        let ctx = TickContext {
            now_ms: 100.0,
            dt_ms: 50.0,
            home_base: None,
            territory_radius: 500.0,
            patrol_radius: 500.0,
            has_foreman: false,
            nearby_bases: &nearby_bases,
            all_npcs: &all_npcs,
            world: &world,
        };
        assert!(try_steal(&npc, &ctx, &nb, 0.0).is_none());
        assert!(try_steal(&npc, &ctx, &nb, -1_000_000.0).is_some());
    }
}
