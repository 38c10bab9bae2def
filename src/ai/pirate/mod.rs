//! Pirate strategy (§4.8): a second-level dispatcher keyed by
//! `npc.type`, fanning out to the four pirate roles. Intel is shared
//! across captains and fighters of the same base, so it lives here
//! rather than in any one role's side table.

pub mod captain;
pub mod dreadnought;
pub mod fighter;
pub mod intel;
pub mod scout;
pub mod steal;

use crate::world::ids::NpcId;
use crate::world::neighborhood::Neighborhood;
use crate::world::npc::{Npc, NpcType};

use super::action::Action;
use super::flanking::FlankingStrategy;
use super::strategy::{Strategy, TickContext};

pub use captain::CaptainStrategy;
pub use dreadnought::DreadnoughtStrategy;
pub use fighter::FighterStrategy;
pub use intel::IntelStore;
pub use scout::ScoutStrategy;

#[derive(Default)]
pub struct PirateStrategy {
    scout: ScoutStrategy,
    fighter: FighterStrategy,
    captain: CaptainStrategy,
    dreadnought: DreadnoughtStrategy,
    intel: IntelStore,
    /// Baseline/fallback (§4.2) for any pirate NPC type that doesn't
    /// match one of the four named roles above.
    flanking: FlankingStrategy,
}

impl PirateStrategy {
    pub fn new() -> Self {
        PirateStrategy::default()
    }

    /// Exposed so the engine's base-destruction cross-cutting pass can
    /// flip a dreadnought permanently enraged without going through a
    /// normal `update` call (§4.8).
    pub fn enrage_dreadnought(npc: &mut Npc) {
        DreadnoughtStrategy::enrage(npc);
    }

    pub fn clear_base_intel(&mut self, base_id: crate::world::ids::BaseId) {
        self.intel.clear_base(base_id);
    }
}

impl Strategy for PirateStrategy {
    fn update(&mut self, npc: &mut Npc, neighborhood: &Neighborhood, ctx: &TickContext) -> Option<Action> {
        match npc.npc_type {
            NpcType::PirateScout => self.scout.update(npc, neighborhood, ctx, &mut self.intel),
            NpcType::PirateFighter => self.fighter.update(npc, neighborhood, ctx),
            NpcType::PirateCaptain => self.captain.update(npc, neighborhood, ctx, &mut self.intel),
            NpcType::PirateDreadnought => self.dreadnought.update(npc, neighborhood, ctx),
            _ => self.flanking.update(npc, neighborhood, ctx),
        }
    }

    fn cleanup(&mut self, id: NpcId) {
        self.scout.cleanup(id);
        self.fighter.cleanup(id);
        self.captain.cleanup(id);
        self.dreadnought.cleanup(id);
        self.flanking.cleanup(id);
    }
}
