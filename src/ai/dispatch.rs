//! Strategy Dispatcher (§4.1): owns exactly one instance of every
//! strategy and routes each NPC to the right one by faction/type, with
//! a special gate for orphaned NPCs running the rage-mode fallback.
//! Each `update` call is wrapped in `catch_unwind` so one strategy
//! panicking never takes the whole tick down with it.

use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::world::ids::NpcId;
use crate::world::neighborhood::Neighborhood;
use crate::world::npc::{Npc, NpcState, NpcType};

use super::action::Action;
use super::barnacle_king::BarnacleKingStrategy;
use super::formation::FormationStrategy;
use super::leviathan::LeviathanStrategy;
use super::miner::MiningStrategy;
use super::pirate::PirateStrategy;
use super::queen::QueenStrategy;
use super::rage_mode::RageModeStrategy;
use super::retreat::RetreatStrategy;
use super::strategy::{Strategy, TickContext};
use super::swarm::SwarmStrategy;
use super::territorial::TerritorialStrategy;

/// One owned instance per strategy (§3.4): every side table a strategy
/// keeps lives here for the lifetime of the engine, keyed by `NpcId`
/// and cleaned up through `cleanup`, never walked wholesale.
#[derive(Default)]
pub struct Dispatcher {
    pub retreat: RetreatStrategy,
    pub territorial: TerritorialStrategy,
    pub formation: FormationStrategy,
    pub swarm: SwarmStrategy,
    pub mining: MiningStrategy,
    pub pirate: PirateStrategy,
    pub queen: QueenStrategy,
    pub leviathan: LeviathanStrategy,
    pub barnacle_king: BarnacleKingStrategy,
    pub rage_mode: RageModeStrategy,
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher::default()
    }

    /// Routes `npc` to its strategy and runs one `update` call. A
    /// panicking strategy is caught, logged, and treated as "did
    /// nothing this tick" rather than crashing the engine (§7).
    pub fn dispatch(&mut self, npc: &mut Npc, neighborhood: &Neighborhood, ctx: &TickContext) -> Option<Action> {
        if npc.orphaned && npc.state == NpcState::RageMode {
            return Self::run(&mut self.rage_mode, npc, neighborhood, ctx);
        }

        match npc.npc_type {
            NpcType::PirateScout
            | NpcType::PirateFighter
            | NpcType::PirateCaptain
            | NpcType::PirateDreadnought => Self::run(&mut self.pirate, npc, neighborhood, ctx),

            NpcType::SwarmQueen => Self::run(&mut self.queen, npc, neighborhood, ctx),
            NpcType::SwarmDrone | NpcType::SwarmWorker | NpcType::SwarmWarrior => {
                Self::run(&mut self.swarm, npc, neighborhood, ctx)
            }

            NpcType::VoidLeviathan => Self::run(&mut self.leviathan, npc, neighborhood, ctx),

            NpcType::Scavenger => Self::run(&mut self.retreat, npc, neighborhood, ctx),

            NpcType::RogueMinerGuard => Self::run(&mut self.territorial, npc, neighborhood, ctx),
            NpcType::BarnacleKing => Self::run(&mut self.barnacle_king, npc, neighborhood, ctx),
            NpcType::RogueMinerWorker | NpcType::RogueMinerForeman => {
                Self::run(&mut self.mining, npc, neighborhood, ctx)
            }

            // Non-boss void NPCs run the V-formation baseline (§4.5);
            // only the Leviathan gets bespoke boss behavior.
            NpcType::Void => Self::run(&mut self.formation, npc, neighborhood, ctx),
        }
    }

    fn run(strategy: &mut dyn Strategy, npc: &mut Npc, neighborhood: &Neighborhood, ctx: &TickContext) -> Option<Action> {
        match panic::catch_unwind(AssertUnwindSafe(|| strategy.update(npc, neighborhood, ctx))) {
            Ok(action) => action,
            Err(_) => {
                warn!(npc = %npc.id, "strategy panicked during update, dropping this tick's action");
                None
            }
        }
    }

    /// Fans out to every contained strategy unconditionally (§3.4):
    /// cheaper than tracking which one last owned `id`, and each
    /// strategy's `cleanup` is a no-op for ids it never saw.
    pub fn cleanup(&mut self, id: NpcId) {
        self.retreat.cleanup(id);
        self.territorial.cleanup(id);
        self.formation.cleanup(id);
        self.swarm.cleanup(id);
        self.mining.cleanup(id);
        self.pirate.cleanup(id);
        self.queen.cleanup(id);
        self.leviathan.cleanup(id);
        self.barnacle_king.cleanup(id);
        self.rage_mode.cleanup(id);
    }
}
