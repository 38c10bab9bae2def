//! Standalone harness binary: runs the AI core against a small fixed
//! galaxy on its own tick loop, logging every `EngineEvent` it emits.
//! Mirrors the teacher's `main.rs` tick-loop shape (a `tokio::time::interval`
//! with `MissedTickBehavior::Skip` driving `run_tick`), minus the
//! websocket layer — nothing outside this crate drives it yet, so there
//! is no connection to accept.

use nebula_ai::ai::hooks::StaticWorldHooks;
use nebula_ai::config::TICK_INTERVAL_MS;
use nebula_ai::world::base::{Base, BaseKind};
use nebula_ai::world::ids::PlayerId;
use nebula_ai::world::npc::{Faction, Npc, NpcType};
use nebula_ai::world::Vec2;
use nebula_ai::Engine;
use tracing::info;

fn seed_galaxy(engine: &mut Engine) {
    let pirate_base = Base::new(Faction::Pirate, BaseKind::PirateOutpost, Vec2::new(-1200.0, 0.0), 2000.0);
    let pirate_base_id = engine.insert_base(pirate_base);

    let scavenger_base = Base::new(
        Faction::Scavenger,
        BaseKind::ScavengerYard { scrap_pile: Default::default() },
        Vec2::new(1200.0, 0.0),
        1200.0,
    );
    engine.insert_base(scavenger_base);

    let mining_base = Base::new(
        Faction::RogueMiner,
        BaseKind::MiningClaim { claim_credits: 0.0, has_foreman: true },
        Vec2::new(0.0, 1200.0),
        1500.0,
    );
    engine.insert_base(mining_base);

    engine.spawn_npc(Npc::spawn(NpcType::PirateScout, Vec2::new(-1100.0, 50.0), Some(pirate_base_id), Vec2::new(-1200.0, 0.0)));
    engine.spawn_npc(Npc::spawn(NpcType::PirateFighter, Vec2::new(-1000.0, -50.0), Some(pirate_base_id), Vec2::new(-1200.0, 0.0)));
    engine.spawn_npc(Npc::spawn(NpcType::SwarmQueen, Vec2::new(0.0, -1500.0), None, Vec2::ZERO));
    engine.spawn_npc(Npc::spawn(NpcType::VoidLeviathan, Vec2::new(2500.0, 2500.0), None, Vec2::ZERO));

    engine.player_move(PlayerId(1), Vec2::new(0.0, 0.0));
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .init();

    let mut engine = Engine::new(Box::new(StaticWorldHooks::new(vec![])));
    seed_galaxy(&mut engine);

    info!("nebula-sim starting, tick interval {}ms", TICK_INTERVAL_MS);

    let mut interval = tokio::time::interval(std::time::Duration::from_millis(TICK_INTERVAL_MS));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut shutdown => {
                info!("shutdown signal received, stopping simulation");
                break;
            }
        }

        let events = engine.tick(TICK_INTERVAL_MS as f64);
        for event in events {
            info!(?event, "engine event");
        }
    }
}
