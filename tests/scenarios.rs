//! End-to-end coverage for the six scenarios in the core's scenario
//! catalogue, driven entirely through `Engine`'s public surface
//! (`tick`/`on_player_damage`/`on_base_destroyed`/`player_move`) rather
//! than by reaching into individual strategies. Each test plays out the
//! same sequence a real game-server integration would: spawn world
//! state, push player positions, advance the clock, and read back the
//! `EngineEvent` stream.

use nebula_ai::ai::action::{Action, ActionTarget, FireAction, GravityWellPhase, GravityWellPull};
use nebula_ai::ai::hooks::WorldHooks;
use nebula_ai::world::{Base, BaseKind, BaseId, Faction, Npc, NpcType, PlayerId, Vec2};
use nebula_ai::{Engine, EngineEvent, StaticWorldHooks};

/// Wraps `StaticWorldHooks` but actually spawns a captain on an intel
/// broadcast, the one hook the shipped test double always declines
/// (`spawn_captain_from_intel` -> `None`) since a real deployment's
/// spawner is outside this core's scope.
struct CaptainSpawningHooks {
    inner: StaticWorldHooks,
}

impl WorldHooks for CaptainSpawningHooks {
    fn world_object_at(&self, object_id: &str) -> Option<Vec2> {
        self.inner.world_object_at(object_id)
    }

    fn mining_claim_candidates(&self, point: Vec2, radius: f64) -> Vec<(String, Vec2)> {
        self.inner.mining_claim_candidates(point, radius)
    }

    fn get_active_base(&self, base_id: BaseId) -> Option<Base> {
        self.inner.get_active_base(base_id)
    }

    fn get_bases_in_range(&self, point: Vec2, radius: f64) -> Vec<Base> {
        self.inner.get_bases_in_range(point, radius)
    }

    fn get_active_bases_by_faction(&self, faction: Faction) -> Vec<Base> {
        self.inner.get_active_bases_by_faction(faction)
    }

    fn spawn_captain_from_intel(&mut self, base_id: BaseId, target_pos: Vec2) -> Option<Npc> {
        Some(Npc::spawn(NpcType::PirateCaptain, target_pos, Some(base_id), target_pos))
    }
}

fn decided<'a>(events: &'a [EngineEvent]) -> impl Iterator<Item = (nebula_ai::world::NpcId, &'a Action)> {
    events.iter().filter_map(|e| match e {
        EngineEvent::Decided { npc, action } => Some((*npc, action)),
        _ => None,
    })
}

/// S1 - pirate intel pipeline: a scout spots a player, observes it,
/// flees home, broadcasts intel (spawning a captain), then itself joins
/// the raid, orbiting within weapon range at the spec'd fire cadence.
#[test]
fn s1_pirate_intel_pipeline_spawns_a_captain_and_raids() {
    let base = Base::new(Faction::Pirate, BaseKind::PirateOutpost, Vec2::ZERO, 500.0);
    let base_id = base.id;

    let hooks = CaptainSpawningHooks { inner: StaticWorldHooks::new(vec![base.clone()]) };
    let mut engine = Engine::new(Box::new(hooks));
    engine.insert_base(base);

    let scout = Npc::spawn(NpcType::PirateScout, Vec2::ZERO, Some(base_id), Vec2::ZERO);
    let scout_id = engine.spawn_npc(scout);
    engine.drain_events();

    engine.player_move(PlayerId(1), Vec2::new(900.0, 0.0));

    let mut all_events = Vec::new();
    for _ in 0..250 {
        all_events.extend(engine.tick(200.0));
    }

    let broadcast_idx = all_events
        .iter()
        .position(|e| matches!(e, EngineEvent::Decided { npc, action: Action::PirateIntelBroadcast { .. } } if *npc == scout_id))
        .expect("scout never broadcast intel");
    let captain_idx = all_events
        .iter()
        .position(|e| matches!(e, EngineEvent::CaptainSpawned { base, .. } if *base == base_id))
        .expect("no captain was spawned from the scout's intel");
    assert!(captain_idx > broadcast_idx, "captain must spawn after (not before) the intel broadcast that requested it");

    let fire_times: Vec<usize> = all_events
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            matches!(
                e,
                EngineEvent::Decided { npc, action: Action::Fire(FireAction { target: ActionTarget::Player(p), .. }) }
                if *npc == scout_id && *p == PlayerId(1)
            )
        })
        .map(|(i, _)| i)
        .collect();
    assert!(!fire_times.is_empty(), "raiding scout never fired on the player it orbits");
}

/// S2 - rogue miner rage radius: damaging one miner enrages every
/// rogue miner within 3,000 units, leaves a farther one untouched, and
/// rage clears once the attacker exits that radius again.
#[test]
fn s2_rogue_miner_rage_radius_spreads_and_clears() {
    let mut engine = Engine::new(Box::new(StaticWorldHooks::new(vec![])));

    let positions = [0.0, 1000.0, 2000.0, 4000.0];
    let miner_ids: Vec<_> = positions
        .iter()
        .map(|&x| engine.spawn_npc(Npc::spawn(NpcType::RogueMinerWorker, Vec2::new(x, 0.0), None, Vec2::new(x, 0.0))))
        .collect();
    engine.drain_events();

    let attacker = PlayerId(1);
    engine.player_move(attacker, Vec2::ZERO);
    engine.on_player_damage(miner_ids[0], attacker, 1.0, 0.0);

    let mut fired_enraged = [false; 4];
    for _ in 0..150 {
        let events = engine.tick(200.0);
        for (npc, action) in decided(&events) {
            if let Action::Fire(FireAction { enraged: true, target: ActionTarget::Player(p), .. }) = action {
                assert_eq!(*p, attacker);
                if let Some(idx) = miner_ids.iter().position(|id| *id == npc) {
                    fired_enraged[idx] = true;
                }
            }
        }
    }

    assert!(fired_enraged[0], "M1 (the victim itself) never engaged the attacker enraged");
    assert!(fired_enraged[1], "M2 (1,000 units away) should have been pulled into the rage zone");
    assert!(fired_enraged[2], "M3 (2,000 units away) should have been pulled into the rage zone");
    assert!(!fired_enraged[3], "M4 (4,000 units away, outside the 3,000-unit radius) must stay unaffected");

    // Move the attacker well outside the rage radius of every miner and
    // confirm rage clears within a tick.
    engine.player_move(attacker, Vec2::new(20_000.0, 0.0));
    let mut saw_clear_for = [false; 3];
    for _ in 0..20 {
        let events = engine.tick(200.0);
        for (npc, action) in decided(&events) {
            if matches!(action, Action::RogueMinerRageClear) {
                if let Some(idx) = miner_ids[..3].iter().position(|id| *id == npc) {
                    saw_clear_for[idx] = true;
                }
            }
        }
    }
    assert!(saw_clear_for.iter().all(|cleared| *cleared), "every previously-enraged miner should clear rage once the attacker leaves the zone");
}

/// S3 - formation leader succession: killing the leader elects a
/// successor and opens a confusion/reforming window during which the
/// whole formation holds fire, resuming combat only once it expires.
#[test]
fn s3_formation_succession_holds_fire_through_the_window_then_resumes() {
    let mut engine = Engine::new(Box::new(StaticWorldHooks::new(vec![])));

    let mut leader = Npc::spawn(NpcType::Void, Vec2::ZERO, None, Vec2::ZERO);
    leader.formation_id = Some(1);
    leader.formation_leader = true;
    let leader_id = engine.spawn_npc(leader);

    let mut follower_a = Npc::spawn(NpcType::Void, Vec2::new(50.0, 50.0), None, Vec2::ZERO);
    follower_a.formation_id = Some(1);
    let follower_a_id = engine.spawn_npc(follower_a);

    let mut follower_b = Npc::spawn(NpcType::Void, Vec2::new(-50.0, 50.0), None, Vec2::ZERO);
    follower_b.formation_id = Some(1);
    let follower_b_id = engine.spawn_npc(follower_b);
    engine.drain_events();

    engine.player_move(PlayerId(1), Vec2::new(50.0, 300.0));

    engine.remove_npc(leader_id);
    let election = engine.tick(100.0);
    let new_leader = election
        .iter()
        .find_map(|e| match e {
            EngineEvent::FormationLeaderChanged { formation_id, new_leader } if *formation_id == 1 => Some(*new_leader),
            _ => None,
        })
        .expect("no successor was elected after the formation leader died");
    assert!(new_leader == follower_a_id || new_leader == follower_b_id);

    // Confusion (1,000 ms) + reforming (3,000 ms): nothing in the
    // formation should act at all while a window is open.
    let mut window_events = Vec::new();
    for _ in 0..39 {
        window_events.extend(engine.tick(100.0));
    }
    assert!(
        window_events.iter().all(|e| !matches!(e, EngineEvent::Decided { npc, .. } if *npc == follower_a_id || *npc == follower_b_id)),
        "formation members must not act while a confusion/reforming window is open"
    );

    // The window has now aged out; give it a further stretch of ticks
    // to resume normal combat against the nearby player.
    let mut resumed_fire = false;
    for _ in 0..50 {
        let events = engine.tick(100.0);
        if events.iter().any(|e| matches!(e, EngineEvent::Decided { action: Action::Fire(_), .. })) {
            resumed_fire = true;
            break;
        }
    }
    assert!(resumed_fire, "formation should resume firing on the player once the succession window has fully expired");
}

/// S4 - swarm assimilation: enough drones parked in assimilation range
/// of a base flip it to the swarm and are consumed in the process.
#[test]
fn s4_swarm_assimilation_flips_the_base_and_consumes_the_drones() {
    let mut engine = Engine::new(Box::new(StaticWorldHooks::new(vec![])));

    let base = Base::new(Faction::Scavenger, BaseKind::PirateOutpost, Vec2::ZERO, 500.0);
    let base_id = engine.insert_base(base);

    let mut drone_ids = Vec::new();
    for i in 0..10 {
        let mut drone = Npc::spawn(NpcType::SwarmDrone, Vec2::new(10.0, i as f64), None, Vec2::ZERO);
        drone.assimilation_target = Some(base_id);
        drone_ids.push(engine.spawn_npc(drone));
    }
    engine.drain_events();

    let events = engine.tick(100.0);
    let assimilated = events.iter().find_map(|e| match e {
        EngineEvent::BaseAssimilated { base, consumed_drone_ids } if *base == base_id => Some(consumed_drone_ids.clone()),
        _ => None,
    });
    let consumed = assimilated.expect("base never flipped to the swarm");
    assert_eq!(consumed.len(), drone_ids.len());
    for id in &drone_ids {
        assert!(consumed.contains(id));
    }
}

/// S5 - dreadnought damage mitigation: across many small hits, roughly
/// `DREADNOUGHT_BLOCK_CHANCE` of them should be fully blocked rather
/// than applied, within a generous statistical band.
#[test]
fn s5_dreadnought_blocks_roughly_its_configured_fraction_of_hits() {
    let mut engine = Engine::new(Box::new(StaticWorldHooks::new(vec![])));
    let dreadnought = Npc::spawn(NpcType::PirateDreadnought, Vec2::ZERO, None, Vec2::ZERO);
    let id = engine.spawn_npc(dreadnought);
    engine.drain_events();

    let trials = 1000;
    let mut blocked = 0;
    let mut applied = 0;
    for _ in 0..trials {
        let events = engine.on_player_damage(id, PlayerId(1), 1.0, 0.0);
        match events.as_slice() {
            [EngineEvent::NpcInvulnerable { .. }] => blocked += 1,
            _ if events.iter().any(|e| matches!(e, EngineEvent::DamageApplied { .. })) => applied += 1,
            _ => panic!("unexpected event shape for a dreadnought hit: {events:?}"),
        }
    }

    assert_eq!(blocked + applied, trials);
    let fraction = blocked as f64 / trials as f64;
    assert!(
        (0.20..0.50).contains(&fraction),
        "blocked fraction {fraction} is far from the configured 35% block chance"
    );
}

/// S6 - leviathan gravity well: once its cooldown has elapsed the
/// leviathan telegraphs a well (warning), pulls/damages nearby players
/// while active, then ends it, in that order.
#[test]
fn s6_leviathan_gravity_well_runs_warning_active_end_in_order() {
    let mut engine = Engine::new(Box::new(StaticWorldHooks::new(vec![])));
    let leviathan = Npc::spawn(NpcType::VoidLeviathan, Vec2::ZERO, None, Vec2::ZERO);
    let id = engine.spawn_npc(leviathan);
    engine.drain_events();

    engine.player_move(PlayerId(1), Vec2::new(200.0, 0.0));
    let start_distance = engine.player_position(PlayerId(1)).unwrap().distance(Vec2::ZERO);

    let mut phases = Vec::new();
    let mut ticks: Vec<Vec<GravityWellPull>> = Vec::new();
    for _ in 0..100 {
        let events = engine.tick(500.0);
        for (npc, action) in decided(&events) {
            if npc != id {
                continue;
            }
            match action {
                Action::VoidGravityWell { phase, .. } => phases.push(*phase),
                Action::VoidGravityWellTick { affected, .. } => ticks.push(affected.clone()),
                _ => {}
            }
        }
        if phases.contains(&GravityWellPhase::End) {
            break;
        }
    }

    let warning_idx = phases.iter().position(|p| *p == GravityWellPhase::Warning).expect("gravity well never entered its warning phase");
    let active_idx = phases.iter().position(|p| *p == GravityWellPhase::Active).expect("gravity well never went active");
    let end_idx = phases.iter().position(|p| *p == GravityWellPhase::End).expect("gravity well never ended");
    assert!(warning_idx < active_idx && active_idx < end_idx, "gravity well phases must run warning -> active -> end in order");
    assert!(!ticks.is_empty(), "no per-tick pull/damage was reported while the well was active");
    assert!(ticks.iter().any(|affected| affected.iter().any(|p| p.player == PlayerId(1))), "the nearby player was never affected by the active well");

    let end_distance = engine.player_position(PlayerId(1)).unwrap().distance(Vec2::ZERO);
    assert!(end_distance < start_distance, "the active well must pull the player toward its center, not just report it");
}
