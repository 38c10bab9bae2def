//! Action Applier (§4.12): turns the single `Action` a strategy handed
//! back into actual mutations of the world plus the outbound
//! `EngineEvent`s a caller needs. Strategies only ever see read-only
//! `&Base`/`&[&Base]` views, so anything that touches base state (a
//! steal, a deposit, an assimilation tick) is resolved here instead —
//! see DESIGN.md for why that split exists.

use std::collections::BTreeMap;

use crate::config::DEFAULT_ASSIMILATION_THRESHOLD;
use crate::world::base::{Base, BaseKind};
use crate::world::damage::{apply_damage, apply_heal};
use crate::world::ids::{BaseId, NpcId};
use crate::world::npc::Npc;
use crate::world::player::PlayerRef;
use crate::world::Vec2;

use super::action::{Action, ActionTarget, ConsumePhase, EngineEvent, FireAction, StealAction, StealTarget};
use super::dispatch::Dispatcher;
use super::hooks::WorldHooks;
use super::swarm::propagate_linked_damage;

/// Resolves one decided `Action` and returns every `EngineEvent` it
/// produced, always led by the raw `Decided` record (§6).
#[allow(clippy::too_many_arguments)]
pub fn apply(
    action: Action,
    author: NpcId,
    all_npcs: &mut BTreeMap<NpcId, Npc>,
    all_bases: &mut BTreeMap<BaseId, Base>,
    players: &mut [PlayerRef],
    dt_ms: f64,
    dispatcher: &mut Dispatcher,
    world: &mut dyn WorldHooks,
) -> Vec<EngineEvent> {
    let mut events = vec![EngineEvent::Decided { npc: author, action: action.clone() }];

    match action {
        Action::Fire(fire) => apply_fire(author, fire, all_npcs, dispatcher, &mut events),
        Action::RogueMinerDeposited { credit_reward, .. } => {
            apply_deposit(author, credit_reward, all_npcs, all_bases, &mut events)
        }
        Action::PirateIntelBroadcast { base_id, target_pos, .. } => {
            apply_intel_broadcast(base_id, target_pos, all_npcs, world, &mut events)
        }
        Action::PirateSteal(steal) => apply_steal(author, steal, all_npcs, all_bases, &mut events),
        Action::Assimilate { drone_id, base_id } => {
            apply_assimilate(drone_id, base_id, all_npcs, all_bases, dispatcher, &mut events)
        }
        Action::VoidConsume { phase, target, heal_amount, remove_target } => {
            apply_consume(author, phase, target, heal_amount, remove_target, all_npcs, dispatcher, &mut events)
        }
        Action::VoidGravityWellTick { center, pull_strength, affected } => {
            apply_gravity_well_tick(center, pull_strength, &affected, players, dt_ms)
        }
        Action::PhaseTransitionPending { from, to } => {
            events.push(EngineEvent::QueenPhaseChanged { queen: author, from, to });
        }

        // Everything else is a pure broadcast: the strategy already
        // computed its full effect (mining progress, scout reports,
        // boost-dive telegraphs, the dreadnought's permanent enrage,
        // area-effect impacts) and `Decided` above is the only event
        // it needs (§4.12, see DESIGN.md on the web-snare/acid-burst
        // scope trim).
        _ => {}
    }

    events
}

/// §4.10: pulls every affected player toward the well's center by
/// `pull_strength * dt` this tick. Damage against players is reported
/// via the `Decided` event above, same as everywhere else a player is
/// hit — player hull/shield live outside this core.
fn apply_gravity_well_tick(
    center: Vec2,
    pull_strength: f64,
    affected: &[super::action::GravityWellPull],
    players: &mut [PlayerRef],
    dt_ms: f64,
) {
    let step = pull_strength * (dt_ms / 1000.0);
    for pull in affected {
        if let Some(player) = players.iter_mut().find(|p| p.id == pull.player) {
            player.position = player.position.move_toward(center, step);
        }
    }
}

fn apply_fire(author: NpcId, fire: FireAction, all_npcs: &mut BTreeMap<NpcId, Npc>, dispatcher: &mut Dispatcher, events: &mut Vec<EngineEvent>) {
    match fire.target {
        ActionTarget::Npc(target_id) => {
            let Some(target) = all_npcs.get_mut(&target_id) else {
                events.push(EngineEvent::ActionDropped { npc: author, reason: "fire target npc no longer exists" });
                return;
            };
            if !target.is_alive() {
                events.push(EngineEvent::ActionDropped { npc: author, reason: "fire target npc already destroyed" });
                return;
            }

            let origin_pos = target.position;
            let linked = target.linked_health;
            let result = apply_damage(target, fire.base_damage, fire.shield_piercing);
            events.push(EngineEvent::DamageApplied {
                target: fire.target,
                shield_damage: result.shield_damage,
                hull_damage: result.hull_damage,
                pierce_damage: result.pierce_damage,
            });

            if result.died {
                all_npcs.remove(&target_id);
                dispatcher.cleanup(target_id);
                events.push(EngineEvent::NpcDestroyed { npc: target_id });
            }

            if linked {
                let total_damage = result.shield_damage + result.hull_damage;
                let splashed = propagate_linked_damage(target_id, origin_pos, total_damage, all_npcs);
                for (id, amount) in splashed {
                    events.push(EngineEvent::DamageApplied {
                        target: ActionTarget::Npc(id),
                        shield_damage: 0.0,
                        hull_damage: amount,
                        pierce_damage: 0.0,
                    });
                    if all_npcs.get(&id).is_some_and(|n| !n.is_alive()) {
                        all_npcs.remove(&id);
                        dispatcher.cleanup(id);
                        events.push(EngineEvent::NpcDestroyed { npc: id });
                    }
                }
            }
        }
        ActionTarget::Player(_) => {
            // Player hull/shield live outside this core (§6); report the
            // raw hit and let the caller resolve it against its own
            // player state, same as the dreadnought block-chance path
            // in `Engine::on_player_damage`.
            let piercing = fire.shield_piercing.clamp(0.0, 1.0);
            let pierce = fire.base_damage * piercing;
            events.push(EngineEvent::DamageApplied {
                target: fire.target,
                shield_damage: fire.base_damage - pierce,
                hull_damage: pierce,
                pierce_damage: pierce,
            });
        }
        ActionTarget::Base(_) => {
            // A base has no weapon-fire interaction (§4.8 steal); the
            // scout orbits a sighted base without ever constructing a
            // Fire action against it, so this only guards a future caller.
            events.push(EngineEvent::ActionDropped { npc: author, reason: "fire cannot target a base" });
        }
    }
}

fn apply_deposit(
    author: NpcId,
    credit_reward: f64,
    all_npcs: &BTreeMap<NpcId, Npc>,
    all_bases: &mut BTreeMap<BaseId, Base>,
    events: &mut Vec<EngineEvent>,
) {
    let Some(home_id) = all_npcs.get(&author).and_then(|n| n.home_base_id) else {
        events.push(EngineEvent::ActionDropped { npc: author, reason: "depositing miner has no home base" });
        return;
    };
    let Some(base) = all_bases.get_mut(&home_id) else {
        events.push(EngineEvent::ActionDropped { npc: author, reason: "depositing miner's home base no longer exists" });
        return;
    };
    if let BaseKind::MiningClaim { claim_credits, .. } = &mut base.kind {
        *claim_credits += credit_reward;
    }
}

fn apply_intel_broadcast(
    base_id: BaseId,
    target_pos: Vec2,
    all_npcs: &mut BTreeMap<NpcId, Npc>,
    world: &mut dyn WorldHooks,
    events: &mut Vec<EngineEvent>,
) {
    if let Some(captain) = world.spawn_captain_from_intel(base_id, target_pos) {
        let captain_id = captain.id;
        all_npcs.insert(captain_id, captain);
        events.push(EngineEvent::CaptainSpawned { npc: captain_id, base: base_id });
    }
}

fn apply_steal(
    author: NpcId,
    steal: StealAction,
    all_npcs: &mut BTreeMap<NpcId, Npc>,
    all_bases: &mut BTreeMap<BaseId, Base>,
    events: &mut Vec<EngineEvent>,
) {
    match steal.target {
        StealTarget::Base(base_id) => {
            let Some(base) = all_bases.get_mut(&base_id) else {
                events.push(EngineEvent::ActionDropped { npc: author, reason: "steal target base no longer exists" });
                return;
            };
            match &mut base.kind {
                BaseKind::ScavengerYard { scrap_pile } if steal.target_type == "scrap_pile" => {
                    let take = steal.stolen_items.len().min(scrap_pile.contents.len());
                    scrap_pile.contents.drain(0..take);
                    scrap_pile.count = scrap_pile.contents.len() as u32;
                }
                BaseKind::MiningClaim { claim_credits, .. } if steal.target_type == "claim_credits" => {
                    *claim_credits = (*claim_credits - steal.stolen_amount).max(0.0);
                }
                _ => events.push(EngineEvent::ActionDropped { npc: author, reason: "steal target base no longer has anything to take" }),
            }
        }
        StealTarget::Npc(npc_id) => {
            let Some(target) = all_npcs.get_mut(&npc_id) else {
                events.push(EngineEvent::ActionDropped { npc: author, reason: "steal target npc no longer exists" });
                return;
            };
            target.carried_wreckage.clear();
        }
    }
}

fn apply_assimilate(
    drone_id: NpcId,
    base_id: BaseId,
    all_npcs: &mut BTreeMap<NpcId, Npc>,
    all_bases: &mut BTreeMap<BaseId, Base>,
    dispatcher: &mut Dispatcher,
    events: &mut Vec<EngineEvent>,
) {
    let Some(drone) = all_npcs.get_mut(&drone_id) else {
        events.push(EngineEvent::ActionDropped { npc: drone_id, reason: "assimilating drone no longer exists" });
        return;
    };
    if drone.attached_to_base {
        // Already contributed its one vote; idle passenger until the
        // base actually flips (§4.6 "frozen passenger").
        return;
    }
    drone.attached_to_base = true;

    let Some(base) = all_bases.get_mut(&base_id) else {
        events.push(EngineEvent::ActionDropped { npc: drone_id, reason: "assimilation target base no longer exists" });
        return;
    };

    if base.advance_assimilation(DEFAULT_ASSIMILATION_THRESHOLD) {
        let consumed: Vec<NpcId> = all_npcs
            .values()
            .filter(|n| n.attached_to_base && n.assimilation_target == Some(base_id))
            .map(|n| n.id)
            .collect();
        for id in &consumed {
            all_npcs.remove(id);
            dispatcher.cleanup(*id);
        }
        events.push(EngineEvent::BaseAssimilated { base: base_id, consumed_drone_ids: consumed });
    }
}

fn apply_consume(
    author: NpcId,
    phase: ConsumePhase,
    target: NpcId,
    heal_amount: Option<f64>,
    remove_target: bool,
    all_npcs: &mut BTreeMap<NpcId, Npc>,
    dispatcher: &mut Dispatcher,
    events: &mut Vec<EngineEvent>,
) {
    if phase != ConsumePhase::Dissolve {
        return;
    }

    if remove_target && all_npcs.remove(&target).is_some() {
        dispatcher.cleanup(target);
        events.push(EngineEvent::NpcDestroyed { npc: target });
    }

    if let Some(heal) = heal_amount {
        if let Some(leviathan) = all_npcs.get_mut(&author) {
            apply_heal(leviathan, heal, 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::hooks::StaticWorldHooks;
    use crate::world::base::ScrapPile;
    use crate::world::ids::PlayerId;
    use crate::world::npc::{Faction, NpcType, WeaponType};

    fn npc(npc_type: NpcType) -> Npc {
        Npc::spawn(npc_type, Vec2::ZERO, None, Vec2::ZERO)
    }

    #[test]
    fn fire_destroys_target_and_cleans_up_dispatcher_state() {
        let mut all_npcs = BTreeMap::new();
        let mut all_bases = BTreeMap::new();
        let mut dispatcher = Dispatcher::new();
        let mut world = StaticWorldHooks::new(vec![]);

        let mut target = npc(NpcType::Scavenger);
        target.hull = 1.0;
        target.shield = 0.0;
        let target_id = target.id;
        all_npcs.insert(target_id, target);

        let fire = FireAction {
            target: ActionTarget::Npc(target_id),
            weapon_type: WeaponType::Laser,
            weapon_tier: 1,
            base_damage: 50.0,
            shield_piercing: 0.0,
            enraged: false,
            synchronized: false,
        };
        let events = apply(Action::Fire(fire), NpcId(1), &mut all_npcs, &mut all_bases, &mut [], 50.0, &mut dispatcher, &mut world);
        assert!(!all_npcs.contains_key(&target_id));
        assert!(events.iter().any(|e| matches!(e, EngineEvent::NpcDestroyed { npc } if *npc == target_id)));
    }

    #[test]
    fn steal_drains_scrap_pile_contents() {
        let mut all_npcs = BTreeMap::new();
        let mut all_bases = BTreeMap::new();
        let mut dispatcher = Dispatcher::new();
        let mut world = StaticWorldHooks::new(vec![]);

        let base = Base::new(
            Faction::Scavenger,
            BaseKind::ScavengerYard { scrap_pile: ScrapPile { count: 2, contents: vec!["plating".into(), "core".into()] } },
            Vec2::ZERO,
            500.0,
        );
        let base_id = base.id;
        all_bases.insert(base_id, base);

        let steal = StealAction {
            target: StealTarget::Base(base_id),
            target_type: "scrap_pile",
            stolen_amount: 2.0,
            stolen_items: vec!["plating".into(), "core".into()],
        };
        apply(Action::PirateSteal(steal), NpcId(1), &mut all_npcs, &mut all_bases, &mut [], 50.0, &mut dispatcher, &mut world);
        match &all_bases[&base_id].kind {
            BaseKind::ScavengerYard { scrap_pile } => assert!(scrap_pile.contents.is_empty()),
            _ => panic!("expected a scavenger yard"),
        }
    }

    #[test]
    fn assimilation_consumes_attached_drones_once_threshold_is_reached() {
        let mut all_npcs = BTreeMap::new();
        let mut all_bases = BTreeMap::new();
        let mut dispatcher = Dispatcher::new();
        let mut world = StaticWorldHooks::new(vec![]);

        let base = Base::new(Faction::Scavenger, BaseKind::PirateOutpost, Vec2::ZERO, 500.0);
        let base_id = base.id;
        all_bases.insert(base_id, base);

        let mut drone_ids = Vec::new();
        for _ in 0..DEFAULT_ASSIMILATION_THRESHOLD {
            let mut drone = npc(NpcType::SwarmDrone);
            drone.assimilation_target = Some(base_id);
            drone_ids.push(drone.id);
            all_npcs.insert(drone.id, drone);
        }

        for (i, &drone_id) in drone_ids.iter().enumerate() {
            let events = apply(
                Action::Assimilate { drone_id, base_id },
                drone_id,
                &mut all_npcs,
                &mut all_bases,
                &mut [],
                50.0,
                &mut dispatcher,
                &mut world,
            );
            let flipped = events.iter().any(|e| matches!(e, EngineEvent::BaseAssimilated { .. }));
            assert_eq!(flipped, i as u32 + 1 == DEFAULT_ASSIMILATION_THRESHOLD);
        }

        assert!(all_npcs.is_empty());
        assert_eq!(all_bases[&base_id].faction, Faction::Swarm);
    }

    #[test]
    fn dead_fire_target_does_not_panic_and_reports_dropped() {
        let mut all_npcs = BTreeMap::new();
        let mut all_bases = BTreeMap::new();
        let mut dispatcher = Dispatcher::new();
        let mut world = StaticWorldHooks::new(vec![]);

        let fire = FireAction {
            target: ActionTarget::Npc(NpcId(9999)),
            weapon_type: WeaponType::Laser,
            weapon_tier: 1,
            base_damage: 10.0,
            shield_piercing: 0.0,
            enraged: false,
            synchronized: false,
        };
        let events = apply(Action::Fire(fire), NpcId(1), &mut all_npcs, &mut all_bases, &mut [], 50.0, &mut dispatcher, &mut world);
        assert!(events.iter().any(|e| matches!(e, EngineEvent::ActionDropped { .. })));
    }

    #[test]
    fn fire_at_player_reports_damage_without_mutating_local_state() {
        let mut all_npcs = BTreeMap::new();
        let mut all_bases = BTreeMap::new();
        let mut dispatcher = Dispatcher::new();
        let mut world = StaticWorldHooks::new(vec![]);

        let fire = FireAction {
            target: ActionTarget::Player(PlayerId(1)),
            weapon_type: WeaponType::Railgun,
            weapon_tier: 1,
            base_damage: 20.0,
            shield_piercing: 0.25,
            enraged: false,
            synchronized: false,
        };
        let events = apply(Action::Fire(fire), NpcId(1), &mut all_npcs, &mut all_bases, &mut [], 50.0, &mut dispatcher, &mut world);
        match events.iter().find(|e| matches!(e, EngineEvent::DamageApplied { .. })) {
            Some(EngineEvent::DamageApplied { pierce_damage, .. }) => assert_eq!(*pierce_damage, 5.0),
            _ => panic!("expected a damage-applied event"),
        }
    }

    #[test]
    fn gravity_well_tick_pulls_affected_players_toward_center() {
        use super::super::action::GravityWellPull;

        let mut all_npcs = BTreeMap::new();
        let mut all_bases = BTreeMap::new();
        let mut dispatcher = Dispatcher::new();
        let mut world = StaticWorldHooks::new(vec![]);
        let mut players = vec![PlayerRef::new(PlayerId(1), Vec2::new(100.0, 0.0))];

        let action = Action::VoidGravityWellTick {
            center: Vec2::ZERO,
            pull_strength: 80.0,
            affected: vec![GravityWellPull { player: PlayerId(1), distance: 100.0, damage: 5.0 }],
        };
        apply(action, NpcId(1), &mut all_npcs, &mut all_bases, &mut players, 500.0, &mut dispatcher, &mut world);

        assert_eq!(players[0].position, Vec2::new(60.0, 0.0));
    }
}
