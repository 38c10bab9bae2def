//! The tick engine (§6): owns every NPC, base, and player the AI core
//! knows about, runs the Dispatcher/Applier pair once per NPC per tick,
//! and exposes the handful of inbound calls a surrounding game server
//! drives it with (`tick`, `on_player_damage`, `on_base_destroyed`,
//! `spawn_npc`, `remove_npc`, `player_move`).

use std::collections::BTreeMap;

use rand::Rng;
use tracing::debug;

use crate::ai::action::{Action, ActionTarget, EngineEvent};
use crate::ai::hooks::WorldHooks;
use crate::ai::pirate::PirateStrategy;
use crate::ai::swarm::propagate_linked_damage;
use crate::ai::{applier, Dispatcher, TickContext};
use crate::config::{DREADNOUGHT_BLOCK_CHANCE, RETREAT_PATROL_RADIUS, TERRITORY_RADIUS_DEFAULT};
use crate::world::base::{Base, BaseKind};
use crate::world::damage::apply_damage;
use crate::world::ids::{BaseId, NpcId, PlayerId};
use crate::world::npc::{Faction, Npc, NpcState, NpcType};
use crate::world::neighborhood::NeighborhoodScratch;
use crate::world::player::PlayerRef;

/// Everything the AI core is authoritative over: NPCs, bases, and the
/// player positions pushed in from outside (§6). Player hull/shield
/// stay with the surrounding game server; this engine only ever reports
/// damage against a player, never applies it.
pub struct Engine {
    now_ms: f64,
    all_npcs: BTreeMap<NpcId, Npc>,
    all_bases: BTreeMap<BaseId, Base>,
    players: Vec<PlayerRef>,
    dispatcher: Dispatcher,
    scratch: NeighborhoodScratch,
    world: Box<dyn WorldHooks>,
    events: Vec<EngineEvent>,
}

impl Engine {
    pub fn new(world: Box<dyn WorldHooks>) -> Self {
        Engine {
            now_ms: 0.0,
            all_npcs: BTreeMap::new(),
            all_bases: BTreeMap::new(),
            players: Vec::new(),
            dispatcher: Dispatcher::new(),
            scratch: NeighborhoodScratch::new(),
            world,
            events: Vec::new(),
        }
    }

    pub fn spawn_npc(&mut self, npc: Npc) -> NpcId {
        let id = npc.id;
        if npc.npc_type == NpcType::BarnacleKing {
            self.events.push(EngineEvent::BarnacleKingSpawn { npc: id });
        }
        self.all_npcs.insert(id, npc);
        id
    }

    pub fn remove_npc(&mut self, id: NpcId) {
        self.all_npcs.remove(&id);
        self.dispatcher.cleanup(id);
    }

    pub fn insert_base(&mut self, base: Base) -> BaseId {
        let id = base.id;
        self.all_bases.insert(id, base);
        id
    }

    pub fn player_move(&mut self, id: PlayerId, position: crate::world::Vec2) {
        match self.players.iter_mut().find(|p| p.id == id) {
            Some(p) => p.position = position,
            None => self.players.push(PlayerRef::new(id, position)),
        }
    }

    pub fn remove_player(&mut self, id: PlayerId) {
        self.players.retain(|p| p.id != id);
    }

    pub fn player_position(&self, id: PlayerId) -> Option<crate::world::Vec2> {
        self.players.iter().find(|p| p.id == id).map(|p| p.position)
    }

    /// Runs one tick: every living NPC gets a `Dispatcher::dispatch`
    /// call in sorted-`NpcId` order, and whatever `Action` it returns is
    /// applied immediately (so a later NPC in the same tick already
    /// sees the consequences of an earlier one's decision), followed by
    /// the single cross-cutting pass formation succession needs.
    pub fn tick(&mut self, dt_ms: f64) -> Vec<EngineEvent> {
        self.now_ms += dt_ms;

        let ids: Vec<NpcId> = self.all_npcs.keys().copied().collect();
        for id in ids {
            let Some(mut npc) = self.all_npcs.remove(&id) else { continue };
            if !npc.is_alive() {
                continue;
            }

            let home_base = npc.home_base_id.and_then(|bid| self.all_bases.get(&bid));
            let has_foreman = home_base
                .is_some_and(|b| matches!(b.kind, BaseKind::MiningClaim { has_foreman: true, .. }));
            let nearby_bases: Vec<&Base> = self.all_bases.values().filter(|b| !b.destroyed).collect();
            let neighborhood = self.scratch.build_for(&npc, &self.all_npcs, &self.players);

            let ctx = TickContext {
                now_ms: self.now_ms,
                dt_ms,
                home_base,
                territory_radius: TERRITORY_RADIUS_DEFAULT,
                patrol_radius: RETREAT_PATROL_RADIUS,
                has_foreman,
                nearby_bases: &nearby_bases,
                all_npcs: &self.all_npcs,
                world: self.world.as_ref(),
            };

            let action = self.dispatcher.dispatch(&mut npc, &neighborhood, &ctx);
            self.all_npcs.insert(id, npc);

            if let Some(action) = action {
                let events = applier::apply(
                    action,
                    id,
                    &mut self.all_npcs,
                    &mut self.all_bases,
                    &mut self.players,
                    dt_ms,
                    &mut self.dispatcher,
                    self.world.as_mut(),
                );
                self.events.extend(events);
            }
        }

        let formation_events = self.dispatcher.formation.age_and_elect(&mut self.all_npcs, self.now_ms);
        self.events.extend(formation_events);

        self.drain_events()
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Resolves player-sourced damage against an NPC (§4.8, §4.12): the
    /// dreadnought's 35% incoming-hit block chance lives here, not in
    /// the applier, since it only ever fires on player-sourced hits.
    pub fn on_player_damage(
        &mut self,
        npc_id: NpcId,
        attacker: PlayerId,
        amount: f64,
        shield_piercing: f64,
    ) -> Vec<EngineEvent> {
        let mut events = Vec::new();

        let (result, faction, position, linked) = {
            let Some(npc) = self.all_npcs.get_mut(&npc_id) else {
                events.push(EngineEvent::ActionDropped { npc: npc_id, reason: "damage target npc no longer exists" });
                return events;
            };
            if !npc.is_alive() {
                events.push(EngineEvent::ActionDropped { npc: npc_id, reason: "damage target npc already destroyed" });
                return events;
            }

            if matches!(npc.state, NpcState::Dreadnought(_))
                && rand::thread_rng().gen_bool(DREADNOUGHT_BLOCK_CHANCE)
            {
                events.push(EngineEvent::NpcInvulnerable { source: attacker });
                return events;
            }

            let result = apply_damage(npc, amount, shield_piercing);
            (result, npc.faction, npc.position, npc.linked_health)
        };

        events.push(EngineEvent::DamageApplied {
            target: ActionTarget::Npc(npc_id),
            shield_damage: result.shield_damage,
            hull_damage: result.hull_damage,
            pierce_damage: result.pierce_damage,
        });

        if faction == Faction::RogueMiner {
            self.dispatcher.mining.trigger_rage(position, attacker, &mut self.all_npcs);
        }

        if result.died {
            self.all_npcs.remove(&npc_id);
            self.dispatcher.cleanup(npc_id);
            events.push(EngineEvent::NpcDestroyed { npc: npc_id });
        }

        if faction == Faction::Swarm && linked {
            let total_damage = result.shield_damage + result.hull_damage;
            let splashed = propagate_linked_damage(npc_id, position, total_damage, &mut self.all_npcs);
            for (id, splash_amount) in splashed {
                events.push(EngineEvent::DamageApplied {
                    target: ActionTarget::Npc(id),
                    shield_damage: 0.0,
                    hull_damage: splash_amount,
                    pierce_damage: 0.0,
                });
                if self.all_npcs.get(&id).is_some_and(|n| !n.is_alive()) {
                    self.all_npcs.remove(&id);
                    self.dispatcher.cleanup(id);
                    events.push(EngineEvent::NpcDestroyed { npc: id });
                }
            }
        }

        events
    }

    /// Cross-cutting pass for a destroyed base (§4.11): every surviving
    /// NPC homed there is orphaned into rage mode, except the
    /// dreadnought, which enrages permanently instead, and the scout,
    /// which re-homes itself the next time its `Fleeing` state queries
    /// `WorldHooks` for a live base of its own faction.
    pub fn on_base_destroyed(&mut self, base_id: BaseId) -> Vec<EngineEvent> {
        let mut events = vec![EngineEvent::BaseDestroyed { base: base_id }];

        if let Some(base) = self.all_bases.get_mut(&base_id) {
            base.destroy();
        }
        self.dispatcher.pirate.clear_base_intel(base_id);

        let affected: Vec<NpcId> = self
            .all_npcs
            .values()
            .filter(|n| n.home_base_id == Some(base_id) && n.is_alive())
            .map(|n| n.id)
            .collect();

        for id in affected {
            let Some(npc) = self.all_npcs.get_mut(&id) else { continue };
            match npc.npc_type {
                NpcType::PirateDreadnought => {
                    PirateStrategy::enrage_dreadnought(npc);
                    events.push(EngineEvent::Decided { npc: id, action: Action::PirateDreadnoughtEnraged });
                }
                NpcType::PirateScout => {
                    debug!(npc = %id, "scout left homeless, will re-home itself on its next Fleeing tick");
                }
                _ => {
                    npc.orphaned = true;
                    npc.orphan_center = Some(npc.position);
                    npc.state = NpcState::RageMode;
                }
            }
        }

        events
    }
}
