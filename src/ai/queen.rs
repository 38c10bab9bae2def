//! Swarm Queen boss (§4.9): a 4-phase hull-gated state machine layered
//! on top of direct pursuit, with two telegraphed area specials shared
//! across phases. Phase bookkeeping and ability cooldowns live in small
//! per-queen side tables (§3.4), same pattern as `leviathan.rs`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::{
    QUEEN_ACID_BURST_CHARGE_MS, QUEEN_ACID_BURST_COOLDOWN_MS, QUEEN_ACID_BURST_DAMAGE, QUEEN_ACID_BURST_DOT_DAMAGE,
    QUEEN_ACID_BURST_DOT_DURATION_MS, QUEEN_ACID_BURST_DOT_INTERVAL_MS, QUEEN_ACID_BURST_PROJECTILE_SPEED,
    QUEEN_ACID_BURST_RADIUS, QUEEN_DESPERATION_COOLDOWN_DIVISOR, QUEEN_DESPERATION_DAMAGE_MULT,
    QUEEN_DESPERATION_SPEED_MULT, QUEEN_HUNT_DAMAGE_MULT, QUEEN_HUNT_SPEED_MULT, QUEEN_PATROL_ANGULAR_SPEED,
    QUEEN_PATROL_RADIUS, QUEEN_PATROL_RADIUS_JITTER, QUEEN_PHASE_P1, QUEEN_PHASE_P2, QUEEN_PHASE_P3,
    QUEEN_SIEGE_DAMAGE_MULT, QUEEN_SIEGE_SPEED_MULT, QUEEN_SWARM_DAMAGE_MULT, QUEEN_SWARM_SPEED_MULT,
    QUEEN_WEB_SNARE_CHARGE_MS, QUEEN_WEB_SNARE_COOLDOWN_MS, QUEEN_WEB_SNARE_PROJECTILE_SPEED,
    QUEEN_WEB_SNARE_SLOW_DURATION_MS, QUEEN_WEB_SNARE_SLOW_PERCENT, QUEEN_WEB_SNARE_SLOW_RADIUS,
};
use crate::world::ids::NpcId;
use crate::world::neighborhood::Neighborhood;
use crate::world::npc::{Npc, NpcState};
use crate::world::Vec2;

use super::action::{Action, ActionTarget, FireAction};
use super::strategy::{try_fire, Strategy, TickContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueenPhase {
    Hunt,
    Siege,
    Swarm,
    Desperation,
}

fn phase_for_hull_fraction(frac: f64) -> QueenPhase {
    if frac > QUEEN_PHASE_P1 {
        QueenPhase::Hunt
    } else if frac > QUEEN_PHASE_P2 {
        QueenPhase::Siege
    } else if frac > QUEEN_PHASE_P3 {
        QueenPhase::Swarm
    } else {
        QueenPhase::Desperation
    }
}

fn phase_label(p: QueenPhase) -> &'static str {
    match p {
        QueenPhase::Hunt => "hunt",
        QueenPhase::Siege => "siege",
        QueenPhase::Swarm => "swarm",
        QueenPhase::Desperation => "desperation",
    }
}

fn phase_mults(p: QueenPhase) -> (f64, f64) {
    match p {
        QueenPhase::Hunt => (QUEEN_HUNT_SPEED_MULT, QUEEN_HUNT_DAMAGE_MULT),
        QueenPhase::Siege => (QUEEN_SIEGE_SPEED_MULT, QUEEN_SIEGE_DAMAGE_MULT),
        QueenPhase::Swarm => (QUEEN_SWARM_SPEED_MULT, QUEEN_SWARM_DAMAGE_MULT),
        QueenPhase::Desperation => (QUEEN_DESPERATION_SPEED_MULT, QUEEN_DESPERATION_DAMAGE_MULT),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecialKind {
    WebSnare,
    AcidBurst,
}

impl SpecialKind {
    fn impact_action(self, impact: Vec2) -> Action {
        match self {
            SpecialKind::WebSnare => Action::WebSnare {
                impact,
                radius: QUEEN_WEB_SNARE_SLOW_RADIUS,
                slow_percent: QUEEN_WEB_SNARE_SLOW_PERCENT,
                duration_ms: QUEEN_WEB_SNARE_SLOW_DURATION_MS,
            },
            SpecialKind::AcidBurst => Action::AcidBurst {
                impact,
                radius: QUEEN_ACID_BURST_RADIUS,
                damage: QUEEN_ACID_BURST_DAMAGE,
                dot_damage: QUEEN_ACID_BURST_DOT_DAMAGE,
                dot_interval_ms: QUEEN_ACID_BURST_DOT_INTERVAL_MS,
                dot_duration_ms: QUEEN_ACID_BURST_DOT_DURATION_MS,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecialProgress {
    Charging,
    Traveling,
}

#[derive(Debug, Clone, Copy)]
struct PendingSpecial {
    kind: SpecialKind,
    progress: SpecialProgress,
    impact: Vec2,
    phase_end_ms: f64,
}

#[derive(Debug, Clone, Copy)]
struct AbilityState {
    web_snare_last_cast_ms: f64,
    acid_burst_last_cast_ms: f64,
}

impl Default for AbilityState {
    /// Both specials are ready from the Queen's first tick rather than
    /// waiting out a full cooldown since epoch-zero (same sentinel
    /// pattern as `barnacle_king.rs`'s calcify cooldown).
    fn default() -> Self {
        AbilityState { web_snare_last_cast_ms: f64::NEG_INFINITY, acid_burst_last_cast_ms: f64::NEG_INFINITY }
    }
}

#[derive(Default)]
pub struct QueenStrategy {
    phases: HashMap<NpcId, QueenPhase>,
    abilities: HashMap<NpcId, AbilityState>,
    pending: HashMap<NpcId, PendingSpecial>,
}

impl QueenStrategy {
    pub fn new() -> Self {
        QueenStrategy::default()
    }

    fn cooldown_divisor(phase: QueenPhase) -> f64 {
        if phase == QueenPhase::Desperation {
            QUEEN_DESPERATION_COOLDOWN_DIVISOR
        } else {
            1.0
        }
    }

}

impl Strategy for QueenStrategy {
    fn update(&mut self, npc: &mut Npc, neighborhood: &Neighborhood, ctx: &TickContext) -> Option<Action> {
        let computed_phase = phase_for_hull_fraction(npc.hull_fraction());
        let prev_phase = *self.phases.entry(npc.id).or_insert(computed_phase);
        let transitioned = prev_phase != computed_phase;
        if transitioned {
            self.phases.insert(npc.id, computed_phase);
        }
        npc.state = NpcState::Queen(computed_phase);
        if transitioned {
            return Some(Action::PhaseTransitionPending { from: phase_label(prev_phase), to: phase_label(computed_phase) });
        }

        let (speed_mult, damage_mult) = phase_mults(computed_phase);
        let divisor = Self::cooldown_divisor(computed_phase);

        if let Some(pending) = self.pending.get_mut(&npc.id).copied() {
            match pending.progress {
                SpecialProgress::Charging if ctx.now_ms >= pending.phase_end_ms => {
                    let travel_distance = npc.position.distance(pending.impact);
                    let travel_speed = match pending.kind {
                        SpecialKind::WebSnare => QUEEN_WEB_SNARE_PROJECTILE_SPEED,
                        SpecialKind::AcidBurst => QUEEN_ACID_BURST_PROJECTILE_SPEED,
                    };
                    let travel_ms = (travel_distance / travel_speed) * 1000.0;
                    let impact_at_ms = ctx.now_ms + travel_ms;

                    // A projectile cast from right on top of its impact
                    // point has nothing left to travel — resolve the
                    // impact in this same tick rather than wait out an
                    // extra no-op tick for a zero-length flight.
                    if impact_at_ms <= ctx.now_ms {
                        self.pending.remove(&npc.id);
                        return Some(pending.kind.impact_action(pending.impact));
                    }

                    self.pending.insert(npc.id, PendingSpecial { progress: SpecialProgress::Traveling, phase_end_ms: impact_at_ms, ..pending });
                    return None;
                }
                SpecialProgress::Traveling if ctx.now_ms >= pending.phase_end_ms => {
                    self.pending.remove(&npc.id);
                    return Some(pending.kind.impact_action(pending.impact));
                }
                _ => return None,
            }
        }

        if !neighborhood.players.is_empty() {
            let ability = self.abilities.entry(npc.id).or_default();

            let web_snare_ready = ctx.now_ms - ability.web_snare_last_cast_ms >= QUEEN_WEB_SNARE_COOLDOWN_MS / divisor;
            if web_snare_ready {
                let sum = neighborhood.players.iter().fold(Vec2::ZERO, |acc, p| acc.add(p.position));
                let centroid = sum.scale(1.0 / neighborhood.players.len() as f64);
                ability.web_snare_last_cast_ms = ctx.now_ms;
                self.pending.insert(
                    npc.id,
                    PendingSpecial {
                        kind: SpecialKind::WebSnare,
                        progress: SpecialProgress::Charging,
                        impact: centroid,
                        phase_end_ms: ctx.now_ms + QUEEN_WEB_SNARE_CHARGE_MS,
                    },
                );
                return None;
            }

            let acid_burst_ready = ctx.now_ms - ability.acid_burst_last_cast_ms >= QUEEN_ACID_BURST_COOLDOWN_MS / divisor;
            if acid_burst_ready {
                if let Some(target) = neighborhood.nearest_player() {
                    ability.acid_burst_last_cast_ms = ctx.now_ms;
                    self.pending.insert(
                        npc.id,
                        PendingSpecial {
                            kind: SpecialKind::AcidBurst,
                            progress: SpecialProgress::Charging,
                            impact: target.position,
                            phase_end_ms: ctx.now_ms + QUEEN_ACID_BURST_CHARGE_MS,
                        },
                    );
                    return None;
                }
            }
        }

        match neighborhood.nearest_player() {
            Some(target) => {
                npc.set_target_player(target.id);
                let standoff = if computed_phase == QueenPhase::Siege {
                    let guard_centroid = neighborhood
                        .allies
                        .iter()
                        .fold(Vec2::ZERO, |acc, a| acc.add(a.position))
                        .scale(1.0 / neighborhood.allies.len().max(1) as f64);
                    guard_centroid.add(guard_centroid.sub(target.position).normalized().scale(npc.weapon_range))
                } else {
                    target.position
                };
                npc.position = npc.position.move_toward(standoff, npc.speed * speed_mult * (ctx.dt_ms / 1000.0));
                npc.rotation = target.position.sub(npc.position).angle();

                let cooldown = crate::config::BASELINE_FIRE_COOLDOWN_MS / divisor;
                if try_fire(npc, target.distance, ctx.now_ms, cooldown) {
                    npc.last_fire_time_ms = ctx.now_ms;
                    Some(Action::Fire(FireAction {
                        target: ActionTarget::Player(target.id),
                        weapon_type: npc.weapon_type,
                        weapon_tier: npc.weapon_tier,
                        base_damage: npc.weapon_damage * damage_mult,
                        shield_piercing: 0.0,
                        enraged: computed_phase == QueenPhase::Desperation,
                        synchronized: false,
                    }))
                } else {
                    None
                }
            }
            None => {
                npc.clear_target();
                let jitter = (ctx.now_ms / 1000.0).sin() * QUEEN_PATROL_RADIUS_JITTER;
                let point = super::strategy::simple_patrol(
                    npc,
                    npc.home_base_position,
                    QUEEN_PATROL_RADIUS + jitter,
                    QUEEN_PATROL_ANGULAR_SPEED,
                    ctx.dt_ms,
                );
                npc.position = npc.position.move_toward(point, npc.speed * (ctx.dt_ms / 1000.0));
                None
            }
        }
    }

    fn cleanup(&mut self, id: NpcId) {
        self.phases.remove(&id);
        self.abilities.remove(&id);
        self.pending.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::hooks::StaticWorldHooks;
    use crate::world::ids::PlayerId;
    use crate::world::neighborhood::NeighborhoodScratch;
    use crate::world::npc::NpcType;
    use crate::world::player::PlayerRef;
    use std::collections::BTreeMap;

    fn ctx<'a>(world: &'a StaticWorldHooks, all_npcs: &'a BTreeMap<NpcId, Npc>, now_ms: f64) -> TickContext<'a> {
        TickContext {
            now_ms,
            dt_ms: 50.0,
            home_base: None,
            territory_radius: 500.0,
            patrol_radius: 500.0,
            has_foreman: false,
            nearby_bases: &[],
            all_npcs,
            world,
        }
    }

    #[test]
    fn first_tick_never_emits_a_spurious_transition() {
        let mut npc = Npc::spawn(NpcType::SwarmQueen, Vec2::ZERO, None, Vec2::ZERO);
        let world = StaticWorldHooks::new(vec![]);
        let all_npcs = BTreeMap::new();
        let mut scratch = NeighborhoodScratch::new();
        let nb = scratch.build_for(&npc, &all_npcs, &[]);
        let c = ctx(&world, &all_npcs, 0.0);
        let mut strat = QueenStrategy::new();
        let action = strat.update(&mut npc, &nb, &c);
        assert!(!matches!(action, Some(Action::PhaseTransitionPending { .. })));
    }

    #[test]
    fn crossing_a_hull_threshold_emits_exactly_one_transition() {
        let mut npc = Npc::spawn(NpcType::SwarmQueen, Vec2::ZERO, None, Vec2::ZERO);
        let world = StaticWorldHooks::new(vec![]);
        let mut all_npcs = BTreeMap::new();
        let mut scratch = NeighborhoodScratch::new();
        let mut strat = QueenStrategy::new();

        {
            let nb = scratch.build_for(&npc, &all_npcs, &[]);
            let c = ctx(&world, &all_npcs, 0.0);
            strat.update(&mut npc, &nb, &c);
        }

        npc.hull = npc.hull_max * 0.6; // crosses below QUEEN_PHASE_P1 into Siege
        all_npcs.insert(npc.id, npc.clone());
        let nb = scratch.build_for(&npc, &all_npcs, &[]);
        let c = ctx(&world, &all_npcs, 1000.0);
        let action = strat.update(&mut npc, &nb, &c);
        match action {
            Some(Action::PhaseTransitionPending { from, to }) => {
                assert_eq!(from, "hunt");
                assert_eq!(to, "siege");
            }
            other => panic!("expected a phase transition, got {other:?}"),
        }
        assert!(matches!(npc.state, NpcState::Queen(QueenPhase::Siege)));
    }

    #[test]
    fn web_snare_targets_player_centroid_and_eventually_impacts() {
        let mut npc = Npc::spawn(NpcType::SwarmQueen, Vec2::ZERO, None, Vec2::ZERO);
        let world = StaticWorldHooks::new(vec![]);
        let mut all_npcs = BTreeMap::new();
        all_npcs.insert(npc.id, npc.clone());
        let players = [
            PlayerRef::new(PlayerId(1), Vec2::new(100.0, 0.0)),
            PlayerRef::new(PlayerId(2), Vec2::new(-100.0, 0.0)),
        ];
        let mut scratch = NeighborhoodScratch::new();
        let mut strat = QueenStrategy::new();

        {
            let nb = scratch.build_for(&npc, &all_npcs, &players);
            let c = ctx(&world, &all_npcs, 0.0);
            strat.update(&mut npc, &nb, &c); // first tick: settles initial phase
        }
        let nb = scratch.build_for(&npc, &all_npcs, &players);
        let c = ctx(&world, &all_npcs, 1.0);
        strat.update(&mut npc, &nb, &c); // initiates web snare (ready immediately)
        assert!(strat.pending.contains_key(&npc.id));

        let far_future = ctx(&world, &all_npcs, QUEEN_WEB_SNARE_CHARGE_MS + 1_000_000.0);
        let nb = scratch.build_for(&npc, &all_npcs, &players);
        let action = strat.update(&mut npc, &nb, &far_future);
        assert!(matches!(action, Some(Action::WebSnare { .. })));
    }
}
