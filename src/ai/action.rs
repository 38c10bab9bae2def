//! The vocabulary strategies and the applier speak: `Action` is what a
//! `Strategy::update` returns (at most one per NPC per tick, §4.1);
//! `EngineEvent` is what crosses the transport boundary (§6). The two
//! are distinct despite overlapping names — most `Action` variants
//! produce a same-named `EngineEvent` once the applier resolves them,
//! but e.g. `Action::Fire` expands into a `DamageApplied` and possibly
//! an `NpcDestroyed` event, never an echoed `Fire` event.

use serde::{Deserialize, Serialize};

use crate::world::ids::{BaseId, NpcId, PlayerId};
use crate::world::npc::WeaponType;
use crate::world::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ActionTarget {
    Player(PlayerId),
    Npc(NpcId),
    Base(BaseId),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireAction {
    pub target: ActionTarget,
    pub weapon_type: WeaponType,
    pub weapon_tier: u32,
    pub base_damage: f64,
    pub shield_piercing: f64,
    pub enraged: bool,
    pub synchronized: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StealTarget {
    Base(BaseId),
    Npc(NpcId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StealAction {
    pub target: StealTarget,
    pub target_type: &'static str,
    pub stolen_amount: f64,
    pub stolen_items: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GravityWellPhase {
    Warning,
    Active,
    End,
}

/// One player's standing within an active gravity well, carried on
/// `Action::VoidGravityWellTick` so a consumer can both pull the player
/// toward `center` and resolve the listed damage (§4.10).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravityWellPull {
    pub player: PlayerId,
    pub distance: f64,
    pub damage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumePhase {
    Tendril,
    Drag,
    Dissolve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinionSpawnTrigger {
    HealthThreshold,
    Continuous,
}

/// What a strategy hands back to the dispatcher for the applier to
/// resolve (§4.1, §4.12). `null` in the spec is simply `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum Action {
    Fire(FireAction),

    RogueMinerStartMining { asteroid_id: String },
    RogueMinerMiningProgress { asteroid_id: String },
    RogueMinerMiningComplete { asteroid_id: String },
    RogueMinerStartDeposit,
    RogueMinerDeposited { credit_reward: f64, foreman: bool },
    RogueMinerRage { attacker: PlayerId },
    RogueMinerRageClear,

    PirateIntelBroadcast { base_id: BaseId, target: ActionTarget, target_pos: Vec2 },
    PirateBoostDive { charging: bool },
    PirateSteal(StealAction),
    PirateDreadnoughtEnraged,

    Warning { target: PlayerId },
    NpcInvulnerable { source: PlayerId },

    Assimilate { drone_id: NpcId, base_id: BaseId },

    VoidSpawnMinions { rift_count: u32, trigger: MinionSpawnTrigger, health_threshold: Option<f64> },
    VoidGravityWell { phase: GravityWellPhase, center: Vec2 },
    VoidGravityWellTick { center: Vec2, pull_strength: f64, affected: Vec<GravityWellPull> },
    VoidConsume { phase: ConsumePhase, target: NpcId, heal_amount: Option<f64>, remove_target: bool },

    WebSnare { impact: Vec2, radius: f64, slow_percent: f64, duration_ms: f64 },
    AcidBurst { impact: Vec2, radius: f64, damage: f64, dot_damage: f64, dot_interval_ms: f64, dot_duration_ms: f64 },

    PhaseTransitionPending { from: &'static str, to: &'static str },

    BarnacleKingCalcify { center: Vec2, radius: f64, duration_ms: f64 },
}

/// Everything the core publishes outward (§6). A superset of `Action`:
/// damage/destruction/state-change events that only the applier (not a
/// strategy) can know about, plus every `Action` variant re-surfaced for
/// callers who want the raw decision record too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum EngineEvent {
    Decided { npc: NpcId, action: Action },

    DamageApplied {
        target: ActionTarget,
        shield_damage: f64,
        hull_damage: f64,
        pierce_damage: f64,
    },
    NpcDestroyed { npc: NpcId },
    NpcUpdated { npc: NpcId, position: Vec2, rotation: f64, hull: f64 },
    BaseDestroyed { base: BaseId },
    BaseAssimilated { base: BaseId, consumed_drone_ids: Vec<NpcId> },

    FormationLeaderChanged { formation_id: u32, new_leader: NpcId },
    QueenPhaseChanged { queen: NpcId, from: &'static str, to: &'static str },
    CaptainSpawned { npc: NpcId, base: BaseId },
    BarnacleKingSpawn { npc: NpcId },

    ActionDropped { npc: NpcId, reason: &'static str },
    StrategyFaulted { npc: NpcId, reason: String },
}
