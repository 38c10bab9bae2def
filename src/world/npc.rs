use serde::{Deserialize, Serialize};

use crate::ai::flanking::FlankingState;
use crate::ai::formation::FormationState;
use crate::ai::miner::MiningState;
use crate::ai::pirate::dreadnought::DreadnoughtState;
use crate::ai::pirate::fighter::FighterState;
use crate::ai::pirate::scout::ScoutState;
use crate::ai::queen::QueenPhase;
use crate::ai::retreat::RetreatState;
use crate::ai::swarm::SwarmState;
use crate::ai::territorial::TerritorialState;
use crate::world::ids::{BaseId, NpcId, PlayerId};
use crate::world::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Pirate,
    Scavenger,
    Swarm,
    Void,
    RogueMiner,
}

impl Faction {
    /// Enemy-map from §3.3: pirates are hostile to scavengers and rogue
    /// miners; the relation is symmetric.
    pub fn is_hostile_to(&self, other: Faction) -> bool {
        matches!(
            (self, other),
            (Faction::Pirate, Faction::Scavenger)
                | (Faction::Scavenger, Faction::Pirate)
                | (Faction::Pirate, Faction::RogueMiner)
                | (Faction::RogueMiner, Faction::Pirate)
        )
    }
}

/// Namespaced per faction so "state strings never cross types" (§3.1)
/// is enforced by the type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcType {
    PirateScout,
    PirateFighter,
    PirateCaptain,
    PirateDreadnought,
    Scavenger,
    SwarmDrone,
    SwarmWorker,
    SwarmWarrior,
    SwarmQueen,
    Void,
    VoidLeviathan,
    RogueMinerWorker,
    RogueMinerForeman,
    RogueMinerGuard,
    BarnacleKing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    Laser,
    Missile,
    Railgun,
}

/// Top-level behavioral tag. Each faction strategy owns its own small
/// state enum (§3.1/§9 "prefer tagged enums per strategy"); this just
/// carries whichever one currently applies to the NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum NpcState {
    Flanking(FlankingState),
    Retreat(RetreatState),
    Territorial(TerritorialState),
    Formation(FormationState),
    Swarm(SwarmState),
    Mining(MiningState),
    Scout(ScoutState),
    Fighter(FighterState),
    Captain(CaptainState),
    Dreadnought(DreadnoughtState),
    Queen(QueenPhase),
    LeviathanCombat,
    RageMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptainState {
    Idle,
    Raid,
    Flee,
    Healing,
}

/// A live combat entity. Essential attributes per §3.1; role-specific
/// slots that the spec calls out (scout's in-flight intel, boost-dive
/// phase timers, claimed mining target, heal-until-threshold, boss
/// ability state) live in strategy-owned side tables instead, not here —
/// §3.4/§5 are explicit that those are strategy-local maps keyed by id,
/// cleaned up on death through `cleanup(id)` rather than carried on the
/// NPC itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Npc {
    pub id: NpcId,
    pub npc_type: NpcType,
    pub faction: Faction,

    pub position: Vec2,
    pub rotation: f64,
    pub speed: f64,

    pub hull: f64,
    pub hull_max: f64,
    pub shield: f64,
    pub shield_max: f64,

    pub aggro_range: f64,
    pub weapon_range: f64,
    pub weapon_damage: f64,
    pub weapon_type: WeaponType,
    pub weapon_tier: u32,
    pub last_fire_time_ms: f64,

    pub state: NpcState,
    pub target_player: Option<PlayerId>,
    pub target_npc: Option<NpcId>,
    pub patrol_angle: f64,
    pub patrol_target: Option<Vec2>,
    pub orbit_angle: f64,
    pub orbit_radius: f64,

    pub home_base_id: Option<BaseId>,
    pub home_base_position: Vec2,
    pub spawn_point: Vec2,
    pub formation_id: Option<u32>,
    pub formation_leader: bool,
    pub is_boss: bool,

    pub attached_to_base: bool,
    pub orphaned: bool,
    /// Captured once, at the moment the base-destruction handler
    /// orphans this NPC, so the rage-mode fallback has a patrol anchor
    /// even after `home_base_position` stops meaning anything (§4.11).
    pub orphan_center: Option<Vec2>,

    /// The claimed asteroid/planet id (contains the `_clm` marker,
    /// §4.7) this miner is working, mirrored into the strategy's
    /// `claimed_targets` map for the lifetime of the claim.
    pub mining_target_id: Option<String>,
    /// Re-synced every tick while mining so the rendering side can draw
    /// the beam even if the static target briefly disappears (§4.7).
    pub mining_target_pos: Option<Vec2>,
    pub has_haul: bool,

    /// Scavenger-only: items a destroyed scavenger ship drops into the
    /// steal pool (§4.8 stealing source (b)).
    pub carried_wreckage: Vec<String>,

    /// Swarm-only: participates in linked-damage propagation (§4.6).
    pub linked_health: bool,
    /// Swarm drone assimilation target while `seeking_base` (§4.6).
    pub assimilation_target: Option<BaseId>,
}

impl Npc {
    /// Builds an NPC from its per-type template at the given spawn
    /// point and home base. Mirrors the teacher's `NPC::new` +
    /// `get_npc_template` split in `systems/npc.rs`.
    pub fn spawn(
        npc_type: NpcType,
        position: Vec2,
        home_base_id: Option<BaseId>,
        home_base_position: Vec2,
    ) -> Npc {
        let t = template_for(npc_type);
        Npc {
            id: NpcId::next(),
            npc_type,
            faction: faction_for(npc_type),
            position,
            rotation: 0.0,
            speed: t.speed,
            hull: t.hull_max,
            hull_max: t.hull_max,
            shield: t.shield_max,
            shield_max: t.shield_max,
            aggro_range: t.aggro_range,
            weapon_range: t.weapon_range,
            weapon_damage: t.weapon_damage,
            weapon_type: t.weapon_type,
            weapon_tier: t.weapon_tier,
            last_fire_time_ms: f64::NEG_INFINITY,
            state: default_state_for(npc_type),
            target_player: None,
            target_npc: None,
            patrol_angle: 0.0,
            patrol_target: None,
            orbit_angle: 0.0,
            orbit_radius: t.weapon_range,
            home_base_id,
            home_base_position,
            spawn_point: position,
            formation_id: None,
            formation_leader: false,
            is_boss: matches!(
                npc_type,
                NpcType::SwarmQueen | NpcType::VoidLeviathan | NpcType::BarnacleKing
            ),
            attached_to_base: false,
            orphaned: false,
            orphan_center: None,
            mining_target_id: None,
            mining_target_pos: None,
            has_haul: false,
            carried_wreckage: Vec::new(),
            linked_health: matches!(
                npc_type,
                NpcType::SwarmDrone | NpcType::SwarmWorker | NpcType::SwarmWarrior
            ),
            assimilation_target: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hull > 0.0
    }

    pub fn hull_fraction(&self) -> f64 {
        if self.hull_max <= 0.0 {
            0.0
        } else {
            (self.hull / self.hull_max).clamp(0.0, 1.0)
        }
    }

    /// Clamp hull/shield into their valid ranges (§3.1 invariant).
    pub fn clamp_vitals(&mut self) {
        self.hull = self.hull.clamp(0.0, self.hull_max);
        self.shield = self.shield.clamp(0.0, self.shield_max);
    }

    /// Enforce "exactly one of targetPlayer/targetNpc set" (§3.1). In a
    /// release build the most recently set target wins (§7b); callers
    /// should prefer `set_target_player`/`set_target_npc` below instead
    /// of writing the fields directly.
    pub fn set_target_player(&mut self, id: PlayerId) {
        self.target_player = Some(id);
        self.target_npc = None;
    }

    pub fn set_target_npc(&mut self, id: NpcId) {
        self.target_npc = Some(id);
        self.target_player = None;
    }

    pub fn clear_target(&mut self) {
        self.target_player = None;
        self.target_npc = None;
    }

    /// Release every transient claim/target when leaving a state (§9
    /// "every state-change also clears the invalidated local slots").
    pub fn reset_transient_state(&mut self) {
        self.clear_target();
        self.patrol_target = None;
        self.mining_target_id = None;
        self.mining_target_pos = None;
    }
}

struct NpcTemplate {
    hull_max: f64,
    shield_max: f64,
    speed: f64,
    aggro_range: f64,
    weapon_range: f64,
    weapon_damage: f64,
    weapon_type: WeaponType,
    weapon_tier: u32,
}

fn faction_for(npc_type: NpcType) -> Faction {
    match npc_type {
        NpcType::PirateScout
        | NpcType::PirateFighter
        | NpcType::PirateCaptain
        | NpcType::PirateDreadnought => Faction::Pirate,
        NpcType::Scavenger => Faction::Scavenger,
        NpcType::SwarmDrone | NpcType::SwarmWorker | NpcType::SwarmWarrior | NpcType::SwarmQueen => {
            Faction::Swarm
        }
        NpcType::Void | NpcType::VoidLeviathan => Faction::Void,
        NpcType::RogueMinerWorker
        | NpcType::RogueMinerForeman
        | NpcType::RogueMinerGuard
        | NpcType::BarnacleKing => Faction::RogueMiner,
    }
}

fn default_state_for(npc_type: NpcType) -> NpcState {
    match npc_type {
        NpcType::PirateScout => NpcState::Scout(ScoutState::Patrol),
        NpcType::PirateFighter => NpcState::Fighter(FighterState::Patrol),
        NpcType::PirateCaptain => NpcState::Captain(CaptainState::Idle),
        NpcType::PirateDreadnought => NpcState::Dreadnought(DreadnoughtState::Spawning),
        NpcType::Scavenger => NpcState::Retreat(RetreatState::Patrol),
        NpcType::SwarmDrone | NpcType::SwarmWorker | NpcType::SwarmWarrior => {
            NpcState::Swarm(SwarmState::Patrol)
        }
        NpcType::SwarmQueen => NpcState::Queen(QueenPhase::Hunt),
        NpcType::Void => NpcState::Formation(FormationState::Patrol),
        NpcType::VoidLeviathan => NpcState::LeviathanCombat,
        NpcType::RogueMinerWorker | NpcType::RogueMinerForeman => {
            NpcState::Mining(MiningState::Idle)
        }
        NpcType::RogueMinerGuard | NpcType::BarnacleKing => {
            NpcState::Territorial(TerritorialState::Patrol)
        }
    }
}

fn template_for(npc_type: NpcType) -> NpcTemplate {
    match npc_type {
        NpcType::PirateScout => NpcTemplate {
            hull_max: 80.0,
            shield_max: 40.0,
            speed: 220.0,
            aggro_range: 900.0,
            // Must clear `SCOUT_RAID_ORBIT_RADIUS_MAX` (§4.8): the raid
            // orbit sits the scout at a fixed 400-unit standoff, and a
            // shorter range than that left it orbiting forever without
            // ever firing its light blaster.
            weapon_range: 500.0,
            weapon_damage: 8.0,
            weapon_type: WeaponType::Laser,
            weapon_tier: 1,
        },
        NpcType::PirateFighter => NpcTemplate {
            hull_max: 150.0,
            shield_max: 80.0,
            speed: 180.0,
            aggro_range: 700.0,
            weapon_range: 350.0,
            weapon_damage: 18.0,
            weapon_type: WeaponType::Missile,
            weapon_tier: 2,
        },
        NpcType::PirateCaptain => NpcTemplate {
            hull_max: 280.0,
            shield_max: 150.0,
            speed: 160.0,
            aggro_range: 800.0,
            weapon_range: 400.0,
            weapon_damage: 24.0,
            weapon_type: WeaponType::Railgun,
            weapon_tier: 3,
        },
        NpcType::PirateDreadnought => NpcTemplate {
            hull_max: 10_000.0,
            shield_max: 2_000.0,
            speed: 90.0,
            aggro_range: 900.0,
            weapon_range: 600.0,
            weapon_damage: 60.0,
            weapon_type: WeaponType::Railgun,
            weapon_tier: 4,
        },
        NpcType::Scavenger => NpcTemplate {
            hull_max: 120.0,
            shield_max: 60.0,
            speed: 200.0,
            aggro_range: 600.0,
            weapon_range: 300.0,
            weapon_damage: 14.0,
            weapon_type: WeaponType::Laser,
            weapon_tier: 1,
        },
        NpcType::SwarmDrone => NpcTemplate {
            hull_max: 40.0,
            shield_max: 0.0,
            speed: 260.0,
            aggro_range: 500.0,
            weapon_range: 150.0,
            weapon_damage: 6.0,
            weapon_type: WeaponType::Laser,
            weapon_tier: 1,
        },
        NpcType::SwarmWorker => NpcTemplate {
            hull_max: 60.0,
            shield_max: 0.0,
            speed: 200.0,
            aggro_range: 450.0,
            weapon_range: 180.0,
            weapon_damage: 9.0,
            weapon_type: WeaponType::Laser,
            weapon_tier: 1,
        },
        NpcType::SwarmWarrior => NpcTemplate {
            hull_max: 100.0,
            shield_max: 20.0,
            speed: 220.0,
            aggro_range: 500.0,
            weapon_range: 220.0,
            weapon_damage: 14.0,
            weapon_type: WeaponType::Laser,
            weapon_tier: 2,
        },
        NpcType::SwarmQueen => NpcTemplate {
            hull_max: 8_000.0,
            shield_max: 1_500.0,
            speed: 120.0,
            aggro_range: 1_200.0,
            weapon_range: 500.0,
            weapon_damage: 40.0,
            weapon_type: WeaponType::Railgun,
            weapon_tier: 4,
        },
        NpcType::Void => NpcTemplate {
            hull_max: 110.0,
            shield_max: 70.0,
            speed: 190.0,
            aggro_range: 650.0,
            weapon_range: 320.0,
            weapon_damage: 16.0,
            weapon_type: WeaponType::Laser,
            weapon_tier: 2,
        },
        NpcType::VoidLeviathan => NpcTemplate {
            hull_max: 12_000.0,
            shield_max: 3_000.0,
            speed: 70.0,
            aggro_range: 1_500.0,
            weapon_range: 600.0,
            weapon_damage: 70.0,
            weapon_type: WeaponType::Railgun,
            weapon_tier: 5,
        },
        NpcType::RogueMinerWorker => NpcTemplate {
            hull_max: 90.0,
            shield_max: 30.0,
            speed: 150.0,
            aggro_range: 400.0,
            weapon_range: 200.0,
            weapon_damage: 10.0,
            weapon_type: WeaponType::Laser,
            weapon_tier: 1,
        },
        NpcType::RogueMinerForeman => NpcTemplate {
            hull_max: 140.0,
            shield_max: 60.0,
            speed: 150.0,
            aggro_range: 450.0,
            weapon_range: 220.0,
            weapon_damage: 14.0,
            weapon_type: WeaponType::Laser,
            weapon_tier: 2,
        },
        NpcType::RogueMinerGuard => NpcTemplate {
            hull_max: 130.0,
            shield_max: 50.0,
            speed: 160.0,
            aggro_range: 500.0,
            weapon_range: 250.0,
            weapon_damage: 13.0,
            weapon_type: WeaponType::Laser,
            weapon_tier: 1,
        },
        NpcType::BarnacleKing => NpcTemplate {
            hull_max: 6_000.0,
            shield_max: 1_000.0,
            speed: 80.0,
            aggro_range: 1_500.0,
            weapon_range: 400.0,
            weapon_damage: 35.0,
            weapon_type: WeaponType::Railgun,
            weapon_tier: 4,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_clamps_hull_to_template_max() {
        let npc = Npc::spawn(NpcType::PirateScout, Vec2::ZERO, None, Vec2::ZERO);
        assert_eq!(npc.hull, npc.hull_max);
        assert!(npc.is_alive());
    }

    #[test]
    fn target_setters_keep_mutual_exclusion() {
        let mut npc = Npc::spawn(NpcType::Scavenger, Vec2::ZERO, None, Vec2::ZERO);
        npc.set_target_npc(NpcId(1));
        npc.set_target_player(PlayerId(1));
        assert_eq!(npc.target_npc, None);
        assert_eq!(npc.target_player, Some(PlayerId(1)));
    }

    #[test]
    fn pirate_types_map_to_pirate_faction() {
        assert_eq!(faction_for(NpcType::PirateDreadnought), Faction::Pirate);
        assert_eq!(faction_for(NpcType::VoidLeviathan), Faction::Void);
    }
}
