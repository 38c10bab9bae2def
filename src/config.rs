#![allow(dead_code)]
//! All faction AI constants — mirrors the design's tunable tables exactly.
//! Every cooldown, range, and multiplier referenced by a strategy module
//! lives here rather than inlined, so behavior can be retuned without
//! touching the algorithms themselves.

// ─── Tick ────────────────────────────────────────────────────────────

pub const TICK_RATE_HZ: u32 = 20;
pub const TICK_INTERVAL_MS: u64 = 50; // 1000 / TICK_RATE_HZ

// ─── Neighborhood ────────────────────────────────────────────────────

/// Faction-ally radius used when collecting `nearby_allies`, independent of
/// any individual NPC's own aggro range.
pub const ALLY_RADIUS: f64 = 500.0;

// ─── Per-faction retreat thresholds (hull fraction) ─────────────────

pub const RETREAT_THRESHOLD_PIRATE: f64 = 0.4;
pub const RETREAT_THRESHOLD_SCAVENGER: f64 = 0.2;
pub const RETREAT_THRESHOLD_SWARM: f64 = 0.0; // swarm units never retreat
pub const RETREAT_THRESHOLD_VOID: f64 = 0.3;
pub const RETREAT_THRESHOLD_ROGUE_MINER: f64 = 0.5;

// ─── Common helper defaults ──────────────────────────────────────────

pub const BASELINE_FIRE_COOLDOWN_MS: f64 = 1000.0;

// ─── Flanking (pirate-line baseline) ─────────────────────────────────

pub const FLANKING_FOCUS_FIRE_BONUS: f64 = 2.0;
pub const FLANKING_APPROACH_FRACTION: f64 = 0.8;
pub const FLANKING_RETREAT_SPEED_MULT: f64 = 1.3;
pub const FLANKING_RETREAT_ARC_DEGREES: f64 = 270.0;
pub const FLANKING_PATROL_SWITCH_DISTANCE: f64 = 100.0;

// ─── Retreat-and-regen (scavenger baseline) ──────────────────────────

pub const RETREAT_FIRE_COOLDOWN_MS: f64 = 800.0;
pub const RETREAT_ORBIT_FRACTION: f64 = 0.9;
pub const RETREAT_HOME_BLEND: f64 = 0.7;
pub const RETREAT_AWAY_BLEND: f64 = 0.3;
pub const RETREAT_SPEED_MULT: f64 = 1.4;
pub const RETREAT_HULL_REGEN_PER_SEC: f64 = 0.15;
pub const RETREAT_SHIELD_REGEN_PER_SEC: f64 = 0.20;
pub const RETREAT_HEAL_UNTIL_FRACTION: f64 = 0.8;
pub const RETREAT_PATROL_RADIUS: f64 = 350.0;

// ─── Territorial (rogue-miner baseline) ──────────────────────────────

pub const TERRITORY_RADIUS_DEFAULT: f64 = 500.0;
pub const TERRITORY_WARNING_DURATION_MS: f64 = 3000.0;
pub const TERRITORY_WARNING_APPROACH_FRACTION: f64 = 1.2;
pub const TERRITORY_PURSUE_CLAMP_FRACTION: f64 = 0.9;
pub const TERRITORY_DEFENDER_DAMAGE_BONUS: f64 = 0.20;
pub const TERRITORY_RETREAT_THRESHOLD: f64 = 0.5;

// ─── Formation (void-line baseline) ───────────────────────────────────

pub const FORMATION_ROW_SPACING: f64 = 80.0;
pub const FORMATION_LEADER_APPROACH_FRACTION: f64 = 0.7;
pub const FORMATION_LEADER_BACKOFF_FRACTION: f64 = 0.5;
pub const FORMATION_FOLLOWER_MAX_SPEED_MULT: f64 = 1.5;
pub const FORMATION_FIRE_COOLDOWN_MS: f64 = 1200.0;
pub const FORMATION_VOLLEY_STAGGER_MS: f64 = 100.0;
pub const FORMATION_CONFUSION_DURATION_MS: f64 = 1000.0;
pub const FORMATION_REFORMING_DURATION_MS: f64 = 3000.0;
pub const FORMATION_RETREAT_SPEED_MULT: f64 = 1.1;

// ─── Swarm collective ──────────────────────────────────────────────────

pub const SWARM_DRONE_PATROL_RADIUS_MIN: f64 = 300.0;
pub const SWARM_DRONE_PATROL_RADIUS_MAX: f64 = 500.0;
pub const SWARM_DRONE_PATROL_ANGULAR_SPEED: f64 = 0.3;
pub const SWARM_WORKER_PATROL_RADIUS: f64 = 250.0;
pub const SWARM_WORKER_PATROL_ANGULAR_SPEED: f64 = 0.5;
pub const SWARM_WARRIOR_PATROL_RADIUS: f64 = 180.0;
pub const SWARM_WARRIOR_PATROL_ANGULAR_SPEED: f64 = 0.7;

pub const QUEEN_GUARD_RANGE: f64 = 600.0;
pub const QUEEN_GUARD_INNER_RADIUS: f64 = 40.0;
pub const QUEEN_GUARD_OUTER_RADIUS: f64 = 80.0;
pub const QUEEN_GUARD_ANGULAR_SPEED: f64 = 2.0;
pub const QUEEN_GUARD_INTERCEPT_RANGE: f64 = 120.0;
pub const QUEEN_GUARD_INTERCEPT_FRACTION: f64 = 0.7;

pub const SWARM_COMBAT_FIRE_COOLDOWN_MS: f64 = 800.0;
pub const SWARM_ORBIT_TIGHTEN_PER_MS: f64 = 0.01;
pub const SWARM_ORBIT_MIN_FRACTION: f64 = 0.6;

pub const LINKED_DAMAGE_RADIUS: f64 = 300.0;
pub const LINKED_DAMAGE_FRACTION: f64 = 0.2;

pub const ASSIMILATE_RANGE: f64 = 30.0;
pub const DRONE_ASSIMILATE_SPEED: f64 = 250.0;

/// Drone hits a base needs to land before it flips to a swarm hive
/// (§4.6); the applier calls `Base::advance_assimilation` with this on
/// every `Action::Assimilate`.
pub const DEFAULT_ASSIMILATION_THRESHOLD: u32 = 10;

// ─── Mining (rogue-miner role) ─────────────────────────────────────────

pub const MINING_CLAIM_MARKER: &str = "_clm";
pub const MINING_SEARCH_RADIUS: f64 = 2000.0;
pub const MINING_NEAREST_CANDIDATES: usize = 5;
pub const MINING_DURATION_MS: f64 = 3000.0;
pub const MINING_DEPOSIT_DURATION_MS: f64 = 1000.0;
pub const MINING_DEPOSIT_RANGE: f64 = 80.0;
pub const MINING_RETURN_SPEED_FRACTION: f64 = 0.7;
pub const MINING_FOREMAN_SPEED_MULT: f64 = 3.0;
pub const MINING_CREDIT_REWARD: f64 = 2.0;
pub const MINING_CREDIT_REWARD_FOREMAN: f64 = 6.0;

pub const RAGE_ZONE_RADIUS: f64 = 3000.0;
pub const RAGE_SPEED_MULT: f64 = 1.3;
pub const RAGE_ENGAGE_FRACTION: f64 = 0.6;
pub const RAGE_FIRE_COOLDOWN_MS: f64 = 300.0;
pub const RAGE_FIRE_COOLDOWN_MS_NO_FOREMAN: f64 = 1000.0;

// ─── Pirates: scout ─────────────────────────────────────────────────────

pub const SCOUT_PATROL_RADIUS: f64 = 800.0;
pub const SCOUT_OBSERVE_DURATION_MS: f64 = 1000.0;
pub const SCOUT_FLEE_SPEED_MULT: f64 = 1.5;
pub const SCOUT_RAID_ORBIT_RADIUS_MIN: f64 = 350.0;
pub const SCOUT_RAID_ORBIT_RADIUS_MAX: f64 = 450.0;
pub const SCOUT_RAID_FIRE_COOLDOWN_MS: f64 = 1500.0;
pub const SCOUT_LOST_TARGET_TIMEOUT_MS: f64 = 10_000.0;
pub const SCOUT_MAX_CHASE_RADIUS: f64 = 2500.0;

// ─── Pirates: fighter ───────────────────────────────────────────────────

pub const FIGHTER_CIRCLE_RADIUS: f64 = 300.0;
pub const FIGHTER_CIRCLE_ENTER_MARGIN: f64 = 50.0;
pub const FIGHTER_CIRCLE_ANGULAR_SPEED: f64 = 0.8;
pub const FIGHTER_BOOST_DIVE_COOLDOWN_MS: f64 = 4000.0;
pub const FIGHTER_BOOST_DIVE_SPEED_MULT: f64 = 3.5;
pub const FIGHTER_BOOST_DIVE_MAX_DURATION_MS: f64 = 2500.0;
pub const FIGHTER_BOOST_DIVE_FIRE_RANGE: f64 = 150.0;
pub const FIGHTER_BOOST_DIVE_TIER_BONUS: u32 = 1;
pub const FIGHTER_BOOST_DIVE_DAMAGE_MULT: f64 = 1.5;
pub const FIGHTER_BOOST_DIVE_SHIELD_PIERCING: f64 = 0.10;
pub const FIGHTER_COOLDOWN_BACKOFF_SPEED_MULT: f64 = 0.8;
pub const FIGHTER_COOLDOWN_DURATION_MS: f64 = 4000.0;

// ─── Pirates: captain ───────────────────────────────────────────────────

pub const CAPTAIN_FLEE_THRESHOLD: f64 = 0.3;
pub const CAPTAIN_HULL_REGEN_PER_SEC: f64 = 0.15;
pub const CAPTAIN_SHIELD_REGEN_PER_SEC: f64 = 0.20;
pub const CAPTAIN_REENGAGE_THRESHOLD: f64 = 0.8;
pub const CAPTAIN_STEAL_RANGE: f64 = 150.0;

// ─── Pirates: dreadnought ───────────────────────────────────────────────

pub const DREADNOUGHT_SPAWN_HEALTH_FRACTION: f64 = 0.25;
pub const DREADNOUGHT_SPAWN_DURATION_MS: f64 = 1000.0;
pub const DREADNOUGHT_STANDOFF_RANGE_MIN: f64 = 400.0;
pub const DREADNOUGHT_STANDOFF_RANGE_MAX: f64 = 700.0;
pub const DREADNOUGHT_FIRE_COOLDOWN_MS: f64 = 1200.0;
pub const DREADNOUGHT_SHIELD_PIERCING: f64 = 0.10;
pub const DREADNOUGHT_BLOCK_CHANCE: f64 = 0.35;
pub const DREADNOUGHT_ENRAGED_SPEED_MULT: f64 = 2.0;
pub const DREADNOUGHT_ENRAGED_FIRE_COOLDOWN_MS: f64 = 800.0;
pub const DREADNOUGHT_ENRAGED_DAMAGE_MULT: f64 = 1.25;
pub const DREADNOUGHT_ENRAGED_MIN_AGGRO_RANGE: f64 = 1500.0;

// ─── Pirates: stealing and intel ────────────────────────────────────────

pub const STEAL_COOLDOWN_MS: f64 = 10_000.0;
pub const STEAL_RANGE: f64 = 150.0;
pub const STEAL_SCRAP_ITEMS_MAX: usize = 2;
pub const STEAL_CLAIM_FRACTION: f64 = 0.15;

pub const INTEL_VALIDITY_MS: f64 = 30_000.0;
pub const INTEL_BROADCAST_RADIUS: f64 = 1000.0;

// ─── Boss: Swarm Queen ───────────────────────────────────────────────────

/// Hull fractions delimiting HUNT/(p1]/SIEGE/(p2]/SWARM/(p3]/DESPERATION.
pub const QUEEN_PHASE_P1: f64 = 0.75;
pub const QUEEN_PHASE_P2: f64 = 0.5;
pub const QUEEN_PHASE_P3: f64 = 0.25;

pub const QUEEN_HUNT_SPEED_MULT: f64 = 1.0;
pub const QUEEN_HUNT_DAMAGE_MULT: f64 = 1.0;
pub const QUEEN_SIEGE_SPEED_MULT: f64 = 0.6;
pub const QUEEN_SIEGE_DAMAGE_MULT: f64 = 1.15;
pub const QUEEN_SWARM_SPEED_MULT: f64 = 1.0;
pub const QUEEN_SWARM_DAMAGE_MULT: f64 = 1.0;
pub const QUEEN_DESPERATION_SPEED_MULT: f64 = 1.5;
pub const QUEEN_DESPERATION_DAMAGE_MULT: f64 = 1.5;

pub const QUEEN_PATROL_RADIUS: f64 = 300.0;
pub const QUEEN_PATROL_RADIUS_JITTER: f64 = 50.0;
pub const QUEEN_PATROL_ANGULAR_SPEED: f64 = 0.15;

pub const QUEEN_WEB_SNARE_COOLDOWN_MS: f64 = 8000.0;
pub const QUEEN_WEB_SNARE_CHARGE_MS: f64 = 1200.0;
pub const QUEEN_WEB_SNARE_PROJECTILE_SPEED: f64 = 500.0;
pub const QUEEN_WEB_SNARE_SLOW_RADIUS: f64 = 250.0;
pub const QUEEN_WEB_SNARE_SLOW_DURATION_MS: f64 = 4000.0;
pub const QUEEN_WEB_SNARE_SLOW_PERCENT: f64 = 0.5;

pub const QUEEN_ACID_BURST_COOLDOWN_MS: f64 = 6000.0;
pub const QUEEN_ACID_BURST_CHARGE_MS: f64 = 800.0;
pub const QUEEN_ACID_BURST_PROJECTILE_SPEED: f64 = 600.0;
pub const QUEEN_ACID_BURST_RADIUS: f64 = 200.0;
pub const QUEEN_ACID_BURST_DAMAGE: f64 = 15.0;
pub const QUEEN_ACID_BURST_DOT_DAMAGE: f64 = 4.0;
pub const QUEEN_ACID_BURST_DOT_INTERVAL_MS: f64 = 1000.0;
pub const QUEEN_ACID_BURST_DOT_DURATION_MS: f64 = 5000.0;

pub const QUEEN_DESPERATION_COOLDOWN_DIVISOR: f64 = 2.0;

// ─── Boss: Void Leviathan ────────────────────────────────────────────────

pub const LEVIATHAN_COMBAT_APPROACH_FRACTION: f64 = 0.7;
pub const LEVIATHAN_COMBAT_FIRE_COOLDOWN_MS: f64 = 1000.0;

pub const LEVIATHAN_CONTINUOUS_SPAWN_INTERVAL_MS: f64 = 15_000.0;
pub const LEVIATHAN_MAX_ACTIVE_MINIONS: usize = 6;

/// (hull_fraction_threshold, rift_count) pairs, evaluated high hull to low.
pub const LEVIATHAN_HEALTH_THRESHOLDS: &[(f64, u32)] = &[(0.75, 2), (0.5, 3), (0.25, 4)];

pub const GRAVITY_WELL_COOLDOWN_MS: f64 = 20_000.0;
pub const GRAVITY_WELL_WARNING_DURATION_MS: f64 = 1000.0;
pub const GRAVITY_WELL_ACTIVE_DURATION_MS: f64 = 4000.0;
pub const GRAVITY_WELL_RADIUS: f64 = 400.0;
pub const GRAVITY_WELL_PULL_STRENGTH: f64 = 80.0;
pub const GRAVITY_WELL_DAMAGE_EDGE: f64 = 2.0;
pub const GRAVITY_WELL_DAMAGE_CENTER: f64 = 10.0;

pub const CONSUME_COOLDOWN_MS: f64 = 25_000.0;
pub const CONSUME_RANGE: f64 = 600.0;
pub const CONSUME_HULL_WEIGHT: f64 = 0.7;
pub const CONSUME_PROXIMITY_WEIGHT: f64 = 0.3;
pub const CONSUME_TENDRIL_SPEED: f64 = 300.0;
pub const CONSUME_DRAG_DURATION_MS: f64 = 1500.0;
pub const CONSUME_HEAL_MULTIPLIER: f64 = 0.5;

// ─── Boss: Barnacle King (supplemental, see DESIGN.md) ──────────────────

pub const BARNACLE_KING_TERRITORY_RADIUS_MULT: f64 = 3.0;
pub const BARNACLE_KING_DAMAGE_MULT: f64 = 2.0;
pub const BARNACLE_KING_CALCIFY_COOLDOWN_MS: f64 = 12_000.0;
pub const BARNACLE_KING_CALCIFY_DURATION_MS: f64 = 3000.0;
pub const BARNACLE_KING_CALCIFY_RADIUS: f64 = 300.0;

// ─── Rage-mode fallback (orphaned NPCs) ─────────────────────────────────

pub const RAGE_MODE_SPEED_MULT: f64 = 1.2;
pub const RAGE_MODE_DAMAGE_MULT: f64 = 1.2;
pub const RAGE_MODE_FIRE_COOLDOWN_MS: f64 = 800.0;
