//! Faction AI and tick engine for a multiplayer space-combat sandbox:
//! per-faction `Strategy` behaviors, a `Dispatcher` that routes every
//! NPC to the right one each tick, an `Engine` that owns world state
//! and turns decided `Action`s into outbound `EngineEvent`s.

pub mod ai;
pub mod config;
pub mod engine;
pub mod world;

pub use ai::action::{Action, EngineEvent};
pub use ai::hooks::{StaticWorldHooks, WorldHooks};
pub use engine::Engine;
