//! The faction-AI layer: one `Strategy` implementation per faction (or
//! boss), a `Dispatcher` that routes each NPC to the right one every
//! tick, and an applier that turns the `Action` it returns into engine
//! state changes and outbound `EngineEvent`s (§4).

pub mod action;
pub mod applier;
pub mod barnacle_king;
pub mod dispatch;
pub mod flanking;
pub mod formation;
pub mod hooks;
pub mod leviathan;
pub mod miner;
pub mod pirate;
pub mod queen;
pub mod rage_mode;
pub mod retreat;
pub mod strategy;
pub mod swarm;
pub mod territorial;

pub use dispatch::Dispatcher;
pub use strategy::{Strategy, TickContext};
