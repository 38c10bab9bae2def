use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Monotonic id allocator, same pattern as the teacher's `NPC::next_id`.
static NEXT_NPC_ID: AtomicU32 = AtomicU32::new(10_000);
static NEXT_BASE_ID: AtomicU32 = AtomicU32::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct NpcId(pub u32);

impl NpcId {
    pub fn next() -> Self {
        NpcId(NEXT_NPC_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "npc-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct BaseId(pub u32);

impl BaseId {
    pub fn next() -> Self {
        BaseId(NEXT_BASE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "base-{}", self.0)
    }
}

/// Player ids come from the surrounding game server; we just carry them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn npc_ids_are_unique_and_increasing() {
        let a = NpcId::next();
        let b = NpcId::next();
        assert!(b.0 > a.0);
    }
}
