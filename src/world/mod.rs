//! World state: the authoritative NPC/base/player records the AI core
//! reads and mutates each tick, plus the neighborhood views built fresh
//! every tick and the shield/hull damage primitive shared by every
//! strategy that resolves a `fire` action.

pub mod base;
pub mod damage;
pub mod ids;
pub mod neighborhood;
pub mod npc;
pub mod player;

pub use base::{Base, BaseKind};
pub use ids::{BaseId, NpcId, PlayerId};
pub use neighborhood::{Neighborhood, NeighborhoodScratch};
pub use npc::{Faction, Npc, NpcType};
pub use player::PlayerRef;

/// Plain 2D vector, used for position, velocity, and facing throughout
/// the AI core. Matches the teacher's `Vec2` (`systems/npc.rs`) field for
/// field, kept free of any rendering-specific helpers.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    pub fn distance(&self, other: Vec2) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn sub(&self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }

    pub fn add(&self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }

    pub fn scale(&self, s: f64) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn normalized(&self) -> Vec2 {
        let len = self.length();
        if len < 1e-9 {
            Vec2::ZERO
        } else {
            Vec2::new(self.x / len, self.y / len)
        }
    }

    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn from_angle(angle: f64, magnitude: f64) -> Vec2 {
        Vec2::new(angle.cos() * magnitude, angle.sin() * magnitude)
    }

    /// Move `self` toward `target` by at most `step` units, snapping onto
    /// target rather than overshooting. Mirrors the teacher's `move_toward`.
    pub fn move_toward(&self, target: Vec2, step: f64) -> Vec2 {
        let delta = target.sub(*self);
        let dist = delta.length();
        if dist <= step || dist < 1e-9 {
            target
        } else {
            self.add(delta.scale(step / dist))
        }
    }

    /// Move `self` away from `origin` by `step` units. Mirrors the
    /// teacher's `move_away`.
    pub fn move_away(&self, origin: Vec2, step: f64) -> Vec2 {
        let delta = self.sub(origin);
        let dir = delta.normalized();
        if dir == Vec2::ZERO {
            // No defined direction; pick an arbitrary one rather than freeze.
            self.add(Vec2::new(step, 0.0))
        } else {
            self.add(dir.scale(step))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_toward_does_not_overshoot() {
        let start = Vec2::new(0.0, 0.0);
        let target = Vec2::new(10.0, 0.0);
        let next = start.move_toward(target, 100.0);
        assert_eq!(next, target);
    }

    #[test]
    fn move_toward_steps_partway() {
        let start = Vec2::new(0.0, 0.0);
        let target = Vec2::new(10.0, 0.0);
        let next = start.move_toward(target, 4.0);
        assert!((next.x - 4.0).abs() < 1e-9);
    }
}
