use serde::{Deserialize, Serialize};

use crate::world::ids::BaseId;
use crate::world::npc::Faction;
use crate::world::Vec2;

/// Faction-specific accumulators as a variant rather than a single
/// struct with optional fields for every faction (§3.2 / teacher's
/// preference for small focused structs, e.g. `CombatPlayerData` vs a
/// god-struct).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BaseKind {
    PirateOutpost,
    ScavengerYard { scrap_pile: ScrapPile },
    MiningClaim { claim_credits: f64, has_foreman: bool },
    SwarmHive,
}

/// Present on any non-swarm base currently under drone assault (§4.6).
/// Kept separate from `BaseKind` because assimilation is a process that
/// happens *to* a pirate outpost / scavenger yard / mining claim, not a
/// kind of its own — the base's original kind is still meaningful right
/// up until `progress` reaches `threshold`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AssimilationProgress {
    pub progress: u32,
    pub threshold: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapPile {
    pub count: u32,
    pub contents: Vec<String>,
}

impl ScrapPile {
    pub fn invariant_holds(&self) -> bool {
        self.contents.len() as u32 == self.count
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Base {
    pub id: BaseId,
    pub faction: Faction,
    pub kind: BaseKind,
    pub position: Vec2,
    pub health: f64,
    pub max_health: f64,
    pub destroyed: bool,
    pub assimilation: Option<AssimilationProgress>,
}

impl Base {
    pub fn new(faction: Faction, kind: BaseKind, position: Vec2, max_health: f64) -> Base {
        Base {
            id: BaseId::next(),
            faction,
            kind,
            position,
            health: max_health,
            max_health,
            destroyed: false,
            assimilation: None,
        }
    }

    pub fn destroy(&mut self) {
        self.health = 0.0;
        self.destroyed = true;
    }

    /// §4.6: on full assimilation the base's kind and faction flip to
    /// the swarm-controlled counterpart.
    pub fn assimilate_into_swarm(&mut self) {
        self.faction = Faction::Swarm;
        self.kind = BaseKind::SwarmHive;
        self.assimilation = None;
    }

    /// Increments assimilation progress, flipping the base in place once
    /// `progress` reaches `threshold` (§4.6, invariant #10 in §8: the
    /// base flips exactly once on equality).
    pub fn advance_assimilation(&mut self, threshold: u32) -> bool {
        let entry = self.assimilation.get_or_insert(AssimilationProgress {
            progress: 0,
            threshold,
        });
        if entry.progress >= entry.threshold {
            return false;
        }
        entry.progress += 1;
        let flipped = entry.progress >= entry.threshold;
        if flipped {
            self.assimilate_into_swarm();
        }
        flipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrap_pile_invariant() {
        let pile = ScrapPile {
            count: 2,
            contents: vec!["plating".into(), "core".into()],
        };
        assert!(pile.invariant_holds());
    }

    #[test]
    fn assimilate_flips_faction_and_kind() {
        let mut base = Base::new(
            Faction::Scavenger,
            BaseKind::ScavengerYard { scrap_pile: ScrapPile::default() },
            Vec2::ZERO,
            500.0,
        );
        base.assimilate_into_swarm();
        assert_eq!(base.faction, Faction::Swarm);
        assert!(matches!(base.kind, BaseKind::SwarmHive));
    }

    #[test]
    fn assimilation_flips_exactly_on_threshold() {
        let mut base = Base::new(Faction::Scavenger, BaseKind::PirateOutpost, Vec2::ZERO, 500.0);
        assert!(!base.advance_assimilation(3));
        assert!(!base.advance_assimilation(3));
        assert!(base.advance_assimilation(3));
        assert_eq!(base.faction, Faction::Swarm);
    }
}
