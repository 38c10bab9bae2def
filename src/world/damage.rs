//! Shield-then-hull damage resolution, generalized from the teacher's
//! `systems/combat.rs::apply_damage` with the shield-piercing fraction
//! from §4.8 ("Shield piercing weapon contract").

use crate::world::npc::Npc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageResult {
    pub pierce_damage: f64,
    pub shield_damage: f64,
    pub hull_damage: f64,
    pub died: bool,
}

/// Applies `damage` to `target`, routing `damage * shield_piercing`
/// straight to hull before the remainder resolves shield-then-hull as
/// usual. `shield_piercing` is clamped to `[0, 1]`; pass `0.0` for a
/// normal hit.
pub fn apply_damage(target: &mut Npc, damage: f64, shield_piercing: f64) -> DamageResult {
    let damage = damage.max(0.0);
    let piercing = shield_piercing.clamp(0.0, 1.0);

    let pierce = damage * piercing;
    let remainder = damage - pierce;

    let shield_damage = remainder.min(target.shield);
    let hull_from_remainder = remainder - shield_damage;

    target.shield -= shield_damage;
    target.hull -= pierce + hull_from_remainder;
    target.clamp_vitals();

    DamageResult {
        pierce_damage: pierce,
        shield_damage,
        hull_damage: pierce + hull_from_remainder,
        died: target.hull <= 0.0,
    }
}

/// Heals hull/shield, clamping at their respective maxima — shared by
/// every faction's healing-state behavior (§4.3 scavenger healing,
/// §4.8 captain healing).
pub fn apply_heal(target: &mut Npc, hull_amount: f64, shield_amount: f64) {
    target.hull += hull_amount.max(0.0);
    target.shield += shield_amount.max(0.0);
    target.clamp_vitals();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::npc::NpcType;
    use crate::world::Vec2;

    fn npc() -> Npc {
        Npc::spawn(NpcType::Scavenger, Vec2::ZERO, None, Vec2::ZERO)
    }

    #[test]
    fn shield_absorbs_before_hull() {
        let mut n = npc();
        n.shield = 50.0;
        n.shield_max = 50.0;
        n.hull = 100.0;
        n.hull_max = 100.0;
        let result = apply_damage(&mut n, 30.0, 0.0);
        assert_eq!(result.shield_damage, 30.0);
        assert_eq!(result.hull_damage, 0.0);
        assert_eq!(n.shield, 20.0);
        assert_eq!(n.hull, 100.0);
    }

    #[test]
    fn overflow_damage_spills_into_hull() {
        let mut n = npc();
        n.shield = 10.0;
        n.shield_max = 10.0;
        n.hull = 100.0;
        n.hull_max = 100.0;
        let result = apply_damage(&mut n, 30.0, 0.0);
        assert_eq!(result.shield_damage, 10.0);
        assert_eq!(result.hull_damage, 20.0);
        assert_eq!(n.shield, 0.0);
        assert_eq!(n.hull, 80.0);
    }

    #[test]
    fn shield_piercing_hits_hull_directly() {
        let mut n = npc();
        n.shield = 100.0;
        n.shield_max = 100.0;
        n.hull = 100.0;
        n.hull_max = 100.0;
        let result = apply_damage(&mut n, 100.0, 0.10);
        assert_eq!(result.pierce_damage, 10.0);
        assert_eq!(result.shield_damage, 90.0);
        assert_eq!(result.hull_damage, 10.0);
        assert_eq!(n.shield, 10.0);
        assert_eq!(n.hull, 90.0);
    }

    #[test]
    fn lethal_damage_marks_death_and_clamps_hull_nonnegative() {
        let mut n = npc();
        n.shield = 0.0;
        n.hull = 5.0;
        let result = apply_damage(&mut n, 50.0, 0.0);
        assert!(result.died);
        assert_eq!(n.hull, 0.0);
    }

    #[test]
    fn heal_clamps_to_max() {
        let mut n = npc();
        n.hull = 90.0;
        n.hull_max = 100.0;
        apply_heal(&mut n, 50.0, 0.0);
        assert_eq!(n.hull, 100.0);
    }
}
