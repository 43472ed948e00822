use crate::battle::effectiveness::effectiveness_multiplier;
use crate::battle::element::ElementRelations;
use crate::battle::state::CharacterState;

/// Share of the attacker's max HP dealt per hit before multipliers.
pub const BASE_DAMAGE_RATIO: f64 = 0.2;

/// Damage `attacker` deals to `defender` in one hit.
pub fn execute_attack(
    attacker: &CharacterState,
    defender: &CharacterState,
    relations: &ElementRelations,
) -> i64 {
    execute_attack_with_ratio(attacker, defender, relations, BASE_DAMAGE_RATIO)
}

/// `floor(max_hp * ratio * element * effectiveness)`. Only the attacker's edge counts: the
/// defender's element and intelligence can reduce the hit but never boost it.
pub fn execute_attack_with_ratio(
    attacker: &CharacterState,
    defender: &CharacterState,
    relations: &ElementRelations,
    base_damage_ratio: f64,
) -> i64 {
    let base = attacker.max_hp as f64 * base_damage_ratio;
    let element = relations.multiplier(attacker.sheet.element, defender.sheet.element);
    let effectiveness = effectiveness_multiplier(
        f64::from(attacker.intelligence),
        f64::from(defender.intelligence),
    );
    (base * element * effectiveness).floor().max(0.0) as i64
}
