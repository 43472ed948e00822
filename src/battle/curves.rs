//! Combat-check curves: decide whether an attacking strength overcomes a defending one.
//!
//! Each curve takes strictly positive `attacker`/`defender` strengths and uniform draws in
//! `[0, 1)`, and returns `true` when the attacker gets through. Raising `defender` against a
//! fixed `attacker` and draw never turns a failure into a success.
//!
//! Rough success rates (attacker = 1):
//!
//! | defender | Attackable | LessAttackable | LessDefensable | Defensable |
//! |---------:|-----------:|---------------:|---------------:|-----------:|
//! | 0.5      | 100%       | 79%            | 50%            | 33%        |
//! | 0.8      | 83%        | 66%            | 39%            | 11%        |
//! | 1.0      | 74%        | 59%            | 33%            | 0%         |
//! | 1.2      | 65%        | 48%            | 18%            | 0%         |
//! | 1.5      | 50%        | 31%            | 0%             | 0%         |
//! | 2.0      | 26%        | 0%             | 0%             | 0%         |

use serde::{Deserialize, Serialize};

use crate::battle::rng::DrawSource;

/// Defender share of attacker strength below which an Attackable check always succeeds.
pub const ATTACKABLE_FLOOR: f64 = 0.5;
pub const ATTACKABLE_STEEPNESS: f64 = 2.0;
/// Defender share of attacker strength below which a LessAttackable check always succeeds.
pub const LESS_ATTACKABLE_FLOOR: f64 = 0.2;
pub const LESS_ATTACKABLE_STEEPNESS: f64 = 2.5;
/// Share of the defender subtracted from the attacker in a LessDefensable check.
pub const LESS_DEFENSABLE_WEIGHT: f64 = 0.66;
pub const LESS_DEFENSABLE_STEEPNESS: f64 = 6.0;
pub const LESS_DEFENSABLE_DAMPING_FLOOR: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckCurve {
    /// Neither side holds a structural edge.
    Neutral,
    /// Strong attacker edge.
    Attackable,
    /// Mild attacker edge.
    LessAttackable,
    /// Mild defender edge.
    LessDefensable,
    /// Strong defender edge; an equal or stronger defender always holds.
    Defensable,
}

impl CheckCurve {
    pub const ALL: [CheckCurve; 5] = [
        CheckCurve::Neutral,
        CheckCurve::Attackable,
        CheckCurve::LessAttackable,
        CheckCurve::LessDefensable,
        CheckCurve::Defensable,
    ];

    /// Resolve one check, pulling as many draws as the curve needs (two for Neutral, one otherwise).
    pub fn roll<D: DrawSource + ?Sized>(self, attacker: f64, defender: f64, draws: &mut D) -> bool {
        match self {
            Self::Neutral => {
                let left = draws.next_draw();
                let right = draws.next_draw();
                neutral_check(attacker, defender, left, right)
            }
            Self::Attackable => attackable_check(attacker, defender, draws.next_draw()),
            Self::LessAttackable => less_attackable_check(attacker, defender, draws.next_draw()),
            Self::LessDefensable => less_defensable_check(attacker, defender, draws.next_draw()),
            Self::Defensable => defensable_check(attacker, defender, draws.next_draw()),
        }
    }
}

fn sigmoid(steepness: f64, x: f64) -> f64 {
    1.0 / (1.0 + (-steepness * x).exp())
}

/// Normalised strength gap in `(-1, 1)`, positive when the attacker is stronger.
fn strength_gap(attacker: f64, defender: f64) -> f64 {
    (attacker - defender) / (attacker + defender)
}

pub fn neutral_check(attacker: f64, defender: f64, left_draw: f64, right_draw: f64) -> bool {
    defender * left_draw < attacker * right_draw
}

pub fn attackable_check(attacker: f64, defender: f64, draw: f64) -> bool {
    tapered_attack(
        attacker,
        defender,
        draw,
        ATTACKABLE_FLOOR,
        ATTACKABLE_STEEPNESS,
    )
}

pub fn less_attackable_check(attacker: f64, defender: f64, draw: f64) -> bool {
    tapered_attack(
        attacker,
        defender,
        draw,
        LESS_ATTACKABLE_FLOOR,
        LESS_ATTACKABLE_STEEPNESS,
    )
}

/// Shared shape of the attacker-favoured curves. The sigmoid damping shrinks the denominator
/// as the defender pulls ahead, which demands an ever smaller draw.
fn tapered_attack(attacker: f64, defender: f64, draw: f64, floor: f64, steepness: f64) -> bool {
    let numerator = defender - attacker * floor;
    let damping = (2.0 * sigmoid(steepness, strength_gap(attacker, defender))).min(1.0);
    let denominator = (attacker + defender) * damping;
    numerator / denominator < 1.0 - draw
}

pub fn less_defensable_check(attacker: f64, defender: f64, draw: f64) -> bool {
    let numerator = attacker - defender * LESS_DEFENSABLE_WEIGHT;
    let damping = sigmoid(LESS_DEFENSABLE_STEEPNESS, strength_gap(attacker, defender))
        .max(LESS_DEFENSABLE_DAMPING_FLOOR);
    let denominator = (attacker + defender) * damping;
    numerator / denominator > draw
}

pub fn defensable_check(attacker: f64, defender: f64, draw: f64) -> bool {
    strength_gap(attacker, defender) > draw
}
