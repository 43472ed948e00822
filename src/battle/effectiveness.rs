/// Intelligence-gap multiplier applied to the attacker's damage.
///
/// `1.0` when the attacker is at least as intelligent as the defender, otherwise
/// `2a / (a + d)`, which tends to 0 as the gap widens. Never exceeds 1.
pub fn effectiveness_multiplier(attacker_intelligence: f64, defender_intelligence: f64) -> f64 {
    if attacker_intelligence >= defender_intelligence {
        1.0
    } else {
        2.0 * attacker_intelligence / (attacker_intelligence + defender_intelligence)
    }
}
