//! Pure stat formulas.

use crate::{catalog::Armor, catalog::Shield, rules::Race, Ability, AbilityScores};

/// floor((score - 10) / 2), rounding toward negative infinity.
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

pub fn apply_racial_bonus(base: AbilityScores, race: Race) -> AbilityScores {
    let mut adjusted = base;
    for ability in Ability::ALL {
        adjusted.set(ability, base.get(ability) + race.bonus(ability));
    }
    adjusted
}

/// Level-1 hit points. Not clamped: a low enough constitution can go to zero
/// or below.
pub fn max_hp(hit_die: i32, constitution_modifier: i32) -> i32 {
    hit_die + constitution_modifier
}

pub fn spell_save_dc(casting_modifier: i32, proficiency_bonus: i32) -> i32 {
    8 + proficiency_bonus + casting_modifier
}

pub fn spell_attack_bonus(casting_modifier: i32, proficiency_bonus: i32) -> i32 {
    proficiency_bonus + casting_modifier
}

pub fn skill_modifier(
    ability_mod: i32,
    proficient: bool,
    expertise: bool,
    proficiency_bonus: i32,
) -> i32 {
    let bonus = if expertise {
        proficiency_bonus * 2
    } else if proficient {
        proficiency_bonus
    } else {
        0
    };
    ability_mod + bonus
}

pub fn passive_perception(wisdom_mod: i32, perception_proficient: bool, proficiency_bonus: i32) -> i32 {
    10 + wisdom_mod + if perception_proficient { proficiency_bonus } else { 0 }
}

/// Unarmored is 10 + dex. Armor that adds dex uses the full modifier when
/// `max_dex` is `None` and caps it otherwise; armor that doesn't add dex
/// ignores it entirely. A shield stacks on top.
pub fn armor_class(dex_mod: i32, armor: Option<&Armor>, shield: Option<&Shield>) -> i32 {
    let body = match armor {
        None => 10 + dex_mod,
        Some(a) if a.add_dex => {
            let dex = match a.max_dex {
                Some(cap) => dex_mod.min(cap),
                None => dex_mod,
            };
            a.base_ac + dex
        }
        Some(a) => a.base_ac,
    };
    body + shield.map_or(0, |s| s.ac_bonus)
}
