use chargen_engine::catalog::Catalog;
use chargen_engine::*;
use proptest::prelude::*;

fn scores(str_: i32, dex: i32, con: i32, int: i32, wis: i32, cha: i32) -> AbilityScores {
    AbilityScores {
        strength: str_,
        dexterity: dex,
        constitution: con,
        intelligence: int,
        wisdom: wis,
        charisma: cha,
    }
}

#[test]
fn modifier_table() {
    assert_eq!(ability_modifier(10), 0);
    assert_eq!(ability_modifier(8), -1);
    assert_eq!(ability_modifier(18), 4);
    assert_eq!(ability_modifier(7), -2);
}

#[test]
fn human_bonus_is_identity() {
    let base = scores(15, 14, 13, 12, 10, 8);
    assert_eq!(apply_racial_bonus(base, Race::Human), base);
}

#[test]
fn elf_adds_dex_and_cha() {
    let base = scores(10, 14, 10, 10, 10, 10);
    let adjusted = apply_racial_bonus(base, Race::Elf);
    assert_eq!(adjusted.dexterity, 16);
    assert_eq!(adjusted.charisma, 11);
    assert_eq!(adjusted.strength, 10);
    assert_eq!(adjusted.constitution, 10);
}

#[test]
fn hp_is_not_floored() {
    assert_eq!(max_hp(8, -1), 7);
    assert_eq!(max_hp(6, -6), 0);
}

#[test]
fn armor_class_branches() {
    let catalog = Catalog::builtin().unwrap();
    let leather = catalog.find_armor("Leather").unwrap();
    let hide = catalog.find_armor("Hide").unwrap();
    let chain = catalog.find_armor("Chain Mail").unwrap();
    let shield = catalog.find_shield("Shield").unwrap();

    assert_eq!(armor_class(3, None, None), 13);
    // uncapped
    assert_eq!(armor_class(4, Some(leather), None), 15);
    // capped at +2
    assert_eq!(armor_class(4, Some(hide), None), 14);
    assert_eq!(armor_class(-1, Some(hide), None), 11);
    // no dex at all
    assert_eq!(armor_class(3, Some(chain), None), 16);
    assert_eq!(armor_class(-2, Some(chain), None), 16);
    assert_eq!(armor_class(3, Some(chain), Some(shield)), 18);
    assert_eq!(armor_class(1, None, Some(shield)), 13);
}

proptest! {
    #[test]
    fn modifier_is_floor_division(score in -20i32..40) {
        let m = ability_modifier(score);
        prop_assert!(2 * m <= score - 10);
        prop_assert!(score - 10 < 2 * m + 2);
    }

    #[test]
    fn racial_bonus_adds_exact_deltas(base in 3i32..=18, race_idx in 0usize..4) {
        let race = Race::ALL[race_idx];
        let adjusted = apply_racial_bonus(AbilityScores::uniform(base), race);
        for (ability, score) in adjusted.iter() {
            prop_assert_eq!(score, base + race.bonus(ability));
        }
    }
}
