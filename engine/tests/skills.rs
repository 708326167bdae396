use chargen_engine::*;

fn builder() -> Builder {
    Builder::new(BuildConfig::default()).unwrap()
}

fn after_class(class: &str, primary: Option<&str>) -> CharacterBuildState {
    let b = builder();
    let state = b
        .set_abilities(&CharacterBuildState::new(), AbilityScores::uniform(12))
        .unwrap();
    let state = b.choose_race(&state, "Halfling").unwrap();
    b.choose_class(&state, class, primary).unwrap()
}

#[test]
fn rogue_needs_four_skills() {
    let state = after_class("Rogue", None);
    let err = builder()
        .choose_skills(&state, &["Stealth", "Acrobatics", "Deception"])
        .unwrap_err();
    assert_eq!(
        err,
        BuildError::WrongSkillCount {
            class: ClassId::Rogue,
            expected: 4,
            got: 3
        }
    );
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn rogue_expertise_from_chosen_skills() {
    let b = builder();
    let state = after_class("Rogue", None);
    let state = b
        .choose_skills(&state, &["Stealth", "Acrobatics", "Deception", "sleight_of_hand"])
        .unwrap();
    assert_eq!(state.next_step(), Some(Step::ChooseExpertise));

    let done = b.choose_expertise(&state, &["Stealth", "Sleight of Hand"]).unwrap();
    assert_eq!(done.stage, BuildStage::ExpertiseChosen);
    assert!(done.expertise.contains(&Skill::SleightOfHand));
    assert_eq!(done.next_step(), Some(Step::PurchaseEquipment));

    let err = b.choose_expertise(&state, &["Stealth", "Perception"]).unwrap_err();
    assert!(matches!(err, BuildError::InvalidExpertise(_)));

    let err = b.choose_expertise(&state, &["Stealth"]).unwrap_err();
    assert!(matches!(err, BuildError::InvalidExpertise(_)));
}

#[test]
fn skills_must_come_from_class_pool() {
    let b = builder();
    let state = after_class("Wizard", None);
    assert_eq!(
        b.choose_skills(&state, &["Arcana", "Stealth"]),
        Err(BuildError::InvalidSkill {
            class: ClassId::Wizard,
            skill: "Stealth".into()
        })
    );
    assert_eq!(
        b.choose_skills(&state, &["Arcana", "arcana"]),
        Err(BuildError::DuplicateSelection("Arcana".into()))
    );
    let ok = b.choose_skills(&state, &["Arcana", "History"]).unwrap();
    assert_eq!(ok.next_step(), Some(Step::ChooseSpells));
}

#[test]
fn fighter_options_checks_count_then_style() {
    let b = builder();
    let state = after_class("Fighter", Some("dexterity"));
    assert_eq!(
        b.fighter_options(&state, Some("Archery"), &["Athletics"]),
        Err(BuildError::InvalidSkillCount {
            expected: 2,
            got: 1
        })
    );
    assert_eq!(
        b.fighter_options(&state, None, &["Athletics", "Perception"]),
        Err(BuildError::MissingFightingStyle)
    );
    assert_eq!(
        b.fighter_options(&state, Some("Berserking"), &["Athletics", "Perception"]),
        Err(BuildError::InvalidFightingStyle("Berserking".into()))
    );
    let ok = b
        .fighter_options(&state, Some("two-weapon fighting"), &["Athletics", "Perception"])
        .unwrap();
    assert_eq!(ok.fighting_style, Some(FightingStyle::TwoWeaponFighting));
    assert_eq!(ok.next_step(), Some(Step::PurchaseEquipment));
}

#[test]
fn generic_skill_step_does_not_apply_to_fighters() {
    let state = after_class("Fighter", Some("strength"));
    assert_eq!(
        builder().choose_skills(&state, &["Athletics", "Perception"]),
        Err(BuildError::StepNotApplicable {
            step: Step::ChooseSkills,
            class: ClassId::Fighter
        })
    );
}

#[test]
fn fighter_primary_ability_is_required() {
    let b = builder();
    let state = b
        .set_abilities(&CharacterBuildState::new(), AbilityScores::uniform(12))
        .unwrap();
    let state = b.choose_race(&state, "Human").unwrap();
    assert_eq!(
        b.choose_class(&state, "Fighter", None),
        Err(BuildError::MissingPrimaryAbility {
            class: ClassId::Fighter
        })
    );
    assert!(matches!(
        b.choose_class(&state, "Fighter", Some("wisdom")),
        Err(BuildError::InvalidPrimaryAbility { .. })
    ));
    assert_eq!(
        b.choose_class(&state, "Bard", None),
        Err(BuildError::InvalidClass("Bard".into()))
    );
    let wizard = b.choose_class(&state, "wizard", None).unwrap();
    assert_eq!(wizard.primary_ability, Some(Ability::Int));
}

#[test]
fn spells_need_exact_counts_from_class_list() {
    let b = builder();
    let state = after_class("Cleric", None);
    let state = b.choose_skills(&state, &["Medicine", "Religion"]).unwrap();

    let cantrips = ["guidance", "light", "sacred_flame"];
    let first = ["bless", "cure_wounds", "healing_word", "sanctuary", "command", "bane"];

    assert_eq!(
        b.choose_spells(&state, &cantrips[..2], &first[..]),
        Err(BuildError::WrongSpellCount {
            tier: SpellTier::Cantrip,
            expected: 3,
            got: 2
        })
    );
    assert_eq!(
        b.choose_spells(&state, &cantrips[..], &first[..5]),
        Err(BuildError::WrongSpellCount {
            tier: SpellTier::FirstLevel,
            expected: 6,
            got: 5
        })
    );
    assert_eq!(
        b.choose_spells(&state, &["guidance", "light", "fire_bolt"], &first[..]),
        Err(BuildError::UnknownSpell {
            class: ClassId::Cleric,
            tier: SpellTier::Cantrip,
            id: "fire_bolt".into()
        })
    );

    let ok = b.choose_spells(&state, &cantrips[..], &first[..]).unwrap();
    assert_eq!(ok.cantrips, vec!["guidance", "light", "sacred_flame"]);
    assert_eq!(ok.first_level_spells.len(), 6);
    assert_eq!(ok.next_step(), Some(Step::PurchaseEquipment));
}
