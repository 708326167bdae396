use chargen_engine::*;
use proptest::prelude::*;

#[test]
fn scripted_dice_reroll_low_faces() {
    // 1 and 2 are re-rolled: the four kept dice are 6, 5, 4, 3.
    let mut dice = Dice::from_scripted(vec![1, 6, 2, 5, 4, 3]).unwrap();
    assert_eq!(dice.ability_score(), 15);
}

#[test]
fn scripts_reject_faces_a_d6_cannot_show() {
    assert_eq!(
        Dice::from_scripted(vec![4, 9]).err(),
        Some(ScriptError::FaceOutOfRange(9))
    );
    assert_eq!(
        Dice::from_scripted(vec![0]).err(),
        Some(ScriptError::FaceOutOfRange(0))
    );
    assert_eq!(Dice::from_scripted(vec![]).err(), Some(ScriptError::Empty));
}

#[test]
fn scripts_need_a_face_that_ends_the_reroll() {
    assert_eq!(
        Dice::from_scripted(vec![1, 2]).err(),
        Some(ScriptError::NoKeepableFace)
    );
}

#[test]
fn scripted_faces_fold_into_smaller_dice() {
    let mut dice = Dice::from_scripted(vec![6, 5]).unwrap();
    assert_eq!(dice.roll(4), 2);
    assert_eq!(dice.roll(4), 1);
}

#[test]
fn same_seed_same_scores() {
    let a = AbilityScores::roll(&mut Dice::from_seed(42));
    let b = AbilityScores::roll(&mut Dice::from_seed(42));
    assert_eq!(a, b);
}

#[test]
fn roll_step_stores_six_scores() {
    let builder = Builder::new(BuildConfig::default()).unwrap();
    let mut dice = Dice::from_scripted(vec![6]).unwrap();
    let state = builder
        .roll_abilities(&CharacterBuildState::new(), &mut dice)
        .unwrap();
    assert_eq!(state.base_scores, Some(AbilityScores::uniform(18)));
    assert_eq!(state.stage, BuildStage::AbilitiesRolled);
    assert_eq!(state.next_step(), Some(Step::ChooseRace));
}

#[test]
fn hand_entered_scores_need_every_ability() {
    let builder = Builder::new(BuildConfig::default()).unwrap();
    let input: StepInput = serde_json::from_str(
        r#"{"step": "set_abilities", "scores": {"STR": 15, "dex": 14, "constitution": 13, "int": 12, "wis": 10}}"#,
    )
    .unwrap();
    assert_eq!(
        builder.apply(&CharacterBuildState::new(), &input),
        Err(BuildError::MissingAbility("charisma".into()))
    );
}

#[test]
fn hand_entered_scores_are_range_checked() {
    let builder = Builder::new(BuildConfig::default()).unwrap();
    let mut scores = AbilityScores::uniform(10);
    scores.wisdom = 19;
    assert!(matches!(
        builder.set_abilities(&CharacterBuildState::new(), scores),
        Err(BuildError::AbilityOutOfRange { score: 19, .. })
    ));
}

proptest! {
    #[test]
    fn rolled_scores_stay_in_range(seed in any::<u64>()) {
        let scores = AbilityScores::roll(&mut Dice::from_seed(seed));
        for (_, score) in scores.iter() {
            prop_assert!((9..=18).contains(&score));
        }
    }

    #[test]
    fn scripted_scores_stay_in_range(script in prop::collection::vec(1u8..=6, 1..12)) {
        prop_assume!(script.iter().any(|&f| f >= 3));
        let mut dice = Dice::from_scripted(script).unwrap();
        let score = dice.ability_score();
        prop_assert!((9..=18).contains(&score));
    }
}
