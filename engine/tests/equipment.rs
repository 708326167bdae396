use chargen_engine::*;

fn wizard_builder() -> Builder {
    let mut config = BuildConfig::default();
    config.starting_gold.insert(ClassId::Wizard, 100);
    Builder::new(config).unwrap()
}

/// A Wizard ready to shop, dexterity 14.
fn wizard_at_equipment(b: &Builder) -> CharacterBuildState {
    let mut scores = AbilityScores::uniform(10);
    scores.dexterity = 14;
    scores.intelligence = 16;
    let state = b.set_abilities(&CharacterBuildState::new(), scores).unwrap();
    let state = b.choose_race(&state, "Human").unwrap();
    let state = b.choose_class(&state, "Wizard", None).unwrap();
    let state = b.choose_skills(&state, &["Arcana", "History"]).unwrap();
    b.choose_spells(
        &state,
        &["fire_bolt", "mage_hand", "light"],
        &["magic_missile", "shield", "sleep", "detect_magic", "mage_armor", "find_familiar"],
    )
    .unwrap()
}

fn dagger() -> WeaponRef {
    WeaponRef {
        category: WeaponCategory::SimpleMelee,
        name: "Dagger".into(),
    }
}

/// Dagger (2 gp) plus 97 gp of scholarly gear.
fn ninety_nine_gold() -> EquipmentRequest {
    EquipmentRequest {
        weapons: vec![dagger()],
        gear: ["scholars_pack", "component_pouch", "book", "healers_kit", "backpack"]
            .map(String::from)
            .to_vec(),
        ..Default::default()
    }
}

#[test]
fn budget_comes_from_config_override() {
    let b = wizard_builder();
    let state = wizard_at_equipment(&b);
    assert_eq!(state.starting_funds, Some(Coins::from_gold(100)));
    assert_eq!(state.funds, Some(Coins::from_gold(100)));
}

#[test]
fn preview_does_not_touch_state() {
    let b = wizard_builder();
    let state = wizard_at_equipment(&b);
    let outcome = b
        .purchase_equipment(&state, &ninety_nine_gold(), PurchaseAction::Preview)
        .unwrap();
    assert_eq!(outcome.resolution.total_cost(), Coins::from_gold(99));
    assert_eq!(outcome.resolution.remaining_cp, 100);
    assert_eq!(outcome.resolution.remaining(), Some(Coins::gold(1)));
    assert_eq!(outcome.state, state);
    assert_eq!(outcome.armor_class, 12);
}

#[test]
fn purchase_commits_remaining_funds() {
    let b = wizard_builder();
    let state = wizard_at_equipment(&b);
    let outcome = b
        .purchase_equipment(&state, &ninety_nine_gold(), PurchaseAction::Purchase)
        .unwrap();
    let bought = outcome.state;
    assert_eq!(bought.stage, BuildStage::EquipmentPurchased);
    assert_eq!(bought.funds, Some(Coins::gold(1)));
    assert_eq!(bought.armor_class, Some(12));
    let equipment = bought.equipment.unwrap();
    assert_eq!(equipment.weapons.len(), 1);
    assert!(equipment.weapons[0].proficient);
    assert_eq!(equipment.gear.len(), 5);
    assert!(bought.proficiency_warnings.is_empty());
}

#[test]
fn over_budget_purchase_is_rejected() {
    let b = wizard_builder();
    let state = wizard_at_equipment(&b);
    let request = EquipmentRequest {
        gear: vec!["magnifying_glass".into(), "chest".into()],
        ..Default::default()
    };
    let err = b
        .purchase_equipment(&state, &request, PurchaseAction::Purchase)
        .unwrap_err();
    assert_eq!(
        err,
        BuildError::Equipment(EquipmentError::BudgetExceeded {
            total: 10_500,
            budget: 10_000,
            shortfall: 500
        })
    );
    assert_eq!(err.kind(), ErrorKind::Budget);

    // The same selection still previews, with negative remaining funds.
    let preview = b
        .purchase_equipment(&state, &request, PurchaseAction::Preview)
        .unwrap();
    assert_eq!(preview.resolution.remaining_cp, -500);
}

#[test]
fn rebuying_resets_to_the_starting_budget() {
    let b = wizard_builder();
    let state = wizard_at_equipment(&b);
    let first = b
        .purchase_equipment(&state, &ninety_nine_gold(), PurchaseAction::Purchase)
        .unwrap()
        .state;
    let request = EquipmentRequest {
        weapons: vec![dagger()],
        ..Default::default()
    };
    let second = b
        .purchase_equipment(&first, &request, PurchaseAction::Purchase)
        .unwrap()
        .state;
    assert_eq!(second.funds, Some(Coins::from_gold(98)));
    assert_eq!(second.equipment.unwrap().gear.len(), 0);
}

#[test]
fn unproficient_armor_is_advisory() {
    let b = wizard_builder();
    let state = wizard_at_equipment(&b);
    let request = EquipmentRequest {
        armor: Some("Leather".into()),
        ..Default::default()
    };
    let bought = b
        .purchase_equipment(&state, &request, PurchaseAction::Purchase)
        .unwrap()
        .state;
    assert_eq!(bought.proficiency_warnings.len(), 1);
    assert_eq!(bought.armor_class, Some(13));
}

#[test]
fn unknown_item_fails_selection() {
    let b = wizard_builder();
    let state = wizard_at_equipment(&b);
    let request = EquipmentRequest {
        weapons: vec![WeaponRef {
            category: WeaponCategory::SimpleMelee,
            name: "Lightsaber".into(),
        }],
        ..Default::default()
    };
    assert!(matches!(
        b.purchase_equipment(&state, &request, PurchaseAction::Preview),
        Err(BuildError::Equipment(EquipmentError::InvalidSelection { kind: "weapon", .. }))
    ));
}

#[test]
fn equipment_before_class_is_out_of_order() {
    let b = wizard_builder();
    let state = b
        .set_abilities(&CharacterBuildState::new(), AbilityScores::uniform(10))
        .unwrap();
    let err = b
        .purchase_equipment(&state, &ninety_nine_gold(), PurchaseAction::Preview)
        .unwrap_err();
    assert_eq!(
        err,
        BuildError::OutOfOrder {
            attempted: Step::PurchaseEquipment,
            expected: Step::ChooseRace
        }
    );
    assert_eq!(err.kind(), ErrorKind::Sequencing);
}
