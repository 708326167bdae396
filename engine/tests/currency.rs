use chargen_engine::*;
use proptest::prelude::*;

#[test]
fn greedy_split() {
    assert_eq!(
        currency_to_coins(1_234),
        Coins {
            pp: 1,
            gp: 2,
            sp: 3,
            cp: 4
        }
    );
    assert_eq!(currency_to_coins(0), Coins::default());
    assert_eq!(Coins::from_gold(55), Coins { pp: 5, gp: 5, sp: 0, cp: 0 });
}

#[test]
fn sparse_costs_deserialize() {
    let cost: Coins = serde_json::from_str(r#"{"sp": 2}"#).unwrap();
    assert_eq!(cost.to_copper(), 20);
}

proptest! {
    #[test]
    fn copper_round_trip(total in 0u64..10_000_000) {
        prop_assert_eq!(coins_to_currency(currency_to_coins(total)), total);
    }

    #[test]
    fn normalized_coins_round_trip(pp in 0u64..10_000, gp in 0u64..10, sp in 0u64..10, cp in 0u64..10) {
        let coins = Coins { pp, gp, sp, cp };
        prop_assert!(coins.is_normalized());
        prop_assert_eq!(currency_to_coins(coins_to_currency(coins)), coins);
    }

    #[test]
    fn value_is_preserved_for_any_breakdown(pp in 0u64..100, gp in 0u64..1_000, sp in 0u64..1_000, cp in 0u64..1_000) {
        let coins = Coins { pp, gp, sp, cp };
        prop_assert_eq!(Coins::from_copper(coins.to_copper()).to_copper(), coins.to_copper());
    }
}
