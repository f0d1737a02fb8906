//! Integration tests for the `clicker-economy` world.
//!
//! Each test drives a complete [`World`] through its public API only:
//! registration, manual clicks, purchases, modifiers and elapsed time.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::float_cmp
)]

use std::cell::RefCell;
use std::rc::Rc;

use clicker_economy::{
    AutomatorConfig, CurrencyConfig, EffectConfig, GeneratorConfig, ModifierConfig, Processed,
    World, WorldSnapshot,
};
use clicker_types::{CurrencyId, GeneratorId, PurchaseResult};
use num_bigint::BigInt;

// =============================================================================
// Helpers
// =============================================================================

fn gold_world() -> (World, CurrencyId) {
    let mut world = World::new(2024);
    let gold = world
        .add_currency(CurrencyConfig::named("Gold"))
        .expect("currency");
    (world, gold)
}

/// A level-1 generator paying one unit per cycle.
fn unit_generator(world: &mut World, currency: CurrencyId) -> GeneratorId {
    let id = world
        .add_generator(GeneratorConfig::for_currency(currency))
        .expect("generator");
    world.generator_mut(id).unwrap().item_mut().upgrade();
    id
}

fn balance(world: &World, currency: CurrencyId) -> BigInt {
    world.currency(currency).unwrap().value().clone()
}

// =============================================================================
// Automator catch-up
// =============================================================================

#[test]
fn automator_catches_up_on_large_deltas() {
    let (mut world, gold) = gold_world();
    let mine = unit_generator(&mut world, gold);
    world
        .add_automator(AutomatorConfig::for_generator(mine))
        .unwrap();

    world.update(1.0);
    assert_eq!(world.generator(mine).unwrap().times_processed(), 1);
    world.update(9.0);
    assert_eq!(world.generator(mine).unwrap().times_processed(), 10);
    assert_eq!(balance(&world, gold), BigInt::from(10));
}

#[test]
fn offline_progress_fires_every_interval() {
    let (mut world, gold) = gold_world();
    let mine = unit_generator(&mut world, gold);
    world
        .add_automator(AutomatorConfig {
            tick_rate: 0.5,
            ..AutomatorConfig::for_generator(mine)
        })
        .unwrap();

    assert_eq!(world.update(10_000.0), 20_000);
    assert_eq!(balance(&world, gold), BigInt::from(20_000));
    assert_eq!(world.automators().first().unwrap().tick_timer(), 0.0);
}

#[test]
fn automators_fire_in_registration_order() {
    let (mut world, gold) = gold_world();
    let first = unit_generator(&mut world, gold);
    let second = unit_generator(&mut world, gold);

    let seen = Rc::new(RefCell::new(Vec::new()));
    for id in [first, second] {
        let log = Rc::clone(&seen);
        world
            .generator_mut(id)
            .unwrap()
            .set_callback(Some(Box::new(move |event: &Processed<'_>| {
                log.borrow_mut().push(event.generator);
            })));
    }
    world
        .add_automator(AutomatorConfig::for_generator(second))
        .unwrap();
    world
        .add_automator(AutomatorConfig::for_generator(first))
        .unwrap();

    world.update(2.0);
    assert_eq!(*seen.borrow(), vec![second, second, first, first]);
}

// =============================================================================
// Remainder banking
// =============================================================================

#[test]
fn remainder_banking_pays_a_bonus_unit() {
    let (mut world, gold) = gold_world();
    let mine = world
        .add_generator(GeneratorConfig {
            amount_multiplier: 1.2,
            ..GeneratorConfig::for_currency(gold)
        })
        .unwrap();
    world.generator_mut(mine).unwrap().item_mut().set_level(2);

    let totals: Vec<BigInt> = (0..5)
        .map(|_| {
            world.process_generator(mine).unwrap();
            balance(&world, gold)
        })
        .collect();
    let expected: Vec<BigInt> = [1, 2, 3, 4, 6].into_iter().map(BigInt::from).collect();
    assert_eq!(totals, expected);
}

#[test]
fn remainder_is_lost_without_banking() {
    let (mut world, gold) = gold_world();
    let mine = world
        .add_generator(GeneratorConfig {
            amount_multiplier: 1.2,
            use_remainder: false,
            ..GeneratorConfig::for_currency(gold)
        })
        .unwrap();
    world.generator_mut(mine).unwrap().item_mut().set_level(2);

    for _ in 0..5 {
        world.process_generator(mine).unwrap();
    }
    assert_eq!(balance(&world, gold), BigInt::from(5));
}

// =============================================================================
// Modifiers
// =============================================================================

#[test]
fn speed_modifiers_compose_multiplicatively() {
    let mut world = World::default();
    let double = world
        .add_modifier(ModifierConfig::new(EffectConfig::speed_by(2.0)))
        .unwrap();
    let triple = world
        .add_modifier(ModifierConfig::new(EffectConfig::speed_by(3.0)))
        .unwrap();

    world.enable_modifier(double).unwrap();
    world.enable_modifier(triple).unwrap();
    assert!((world.speed_multiplier() - 6.0).abs() < 1e-12);

    world.disable_modifier(double).unwrap();
    assert!((world.speed_multiplier() - 3.0).abs() < 1e-12);

    world.disable_modifier(triple).unwrap();
    assert!((world.speed_multiplier() - 1.0).abs() < 1e-12);
}

#[test]
fn disabling_automation_pauses_automators() {
    let (mut world, gold) = gold_world();
    let mine = unit_generator(&mut world, gold);
    world
        .add_automator(AutomatorConfig::for_generator(mine))
        .unwrap();
    let pause = world
        .add_modifier(ModifierConfig::new(EffectConfig::disable_automation()))
        .unwrap();

    world.update(10.0);
    assert_eq!(balance(&world, gold), BigInt::from(10));

    world.enable_modifier(pause).unwrap();
    assert!(!world.is_automation_enabled());
    assert_eq!(world.update(10.0), 0);
    assert_eq!(balance(&world, gold), BigInt::from(10));

    world.disable_modifier(pause).unwrap();
    world.update(10.0);
    assert_eq!(balance(&world, gold), BigInt::from(20));
}

#[test]
fn automation_stays_off_until_every_suspension_is_lifted() {
    let mut world = World::default();
    let a = world
        .add_modifier(ModifierConfig::new(EffectConfig::disable_automation()))
        .unwrap();
    let b = world
        .add_modifier(ModifierConfig::new(EffectConfig::disable_automation()))
        .unwrap();

    world.enable_modifier(a).unwrap();
    world.enable_modifier(b).unwrap();
    world.disable_modifier(a).unwrap();
    assert!(!world.is_automation_enabled());
    world.disable_modifier(b).unwrap();
    assert!(world.is_automation_enabled());
}

#[test]
fn generator_modifier_scales_output_while_enabled() {
    let (mut world, gold) = gold_world();
    let mine = world
        .add_generator(GeneratorConfig {
            base_amount: BigInt::from(10),
            ..GeneratorConfig::for_currency(gold)
        })
        .unwrap();
    world.generator_mut(mine).unwrap().item_mut().upgrade();
    let boost = world
        .add_modifier(ModifierConfig::new(EffectConfig::output_by(mine, 2.5)))
        .unwrap();

    world.enable_modifier(boost).unwrap();
    world.enable_modifier(boost).unwrap();
    assert_eq!(world.process_generator(mine).unwrap(), Some(BigInt::from(25)));

    world.disable_modifier(boost).unwrap();
    assert_eq!(world.process_generator(mine).unwrap(), Some(BigInt::from(10)));
    assert_eq!(balance(&world, gold), BigInt::from(35));
}

// =============================================================================
// Purchases
// =============================================================================

#[test]
fn purchase_flow_respects_funds_and_max_level() {
    let (mut world, gold) = gold_world();
    let factory = world
        .add_generator(GeneratorConfig {
            name: "Factory".to_owned(),
            base_price: BigInt::from(500),
            max_level: 1,
            ..GeneratorConfig::for_currency(gold)
        })
        .unwrap();
    let vault = world
        .add_generator(GeneratorConfig {
            name: "Vault".to_owned(),
            base_amount: BigInt::from(600),
            ..GeneratorConfig::for_currency(gold)
        })
        .unwrap();
    world.generator_mut(vault).unwrap().item_mut().upgrade();

    assert_eq!(
        world.generator(factory).unwrap().item().price(),
        BigInt::from(500)
    );
    assert_eq!(
        world.buy_generator(factory, gold).unwrap(),
        PurchaseResult::InsufficientFunds
    );
    assert_eq!(world.generator(factory).unwrap().item().level(), 0);

    world.process_generator(vault).unwrap();
    assert_eq!(balance(&world, gold), BigInt::from(600));

    assert_eq!(
        world.buy_generator(factory, gold).unwrap(),
        PurchaseResult::Ok
    );
    assert_eq!(world.generator(factory).unwrap().item().level(), 1);
    assert_eq!(balance(&world, gold), BigInt::from(100));

    world.process_generator(vault).unwrap();
    assert_eq!(
        world.buy_generator(factory, gold).unwrap(),
        PurchaseResult::MaxLevelReached
    );
    assert_eq!(world.generator(factory).unwrap().item().level(), 1);
    assert_eq!(balance(&world, gold), BigInt::from(700));
}

#[test]
fn automator_levels_are_purchasable() {
    let (mut world, gold) = gold_world();
    let mine = unit_generator(&mut world, gold);
    let auto = world
        .add_automator(AutomatorConfig {
            base_price: BigInt::from(3),
            ..AutomatorConfig::for_generator(mine)
        })
        .unwrap();

    world.update(3.0);
    assert_eq!(
        world.buy_automator(auto, gold).unwrap(),
        PurchaseResult::Ok
    );
    assert_eq!(world.automator(auto).unwrap().item().level(), 1);
    assert_eq!(balance(&world, gold), BigInt::from(0));
}

// =============================================================================
// Currency arithmetic
// =============================================================================

#[test]
fn currency_add_sub_round_trips_on_huge_values() {
    let (mut world, gold) = gold_world();
    let huge = BigInt::from(10).pow(60) + BigInt::from(7);
    let currency = world.currency_mut(gold).unwrap();
    currency.add(&BigInt::from(42));
    currency.add(&huge);
    currency.sub(&huge);
    assert_eq!(currency.value(), &BigInt::from(42));
    currency.multiply(1.0).unwrap();
    assert_eq!(currency.value(), &BigInt::from(42));
    assert_eq!(currency.to_string(), "Gold: 42");
}

// =============================================================================
// Determinism and persistence
// =============================================================================

#[test]
fn probability_outcomes_are_reproducible_per_seed() {
    let run = |seed: u64| {
        let mut world = World::new(seed);
        let gold = world.add_currency(CurrencyConfig::default()).unwrap();
        let lucky = world
            .add_generator(GeneratorConfig {
                probability: Some(0.5),
                ..GeneratorConfig::for_currency(gold)
            })
            .unwrap();
        world.generator_mut(lucky).unwrap().item_mut().upgrade();
        for _ in 0..200 {
            world.process_generator(lucky).unwrap();
        }
        balance(&world, gold)
    };

    let first = run(99);
    assert_eq!(first, run(99));
    assert!(first > BigInt::from(0));
    assert!(first < BigInt::from(200));
}

#[test]
fn snapshot_survives_json_and_continues_identically() {
    let (mut world, gold) = gold_world();
    let mine = world
        .add_generator(GeneratorConfig {
            amount_multiplier: 1.2,
            ..GeneratorConfig::for_currency(gold)
        })
        .unwrap();
    world.generator_mut(mine).unwrap().item_mut().set_level(2);
    world
        .add_automator(AutomatorConfig {
            tick_rate: 0.75,
            ..AutomatorConfig::for_generator(mine)
        })
        .unwrap();
    let lucky = world
        .add_generator(GeneratorConfig {
            name: "Lucky".to_owned(),
            probability: Some(0.5),
            ..GeneratorConfig::for_currency(gold)
        })
        .unwrap();
    world.generator_mut(lucky).unwrap().item_mut().upgrade();
    world
        .add_automator(AutomatorConfig {
            tick_rate: 0.125,
            ..AutomatorConfig::for_generator(lucky)
        })
        .unwrap();
    let fast = world
        .add_modifier(ModifierConfig::new(EffectConfig::speed_by(2.0)))
        .unwrap();
    world.enable_modifier(fast).unwrap();
    world.update(1.3);
    assert!(world.generator(lucky).unwrap().draws() > 0);

    let json = serde_json::to_string(&world.snapshot()).unwrap();
    let decoded: WorldSnapshot = serde_json::from_str(&json).unwrap();
    let mut restored = World::restore(&decoded).unwrap();
    assert_eq!(restored.snapshot(), world.snapshot());

    world.update(7.7);
    restored.update(7.7);
    assert_eq!(balance(&restored, gold), balance(&world, gold));
    assert_eq!(
        restored.generator(lucky).unwrap().times_processed(),
        world.generator(lucky).unwrap().times_processed()
    );
    assert_eq!(restored.snapshot(), world.snapshot());

    restored.disable_modifier(fast).unwrap();
    assert!((restored.speed_multiplier() - 1.0).abs() < 1e-12);
}
