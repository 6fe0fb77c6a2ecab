//! Offers: collision re-rolls, pinned tiers and overrides.

use super::support::*;
use crate::catalog::Variant;
use crate::types::Berry;

fn distinct_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    let factories: [(&str, fn() -> RewardEntry); 8] = [
        ("a", || RewardEntry::Concrete(consumable("A"))),
        ("b", || RewardEntry::Concrete(consumable("B"))),
        ("c", || RewardEntry::Concrete(consumable("C"))),
        ("d", || RewardEntry::Concrete(consumable("D"))),
        ("e", || RewardEntry::Concrete(consumable("E"))),
        ("f", || RewardEntry::Concrete(consumable("F"))),
        ("g1", || RewardEntry::Concrete(consumable("Grouped One").with_group("g"))),
        ("g2", || RewardEntry::Concrete(consumable("Grouped Two").with_group("g"))),
    ];
    for (id, factory) in factories {
        catalog.register(id, factory).unwrap();
    }
    catalog
}

fn distinct_engine(seed: u64) -> RewardEngine {
    let entries: &[(&str, u32)] =
        &[("a", 1), ("b", 1), ("c", 1), ("d", 1), ("e", 1), ("f", 1), ("g1", 1), ("g2", 1)];
    engine_with(seed, distinct_catalog(), PoolKind::Player, &[(Tier::Common, entries)])
}

#[test]
fn batches_never_repeat_a_name_or_group() {
    for seed in 0..40 {
        let mut engine = distinct_engine(seed);
        let mut run = run_with(3);
        let snapshot = engine.regenerate_thresholds(&run, PoolKind::Player, 0);
        let options = engine.resolve_batch(4, &snapshot, &mut run, None).unwrap();

        assert_eq!(options.len(), 4);
        for (i, left) in options.iter().enumerate() {
            for right in &options[i + 1..] {
                assert!(
                    !left.collides_with(right),
                    "seed {seed}: {} vs {}",
                    left.kind.name,
                    right.kind.name
                );
            }
        }
    }
}

#[test]
fn batches_replay_for_the_same_seed() {
    let offer = |seed| {
        let mut engine = default_engine(seed);
        let mut run = run_with(4);
        let snapshot = engine.regenerate_thresholds(&run, PoolKind::Player, 0);
        engine
            .resolve_batch(5, &snapshot, &mut run, None)
            .unwrap()
            .into_iter()
            .map(|option| (option.kind.name, option.upgrade_count, option.id))
            .collect::<Vec<_>>()
    };
    assert_eq!(offer(77), offer(77));
}

#[test]
fn pinned_tiers_apply_to_leading_slots() {
    let mut engine = default_engine(21);
    let mut run = run_with(2);
    let snapshot = engine.regenerate_thresholds(&run, PoolKind::Player, 0);
    let options = engine.resolve_batch(3, &snapshot, &mut run, Some(&[Tier::Rogue])).unwrap();

    assert!(options[0].tier() >= Some(Tier::Rogue));
}

#[test]
fn overrides_replace_leading_slots_after_resolution() {
    let mut engine = default_engine(22);
    let mut run = run_with(2);
    engine.set_overrides(vec![
        RewardOverride::new(keys::MASTER_TOKEN),
        RewardOverride::new(keys::BERRY).with_variant(Variant::Index(0)),
    ]);
    let snapshot = engine.regenerate_thresholds(&run, PoolKind::Player, 0);
    let options = engine.resolve_batch(3, &snapshot, &mut run, None).unwrap();

    assert_eq!(options[0].kind.id, keys::MASTER_TOKEN);
    assert_eq!(options[0].upgrade_count, 0);
    assert_eq!(options[0].tier(), Some(Tier::Master));
    assert_eq!(options[1].kind.effect, RewardEffect::Berry(Berry::Sitrus));
    assert_eq!(engine.overrides().len(), 2);
}

#[test]
fn rejected_overrides_keep_the_natural_slot() {
    let mut engine = distinct_engine(23);
    let mut run = run_with(1);
    engine.set_overrides(vec![RewardOverride::new("missing")]);
    let snapshot = engine.regenerate_thresholds(&run, PoolKind::Player, 0);
    let options = engine.resolve_batch(2, &snapshot, &mut run, None).unwrap();

    assert_eq!(options.len(), 2);
    assert_ne!(options[0].kind.id, "missing");

    engine.clear_overrides();
    assert!(engine.overrides().is_empty());
}
