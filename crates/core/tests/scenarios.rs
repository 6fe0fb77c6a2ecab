use loot_core::catalog::{RewardCategory, RewardEffect, RewardKind, Variant};
use loot_core::content::keys;
use loot_core::{
    Catalog, Element, EngineConfig, EngineError, Party, PartyMember, PoolKind, PoolSet,
    RewardEngine, RewardEntry, RewardOverride, RewardPool, RunState, SpeciesId, Tier,
    WeightedEntry,
};

fn member(species: u16) -> PartyMember {
    PartyMember::new(SpeciesId(species), vec![Element::Grass])
}

#[test]
fn test_forced_great_tier_with_one_static_entry() {
    let mut catalog = Catalog::new();
    catalog
        .register("great_only", || {
            RewardEntry::Concrete(RewardKind::new(
                "Great Only",
                RewardCategory::Persistent { max_stack: 99 },
                RewardEffect::MoneyBoost { percent: 5 },
            ))
        })
        .unwrap();
    let pool = RewardPool::new(PoolKind::Player)
        .with_tier(Tier::Great, vec![WeightedEntry::fixed("great_only", 10)]);
    let mut engine =
        RewardEngine::new(404, catalog, PoolSet::new().with_pool(pool), EngineConfig::default())
            .unwrap();

    let mut party = Party::new();
    party.add(member(1));
    let mut run = RunState::with_party(party);
    let snapshot = engine.regenerate_thresholds(&run, PoolKind::Player, 0);

    let option =
        engine.resolve_one(&snapshot, &mut run, Some(Tier::Great), None).unwrap().unwrap();
    assert_eq!(option.kind.id, "great_only");
    assert_eq!(option.tier(), Some(Tier::Great));
    assert_eq!(option.upgrade_count, 0);
}

#[test]
fn test_held_item_at_cap_on_one_member_stays_open_for_another() {
    let mut engine = RewardEngine::with_default_content(5, EngineConfig::default()).unwrap();
    let mut party = Party::new();
    let mut stacked = member(1);
    stacked.hold(keys::SHELL_BELL, 4);
    stacked.hold(keys::LEFTOVERS, 4);
    let stacked = party.add(stacked);
    let open = party.add(member(2));
    let run = RunState::with_party(party);

    let offered = |engine: &mut RewardEngine, target| {
        engine
            .enemy_options_for_wave(&run, target, PoolKind::Wild, 200, 2)
            .unwrap()
            .into_iter()
            .map(|option| option.kind.id)
            .collect::<Vec<_>>()
    };

    let for_stacked = offered(&mut engine, stacked);
    assert!(!for_stacked.iter().any(|id| id == keys::SHELL_BELL || id == keys::LEFTOVERS));

    let for_open = offered(&mut engine, open);
    assert!(for_open.iter().any(|id| id == keys::SHELL_BELL || id == keys::LEFTOVERS));
}

#[test]
fn test_snapshot_must_follow_every_checkpoint() {
    let mut engine = RewardEngine::with_default_content(6, EngineConfig::default()).unwrap();
    let mut run = RunState::default();
    run.party.add(member(3));

    let snapshot = engine.regenerate_thresholds(&run, PoolKind::Player, 0);
    run.persistent.add(keys::EXP_SHARE, 1);
    assert!(matches!(
        engine.resolve_batch(3, &snapshot, &mut run, None),
        Err(EngineError::StaleThresholds { pool_kind: PoolKind::Player })
    ));

    let snapshot = engine.regenerate_thresholds(&run, PoolKind::Player, 0);
    assert_eq!(engine.resolve_batch(3, &snapshot, &mut run, None).unwrap().len(), 3);
}

#[test]
fn test_persistent_rewards_at_cap_leave_the_table() {
    let mut engine = RewardEngine::with_default_content(8, EngineConfig::default()).unwrap();
    let mut run = RunState::default();
    run.party.add(member(4));
    run.persistent.add(keys::EXP_SHARE, 5);

    engine.regenerate_thresholds(&run, PoolKind::Player, 0);
    let ultra = engine.thresholds(PoolKind::Player).unwrap().tier(Tier::Ultra).unwrap();
    assert!(ultra.thresholds().iter().all(|threshold| threshold.reward_id != keys::EXP_SHARE));
}

#[test]
fn test_overrides_land_after_natural_resolution() {
    let mut engine = RewardEngine::with_default_content(9, EngineConfig::default()).unwrap();
    let mut run = RunState::default();
    run.party.add(member(5));
    engine.set_overrides(vec![
        RewardOverride::new(keys::TERA_SHARD).with_variant(Variant::Index(1)),
        RewardOverride::new("not_registered"),
    ]);

    let snapshot = engine.regenerate_thresholds(&run, PoolKind::Player, 0);
    let options = engine.resolve_batch(4, &snapshot, &mut run, None).unwrap();
    assert_eq!(options.len(), 4);
    assert_eq!(options[0].kind.effect, RewardEffect::ChangeElement(Element::Fire));
    assert_eq!(options[0].upgrade_count, 0);
    assert_ne!(options[1].kind.id, "not_registered");
}

#[test]
fn test_daily_run_starts_with_three_items_per_member() {
    let mut engine = RewardEngine::with_default_content(10, EngineConfig::default()).unwrap();
    let mut party = Party::new();
    for species in 1..=6 {
        party.add(member(species));
    }
    let run = RunState::with_party(party);
    let options = engine.daily_starter_options(&run).unwrap();
    assert_eq!(options.len(), 18);
    assert!(options.iter().all(|(_, option)| option.tier() != Some(Tier::Master)));
}
