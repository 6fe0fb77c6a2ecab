//! Cumulative-weight tables derived from a pool and the live run state.
//! A table is only valid for the run fingerprint and reroll count it was built from; the
//! `ThresholdSnapshot` token carries both so resolution can refuse stale tables.

use std::collections::{BTreeMap, BTreeSet};

use log::warn;

use crate::catalog::{Catalog, EntryMeta, RewardCategory};
use crate::pool::{RewardPool, WeightedEntry};
use crate::state::RunState;
use crate::types::{PoolKind, Tier};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Threshold {
    pub cumulative: u32,
    pub index: usize,
    pub reward_id: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EntryDiagnostic {
    pub tier: Tier,
    pub index: usize,
    pub reward_id: String,
    pub weight: u32,
    pub max_weight: u32,
    pub percent_of_tier: f64,
    pub percent_of_total: f64,
}

pub(crate) struct LiveWeight<'a> {
    pub(crate) index: usize,
    pub(crate) reward_id: &'a str,
    pub(crate) weight: u32,
    pub(crate) max_weight: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TierThresholds {
    thresholds: Vec<Threshold>,
    ignored: BTreeSet<usize>,
    diagnostics: Vec<EntryDiagnostic>,
}

impl TierThresholds {
    pub(crate) fn from_weights<'a>(
        tier: Tier,
        weights: impl IntoIterator<Item = LiveWeight<'a>>,
    ) -> Self {
        let mut table = TierThresholds::default();
        let mut running_total = 0u32;
        for live in weights {
            table.diagnostics.push(EntryDiagnostic {
                tier,
                index: live.index,
                reward_id: live.reward_id.to_string(),
                weight: live.weight,
                max_weight: live.max_weight,
                percent_of_tier: 0.0,
                percent_of_total: 0.0,
            });
            if live.weight == 0 {
                table.ignored.insert(live.index);
                continue;
            }
            running_total = running_total.saturating_add(live.weight);
            table.thresholds.push(Threshold {
                cumulative: running_total,
                index: live.index,
                reward_id: live.reward_id.to_string(),
            });
        }
        for diagnostic in &mut table.diagnostics {
            diagnostic.percent_of_tier = percent(diagnostic.weight, running_total);
        }
        table
    }

    /// Sum of live weights; the last cumulative breakpoint.
    pub fn total(&self) -> u32 {
        self.thresholds.last().map_or(0, |threshold| threshold.cumulative)
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    pub fn thresholds(&self) -> &[Threshold] {
        &self.thresholds
    }

    pub fn ignored(&self) -> &BTreeSet<usize> {
        &self.ignored
    }

    pub fn diagnostics(&self) -> &[EntryDiagnostic] {
        &self.diagnostics
    }

    /// First breakpoint strictly above `value`.
    pub fn pick(&self, value: u32) -> Option<&Threshold> {
        self.thresholds.iter().find(|threshold| value < threshold.cumulative)
    }
}

/// Token proving the caller regenerated thresholds for the state it resolves against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdSnapshot {
    pub pool_kind: PoolKind,
    pub generation: u64,
    pub fingerprint: u64,
    pub reroll_count: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ThresholdTable {
    snapshot: ThresholdSnapshot,
    tiers: BTreeMap<Tier, TierThresholds>,
}

impl ThresholdTable {
    pub fn build(
        pool: &RewardPool,
        catalog: &Catalog,
        run: &RunState,
        reroll_count: u32,
        generation: u64,
    ) -> Self {
        let mut tiers = BTreeMap::new();
        for (tier, entries) in pool.tiers() {
            let weights = entries.iter().enumerate().map(|(index, entry)| LiveWeight {
                index,
                reward_id: &entry.reward_id,
                weight: live_weight(entry, catalog.meta(&entry.reward_id), run, reroll_count),
                max_weight: entry.max_weight,
            });
            tiers.insert(tier, TierThresholds::from_weights(tier, weights));
        }

        let overall: u32 = tiers.values().map(TierThresholds::total).sum();
        for table in tiers.values_mut() {
            for diagnostic in &mut table.diagnostics {
                diagnostic.percent_of_total = percent(diagnostic.weight, overall);
            }
        }

        let snapshot = ThresholdSnapshot {
            pool_kind: pool.kind(),
            generation,
            fingerprint: run.fingerprint(reroll_count),
            reroll_count,
        };
        Self { snapshot, tiers }
    }

    pub fn snapshot(&self) -> ThresholdSnapshot {
        self.snapshot
    }

    pub fn tier(&self, tier: Tier) -> Option<&TierThresholds> {
        self.tiers.get(&tier)
    }

    pub fn tiers(&self) -> impl Iterator<Item = (Tier, &TierThresholds)> {
        self.tiers.iter().map(|(tier, table)| (*tier, table))
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &EntryDiagnostic> {
        self.tiers.values().flat_map(TierThresholds::diagnostics)
    }
}

/// Weight an entry contributes this cycle. Zero removes it from the cumulative table.
pub fn live_weight(
    entry: &WeightedEntry,
    meta: Option<&EntryMeta>,
    run: &RunState,
    reroll_count: u32,
) -> u32 {
    if let Some(meta) = meta
        && at_stack_cap(&entry.reward_id, meta.category, run)
    {
        return 0;
    }

    let weight = entry.weight.evaluate(run, reroll_count);
    if weight < 0 {
        warn!("weight for {} evaluated to {weight}; clamping to zero", entry.reward_id);
        return 0;
    }
    weight as u32
}

fn at_stack_cap(reward_id: &str, category: RewardCategory, run: &RunState) -> bool {
    let Some(max_stack) = category.max_stack() else {
        return false;
    };
    // Held items are capped per member: only excluded once nobody in the context can
    // take another stack.
    if category.is_member_keyed() {
        return !run.party.is_empty()
            && run.party.iter().all(|(_, member)| member.held_count(reward_id) >= max_stack);
    }
    run.persistent.stack_count(reward_id) >= max_stack
}

fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 { 0.0 } else { f64::from(part) * 100.0 / f64::from(whole) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{RewardEffect, RewardEntry, RewardKind};
    use crate::state::PartyMember;
    use crate::types::{Element, SpeciesId};

    fn exp_share() -> RewardEntry {
        RewardEntry::Concrete(RewardKind::new(
            "Exp. Share",
            RewardCategory::Persistent { max_stack: 2 },
            RewardEffect::ExpBoost { percent: 20 },
        ))
    }

    fn potion() -> RewardEntry {
        RewardEntry::Concrete(RewardKind::new(
            "Potion",
            RewardCategory::Consumable,
            RewardEffect::Heal { percent: 20 },
        ))
    }

    fn leftovers() -> RewardEntry {
        RewardEntry::Concrete(RewardKind::new(
            "Leftovers",
            RewardCategory::HeldItem { max_stack: 2 },
            RewardEffect::HeldBoost { percent: 10 },
        ))
    }

    fn mega_stone() -> RewardEntry {
        RewardEntry::Concrete(RewardKind::new(
            "Mega Stone",
            RewardCategory::FormChangeItem,
            RewardEffect::FormChange { form: "mega".to_string() },
        ))
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.register("exp_share", exp_share).unwrap();
        catalog.register("potion", potion).unwrap();
        catalog.register("leftovers", leftovers).unwrap();
        catalog.register("mega_stone", mega_stone).unwrap();
        catalog
    }

    #[test]
    fn cumulative_keys_sum_live_weights_and_skip_zeroes() {
        let pool = RewardPool::new(PoolKind::Player).with_tier(
            Tier::Common,
            vec![
                WeightedEntry::fixed("potion", 3),
                WeightedEntry::dynamic("potion", |_, _| 0, 5),
                WeightedEntry::fixed("exp_share", 7),
            ],
        );
        let table = ThresholdTable::build(&pool, &catalog(), &RunState::default(), 0, 1);
        let common = table.tier(Tier::Common).expect("common tier");

        let keys: Vec<_> = common.thresholds().iter().map(|t| (t.cumulative, t.index)).collect();
        assert_eq!(keys, vec![(3, 0), (10, 2)]);
        assert_eq!(common.total(), 10);
        assert!(common.ignored().contains(&1));
        assert_eq!(common.pick(2).map(|t| t.index), Some(0));
        assert_eq!(common.pick(3).map(|t| t.index), Some(2));
        assert_eq!(common.pick(10), None);
    }

    #[test]
    fn persistent_rewards_at_max_stack_drop_out() {
        let pool = RewardPool::new(PoolKind::Player)
            .with_tier(Tier::Great, vec![WeightedEntry::fixed("exp_share", 10)]);
        let mut run = RunState::default();
        run.persistent.add("exp_share", 2);
        let table = ThresholdTable::build(&pool, &catalog(), &run, 0, 1);
        let great = table.tier(Tier::Great).expect("great tier");
        assert!(great.is_empty());
        assert_eq!(great.total(), 0);
    }

    #[test]
    fn member_keyed_rewards_cap_per_member() {
        let catalog = catalog();
        let held = WeightedEntry::fixed("leftovers", 3);
        let stone = WeightedEntry::fixed("mega_stone", 3);
        let mut run = RunState::default();
        let full = run.party.add(PartyMember::new(SpeciesId(1), vec![Element::Fire]));
        run.party.get_mut(full).expect("member exists").hold("leftovers", 2);
        run.party.get_mut(full).expect("member exists").hold("mega_stone", 5);
        run.persistent.add("leftovers", 9);

        assert_eq!(live_weight(&held, catalog.meta("leftovers"), &run, 0), 0);
        assert_eq!(live_weight(&stone, catalog.meta("mega_stone"), &run, 0), 3);

        run.party.add(PartyMember::new(SpeciesId(2), vec![Element::Water]));
        assert_eq!(live_weight(&held, catalog.meta("leftovers"), &run, 0), 3);
    }

    #[test]
    fn negative_weights_clamp_to_zero() {
        let pool = RewardPool::new(PoolKind::Player).with_tier(
            Tier::Common,
            vec![
                WeightedEntry::dynamic("potion", |_, _| -40, 1),
                WeightedEntry::fixed("exp_share", 2),
            ],
        );
        let table = ThresholdTable::build(&pool, &catalog(), &RunState::default(), 0, 1);
        let common = table.tier(Tier::Common).expect("common tier");
        assert_eq!(common.total(), 2);
        assert!(common.ignored().contains(&0));
    }

    #[test]
    fn diagnostics_report_shares() {
        let pool = RewardPool::new(PoolKind::Player)
            .with_tier(Tier::Common, vec![WeightedEntry::fixed("potion", 3)])
            .with_tier(Tier::Great, vec![WeightedEntry::fixed("potion", 1)]);
        let mut run = RunState::default();
        run.party.add(PartyMember::new(SpeciesId(4), vec![Element::Fire]));
        let table = ThresholdTable::build(&pool, &catalog(), &run, 0, 1);
        let shares: Vec<_> =
            table.diagnostics().map(|d| (d.percent_of_tier, d.percent_of_total)).collect();
        assert_eq!(shares, vec![(100.0, 75.0), (100.0, 25.0)]);
    }
}
