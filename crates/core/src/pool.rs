//! Weighted reward pools, one per pool kind, each an ordered entry list per tier.
//! Dynamic weights are stored unevaluated; threshold regeneration is the only caller.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::catalog::Catalog;
use crate::state::RunState;
use crate::types::{PoolKind, Tier};

pub type WeightFn = dyn Fn(&RunState, u32) -> i32;

pub enum Weight {
    Fixed(u32),
    /// Called with the live run state and the reroll count.
    Dynamic(Box<WeightFn>),
}

impl Weight {
    pub fn dynamic(weight: impl Fn(&RunState, u32) -> i32 + 'static) -> Self {
        Weight::Dynamic(Box::new(weight))
    }

    pub fn evaluate(&self, run: &RunState, reroll_count: u32) -> i32 {
        match self {
            Weight::Fixed(weight) => i32::try_from(*weight).unwrap_or(i32::MAX),
            Weight::Dynamic(weight) => weight(run, reroll_count),
        }
    }
}

impl fmt::Debug for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weight::Fixed(weight) => f.debug_tuple("Fixed").field(weight).finish(),
            Weight::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

#[derive(Debug)]
pub struct WeightedEntry {
    pub reward_id: String,
    pub weight: Weight,
    /// Upper bound reported by debug weight tables; never used for selection.
    pub max_weight: u32,
}

impl WeightedEntry {
    pub fn fixed(reward_id: &str, weight: u32) -> Self {
        Self { reward_id: reward_id.to_string(), weight: Weight::Fixed(weight), max_weight: weight }
    }

    pub fn dynamic(
        reward_id: &str,
        weight: impl Fn(&RunState, u32) -> i32 + 'static,
        max_weight: u32,
    ) -> Self {
        Self { reward_id: reward_id.to_string(), weight: Weight::dynamic(weight), max_weight }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("{pool:?} pool tier {tier:?} references unknown reward {reward_id}")]
    UnknownReward { pool: PoolKind, tier: Tier, reward_id: String },
    #[error("{pool:?} pool entry {reward_id} has max weight {max_weight} below its weight {weight}")]
    MaxWeightBelowWeight { pool: PoolKind, reward_id: String, weight: u32, max_weight: u32 },
}

#[derive(Debug)]
pub struct RewardPool {
    kind: PoolKind,
    tiers: BTreeMap<Tier, Vec<WeightedEntry>>,
}

impl RewardPool {
    pub fn new(kind: PoolKind) -> Self {
        Self { kind, tiers: BTreeMap::new() }
    }

    pub fn with_tier(mut self, tier: Tier, entries: Vec<WeightedEntry>) -> Self {
        self.tiers.entry(tier).or_default().extend(entries);
        self
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn entries(&self, tier: Tier) -> &[WeightedEntry] {
        self.tiers.get(&tier).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_entries(&self, tier: Tier) -> bool {
        !self.entries(tier).is_empty()
    }

    pub fn tiers(&self) -> impl Iterator<Item = (Tier, &[WeightedEntry])> {
        self.tiers.iter().map(|(tier, entries)| (*tier, entries.as_slice()))
    }

    pub fn tier_of(&self, reward_id: &str) -> Option<Tier> {
        self.tiers().find_map(|(tier, entries)| {
            entries.iter().any(|entry| entry.reward_id == reward_id).then_some(tier)
        })
    }

    pub fn validate(&self, catalog: &Catalog) -> Result<(), PoolError> {
        for (tier, entries) in self.tiers() {
            for entry in entries {
                if !catalog.contains(&entry.reward_id) {
                    return Err(PoolError::UnknownReward {
                        pool: self.kind,
                        tier,
                        reward_id: entry.reward_id.clone(),
                    });
                }
                if let Weight::Fixed(weight) = entry.weight
                    && entry.max_weight < weight
                {
                    return Err(PoolError::MaxWeightBelowWeight {
                        pool: self.kind,
                        reward_id: entry.reward_id.clone(),
                        weight,
                        max_weight: entry.max_weight,
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct PoolSet {
    pools: BTreeMap<PoolKind, RewardPool>,
}

impl PoolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pool(mut self, pool: RewardPool) -> Self {
        self.insert(pool);
        self
    }

    pub fn insert(&mut self, pool: RewardPool) {
        self.pools.insert(pool.kind(), pool);
    }

    pub fn get(&self, kind: PoolKind) -> Option<&RewardPool> {
        self.pools.get(&kind)
    }

    pub fn has_entries(&self, kind: PoolKind, tier: Tier) -> bool {
        self.get(kind).is_some_and(|pool| pool.has_entries(tier))
    }

    /// First tier the reward appears at, scanning pool kinds in `PoolKind::ALL` order.
    pub fn tier_of(&self, reward_id: &str) -> Option<Tier> {
        PoolKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind))
            .find_map(|pool| pool.tier_of(reward_id))
    }

    pub fn validate(&self, catalog: &Catalog) -> Result<(), PoolError> {
        self.pools.values().try_for_each(|pool| pool.validate(catalog))
    }
}
