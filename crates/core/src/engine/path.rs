use super::resolve::{CandidateSource, roll_tier};
use super::*;
use crate::path_filter::{FilterScope, PathFilter};
use crate::pool::{RewardPool, WeightedEntry};
use crate::state::RunState;
use crate::threshold::{LiveWeight, TierThresholds, live_weight};

impl RewardEngine {
    /// One option from the player pool narrowed by `filter`. Tables are built per call and
    /// never cached, so no snapshot is involved.
    pub fn resolve_from_path_filter(
        &mut self,
        filter: PathFilter,
        run: &mut RunState,
    ) -> Option<RewardOption> {
        let pools = &self.pools;
        let catalog = &self.catalog;
        let has_tier = |tier: Tier| {
            pools
                .get(PoolKind::Player)
                .is_some_and(|pool| curated_entries(pool, catalog, filter, tier).next().is_some())
        };
        let roll = roll_tier(&self.config, &mut self.rng, PoolKind::Player, run, None, None, has_tier);
        self.sample(CandidateSource::Curated(filter), run, roll)
    }

    /// Curated table for `tier`, plus the pool tier each entry is listed at (by entry index).
    /// Any-tier filters draw across the whole pool, so the rolled tier is not the entry's own.
    pub(super) fn curated_table(
        &self,
        filter: PathFilter,
        run: &RunState,
        tier: Tier,
    ) -> (TierThresholds, Vec<Tier>) {
        let Some(pool) = self.pools.get(PoolKind::Player) else {
            return (TierThresholds::default(), Vec::new());
        };
        let entries: Vec<_> = curated_entries(pool, &self.catalog, filter, tier).collect();
        let listed_at = entries.iter().map(|(entry_tier, _)| *entry_tier).collect();
        let weights = entries.iter().enumerate().map(|(index, (_, entry))| LiveWeight {
            index,
            reward_id: &entry.reward_id,
            weight: live_weight(entry, self.catalog.meta(&entry.reward_id), run, 0),
            max_weight: entry.max_weight,
        });
        (TierThresholds::from_weights(tier, weights), listed_at)
    }
}

fn curated_entries<'a>(
    pool: &'a RewardPool,
    catalog: &'a Catalog,
    filter: PathFilter,
    tier: Tier,
) -> impl Iterator<Item = (Tier, &'a WeightedEntry)> + 'a {
    pool.tiers()
        .filter(move |(entry_tier, _)| {
            filter.scope() == FilterScope::AnyTier || *entry_tier == tier
        })
        .flat_map(|(entry_tier, entries)| entries.iter().map(move |entry| (entry_tier, entry)))
        .filter(move |(_, entry)| {
            catalog.meta(&entry.reward_id).is_some_and(|meta| filter.accepts(meta))
        })
}
