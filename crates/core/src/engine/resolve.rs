//! Single-slot resolution: tier roll, weighted draw and generator retries.

use log::{debug, warn};

use super::*;
use crate::path_filter::PathFilter;
use crate::state::RunState;
use crate::threshold::ThresholdSnapshot;
use crate::tier::{TierResolver, TierRoll};

/// Where the weighted draw for a slot comes from.
#[derive(Clone, Copy, Debug)]
pub(super) enum CandidateSource {
    Cached(PoolKind),
    Curated(PathFilter),
}

impl RewardEngine {
    /// Resolves one slot. `tier: None` runs the full roll (partition, pity, luck); an
    /// explicit tier with `upgrade_count: None` runs the explicit upgrade sub-loop instead.
    pub fn resolve_one(
        &mut self,
        snapshot: &ThresholdSnapshot,
        run: &mut RunState,
        tier: Option<Tier>,
        upgrade_count: Option<u32>,
    ) -> Result<Option<RewardOption>, EngineError> {
        self.check_snapshot(snapshot, run)?;
        let pool_kind = snapshot.pool_kind;
        let pools = &self.pools;
        let roll = roll_tier(&self.config, &mut self.rng, pool_kind, run, tier, upgrade_count, |t| {
            pools.has_entries(pool_kind, t)
        });
        Ok(self.sample(CandidateSource::Cached(pool_kind), run, roll))
    }

    /// Draws from `source` starting at the rolled tier until a candidate materializes.
    /// Empty tiers degrade immediately; failing generators degrade after the retry limit.
    pub(super) fn sample(
        &mut self,
        source: CandidateSource,
        run: &RunState,
        roll: TierRoll,
    ) -> Option<RewardOption> {
        let TierRoll { mut tier, upgrade_count } = roll;
        let mut retries = 0u32;
        loop {
            let Some((reward_id, listed_at)) = self.draw_candidate(source, run, tier) else {
                let Some(lower) = tier.lower() else {
                    warn!("{source:?}: no live candidates left at any tier");
                    return None;
                };
                warn!("{source:?}: no live candidates at {tier:?}; degrading to {lower:?}");
                tier = lower;
                retries = 0;
                continue;
            };

            if let Some(kind) = self.materialize(&reward_id, run, listed_at) {
                return Some(self.wrap(kind, upgrade_count));
            }

            retries += 1;
            if retries >= self.config.generator_retry_limit {
                let Some(lower) = tier.lower() else {
                    warn!("{source:?}: generators exhausted at {tier:?}");
                    return None;
                };
                warn!("{source:?}: generators exhausted at {tier:?}; degrading to {lower:?}");
                tier = lower;
                retries = 0;
            }
        }
    }

    /// Picks a reward id at `tier` along with the pool tier it is listed at.
    fn draw_candidate(
        &mut self,
        source: CandidateSource,
        run: &RunState,
        tier: Tier,
    ) -> Option<(String, Tier)> {
        let curated;
        let (table, listed_at) = match source {
            CandidateSource::Cached(pool_kind) => {
                (self.thresholds.get(&pool_kind)?.tier(tier)?, None)
            }
            CandidateSource::Curated(filter) => {
                curated = self.curated_table(filter, run, tier);
                (&curated.0, Some(&curated.1))
            }
        };
        if table.is_empty() {
            return None;
        }
        let value = self.rng.int(table.total());
        let threshold = table.pick(value)?;
        debug!("{source:?} {tier:?}: draw {value} picked #{} {}", threshold.index, threshold.reward_id);
        let entry_tier =
            listed_at.and_then(|tiers| tiers.get(threshold.index).copied()).unwrap_or(tier);
        Some((threshold.reward_id.clone(), entry_tier))
    }

    fn materialize(&mut self, reward_id: &str, run: &RunState, tier: Tier) -> Option<RewardKind> {
        let entry = match self.catalog.entry(reward_id) {
            Ok(entry) => entry,
            Err(err) => {
                warn!("{err}");
                return None;
            }
        };
        let Some(mut kind) = entry.resolve(run, None, &mut self.rng) else {
            debug!("generator {reward_id} produced nothing for this run");
            return None;
        };
        kind.tier.get_or_insert(tier);
        Some(kind)
    }
}

/// Tier roll for a slot. Full rolls on player-facing pools may consume a luck stack.
pub(super) fn roll_tier(
    config: &EngineConfig,
    rng: &mut RunRng,
    pool_kind: PoolKind,
    run: &mut RunState,
    tier: Option<Tier>,
    upgrade_count: Option<u32>,
    has_tier: impl Fn(Tier) -> bool,
) -> TierRoll {
    let resolver = TierResolver::new(config);
    match (tier, upgrade_count) {
        (None, start) => {
            let roll = resolver.roll(rng, pool_kind, &run.luck, start.unwrap_or(0), has_tier);
            if pool_kind.is_player_facing()
                && run.luck.is_active()
                && rng.chance_percent(config.luck_consume_percent)
            {
                run.luck.consume_one();
                debug!("luck buff consumed; {} stacks left", run.luck.stacks);
            }
            roll
        }
        (Some(tier), Some(upgrade_count)) => TierRoll::fixed(tier, upgrade_count),
        (Some(tier), None) => {
            resolver.roll_explicit(rng, pool_kind, tier, run.party.luck_value(), has_tier)
        }
    }
}
