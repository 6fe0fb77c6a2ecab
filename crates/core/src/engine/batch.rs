//! Multi-slot offers with collision re-rolls and the override hook.

use std::mem;

use log::{debug, warn};

use super::resolve::{CandidateSource, roll_tier};
use super::*;
use crate::state::RunState;
use crate::threshold::ThresholdSnapshot;
use crate::tier::TierRoll;

impl RewardEngine {
    /// Resolves up to `count` options whose names and groups are pairwise distinct, as long
    /// as the re-roll budget lasts. `tiers[n]`, when present, pins the tier of slot `n`.
    pub fn resolve_batch(
        &mut self,
        count: usize,
        snapshot: &ThresholdSnapshot,
        run: &mut RunState,
        tiers: Option<&[Tier]>,
    ) -> Result<Vec<RewardOption>, EngineError> {
        self.check_snapshot(snapshot, run)?;
        let pool_kind = snapshot.pool_kind;
        let source = CandidateSource::Cached(pool_kind);
        let mut budget = self.config.batch_retry_budget(count);
        let mut options: Vec<RewardOption> = Vec::with_capacity(count);

        for slot in 0..count {
            let tier = tiers.and_then(|tiers| tiers.get(slot).copied());
            let pools = &self.pools;
            let roll = roll_tier(&self.config, &mut self.rng, pool_kind, run, tier, None, |t| {
                pools.has_entries(pool_kind, t)
            });
            let Some(mut candidate) = self.sample(source, run, roll) else {
                continue;
            };

            while budget > 0 && options.iter().any(|accepted| accepted.collides_with(&candidate)) {
                budget -= 1;
                debug!("slot {slot}: {} collides; re-rolling", candidate.kind.name);
                let retry =
                    TierRoll::fixed(candidate.tier().unwrap_or(roll.tier), candidate.upgrade_count);
                match self.sample(source, run, retry) {
                    Some(next) => candidate = next,
                    None => break,
                }
            }
            options.push(candidate);
        }

        self.apply_overrides(run, &mut options);
        Ok(options)
    }

    /// Replaces the first slots with the configured overrides. Failed overrides leave the
    /// natural option in place.
    fn apply_overrides(&mut self, run: &RunState, options: &mut [RewardOption]) {
        if self.overrides.is_empty() {
            return;
        }
        let overrides = mem::take(&mut self.overrides);
        for (slot, forced) in options.iter_mut().zip(&overrides) {
            match self.catalog.reward_kind_with(&forced.id, run, forced.variant.as_ref(), &mut self.rng)
            {
                Ok(mut kind) => {
                    if kind.tier.is_none() {
                        kind.tier = self.tier_of(&forced.id);
                    }
                    slot.kind = kind;
                    slot.upgrade_count = 0;
                }
                Err(err) => warn!("override {} ignored: {err}", forced.id),
            }
        }
        self.overrides = overrides;
    }
}
