//! Threshold regeneration and snapshot validation.

use log::{debug, warn};

use super::*;
use crate::pool::RewardPool;
use crate::state::RunState;
use crate::threshold::ThresholdSnapshot;

impl RewardEngine {
    /// Rebuilds the cumulative tables for `pool_kind` against `run`. Call at every
    /// checkpoint listed on `RewardEngine`.
    pub fn regenerate_thresholds(
        &mut self,
        run: &RunState,
        pool_kind: PoolKind,
        reroll_count: u32,
    ) -> ThresholdSnapshot {
        self.next_generation += 1;
        let generation = self.next_generation;

        let table = match self.pools.get(pool_kind) {
            Some(pool) => ThresholdTable::build(pool, &self.catalog, run, reroll_count, generation),
            None => {
                warn!("no {pool_kind:?} pool registered; thresholds will be empty");
                let empty = RewardPool::new(pool_kind);
                ThresholdTable::build(&empty, &self.catalog, run, reroll_count, generation)
            }
        };

        for (tier, tier_table) in table.tiers() {
            debug!(
                "{pool_kind:?} {tier:?}: total weight {}, {} ignored",
                tier_table.total(),
                tier_table.ignored().len()
            );
        }

        let snapshot = table.snapshot();
        self.thresholds.insert(pool_kind, table);
        snapshot
    }

    pub fn thresholds(&self, pool_kind: PoolKind) -> Option<&ThresholdTable> {
        self.thresholds.get(&pool_kind)
    }

    /// Drops every cached table; the next resolution must follow a regeneration.
    pub fn invalidate_thresholds(&mut self) {
        self.thresholds.clear();
    }

    pub(super) fn check_snapshot(
        &self,
        snapshot: &ThresholdSnapshot,
        run: &RunState,
    ) -> Result<(), EngineError> {
        let pool_kind = snapshot.pool_kind;
        let table =
            self.thresholds.get(&pool_kind).ok_or(EngineError::NotRegenerated(pool_kind))?;
        if table.snapshot() != *snapshot || run.fingerprint(snapshot.reroll_count) != snapshot.fingerprint
        {
            return Err(EngineError::StaleThresholds { pool_kind });
        }
        Ok(())
    }
}
