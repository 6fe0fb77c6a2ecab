//! Enemy held items, enemy buffs and daily-run starter items. These pools are resolved
//! against a single member, so each call regenerates its own table for that view.

use log::warn;

use super::resolve::CandidateSource;
use super::*;
use crate::state::RunState;
use crate::tier::{TierResolver, TierRoll, partition};

impl RewardEngine {
    /// Held items for one wild or trainer member. Each option gains one upgrade with
    /// probability `1 / upgrade_chance` (0 disables upgrades).
    pub fn enemy_options_for_wave(
        &mut self,
        run: &RunState,
        member: MemberId,
        pool_kind: PoolKind,
        count: usize,
        upgrade_chance: u32,
    ) -> Result<Vec<RewardOption>, EngineError> {
        if !pool_kind.is_enemy_held() {
            return Err(EngineError::WrongPoolKind { operation: "enemy held items", pool_kind });
        }
        let focused = run.focused_on(member).ok_or(EngineError::UnknownMember(member))?;
        self.regenerate_thresholds(&focused, pool_kind, 0);

        let mut options = Vec::with_capacity(count);
        for _ in 0..count {
            let start = u32::from(upgrade_chance > 0 && self.rng.int(upgrade_chance) == 0);
            let pools = &self.pools;
            let roll = TierResolver::new(&self.config).roll(
                &mut self.rng,
                pool_kind,
                &focused.luck,
                start,
                |tier| pools.has_entries(pool_kind, tier),
            );
            if let Some(option) = self.sample(CandidateSource::Cached(pool_kind), &focused, roll) {
                options.push(option);
            }
        }
        Ok(options)
    }

    /// One enemy buff at `tier`, skipping buffs already stacked to their cap in `existing`.
    pub fn enemy_buff_for_tier(
        &mut self,
        run: &RunState,
        tier: Tier,
        existing: &[RewardOption],
    ) -> Result<Option<RewardOption>, EngineError> {
        self.regenerate_thresholds(run, PoolKind::EnemyBuff, 0);
        let source = CandidateSource::Cached(PoolKind::EnemyBuff);

        for _ in 0..self.config.enemy_buff_retry_cap {
            let Some(candidate) = self.sample(source, run, TierRoll::fixed(tier, 0)) else {
                return Ok(None);
            };
            let held = existing.iter().filter(|option| option.kind.id == candidate.kind.id).count();
            let held = u32::try_from(held).unwrap_or(u32::MAX);
            if candidate.kind.category.max_stack().is_none_or(|max| held < max) {
                return Ok(Some(candidate));
            }
        }
        warn!("no enemy buff below its stack cap at {tier:?}");
        Ok(None)
    }

    /// Starter items for a daily run: a fixed number per member, each tier drawn from the
    /// daily curve and resolved against that member alone.
    pub fn daily_starter_options(
        &mut self,
        run: &RunState,
    ) -> Result<Vec<(MemberId, RewardOption)>, EngineError> {
        let pool_kind = PoolKind::DailyStarter;
        let source = CandidateSource::Cached(pool_kind);
        let mut options = Vec::new();

        for member in run.party.ids() {
            let focused = run.focused_on(member).ok_or(EngineError::UnknownMember(member))?;
            self.regenerate_thresholds(&focused, pool_kind, 0);
            for _ in 0..self.config.daily_starter_per_member {
                let curve = &self.config.daily_starter_curve;
                let value = self.rng.int(curve.draw_range);
                let tier = partition(curve, value, self.config.luck_divisors.base);
                if let Some(option) = self.sample(source, &focused, TierRoll::fixed(tier, 0)) {
                    options.push((member, option));
                }
            }
        }
        Ok(options)
    }
}
