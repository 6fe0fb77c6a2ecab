//! Tier selection for a single reward slot.
//! Draw order is fixed (partition draw, then pity draws) so seeded runs replay exactly.

use crate::config::{EngineConfig, TierCurve};
use crate::rng::RunRng;
use crate::state::LuckBuff;
use crate::types::{PoolKind, Tier};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierRoll {
    pub tier: Tier,
    pub upgrade_count: u32,
}

impl TierRoll {
    pub fn fixed(tier: Tier, upgrade_count: u32) -> Self {
        Self { tier, upgrade_count }
    }
}

/// Maps a draw onto the curve. The draw is scaled down by `divisor` before it meets the
/// breakpoints, so a larger divisor widens the higher tiers.
pub fn partition(curve: &TierCurve, value: u32, divisor: f64) -> Tier {
    let value = f64::from(value) / divisor;
    let [common, great, ultra, rogue] = curve.breakpoints.map(f64::from);
    if value > common {
        Tier::Common
    } else if value > great {
        Tier::Great
    } else if value > ultra {
        Tier::Ultra
    } else if value > rogue {
        Tier::Rogue
    } else {
        Tier::Master
    }
}

/// Steps down until `has_tier` accepts, dropping one upgrade per step.
pub fn degrade(roll: TierRoll, has_tier: impl Fn(Tier) -> bool) -> TierRoll {
    let TierRoll { mut tier, mut upgrade_count } = roll;
    while !has_tier(tier) {
        let Some(lower) = tier.lower() else { break };
        tier = lower;
        upgrade_count = upgrade_count.saturating_sub(1);
    }
    TierRoll { tier, upgrade_count }
}

pub struct TierResolver<'a> {
    config: &'a EngineConfig,
}

impl<'a> TierResolver<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn luck_divisor(&self, pool_kind: PoolKind, luck: &LuckBuff) -> f64 {
        if pool_kind.is_player_facing() {
            self.config.luck_divisors.for_level(luck.effective_level())
        } else {
            self.config.luck_divisors.base
        }
    }

    /// Full roll: partition draw, pity loop, upgrade, then degrade past empty tiers.
    pub fn roll(
        &self,
        rng: &mut RunRng,
        pool_kind: PoolKind,
        luck: &LuckBuff,
        start_upgrades: u32,
        has_tier: impl Fn(Tier) -> bool,
    ) -> TierRoll {
        let curve = self.config.curve_for(pool_kind);
        let value = rng.int(curve.draw_range);

        let mut upgrade_count = start_upgrades;
        if pool_kind.is_player_facing() && value > 0 {
            upgrade_count += self.pity_upgrades(rng);
        }

        let base = partition(curve, value, self.luck_divisor(pool_kind, luck));
        let headroom = (Tier::Master.index() - base.index()) as u32;
        let upgrade_count = upgrade_count.min(headroom);
        degrade(TierRoll { tier: base.raised_by(upgrade_count), upgrade_count }, has_tier)
    }

    /// Roll for a caller-chosen tier. Only player-facing pools run the upgrade sub-loop.
    pub fn roll_explicit(
        &self,
        rng: &mut RunRng,
        pool_kind: PoolKind,
        tier: Tier,
        party_luck: u32,
        has_tier: impl Fn(Tier) -> bool,
    ) -> TierRoll {
        if !pool_kind.is_player_facing() {
            return TierRoll::fixed(tier, 0);
        }
        let odds = self.config.explicit_upgrade.upgrade_odds(party_luck);
        let mut upgrade_count = 0u32;
        while let Some(next) = Tier::from_index(tier.index() + upgrade_count as usize + 1) {
            if !has_tier(next) || rng.int(odds) != 0 {
                break;
            }
            upgrade_count += 1;
        }
        TierRoll { tier: tier.raised_by(upgrade_count), upgrade_count }
    }

    pub fn pity_upgrades(&self, rng: &mut RunRng) -> u32 {
        let odds = self.config.pity.upgrade_odds();
        let mut upgrades = 0;
        while rng.int(odds) < self.config.pity.success_below {
            upgrades += 1;
        }
        upgrades
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_honors_exact_breakpoints() {
        let curve = TierCurve::player();
        assert_eq!(partition(&curve, 1023, 1.0), Tier::Common);
        assert_eq!(partition(&curve, 256, 1.0), Tier::Common);
        assert_eq!(partition(&curve, 255, 1.0), Tier::Great);
        assert_eq!(partition(&curve, 61, 1.0), Tier::Great);
        assert_eq!(partition(&curve, 60, 1.0), Tier::Ultra);
        assert_eq!(partition(&curve, 12, 1.0), Tier::Rogue);
        assert_eq!(partition(&curve, 1, 1.0), Tier::Rogue);
        assert_eq!(partition(&curve, 0, 1.0), Tier::Master);
    }

    #[test]
    fn luck_divisor_widens_higher_tiers() {
        let curve = TierCurve::player();
        assert_eq!(partition(&curve, 300, 1.0), Tier::Common);
        assert_eq!(partition(&curve, 300, 1.2), Tier::Great);
        assert_eq!(partition(&curve, 80, 1.0), Tier::Great);
        assert_eq!(partition(&curve, 80, 1.45), Tier::Ultra);
        assert_eq!(partition(&curve, 0, 1.45), Tier::Master);

        let above_common = |divisor: f64| {
            (0..curve.draw_range)
                .filter(|&value| partition(&curve, value, divisor) > Tier::Common)
                .count()
        };
        assert!(above_common(1.0) < above_common(1.2));
        assert!(above_common(1.2) < above_common(1.45));
    }

    #[test]
    fn better_luck_raises_rolled_rarity() {
        let config = EngineConfig::default();
        let resolver = TierResolver::new(&config);
        let above_common = |level| {
            let mut rng = RunRng::new(11);
            let luck = LuckBuff::new(level, 5);
            (0..20_000)
                .filter(|_| {
                    resolver.roll(&mut rng, PoolKind::Player, &luck, 0, |_| true).tier > Tier::Common
                })
                .count()
        };
        let (plain, level_two, level_three) = (above_common(0), above_common(2), above_common(3));
        assert!(plain < level_two, "{plain} vs {level_two}");
        assert!(level_two < level_three, "{level_two} vs {level_three}");
    }

    #[test]
    fn only_player_pools_use_the_luck_divisor() {
        let config = EngineConfig::default();
        let resolver = TierResolver::new(&config);
        let luck = LuckBuff::new(3, 2);
        assert_eq!(resolver.luck_divisor(PoolKind::Player, &luck), 1.45);
        assert_eq!(resolver.luck_divisor(PoolKind::Draft, &LuckBuff::new(2, 1)), 1.2);
        assert_eq!(resolver.luck_divisor(PoolKind::Wild, &luck), 1.0);
        assert_eq!(resolver.luck_divisor(PoolKind::Player, &LuckBuff::new(3, 0)), 1.0);
    }

    #[test]
    fn degrade_walks_down_in_lockstep() {
        let roll = degrade(TierRoll::fixed(Tier::Rogue, 2), |tier| tier == Tier::Great);
        assert_eq!(roll, TierRoll::fixed(Tier::Great, 0));

        let floor = degrade(TierRoll::fixed(Tier::Ultra, 1), |_| false);
        assert_eq!(floor, TierRoll::fixed(Tier::Common, 0));
    }

    #[test]
    fn rolls_replay_for_a_fixed_seed() {
        let config = EngineConfig::default();
        let resolver = TierResolver::new(&config);
        let trace = |seed| {
            let mut rng = RunRng::new(seed);
            (0..200)
                .map(|_| resolver.roll(&mut rng, PoolKind::Player, &LuckBuff::default(), 0, |_| true))
                .collect::<Vec<_>>()
        };
        assert_eq!(trace(4242), trace(4242));
    }

    #[test]
    fn explicit_roll_never_climbs_into_empty_tiers() {
        let mut config = EngineConfig::default();
        config.explicit_upgrade.range_base = 1;
        let resolver = TierResolver::new(&config);
        let mut rng = RunRng::new(3);

        let roll = resolver.roll_explicit(&mut rng, PoolKind::Player, Tier::Common, 0, |tier| {
            tier <= Tier::Ultra
        });
        assert_eq!(roll, TierRoll::fixed(Tier::Ultra, 2));

        let enemy = resolver.roll_explicit(&mut rng, PoolKind::Wild, Tier::Common, 0, |_| true);
        assert_eq!(enemy, TierRoll::fixed(Tier::Common, 0));
    }
}
