//! Curated "choose a flavor" pools layered over the player pool.
//! These lists are small and context specific, so they are rebuilt on every call instead of
//! being cached next to the main thresholds.

use serde::{Deserialize, Serialize};

use crate::catalog::{EntryMeta, RewardCategory, RewardTag};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathFilter {
    TypeSwitchers,
    AbilitySwitchers,
    Berries,
    Tms,
    AddMember,
    Consumables,
    Luck,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterScope {
    /// Every matching entry of the player pool, regardless of its tier.
    AnyTier,
    /// Only matching entries declared at the resolved tier.
    ResolvedTier,
}

impl PathFilter {
    pub const ALL: [PathFilter; 7] = [
        PathFilter::TypeSwitchers,
        PathFilter::AbilitySwitchers,
        PathFilter::Berries,
        PathFilter::Tms,
        PathFilter::AddMember,
        PathFilter::Consumables,
        PathFilter::Luck,
    ];

    pub fn scope(self) -> FilterScope {
        match self {
            PathFilter::Tms | PathFilter::Consumables => FilterScope::ResolvedTier,
            _ => FilterScope::AnyTier,
        }
    }

    fn tag(self) -> RewardTag {
        match self {
            PathFilter::TypeSwitchers => RewardTag::TypeSwitch,
            PathFilter::AbilitySwitchers => RewardTag::AbilitySwitch,
            PathFilter::Berries => RewardTag::Berry,
            PathFilter::Tms => RewardTag::Tm,
            PathFilter::AddMember => RewardTag::AddMember,
            PathFilter::Consumables => RewardTag::Consumable,
            PathFilter::Luck => RewardTag::Luck,
        }
    }

    pub fn accepts(self, meta: &EntryMeta) -> bool {
        if meta.tags.contains(&self.tag()) {
            return true;
        }
        self == PathFilter::Consumables && meta.category == RewardCategory::Consumable
    }
}
