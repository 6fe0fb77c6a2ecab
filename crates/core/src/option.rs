//! Presentation-ready reward options.

use std::fmt;

use crate::catalog::{GrantedReward, RewardKind};
use crate::state::MemberId;
use crate::types::Tier;

/// Opaque id correlating an option with its UI slot. Derived from the seed and a serial
/// counter so it never consumes draws from the shared stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionId(pub u64);

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RewardOption {
    pub kind: RewardKind,
    pub upgrade_count: u32,
    pub cost: u64,
    pub id: OptionId,
}

impl RewardOption {
    pub fn new(kind: RewardKind, upgrade_count: u32, id: OptionId) -> Self {
        Self { kind, upgrade_count, cost: 0, id }
    }

    pub fn with_cost(mut self, cost: u64) -> Self {
        self.cost = cost;
        self
    }

    pub fn is_free(&self) -> bool {
        self.cost == 0
    }

    pub fn tier(&self) -> Option<Tier> {
        self.kind.tier
    }

    /// Same display name, or same non-empty collision group.
    pub fn collides_with(&self, other: &RewardOption) -> bool {
        if self.kind.name == other.kind.name {
            return true;
        }
        matches!((&self.kind.group, &other.kind.group), (Some(a), Some(b)) if a == b)
    }

    pub fn instantiate(&self, target: Option<MemberId>) -> GrantedReward {
        self.kind.instantiate(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{RewardCategory, RewardEffect};
    use crate::types::Berry;

    fn berry(name: &str) -> RewardKind {
        RewardKind::new(
            name,
            RewardCategory::HeldItem { max_stack: 3 },
            RewardEffect::Berry(Berry::Sitrus),
        )
    }

    #[test]
    fn collisions_use_name_or_group() {
        let a = RewardOption::new(berry("Sitrus Berry"), 0, OptionId(1));
        let b = RewardOption::new(berry("Sitrus Berry"), 1, OptionId(2));
        let c = RewardOption::new(berry("Lum Berry"), 0, OptionId(3));
        assert!(a.collides_with(&b));
        assert!(!a.collides_with(&c));

        let grouped_a = RewardOption::new(berry("Sitrus Berry").with_group("berry"), 0, OptionId(4));
        let grouped_c = RewardOption::new(berry("Lum Berry").with_group("berry"), 0, OptionId(5));
        assert!(grouped_a.collides_with(&grouped_c));
    }

    #[test]
    fn cost_marks_shop_listings() {
        let option = RewardOption::new(berry("Lum Berry"), 0, OptionId(9));
        assert!(option.is_free());
        let listed = option.with_cost(300);
        assert_eq!(listed.cost, 300);
        assert!(!listed.is_free());
        assert_eq!(listed.id.to_string(), "0000000000000009");
    }
}
