//! Concrete reward kinds: one tagged value per catalog entry instead of a subclass chain.

use crate::state::{MemberId, PartyMember};
use crate::types::{AbilityId, Berry, Element, MoveId, SpeciesId, Stat, Tier};

use super::generator::Variant;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RewardCategory {
    Consumable,
    /// Party-wide buff capped globally at `max_stack`.
    Persistent {
        max_stack: u32,
    },
    /// Held by one member; capped per member, never globally.
    HeldItem {
        max_stack: u32,
    },
    FormChangeItem,
    MoveSelect,
    PartyGrant,
    EnemyBuff {
        max_stack: u32,
    },
}

impl RewardCategory {
    pub fn max_stack(self) -> Option<u32> {
        match self {
            RewardCategory::Persistent { max_stack }
            | RewardCategory::HeldItem { max_stack }
            | RewardCategory::EnemyBuff { max_stack } => Some(max_stack),
            _ => None,
        }
    }

    pub fn is_member_keyed(self) -> bool {
        matches!(self, RewardCategory::HeldItem { .. } | RewardCategory::FormChangeItem)
    }
}

/// Labels used by curated path pools to pick their subset of the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RewardTag {
    TypeSwitch,
    AbilitySwitch,
    Berry,
    Tm,
    AddMember,
    Consumable,
    Luck,
    Fusion,
    FormChange,
    StatBoost,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RewardEffect {
    Heal { percent: u8 },
    Revive { percent: u8 },
    RestorePp { amount: Option<u8> },
    StatBoost { stat: Stat, stages: u8 },
    TeachMove(MoveId),
    ChangeElement(Element),
    ChangeAbility(AbilityId),
    Berry(Berry),
    HeldBoost { percent: u8 },
    FormChange { form: String },
    AddMember(SpeciesId),
    Fusion,
    ExpBoost { percent: u8 },
    MoneyBoost { percent: u8 },
    LuckBoost { level: u8 },
    CatchGuarantee,
    EnemyDamageBoost { percent: u8 },
    EnemyDamageReduction { percent: u8 },
    EnemyHeal { percent: u8 },
}

/// Which party members may receive a reward once it is chosen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberFilter {
    Any,
    Conscious,
    Fainted,
    Damaged,
    CanLearn(MoveId),
    HasForm(String),
    Below { reward_id: String, max_stack: u32 },
}

impl MemberFilter {
    pub fn accepts(&self, member: &PartyMember) -> bool {
        match self {
            MemberFilter::Any => true,
            MemberFilter::Conscious => !member.fainted,
            MemberFilter::Fainted => member.fainted,
            MemberFilter::Damaged => member.is_damaged(),
            MemberFilter::CanLearn(id) => {
                !member.knows(*id) && member.learnable_moves.iter().any(|m| m.id == *id)
            }
            MemberFilter::HasForm(form) => member.form_change_targets.iter().any(|f| f == form),
            MemberFilter::Below { reward_id, max_stack } => {
                member.held_count(reward_id) < *max_stack
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RewardKind {
    pub id: String,
    pub name: String,
    pub category: RewardCategory,
    pub tier: Option<Tier>,
    pub group: Option<String>,
    pub effect: RewardEffect,
    pub tags: Vec<RewardTag>,
    pub member_filter: Option<MemberFilter>,
    pub variant: Option<Variant>,
}

impl RewardKind {
    pub fn new(name: impl Into<String>, category: RewardCategory, effect: RewardEffect) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            category,
            tier: None,
            group: None,
            effect,
            tags: Vec::new(),
            member_filter: None,
            variant: None,
        }
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_tags(mut self, tags: &[RewardTag]) -> Self {
        self.tags = tags.to_vec();
        self
    }

    pub fn with_filter(mut self, filter: MemberFilter) -> Self {
        self.member_filter = Some(filter);
        self
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Kinds that open a move picker after a member is chosen.
    pub fn needs_move_select(&self) -> bool {
        matches!(self.category, RewardCategory::MoveSelect)
            || matches!(self.effect, RewardEffect::RestorePp { .. })
    }

    pub fn eligible_members<'a>(
        &'a self,
        members: impl Iterator<Item = (MemberId, &'a PartyMember)> + 'a,
    ) -> impl Iterator<Item = MemberId> + 'a {
        members
            .filter(move |(_, member)| {
                self.member_filter.as_ref().is_none_or(|filter| filter.accepts(member))
            })
            .map(|(id, _)| id)
    }

    /// Builds the live effect handed to the battle layer.
    pub fn instantiate(&self, target: Option<MemberId>) -> GrantedReward {
        GrantedReward { kind_id: self.id.clone(), target, effect: self.effect.clone() }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GrantedReward {
    pub kind_id: String,
    pub target: Option<MemberId>,
    pub effect: RewardEffect,
}
