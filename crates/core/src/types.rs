use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Tier {
    #[default]
    Common,
    Great,
    Ultra,
    Rogue,
    Master,
}

impl Tier {
    pub const ALL: [Tier; 5] = [Tier::Common, Tier::Great, Tier::Ultra, Tier::Rogue, Tier::Master];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Tier> {
        Self::ALL.get(index).copied()
    }

    pub fn lower(self) -> Option<Tier> {
        self.index().checked_sub(1).and_then(Tier::from_index)
    }

    pub fn higher(self) -> Option<Tier> {
        Tier::from_index(self.index() + 1)
    }

    /// Raises the tier by `steps`, saturating at `Master`.
    pub fn raised_by(self, steps: u32) -> Tier {
        let target = self.index().saturating_add(steps as usize);
        Tier::from_index(target.min(Tier::Master.index())).unwrap_or(Tier::Master)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PoolKind {
    Player,
    Wild,
    Trainer,
    EnemyBuff,
    DailyStarter,
    Draft,
    Debug,
}

impl PoolKind {
    /// Reverse tier lookups scan pools in this order.
    pub const ALL: [PoolKind; 7] = [
        PoolKind::Player,
        PoolKind::Wild,
        PoolKind::Trainer,
        PoolKind::EnemyBuff,
        PoolKind::DailyStarter,
        PoolKind::Draft,
        PoolKind::Debug,
    ];

    /// Pity upgrades, the luck divisor and luck-buff consumption only apply to
    /// pools the player picks from.
    pub fn is_player_facing(self) -> bool {
        matches!(self, PoolKind::Player | PoolKind::Draft)
    }

    pub fn is_enemy_held(self) -> bool {
        matches!(self, PoolKind::Wild | PoolKind::Trainer)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Element {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl Element {
    pub const ALL: [Element; 18] = [
        Element::Normal,
        Element::Fire,
        Element::Water,
        Element::Grass,
        Element::Electric,
        Element::Ice,
        Element::Fighting,
        Element::Poison,
        Element::Ground,
        Element::Flying,
        Element::Psychic,
        Element::Bug,
        Element::Rock,
        Element::Ghost,
        Element::Dragon,
        Element::Dark,
        Element::Steel,
        Element::Fairy,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stat {
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
    Accuracy,
}

impl Stat {
    pub const ALL: [Stat; 6] = [
        Stat::Attack,
        Stat::Defense,
        Stat::SpecialAttack,
        Stat::SpecialDefense,
        Stat::Speed,
        Stat::Accuracy,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Berry {
    Sitrus,
    Lum,
    Enigma,
    Liechi,
    Ganlon,
    Petaya,
    Apicot,
    Salac,
    Lansat,
    Starf,
    Leppa,
}

impl Berry {
    pub const ALL: [Berry; 11] = [
        Berry::Sitrus,
        Berry::Lum,
        Berry::Enigma,
        Berry::Liechi,
        Berry::Ganlon,
        Berry::Petaya,
        Berry::Apicot,
        Berry::Salac,
        Berry::Lansat,
        Berry::Starf,
        Berry::Leppa,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpeciesId(pub u16);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MoveId(pub u16);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AbilityId(pub u16);

/// Progression flags owned by the unlock store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Unlockable {
    AbilityPool,
    Splicers,
    FormChanges,
    MasterRewards,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_steps_saturate_at_the_edges() {
        assert_eq!(Tier::Common.lower(), None);
        assert_eq!(Tier::Master.higher(), None);
        assert_eq!(Tier::Great.raised_by(2), Tier::Rogue);
        assert_eq!(Tier::Ultra.raised_by(40), Tier::Master);
    }

    #[test]
    fn only_player_and_draft_pools_are_player_facing() {
        let facing: Vec<_> =
            PoolKind::ALL.into_iter().filter(|kind| kind.is_player_facing()).collect();
        assert_eq!(facing, vec![PoolKind::Player, PoolKind::Draft]);
    }
}
