//! Read-only run snapshot handed to the engine by the battle and progression layers.
//! The engine never edits party composition; the luck buff is the only field resolution
//! mutates.

use std::collections::{BTreeMap, BTreeSet};

use slotmap::{SlotMap, new_key_type};

use crate::types::{AbilityId, Element, MoveId, SpeciesId, Tier, Unlockable};

mod hash;

new_key_type! {
    pub struct MemberId;
}

pub const MAX_PARTY_SIZE: usize = 6;
const PARTY_LUCK_CAP: u32 = 14;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LearnableMove {
    pub id: MoveId,
    pub tier: Tier,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartyMember {
    pub species: SpeciesId,
    pub elements: Vec<Element>,
    pub ability: AbilityId,
    pub moves: Vec<MoveId>,
    pub learnable_moves: Vec<LearnableMove>,
    pub form_change_targets: Vec<String>,
    pub held: BTreeMap<String, u32>,
    pub luck: u8,
    pub hp_percent: u8,
    pub fainted: bool,
}

impl PartyMember {
    pub fn new(species: SpeciesId, elements: Vec<Element>) -> Self {
        Self {
            species,
            elements,
            ability: AbilityId(0),
            moves: Vec::new(),
            learnable_moves: Vec::new(),
            form_change_targets: Vec::new(),
            held: BTreeMap::new(),
            luck: 0,
            hp_percent: 100,
            fainted: false,
        }
    }

    pub fn held_count(&self, reward_id: &str) -> u32 {
        self.held.get(reward_id).copied().unwrap_or(0)
    }

    pub fn hold(&mut self, reward_id: &str, count: u32) {
        *self.held.entry(reward_id.to_string()).or_insert(0) += count;
    }

    pub fn knows(&self, id: MoveId) -> bool {
        self.moves.contains(&id)
    }

    pub fn is_damaged(&self) -> bool {
        !self.fainted && self.hp_percent < 100
    }
}

#[derive(Clone, Debug, Default)]
pub struct Party {
    members: SlotMap<MemberId, PartyMember>,
}

impl Party {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, member: PartyMember) -> MemberId {
        self.members.insert(member)
    }

    pub fn remove(&mut self, id: MemberId) -> Option<PartyMember> {
        self.members.remove(id)
    }

    pub fn get(&self, id: MemberId) -> Option<&PartyMember> {
        self.members.get(id)
    }

    pub fn get_mut(&mut self, id: MemberId) -> Option<&mut PartyMember> {
        self.members.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= MAX_PARTY_SIZE
    }

    pub fn iter(&self) -> impl Iterator<Item = (MemberId, &PartyMember)> {
        self.members.iter()
    }

    pub fn ids(&self) -> Vec<MemberId> {
        self.members.keys().collect()
    }

    pub fn contains_species(&self, species: SpeciesId) -> bool {
        self.members.values().any(|member| member.species == species)
    }

    pub fn fainted_count(&self) -> usize {
        self.members.values().filter(|member| member.fainted).count()
    }

    pub fn damaged_count(&self) -> usize {
        self.members.values().filter(|member| member.is_damaged()).count()
    }

    /// Summed member luck, capped the way the upgrade sub-loop expects.
    pub fn luck_value(&self) -> u32 {
        self.members.values().map(|member| u32::from(member.luck)).sum::<u32>().min(PARTY_LUCK_CAP)
    }

    fn retain_only(&mut self, keep: MemberId) {
        self.members.retain(|id, _| id == keep);
    }
}

/// Party-wide reward stacks keyed by catalog id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersistentRewards {
    stacks: BTreeMap<String, u32>,
}

impl PersistentRewards {
    pub fn stack_count(&self, reward_id: &str) -> u32 {
        self.stacks.get(reward_id).copied().unwrap_or(0)
    }

    pub fn add(&mut self, reward_id: &str, count: u32) {
        *self.stacks.entry(reward_id.to_string()).or_insert(0) += count;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.stacks.iter().map(|(id, count)| (id.as_str(), *count))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnlockFlags {
    flags: BTreeSet<Unlockable>,
}

impl UnlockFlags {
    pub fn unlock(&mut self, flag: Unlockable) {
        self.flags.insert(flag);
    }

    pub fn contains(&self, flag: Unlockable) -> bool {
        self.flags.contains(&flag)
    }

    pub fn iter(&self) -> impl Iterator<Item = Unlockable> + '_ {
        self.flags.iter().copied()
    }
}

/// The "better luck" persistent buff. Only levels 2 and 3 tighten the tier curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LuckBuff {
    pub level: u8,
    pub stacks: u32,
}

impl LuckBuff {
    pub fn new(level: u8, stacks: u32) -> Self {
        Self { level, stacks }
    }

    pub fn is_active(&self) -> bool {
        self.stacks > 0 && self.level > 0
    }

    /// Level that currently applies to the tier curve, 0 when depleted.
    pub fn effective_level(&self) -> u8 {
        if self.is_active() { self.level } else { 0 }
    }

    pub fn consume_one(&mut self) {
        self.stacks = self.stacks.saturating_sub(1);
    }
}

#[derive(Clone, Debug, Default)]
pub struct RunState {
    pub party: Party,
    pub persistent: PersistentRewards,
    pub unlocks: UnlockFlags,
    pub wave_index: u32,
    pub luck: LuckBuff,
}

impl RunState {
    pub fn with_party(party: Party) -> Self {
        Self { party, ..Self::default() }
    }

    /// Single-member view used by the enemy and daily-starter pools. Member ids are preserved.
    pub fn focused_on(&self, member: MemberId) -> Option<RunState> {
        self.party.get(member)?;
        let mut focused = self.clone();
        focused.party.retain_only(member);
        Some(focused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(species: u16) -> PartyMember {
        PartyMember::new(SpeciesId(species), vec![Element::Normal])
    }

    #[test]
    fn focused_view_keeps_only_the_requested_member() {
        let mut party = Party::new();
        let first = party.add(member(1));
        let second = party.add(member(2));
        let run = RunState::with_party(party);

        let focused = run.focused_on(second).expect("member exists");
        assert_eq!(focused.party.len(), 1);
        assert!(focused.party.get(second).is_some());
        assert!(focused.party.get(first).is_none());
        assert_eq!(run.party.len(), 2);
    }

    #[test]
    fn party_luck_is_capped() {
        let mut party = Party::new();
        for species in 0..4 {
            let mut m = member(species);
            m.luck = 5;
            party.add(m);
        }
        assert_eq!(party.luck_value(), 14);
    }

    #[test]
    fn depleted_luck_buff_has_no_effective_level() {
        let mut luck = LuckBuff::new(3, 1);
        assert_eq!(luck.effective_level(), 3);
        luck.consume_one();
        luck.consume_one();
        assert_eq!(luck.stacks, 0);
        assert_eq!(luck.effective_level(), 0);
    }
}
