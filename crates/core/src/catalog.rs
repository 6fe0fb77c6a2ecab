//! Reward catalog: an ordered registry from stable id to entry factory.
//! Ids come from registration keys; factories never pick their own.

use std::collections::HashMap;

use thiserror::Error;

use crate::rng::RunRng;
use crate::state::RunState;

mod generator;
mod kind;

pub use generator::{GenerateFn, RewardEntry, RewardGenerator, Variant};
pub use kind::{
    GrantedReward, MemberFilter, RewardCategory, RewardEffect, RewardKind, RewardTag,
};

pub type Factory = fn() -> RewardEntry;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("unknown reward id: {0}")]
    UnknownId(String),
    #[error("reward id registered twice: {0}")]
    DuplicateId(String),
    #[error("generator {0} produced no eligible variant")]
    NoEligibleVariant(String),
}

/// Static facts about an entry, captured once at registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryMeta {
    pub category: RewardCategory,
    pub tags: Vec<RewardTag>,
    pub deferred: bool,
}

struct Registration {
    id: String,
    factory: Factory,
    meta: EntryMeta,
}

#[derive(Default)]
pub struct Catalog {
    entries: Vec<Registration>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: &str, factory: Factory) -> Result<(), CatalogError> {
        if self.index.contains_key(id) {
            return Err(CatalogError::DuplicateId(id.to_string()));
        }
        let probe = factory();
        let meta = EntryMeta {
            category: probe.category(),
            tags: probe.tags().to_vec(),
            deferred: probe.is_deferred(),
        };
        self.index.insert(id.to_string(), self.entries.len());
        self.entries.push(Registration { id: id.to_string(), factory, meta });
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|registration| registration.id.as_str())
    }

    pub fn meta(&self, id: &str) -> Option<&EntryMeta> {
        self.index.get(id).map(|&slot| &self.entries[slot].meta)
    }

    /// Builds a fresh entry with its id back-filled from the registry key.
    pub fn entry(&self, id: &str) -> Result<RewardEntry, CatalogError> {
        let slot = self.index.get(id).ok_or_else(|| CatalogError::UnknownId(id.to_string()))?;
        let registration = &self.entries[*slot];
        let mut entry = (registration.factory)();
        entry.assign_id(&registration.id);
        Ok(entry)
    }

    /// Resolves an id to a concrete kind against an empty run.
    pub fn reward_kind(&self, id: &str, rng: &mut RunRng) -> Result<RewardKind, CatalogError> {
        self.reward_kind_with(id, &RunState::default(), None, rng)
    }

    pub fn reward_kind_with(
        &self,
        id: &str,
        run: &RunState,
        variant: Option<&Variant>,
        rng: &mut RunRng,
    ) -> Result<RewardKind, CatalogError> {
        self.entry(id)?
            .resolve(run, variant, rng)
            .ok_or_else(|| CatalogError::NoEligibleVariant(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Stat;

    fn potion() -> RewardEntry {
        RewardEntry::Concrete(RewardKind::new(
            "Potion",
            RewardCategory::Consumable,
            RewardEffect::Heal { percent: 20 },
        ))
    }

    fn stat_booster() -> RewardEntry {
        RewardEntry::Deferred(RewardGenerator::new(
            RewardCategory::Persistent { max_stack: 5 },
            |_, variant, rng| {
                let stat = variant
                    .and_then(Variant::as_index)
                    .and_then(|index| Stat::ALL.get(index as usize).copied())
                    .or_else(|| rng.pick(&Stat::ALL).copied())?;
                Some(RewardKind::new(
                    format!("{stat:?} Booster"),
                    RewardCategory::Persistent { max_stack: 5 },
                    RewardEffect::StatBoost { stat, stages: 1 },
                ))
            },
        ))
    }

    fn never() -> RewardEntry {
        RewardEntry::Deferred(RewardGenerator::new(RewardCategory::Consumable, |_, _, _| None))
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.register("potion", potion).unwrap();
        catalog.register("stat_booster", stat_booster).unwrap();
        catalog.register("never", never).unwrap();
        catalog
    }

    #[test]
    fn ids_are_back_filled_from_registration() {
        let catalog = catalog();
        let mut rng = RunRng::new(7);
        assert_eq!(catalog.reward_kind("potion", &mut rng).unwrap().id, "potion");
        let boosted = catalog
            .reward_kind_with("stat_booster", &RunState::default(), Some(&Variant::Index(4)), &mut rng)
            .unwrap();
        assert_eq!(boosted.id, "stat_booster");
        assert_eq!(boosted.effect, RewardEffect::StatBoost { stat: Stat::Speed, stages: 1 });
    }

    #[test]
    fn registry_keeps_order_and_rejects_duplicates() {
        let mut catalog = catalog();
        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec!["potion", "stat_booster", "never"]);
        assert_eq!(
            catalog.register("potion", potion),
            Err(CatalogError::DuplicateId("potion".to_string()))
        );
        assert!(catalog.meta("stat_booster").is_some_and(|meta| meta.deferred));
    }

    #[test]
    fn lookup_failures_are_typed() {
        let catalog = catalog();
        let mut rng = RunRng::new(7);
        assert_eq!(
            catalog.reward_kind("missing", &mut rng),
            Err(CatalogError::UnknownId("missing".to_string()))
        );
        assert_eq!(
            catalog.reward_kind("never", &mut rng),
            Err(CatalogError::NoEligibleVariant("never".to_string()))
        );
    }
}
