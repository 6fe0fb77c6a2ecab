//! Deferred catalog entries whose concrete identity depends on the run.

use std::fmt;

use crate::rng::RunRng;
use crate::state::RunState;

use super::kind::{RewardCategory, RewardKind, RewardTag};

/// Explicit variant selection passed to a generator (pregen arguments).
/// Generators validate these themselves and fall back to a random pick when they do not fit.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    Index(u32),
    Key(String),
}

impl Variant {
    pub fn as_index(&self) -> Option<u32> {
        match self {
            Variant::Index(index) => Some(*index),
            Variant::Key(_) => None,
        }
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            Variant::Key(key) => Some(key),
            Variant::Index(_) => None,
        }
    }
}

pub type GenerateFn = dyn Fn(&RunState, Option<&Variant>, &mut RunRng) -> Option<RewardKind>;

pub struct RewardGenerator {
    pub(super) id: String,
    category: RewardCategory,
    tags: Vec<RewardTag>,
    generate: Box<GenerateFn>,
}

impl RewardGenerator {
    pub fn new(
        category: RewardCategory,
        generate: impl Fn(&RunState, Option<&Variant>, &mut RunRng) -> Option<RewardKind> + 'static,
    ) -> Self {
        Self { id: String::new(), category, tags: Vec::new(), generate: Box::new(generate) }
    }

    pub fn with_tags(mut self, tags: &[RewardTag]) -> Self {
        self.tags = tags.to_vec();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> RewardCategory {
        self.category
    }

    pub fn tags(&self) -> &[RewardTag] {
        &self.tags
    }

    /// `None` means no variant is eligible for this run.
    pub fn generate(
        &self,
        run: &RunState,
        variant: Option<&Variant>,
        rng: &mut RunRng,
    ) -> Option<RewardKind> {
        let mut kind = (self.generate)(run, variant, rng)?;
        if kind.id.is_empty() {
            kind.id = self.id.clone();
        }
        if kind.tags.is_empty() {
            kind.tags = self.tags.clone();
        }
        Some(kind)
    }
}

impl fmt::Debug for RewardGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewardGenerator")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum RewardEntry {
    Concrete(RewardKind),
    Deferred(RewardGenerator),
}

impl RewardEntry {
    pub fn id(&self) -> &str {
        match self {
            RewardEntry::Concrete(kind) => &kind.id,
            RewardEntry::Deferred(generator) => &generator.id,
        }
    }

    pub fn category(&self) -> RewardCategory {
        match self {
            RewardEntry::Concrete(kind) => kind.category,
            RewardEntry::Deferred(generator) => generator.category,
        }
    }

    pub fn tags(&self) -> &[RewardTag] {
        match self {
            RewardEntry::Concrete(kind) => &kind.tags,
            RewardEntry::Deferred(generator) => &generator.tags,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, RewardEntry::Deferred(_))
    }

    pub(super) fn assign_id(&mut self, id: &str) {
        match self {
            RewardEntry::Concrete(kind) if kind.id.is_empty() => kind.id = id.to_string(),
            RewardEntry::Deferred(generator) if generator.id.is_empty() => {
                generator.id = id.to_string()
            }
            _ => {}
        }
    }

    /// Single dispatch point for the two resolution phases.
    pub fn resolve(
        self,
        run: &RunState,
        variant: Option<&Variant>,
        rng: &mut RunRng,
    ) -> Option<RewardKind> {
        match self {
            RewardEntry::Concrete(kind) => Some(kind),
            RewardEntry::Deferred(generator) => generator.generate(run, variant, rng),
        }
    }
}
