//! Reward engine: owns the catalog, the pools, the threshold caches and the shared random
//! stream.
//!
//! Thresholds must be regenerated at every checkpoint where live weights can move: the start
//! of an offer, after a reroll, after any party change (catch, faint, fusion) and after a
//! persistent buff changes. Each regeneration hands out a `ThresholdSnapshot`; resolution
//! rejects snapshots from older regenerations or from a different run state.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::catalog::{Catalog, CatalogError, RewardKind, Variant};
use crate::config::{ConfigError, EngineConfig};
use crate::content;
use crate::option::{OptionId, RewardOption};
use crate::pool::{PoolError, PoolSet};
use crate::rng::RunRng;
use crate::state::MemberId;
use crate::threshold::ThresholdTable;
use crate::types::{PoolKind, Tier};

mod batch;
mod path;
mod resolve;
mod thresholds;
mod variants;


#[derive(Debug, Error)]
pub enum EngineError {
    #[error("thresholds for the {0:?} pool were never regenerated")]
    NotRegenerated(PoolKind),
    #[error("stale threshold snapshot for the {pool_kind:?} pool; regenerate before resolving")]
    StaleThresholds { pool_kind: PoolKind },
    #[error("{operation} cannot draw from the {pool_kind:?} pool")]
    WrongPoolKind { operation: &'static str, pool_kind: PoolKind },
    #[error("party member {0:?} is not part of the run")]
    UnknownMember(MemberId),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Forces slot `n` of the next batches to a specific catalog entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewardOverride {
    pub id: String,
    pub variant: Option<Variant>,
}

impl RewardOverride {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string(), variant: None }
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }
}

pub struct RewardEngine {
    catalog: Catalog,
    pools: PoolSet,
    config: EngineConfig,
    rng: RunRng,
    thresholds: BTreeMap<PoolKind, ThresholdTable>,
    next_generation: u64,
    next_option_serial: u64,
    tier_memo: HashMap<String, Option<Tier>>,
    overrides: Vec<RewardOverride>,
}

impl RewardEngine {
    pub fn new(
        seed: u64,
        catalog: Catalog,
        pools: PoolSet,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        pools.validate(&catalog)?;
        Ok(Self {
            catalog,
            pools,
            config,
            rng: RunRng::new(seed),
            thresholds: BTreeMap::new(),
            next_generation: 0,
            next_option_serial: 0,
            tier_memo: HashMap::new(),
            overrides: Vec::new(),
        })
    }

    pub fn with_default_content(seed: u64, config: EngineConfig) -> Result<Self, EngineError> {
        Self::new(seed, content::default_catalog()?, content::default_pools(), config)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn pools(&self) -> &PoolSet {
        &self.pools
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rng(&self) -> &RunRng {
        &self.rng
    }

    /// Restarts the shared stream, e.g. at the start of a wave.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = RunRng::new(seed);
    }

    /// Catalog lookup; generators are resolved against an empty run.
    pub fn reward_kind_by_id(&mut self, id: &str) -> Result<RewardKind, EngineError> {
        let mut kind = self.catalog.reward_kind(id, &mut self.rng)?;
        if kind.tier.is_none() {
            kind.tier = self.tier_of(id);
        }
        Ok(kind)
    }

    /// First pool tier listing `id`, memoized after the first lookup.
    pub fn tier_of(&mut self, id: &str) -> Option<Tier> {
        if let Some(tier) = self.tier_memo.get(id) {
            return *tier;
        }
        let tier = self.pools.tier_of(id);
        self.tier_memo.insert(id.to_string(), tier);
        tier
    }

    pub fn set_overrides(&mut self, overrides: Vec<RewardOverride>) {
        self.overrides = overrides;
    }

    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }

    pub fn overrides(&self) -> &[RewardOverride] {
        &self.overrides
    }

    fn next_option_id(&mut self) -> OptionId {
        let serial = self.next_option_serial;
        self.next_option_serial += 1;
        OptionId(xxh3_64_with_seed(&serial.to_le_bytes(), self.rng.seed()))
    }

    fn wrap(&mut self, kind: RewardKind, upgrade_count: u32) -> RewardOption {
        let id = self.next_option_id();
        RewardOption::new(kind, upgrade_count, id)
    }
}
