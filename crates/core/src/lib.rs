pub mod catalog;
pub mod config;
pub mod content;
pub mod engine;
pub mod option;
pub mod path_filter;
pub mod pool;
pub mod rng;
pub mod state;
pub mod threshold;
pub mod tier;
pub mod types;

pub use catalog::{Catalog, CatalogError, RewardCategory, RewardEffect, RewardEntry, RewardKind};
pub use config::{ConfigError, EngineConfig};
pub use engine::{EngineError, RewardEngine, RewardOverride};
pub use option::{OptionId, RewardOption};
pub use path_filter::PathFilter;
pub use pool::{PoolError, PoolSet, RewardPool, WeightedEntry};
pub use rng::RunRng;
pub use state::{LuckBuff, MemberId, Party, PartyMember, RunState};
pub use threshold::{ThresholdSnapshot, ThresholdTable};
pub use types::*;
