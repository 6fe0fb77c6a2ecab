//! Tunable engine constants: tier curves, luck divisors, pity odds and retry caps.
//! `Default` carries the tuned balance; JSON files may override any subset of fields.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::PoolKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid tier curve for {pool:?}: {reason}")]
    InvalidCurve { pool: PoolKind, reason: String },
    #[error("invalid engine config: {0}")]
    Invalid(String),
}

/// Partition of `[0, draw_range)` into five tiers. A draw above `breakpoints[0]` is Common,
/// above `breakpoints[1]` Great, then Ultra, then Rogue; anything else is Master.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierCurve {
    pub draw_range: u32,
    pub breakpoints: [u32; 4],
}

impl TierCurve {
    pub fn player() -> Self {
        Self { draw_range: 1024, breakpoints: [255, 60, 12, 0] }
    }

    pub fn trainer() -> Self {
        Self { draw_range: 1024, breakpoints: [383, 95, 23, 3] }
    }

    pub fn daily_starter() -> Self {
        Self { draw_range: 64, breakpoints: [25, 12, 4, 0] }
    }

    fn validate(&self, pool: PoolKind) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidCurve { pool, reason: reason.to_string() };
        if self.draw_range == 0 {
            return Err(invalid("draw range must be positive"));
        }
        if self.breakpoints[0] >= self.draw_range {
            return Err(invalid("common breakpoint must lie inside the draw range"));
        }
        if self.breakpoints.windows(2).any(|pair| pair[0] < pair[1]) {
            return Err(invalid("breakpoints must not increase"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LuckDivisors {
    pub base: f64,
    pub level_two: f64,
    pub level_three: f64,
}

impl Default for LuckDivisors {
    fn default() -> Self {
        Self { base: 1.0, level_two: 1.2, level_three: 1.45 }
    }
}

impl LuckDivisors {
    pub fn for_level(&self, level: u8) -> f64 {
        match level {
            0 | 1 => self.base,
            2 => self.level_two,
            _ => self.level_three,
        }
    }
}

/// Geometric pity loop: keep upgrading while `draw(odds) < success_below`, where
/// `odds = floor(range_base / ((luck + 4) / 4))`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PityConfig {
    pub range_base: u32,
    pub luck: u32,
    pub success_below: u32,
}

impl Default for PityConfig {
    fn default() -> Self {
        Self { range_base: 128, luck: 5, success_below: 4 }
    }
}

impl PityConfig {
    pub fn upgrade_odds(&self) -> u32 {
        (f64::from(self.range_base) / ((f64::from(self.luck) + 4.0) / 4.0)).floor() as u32
    }
}

/// Upgrade sub-loop for explicitly requested tiers:
/// `odds = floor(range_base / ((party_luck + 2) / 2))`, one success per `draw(odds) == 0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplicitUpgradeConfig {
    pub range_base: u32,
}

impl Default for ExplicitUpgradeConfig {
    fn default() -> Self {
        Self { range_base: 32 }
    }
}

impl ExplicitUpgradeConfig {
    pub fn upgrade_odds(&self, party_luck: u32) -> u32 {
        let odds = f64::from(self.range_base) / ((f64::from(party_luck) + 2.0) / 2.0);
        (odds.floor() as u32).max(1)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub player_curve: TierCurve,
    pub wild_curve: TierCurve,
    pub trainer_curve: TierCurve,
    pub daily_starter_curve: TierCurve,
    pub luck_divisors: LuckDivisors,
    pub pity: PityConfig,
    pub explicit_upgrade: ExplicitUpgradeConfig,
    pub luck_consume_percent: u32,
    pub generator_retry_limit: u32,
    pub batch_retry_factor: usize,
    pub batch_retry_cap: usize,
    pub enemy_buff_retry_cap: u32,
    pub daily_starter_per_member: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            player_curve: TierCurve::player(),
            wild_curve: TierCurve::player(),
            trainer_curve: TierCurve::trainer(),
            daily_starter_curve: TierCurve::daily_starter(),
            luck_divisors: LuckDivisors::default(),
            pity: PityConfig::default(),
            explicit_upgrade: ExplicitUpgradeConfig::default(),
            luck_consume_percent: 50,
            generator_retry_limit: 10,
            batch_retry_factor: 5,
            batch_retry_cap: 50,
            enemy_buff_retry_cap: 50,
            daily_starter_per_member: 3,
        }
    }
}

impl EngineConfig {
    pub fn curve_for(&self, pool: PoolKind) -> &TierCurve {
        match pool {
            PoolKind::Wild => &self.wild_curve,
            PoolKind::Trainer => &self.trainer_curve,
            PoolKind::DailyStarter => &self.daily_starter_curve,
            PoolKind::Player | PoolKind::Draft | PoolKind::EnemyBuff | PoolKind::Debug => {
                &self.player_curve
            }
        }
    }

    /// Re-roll budget for an offer of `count` slots.
    pub fn batch_retry_budget(&self, count: usize) -> usize {
        count.saturating_mul(self.batch_retry_factor).min(self.batch_retry_cap)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.player_curve.validate(PoolKind::Player)?;
        self.wild_curve.validate(PoolKind::Wild)?;
        self.trainer_curve.validate(PoolKind::Trainer)?;
        self.daily_starter_curve.validate(PoolKind::DailyStarter)?;

        let divisors = &self.luck_divisors;
        if [divisors.base, divisors.level_two, divisors.level_three]
            .iter()
            .any(|divisor| !divisor.is_finite() || *divisor < 1.0)
        {
            return Err(ConfigError::Invalid("luck divisors must be finite and >= 1.0".into()));
        }
        if self.pity.upgrade_odds() <= self.pity.success_below {
            return Err(ConfigError::Invalid(
                "pity odds must exceed the success threshold or the loop never ends".into(),
            ));
        }
        if self.luck_consume_percent > 100 {
            return Err(ConfigError::Invalid("luck consume chance is a percentage".into()));
        }
        if self.generator_retry_limit == 0 {
            return Err(ConfigError::Invalid("generator retry limit must be positive".into()));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn write_pretty(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source: io::Error| ConfigError::Io { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other).map_err(io_error)?;
        fs::write(&tmp_path, json).map_err(io_error)?;
        fs::rename(&tmp_path, path).map_err(io_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_constants_match_tuned_values() {
        let config = EngineConfig::default();
        assert_eq!(config.pity.upgrade_odds(), 56);
        assert_eq!(config.explicit_upgrade.upgrade_odds(0), 32);
        assert_eq!(config.explicit_upgrade.upgrade_odds(14), 4);
        assert_eq!(config.batch_retry_budget(3), 15);
        assert_eq!(config.batch_retry_budget(20), 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn write_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.json");
        let mut config = EngineConfig::default();
        config.trainer_curve = TierCurve { draw_range: 512, breakpoints: [200, 40, 10, 1] };

        config.write_pretty(&path).unwrap();
        assert!(path.exists());
        assert_eq!(EngineConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{ "luck_consume_percent": 25 }"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.luck_consume_percent, 25);
        assert_eq!(config.player_curve, TierCurve::player());
    }

    #[test]
    fn invalid_curves_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        let mut config = EngineConfig::default();
        config.player_curve.breakpoints = [10, 60, 12, 0];
        fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        assert!(matches!(
            EngineConfig::load(&path),
            Err(ConfigError::InvalidCurve { pool: PoolKind::Player, .. })
        ));
        assert!(matches!(
            EngineConfig::load(&dir.path().join("missing.json")),
            Err(ConfigError::Io { .. })
        ));
    }
}
