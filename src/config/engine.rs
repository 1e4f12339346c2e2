//! Engine configuration and loading from JSON or the environment.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::config::PolicyConfig;
use crate::core::AppResult;

/// Root engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Classifier thresholds.
    pub policy: PolicyConfig,
    /// Maximum audit events retained in memory.
    pub audit_capacity: usize,
    /// Interval between automatic rebalance passes; `0` disables the ticker.
    pub rebalance_interval_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: PolicyConfig::default(),
            audit_capacity: 1024,
            rebalance_interval_secs: 0,
        }
    }
}

impl EngineConfig {
    /// Validate the policy and buffer sizes.
    pub fn validate(&self) -> Result<(), String> {
        self.policy
            .validate()
            .map_err(|e| format!("policy invalid: {e}"))?;
        if self.audit_capacity == 0 {
            return Err("audit_capacity must be greater than 0".into());
        }
        Ok(())
    }

    /// Automatic rebalance interval, `None` when the ticker is disabled.
    #[must_use]
    pub const fn rebalance_interval(&self) -> Option<Duration> {
        match self.rebalance_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Parse engine configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from `TIER_*` environment variables, reading a
    /// `.env` file first if one is present. Unset variables keep defaults.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Used by
    /// [`EngineConfig::from_env`] and by tests that must not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        read_var(&lookup, "TIER_UPGRADE_CPU_PERCENT", &mut cfg.policy.upgrade_cpu_percent)?;
        read_var(&lookup, "TIER_OVERLOAD_CPU_PERCENT", &mut cfg.policy.overload_cpu_percent)?;
        read_var(&lookup, "TIER_IDLE_CPU_PERCENT", &mut cfg.policy.idle_cpu_percent)?;
        read_var(&lookup, "TIER_OVERLOAD_MINUTES", &mut cfg.policy.overload_minutes)?;
        read_var(&lookup, "TIER_IDLE_MINUTES", &mut cfg.policy.idle_minutes)?;
        read_var(&lookup, "TIER_AUDIT_CAPACITY", &mut cfg.audit_capacity)?;
        read_var(&lookup, "TIER_REBALANCE_INTERVAL_SECS", &mut cfg.rebalance_interval_secs)?;
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}

fn read_var<F, T>(lookup: &F, key: &str, slot: &mut T) -> AppResult<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Some(raw) = lookup(key) {
        *slot = raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}"))?;
    }
    Ok(())
}
