//! Configuration for the entity audit module

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Entity audit configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// History rows returned when the caller gives no limit
    #[serde(default = "default_history_limit")]
    pub default_history_limit: u64,

    /// Upper bound for any requested history limit
    #[serde(default = "default_max_history_limit")]
    pub max_history_limit: u64,

    /// Age in days after which audit rows are purged; unset keeps everything
    #[serde(default)]
    pub retention_days: Option<u32>,

    /// Hide soft-deleted rows from `AuditDbContext::query`
    #[serde(default = "default_true")]
    pub soft_delete_filter: bool,

    /// Restrict `AuditDbContext::query` to the context tenant
    #[serde(default = "default_true")]
    pub tenant_filter: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            default_history_limit: default_history_limit(),
            max_history_limit: default_max_history_limit(),
            retention_days: None,
            soft_delete_filter: true,
            tenant_filter: true,
        }
    }
}

impl AuditConfig {
    /// Environment variable prefix, e.g. `ENTITY_AUDIT_RETENTION_DAYS`
    pub const ENV_PREFIX: &'static str = "ENTITY_AUDIT_";

    /// Defaults, overridden by an optional YAML file, overridden by the environment
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config: Self = figment.merge(Env::prefixed(Self::ENV_PREFIX)).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_history_limit == 0 {
            anyhow::bail!("max_history_limit must be greater than zero");
        }
        if self.default_history_limit == 0 {
            anyhow::bail!("default_history_limit must be greater than zero");
        }
        if self.retention_days == Some(0) {
            anyhow::bail!("retention_days must be greater than zero when set");
        }
        Ok(())
    }
}

fn default_history_limit() -> u64 {
    100
}

fn default_max_history_limit() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}
