//! Runtime configuration.
//!
//! ```toml
//! dialect = "mysql"
//! cache_capacity = 512
//! ```
//!
//! The same settings can come from `RELQ_DIALECT` and `RELQ_CACHE_CAPACITY`.

use serde::Deserialize;
use std::path::Path;

use crate::dialect::{self, Dialect};
use crate::error::{QueryError, QueryResult};

pub const ENV_DIALECT: &str = "RELQ_DIALECT";
pub const ENV_CACHE_CAPACITY: &str = "RELQ_CACHE_CAPACITY";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub dialect: Dialect,
    /// Bound for [`crate::ResultCache::from_config`]; unbounded when absent.
    #[serde(default)]
    pub cache_capacity: Option<usize>,
}

impl Config {
    pub fn from_toml_str(raw: &str) -> QueryResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            QueryError::config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Read settings from the process environment. Unset variables keep defaults.
    pub fn from_env() -> QueryResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> QueryResult<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_DIALECT) {
            config.dialect = raw.parse()?;
        }
        if let Some(raw) = lookup(ENV_CACHE_CAPACITY) {
            let n = raw.trim().parse::<usize>().map_err(|e| {
                QueryError::config(format!("invalid {ENV_CACHE_CAPACITY} `{raw}`: {e}"))
            })?;
            config.cache_capacity = Some(n);
        }
        Ok(config)
    }

    /// Make this configuration's dialect the one new builders capture.
    pub fn install(&self) {
        dialect::set_active(self.dialect);
        tracing::info!(dialect = self.dialect.name(), cache_capacity = ?self.cache_capacity, "relq configured");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn toml_defaults() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.dialect, Dialect::Postgres);
    }

    #[test]
    fn toml_values() {
        let cfg = Config::from_toml_str("dialect = \"mysql\"\ncache_capacity = 8\n").unwrap();
        assert_eq!(cfg.dialect, Dialect::MySql);
        assert_eq!(cfg.cache_capacity, Some(8));
    }

    #[test]
    fn toml_errors_are_config_errors() {
        let err = Config::from_toml_str("dialect = \"oracle\"").unwrap_err();
        assert!(matches!(err, QueryError::Config(_)));
        assert!(Config::from_toml_str("colour = 1").is_err());
    }

    #[test]
    fn env_lookup() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_DIALECT, "MariaDB"), (ENV_CACHE_CAPACITY, " 64 ")]);
        let cfg = Config::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.dialect, Dialect::MySql);
        assert_eq!(cfg.cache_capacity, Some(64));

        let bad: HashMap<&str, &str> = HashMap::from([(ENV_CACHE_CAPACITY, "lots")]);
        assert!(Config::from_lookup(|k| bad.get(k).map(|v| v.to_string())).is_err());
    }

    #[test]
    fn missing_file() {
        let err = Config::load("/definitely/not/here/relq.toml").unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
