//! SQL dialect selection and per-dialect text emission.
//!
//! The active dialect is process-scoped configuration: it is set once by the
//! surrounding application (see [`crate::Config::install`]) and read by value
//! whenever a [`crate::QueryBuilder`] is created. Builders never mutate it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::QueryError;

/// Supported SQL backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL: `$1, $2, ...` placeholders, `"ident"` quoting.
    #[default]
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
    /// MySQL: `?` placeholders, `` `ident` `` quoting.
    #[serde(alias = "mariadb")]
    MySql,
}

/// Capabilities that are not available on every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    WebSearch,
    ArrayContains,
    ArrayContainsAll,
    ArrayOverlap,
    Percentile,
    CteMaterialization,
    NoKeyUpdateLock,
    KeyShareLock,
    Returning,
}

impl Feature {
    pub fn name(&self) -> &'static str {
        match self {
            Feature::WebSearch => "web-style full-text search",
            Feature::ArrayContains => "array containment",
            Feature::ArrayContainsAll => "array contains-all",
            Feature::ArrayOverlap => "array overlap",
            Feature::Percentile => "ordered-set percentile aggregate",
            Feature::CteMaterialization => "CTE materialization hint",
            Feature::NoKeyUpdateLock => "FOR NO KEY UPDATE",
            Feature::KeyShareLock => "FOR KEY SHARE",
            Feature::Returning => "RETURNING clause",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Dialect {
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
        }
    }

    /// Whether this backend can express `feature` at all (natively or emulated).
    pub fn supports(&self, feature: Feature) -> bool {
        match self {
            Dialect::Postgres => true,
            Dialect::MySql => !matches!(
                feature,
                Feature::WebSearch
                    | Feature::ArrayContains
                    | Feature::ArrayContainsAll
                    | Feature::ArrayOverlap
                    | Feature::Percentile
                    | Feature::CteMaterialization
                    | Feature::NoKeyUpdateLock
                    | Feature::KeyShareLock
                    | Feature::Returning
            ),
        }
    }

    /// Fail with [`QueryError::Unsupported`] unless `feature` is available.
    pub fn require(&self, feature: Feature) -> Result<(), QueryError> {
        if self.supports(feature) {
            Ok(())
        } else {
            tracing::warn!(dialect = self.name(), feature = feature.name(), "feature refused by backend");
            Err(QueryError::unsupported(feature, *self))
        }
    }

    /// Placeholder text for the 1-based parameter index `n`.
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            Dialect::Postgres => format!("${n}"),
            Dialect::MySql => "?".to_string(),
        }
    }

    pub(crate) fn quote_char(&self) -> char {
        match self {
            Dialect::Postgres => '"',
            Dialect::MySql => '`',
        }
    }

    /// Quote a single identifier part, doubling embedded quote characters.
    pub fn quote(&self, name: &str) -> String {
        let q = self.quote_char();
        let mut out = String::with_capacity(name.len() + 2);
        out.push(q);
        for ch in name.chars() {
            if ch == q {
                out.push(q);
            }
            out.push(ch);
        }
        out.push(q);
        out
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("postgres")
            || s.eq_ignore_ascii_case("postgresql")
            || s.eq_ignore_ascii_case("pg")
        {
            Ok(Dialect::Postgres)
        } else if s.eq_ignore_ascii_case("mysql") || s.eq_ignore_ascii_case("mariadb") {
            Ok(Dialect::MySql)
        } else {
            Err(QueryError::config(format!("unknown dialect: {s}")))
        }
    }
}

static ACTIVE: AtomicU8 = AtomicU8::new(0);

/// The dialect new builders are created with.
pub fn active() -> Dialect {
    match ACTIVE.load(Ordering::Acquire) {
        1 => Dialect::MySql,
        _ => Dialect::Postgres,
    }
}

/// Set the process-wide dialect. Builders created earlier keep the dialect
/// they captured.
pub fn set_active(dialect: Dialect) {
    let tag = match dialect {
        Dialect::Postgres => 0,
        Dialect::MySql => 1,
    };
    ACTIVE.store(tag, Ordering::Release);
    tracing::debug!(dialect = dialect.name(), "active dialect set");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_aliases() {
        assert_eq!("pg".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("MariaDB".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert!("oracle".parse::<Dialect>().is_err());
    }

    #[test]
    fn quoting_doubles_the_quote_char() {
        assert_eq!(Dialect::Postgres.quote("a\"b"), "\"a\"\"b\"");
        assert_eq!(Dialect::MySql.quote("a`b"), "`a``b`");
    }

    #[test]
    fn placeholders() {
        assert_eq!(Dialect::Postgres.placeholder(3), "$3");
        assert_eq!(Dialect::MySql.placeholder(3), "?");
    }

    #[test]
    fn mysql_refuses_array_operators() {
        let err = Dialect::MySql.require(Feature::ArrayOverlap).unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(err.to_string(), "array overlap is not supported by the mysql backend");
        assert!(Dialect::Postgres.require(Feature::ArrayOverlap).is_ok());
    }
}
