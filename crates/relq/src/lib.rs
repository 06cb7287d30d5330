//! # relq
//!
//! Immutable, dialect-aware SQL query construction.
//!
//! ## Features
//!
//! - **Immutable builders**: every call returns a new builder, so a base query can be branched freely
//! - **Stable placeholders**: `?` markers are numbered across CTEs, subqueries and set operations
//! - **Two dialects**: PostgreSQL (`$n`, `"ident"`) and MySQL (`?`, `` `ident` ``)
//! - **Fail fast**: backend-specific helpers return an error on a backend that cannot express them
//! - **Result cache**: optional memoization keyed by the rendered statement
//!
//! ## Query Builder
//!
//! ```ignore
//! use relq::{Direction, table};
//!
//! // SELECT
//! let stmt = table("users")
//!     .filter("status = ?", ["active"])
//!     .order("created_at", Direction::Desc)
//!     .limit(10)
//!     .render_select();
//! // SELECT * FROM "users" WHERE status = $1 ORDER BY "created_at" DESC LIMIT 10
//!
//! // INSERT
//! let stmt = table("users").render_insert([("username", "alice")]);
//!
//! // UPDATE
//! let stmt = table("users")
//!     .filter("id = ?", [user_id])
//!     .render_update([("status", "inactive")])?;
//!
//! // DELETE
//! let stmt = table("users").filter("id = ?", [user_id]).render_delete();
//!
//! // Hand off to tokio-postgres
//! client.query(&stmt.sql, &stmt.params_ref()).await?;
//! ```

pub mod cache;
pub mod condition;
pub mod config;
pub mod dialect;
pub mod error;
pub mod ident;
mod macros;
pub mod prelude;
pub mod qb;
pub mod value;

pub use cache::{CacheStats, ResultCache};
pub use condition::{Condition, Op};
pub use config::Config;
pub use dialect::{Dialect, Feature};
pub use error::{QueryError, QueryResult};
pub use ident::Ident;
pub use value::Value;

// Re-export qb module for easy access
pub use qb::{
    CombinedClause, Connective, CteClause, DatePart, Direction, ExistsClause, Filter,
    FromSubquery, InSubqueryClause, JoinClause, JoinKind, LockMode, Materialization, Nulls,
    OrderClause, Predicate, QueryBuilder, RowLock, SetOpClause, SetOpKind, Statement, TimeUnit,
    Wait, WindowClause, table,
};
