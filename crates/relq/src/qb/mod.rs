//! Query builder.
//!
//! A [`QueryBuilder`] accumulates clauses immutably and renders them into a
//! single [`Statement`] whose placeholders are numbered across every nested
//! builder (CTEs, subqueries, set-operation operands).
//!
//! # Usage
//!
//! ```ignore
//! use relq::qb;
//!
//! // SELECT
//! let stmt = qb::table("users")
//!     .filter("status = ?", ["active"])
//!     .order("created_at", Direction::Desc)
//!     .limit(10)
//!     .render_select();
//!
//! // INSERT
//! let stmt = qb::table("users").render_insert([("username", "alice"), ("email", "a@x.io")]);
//!
//! // UPDATE
//! let stmt = qb::table("users")
//!     .filter("id = ?", [user_id])
//!     .render_update([("status", "inactive")])?;
//!
//! // DELETE
//! let stmt = qb::table("users").filter("id = ?", [user_id]).render_delete();
//! ```

mod builder;
mod clause;
mod dialect_ops;
mod render;
mod statement;

pub use builder::QueryBuilder;
pub use clause::{
    CombinedClause, Connective, CteClause, Direction, ExistsClause, Filter, FromSubquery,
    InSubqueryClause, JoinClause, JoinKind, LockMode, Materialization, Nulls, OrderClause,
    Predicate, RowLock, SetOpClause, SetOpKind, Wait, WindowClause,
};
pub use dialect_ops::{DatePart, TimeUnit};
pub use render::{Fragment, count_markers, number_markers};
pub(crate) use render::marker_safe;
pub use statement::Statement;

/// Start a query against `table` with the active dialect.
///
/// # Example
/// ```ignore
/// let q = relq::qb::table("users").filter("id = ?", [1]);
/// ```
pub fn table(name: &str) -> QueryBuilder {
    QueryBuilder::new(name)
}
