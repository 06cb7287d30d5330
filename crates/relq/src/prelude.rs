//! Convenient imports for typical `relq` usage.
//!
//! ```ignore
//! use relq::prelude::*;
//! ```

pub use crate::{
    Condition, Dialect, Direction, QueryBuilder, QueryError, QueryResult, ResultCache, Statement,
    Value, Wait, args, table,
};
