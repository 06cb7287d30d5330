//! Typed WHERE conditions.
//!
//! [`Condition`] is the structured counterpart of `filter("col = ?", [v])`:
//! the column is validated as an identifier up front and quoted for whichever
//! dialect the owning builder renders with. A condition lowers to a
//! [`Predicate`] with `?` markers, so it is numbered exactly like raw filters.
//!
//! ```ignore
//! use relq::{Condition, table};
//!
//! let q = table("users")
//!     .filter_by(Condition::eq("status", "active")?)
//!     .filter_by(Condition::any(vec![
//!         Condition::gt("age", 65)?,
//!         Condition::is_null("age")?,
//!     ]));
//! ```

use crate::dialect::Dialect;
use crate::error::QueryResult;
use crate::ident::Ident;
use crate::qb::{Predicate, marker_safe};
use crate::value::Value;

/// Comparison operator applied to one column.
#[derive(Debug, Clone, PartialEq)]
pub enum Op<T> {
    /// Equal: column = value
    Eq(T),
    /// Not equal: column != value
    Ne(T),
    /// Greater than: column > value
    Gt(T),
    /// Greater than or equal: column >= value
    Gte(T),
    /// Less than: column < value
    Lt(T),
    /// Less than or equal: column <= value
    Lte(T),
    /// LIKE pattern match
    Like(T),
    /// Case-insensitive LIKE (emulated with LOWER() on MySQL)
    Ilike(T),
    /// NOT LIKE pattern match
    NotLike(T),
    /// NOT ILIKE pattern match
    NotIlike(T),
    /// IS NULL
    IsNull,
    /// IS NOT NULL
    IsNotNull,
    /// IN (list)
    In(Vec<T>),
    /// NOT IN (list)
    NotIn(Vec<T>),
    /// BETWEEN a AND b
    Between(T, T),
    /// NOT BETWEEN a AND b
    NotBetween(T, T),
}

impl<T: Into<Value>> Op<T> {
    fn into_values(self) -> Op<Value> {
        match self {
            Op::Eq(v) => Op::Eq(v.into()),
            Op::Ne(v) => Op::Ne(v.into()),
            Op::Gt(v) => Op::Gt(v.into()),
            Op::Gte(v) => Op::Gte(v.into()),
            Op::Lt(v) => Op::Lt(v.into()),
            Op::Lte(v) => Op::Lte(v.into()),
            Op::Like(v) => Op::Like(v.into()),
            Op::Ilike(v) => Op::Ilike(v.into()),
            Op::NotLike(v) => Op::NotLike(v.into()),
            Op::NotIlike(v) => Op::NotIlike(v.into()),
            Op::IsNull => Op::IsNull,
            Op::IsNotNull => Op::IsNotNull,
            Op::In(vs) => Op::In(vs.into_iter().map(Into::into).collect()),
            Op::NotIn(vs) => Op::NotIn(vs.into_iter().map(Into::into).collect()),
            Op::Between(a, b) => Op::Between(a.into(), b.into()),
            Op::NotBetween(a, b) => Op::NotBetween(a.into(), b.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ConditionInner {
    /// Raw SQL with `?` markers.
    Raw(String, Vec<Value>),
    Expr { column: Ident, op: Op<Value> },
    /// `(a, b) op (?, ?)`, used for keyset pagination.
    Tuple2 {
        columns: (Ident, Ident),
        operator: &'static str,
        values: (Value, Value),
    },
    Any(Vec<Condition>),
    All(Vec<Condition>),
}

/// A WHERE condition that can be attached with
/// [`QueryBuilder::filter_by`](crate::QueryBuilder::filter_by).
#[derive(Debug, Clone, PartialEq)]
pub struct Condition(ConditionInner);

impl Condition {
    /// Create a structured condition from a column identifier and operator.
    pub fn new<T: Into<Value>>(column: &str, op: Op<T>) -> QueryResult<Self> {
        Ok(Condition(ConditionInner::Expr {
            column: Ident::parse(column)?,
            op: op.into_values(),
        }))
    }

    /// Raw SQL with `?` markers.
    ///
    /// # Safety
    /// Be careful with SQL injection when using raw conditions.
    pub fn raw<V: Into<Value>>(sql: impl Into<String>, args: impl IntoIterator<Item = V>) -> Self {
        Condition(ConditionInner::Raw(
            sql.into(),
            args.into_iter().map(Into::into).collect(),
        ))
    }

    /// `(a, b) < (?, ?)`
    pub fn tuple_lt(a: &str, b: &str, va: impl Into<Value>, vb: impl Into<Value>) -> QueryResult<Self> {
        Self::tuple2(a, b, "<", va.into(), vb.into())
    }

    /// `(a, b) > (?, ?)`
    pub fn tuple_gt(a: &str, b: &str, va: impl Into<Value>, vb: impl Into<Value>) -> QueryResult<Self> {
        Self::tuple2(a, b, ">", va.into(), vb.into())
    }

    fn tuple2(a: &str, b: &str, operator: &'static str, va: Value, vb: Value) -> QueryResult<Self> {
        Ok(Condition(ConditionInner::Tuple2 {
            columns: (Ident::parse(a)?, Ident::parse(b)?),
            operator,
            values: (va, vb),
        }))
    }

    /// Disjunction. An empty list is always false.
    pub fn any(conditions: Vec<Condition>) -> Self {
        Condition(ConditionInner::Any(conditions))
    }

    /// Conjunction. An empty list is always true.
    pub fn all(conditions: Vec<Condition>) -> Self {
        Condition(ConditionInner::All(conditions))
    }

    // ==================== Convenience constructors ====================

    pub fn eq<T: Into<Value>>(column: &str, value: T) -> QueryResult<Self> {
        Self::new(column, Op::Eq(value))
    }

    pub fn ne<T: Into<Value>>(column: &str, value: T) -> QueryResult<Self> {
        Self::new(column, Op::Ne(value))
    }

    pub fn gt<T: Into<Value>>(column: &str, value: T) -> QueryResult<Self> {
        Self::new(column, Op::Gt(value))
    }

    pub fn gte<T: Into<Value>>(column: &str, value: T) -> QueryResult<Self> {
        Self::new(column, Op::Gte(value))
    }

    pub fn lt<T: Into<Value>>(column: &str, value: T) -> QueryResult<Self> {
        Self::new(column, Op::Lt(value))
    }

    pub fn lte<T: Into<Value>>(column: &str, value: T) -> QueryResult<Self> {
        Self::new(column, Op::Lte(value))
    }

    pub fn like<T: Into<Value>>(column: &str, pattern: T) -> QueryResult<Self> {
        Self::new(column, Op::Like(pattern))
    }

    pub fn ilike<T: Into<Value>>(column: &str, pattern: T) -> QueryResult<Self> {
        Self::new(column, Op::Ilike(pattern))
    }

    pub fn not_like<T: Into<Value>>(column: &str, pattern: T) -> QueryResult<Self> {
        Self::new(column, Op::NotLike(pattern))
    }

    pub fn not_ilike<T: Into<Value>>(column: &str, pattern: T) -> QueryResult<Self> {
        Self::new(column, Op::NotIlike(pattern))
    }

    pub fn is_null(column: &str) -> QueryResult<Self> {
        Self::new(column, Op::<Value>::IsNull)
    }

    pub fn is_not_null(column: &str) -> QueryResult<Self> {
        Self::new(column, Op::<Value>::IsNotNull)
    }

    pub fn in_list<T: Into<Value>>(column: &str, values: Vec<T>) -> QueryResult<Self> {
        Self::new(column, Op::In(values))
    }

    pub fn not_in<T: Into<Value>>(column: &str, values: Vec<T>) -> QueryResult<Self> {
        Self::new(column, Op::NotIn(values))
    }

    pub fn between<T: Into<Value>>(column: &str, from: T, to: T) -> QueryResult<Self> {
        Self::new(column, Op::Between(from, to))
    }

    pub fn not_between<T: Into<Value>>(column: &str, from: T, to: T) -> QueryResult<Self> {
        Self::new(column, Op::NotBetween(from, to))
    }

    /// Lower to a predicate with `?` markers, quoting columns for `dialect`.
    pub fn to_predicate(&self, dialect: Dialect) -> Predicate {
        let mut values = Vec::new();
        let sql = self.write(dialect, &mut values);
        Predicate::new(sql, values)
    }

    fn write(&self, dialect: Dialect, values: &mut Vec<Value>) -> String {
        match &self.0 {
            ConditionInner::Raw(sql, args) => {
                values.extend(args.iter().cloned());
                sql.clone()
            }
            ConditionInner::Expr { column, op } => {
                write_expr(&marker_safe(&column.to_sql(dialect)), op, dialect, values)
            }
            ConditionInner::Tuple2 {
                columns: (a, b),
                operator,
                values: (va, vb),
            } => {
                values.push(va.clone());
                values.push(vb.clone());
                let (a, b) = (marker_safe(&a.to_sql(dialect)), marker_safe(&b.to_sql(dialect)));
                format!("({a}, {b}) {operator} (?, ?)")
            }
            ConditionInner::Any(conds) => write_group(conds, " OR ", "1=0", dialect, values),
            ConditionInner::All(conds) => write_group(conds, " AND ", "1=1", dialect, values),
        }
    }
}

fn write_group(
    conds: &[Condition],
    sep: &str,
    empty: &str,
    dialect: Dialect,
    values: &mut Vec<Value>,
) -> String {
    match conds {
        [] => empty.to_string(),
        [only] => only.write(dialect, values),
        _ => {
            let parts: Vec<String> = conds.iter().map(|c| c.write(dialect, values)).collect();
            format!("({})", parts.join(sep))
        }
    }
}

fn write_expr(col: &str, op: &Op<Value>, dialect: Dialect, values: &mut Vec<Value>) -> String {
    let single = |operator: &str, v: &Value, values: &mut Vec<Value>| {
        values.push(v.clone());
        format!("{col} {operator} ?")
    };
    match op {
        Op::Eq(v) => single("=", v, values),
        Op::Ne(v) => single("!=", v, values),
        Op::Gt(v) => single(">", v, values),
        Op::Gte(v) => single(">=", v, values),
        Op::Lt(v) => single("<", v, values),
        Op::Lte(v) => single("<=", v, values),
        Op::Like(v) => single("LIKE", v, values),
        Op::NotLike(v) => single("NOT LIKE", v, values),
        Op::Ilike(v) | Op::NotIlike(v) => {
            let negated = matches!(op, Op::NotIlike(_));
            values.push(v.clone());
            match (dialect, negated) {
                (Dialect::Postgres, false) => format!("{col} ILIKE ?"),
                (Dialect::Postgres, true) => format!("{col} NOT ILIKE ?"),
                (Dialect::MySql, false) => format!("LOWER({col}) LIKE LOWER(?)"),
                (Dialect::MySql, true) => format!("LOWER({col}) NOT LIKE LOWER(?)"),
            }
        }
        Op::IsNull => format!("{col} IS NULL"),
        Op::IsNotNull => format!("{col} IS NOT NULL"),
        // Empty IN list: always false / true
        Op::In(vs) if vs.is_empty() => "1=0".to_string(),
        Op::NotIn(vs) if vs.is_empty() => "1=1".to_string(),
        Op::In(vs) | Op::NotIn(vs) => {
            let operator = if matches!(op, Op::In(_)) { "IN" } else { "NOT IN" };
            values.extend(vs.iter().cloned());
            format!("{col} {operator} ({})", vec!["?"; vs.len()].join(", "))
        }
        Op::Between(a, b) | Op::NotBetween(a, b) => {
            let operator = if matches!(op, Op::Between(..)) { "BETWEEN" } else { "NOT BETWEEN" };
            values.push(a.clone());
            values.push(b.clone());
            format!("{col} {operator} ? AND ?")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PG: Dialect = Dialect::Postgres;

    #[test]
    fn comparison_quotes_column() {
        let p = Condition::eq("users.status", "active").unwrap().to_predicate(PG);
        assert_eq!(p.sql, r#""users"."status" = ?"#);
        assert_eq!(p.values, vec![Value::from("active")]);
    }

    #[test]
    fn invalid_column_is_rejected() {
        assert!(Condition::eq("status; DROP TABLE x", 1).is_err());
        assert!(Condition::is_null("").is_err());
    }

    #[test]
    fn empty_lists() {
        let none: Vec<i64> = Vec::new();
        assert_eq!(Condition::in_list("id", none.clone()).unwrap().to_predicate(PG).sql, "1=0");
        assert_eq!(Condition::not_in("id", none).unwrap().to_predicate(PG).sql, "1=1");
        assert_eq!(Condition::any(vec![]).to_predicate(PG).sql, "1=0");
        assert_eq!(Condition::all(vec![]).to_predicate(PG).sql, "1=1");
    }

    #[test]
    fn groups_nest_with_parens() {
        let c = Condition::all(vec![
            Condition::between("age", 18, 65).unwrap(),
            Condition::any(vec![
                Condition::is_null("deleted_at").unwrap(),
                Condition::in_list("role", vec!["a", "b"]).unwrap(),
            ]),
        ]);
        let p = c.to_predicate(PG);
        assert_eq!(
            p.sql,
            r#"("age" BETWEEN ? AND ? AND ("deleted_at" IS NULL OR "role" IN (?, ?)))"#
        );
        assert_eq!(
            p.values,
            vec![Value::Int(18), Value::Int(65), Value::from("a"), Value::from("b")]
        );
    }

    #[test]
    fn ilike_on_mysql_lowercases() {
        let c = Condition::ilike("name", "%bob%").unwrap();
        assert_eq!(c.to_predicate(PG).sql, r#""name" ILIKE ?"#);
        assert_eq!(c.to_predicate(Dialect::MySql).sql, "LOWER(`name`) LIKE LOWER(?)");
    }

    #[test]
    fn question_mark_in_quoted_column_is_not_a_marker() {
        let p = Condition::eq(r#""a?""#, 1).unwrap().to_predicate(PG);
        assert_eq!(p.sql, r#""a??" = ?"#);
        assert_eq!(p.render(PG, 0).sql, r#""a?" = $1"#);

        let p = Condition::tuple_lt(r#""k?""#, "id", 1, 2).unwrap().to_predicate(PG);
        assert_eq!(p.render(PG, 4).sql, r#"("k?", "id") < ($5, $6)"#);
        assert!(p.check().is_ok());
    }

    #[test]
    fn tuple_comparison() {
        let p = Condition::tuple_gt("created_at", "id", 10, 20).unwrap().to_predicate(PG);
        assert_eq!(p.sql, r#"("created_at", "id") > (?, ?)"#);
        assert_eq!(p.values.len(), 2);
    }
}
