//! The immutable query builder.

use std::sync::Arc;

use crate::condition::Condition;
use crate::dialect::{self, Dialect, Feature};
use crate::error::QueryResult;
use crate::ident::quote_or_raw;
use crate::qb::clause::{
    CombinedClause, Connective, CteClause, Direction, ExistsClause, Filter, FromSubquery,
    InSubqueryClause, JoinClause, JoinKind, LockMode, Materialization, Nulls, OrderClause,
    Predicate, RowLock, SetOpClause, SetOpKind, Wait, WindowClause,
};
use crate::qb::render::marker_safe;
use crate::value::Value;

/// One SQL statement under construction.
///
/// Every method takes `&self` and returns a new builder; the receiver is never
/// modified, so a base query can be branched freely (including across
/// threads). Clause lists are shared between a builder and the builders derived
/// from it and only copied when one of them appends to that list.
///
/// ```ignore
/// use relq::{Direction, table};
///
/// let adults = table("items").filter("age > ?", [18]);
/// let page = adults.order("name", Direction::Desc).limit(5);
///
/// let stmt = page.render_select();
/// assert_eq!(stmt.sql, r#"SELECT * FROM "items" WHERE age > $1 ORDER BY "name" DESC LIMIT 5"#);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    pub(crate) dialect: Dialect,
    pub(crate) table: String,
    /// Empty means `*`.
    pub(crate) select: Arc<Vec<String>>,
    /// Rendered `expr AS alias` items from the dialect helpers; kept next to `*`.
    pub(crate) exprs: Arc<Vec<String>>,
    pub(crate) predicates: Arc<Vec<Predicate>>,
    pub(crate) combined: Arc<Vec<CombinedClause>>,
    pub(crate) exists: Arc<Vec<ExistsClause>>,
    pub(crate) in_subqueries: Arc<Vec<InSubqueryClause>>,
    pub(crate) orders: Arc<Vec<OrderClause>>,
    pub(crate) joins: Arc<Vec<JoinClause>>,
    pub(crate) groups: Arc<Vec<String>>,
    pub(crate) havings: Arc<Vec<Predicate>>,
    pub(crate) ctes: Arc<Vec<CteClause>>,
    pub(crate) from_subquery: Option<Arc<FromSubquery>>,
    pub(crate) windows: Arc<Vec<WindowClause>>,
    pub(crate) set_ops: Arc<Vec<SetOpClause>>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) distinct: bool,
    pub(crate) distinct_columns: Arc<Vec<String>>,
    pub(crate) lock: Option<RowLock>,
    pub(crate) cache: bool,
}

fn push<T: Clone>(list: &mut Arc<Vec<T>>, item: T) {
    Arc::make_mut(list).push(item);
}

fn concat<T: Clone>(a: &Arc<Vec<T>>, b: &Arc<Vec<T>>) -> Arc<Vec<T>> {
    if b.is_empty() {
        return Arc::clone(a);
    }
    if a.is_empty() {
        return Arc::clone(b);
    }
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend(a.iter().cloned());
    out.extend(b.iter().cloned());
    Arc::new(out)
}

fn to_values<V: Into<Value>>(args: impl IntoIterator<Item = V>) -> Vec<Value> {
    args.into_iter().map(Into::into).collect()
}

impl QueryBuilder {
    /// Start a query against `table`, using the process-wide active dialect.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            dialect: dialect::active(),
            table: table.into(),
            select: Arc::default(),
            exprs: Arc::default(),
            predicates: Arc::default(),
            combined: Arc::default(),
            exists: Arc::default(),
            in_subqueries: Arc::default(),
            orders: Arc::default(),
            joins: Arc::default(),
            groups: Arc::default(),
            havings: Arc::default(),
            ctes: Arc::default(),
            from_subquery: None,
            windows: Arc::default(),
            set_ops: Arc::default(),
            limit: None,
            offset: None,
            distinct: false,
            distinct_columns: Arc::default(),
            lock: None,
            cache: false,
        }
    }

    /// The single update path: clone (sharing every list) and apply `f`.
    fn with(&self, f: impl FnOnce(&mut Self)) -> Self {
        let mut next = self.clone();
        f(&mut next);
        next
    }

    /// Render against `dialect` instead of the one captured at construction.
    pub fn on(&self, dialect: Dialect) -> Self {
        self.with(|q| q.dialect = dialect)
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn is_cached(&self) -> bool {
        self.cache
    }

    // ==================== SELECT list ====================

    /// Replace the selected columns/expressions.
    pub fn select(&self, cols: &[&str]) -> Self {
        let cols: Vec<String> = cols.iter().map(|c| c.to_string()).collect();
        self.with(|q| q.select = Arc::new(cols))
    }

    /// Append one column or expression to the select list.
    pub fn add_select(&self, col: &str) -> Self {
        self.with(|q| push(&mut q.select, col.to_string()))
    }

    pub(crate) fn add_expr(&self, expr: String) -> Self {
        self.with(|q| push(&mut q.exprs, expr))
    }

    // ==================== WHERE ====================

    /// Add a free-text condition; each `?` binds the next value in `args`.
    pub fn filter<V: Into<Value>>(&self, sql: &str, args: impl IntoIterator<Item = V>) -> Self {
        let pred = Predicate::new(sql, to_values(args));
        self.with(|q| push(&mut q.predicates, pred))
    }

    /// Add a negated free-text condition: `NOT (sql)`.
    pub fn filter_not<V: Into<Value>>(&self, sql: &str, args: impl IntoIterator<Item = V>) -> Self {
        let pred = Predicate::new(sql, to_values(args)).negate();
        self.with(|q| push(&mut q.predicates, pred))
    }

    /// Add a typed condition.
    pub fn filter_by(&self, condition: Condition) -> Self {
        let pred = condition.to_predicate(self.dialect);
        self.with(|q| push(&mut q.predicates, pred))
    }

    /// `column IN (...)`. An empty list leaves the query unchanged.
    pub fn where_in<V: Into<Value>>(&self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.in_list(column, to_values(values), false)
    }

    /// `column NOT IN (...)`. An empty list leaves the query unchanged.
    pub fn where_not_in<V: Into<Value>>(
        &self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.in_list(column, to_values(values), true)
    }

    fn in_list(&self, column: &str, values: Vec<Value>, negated: bool) -> Self {
        if values.is_empty() {
            return self.clone();
        }
        let markers = vec!["?"; values.len()].join(", ");
        let kw = if negated { "NOT IN" } else { "IN" };
        let column = marker_safe(&quote_or_raw(column, self.dialect));
        let sql = format!("{column} {kw} ({markers})");
        let pred = Predicate::new(sql, values);
        self.with(|q| push(&mut q.predicates, pred))
    }

    /// `column IN (subquery)`
    pub fn where_in_subquery(&self, column: &str, query: &QueryBuilder) -> Self {
        self.in_subquery(column, query, false)
    }

    /// `column NOT IN (subquery)`
    pub fn where_not_in_subquery(&self, column: &str, query: &QueryBuilder) -> Self {
        self.in_subquery(column, query, true)
    }

    fn in_subquery(&self, column: &str, query: &QueryBuilder, negated: bool) -> Self {
        let clause = InSubqueryClause {
            column: column.to_string(),
            query: query.clone(),
            negated,
        };
        self.with(|q| push(&mut q.in_subqueries, clause))
    }

    /// `EXISTS (subquery)`
    pub fn exists(&self, query: &QueryBuilder) -> Self {
        let clause = ExistsClause {
            query: query.clone(),
            negated: false,
        };
        self.with(|q| push(&mut q.exists, clause))
    }

    /// `NOT EXISTS (subquery)`
    pub fn not_exists(&self, query: &QueryBuilder) -> Self {
        let clause = ExistsClause {
            query: query.clone(),
            negated: true,
        };
        self.with(|q| push(&mut q.exists, clause))
    }

    pub(crate) fn push_predicate(&self, pred: Predicate) -> Self {
        self.with(|q| push(&mut q.predicates, pred))
    }

    // ==================== Composition ====================

    /// `(self's conditions) OR (other's conditions)`.
    pub fn or(&self, other: &QueryBuilder) -> Self {
        self.combine(other, Connective::Or)
    }

    /// `(self's conditions) AND (other's conditions)`.
    pub fn and(&self, other: &QueryBuilder) -> Self {
        self.combine(other, Connective::And)
    }

    fn combine(&self, other: &QueryBuilder, connective: Connective) -> Self {
        let left = self.filter_state();
        let right = other.filter_state();
        match (left.is_empty(), right.is_empty()) {
            (false, false) => self.with(|q| {
                q.set_filter(Filter::default());
                push(
                    &mut q.combined,
                    CombinedClause {
                        left,
                        right,
                        connective,
                    },
                );
            }),
            (true, false) => self.with(|q| q.set_filter(right)),
            _ => self.clone(),
        }
    }

    /// Union every clause list of `self` and `other` (receiver first). For
    /// single-valued settings the receiver wins unless it holds the default.
    pub fn merge(&self, other: &QueryBuilder) -> Self {
        self.with(|q| {
            q.select = concat(&q.select, &other.select);
            q.exprs = concat(&q.exprs, &other.exprs);
            q.predicates = concat(&q.predicates, &other.predicates);
            q.combined = concat(&q.combined, &other.combined);
            q.exists = concat(&q.exists, &other.exists);
            q.in_subqueries = concat(&q.in_subqueries, &other.in_subqueries);
            q.orders = concat(&q.orders, &other.orders);
            q.joins = concat(&q.joins, &other.joins);
            q.groups = concat(&q.groups, &other.groups);
            q.havings = concat(&q.havings, &other.havings);
            q.ctes = concat(&q.ctes, &other.ctes);
            q.windows = concat(&q.windows, &other.windows);
            q.set_ops = concat(&q.set_ops, &other.set_ops);
            q.distinct_columns = concat(&q.distinct_columns, &other.distinct_columns);
            q.limit = q.limit.or(other.limit);
            q.offset = q.offset.or(other.offset);
            q.distinct = q.distinct || other.distinct;
            q.lock = q.lock.take().or_else(|| other.lock.clone());
            q.from_subquery = q.from_subquery.take().or_else(|| other.from_subquery.clone());
            q.cache = q.cache || other.cache;
        })
    }

    pub(crate) fn filter_state(&self) -> Filter {
        Filter {
            combined: self.combined.to_vec(),
            predicates: self.predicates.to_vec(),
            exists: self.exists.to_vec(),
            in_subqueries: self.in_subqueries.to_vec(),
        }
    }

    fn set_filter(&mut self, filter: Filter) {
        self.combined = Arc::new(filter.combined);
        self.predicates = Arc::new(filter.predicates);
        self.exists = Arc::new(filter.exists);
        self.in_subqueries = Arc::new(filter.in_subqueries);
    }

    pub fn has_filter(&self) -> bool {
        !(self.combined.is_empty()
            && self.predicates.is_empty()
            && self.exists.is_empty()
            && self.in_subqueries.is_empty())
    }

    // ==================== ORDER / LIMIT ====================

    /// `ORDER BY column ASC|DESC`
    pub fn order(&self, column: &str, direction: Direction) -> Self {
        let clause = OrderClause {
            expr: column.to_string(),
            direction: Some(direction),
            nulls: None,
        };
        self.with(|q| push(&mut q.orders, clause))
    }

    /// Order by an expression taken verbatim (`created_at DESC, id`).
    pub fn order_raw(&self, expr: &str) -> Self {
        let clause = OrderClause {
            expr: expr.to_string(),
            direction: None,
            nulls: None,
        };
        self.with(|q| push(&mut q.orders, clause))
    }

    /// `ORDER BY column dir NULLS FIRST|LAST` (emulated where unsupported).
    pub fn order_nulls(&self, column: &str, direction: Direction, nulls: Nulls) -> Self {
        let clause = OrderClause {
            expr: column.to_string(),
            direction: Some(direction),
            nulls: Some(nulls),
        };
        self.with(|q| push(&mut q.orders, clause))
    }

    pub fn limit(&self, n: u64) -> Self {
        self.with(|q| q.limit = Some(n))
    }

    pub fn offset(&self, n: u64) -> Self {
        self.with(|q| q.offset = Some(n))
    }

    /// `page` is 1-based; both arguments are clamped to at least 1.
    pub fn paginate(&self, page: u64, per_page: u64) -> Self {
        let page = page.max(1);
        let size = per_page.max(1);
        self.with(|q| {
            q.limit = Some(size);
            q.offset = Some((page - 1).saturating_mul(size));
        })
    }

    // ==================== JOIN ====================

    pub fn join(&self, table: &str, on: &str) -> Self {
        self.join_kind(JoinKind::Inner, table, on)
    }

    pub fn left_join(&self, table: &str, on: &str) -> Self {
        self.join_kind(JoinKind::Left, table, on)
    }

    pub fn right_join(&self, table: &str, on: &str) -> Self {
        self.join_kind(JoinKind::Right, table, on)
    }

    pub fn full_join(&self, table: &str, on: &str) -> Self {
        self.join_kind(JoinKind::Full, table, on)
    }

    pub fn cross_join(&self, table: &str) -> Self {
        let clause = JoinClause {
            kind: JoinKind::Cross,
            table: table.to_string(),
            on: None,
        };
        self.with(|q| push(&mut q.joins, clause))
    }

    pub fn join_kind(&self, kind: JoinKind, table: &str, on: &str) -> Self {
        let clause = JoinClause {
            kind,
            table: table.to_string(),
            on: Some(on.to_string()),
        };
        self.with(|q| push(&mut q.joins, clause))
    }

    // ==================== GROUP / HAVING / DISTINCT ====================

    pub fn group(&self, cols: &[&str]) -> Self {
        self.with(|q| {
            let groups = Arc::make_mut(&mut q.groups);
            groups.extend(cols.iter().map(|c| c.to_string()));
        })
    }

    /// HAVING condition; only rendered when the query has group columns.
    pub fn having<V: Into<Value>>(&self, sql: &str, args: impl IntoIterator<Item = V>) -> Self {
        let pred = Predicate::new(sql, to_values(args));
        self.with(|q| push(&mut q.havings, pred))
    }

    /// `SELECT DISTINCT`, or, with columns, an equivalent `GROUP BY` on them.
    pub fn distinct(&self, cols: &[&str]) -> Self {
        self.with(|q| {
            q.distinct = true;
            let list = Arc::make_mut(&mut q.distinct_columns);
            list.extend(cols.iter().map(|c| c.to_string()));
        })
    }

    /// Explicit group columns followed by distinct columns, without repeats.
    pub(crate) fn group_columns(&self) -> Vec<String> {
        let mut out: Vec<String> = self.groups.to_vec();
        for col in self.distinct_columns.iter() {
            if !out.contains(col) {
                out.push(col.clone());
            }
        }
        out
    }

    // ==================== CTE / subquery sources ====================

    /// `WITH name AS (query)`
    pub fn with_cte(&self, name: &str, query: &QueryBuilder) -> Self {
        let clause = CteClause {
            name: name.to_string(),
            query: query.clone(),
            recursive: false,
            materialization: None,
        };
        self.with(|q| push(&mut q.ctes, clause))
    }

    /// `WITH name AS [NOT] MATERIALIZED (query)`
    pub fn with_cte_materialized(
        &self,
        name: &str,
        query: &QueryBuilder,
        hint: Materialization,
    ) -> QueryResult<Self> {
        self.dialect.require(Feature::CteMaterialization)?;
        let clause = CteClause {
            name: name.to_string(),
            query: query.clone(),
            recursive: false,
            materialization: Some(hint),
        };
        Ok(self.with(|q| push(&mut q.ctes, clause)))
    }

    /// `WITH RECURSIVE name AS (base UNION ALL recursive)`
    pub fn with_recursive_cte(
        &self,
        name: &str,
        base: &QueryBuilder,
        recursive: &QueryBuilder,
    ) -> Self {
        let clause = CteClause {
            name: name.to_string(),
            query: base.union_all(recursive),
            recursive: true,
            materialization: None,
        };
        self.with(|q| push(&mut q.ctes, clause))
    }

    /// Select from `(query) AS alias` instead of the table.
    pub fn from_subquery(&self, query: &QueryBuilder, alias: &str) -> Self {
        let sub = FromSubquery {
            query: query.clone(),
            alias: alias.to_string(),
        };
        self.with(|q| q.from_subquery = Some(Arc::new(sub)))
    }

    // ==================== Window functions ====================

    pub fn window(&self, clause: WindowClause) -> Self {
        self.with(|q| push(&mut q.windows, clause))
    }

    /// `ROW_NUMBER() OVER (ORDER BY order_by) AS alias`
    pub fn row_number(&self, order_by: &str, alias: &str) -> Self {
        self.window(WindowClause::new("ROW_NUMBER()", alias).order_by(order_by))
    }

    /// `RANK() OVER (ORDER BY order_by) AS alias`
    pub fn rank(&self, order_by: &str, alias: &str) -> Self {
        self.window(WindowClause::new("RANK()", alias).order_by(order_by))
    }

    /// `DENSE_RANK() OVER (ORDER BY order_by) AS alias`
    pub fn dense_rank(&self, order_by: &str, alias: &str) -> Self {
        self.window(WindowClause::new("DENSE_RANK()", alias).order_by(order_by))
    }

    /// `NTILE(buckets) OVER (ORDER BY order_by) AS alias`
    pub fn ntile(&self, buckets: u32, order_by: &str, alias: &str) -> Self {
        self.window(WindowClause::new(format!("NTILE({buckets})"), alias).order_by(order_by))
    }

    /// `LAG(column) OVER (ORDER BY order_by) AS alias`
    pub fn lag(&self, column: &str, order_by: &str, alias: &str) -> Self {
        let function = format!("LAG({})", quote_or_raw(column, self.dialect));
        self.window(WindowClause::new(function, alias).order_by(order_by))
    }

    /// `LEAD(column) OVER (ORDER BY order_by) AS alias`
    pub fn lead(&self, column: &str, order_by: &str, alias: &str) -> Self {
        let function = format!("LEAD({})", quote_or_raw(column, self.dialect));
        self.window(WindowClause::new(function, alias).order_by(order_by))
    }

    /// `SUM(column) OVER (PARTITION BY partition_by) AS alias`
    pub fn sum_over(&self, column: &str, partition_by: &str, alias: &str) -> Self {
        let function = format!("SUM({})", quote_or_raw(column, self.dialect));
        self.window(WindowClause::new(function, alias).partition_by(partition_by))
    }

    /// `AVG(column) OVER (PARTITION BY partition_by) AS alias`
    pub fn avg_over(&self, column: &str, partition_by: &str, alias: &str) -> Self {
        let function = format!("AVG({})", quote_or_raw(column, self.dialect));
        self.window(WindowClause::new(function, alias).partition_by(partition_by))
    }

    // ==================== Set operations ====================

    pub fn union(&self, other: &QueryBuilder) -> Self {
        self.set_op(SetOpKind::Union, other)
    }

    pub fn union_all(&self, other: &QueryBuilder) -> Self {
        self.set_op(SetOpKind::UnionAll, other)
    }

    pub fn intersect(&self, other: &QueryBuilder) -> Self {
        self.set_op(SetOpKind::Intersect, other)
    }

    pub fn except(&self, other: &QueryBuilder) -> Self {
        self.set_op(SetOpKind::Except, other)
    }

    fn set_op(&self, kind: SetOpKind, other: &QueryBuilder) -> Self {
        let clause = SetOpClause {
            kind,
            query: other.clone(),
        };
        self.with(|q| push(&mut q.set_ops, clause))
    }

    /// Whether this builder must be parenthesized as a set-operation operand.
    pub(crate) fn needs_parens_as_operand(&self) -> bool {
        !self.orders.is_empty()
            || self.limit.is_some()
            || self.offset.is_some()
            || self.lock.is_some()
            || !self.set_ops.is_empty()
            || !self.ctes.is_empty()
    }

    // ==================== Caching ====================

    pub fn cache(&self) -> Self {
        self.with(|q| q.cache = true)
    }

    pub fn uncache(&self) -> Self {
        self.with(|q| q.cache = false)
    }

    // ==================== Row locks ====================

    /// `FOR UPDATE [NOWAIT | SKIP LOCKED]`
    pub fn for_update(&self, wait: Wait) -> Self {
        self.with(|q| q.lock = Some(RowLock::new(LockMode::Update, wait)))
    }

    /// `FOR SHARE [NOWAIT | SKIP LOCKED]`
    pub fn for_share(&self, wait: Wait) -> Self {
        self.with(|q| q.lock = Some(RowLock::new(LockMode::Share, wait)))
    }

    /// Any row lock, including the PostgreSQL-only `NO KEY UPDATE` / `KEY SHARE`.
    pub fn lock(&self, lock: RowLock) -> QueryResult<Self> {
        match lock.mode {
            LockMode::NoKeyUpdate => self.dialect.require(Feature::NoKeyUpdateLock)?,
            LockMode::KeyShare => self.dialect.require(Feature::KeyShareLock)?,
            LockMode::Update | LockMode::Share => {}
        }
        Ok(self.with(|q| q.lock = Some(lock)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pg(table: &str) -> QueryBuilder {
        QueryBuilder::new(table).on(Dialect::Postgres)
    }

    #[test]
    fn mutators_leave_receiver_untouched() {
        let base = pg("items").filter("a = ?", [1]);
        let before = base.clone();
        let _ = base.filter("b = ?", [2]).order("name", Direction::Asc).limit(3).cache();
        assert_eq!(base, before);
    }

    #[test]
    fn untouched_lists_are_shared() {
        let base = pg("items").filter("a = ?", [1]);
        let next = base.limit(10);
        assert!(Arc::ptr_eq(&base.predicates, &next.predicates));
        let more = base.filter("b = ?", [2]);
        assert!(!Arc::ptr_eq(&base.predicates, &more.predicates));
        assert_eq!(base.predicates.len(), 1);
    }

    #[test]
    fn empty_in_list_is_noop() {
        let base = pg("items").filter("a = ?", [1]);
        assert_eq!(base.where_in("id", Vec::<i64>::new()), base);
        assert_eq!(base.where_not_in("id", Vec::<i64>::new()), base);
    }

    #[test]
    fn in_list_column_question_mark_is_escaped() {
        let q = pg("items").where_in(r#""a?""#, [1, 2]);
        assert_eq!(q.predicates[0].sql, r#""a??" IN (?, ?)"#);
        assert!(q.predicates[0].check().is_ok());
    }

    #[test]
    fn or_relocates_both_sides() {
        let a = pg("items").filter("a = ?", [1]);
        let b = pg("items").filter("b = ?", [2]);
        let q = a.or(&b);
        assert!(q.predicates.is_empty());
        assert_eq!(q.combined.len(), 1);
        assert_eq!(q.combined[0].connective, Connective::Or);
    }

    #[test]
    fn or_adopts_the_only_non_empty_side() {
        let empty = pg("items");
        let b = pg("items").filter("b = ?", [2]);
        assert_eq!(empty.or(&b).predicates, b.predicates);
        assert_eq!(b.or(&empty), b);
        assert_eq!(empty.and(&empty), empty);
    }

    #[test]
    fn merge_prefers_receiver_singletons() {
        let a = pg("items").limit(5).filter("a = ?", [1]);
        let b = pg("items").limit(9).offset(3).filter("b = ?", [2]).cache();
        let m = a.merge(&b);
        assert_eq!(m.limit, Some(5));
        assert_eq!(m.offset, Some(3));
        assert!(m.cache);
        assert_eq!(m.predicates.len(), 2);
        assert_eq!(m.predicates[0].sql, "a = ?");
    }

    #[test]
    fn postgres_only_locks_fail_on_mysql() {
        let q = QueryBuilder::new("jobs").on(Dialect::MySql);
        let err = q.lock(RowLock::new(LockMode::NoKeyUpdate, Wait::Block)).unwrap_err();
        assert!(err.is_unsupported());
        assert!(q.lock(RowLock::new(LockMode::Share, Wait::NoWait)).is_ok());
    }

    #[test]
    fn paginate_clamps() {
        let q = pg("items").paginate(0, 0);
        assert_eq!((q.limit, q.offset), (Some(1), Some(0)));
        let q = pg("items").paginate(3, 20);
        assert_eq!((q.limit, q.offset), (Some(20), Some(40)));
        let q = pg("items").paginate(u64::MAX, 50);
        assert_eq!(q.offset, Some(u64::MAX));
    }

    #[test]
    fn group_columns_dedupes_distinct() {
        let q = pg("items").group(&["a"]).distinct(&["a", "b"]);
        assert_eq!(q.group_columns(), vec!["a".to_string(), "b".to_string()]);
    }
}
