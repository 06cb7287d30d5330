//! Clause value types.
//!
//! Each clause is an immutable value that knows how to render itself. Clauses
//! that can carry placeholders take the running offset and return a
//! [`Fragment`]; the rest render to plain text.

use crate::dialect::Dialect;
use crate::error::{QueryError, QueryResult};
use crate::ident::{quote_or_raw, quote_table};
use crate::qb::builder::QueryBuilder;
use crate::qb::render::{Fragment, Writer, count_markers, number_markers};
use crate::value::Value;

// ==================== Predicates ====================

/// A free-text condition with `?` markers and the values they bind.
///
/// The text is not parsed or validated; the number of markers is expected to
/// equal the number of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub sql: String,
    pub values: Vec<Value>,
}

impl Predicate {
    pub fn new(sql: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            values,
        }
    }

    pub fn negate(self) -> Self {
        Self {
            sql: format!("NOT ({})", self.sql),
            values: self.values,
        }
    }

    pub fn render(&self, dialect: Dialect, offset: usize) -> Fragment {
        number_markers(&self.sql, &self.values, dialect, offset)
    }

    /// Strict-mode check: markers must match values one to one.
    pub fn check(&self) -> QueryResult<()> {
        let markers = count_markers(&self.sql);
        if markers == self.values.len() {
            Ok(())
        } else {
            Err(QueryError::PlaceholderMismatch {
                clause: self.sql.clone(),
                markers,
                values: self.values.len(),
            })
        }
    }
}

// ==================== WHERE state ====================

/// Every WHERE-position clause of a builder, in rendering order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub combined: Vec<CombinedClause>,
    pub predicates: Vec<Predicate>,
    pub exists: Vec<ExistsClause>,
    pub in_subqueries: Vec<InSubqueryClause>,
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.combined.is_empty()
            && self.predicates.is_empty()
            && self.exists.is_empty()
            && self.in_subqueries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.combined.len() + self.predicates.len() + self.exists.len() + self.in_subqueries.len()
    }

    /// Render all terms joined with `AND` (no `WHERE` keyword).
    pub fn render(&self, dialect: Dialect, offset: usize) -> Fragment {
        let mut w = Writer::new(dialect, offset);
        let mut first = true;
        let mut sep = |w: &mut Writer| {
            if !first {
                w.push(" AND ");
            }
            first = false;
        };

        for clause in &self.combined {
            sep(&mut w);
            let f = clause.render(dialect, w.offset);
            w.push_fragment(f);
        }
        for pred in &self.predicates {
            sep(&mut w);
            let f = pred.render(dialect, w.offset);
            w.push_fragment(f);
        }
        for clause in &self.exists {
            sep(&mut w);
            let f = clause.render(dialect, w.offset);
            w.push_fragment(f);
        }
        for clause in &self.in_subqueries {
            sep(&mut w);
            let f = clause.render(dialect, w.offset);
            w.push_fragment(f);
        }
        w.finish()
    }

    pub(crate) fn check(&self) -> QueryResult<()> {
        for clause in &self.combined {
            clause.left.check()?;
            clause.right.check()?;
        }
        for pred in &self.predicates {
            pred.check()?;
        }
        for clause in &self.exists {
            clause.query.validate()?;
        }
        for clause in &self.in_subqueries {
            clause.query.validate()?;
        }
        Ok(())
    }
}

/// Boolean connective for [`CombinedClause`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    fn keyword(&self) -> &'static str {
        match self {
            Connective::And => " AND ",
            Connective::Or => " OR ",
        }
    }
}

/// Two builders' WHERE states joined by AND/OR.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedClause {
    pub left: Filter,
    pub right: Filter,
    pub connective: Connective,
}

impl CombinedClause {
    pub fn render(&self, dialect: Dialect, offset: usize) -> Fragment {
        let mut w = Writer::new(dialect, offset);
        w.push("(");
        let left = render_side(&self.left, dialect, w.offset);
        w.push_fragment(left);
        w.push(self.connective.keyword());
        let right = render_side(&self.right, dialect, w.offset);
        w.push_fragment(right);
        w.push(")");
        w.finish()
    }
}

fn render_side(filter: &Filter, dialect: Dialect, offset: usize) -> Fragment {
    let mut f = filter.render(dialect, offset);
    if filter.len() > 1 {
        f.sql = format!("({})", f.sql);
    }
    f
}

/// `[NOT] EXISTS (subquery)`
#[derive(Debug, Clone, PartialEq)]
pub struct ExistsClause {
    pub query: QueryBuilder,
    pub negated: bool,
}

impl ExistsClause {
    pub fn render(&self, dialect: Dialect, offset: usize) -> Fragment {
        let inner = self.query.render_select_at(dialect, offset);
        let kw = if self.negated { "NOT EXISTS" } else { "EXISTS" };
        Fragment {
            sql: format!("{kw} ({})", inner.sql),
            args: inner.args,
            next: inner.next,
        }
    }
}

/// `column [NOT] IN (subquery)`
#[derive(Debug, Clone, PartialEq)]
pub struct InSubqueryClause {
    pub column: String,
    pub query: QueryBuilder,
    pub negated: bool,
}

impl InSubqueryClause {
    pub fn render(&self, dialect: Dialect, offset: usize) -> Fragment {
        let inner = self.query.render_select_at(dialect, offset);
        let kw = if self.negated { "NOT IN" } else { "IN" };
        Fragment {
            sql: format!("{} {kw} ({})", quote_or_raw(&self.column, dialect), inner.sql),
            args: inner.args,
            next: inner.next,
        }
    }
}

// ==================== ORDER BY ====================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn keyword(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Placement of NULLs in an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nulls {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderClause {
    pub expr: String,
    pub direction: Option<Direction>,
    pub nulls: Option<Nulls>,
}

impl OrderClause {
    pub fn render(&self, dialect: Dialect) -> String {
        let expr = quote_or_raw(&self.expr, dialect);
        let mut out = String::new();

        // MySQL has no NULLS FIRST/LAST; sort on an IS NULL key first.
        if let (Some(nulls), Dialect::MySql) = (self.nulls, dialect) {
            let key = match nulls {
                Nulls::First => "DESC",
                Nulls::Last => "ASC",
            };
            out.push_str(&format!("{expr} IS NULL {key}, "));
        }

        out.push_str(&expr);
        if let Some(dir) = self.direction {
            out.push(' ');
            out.push_str(dir.keyword());
        }
        if let (Some(nulls), Dialect::Postgres) = (self.nulls, dialect) {
            out.push_str(match nulls {
                Nulls::First => " NULLS FIRST",
                Nulls::Last => " NULLS LAST",
            });
        }
        out
    }
}

// ==================== JOIN ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
    /// Anything else; rendered as the uppercased word followed by `JOIN`.
    Other(String),
}

impl JoinKind {
    /// Lenient parse: unknown kinds are kept and uppercased rather than rejected.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();
        let lower = lower.strip_suffix(" join").unwrap_or(&lower);
        match lower {
            "" | "inner" | "join" => JoinKind::Inner,
            "left" | "left outer" => JoinKind::Left,
            "right" | "right outer" => JoinKind::Right,
            "full" | "full outer" => JoinKind::Full,
            "cross" => JoinKind::Cross,
            other => JoinKind::Other(other.to_ascii_uppercase()),
        }
    }

    pub fn keyword(&self) -> String {
        match self {
            JoinKind::Inner => "INNER JOIN".to_string(),
            JoinKind::Left => "LEFT JOIN".to_string(),
            JoinKind::Right => "RIGHT JOIN".to_string(),
            JoinKind::Full => "FULL OUTER JOIN".to_string(),
            JoinKind::Cross => "CROSS JOIN".to_string(),
            JoinKind::Other(word) => format!("{word} JOIN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub table: String,
    pub on: Option<String>,
}

impl JoinClause {
    pub fn render(&self, dialect: Dialect) -> String {
        let table = quote_table(&self.table, dialect);
        match &self.on {
            Some(on) if self.kind != JoinKind::Cross => {
                format!("{} {table} ON {on}", self.kind.keyword())
            }
            _ => format!("{} {table}", self.kind.keyword()),
        }
    }
}

// ==================== CTE / FROM subquery ====================

/// Planner hint for a CTE (PostgreSQL 12+).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialization {
    Materialized,
    NotMaterialized,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CteClause {
    pub name: String,
    pub query: QueryBuilder,
    pub recursive: bool,
    pub materialization: Option<Materialization>,
}

impl CteClause {
    /// `"name" AS [NOT MATERIALIZED ](...)`
    pub fn render(&self, dialect: Dialect, offset: usize) -> Fragment {
        let inner = self.query.render_select_at(dialect, offset);
        let hint = match self.materialization {
            Some(Materialization::Materialized) => "MATERIALIZED ",
            Some(Materialization::NotMaterialized) => "NOT MATERIALIZED ",
            None => "",
        };
        Fragment {
            sql: format!("{} AS {hint}({})", dialect.quote(&self.name), inner.sql),
            args: inner.args,
            next: inner.next,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromSubquery {
    pub query: QueryBuilder,
    pub alias: String,
}

impl FromSubquery {
    pub fn render(&self, dialect: Dialect, offset: usize) -> Fragment {
        let inner = self.query.render_select_at(dialect, offset);
        Fragment {
            sql: format!("({}) AS {}", inner.sql, dialect.quote(&self.alias)),
            args: inner.args,
            next: inner.next,
        }
    }
}

// ==================== Window ====================

/// `function OVER (PARTITION BY ... ORDER BY ...) AS alias`
#[derive(Debug, Clone, PartialEq)]
pub struct WindowClause {
    pub function: String,
    pub partition: Option<String>,
    pub order: Option<String>,
    pub alias: String,
}

impl WindowClause {
    pub fn new(function: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            partition: None,
            order: None,
            alias: alias.into(),
        }
    }

    pub fn partition_by(mut self, expr: impl Into<String>) -> Self {
        self.partition = Some(expr.into());
        self
    }

    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order = Some(expr.into());
        self
    }

    pub fn render(&self, dialect: Dialect) -> String {
        let mut over = Vec::new();
        if let Some(p) = &self.partition {
            over.push(format!("PARTITION BY {}", quote_or_raw(p, dialect)));
        }
        if let Some(o) = &self.order {
            over.push(format!("ORDER BY {}", quote_or_raw(o, dialect)));
        }
        format!(
            "{} OVER ({}) AS {}",
            self.function,
            over.join(" "),
            dialect.quote(&self.alias)
        )
    }
}

// ==================== Set operations ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOpKind {
    Union,
    UnionAll,
    Intersect,
    Except,
}

impl SetOpKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            SetOpKind::Union => "UNION",
            SetOpKind::UnionAll => "UNION ALL",
            SetOpKind::Intersect => "INTERSECT",
            SetOpKind::Except => "EXCEPT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetOpClause {
    pub kind: SetOpKind,
    pub query: QueryBuilder,
}

impl SetOpClause {
    /// ` UNION <operand>`; the operand is parenthesized when it carries its own
    /// ORDER BY / LIMIT / lock / set operations.
    pub fn render(&self, dialect: Dialect, offset: usize) -> Fragment {
        let inner = self.query.render_select_at(dialect, offset);
        let operand = if self.query.needs_parens_as_operand() {
            format!("({})", inner.sql)
        } else {
            inner.sql
        };
        Fragment {
            sql: format!(" {} {operand}", self.kind.keyword()),
            args: inner.args,
            next: inner.next,
        }
    }
}

// ==================== Row locks ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockMode {
    #[default]
    Update,
    Share,
    /// PostgreSQL only.
    NoKeyUpdate,
    /// PostgreSQL only.
    KeyShare,
}

impl LockMode {
    /// Lenient parse: anything unrecognized is treated as an exclusive lock.
    pub fn parse(s: &str) -> Self {
        let norm = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        let norm = norm.strip_prefix("for ").unwrap_or(&norm);
        match norm {
            "share" => LockMode::Share,
            "no key update" => LockMode::NoKeyUpdate,
            "key share" => LockMode::KeyShare,
            _ => LockMode::Update,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            LockMode::Update => "FOR UPDATE",
            LockMode::Share => "FOR SHARE",
            LockMode::NoKeyUpdate => "FOR NO KEY UPDATE",
            LockMode::KeyShare => "FOR KEY SHARE",
        }
    }
}

/// What to do when a matched row is already locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wait {
    #[default]
    Block,
    NoWait,
    SkipLocked,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowLock {
    pub mode: LockMode,
    pub wait: Wait,
    pub of: Vec<String>,
}

impl RowLock {
    pub fn new(mode: LockMode, wait: Wait) -> Self {
        Self {
            mode,
            wait,
            of: Vec::new(),
        }
    }

    pub fn of(mut self, tables: &[&str]) -> Self {
        self.of = tables.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn render(&self, dialect: Dialect) -> String {
        let mut out = self.mode.keyword().to_string();
        if !self.of.is_empty() {
            let tables: Vec<String> = self.of.iter().map(|t| quote_or_raw(t, dialect)).collect();
            out.push_str(" OF ");
            out.push_str(&tables.join(", "));
        }
        match self.wait {
            Wait::Block => {}
            Wait::NoWait => out.push_str(" NOWAIT"),
            Wait::SkipLocked => out.push_str(" SKIP LOCKED"),
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PG: Dialect = Dialect::Postgres;

    #[test]
    fn join_kind_fallback_uppercases() {
        assert_eq!(JoinKind::parse("left outer"), JoinKind::Left);
        assert_eq!(JoinKind::parse("natural"), JoinKind::Other("NATURAL".into()));
        assert_eq!(JoinKind::parse("natural").keyword(), "NATURAL JOIN");
    }

    #[test]
    fn cross_join_has_no_on() {
        let j = JoinClause {
            kind: JoinKind::Cross,
            table: "sizes".into(),
            on: None,
        };
        assert_eq!(j.render(PG), "CROSS JOIN \"sizes\"");
    }

    #[test]
    fn lock_mode_fallback_is_exclusive() {
        assert_eq!(LockMode::parse("share"), LockMode::Share);
        assert_eq!(LockMode::parse("for_no_key_update"), LockMode::NoKeyUpdate);
        assert_eq!(LockMode::parse("whatever"), LockMode::Update);
    }

    #[test]
    fn row_lock_render() {
        let lock = RowLock::new(LockMode::Update, Wait::SkipLocked).of(&["jobs"]);
        assert_eq!(lock.render(PG), "FOR UPDATE OF \"jobs\" SKIP LOCKED");
    }

    #[test]
    fn order_nulls_native_and_emulated() {
        let o = OrderClause {
            expr: "score".into(),
            direction: Some(Direction::Desc),
            nulls: Some(Nulls::Last),
        };
        assert_eq!(o.render(PG), "\"score\" DESC NULLS LAST");
        assert_eq!(o.render(Dialect::MySql), "`score` IS NULL ASC, `score` DESC");
    }

    #[test]
    fn window_render() {
        let w = WindowClause::new("ROW_NUMBER()", "rn")
            .partition_by("dept")
            .order_by("salary DESC");
        assert_eq!(
            w.render(PG),
            "ROW_NUMBER() OVER (PARTITION BY \"dept\" ORDER BY salary DESC) AS \"rn\""
        );
    }

    #[test]
    fn predicate_check() {
        assert!(Predicate::new("a = ?", vec![Value::Int(1)]).check().is_ok());
        let err = Predicate::new("a = ? AND b = ?", vec![Value::Int(1)]).check().unwrap_err();
        assert!(err.is_placeholder_mismatch());
    }

    #[test]
    fn combined_wraps_multi_term_sides() {
        let clause = CombinedClause {
            left: Filter {
                predicates: vec![
                    Predicate::new("a = ?", vec![Value::Int(1)]),
                    Predicate::new("b = ?", vec![Value::Int(2)]),
                ],
                ..Filter::default()
            },
            right: Filter {
                predicates: vec![Predicate::new("c = ?", vec![Value::Int(3)])],
                ..Filter::default()
            },
            connective: Connective::Or,
        };
        let f = clause.render(PG, 0);
        assert_eq!(f.sql, "((a = $1 AND b = $2) OR c = $3)");
        assert_eq!(f.next, 3);
    }
}
