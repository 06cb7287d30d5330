//! Terminal rendering: SELECT, INSERT, UPDATE, DELETE and aggregate scalars.
//!
//! SELECT walks the builder in a fixed order so that placeholder numbers
//! follow the text left to right:
//!
//! 1. CTEs, in declaration order
//! 2. the FROM subquery
//! 3. combined AND/OR clauses
//! 4. plain predicates
//! 5. EXISTS clauses
//! 6. IN (subquery) clauses
//! 7. GROUP BY / HAVING
//! 8. set-operation operands
//! 9. ORDER BY, LIMIT, OFFSET and the row lock (no placeholders)
//!
//! The other statement kinds only use the parts that make sense for them and
//! silently ignore the rest (joins on a DELETE, ORDER BY on a COUNT, ...).

use serde::Serialize;
use std::fmt;

use crate::dialect::{Dialect, Feature};
use crate::error::{QueryError, QueryResult};
use crate::ident::{quote_or_raw, quote_table};
use crate::qb::builder::QueryBuilder;
use crate::qb::render::{Fragment, Writer};
use crate::value::Value;

/// MySQL cannot express OFFSET without LIMIT; this is its documented "no limit".
const MYSQL_NO_LIMIT: u64 = u64::MAX;

/// Final SQL text plus its positional arguments, ready for the driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Statement {
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }

    /// Cache key: the SQL text followed by every argument as `kind:value`.
    pub fn fingerprint(&self) -> String {
        let args: Vec<String> = self.args.iter().map(|v| format!("{}:{v}", v.kind())).collect();
        format!("{} -- [{}]", self.sql, args.join(", "))
    }

    /// Arguments as tokio-postgres parameters.
    #[cfg(feature = "postgres")]
    pub fn params_ref(&self) -> Vec<&(dyn tokio_postgres::types::ToSql + Sync)> {
        self.args
            .iter()
            .map(|v| v as &(dyn tokio_postgres::types::ToSql + Sync))
            .collect()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

impl From<Fragment> for Statement {
    fn from(f: Fragment) -> Self {
        Self {
            sql: f.sql,
            args: f.args,
        }
    }
}

fn log_rendered(kind: &'static str, table: &str, stmt: &Statement) {
    tracing::debug!(kind, table, params = stmt.args.len(), sql = %stmt.sql, "rendered statement");
}

impl QueryBuilder {
    // ==================== SELECT ====================

    /// Render the full SELECT statement.
    pub fn render_select(&self) -> Statement {
        let stmt: Statement = self.render_select_at(self.dialect, 0).into();
        log_rendered("select", &self.table, &stmt);
        stmt
    }

    /// SELECT text only.
    pub fn to_sql(&self) -> String {
        self.render_select_at(self.dialect, 0).sql
    }

    /// [`validate`](Self::validate), then [`render_select`](Self::render_select).
    pub fn try_render_select(&self) -> QueryResult<Statement> {
        self.validate()?;
        Ok(self.render_select())
    }

    /// Check every predicate (recursively through nested builders) for a
    /// mismatch between `?` markers and bound values.
    pub fn validate(&self) -> QueryResult<()> {
        for cte in self.ctes.iter() {
            cte.query.validate()?;
        }
        if let Some(sub) = &self.from_subquery {
            sub.query.validate()?;
        }
        self.filter_state().check()?;
        for pred in self.havings.iter() {
            pred.check()?;
        }
        for op in self.set_ops.iter() {
            op.query.validate()?;
        }
        Ok(())
    }

    /// Render as a nested query whose placeholders start after `offset`.
    pub(crate) fn render_select_at(&self, dialect: Dialect, offset: usize) -> Fragment {
        let mut w = Writer::new(dialect, offset);

        if !self.ctes.is_empty() {
            let recursive = self.ctes.iter().any(|c| c.recursive);
            w.push(if recursive { "WITH RECURSIVE " } else { "WITH " });
            for (i, cte) in self.ctes.iter().enumerate() {
                if i > 0 {
                    w.push(", ");
                }
                let f = cte.render(dialect, w.offset);
                w.push_fragment(f);
            }
            w.push(" ");
        }

        w.push("SELECT ");
        if self.distinct && self.distinct_columns.is_empty() {
            w.push("DISTINCT ");
        }
        let select_list = self.select_list(dialect);
        w.push(&select_list);

        w.push(" FROM ");
        match &self.from_subquery {
            Some(sub) => {
                let f = sub.render(dialect, w.offset);
                w.push_fragment(f);
            }
            None => {
                w.push(&quote_table(&self.table, dialect));
            }
        }

        for join in self.joins.iter() {
            w.push(" ");
            w.push(&join.render(dialect));
        }

        self.push_where(&mut w);

        let groups = self.group_columns();
        if !groups.is_empty() {
            let cols: Vec<String> = groups.iter().map(|c| quote_or_raw(c, dialect)).collect();
            w.push(" GROUP BY ");
            w.push(&cols.join(", "));

            if !self.havings.is_empty() {
                w.push(" HAVING ");
                for (i, pred) in self.havings.iter().enumerate() {
                    if i > 0 {
                        w.push(" AND ");
                    }
                    let f = pred.render(dialect, w.offset);
                    w.push_fragment(f);
                }
            }
        }

        for op in self.set_ops.iter() {
            let f = op.render(dialect, w.offset);
            w.push_fragment(f);
        }

        if !self.orders.is_empty() {
            let orders: Vec<String> = self.orders.iter().map(|o| o.render(dialect)).collect();
            w.push(" ORDER BY ");
            w.push(&orders.join(", "));
        }

        let limit = match (self.limit, self.offset, dialect) {
            (None, Some(_), Dialect::MySql) => Some(MYSQL_NO_LIMIT),
            (limit, _, _) => limit,
        };
        if let Some(limit) = limit {
            w.push(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            w.push(&format!(" OFFSET {offset}"));
        }

        if let Some(lock) = &self.lock {
            w.push(" ");
            w.push(&lock.render(dialect));
        }

        w.finish()
    }

    fn select_list(&self, dialect: Dialect) -> String {
        let mut items: Vec<String> = if !self.select.is_empty() {
            self.select.iter().map(|c| quote_or_raw(c, dialect)).collect()
        } else if !self.distinct_columns.is_empty() {
            self.distinct_columns
                .iter()
                .map(|c| quote_or_raw(c, dialect))
                .collect()
        } else {
            vec!["*".to_string()]
        };
        items.extend(self.exprs.iter().cloned());
        items.extend(self.windows.iter().map(|w| w.render(dialect)));
        items.join(", ")
    }

    /// ` WHERE ...` for every WHERE-position clause, numbered from `w.offset`.
    fn push_where(&self, w: &mut Writer) {
        if !self.has_filter() {
            return;
        }
        let f = self.filter_state().render(w.dialect, w.offset);
        w.push(" WHERE ");
        w.push_fragment(f);
    }

    // ==================== INSERT ====================

    /// `INSERT INTO table (cols...) VALUES ($1..$n)` in the given column order.
    pub fn render_insert<I, C, V>(&self, values: I) -> Statement
    where
        I: IntoIterator<Item = (C, V)>,
        C: AsRef<str>,
        V: Into<Value>,
    {
        let stmt = self.insert_statement(values, &[]);
        log_rendered("insert", &self.table, &stmt);
        stmt
    }

    /// INSERT followed by `RETURNING cols` (PostgreSQL only).
    pub fn render_insert_returning<I, C, V>(
        &self,
        values: I,
        returning: &[&str],
    ) -> QueryResult<Statement>
    where
        I: IntoIterator<Item = (C, V)>,
        C: AsRef<str>,
        V: Into<Value>,
    {
        self.dialect.require(Feature::Returning)?;
        let stmt = self.insert_statement(values, returning);
        log_rendered("insert", &self.table, &stmt);
        Ok(stmt)
    }

    fn insert_statement<I, C, V>(&self, values: I, returning: &[&str]) -> Statement
    where
        I: IntoIterator<Item = (C, V)>,
        C: AsRef<str>,
        V: Into<Value>,
    {
        let dialect = self.dialect;
        let mut cols = Vec::new();
        let mut marks = Vec::new();
        let mut args = Vec::new();
        for (i, (col, val)) in values.into_iter().enumerate() {
            cols.push(quote_or_raw(col.as_ref(), dialect));
            marks.push(dialect.placeholder(i + 1));
            args.push(val.into());
        }

        let table = quote_table(&self.table, dialect);
        let mut sql = if cols.is_empty() {
            match dialect {
                Dialect::Postgres => format!("INSERT INTO {table} DEFAULT VALUES"),
                Dialect::MySql => format!("INSERT INTO {table} () VALUES ()"),
            }
        } else {
            format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                cols.join(", "),
                marks.join(", ")
            )
        };

        if !returning.is_empty() {
            let cols: Vec<String> = returning.iter().map(|c| quote_or_raw(c, dialect)).collect();
            sql.push_str(" RETURNING ");
            sql.push_str(&cols.join(", "));
        }

        Statement { sql, args }
    }

    // ==================== UPDATE ====================

    /// `UPDATE table SET col = $1, ... WHERE ...`; WHERE placeholders continue
    /// after the SET values. An empty SET list is rejected.
    pub fn render_update<I, C, V>(&self, values: I) -> QueryResult<Statement>
    where
        I: IntoIterator<Item = (C, V)>,
        C: AsRef<str>,
        V: Into<Value>,
    {
        let dialect = self.dialect;
        let mut sets = Vec::new();
        let mut args = Vec::new();
        for (i, (col, val)) in values.into_iter().enumerate() {
            sets.push(format!(
                "{} = {}",
                quote_or_raw(col.as_ref(), dialect),
                dialect.placeholder(i + 1)
            ));
            args.push(val.into());
        }
        if sets.is_empty() {
            return Err(QueryError::validation(format!(
                "UPDATE on {} requires at least one SET column",
                self.table
            )));
        }

        let mut w = Writer::new(dialect, args.len());
        w.args = args;
        w.push(&format!(
            "UPDATE {} SET {}",
            quote_table(&self.table, dialect),
            sets.join(", ")
        ));
        self.push_where(&mut w);

        let stmt: Statement = w.finish().into();
        log_rendered("update", &self.table, &stmt);
        Ok(stmt)
    }

    // ==================== DELETE ====================

    /// `DELETE FROM table [WHERE ...]`
    pub fn render_delete(&self) -> Statement {
        let mut w = Writer::new(self.dialect, 0);
        w.push(&format!("DELETE FROM {}", quote_table(&self.table, self.dialect)));
        self.push_where(&mut w);
        let stmt: Statement = w.finish().into();
        log_rendered("delete", &self.table, &stmt);
        stmt
    }

    // ==================== Aggregates ====================

    /// `SELECT COUNT(*) FROM table [WHERE ...]`
    pub fn render_count(&self) -> Statement {
        self.render_aggregate("COUNT(*)".to_string())
    }

    pub fn render_sum(&self, column: &str) -> Statement {
        self.render_aggregate(format!("SUM({})", quote_or_raw(column, self.dialect)))
    }

    pub fn render_avg(&self, column: &str) -> Statement {
        self.render_aggregate(format!("AVG({})", quote_or_raw(column, self.dialect)))
    }

    pub fn render_min(&self, column: &str) -> Statement {
        self.render_aggregate(format!("MIN({})", quote_or_raw(column, self.dialect)))
    }

    pub fn render_max(&self, column: &str) -> Statement {
        self.render_aggregate(format!("MAX({})", quote_or_raw(column, self.dialect)))
    }

    fn render_aggregate(&self, expr: String) -> Statement {
        let mut w = Writer::new(self.dialect, 0);
        w.push(&format!(
            "SELECT {expr} FROM {}",
            quote_table(&self.table, self.dialect)
        ));
        self.push_where(&mut w);
        let stmt: Statement = w.finish().into();
        log_rendered("aggregate", &self.table, &stmt);
        stmt
    }
}
