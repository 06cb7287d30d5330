//! Dialect-sensitive helpers.
//!
//! Each helper emits the native form for the builder's dialect, an emulation
//! where one exists, or fails with [`QueryError::Unsupported`] at the call
//! site. The text is produced with the dialect the builder holds when the
//! helper is called.

use crate::dialect::{Dialect, Feature};
use crate::error::{QueryError, QueryResult};
use crate::ident::quote_or_raw;
use crate::qb::builder::QueryBuilder;
use crate::qb::clause::Predicate;
use crate::qb::render::marker_safe;
use crate::value::Value;

/// Truncation granularity for [`QueryBuilder::select_date_trunc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl TimeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Year => "year",
            TimeUnit::Quarter => "quarter",
            TimeUnit::Month => "month",
            TimeUnit::Week => "week",
            TimeUnit::Day => "day",
            TimeUnit::Hour => "hour",
            TimeUnit::Minute => "minute",
            TimeUnit::Second => "second",
        }
    }
}

/// Field extracted by [`QueryBuilder::where_date_part`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    /// 0 = Sunday .. 6 = Saturday on both backends.
    DayOfWeek,
    /// Seconds since the Unix epoch.
    Epoch,
}

impl DatePart {
    fn keyword(&self) -> &'static str {
        match self {
            DatePart::Year => "YEAR",
            DatePart::Quarter => "QUARTER",
            DatePart::Month => "MONTH",
            DatePart::Week => "WEEK",
            DatePart::Day => "DAY",
            DatePart::Hour => "HOUR",
            DatePart::Minute => "MINUTE",
            DatePart::Second => "SECOND",
            DatePart::DayOfWeek => "DOW",
            DatePart::Epoch => "EPOCH",
        }
    }
}

/// A SQL string literal. MySQL also treats backslash as an escape.
fn string_literal(s: &str, dialect: Dialect) -> String {
    let mut escaped = s.replace('\'', "''");
    if dialect == Dialect::MySql {
        escaped = escaped.replace('\\', "\\\\");
    }
    format!("'{escaped}'")
}

/// Escape LIKE wildcards with backslash.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn like_escape_clause(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Postgres => r"ESCAPE '\'",
        Dialect::MySql => r"ESCAPE '\\'",
    }
}

fn json_path(col: &str, path: &[&str], dialect: Dialect) -> String {
    match dialect {
        Dialect::Postgres => {
            let inner = format!("{{{}}}", path.join(","));
            format!("{col} #>> {}", string_literal(&inner, dialect))
        }
        Dialect::MySql => {
            let inner = format!("$.{}", path.join("."));
            format!("JSON_UNQUOTE(JSON_EXTRACT({col}, {}))", string_literal(&inner, dialect))
        }
    }
}

fn date_trunc(unit: TimeUnit, col: &str, dialect: Dialect) -> String {
    match dialect {
        Dialect::Postgres => format!("date_trunc('{}', {col})", unit.as_str()),
        Dialect::MySql => match unit {
            TimeUnit::Year => format!("DATE_FORMAT({col}, '%Y-01-01 00:00:00')"),
            TimeUnit::Quarter => {
                format!("MAKEDATE(YEAR({col}), 1) + INTERVAL (QUARTER({col}) - 1) QUARTER")
            }
            TimeUnit::Month => format!("DATE_FORMAT({col}, '%Y-%m-01 00:00:00')"),
            TimeUnit::Week => format!("DATE_SUB(DATE({col}), INTERVAL WEEKDAY({col}) DAY)"),
            TimeUnit::Day => format!("DATE_FORMAT({col}, '%Y-%m-%d 00:00:00')"),
            TimeUnit::Hour => format!("DATE_FORMAT({col}, '%Y-%m-%d %H:00:00')"),
            TimeUnit::Minute => format!("DATE_FORMAT({col}, '%Y-%m-%d %H:%i:00')"),
            TimeUnit::Second => format!("DATE_FORMAT({col}, '%Y-%m-%d %H:%i:%s')"),
        },
    }
}

fn date_part(part: DatePart, col: &str, dialect: Dialect) -> String {
    match (dialect, part) {
        (Dialect::MySql, DatePart::DayOfWeek) => format!("(DAYOFWEEK({col}) - 1)"),
        (Dialect::MySql, DatePart::Epoch) => format!("UNIX_TIMESTAMP({col})"),
        _ => format!("EXTRACT({} FROM {col})", part.keyword()),
    }
}

impl QueryBuilder {
    /// Quoted column for predicate text.
    fn col(&self, column: &str) -> String {
        marker_safe(&self.expr_col(column))
    }

    fn cols(&self, columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| self.col(c)).collect()
    }

    /// Quoted column for select-list and GROUP BY text, which is never numbered.
    fn expr_col(&self, column: &str) -> String {
        quote_or_raw(column, self.dialect)
    }

    fn aliased(&self, expr: &str, alias: &str) -> Self {
        self.add_expr(format!("{expr} AS {}", self.dialect.quote(alias)))
    }

    fn tsvector(cols: &[String]) -> String {
        match cols {
            [one] => format!("to_tsvector({one})"),
            many => format!("to_tsvector(concat_ws(' ', {}))", many.join(", ")),
        }
    }

    fn match_against(&self, columns: &[&str], mode: &str) -> String {
        format!("MATCH ({}) AGAINST (? IN {mode})", self.cols(columns).join(", "))
    }

    // ==================== Full-text search ====================

    /// Natural-language full-text match over one or more columns.
    pub fn full_text_search(&self, columns: &[&str], query: &str) -> Self {
        let sql = match self.dialect {
            Dialect::Postgres => format!("{} @@ plainto_tsquery(?)", Self::tsvector(&self.cols(columns))),
            Dialect::MySql => self.match_against(columns, "NATURAL LANGUAGE MODE"),
        };
        self.push_predicate(Predicate::new(sql, vec![Value::from(query)]))
    }

    /// Exact phrase match. MySQL runs a boolean-mode search for the quoted phrase.
    pub fn full_text_phrase(&self, columns: &[&str], phrase: &str) -> Self {
        let (sql, arg) = match self.dialect {
            Dialect::Postgres => (
                format!("{} @@ phraseto_tsquery(?)", Self::tsvector(&self.cols(columns))),
                phrase.to_string(),
            ),
            Dialect::MySql => (
                self.match_against(columns, "BOOLEAN MODE"),
                format!("\"{}\"", phrase.replace('"', "")),
            ),
        };
        self.push_predicate(Predicate::new(sql, vec![Value::Text(arg)]))
    }

    /// Web-search syntax (`"quoted" -excluded or`). PostgreSQL only.
    pub fn full_text_web(&self, columns: &[&str], query: &str) -> QueryResult<Self> {
        self.dialect.require(Feature::WebSearch)?;
        let sql = format!("{} @@ websearch_to_tsquery(?)", Self::tsvector(&self.cols(columns)));
        Ok(self.push_predicate(Predicate::new(sql, vec![Value::from(query)])))
    }

    /// Relevance score as a selected column. The query text is inlined as a literal.
    pub fn select_text_rank(&self, columns: &[&str], query: &str, alias: &str) -> Self {
        let lit = string_literal(query, self.dialect);
        let cols: Vec<String> = columns.iter().map(|c| self.expr_col(c)).collect();
        let expr = match self.dialect {
            Dialect::Postgres => format!("ts_rank({}, plainto_tsquery({lit}))", Self::tsvector(&cols)),
            Dialect::MySql => {
                format!("MATCH ({}) AGAINST ({lit} IN NATURAL LANGUAGE MODE)", cols.join(", "))
            }
        };
        self.aliased(&expr, alias)
    }

    // ==================== Arrays ====================

    /// `? = ANY(column)`
    pub fn array_contains(&self, column: &str, value: impl Into<Value>) -> QueryResult<Self> {
        self.dialect.require(Feature::ArrayContains)?;
        let sql = format!("? = ANY({})", self.col(column));
        Ok(self.push_predicate(Predicate::new(sql, vec![value.into()])))
    }

    /// `column @> ARRAY[...]`. An empty list leaves the query unchanged.
    pub fn array_contains_all<V: Into<Value>>(
        &self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> QueryResult<Self> {
        self.dialect.require(Feature::ArrayContainsAll)?;
        Ok(self.array_op(column, "@>", values))
    }

    /// `column && ARRAY[...]`. An empty list leaves the query unchanged.
    pub fn array_overlap<V: Into<Value>>(
        &self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> QueryResult<Self> {
        self.dialect.require(Feature::ArrayOverlap)?;
        Ok(self.array_op(column, "&&", values))
    }

    fn array_op<V: Into<Value>>(
        &self,
        column: &str,
        op: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return self.clone();
        }
        let markers = vec!["?"; values.len()].join(", ");
        let sql = format!("{} {op} ARRAY[{markers}]", self.col(column));
        self.push_predicate(Predicate::new(sql, values))
    }

    // ==================== JSON ====================

    /// Text at `path` inside a JSON column equals `value`.
    pub fn json_path_eq(&self, column: &str, path: &[&str], value: impl Into<Value>) -> Self {
        let lhs = marker_safe(&json_path(&self.expr_col(column), path, self.dialect));
        self.push_predicate(Predicate::new(format!("{lhs} = ?"), vec![value.into()]))
    }

    /// JSON column contains the given JSON document.
    pub fn json_contains(&self, column: &str, json: impl Into<Value>) -> Self {
        let col = self.col(column);
        let sql = match self.dialect {
            Dialect::Postgres => format!("{col} @> ?::jsonb"),
            Dialect::MySql => format!("JSON_CONTAINS({col}, ?)"),
        };
        self.push_predicate(Predicate::new(sql, vec![json.into()]))
    }

    /// JSON object has a top-level `key`.
    pub fn json_has_key(&self, column: &str, key: &str) -> Self {
        let col = self.col(column);
        let sql = match self.dialect {
            Dialect::Postgres => format!("jsonb_exists({col}, ?)"),
            Dialect::MySql => format!("JSON_CONTAINS_PATH({col}, 'one', CONCAT('$.', ?))"),
        };
        self.push_predicate(Predicate::new(sql, vec![Value::from(key)]))
    }

    pub fn select_json_path(&self, column: &str, path: &[&str], alias: &str) -> Self {
        let expr = json_path(&self.expr_col(column), path, self.dialect);
        self.aliased(&expr, alias)
    }

    // ==================== Date / time ====================

    pub fn select_date_trunc(&self, unit: TimeUnit, column: &str, alias: &str) -> Self {
        let expr = date_trunc(unit, &self.expr_col(column), self.dialect);
        self.aliased(&expr, alias)
    }

    pub fn group_by_date_trunc(&self, unit: TimeUnit, column: &str) -> Self {
        let expr = date_trunc(unit, &self.expr_col(column), self.dialect);
        self.group(&[expr.as_str()])
    }

    /// `EXTRACT(part FROM column) = ?`
    pub fn where_date_part(&self, part: DatePart, column: &str, value: impl Into<Value>) -> Self {
        let lhs = date_part(part, &self.col(column), self.dialect);
        self.push_predicate(Predicate::new(format!("{lhs} = ?"), vec![value.into()]))
    }

    pub fn select_date_part(&self, part: DatePart, column: &str, alias: &str) -> Self {
        let expr = date_part(part, &self.expr_col(column), self.dialect);
        self.aliased(&expr, alias)
    }

    // ==================== String matching ====================

    /// Case-insensitive LIKE.
    pub fn ilike(&self, column: &str, pattern: &str) -> Self {
        self.ilike_op(column, pattern, false)
    }

    pub fn not_ilike(&self, column: &str, pattern: &str) -> Self {
        self.ilike_op(column, pattern, true)
    }

    fn ilike_op(&self, column: &str, pattern: &str, negated: bool) -> Self {
        let col = self.col(column);
        let not = if negated { "NOT " } else { "" };
        let sql = match self.dialect {
            Dialect::Postgres => format!("{col} {not}ILIKE ?"),
            Dialect::MySql => format!("LOWER({col}) {not}LIKE LOWER(?)"),
        };
        self.push_predicate(Predicate::new(sql, vec![Value::from(pattern)]))
    }

    /// Case-sensitive regular expression match.
    pub fn regex_match(&self, column: &str, pattern: &str) -> Self {
        self.regex_op(column, pattern, false)
    }

    /// Case-insensitive regular expression match.
    pub fn iregex_match(&self, column: &str, pattern: &str) -> Self {
        self.regex_op(column, pattern, true)
    }

    fn regex_op(&self, column: &str, pattern: &str, insensitive: bool) -> Self {
        let col = self.col(column);
        let sql = match (self.dialect, insensitive) {
            (Dialect::Postgres, false) => format!("{col} ~ ?"),
            (Dialect::Postgres, true) => format!("{col} ~* ?"),
            (Dialect::MySql, false) => format!("REGEXP_LIKE({col}, ?, 'c')"),
            (Dialect::MySql, true) => format!("REGEXP_LIKE({col}, ?, 'i')"),
        };
        self.push_predicate(Predicate::new(sql, vec![Value::from(pattern)]))
    }

    pub fn starts_with(&self, column: &str, prefix: &str) -> Self {
        self.like_escaped(column, format!("{}%", escape_like(prefix)))
    }

    pub fn ends_with(&self, column: &str, suffix: &str) -> Self {
        self.like_escaped(column, format!("%{}", escape_like(suffix)))
    }

    pub fn contains_text(&self, column: &str, needle: &str) -> Self {
        self.like_escaped(column, format!("%{}%", escape_like(needle)))
    }

    fn like_escaped(&self, column: &str, pattern: String) -> Self {
        let sql = format!("{} LIKE ? {}", self.col(column), like_escape_clause(self.dialect));
        self.push_predicate(Predicate::new(sql, vec![Value::Text(pattern)]))
    }

    // ==================== Aggregates ====================

    pub fn select_string_agg(&self, column: &str, separator: &str, alias: &str) -> Self {
        let col = self.expr_col(column);
        let sep = string_literal(separator, self.dialect);
        let expr = match self.dialect {
            Dialect::Postgres => format!("string_agg({col}, {sep})"),
            Dialect::MySql => format!("GROUP_CONCAT({col} SEPARATOR {sep})"),
        };
        self.aliased(&expr, alias)
    }

    pub fn select_array_agg(&self, column: &str, alias: &str) -> Self {
        let col = self.expr_col(column);
        let expr = match self.dialect {
            Dialect::Postgres => format!("array_agg({col})"),
            Dialect::MySql => format!("JSON_ARRAYAGG({col})"),
        };
        self.aliased(&expr, alias)
    }

    /// Continuous percentile (`0.0..=1.0`). PostgreSQL only.
    pub fn select_percentile(&self, column: &str, fraction: f64, alias: &str) -> QueryResult<Self> {
        self.dialect.require(Feature::Percentile)?;
        if !(0.0..=1.0).contains(&fraction) {
            return Err(QueryError::validation(format!(
                "percentile must be between 0 and 1, got {fraction}"
            )));
        }
        let expr = format!(
            "percentile_cont({fraction}) WITHIN GROUP (ORDER BY {})",
            self.expr_col(column)
        );
        Ok(self.aliased(&expr, alias))
    }

    /// Count of rows matching a raw, parameterless condition.
    pub fn select_count_filter(&self, condition: &str, alias: &str) -> Self {
        let expr = match self.dialect {
            Dialect::Postgres => format!("COUNT(*) FILTER (WHERE {condition})"),
            Dialect::MySql => format!("SUM(CASE WHEN {condition} THEN 1 ELSE 0 END)"),
        };
        self.aliased(&expr, alias)
    }
}
