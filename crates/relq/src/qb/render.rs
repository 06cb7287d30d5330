//! Placeholder numbering.
//!
//! Rendering threads a single "last used index" through every clause. A clause
//! renders at some `offset`, numbers its markers `offset + 1 ..`, and hands back
//! the offset its successor should start from. Nested builders (CTEs,
//! subqueries, set-operation operands) are rendered the same way, so a whole
//! statement ends up with one flat argument list whose order matches the
//! placeholders exactly.

use crate::dialect::Dialect;
use crate::value::Value;

/// Rendered SQL text plus the values its placeholders bind, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub sql: String,
    pub args: Vec<Value>,
    /// Index of the last placeholder emitted (the next clause starts after it).
    pub next: usize,
}

/// Collects fragments left to right into one SQL string and argument list.
#[derive(Debug)]
pub(crate) struct Writer {
    pub dialect: Dialect,
    pub sql: String,
    pub args: Vec<Value>,
    pub offset: usize,
}

impl Writer {
    pub fn new(dialect: Dialect, offset: usize) -> Self {
        Self {
            dialect,
            sql: String::new(),
            args: Vec::new(),
            offset,
        }
    }

    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Append a fragment rendered at the current offset and adopt its `next`.
    pub fn push_fragment(&mut self, fragment: Fragment) -> &mut Self {
        self.sql.push_str(&fragment.sql);
        self.args.extend(fragment.args);
        self.offset = fragment.next;
        self
    }

    pub fn finish(self) -> Fragment {
        Fragment {
            sql: self.sql,
            args: self.args,
            next: self.offset,
        }
    }
}

/// Double `?` so text embedded in a predicate is not read as a marker.
pub(crate) fn marker_safe(s: &str) -> String {
    s.replace('?', "??")
}

/// Count the `?` markers in free-text SQL. `??` is an escaped literal `?`.
pub fn count_markers(sql: &str) -> usize {
    let mut count = 0;
    let mut chars = sql.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '?' {
            if chars.peek() == Some(&'?') {
                chars.next();
            } else {
                count += 1;
            }
        }
    }
    count
}

/// Replace `?` markers left to right with numbered placeholders starting at
/// `offset + 1`, binding `values` in the same order.
///
/// Markers beyond the supplied values are left as a literal `?` and surplus
/// values are still bound; [`crate::QueryBuilder::validate`] reports both.
pub fn number_markers(sql: &str, values: &[Value], dialect: Dialect, offset: usize) -> Fragment {
    let mut out = String::with_capacity(sql.len() + values.len() * 2);
    let mut next = offset;
    let mut used = 0;
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '?' {
            out.push(ch);
            continue;
        }
        if chars.peek() == Some(&'?') {
            chars.next();
            out.push('?');
            continue;
        }
        if used < values.len() {
            next += 1;
            used += 1;
            out.push_str(&dialect.placeholder(next));
        } else {
            out.push('?');
        }
    }

    // Surplus values: keep the argument list aligned with what the caller passed.
    next += values.len() - used;

    Fragment {
        sql: out,
        args: values.to_vec(),
        next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_from_offset() {
        let f = number_markers("a = ? OR b = ?", &[Value::Int(1), Value::Int(2)], Dialect::Postgres, 3);
        assert_eq!(f.sql, "a = $4 OR b = $5");
        assert_eq!(f.next, 5);
        assert_eq!(f.args, vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn escaped_marker_is_literal() {
        let f = number_markers("data ?? 'k' AND id = ?", &[Value::Int(9)], Dialect::Postgres, 0);
        assert_eq!(f.sql, "data ? 'k' AND id = $1");
        assert_eq!(count_markers("data ?? 'k' AND id = ?"), 1);
    }

    #[test]
    fn marker_safe_text_binds_nothing() {
        let sql = format!("{} = ?", marker_safe(r#""a?b""#));
        assert_eq!(count_markers(&sql), 1);
        let f = number_markers(&sql, &[Value::Int(1)], Dialect::Postgres, 0);
        assert_eq!(f.sql, r#""a?b" = $1"#);
    }

    #[test]
    fn mysql_keeps_question_marks() {
        let f = number_markers("a = ?", &[Value::Int(1)], Dialect::MySql, 7);
        assert_eq!(f.sql, "a = ?");
        assert_eq!(f.next, 8);
    }

    #[test]
    fn writer_threads_offsets() {
        let mut w = Writer::new(Dialect::Postgres, 0);
        let first = number_markers("x = ?", &[Value::Int(1)], w.dialect, w.offset);
        w.push_fragment(first).push(" AND ");
        let second = number_markers("y = ?", &[Value::Int(2)], w.dialect, w.offset);
        w.push_fragment(second);
        let f = w.finish();
        assert_eq!(f.sql, "x = $1 AND y = $2");
        assert_eq!(f.next, 2);
    }
}
