//! Identifier handling.
//!
//! [`Ident`] represents a possibly dotted SQL identifier (`schema.table.column`).
//! Builder methods that take a column or table name run it through
//! [`quote_or_raw`]: anything that parses as an identifier is quoted for the
//! target dialect, anything else (`COUNT(*)`, `users u`, `lower(name)`) is
//! emitted verbatim.
//!
//! - Bare parts match `[A-Za-z_][A-Za-z0-9_$]*`
//! - Double-quoted parts allow anything except NUL, with `""` as an escaped quote
//! - A trailing `*` part is allowed (`u.*`) and never quoted

use crate::dialect::Dialect;
use crate::error::{QueryError, QueryResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    Name(String),
    Star,
}

/// A SQL identifier (column, table, or schema name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
}

impl Ident {
    /// Parse an identifier string, supporting dotted and quoted forms.
    pub fn parse(s: &str) -> QueryResult<Self> {
        if s.is_empty() {
            return Err(QueryError::validation("Identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(QueryError::validation(
                "Identifier cannot contain NUL character",
            ));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            if !parts.is_empty() {
                match chars.next() {
                    Some('.') => {
                        if chars.peek().is_none() {
                            return Err(QueryError::validation("Trailing '.' in identifier"));
                        }
                    }
                    Some(c) => {
                        return Err(QueryError::validation(format!(
                            "Expected '.' between identifier parts, got '{c}'"
                        )));
                    }
                    None => break,
                }
            }
            if matches!(parts.last(), Some(IdentPart::Star)) {
                return Err(QueryError::validation("'*' must be the last identifier part"));
            }

            if chars.peek() == Some(&'*') {
                chars.next();
                parts.push(IdentPart::Star);
                continue;
            }

            if chars.peek() == Some(&'"') {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('"') => {
                            if chars.peek() == Some(&'"') {
                                chars.next();
                                name.push('"');
                            } else {
                                break;
                            }
                        }
                        Some(c) => name.push(c),
                        None => return Err(QueryError::validation("Unclosed quoted identifier")),
                    }
                }
                if name.is_empty() {
                    return Err(QueryError::validation("Empty quoted identifier"));
                }
                parts.push(IdentPart::Name(name));
                continue;
            }

            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                let ok = if name.is_empty() {
                    c == '_' || c.is_ascii_alphabetic()
                } else {
                    c == '_' || c == '$' || c.is_ascii_alphanumeric()
                };
                if !ok {
                    return Err(QueryError::validation(format!(
                        "Invalid character in identifier: '{c}'"
                    )));
                }
                name.push(c);
                chars.next();
            }
            if name.is_empty() {
                return Err(QueryError::validation("Empty identifier segment"));
            }
            parts.push(IdentPart::Name(name));
        }

        if parts.is_empty() {
            return Err(QueryError::validation("Empty identifier"));
        }
        if parts == [IdentPart::Star] {
            return Err(QueryError::validation("'*' is not an identifier"));
        }

        Ok(Self { parts })
    }

    /// Render with every name part quoted for `dialect`.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        let mut out = String::new();
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Name(s) => out.push_str(&dialect.quote(s)),
                IdentPart::Star => out.push('*'),
            }
        }
        out
    }

    /// The last named part (`users` for `public.users`).
    pub fn base_name(&self) -> Option<&str> {
        self.parts.iter().rev().find_map(|p| match p {
            IdentPart::Name(s) => Some(s.as_str()),
            IdentPart::Star => None,
        })
    }
}

/// Quote `s` if it is an identifier, otherwise return it untouched.
pub fn quote_or_raw(s: &str, dialect: Dialect) -> String {
    match Ident::parse(s.trim()) {
        Ok(ident) => ident.to_sql(dialect),
        Err(_) => s.to_string(),
    }
}

/// Split `orders o` / `orders AS o` into the table, whether `AS` was written,
/// and the alias.
fn split_alias(s: &str) -> Option<(&str, bool, &str)> {
    let mut words = s.split_whitespace();
    match (words.next(), words.next(), words.next(), words.next()) {
        (Some(table), Some(alias), None, None) if Ident::parse(alias).is_ok() => {
            Some((table, false, alias))
        }
        (Some(table), Some(kw), Some(alias), None)
            if kw.eq_ignore_ascii_case("as") && Ident::parse(alias).is_ok() =>
        {
            Some((table, true, alias))
        }
        _ => None,
    }
}

/// Render a table reference, keeping a trailing alias (`orders o`) intact.
pub fn quote_table(s: &str, dialect: Dialect) -> String {
    let s = s.trim();
    match split_alias(s) {
        Some((table, false, alias)) => format!("{} {}", quote_or_raw(table, dialect), alias),
        Some((table, true, alias)) => format!("{} AS {}", quote_or_raw(table, dialect), alias),
        None => quote_or_raw(s, dialect),
    }
}

/// The table part of a reference, without any alias (`orders` for `orders o`).
pub fn table_name(s: &str) -> &str {
    let s = s.trim();
    split_alias(s).map_or(s, |(table, _, _)| table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PG: Dialect = Dialect::Postgres;

    #[test]
    fn ident_simple() {
        assert_eq!(Ident::parse("users").unwrap().to_sql(PG), "\"users\"");
    }

    #[test]
    fn ident_dotted() {
        assert_eq!(
            Ident::parse("public.users").unwrap().to_sql(PG),
            "\"public\".\"users\""
        );
    }

    #[test]
    fn ident_quoted_with_escape() {
        let ident = Ident::parse(r#""has""quote""#).unwrap();
        assert_eq!(ident.to_sql(PG), r#""has""quote""#);
    }

    #[test]
    fn ident_star_suffix() {
        assert_eq!(Ident::parse("u.*").unwrap().to_sql(PG), "\"u\".*");
        assert!(Ident::parse("*").is_err());
        assert!(Ident::parse("u.*.id").is_err());
    }

    #[test]
    fn ident_mysql_backticks() {
        assert_eq!(Ident::parse("t.id").unwrap().to_sql(Dialect::MySql), "`t`.`id`");
    }

    #[test]
    fn ident_rejects_bad_input() {
        assert!(Ident::parse("").is_err());
        assert!(Ident::parse("1table").is_err());
        assert!(Ident::parse("my table").is_err());
        assert!(Ident::parse("schema..table").is_err());
        assert!(Ident::parse("schema.").is_err());
        assert!(Ident::parse(r#""unclosed"#).is_err());
    }

    #[test]
    fn expressions_pass_through() {
        assert_eq!(quote_or_raw("COUNT(*)", PG), "COUNT(*)");
        assert_eq!(quote_or_raw("*", PG), "*");
        assert_eq!(quote_or_raw("lower(name)", PG), "lower(name)");
        assert_eq!(quote_or_raw("name", PG), "\"name\"");
    }

    #[test]
    fn table_alias_kept() {
        assert_eq!(quote_table("orders o", PG), "\"orders\" o");
        assert_eq!(quote_table("orders AS o", PG), "\"orders\" AS o");
        assert_eq!(quote_table("orders", PG), "\"orders\"");
    }

    #[test]
    fn table_name_strips_alias() {
        assert_eq!(table_name(" orders o "), "orders");
        assert_eq!(table_name("public.orders AS o"), "public.orders");
        assert_eq!(table_name("orders"), "orders");
        assert_eq!(table_name("(SELECT 1) x y"), "(SELECT 1) x y");
    }

    #[test]
    fn base_name() {
        assert_eq!(Ident::parse("public.users").unwrap().base_name(), Some("users"));
    }
}
