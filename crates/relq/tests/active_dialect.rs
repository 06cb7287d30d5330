//! Touches process-wide state, so it lives in its own test binary.

use relq::{Config, Dialect, dialect, table};

#[test]
fn builders_capture_the_dialect_at_construction() {
    assert_eq!(dialect::active(), Dialect::Postgres);
    let before = table("items").filter("a = ?", [1]);

    Config::from_toml_str("dialect = \"mysql\"").unwrap().install();
    assert_eq!(dialect::active(), Dialect::MySql);
    let after = table("items").filter("a = ?", [1]);

    assert_eq!(before.to_sql(), r#"SELECT * FROM "items" WHERE a = $1"#);
    assert_eq!(after.to_sql(), "SELECT * FROM `items` WHERE a = ?");

    let err = after.array_contains("tags", "x").unwrap_err();
    assert_eq!(
        err.to_string(),
        "array containment is not supported by the mysql backend"
    );

    dialect::set_active(Dialect::Postgres);
    assert_eq!(table("items").dialect(), Dialect::Postgres);
}
