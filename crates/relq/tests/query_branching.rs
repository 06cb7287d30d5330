use relq::{Condition, Dialect, Direction, QueryBuilder, Value, args, table};
use std::thread;

fn pg(name: &str) -> QueryBuilder {
    table(name).on(Dialect::Postgres)
}

#[test]
fn branches_from_a_shared_base() {
    let active = pg("users").filter("active = ?", [true]);
    let admins = active.filter("role = ?", ["admin"]);
    let newest = active.order("created_at", Direction::Desc).limit(10);

    assert_eq!(active.to_sql(), r#"SELECT * FROM "users" WHERE active = $1"#);
    assert_eq!(
        admins.to_sql(),
        r#"SELECT * FROM "users" WHERE active = $1 AND role = $2"#
    );
    assert_eq!(
        newest.to_sql(),
        r#"SELECT * FROM "users" WHERE active = $1 ORDER BY "created_at" DESC LIMIT 10"#
    );
}

#[test]
fn builders_render_identically_across_threads() {
    let base = pg("events").filter("kind = ?", ["click"]).where_in("id", [1, 2, 3]);
    let expected = base.render_select();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let q = base.clone();
            thread::spawn(move || {
                let _branch = q.filter("n = ?", [i]);
                q.render_select()
            })
        })
        .collect();

    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}

#[test]
fn typed_conditions_mix_with_free_text() {
    let stmt = pg("orders")
        .filter("total > ?", [100])
        .filter_by(Condition::any(vec![
            Condition::eq("status", "paid").unwrap(),
            Condition::is_null("status").unwrap(),
        ]))
        .filter_by(Condition::between("created_at", "2024-01-01", "2024-12-31").unwrap())
        .render_select();

    assert_eq!(
        stmt.sql,
        r#"SELECT * FROM "orders" WHERE total > $1 AND ("status" = $2 OR "status" IS NULL) AND "created_at" BETWEEN $3 AND $4"#
    );
    assert_eq!(
        stmt.args,
        vec![
            Value::Int(100),
            Value::from("paid"),
            Value::from("2024-01-01"),
            Value::from("2024-12-31"),
        ]
    );
}

#[test]
fn keyset_pagination() {
    let stmt = pg("posts")
        .filter_by(Condition::tuple_lt("created_at", "id", "2024-05-01", 900).unwrap())
        .order_raw("created_at DESC, id DESC")
        .limit(20)
        .render_select();
    assert_eq!(
        stmt.sql,
        r#"SELECT * FROM "posts" WHERE ("created_at", "id") < ($1, $2) ORDER BY created_at DESC, id DESC LIMIT 20"#
    );
}

#[test]
fn paginate_and_count_share_filters() {
    let base = pg("products").filter("price < ? AND stock > ?", args![50.0, 0]);
    let page = base.order("name", Direction::Asc).paginate(3, 25).render_select();
    let count = base.render_count();

    assert_eq!(
        page.sql,
        r#"SELECT * FROM "products" WHERE price < $1 AND stock > $2 ORDER BY "name" ASC LIMIT 25 OFFSET 50"#
    );
    assert_eq!(
        count.sql,
        r#"SELECT COUNT(*) FROM "products" WHERE price < $1 AND stock > $2"#
    );
    assert_eq!(page.args, count.args);
}

#[test]
fn mysql_end_to_end() {
    let q = pg("users").on(Dialect::MySql);
    let stmt = q
        .filter("age >= ?", [21])
        .ilike("name", "%ann%")
        .json_path_eq("prefs", &["theme"], "dark")
        .order("id", Direction::Desc)
        .limit(5)
        .render_select();
    assert_eq!(
        stmt.sql,
        "SELECT * FROM `users` WHERE age >= ? AND LOWER(`name`) LIKE LOWER(?) AND JSON_UNQUOTE(JSON_EXTRACT(`prefs`, '$.theme')) = ? ORDER BY `id` DESC LIMIT 5"
    );
    assert_eq!(stmt.args.len(), 3);

    let update = q
        .filter("id = ?", [9])
        .render_update([("name", Value::from("x")), ("age", Value::Null)])
        .unwrap();
    assert_eq!(update.sql, "UPDATE `users` SET `name` = ?, `age` = ? WHERE id = ?");
    assert_eq!(update.args, vec![Value::from("x"), Value::Null, Value::Int(9)]);
}

#[cfg(feature = "postgres")]
#[test]
fn params_ref_matches_args() {
    let stmt = pg("t").filter("a = ? AND b = ?", args![1, "x"]).render_select();
    assert_eq!(stmt.params_ref().len(), stmt.args.len());
}
