//! Named placeholder rewriting for PostgreSQL.

use native_query_mapper::{MapperError, NativeStatement, SqlValue};

#[test]
fn repeated_names_share_a_position() {
    let mut stmt = NativeStatement::new(concat!(
        r#"SELECT a.id AS "Articles__id" FROM articles a "#,
        "WHERE a.user_id = :user OR a.editor_id = :user AND a.id > :min",
    ));
    stmt.bind("user", 7).unwrap().bind("min", 100).unwrap();
    let (sql, params) = stmt.to_positional().unwrap();
    assert_eq!(
        sql,
        concat!(
            r#"SELECT a.id AS "Articles__id" FROM articles a "#,
            "WHERE a.user_id = $1 OR a.editor_id = $1 AND a.id > $2",
        )
    );
    assert_eq!(params.len(), 2);
    assert_eq!(params[1].value, SqlValue::Int(100));
}

#[test]
fn casts_and_quoted_text_are_untouched() {
    let mut stmt =
        NativeStatement::new("SELECT ':not_a_param' AS t, created::date FROM x WHERE id = :id");
    stmt.bind("id", 1).unwrap();
    let (sql, params) = stmt.to_positional().unwrap();
    assert_eq!(
        sql,
        "SELECT ':not_a_param' AS t, created::date FROM x WHERE id = $1"
    );
    assert_eq!(params.len(), 1);
}

#[test]
fn unbound_placeholder_is_an_error() {
    let stmt = NativeStatement::new("SELECT 1 WHERE id = :id");
    let err = stmt.to_positional().unwrap_err();
    assert!(matches!(err, MapperError::InvalidArgument(_)));
    assert!(err.to_string().contains("No value bound for placeholder ':id'"));
}

#[test]
fn unused_bindings_are_not_sent() {
    let mut stmt = NativeStatement::new("SELECT 1 WHERE id = :id");
    stmt.bind("id", 1).unwrap().bind("extra", "x").unwrap();
    let (_, params) = stmt.to_positional().unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(stmt.params().len(), 2);
}

#[test]
fn rebinding_replaces_the_value() {
    let mut stmt = NativeStatement::new("SELECT 1 WHERE id = :id");
    stmt.bind("id", 1).unwrap();
    stmt.bind("id", 2).unwrap();
    let (_, params) = stmt.to_positional().unwrap();
    assert_eq!(params[0].value, SqlValue::Int(2));
}
