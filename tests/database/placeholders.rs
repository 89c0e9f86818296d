//! `IN (...)` placeholder lists bound into native statements.

use native_query_mapper::{InPlaceholders, MapperError, NativeStatement, ParamType, SqlValue};

#[test]
fn renders_one_placeholder_per_value() {
    let ids = InPlaceholders::new("id", [10, 20, 30]).unwrap();
    assert_eq!(ids.render(), ":id_0, :id_1, :id_2");
    assert_eq!(format!("IN ({ids})"), "IN (:id_0, :id_1, :id_2)");
}

#[test]
fn binds_into_statement_and_rewrites_positionally() {
    let statuses = InPlaceholders::new("status", [1, 5, 9]).unwrap();
    let mut stmt = NativeStatement::new(format!(
        r#"SELECT "Users".email AS "Users__email" FROM users AS "Users"
           WHERE status_id IN ({statuses}) AND active = :active"#
    ));
    statuses.bind(&mut stmt).unwrap();
    stmt.bind("active", true).unwrap();

    let (sql, params) = stmt.to_positional().unwrap();
    assert!(sql.ends_with("IN ($1, $2, $3) AND active = $4"));
    let values: Vec<_> = params.iter().map(|p| p.value.clone()).collect();
    assert_eq!(
        values,
        vec![
            SqlValue::Int(1),
            SqlValue::Int(5),
            SqlValue::Int(9),
            SqlValue::Bool(true)
        ]
    );
    assert_eq!(params[3].param_type, ParamType::Bool);
}

#[test]
fn type_is_inferred_from_first_value_only() {
    let mixed = InPlaceholders::new("v", [SqlValue::from(1), SqlValue::from("two")]).unwrap();
    assert_eq!(mixed.param_type(), &ParamType::Int);

    let mut stmt = NativeStatement::new(format!("SELECT 1 WHERE x IN ({mixed})"));
    mixed.bind(&mut stmt).unwrap();
    assert!(stmt
        .params()
        .values()
        .all(|p| p.param_type == ParamType::Int));
    // The second value cannot become an integer and is sent as-is
    assert_eq!(stmt.params()["v_1"].coerced(), SqlValue::from("two"));
}

#[test]
fn string_values_bind_as_strings() {
    let names = InPlaceholders::new("name", ["ada", "grace"]).unwrap();
    assert_eq!(names.param_type(), &ParamType::Str);
}

#[test]
fn explicit_type_overrides_inference() {
    let ids = InPlaceholders::new("id", ["1", "2"])
        .unwrap()
        .with_type(ParamType::Int);
    let mut stmt = NativeStatement::new(format!("SELECT 1 WHERE id IN ({ids})"));
    ids.bind(&mut stmt).unwrap();
    let (_, params) = stmt.to_positional().unwrap();
    let coerced: Vec<_> = params.iter().map(|p| p.coerced()).collect();
    assert_eq!(coerced, vec![SqlValue::Int(1), SqlValue::Int(2)]);
}

#[test]
fn rejects_empty_prefix_and_values() {
    let err = InPlaceholders::new("", [1]).unwrap_err();
    assert!(matches!(err, MapperError::InvalidArgument(_)));
    assert!(err.to_string().contains("empty prefix"));

    let err = InPlaceholders::new("id", Vec::<i64>::new()).unwrap_err();
    assert!(err.to_string().contains("empty value list"));
}

#[test]
fn prefix_must_form_valid_placeholder_names() {
    let ids = InPlaceholders::new("bad-prefix", [1]).unwrap();
    let mut stmt = NativeStatement::new("SELECT 1");
    let err = ids.bind(&mut stmt).unwrap_err();
    assert!(err.to_string().contains("Invalid placeholder name 'bad-prefix_0'"));
}
