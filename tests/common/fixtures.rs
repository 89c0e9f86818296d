//! Blog schema and row builders shared by the integration tests.

use native_query_mapper::{row, ColumnType, EntityType, Row, SchemaRegistry, SqlValue};

/// Articles, their authors, tags and comments.
///
/// ```text
/// Articles  belongsTo Users, belongsToMany Tags, hasMany Comments
/// Users     belongsTo Countries, hasOne Profiles, hasMany Articles
/// Countries hasMany Users
/// Tags      belongsToMany Articles
/// Comments  belongsTo Articles, belongsTo Users
/// ```
pub fn blog_registry() -> SchemaRegistry {
    SchemaRegistry::new()
        .with(
            EntityType::new("Articles", "Article")
                .with_column_type("id", ColumnType::Integer)
                .with_column_type("created", ColumnType::DateTime)
                .belongs_to("Users")
                .belongs_to_many("Tags")
                .has_many("Comments"),
        )
        .with(
            EntityType::new("Users", "User")
                .belongs_to("Countries")
                .has_one("Profiles")
                .has_many("Articles"),
        )
        .with(EntityType::new("Countries", "Country").has_many("Users"))
        .with(EntityType::new("Profiles", "Profile").with_primary_key(["user_id"]))
        .with(EntityType::new("Tags", "Tag").belongs_to_many("Articles"))
        .with(
            EntityType::new("Comments", "Comment")
                .belongs_to("Articles")
                .belongs_to("Users"),
        )
}

pub fn v(value: impl Into<SqlValue>) -> SqlValue {
    value.into()
}

pub fn null() -> SqlValue {
    SqlValue::Null
}

/// Rows sharing one column list, like a fetched result set
pub fn table<const N: usize>(columns: [&str; N], data: Vec<[SqlValue; N]>) -> Vec<Row> {
    data.into_iter()
        .map(|values| row(columns.iter().copied().zip(values)))
        .collect()
}

/// `Articles LEFT JOIN Comments` over five articles; article 3 has no comments
pub fn articles_with_comments() -> Vec<Row> {
    table(
        [
            "Articles__id",
            "Articles__title",
            "Comments__id",
            "Comments__article_id",
            "Comments__content",
        ],
        vec![
            [v(1), v("Article 1"), v(1), v(1), v("Comment 1")],
            [v(1), v("Article 1"), v(2), v(1), v("Comment 2")],
            [v(2), v("Article 2"), v(3), v(2), v("Comment 3")],
            [v(3), v("Article 3"), null(), null(), null()],
            [v(4), v("Article 4"), v(4), v(4), v("Comment 4")],
            [v(5), v("Article 5"), v(5), v(5), v("Comment 5")],
        ],
    )
}

/// `Articles JOIN ArticlesTags JOIN Tags`; tag 1 is shared by articles 1 and 2
pub fn articles_with_tags() -> Vec<Row> {
    table(
        [
            "Articles__id",
            "Articles__title",
            "ArticlesTags__id",
            "ArticlesTags__article_id",
            "ArticlesTags__tag_id",
            "Tags__id",
            "Tags__name",
        ],
        vec![
            [v(1), v("Article 1"), v(1), v(1), v(1), v(1), v("Tech")],
            [v(1), v("Article 1"), v(2), v(1), v(2), v(2), v("Science")],
            [v(2), v("Article 2"), v(3), v(2), v(1), v(1), v("Tech")],
        ],
    )
}

/// Ids of the entities in a collection property
pub fn ids(entities: Option<&[native_query_mapper::Entity]>) -> Vec<i64> {
    entities
        .unwrap_or_default()
        .iter()
        .filter_map(|e| e.get("id").and_then(SqlValue::as_i64))
        .collect()
}
