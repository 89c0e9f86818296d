//! Mapping strategy resolution against the blog schema.

use crate::common::*;
use native_query_mapper::{
    AssociationKind, EntityType, JunctionProperty, MapperConfig, MapperError,
    MappingStrategyBuilder, MappingTree, SchemaRegistry, UnknownAliasReason,
};

fn build(root: &str, aliases: &[&str]) -> Result<MappingTree, MapperError> {
    let registry = blog_registry();
    let config = MapperConfig::default();
    MappingStrategyBuilder::new(&registry, &config).build(root, aliases)
}

fn reason(err: &MapperError) -> Option<UnknownAliasReason> {
    match err {
        MapperError::UnknownAlias { reason, .. } => Some(*reason),
        _ => None,
    }
}

#[test]
fn empty_alias_set_is_rejected() {
    let err = build("Articles", &[]).unwrap_err();
    assert_eq!(reason(&err), Some(UnknownAliasReason::EmptyAliasSet));
    assert_eq!(err.to_string(), "Every column of the query must use aliases");
}

#[test]
fn unknown_alias_next_to_root() {
    let err = build("Articles", &["Articles", "Books"]).unwrap_err();
    assert_eq!(reason(&err), Some(UnknownAliasReason::NoRootAssociation));
    assert_eq!(err.aliases(), &["Books".to_string()]);
    assert_eq!(
        err.to_string(),
        "None of the root table associations match alias 'Books'"
    );
}

#[test]
fn unknown_alias_below_root() {
    let err = build("Articles", &["Articles", "Books", "Comments"]).unwrap_err();
    assert_eq!(reason(&err), Some(UnknownAliasReason::NoAssociation));
    assert_eq!(
        err.to_string(),
        "None of the table associations match alias 'Books'"
    );
}

#[test]
fn alias_behind_unselected_owner_is_unresolved() {
    // Countries hangs off Users, which the query never selected
    let err = build("Articles", &["Articles", "Comments", "Countries"]).unwrap_err();
    assert_eq!(reason(&err), Some(UnknownAliasReason::NoAssociation));
    assert_eq!(err.aliases(), &["Countries".to_string()]);
}

#[test]
fn has_many_node_records_identity_and_property() {
    let tree = build("Articles", &["Articles", "Comments"]).unwrap();
    let comments = tree.root().child("Comments").unwrap();
    assert_eq!(comments.kind, Some(AssociationKind::HasMany));
    assert_eq!(comments.property.as_deref(), Some("comments"));
    assert_eq!(comments.entity_class, "Comment");
    assert_eq!(comments.primary_key, vec!["id"]);
    assert!(tree.has_to_many());
}

#[test]
fn many_to_many_without_junction() {
    let tree = build("Articles", &["Articles", "Tags"]).unwrap();
    let tags: Vec<_> = tree
        .root()
        .children_of(AssociationKind::BelongsToMany)
        .collect();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].alias, "Tags");
    assert!(tags[0].children_of(AssociationKind::HasOne).next().is_none());
}

#[test]
fn many_to_many_with_junction() {
    let tree = build("Articles", &["Articles", "ArticlesTags", "Tags"]).unwrap();
    let tags = tree.root().child("Tags").unwrap();
    let junction = tags.child("ArticlesTags").unwrap();
    assert_eq!(junction.kind, Some(AssociationKind::HasOne));
    assert_eq!(junction.property.as_deref(), Some("articles_tag"));
    assert_eq!(junction.entity_class, "Entity");
    assert!(tree.root().child("ArticlesTags").is_none());
}

#[test]
fn junction_can_map_into_join_data() {
    let registry = blog_registry();
    let config = MapperConfig::default().with_junction_property(JunctionProperty::JoinData);
    let tree = MappingStrategyBuilder::new(&registry, &config)
        .build("Articles", &["Articles", "ArticlesTags", "Tags"])
        .unwrap();
    let junction = tree.find("ArticlesTags").unwrap();
    assert_eq!(junction.property.as_deref(), Some("_joinData"));
}

#[test]
fn deep_associations_resolve_breadth_first() {
    let tree = build(
        "Articles",
        &["Articles", "Comments", "Countries", "Profiles", "Users"],
    )
    .unwrap();
    let users = tree.root().child("Users").unwrap();
    assert_eq!(users.property.as_deref(), Some("user"));

    let country = users.child("Countries").unwrap();
    assert_eq!(country.kind, Some(AssociationKind::BelongsTo));
    assert_eq!(country.property.as_deref(), Some("country"));

    let profile = users.child("Profiles").unwrap();
    assert_eq!(profile.kind, Some(AssociationKind::HasOne));
    assert_eq!(profile.primary_key, vec!["user_id"]);

    // Every alias is placed exactly once
    let mut aliases = tree.aliases();
    aliases.sort_unstable();
    assert_eq!(
        aliases,
        vec!["Articles", "Comments", "Countries", "Profiles", "Users"]
    );
}

#[test]
fn shallower_path_beats_earlier_deeper_path() {
    // Flags hangs off Countries (under Users, declared first) and off Comments.
    // Level-order expansion reaches it through Comments one level earlier.
    let registry = SchemaRegistry::new()
        .with(
            EntityType::new("Articles", "Article")
                .belongs_to("Users")
                .has_many("Comments"),
        )
        .with(EntityType::new("Users", "User").belongs_to("Countries"))
        .with(EntityType::new("Countries", "Country").has_many("Flags"))
        .with(EntityType::new("Comments", "Comment").has_many("Flags"))
        .with(EntityType::new("Flags", "Flag"));
    let config = MapperConfig::default();
    let tree = MappingStrategyBuilder::new(&registry, &config)
        .build(
            "Articles",
            &["Articles", "Comments", "Countries", "Flags", "Users"],
        )
        .unwrap();

    let comments = tree.root().child("Comments").unwrap();
    assert_eq!(
        comments.child("Flags").and_then(|f| f.property.as_deref()),
        Some("flags")
    );
    let countries = tree.root().child("Users").and_then(|u| u.child("Countries")).unwrap();
    assert!(countries.child("Flags").is_none());
}

#[test]
fn cyclic_schema_consumes_each_alias_once() {
    // Users has many Articles and Articles belongs to Users
    let tree = build("Users", &["Articles", "Comments", "Users"]).unwrap();
    let articles = tree.root().child("Articles").unwrap();
    assert_eq!(articles.kind, Some(AssociationKind::HasMany));
    assert!(articles.child("Users").is_none());
    assert!(articles.child("Comments").is_some());
}

#[test]
fn strategy_serializes_for_reuse() {
    let tree = build("Articles", &["Articles", "ArticlesTags", "Tags"]).unwrap();
    let json = serde_json::to_value(&tree).unwrap();
    assert_eq!(json["root"]["alias"], "Articles");
    assert_eq!(json["root"]["children"][0]["kind"], "belongsToMany");
    assert_eq!(
        json["root"]["children"][0]["children"][0]["property"],
        "articles_tag"
    );
    let restored: MappingTree = serde_json::from_value(json).unwrap();
    assert_eq!(restored, tree);
}

#[test]
fn builder_resolves_single_aliases() {
    let registry = blog_registry();
    let config = MapperConfig::default();
    let builder = MappingStrategyBuilder::new(&registry, &config);

    let profile = builder.resolve("Articles", "Profiles").unwrap();
    assert_eq!(profile.owner.alias(), "Users");
    assert_eq!(profile.via.kind, AssociationKind::HasOne);

    let junction = builder.resolve("Articles", "ArticlesTags").unwrap();
    assert!(junction.through);

    let err = builder.resolve("Articles", "Books").unwrap_err();
    assert_eq!(reason(&err), Some(UnknownAliasReason::Unreachable));
}
