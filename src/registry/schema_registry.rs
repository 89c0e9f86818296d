//! # Schema Registry
//!
//! Explicit, session-scoped registry of entity types and their declared
//! relationships. The strategy builder and the hydrator receive a registry
//! instead of consulting process-wide state.
//!
//! ## Usage
//!
//! ```rust
//! use native_query_mapper::registry::{EntityType, SchemaRegistry};
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register(
//!     EntityType::new("Articles", "Article")
//!         .belongs_to("Users")
//!         .has_many("Comments")
//!         .belongs_to_many("Tags"),
//! );
//! registry.register(EntityType::new("Comments", "Comment").belongs_to("Articles"));
//!
//! let articles = registry.get("Articles").unwrap();
//! assert_eq!(articles.relationships().len(), 3);
//! // The junction of Articles <-> Tags is synthesized on demand
//! assert!(registry.contains("ArticlesTags"));
//! ```

use crate::constants::{DEFAULT_PRIMARY_KEY, GENERIC_ENTITY_CLASS};
use crate::utils::inflector::{plural_property, singular_property};
use crate::value::ColumnType;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// The four relationship flavors between an owner and a target type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssociationKind {
    /// Owner holds exactly one target (the target carries the foreign key)
    HasOne,
    /// Owner row points at one target row
    BelongsTo,
    /// Owner holds a collection of targets
    HasMany,
    /// Owner and target are linked through a junction type
    BelongsToMany,
}

impl AssociationKind {
    /// Order in which children of each kind are visited during hydration
    pub const ALL: [AssociationKind; 4] = [
        AssociationKind::HasOne,
        AssociationKind::BelongsTo,
        AssociationKind::HasMany,
        AssociationKind::BelongsToMany,
    ];

    pub fn is_to_many(&self) -> bool {
        match self {
            AssociationKind::HasOne | AssociationKind::BelongsTo => false,
            AssociationKind::HasMany | AssociationKind::BelongsToMany => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssociationKind::HasOne => "hasOne",
            AssociationKind::BelongsTo => "belongsTo",
            AssociationKind::HasMany => "hasMany",
            AssociationKind::BelongsToMany => "belongsToMany",
        }
    }
}

impl fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared edge from an owner type to a target type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub kind: AssociationKind,
    /// Canonical alias of the target type
    pub target: String,
    /// Property on the owner instance that receives the target
    pub property: String,
    /// Junction alias, only for [`AssociationKind::BelongsToMany`]
    pub through: Option<String>,
}

impl Relationship {
    /// Relationship with the conventional property name for its kind
    pub fn new(owner: &str, kind: AssociationKind, target: &str) -> Self {
        let property = if kind.is_to_many() {
            plural_property(target)
        } else {
            singular_property(target)
        };
        let through = match kind {
            AssociationKind::BelongsToMany => Some(default_junction_alias(owner, target)),
            _ => None,
        };
        Self {
            kind,
            target: target.to_string(),
            property,
            through,
        }
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = property.into();
        self
    }

    pub fn with_through(mut self, through: impl Into<String>) -> Self {
        self.through = Some(through.into());
        self
    }
}

/// Junction alias for two types: both aliases sorted and concatenated
pub fn default_junction_alias(owner: &str, target: &str) -> String {
    let mut pair = [owner, target];
    pair.sort_unstable();
    format!("{}{}", pair[0], pair[1])
}

/// Metadata for one table/type: alias, constructor token, identity and relationships
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityType {
    alias: String,
    entity_class: String,
    primary_key: Vec<String>,
    relationships: Vec<Relationship>,
    column_types: IndexMap<String, ColumnType>,
}

impl EntityType {
    /// New type with a single `id` identity key
    pub fn new(alias: impl Into<String>, entity_class: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            entity_class: entity_class.into(),
            primary_key: vec![DEFAULT_PRIMARY_KEY.to_string()],
            relationships: Vec::new(),
            column_types: IndexMap::new(),
        }
    }

    /// Generic junction type used when none was registered for a many-to-many pair
    pub fn junction(alias: impl Into<String>) -> Self {
        Self::new(alias, GENERIC_ENTITY_CLASS)
    }

    pub fn with_primary_key<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_column_type(mut self, column: impl Into<String>, column_type: ColumnType) -> Self {
        self.column_types.insert(column.into(), column_type);
        self
    }

    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    pub fn has_one(self, target: &str) -> Self {
        let rel = Relationship::new(&self.alias, AssociationKind::HasOne, target);
        self.with_relationship(rel)
    }

    pub fn belongs_to(self, target: &str) -> Self {
        let rel = Relationship::new(&self.alias, AssociationKind::BelongsTo, target);
        self.with_relationship(rel)
    }

    pub fn has_many(self, target: &str) -> Self {
        let rel = Relationship::new(&self.alias, AssociationKind::HasMany, target);
        self.with_relationship(rel)
    }

    pub fn belongs_to_many(self, target: &str) -> Self {
        let rel = Relationship::new(&self.alias, AssociationKind::BelongsToMany, target);
        self.with_relationship(rel)
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn entity_class(&self) -> &str {
        &self.entity_class
    }

    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    /// Relationships in declaration order
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.column_types.get(column).copied()
    }

    pub fn column_types(&self) -> &IndexMap<String, ColumnType> {
        &self.column_types
    }
}

/// Registry of entity types keyed by canonical alias
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    types: IndexMap<String, EntityType>,
    /// Junction types created on demand; an explicit registration replaces them
    synthesized: IndexSet<String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a type. Junction types referenced by its
    /// many-to-many relationships are synthesized when not yet known.
    pub fn register(&mut self, entity_type: EntityType) -> &mut Self {
        let alias = entity_type.alias().to_string();
        let junctions: Vec<String> = entity_type
            .relationships()
            .iter()
            .filter_map(|rel| rel.through.clone())
            .collect();

        self.synthesized.shift_remove(&alias);
        self.types.insert(alias.clone(), entity_type);

        for junction in junctions {
            if !self.types.contains_key(&junction) {
                debug!(junction = %junction, owner = %alias, "Synthesizing junction type");
                self.types
                    .insert(junction.clone(), EntityType::junction(junction.clone()));
                self.synthesized.insert(junction);
            }
        }
        self
    }

    /// Builder-style registration
    pub fn with(mut self, entity_type: EntityType) -> Self {
        self.register(entity_type);
        self
    }

    pub fn get(&self, alias: &str) -> Option<&EntityType> {
        self.types.get(alias)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.types.contains_key(alias)
    }

    pub fn is_synthesized(&self, alias: &str) -> bool {
        self.synthesized.contains(alias)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
