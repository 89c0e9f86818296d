#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Native Query Mapper
//!
//! Hydrates nested, de-duplicated entity graphs from hand-written SQL.
//!
//! ## Overview
//!
//! Query builders only hydrate object graphs from queries they generated
//! themselves. This crate accepts the rows of an arbitrary query instead,
//! as long as every column is aliased `{Alias}__{field}`, and rebuilds the
//! one-to-one, one-to-many and many-to-many structure without N+1 queries.
//!
//! ## Architecture
//!
//! - A [`SchemaRegistry`] describes entity types and their relationships.
//! - The [`MappingStrategyBuilder`] resolves the aliases of a result set into
//!   an immutable [`MappingTree`].
//! - The [`RecursiveHydrator`] walks that tree against every row, merging
//!   repeated parents and collecting distinct children.
//!
//! ## Module Organization
//!
//! - [`registry`] - Entity types, relationships and graph traversal
//! - [`mapping`] - Alias parsing, strategy building and hydration
//! - [`models`] - Hydrated entities and constructors
//! - [`database`] - Native statements, `IN (...)` placeholders and row sources
//! - [`value`] - Scalar values and column types
//! - [`config`] - Layered configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use native_query_mapper::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let registry = SchemaRegistry::new()
//!     .with(EntityType::new("Articles", "Article").belongs_to("Users"))
//!     .with(EntityType::new("Users", "User"));
//! let config = MapperConfig::default();
//!
//! let tree = MappingStrategyBuilder::new(&registry, &config)
//!     .build("Articles", &["Articles", "Users"])?;
//! let rows = vec![row([
//!     ("Articles__id", SqlValue::from(1)),
//!     ("Articles__title", SqlValue::from("Article 1")),
//!     ("Users__id", SqlValue::from(7)),
//!     ("Users__username", SqlValue::from("bob")),
//! ])];
//!
//! let articles = RecursiveHydrator::new(&registry, &tree, &config)?.hydrate_many(&rows)?;
//! let author = articles[0].one("user").and_then(|u| u.get("username"));
//! assert_eq!(author, Some(&SqlValue::from("bob")));
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit, integration and property tests
//! ```

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod logging;
pub mod mapping;
pub mod models;
pub mod registry;
pub mod utils;
pub mod value;

pub use config::{JunctionProperty, LogFormat, MapperConfig};
pub use database::{BindTarget, InPlaceholders, NativeStatement, ParamType, RowSource};
pub use error::{MapperError, Result, UnknownAliasReason};
pub use mapping::{
    AliasParser, MappingNode, MappingStrategyBuilder, MappingTree, NativeQueryMapper,
    RecursiveHydrator,
};
pub use models::{DefaultConstructor, Entity, EntityConstructor, EntityState, Related};
pub use registry::{
    AssociationKind, EntityType, Relationship, RelationshipGraphWalker, SchemaRegistry,
};
pub use value::{row, ColumnType, FieldMap, Row, SqlValue};

/// Everything needed to register types, build strategies and hydrate rows
pub mod prelude {
    pub use crate::config::MapperConfig;
    pub use crate::error::{MapperError, Result};
    pub use crate::mapping::{
        MappingNode, MappingStrategyBuilder, MappingTree, NativeQueryMapper, RecursiveHydrator,
    };
    pub use crate::models::{Entity, Related};
    pub use crate::registry::{AssociationKind, EntityType, SchemaRegistry};
    pub use crate::value::{row, ColumnType, Row, SqlValue};
}
