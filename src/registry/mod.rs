//! # Registry Infrastructure
//!
//! Relationship metadata the mapper needs about each entity type.
//!
//! ## Overview
//!
//! A [`SchemaRegistry`] is built once per query-mapping session and handed to
//! the strategy builder and the hydrator. Nothing is looked up through global
//! state, so independent sessions never observe each other's registrations.
//!
//! ## Architecture
//!
//! ```text
//! Registry Infrastructure
//! ├── SchemaRegistry           (alias -> EntityType, junction synthesis)
//! └── RelationshipGraphWalker  (BFS alias resolution from a root type)
//! ```

pub mod relationship_walker;
pub mod schema_registry;

pub use relationship_walker::{RelationshipGraphWalker, Resolution};
pub use schema_registry::{
    default_junction_alias, AssociationKind, EntityType, Relationship, SchemaRegistry,
};
