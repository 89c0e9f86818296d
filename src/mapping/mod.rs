//! # Mapping
//!
//! From flat `{Alias}__{field}` rows to nested entity graphs.
//!
//! ## Architecture
//!
//! ```text
//! rows ──► AliasParser ──► per-alias field maps ─────────────┐
//!                                                             ▼
//! aliases ──► MappingStrategyBuilder ──► MappingTree ──► RecursiveHydrator ──► Vec<Entity>
//!                 │
//!                 └── RelationshipGraphWalker (registry)
//! ```
//!
//! [`NativeQueryMapper`] drives the whole pipeline for a root alias.

pub mod alias_parser;
pub mod hydrator;
pub mod mapper;
pub mod strategy;

pub use alias_parser::{AliasParser, ParsedRow};
pub use hydrator::RecursiveHydrator;
pub use mapper::NativeQueryMapper;
pub use strategy::{MappingNode, MappingStrategyBuilder, MappingTree};
