//! # Models
//!
//! Hydrated entities and the constructor seam used to build them.

pub mod entity;

pub use entity::{DefaultConstructor, Entity, EntityConstructor, EntityState, Related};
