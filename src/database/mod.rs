//! # Database Integration
//!
//! The thin layer between a hand-written query and the hydrator.
//!
//! PostgreSQL folds unquoted identifiers to lower case, so column aliases
//! must be double-quoted (`AS "Articles__id"`) to keep the alias intact.
//!
//! ## Key Components
//!
//! - [`placeholders`] - `IN (...)` placeholder lists and the [`BindTarget`] seam
//! - [`statement`] - SQL with named placeholders, rewritten to `$n` for PostgreSQL
//! - [`row_source`] - async sources of fully materialized rows
//! - `row_conversion` - PostgreSQL row decoding (`postgres` feature)
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use native_query_mapper::database::{InPlaceholders, NativeStatement, PgRowSource};
//! use native_query_mapper::mapping::NativeQueryMapper;
//! use native_query_mapper::registry::{EntityType, SchemaRegistry};
//! use sqlx::PgPool;
//! use std::sync::Arc;
//!
//! # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SchemaRegistry::new().with(EntityType::new("Articles", "Article"));
//! let ids = InPlaceholders::new("id", [1, 2, 3])?;
//! let mut stmt = NativeStatement::new(format!(
//!     r#"SELECT id AS "Articles__id", title AS "Articles__title"
//!        FROM articles WHERE id IN ({ids})"#
//! ));
//! ids.bind(&mut stmt)?;
//!
//! let mut source = PgRowSource::new(pool, stmt);
//! let articles = NativeQueryMapper::new(Arc::new(registry), "Articles")
//!     .all(&mut source)
//!     .await?;
//! println!("hydrated {} articles", articles.len());
//! # Ok(())
//! # }
//! ```

pub mod placeholders;
#[cfg(feature = "postgres")]
pub mod row_conversion;
pub mod row_source;
pub mod statement;

pub use placeholders::{BindTarget, InPlaceholders, ParamType};
#[cfg(feature = "postgres")]
pub use row_conversion::pg_row_to_row;
#[cfg(feature = "postgres")]
pub use row_source::PgRowSource;
pub use row_source::RowSource;
pub use statement::{BoundParam, NativeStatement};
