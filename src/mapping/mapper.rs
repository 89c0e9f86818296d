//! # Native Query Mapper
//!
//! Entry point tying the pieces together: fetch rows from a [`RowSource`],
//! infer the alias set from the first row, build (or reuse) the mapping
//! strategy and hydrate.
//!
//! ```rust
//! use native_query_mapper::prelude::*;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<()> {
//! let registry = SchemaRegistry::new()
//!     .with(EntityType::new("Articles", "Article").has_many("Comments"))
//!     .with(EntityType::new("Comments", "Comment"));
//! let mut mapper = NativeQueryMapper::new(Arc::new(registry), "Articles");
//!
//! let rows = vec![
//!     row([("Articles__id", SqlValue::from(1)), ("Comments__id", SqlValue::from(1))]),
//!     row([("Articles__id", SqlValue::from(1)), ("Comments__id", SqlValue::from(2))]),
//! ];
//! let articles = mapper.map_rows(&rows)?;
//! assert_eq!(articles.len(), 1);
//! assert_eq!(articles[0].many("comments").map(|c| c.len()), Some(2));
//! # Ok(())
//! # }
//! ```

use crate::config::MapperConfig;
use crate::database::RowSource;
use crate::error::{MapperError, Result};
use crate::constants::components;
use crate::logging::{log_error, log_mapping_operation};
use crate::mapping::alias_parser::AliasParser;
use crate::mapping::hydrator::RecursiveHydrator;
use crate::mapping::strategy::{MappingStrategyBuilder, MappingTree};
use crate::models::Entity;
use crate::registry::SchemaRegistry;
use crate::value::Row;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub struct NativeQueryMapper {
    registry: Arc<SchemaRegistry>,
    root_alias: String,
    config: MapperConfig,
    /// Caller-supplied strategy, used instead of alias inference
    custom_strategy: Option<Arc<MappingTree>>,
    /// Strategies built so far, keyed by the sorted alias set
    strategies: HashMap<Vec<String>, Arc<MappingTree>>,
}

impl NativeQueryMapper {
    pub fn new(registry: Arc<SchemaRegistry>, root_alias: impl Into<String>) -> Self {
        Self {
            registry,
            root_alias: root_alias.into(),
            config: MapperConfig::default(),
            custom_strategy: None,
            strategies: HashMap::new(),
        }
    }

    pub fn with_config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self.strategies.clear();
        self
    }

    /// Hydrate with `strategy` instead of inferring one from column aliases
    pub fn with_mapping_strategy(mut self, strategy: impl Into<Arc<MappingTree>>) -> Self {
        self.custom_strategy = Some(strategy.into());
        self
    }

    pub fn root_alias(&self) -> &str {
        &self.root_alias
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Sorted aliases used by the first row; empty for an empty row set
    pub fn extract_aliases(&self, rows: &[Row]) -> Result<Vec<String>> {
        match rows.first() {
            Some(first) => AliasParser::from_config(&self.config).extract_aliases(first),
            None => Ok(Vec::new()),
        }
    }

    /// Strategy for an alias set, built once and reused afterwards
    pub fn mapping_strategy(&mut self, aliases: &[String]) -> Result<Arc<MappingTree>> {
        if let Some(strategy) = &self.custom_strategy {
            return Ok(Arc::clone(strategy));
        }
        if let Some(strategy) = self.strategies.get(aliases) {
            debug!(root = %self.root_alias, aliases = ?aliases, "Reusing mapping strategy");
            return Ok(Arc::clone(strategy));
        }
        let tree = MappingStrategyBuilder::new(&self.registry, &self.config)
            .build(&self.root_alias, aliases)?;
        let tree = Arc::new(tree);
        self.strategies.insert(aliases.to_vec(), Arc::clone(&tree));
        Ok(tree)
    }

    /// Hydrate already fetched rows
    pub fn map_rows(&mut self, rows: &[Row]) -> Result<Vec<Entity>> {
        if rows.is_empty() {
            log_mapping_operation("map_rows", &self.root_alias, &[], "empty", None);
            return Ok(Vec::new());
        }
        self.map_non_empty(rows).inspect_err(|err| {
            log_error(
                components::QUERY_MAPPER,
                "map_rows",
                &err.to_string(),
                Some(&self.root_alias),
            )
        })
    }

    fn map_non_empty(&mut self, rows: &[Row]) -> Result<Vec<Entity>> {
        let aliases = if self.custom_strategy.is_some() {
            Vec::new()
        } else {
            self.extract_aliases(rows)?
        };
        let strategy = self.mapping_strategy(&aliases)?;
        if strategy.root_alias() != self.root_alias {
            return Err(MapperError::Configuration(format!(
                "Mapping strategy root '{}' does not match root alias '{}'",
                strategy.root_alias(),
                self.root_alias
            )));
        }
        RecursiveHydrator::new(&self.registry, &strategy, &self.config)?.hydrate_many(rows)
    }

    pub fn map_first(&mut self, rows: &[Row]) -> Result<Option<Entity>> {
        Ok(self.map_rows(rows)?.into_iter().next())
    }

    /// Fetch every row from `source` and hydrate them
    pub async fn all<S>(&mut self, source: &mut S) -> Result<Vec<Entity>>
    where
        S: RowSource + ?Sized,
    {
        let rows = source.fetch_all().await?;
        debug!(root = %self.root_alias, rows = rows.len(), "Fetched native query rows");
        self.map_rows(&rows)
    }

    /// First hydrated root entity, or `None` when the query returned nothing
    pub async fn first<S>(&mut self, source: &mut S) -> Result<Option<Entity>>
    where
        S: RowSource + ?Sized,
    {
        Ok(self.all(source).await?.into_iter().next())
    }

    /// [`NativeQueryMapper::all`] followed by deserialization into `T`
    pub async fn all_as<T, S>(&mut self, source: &mut S) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        S: RowSource + ?Sized,
    {
        self.all(source)
            .await?
            .iter()
            .map(|entity| entity.deserialize::<T>())
            .collect()
    }
}
