//! # Mapper Configuration
//!
//! Layered configuration for the mapper: built-in defaults, then an optional
//! file, then `NATIVE_MAPPER_*` environment variables.
//!
//! ```rust,no_run
//! use native_query_mapper::config::MapperConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MapperConfig::load()?;
//! assert_eq!(config.column_separator, "__");
//! # Ok(())
//! # }
//! ```

use crate::constants::{DEFAULT_COLUMN_SEPARATOR, ENV_PREFIX, JOIN_DATA_PROPERTY};
use crate::error::{MapperError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Where a many-to-many junction row is attached on the target entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JunctionProperty {
    /// Junction alias singularized and underscored (`ArticlesTags` -> `articles_tag`)
    Singular,
    /// The reserved join-data property
    JoinData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Separator between alias and field in column names
    pub column_separator: String,
    pub junction_property: JunctionProperty,
    /// Property name used when `junction_property` is `join_data`
    pub join_data_property: String,
    /// Convert raw values using the column types declared on each entity type
    pub convert_types: bool,
    pub log_format: LogFormat,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            column_separator: DEFAULT_COLUMN_SEPARATOR.to_string(),
            junction_property: JunctionProperty::Singular,
            join_data_property: JOIN_DATA_PROPERTY.to_string(),
            convert_types: true,
            log_format: LogFormat::Pretty,
        }
    }
}

impl MapperConfig {
    /// Load defaults overridden by `NATIVE_MAPPER_*` environment variables
    pub fn load() -> Result<Self> {
        Self::build(None)
    }

    /// Load defaults, then the given file, then environment variables
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::build(Some(path))
    }

    fn build(path: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&MapperConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);
        if let Some(path) = path {
            debug!(path = %path.display(), "Loading mapper configuration file");
            builder = builder.add_source(File::from(path).required(true));
        }
        let config: MapperConfig = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.column_separator.is_empty() {
            return Err(MapperError::Configuration(
                "column_separator must not be empty".to_string(),
            ));
        }
        if self.junction_property == JunctionProperty::JoinData
            && self.join_data_property.trim().is_empty()
        {
            return Err(MapperError::Configuration(
                "join_data_property must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_junction_property(mut self, junction_property: JunctionProperty) -> Self {
        self.junction_property = junction_property;
        self
    }

    pub fn with_convert_types(mut self, convert_types: bool) -> Self {
        self.convert_types = convert_types;
        self
    }
}
