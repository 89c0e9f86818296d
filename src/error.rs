//! Error types for native query mapping.
//!

use thiserror::Error;

/// Why an alias could not be placed in the mapping strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownAliasReason {
    /// The result set carried no aliased columns at all
    EmptyAliasSet,
    /// None of the columns belong to the root table
    MissingRootAlias,
    /// The alias is not reachable from the root table through any relationship
    Unreachable,
    /// Aliases remained after scanning the root table's own associations
    NoRootAssociation,
    /// Aliases remained after scanning every resolved table
    NoAssociation,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapperError {
    /// A column name does not follow the `{Alias}__{field}` convention
    #[error("{message}")]
    MalformedColumn { column: String, message: String },

    #[error("{}", unknown_alias_message(.reason, .root, .aliases))]
    UnknownAlias {
        reason: UnknownAliasReason,
        root: String,
        aliases: Vec<String>,
    },

    /// An identity column required for de-duplication is absent from the row
    #[error("{}", missing_column_message(.alias, .columns))]
    MissingColumn { alias: String, columns: Vec<String> },

    #[error("Failed to construct root entity '{alias}': every selected column is NULL")]
    EmptyRootEntity { alias: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl MapperError {
    pub fn unknown_alias(
        reason: UnknownAliasReason,
        root: impl Into<String>,
        aliases: Vec<String>,
    ) -> Self {
        MapperError::UnknownAlias {
            reason,
            root: root.into(),
            aliases,
        }
    }

    /// Alias names carried by an [`MapperError::UnknownAlias`], empty for other variants
    pub fn aliases(&self) -> &[String] {
        match self {
            MapperError::UnknownAlias { aliases, .. } => aliases,
            _ => &[],
        }
    }
}

fn unknown_alias_message(reason: &UnknownAliasReason, root: &str, aliases: &[String]) -> String {
    let listed = aliases.join("', '");
    match reason {
        UnknownAliasReason::EmptyAliasSet => {
            "Every column of the query must use aliases".to_string()
        }
        UnknownAliasReason::MissingRootAlias => format!(
            "The query must select at least one column from the root table. \
             The column alias must use {root}__{{column_name}} format"
        ),
        UnknownAliasReason::Unreachable => {
            format!("SQL alias '{listed}' does not match any reachable table from '{root}'")
        }
        UnknownAliasReason::NoRootAssociation => {
            format!("None of the root table associations match alias '{listed}'")
        }
        UnknownAliasReason::NoAssociation => {
            format!("None of the table associations match alias '{listed}'")
        }
    }
}

fn missing_column_message(alias: &str, columns: &[String]) -> String {
    let joined = columns.join(&format!("', '{alias}__"));
    format!("'{alias}__{joined}' column must be present in the query's SELECT clause")
}

impl From<serde_json::Error> for MapperError {
    fn from(error: serde_json::Error) -> Self {
        MapperError::Serialization(error.to_string())
    }
}

impl From<sqlx::Error> for MapperError {
    fn from(err: sqlx::Error) -> Self {
        MapperError::Database(err.to_string())
    }
}

impl From<config::ConfigError> for MapperError {
    fn from(err: config::ConfigError) -> Self {
        MapperError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MapperError>;
