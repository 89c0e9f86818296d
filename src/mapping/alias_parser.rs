//! # Alias Parser
//!
//! Splits `{Alias}__{field}` result columns into per-alias field maps.

use crate::config::MapperConfig;
use crate::constants::DEFAULT_COLUMN_SEPARATOR;
use crate::error::{MapperError, Result};
use crate::value::{FieldMap, Row};
use indexmap::{IndexMap, IndexSet};

/// One result row grouped by alias: alias -> (field -> value)
pub type ParsedRow = IndexMap<String, FieldMap>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasParser {
    separator: String,
}

impl Default for AliasParser {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMN_SEPARATOR)
    }
}

impl AliasParser {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    pub fn from_config(config: &MapperConfig) -> Self {
        Self::new(config.column_separator.clone())
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Split a column on the first separator occurrence into `(alias, field)`
    pub fn split_column<'c>(&self, column: &'c str) -> Result<(&'c str, &'c str)> {
        let Some((alias, field)) = column.split_once(self.separator.as_str()) else {
            return Err(MapperError::MalformedColumn {
                column: column.to_string(),
                message: format!(
                    "Column '{column}' must use an alias in the format {{Alias}}{}{column}",
                    self.separator
                ),
            });
        };
        if alias.is_empty() || field.is_empty() {
            return Err(MapperError::MalformedColumn {
                column: column.to_string(),
                message: format!(
                    "Alias '{column}' is invalid. \
                     Column alias must use {{Alias}}{}{{column_name}} format",
                    self.separator
                ),
            });
        }
        Ok((alias, field))
    }

    pub fn parse_row(&self, row: &Row) -> Result<ParsedRow> {
        let mut parsed = ParsedRow::new();
        for (column, value) in row {
            let (alias, field) = self.split_column(column)?;
            parsed
                .entry(alias.to_string())
                .or_default()
                .insert(field.to_string(), value.clone());
        }
        Ok(parsed)
    }

    /// Parse every row; the first malformed column aborts the whole batch
    pub fn parse_rows(&self, rows: &[Row]) -> Result<Vec<ParsedRow>> {
        rows.iter().map(|row| self.parse_row(row)).collect()
    }

    /// Sorted, de-duplicated aliases used by the columns of `row`
    pub fn extract_aliases(&self, row: &Row) -> Result<Vec<String>> {
        let mut aliases = IndexSet::new();
        for column in row.keys() {
            let (alias, _) = self.split_column(column)?;
            aliases.insert(alias.to_string());
        }
        let mut aliases: Vec<String> = aliases.into_iter().collect();
        aliases.sort();
        Ok(aliases)
    }
}
