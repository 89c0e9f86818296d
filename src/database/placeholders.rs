//! # IN() Placeholders
//!
//! Named placeholder lists for SQL `IN (...)` clauses.
//!
//! ```rust
//! use native_query_mapper::database::{InPlaceholders, NativeStatement};
//!
//! # fn main() -> native_query_mapper::Result<()> {
//! let statuses = InPlaceholders::new("status", [1, 5, 9])?;
//! let mut stmt = NativeStatement::new(format!(
//!     r#"SELECT email AS "Users__email" FROM users WHERE status_id IN ({statuses})"#
//! ));
//! statuses.bind(&mut stmt)?;
//! assert!(stmt.sql().ends_with("IN (:status_0, :status_1, :status_2)"));
//! # Ok(())
//! # }
//! ```

use crate::error::{MapperError, Result};
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Parameter type a value is bound with
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Int,
    Bool,
    Str,
    /// A driver-specific type name, passed through untouched
    Named(String),
}

impl ParamType {
    /// Type inferred from a single value: integer, boolean, else string
    pub fn infer(value: &SqlValue) -> Self {
        match value {
            SqlValue::Int(_) => ParamType::Int,
            SqlValue::Bool(_) => ParamType::Bool,
            _ => ParamType::Str,
        }
    }
}

/// Anything named parameters can be bound to
pub trait BindTarget {
    fn bind_value(&mut self, name: &str, value: &SqlValue, param_type: &ParamType) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct InPlaceholders {
    prefix: String,
    values: Vec<SqlValue>,
    explicit_type: Option<ParamType>,
    inferred_type: OnceLock<ParamType>,
}

impl InPlaceholders {
    pub fn new<I, V>(prefix: impl Into<String>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(MapperError::InvalidArgument(
                "IN() placeholders cannot be constructed with an empty prefix".to_string(),
            ));
        }
        let values: Vec<SqlValue> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(MapperError::InvalidArgument(
                "IN() placeholders cannot be constructed with an empty value list".to_string(),
            ));
        }
        Ok(Self {
            prefix,
            values,
            explicit_type: None,
            inferred_type: OnceLock::new(),
        })
    }

    /// Bind every value with `param_type` instead of inferring one
    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.explicit_type = Some(param_type);
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Placeholder name for `index`, without the leading colon
    pub fn name(&self, index: usize) -> String {
        format!("{}_{index}", self.prefix)
    }

    /// Explicit type, or the one inferred once from the first value
    pub fn param_type(&self) -> &ParamType {
        match &self.explicit_type {
            Some(param_type) => param_type,
            None => self
                .inferred_type
                .get_or_init(|| ParamType::infer(&self.values[0])),
        }
    }

    /// `:{prefix}_0, :{prefix}_1, ...`
    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn bind<T: BindTarget + ?Sized>(&self, target: &mut T) -> Result<()> {
        let param_type = self.param_type();
        for (index, value) in self.values.iter().enumerate() {
            target.bind_value(&self.name(index), value, param_type)?;
        }
        Ok(())
    }
}

impl fmt::Display for InPlaceholders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..self.values.len() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, ":{}", self.name(index))?;
        }
        Ok(())
    }
}
