//! # Native Statements
//!
//! Hand-written SQL with `:name` placeholders and the values bound to them.
//! PostgreSQL only understands positional `$n` parameters, so the statement
//! is rewritten right before execution.

use crate::database::placeholders::{BindTarget, ParamType};
use crate::constants::components;
use crate::error::{MapperError, Result};
use crate::logging::log_error;
use crate::value::{ColumnType, SqlValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A value bound to a named placeholder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundParam {
    pub value: SqlValue,
    pub param_type: ParamType,
}

impl BoundParam {
    /// The value coerced to its parameter type; values that do not convert are kept
    pub fn coerced(&self) -> SqlValue {
        let column_type = match self.param_type {
            ParamType::Int => ColumnType::Integer,
            ParamType::Bool => ColumnType::Boolean,
            ParamType::Str => ColumnType::String,
            ParamType::Named(_) => return self.value.clone(),
        };
        self.value.clone().convert(column_type)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeStatement {
    sql: String,
    params: IndexMap<String, BoundParam>,
}

impl NativeStatement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: IndexMap::new(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &IndexMap<String, BoundParam> {
        &self.params
    }

    /// Bind `value` under `name`, inferring its parameter type
    pub fn bind(&mut self, name: &str, value: impl Into<SqlValue>) -> Result<&mut Self> {
        let value = value.into();
        let param_type = ParamType::infer(&value);
        self.bind_value(name, &value, &param_type)?;
        Ok(self)
    }

    /// SQL with `$n` parameters plus the values in positional order.
    ///
    /// `::` casts and text inside quotes are left alone; a name used twice
    /// reuses its position.
    pub fn to_positional(&self) -> Result<(String, Vec<BoundParam>)> {
        let mut sql = String::with_capacity(self.sql.len());
        let mut order: IndexMap<&str, usize> = IndexMap::new();
        let mut quote: Option<char> = None;
        let mut chars = self.sql.char_indices().peekable();

        while let Some((at, c)) = chars.next() {
            if let Some(open) = quote {
                sql.push(c);
                if c == open {
                    quote = None;
                }
                continue;
            }
            match c {
                '\'' | '"' => {
                    quote = Some(c);
                    sql.push(c);
                }
                ':' => match chars.peek() {
                    Some(&(_, ':')) => {
                        sql.push_str("::");
                        chars.next();
                    }
                    Some(&(_, next)) if next.is_ascii_alphabetic() || next == '_' => {
                        let start = at + 1;
                        let mut end = start;
                        while let Some(&(i, n)) = chars.peek() {
                            if n.is_ascii_alphanumeric() || n == '_' {
                                end = i + n.len_utf8();
                                chars.next();
                            } else {
                                break;
                            }
                        }
                        let name = &self.sql[start..end];
                        if !self.params.contains_key(name) {
                            let message = format!("No value bound for placeholder ':{name}'");
                            log_error(components::STATEMENT, "to_positional", &message, None);
                            return Err(MapperError::InvalidArgument(message));
                        }
                        let next_position = order.len() + 1;
                        let position = *order.entry(name).or_insert(next_position);
                        sql.push('$');
                        sql.push_str(&position.to_string());
                    }
                    _ => sql.push(c),
                },
                _ => sql.push(c),
            }
        }

        let params = order
            .keys()
            .filter_map(|name| self.params.get(*name).cloned())
            .collect();
        debug!(placeholders = order.len(), "Rewrote named placeholders");
        Ok((sql, params))
    }
}

impl BindTarget for NativeStatement {
    fn bind_value(&mut self, name: &str, value: &SqlValue, param_type: &ParamType) -> Result<()> {
        let valid = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(MapperError::InvalidArgument(format!(
                "Invalid placeholder name '{name}'"
            )));
        }
        self.params.insert(
            name.to_string(),
            BoundParam {
                value: value.clone(),
                param_type: param_type.clone(),
            },
        );
        Ok(())
    }
}

#[cfg(feature = "postgres")]
pub(crate) mod pg {
    use super::BoundParam;
    use crate::database::placeholders::ParamType;
    use crate::value::SqlValue;
    use sqlx::postgres::{PgArguments, Postgres};
    use sqlx::query::Query;

    /// Attach one coerced value; nulls are typed after the declared parameter type
    pub(crate) fn bind_param<'q>(
        query: Query<'q, Postgres, PgArguments>,
        param: &BoundParam,
    ) -> Query<'q, Postgres, PgArguments> {
        match param.coerced() {
            SqlValue::Null => match param.param_type {
                ParamType::Int => query.bind(None::<i64>),
                ParamType::Bool => query.bind(None::<bool>),
                _ => query.bind(None::<String>),
            },
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Int(v) => query.bind(v),
            SqlValue::Float(v) => query.bind(v),
            SqlValue::Text(v) => query.bind(v),
            SqlValue::Timestamp(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::Uuid(v) => query.bind(v),
            SqlValue::Json(v) => query.bind(sqlx::types::Json(v)),
        }
    }
}
