//! # Row Sources
//!
//! Where raw result rows come from. Fetching completes before hydration
//! starts; the hydrator itself never touches the database.

use crate::error::Result;
use crate::value::Row;
use async_trait::async_trait;

#[cfg(feature = "postgres")]
use crate::database::statement::{pg::bind_param, NativeStatement};
#[cfg(feature = "postgres")]
use sqlx::PgPool;
#[cfg(feature = "postgres")]
use tracing::debug;

/// Produces a fully materialized row set
#[async_trait]
pub trait RowSource: Send {
    async fn fetch_all(&mut self) -> Result<Vec<Row>>;
}

/// Rows that were fetched elsewhere
#[async_trait]
impl RowSource for Vec<Row> {
    async fn fetch_all(&mut self) -> Result<Vec<Row>> {
        Ok(self.clone())
    }
}

/// Executes a [`NativeStatement`] against a PostgreSQL pool
#[cfg(feature = "postgres")]
#[derive(Debug, Clone)]
pub struct PgRowSource {
    pool: PgPool,
    statement: NativeStatement,
}

#[cfg(feature = "postgres")]
impl PgRowSource {
    pub fn new(pool: PgPool, statement: NativeStatement) -> Self {
        Self { pool, statement }
    }

    pub fn statement(&self) -> &NativeStatement {
        &self.statement
    }

    pub fn statement_mut(&mut self) -> &mut NativeStatement {
        &mut self.statement
    }
}

#[cfg(feature = "postgres")]
#[async_trait]
impl RowSource for PgRowSource {
    async fn fetch_all(&mut self) -> Result<Vec<Row>> {
        let (sql, params) = self.statement.to_positional()?;
        let mut query = sqlx::query(&sql);
        for param in &params {
            query = bind_param(query, param);
        }
        let rows = query.fetch_all(&self.pool).await?;
        debug!(rows = rows.len(), params = params.len(), "Executed native statement");
        rows.iter()
            .map(crate::database::row_conversion::pg_row_to_row)
            .collect()
    }
}
