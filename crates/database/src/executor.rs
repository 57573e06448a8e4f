use async_trait::async_trait;
use sqlx::{Executor, Row, Statement as _};
use std::sync::Arc;

use crate::connection::ConnectionProvider;
use crate::error::DbError;
use crate::table::Table;

/// A value bound to a `$n` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Bound as `INT4`.
    Int(i32),
    /// Bound as `INT8`.
    BigInt(i64),
}

/// A SQL statement plus its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Short name used in logs.
    pub label: &'static str,
    pub sql: &'static str,
    pub params: Vec<Param>,
}

impl Statement {
    pub fn new(label: &'static str, sql: &'static str) -> Self {
        Self {
            label,
            sql,
            params: Vec::new(),
        }
    }

    /// Appends a parameter; the first call binds `$1`, the second `$2`, and so on.
    pub fn bind(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }
}

/// Runs a statement and materializes the full result.
///
/// This is the seam between the repository and the live database, so the
/// underlying implementation (live or stub) can be swapped out.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn fetch_table(&self, statement: &Statement) -> Result<Table, DbError>;
}

/// Executes statements against PostgreSQL through the shared handle.
#[derive(Debug, Clone)]
pub struct PgExecutor {
    provider: Arc<ConnectionProvider>,
}

impl PgExecutor {
    pub fn new(provider: Arc<ConnectionProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn fetch_table(&self, statement: &Statement) -> Result<Table, DbError> {
        let pool = self.provider.get_handle().await?;

        // The connection goes back to the pool when `conn` drops, on every path.
        let mut conn = pool.acquire().await?;

        let mut query = sqlx::query(statement.sql);
        for param in &statement.params {
            query = match param {
                Param::Int(v) => query.bind(*v),
                Param::BigInt(v) => query.bind(*v),
            };
        }

        let rows = query.fetch_all(&mut *conn).await?;
        let table = match rows.first() {
            Some(first) => Table::from_pg_rows(first.columns(), &rows)?,
            // No row carries the column metadata; the prepared statement does.
            None => {
                let prepared = (&mut *conn).prepare(statement.sql).await?;
                Table::from_pg_rows(prepared.columns(), &rows)?
            }
        };

        tracing::debug!(
            statement = statement.label,
            rows = table.len(),
            "Statement executed."
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;
    use rstest::rstest;

    /// Answers every statement with a one-row table naming the statement.
    struct EchoExecutor;

    #[async_trait]
    impl QueryExecutor for EchoExecutor {
        async fn fetch_table(&self, statement: &Statement) -> Result<Table, DbError> {
            Table::new(
                vec!["label".to_string(), "params".to_string()],
                vec![vec![
                    statement.label.into(),
                    Value::Int(statement.params.len() as i64),
                ]],
            )
        }
    }

    #[rstest]
    fn test_bind_keeps_placeholder_order() {
        let statement = Statement::new("range", "SELECT $1, $2")
            .bind(Param::BigInt(3))
            .bind(Param::Int(7));

        assert_eq!(statement.params, vec![Param::BigInt(3), Param::Int(7)]);
    }

    #[tokio::test]
    async fn test_executor_is_usable_as_trait_object() {
        let executor: Arc<dyn QueryExecutor> = Arc::new(EchoExecutor);
        let statement = Statement::new("customer_report", "SELECT $1").bind(Param::Int(1));

        let table = executor.fetch_table(&statement).await.unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.value(0, "label"), Some(&Value::Text("customer_report".to_string())));
        assert_eq!(table.value(0, "params"), Some(&Value::Int(1)));
    }
}
