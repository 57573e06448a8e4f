use std::num::NonZeroU32;

use crate::error::DbError;
use crate::executor::{PgExecutor, QueryExecutor};
use crate::repository::SalesRepository;
use crate::table::Table;

/// Collapses a failed query into an empty table, logging the failure.
pub trait EmptyOnFailure {
    fn or_empty(self, query: &str) -> Table;
}

impl EmptyOnFailure for Result<Table, DbError> {
    fn or_empty(self, query: &str) -> Table {
        self.unwrap_or_else(|e| {
            tracing::error!(query, error = %e, "Query failed; returning an empty table.");
            Table::empty()
        })
    }
}

/// Compatibility wrapper over [`SalesRepository`] for callers that expect
/// the old contract: a failed query logs the error and yields an empty
/// table, so "no data" and "query failed" look the same to the caller.
#[derive(Debug, Clone)]
pub struct LenientRepository<E = PgExecutor> {
    inner: SalesRepository<E>,
}

impl<E: QueryExecutor> LenientRepository<E> {
    pub fn new(inner: SalesRepository<E>) -> Self {
        Self { inner }
    }

    pub async fn sales_summary_by_country(&self) -> Table {
        self.inner
            .sales_summary_by_country()
            .await
            .or_empty("sales summary by country")
    }

    pub async fn top_products_per_category(&self, limit: NonZeroU32) -> Table {
        self.inner
            .top_products_per_category(limit)
            .await
            .or_empty("top products per category")
    }

    pub async fn monthly_sales_growth(&self) -> Table {
        self.inner
            .monthly_sales_growth()
            .await
            .or_empty("monthly sales growth")
    }

    pub async fn customer_report(&self, customer_id: i32) -> Table {
        self.inner
            .customer_report(customer_id)
            .await
            .or_empty("customer report")
    }
}

impl<E: QueryExecutor> From<SalesRepository<E>> for LenientRepository<E> {
    fn from(inner: SalesRepository<E>) -> Self {
        Self::new(inner)
    }
}
