use std::num::NonZeroU32;
use std::sync::Arc;

use crate::connection::ConnectionProvider;
use crate::error::DbError;
use crate::executor::{Param, PgExecutor, QueryExecutor, Statement};
use crate::queries;
use crate::table::Table;

/// How many products per category `top_products_per_category` returns by default.
pub const DEFAULT_TOP_PRODUCTS_LIMIT: NonZeroU32 = match NonZeroU32::new(3) {
    Some(limit) => limit,
    None => unreachable!(),
};

/// The `SalesRepository` provides the analytical queries over the sales
/// database. Every call re-runs its statement and returns the whole result;
/// nothing is cached, retried or paginated.
///
/// Failures are returned to the caller. Wrap the repository in a
/// [`LenientRepository`](crate::LenientRepository) to get empty tables instead.
pub struct SalesRepository<E = PgExecutor> {
    executor: Arc<E>,
}

impl<E> Clone for SalesRepository<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<E> std::fmt::Debug for SalesRepository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesRepository").finish_non_exhaustive()
    }
}

impl SalesRepository<PgExecutor> {
    /// Creates a repository that queries the database behind `provider`.
    pub fn connect(provider: Arc<ConnectionProvider>) -> Self {
        Self::new(Arc::new(PgExecutor::new(provider)))
    }
}

impl<E: QueryExecutor> SalesRepository<E> {
    pub fn new(executor: Arc<E>) -> Self {
        Self { executor }
    }

    /// Transactions and total revenue per country, highest revenue first.
    pub async fn sales_summary_by_country(&self) -> Result<Table, DbError> {
        self.run(Statement::new(
            "sales_summary_by_country",
            queries::SALES_SUMMARY_BY_COUNTRY,
        ))
        .await
    }

    /// The `limit` best-selling products (by quantity) of every category,
    /// ordered by category name and then quantity, descending.
    pub async fn top_products_per_category(&self, limit: NonZeroU32) -> Result<Table, DbError> {
        self.run(
            Statement::new(
                "top_products_per_category",
                queries::TOP_PRODUCTS_PER_CATEGORY,
            )
            .bind(Param::BigInt(i64::from(limit.get()))),
        )
        .await
    }

    /// Monthly revenue, previous-month revenue and month-over-month growth in percent.
    pub async fn monthly_sales_growth(&self) -> Result<Table, DbError> {
        self.run(Statement::new(
            "monthly_sales_growth",
            queries::MONTHLY_SALES_GROWTH,
        ))
        .await
    }

    /// The stored activity report for one customer, returned verbatim.
    pub async fn customer_report(&self, customer_id: i32) -> Result<Table, DbError> {
        self.run(
            Statement::new("customer_report", queries::CUSTOMER_REPORT)
                .bind(Param::Int(customer_id)),
        )
        .await
    }

    async fn run(&self, statement: Statement) -> Result<Table, DbError> {
        tracing::debug!(
            statement = statement.label,
            params = statement.params.len(),
            "Running statement."
        );
        self.executor.fetch_table(&statement).await
    }
}
