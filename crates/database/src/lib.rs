//! # Sales Insights Database Crate
//!
//! This crate is the application's interface to the PostgreSQL sales
//! database. It hides the SQL and driver details behind a small query API.
//!
//! ## Architectural Principles
//!
//! - **One shared handle:** `ConnectionProvider` lazily builds a single
//!   `PgPool` on first use and hands the same pool out afterwards.
//! - **Scoped connections:** every query acquires a pooled connection for
//!   its own duration only; it is returned to the pool on drop.
//! - **Bound parameters only:** caller values never become part of the SQL text.
//! - **Errors are values:** `SalesRepository` returns `Result`; the
//!   `LenientRepository` adapter offers the log-and-return-empty behaviour
//!   for callers that want it.
//!
//! ## Public API
//!
//! - `ConnectionProvider`: owns the shared handle.
//! - `SalesRepository`: the four analytical queries.
//! - `LenientRepository` / `EmptyOnFailure`: the empty-on-failure adapter.
//! - `QueryExecutor`, `Statement`, `Param`: the execution seam (live or stub).
//! - `Table`, `Value`: materialized results.
//! - `Category`, `Country`, `City`, `Customer`, `Employee`, `Product`, `Sale`:
//!   typed rows of the schema (from `core-types`), for `sqlx::query_as`.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod executor;
pub mod lenient;
pub mod queries;
pub mod repository;
pub mod table;

// Re-export the key components to create a clean, public-facing API.
pub use connection::ConnectionProvider;
pub use error::DbError;
pub use executor::{Param, PgExecutor, QueryExecutor, Statement};
pub use lenient::{EmptyOnFailure, LenientRepository};
pub use repository::{DEFAULT_TOP_PRODUCTS_LIMIT, SalesRepository};
pub use table::{Table, Value};

pub use core_types::{Category, City, Country, Customer, Employee, PersonName, Product, Sale};
