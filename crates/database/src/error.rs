use configuration::error::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection is not configured: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Invalid database connection string: {0}")]
    InvalidConnectionString(String),

    #[error("Failed to execute query: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Failed to decode column '{column}' of type {type_name}: {message}")]
    Decode {
        column: String,
        type_name: String,
        message: String,
    },

    #[error("Row {row} has {found} values but the table has {expected} columns")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}
