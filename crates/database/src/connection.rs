use crate::error::DbError;
use configuration::DbSettings;
use configuration::error::ConfigError;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::fmt;
use tokio::sync::OnceCell;

type SettingsLoader = dyn Fn() -> Result<DbSettings, ConfigError> + Send + Sync;

/// Owns the single shared database handle (a `PgPool`).
///
/// The handle is created on the first call to [`ConnectionProvider::get_handle`]
/// and reused afterwards. Settings are only read at that point, so a provider
/// can be built before the environment is complete. Concurrent first calls
/// are serialized by the `OnceCell`: exactly one pool is ever built. A failed
/// initialization caches nothing and the next call tries again.
pub struct ConnectionProvider {
    loader: Box<SettingsLoader>,
    handle: OnceCell<PgPool>,
}

impl ConnectionProvider {
    /// A provider that reads the `DB_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::with_loader(configuration::load_db_settings)
    }

    /// A provider that obtains its settings from `loader` on first use.
    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn() -> Result<DbSettings, ConfigError> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            handle: OnceCell::new(),
        }
    }

    /// Returns the shared handle, creating it on first use.
    pub async fn get_handle(&self) -> Result<&PgPool, DbError> {
        self.handle
            .get_or_try_init(|| async {
                let settings = (self.loader)()?;
                build_pool(&settings)
            })
            .await
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.initialized()
    }
}

impl fmt::Debug for ConnectionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProvider")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

/// Builds the pool from the connection string.
///
/// The pool connects lazily: no connection is opened until the first query
/// acquires one, so this never touches the network.
fn build_pool(settings: &DbSettings) -> Result<PgPool, DbError> {
    let options = settings
        .connection_url()
        .parse::<PgConnectOptions>()
        .map_err(|e| DbError::InvalidConnectionString(e.to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect_lazy_with(options);

    tracing::info!(
        url = %settings.redacted_url(),
        max_connections = settings.max_connections,
        "Created the shared database handle."
    );

    Ok(pool)
}
