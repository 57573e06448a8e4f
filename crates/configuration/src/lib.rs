use crate::error::ConfigError;
use crate::settings::{DEFAULT_HOST, DEFAULT_PORT, RawDbSettings};

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;
pub mod telemetry;

// Re-export the core types to provide a clean public API.
pub use settings::DbSettings;
pub use telemetry::init_tracing;

/// Prefix shared by every connection variable (`DB_USER`, `DB_PASSWORD`, ...).
pub const ENV_PREFIX: &str = "DB";

/// Loads the database settings from the process environment.
///
/// Reads `DB_USER`, `DB_PASSWORD`, `DB_HOST` (default `localhost`),
/// `DB_PORT` (default `5432`), `DB_NAME`, plus the optional pool knobs
/// `DB_MAX_CONNECTIONS` and `DB_ACQUIRE_TIMEOUT_SECS`.
pub fn load_db_settings() -> Result<DbSettings, ConfigError> {
    build(config::Environment::with_prefix(ENV_PREFIX))
}

/// Same as [`load_db_settings`], but reads the variables from `vars`
/// instead of the process environment.
pub fn load_db_settings_from<I, K, V>(vars: I) -> Result<DbSettings, ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut map = config::Map::new();
    for (key, value) in vars {
        map.insert(key.into(), value.into());
    }
    build(config::Environment::with_prefix(ENV_PREFIX).source(Some(map)))
}

fn build(environment: config::Environment) -> Result<DbSettings, ConfigError> {
    let builder = config::Config::builder()
        .set_default("host", DEFAULT_HOST)?
        .set_default("port", DEFAULT_PORT.to_string())?
        .add_source(environment)
        .build()?;

    // Attempt to deserialize the raw strings, then validate them into `DbSettings`.
    let raw = builder.try_deserialize::<RawDbSettings>()?;
    DbSettings::try_from(raw)
}
