use eyre::Context;
use tracing::instrument;

/// Wrapper around the config values stored on disk for Git.
pub struct Config {
    inner: git2::Config,
}

impl From<git2::Config> for Config {
    fn from(config: git2::Config) -> Self {
        Config { inner: config }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Git repository config>")
    }
}

/// Trait used to make `ConfigRead::get` able to return multiple types.
pub trait GetConfigValue: Sized {
    /// Get the given type of value from the config object.
    fn get_from_config(config: &Config, key: &str) -> eyre::Result<Option<Self>>;
}

fn not_found_as_none<T>(result: Result<T, git2::Error>) -> Result<Option<T>, git2::Error> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.code() == git2::ErrorCode::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

impl GetConfigValue for bool {
    fn get_from_config(config: &Config, key: &str) -> eyre::Result<Option<Self>> {
        not_found_as_none(config.inner.get_bool(key))
            .wrap_err_with(|| format!("Looking up bool value for config key: {key:?}"))
    }
}

impl GetConfigValue for i64 {
    fn get_from_config(config: &Config, key: &str) -> eyre::Result<Option<Self>> {
        not_found_as_none(config.inner.get_i64(key))
            .wrap_err_with(|| format!("Looking up int value for config key: {key:?}"))
    }
}

/// Read-only access to Git configuration values.
pub trait ConfigRead {
    /// Get a config key of one of various possible types.
    fn get<V: GetConfigValue, S: AsRef<str>>(&self, key: S) -> eyre::Result<Option<V>>;

    /// Same as `get`, but uses a default value if the config key doesn't exist.
    fn get_or<V: GetConfigValue, S: AsRef<str>>(&self, key: S, default: V) -> eyre::Result<V> {
        let result = self.get(key)?;
        Ok(result.unwrap_or(default))
    }
}

impl ConfigRead for Config {
    #[instrument(skip_all, fields(key = key.as_ref()))]
    fn get<V: GetConfigValue, S: AsRef<str>>(&self, key: S) -> eyre::Result<Option<V>> {
        V::get_from_config(self, key.as_ref())
    }
}
