//! Runtime configuration.
//!
//! Values are layered with [`figment`]: built-in defaults, then an optional
//! `.turnstile.toml` in the working directory, then `TURNSTILE_*`
//! environment variables, then command-line overrides.

use std::time::Duration;

use camino::Utf8Path;
use cli_defs::{ConfigArgs, DEFAULT_DATA_DIR, DEFAULT_VERIFY_DELAY_MS};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".turnstile.toml";
/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "TURNSTILE_";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer held a value of the wrong shape.
    #[error("failed to load configuration")]
    Load(#[from] Box<figment::Error>),
}

/// Resolved runtime configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding the persisted store.
    pub data_dir: String,
    /// Simulated verification latency in milliseconds.
    pub verify_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_owned(),
            verify_delay_ms: DEFAULT_VERIFY_DELAY_MS,
        }
    }
}

impl AppConfig {
    /// Provider stack for `overrides`, lowest precedence first.
    #[must_use]
    pub fn figment(overrides: &ConfigArgs) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides))
    }

    /// Load the layered configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if any layer holds an invalid value.
    pub fn load(overrides: &ConfigArgs) -> Result<Self, ConfigError> {
        Self::figment(overrides)
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Store directory.
    #[must_use]
    pub fn data_dir(&self) -> &Utf8Path { Utf8Path::new(&self.data_dir) }

    /// Simulated verification latency.
    #[must_use]
    pub const fn verify_delay(&self) -> Duration { Duration::from_millis(self.verify_delay_ms) }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "test assertions")]

    use figment::Jail;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn defaults_apply_without_layers() {
        Jail::expect_with(|_j| {
            let cfg = AppConfig::load(&ConfigArgs::default()).expect("load");
            assert_eq!(cfg, AppConfig::default());
            assert_eq!(cfg.verify_delay(), Duration::from_millis(900));
            Ok(())
        });
    }

    #[rstest]
    fn loads_from_dotfile() {
        Jail::expect_with(|j| {
            j.create_file(CONFIG_FILE, "data_dir = \"from-file\"\nverify_delay_ms = 10")?;
            let cfg = AppConfig::load(&ConfigArgs::default()).expect("load");
            assert_eq!(cfg.data_dir, "from-file");
            assert_eq!(cfg.verify_delay_ms, 10);
            Ok(())
        });
    }

    #[rstest]
    fn env_overrides_file() {
        Jail::expect_with(|j| {
            j.create_file(CONFIG_FILE, "data_dir = \"from-file\"")?;
            j.set_env("TURNSTILE_DATA_DIR", "from-env");
            let cfg = AppConfig::load(&ConfigArgs::default()).expect("load");
            assert_eq!(cfg.data_dir(), Utf8Path::new("from-env"));
            Ok(())
        });
    }

    #[rstest]
    fn cli_overrides_env() {
        Jail::expect_with(|j| {
            j.set_env("TURNSTILE_VERIFY_DELAY_MS", "50");
            let args = ConfigArgs {
                data_dir: None,
                verify_delay_ms: Some(0),
            };
            let cfg = AppConfig::load(&args).expect("load");
            assert_eq!(cfg.verify_delay_ms, 0);
            assert_eq!(cfg.data_dir, DEFAULT_DATA_DIR);
            Ok(())
        });
    }

    #[rstest]
    fn malformed_value_is_an_error() {
        Jail::expect_with(|j| {
            j.set_env("TURNSTILE_VERIFY_DELAY_MS", "soon");
            assert!(matches!(
                AppConfig::load(&ConfigArgs::default()),
                Err(ConfigError::Load(_))
            ));
            Ok(())
        });
    }
}
