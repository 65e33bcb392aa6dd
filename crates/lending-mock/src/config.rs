//! Mock API configuration loaded via OrthoConfig.

use std::ffi::OsString;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::error::SettingsError;
use crate::query::Latency;

const DEFAULT_DATA_DIR: &str = ".lending-mock";

/// Storage location, dataset shape, and simulated latency.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LENDING_MOCK")]
pub struct MockApiSettings {
    /// Directory holding persisted state.
    pub data_dir: Option<Utf8PathBuf>,
    /// Number of users generated for a fresh store.
    #[ortho_config(default = 500)]
    pub user_count: usize,
    /// Fixed RNG seed; unset draws from entropy.
    pub seed: Option<u64>,
    /// Delay before a list resolves, in milliseconds.
    pub list_delay_ms: Option<u64>,
    /// Delay before a single lookup resolves, in milliseconds.
    pub get_delay_ms: Option<u64>,
    /// Delay before dashboard stats resolve, in milliseconds.
    pub stats_delay_ms: Option<u64>,
    /// Delay before a status update resolves, in milliseconds.
    pub update_delay_ms: Option<u64>,
}

impl MockApiSettings {
    /// Loads settings from `LENDING_MOCK_*` variables and configuration files.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Load`] if a value cannot be parsed.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from_iter([OsString::from("lending-mock")]).map_err(|err| {
            SettingsError::Load {
                message: err.to_string(),
            }
        })
    }

    /// Return the configured data directory, falling back to the default.
    #[must_use]
    pub fn data_dir(&self) -> Utf8PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATA_DIR))
    }

    /// Return the latency profile, with defaults for unset delays.
    #[must_use]
    pub fn latency(&self) -> Latency {
        let defaults = Latency::default();
        let or_default =
            |ms: Option<u64>, fallback: Duration| ms.map_or(fallback, Duration::from_millis);

        Latency {
            list: or_default(self.list_delay_ms, defaults.list),
            get: or_default(self.get_delay_ms, defaults.get),
            stats: or_default(self.stats_delay_ms, defaults.stats),
            update: or_default(self.update_delay_ms, defaults.update),
        }
    }
}
