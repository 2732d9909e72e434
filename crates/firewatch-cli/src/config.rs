//! Collector configuration – reads `~/.firewatch/config.toml`.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Persisted collector configuration.
///
/// Every field has a default so a missing file or a partial file both
/// work; env overrides are applied on top (see [`apply_env_overrides`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Base URL of the remote sensor store.
    #[serde(default = "default_store_url")]
    pub store_url: String,

    /// Seconds between polling cycles.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Directory holding `forest.json` and `scaler.json`.
    #[serde(default = "default_model_dir")]
    pub model_dir: String,

    /// TCP port for the liveness endpoint.
    #[serde(default = "default_status_port")]
    pub status_port: u16,
}

fn default_store_url() -> String {
    // Local RTDB emulator; production deployments override this.
    "http://localhost:9000".to_string()
}
fn default_poll_interval_secs() -> u64 {
    5
}
fn default_model_dir() -> String {
    "model".to_string()
}
fn default_status_port() -> u16 {
    8000
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            store_url: default_store_url(),
            poll_interval_secs: default_poll_interval_secs(),
            model_dir: default_model_dir(),
            status_port: default_status_port(),
        }
    }
}

impl CollectorConfig {
    /// Path to the forest artifact inside `model_dir`.
    pub fn forest_path(&self) -> PathBuf {
        PathBuf::from(&self.model_dir).join("forest.json")
    }

    /// Path to the scaler artifact inside `model_dir`.
    pub fn scaler_path(&self) -> PathBuf {
        PathBuf::from(&self.model_dir).join("scaler.json")
    }
}

/// Return the path to `~/.firewatch/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".firewatch").join("config.toml")
}

/// Load the config from disk with env overrides applied.
/// Returns `None` if the file does not exist.
pub fn load() -> Result<Option<CollectorConfig>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<CollectorConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: CollectorConfig =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `FIREWATCH_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `FIREWATCH_STORE_URL` | `store_url` |
/// | `FIREWATCH_POLL_INTERVAL_SECS` | `poll_interval_secs` |
/// | `FIREWATCH_MODEL_DIR` | `model_dir` |
/// | `FIREWATCH_STATUS_PORT` | `status_port` |
pub fn apply_env_overrides(cfg: &mut CollectorConfig) {
    if let Ok(v) = std::env::var("FIREWATCH_STORE_URL") {
        cfg.store_url = v;
    }
    if let Ok(v) = std::env::var("FIREWATCH_POLL_INTERVAL_SECS")
        && let Ok(secs) = v.parse::<u64>()
    {
        cfg.poll_interval_secs = secs;
    }
    if let Ok(v) = std::env::var("FIREWATCH_MODEL_DIR") {
        cfg.model_dir = v;
    }
    if let Ok(v) = std::env::var("FIREWATCH_STATUS_PORT")
        && let Ok(port) = v.parse::<u16>()
    {
        cfg.status_port = port;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = CollectorConfig::default();
        assert_eq!(cfg.poll_interval_secs, 5);
        assert_eq!(cfg.status_port, 8000);
        assert_eq!(cfg.forest_path(), PathBuf::from("model/forest.json"));
        assert_eq!(cfg.scaler_path(), PathBuf::from("model/scaler.json"));
    }

    #[test]
    fn config_path_points_to_firewatch_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".firewatch"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        let result = load_from(&path).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn partial_file_fills_remaining_fields_with_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, "store_url = \"http://store.example:9000\"\n").expect("write");

        let cfg = load_from(&path).expect("load ok").expect("some");
        assert_eq!(cfg.store_url, "http://store.example:9000");
        assert_eq!(cfg.poll_interval_secs, 5);
        assert_eq!(cfg.model_dir, "model");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, "store_url = [not toml").expect("write");

        assert!(load_from(&path).is_err());
    }

    #[test]
    fn apply_env_overrides_changes_store_url() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("FIREWATCH_STORE_URL", "http://override:9000") };
        let mut cfg = CollectorConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.store_url, "http://override:9000");
        unsafe { std::env::remove_var("FIREWATCH_STORE_URL") };
    }

    #[test]
    fn apply_env_overrides_changes_poll_interval() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("FIREWATCH_POLL_INTERVAL_SECS", "30") };
        let mut cfg = CollectorConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.poll_interval_secs, 30);
        unsafe { std::env::remove_var("FIREWATCH_POLL_INTERVAL_SECS") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_interval() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("FIREWATCH_POLL_INTERVAL_SECS", "soon") };
        let mut cfg = CollectorConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.poll_interval_secs, 5);
        unsafe { std::env::remove_var("FIREWATCH_POLL_INTERVAL_SECS") };
    }

    #[test]
    fn apply_env_overrides_changes_status_port() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("FIREWATCH_STATUS_PORT", "8181") };
        let mut cfg = CollectorConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.status_port, 8181);
        unsafe { std::env::remove_var("FIREWATCH_STATUS_PORT") };
    }
}
