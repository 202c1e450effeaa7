//! Application-level configuration loading, including room lifecycle policies.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "QUIZ_ARENA_BACK_CONFIG_PATH";

/// Default number of questions drawn from the bank when a room starts.
const DEFAULT_QUESTIONS_PER_ROOM: usize = 20;
/// Default grace period before finished or abandoned rooms are evicted.
const DEFAULT_ROOM_GRACE_SECS: u64 = 300;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Upper bound on the number of questions bound to a room at start.
    pub questions_per_room: usize,
    /// Whether players may join a room that is already in progress.
    pub allow_late_join: bool,
    /// How long finished or empty rooms linger before eviction.
    pub room_grace: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        questions_per_room = config.questions_per_room,
                        allow_late_join = config.allow_late_join,
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            questions_per_room: DEFAULT_QUESTIONS_PER_ROOM,
            allow_late_join: true,
            room_grace: Duration::from_secs(DEFAULT_ROOM_GRACE_SECS),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    questions_per_room: Option<usize>,
    allow_late_join: Option<bool>,
    room_grace_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            // A zero cap would make every start fail; treat it as absent.
            questions_per_room: value
                .questions_per_room
                .filter(|count| *count > 0)
                .unwrap_or(defaults.questions_per_room),
            allow_late_join: value.allow_late_join.unwrap_or(defaults.allow_late_join),
            room_grace: value
                .room_grace_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.room_grace),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
