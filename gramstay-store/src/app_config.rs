use serde::Deserialize;
use std::env;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub storage: StorageConfig,
    pub events: EventsConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StorageConfig {
    /// Directory holding one JSON file per persisted key
    pub dir: String,
    pub namespace: String,
    #[serde(default)]
    pub quota_bytes: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EventsConfig {
    pub channel_capacity: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LogConfig {
    pub filter: String,
}

const DEFAULT_DIR: &str = "data";
const DEFAULT_NAMESPACE: &str = "gramstay";
const DEFAULT_CHANNEL_CAPACITY: usize = 64;
const DEFAULT_LOG_FILTER: &str =
    "warn,gramstay=info,gramstay_store=info,gramstay_saved=info,gramstay_booking=info,gramstay_review=info";

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                dir: DEFAULT_DIR.to_string(),
                namespace: DEFAULT_NAMESPACE.to_string(),
                quota_bytes: None,
            },
            events: EventsConfig {
                channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            },
            log: LogConfig {
                filter: DEFAULT_LOG_FILTER.to_string(),
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Self::load_from(Path::new("config"), &run_mode)
    }

    /// Layered load: built-in defaults, `default`, `{run_mode}`, `local`, then `GRAMSTAY__*` env.
    pub fn load_from(config_dir: &Path, run_mode: &str) -> Result<Self, config::ConfigError> {
        let file = |name: &str| {
            config::File::with_name(&config_dir.join(name).to_string_lossy()).required(false)
        };

        let s = config::Config::builder()
            .set_default("storage.dir", DEFAULT_DIR)?
            .set_default("storage.namespace", DEFAULT_NAMESPACE)?
            .set_default("events.channel_capacity", DEFAULT_CHANNEL_CAPACITY as i64)?
            .set_default("log.filter", DEFAULT_LOG_FILTER)?
            .add_source(file("default"))
            .add_source(file(run_mode))
            // Not checked in
            .add_source(file("local"))
            // Eg.. `GRAMSTAY__STORAGE__DIR=/var/lib/gramstay`
            .add_source(config::Environment::with_prefix("GRAMSTAY").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
