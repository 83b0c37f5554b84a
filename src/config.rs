use std::{env, path::PathBuf, str::FromStr, time::Duration};
use thiserror::Error;

/// Steps exchanged for a single treat.
pub const STEPS_PER_TREAT: u64 = 100;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/ledger.json";
pub const DEFAULT_DEVICE_URL: &str = "http://192.168.4.1";
pub const DEFAULT_FITNESS_API_BASE: &str = "https://www.googleapis.com/fitness/v1";
pub const DEFAULT_HUNGER_POLL_MS: u64 = 5_000;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// When the ledger checks for a new calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RolloverPolicy {
    /// Only once, when the ledger is loaded at startup.
    OnLoad,
    /// At startup and before every step refresh.
    #[default]
    OnRefresh,
}

impl RolloverPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnLoad => "load",
            Self::OnRefresh => "refresh",
        }
    }
}

impl FromStr for RolloverPolicy {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "load" => Ok(Self::OnLoad),
            "refresh" => Ok(Self::OnRefresh),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub device_url: String,
    pub fitness_api_base: String,
    pub fitness_access_token: Option<String>,
    /// `None` disables the hunger poller.
    pub hunger_poll_interval: Option<Duration>,
    pub rollover_policy: RolloverPolicy,
    pub http_timeout: Duration,
    pub steps_per_treat: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            device_url: DEFAULT_DEVICE_URL.to_string(),
            fitness_api_base: DEFAULT_FITNESS_API_BASE.to_string(),
            fitness_access_token: None,
            hunger_poll_interval: Some(Duration::from_millis(DEFAULT_HUNGER_POLL_MS)),
            rollover_policy: RolloverPolicy::default(),
            http_timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
            steps_per_treat: STEPS_PER_TREAT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(value) = get("PORT") {
            config.port = parse("PORT", &value)?;
        }
        if let Some(value) = get("APP_DATA_PATH") {
            config.data_path = PathBuf::from(value);
        }
        if let Some(value) = get("DEVICE_URL") {
            config.device_url = value.trim_end_matches('/').to_string();
        }
        if let Some(value) = get("FITNESS_API_BASE") {
            config.fitness_api_base = value.trim_end_matches('/').to_string();
        }
        config.fitness_access_token = get("FITNESS_ACCESS_TOKEN");
        if let Some(value) = get("HUNGER_POLL_MS") {
            let millis: u64 = parse("HUNGER_POLL_MS", &value)?;
            config.hunger_poll_interval = (millis > 0).then(|| Duration::from_millis(millis));
        }
        if let Some(value) = get("ROLLOVER_POLICY") {
            config.rollover_policy = value.parse().map_err(|_| ConfigError::Invalid {
                name: "ROLLOVER_POLICY",
                value: value.clone(),
            })?;
        }
        if let Some(value) = get("HTTP_TIMEOUT_MS") {
            config.http_timeout = Duration::from_millis(parse("HTTP_TIMEOUT_MS", &value)?);
        }

        Ok(config)
    }
}

fn parse<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_path, PathBuf::from("data/ledger.json"));
        assert_eq!(config.rollover_policy, RolloverPolicy::OnRefresh);
        assert_eq!(config.steps_per_treat, STEPS_PER_TREAT);
        assert!(config.fitness_access_token.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("DEVICE_URL", "http://10.0.0.7/"),
            ("HUNGER_POLL_MS", "0"),
            ("ROLLOVER_POLICY", "LOAD"),
            ("FITNESS_ACCESS_TOKEN", "abc"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.device_url, "http://10.0.0.7");
        assert!(config.hunger_poll_interval.is_none());
        assert_eq!(config.rollover_policy, RolloverPolicy::OnLoad);
        assert_eq!(config.fitness_access_token.as_deref(), Some("abc"));
    }

    #[test]
    fn rejects_bad_port() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
