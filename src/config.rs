use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub livekit_api_key: String,
    pub livekit_api_secret: String,
    pub livekit_host: String,
    pub token_ttl_seconds: u64,
    pub room_empty_timeout_seconds: u32,
    pub room_max_participants: u32,
    pub room_service_timeout_seconds: u64,
    pub worker_identity: String,
    pub worker_queue_capacity: usize,
    pub worker_max_attempts: u32,
    pub worker_retry_base_ms: u64,
}

impl Config {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which returns the value of a variable
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: lookup("SERVER_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            livekit_api_key: required(&lookup, "LIVEKIT_API_KEY")?,
            livekit_api_secret: required(&lookup, "LIVEKIT_API_SECRET")?,
            livekit_host: required(&lookup, "LIVEKIT_HOST")?,
            token_ttl_seconds: parse_or(&lookup, "TOKEN_TTL_SECONDS", 3600)?,
            room_empty_timeout_seconds: parse_or(&lookup, "ROOM_EMPTY_TIMEOUT_SECONDS", 600)?,
            room_max_participants: parse_or(&lookup, "ROOM_MAX_PARTICIPANTS", 10)?,
            room_service_timeout_seconds: parse_or(&lookup, "ROOM_SERVICE_TIMEOUT_SECONDS", 10)?,
            worker_identity: lookup("WORKER_IDENTITY").unwrap_or_else(|| "nox".to_string()),
            worker_queue_capacity: parse_or(&lookup, "WORKER_QUEUE_CAPACITY", 64)?,
            worker_max_attempts: parse_or(&lookup, "WORKER_MAX_ATTEMPTS", 3)?,
            worker_retry_base_ms: parse_or(&lookup, "WORKER_RETRY_BASE_MS", 500)?,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Base URL for the room service HTTP API.
    ///
    /// `LIVEKIT_HOST` is commonly given as a signaling URL, so `ws://` and
    /// `wss://` are mapped to their HTTP equivalents.
    pub fn room_service_url(&self) -> String {
        let host = self.livekit_host.trim_end_matches('/');
        if let Some(rest) = host.strip_prefix("wss://") {
            format!("https://{}", rest)
        } else if let Some(rest) = host.strip_prefix("ws://") {
            format!("http://{}", rest)
        } else {
            host.to_string()
        }
    }

    /// Signaling URL used when the worker joins a room.
    pub fn signal_url(&self) -> String {
        let host = self.livekit_host.trim_end_matches('/');
        if let Some(rest) = host.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = host.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            host.to_string()
        }
    }

    pub fn room_service_timeout(&self) -> Duration {
        Duration::from_secs(self.room_service_timeout_seconds)
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server port")]
    InvalidPort,
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("{0} has an invalid value")]
    Invalid(&'static str),
}
