use crate::relay::GeminiSettings;
use crate::storage::resolve_data_path;
use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 30;
// Must exceed the generation timeout.
const DEFAULT_RELAY_TIMEOUT_SECS: u64 = 35;
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub relay_url: String,
    pub relay_timeout: Duration,
    pub gemini: GeminiSettings,
}

impl Config {
    pub fn from_env() -> Self {
        let port = parsed_var("PORT").unwrap_or(DEFAULT_PORT);

        Self {
            port,
            data_path: resolve_data_path(),
            relay_url: non_empty_var("RELAY_URL")
                .unwrap_or_else(|| format!("http://127.0.0.1:{port}/ai-response")),
            relay_timeout: timeout_var("RELAY_TIMEOUT_SECS", DEFAULT_RELAY_TIMEOUT_SECS),
            gemini: GeminiSettings {
                api_key: non_empty_var("GEMINI_API_KEY"),
                model: non_empty_var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: non_empty_var("GEMINI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string()),
                timeout: timeout_var("GENERATION_TIMEOUT_SECS", DEFAULT_GENERATION_TIMEOUT_SECS),
            },
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    non_empty_var(key).and_then(|value| value.parse().ok())
}

fn timeout_var(key: &str, default_secs: u64) -> Duration {
    Duration::from_secs(
        parsed_var::<u64>(key)
            .filter(|secs| *secs > 0)
            .unwrap_or(default_secs),
    )
}
