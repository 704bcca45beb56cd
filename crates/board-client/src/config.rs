use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub server_url: String,
    pub request_timeout: Duration,
    pub settings_debounce: Duration,
    pub prefs_path: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            server_url: env::var("ENGINE_SERVER_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:5000".to_string())
                .trim_end_matches('/')
                .to_string(),
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            settings_debounce: Duration::from_millis(
                env::var("SETTINGS_DEBOUNCE_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(500),
            ),
            prefs_path: env::var("CLIENT_PREFS_PATH")
                .unwrap_or_else(|_| "board-client-prefs.json".to_string())
                .into(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            request_timeout: Duration::from_secs(30),
            settings_debounce: Duration::from_millis(500),
            prefs_path: PathBuf::from("board-client-prefs.json"),
        }
    }
}
